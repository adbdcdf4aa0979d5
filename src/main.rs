use args::parse_args;
use gitdrop::{
    config::ConfigError,
    start::{run, StartError},
};
use log::{debug, error, SetLoggerError};
use logger::init_logger;
use std::process;
use thiserror::Error;

mod args;
mod logger;

#[derive(Debug, Error)]
pub enum MainError {
    #[error("Timezone offset cannot be determined for the logger.")]
    FailedLoggerTimezones,
    #[error(transparent)]
    FailedLogger(#[from] SetLoggerError),
    #[error("Invalid arguments: {0}.")]
    InvalidArguments(#[from] ConfigError),
    #[error(transparent)]
    FailedStart(#[from] StartError),
}

fn main_inner() -> Result<(), MainError> {
    let args = parse_args();

    if args.version {
        println!("{}", env!("CARGO_PKG_VERSION"));
        return Ok(());
    }

    init_logger(&args)?;
    debug!("Parsed arguments: {args:?}.");

    let config = args.into_config()?;
    run(config)?;

    Ok(())
}

fn main() {
    if let Err(err) = main_inner() {
        match err {
            MainError::FailedLoggerTimezones | MainError::FailedLogger(_) => eprintln!("{err}"),
            _ => error!("{err}"),
        }
        process::exit(1);
    }
}
