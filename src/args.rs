use gitdrop::config::{ConfigError, WatchConfig, DEFAULT_PATTERN};
use gumdrop::Options;
use std::path::PathBuf;

/// Watch a directory for new or modified files, copy them into a git repository,
/// commit and push them.
#[derive(Debug, Options)]
pub struct Args {
    /// The directory to watch.
    #[options(short = "s", meta = "DIRECTORY")]
    pub source_path: Option<PathBuf>,

    /// The files to watch, as a glob on the file name.
    #[options(default = "*.pdf", meta = "GLOB")]
    pub pattern: String,

    /// Watch the subdirectories of the source as well.
    #[options()]
    pub recursive: bool,

    /// Copy the files here, you can define multiple times.
    ///
    /// It is a file path, so the copy can be renamed (e.g. /repo/docs/latest.pdf).
    #[options(short = "d", long = "destination", meta = "PATH")]
    pub destinations: Vec<PathBuf>,

    /// The git repository containing the destinations.
    #[options(short = "g", meta = "DIRECTORY")]
    pub git_directory: Option<PathBuf>,

    /// The name of the commit author.
    #[options(short = "n", meta = "NAME")]
    pub author_name: Option<String>,

    /// The email of the commit author.
    #[options(short = "e", meta = "EMAIL")]
    pub author_email: Option<String>,

    /// The message of the commits.
    #[options(short = "m", meta = "MESSAGE")]
    pub commit_message: Option<String>,

    /// Increase verbosity, can be set multiple times (-v debug, -vv tracing)
    #[options(count)]
    pub verbose: u8,

    /// Only print error messages.
    #[options()]
    pub quiet: bool,

    /// Print the current version.
    #[options(short = "V")]
    pub version: bool,

    /// Print this help.
    #[options()]
    pub help: bool,
}

impl Args {
    /// Build the configuration, failing if a required argument is missing.
    pub fn into_config(self) -> Result<WatchConfig, ConfigError> {
        let config = WatchConfig {
            source_directory: self
                .source_path
                .ok_or(ConfigError::MissingArgument("directory to watch (-s)"))?,
            pattern: if self.pattern.is_empty() {
                String::from(DEFAULT_PATTERN)
            } else {
                self.pattern
            },
            recursive: self.recursive,
            destinations: self.destinations,
            git_directory: self
                .git_directory
                .ok_or(ConfigError::MissingArgument("git directory (-g)"))?,
            author_name: self
                .author_name
                .ok_or(ConfigError::MissingArgument("author name (-n)"))?,
            author_email: self
                .author_email
                .ok_or(ConfigError::MissingArgument("author email (-e)"))?,
            commit_message: self
                .commit_message
                .ok_or(ConfigError::MissingArgument("commit message (-m)"))?,
        };
        config.validate()?;

        Ok(config)
    }
}

pub fn parse_args() -> Args {
    Args::parse_args_default_or_exit()
}
