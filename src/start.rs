use crate::{
    actions::{copy::CopyAction, git::GitAction, Action, ActionError},
    config::{ConfigError, WatchConfig},
    context::{Context, FileEvent},
    triggers::{
        signal::SignalTrigger,
        watch::{PathWatcher, WatchError},
        Trigger,
    },
};
use log::{debug, error, info, warn};
use std::{
    sync::mpsc::{self, Receiver, Sender},
    thread,
};
use thiserror::Error;

/// A custom error for the start function
#[derive(Debug, Error)]
pub enum StartError {
    #[error("You have to define at least one trigger.")]
    NoTriggers,
    #[error("Configuration is invalid: {0}.")]
    InvalidConfig(#[from] ConfigError),
    #[error("Cannot start watching: {0}.")]
    WatchSetup(#[from] WatchError),
}

/// Run the actions for one event, stopping at the first failing action.
fn handle_event(event: FileEvent, actions: &[Box<dyn Action>]) {
    info!("{} {}.", event.source_path.display(), event.kind);

    let mut context = Context::new(event);
    for action in actions.iter() {
        match action.run(&mut context) {
            Ok(()) => {}
            Err(ActionError::Skipped(reason)) => {
                warn!("Skipping the rest: {reason}.");
                return;
            }
            Err(err) => {
                error!("Action failed, we will not continue: {err}.");
                return;
            }
        }
    }

    debug!("Finished handling {}.", context.event.source_path.display());
}

/// The main program loop, that handles the queued events one by one.
///
/// Every trigger runs on its own thread and feeds the queue. The events are handled in
/// the order they arrive, an event is only taken once the previous one finished.
/// The loop stops when a `None` is queued or every sender is gone.
pub fn start(
    tx: Sender<Option<FileEvent>>,
    rx: Receiver<Option<FileEvent>>,
    triggers: Vec<Box<dyn Trigger>>,
    actions: &mut [Box<dyn Action>],
) -> Result<(), StartError> {
    if triggers.is_empty() {
        return Err(StartError::NoTriggers);
    }

    for trigger in triggers {
        let tx = tx.clone();
        thread::spawn(move || {
            let result = trigger.listen(tx);
            if let Err(err) = result {
                error!("Trigger failed: {err}.");
            }
        });
    }
    drop(tx);

    debug!("Waiting on events.");
    while let Ok(Some(event)) = rx.recv() {
        handle_event(event, actions);
    }

    debug!("Finished running.");

    Ok(())
}

/// Watch the source directory and copy, commit and push every matching file,
/// until the process is interrupted.
pub fn run(config: WatchConfig) -> Result<(), StartError> {
    config.validate()?;

    let (tx, rx) = mpsc::channel::<Option<FileEvent>>();

    let watcher = PathWatcher::new(&config.pattern)?;
    let mut subscription = watcher.start(&config.source_directory, config.recursive, tx.clone())?;

    let triggers: Vec<Box<dyn Trigger>> = vec![Box::new(SignalTrigger::new())];
    let mut actions: Vec<Box<dyn Action>> = vec![
        Box::new(CopyAction::new(config.destinations.clone())),
        Box::new(GitAction::from_config(&config)),
    ];

    info!("Ctrl-C to stop.");
    info!(
        "Watching {} for {}...",
        config.source_directory.display(),
        config.pattern
    );

    let result = start(tx, rx, triggers, &mut actions);
    subscription.stop();
    info!("Quitting...");

    result
}
