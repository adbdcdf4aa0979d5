use crate::context::FileEvent;
use mockall::automock;
use std::sync::mpsc::{SendError, Sender};
use thiserror::Error;

/// A trigger that terminates the program on a signal.
pub mod signal;
/// A watcher that queues the matching file changes of a directory.
pub mod watch;

/// A custom error for describing the error cases for triggers
#[derive(Debug, Error)]
pub enum TriggerError {
    /// Cannot initialize trigger, because it has a misconfiguration.
    #[error("not configured correctly: {0}")]
    Misconfigured(String),
    /// Cannot send trigger with Sender. This usually because the receiver is dropped.
    #[error("cannot trigger changes, receiver hang up")]
    ReceiverHangup(#[from] SendError<Option<FileEvent>>),
}

/// A trigger is a long running background process, which feeds the event queue.
///
/// Sending `Some(event)` queues a file event, sending `None` stops the main loop.
///
/// Triggers may include:
///   - signal handlers ([signal::SignalTrigger])
///   - etc.
#[automock]
pub trait Trigger: Sync + Send {
    /// Start the trigger process.
    fn listen(&self, tx: Sender<Option<FileEvent>>) -> Result<(), TriggerError>;
}
