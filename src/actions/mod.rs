use crate::context::Context;
use mockall::automock;
use thiserror::Error;

/// An action to copy the changed file to the destinations.
pub mod copy;
/// An action to commit the destinations and push them to the remote.
pub mod git;

/// A custom error for describing the error cases for actions
#[derive(Debug, Error)]
pub enum ActionError {
    /// Running the action failed, the following actions should not run.
    #[error("{0}")]
    FailedAction(String),
    /// There was nothing to do, the following actions should not run.
    #[error("{0}")]
    Skipped(String),
}

/// An action is a step that runs for every file event, in order.
///
/// Actions may include:
///   - copying the file to the destinations ([copy::CopyAction])
///   - committing and pushing the destinations ([git::GitAction])
///   - etc.
#[automock]
pub trait Action {
    /// Initiate the action
    fn run(&self, context: &mut Context) -> Result<(), ActionError>;
}
