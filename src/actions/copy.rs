use super::{Action, ActionError};
use crate::context::Context;
use log::{debug, info};
use std::{
    fs, io,
    path::{Path, PathBuf},
};
use thiserror::Error;

/// Custom error describing a failed copy.
#[derive(Debug, Error)]
#[error("cannot copy to {}: {cause}", .destination.display())]
pub struct CopyError {
    /// The destination that could not be written.
    pub destination: PathBuf,
    /// The underlying filesystem error.
    #[source]
    pub cause: io::Error,
}

impl From<CopyError> for ActionError {
    fn from(value: CopyError) -> Self {
        ActionError::FailedAction(value.to_string())
    }
}

/// Copy the source file to every destination, one after another in the given order.
///
/// Existing files are overwritten. It stops at the first failing destination,
/// the destinations already written are left in place.
pub fn replicate(source: &Path, destinations: &[PathBuf]) -> Result<Vec<PathBuf>, CopyError> {
    let mut written = Vec::with_capacity(destinations.len());
    for destination in destinations {
        fs::copy(source, destination).map_err(|cause| CopyError {
            destination: destination.clone(),
            cause,
        })?;
        debug!("Copied {} to {}.", source.display(), destination.display());
        written.push(destination.clone());
    }

    Ok(written)
}

/// An action to copy the changed file to the configured destinations.
///
/// A destination is a full file path, so the file can be renamed while copying.
pub struct CopyAction {
    destinations: Vec<PathBuf>,
}

impl CopyAction {
    pub fn new(destinations: Vec<PathBuf>) -> Self {
        CopyAction { destinations }
    }
}

impl Action for CopyAction {
    /// Copy the file of the event and save the written destinations to the context.
    fn run(&self, context: &mut Context) -> Result<(), ActionError> {
        info!("Copying files...");
        context.changed_paths = replicate(&context.event.source_path, &self.destinations)?;
        info!("Copied to {} destinations.", context.changed_paths.len());

        Ok(())
    }
}
