use std::path::PathBuf;
use thiserror::Error;

/// The pattern used when no other pattern is given.
pub const DEFAULT_PATTERN: &str = "*.pdf";

/// A custom error describing an invalid startup configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required argument was not passed.
    #[error("you have to pass the {0}")]
    MissingArgument(&'static str),
    /// There are no destinations to copy the files to.
    #[error("you have to pass at least one destination")]
    NoDestinations,
    /// The author name or email is empty.
    #[error("the author name and email cannot be empty")]
    EmptyIdentity,
}

/// The configuration of the watcher, created once at startup.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WatchConfig {
    /// The directory to watch for changes.
    pub source_directory: PathBuf,
    /// The glob pattern the changed file names have to match.
    pub pattern: String,
    /// Watch the subdirectories of the source directory too.
    pub recursive: bool,
    /// Every changed file is copied to all of these, in order.
    pub destinations: Vec<PathBuf>,
    /// The git working directory containing the destinations.
    pub git_directory: PathBuf,
    pub author_name: String,
    pub author_email: String,
    pub commit_message: String,
}

impl WatchConfig {
    /// Check that the configuration can be used to start watching.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.destinations.is_empty() {
            return Err(ConfigError::NoDestinations);
        }
        if self.author_name.trim().is_empty() || self.author_email.trim().is_empty() {
            return Err(ConfigError::EmptyIdentity);
        }

        Ok(())
    }
}
