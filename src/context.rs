use crate::actions::git::CommitResult;
use std::{fmt, path::PathBuf};

/// The kind of filesystem change that produced an event.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileEventKind {
    Created,
    Modified,
}

impl fmt::Display for FileEventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FileEventKind::Created => write!(f, "created"),
            FileEventKind::Modified => write!(f, "modified"),
        }
    }
}

/// A change in the watched directory, as reported by the filesystem.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileEvent {
    pub source_path: PathBuf,
    pub kind: FileEventKind,
    pub is_directory: bool,
}

impl FileEvent {
    pub fn new(source_path: PathBuf, kind: FileEventKind) -> Self {
        FileEvent {
            source_path,
            kind,
            is_directory: false,
        }
    }
}

/// The data shared between the actions while handling one event.
#[derive(Debug)]
pub struct Context {
    /// The event that is being handled.
    pub event: FileEvent,
    /// Destinations written by the copy, in the configured order.
    pub changed_paths: Vec<PathBuf>,
    /// The commit created for the changed paths, if any.
    pub commit: Option<CommitResult>,
}

impl Context {
    pub fn new(event: FileEvent) -> Self {
        Context {
            event,
            changed_paths: vec![],
            commit: None,
        }
    }
}
