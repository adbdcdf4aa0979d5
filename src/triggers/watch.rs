use crate::context::{FileEvent, FileEventKind};
use glob::Pattern;
use log::{debug, trace, warn};
use notify::{
    event::{CreateKind, ModifyKind},
    Event, EventKind, RecommendedWatcher, RecursiveMode, Watcher,
};
use std::{
    path::{Path, PathBuf},
    sync::mpsc::Sender,
};
use thiserror::Error;

/// A custom error describing why watching could not start.
#[derive(Debug, Error)]
pub enum WatchError {
    /// The pattern is not a valid glob.
    #[error("{0} is not a valid pattern ({1})")]
    InvalidPattern(String, String),
    /// The directory to watch does not exist or it is not a directory.
    #[error("{} is not a directory", .0.display())]
    MissingDirectory(PathBuf),
    /// The underlying filesystem watcher failed to subscribe.
    #[error("cannot watch {} ({})", .0.display(), .1)]
    WatchFailed(PathBuf, String),
}

/// Filters filesystem notifications down to the created or modified files
/// that match a glob pattern.
///
/// The pattern is matched case-sensitively against the file name, so `*.pdf`
/// matches `/watch/report.pdf`, but not `/watch/report.PDF` or `/watch/notes.txt`.
#[derive(Clone, Debug)]
pub struct PathWatcher {
    pattern: Pattern,
}

impl PathWatcher {
    /// Create a watcher for the given glob pattern.
    pub fn new(pattern: &str) -> Result<Self, WatchError> {
        let pattern = Pattern::new(pattern)
            .map_err(|err| WatchError::InvalidPattern(String::from(pattern), err.to_string()))?;

        Ok(PathWatcher { pattern })
    }

    /// Returns true if the file name of the path matches the pattern.
    pub fn matches(&self, path: &Path) -> bool {
        path.file_name()
            .and_then(|name| name.to_str())
            .map(|name| self.pattern.matches(name))
            .unwrap_or(false)
    }

    /// Turn a notification into file events. Moves, removals and other
    /// notifications are not created or modified files, these are left out.
    pub fn classify(&self, event: &Event) -> Vec<FileEvent> {
        let (kind, is_folder) = match event.kind {
            EventKind::Create(create_kind) => {
                (FileEventKind::Created, create_kind == CreateKind::Folder)
            }
            EventKind::Modify(ModifyKind::Name(_)) => return vec![],
            EventKind::Modify(_) => (FileEventKind::Modified, false),
            _ => return vec![],
        };

        event
            .paths
            .iter()
            .map(|path| FileEvent {
                source_path: path.clone(),
                kind,
                is_directory: is_folder || path.is_dir(),
            })
            .collect()
    }

    /// Returns true if the event should be handled: it is a file matching the pattern.
    pub fn accepts(&self, event: &FileEvent) -> bool {
        !event.is_directory && self.matches(&event.source_path)
    }

    /// Start watching the directory and send every accepted event to the queue.
    pub fn start(
        &self,
        directory: &Path,
        recursive: bool,
        tx: Sender<Option<FileEvent>>,
    ) -> Result<Subscription, WatchError> {
        if !directory.is_dir() {
            return Err(WatchError::MissingDirectory(directory.to_path_buf()));
        }

        let filter = self.clone();
        let mut watcher = notify::recommended_watcher(move |res: notify::Result<Event>| match res {
            Ok(event) => {
                trace!("Received {event:?}.");
                for file_event in filter.classify(&event) {
                    if !filter.accepts(&file_event) {
                        continue;
                    }
                    if tx.send(Some(file_event)).is_err() {
                        debug!("Event queue is closed, dropping event.");
                    }
                }
            }
            Err(err) => warn!("Watching failed: {err}."),
        })
        .map_err(|err| WatchError::WatchFailed(directory.to_path_buf(), err.to_string()))?;

        let mode = if recursive {
            RecursiveMode::Recursive
        } else {
            RecursiveMode::NonRecursive
        };
        watcher
            .watch(directory, mode)
            .map_err(|err| WatchError::WatchFailed(directory.to_path_buf(), err.to_string()))?;

        debug!(
            "Watching {} for {}.",
            directory.display(),
            self.pattern.as_str()
        );

        Ok(Subscription {
            watcher: Some(watcher),
            directory: directory.to_path_buf(),
        })
    }
}

/// An active subscription to the filesystem notifications of a directory.
pub struct Subscription {
    watcher: Option<RecommendedWatcher>,
    directory: PathBuf,
}

impl Subscription {
    /// Stop watching. Calling it again is a no-op.
    pub fn stop(&mut self) {
        if let Some(mut watcher) = self.watcher.take() {
            if let Err(err) = watcher.unwatch(&self.directory) {
                debug!("Failed unwatching {}: {err}.", self.directory.display());
            }
            debug!("Stopped watching {}.", self.directory.display());
        }
    }

    #[cfg(test)]
    fn is_active(&self) -> bool {
        self.watcher.is_some()
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        self.stop();
    }
}
