//! Watch a directory, copy the matching files into a git repository, commit and push them.
//!
//! ## How it works
//!
//! `gitdrop` is built up from **triggers** and **actions**.
//! Triggers are long running background processes that queue events
//! (the filesystem watcher queues the changed files, the signal handler queues
//! the shutdown). Actions run one after another for every queued event:
//! the changed file is copied to the destinations, then the destinations
//! are committed and pushed.
//!
//! ```ignore
//! +---------+       +-------+       +------+       +-------------+
//! | watcher | ----> | queue | ----> | copy | ----> | commit/push |
//! +---------+       +-------+       +------+       +-------------+
//! ```
//!
//! Events are handled strictly one at a time, in the order they arrive.

/// An action is a step that runs for every event (e.g. [copying files](actions::copy::CopyAction)
/// or [committing and pushing them](actions::git::GitAction)).
pub mod actions;
/// A trigger is a long running background process, which feeds the event queue
/// (e.g. [on a signal](triggers::signal::SignalTrigger)).
pub mod triggers;

/// The configuration of the watcher.
pub mod config;
/// The events and the data shared between the actions.
pub mod context;
/// The main program loop, that handles the events until interrupted.
pub mod start;
