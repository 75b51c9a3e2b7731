//! Companion app log watcher.
//!
//! Finds the most recently written `output_log*` file in a log directory,
//! reads only the bytes appended since the previous poll, and turns new lines
//! into world transition events.

mod classifier;
mod error;
mod locator;
mod tailer;
mod watcher;

pub use classifier::{
    DESTINATION_REQUESTED_MARKER, FINISHED_ENTERING_MARKER, TransitionEvent, classify,
};
pub use error::WatchError;
pub use locator::{LOG_FILE_PREFIX, Located, find_latest_log, locate};
pub use tailer::{LogLine, TailRead, read_new};
pub use watcher::{LogWatcher, WatchState};
