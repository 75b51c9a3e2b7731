//! Error types for log watching.

/// Errors produced while reading the tracked log file.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
