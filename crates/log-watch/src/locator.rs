//! Log file discovery.
//!
//! The companion app starts a fresh `output_log_*.txt` on every launch, so the
//! file to tail is simply the newest one in the log directory.

use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// File name prefix shared by every companion app log file.
pub const LOG_FILE_PREFIX: &str = "output_log";

/// Result of looking for the active log file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Located {
    /// No matching file (or the directory is missing/unreadable).
    Missing,
    /// The newest file is the one already being tracked.
    Same(PathBuf),
    /// A different file superseded the tracked one; the read offset must be reset.
    Rotated(PathBuf),
}

/// Finds the most recently modified log file in `log_dir`.
///
/// Ties keep the entry that the directory listing returned first.
pub fn find_latest_log(log_dir: &Path) -> Option<PathBuf> {
    let entries = match std::fs::read_dir(log_dir) {
        Ok(entries) => entries,
        Err(e) => {
            tracing::debug!(dir = %log_dir.display(), error = %e, "cannot list log directory");
            return None;
        }
    };

    let mut latest: Option<(SystemTime, PathBuf)> = None;
    for entry in entries.filter_map(|entry| entry.ok()) {
        let is_log = entry
            .file_name()
            .to_str()
            .is_some_and(|n| n.starts_with(LOG_FILE_PREFIX));
        if !is_log {
            continue;
        }

        let Ok(meta) = entry.metadata() else {
            continue;
        };
        if !meta.is_file() {
            continue;
        }
        let Ok(modified) = meta.modified() else {
            continue;
        };

        match &latest {
            Some((newest, _)) if *newest >= modified => {}
            _ => latest = Some((modified, entry.path())),
        }
    }

    latest.map(|(_, path)| path)
}

/// Finds the active log file and compares it against the one being tracked.
pub fn locate(log_dir: &Path, tracked: Option<&Path>) -> Located {
    match find_latest_log(log_dir) {
        None => Located::Missing,
        Some(path) if tracked == Some(path.as_path()) => Located::Same(path),
        Some(path) => Located::Rotated(path),
    }
}
