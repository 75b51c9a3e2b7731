//! Per-poll pipeline: locate, tail, classify.

use std::path::{Path, PathBuf};

use crate::{Located, TransitionEvent, WatchError, classify, locate, read_new};

/// Tailing state carried between polls.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WatchState {
    /// Log file currently being tailed.
    pub tracked_file: Option<PathBuf>,
    /// Bytes of `tracked_file` already consumed.
    pub offset: u64,
    /// Set while the next read is the first one since attaching to a file.
    pub first_poll: bool,
    /// Last answer from the process probe.
    pub companion_running: bool,
}

impl Default for WatchState {
    fn default() -> Self {
        Self {
            tracked_file: None,
            offset: 0,
            first_poll: true,
            companion_running: false,
        }
    }
}

/// Tails the newest log file in a directory and reports world transitions.
pub struct LogWatcher {
    log_dir: PathBuf,
    state: WatchState,
    /// Suppresses repeating the "no log file" warning on every poll.
    reported_missing: bool,
}

impl LogWatcher {
    /// Creates a watcher for `log_dir`. Nothing is read until the first poll.
    pub fn new(log_dir: impl Into<PathBuf>) -> Self {
        Self {
            log_dir: log_dir.into(),
            state: WatchState::default(),
            reported_missing: false,
        }
    }

    /// Returns the watched directory.
    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    /// Points the watcher at another directory, effective on the next poll.
    pub fn set_log_dir(&mut self, log_dir: impl Into<PathBuf>) {
        let log_dir = log_dir.into();
        if log_dir != self.log_dir {
            tracing::info!(dir = %log_dir.display(), "log directory changed");
            self.log_dir = log_dir;
            self.reported_missing = false;
        }
    }

    pub fn state(&self) -> &WatchState {
        &self.state
    }

    /// Records whether the companion app is running. Tailing state is kept
    /// across presence changes.
    pub fn set_companion_running(&mut self, running: bool) {
        if running != self.state.companion_running {
            tracing::info!(running, "companion app presence changed");
        }
        self.state.companion_running = running;
    }

    /// Runs one locate/tail/classify cycle.
    ///
    /// Returns at most one event. Nothing is read while the companion app is
    /// not running, and the first read after attaching to a file only
    /// advances the offset past existing content.
    pub fn poll(&mut self) -> Result<Option<TransitionEvent>, WatchError> {
        if !self.state.companion_running {
            return Ok(None);
        }

        let path = match locate(&self.log_dir, self.state.tracked_file.as_deref()) {
            Located::Missing => {
                if !self.reported_missing {
                    tracing::warn!(
                        dir = %self.log_dir.display(),
                        "log file not found, check the log folder path"
                    );
                    self.reported_missing = true;
                }
                return Ok(None);
            }
            Located::Same(path) => path,
            Located::Rotated(path) => {
                tracing::info!(file = %path.display(), "watching log file");
                self.state.tracked_file = Some(path.clone());
                self.state.offset = 0;
                self.state.first_poll = true;
                path
            }
        };
        self.reported_missing = false;

        let read = read_new(&path, self.state.offset)?;
        self.state.offset = read.offset;

        if self.state.first_poll {
            self.state.first_poll = false;
            if !read.lines.is_empty() {
                tracing::info!(
                    file = %path.display(),
                    lines = read.lines.len(),
                    "initial log file read, existing content ignored"
                );
            }
            return Ok(None);
        }

        if read.lines.is_empty() {
            return Ok(None);
        }

        let event = classify(&read.lines);
        tracing::debug!(lines = read.lines.len(), ?event, "classified new log lines");
        Ok(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs::File;
    use std::io::Write;
    use std::time::{Duration, UNIX_EPOCH};

    fn write_with_mtime(path: &Path, content: &str, secs: u64) {
        std::fs::write(path, content).unwrap();
        let file = File::options().write(true).open(path).unwrap();
        file.set_modified(UNIX_EPOCH + Duration::from_secs(secs))
            .unwrap();
    }

    fn append(path: &Path, line: &str) {
        let mut file = File::options().append(true).open(path).unwrap();
        writeln!(file, "{line}").unwrap();
    }

    fn running_watcher(dir: &Path) -> LogWatcher {
        let mut watcher = LogWatcher::new(dir);
        watcher.set_companion_running(true);
        watcher
    }

    #[test]
    fn newest_file_scenario() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write_with_mtime(&dir.join("output_log_2024.txt"), "", 1_700_000_000);
        let newest = dir.join("output_log_2025.txt");
        write_with_mtime(&newest, "hello\n", 1_750_000_000);

        let mut watcher = running_watcher(dir);
        assert_eq!(watcher.poll().unwrap(), None);
        assert_eq!(watcher.state().tracked_file.as_deref(), Some(newest.as_path()));

        append(&newest, "[Behaviour] Destination requested: worldX");
        assert_eq!(
            watcher.poll().unwrap(),
            Some(TransitionEvent::EnteredLoading)
        );
    }

    #[test]
    fn first_poll_suppresses_existing_markers() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("output_log_1.txt");
        std::fs::write(
            &log,
            "[Behaviour] Destination requested: wrld_a\n[Behaviour] Finished entering world.\n",
        )
        .unwrap();

        let mut watcher = running_watcher(tmp.path());
        assert_eq!(watcher.poll().unwrap(), None);
        assert!(!watcher.state().first_poll);

        // Nothing new: the historical markers are not re-read.
        assert_eq!(watcher.poll().unwrap(), None);

        append(&log, "[Behaviour] Finished entering world.");
        assert_eq!(
            watcher.poll().unwrap(),
            Some(TransitionEvent::FinishedLoading)
        );
    }

    #[test]
    fn rotation_resets_offset() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        let a = dir.join("output_log_a.txt");
        write_with_mtime(&a, &"x".repeat(600), 1_700_000_000);

        let mut watcher = running_watcher(dir);
        watcher.poll().unwrap();
        watcher.state.offset = 500;

        let b = dir.join("output_log_b.txt");
        write_with_mtime(&b, "fresh\n", 1_700_000_100);

        assert_eq!(watcher.poll().unwrap(), None);
        let state = watcher.state();
        assert_eq!(state.tracked_file.as_deref(), Some(b.as_path()));
        assert_eq!(state.offset, 6);
        assert!(!state.first_poll);
    }

    #[test]
    fn rotation_suppresses_content_of_new_file() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path();
        write_with_mtime(&dir.join("output_log_a.txt"), "start\n", 1_700_000_000);

        let mut watcher = running_watcher(dir);
        watcher.poll().unwrap();

        write_with_mtime(
            &dir.join("output_log_b.txt"),
            "[Behaviour] Finished entering world.\n",
            1_700_000_100,
        );
        assert_eq!(watcher.poll().unwrap(), None);
    }

    #[test]
    fn one_event_per_poll() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("output_log_1.txt");
        std::fs::write(&log, "").unwrap();

        let mut watcher = running_watcher(tmp.path());
        watcher.poll().unwrap();

        append(&log, "[Behaviour] Finished entering world.");
        append(&log, "[Behaviour] Destination requested: wrld_b");
        assert_eq!(
            watcher.poll().unwrap(),
            Some(TransitionEvent::FinishedLoading)
        );
        // The later marker was consumed with its batch.
        assert_eq!(watcher.poll().unwrap(), None);
    }

    #[test]
    fn not_running_skips_work() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("output_log_1.txt");
        std::fs::write(&log, "existing\n").unwrap();

        let mut watcher = LogWatcher::new(tmp.path());
        assert_eq!(watcher.poll().unwrap(), None);
        assert_eq!(watcher.state(), &WatchState::default());
    }

    #[test]
    fn presence_toggle_keeps_state() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("output_log_1.txt");
        std::fs::write(&log, "existing\n").unwrap();

        let mut watcher = running_watcher(tmp.path());
        watcher.poll().unwrap();
        let before = watcher.state().clone();

        watcher.set_companion_running(false);
        append(&log, "[Behaviour] Destination requested: wrld_c");
        assert_eq!(watcher.poll().unwrap(), None);

        watcher.set_companion_running(true);
        assert_eq!(watcher.state().offset, before.offset);
        assert!(!watcher.state().first_poll);
        assert_eq!(
            watcher.poll().unwrap(),
            Some(TransitionEvent::EnteredLoading)
        );
    }

    #[test]
    fn missing_directory_is_recoverable() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("later");

        let mut watcher = running_watcher(&dir);
        assert_eq!(watcher.poll().unwrap(), None);
        assert!(watcher.state().tracked_file.is_none());

        std::fs::create_dir(&dir).unwrap();
        std::fs::write(dir.join("output_log_1.txt"), "boot\n").unwrap();
        assert_eq!(watcher.poll().unwrap(), None);
        assert!(watcher.state().tracked_file.is_some());
    }

    #[test]
    fn deleted_tracked_file_keeps_tracking_state() {
        let tmp = tempfile::tempdir().unwrap();
        let log = tmp.path().join("output_log_1.txt");
        std::fs::write(&log, "boot\n").unwrap();

        let mut watcher = running_watcher(tmp.path());
        watcher.poll().unwrap();
        std::fs::remove_file(&log).unwrap();

        assert_eq!(watcher.poll().unwrap(), None);
        assert_eq!(watcher.state().tracked_file.as_deref(), Some(log.as_path()));
    }

    #[test]
    fn set_log_dir_switches_directory() {
        let first = tempfile::tempdir().unwrap();
        let second = tempfile::tempdir().unwrap();
        std::fs::write(first.path().join("output_log_1.txt"), "a\n").unwrap();
        let other = second.path().join("output_log_2.txt");
        std::fs::write(&other, "b\n").unwrap();

        let mut watcher = running_watcher(first.path());
        watcher.poll().unwrap();

        watcher.set_log_dir(second.path());
        assert_eq!(watcher.log_dir(), second.path());
        watcher.poll().unwrap();
        assert_eq!(watcher.state().tracked_file.as_deref(), Some(other.as_path()));
    }
}
