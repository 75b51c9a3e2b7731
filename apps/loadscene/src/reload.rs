//! Configuration hot reload.
//!
//! Watches the configuration file's directory and forwards every successfully
//! parsed revision to the scheduler. Parse failures keep the running settings.

use std::path::{Path, PathBuf};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebounceEventResult, Debouncer, new_debouncer};
use tokio::sync::mpsc;

use crate::config::Config;

/// Quiet period before a burst of writes counts as one change.
const RELOAD_DEBOUNCE: Duration = Duration::from_millis(500);

/// Keeps the file watcher alive; dropping it stops reloads.
pub struct ConfigWatcher {
    _debouncer: Debouncer<RecommendedWatcher>,
}

/// Starts watching `path`, sending reloaded configurations to `tx`.
pub fn watch_config(
    path: &Path,
    tx: mpsc::UnboundedSender<Config>,
) -> anyhow::Result<ConfigWatcher> {
    let file = path.to_path_buf();
    let dir = path
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
        .unwrap_or_else(|| PathBuf::from("."));

    let mut debouncer = new_debouncer(RELOAD_DEBOUNCE, move |result: DebounceEventResult| {
        match result {
            Ok(events) => {
                if events
                    .iter()
                    .any(|event| event.path.file_name() == file.file_name())
                {
                    reload(&file, &tx);
                }
            }
            Err(e) => tracing::warn!(error = %e, "config watcher error"),
        }
    })?;

    debouncer.watcher().watch(&dir, RecursiveMode::NonRecursive)?;
    tracing::info!(path = %path.display(), "watching configuration for changes");

    Ok(ConfigWatcher {
        _debouncer: debouncer,
    })
}

fn reload(path: &Path, tx: &mpsc::UnboundedSender<Config>) {
    match Config::load_from(path) {
        Ok(config) => {
            tracing::info!(path = %path.display(), "configuration changed, reloading");
            if tx.send(config).is_err() {
                tracing::debug!("scheduler gone, dropping reloaded configuration");
            }
        }
        Err(e) => {
            tracing::warn!(
                path = %path.display(),
                error = %e,
                "invalid configuration, keeping previous settings"
            );
        }
    }
}
