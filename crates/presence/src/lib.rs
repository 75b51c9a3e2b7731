//! Companion app process detection.
//!
//! Tailing only runs while the companion app is alive. [`SysinfoProbe`]
//! answers that by scanning the OS process table for a fixed executable name.

use sysinfo::{ProcessRefreshKind, ProcessesToUpdate, RefreshKind, System};

/// Executable name of the companion app, matched case-insensitively.
pub const COMPANION_PROCESS_NAME: &str = "vrchat.exe";

/// Reports whether the companion app is running.
pub trait ProcessProbe {
    fn is_companion_running(&mut self) -> bool;

    /// Changes the executable name, effective on the next probe.
    fn set_process_name(&mut self, process_name: &str);
}

/// Process probe backed by `sysinfo`.
pub struct SysinfoProbe {
    process_name: String,
    system: System,
}

impl SysinfoProbe {
    /// Creates a probe looking for `process_name`.
    pub fn new(process_name: impl Into<String>) -> Self {
        Self {
            process_name: process_name.into(),
            system: System::new_with_specifics(
                RefreshKind::nothing().with_processes(ProcessRefreshKind::nothing()),
            ),
        }
    }
}

impl Default for SysinfoProbe {
    fn default() -> Self {
        Self::new(COMPANION_PROCESS_NAME)
    }
}

impl ProcessProbe for SysinfoProbe {
    fn is_companion_running(&mut self) -> bool {
        self.system.refresh_processes_specifics(
            ProcessesToUpdate::All,
            true,
            ProcessRefreshKind::nothing(),
        );

        let running = self
            .system
            .processes()
            .values()
            .any(|process| matches_name(&process.name().to_string_lossy(), &self.process_name));

        tracing::debug!(process = %self.process_name, running, "probed companion app");
        running
    }

    fn set_process_name(&mut self, process_name: &str) {
        if process_name != self.process_name {
            tracing::info!(process = %process_name, "companion process name changed");
            self.process_name = process_name.to_string();
        }
    }
}

fn matches_name(candidate: &str, wanted: &str) -> bool {
    candidate.eq_ignore_ascii_case(wanted)
}
