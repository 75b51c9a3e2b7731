//! World transition detection from log lines.

use std::fmt;

use crate::LogLine;

/// Logged once the companion app has fully loaded into a world.
pub const FINISHED_ENTERING_MARKER: &str = "[Behaviour] Finished entering world.";

/// Logged as soon as a world change is requested. Later events in the
/// sequence fire too late because worlds start loading in the background on
/// the first click.
pub const DESTINATION_REQUESTED_MARKER: &str = "[Behaviour] Destination requested: ";

/// A loading state change inferred from the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransitionEvent {
    /// The companion app left a world and is showing its loading screen.
    EnteredLoading,
    /// The companion app finished entering the new world.
    FinishedLoading,
}

impl fmt::Display for TransitionEvent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TransitionEvent::EnteredLoading => write!(f, "entered loading"),
            TransitionEvent::FinishedLoading => write!(f, "finished loading"),
        }
    }
}

/// Returns the event of the first matching line, in file order.
///
/// Garbled lines never match.
pub fn classify(lines: &[LogLine]) -> Option<TransitionEvent> {
    lines.iter().find_map(|line| match line {
        LogLine::Text(text) => classify_line(text),
        LogLine::Garbled => None,
    })
}

fn classify_line(text: &str) -> Option<TransitionEvent> {
    if text.contains(FINISHED_ENTERING_MARKER) {
        Some(TransitionEvent::FinishedLoading)
    } else if text.contains(DESTINATION_REQUESTED_MARKER) {
        Some(TransitionEvent::EnteredLoading)
    } else {
        None
    }
}
