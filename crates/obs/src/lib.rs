//! OBS WebSocket (protocol v5) scene actuator.
//!
//! Connects lazily, authenticates when the server asks for it, and maps the
//! generic scene operations onto `GetSceneList`, `GetCurrentProgramScene` and
//! `SetCurrentProgramScene` requests.

mod actuator;
mod client;
mod error;
pub mod protocol;

pub use actuator::ObsActuator;
pub use client::ObsConnection;
pub use error::ObsError;

/// Default obs-websocket server address.
pub const DEFAULT_URL: &str = "ws://127.0.0.1:4455";
