//! Error types for the OBS WebSocket client.

use loadscene_scenes::ActuatorError;
use tokio_tungstenite::tungstenite;

/// Errors from the OBS WebSocket client.
#[derive(Debug, thiserror::Error)]
pub enum ObsError {
    #[error("WebSocket error: {0}")]
    Ws(#[from] tungstenite::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("request timed out")]
    Timeout,

    #[error("connection closed")]
    Closed,

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("request {request_type} failed ({code}): {comment}")]
    Request {
        request_type: String,
        code: i64,
        comment: String,
    },
}

impl ObsError {
    /// Returns true when the connection can no longer be used.
    pub fn is_transport(&self) -> bool {
        matches!(self, ObsError::Ws(_) | ObsError::Timeout | ObsError::Closed)
    }
}

impl From<ObsError> for ActuatorError {
    fn from(e: ObsError) -> Self {
        match e {
            ObsError::Ws(e) => ActuatorError::Transport(e.to_string()),
            ObsError::Json(e) => ActuatorError::Transport(format!("malformed message: {e}")),
            ObsError::Timeout => ActuatorError::Timeout,
            ObsError::Closed => ActuatorError::Closed,
            ObsError::Handshake(reason) => ActuatorError::Handshake(reason),
            ObsError::Request { code, comment, .. } => ActuatorError::Request { code, comment },
        }
    }
}
