//! Host scene API abstraction.

/// A scene known to the host.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Scene {
    /// Host-specific identifier; stable across renames where the host supports it.
    pub id: String,
    /// Display name, used for lookups.
    pub name: String,
}

/// Errors produced by a scene actuator.
#[derive(Debug, thiserror::Error)]
pub enum ActuatorError {
    #[error("transport error: {0}")]
    Transport(String),

    #[error("connection closed")]
    Closed,

    #[error("request timed out")]
    Timeout,

    #[error("handshake failed: {0}")]
    Handshake(String),

    #[error("host rejected request ({code}): {comment}")]
    Request { code: i64, comment: String },
}

/// Access to the host application's scenes.
///
/// Implementations must not cache scene lists; scenes can be renamed, added or
/// removed between calls.
pub trait SceneActuator {
    /// Lists every scene in host order.
    fn list_scenes(&mut self) -> impl Future<Output = Result<Vec<Scene>, ActuatorError>> + Send;

    /// Returns the scene currently on program.
    fn active_scene(&mut self) -> impl Future<Output = Result<Scene, ActuatorError>> + Send;

    /// Makes `scene` the active scene.
    fn set_active_scene(
        &mut self,
        scene: &Scene,
    ) -> impl Future<Output = Result<(), ActuatorError>> + Send;

    /// Points the actuator at another host. An open session is closed; the
    /// next call connects to the new address.
    fn set_endpoint(
        &mut self,
        url: &str,
        password: Option<&str>,
    ) -> impl Future<Output = ()> + Send;

    /// Ends the session with the host, if one is open.
    fn close(&mut self) -> impl Future<Output = ()> + Send;
}
