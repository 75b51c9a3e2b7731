//! [`SceneActuator`] over an obs-websocket connection.

use loadscene_scenes::{ActuatorError, Scene, SceneActuator};
use serde_json::json;

use crate::protocol::{CurrentProgramScene, SceneList};
use crate::{ObsConnection, ObsError};

/// Scene actuator that (re)connects to OBS on demand.
///
/// A transport failure drops the connection; the next call reconnects, so an
/// OBS restart only costs the polls made while it was down.
pub struct ObsActuator {
    url: String,
    password: Option<String>,
    conn: Option<ObsConnection>,
}

impl ObsActuator {
    pub fn new(url: impl Into<String>, password: Option<String>) -> Self {
        Self {
            url: url.into(),
            password,
            conn: None,
        }
    }

    /// Whether a session is open. When false, the next call reconnects, so
    /// callers can tell a lost OBS apart from a rejected request.
    pub fn is_connected(&self) -> bool {
        self.conn.is_some()
    }

    async fn connection(&mut self) -> Result<&mut ObsConnection, ObsError> {
        if self.conn.is_none() {
            tracing::debug!(url = %self.url, "connecting to OBS");
            let conn = ObsConnection::connect(&self.url, self.password.as_deref()).await?;
            self.conn = Some(conn);
        }
        self.conn.as_mut().ok_or(ObsError::Closed)
    }

    async fn call(
        &mut self,
        request_type: &str,
        request_data: Option<serde_json::Value>,
    ) -> Result<serde_json::Value, ObsError> {
        let result = self
            .connection()
            .await?
            .request(request_type, request_data)
            .await;

        if let Err(e) = &result
            && e.is_transport()
        {
            tracing::warn!(error = %e, "lost connection to OBS");
            self.conn = None;
        }
        result
    }
}

impl SceneActuator for ObsActuator {
    async fn list_scenes(&mut self) -> Result<Vec<Scene>, ActuatorError> {
        let data = self.call("GetSceneList", None).await?;
        let list: SceneList = serde_json::from_value(data).map_err(ObsError::from)?;

        Ok(list
            .scenes
            .into_iter()
            .map(|entry| Scene {
                id: entry.scene_uuid.unwrap_or_else(|| entry.scene_name.clone()),
                name: entry.scene_name,
            })
            .collect())
    }

    async fn active_scene(&mut self) -> Result<Scene, ActuatorError> {
        let data = self.call("GetCurrentProgramScene", None).await?;
        let current: CurrentProgramScene =
            serde_json::from_value(data).map_err(ObsError::from)?;

        Ok(Scene {
            id: current
                .current_program_scene_uuid
                .unwrap_or_else(|| current.current_program_scene_name.clone()),
            name: current.current_program_scene_name,
        })
    }

    async fn set_active_scene(&mut self, scene: &Scene) -> Result<(), ActuatorError> {
        self.call(
            "SetCurrentProgramScene",
            Some(json!({ "sceneName": scene.name })),
        )
        .await?;
        Ok(())
    }

    async fn set_endpoint(&mut self, url: &str, password: Option<&str>) {
        if url == self.url && password == self.password.as_deref() {
            return;
        }
        self.url = url.to_string();
        self.password = password.map(str::to_string);
        self.close().await;
        tracing::info!(url, "OBS endpoint changed");
    }

    async fn close(&mut self) {
        if let Some(conn) = self.conn.take() {
            conn.close().await;
            tracing::debug!("disconnected from OBS");
        }
    }
}
