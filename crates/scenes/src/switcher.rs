//! Loading scene controller.

use crate::{ActuatorError, Scene, SceneActuator};

/// Default scene value meaning "whatever was live before loading began".
pub const LAST_SCENE_SENTINEL: &str = "Last Scene";

/// Scene to return to once loading finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RestoreTarget {
    /// The scene that was active when loading started.
    LastScene,
    /// A fixed scene, by name.
    Named(String),
}

impl RestoreTarget {
    /// Parses a configured default scene. An empty value means unset.
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "" => None,
            LAST_SCENE_SENTINEL => Some(RestoreTarget::LastScene),
            name => Some(RestoreTarget::Named(name.to_string())),
        }
    }
}

/// User-tunable switching settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SwitcherSettings {
    pub loading_scene: Option<String>,
    pub default_scene: Option<RestoreTarget>,
    pub enabled: bool,
}

impl Default for SwitcherSettings {
    fn default() -> Self {
        Self {
            loading_scene: None,
            default_scene: None,
            enabled: true,
        }
    }
}

/// Controller state: settings plus the scene captured when loading began.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SwitcherState {
    pub settings: SwitcherSettings,
    pub last_active_scene: Option<Scene>,
}

/// What a transition handler did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SwitchOutcome {
    /// The named scene is now active.
    Switched(String),
    /// Switching is turned off; the host was not touched.
    Disabled,
    /// No scene is configured for this transition.
    NoTarget,
    /// Restore to the last scene was requested but none was captured.
    NoLastScene,
    /// The requested scene does not exist in the host.
    NotFound(String),
    /// The host could not be reached or refused the request.
    Failed(String),
}

/// Switches scenes in response to loading transitions.
///
/// Failures never propagate: every path ends in a logged [`SwitchOutcome`].
pub struct SceneSwitcher<A> {
    actuator: A,
    state: SwitcherState,
}

impl<A: SceneActuator> SceneSwitcher<A> {
    pub fn new(actuator: A, settings: SwitcherSettings) -> Self {
        Self {
            actuator,
            state: SwitcherState {
                settings,
                last_active_scene: None,
            },
        }
    }

    pub fn state(&self) -> &SwitcherState {
        &self.state
    }

    pub fn actuator(&self) -> &A {
        &self.actuator
    }

    pub fn actuator_mut(&mut self) -> &mut A {
        &mut self.actuator
    }

    /// Replaces the settings. The captured last scene is kept.
    pub fn apply(&mut self, settings: SwitcherSettings) {
        if settings != self.state.settings {
            tracing::info!(
                loading_scene = ?settings.loading_scene,
                default_scene = ?settings.default_scene,
                enabled = settings.enabled,
                "scene switcher settings updated"
            );
        }
        self.state.settings = settings;
    }

    /// Captures the live scene, then switches to the loading scene.
    pub async fn on_entered_loading(&mut self) -> SwitchOutcome {
        if !self.state.settings.enabled {
            tracing::info!("scene switching is disabled");
            return SwitchOutcome::Disabled;
        }

        self.state.last_active_scene = match self.actuator.active_scene().await {
            Ok(scene) => Some(scene),
            Err(e) => {
                tracing::warn!(error = %e, "failed to read the active scene");
                None
            }
        };

        let Some(name) = self.state.settings.loading_scene.clone() else {
            tracing::info!("no loading scene set");
            return SwitchOutcome::NoTarget;
        };

        tracing::info!(scene = %name, "switching to loading scene");
        self.switch_to(&name).await
    }

    /// Switches back to the default scene, or to the captured scene when the
    /// default is [`RestoreTarget::LastScene`].
    pub async fn on_finished_loading(&mut self) -> SwitchOutcome {
        if !self.state.settings.enabled {
            tracing::info!("scene switching is disabled");
            return SwitchOutcome::Disabled;
        }

        let name = match &self.state.settings.default_scene {
            None => {
                tracing::info!("no default scene set");
                return SwitchOutcome::NoTarget;
            }
            Some(RestoreTarget::LastScene) => match &self.state.last_active_scene {
                Some(scene) => {
                    tracing::info!(scene = %scene.name, "switching to last scene");
                    scene.name.clone()
                }
                None => {
                    tracing::warn!("no last scene to switch to");
                    return SwitchOutcome::NoLastScene;
                }
            },
            Some(RestoreTarget::Named(name)) => {
                tracing::info!(scene = %name, "switching to default scene");
                name.clone()
            }
        };

        self.switch_to(&name).await
    }

    /// Lists the host's scenes and warns about configured names it lacks.
    pub async fn check_configured_scenes(&mut self) -> Result<Vec<String>, ActuatorError> {
        let names: Vec<String> = self
            .actuator
            .list_scenes()
            .await?
            .into_iter()
            .map(|scene| scene.name)
            .collect();

        tracing::info!(scenes = ?names, "host scenes available");

        let settings = &self.state.settings;
        let configured = settings.loading_scene.iter().chain(
            settings
                .default_scene
                .iter()
                .filter_map(|target| match target {
                    RestoreTarget::Named(name) => Some(name),
                    RestoreTarget::LastScene => None,
                }),
        );
        for name in configured {
            if !names.contains(name) {
                tracing::warn!(scene = %name, "configured scene not found in host");
            }
        }

        Ok(names)
    }

    async fn switch_to(&mut self, name: &str) -> SwitchOutcome {
        let scenes = match self.actuator.list_scenes().await {
            Ok(scenes) => scenes,
            Err(e) => {
                tracing::warn!(scene = %name, error = %e, "failed to list scenes");
                return SwitchOutcome::Failed(e.to_string());
            }
        };

        let Some(scene) = scenes.into_iter().find(|scene| scene.name == name) else {
            tracing::warn!(scene = %name, "scene not found");
            return SwitchOutcome::NotFound(name.to_string());
        };

        match self.actuator.set_active_scene(&scene).await {
            Ok(()) => {
                tracing::info!(scene = %scene.name, "scene switched");
                SwitchOutcome::Switched(scene.name)
            }
            Err(e) => {
                tracing::warn!(scene = %scene.name, error = %e, "failed to switch scene");
                SwitchOutcome::Failed(e.to_string())
            }
        }
    }
}
