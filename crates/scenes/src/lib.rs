//! Scene switching for loading transitions.
//!
//! [`SceneSwitcher`] reacts to loading transitions by asking a
//! [`SceneActuator`] (the host's scene API) to change the active scene, and
//! remembers the scene that was live before loading started so it can be
//! restored afterwards.

mod actuator;
mod switcher;

pub use actuator::{ActuatorError, Scene, SceneActuator};
pub use switcher::{
    LAST_SCENE_SENTINEL, RestoreTarget, SceneSwitcher, SwitchOutcome, SwitcherSettings,
    SwitcherState,
};
