//! Service configuration.
//!
//! Configuration is stored as TOML:
//! - Linux: `~/.config/loadscene/config.toml`
//! - Windows: `%APPDATA%/loadscene/config.toml`
//!
//! `LOADSCENE_CONFIG` overrides the location.

use std::path::{Path, PathBuf};
use std::time::Duration;

use loadscene_scenes::{RestoreTarget, SwitcherSettings};
use serde::{Deserialize, Serialize};

/// Shortest allowed tail interval.
pub const MIN_UPDATE_INTERVAL_MS: u64 = 500;
/// Longest allowed tail interval.
pub const MAX_UPDATE_INTERVAL_MS: u64 = 10_000;

/// Service configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Directory holding the companion app's `output_log*` files.
    #[serde(default = "default_log_folder")]
    pub log_folder: String,

    /// Scene shown while loading.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene: Option<String>,

    /// Scene restored after loading, or `"Last Scene"`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_scene: Option<String>,

    /// Log polling period in milliseconds, clamped to 500..=10000.
    #[serde(default = "default_update_interval_ms")]
    pub update_interval_ms: u64,

    /// Master switch for scene changes.
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// Executable name of the companion app.
    #[serde(default = "default_process_name")]
    pub process_name: String,

    #[serde(default)]
    pub obs: ObsConfig,
}

/// OBS WebSocket connection settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ObsConfig {
    #[serde(default = "default_obs_url")]
    pub url: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub password: Option<String>,
}

impl Default for ObsConfig {
    fn default() -> Self {
        Self {
            url: default_obs_url(),
            password: None,
        }
    }
}

fn default_log_folder() -> String {
    #[cfg(windows)]
    {
        // LOCALAPPDATA ends in "Local"; the log lives under the sibling "LocalLow".
        let local = std::env::var("LOCALAPPDATA").unwrap_or_default();
        format!("{local}Low\\VRChat\\VRChat\\")
    }

    #[cfg(not(windows))]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        format!(
            "{home}/.local/share/Steam/steamapps/compatdata/438100/pfx/drive_c/users/steamuser/AppData/LocalLow/VRChat/VRChat/"
        )
    }
}

fn default_update_interval_ms() -> u64 {
    1500
}

fn default_true() -> bool {
    true
}

fn default_process_name() -> String {
    loadscene_presence::COMPANION_PROCESS_NAME.into()
}

fn default_obs_url() -> String {
    loadscene_obs::DEFAULT_URL.into()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            log_folder: default_log_folder(),
            scene: None,
            default_scene: None,
            update_interval_ms: default_update_interval_ms(),
            enabled: default_true(),
            process_name: default_process_name(),
            obs: ObsConfig::default(),
        }
    }
}

impl Config {
    /// Loads the configuration at `path`, writing defaults if it does not exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if path.exists() {
            Self::load_from(path)
        } else {
            let config = Config::default();
            config.save(path)?;
            tracing::info!(path = %path.display(), "wrote default configuration");
            Ok(config)
        }
    }

    /// Parses the configuration file at `path`.
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&content)?)
    }

    /// Writes the configuration to `path`.
    pub fn save(&self, path: &Path) -> anyhow::Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(path, content)?;

        // May hold the OBS password.
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o600))?;
        }

        tracing::debug!(path = %path.display(), "configuration saved");
        Ok(())
    }

    /// Tail polling period, clamped into the supported range.
    pub fn update_interval(&self) -> Duration {
        Duration::from_millis(
            self.update_interval_ms
                .clamp(MIN_UPDATE_INTERVAL_MS, MAX_UPDATE_INTERVAL_MS),
        )
    }

    /// Scene switching settings; empty scene names count as unset.
    pub fn switcher_settings(&self) -> SwitcherSettings {
        SwitcherSettings {
            loading_scene: self.scene.clone().filter(|name| !name.is_empty()),
            default_scene: self.default_scene.as_deref().and_then(RestoreTarget::parse),
            enabled: self.enabled,
        }
    }
}

/// Returns the configuration file path.
pub fn config_path() -> anyhow::Result<PathBuf> {
    if let Ok(path) = std::env::var("LOADSCENE_CONFIG") {
        return Ok(PathBuf::from(path));
    }

    #[cfg(target_os = "linux")]
    {
        let home = std::env::var("HOME").unwrap_or_else(|_| "/tmp".into());
        Ok(PathBuf::from(home)
            .join(".config")
            .join("loadscene")
            .join("config.toml"))
    }

    #[cfg(target_os = "windows")]
    {
        let appdata =
            std::env::var("APPDATA").unwrap_or_else(|_| "C:\\Users\\Default\\AppData".into());
        Ok(PathBuf::from(appdata).join("loadscene").join("config.toml"))
    }

    #[cfg(not(any(target_os = "linux", target_os = "windows")))]
    {
        Ok(PathBuf::from("/tmp/loadscene/config.toml"))
    }
}
