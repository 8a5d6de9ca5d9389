use std::{env, path::PathBuf};

use ::config::FileFormat;

use super::schema::Settings;
use crate::library::normalize_extensions;

/// Configuration loading helpers.
///
/// `Settings::load` reads an optional config file, then lets environment variables
/// (prefix `CADENZA__`) override it, and falls back to struct defaults.
impl Settings {
    /// Load settings from environment and optional config file.
    pub fn load() -> Result<Self, ::config::ConfigError> {
        let config_path = resolve_config_path();

        let mut builder = ::config::Config::builder();

        if let Some(path) = &config_path {
            builder = builder.add_source(
                ::config::File::from(path.as_path())
                    .format(FileFormat::Toml)
                    .required(false),
            );
        }

        builder = builder.add_source(
            ::config::Environment::with_prefix("CADENZA")
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build()?;
        let settings: Settings = cfg.try_deserialize()?;
        Ok(settings)
    }

    /// Perform basic validation checks on loaded settings.
    pub fn validate(&self) -> Result<(), String> {
        if self.audio.default_volume > 100 {
            return Err("audio.default_volume must be <= 100".to_string());
        }
        if self.audio.tick_interval_ms == 0 {
            return Err("audio.tick_interval_ms must be >= 1".to_string());
        }
        if self.ui.notice_ms == 0 {
            return Err("ui.notice_ms must be >= 1".to_string());
        }
        if !(self.controls.seek_step_percent > 0.0 && self.controls.seek_step_percent <= 100.0) {
            return Err("controls.seek_step_percent must be in (0, 100]".to_string());
        }
        if normalize_extensions(&self.picker.extensions).is_empty() {
            return Err("picker.extensions must name at least one extension".to_string());
        }
        Ok(())
    }
}

/// Resolve the config path from `CADENZA_CONFIG_PATH` or XDG defaults.
pub fn resolve_config_path() -> Option<PathBuf> {
    if let Some(p) = env::var_os("CADENZA_CONFIG_PATH") {
        return Some(PathBuf::from(p));
    }
    default_config_path()
}

/// Compute the default config path under `$XDG_CONFIG_HOME/cadenza/config.toml`
/// or `~/.config/cadenza/config.toml` when `XDG_CONFIG_HOME` is not set.
pub fn default_config_path() -> Option<PathBuf> {
    let config_home = if let Some(xdg) = env::var_os("XDG_CONFIG_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".config"))
    };

    config_home.map(|d| d.join("cadenza").join("config.toml"))
}

/// Compute the default log file under `$XDG_STATE_HOME/cadenza/cadenza.log`
/// or `~/.local/state/cadenza/cadenza.log`.
pub fn default_log_path() -> Option<PathBuf> {
    let state_home = if let Some(xdg) = env::var_os("XDG_STATE_HOME") {
        Some(PathBuf::from(xdg))
    } else {
        env::var_os("HOME").map(|home| PathBuf::from(home).join(".local").join("state"))
    };

    state_home.map(|d| d.join("cadenza").join("cadenza.log"))
}
