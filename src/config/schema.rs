use std::path::PathBuf;

use serde::Deserialize;

/// Top-level application settings loaded from `config.toml`.
///
/// File format: TOML
/// Default path (Linux/XDG): `$XDG_CONFIG_HOME/cadenza/config.toml` or `~/.config/cadenza/config.toml`
///
/// Precedence (highest wins):
/// 1) Environment variables (prefix `CADENZA__`, `__` as nested separator)
/// 2) Config file (if present)
/// 3) Struct defaults
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub audio: AudioSettings,
    pub ui: UiSettings,
    pub controls: ControlsSettings,
    pub picker: PickerSettings,
    pub library: LibrarySettings,
    pub logging: LoggingSettings,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AudioSettings {
    /// Volume applied on startup, in percent (0-100).
    pub default_volume: u8,
    /// Fade-out duration when quitting (milliseconds).
    /// Set to 0 to stop immediately.
    pub quit_fade_out_ms: u64,
    /// How often the audio thread reports progress while playing (milliseconds).
    pub tick_interval_ms: u64,
}

impl Default for AudioSettings {
    fn default() -> Self {
        Self {
            default_volume: 70,
            quit_fade_out_ms: 300,
            tick_interval_ms: 250,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct UiSettings {
    /// The text rendered inside the top header box.
    pub header_text: String,
    /// How long transient messages (e.g. a failed file selection) replace the
    /// title, in milliseconds.
    pub notice_ms: u64,
}

impl Default for UiSettings {
    fn default() -> Self {
        Self {
            header_text: " ~ cadenza ~ ".to_string(),
            notice_ms: 3000,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ControlsSettings {
    /// Scrubber step for `H` / `L`, in percent of the track.
    pub seek_step_percent: f64,
    /// Volume step for `+` / `-`, in percent.
    pub volume_step: u8,
}

impl Default for ControlsSettings {
    fn default() -> Self {
        Self {
            seek_step_percent: 5.0,
            volume_step: 5,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PickerSettings {
    /// Extensions offered by the "add songs" dialog (case-insensitive, without dot).
    pub extensions: Vec<String>,
    /// Allow selecting several files at once.
    pub multiple: bool,
    /// Directory the dialog opens in.
    pub start_dir: Option<PathBuf>,
}

impl Default for PickerSettings {
    fn default() -> Self {
        Self {
            extensions: vec![
                "mp3".into(),
                "wav".into(),
                "ogg".into(),
                "m4a".into(),
                "flac".into(),
            ],
            multiple: true,
            start_dir: None,
        }
    }
}

/// Controls how directories passed on the command line are expanded.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LibrarySettings {
    /// Whether to recurse into subdirectories.
    pub recursive: bool,
    /// Whether to follow symlinks during scanning.
    pub follow_links: bool,
    /// Whether to include hidden files/directories (dotfiles).
    pub include_hidden: bool,
}

impl Default for LibrarySettings {
    fn default() -> Self {
        Self {
            recursive: true,
            follow_links: true,
            include_hidden: false,
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LoggingSettings {
    /// One of `off`, `error`, `warn`, `info`, `debug`, `trace`.
    pub level: String,
    /// Log file; defaults to `$XDG_STATE_HOME/cadenza/cadenza.log`.
    pub file: Option<PathBuf>,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            file: None,
        }
    }
}
