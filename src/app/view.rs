//! Displayed UI state.
//!
//! The controller rewrites these fields after every mutation; the terminal
//! UI only reads them.

use std::time::Instant;

/// Play/pause affordance.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlayButton {
    /// Output is stopped; the button offers "play".
    #[default]
    Paused,
    /// Output is running; the button offers "pause".
    Playing,
}

impl PlayButton {
    pub fn glyph(self) -> &'static str {
        match self {
            Self::Paused => "▶",
            Self::Playing => "⏸",
        }
    }
}

/// One rendered playlist entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PlaylistRow {
    pub name: String,
    pub active: bool,
}

#[derive(Clone, Debug, PartialEq)]
pub struct View {
    pub title: String,
    pub subtitle: String,
    pub play_button: PlayButton,
    /// Scrubber position, 0-100.
    pub progress: f64,
    pub elapsed: String,
    pub duration: String,
    /// Volume slider, 0-100.
    pub volume: f64,
    pub rows: Vec<PlaylistRow>,
    /// When set, `title` holds a transient message until this instant.
    pub notice_until: Option<Instant>,
}

impl Default for View {
    fn default() -> Self {
        Self {
            title: String::new(),
            subtitle: String::new(),
            play_button: PlayButton::Paused,
            progress: 0.0,
            elapsed: format_time(0.0),
            duration: format_time(0.0),
            volume: 0.0,
            rows: Vec::new(),
            notice_until: None,
        }
    }
}

/// Format seconds as `M:SS`, minutes unbounded.
///
/// NaN and infinities render as `0:00`; negative values count as zero.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() {
        return "0:00".to_string();
    }
    let total = seconds.max(0.0).floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}
