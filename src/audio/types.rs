//! Audio-related small types and handles.
//!
//! This module defines the capability contract the controller drives
//! (`PlaybackElement`), the commands and notifications exchanged with the
//! audio thread, and the shared snapshot the getters read from.

use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use thiserror::Error;

/// An opaque decode/output primitive playing one source at a time.
///
/// Times are in seconds and volume is a normalized 0.0-1.0 gain. Loading a
/// bad path does not fail here; the element reports it later through
/// [`MediaEventKind::Failed`].
pub trait PlaybackElement {
    /// Replace the current source with `path`. The new source starts paused.
    fn load(&mut self, path: &Path);
    fn play(&mut self);
    /// Stop output, keeping the position.
    fn pause(&mut self);
    fn seek(&mut self, seconds: f64);
    fn volume(&self) -> f64;
    fn set_volume(&mut self, gain: f64);
    fn current_time(&self) -> f64;
    /// Total length of the loaded source, `None` until its metadata is known.
    fn duration(&self) -> Option<f64>;
    /// Counter bumped by every `load`. Events stamped with an older value
    /// belong to a source that has since been replaced.
    fn generation(&self) -> u64;
}

/// A notification from the audio thread, tagged with the load it belongs to.
#[derive(Debug, Clone, PartialEq)]
pub struct MediaEvent {
    pub generation: u64,
    pub kind: MediaEventKind,
}

impl MediaEvent {
    pub fn new(generation: u64, kind: MediaEventKind) -> Self {
        Self { generation, kind }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum MediaEventKind {
    /// Position advanced (fired repeatedly while playing, and after a seek).
    TimeUpdate,
    /// The duration of the loaded source became known.
    MetadataLoaded,
    /// The source played to its end.
    Ended,
    /// The source could not be opened or decoded.
    Failed { path: PathBuf, reason: String },
}

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source with the file at the given path.
    Load { path: PathBuf, generation: u64 },
    /// Start or resume output.
    Play,
    /// Pause output, keeping the position.
    Pause,
    /// Jump to an absolute position.
    Seek(Duration),
    /// Apply a normalized gain.
    SetVolume(f32),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to decode {}: {reason}", path.display())]
    Decode { path: PathBuf, reason: String },
    #[error("the audio thread stopped unexpectedly")]
    Disconnected,
}

#[derive(Debug, Clone)]
/// Runtime playback information shared between the audio thread and the element.
pub struct ElementInfo {
    /// Source currently loaded (if any).
    pub path: Option<PathBuf>,
    /// Playback position within the source.
    pub position: Duration,
    /// Total length, once known.
    pub duration: Option<Duration>,
    /// Normalized output gain.
    pub volume: f32,
    /// Whether output is currently running.
    pub playing: bool,
    /// Load this snapshot describes.
    pub generation: u64,
}

impl Default for ElementInfo {
    fn default() -> Self {
        Self {
            path: None,
            position: Duration::ZERO,
            duration: None,
            volume: 1.0,
            playing: false,
            generation: 0,
        }
    }
}

pub type ElementHandle = Arc<Mutex<ElementInfo>>;

/// Convert a seconds value coming from the UI into a `Duration`.
///
/// Negative and NaN inputs map to zero, infinities saturate.
pub fn seconds_to_duration(seconds: f64) -> Duration {
    if seconds.is_nan() || seconds <= 0.0 {
        return Duration::ZERO;
    }
    Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX)
}
