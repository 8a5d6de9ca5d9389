//! The playback controller.
//!
//! `App` is the single authority over the playlist, the active track and the
//! play/pause state. It drives one `PlaybackElement` and keeps `View` in step
//! with every change.

use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

use log::{debug, info, warn};

use crate::audio::PlaybackElement;
use crate::library::{Playlist, Track};
use crate::picker::PickerError;

use super::view::{PlayButton, PlaylistRow, View, format_time};

/// Title shown while a failed file selection is being reported.
pub const SELECTION_ERROR_TEXT: &str = "Error adding songs";

/// The main application model.
pub struct App<E: PlaybackElement> {
    element: E,
    playlist: Playlist,
    current: Option<usize>,
    playing: bool,
    view: View,
    /// Keyboard cursor in the playlist listing.
    cursor: usize,
    notice_duration: Duration,
}

impl<E: PlaybackElement> App<E> {
    /// Create an empty controller and apply the initial volume to both the
    /// slider and the element.
    pub fn new(element: E, default_volume: u8, notice_duration: Duration) -> Self {
        let mut app = Self {
            element,
            playlist: Playlist::new(),
            current: None,
            playing: false,
            view: View::default(),
            cursor: 0,
            notice_duration,
        };
        app.set_volume(f64::from(default_volume));
        app
    }

    pub fn view(&self) -> &View {
        &self.view
    }

    pub fn playlist(&self) -> &Playlist {
        &self.playlist
    }

    /// Index of the active track, `None` before anything was loaded.
    pub fn current(&self) -> Option<usize> {
        self.current
    }

    pub fn current_track(&self) -> Option<&Track> {
        self.current.and_then(|i| self.playlist.get(i))
    }

    pub fn is_playing(&self) -> bool {
        self.playing
    }

    pub fn cursor(&self) -> usize {
        self.cursor
    }

    pub fn element(&self) -> &E {
        &self.element
    }

    pub fn element_mut(&mut self) -> &mut E {
        &mut self.element
    }

    /// Append tracks for `paths`, in order.
    ///
    /// The very first non-empty selection starts playing its first track;
    /// later additions leave the active track alone.
    pub fn add_tracks<I, P>(&mut self, paths: I)
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let was_empty = self.playlist.is_empty() && self.current.is_none();

        let before = self.playlist.len();
        for path in paths {
            self.playlist.push(Track::from_path(path));
        }
        debug!(
            "added {} tracks, playlist has {}",
            self.playlist.len() - before,
            self.playlist.len()
        );

        self.render_playlist();

        if was_empty && !self.playlist.is_empty() {
            self.load_track(0);
        }
    }

    /// Report a failed selection: the title shows a fixed message until the
    /// notice expires (see [`App::tick`]). The playlist is not touched.
    pub fn selection_failed(&mut self, err: &PickerError, now: Instant) {
        warn!("failed to add songs: {err}");
        self.view.title = SELECTION_ERROR_TEXT.to_string();
        self.view.notice_until = Some(now + self.notice_duration);
    }

    /// Fold the outcome of a file selection into the playlist.
    pub fn apply_selection(&mut self, result: Result<Vec<PathBuf>, PickerError>, now: Instant) {
        match result {
            Ok(paths) => self.add_tracks(paths),
            Err(e) => self.selection_failed(&e, now),
        }
    }

    /// Expire the transient notice, restoring the active track's name.
    pub fn tick(&mut self, now: Instant) {
        if self.view.notice_until.is_some_and(|until| now >= until) {
            self.view.notice_until = None;
            self.view.title = self
                .current_track()
                .map(|t| t.name.clone())
                .unwrap_or_default();
        }
    }

    /// Make `index` the active track and start playing it.
    ///
    /// Out-of-range indices are ignored.
    pub fn load_track(&mut self, index: usize) {
        let Some(track) = self.playlist.get(index) else {
            return;
        };
        let path = track.path.clone();
        let name = track.name.clone();

        self.current = Some(index);
        self.cursor = index;
        self.element.load(&path);
        info!("loading track {} of {}: {}", index + 1, self.playlist.len(), path.display());

        // The title now names the track, not a pending notice.
        self.view.notice_until = None;
        self.view.title = name;
        self.view.subtitle = format!("Track {} of {}", index + 1, self.playlist.len());
        self.view.progress = 0.0;
        self.view.elapsed = format_time(0.0);
        self.view.duration = format_time(0.0);

        self.render_playlist();
        self.play();
    }

    pub fn toggle_playback(&mut self) {
        if self.playing {
            self.pause();
        } else {
            self.play();
        }
    }

    pub fn play(&mut self) {
        if self.playlist.is_empty() {
            return;
        }
        self.element.play();
        self.playing = true;
        self.view.play_button = PlayButton::Playing;
    }

    pub fn pause(&mut self) {
        self.element.pause();
        self.playing = false;
        self.view.play_button = PlayButton::Paused;
    }

    /// Load the next track, wrapping from the last to the first.
    pub fn play_next(&mut self) {
        let len = self.playlist.len();
        if len == 0 {
            return;
        }
        let next = self.current.map_or(0, |i| (i + 1) % len);
        self.load_track(next);
    }

    /// Load the previous track, wrapping from the first to the last.
    pub fn play_previous(&mut self) {
        let len = self.playlist.len();
        if len == 0 {
            return;
        }
        let prev = match self.current {
            Some(i) if i > 0 => i - 1,
            _ => len - 1,
        };
        self.load_track(prev);
    }

    /// Auto-advance when the element reports the end of the source.
    pub fn on_track_finished(&mut self) {
        debug!("track finished");
        self.play_next();
    }

    pub fn on_progress_tick(&mut self) {
        let Some(duration) = self.known_duration() else {
            return;
        };
        let current = self.element.current_time();
        self.view.progress = current / duration * 100.0;
        self.view.elapsed = format_time(current);
    }

    pub fn on_metadata_loaded(&mut self) {
        self.view.duration = format_time(self.element.duration().unwrap_or(f64::NAN));
    }

    /// The element could not open or decode `path`. Playback state is kept;
    /// the user can skip on.
    pub fn on_playback_failed(&mut self, path: &Path, reason: &str) {
        warn!("cannot play {}: {reason}", path.display());
    }

    /// Jump to `percent` of the active track.
    ///
    /// The percentage is clamped to 0-100. Without a known duration there is
    /// no target to compute, so the request is dropped.
    pub fn seek_to(&mut self, percent: f64) {
        let Some(duration) = self.known_duration() else {
            debug!("seek ignored, duration unknown");
            return;
        };
        let percent = clamp_percent(percent);
        let seconds = percent / 100.0 * duration;
        self.element.seek(seconds);
        self.view.progress = percent;
        self.view.elapsed = format_time(seconds);
    }

    /// Set the volume slider to `percent` (clamped to 0-100) and apply the
    /// matching gain.
    pub fn set_volume(&mut self, percent: f64) {
        let percent = clamp_percent(percent);
        self.element.set_volume(percent / 100.0);
        self.view.volume = percent;
    }

    pub fn seek_by(&mut self, delta_percent: f64) {
        self.seek_to(self.view.progress + delta_percent);
    }

    pub fn volume_by(&mut self, delta_percent: f64) {
        self.set_volume(self.view.volume + delta_percent);
    }

    pub fn cursor_down(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.cursor = (self.cursor + 1) % len;
        }
    }

    pub fn cursor_up(&mut self) {
        let len = self.playlist.len();
        if len > 0 {
            self.cursor = if self.cursor == 0 { len - 1 } else { self.cursor - 1 };
        }
    }

    pub fn cursor_top(&mut self) {
        self.cursor = 0;
    }

    pub fn cursor_bottom(&mut self) {
        self.cursor = self.playlist.len().saturating_sub(1);
    }

    /// Select the entry under the cursor, as a click on it would.
    pub fn activate_cursor(&mut self) {
        self.load_track(self.cursor);
    }

    fn known_duration(&self) -> Option<f64> {
        self.element
            .duration()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    fn render_playlist(&mut self) {
        self.view.rows = self
            .playlist
            .iter()
            .enumerate()
            .map(|(i, t)| PlaylistRow {
                name: t.name.clone(),
                active: Some(i) == self.current,
            })
            .collect();
    }
}

fn clamp_percent(percent: f64) -> f64 {
    if percent.is_nan() {
        0.0
    } else {
        percent.clamp(0.0, 100.0)
    }
}
