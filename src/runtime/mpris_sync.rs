use crate::app::App;
use crate::audio::PlaybackElement;
use crate::mpris::{MprisHandle, PlaybackStatus};

pub fn playback_status<E: PlaybackElement>(app: &App<E>) -> PlaybackStatus {
    match (app.current(), app.is_playing()) {
        (None, _) => PlaybackStatus::Stopped,
        (Some(_), true) => PlaybackStatus::Playing,
        (Some(_), false) => PlaybackStatus::Paused,
    }
}

pub fn update_mpris<E: PlaybackElement>(mpris: &MprisHandle, app: &App<E>) {
    let duration = app.element().duration();
    mpris.set_track_metadata(app.current(), app.current_track(), duration);
    mpris.set_status(playback_status(app));
}

/// Pushes controller state to MPRIS only when something it exposes changed.
#[derive(Debug, Default)]
pub struct MprisSync {
    /// Active index, status and duration bits last pushed.
    last: Option<(Option<usize>, PlaybackStatus, Option<u64>)>,
}

impl MprisSync {
    /// Returns `true` when the handle was updated.
    pub fn sync<E: PlaybackElement>(&mut self, mpris: &MprisHandle, app: &App<E>) -> bool {
        let snapshot = (
            app.current(),
            playback_status(app),
            app.element().duration().map(f64::to_bits),
        );
        if self.last == Some(snapshot) {
            return false;
        }
        update_mpris(mpris, app);
        self.last = Some(snapshot);
        true
    }
}
