use super::*;
use crate::audio::PlaybackElement;
use crate::picker::PickerError;
use std::path::{Path, PathBuf};
use std::time::{Duration, Instant};

#[derive(Debug, Clone, PartialEq)]
enum Call {
    Load(PathBuf),
    Play,
    Pause,
    Seek(f64),
    SetVolume(f64),
}

/// Records every command and serves scripted time/duration values.
#[derive(Debug, Default)]
struct FakeElement {
    calls: Vec<Call>,
    time: f64,
    duration: Option<f64>,
    volume: f64,
    playing: bool,
    generation: u64,
}

impl PlaybackElement for FakeElement {
    fn load(&mut self, path: &Path) {
        self.calls.push(Call::Load(path.to_path_buf()));
        self.playing = false;
        self.generation += 1;
    }

    fn play(&mut self) {
        self.calls.push(Call::Play);
        self.playing = true;
    }

    fn pause(&mut self) {
        self.calls.push(Call::Pause);
        self.playing = false;
    }

    fn seek(&mut self, seconds: f64) {
        self.calls.push(Call::Seek(seconds));
        self.time = seconds;
    }

    fn volume(&self) -> f64 {
        self.volume
    }

    fn set_volume(&mut self, gain: f64) {
        self.calls.push(Call::SetVolume(gain));
        self.volume = gain;
    }

    fn current_time(&self) -> f64 {
        self.time
    }

    fn duration(&self) -> Option<f64> {
        self.duration
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}

const NOTICE: Duration = Duration::from_secs(3);

fn app() -> App<FakeElement> {
    App::new(FakeElement::default(), 70, NOTICE)
}

fn app_with(paths: &[&str]) -> App<FakeElement> {
    let mut app = app();
    app.add_tracks(paths.iter().copied());
    app
}

fn names(app: &App<FakeElement>) -> Vec<&str> {
    app.playlist().iter().map(|t| t.name.as_str()).collect()
}

#[test]
fn new_applies_default_volume_before_any_track() {
    let app = app();
    assert_eq!(app.view().volume, 70.0);
    assert!((app.element().volume() - 0.7).abs() < 1e-9);
    assert_eq!(app.element().calls, vec![Call::SetVolume(0.7)]);
    assert_eq!(app.current(), None);
    assert!(!app.is_playing());
    assert_eq!(app.view().title, "");
    assert_eq!(app.view().play_button, PlayButton::Paused);
}

#[test]
fn first_selection_loads_and_plays_first_track() {
    let app = app_with(&["/music/a.mp3", "/music/b.wav"]);

    assert_eq!(names(&app), vec!["a.mp3", "b.wav"]);
    assert_eq!(app.current(), Some(0));
    assert!(app.is_playing());
    assert_eq!(app.view().title, "a.mp3");
    assert_eq!(app.view().subtitle, "Track 1 of 2");
    assert_eq!(app.view().play_button, PlayButton::Playing);
    assert_eq!(
        app.view().rows,
        vec![
            PlaylistRow {
                name: "a.mp3".into(),
                active: true
            },
            PlaylistRow {
                name: "b.wav".into(),
                active: false
            },
        ]
    );
    assert_eq!(
        app.element().calls[1..],
        [Call::Load(PathBuf::from("/music/a.mp3")), Call::Play]
    );
}

#[test]
fn later_selections_append_without_changing_active_track() {
    let mut app = app_with(&["/music/a.mp3"]);
    app.play_next(); // still index 0 with one track
    app.add_tracks(["/music/b.mp3", "/music/a.mp3"]);

    assert_eq!(names(&app), vec!["a.mp3", "b.mp3", "a.mp3"]);
    assert_eq!(app.current(), Some(0));
    assert_eq!(app.view().rows.len(), 3);
    assert!(app.view().rows[0].active);
    // Subtitle is only refreshed on load.
    assert_eq!(app.view().subtitle, "Track 1 of 1");
}

#[test]
fn playlist_length_is_total_of_all_batches_in_order() {
    let mut app = app();
    let batches: [&[&str]; 4] = [&[], &["/x/1.mp3", "/x/2.mp3"], &["/x/1.mp3"], &["C:\\y\\3.flac"]];
    let mut expected = Vec::new();
    for batch in batches {
        app.add_tracks(batch.iter().copied());
        expected.extend(batch.iter().map(|p| crate::library::display_name(p)));
    }
    assert_eq!(app.playlist().len(), 4);
    assert_eq!(names(&app), expected);
}

#[test]
fn empty_selection_is_a_no_op() {
    let mut app = app();
    app.add_tracks(Vec::<PathBuf>::new());
    assert!(app.playlist().is_empty());
    assert_eq!(app.current(), None);
    assert!(!app.is_playing());
    assert_eq!(app.element().calls, vec![Call::SetVolume(0.7)]);
}

#[test]
fn load_track_out_of_range_leaves_state_unchanged() {
    let mut app = app_with(&["/a.mp3", "/b.mp3"]);
    app.pause();
    let calls = app.element().calls.len();
    let view = app.view().clone();

    app.load_track(2);
    app.load_track(usize::MAX);

    assert_eq!(app.current(), Some(0));
    assert!(!app.is_playing());
    assert_eq!(app.element().calls.len(), calls);
    assert_eq!(app.view(), &view);
}

#[test]
fn load_track_updates_title_subtitle_rows_and_plays() {
    let mut app = app_with(&["/a.mp3", "/b.mp3", "/c.mp3"]);
    app.pause();
    app.load_track(1);

    assert_eq!(app.current(), Some(1));
    assert!(app.is_playing());
    assert_eq!(app.view().title, "b.mp3");
    assert_eq!(app.view().subtitle, "Track 2 of 3");
    let active: Vec<bool> = app.view().rows.iter().map(|r| r.active).collect();
    assert_eq!(active, vec![false, true, false]);
    assert_eq!(app.cursor(), 1);
    assert_eq!(
        app.element().calls[app.element().calls.len() - 2..],
        [Call::Load(PathBuf::from("/b.mp3")), Call::Play]
    );
}

#[test]
fn play_next_wraps_from_last_to_first() {
    let mut app = app_with(&["/a.mp3", "/b.mp3", "/c.mp3"]);
    app.load_track(2);
    app.play_next();
    assert_eq!(app.current(), Some(0));
    assert_eq!(app.view().subtitle, "Track 1 of 3");
    assert_eq!(app.view().title, "a.mp3");
}

#[test]
fn play_previous_wraps_from_first_to_last() {
    let mut app = app_with(&["/a.mp3", "/b.mp3", "/c.mp3"]);
    app.play_previous();
    assert_eq!(app.current(), Some(2));
    app.play_previous();
    assert_eq!(app.current(), Some(1));
}

#[test]
fn navigation_is_a_no_op_on_empty_playlist() {
    let mut app = app();
    app.play_next();
    app.play_previous();
    app.on_track_finished();
    app.play();
    assert_eq!(app.current(), None);
    assert!(!app.is_playing());
    assert_eq!(app.element().calls, vec![Call::SetVolume(0.7)]);
}

#[test]
fn track_finished_advances_with_wraparound() {
    let mut app = app_with(&["/a.mp3", "/b.mp3"]);
    app.on_track_finished();
    assert_eq!(app.current(), Some(1));
    app.on_track_finished();
    assert_eq!(app.current(), Some(0));
    assert!(app.is_playing());
}

#[test]
fn toggle_playback_alternates_and_pairs_cancel_out() {
    let mut app = app_with(&["/a.mp3"]);
    assert!(app.is_playing());

    app.toggle_playback();
    assert!(!app.is_playing());
    assert_eq!(app.view().play_button, PlayButton::Paused);

    app.toggle_playback();
    assert!(app.is_playing());
    assert_eq!(app.view().play_button, PlayButton::Playing);
    assert!(app.element().playing);
}

#[test]
fn play_pause_play_matches_single_play() {
    let mut a = app_with(&["/a.mp3"]);
    a.pause();
    a.play();
    a.pause();
    a.play();

    let mut b = app_with(&["/a.mp3"]);
    b.pause();
    b.play();

    assert_eq!(a.is_playing(), b.is_playing());
    assert_eq!(a.element().playing, b.element().playing);
    assert_eq!(a.view(), b.view());
}

#[test]
fn selection_failure_shows_notice_then_restores_title() {
    let t0 = Instant::now();
    let mut app = app_with(&["/music/a.mp3"]);

    app.apply_selection(Err(PickerError::Aborted), t0);
    assert_eq!(app.view().title, SELECTION_ERROR_TEXT);
    assert_eq!(app.view().title, "Error adding songs");
    assert_eq!(app.playlist().len(), 1);

    app.tick(t0 + Duration::from_millis(2999));
    assert_eq!(app.view().title, "Error adding songs");

    app.tick(t0 + NOTICE);
    assert_eq!(app.view().title, "a.mp3");
    assert_eq!(app.view().notice_until, None);
}

#[test]
fn selection_failure_restores_empty_title_when_nothing_loaded() {
    let t0 = Instant::now();
    let mut app = app();
    app.apply_selection(Err(PickerError::Unavailable("headless".into())), t0);
    assert_eq!(app.view().title, "Error adding songs");
    assert!(app.playlist().is_empty());

    app.tick(t0 + Duration::from_secs(4));
    assert_eq!(app.view().title, "");
}

#[test]
fn loading_a_track_ends_the_notice() {
    let t0 = Instant::now();
    let mut app = app_with(&["/music/a.mp3", "/music/b.mp3"]);

    app.apply_selection(Err(PickerError::Aborted), t0);
    assert!(app.view().notice_until.is_some());

    app.play_next();
    assert_eq!(app.view().title, "b.mp3");
    assert_eq!(app.view().notice_until, None);

    app.tick(t0 + NOTICE);
    assert_eq!(app.view().title, "b.mp3");
}

#[test]
fn every_load_bumps_the_element_generation() {
    let mut app = app_with(&["/music/a.mp3", "/music/b.mp3"]);
    assert_eq!(app.element().generation(), 1);

    app.play_next();
    app.load_track(7);
    assert_eq!(app.element().generation(), 2);
}

#[test]
fn successful_selection_goes_through_add_tracks() {
    let mut app = app();
    app.apply_selection(
        Ok(vec![PathBuf::from("/music/a.mp3"), PathBuf::from("/music/b.wav")]),
        Instant::now(),
    );
    assert_eq!(names(&app), vec!["a.mp3", "b.wav"]);
    assert_eq!(app.current(), Some(0));
}

#[test]
fn seek_to_converts_percent_to_seconds() {
    let mut app = app_with(&["/a.mp3"]);
    app.element_mut().duration = Some(200.0);
    app.seek_to(50.0);
    assert_eq!(app.element().calls.last(), Some(&Call::Seek(100.0)));
    assert_eq!(app.view().progress, 50.0);
    assert_eq!(app.view().elapsed, "1:40");
}

#[test]
fn seek_to_clamps_and_ignores_unknown_duration() {
    let mut app = app_with(&["/a.mp3"]);
    let calls = app.element().calls.len();
    app.seek_to(50.0);
    assert_eq!(app.element().calls.len(), calls);

    app.element_mut().duration = Some(200.0);
    app.seek_to(150.0);
    assert_eq!(app.element().calls.last(), Some(&Call::Seek(200.0)));
    app.seek_to(-10.0);
    assert_eq!(app.element().calls.last(), Some(&Call::Seek(0.0)));
}

#[test]
fn seek_by_moves_relative_to_scrubber() {
    let mut app = app_with(&["/a.mp3"]);
    app.element_mut().duration = Some(100.0);
    app.seek_to(25.0);
    app.seek_by(25.0);
    assert_eq!(app.element().calls.last(), Some(&Call::Seek(50.0)));
}

#[test]
fn set_volume_normalizes_and_clamps() {
    let mut app = app();
    app.set_volume(25.0);
    assert_eq!(app.element().calls.last(), Some(&Call::SetVolume(0.25)));
    assert_eq!(app.view().volume, 25.0);

    app.set_volume(250.0);
    assert_eq!(app.element().calls.last(), Some(&Call::SetVolume(1.0)));

    app.volume_by(-5.0);
    assert_eq!(app.view().volume, 95.0);
}

#[test]
fn progress_tick_requires_known_duration() {
    let mut app = app_with(&["/a.mp3"]);
    app.element_mut().time = 30.0;
    app.on_progress_tick();
    assert_eq!(app.view().progress, 0.0);
    assert_eq!(app.view().elapsed, "0:00");

    app.element_mut().duration = Some(120.0);
    app.on_progress_tick();
    assert_eq!(app.view().progress, 25.0);
    assert_eq!(app.view().elapsed, "0:30");
}

#[test]
fn metadata_loaded_formats_duration_label() {
    let mut app = app_with(&["/a.mp3"]);
    app.on_metadata_loaded();
    assert_eq!(app.view().duration, "0:00");

    app.element_mut().duration = Some(245.7);
    app.on_metadata_loaded();
    assert_eq!(app.view().duration, "4:05");
}

#[test]
fn format_time_examples() {
    assert_eq!(format_time(0.0), "0:00");
    assert_eq!(format_time(65.0), "1:05");
    assert_eq!(format_time(125.0), "2:05");
    assert_eq!(format_time(59.9), "0:59");
    assert_eq!(format_time(3600.0), "60:00");
    assert_eq!(format_time(f64::NAN), "0:00");
    assert_eq!(format_time(f64::INFINITY), "0:00");
    assert_eq!(format_time(-4.0), "0:00");
}

#[test]
fn cursor_wraps_and_activates_entry() {
    let mut app = app_with(&["/a.mp3", "/b.mp3", "/c.mp3"]);
    assert_eq!(app.cursor(), 0);
    app.cursor_up();
    assert_eq!(app.cursor(), 2);
    app.cursor_down();
    assert_eq!(app.cursor(), 0);
    app.cursor_bottom();
    app.activate_cursor();
    assert_eq!(app.current(), Some(2));
    app.cursor_top();
    assert_eq!(app.cursor(), 0);
}
