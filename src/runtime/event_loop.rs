use std::sync::{Arc, mpsc};
use std::time::{Duration, Instant};

use crossterm::event::{self, Event, KeyCode, KeyEvent, KeyEventKind, KeyModifiers};
use log::{debug, info};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::{MediaEvent, MediaEventKind, PlaybackElement};
use crate::config;
use crate::mpris::{ControlCmd, MprisHandle};
use crate::picker::{FilePicker, PickerOptions, PickerRequest};
use crate::runtime::mpris_sync::MprisSync;
use crate::ui;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

/// State tracked by the runtime event loop across iterations.
pub struct EventLoopState {
    /// Internal two-key prefix state used for `gg` handling.
    pub pending_gg: bool,
    picker: Arc<dyn FilePicker>,
    picker_options: PickerOptions,
    /// The open file dialog, if any. Only one runs at a time.
    pending_pick: Option<PickerRequest>,
    pub mpris_sync: MprisSync,
}

impl EventLoopState {
    pub fn new(picker: Arc<dyn FilePicker>, picker_options: PickerOptions) -> Self {
        Self {
            pending_gg: false,
            picker,
            picker_options,
            pending_pick: None,
            mpris_sync: MprisSync::default(),
        }
    }

    #[cfg(test)]
    pub fn is_picking(&self) -> bool {
        self.pending_pick.is_some()
    }

    /// Open the file dialog unless one is already showing.
    pub fn request_songs(&mut self) {
        if self.pending_pick.is_some() {
            debug!("file dialog already open");
            return;
        }
        self.pending_pick = Some(PickerRequest::spawn(
            self.picker.clone(),
            self.picker_options.clone(),
        ));
    }

    /// Hand a finished selection to the controller.
    pub fn poll_picker<E: PlaybackElement>(&mut self, app: &mut App<E>, now: Instant) {
        let Some(result) = self.pending_pick.as_ref().and_then(PickerRequest::try_result) else {
            return;
        };
        self.pending_pick = None;
        app.apply_selection(result, now);
    }
}

/// Main terminal event loop: handles input, UI drawing, element
/// notifications, file selections and MPRIS. Returns `Ok(())` when shutdown
/// is requested.
pub fn run<E: PlaybackElement>(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    settings: &config::Settings,
    app: &mut App<E>,
    media_rx: &mpsc::Receiver<MediaEvent>,
    mpris: &MprisHandle,
    control_rx: &mpsc::Receiver<ControlCmd>,
    state: &mut EventLoopState,
) -> Result<(), Box<dyn std::error::Error>> {
    loop {
        while let Ok(ev) = media_rx.try_recv() {
            handle_media_event(ev, app);
        }

        state.poll_picker(app, Instant::now());
        app.tick(Instant::now());
        state.mpris_sync.sync(mpris, app);

        terminal.draw(|f| {
            ui::draw(
                f,
                app.view(),
                app.cursor(),
                &settings.ui,
                &settings.controls,
            )
        })?;

        while let Ok(cmd) = control_rx.try_recv() {
            if handle_control_cmd(cmd, app) {
                return Ok(());
            }
        }

        if event::poll(POLL_INTERVAL)? {
            if let Event::Key(key) = event::read()? {
                if key.kind != KeyEventKind::Press {
                    continue;
                }
                if handle_key_event(key, settings, app, state) {
                    break;
                }
            }
        }
    }

    Ok(())
}

/// Route an element notification to the controller.
///
/// Events from a source that has since been replaced are dropped, so a
/// leftover `Ended` cannot skip the track that was just loaded.
pub fn handle_media_event<E: PlaybackElement>(ev: MediaEvent, app: &mut App<E>) {
    let current = app.element().generation();
    if ev.generation != current {
        debug!(
            "dropping {:?} from load {}, element is at {current}",
            ev.kind, ev.generation
        );
        return;
    }
    match ev.kind {
        MediaEventKind::TimeUpdate => app.on_progress_tick(),
        MediaEventKind::MetadataLoaded => app.on_metadata_loaded(),
        MediaEventKind::Ended => app.on_track_finished(),
        MediaEventKind::Failed { path, reason } => app.on_playback_failed(&path, &reason),
    }
}

/// Apply a media-key command. Returns `true` when the app should quit.
pub fn handle_control_cmd<E: PlaybackElement>(cmd: ControlCmd, app: &mut App<E>) -> bool {
    debug!("control command {cmd:?}");
    match cmd {
        ControlCmd::Quit => {
            info!("quit requested over MPRIS");
            return true;
        }
        ControlCmd::Play => app.play(),
        // No separate stopped state once something is loaded.
        ControlCmd::Pause | ControlCmd::Stop => app.pause(),
        ControlCmd::PlayPause => app.toggle_playback(),
        ControlCmd::Next => app.play_next(),
        ControlCmd::Prev => app.play_previous(),
    }
    false
}

/// Apply one key press. Returns `true` when the app should quit.
pub fn handle_key_event<E: PlaybackElement>(
    key: KeyEvent,
    settings: &config::Settings,
    app: &mut App<E>,
    state: &mut EventLoopState,
) -> bool {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return true;
    }

    let was_gg = std::mem::take(&mut state.pending_gg);
    match key.code {
        KeyCode::Char('q') => return true,
        KeyCode::Char('a') => state.request_songs(),
        KeyCode::Char('p') | KeyCode::Char(' ') => app.toggle_playback(),
        KeyCode::Char('l') | KeyCode::Char('n') => app.play_next(),
        KeyCode::Char('h') | KeyCode::Char('b') => app.play_previous(),
        KeyCode::Char('L') | KeyCode::Right => app.seek_by(settings.controls.seek_step_percent),
        KeyCode::Char('H') | KeyCode::Left => app.seek_by(-settings.controls.seek_step_percent),
        KeyCode::Char('+') | KeyCode::Char('=') => {
            app.volume_by(f64::from(settings.controls.volume_step))
        }
        KeyCode::Char('-') => app.volume_by(-f64::from(settings.controls.volume_step)),
        KeyCode::Char('j') | KeyCode::Down => app.cursor_down(),
        KeyCode::Char('k') | KeyCode::Up => app.cursor_up(),
        KeyCode::Char('g') => {
            if was_gg {
                app.cursor_top();
            } else {
                state.pending_gg = true;
            }
        }
        KeyCode::Char('G') => app.cursor_bottom(),
        KeyCode::Enter => app.activate_cursor(),
        _ => {}
    }

    false
}
