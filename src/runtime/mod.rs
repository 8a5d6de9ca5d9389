use std::env;
use std::path::PathBuf;
use std::sync::{Arc, mpsc};
use std::time::Duration;

use crossterm::execute;
use crossterm::terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode};
use log::{error, info, warn};
use ratatui::{Terminal, backend::CrosstermBackend};

use crate::app::App;
use crate::audio::RodioElement;
use crate::logging;
use crate::mpris::ControlCmd;
use crate::picker::{PickerOptions, RfdPicker};

mod event_loop;
mod mpris_sync;
mod settings;
mod startup;


pub fn run() -> Result<(), Box<dyn std::error::Error>> {
    let (settings, config_problem) = settings::load_settings();

    // Reported on stderr while the terminal is still in cooked mode.
    if let Err(e) = logging::init(&settings.logging) {
        eprintln!("cadenza: logging disabled: {e}");
    }
    if let Some(problem) = config_problem {
        warn!("{problem}");
    }

    let (element, media_rx) = RodioElement::spawn(&settings.audio).map_err(|e| {
        error!("cannot start audio output: {e}");
        e
    })?;
    let mut app = App::new(
        element,
        settings.audio.default_volume,
        Duration::from_millis(settings.ui.notice_ms),
    );

    let args: Vec<PathBuf> = env::args_os().skip(1).map(PathBuf::from).collect();
    startup::apply_initial_selection(&mut app, &args, &settings);

    let (control_tx, control_rx) = mpsc::channel::<ControlCmd>();
    let mpris = crate::mpris::spawn_mpris(control_tx);

    let mut state = event_loop::EventLoopState::new(
        Arc::new(RfdPicker),
        PickerOptions::from(&settings.picker),
    );
    state.mpris_sync.sync(&mpris, &app);

    enable_raw_mode()?;
    let mut stdout = std::io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let run_result = event_loop::run(
        &mut terminal,
        &settings,
        &mut app,
        &media_rx,
        &mpris,
        &control_rx,
        &mut state,
    );

    app.element_mut()
        .shutdown(Duration::from_millis(settings.audio.quit_fade_out_ms));

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(e) = &run_result {
        error!("event loop failed: {e}");
    }
    info!("shutting down");
    run_result
}
