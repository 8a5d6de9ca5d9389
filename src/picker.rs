//! The "add songs" file selection surface.
//!
//! `FilePicker` is the seam; `RfdPicker` shows the native desktop dialog. A
//! dialog blocks its caller, so the runtime drives it through
//! `PickerRequest`, which runs one dialog on a helper thread and hands the
//! result back over a channel.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::thread;

use log::{debug, warn};
use rfd::FileDialog;
use thiserror::Error;

use crate::config::PickerSettings;
use crate::library::normalize_extensions;

/// Why a selection produced no paths. A user cancel is not an error.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PickerError {
    #[error("file dialog unavailable: {0}")]
    Unavailable(String),
    #[error("file selection was aborted")]
    Aborted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PickerOptions {
    pub multiple: bool,
    /// Lowercase extensions without the leading dot.
    pub extensions: Vec<String>,
    pub start_dir: Option<PathBuf>,
}

impl From<&PickerSettings> for PickerOptions {
    fn from(settings: &PickerSettings) -> Self {
        Self {
            multiple: settings.multiple,
            extensions: normalize_extensions(&settings.extensions),
            start_dir: settings.start_dir.clone(),
        }
    }
}

pub trait FilePicker: Send + Sync {
    /// Ask the user for audio files. Returns an empty list when canceled.
    fn pick(&self, options: &PickerOptions) -> Result<Vec<PathBuf>, PickerError>;
}

/// Native dialog through `rfd`.
#[derive(Debug, Default, Clone, Copy)]
pub struct RfdPicker;

impl FilePicker for RfdPicker {
    fn pick(&self, options: &PickerOptions) -> Result<Vec<PathBuf>, PickerError> {
        if let Some(reason) = dialog_blocker(graphical_session_available()) {
            return Err(PickerError::Unavailable(reason.to_string()));
        }

        let mut dialog = FileDialog::new()
            .set_title("Add songs")
            .add_filter("Audio Files", options.extensions.as_slice());
        if let Some(dir) = &options.start_dir {
            dialog = dialog.set_directory(dir);
        }

        let picked = if options.multiple {
            dialog.pick_files().unwrap_or_default()
        } else {
            dialog.pick_file().into_iter().collect()
        };
        Ok(picked)
    }
}

#[cfg(all(unix, not(target_os = "macos")))]
fn graphical_session_available() -> bool {
    std::env::var_os("DISPLAY").is_some_and(|v| !v.is_empty())
        || std::env::var_os("WAYLAND_DISPLAY").is_some_and(|v| !v.is_empty())
}

#[cfg(not(all(unix, not(target_os = "macos"))))]
fn graphical_session_available() -> bool {
    true
}

/// Why a native dialog cannot be shown from the picker thread, if it cannot.
///
/// On macOS `rfd` hands synchronous dialogs to the main thread's dispatch
/// queue. The terminal loop never runs that queue, so the dialog would never
/// answer.
#[cfg(target_os = "macos")]
fn dialog_blocker(_session: bool) -> Option<&'static str> {
    Some("native file dialogs need the main run loop on macOS; pass paths on the command line")
}

#[cfg(not(target_os = "macos"))]
fn dialog_blocker(session: bool) -> Option<&'static str> {
    (!session).then_some("no graphical session (DISPLAY/WAYLAND_DISPLAY unset)")
}

/// One outstanding file selection running on a helper thread.
pub struct PickerRequest {
    rx: Receiver<Result<Vec<PathBuf>, PickerError>>,
}

impl PickerRequest {
    pub fn spawn(picker: Arc<dyn FilePicker>, options: PickerOptions) -> Self {
        let (tx, rx) = mpsc::channel();
        let spawned = thread::Builder::new()
            .name("file-picker".to_string())
            .spawn({
                let tx = tx.clone();
                move || {
                    let result = picker.pick(&options);
                    debug!("file picker finished: {:?}", result.as_ref().map(Vec::len));
                    let _ = tx.send(result);
                }
            });

        if let Err(e) = spawned {
            warn!("failed to start file picker thread: {e}");
            let _ = tx.send(Err(PickerError::Unavailable(e.to_string())));
        }

        Self { rx }
    }

    /// `None` while the dialog is still open.
    ///
    /// A picker thread that died without answering resolves to `Aborted`.
    pub fn try_result(&self) -> Option<Result<Vec<PathBuf>, PickerError>> {
        match self.rx.try_recv() {
            Ok(result) => Some(result),
            Err(TryRecvError::Empty) => None,
            Err(TryRecvError::Disconnected) => Some(Err(PickerError::Aborted)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use std::time::{Duration, Instant};

    struct Scripted(Mutex<Option<Result<Vec<PathBuf>, PickerError>>>);

    impl FilePicker for Scripted {
        fn pick(&self, _options: &PickerOptions) -> Result<Vec<PathBuf>, PickerError> {
            self.0.lock().unwrap().take().unwrap_or(Ok(Vec::new()))
        }
    }

    struct Exploding;

    impl FilePicker for Exploding {
        fn pick(&self, _options: &PickerOptions) -> Result<Vec<PathBuf>, PickerError> {
            panic!("dialog host crashed");
        }
    }

    fn wait(request: &PickerRequest) -> Result<Vec<PathBuf>, PickerError> {
        let deadline = Instant::now() + Duration::from_secs(5);
        loop {
            if let Some(result) = request.try_result() {
                return result;
            }
            assert!(Instant::now() < deadline, "picker request never resolved");
            thread::sleep(Duration::from_millis(5));
        }
    }

    fn options() -> PickerOptions {
        PickerOptions::from(&PickerSettings::default())
    }

    #[test]
    fn options_from_settings_normalizes_extensions() {
        let settings = PickerSettings {
            extensions: vec![".MP3".into(), " flac ".into(), "".into()],
            multiple: false,
            start_dir: Some(PathBuf::from("/music")),
        };
        let opts = PickerOptions::from(&settings);
        assert_eq!(opts.extensions, vec!["mp3", "flac"]);
        assert!(!opts.multiple);
        assert_eq!(opts.start_dir, Some(PathBuf::from("/music")));
    }

    #[test]
    fn default_options_allow_multiple_audio_files() {
        let opts = options();
        assert!(opts.multiple);
        assert_eq!(opts.extensions, vec!["mp3", "wav", "ogg", "m4a", "flac"]);
    }

    #[test]
    fn request_delivers_picked_paths() {
        let paths = vec![PathBuf::from("/music/a.mp3"), PathBuf::from("/music/b.wav")];
        let picker = Arc::new(Scripted(Mutex::new(Some(Ok(paths.clone())))));
        let request = PickerRequest::spawn(picker, options());
        assert_eq!(wait(&request), Ok(paths));
    }

    #[test]
    fn request_delivers_picker_errors() {
        let picker = Arc::new(Scripted(Mutex::new(Some(Err(PickerError::Unavailable(
            "headless".into(),
        ))))));
        let request = PickerRequest::spawn(picker, options());
        assert_eq!(
            wait(&request),
            Err(PickerError::Unavailable("headless".into()))
        );
    }

    #[cfg(not(target_os = "macos"))]
    #[test]
    fn dialog_needs_a_graphical_session() {
        assert!(dialog_blocker(false).is_some());
        assert_eq!(dialog_blocker(true), None);
    }

    #[cfg(target_os = "macos")]
    #[test]
    fn dialog_is_unavailable_on_macos() {
        assert!(dialog_blocker(true).is_some());
        assert!(dialog_blocker(false).is_some());
    }

    #[test]
    fn crashed_picker_resolves_to_aborted() {
        let request = PickerRequest::spawn(Arc::new(Exploding), options());
        assert_eq!(wait(&request), Err(PickerError::Aborted));
    }
}
