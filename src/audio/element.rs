use std::path::Path;
use std::sync::mpsc::{self, Receiver, Sender};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use log::warn;

use crate::config::AudioSettings;

use super::thread::spawn_audio_thread;
use super::types::{
    AudioCmd, ElementHandle, ElementInfo, MediaError, MediaEvent, PlaybackElement,
    seconds_to_duration,
};

/// `PlaybackElement` backed by a `rodio` output stream on a dedicated thread.
///
/// Commands are fire-and-forget; the getters read the snapshot the audio
/// thread publishes, updated eagerly on this side for the fields the caller
/// just changed.
pub struct RodioElement {
    tx: Sender<AudioCmd>,
    info: ElementHandle,
    join: Option<JoinHandle<()>>,
    generation: u64,
}

impl RodioElement {
    /// Open the default output device and start the audio thread.
    ///
    /// Returns the element and the receiver of its notifications.
    pub fn spawn(settings: &AudioSettings) -> Result<(Self, Receiver<MediaEvent>), MediaError> {
        let (tx, rx) = mpsc::channel::<AudioCmd>();
        let (events_tx, events_rx) = mpsc::channel::<MediaEvent>();
        let (ready_tx, ready_rx) = mpsc::channel::<Result<(), MediaError>>();

        let volume = f32::from(settings.default_volume.min(100)) / 100.0;
        let info: ElementHandle = Arc::new(Mutex::new(ElementInfo {
            volume,
            ..ElementInfo::default()
        }));

        let join = spawn_audio_thread(
            rx,
            events_tx,
            info.clone(),
            volume,
            Duration::from_millis(settings.tick_interval_ms.max(1)),
            ready_tx,
        );

        match ready_rx.recv() {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                let _ = join.join();
                return Err(e);
            }
            Err(_) => {
                let _ = join.join();
                return Err(MediaError::Disconnected);
            }
        }

        Ok((
            Self {
                tx,
                info,
                join: Some(join),
                generation: 0,
            },
            events_rx,
        ))
    }

    fn send(&self, cmd: AudioCmd) {
        if self.tx.send(cmd).is_err() {
            warn!("{}", MediaError::Disconnected);
        }
    }

    fn update_info(&self, f: impl FnOnce(&mut ElementInfo)) {
        if let Ok(mut info) = self.info.lock() {
            f(&mut info);
        }
    }

    fn read_info<T>(&self, f: impl FnOnce(&ElementInfo) -> T) -> Option<T> {
        self.info.lock().ok().map(|info| f(&info))
    }

    /// Fade out, stop the audio thread and wait for it to finish.
    pub fn shutdown(&mut self, fade_out: Duration) {
        let Some(join) = self.join.take() else {
            return;
        };
        let _ = self.tx.send(AudioCmd::Quit {
            fade_out_ms: fade_out.as_millis() as u64,
        });
        if join.join().is_err() {
            warn!("audio thread panicked during shutdown");
        }
    }
}

impl Drop for RodioElement {
    fn drop(&mut self) {
        self.shutdown(Duration::ZERO);
    }
}

impl PlaybackElement for RodioElement {
    fn load(&mut self, path: &Path) {
        self.generation += 1;
        let generation = self.generation;
        self.update_info(|info| {
            info.path = Some(path.to_path_buf());
            info.position = Duration::ZERO;
            info.duration = None;
            info.playing = false;
            info.generation = generation;
        });
        self.send(AudioCmd::Load {
            path: path.to_path_buf(),
            generation,
        });
    }

    fn play(&mut self) {
        self.send(AudioCmd::Play);
    }

    fn pause(&mut self) {
        self.send(AudioCmd::Pause);
    }

    fn seek(&mut self, seconds: f64) {
        let to = seconds_to_duration(seconds);
        self.update_info(|info| {
            info.position = match info.duration {
                Some(d) => to.min(d),
                None => to,
            };
        });
        self.send(AudioCmd::Seek(to));
    }

    fn volume(&self) -> f64 {
        self.read_info(|info| f64::from(info.volume)).unwrap_or(1.0)
    }

    fn set_volume(&mut self, gain: f64) {
        let gain = gain as f32;
        self.update_info(|info| info.volume = gain);
        self.send(AudioCmd::SetVolume(gain));
    }

    fn current_time(&self) -> f64 {
        self.read_info(|info| info.position.as_secs_f64())
            .unwrap_or(0.0)
    }

    fn duration(&self) -> Option<f64> {
        self.read_info(|info| info.duration.map(|d| d.as_secs_f64()))
            .flatten()
    }

    fn generation(&self) -> u64 {
        self.generation
    }
}
