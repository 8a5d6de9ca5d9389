use std::path::PathBuf;
use std::sync::mpsc::{Receiver, RecvTimeoutError, Sender};
use std::thread;
use std::thread::JoinHandle;
use std::time::{Duration, Instant};

use log::{debug, info, warn};
use rodio::{OutputStream, OutputStreamBuilder, Sink};

use super::sink::create_sink_at;
use super::types::{AudioCmd, ElementHandle, MediaError, MediaEvent, MediaEventKind};

/// Wall-clock position tracking for the current source.
///
/// `rodio` does not know about our `skip_duration` offset, so the position is
/// the offset we started from plus the time spent unpaused since.
#[derive(Debug, Default)]
pub(crate) struct PositionClock {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PositionClock {
    /// Restart the clock, paused, at `at`.
    pub(crate) fn reset(&mut self, at: Duration) {
        self.started_at = None;
        self.accumulated = at;
    }

    pub(crate) fn start(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub(crate) fn pause(&mut self, now: Instant) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(st);
        }
    }

    pub(crate) fn position(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }
}

/// Everything the audio thread owns besides the output stream.
pub(super) struct AudioState {
    info: ElementHandle,
    events: Sender<MediaEvent>,
    sink: Option<Sink>,
    path: Option<PathBuf>,
    duration: Option<Duration>,
    paused: bool,
    volume: f32,
    clock: PositionClock,
    /// Load currently held by the sink.
    pub(super) generation: u64,
}

impl AudioState {
    pub(super) fn new(info: ElementHandle, events: Sender<MediaEvent>, volume: f32) -> Self {
        Self {
            info,
            events,
            sink: None,
            path: None,
            duration: None,
            paused: true,
            volume,
            clock: PositionClock::default(),
            generation: 0,
        }
    }

    pub(super) fn emit(&self, kind: MediaEventKind) {
        // The controller side may already be gone during shutdown.
        let _ = self.events.send(MediaEvent::new(self.generation, kind));
    }

    /// Write the snapshot, unless the element has already moved on to a
    /// newer load this thread has not processed yet.
    pub(super) fn publish(&self) {
        let position = self.position();
        if let Ok(mut info) = self.info.lock() {
            if info.generation > self.generation {
                return;
            }
            info.generation = self.generation;
            info.path = self.path.clone();
            info.position = position;
            info.duration = self.duration;
            info.volume = self.volume;
            info.playing = !self.paused;
        }
    }

    fn position(&self) -> Duration {
        let pos = self.clock.position(Instant::now());
        match self.duration {
            Some(d) => pos.min(d),
            None => pos,
        }
    }

    fn stop_sink(&mut self) {
        if let Some(s) = self.sink.take() {
            s.stop();
        }
    }

    fn load(&mut self, stream: &OutputStream, path: PathBuf, generation: u64) {
        self.generation = generation;
        self.stop_sink();
        self.paused = true;
        self.clock.reset(Duration::ZERO);
        self.duration = None;

        match create_sink_at(stream, &path, Duration::ZERO, self.volume) {
            Ok((sink, total)) => {
                debug!("loaded {} (duration {:?})", path.display(), total);
                self.sink = Some(sink);
                self.duration = total;
                self.path = Some(path);
                self.publish();
                if total.is_some() {
                    self.emit(MediaEventKind::MetadataLoaded);
                }
            }
            Err(e) => {
                warn!("{e}");
                self.path = Some(path.clone());
                self.publish();
                self.emit(MediaEventKind::Failed {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn play(&mut self, stream: &OutputStream) {
        // Playing a drained source starts it over, like a media element does.
        let drained = self.sink.as_ref().is_some_and(|s| s.empty());
        if drained {
            self.rebuild_at(stream, Duration::ZERO);
        }

        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        sink.play();
        self.paused = false;
        self.clock.start(Instant::now());
        self.publish();
    }

    fn pause(&mut self) {
        if let Some(s) = self.sink.as_ref() {
            s.pause();
        }
        self.paused = true;
        self.clock.pause(Instant::now());
        self.publish();
    }

    fn seek(&mut self, stream: &OutputStream, to: Duration) {
        if self.sink.is_none() {
            return;
        }
        let to = match self.duration {
            Some(d) => to.min(d),
            None => to,
        };
        self.rebuild_at(stream, to);
        self.publish();
        self.emit(MediaEventKind::TimeUpdate);
    }

    /// Scrubbing: rebuild the current sink and skip into the file, keeping the
    /// pause state and volume.
    fn rebuild_at(&mut self, stream: &OutputStream, at: Duration) {
        let Some(path) = self.path.clone() else {
            return;
        };
        self.stop_sink();

        match create_sink_at(stream, &path, at, self.volume) {
            Ok((sink, _)) => {
                self.clock.reset(at);
                if !self.paused {
                    sink.play();
                    self.clock.start(Instant::now());
                }
                self.sink = Some(sink);
            }
            Err(e) => {
                warn!("{e}");
                self.paused = true;
                self.clock.reset(Duration::ZERO);
                self.emit(MediaEventKind::Failed {
                    path,
                    reason: e.to_string(),
                });
            }
        }
    }

    fn set_volume(&mut self, volume: f32) {
        self.volume = volume;
        if let Some(s) = self.sink.as_ref() {
            s.set_volume(volume);
        }
        self.publish();
    }

    /// Periodic work: progress notifications and end-of-source detection.
    fn tick(&mut self) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if self.paused {
            return;
        }

        if sink.empty() {
            self.paused = true;
            self.clock.pause(Instant::now());
            if let Some(d) = self.duration {
                self.clock.reset(d);
            }
            self.publish();
            self.emit(MediaEventKind::Ended);
        } else {
            self.publish();
            self.emit(MediaEventKind::TimeUpdate);
        }
    }

    fn fade_out(&mut self, fade_out_ms: u64) {
        let Some(sink) = self.sink.as_ref() else {
            return;
        };
        if fade_out_ms > 0 && !self.paused {
            let steps: u64 = 20;
            let step_ms = (fade_out_ms / steps).max(1);
            for step in 1..=steps {
                let t = step as f32 / steps as f32;
                sink.set_volume(self.volume * (1.0 - t));
                thread::sleep(Duration::from_millis(step_ms));
            }
        }
        sink.set_volume(0.0);
        self.stop_sink();
        self.paused = true;
        self.publish();
    }
}

/// Spawn the audio thread. `ready` receives the outcome of opening the output
/// device before any command is processed.
pub(super) fn spawn_audio_thread(
    rx: Receiver<AudioCmd>,
    events: Sender<MediaEvent>,
    info: ElementHandle,
    initial_volume: f32,
    tick_interval: Duration,
    ready: Sender<Result<(), MediaError>>,
) -> JoinHandle<()> {
    thread::spawn(move || {
        let mut stream = match OutputStreamBuilder::open_default_stream() {
            Ok(s) => s,
            Err(e) => {
                let _ = ready.send(Err(MediaError::NoOutputDevice(e.to_string())));
                return;
            }
        };
        // rodio logs to stderr when OutputStream is dropped. That's useful in debugging,
        // but noisy for a TUI app.
        stream.log_on_drop(false);
        let _ = ready.send(Ok(()));
        info!("audio output opened");

        let mut state = AudioState::new(info, events, initial_volume);
        state.publish();

        loop {
            match rx.recv_timeout(tick_interval) {
                Ok(cmd) => match cmd {
                    AudioCmd::Load { path, generation } => state.load(&stream, path, generation),
                    AudioCmd::Play => state.play(&stream),
                    AudioCmd::Pause => state.pause(),
                    AudioCmd::Seek(to) => state.seek(&stream, to),
                    AudioCmd::SetVolume(v) => state.set_volume(v),
                    AudioCmd::Quit { fade_out_ms } => {
                        state.fade_out(fade_out_ms);
                        break;
                    }
                },
                Err(RecvTimeoutError::Timeout) => state.tick(),
                Err(RecvTimeoutError::Disconnected) => break,
            }
        }
        info!("audio thread stopped");
    })
}
