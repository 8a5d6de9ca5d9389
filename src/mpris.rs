//! MPRIS2 service so desktop media keys and `playerctl` can drive the player.
//!
//! The D-Bus side only forwards commands over a channel and reads a shared
//! snapshot; all state changes still go through the controller.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, mpsc::Sender};

use async_io::{Timer, block_on};
use log::{info, warn};
use zbus::{Connection, interface};
use zvariant::{ObjectPath, OwnedValue, Value};

use crate::library::Track;

const OBJECT_PATH: &str = "/org/mpris/MediaPlayer2";
const BUS_NAME: &str = "org.mpris.MediaPlayer2.cadenza";

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ControlCmd {
    Quit,
    Play,
    Pause,
    PlayPause,
    Stop,
    Next,
    Prev,
}

/// MPRIS `PlaybackStatus`.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq)]
pub enum PlaybackStatus {
    /// Nothing loaded yet.
    #[default]
    Stopped,
    Playing,
    Paused,
}

#[derive(Debug, Default)]
struct SharedState {
    status: PlaybackStatus,
    title: Option<String>,
    url: Option<String>,
    length_micros: Option<i64>,
    track_id: Option<String>,
}

pub struct MprisHandle {
    state: Arc<Mutex<SharedState>>,
}

impl MprisHandle {
    /// A handle not connected to any bus.
    #[cfg(test)]
    pub fn detached() -> Self {
        Self {
            state: Arc::new(Mutex::new(SharedState::default())),
        }
    }

    /// `mpris:length` currently exposed over the bus.
    #[cfg(test)]
    pub fn exposed_length_micros(&self) -> Option<i64> {
        self.state.lock().ok().and_then(|s| s.length_micros)
    }

    pub fn set_status(&self, status: PlaybackStatus) {
        if let Ok(mut s) = self.state.lock() {
            s.status = status;
        }
    }

    /// Publish the active track, or clear the metadata with `None`.
    pub fn set_track_metadata(
        &self,
        index: Option<usize>,
        track: Option<&Track>,
        length_secs: Option<f64>,
    ) {
        let Ok(mut s) = self.state.lock() else {
            return;
        };
        match (index, track) {
            (Some(i), Some(t)) => {
                s.title = Some(t.name.clone());
                s.url = Some(format!("file://{}", t.path.display()));
                s.length_micros = length_secs
                    .filter(|d| d.is_finite() && *d > 0.0)
                    .map(|d| (d * 1_000_000.0) as i64);
                s.track_id = Some(format!("{OBJECT_PATH}/track/{i}"));
            }
            _ => {
                s.title = None;
                s.url = None;
                s.length_micros = None;
                s.track_id = None;
            }
        }
    }
}

struct RootIface {
    tx: Sender<ControlCmd>,
}

#[interface(name = "org.mpris.MediaPlayer2")]
impl RootIface {
    fn raise(&self) {
        // No-op for TUI.
    }

    fn quit(&self) {
        let _ = self.tx.send(ControlCmd::Quit);
    }

    #[zbus(property)]
    fn can_quit(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_raise(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn has_track_list(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn identity(&self) -> &str {
        "cadenza"
    }

    #[zbus(property)]
    fn supported_uri_schemes(&self) -> Vec<String> {
        vec!["file".to_string()]
    }

    #[zbus(property)]
    fn supported_mime_types(&self) -> Vec<String> {
        [
            "audio/mpeg",
            "audio/wav",
            "audio/ogg",
            "audio/mp4",
            "audio/flac",
        ]
        .iter()
        .map(|m| m.to_string())
        .collect()
    }
}

struct PlayerIface {
    tx: Sender<ControlCmd>,
    state: Arc<Mutex<SharedState>>,
}

fn owned(value: Value<'_>) -> Option<OwnedValue> {
    OwnedValue::try_from(value).ok()
}

#[interface(name = "org.mpris.MediaPlayer2.Player")]
impl PlayerIface {
    fn next(&self) {
        let _ = self.tx.send(ControlCmd::Next);
    }

    fn previous(&self) {
        let _ = self.tx.send(ControlCmd::Prev);
    }

    fn play(&self) {
        let _ = self.tx.send(ControlCmd::Play);
    }

    fn pause(&self) {
        let _ = self.tx.send(ControlCmd::Pause);
    }

    fn play_pause(&self) {
        let _ = self.tx.send(ControlCmd::PlayPause);
    }

    fn stop(&self) {
        let _ = self.tx.send(ControlCmd::Stop);
    }

    #[zbus(property)]
    fn playback_status(&self) -> &str {
        let Ok(s) = self.state.lock() else {
            return "Stopped";
        };
        match s.status {
            PlaybackStatus::Stopped => "Stopped",
            PlaybackStatus::Playing => "Playing",
            PlaybackStatus::Paused => "Paused",
        }
    }

    #[zbus(property)]
    fn can_control(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_play(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_pause(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_next(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_go_previous(&self) -> bool {
        true
    }

    #[zbus(property)]
    fn can_seek(&self) -> bool {
        false
    }

    #[zbus(property)]
    fn metadata(&self) -> HashMap<String, OwnedValue> {
        let mut map = HashMap::new();
        let Ok(s) = self.state.lock() else {
            return map;
        };

        if let Some(v) = s
            .track_id
            .as_deref()
            .and_then(|id| ObjectPath::try_from(id).ok())
            .and_then(|p| owned(Value::from(p)))
        {
            map.insert("mpris:trackid".to_string(), v);
        }
        if let Some(v) = owned(Value::from(s.title.clone().unwrap_or_default())) {
            map.insert("xesam:title".to_string(), v);
        }
        if let Some(v) = s.url.clone().and_then(|u| owned(Value::from(u))) {
            map.insert("xesam:url".to_string(), v);
        }
        if let Some(v) = s.length_micros.and_then(|l| owned(Value::from(l))) {
            map.insert("mpris:length".to_string(), v);
        }
        map
    }
}

pub fn spawn_mpris(tx: Sender<ControlCmd>) -> MprisHandle {
    let state = Arc::new(Mutex::new(SharedState::default()));

    let state_for_thread = state.clone();
    let spawned = std::thread::Builder::new()
        .name("mpris".to_string())
        .spawn(move || {
            block_on(async move {
                let connection = match Connection::session().await {
                    Ok(c) => c,
                    Err(e) => {
                        warn!("MPRIS: failed to connect to session bus: {e}");
                        return;
                    }
                };

                if let Err(e) = connection.request_name(BUS_NAME).await {
                    warn!("MPRIS: failed to acquire name: {e}");
                    return;
                }

                let object_server = connection.object_server();

                if let Err(e) = object_server
                    .at(OBJECT_PATH, RootIface { tx: tx.clone() })
                    .await
                {
                    warn!("MPRIS: failed to register root iface: {e}");
                    return;
                }

                if let Err(e) = object_server
                    .at(
                        OBJECT_PATH,
                        PlayerIface {
                            tx,
                            state: state_for_thread,
                        },
                    )
                    .await
                {
                    warn!("MPRIS: failed to register player iface: {e}");
                    return;
                }
                info!("MPRIS: serving {BUS_NAME}");

                // Keep the service alive.
                loop {
                    Timer::after(std::time::Duration::from_secs(3600)).await;
                }
            });
        });

    if let Err(e) = spawned {
        warn!("MPRIS: failed to start thread: {e}");
    }

    MprisHandle { state }
}
