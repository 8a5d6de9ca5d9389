//! Utilities for creating `rodio` sinks from file paths.
//!
//! The helper here encapsulates opening/decoding a file and preparing a
//! paused `Sink` at the requested start position.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::prelude::AudioFile;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::types::MediaError;

/// Create a paused `Sink` for `path` that starts playback at `start_at`.
///
/// Also returns the total duration of the source when it can be determined.
pub(super) fn create_sink_at(
    stream: &OutputStream,
    path: &Path,
    start_at: Duration,
    volume: f32,
) -> Result<(Sink, Option<Duration>), MediaError> {
    let file = File::open(path).map_err(|source| MediaError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    let source = Decoder::new(BufReader::new(file)).map_err(|e| MediaError::Decode {
        path: path.to_path_buf(),
        reason: e.to_string(),
    })?;

    // Many decoders (mp3 in particular) cannot tell their length up front.
    let total = source.total_duration().or_else(|| tagged_duration(path));

    let sink = Sink::connect_new(stream.mixer());
    sink.set_volume(volume);
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    sink.append(source.skip_duration(start_at));
    sink.pause();
    Ok((sink, total))
}

/// Read the duration from the container's audio properties.
pub(super) fn tagged_duration(path: &Path) -> Option<Duration> {
    lofty::read_from_path(path)
        .ok()
        .map(|tagged| tagged.properties().duration())
        .filter(|d| !d.is_zero())
}
