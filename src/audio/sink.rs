//! Utilities for opening sources as `rodio` sinks.
//!
//! The helpers here encapsulate opening/decoding a file at the requested start
//! position, wrapping it in a paused `Sink`, and reading a file's duration.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use std::time::Duration;

use lofty::file::AudioFile;
use rodio::source::SkipDuration;
use rodio::{Decoder, OutputStream, Sink, Source};

use super::error::AudioError;

fn open_decoder(path: &Path) -> Result<Decoder<BufReader<File>>, AudioError> {
    let file = File::open(path).map_err(|source| AudioError::Open {
        path: path.to_path_buf(),
        source,
    })?;

    Decoder::new(BufReader::new(file)).map_err(|source| AudioError::Decode {
        path: path.to_path_buf(),
        source,
    })
}

/// Decoded file, positioned at the requested start.
pub(super) type Track = SkipDuration<Decoder<BufReader<File>>>;

/// Open and decode `path`, starting playback at `start_at`.
pub(super) fn open_track_at(path: &Path, start_at: Duration) -> Result<Track, AudioError> {
    // `skip_duration` is our seeking primitive; even Duration::ZERO is fine.
    Ok(open_decoder(path)?.skip_duration(start_at))
}

/// Create a paused `Sink` on `stream` playing `track`.
pub(super) fn create_sink(stream: &OutputStream, track: Track) -> Sink {
    let sink = Sink::connect_new(stream.mixer());
    sink.append(track);
    sink.pause();
    sink
}

/// Best-effort duration of the file at `path`.
///
/// Container metadata (via `lofty`) is preferred because it is cheap and
/// works for VBR MP3s; the decoder's own estimate is the fallback.
pub(super) fn read_duration(path: &Path) -> Option<Duration> {
    if let Ok(tagged) = lofty::read_from_path(path) {
        let d = tagged.properties().duration();
        if !d.is_zero() {
            return Some(d);
        }
    }

    open_decoder(path).ok()?.total_duration()
}
