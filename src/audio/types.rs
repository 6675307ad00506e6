//! Commands accepted by the audio thread.

use std::path::PathBuf;
use std::time::Duration;

use crate::player::LoadId;

#[derive(Debug)]
pub enum AudioCmd {
    /// Replace the current source; later notifications carry `load`.
    SetSource { load: LoadId, path: PathBuf },
    /// Tag later notifications for the current source with a new load.
    Retag(LoadId),
    /// Read the current source's duration and report it.
    Load,
    /// Start or resume playback of the current source.
    Play,
    /// Pause playback, keeping the position.
    Pause,
    /// Jump to an absolute position in the current source.
    Seek(Duration),
    /// Quit the audio thread, optionally fading out over `fade_out_ms` milliseconds.
    Quit { fade_out_ms: u64 },
}
