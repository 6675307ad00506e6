use std::path::PathBuf;

use thiserror::Error;

/// Reasons the audio thread could not start playing a source.
#[derive(Debug, Error)]
pub enum AudioError {
    #[error("failed to open {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to decode {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: rodio::decoder::DecoderError,
    },

    #[error("no audio output device: {0}")]
    NoOutputDevice(String),
}
