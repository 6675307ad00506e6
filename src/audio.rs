//! `rodio`-backed playback engine.
//!
//! The output stream must live on the thread that opened it, so the engine is
//! split in two: [`AudioPlayer`] is the handle the controller owns and
//! implements [`crate::player::PlaybackEngine`] by sending commands to a
//! dedicated audio thread. The thread reports back through
//! [`crate::player::EngineEvent`]s on the channel handed to [`AudioPlayer::new`].

mod clock;
mod error;
mod player;
mod sink;
mod thread;
mod types;

pub use player::AudioPlayer;

#[cfg(test)]
mod tests;
