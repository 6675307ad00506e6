//! Player controller: the single owner of playback state and of the shared
//! playback engine.
//!
//! The controller never talks to audio hardware itself. It drives any
//! [`PlaybackEngine`] and folds the engine's notifications back into
//! [`PlayerState`].

mod controller;
mod engine;

pub use controller::{PlayerController, PlayerState};
pub use engine::{EngineEvent, LoadId, PlaybackEngine};
