//! The narrow contract between the controller and a playback engine.

use crate::playlist::PlayableRef;

/// Generation tag for engine notifications.
///
/// A new id is taken on every source switch, resume and seek. Every
/// notification an engine emits carries the id that was current when it was
/// emitted, so the controller can drop notifications that were already in
/// flight when it changed the engine's course. Ids only ever increase.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct LoadId(u64);

impl LoadId {
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// Notifications flowing from the engine to the controller.
#[derive(Debug, Clone, PartialEq)]
pub enum EngineEvent {
    /// Periodic playback position, in seconds.
    PositionChanged { load: LoadId, position: f64 },
    /// Total length of the loaded source, in seconds.
    DurationKnown { load: LoadId, duration: f64 },
    /// The source played to the end.
    Ended { load: LoadId },
    /// Starting playback failed (file missing, undecodable, no device...).
    PlayFailed { load: LoadId, reason: String },
}

impl EngineEvent {
    pub fn load(&self) -> LoadId {
        match self {
            Self::PositionChanged { load, .. }
            | Self::DurationKnown { load, .. }
            | Self::Ended { load }
            | Self::PlayFailed { load, .. } => *load,
        }
    }
}

/// Commands a playback engine accepts.
///
/// None of these block. `play` is asynchronous: its outcome is only visible
/// through a later [`EngineEvent::PlayFailed`] (or the absence of one).
pub trait PlaybackEngine {
    /// Replace the current source. Notifications for the new source carry `load`.
    fn set_source(&mut self, load: LoadId, source: &PlayableRef);
    /// Tag every notification from now on with `load`, keeping the source.
    fn retag(&mut self, load: LoadId);
    /// Prepare the current source; the engine reports its duration once known.
    fn load(&mut self);
    /// Start or resume playback of the current source.
    fn play(&mut self);
    fn pause(&mut self);
    /// Move the playback position to `seconds`.
    fn set_current_time(&mut self, seconds: f64);
}
