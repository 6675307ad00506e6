//! Wall-clock position tracking for the current sink.
//!
//! `rodio` sinks do not report a playback position we can rely on across
//! rebuilds, so the audio thread keeps its own: time accumulated while
//! paused plus the time since the last start.

use std::time::{Duration, Instant};

#[derive(Debug, Default)]
pub(super) struct PlaybackClock {
    started_at: Option<Instant>,
    accumulated: Duration,
}

impl PlaybackClock {
    pub(super) fn is_running(&self) -> bool {
        self.started_at.is_some()
    }

    pub(super) fn start_at(&mut self, now: Instant) {
        if self.started_at.is_none() {
            self.started_at = Some(now);
        }
    }

    pub(super) fn pause_at(&mut self, now: Instant) {
        if let Some(st) = self.started_at.take() {
            self.accumulated += now.saturating_duration_since(st);
        }
    }

    /// Jump to `position`, keeping the running/paused state.
    pub(super) fn set_at(&mut self, position: Duration, now: Instant) {
        self.accumulated = position;
        if self.started_at.is_some() {
            self.started_at = Some(now);
        }
    }

    pub(super) fn reset(&mut self) {
        self.started_at = None;
        self.accumulated = Duration::ZERO;
    }

    pub(super) fn elapsed_at(&self, now: Instant) -> Duration {
        self.accumulated
            + self
                .started_at
                .map_or(Duration::ZERO, |st| now.saturating_duration_since(st))
    }

    pub(super) fn start(&mut self) {
        self.start_at(Instant::now());
    }

    pub(super) fn pause(&mut self) {
        self.pause_at(Instant::now());
    }

    pub(super) fn set(&mut self, position: Duration) {
        self.set_at(position, Instant::now());
    }

    pub(super) fn elapsed(&self) -> Duration {
        self.elapsed_at(Instant::now())
    }
}
