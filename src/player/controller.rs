use tracing::{debug, info, warn};

use crate::playlist::{SongId, SongList};

use super::engine::{EngineEvent, LoadId, PlaybackEngine};

/// Playback state shown by the UI.
///
/// `is_playing` implies `current_song_id.is_some()`. `current_time` and
/// `duration` are only meaningful while a song is loaded.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct PlayerState {
    pub is_playing: bool,
    pub current_song_id: Option<SongId>,
    /// Seconds elapsed in the current song.
    pub current_time: f64,
    /// Total seconds of the current song, `0.0` until the engine reports it.
    pub duration: f64,
}

/// Owns the playback engine and the session's single [`PlayerState`].
pub struct PlayerController<E: PlaybackEngine> {
    engine: E,
    state: PlayerState,
    /// Latest generation handed to the engine.
    load: LoadId,
    /// Generation of the current source's `set_source`.
    source_load: LoadId,
    /// Generation of the latest play request.
    play_load: LoadId,
    last_error: Option<String>,
}

impl<E: PlaybackEngine> PlayerController<E> {
    pub fn new(engine: E) -> Self {
        Self {
            engine,
            state: PlayerState::default(),
            load: LoadId::default(),
            source_load: LoadId::default(),
            play_load: LoadId::default(),
            last_error: None,
        }
    }

    pub fn state(&self) -> &PlayerState {
        &self.state
    }

    pub fn engine(&self) -> &E {
        &self.engine
    }

    #[cfg(test)]
    pub fn engine_mut(&mut self) -> &mut E {
        &mut self.engine
    }

    /// Reason the most recent playback attempt failed, cleared by the next `play`.
    pub fn last_error(&self) -> Option<&str> {
        self.last_error.as_deref()
    }

    /// Latest generation handed to the engine.
    #[cfg(test)]
    pub fn current_load(&self) -> LoadId {
        self.load
    }

    /// Play `id`: resume when it is already loaded, otherwise switch the
    /// engine to it and start from the beginning. Unknown ids are ignored.
    pub fn play(&mut self, songs: &SongList, id: SongId) {
        if self.state.current_song_id == Some(id) {
            self.last_error = None;
            // An `Ended` or `PlayFailed` already in flight belongs to the
            // previous attempt, not to this one.
            self.load = self.load.next();
            self.play_load = self.load;
            self.engine.retag(self.load);
            self.engine.play();
            self.state.is_playing = true;
            debug!(%id, "resume");
            return;
        }

        let Some(song) = songs.get(id) else {
            debug!(%id, "play ignored: unknown song");
            return;
        };

        self.last_error = None;
        self.load = self.load.next();
        self.source_load = self.load;
        self.play_load = self.load;
        self.engine.set_source(self.load, &song.playable);
        self.engine.load();
        self.state.current_time = 0.0;
        self.state.duration = 0.0;
        self.engine.play();
        self.state.current_song_id = Some(id);
        self.state.is_playing = true;
        info!(%id, name = %song.name, path = %song.playable.path().display(), "play");
    }

    /// Pause the current song. No-op when nothing is loaded.
    pub fn pause(&mut self) {
        if self.state.current_song_id.is_none() {
            return;
        }
        self.engine.pause();
        self.state.is_playing = false;
    }

    /// Play/pause button semantics for `id`.
    pub fn toggle(&mut self, songs: &SongList, id: SongId) {
        if self.state.is_playing && self.state.current_song_id == Some(id) {
            self.pause();
        } else {
            self.play(songs, id);
        }
    }

    /// Jump to `seconds` in the current song and reflect it immediately.
    ///
    /// The target is clamped to `0..=duration` (only the lower bound while the
    /// duration is still unknown). No-op when nothing is loaded.
    pub fn seek(&mut self, seconds: f64) {
        if self.state.current_song_id.is_none() {
            return;
        }

        let target = self.clamp_position(seconds);
        // Positions reported before the engine saw the seek are stale.
        self.load = self.load.next();
        self.engine.retag(self.load);
        self.engine.set_current_time(target);
        self.state.current_time = target;
    }

    /// Seek relative to the current position.
    pub fn seek_by(&mut self, delta: f64) {
        self.seek(self.state.current_time + delta);
    }

    /// Fraction of the current song already played, in `0.0..=1.0`.
    pub fn progress(&self) -> f64 {
        if self.state.duration > 0.0 {
            (self.state.current_time / self.state.duration).clamp(0.0, 1.0)
        } else {
            0.0
        }
    }

    /// Fold an engine notification into the state, dropping stale ones.
    ///
    /// Durations hold for the whole source, `Ended`/`PlayFailed` only for the
    /// latest play request, and positions only for the latest generation.
    pub fn handle_engine_event(&mut self, event: EngineEvent) {
        let oldest_valid = match event {
            EngineEvent::DurationKnown { .. } => self.source_load,
            EngineEvent::Ended { .. } | EngineEvent::PlayFailed { .. } => self.play_load,
            EngineEvent::PositionChanged { .. } => self.load,
        };
        if event.load() < oldest_valid || self.state.current_song_id.is_none() {
            debug!(?event, "dropping stale engine event");
            return;
        }

        match event {
            EngineEvent::PositionChanged { position, .. } => {
                self.state.current_time = position.max(0.0);
            }
            EngineEvent::DurationKnown { duration, .. } => {
                self.state.duration = duration.max(0.0);
            }
            EngineEvent::Ended { load } => {
                self.state.is_playing = false;
                // A seek issued after the end already moved the engine's position.
                if load == self.load {
                    self.state.current_time = 0.0;
                }
            }
            EngineEvent::PlayFailed { reason, .. } => {
                warn!(song = ?self.state.current_song_id, %reason, "playback failed to start");
                self.state.is_playing = false;
                self.last_error = Some(reason);
            }
        }
    }

    fn clamp_position(&self, seconds: f64) -> f64 {
        let lower = if seconds.is_finite() { seconds.max(0.0) } else { 0.0 };
        if self.state.duration > 0.0 {
            lower.min(self.state.duration)
        } else {
            lower
        }
    }
}
