//! Application model types: `App` and `Mode`.
//!
//! The `App` struct holds the song list, the player controller, the cursor
//! and the in-progress gesture (grab, rename or upload) driven by the UI.

use std::path::PathBuf;

use tracing::{debug, info};

use crate::config::UploadSettings;
use crate::player::{PlaybackEngine, PlayerController};
use crate::playlist::{SongId, SongList, collect_upload};

/// What the keyboard is currently editing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub enum Mode {
    #[default]
    Normal,
    /// A song is held and will be dropped onto the song under the cursor.
    Grab { id: SongId },
    /// Inline edit of a song name.
    Rename { id: SongId, buffer: String },
    /// Path prompt for adding files or directories.
    Upload { buffer: String },
}

/// The main application model.
pub struct App<E: PlaybackEngine> {
    pub songs: SongList,
    pub player: PlayerController<E>,
    pub selected: usize,
    pub mode: Mode,
    /// One-line feedback for the last list operation (e.g. an upload).
    pub notice: Option<String>,

    drag_from: Option<SongId>,
}

impl<E: PlaybackEngine> App<E> {
    /// Create an empty `App` driving `engine`.
    pub fn new(engine: E) -> Self {
        Self {
            songs: SongList::new(),
            player: PlayerController::new(engine),
            selected: 0,
            mode: Mode::Normal,
            notice: None,
            drag_from: None,
        }
    }

    /// Return true if the list contains any songs.
    pub fn has_songs(&self) -> bool {
        !self.songs.is_empty()
    }

    /// Id of the song under the cursor.
    pub fn selected_id(&self) -> Option<SongId> {
        self.songs.at(self.selected).map(|s| s.id)
    }

    /// Expand `paths` per `settings` and append the result.
    ///
    /// Returns the number of songs added.
    pub fn add_paths(&mut self, paths: &[PathBuf], settings: &UploadSettings) -> usize {
        let files = collect_upload(paths, settings);
        let added = self.songs.add_songs(files).len();

        self.notice = Some(match added {
            0 => "nothing to add".to_string(),
            1 => "added 1 song".to_string(),
            n => format!("added {n} songs"),
        });
        info!(added, total = self.songs.len(), "upload");
        added
    }

    /// Move the cursor to `idx` (clamped). Leaving a song being renamed commits the edit.
    pub fn set_selected(&mut self, idx: usize) {
        let idx = idx.min(self.songs.len().saturating_sub(1));
        if idx != self.selected {
            self.commit_rename();
        }
        self.selected = idx;
    }

    /// Move the cursor to the next song. Wraps around to the first.
    pub fn next(&mut self) {
        if self.has_songs() {
            self.set_selected((self.selected + 1) % self.songs.len());
        }
    }

    /// Move the cursor to the previous song. Wraps around to the last.
    pub fn prev(&mut self) {
        if self.has_songs() {
            let len = self.songs.len();
            self.set_selected((self.selected + len - 1) % len);
        }
    }

    pub fn select_first(&mut self) {
        self.set_selected(0);
    }

    pub fn select_last(&mut self) {
        self.set_selected(self.songs.len().saturating_sub(1));
    }

    /// Play the song under the cursor, resuming it if it is already current.
    pub fn play_selected(&mut self) {
        if let Some(id) = self.selected_id() {
            self.player.play(&self.songs, id);
        }
    }

    /// Play/pause the current song, or start the selected one when nothing
    /// has been played yet.
    pub fn toggle_playback(&mut self) {
        let target = self.player.state().current_song_id.or(self.selected_id());
        if let Some(id) = target {
            self.player.toggle(&self.songs, id);
        }
    }

    /// Seek to `fraction` of the current song. No-op until the duration is known.
    pub fn seek_fraction(&mut self, fraction: f64) {
        let duration = self.player.state().duration;
        if duration > 0.0 {
            self.player.seek(fraction.clamp(0.0, 1.0) * duration);
        }
    }

    /// Scrub by `seconds` (negative rewinds).
    pub fn scrub(&mut self, seconds: f64) {
        self.player.seek_by(seconds);
    }

    /// Move `id` onto `target` and keep the cursor on the moved song.
    pub fn reorder(&mut self, id: SongId, target: SongId) -> bool {
        let moved = self.songs.move_song(id, target);
        if let Some(pos) = self.songs.position(id) {
            self.selected = pos;
        }
        moved
    }

    /// Swap the selected song with its lower neighbour.
    pub fn move_selected_down(&mut self) {
        self.move_selected_onto(self.selected + 1);
    }

    /// Swap the selected song with its upper neighbour.
    pub fn move_selected_up(&mut self) {
        if let Some(idx) = self.selected.checked_sub(1) {
            self.move_selected_onto(idx);
        }
    }

    fn move_selected_onto(&mut self, idx: usize) {
        let (Some(id), Some(target)) = (self.selected_id(), self.songs.at(idx).map(|s| s.id)) else {
            return;
        };
        self.reorder(id, target);
    }

    /// Pick up the selected song.
    pub fn grab(&mut self) {
        self.commit_rename();
        if let Some(id) = self.selected_id() {
            debug!(%id, "grab");
            self.mode = Mode::Grab { id };
        }
    }

    /// Drop the held song onto the song under the cursor.
    pub fn drop_grab(&mut self) {
        let Mode::Grab { id } = self.mode else {
            return;
        };
        self.mode = Mode::Normal;
        if let Some(target) = self.selected_id() {
            self.reorder(id, target);
        }
    }

    /// Release the held song without moving it.
    pub fn cancel_grab(&mut self) {
        if let Mode::Grab { id } = self.mode {
            self.mode = Mode::Normal;
            if let Some(pos) = self.songs.position(id) {
                self.selected = pos;
            }
        }
    }

    /// Id of the held song, if any.
    pub fn grabbed(&self) -> Option<SongId> {
        match self.mode {
            Mode::Grab { id } => Some(id),
            _ => None,
        }
    }

    /// Mouse press on list row `idx`: select it and remember it as the drag source.
    pub fn begin_drag(&mut self, idx: usize) {
        self.set_selected(idx);
        self.drag_from = self.songs.at(idx).map(|s| s.id);
    }

    /// Mouse release. Dropping on a different row moves the dragged song there;
    /// releasing outside the list abandons the drag.
    pub fn end_drag(&mut self, idx: Option<usize>) {
        let Some(id) = self.drag_from.take() else {
            return;
        };
        if let Some(target) = idx.and_then(|i| self.songs.at(i)).map(|s| s.id) {
            self.reorder(id, target);
        }
    }

    /// Start editing the selected song's name, prefilled with the current name.
    pub fn begin_rename(&mut self) {
        if let Some(song) = self.songs.at(self.selected) {
            self.mode = Mode::Rename {
                id: song.id,
                buffer: song.name.clone(),
            };
        }
    }

    /// Store the edited name. Empty input keeps the old name.
    pub fn commit_rename(&mut self) {
        if let Mode::Rename { id, buffer } = std::mem::take(&mut self.mode) {
            self.songs.rename_song(id, &buffer);
        }
    }

    /// Abandon the edit and keep the old name.
    pub fn cancel_rename(&mut self) {
        if matches!(self.mode, Mode::Rename { .. }) {
            self.mode = Mode::Normal;
        }
    }

    /// Open the path prompt.
    pub fn begin_upload(&mut self) {
        self.commit_rename();
        self.mode = Mode::Upload {
            buffer: String::new(),
        };
    }

    /// Add the path typed into the prompt and close it.
    pub fn submit_upload(&mut self, settings: &UploadSettings) -> usize {
        let Mode::Upload { buffer } = std::mem::take(&mut self.mode) else {
            return 0;
        };
        let path = buffer.trim();
        if path.is_empty() {
            return 0;
        }
        self.add_paths(&[PathBuf::from(path)], settings)
    }

    pub fn cancel_upload(&mut self) {
        if matches!(self.mode, Mode::Upload { .. }) {
            self.mode = Mode::Normal;
        }
    }

    /// Text being typed in the rename or upload prompt.
    pub fn input(&self) -> Option<&str> {
        match &self.mode {
            Mode::Rename { buffer, .. } | Mode::Upload { buffer } => Some(buffer),
            _ => None,
        }
    }

    /// Append a character to the active prompt.
    pub fn push_input_char(&mut self, c: char) {
        if let Mode::Rename { buffer, .. } | Mode::Upload { buffer } = &mut self.mode {
            buffer.push(c);
        }
    }

    /// Remove the last character from the active prompt.
    pub fn pop_input_char(&mut self) {
        if let Mode::Rename { buffer, .. } | Mode::Upload { buffer } = &mut self.mode {
            buffer.pop();
        }
    }
}
