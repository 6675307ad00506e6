use std::path::PathBuf;

use tracing::debug;

use super::model::{Song, SongId};

/// Ordered collection of songs.
///
/// None of the mutators fail: operations naming an unknown id are ignored.
#[derive(Debug, Default)]
pub struct SongList {
    songs: Vec<Song>,
}

impl SongList {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append one song per path, preserving input order.
    ///
    /// Any file is accepted; nothing is opened or validated here. Returns the
    /// ids of the new songs in the order they were appended.
    pub fn add_songs<I, P>(&mut self, files: I) -> Vec<SongId>
    where
        I: IntoIterator<Item = P>,
        P: Into<PathBuf>,
    {
        let start = self.songs.len();
        self.songs.extend(files.into_iter().map(Song::from_path));

        let added: Vec<SongId> = self.songs[start..].iter().map(|s| s.id).collect();
        debug!(count = added.len(), total = self.songs.len(), "songs added");
        added
    }

    /// Move `id` to the position currently held by `target`.
    ///
    /// Returns `true` when the order changed. Same id, unknown ids and
    /// coinciding positions leave the list untouched.
    pub fn move_song(&mut self, id: SongId, target: SongId) -> bool {
        if id == target {
            return false;
        }

        let (Some(from), Some(to)) = (self.position(id), self.position(target)) else {
            debug!(%id, %target, "move ignored: unknown song");
            return false;
        };
        if from == to {
            return false;
        }

        let song = self.songs.remove(from);
        self.songs.insert(to, song);
        debug!(%id, from, to, "song moved");
        true
    }

    /// Rename a song to the trimmed `new_name`.
    ///
    /// Empty or whitespace-only names keep the previous name. Returns `true`
    /// when the stored name was replaced.
    pub fn rename_song(&mut self, id: SongId, new_name: &str) -> bool {
        let trimmed = new_name.trim();
        if trimmed.is_empty() {
            debug!(%id, "rename ignored: empty name");
            return false;
        }

        match self.songs.iter_mut().find(|s| s.id == id) {
            Some(song) => {
                song.name = trimmed.to_string();
                true
            }
            None => {
                debug!(%id, "rename ignored: unknown song");
                false
            }
        }
    }

    pub fn get(&self, id: SongId) -> Option<&Song> {
        self.songs.iter().find(|s| s.id == id)
    }

    pub fn position(&self, id: SongId) -> Option<usize> {
        self.songs.iter().position(|s| s.id == id)
    }

    pub fn at(&self, index: usize) -> Option<&Song> {
        self.songs.get(index)
    }

    /// Ids in list order.
    #[cfg(test)]
    pub fn ids(&self) -> Vec<SongId> {
        self.songs.iter().map(|s| s.id).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Song> {
        self.songs.iter()
    }

    pub fn len(&self) -> usize {
        self.songs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.songs.is_empty()
    }
}
