use std::fmt;
use std::path::{Path, PathBuf};

use uuid::Uuid;

/// Opaque, immutable identifier of a song for the lifetime of the list.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct SongId(Uuid);

impl SongId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SongId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SongId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The path exactly as the user handed it to us.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceHandle(PathBuf);

impl SourceHandle {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self(path.into())
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// A resolved reference the playback engine can open directly.
///
/// Resolution canonicalizes the source path so the engine is independent of
/// the working directory. Resolution never fails: a path that cannot be
/// canonicalized (missing file, permissions) is kept verbatim and the engine
/// reports the problem when playback starts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlayableRef(PathBuf);

impl PlayableRef {
    pub fn resolve(source: &SourceHandle) -> Self {
        let path = source
            .path()
            .canonicalize()
            .unwrap_or_else(|_| source.path().to_path_buf());
        Self(path)
    }

    pub fn path(&self) -> &Path {
        &self.0
    }
}

/// One uploaded audio item.
#[derive(Debug, Clone)]
pub struct Song {
    pub id: SongId,
    pub name: String,
    pub source: SourceHandle,
    pub playable: PlayableRef,
}

impl Song {
    /// Build a song from a user supplied path, deriving its display name
    /// from the file name.
    pub fn from_path(path: impl Into<PathBuf>) -> Self {
        let source = SourceHandle::new(path);
        let name = super::display_name(source.path());
        let playable = PlayableRef::resolve(&source);

        Self {
            id: SongId::new(),
            name,
            source,
            playable,
        }
    }
}
