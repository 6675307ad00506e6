//! The song list: ordered songs plus the "upload" helpers that turn user
//! supplied paths into songs.
//!
//! Order is user-significant (display order and playback order). The list is
//! only ever appended to, spliced and renamed in place.

mod model;
mod store;
mod upload;

pub use model::*;
pub use store::SongList;
pub use upload::{collect_upload, display_name};
