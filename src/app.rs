//! Application module: exposes the app model used by the TUI and runtime.
//!
//! The `App` model lives in `app::model` and holds the song list, the player
//! controller, the cursor and the gesture currently in progress.

mod model;

pub use model::*;
