//! HTTP API handlers for songbook-server

pub mod flags;
pub mod health;
pub mod reviewed;
pub mod songs;

pub use flags::{get_flags, set_flag};
pub use health::health_routes;
pub use reviewed::set_reviewed;
pub use songs::{create_song, get_song, list_songs, save_song};
