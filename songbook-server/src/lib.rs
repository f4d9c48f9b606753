//! songbook-server library - HTTP backend for the chord-sheet songbook
//!
//! Serves the songs directory and the flag index over a JSON API and kicks
//! off the build pipeline after every content change.

use std::sync::Arc;

use axum::Router;
use songbook_common::config::Config;
use songbook_common::{FlagStore, SongStore};
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

pub mod api;
pub mod build_trigger;
pub mod error;

pub use build_trigger::BuildTrigger;

/// Application state shared across HTTP handlers
#[derive(Clone)]
pub struct AppState {
    pub songs: SongStore,
    pub flags: Arc<FlagStore>,
    pub build: BuildTrigger,
}

impl AppState {
    pub fn new(songs: SongStore, flags: FlagStore, build: BuildTrigger) -> Self {
        Self {
            songs,
            flags: Arc::new(flags),
            build,
        }
    }

    /// Wire stores and the build trigger from resolved configuration
    pub fn from_config(config: &Config) -> Self {
        let songs = SongStore::new(&config.songs_dir);
        let build = BuildTrigger::new(config.build.clone(), &config.base_dir, songs.clone());
        Self::new(songs, FlagStore::new(&config.flags_file), build)
    }
}

/// Build application router
pub fn build_router(state: AppState) -> Router {
    use axum::routing::{get, post};

    let api = Router::new()
        .route("/api/songs", get(api::list_songs))
        .route("/api/songs/create", post(api::create_song))
        .route(
            "/api/songs/:filename",
            get(api::get_song).post(api::save_song).put(api::save_song),
        )
        .route("/api/flags", get(api::get_flags).post(api::set_flag))
        .route("/api/reviewed", post(api::set_reviewed));

    Router::new()
        .merge(api)
        .merge(api::health_routes())
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}
