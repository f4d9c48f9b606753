//! Storage health endpoint
//!
//! Reports whether the songs directory can be listed and the flag file
//! parsed. Both are read on every call; nothing is cached.

use axum::{extract::State, http::StatusCode, routing::get, Json, Router};
use serde::Serialize;

use crate::AppState;

#[derive(Debug, Serialize)]
pub struct SongsHealth {
    pub path: String,
    /// Directory present on disk (it is created lazily on first create)
    pub exists: bool,
    pub song_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct FlagsHealth {
    pub path: String,
    pub flagged_count: Option<usize>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct HealthResponse {
    /// `ok`, or `degraded` when either store is unreadable
    pub status: &'static str,
    pub version: &'static str,
    pub songs: SongsHealth,
    pub flags: FlagsHealth,
    pub build_enabled: bool,
}

/// GET /health
///
/// 200 when both stores are readable, 503 otherwise.
pub async fn health_check(State(state): State<AppState>) -> (StatusCode, Json<HealthResponse>) {
    let songs_dir = state.songs.dir();
    let exists = tokio::fs::metadata(songs_dir)
        .await
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    let (song_count, songs_error) = match state.songs.list().await {
        Ok(songs) => (Some(songs.len()), None),
        Err(e) => (None, Some(e.to_string())),
    };
    let (flagged_count, flags_error) = match state.flags.load().await {
        Ok(flags) => (Some(flags.len()), None),
        Err(e) => (None, Some(e.to_string())),
    };

    let healthy = songs_error.is_none() && flags_error.is_none();
    let status = if healthy { StatusCode::OK } else { StatusCode::SERVICE_UNAVAILABLE };

    let body = HealthResponse {
        status: if healthy { "ok" } else { "degraded" },
        version: env!("CARGO_PKG_VERSION"),
        songs: SongsHealth {
            path: songs_dir.display().to_string(),
            exists,
            song_count,
            error: songs_error,
        },
        flags: FlagsHealth {
            path: state.flags.path().display().to_string(),
            flagged_count,
            error: flags_error,
        },
        build_enabled: state.build.is_enabled(),
    };

    (status, Json(body))
}

pub fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
