//! Song endpoints: list, read, create, update
//!
//! Create and update schedule the build pipeline once the write succeeded;
//! the response does not wait for it.

use axum::{
    extract::{rejection::JsonRejection, Path, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiResult;
use crate::AppState;

/// Request body for create/update
#[derive(Debug, Deserialize)]
pub struct SongContent {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SongListResponse {
    pub songs: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SongContentResponse {
    pub content: String,
}

#[derive(Debug, Serialize)]
pub struct SaveResponse {
    pub message: String,
    pub filename: String,
}

/// GET /api/songs
pub async fn list_songs(State(state): State<AppState>) -> ApiResult<Json<SongListResponse>> {
    let songs = state.songs.list().await?;
    Ok(Json(SongListResponse { songs }))
}

/// GET /api/songs/:filename
pub async fn get_song(
    State(state): State<AppState>,
    Path(filename): Path<String>,
) -> ApiResult<Json<SongContentResponse>> {
    let content = state.songs.read(&filename).await?;
    Ok(Json(SongContentResponse { content }))
}

/// POST /api/songs/create
///
/// The filename comes from the `{title: ...}` directive; clients never pick it.
pub async fn create_song(
    State(state): State<AppState>,
    payload: Result<Json<SongContent>, JsonRejection>,
) -> ApiResult<Json<SaveResponse>> {
    let Json(song) = payload?;
    let filename = state.songs.create(&song.content).await?;
    state.build.trigger();

    Ok(Json(SaveResponse {
        message: "Song created successfully and build triggered".to_string(),
        filename,
    }))
}

/// POST|PUT /api/songs/:filename
///
/// Overwrites an existing song; unknown filenames are 404.
pub async fn save_song(
    State(state): State<AppState>,
    Path(filename): Path<String>,
    payload: Result<Json<SongContent>, JsonRejection>,
) -> ApiResult<Json<SaveResponse>> {
    songbook_common::songs::validate_filename(&filename)?;
    let Json(song) = payload?;

    state.songs.update(&filename, &song.content).await?;
    state.build.trigger();

    Ok(Json(SaveResponse {
        message: "Song saved successfully and build triggered".to_string(),
        filename,
    }))
}
