//! Reviewed-status endpoint
//!
//! The song is located by the slug of its title, then its reviewed
//! directive is rewritten in place.

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};
use songbook_common::directive;
use tracing::info;

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct ReviewedRequest {
    pub song_id: String,
    pub reviewed: bool,
}

#[derive(Debug, Serialize)]
pub struct ReviewedResponse {
    pub success: bool,
    pub message: String,
    pub reviewed: bool,
}

/// POST /api/reviewed
pub async fn set_reviewed(
    State(state): State<AppState>,
    payload: Result<Json<ReviewedRequest>, JsonRejection>,
) -> ApiResult<Json<ReviewedResponse>> {
    let Json(request) = payload?;
    let song_id = request.song_id.trim();
    if song_id.is_empty() {
        return Err(ApiError::BadRequest("song_id must not be empty".to_string()));
    }

    let path = state
        .songs
        .find_by_identifier(song_id)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to look up song {}: {}", song_id, e)))?
        .ok_or_else(|| ApiError::NotFound(format!("Song not found: {}", song_id)))?;

    directive::set_reviewed(&path, request.reviewed)
        .await
        .map_err(|e| ApiError::Internal(format!("Failed to update reviewed status: {}", e)))?;

    info!("Marked {} reviewed={}", path.display(), request.reviewed);
    state.build.trigger();

    Ok(Json(ReviewedResponse {
        success: true,
        message: format!("Reviewed status updated for {}", song_id),
        reviewed: request.reviewed,
    }))
}
