//! Flagged-songs endpoints

use axum::{
    extract::{rejection::JsonRejection, State},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::error::{ApiError, ApiResult};
use crate::AppState;

#[derive(Debug, Deserialize)]
pub struct FlagRequest {
    pub song_id: String,
    pub flagged: bool,
}

#[derive(Debug, Serialize)]
pub struct FlagsResponse {
    pub flagged: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct FlagToggleResponse {
    pub message: String,
    pub flagged: Vec<String>,
}

/// GET /api/flags
pub async fn get_flags(State(state): State<AppState>) -> ApiResult<Json<FlagsResponse>> {
    let flagged = state.flags.load().await?.into_iter().collect();
    Ok(Json(FlagsResponse { flagged }))
}

/// POST /api/flags
pub async fn set_flag(
    State(state): State<AppState>,
    payload: Result<Json<FlagRequest>, JsonRejection>,
) -> ApiResult<Json<FlagToggleResponse>> {
    let Json(request) = payload?;
    let song_id = request.song_id.trim();
    if song_id.is_empty() {
        return Err(ApiError::BadRequest("song_id must not be empty".to_string()));
    }

    let flagged = state.flags.toggle(song_id, request.flagged).await?;
    let message = if request.flagged {
        format!("Song {} flagged", song_id)
    } else {
        format!("Song {} unflagged", song_id)
    };

    Ok(Json(FlagToggleResponse {
        message,
        flagged: flagged.into_iter().collect(),
    }))
}
