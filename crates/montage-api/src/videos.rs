use axum::{
    Extension, Json,
    extract::{State, rejection::JsonRejection},
};
use tracing::info;

use montage_types::api::{Claims, CreateVideoRequest, CreateVideoResponse};
use montage_video::parse_resolution;

use crate::auth::AppState;
use crate::error::ApiError;
use crate::with_db;

/// POST /create_video: render the given images over the mood's track.
///
/// Blocks until encoding finishes; the response carries the video's public URL.
pub async fn create_video(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    payload: Result<Json<CreateVideoRequest>, JsonRejection>,
) -> Result<Json<CreateVideoResponse>, ApiError> {
    let Json(req) = payload?;

    let mood = req.audio_mood.clone();
    let track = with_db(&state, move |db| db.get_audio_track_by_mood(&mood))
        .await?
        .ok_or_else(|| ApiError::NotFound("Audio file not found".into()))?;

    let resolution = parse_resolution(&req.resolution);
    info!(
        "{} requested a {}x{} video of {} images with {} audio",
        claims.username,
        resolution.width,
        resolution.height,
        req.image_urls.len(),
        track.mood
    );

    let output = state
        .pipeline
        .create_video(&req.image_urls, resolution, &track.url)
        .await?;

    Ok(Json(CreateVideoResponse {
        success: true,
        video_url: output.url,
    }))
}
