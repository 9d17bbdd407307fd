use axum::{
    Extension, Json,
    extract::{Multipart, State},
    response::IntoResponse,
};
use tracing::{error, info};
use uuid::Uuid;

use montage_types::api::{Claims, ImagesResponse, UploadResponse};

use crate::auth::AppState;
use crate::error::ApiError;
use crate::with_db;

/// Accepted upload extensions, compared case-insensitively.
pub const ALLOWED_EXTENSIONS: &[&str] = &["jpg", "jpeg", "png"];

/// Lowercased extension of `filename` if it is an accepted image type.
pub fn allowed_extension(filename: &str) -> Option<String> {
    let (_, ext) = filename.rsplit_once('.')?;
    let ext = ext.to_ascii_lowercase();
    ALLOWED_EXTENSIONS.contains(&ext.as_str()).then_some(ext)
}

/// POST /upload: multipart form with a `file` part. Saves the image under
/// the uploads directory as `{uuid}.{ext}` and records it for the caller.
pub async fn upload_image(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
    mut multipart: Multipart,
) -> Result<impl IntoResponse, ApiError> {
    let mut upload = None;
    while let Some(field) = multipart.next_field().await.map_err(ApiError::from)? {
        if field.name() != Some("file") {
            continue;
        }
        let filename = field.file_name().unwrap_or_default().to_string();
        let data = field.bytes().await.map_err(ApiError::from)?;
        upload = Some((filename, data));
        break;
    }

    let (filename, data) = upload.ok_or_else(|| ApiError::BadRequest("No file part".into()))?;
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No selected file".into()));
    }
    let ext = allowed_extension(&filename)
        .ok_or_else(|| ApiError::BadRequest("File type not allowed".into()))?;

    let user_id = claims.sub.to_string();
    let uid = user_id.clone();
    if with_db(&state, move |db| db.get_user_by_id(&uid)).await?.is_none() {
        return Err(ApiError::NotFound("User not found".into()));
    }

    // Ensure uploads directory exists
    tokio::fs::create_dir_all(&state.uploads_dir)
        .await
        .map_err(|e| {
            error!("Failed to create uploads directory: {}", e);
            ApiError::Internal(e.into())
        })?;

    let image_id = Uuid::new_v4().to_string();
    let stored_name = format!("{}.{}", image_id, ext);
    let file_path = state.uploads_dir.join(&stored_name);
    tokio::fs::write(&file_path, &data).await.map_err(|e| {
        error!("Failed to write file {}: {}", file_path.display(), e);
        ApiError::Internal(e.into())
    })?;

    let image_url = format!("{}/{}", state.uploads_url, stored_name);

    let url = image_url.clone();
    with_db(&state, move |db| db.insert_image(&image_id, &user_id, &url)).await?;

    info!(
        "{} uploaded {} ({} bytes) as {}",
        claims.username,
        filename,
        data.len(),
        stored_name
    );

    Ok(Json(UploadResponse {
        success: true,
        message: "File uploaded".into(),
        image_url,
    }))
}

/// GET /get_images: URLs of the caller's uploads, oldest first.
pub async fn get_images(
    State(state): State<AppState>,
    Extension(claims): Extension<Claims>,
) -> Result<impl IntoResponse, ApiError> {
    let user_id = claims.sub.to_string();
    let images = with_db(&state, move |db| {
        if db.get_user_by_id(&user_id)?.is_none() {
            return Ok(None);
        }
        Ok(Some(db.get_images_for_user(&user_id)?))
    })
    .await?
    .ok_or_else(|| ApiError::NotFound("User not found".into()))?;

    Ok(Json(ImagesResponse {
        success: true,
        images: images.into_iter().map(|row| row.url).collect(),
    }))
}
