pub mod auth;
pub mod error;
pub mod images;
pub mod middleware;
pub mod videos;


use axum::{
    Json, Router,
    extract::DefaultBodyLimit,
    middleware::from_fn_with_state,
    routing::{get, post},
};

use montage_db::Database;
use montage_types::api::StatusResponse;

pub use auth::{AppState, AppStateInner};
pub use error::ApiError;

/// Largest accepted request body (uploads included).
pub const MAX_BODY_SIZE: usize = 16 * 1024 * 1024;

/// All API routes. Static file serving and tracing/CORS layers are added by the server.
pub fn router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/signup", post(auth::signup))
        .route("/login", post(auth::login))
        .route("/health", get(health));

    let protected_routes = Router::new()
        .route("/upload", post(images::upload_image))
        .route("/get_images", get(images::get_images))
        .route("/create_video", post(videos::create_video))
        .layer(from_fn_with_state(state.clone(), middleware::require_auth));

    Router::new()
        .merge(public_routes)
        .merge(protected_routes)
        .layer(DefaultBodyLimit::max(MAX_BODY_SIZE))
        .with_state(state)
}

async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        success: true,
        message: None,
    })
}

/// Run a blocking DB call off the async runtime.
pub(crate) async fn with_db<F, T>(state: &AppState, f: F) -> Result<T, ApiError>
where
    F: FnOnce(&Database) -> anyhow::Result<T> + Send + 'static,
    T: Send + 'static,
{
    let state = state.clone();
    tokio::task::spawn_blocking(move || f(&state.db))
        .await
        .map_err(|e| ApiError::Internal(anyhow::anyhow!("spawn_blocking join error: {}", e)))?
        .map_err(ApiError::Internal)
}
