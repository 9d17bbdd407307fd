mod config;

use std::net::SocketAddr;
use std::sync::Arc;

use tower_http::cors::CorsLayer;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use montage_api::AppStateInner;
use montage_db::Database;
use montage_types::models::{DEFAULT_MOODS, mood_file_name};
use montage_video::{FfmpegBackend, ImageFetcher, VideoPipeline};

use crate::config::Config;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    // Init logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "montage_server=debug,montage_api=debug,montage_video=debug,tower_http=debug".into()
            }),
        )
        .init();

    let config = Config::from_env()?;

    // Init database and seed the mood tracks
    let db = Database::open(&config.db_path)?;
    db.seed_audio_tracks(&config.audio_url())?;

    let audio_dir = config.audio_dir();
    for mood in DEFAULT_MOODS {
        let path = audio_dir.join(mood_file_name(mood));
        if !path.exists() {
            warn!("Audio track for {} is missing at {}", mood, path.display());
        }
    }

    let uploads_dir = config.uploads_dir();
    tokio::fs::create_dir_all(&uploads_dir).await?;

    let backend = FfmpegBackend::new(&config.ffmpeg, &config.ffprobe);
    if !backend.is_available() {
        warn!("{} not found; video creation will fail until it is installed", config.ffmpeg);
    }

    let pipeline = VideoPipeline::new(
        ImageFetcher::default(),
        Arc::new(backend),
        &uploads_dir,
        config.uploads_url(),
    )
    .with_target(config.video_output);

    let state = Arc::new(AppStateInner {
        db,
        jwt_secret: config.jwt_secret.clone(),
        token_ttl: chrono::Duration::minutes(config.token_ttl_minutes),
        uploads_dir,
        uploads_url: config.uploads_url(),
        pipeline,
    });

    let app = montage_api::router(state)
        .nest_service("/static", ServeDir::new(&config.static_dir))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http());

    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    info!("Montage server listening on {} (public URL {})", addr, config.public_url);
    info!("Video output mode: {:?}", config.video_output);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = tokio::signal::ctrl_c();
    #[cfg(unix)]
    {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                tokio::select! {
                    _ = ctrl_c => info!("Received Ctrl+C, shutting down..."),
                    _ = sigterm.recv() => info!("Received SIGTERM, shutting down..."),
                }
            }
            Err(e) => {
                warn!("Failed to install SIGTERM handler: {}", e);
                ctrl_c.await.ok();
                info!("Received Ctrl+C, shutting down...");
            }
        }
    }
    #[cfg(not(unix))]
    {
        ctrl_c.await.ok();
        info!("Received Ctrl+C, shutting down...");
    }
}
