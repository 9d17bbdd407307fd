use std::path::PathBuf;

use anyhow::{Context, Result, bail};

use montage_video::OutputTarget;

/// Placeholder JWT secrets that MUST NOT be used.
const PLACEHOLDER_SECRETS: &[&str] = &[
    "change-me-to-a-random-string",
    "dev-secret-change-me",
];

/// Server settings, read from `MONTAGE_*` environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub db_path: PathBuf,
    pub static_dir: PathBuf,
    /// Externally reachable base URL, e.g. `http://127.0.0.1:5000`.
    pub public_url: String,
    pub jwt_secret: String,
    pub token_ttl_minutes: i64,
    pub video_output: OutputTarget,
    pub ffmpeg: String,
    pub ffprobe: String,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let var = |key: &str, default: &str| get(key).unwrap_or_else(|| default.to_string());

        let jwt_secret = get("MONTAGE_JWT_SECRET").unwrap_or_default();
        if jwt_secret.is_empty() || PLACEHOLDER_SECRETS.contains(&jwt_secret.as_str()) {
            bail!("MONTAGE_JWT_SECRET is unset or still a placeholder; set it in your .env file");
        }

        let port: u16 = var("MONTAGE_PORT", "5000")
            .parse()
            .context("MONTAGE_PORT must be a port number")?;
        let token_ttl_minutes: i64 = var("MONTAGE_TOKEN_TTL_MINUTES", "15")
            .parse()
            .context("MONTAGE_TOKEN_TTL_MINUTES must be an integer")?;
        if token_ttl_minutes <= 0 {
            bail!("MONTAGE_TOKEN_TTL_MINUTES must be positive");
        }
        let video_output: OutputTarget = var("MONTAGE_VIDEO_OUTPUT", "unique").parse()?;

        Ok(Self {
            host: var("MONTAGE_HOST", "0.0.0.0"),
            port,
            db_path: var("MONTAGE_DB_PATH", "montage.db").into(),
            static_dir: var("MONTAGE_STATIC_DIR", "./static").into(),
            public_url: var("MONTAGE_PUBLIC_URL", "http://127.0.0.1:5000")
                .trim_end_matches('/')
                .to_string(),
            jwt_secret,
            token_ttl_minutes,
            video_output,
            ffmpeg: var("MONTAGE_FFMPEG", "ffmpeg"),
            ffprobe: var("MONTAGE_FFPROBE", "ffprobe"),
        })
    }

    pub fn uploads_dir(&self) -> PathBuf {
        self.static_dir.join("uploads")
    }

    pub fn audio_dir(&self) -> PathBuf {
        self.static_dir.join("Audio")
    }

    pub fn uploads_url(&self) -> String {
        format!("{}/static/uploads", self.public_url)
    }

    pub fn audio_url(&self) -> String {
        format!("{}/static/Audio", self.public_url)
    }
}
