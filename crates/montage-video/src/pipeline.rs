//! End-to-end slideshow creation

use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;
use std::time::Duration;

use tracing::info;
use uuid::Uuid;

use crate::fetch::decode_image;
use crate::{
    Clip, ImageFetcher, MediaBackend, Resolution, Result, Timeline, VideoError, bind_audio,
};

/// File name used when every request shares one output file.
pub const SHARED_OUTPUT_NAME: &str = "output_video.mp4";

/// How output files are named inside the output directory.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputTarget {
    /// `video-<uuid>.mp4`, one file per request.
    #[default]
    Unique,
    /// Every request overwrites [`SHARED_OUTPUT_NAME`]; concurrent requests race.
    Shared,
}

impl OutputTarget {
    pub fn file_name(&self) -> String {
        match self {
            Self::Unique => format!("video-{}.mp4", Uuid::new_v4()),
            Self::Shared => SHARED_OUTPUT_NAME.to_string(),
        }
    }
}

impl FromStr for OutputTarget {
    type Err = VideoError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "unique" => Ok(Self::Unique),
            "shared" => Ok(Self::Shared),
            other => Err(VideoError::InvalidInput(format!(
                "Unknown video output mode '{}' (expected 'unique' or 'shared')",
                other
            ))),
        }
    }
}

/// Fixed encoding parameters.
#[derive(Debug, Clone, Copy)]
pub struct VideoSettings {
    pub fps: u32,
    /// How long each image stays on screen.
    pub image_duration: Duration,
}

impl Default for VideoSettings {
    fn default() -> Self {
        Self {
            fps: 24,
            image_duration: Duration::from_secs(3),
        }
    }
}

/// A finished video.
#[derive(Debug, Clone)]
pub struct VideoOutput {
    pub path: PathBuf,
    pub url: String,
    pub duration: Duration,
}

pub struct VideoPipeline {
    fetcher: ImageFetcher,
    backend: Arc<dyn MediaBackend>,
    settings: VideoSettings,
    target: OutputTarget,
    output_dir: PathBuf,
    /// Public URL prefix under which `output_dir` is served.
    output_url: String,
}

impl VideoPipeline {
    pub fn new(
        fetcher: ImageFetcher,
        backend: Arc<dyn MediaBackend>,
        output_dir: impl Into<PathBuf>,
        output_url: impl Into<String>,
    ) -> Self {
        Self {
            fetcher,
            backend,
            settings: VideoSettings::default(),
            target: OutputTarget::default(),
            output_dir: output_dir.into(),
            output_url: output_url.into().trim_end_matches('/').to_string(),
        }
    }

    pub fn with_settings(mut self, settings: VideoSettings) -> Self {
        self.settings = settings;
        self
    }

    pub fn with_target(mut self, target: OutputTarget) -> Self {
        self.target = target;
        self
    }

    pub fn settings(&self) -> VideoSettings {
        self.settings
    }

    /// Build a slideshow of `image_urls` at `resolution` over `audio_url` and
    /// return where it was written. Any fetch, decode, probe or encode failure
    /// aborts the whole request.
    pub async fn create_video(
        &self,
        image_urls: &[String],
        resolution: Resolution,
        audio_url: &str,
    ) -> Result<VideoOutput> {
        if image_urls.is_empty() {
            return Err(VideoError::InvalidInput("No images provided".to_string()));
        }

        let images = self.fetcher.fetch_all(image_urls).await?;

        let file_name = self.target.file_name();
        let path = self.output_dir.join(&file_name);
        let url = format!("{}/{}", self.output_url, file_name);

        let backend = self.backend.clone();
        let settings = self.settings;
        let urls = image_urls.to_vec();
        let audio_url = audio_url.to_string();
        let out = path.clone();

        // Decoding, resizing and encoding are CPU/process bound
        let duration = tokio::task::spawn_blocking(move || {
            let clips = urls
                .iter()
                .zip(images)
                .map(|(url, bytes)| {
                    let image = decode_image(url, &bytes)?;
                    Ok::<_, VideoError>(Clip::from_image(
                        image,
                        resolution,
                        settings.image_duration,
                        settings.fps,
                    ))
                })
                .collect::<Result<Vec<_>>>()?;

            let timeline = Timeline::compose(clips)?;
            let natural = backend.probe_duration(&audio_url)?;
            let audio = bind_audio(&audio_url, natural, timeline.duration())?;

            backend.encode(&timeline, &audio, &out)?;
            Ok::<_, VideoError>(timeline.duration())
        })
        .await
        .map_err(|e| VideoError::Task(e.to_string()))??;

        info!(
            "Created {}x{} video from {} images ({:.1}s) at {}",
            resolution.width,
            resolution.height,
            image_urls.len(),
            duration.as_secs_f64(),
            path.display()
        );

        Ok(VideoOutput {
            path,
            url,
            duration,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BoundAudio;
    use axum::{Router, extract::Path as UrlPath, http::StatusCode, routing::get};
    use image::{Rgba, RgbaImage};
    use std::io::Cursor;
    use std::path::Path;
    use std::sync::Mutex;

    /// Records what it was asked to encode and writes a placeholder file.
    struct RecordingBackend {
        natural: Duration,
        encoded: Mutex<Vec<(Duration, BoundAudio, (u32, u32))>>,
    }

    impl RecordingBackend {
        fn new(natural: Duration) -> Arc<Self> {
            Arc::new(Self {
                natural,
                encoded: Mutex::new(Vec::new()),
            })
        }
    }

    impl MediaBackend for RecordingBackend {
        fn probe_duration(&self, _source: &str) -> Result<Duration> {
            Ok(self.natural)
        }

        fn encode(&self, timeline: &Timeline, audio: &BoundAudio, output: &Path) -> Result<()> {
            std::fs::create_dir_all(output.parent().unwrap())?;
            std::fs::write(output, format!("{} clips", timeline.clips().len()))?;
            self.encoded.lock().unwrap().push((
                timeline.duration(),
                audio.clone(),
                (timeline.width(), timeline.height()),
            ));
            Ok(())
        }
    }

    fn png(w: u32, h: u32) -> Vec<u8> {
        let img = RgbaImage::from_pixel(w, h, Rgba([0, 128, 255, 255]));
        let mut out = Vec::new();
        img.write_to(&mut Cursor::new(&mut out), image::ImageFormat::Png)
            .unwrap();
        out
    }

    /// Serves `/img/{w}x{h}.png` as a solid PNG and 404s everything else.
    async fn image_server() -> String {
        async fn serve(
            UrlPath(name): UrlPath<String>,
        ) -> std::result::Result<Vec<u8>, StatusCode> {
            let dims = name.strip_suffix(".png").ok_or(StatusCode::NOT_FOUND)?;
            let (w, h) = dims.split_once('x').ok_or(StatusCode::NOT_FOUND)?;
            let w = w.parse::<u32>().map_err(|_| StatusCode::NOT_FOUND)?;
            let h = h.parse::<u32>().map_err(|_| StatusCode::NOT_FOUND)?;
            Ok(png(w, h))
        }

        let app = Router::new().route("/img/{name}", get(serve));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn pipeline(backend: Arc<RecordingBackend>, dir: &Path, target: OutputTarget) -> VideoPipeline {
        VideoPipeline::new(
            ImageFetcher::default(),
            backend,
            dir,
            "http://localhost:5000/static/uploads/",
        )
        .with_target(target)
    }

    #[tokio::test]
    async fn short_audio_is_looped_to_timeline_length() {
        let base = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(Duration::from_secs(4));
        let pipeline = pipeline(backend.clone(), dir.path(), OutputTarget::Unique);

        let urls: Vec<String> = ["40x30", "10x10", "64x48", "7x5"]
            .iter()
            .map(|d| format!("{}/img/{}.png", base, d))
            .collect();
        let output = pipeline
            .create_video(&urls, Resolution::new(640, 360), "http://h/Audio/Epic.mp3")
            .await
            .unwrap();

        assert_eq!(output.duration, Duration::from_secs(12));
        assert!(output.path.exists());
        assert!(output.url.starts_with("http://localhost:5000/static/uploads/video-"));

        let encoded = backend.encoded.lock().unwrap();
        let (timeline, audio, canvas) = &encoded[0];
        assert_eq!(*timeline, Duration::from_secs(12));
        assert_eq!(audio.duration, Duration::from_secs(12));
        assert_eq!(audio.loops, 3);
        assert_eq!(audio.source, "http://h/Audio/Epic.mp3");
        assert_eq!(*canvas, (640, 360));
    }

    #[tokio::test]
    async fn shared_output_is_overwritten() {
        let base = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(Duration::from_secs(30));
        let pipeline = pipeline(backend.clone(), dir.path(), OutputTarget::Shared);

        let one = vec![format!("{}/img/8x8.png", base)];
        let two = vec![one[0].clone(), format!("{}/img/4x4.png", base)];

        let first = pipeline.create_video(&one, Resolution::new(640, 360), "a.mp3").await.unwrap();
        let second = pipeline.create_video(&two, Resolution::new(640, 360), "a.mp3").await.unwrap();

        assert_eq!(first.url, "http://localhost:5000/static/uploads/output_video.mp4");
        assert_eq!(first.url, second.url);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
        assert_eq!(std::fs::read_to_string(&second.path).unwrap(), "2 clips");
        assert_eq!(backend.encoded.lock().unwrap().len(), 2);
    }

    #[tokio::test]
    async fn unique_outputs_accumulate() {
        let base = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(Duration::from_secs(30));
        let pipeline = pipeline(backend, dir.path(), OutputTarget::Unique);

        let urls = vec![format!("{}/img/8x8.png", base)];
        let a = pipeline.create_video(&urls, Resolution::new(854, 480), "a.mp3").await.unwrap();
        let b = pipeline.create_video(&urls, Resolution::new(854, 480), "a.mp3").await.unwrap();

        assert_ne!(a.path, b.path);
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 2);
    }

    #[tokio::test]
    async fn any_failed_fetch_fails_the_request() {
        let base = image_server().await;
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(Duration::from_secs(30));
        let pipeline = pipeline(backend.clone(), dir.path(), OutputTarget::Unique);

        let urls = vec![
            format!("{}/img/8x8.png", base),
            format!("{}/img/missing.gif", base),
        ];
        let err = pipeline
            .create_video(&urls, Resolution::new(640, 360), "a.mp3")
            .await
            .unwrap_err();

        assert!(matches!(err, VideoError::Fetch { .. }));
        assert!(backend.encoded.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn empty_request_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let backend = RecordingBackend::new(Duration::from_secs(30));
        let pipeline = pipeline(backend, dir.path(), OutputTarget::Unique);

        let err = pipeline
            .create_video(&[], Resolution::new(640, 360), "a.mp3")
            .await
            .unwrap_err();
        assert!(matches!(err, VideoError::InvalidInput(_)));
    }

    #[test]
    fn output_target_parsing() {
        assert_eq!("shared".parse::<OutputTarget>().unwrap(), OutputTarget::Shared);
        assert_eq!(" Unique ".parse::<OutputTarget>().unwrap(), OutputTarget::Unique);
        assert!("sometimes".parse::<OutputTarget>().is_err());
    }
}
