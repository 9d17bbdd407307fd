//! External encoder: ffprobe for audio length, ffmpeg for the final mp4

use std::io::Write;
use std::path::Path;
use std::process::{Command, Stdio};
use std::time::Duration;

use tracing::{debug, info};

use crate::{BoundAudio, Result, Timeline, VideoError};

/// The media tooling the pipeline delegates to.
pub trait MediaBackend: Send + Sync {
    /// Natural playback length of an audio source.
    fn probe_duration(&self, source: &str) -> Result<Duration>;

    /// Render `timeline` with `audio` to `output`, replacing any existing file.
    fn encode(&self, timeline: &Timeline, audio: &BoundAudio, output: &Path) -> Result<()>;
}

/// Drives the system `ffmpeg` / `ffprobe` binaries.
#[derive(Debug, Clone)]
pub struct FfmpegBackend {
    ffmpeg: String,
    ffprobe: String,
}

impl Default for FfmpegBackend {
    fn default() -> Self {
        Self::new("ffmpeg", "ffprobe")
    }
}

impl FfmpegBackend {
    pub fn new(ffmpeg: impl Into<String>, ffprobe: impl Into<String>) -> Self {
        Self {
            ffmpeg: ffmpeg.into(),
            ffprobe: ffprobe.into(),
        }
    }

    pub fn is_available(&self) -> bool {
        Command::new(&self.ffmpeg)
            .arg("-version")
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .status()
            .map(|s| s.success())
            .unwrap_or(false)
    }
}

impl MediaBackend for FfmpegBackend {
    fn probe_duration(&self, source: &str) -> Result<Duration> {
        let output = Command::new(&self.ffprobe)
            .args([
                "-v",
                "error",
                "-show_entries",
                "format=duration",
                "-of",
                "default=noprint_wrappers=1:nokey=1",
                source,
            ])
            .output()
            .map_err(|e| VideoError::Probe(format!("Failed to run ffprobe: {}", e)))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(VideoError::Probe(format!("ffprobe failed on {}: {}", source, stderr.trim())));
        }

        parse_probe_output(&String::from_utf8_lossy(&output.stdout))
    }

    fn encode(&self, timeline: &Timeline, audio: &BoundAudio, output: &Path) -> Result<()> {
        if let Some(parent) = output.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let args = encode_args(timeline, audio, output);
        debug!("Running {} {}", self.ffmpeg, args.join(" "));

        let mut child = Command::new(&self.ffmpeg)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::null())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| VideoError::Ffmpeg(format!("Failed to start ffmpeg: {}", e)))?;

        let mut stdin = child
            .stdin
            .take()
            .ok_or_else(|| VideoError::Ffmpeg("FFmpeg stdin not available".to_string()))?;

        for (index, clip) in timeline.clips().iter().enumerate() {
            let frame = timeline
                .canvas_frame(index)
                .ok_or_else(|| VideoError::InvalidInput(format!("Missing clip {}", index)))?;
            let data = frame.as_raw();
            for _ in 0..clip.frame_count() {
                stdin
                    .write_all(data)
                    .map_err(|e| VideoError::Ffmpeg(format!("Failed to write frame: {}", e)))?;
            }
        }

        // Close stdin to signal end of input
        drop(stdin);

        let result = child
            .wait_with_output()
            .map_err(|e| VideoError::Ffmpeg(format!("Failed to wait for ffmpeg: {}", e)))?;
        if !result.status.success() {
            let stderr = String::from_utf8_lossy(&result.stderr);
            return Err(VideoError::Ffmpeg(format!(
                "ffmpeg exited with {}: {}",
                result.status,
                stderr.trim()
            )));
        }

        info!(
            "Encoded {} frames ({:.1}s) to {}",
            timeline.frame_count(),
            timeline.duration().as_secs_f64(),
            output.display()
        );
        Ok(())
    }
}

/// Arguments for an ffmpeg run that reads raw RGBA frames from stdin and
/// muxes them with the looped, trimmed audio source.
pub fn encode_args(timeline: &Timeline, audio: &BoundAudio, output: &Path) -> Vec<String> {
    let mut args: Vec<String> = vec![
        "-y".into(),
        "-loglevel".into(),
        "error".into(),
        "-f".into(),
        "rawvideo".into(),
        "-pix_fmt".into(),
        "rgba".into(),
        "-s".into(),
        format!("{}x{}", timeline.width(), timeline.height()),
        "-r".into(),
        timeline.fps().to_string(),
        "-i".into(),
        "pipe:0".into(),
    ];

    if audio.loops > 1 {
        args.push("-stream_loop".into());
        args.push((audio.loops - 1).to_string());
    }
    args.push("-i".into());
    args.push(audio.source.clone());

    args.extend(
        [
            "-map", "0:v:0", "-map", "1:a:0", "-c:v", "libx264", "-pix_fmt", "yuv420p", "-r",
        ]
        .map(String::from),
    );
    args.push(timeline.fps().to_string());
    args.extend(["-c:a", "aac", "-t"].map(String::from));
    args.push(format!("{:.3}", audio.duration.as_secs_f64()));
    args.extend(["-movflags", "+faststart"].map(String::from));
    args.push(output.to_string_lossy().into_owned());

    args
}

/// Parse ffprobe's bare `format=duration` output, e.g. `"187.402449\n"`.
pub fn parse_probe_output(stdout: &str) -> Result<Duration> {
    let text = stdout.trim();
    let secs: f64 = text
        .parse()
        .map_err(|_| VideoError::Probe(format!("Unexpected ffprobe output: {:?}", text)))?;

    if !secs.is_finite() || secs <= 0.0 {
        return Err(VideoError::Probe(format!("Invalid duration: {}", secs)));
    }
    Ok(Duration::from_secs_f64(secs))
}
