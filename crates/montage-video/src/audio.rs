//! Fitting a background track to the timeline

use std::time::Duration;

use crate::{Result, VideoError};

/// A track looped and trimmed so that it lasts exactly `duration`.
#[derive(Debug, Clone, PartialEq)]
pub struct BoundAudio {
    /// URL or path handed to the encoder.
    pub source: String,
    pub natural_duration: Duration,
    /// Total number of times the track is played back to back.
    pub loops: u32,
    pub duration: Duration,
}

/// Loop `source` until it covers `timeline`, then trim it to exactly `timeline`.
pub fn bind_audio(source: &str, natural_duration: Duration, timeline: Duration) -> Result<BoundAudio> {
    if natural_duration.is_zero() {
        return Err(VideoError::Probe(format!("{} has no duration", source)));
    }

    let loops = if natural_duration < timeline {
        (timeline.as_secs_f64() / natural_duration.as_secs_f64()).ceil() as u32
    } else {
        1
    };

    Ok(BoundAudio {
        source: source.to_string(),
        natural_duration,
        loops: loops.max(1),
        duration: timeline,
    })
}
