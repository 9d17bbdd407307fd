//! Clip concatenation

use std::time::Duration;

use image::{Rgba, RgbaImage, imageops};

use crate::{Clip, Result, VideoError};

/// Ordered clips played back to back on a shared canvas.
///
/// The canvas is as large as the largest clip in each dimension. Smaller
/// clips are centred over black, so every clip keeps its own size.
#[derive(Debug, Clone)]
pub struct Timeline {
    clips: Vec<Clip>,
    width: u32,
    height: u32,
    fps: u32,
}

impl Timeline {
    /// Concatenate `clips` in order. All clips must share a frame rate.
    pub fn compose(clips: Vec<Clip>) -> Result<Self> {
        let first = clips
            .first()
            .ok_or_else(|| VideoError::InvalidInput("No clips provided".to_string()))?;
        let fps = first.fps;

        if let Some(other) = clips.iter().find(|c| c.fps != fps) {
            return Err(VideoError::InvalidInput(format!(
                "Mixed frame rates on one timeline: {} and {}",
                fps, other.fps
            )));
        }

        let width = clips.iter().map(Clip::width).max().unwrap_or(0);
        let height = clips.iter().map(Clip::height).max().unwrap_or(0);

        Ok(Self {
            clips,
            width,
            height,
            fps,
        })
    }

    pub fn clips(&self) -> &[Clip] {
        &self.clips
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn fps(&self) -> u32 {
        self.fps
    }

    /// Sum of clip durations.
    pub fn duration(&self) -> Duration {
        self.clips.iter().map(|c| c.duration).sum()
    }

    pub fn frame_count(&self) -> u64 {
        self.clips.iter().map(Clip::frame_count).sum()
    }

    /// The canvas-sized frame shown for clip `index`.
    pub fn canvas_frame(&self, index: usize) -> Option<RgbaImage> {
        let clip = self.clips.get(index)?;
        if clip.width() == self.width && clip.height() == self.height {
            return Some(clip.frame.clone());
        }

        let mut canvas = RgbaImage::from_pixel(self.width, self.height, Rgba([0, 0, 0, 255]));
        let x = (self.width - clip.width()) / 2;
        let y = (self.height - clip.height()) / 2;
        imageops::overlay(&mut canvas, &clip.frame, x as i64, y as i64);
        Some(canvas)
    }
}
