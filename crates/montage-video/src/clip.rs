//! Fixed-length clips built from still images

use std::time::Duration;

use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::Resolution;

/// One still image shown for a fixed duration.
#[derive(Debug, Clone)]
pub struct Clip {
    pub frame: RgbaImage,
    pub duration: Duration,
    pub fps: u32,
}

impl Clip {
    /// Resize `image` exactly to `resolution` and hold it for `duration`.
    /// Transparent areas are flattened onto black.
    pub fn from_image(image: RgbaImage, resolution: Resolution, duration: Duration, fps: u32) -> Self {
        let mut frame = if image.dimensions() == (resolution.width, resolution.height) {
            image
        } else {
            imageops::resize(&image, resolution.width, resolution.height, FilterType::Lanczos3)
        };
        flatten_onto_black(&mut frame);

        Self {
            frame,
            duration,
            fps,
        }
    }

    pub fn width(&self) -> u32 {
        self.frame.width()
    }

    pub fn height(&self) -> u32 {
        self.frame.height()
    }

    /// Number of frames this clip occupies at its frame rate (at least one).
    pub fn frame_count(&self) -> u64 {
        let frames = (self.duration.as_secs_f64() * self.fps as f64).round() as u64;
        frames.max(1)
    }
}

/// ffmpeg drops alpha when converting to yuv420p, so frames must be opaque.
fn flatten_onto_black(frame: &mut RgbaImage) {
    for px in frame.pixels_mut() {
        let a = px[3] as u16;
        if a == 255 {
            continue;
        }
        for c in 0..3 {
            px[c] = ((px[c] as u16 * a + 127) / 255) as u8;
        }
        px[3] = 255;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resizes_to_target_and_counts_frames() {
        let img = RgbaImage::from_pixel(2, 2, image::Rgba([255, 0, 0, 255]));
        let clip = Clip::from_image(img, Resolution::new(640, 360), Duration::from_secs(3), 24);

        assert_eq!((clip.width(), clip.height()), (640, 360));
        assert_eq!(clip.frame_count(), 72);
        let px = clip.frame.get_pixel(320, 180).0;
        assert!(px[0] >= 250 && px[1] <= 5 && px[2] <= 5);
    }

    #[test]
    fn transparency_is_flattened_onto_black() {
        let mut img = RgbaImage::from_pixel(4, 4, image::Rgba([255, 255, 255, 0]));
        img.put_pixel(1, 1, image::Rgba([200, 100, 50, 128]));
        img.put_pixel(2, 2, image::Rgba([10, 20, 30, 255]));

        let clip = Clip::from_image(img, Resolution::new(4, 4), Duration::from_secs(3), 24);
        assert_eq!(clip.frame.get_pixel(0, 0).0, [0, 0, 0, 255]);
        assert_eq!(clip.frame.get_pixel(1, 1).0, [100, 50, 25, 255]);
        assert_eq!(clip.frame.get_pixel(2, 2).0, [10, 20, 30, 255]);
    }

    #[test]
    fn short_clip_still_gets_a_frame() {
        let img = RgbaImage::new(4, 4);
        let clip = Clip::from_image(img, Resolution::new(4, 4), Duration::from_millis(1), 24);
        assert_eq!(clip.frame_count(), 1);
    }
}
