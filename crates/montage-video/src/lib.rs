//! Slideshow video generation.
//!
//! Still images are fetched over HTTP, turned into fixed-length clips,
//! laid out on a single timeline and encoded together with a background
//! track that is looped and trimmed to the timeline's length.

pub mod audio;
pub mod clip;
pub mod encode;
pub mod error;
pub mod fetch;
pub mod pipeline;
pub mod resolution;
pub mod timeline;

pub use audio::{BoundAudio, bind_audio};
pub use clip::Clip;
pub use encode::{FfmpegBackend, MediaBackend};
pub use error::{Result, VideoError};
pub use fetch::ImageFetcher;
pub use pipeline::{OutputTarget, VideoOutput, VideoPipeline, VideoSettings};
pub use resolution::{Resolution, parse_resolution};
pub use timeline::Timeline;
