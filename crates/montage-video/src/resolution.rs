/// Output frame size in pixels.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl From<Resolution> for (u32, u32) {
    fn from(r: Resolution) -> Self {
        (r.width, r.height)
    }
}

/// Used for any label not in [`RESOLUTIONS`].
pub const DEFAULT_RESOLUTION: Resolution = Resolution::new(854, 480);

pub const RESOLUTIONS: &[(&str, Resolution)] = &[
    ("360p", Resolution::new(640, 360)),
    ("480p", Resolution::new(854, 480)),
    ("720p", Resolution::new(1280, 720)),
];

/// Map a quality label to its frame size. Unknown labels fall back to 480p.
pub fn parse_resolution(label: &str) -> Resolution {
    RESOLUTIONS
        .iter()
        .find(|(name, _)| *name == label)
        .map(|(_, res)| *res)
        .unwrap_or(DEFAULT_RESOLUTION)
}
