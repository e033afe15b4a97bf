//! Pure calculation functions for the working resolution.
//!
//! All functions here are pure and testable without any I/O or images.

/// Upper bound on the surface the decoder draws into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WorkingBounds {
    pub max_width: u32,
    pub max_height: u32,
}

impl Default for WorkingBounds {
    fn default() -> Self {
        Self {
            max_width: 300,
            max_height: 400,
        }
    }
}

/// Calculate the surface dimensions an image is drawn into before analysis.
///
/// Each axis is clamped independently: `min(width, max_width) × min(height, max_height)`.
/// The aspect ratio is therefore *not* preserved when only one axis exceeds its
/// bound; the image is stretched onto the surface, which keeps scores comparable
/// with the mobile app that produced the reference numbers.
///
/// # Examples
/// ```
/// # use framescore::imaging::{WorkingBounds, working_dimensions};
/// let bounds = WorkingBounds::default();
/// // 4000x3000 photo → full 300x400 surface
/// assert_eq!(working_dimensions((4000, 3000), bounds), (300, 400));
/// // small images are never upscaled
/// assert_eq!(working_dimensions((120, 80), bounds), (120, 80));
/// ```
pub fn working_dimensions(source: (u32, u32), bounds: WorkingBounds) -> (u32, u32) {
    let (src_w, src_h) = source;
    (src_w.min(bounds.max_width), src_h.min(bounds.max_height))
}

/// Whether the source must be resampled to fit the working surface.
pub fn needs_resample(source: (u32, u32), bounds: WorkingBounds) -> bool {
    working_dimensions(source, bounds) != source
}
