//! Image input for the evaluator: decode, bound, and expose raw RGBA pixels.
//!
//! | Concern | Crate / function |
//! |---|---|
//! | **Decode** | `image::ImageReader` (JPEG, PNG, TIFF, WebP) |
//! | **Bound** | per-axis clamp to the working resolution (default 300×400) |
//! | **Pixels** | validated [`PixelBuffer`] + cached [`LumaPlane`] |
//!
//! The module is split into:
//! - **Calculations**: Pure functions for working-resolution math (unit testable)
//! - **Pixels**: The buffer type every metric kernel reads
//! - **Backend**: [`RasterDecoder`] trait + [`RustDecoder`]

pub mod backend;
mod calculations;
pub mod pixels;
pub mod rust_backend;

pub use backend::{BackendError, ImageSource, RasterDecoder};
pub use calculations::{WorkingBounds, needs_resample, working_dimensions};
pub use pixels::{BufferShapeError, LumaPlane, PixelBuffer};
pub use rust_backend::{RustDecoder, is_supported_photo, supported_input_extensions};
