//! Raw pixel data handed to the metric kernels.
//!
//! A [`PixelBuffer`] is the only input the engine analyzes: interleaved RGBA
//! bytes plus dimensions. Construction validates the shape once so that the
//! kernels can index freely without bounds surprises:
//!
//! ```text
//! data.len() == width * height * 4      (checked, overflow-safe)
//! width > 0 && height > 0
//! ```
//!
//! [`LumaPlane`] caches the per-pixel luma (`0.299R + 0.587G + 0.114B`) so the
//! brightness, contrast, thirds, center-focus and Sobel kernels share one
//! conversion per evaluation.

use thiserror::Error;

/// Bytes per interleaved RGBA pixel.
pub const CHANNELS: usize = 4;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BufferShapeError {
    #[error("image has a zero dimension ({width}x{height})")]
    ZeroDimension { width: u32, height: u32 },
    #[error("buffer length {actual} does not match {width}x{height}x4 = {expected}")]
    LengthMismatch {
        width: u32,
        height: u32,
        expected: usize,
        actual: usize,
    },
    #[error("dimensions {width}x{height} overflow the addressable buffer size")]
    Overflow { width: u32, height: u32 },
}

/// Interleaved RGBA8 pixels with validated dimensions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PixelBuffer {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

/// Expected RGBA byte length for the given dimensions, if it fits in `usize`.
pub fn expected_len(width: u32, height: u32) -> Option<usize> {
    (width as usize)
        .checked_mul(height as usize)?
        .checked_mul(CHANNELS)
}

impl PixelBuffer {
    /// Wrap raw RGBA bytes, rejecting any buffer whose length is not exactly
    /// `width * height * 4`.
    pub fn new(width: u32, height: u32, data: Vec<u8>) -> Result<Self, BufferShapeError> {
        if width == 0 || height == 0 {
            return Err(BufferShapeError::ZeroDimension { width, height });
        }
        let expected =
            expected_len(width, height).ok_or(BufferShapeError::Overflow { width, height })?;
        if data.len() != expected {
            return Err(BufferShapeError::LengthMismatch {
                width,
                height,
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    /// Number of pixels (`width * height`).
    pub fn pixel_count(&self) -> usize {
        self.width as usize * self.height as usize
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// RGB channels of the pixel at `(x, y)`. Alpha is ignored by every kernel.
    #[inline]
    pub fn rgb(&self, x: usize, y: usize) -> [u8; 3] {
        let idx = (y * self.width as usize + x) * CHANNELS;
        [self.data[idx], self.data[idx + 1], self.data[idx + 2]]
    }

    /// Iterate over the RGB channels of every pixel in row-major order.
    pub fn rgb_pixels(&self) -> impl Iterator<Item = [u8; 3]> + '_ {
        self.data
            .chunks_exact(CHANNELS)
            .map(|px| [px[0], px[1], px[2]])
    }
}

impl From<image::RgbaImage> for PixelBuffer {
    fn from(img: image::RgbaImage) -> Self {
        let (width, height) = img.dimensions();
        Self {
            width,
            height,
            data: img.into_raw(),
        }
    }
}

/// Perceptual luma of one pixel, `0.299R + 0.587G + 0.114B`.
///
/// Summed in integer thousandths so that gray pixels map to exactly their
/// channel value (`128, 128, 128` → `128.0`).
#[inline]
pub fn luma(rgb: [u8; 3]) -> f64 {
    let weighted = 299 * rgb[0] as u32 + 587 * rgb[1] as u32 + 114 * rgb[2] as u32;
    weighted as f64 / 1000.0
}

/// Row-major luma values for a whole buffer, computed once per evaluation.
#[derive(Debug, Clone)]
pub struct LumaPlane {
    pub width: usize,
    pub height: usize,
    values: Vec<f64>,
}

impl LumaPlane {
    pub fn from_pixels(pixels: &PixelBuffer) -> Self {
        Self {
            width: pixels.width() as usize,
            height: pixels.height() as usize,
            values: pixels.rgb_pixels().map(luma).collect(),
        }
    }

    #[inline]
    pub fn at(&self, x: usize, y: usize) -> f64 {
        self.values[y * self.width + x]
    }

    pub fn values(&self) -> &[f64] {
        &self.values
    }
}
