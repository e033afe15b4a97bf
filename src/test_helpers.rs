//! Shared test utilities for the framescore test suite.
//!
//! Synthetic [`PixelBuffer`] builders with known statistics, so kernel and
//! scorer tests can assert exact values without decoding real photos.
//!
//! # Usage
//!
//! ```rust
//! use crate::test_helpers::*;
//!
//! let gray = uniform(60, 80, [128, 128, 128]);
//! let busy = checkerboard(32, 32, 4);
//! let subject = centered_square(40, 40, 20, [255, 255, 255], [128, 128, 128]);
//! ```

use crate::imaging::PixelBuffer;

// =========================================================================
// Buffer builders
// =========================================================================

/// Build an opaque buffer by evaluating `f(x, y)` for every pixel.
pub fn from_fn(width: u32, height: u32, f: impl Fn(u32, u32) -> [u8; 3]) -> PixelBuffer {
    let mut data = Vec::with_capacity(width as usize * height as usize * 4);
    for y in 0..height {
        for x in 0..width {
            let [r, g, b] = f(x, y);
            data.extend_from_slice(&[r, g, b, 255]);
        }
    }
    PixelBuffer::new(width, height, data).unwrap()
}

/// Every pixel the same color.
pub fn uniform(width: u32, height: u32, rgb: [u8; 3]) -> PixelBuffer {
    from_fn(width, height, |_, _| rgb)
}

/// Black and white squares of `cell` pixels, black at the origin.
pub fn checkerboard(width: u32, height: u32, cell: u32) -> PixelBuffer {
    from_fn(width, height, |x, y| {
        if ((x / cell) + (y / cell)) % 2 == 0 {
            [0, 0, 0]
        } else {
            [255, 255, 255]
        }
    })
}

/// `left` for `x < width / 2`, `right` elsewhere.
pub fn split_vertical(width: u32, height: u32, left: [u8; 3], right: [u8; 3]) -> PixelBuffer {
    from_fn(width, height, |x, _| if x < width / 2 { left } else { right })
}

/// Gray ramp: each column's value is its x coordinate (wrapping at 256).
pub fn horizontal_gradient(width: u32, height: u32) -> PixelBuffer {
    from_fn(width, height, |x, _| {
        let v = (x % 256) as u8;
        [v, v, v]
    })
}

/// A `side`-pixel square of `fg` centered on a `bg` frame.
pub fn centered_square(
    width: u32,
    height: u32,
    side: u32,
    fg: [u8; 3],
    bg: [u8; 3],
) -> PixelBuffer {
    let x0 = width.saturating_sub(side) / 2;
    let y0 = height.saturating_sub(side) / 2;
    from_fn(width, height, |x, y| {
        if (x0..x0 + side).contains(&x) && (y0..y0 + side).contains(&y) {
            fg
        } else {
            bg
        }
    })
}

// =========================================================================
// Encoded fixtures
// =========================================================================

/// Encode `pixels` as an in-memory PNG (alpha kept).
pub fn png_bytes(pixels: &PixelBuffer) -> Vec<u8> {
    use image::ImageEncoder;
    let mut out = Vec::new();
    image::codecs::png::PngEncoder::new(&mut out)
        .write_image(
            pixels.as_bytes(),
            pixels.width(),
            pixels.height(),
            image::ExtendedColorType::Rgba8,
        )
        .unwrap();
    out
}
