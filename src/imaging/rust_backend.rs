//! Pure Rust raster decoder built on the `image` crate.
//!
//! ## Crate mapping
//!
//! | Step | Crate / function |
//! |---|---|
//! | Decode (JPEG, PNG, TIFF, WebP) | `image::ImageReader` with content sniffing |
//! | Orient | `ImageDecoder::orientation` + `DynamicImage::apply_orientation` (EXIF) |
//! | Create surface | per-axis bound, rejected when empty or overflowing |
//! | Draw (stretch onto surface) | `DynamicImage::resize_exact` with `Triangle` filter |
//! | Read pixels | `DynamicImage::into_rgba8` |
//!
//! The bilinear `Triangle` filter is what browser and mini-program canvases use
//! for `drawImage`, so scores stay close to the ones computed on device.

use super::backend::{BackendError, ImageSource, RasterDecoder};
use super::calculations::{WorkingBounds, needs_resample, working_dimensions};
use super::pixels::{PixelBuffer, expected_len};
use image::imageops::FilterType;
use image::{DynamicImage, ImageDecoder, ImageFormat, ImageReader, ImageResult};
use std::io::{BufRead, Cursor, Seek};
use std::path::Path;
use std::sync::LazyLock;

/// Extensions whose decoders are compiled in.
const PHOTO_CANDIDATES: &[(&str, ImageFormat)] = &[
    ("jpg", ImageFormat::Jpeg),
    ("jpeg", ImageFormat::Jpeg),
    ("png", ImageFormat::Png),
    ("tif", ImageFormat::Tiff),
    ("tiff", ImageFormat::Tiff),
    ("webp", ImageFormat::WebP),
];

static SUPPORTED_EXTENSIONS: LazyLock<Vec<&'static str>> = LazyLock::new(|| {
    PHOTO_CANDIDATES
        .iter()
        .filter(|(_, fmt)| fmt.reading_enabled())
        .map(|(ext, _)| *ext)
        .collect()
});

/// Returns the set of image file extensions that have working decoders compiled in.
pub fn supported_input_extensions() -> &'static [&'static str] {
    &SUPPORTED_EXTENSIONS
}

/// Whether `path` has one of the [`supported_input_extensions`] (case-insensitive).
pub fn is_supported_photo(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|ext| {
            supported_input_extensions()
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext))
        })
}

/// Production decoder. Stateless, so one instance can serve any number of threads.
pub struct RustDecoder;

impl RustDecoder {
    pub fn new() -> Self {
        Self
    }
}

impl Default for RustDecoder {
    fn default() -> Self {
        Self::new()
    }
}

fn decode_error(source: &ImageSource, reason: impl ToString) -> BackendError {
    BackendError::Decode {
        source_name: source.to_string(),
        reason: reason.to_string(),
    }
}

/// Load and decode an image from disk or memory, upright.
fn load_image(source: &ImageSource) -> Result<DynamicImage, BackendError> {
    match source {
        ImageSource::Path(path) => {
            let reader = ImageReader::open(path)
                .and_then(|r| r.with_guessed_format())
                .map_err(|e| decode_error(source, e))?;
            decode_upright(reader).map_err(|e| decode_error(source, e))
        }
        ImageSource::Bytes(bytes) => {
            let reader = ImageReader::new(Cursor::new(bytes.as_slice()))
                .with_guessed_format()
                .map_err(|e| decode_error(source, e))?;
            decode_upright(reader).map_err(|e| decode_error(source, e))
        }
    }
}

/// Decode and apply the EXIF orientation, as a canvas `drawImage` does.
fn decode_upright<R: BufRead + Seek>(reader: ImageReader<R>) -> ImageResult<DynamicImage> {
    let mut decoder = reader.into_decoder()?;
    let orientation = decoder.orientation()?;
    let mut img = DynamicImage::from_decoder(decoder)?;
    img.apply_orientation(orientation);
    Ok(img)
}

/// Reject surfaces that cannot hold a single pixel or whose byte length
/// overflows `usize`.
fn check_surface(width: u32, height: u32) -> Result<(), BackendError> {
    if width == 0 || height == 0 {
        return Err(BackendError::Context(format!(
            "surface would be empty ({width}x{height})"
        )));
    }
    expected_len(width, height)
        .map(|_| ())
        .ok_or_else(|| BackendError::Context(format!("surface {width}x{height} is too large")))
}

impl RasterDecoder for RustDecoder {
    fn decode(
        &self,
        source: &ImageSource,
        bounds: WorkingBounds,
    ) -> Result<PixelBuffer, BackendError> {
        let img = load_image(source)?;
        let original = (img.width(), img.height());
        let (width, height) = working_dimensions(original, bounds);
        check_surface(width, height)?;

        let drawn = if needs_resample(original, bounds) {
            img.resize_exact(width, height, FilterType::Triangle)
        } else {
            img
        };

        log::debug!(
            "decoded {} at {}x{} onto {}x{} surface",
            source,
            original.0,
            original.1,
            width,
            height
        );

        PixelBuffer::new(width, height, drawn.into_rgba8().into_raw())
            .map_err(|e| BackendError::Context(format!("surface readback failed: {e}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{ImageEncoder, RgbImage};

    #[test]
    fn supported_extensions_match_decodable_formats() {
        let exts = supported_input_extensions();
        for expected in &["jpg", "jpeg", "png", "tif", "tiff", "webp"] {
            assert!(
                exts.contains(expected),
                "expected {expected} in supported extensions"
            );
        }
    }

    #[test]
    fn is_supported_photo_case_insensitive() {
        assert!(is_supported_photo(Path::new("a/IMG_0001.JPG")));
        assert!(is_supported_photo(Path::new("shot.webp")));
        assert!(!is_supported_photo(Path::new("notes.txt")));
        assert!(!is_supported_photo(Path::new("no_extension")));
    }

    /// Encode a gradient PNG with the given dimensions.
    fn png_bytes(width: u32, height: u32) -> Vec<u8> {
        let img = RgbImage::from_fn(width, height, |x, y| {
            image::Rgb([(x % 256) as u8, (y % 256) as u8, 128])
        });
        let mut out = Vec::new();
        image::codecs::png::PngEncoder::new(&mut out)
            .write_image(img.as_raw(), width, height, image::ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn decode_small_png_keeps_dimensions() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("small.png");
        std::fs::write(&path, png_bytes(40, 30)).unwrap();

        let pixels = RustDecoder::new()
            .decode(&ImageSource::Path(path), WorkingBounds::default())
            .unwrap();
        assert_eq!((pixels.width(), pixels.height()), (40, 30));
        assert_eq!(pixels.as_bytes().len(), 40 * 30 * 4);
        // Top-left gradient pixel survives untouched, alpha filled in
        assert_eq!(&pixels.as_bytes()[..4], &[0, 0, 128, 255]);
    }

    #[test]
    fn decode_large_png_is_bounded_per_axis() {
        let pixels = RustDecoder::new()
            .decode(
                &ImageSource::Bytes(png_bytes(640, 200)),
                WorkingBounds::default(),
            )
            .unwrap();
        assert_eq!((pixels.width(), pixels.height()), (300, 200));
    }

    #[test]
    fn decode_with_custom_bounds() {
        let bounds = WorkingBounds {
            max_width: 16,
            max_height: 8,
        };
        let pixels = RustDecoder::new()
            .decode(&ImageSource::Bytes(png_bytes(64, 64)), bounds)
            .unwrap();
        assert_eq!((pixels.width(), pixels.height()), (16, 8));
    }

    #[test]
    fn decode_nonexistent_file_is_decode_error() {
        let result = RustDecoder::new().decode(
            &ImageSource::Path("/nonexistent/photo.jpg".into()),
            WorkingBounds::default(),
        );
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn decode_garbage_bytes_is_decode_error() {
        let result = RustDecoder::new().decode(
            &ImageSource::Bytes(b"definitely not an image".to_vec()),
            WorkingBounds::default(),
        );
        assert!(matches!(result, Err(BackendError::Decode { .. })));
    }

    #[test]
    fn check_surface_rejects_empty() {
        assert!(matches!(
            check_surface(0, 10),
            Err(BackendError::Context(_))
        ));
        assert!(check_surface(10, 20).is_ok());
    }

    #[test]
    fn zero_bounds_are_a_context_error() {
        let bounds = WorkingBounds {
            max_width: 0,
            max_height: 400,
        };
        let result = RustDecoder::new().decode(&ImageSource::Bytes(png_bytes(8, 8)), bounds);
        assert!(matches!(result, Err(BackendError::Context(_))));
    }

    /// Minimal little-endian TIFF header with a single Orientation entry.
    fn exif_orientation(value: u16) -> Vec<u8> {
        let mut exif = b"II*\0".to_vec();
        exif.extend_from_slice(&8u32.to_le_bytes());
        exif.extend_from_slice(&1u16.to_le_bytes());
        exif.extend_from_slice(&0x0112u16.to_le_bytes());
        exif.extend_from_slice(&3u16.to_le_bytes());
        exif.extend_from_slice(&1u32.to_le_bytes());
        exif.extend_from_slice(&value.to_le_bytes());
        exif.extend_from_slice(&0u16.to_le_bytes());
        exif.extend_from_slice(&0u32.to_le_bytes());
        exif
    }

    /// 40x20 PNG: red left column, black elsewhere, tagged with `orientation`.
    fn tagged_png(orientation: u16) -> Vec<u8> {
        let img = RgbImage::from_fn(40, 20, |x, _| {
            if x == 0 {
                image::Rgb([255, 0, 0])
            } else {
                image::Rgb([0, 0, 0])
            }
        });
        let mut out = Vec::new();
        let mut encoder = image::codecs::png::PngEncoder::new(&mut out);
        encoder
            .set_exif_metadata(exif_orientation(orientation))
            .unwrap();
        encoder
            .write_image(img.as_raw(), 40, 20, image::ExtendedColorType::Rgb8)
            .unwrap();
        out
    }

    #[test]
    fn decode_applies_exif_rotation() {
        let pixels = RustDecoder::new()
            .decode(&ImageSource::Bytes(tagged_png(6)), WorkingBounds::default())
            .unwrap();
        // Rotated 90° clockwise: portrait, and the left column is now the top row
        assert_eq!((pixels.width(), pixels.height()), (20, 40));
        for x in 0..20 {
            assert_eq!(pixels.rgb(x, 0), [255, 0, 0], "x={x}");
        }
        assert_eq!(pixels.rgb(0, 1), [0, 0, 0]);
    }

    #[test]
    fn decode_upright_tag_is_untouched() {
        let pixels = RustDecoder::new()
            .decode(&ImageSource::Bytes(tagged_png(1)), WorkingBounds::default())
            .unwrap();
        assert_eq!((pixels.width(), pixels.height()), (40, 20));
        assert_eq!(pixels.rgb(0, 5), [255, 0, 0]);
        assert_eq!(pixels.rgb(1, 0), [0, 0, 0]);
    }
}
