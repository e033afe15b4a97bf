//! Raster decode trait and shared types.
//!
//! The engine never loads images itself. A [`RasterDecoder`] turns an opaque
//! [`ImageSource`] into a [`PixelBuffer`] no larger than the requested
//! [`WorkingBounds`], which mirrors the three steps a platform canvas offers:
//!
//! 1. create a surface of `min(w, max_w) × min(h, max_h)`
//! 2. draw the decoded image onto it (scaling as needed)
//! 3. read the RGBA pixels back
//!
//! The production implementation is
//! [`RustDecoder`](super::rust_backend::RustDecoder). Tests substitute a mock.

use super::calculations::WorkingBounds;
use super::pixels::PixelBuffer;
use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum BackendError {
    /// The source could not be read or decoded (missing file, permissions,
    /// corrupt data, unsupported format).
    #[error("Failed to decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },
    /// The drawing surface could not be created.
    #[error("Failed to create raster surface: {0}")]
    Context(String),
}

/// Opaque reference to image data, as handed over by the image acquisition side.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ImageSource {
    /// Path to an encoded image file.
    Path(PathBuf),
    /// Encoded image bytes already in memory (format sniffed from content).
    Bytes(Vec<u8>),
}

impl From<PathBuf> for ImageSource {
    fn from(path: PathBuf) -> Self {
        Self::Path(path)
    }
}

impl From<&std::path::Path> for ImageSource {
    fn from(path: &std::path::Path) -> Self {
        Self::Path(path.to_path_buf())
    }
}

impl From<Vec<u8>> for ImageSource {
    fn from(bytes: Vec<u8>) -> Self {
        Self::Bytes(bytes)
    }
}

impl fmt::Display for ImageSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ImageSource::Path(p) => write!(f, "{}", p.display()),
            ImageSource::Bytes(b) => write!(f, "<{} bytes in memory>", b.len()),
        }
    }
}

/// Trait for raster decoders.
///
/// Implementations must return a buffer whose dimensions never exceed `bounds`
/// on either axis. `Sync` so batch evaluation can share one decoder across
/// rayon workers.
pub trait RasterDecoder: Sync {
    fn decode(
        &self,
        source: &ImageSource,
        bounds: WorkingBounds,
    ) -> Result<PixelBuffer, BackendError>;
}
