//! # framescore
//!
//! On-device photo composition scoring. Given a photo, framescore computes a
//! small set of pixel statistics and turns them, through a fixed and fully
//! deterministic formula, into dimension scores, a total out of 100, and
//! short suggestions for what to fix.
//!
//! # Architecture: One Pass, Four Steps
//!
//! ```text
//! 1. Decode    ImageSource  →  PixelBuffer      (bounded to 300×400 per axis)
//! 2. Measure   PixelBuffer  →  MetricSet        (independent kernels, all in [0, 1])
//! 3. Score     MetricSet    →  DimensionScores  (weights + threshold bands)
//! 4. Advise    scores       →  Suggestions + SceneType
//! ```
//!
//! Steps 2-4 are pure functions. Only the decode step touches I/O, and it
//! sits behind the [`imaging::RasterDecoder`] trait so hosts can plug in
//! their own raster facility and tests can use a mock.
//!
//! ```no_run
//! use framescore::{EngineConfig, evaluate};
//!
//! let result = evaluate(std::path::Path::new("dawn.jpg"), &EngineConfig::default())?;
//! println!("{} / 100", result.total_score);
//! if let Some(tip) = &result.suggestions.composition {
//!     println!("{tip}");
//! }
//! # Ok::<(), framescore::EvaluationError>(())
//! ```
//!
//! # Module Map
//!
//! | Module | Role |
//! |--------|------|
//! | [`imaging`] | Decoding into a bounded [`imaging::PixelBuffer`], luma plane |
//! | [`metrics`] | Pixel kernels: brightness, contrast, saturation, Sobel edges, thirds, center focus, subject size |
//! | [`score`] | Composition, angle, distance and lighting scores, pose baseline, total |
//! | [`suggest`] | Per-dimension suggestion tables (English, Simplified Chinese) and scene classification |
//! | [`evaluate`] | Public entry points and the [`EvaluationResult`] / [`EvaluationError`] types |
//! | [`live`] | Terse hints for a camera preview, with an at-most-one-in-flight monitor |
//! | [`record`] | Payload shape for the evaluation record store |
//! | [`config`] | `framescore.toml` loading, merging and validation of every tunable |
//! | [`cache`] | Content-addressed result cache for batch runs |
//! | [`batch`] | Directory discovery and parallel evaluation for the CLI |
//! | [`output`] | CLI output formatting |
//!
//! # Design Decisions
//!
//! ## Empirical Constants Are Configuration
//!
//! The normalization divisors and thresholds (128, 500, 50, 30, the 40-pixel
//! thirds window, the 300×400 working surface) were tuned by eye, not derived.
//! They live in [`config::KernelConfig`] and [`config::WorkingConfig`] with
//! defaults that reproduce the reference scores exactly.
//!
//! ## Per-Axis Working Bound
//!
//! Photos are stretched onto a `min(w, 300) × min(h, 400)` surface rather than
//! scaled with a preserved aspect ratio. This matches the canvas the mobile
//! app draws into, so the same photo scores the same everywhere.
//!
//! ## Pose Is Never Guessed
//!
//! Pose needs a vision model. The engine reports `pose_score` as `None` and
//! adds a fixed baseline (18, 20 or 22, from the coarse scene guess) to the
//! total instead.
//!
//! ## Synchronous Engine
//!
//! Evaluation is a plain function call. Decoding is the only blocking step;
//! callers that need non-blocking behavior run it on a worker thread, as the
//! CLI's batch and watch modes do.

pub mod batch;
pub mod cache;
pub mod config;
pub mod evaluate;
pub mod imaging;
pub mod live;
pub mod metrics;
pub mod output;
pub mod record;
pub mod score;
pub mod suggest;

pub use config::EngineConfig;
pub use evaluate::{
    Analysis, EvaluationError, EvaluationResult, analyze, evaluate, evaluate_pixels,
    evaluate_rgba, evaluate_with_decoder,
};
pub use suggest::{Locale, SceneType, Suggestions};

#[cfg(test)]
pub(crate) mod test_helpers;
