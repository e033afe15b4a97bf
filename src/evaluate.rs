//! Evaluation orchestrator: the engine's public entry points.
//!
//! ```text
//! ImageSource ──decode (bounded)──▶ PixelBuffer ──kernels──▶ MetricSet
//!                                                               │
//!              EvaluationResult ◀──suggest + classify◀──score───┘
//! ```
//!
//! Evaluation is all-or-nothing: a decode, surface, or buffer-shape failure
//! surfaces as an [`EvaluationError`] and no partial result is produced.
//! Nothing here holds state between calls, so any number of evaluations can
//! run concurrently on their own buffers.

use crate::config::EngineConfig;
use crate::imaging::{
    BackendError, BufferShapeError, ImageSource, PixelBuffer, RasterDecoder, RustDecoder,
};
use crate::metrics::MetricSet;
use crate::score::{DimensionScores, score};
use crate::suggest::{SceneType, Suggestions, classify_scene, suggest};
use log::{debug, info};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum EvaluationError {
    /// The image reference could not be loaded or decoded.
    #[error("Failed to decode {source_name}: {reason}")]
    Decode { source_name: String, reason: String },
    /// The raster surface could not be created.
    #[error("Failed to create raster surface: {0}")]
    Context(String),
    /// The pixel buffer does not have the shape it claims.
    #[error("Invalid pixel buffer: {0}")]
    Computation(#[from] BufferShapeError),
}

impl From<BackendError> for EvaluationError {
    fn from(err: BackendError) -> Self {
        match err {
            BackendError::Decode {
                source_name,
                reason,
            } => Self::Decode {
                source_name,
                reason,
            },
            BackendError::Context(msg) => Self::Context(msg),
        }
    }
}

/// Scores, suggestions and scene tag for one photo.
///
/// Field names follow the evaluation record store: lighting is persisted as
/// `height_score`, and `pose_score` is always `null` because pose is never
/// measured. `pose_baseline` is the fixed amount it contributed to the total.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationResult {
    pub total_score: u32,
    pub composition_score: u32,
    pub pose_score: Option<u32>,
    pub angle_score: u32,
    pub distance_score: u32,
    #[serde(rename = "height_score")]
    pub lighting_score: u32,
    pub pose_baseline: u32,
    pub suggestions: Suggestions,
    pub scene_type: SceneType,
}

/// Every intermediate of one evaluation, for callers that want to show or
/// log the raw metrics next to the result.
#[derive(Debug, Clone, PartialEq)]
pub struct Analysis {
    pub metrics: MetricSet,
    pub scores: DimensionScores,
    pub result: EvaluationResult,
}

/// Decode `source` with the built-in decoder and evaluate it.
pub fn evaluate(
    source: impl Into<ImageSource>,
    config: &EngineConfig,
) -> Result<EvaluationResult, EvaluationError> {
    evaluate_with_decoder(&RustDecoder::new(), &source.into(), config)
}

/// Evaluate using a specific decoder (allows testing with mock).
pub fn evaluate_with_decoder(
    decoder: &impl RasterDecoder,
    source: &ImageSource,
    config: &EngineConfig,
) -> Result<EvaluationResult, EvaluationError> {
    let pixels = decoder.decode(source, config.working.bounds())?;
    debug!(
        "{}: analyzing {}x{} working surface",
        source,
        pixels.width(),
        pixels.height()
    );
    let result = evaluate_pixels(&pixels, config);
    info!("{}: total score {}", source, result.total_score);
    Ok(result)
}

/// Evaluate raw interleaved RGBA bytes, rejecting a buffer whose length is
/// not `width * height * 4`.
pub fn evaluate_rgba(
    width: u32,
    height: u32,
    rgba: Vec<u8>,
    config: &EngineConfig,
) -> Result<EvaluationResult, EvaluationError> {
    let pixels = PixelBuffer::new(width, height, rgba)?;
    Ok(evaluate_pixels(&pixels, config))
}

/// Evaluate an already validated buffer. Cannot fail.
pub fn evaluate_pixels(pixels: &PixelBuffer, config: &EngineConfig) -> EvaluationResult {
    analyze(pixels, config).result
}

pub fn analyze(pixels: &PixelBuffer, config: &EngineConfig) -> Analysis {
    let metrics = MetricSet::compute(pixels, &config.kernels).clamped();
    debug!("metrics: {:?}", metrics);

    let scores = score(&metrics);
    let suggestions = suggest(&scores, &metrics, config.feedback.locale);
    let result = EvaluationResult {
        total_score: scores.total,
        composition_score: scores.composition,
        pose_score: None,
        angle_score: scores.angle,
        distance_score: scores.distance,
        lighting_score: scores.lighting,
        pose_baseline: scores.pose_baseline,
        suggestions,
        scene_type: classify_scene(&metrics),
    };

    Analysis {
        metrics,
        scores,
        result,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::imaging::backend::tests::MockDecoder;
    use crate::suggest::{Advice, Locale};
    use crate::test_helpers::*;

    fn config() -> EngineConfig {
        EngineConfig::default()
    }

    // =========================================================================
    // Boundary scenarios
    // =========================================================================

    #[test]
    fn uniform_gray_image() {
        let result = evaluate_pixels(&uniform(60, 80, [128, 128, 128]), &config());

        assert_eq!(result.composition_score, 5);
        assert_eq!(result.angle_score, 0);
        assert_eq!(result.lighting_score, 10);
        assert!(result.suggestions.composition.is_some());
        assert!(result.suggestions.angle.is_some());
        assert!(result.suggestions.lighting.is_none());
        assert_eq!(result.pose_score, None);
        assert_eq!(result.scene_type, SceneType::Other);
    }

    #[test]
    fn fully_black_image() {
        let result = evaluate_pixels(&uniform(60, 80, [0, 0, 0]), &config());

        assert!(result.lighting_score <= 4);
        assert_eq!(
            result.suggestions.lighting.as_deref(),
            Some(Advice::TooDark.text(Locale::En))
        );
    }

    #[test]
    fn tiny_image_scores_without_edges() {
        let analysis = analyze(&checkerboard(2, 2, 1), &config());
        assert_eq!(analysis.metrics.edge_strength, 0.0);
        assert_eq!(analysis.metrics.detail_richness, 0.0);
        assert!(analysis.result.total_score <= 100);
    }

    #[test]
    fn evaluation_is_deterministic() {
        let pixels = centered_square(90, 120, 30, [220, 40, 40], [30, 90, 160]);
        let first = evaluate_pixels(&pixels, &config());
        for _ in 0..3 {
            assert_eq!(evaluate_pixels(&pixels, &config()), first);
        }
    }

    #[test]
    fn total_matches_scores() {
        let a = analyze(&checkerboard(64, 64, 8), &config());
        assert_eq!(a.result.total_score, a.scores.total);
        assert_eq!(a.result.composition_score, a.scores.composition);
        assert_eq!(a.result.pose_baseline, a.scores.pose_baseline);
    }

    #[test]
    fn locale_selects_suggestion_language() {
        let mut zh = config();
        zh.feedback.locale = Locale::ZhCn;
        let result = evaluate_pixels(&uniform(30, 30, [0, 0, 0]), &zh);
        assert_eq!(
            result.suggestions.lighting.as_deref(),
            Some("画面偏暗，建议增加光线或调整曝光")
        );
    }

    // =========================================================================
    // Raw RGBA input
    // =========================================================================

    #[test]
    fn rgba_length_mismatch_is_computation_error() {
        let result = evaluate_rgba(10, 10, vec![0; 10 * 10 * 4 - 1], &config());
        assert!(matches!(result, Err(EvaluationError::Computation(_))));
    }

    #[test]
    fn rgba_zero_dimension_is_computation_error() {
        let result = evaluate_rgba(0, 5, Vec::new(), &config());
        assert!(matches!(result, Err(EvaluationError::Computation(_))));
    }

    #[test]
    fn rgba_matches_pixel_buffer_path() {
        let pixels = checkerboard(20, 20, 5);
        let via_rgba = evaluate_rgba(20, 20, pixels.as_bytes().to_vec(), &config()).unwrap();
        assert_eq!(via_rgba, evaluate_pixels(&pixels, &config()));
    }

    // =========================================================================
    // Decoder integration
    // =========================================================================

    #[test]
    fn decoder_receives_configured_bounds() {
        let decoder = MockDecoder::returning(uniform(4, 4, [128, 128, 128]));
        let mut config = config();
        config.working.max_width = 120;
        config.working.max_height = 160;

        evaluate_with_decoder(&decoder, &ImageSource::Path("/photos/a.jpg".into()), &config)
            .unwrap();

        let calls = decoder.get_calls();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].source, "/photos/a.jpg");
        assert_eq!((calls[0].max_width, calls[0].max_height), (120, 160));
    }

    #[test]
    fn decode_failure_is_reported() {
        let decoder = MockDecoder::failing(BackendError::Decode {
            source_name: "broken.jpg".into(),
            reason: "truncated".into(),
        });
        let result = evaluate_with_decoder(&decoder, &ImageSource::Bytes(vec![1]), &config());
        match result {
            Err(EvaluationError::Decode {
                source_name,
                reason,
            }) => {
                assert_eq!(source_name, "broken.jpg");
                assert_eq!(reason, "truncated");
            }
            other => panic!("expected decode error, got {other:?}"),
        }
    }

    #[test]
    fn surface_failure_is_context_error() {
        let decoder = MockDecoder::failing(BackendError::Context("out of memory".into()));
        let result = evaluate_with_decoder(&decoder, &ImageSource::Bytes(vec![1]), &config());
        assert!(matches!(result, Err(EvaluationError::Context(_))));
    }

    #[test]
    fn evaluate_real_png_bytes() {
        let png = png_bytes(&centered_square(40, 40, 20, [255, 255, 255], [128, 128, 128]));
        let result = evaluate(png, &config()).unwrap();
        assert!(result.total_score <= 100);
    }

    // =========================================================================
    // Serialization
    // =========================================================================

    #[test]
    fn result_serializes_with_record_field_names() {
        let result = evaluate_pixels(&uniform(10, 10, [0, 0, 0]), &config());
        let json = serde_json::to_value(&result).unwrap();

        assert!(json.get("height_score").is_some());
        assert!(json.get("lighting_score").is_none());
        assert!(json["pose_score"].is_null());
        assert!(json["suggestions"].get("height").is_some());
        assert_eq!(json["scene_type"], "other");
    }
}
