//! Dimension scorer.
//!
//! Turns a [`MetricSet`] into the integer dimension scores shown to the user.
//! Pure and deterministic: same metrics in, same scores out.
//!
//! | Dimension | Range | Driven by |
//! |---|---|---|
//! | composition | 0-30 | thirds interest, center focus, detail richness |
//! | angle | 0-20 | contrast, edge strength |
//! | distance | 0-10 | subject ratio (banded) |
//! | lighting | 0-10 | brightness mean (banded), saturation bonus, clipping penalty |
//! | pose baseline | 18, 20 or 22 | coarse scene guess; pose itself is never measured |
//!
//! Every metric is clamped into `[0, 1]` before it enters a formula, and the
//! weighted sums use round-half-up before any bonus is applied.

use crate::metrics::MetricSet;
use crate::suggest::{SceneType, classify_scene};
use serde::{Deserialize, Serialize};

pub const COMPOSITION_MAX: u32 = 30;
pub const ANGLE_MAX: u32 = 20;
pub const DISTANCE_MAX: u32 = 10;
pub const LIGHTING_MAX: u32 = 10;
pub const TOTAL_MAX: u32 = 100;

/// Pose baseline when the scene guess is neither portrait nor landscape.
pub const DEFAULT_POSE_BASELINE: u32 = 18;

const COMPOSITION_DETAIL_BONUS_ABOVE: f64 = 0.6;
const ANGLE_CONTRAST_BONUS_ABOVE: f64 = 0.6;
const CLIPPING_RATIO_ABOVE: f64 = 0.4;

/// Integer scores for one photo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct DimensionScores {
    pub composition: u32,
    pub angle: u32,
    pub distance: u32,
    pub lighting: u32,
    pub pose_baseline: u32,
    pub total: u32,
}

/// Score every dimension and the clamped total.
pub fn score(metrics: &MetricSet) -> DimensionScores {
    let m = metrics.clamped();
    let composition = composition_score(&m);
    let angle = angle_score(&m);
    let distance = distance_score(m.subject_ratio);
    let lighting = lighting_score(&m);
    let pose_baseline = pose_baseline(&m);
    let total = (composition + angle + distance + lighting + pose_baseline).min(TOTAL_MAX);

    DimensionScores {
        composition,
        angle,
        distance,
        lighting,
        pose_baseline,
        total,
    }
}

/// `floor(x + 0.5)`: halves always round up, also for values like `4.5`.
#[inline]
pub fn round_half_up(value: f64) -> u32 {
    let rounded = (value + 0.5).floor();
    if rounded <= 0.0 { 0 } else { rounded as u32 }
}

pub fn composition_score(m: &MetricSet) -> u32 {
    let weighted =
        0.5 * m.rule_of_thirds_interest + 0.3 * m.center_focus + 0.2 * m.detail_richness;
    let mut score = round_half_up(weighted * COMPOSITION_MAX as f64);
    if m.detail_richness > COMPOSITION_DETAIL_BONUS_ABOVE {
        score += 2;
    }
    score.min(COMPOSITION_MAX)
}

pub fn angle_score(m: &MetricSet) -> u32 {
    let weighted = 0.5 * m.contrast + 0.5 * m.edge_strength;
    let mut score = round_half_up(weighted * ANGLE_MAX as f64);
    if m.contrast > ANGLE_CONTRAST_BONUS_ABOVE {
        score += 2;
    }
    score.min(ANGLE_MAX)
}

/// Banded by how much of the frame the subject fills. Too little scores 4,
/// too much scores 5.
pub fn distance_score(subject_ratio: f64) -> u32 {
    let r = subject_ratio;
    if (0.4..=0.6).contains(&r) {
        10
    } else if (0.3..=0.7).contains(&r) {
        8
    } else if (0.2..=0.8).contains(&r) {
        6
    } else if r < 0.2 {
        4
    } else {
        5
    }
}

pub fn lighting_score(m: &MetricSet) -> u32 {
    let b = m.brightness_mean;
    let mut score: u32 = if (0.35..=0.65).contains(&b) {
        10
    } else if (0.25..=0.75).contains(&b) {
        8
    } else if (0.15..=0.85).contains(&b) {
        6
    } else {
        4
    };
    if (0.3..=0.7).contains(&m.saturation) {
        score = (score + 1).min(LIGHTING_MAX);
    }
    if m.dark_ratio > CLIPPING_RATIO_ABOVE || m.bright_ratio > CLIPPING_RATIO_ABOVE {
        score = score.saturating_sub(2);
    }
    score
}

/// Fixed contribution standing in for the unmeasured pose dimension.
pub fn pose_baseline(m: &MetricSet) -> u32 {
    match classify_scene(m) {
        SceneType::Portrait => 20,
        SceneType::Landscape => 22,
        SceneType::Group | SceneType::Other => DEFAULT_POSE_BASELINE,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Neutral metrics: every formula input at a known value.
    fn metrics() -> MetricSet {
        MetricSet {
            brightness_mean: 0.5,
            dark_ratio: 0.0,
            bright_ratio: 0.0,
            contrast: 0.0,
            saturation: 0.0,
            edge_strength: 0.0,
            detail_richness: 0.0,
            rule_of_thirds_interest: 0.0,
            center_focus: 0.5,
            subject_ratio: 0.5,
            center_density: 0.0,
        }
    }

    #[test]
    fn round_half_up_rounds_halves_up() {
        assert_eq!(round_half_up(4.5), 5);
        assert_eq!(round_half_up(4.49), 4);
        assert_eq!(round_half_up(0.0), 0);
        assert_eq!(round_half_up(-0.7), 0);
    }

    // =========================================================================
    // Composition
    // =========================================================================

    #[test]
    fn composition_of_neutral_center_only() {
        // 0.3 * 0.5 * 30 = 4.5 → 5
        assert_eq!(composition_score(&metrics()), 5);
    }

    #[test]
    fn composition_detail_bonus() {
        let m = MetricSet {
            detail_richness: 0.7,
            ..metrics()
        };
        // (0.15 + 0.14) * 30 = 8.7 → 9, +2
        assert_eq!(composition_score(&m), 11);
    }

    #[test]
    fn composition_bonus_is_capped() {
        let m = MetricSet {
            rule_of_thirds_interest: 1.0,
            center_focus: 1.0,
            detail_richness: 1.0,
            ..metrics()
        };
        assert_eq!(composition_score(&m), COMPOSITION_MAX);
    }

    // =========================================================================
    // Angle
    // =========================================================================

    #[test]
    fn angle_is_zero_without_contrast_or_edges() {
        assert_eq!(angle_score(&metrics()), 0);
    }

    #[test]
    fn angle_contrast_bonus_and_cap() {
        let m = MetricSet {
            contrast: 0.7,
            ..metrics()
        };
        // 0.35 * 20 = 7, +2
        assert_eq!(angle_score(&m), 9);

        let m = MetricSet {
            contrast: 1.0,
            edge_strength: 1.0,
            ..metrics()
        };
        assert_eq!(angle_score(&m), ANGLE_MAX);
    }

    #[test]
    fn angle_bonus_threshold_is_strict() {
        let m = MetricSet {
            contrast: 0.6,
            ..metrics()
        };
        assert_eq!(angle_score(&m), 6);
    }

    // =========================================================================
    // Distance
    // =========================================================================

    #[test]
    fn distance_bands() {
        assert_eq!(distance_score(0.5), 10);
        assert_eq!(distance_score(0.4), 10);
        assert_eq!(distance_score(0.6), 10);
        assert_eq!(distance_score(0.35), 8);
        assert_eq!(distance_score(0.7), 8);
        assert_eq!(distance_score(0.25), 6);
        assert_eq!(distance_score(0.8), 6);
        assert_eq!(distance_score(0.1), 4);
        assert_eq!(distance_score(0.0), 4);
        assert_eq!(distance_score(0.9), 5);
        assert_eq!(distance_score(1.0), 5);
    }

    // =========================================================================
    // Lighting
    // =========================================================================

    #[test]
    fn lighting_bands() {
        let at = |b: f64| {
            lighting_score(&MetricSet {
                brightness_mean: b,
                ..metrics()
            })
        };
        assert_eq!(at(0.5), 10);
        assert_eq!(at(0.3), 8);
        assert_eq!(at(0.8), 6);
        assert_eq!(at(0.05), 4);
        assert_eq!(at(0.95), 4);
    }

    #[test]
    fn lighting_saturation_bonus_capped() {
        let m = MetricSet {
            brightness_mean: 0.3,
            saturation: 0.5,
            ..metrics()
        };
        assert_eq!(lighting_score(&m), 9);

        let m = MetricSet {
            saturation: 0.5,
            ..metrics()
        };
        assert_eq!(lighting_score(&m), LIGHTING_MAX);
    }

    #[test]
    fn lighting_clipping_penalty() {
        let m = MetricSet {
            brightness_mean: 0.0,
            dark_ratio: 1.0,
            ..metrics()
        };
        assert_eq!(lighting_score(&m), 2);

        let m = MetricSet {
            bright_ratio: 0.5,
            ..metrics()
        };
        assert_eq!(lighting_score(&m), 8);
    }

    #[test]
    fn lighting_rises_from_dark_toward_mid_gray() {
        let mut previous = 0;
        for step in 1..=5 {
            let b = step as f64 * 0.1;
            let s = lighting_score(&MetricSet {
                brightness_mean: b,
                ..metrics()
            });
            assert!(s >= previous, "lighting fell from {previous} to {s} at {b}");
            previous = s;
        }
        assert_eq!(previous, 10);
    }

    // =========================================================================
    // Pose baseline and total
    // =========================================================================

    #[test]
    fn pose_baseline_follows_scene_guess() {
        let portrait = MetricSet {
            center_focus: 0.8,
            detail_richness: 0.6,
            ..metrics()
        };
        let landscape = MetricSet {
            center_focus: 0.3,
            rule_of_thirds_interest: 0.7,
            ..metrics()
        };
        assert_eq!(pose_baseline(&portrait), 20);
        assert_eq!(pose_baseline(&landscape), 22);
        assert_eq!(pose_baseline(&metrics()), DEFAULT_POSE_BASELINE);
    }

    #[test]
    fn total_is_sum_of_dimensions() {
        let s = score(&metrics());
        assert_eq!(
            s.total,
            s.composition + s.angle + s.distance + s.lighting + s.pose_baseline
        );
        assert_eq!(s, DimensionScores {
            composition: 5,
            angle: 0,
            distance: 10,
            lighting: 10,
            pose_baseline: 18,
            total: 43,
        });
    }

    #[test]
    fn score_clamps_out_of_range_metrics() {
        let m = MetricSet {
            rule_of_thirds_interest: 7.0,
            center_focus: 3.0,
            detail_richness: f64::NAN,
            contrast: 2.0,
            edge_strength: -1.0,
            ..metrics()
        };
        let s = score(&m);
        assert!(s.composition <= COMPOSITION_MAX);
        assert!(s.angle <= ANGLE_MAX);
        assert!(s.total <= TOTAL_MAX);
    }
}
