//! CLI output formatting for the `evaluate` and `watch` commands.
//!
//! # Information-First Display
//!
//! Every photo leads with its positional index, file name and total score;
//! the per-dimension breakdown and suggestions follow as indented context
//! lines. Dimension scores are drawn as fixed-width bars so a column of
//! photos can be compared at a glance.
//!
//! # Output Format
//!
//! ## Evaluate
//!
//! ```text
//! 001 dawn.jpg  61/100  landscape
//!     Source: shots/dawn.jpg
//!     Composition  [#######---]  21/30
//!     Angle        [######----]  12/20
//!     Distance     [########--]   8/10
//!     Lighting     [##--------]   2/10
//!     Pose         baseline 18
//!     composition: Nice composition; reposition the subject so it stands out more
//!     lighting: The photo is too dark; add light or raise the exposure
//! 002 broken.jpg  FAILED
//!     Source: shots/broken.jpg
//!     Error: Failed to decode shots/broken.jpg: ...
//!
//! Evaluated 2 photos, 1 failed
//! Cache: 1 cached, 0 evaluated (1 total)
//! ```
//!
//! ## Watch
//!
//! ```text
//! [004] Composition: adjust the subject | Light: exposure is off
//! [005] busy, skipped
//! ```
//!
//! # Architecture
//!
//! Each view has a `format_*` function (returns `Vec<String>`) for testability
//! and a `print_*` wrapper that writes to stdout. Format functions are pure:
//! no I/O, no side effects.

use crate::batch::{BatchEvent, BatchResult};
use crate::evaluate::EvaluationResult;
use crate::live::LiveFeedback;
use crate::score::{ANGLE_MAX, COMPOSITION_MAX, DISTANCE_MAX, LIGHTING_MAX, TOTAL_MAX};
use std::path::Path;

/// Cells in a dimension score bar.
const BAR_WIDTH: u32 = 10;

// ============================================================================
// Shared display helpers
// ============================================================================

/// Format a 1-based positional index as 3-digit zero-padded.
fn format_index(pos: usize) -> String {
    format!("{:0>3}", pos)
}

/// Return indentation string: 4 spaces per depth level.
fn indent(depth: usize) -> String {
    "    ".repeat(depth)
}

/// File name of a photo, falling back to the full path.
fn display_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| path.display().to_string())
}

/// Fixed-width bar for `score` out of `max`, rounded to the nearest cell.
///
/// ```text
/// [#######---]
/// ```
pub fn score_bar(score: u32, max: u32) -> String {
    let filled = if max == 0 {
        0
    } else {
        ((score.min(max) * BAR_WIDTH + max / 2) / max).min(BAR_WIDTH)
    };
    format!(
        "[{}{}]",
        "#".repeat(filled as usize),
        "-".repeat((BAR_WIDTH - filled) as usize)
    )
}

fn dimension_line(label: &str, score: u32, max: u32) -> String {
    format!(
        "{}{:<12} {}  {:>2}/{}",
        indent(1),
        label,
        score_bar(score, max),
        score,
        max
    )
}

// ============================================================================
// Evaluate output
// ============================================================================

/// Score breakdown and suggestions for one result, without a header.
pub fn format_result_details(result: &EvaluationResult) -> Vec<String> {
    let mut lines = vec![
        dimension_line("Composition", result.composition_score, COMPOSITION_MAX),
        dimension_line("Angle", result.angle_score, ANGLE_MAX),
        dimension_line("Distance", result.distance_score, DISTANCE_MAX),
        dimension_line("Lighting", result.lighting_score, LIGHTING_MAX),
        format!("{}{:<12} baseline {}", indent(1), "Pose", result.pose_baseline),
    ];
    for (dimension, text) in result.suggestions.iter() {
        lines.push(format!("{}{}: {}", indent(1), dimension, text));
    }
    lines
}

/// Format one batch progress event.
pub fn format_batch_event(event: &BatchEvent) -> Vec<String> {
    match event {
        BatchEvent::Evaluated {
            index,
            path,
            result,
            cached,
        } => {
            let mut header = format!(
                "{} {}  {}/{}  {}",
                format_index(index + 1),
                display_name(path),
                result.total_score,
                TOTAL_MAX,
                result.scene_type
            );
            if *cached {
                header.push_str("  (cached)");
            }
            let mut lines = vec![header, format!("{}Source: {}", indent(1), path.display())];
            lines.extend(format_result_details(result));
            lines
        }
        BatchEvent::Failed { index, path, error } => vec![
            format!("{} {}  FAILED", format_index(index + 1), display_name(path)),
            format!("{}Source: {}", indent(1), path.display()),
            format!("{}Error: {}", indent(1), error),
        ],
    }
}

pub fn print_batch_event(event: &BatchEvent) {
    for line in format_batch_event(event) {
        println!("{}", line);
    }
}

/// Closing summary of a batch run.
pub fn format_batch_summary(result: &BatchResult, cache_enabled: bool) -> Vec<String> {
    let total = result.evaluations.len();
    let failed = result.failures();
    let noun = if total == 1 { "photo" } else { "photos" };
    let mut lines = vec![if failed > 0 {
        format!("Evaluated {} {}, {} failed", total, noun, failed)
    } else {
        format!("Evaluated {} {}", total, noun)
    }];
    if cache_enabled {
        lines.push(format!("Cache: {}", result.cache_stats));
    }
    lines
}

pub fn print_batch_summary(result: &BatchResult, cache_enabled: bool) {
    println!();
    for line in format_batch_summary(result, cache_enabled) {
        println!("{}", line);
    }
}

// ============================================================================
// Watch output
// ============================================================================

/// One line per live tick.
pub fn format_live_feedback(tick: usize, feedback: &LiveFeedback) -> String {
    let body = match feedback {
        LiveFeedback::Busy => "busy, skipped".to_string(),
        LiveFeedback::Hints(hints) => hints.join(" | "),
        LiveFeedback::Failed(hint) => hint.clone(),
    };
    format!("[{}] {}", format_index(tick), body)
}

pub fn print_live_feedback(tick: usize, feedback: &LiveFeedback) {
    println!("{}", format_live_feedback(tick, feedback));
}
