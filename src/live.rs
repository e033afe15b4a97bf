//! Live feedback for a camera preview.
//!
//! A preview is sampled on a timer (every 2 s in the mobile app) and each
//! frame is reduced to a handful of terse hints instead of the full
//! suggestion map. [`LiveMonitor`] guarantees at most one evaluation is in
//! flight: a tick that arrives while the previous frame is still being scored
//! reports [`LiveFeedback::Busy`] and does no work.
//!
//! | Score | Hint |
//! |---|---|
//! | composition < 20 / < 25 | reposition / adjust the subject |
//! | angle < 12 / < 16 | change viewpoint / try other angles |
//! | distance < 6 | adjust distance |
//! | lighting < 6 / < 8 | not enough light / exposure is off |
//! | none of the above | ready to shoot |

use crate::evaluate::{EvaluationError, EvaluationResult};
use crate::suggest::Locale;
use log::{debug, warn};
use std::sync::atomic::{AtomicBool, Ordering};

/// Default interval between live evaluations.
pub const DEFAULT_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Hint {
    Analyzing,
    RepositionSubject,
    AdjustSubject,
    ChangeViewpoint,
    TryOtherAngles,
    AdjustDistance,
    NotEnoughLight,
    ExposureOff,
    ReadyToShoot,
    CaptureFailed,
    EvaluationFailed,
}

impl Hint {
    pub fn text(self, locale: Locale) -> &'static str {
        match (self, locale) {
            (Hint::Analyzing, Locale::En) => "Analyzing the frame...",
            (Hint::Analyzing, Locale::ZhCn) => "正在分析镜头...",
            (Hint::RepositionSubject, Locale::En) => "Composition: reposition the subject",
            (Hint::RepositionSubject, Locale::ZhCn) => "构图：需优化主体位置",
            (Hint::AdjustSubject, Locale::En) => "Composition: adjust the subject",
            (Hint::AdjustSubject, Locale::ZhCn) => "构图：可调整主体",
            (Hint::ChangeViewpoint, Locale::En) => "Angle: change your viewpoint",
            (Hint::ChangeViewpoint, Locale::ZhCn) => "角度：建议换个视角",
            (Hint::TryOtherAngles, Locale::En) => "Angle: try other angles",
            (Hint::TryOtherAngles, Locale::ZhCn) => "角度：可尝试其他角度",
            (Hint::AdjustDistance, Locale::En) => "Distance: adjust the shooting distance",
            (Hint::AdjustDistance, Locale::ZhCn) => "距离：需调整拍摄距离",
            (Hint::NotEnoughLight, Locale::En) => "Light: not enough light",
            (Hint::NotEnoughLight, Locale::ZhCn) => "光线：光线不足",
            (Hint::ExposureOff, Locale::En) => "Light: exposure is off",
            (Hint::ExposureOff, Locale::ZhCn) => "光线：曝光欠佳",
            (Hint::ReadyToShoot, Locale::En) => "Looks good, ready to shoot",
            (Hint::ReadyToShoot, Locale::ZhCn) => "画面良好，可以拍摄",
            (Hint::CaptureFailed, Locale::En) => "Capture failed, still monitoring...",
            (Hint::CaptureFailed, Locale::ZhCn) => "采集失败，继续监控...",
            (Hint::EvaluationFailed, Locale::En) => "Evaluation failed, still monitoring...",
            (Hint::EvaluationFailed, Locale::ZhCn) => "评估失败，继续监控...",
        }
    }
}

/// Hints for one evaluated frame, never empty.
pub fn hints_for(result: &EvaluationResult) -> Vec<Hint> {
    let mut hints = Vec::new();

    if result.composition_score < 20 {
        hints.push(Hint::RepositionSubject);
    } else if result.composition_score < 25 {
        hints.push(Hint::AdjustSubject);
    }

    if result.angle_score < 12 {
        hints.push(Hint::ChangeViewpoint);
    } else if result.angle_score < 16 {
        hints.push(Hint::TryOtherAngles);
    }

    if result.distance_score < 6 {
        hints.push(Hint::AdjustDistance);
    }

    if result.lighting_score < 6 {
        hints.push(Hint::NotEnoughLight);
    } else if result.lighting_score < 8 {
        hints.push(Hint::ExposureOff);
    }

    if hints.is_empty() {
        hints.push(Hint::ReadyToShoot);
    }
    hints
}

/// Localized hint strings for one evaluated frame.
pub fn live_hints(result: &EvaluationResult, locale: Locale) -> Vec<String> {
    hints_for(result)
        .into_iter()
        .map(|h| h.text(locale).to_string())
        .collect()
}

/// Outcome of one [`LiveMonitor::poll`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LiveFeedback {
    /// The previous evaluation is still running; this tick was skipped.
    Busy,
    Hints(Vec<String>),
    /// The frame could not be evaluated. Carries the hint to display.
    Failed(String),
}

/// Serializes live evaluations so at most one runs at a time.
#[derive(Debug, Default)]
pub struct LiveMonitor {
    in_flight: AtomicBool,
    locale: Locale,
}

/// Clears the in-flight flag when dropped, including on panic.
struct InFlightGuard<'a>(&'a AtomicBool);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl LiveMonitor {
    pub fn new(locale: Locale) -> Self {
        Self {
            in_flight: AtomicBool::new(false),
            locale,
        }
    }

    pub fn is_busy(&self) -> bool {
        self.in_flight.load(Ordering::Acquire)
    }

    /// Hint shown before the first frame has been scored.
    pub fn initial_hint(&self) -> String {
        Hint::Analyzing.text(self.locale).to_string()
    }

    /// Run `evaluate` unless another evaluation is already in flight.
    pub fn poll<F>(&self, evaluate: F) -> LiveFeedback
    where
        F: FnOnce() -> Result<EvaluationResult, EvaluationError>,
    {
        if self
            .in_flight
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            debug!("live evaluation still in flight, skipping tick");
            return LiveFeedback::Busy;
        }
        let _guard = InFlightGuard(&self.in_flight);

        match evaluate() {
            Ok(result) => LiveFeedback::Hints(live_hints(&result, self.locale)),
            Err(err) => {
                warn!("live evaluation failed: {err}");
                let hint = match err {
                    EvaluationError::Decode { .. } => Hint::CaptureFailed,
                    _ => Hint::EvaluationFailed,
                };
                LiveFeedback::Failed(hint.text(self.locale).to_string())
            }
        }
    }
}
