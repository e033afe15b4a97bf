//! Suggestion generator and scene classification.
//!
//! Each dimension walks an ordered list of score bands, lowest first, and
//! picks one message. A dimension in its top band gets no message at all.
//! The bands line up with the scorer's own, so a low score always comes with
//! advice and a perfect one never does.
//!
//! | Dimension | Bands (message selected) | Silent at |
//! |---|---|---|
//! | composition | `<18`, `<24` (split on center density), `<28` | `>=28` |
//! | angle | `<12`, `<16`, `<18` | `>=18` |
//! | distance | `<=4` too far, `5` too close, `6`, `8` | `10` |
//! | lighting | `<5` (split on brightness), `<7`, `<9` (split on clipping) | `>=9` |
//!
//! Pose is never measured, so it never receives a suggestion.
//!
//! Strings are final display text in the configured [`Locale`].

use crate::metrics::MetricSet;
use crate::score::DimensionScores;
use serde::{Deserialize, Serialize};
use std::fmt;

const OFF_CENTER_DENSITY_ABOVE: f64 = 0.6;
const CLIPPING_RATIO_ABOVE: f64 = 0.4;

/// Display language for suggestions and live hints.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    En,
    #[serde(rename = "zh-CN")]
    ZhCn,
}

/// Coarse scene guess derived from center focus, detail and thirds interest.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SceneType {
    Portrait,
    Landscape,
    Group,
    Other,
}

impl fmt::Display for SceneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SceneType::Portrait => "portrait",
            SceneType::Landscape => "landscape",
            SceneType::Group => "group",
            SceneType::Other => "other",
        })
    }
}

/// Classify a scene. Checks run in priority order: portrait, landscape, group.
pub fn classify_scene(metrics: &MetricSet) -> SceneType {
    let m = metrics.clamped();
    if m.center_focus > 0.7 && m.detail_richness > 0.5 {
        SceneType::Portrait
    } else if m.center_focus < 0.4 && m.rule_of_thirds_interest > 0.6 {
        SceneType::Landscape
    } else if m.center_focus > 0.5 && m.rule_of_thirds_interest > 0.5 {
        SceneType::Group
    } else {
        SceneType::Other
    }
}

/// One optional suggestion per dimension.
///
/// Serializes with the field names the record store expects; lighting is
/// stored as `height`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Suggestions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub composition: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pose: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub angle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<String>,
    #[serde(rename = "height", default, skip_serializing_if = "Option::is_none")]
    pub lighting: Option<String>,
}

impl Suggestions {
    pub fn is_empty(&self) -> bool {
        self.iter().next().is_none()
    }

    /// Present suggestions as `(dimension, text)` in display order.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            ("composition", &self.composition),
            ("pose", &self.pose),
            ("angle", &self.angle),
            ("distance", &self.distance),
            ("lighting", &self.lighting),
        ]
        .into_iter()
        .filter_map(|(name, text)| text.as_deref().map(|t| (name, t)))
    }
}

/// Every message the generator can emit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Advice {
    UseThirds,
    SubjectTooCentered,
    RepositionSubject,
    SimplifyBackground,
    AddContrast,
    CreativeViewpoint,
    SlightTilt,
    MoveCloser,
    StepBack,
    AdjustDistance,
    FineTuneFraming,
    TooDark,
    TooBright,
    WatchLight,
    LiftShadows,
    GuardHighlights,
    SofterLight,
}

impl Advice {
    pub fn text(self, locale: Locale) -> &'static str {
        match locale {
            Locale::En => self.en(),
            Locale::ZhCn => self.zh_cn(),
        }
    }

    fn en(self) -> &'static str {
        match self {
            Advice::UseThirds => {
                "Try the rule of thirds: place the subject on a grid intersection"
            }
            Advice::SubjectTooCentered => {
                "The subject sits dead center; shift it toward a thirds line"
            }
            Advice::RepositionSubject => {
                "Nice composition; reposition the subject so it stands out more"
            }
            Advice::SimplifyBackground => {
                "Good composition; a simpler background will make the subject pop"
            }
            Advice::AddContrast => "Add contrast and try a different shooting angle",
            Advice::CreativeViewpoint => "Reasonable angle; try a more creative viewpoint",
            Advice::SlightTilt => "Great angle; a slight tilt can add some energy",
            Advice::MoveCloser => "The subject is too small in the frame; move closer",
            Advice::StepBack => "The subject fills too much of the frame; step back a little",
            Advice::AdjustDistance => {
                "Adjust the shooting distance so the subject stands out clearly"
            }
            Advice::FineTuneFraming => "Distance is nearly ideal; fine-tune the framing",
            Advice::TooDark => "The photo is too dark; add light or raise the exposure",
            Advice::TooBright => "The photo is too bright; reduce light or lower the exposure",
            Advice::WatchLight => "Watch the light; avoid blown highlights and crushed shadows",
            Advice::LiftShadows => "Large dark areas; add fill light to lift the shadows",
            Advice::GuardHighlights => "Many bright areas; be careful not to overexpose",
            Advice::SofterLight => "Good light; softer light would add atmosphere",
        }
    }

    fn zh_cn(self) -> &'static str {
        match self {
            Advice::UseThirds => "尝试使用三分法构图，将主体放在画面的交叉点上",
            Advice::SubjectTooCentered => "主体过于居中，可以尝试将其移向三分线",
            Advice::RepositionSubject => "构图不错，可以尝试调整主体位置使其更突出",
            Advice::SimplifyBackground => "构图良好，可以简化背景让主体更加突出",
            Advice::AddContrast => "增加画面对比度，尝试不同的拍摄角度",
            Advice::CreativeViewpoint => "角度选择合理，可以尝试更有创意的视角",
            Advice::SlightTilt => "角度很好，微调倾斜度可以增加动感",
            Advice::MoveCloser => "主体在画面中占比过小，建议靠近拍摄",
            Advice::StepBack => "主体占比过大，建议后退一些",
            Advice::AdjustDistance => "调整拍摄距离，让主体更清晰突出",
            Advice::FineTuneFraming => "拍摄距离接近理想，可以微调取景",
            Advice::TooDark => "画面偏暗，建议增加光线或调整曝光",
            Advice::TooBright => "画面偏亮，建议减少光线或降低曝光",
            Advice::WatchLight => "注意光线条件，避免过亮或过暗",
            Advice::LiftShadows => "画面暗部较多，可以补光提亮阴影",
            Advice::GuardHighlights => "高光区域较多，注意避免过曝",
            Advice::SofterLight => "光线良好，柔和的光线能让画面更有氛围",
        }
    }
}

pub fn composition_advice(score: u32, m: &MetricSet) -> Option<Advice> {
    if score < 18 {
        Some(Advice::UseThirds)
    } else if score < 24 {
        if m.center_density > OFF_CENTER_DENSITY_ABOVE {
            Some(Advice::SubjectTooCentered)
        } else {
            Some(Advice::RepositionSubject)
        }
    } else if score < 28 {
        Some(Advice::SimplifyBackground)
    } else {
        None
    }
}

pub fn angle_advice(score: u32) -> Option<Advice> {
    if score < 12 {
        Some(Advice::AddContrast)
    } else if score < 16 {
        Some(Advice::CreativeViewpoint)
    } else if score < 18 {
        Some(Advice::SlightTilt)
    } else {
        None
    }
}

pub fn distance_advice(score: u32) -> Option<Advice> {
    match score {
        0..=4 => Some(Advice::MoveCloser),
        5 => Some(Advice::StepBack),
        6 => Some(Advice::AdjustDistance),
        7..=9 => Some(Advice::FineTuneFraming),
        _ => None,
    }
}

pub fn lighting_advice(score: u32, m: &MetricSet) -> Option<Advice> {
    if score < 5 {
        if m.brightness_mean < 0.5 {
            Some(Advice::TooDark)
        } else {
            Some(Advice::TooBright)
        }
    } else if score < 7 {
        Some(Advice::WatchLight)
    } else if score < 9 {
        if m.dark_ratio > CLIPPING_RATIO_ABOVE {
            Some(Advice::LiftShadows)
        } else if m.bright_ratio > CLIPPING_RATIO_ABOVE {
            Some(Advice::GuardHighlights)
        } else {
            Some(Advice::SofterLight)
        }
    } else {
        None
    }
}

/// Build the localized suggestion map for one set of scores.
pub fn suggest(scores: &DimensionScores, metrics: &MetricSet, locale: Locale) -> Suggestions {
    let m = metrics.clamped();
    let text = |advice: Option<Advice>| advice.map(|a| a.text(locale).to_string());
    Suggestions {
        composition: text(composition_advice(scores.composition, &m)),
        pose: None,
        angle: text(angle_advice(scores.angle)),
        distance: text(distance_advice(scores.distance)),
        lighting: text(lighting_advice(scores.lighting, &m)),
    }
}
