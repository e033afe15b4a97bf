//! Record shape handed to the evaluation store.
//!
//! The engine never persists anything. [`EvaluationRecord`] is the payload a
//! caller submits after an evaluation: the scalar scores and suggestions plus
//! caller-owned metadata (how the photo was taken, an optional stored URL).

use crate::evaluate::EvaluationResult;
use crate::suggest::{SceneType, Suggestions};
use serde::{Deserialize, Serialize};

/// How the evaluated photo was obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EvaluationType {
    /// A live camera frame.
    Realtime,
    /// A captured or picked photo.
    Upload,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EvaluationRecord {
    /// Optional: photos need not be stored to keep their scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    pub evaluation_type: EvaluationType,
    pub total_score: u32,
    /// Scores the engine did not produce are left out, not written as null.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub composition_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pose_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub angle_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub distance_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub height_score: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub suggestions: Option<Suggestions>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_type: Option<SceneType>,
}

impl EvaluationRecord {
    pub fn from_result(
        result: &EvaluationResult,
        evaluation_type: EvaluationType,
        photo_url: Option<String>,
    ) -> Self {
        Self {
            photo_url,
            evaluation_type,
            total_score: result.total_score,
            composition_score: Some(result.composition_score),
            pose_score: result.pose_score,
            angle_score: Some(result.angle_score),
            distance_score: Some(result.distance_score),
            height_score: Some(result.lighting_score),
            suggestions: Some(result.suggestions.clone()),
            scene_type: Some(result.scene_type),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> EvaluationResult {
        EvaluationResult {
            total_score: 61,
            composition_score: 20,
            pose_score: None,
            angle_score: 12,
            distance_score: 8,
            lighting_score: 3,
            pose_baseline: 18,
            suggestions: Suggestions {
                lighting: Some("too dark".into()),
                ..Suggestions::default()
            },
            scene_type: SceneType::Landscape,
        }
    }

    #[test]
    fn record_copies_scores() {
        let record = EvaluationRecord::from_result(&sample(), EvaluationType::Upload, None);
        assert_eq!(record.total_score, 61);
        assert_eq!(record.height_score, Some(3));
        assert_eq!(record.pose_score, None);
        assert_eq!(record.scene_type, Some(SceneType::Landscape));
    }

    #[test]
    fn record_json_shape() {
        let record = EvaluationRecord::from_result(
            &sample(),
            EvaluationType::Realtime,
            Some("https://example.com/p.jpg".into()),
        );
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["evaluation_type"], "realtime");
        assert_eq!(json["photo_url"], "https://example.com/p.jpg");
        assert_eq!(json["height_score"], 3);
        assert_eq!(json["suggestions"]["height"], "too dark");
        assert_eq!(json["scene_type"], "landscape");
        assert!(json.get("pose_score").is_none());
    }

    #[test]
    fn record_omits_absent_scores() {
        let record = EvaluationRecord {
            photo_url: None,
            evaluation_type: EvaluationType::Upload,
            total_score: 40,
            composition_score: None,
            pose_score: None,
            angle_score: Some(7),
            distance_score: None,
            height_score: None,
            suggestions: None,
            scene_type: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        let keys: Vec<&str> = json.as_object().unwrap().keys().map(String::as_str).collect();
        assert_eq!(keys.len(), 3, "{keys:?}");
        assert_eq!(json["angle_score"], 7);
        assert_eq!(json["total_score"], 40);

        let back: EvaluationRecord = serde_json::from_value(json).unwrap();
        assert_eq!(back, record);
    }

    #[test]
    fn record_omits_missing_photo_url() {
        let record = EvaluationRecord::from_result(&sample(), EvaluationType::Upload, None);
        let json = serde_json::to_value(&record).unwrap();
        assert!(json.get("photo_url").is_none());
    }
}
