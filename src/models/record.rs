use serde::{Deserialize, Serialize, Serializer};

use super::enums::{Category, Sentiment};

/// Confidence used whenever the model's value cannot be recovered.
pub const DEFAULT_CONFIDENCE: f64 = 50.0;

/// Inclusive bounds of the confidence scale.
pub const MIN_CONFIDENCE: f64 = 0.0;
pub const MAX_CONFIDENCE: f64 = 100.0;

/// Normalized result of analyzing one email.
///
/// Only the structural validator and the heuristic fallback build these,
/// so `sentiment` and `classification` are always closed-set members and
/// `confidence` always sits in [0, 100].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisRecord {
    pub sentiment: Sentiment,
    pub classification: Category,
    /// Model's self-reported certainty in `classification`, 0-100.
    #[serde(serialize_with = "serialize_confidence")]
    pub confidence: f64,
    pub tags: Vec<String>,
    /// Original model text, kept when the structured parse had to be
    /// repaired or abandoned.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub raw_response: Option<String>,
}

impl AnalysisRecord {
    /// Neutral / General Follow-ups / 50 / no tags.
    pub fn fallback() -> Self {
        Self {
            sentiment: Sentiment::Neutral,
            classification: Category::GeneralFollowUps,
            confidence: DEFAULT_CONFIDENCE,
            tags: Vec::new(),
            raw_response: None,
        }
    }

    /// Confidence on the 0.0-1.0 scale used by thresholds.
    pub fn confidence_fraction(&self) -> f64 {
        self.confidence / 100.0
    }
}

impl Default for AnalysisRecord {
    fn default() -> Self {
        Self::fallback()
    }
}

/// Whole-number confidences serialize as JSON integers so `100` stays `100`.
fn serialize_confidence<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    if value.fract() == 0.0 && value.is_finite() {
        serializer.serialize_i64(*value as i64)
    } else {
        serializer.serialize_f64(*value)
    }
}
