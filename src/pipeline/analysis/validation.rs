use serde_json::{Map, Value};

use super::taxonomy::{Taxonomy, DEFAULT_CATEGORY, DEFAULT_SENTIMENT};
use crate::models::{
    AnalysisRecord, Category, Sentiment, DEFAULT_CONFIDENCE, MAX_CONFIDENCE, MIN_CONFIDENCE,
};

/// Result of schema validation: a conforming record plus a note for every
/// field that had to be repaired or defaulted.
#[derive(Debug, Clone)]
pub struct ValidationResult {
    pub record: AnalysisRecord,
    pub repairs: Vec<String>,
}

impl ValidationResult {
    pub fn is_clean(&self) -> bool {
        self.repairs.is_empty()
    }
}

/// Check a candidate object against the analysis schema and repair each
/// invalid field independently. Never fails; partially valid candidates
/// keep their valid fields.
pub fn validate_candidate(candidate: &Map<String, Value>, taxonomy: &Taxonomy) -> ValidationResult {
    let mut repairs = Vec::new();

    let sentiment = validate_sentiment(candidate.get("sentiment"), taxonomy, &mut repairs);
    let classification =
        validate_classification(candidate.get("classification"), taxonomy, &mut repairs);
    let confidence = validate_confidence(candidate.get("confidence"), &mut repairs);
    let tags = validate_tags(candidate.get("tags"), &mut repairs);

    ValidationResult {
        record: AnalysisRecord {
            sentiment,
            classification,
            confidence,
            tags,
            raw_response: None,
        },
        repairs,
    }
}

fn validate_sentiment(
    value: Option<&Value>,
    taxonomy: &Taxonomy,
    repairs: &mut Vec<String>,
) -> Sentiment {
    let label = match value {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            repairs.push(format!("sentiment: non-string value {other}, defaulted"));
            return DEFAULT_SENTIMENT;
        }
        None => {
            repairs.push("sentiment: missing, defaulted".into());
            return DEFAULT_SENTIMENT;
        }
    };

    if let Ok(sentiment) = label.parse::<Sentiment>() {
        return sentiment;
    }
    let repaired = taxonomy.sentiment_from_hint(label).unwrap_or(DEFAULT_SENTIMENT);
    repairs.push(format!("sentiment: '{label}' mapped to {repaired}"));
    repaired
}

fn validate_classification(
    value: Option<&Value>,
    taxonomy: &Taxonomy,
    repairs: &mut Vec<String>,
) -> Category {
    let label = match value {
        Some(Value::String(s)) => s.as_str(),
        Some(other) => {
            repairs.push(format!("classification: non-string value {other}, defaulted"));
            return DEFAULT_CATEGORY;
        }
        None => {
            repairs.push("classification: missing, defaulted".into());
            return DEFAULT_CATEGORY;
        }
    };

    if let Ok(category) = label.parse::<Category>() {
        return category;
    }
    let repaired = taxonomy.category_from_hint(label).unwrap_or(DEFAULT_CATEGORY);
    repairs.push(format!("classification: '{label}' mapped to {repaired}"));
    repaired
}

fn validate_confidence(value: Option<&Value>, repairs: &mut Vec<String>) -> f64 {
    let numeric = match value {
        Some(Value::Number(n)) => n.as_f64().filter(|f| f.is_finite()),
        Some(Value::String(s)) => {
            let coerced = coerce_confidence_text(s);
            if coerced.is_some() {
                repairs.push(format!("confidence: string '{s}' coerced"));
            }
            coerced
        }
        _ => None,
    };

    let Some(confidence) = numeric else {
        repairs.push(format!("confidence: unusable, defaulted to {DEFAULT_CONFIDENCE}"));
        return DEFAULT_CONFIDENCE;
    };

    if !(MIN_CONFIDENCE..=MAX_CONFIDENCE).contains(&confidence) {
        repairs.push(format!("confidence: {confidence} clamped"));
        return confidence.clamp(MIN_CONFIDENCE, MAX_CONFIDENCE);
    }
    confidence
}

/// Parse confidences written as text, e.g. `"85"`, `" 72.5 "`, `"90%"`.
fn coerce_confidence_text(text: &str) -> Option<f64> {
    text.trim()
        .trim_end_matches('%')
        .trim_end()
        .parse::<f64>()
        .ok()
        .filter(|f| f.is_finite())
}

fn validate_tags(value: Option<&Value>, repairs: &mut Vec<String>) -> Vec<String> {
    let items = match value {
        Some(Value::Array(items)) => items,
        Some(_) => {
            repairs.push("tags: not a list, replaced with empty list".into());
            return Vec::new();
        }
        None => {
            repairs.push("tags: missing, replaced with empty list".into());
            return Vec::new();
        }
    };

    let mut tags = Vec::with_capacity(items.len());
    let mut dropped = 0usize;
    for item in items {
        match item {
            Value::String(s) => tags.push(s.clone()),
            Value::Number(n) => tags.push(n.to_string()),
            Value::Bool(b) => tags.push(b.to_string()),
            _ => dropped += 1,
        }
    }

    let converted = items.iter().filter(|v| !v.is_string()).count() - dropped;
    if converted > 0 {
        repairs.push(format!("tags: {converted} non-string tag(s) stringified"));
    }
    if dropped > 0 {
        repairs.push(format!("tags: {dropped} non-scalar tag(s) dropped"));
    }
    tags
}
