use serde_json::{json, Map, Value};

use super::taxonomy::{contains_any, Taxonomy, DEFAULT_CATEGORY, DEFAULT_SENTIMENT};
use crate::models::{Category, Sentiment, DEFAULT_CONFIDENCE};

/// Build an analysis object from keywords when no JSON could be recovered.
///
/// Runs on the lower-cased text and always succeeds. The result is already
/// schema-conformant; it still goes through the validator like any other
/// candidate.
pub fn heuristic_candidate(raw: &str, taxonomy: &Taxonomy) -> Map<String, Value> {
    let lower = raw.to_lowercase();

    let mut fields = Map::new();
    fields.insert(
        "sentiment".into(),
        json!(heuristic_sentiment(&lower, taxonomy).as_str()),
    );
    fields.insert(
        "classification".into(),
        json!(heuristic_category(&lower, taxonomy).as_str()),
    );
    fields.insert(
        "confidence".into(),
        json!(heuristic_confidence(&lower, taxonomy)),
    );
    fields.insert("tags".into(), json!(heuristic_tags(&lower, taxonomy)));
    fields
}

fn heuristic_sentiment(lower: &str, taxonomy: &Taxonomy) -> Sentiment {
    if contains_any(lower, taxonomy.positive_keywords) {
        Sentiment::Positive
    } else if contains_any(lower, taxonomy.negative_keywords) {
        Sentiment::Negative
    } else {
        DEFAULT_SENTIMENT
    }
}

fn heuristic_category(lower: &str, taxonomy: &Taxonomy) -> Category {
    taxonomy
        .category_keywords
        .iter()
        .find(|(_, keywords)| contains_any(lower, keywords))
        .map(|(category, _)| *category)
        .unwrap_or(DEFAULT_CATEGORY)
}

// Clarity is checked first, so "unclear" (which contains "clear") scores high.
fn heuristic_confidence(lower: &str, taxonomy: &Taxonomy) -> f64 {
    if contains_any(lower, taxonomy.clarity_keywords) {
        taxonomy.clarity_confidence
    } else if contains_any(lower, taxonomy.ambiguity_keywords) {
        taxonomy.ambiguity_confidence
    } else {
        DEFAULT_CONFIDENCE
    }
}

fn heuristic_tags(lower: &str, taxonomy: &Taxonomy) -> Vec<&'static str> {
    taxonomy
        .tag_vocabulary
        .iter()
        .copied()
        .filter(|word| lower.contains(word))
        .take(taxonomy.max_heuristic_tags)
        .collect()
}
