//! Keyword tables shared by the heuristic fallback and the validator.
//!
//! The sentiment, category, and confidence vocabularies are independent
//! lists. They overlap in places ("complaint" is both a negative indicator
//! and a feedback trigger) and each is tuned on its own.

use crate::models::{Category, Sentiment};

/// Immutable vocabulary driving keyword-based decisions.
#[derive(Debug, Clone, Copy)]
pub struct Taxonomy {
    /// Any hit makes the heuristic sentiment Positive (checked first).
    pub positive_keywords: &'static [&'static str],
    /// Any hit makes the heuristic sentiment Negative.
    pub negative_keywords: &'static [&'static str],
    /// Heuristic category triggers, tested in order; first match wins.
    pub category_keywords: &'static [(Category, &'static [&'static str])],
    /// Substrings the validator looks for inside a non-canonical label.
    pub label_hints: &'static [(Category, &'static [&'static str])],
    /// Substrings the validator looks for inside a non-canonical sentiment.
    pub sentiment_hints: &'static [(Sentiment, &'static str)],
    pub clarity_keywords: &'static [&'static str],
    pub ambiguity_keywords: &'static [&'static str],
    /// Literal words promoted to tags, in scan order.
    pub tag_vocabulary: &'static [&'static str],
    pub max_heuristic_tags: usize,
    pub clarity_confidence: f64,
    pub ambiguity_confidence: f64,
}

/// Sentiment and category used when nothing matches.
pub const DEFAULT_SENTIMENT: Sentiment = Sentiment::Neutral;
pub const DEFAULT_CATEGORY: Category = Category::GeneralFollowUps;

const POSITIVE_KEYWORDS: &[&str] = &[
    "positive",
    "satisfaction",
    "gratitude",
    "thank",
    "great",
    "good",
];

const NEGATIVE_KEYWORDS: &[&str] = &[
    "negative",
    "dissatisfaction",
    "complaint",
    "issue",
    "problem",
    "broken",
    "urgent",
];

const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::ProductStocking,
        &["product", "stock", "carry", "available", "inquiry"],
    ),
    (
        Category::AdminCoordination,
        &["admin", "coordination", "schedule", "meeting", "access"],
    ),
    (
        Category::FeedbackComplaints,
        &["feedback", "complaint", "suggestion", "opinion"],
    ),
    (
        Category::MaintenanceRepairs,
        &["maintenance", "repair", "broken", "fix", "technician"],
    ),
    (
        Category::BillingInvoices,
        &["billing", "invoice", "charge", "payment", "bill"],
    ),
    (
        Category::OperationalLogistics,
        &["logistics", "delivery", "pickup", "installation", "removal"],
    ),
];

const LABEL_HINTS: &[(Category, &[&str])] = &[
    (Category::ProductStocking, &["stock", "product"]),
    (Category::AdminCoordination, &["admin", "coordination"]),
    (Category::FeedbackComplaints, &["feedback", "complaint"]),
    (Category::MaintenanceRepairs, &["maintenance", "repair"]),
    (Category::BillingInvoices, &["billing", "invoice"]),
    (Category::OperationalLogistics, &["logistics", "operational"]),
];

const SENTIMENT_HINTS: &[(Sentiment, &str)] = &[
    (Sentiment::Positive, "positive"),
    (Sentiment::Negative, "negative"),
];

const CLARITY_KEYWORDS: &[&str] = &["clear", "straightforward", "obvious", "definitely"];

const AMBIGUITY_KEYWORDS: &[&str] = &["ambiguous", "unclear", "vague", "might"];

const TAG_VOCABULARY: &[&str] = &[
    "machine", "coffee", "delivery", "repair", "billing", "product", "schedule", "urgent",
];

impl Taxonomy {
    /// The vocabulary the analysis prompt is written against.
    pub const fn standard() -> Self {
        Self {
            positive_keywords: POSITIVE_KEYWORDS,
            negative_keywords: NEGATIVE_KEYWORDS,
            category_keywords: CATEGORY_KEYWORDS,
            label_hints: LABEL_HINTS,
            sentiment_hints: SENTIMENT_HINTS,
            clarity_keywords: CLARITY_KEYWORDS,
            ambiguity_keywords: AMBIGUITY_KEYWORDS,
            tag_vocabulary: TAG_VOCABULARY,
            max_heuristic_tags: 5,
            clarity_confidence: 85.0,
            ambiguity_confidence: 30.0,
        }
    }

    /// Match a free-form sentiment label by substring, case-insensitively.
    pub fn sentiment_from_hint(&self, label: &str) -> Option<Sentiment> {
        let lower = label.to_lowercase();
        self.sentiment_hints
            .iter()
            .find(|(_, hint)| lower.contains(hint))
            .map(|(sentiment, _)| *sentiment)
    }

    /// Match a free-form category label by substring, case-insensitively.
    pub fn category_from_hint(&self, label: &str) -> Option<Category> {
        let lower = label.to_lowercase();
        self.label_hints
            .iter()
            .find(|(_, hints)| contains_any(&lower, hints))
            .map(|(category, _)| *category)
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::standard()
    }
}

/// True if `haystack` contains any of `needles` as a substring.
pub(crate) fn contains_any(haystack: &str, needles: &[&str]) -> bool {
    needles.iter().any(|n| haystack.contains(n))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn category_keywords_cover_every_category_but_the_default() {
        let taxonomy = Taxonomy::standard();
        for category in Category::ALL {
            let listed = taxonomy
                .category_keywords
                .iter()
                .any(|(c, _)| c == category);
            assert_eq!(listed, *category != DEFAULT_CATEGORY, "{category}");
        }
    }

    #[test]
    fn sentiment_hint_prefers_positive() {
        let taxonomy = Taxonomy::standard();
        assert_eq!(
            taxonomy.sentiment_from_hint("Mostly POSITIVE"),
            Some(Sentiment::Positive)
        );
        assert_eq!(
            taxonomy.sentiment_from_hint("negative-ish"),
            Some(Sentiment::Negative)
        );
        assert_eq!(taxonomy.sentiment_from_hint("mixed"), None);
    }

    #[test]
    fn category_hint_matches_partial_labels() {
        let taxonomy = Taxonomy::standard();
        assert_eq!(
            taxonomy.category_from_hint("Invoice question"),
            Some(Category::BillingInvoices)
        );
        assert_eq!(
            taxonomy.category_from_hint("repairs"),
            Some(Category::MaintenanceRepairs)
        );
        assert_eq!(
            taxonomy.category_from_hint("Stocking"),
            Some(Category::ProductStocking)
        );
        assert_eq!(taxonomy.category_from_hint("misc"), None);
    }

    #[test]
    fn clarity_and_ambiguity_lists_are_disjoint() {
        let taxonomy = Taxonomy::standard();
        for word in taxonomy.clarity_keywords {
            assert!(!taxonomy.ambiguity_keywords.contains(word));
        }
    }
}
