//! Input, per-email outcome, and run summary types for batch analysis.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::models::{AnalysisRecord, Category, Sentiment};

/// One email to analyze, as read from a JSONL line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmailInput {
    /// Date as written in the source, unparsed.
    #[serde(default)]
    pub date: Option<String>,
    pub body: String,
}

impl EmailInput {
    pub fn new(date: Option<&str>, body: &str) -> Self {
        Self {
            date: date.map(str::to_string),
            body: body.to_string(),
        }
    }
}

/// Result for one email of a batch.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    /// Position of the email in the input.
    pub index: usize,
    pub email_date: Option<String>,
    #[serde(skip)]
    pub email_text: String,
    /// Always present; the fallback record when analysis failed.
    #[serde(flatten)]
    pub record: AnalysisRecord,
    /// Analysis or storage failure, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Identifier assigned by the sink.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub record_id: Option<String>,
}

impl BatchOutcome {
    pub fn is_success(&self) -> bool {
        self.error.is_none()
    }
}

/// Aggregate statistics for one batch run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BatchSummary {
    pub total: usize,
    pub successful: usize,
    pub failed: usize,
    /// Counts over successful analyses only.
    pub classifications: BTreeMap<String, usize>,
    pub sentiments: BTreeMap<String, usize>,
    /// Mean confidence of successful analyses, 0 when there are none.
    pub average_confidence: f64,
    pub elapsed_secs: f64,
}

impl BatchSummary {
    pub fn from_outcomes(outcomes: &[BatchOutcome], elapsed_secs: f64) -> Self {
        let mut classifications = BTreeMap::new();
        let mut sentiments = BTreeMap::new();
        let mut confidence_sum = 0.0;
        let mut successful = 0;

        for outcome in outcomes.iter().filter(|o| o.is_success()) {
            successful += 1;
            confidence_sum += outcome.record.confidence;
            *classifications
                .entry(outcome.record.classification.as_str().to_string())
                .or_insert(0) += 1;
            *sentiments
                .entry(outcome.record.sentiment.as_str().to_string())
                .or_insert(0) += 1;
        }

        let average_confidence = if successful == 0 {
            0.0
        } else {
            confidence_sum / successful as f64
        };

        Self {
            total: outcomes.len(),
            successful,
            failed: outcomes.len() - successful,
            classifications,
            sentiments,
            average_confidence,
            elapsed_secs,
        }
    }

    pub fn count_for_category(&self, category: Category) -> usize {
        self.classifications
            .get(category.as_str())
            .copied()
            .unwrap_or(0)
    }

    pub fn count_for_sentiment(&self, sentiment: Sentiment) -> usize {
        self.sentiments.get(sentiment.as_str()).copied().unwrap_or(0)
    }
}

/// Everything a batch run produced, outcomes in input order.
#[derive(Debug, Clone, Serialize)]
pub struct BatchReport {
    pub outcomes: Vec<BatchOutcome>,
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn outcome(index: usize, record: AnalysisRecord, error: Option<&str>) -> BatchOutcome {
        BatchOutcome {
            index,
            email_date: None,
            email_text: String::new(),
            record,
            error: error.map(str::to_string),
            record_id: None,
        }
    }

    fn record(sentiment: Sentiment, classification: Category, confidence: f64) -> AnalysisRecord {
        AnalysisRecord {
            sentiment,
            classification,
            confidence,
            tags: vec![],
            raw_response: None,
        }
    }

    #[test]
    fn email_input_date_is_optional() {
        let input: EmailInput = serde_json::from_str(r#"{"body": "hi"}"#).unwrap();
        assert_eq!(input, EmailInput::new(None, "hi"));
    }

    #[test]
    fn summary_counts_successes_only() {
        let outcomes = vec![
            outcome(0, record(Sentiment::Negative, Category::BillingInvoices, 90.0), None),
            outcome(1, record(Sentiment::Negative, Category::BillingInvoices, 70.0), None),
            outcome(2, record(Sentiment::Positive, Category::OperationalLogistics, 80.0), None),
            outcome(3, AnalysisRecord::fallback(), Some("Ollama is not running")),
        ];
        let summary = BatchSummary::from_outcomes(&outcomes, 1.5);
        assert_eq!(summary.total, 4);
        assert_eq!(summary.successful, 3);
        assert_eq!(summary.failed, 1);
        assert_eq!(summary.count_for_category(Category::BillingInvoices), 2);
        assert_eq!(summary.count_for_category(Category::GeneralFollowUps), 0);
        assert_eq!(summary.count_for_sentiment(Sentiment::Negative), 2);
        assert_eq!(summary.count_for_sentiment(Sentiment::Neutral), 0);
        assert!((summary.average_confidence - 80.0).abs() < 1e-9);
        assert_eq!(summary.elapsed_secs, 1.5);
    }

    #[test]
    fn empty_summary_has_zero_average() {
        let summary = BatchSummary::from_outcomes(&[], 0.0);
        assert_eq!(summary.total, 0);
        assert_eq!(summary.average_confidence, 0.0);
    }

    #[test]
    fn outcome_serializes_flat_record() {
        let o = outcome(2, record(Sentiment::Neutral, Category::AdminCoordination, 64.0), None);
        let json = serde_json::to_value(&o).unwrap();
        assert_eq!(json["index"], 2);
        assert_eq!(json["classification"], "Admin/Coordination");
        assert_eq!(json["confidence"], 64);
        assert!(json.get("error").is_none());
        assert!(json.get("email_text").is_none());
    }
}
