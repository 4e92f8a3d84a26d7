//! Recover an analysis object from free-form model text.
//!
//! Layers run in a fixed order and stop at the first JSON object that
//! parses: the whole text, then fenced code blocks, then brace-delimited
//! fragments (after dropping thinking sections). When none parses, the
//! keyword heuristic builds the record instead, so parsing never fails.

use std::sync::LazyLock;

use regex::Regex;
use serde_json::{Map, Value};

use super::heuristic::heuristic_candidate;
use super::taxonomy::Taxonomy;
use super::types::{Candidate, ExtractionStrategy, ParseOutcome};
use super::validation::validate_candidate;

/// Field names a well-formed analysis object carries.
pub const REQUIRED_FIELDS: [&str; 4] = ["sentiment", "classification", "confidence", "tags"];

/// Fenced block with an optional language tag; content starts on the next line.
static FENCED_BLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?s)```[A-Za-z0-9_+-]*[ \t]*\r?\n(.*?)\r?\n[ \t]*```").expect("valid regex")
});

/// `<think>…</think>` / `<thinking>…</thinking>` reasoning spans.
static THINKING_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?is)<think(?:ing)?>.*?</think(?:ing)?>").expect("valid regex")
});

/// Brace-delimited fragment tolerating one level of nested objects.
static BRACE_FRAGMENT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\{[^{}]*(?:\{[^{}]*\}[^{}]*)*\}").expect("valid regex")
});

/// Innermost brace pair, no nested braces.
static FLAT_FRAGMENT_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\{[^{}]*\}").expect("valid regex"));

/// Extract, validate, and tag the record for one model response.
pub fn parse_model_response(raw: &str, taxonomy: &Taxonomy) -> ParseOutcome {
    let candidate = extract_candidate(raw).unwrap_or_else(|| Candidate {
        strategy: ExtractionStrategy::HeuristicFallback,
        fields: heuristic_candidate(raw, taxonomy),
    });

    let validation = validate_candidate(&candidate.fields, taxonomy);
    let mut record = validation.record;

    let fell_back = candidate.strategy == ExtractionStrategy::HeuristicFallback;
    if fell_back || !validation.repairs.is_empty() {
        record.raw_response = Some(raw.to_string());
    }

    if !validation.repairs.is_empty() {
        tracing::debug!(
            strategy = candidate.strategy.as_str(),
            repairs = ?validation.repairs,
            "Model response needed repair"
        );
    }

    ParseOutcome::new(candidate.strategy, record)
}

/// Find the first JSON object in `raw` using the structured layers only.
/// Returns `None` when the heuristic fallback is needed.
pub fn extract_candidate(raw: &str) -> Option<Candidate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }

    if let Some(fields) = parse_object(trimmed) {
        return Some(Candidate {
            strategy: ExtractionStrategy::DirectParse,
            fields,
        });
    }

    if let Some(fields) = fenced_blocks(trimmed).into_iter().find_map(parse_object) {
        return Some(Candidate {
            strategy: ExtractionStrategy::FencedParse,
            fields,
        });
    }

    let unthought = strip_thinking_sections(trimmed);
    brace_fragments(&unthought)
        .into_iter()
        .find_map(parse_object)
        .map(|fields| Candidate {
            strategy: ExtractionStrategy::BraceScan,
            fields,
        })
}

/// Contents of every fenced code block, in order found.
pub fn fenced_blocks(text: &str) -> Vec<&str> {
    FENCED_BLOCK_RE
        .captures_iter(text)
        .filter_map(|c| c.get(1))
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Drop thinking sections so reasoning drafts are never scanned.
pub fn strip_thinking_sections(text: &str) -> String {
    THINKING_RE.replace_all(text, "").into_owned()
}

/// Brace fragments ordered for scanning: flat fragments naming all four
/// analysis fields first, then every nesting-tolerant fragment in text order.
///
/// The narrow pass matches innermost objects, so a record wrapped in an
/// outer object (`{"analysis": {...}}`) is still found.
pub fn brace_fragments(text: &str) -> Vec<&str> {
    let narrow = FLAT_FRAGMENT_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|f| names_all_fields(f));
    let broad = BRACE_FRAGMENT_RE.find_iter(text).map(|m| m.as_str().trim());
    narrow.chain(broad).collect()
}

fn names_all_fields(fragment: &str) -> bool {
    REQUIRED_FIELDS
        .iter()
        .all(|field| fragment.contains(&format!("\"{field}\"")))
}

/// Parse `text` as a JSON object. Scalars and arrays do not count.
fn parse_object(text: &str) -> Option<Map<String, Value>> {
    match serde_json::from_str::<Value>(text) {
        Ok(Value::Object(map)) => Some(map),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{Category, Sentiment};

    fn parse(raw: &str) -> ParseOutcome {
        parse_model_response(raw, &Taxonomy::standard())
    }

    #[test]
    fn direct_parse_returns_record_unchanged() {
        let raw = r#"{"sentiment":"Negative","classification":"Maintenance/Repairs","confidence":100,"tags":["Pepsi machine","cooling issue"]}"#;
        let outcome = parse(raw);

        assert_eq!(outcome.strategy(), ExtractionStrategy::DirectParse);
        let record = outcome.record();
        assert_eq!(record.sentiment, Sentiment::Negative);
        assert_eq!(record.classification, Category::MaintenanceRepairs);
        assert_eq!(record.confidence, 100.0);
        assert_eq!(record.tags, vec!["Pepsi machine", "cooling issue"]);
        assert!(record.raw_response.is_none());

        let round_trip = serde_json::to_value(record).unwrap();
        let original: Value = serde_json::from_str(raw).unwrap();
        assert_eq!(round_trip, original);
    }

    #[test]
    fn fenced_block_with_prose_is_extracted() {
        let raw = "Here is my analysis:\n```json\n{\"sentiment\":\"Positive\",\"classification\":\"Operational Logistics\",\"confidence\":95,\"tags\":[\"scheduling\"]}\n```\nLet me know if you need more.";
        let outcome = parse(raw);

        assert_eq!(outcome.strategy(), ExtractionStrategy::FencedParse);
        let record = outcome.record();
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(record.classification, Category::OperationalLogistics);
        assert_eq!(record.confidence, 95.0);
        assert_eq!(record.tags, vec!["scheduling"]);
        assert!(record.raw_response.is_none());
    }

    #[test]
    fn fenced_block_without_language_tag_is_extracted() {
        let raw = "Result:\n```\n{\"sentiment\":\"Neutral\",\"classification\":\"General Follow-ups\",\"confidence\":62,\"tags\":[]}\n```";
        let outcome = parse(raw);
        assert_eq!(outcome.strategy(), ExtractionStrategy::FencedParse);
        assert_eq!(outcome.record().confidence, 62.0);
    }

    #[test]
    fn unparseable_fence_falls_through_to_next_block() {
        let raw = "```json\n{not json}\n```\nand\n```json\n{\"sentiment\":\"Neutral\",\"classification\":\"Billing/Invoices\",\"confidence\":80,\"tags\":[]}\n```";
        let outcome = parse(raw);
        assert_eq!(outcome.strategy(), ExtractionStrategy::FencedParse);
        assert_eq!(outcome.record().classification, Category::BillingInvoices);
    }

    #[test]
    fn thinking_section_is_discarded_before_brace_scan() {
        let raw = r#"<think>reasoning...</think>{"sentiment":"Neutral","classification":"Billing/Invoices","confidence":70,"tags":["invoice"]}"#;
        let outcome = parse(raw);

        assert_eq!(outcome.strategy(), ExtractionStrategy::BraceScan);
        let record = outcome.record();
        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.classification, Category::BillingInvoices);
        assert_eq!(record.confidence, 70.0);
        assert_eq!(record.tags, vec!["invoice"]);
    }

    #[test]
    fn braces_inside_thinking_are_never_scanned() {
        let raw = "<think>maybe {\"sentiment\":\"Positive\",\"classification\":\"Admin/Coordination\",\"confidence\":99,\"tags\":[]}</think>\nFinal: {\"sentiment\":\"Negative\",\"classification\":\"Feedback/Complaints\",\"confidence\":88,\"tags\":[\"driver\"]}";
        let outcome = parse(raw);
        assert_eq!(outcome.strategy(), ExtractionStrategy::BraceScan);
        assert_eq!(outcome.record().classification, Category::FeedbackComplaints);
    }

    #[test]
    fn fenced_block_wins_over_free_brace_fragment() {
        let raw = "Draft: {\"sentiment\":\"Negative\",\"classification\":\"Billing/Invoices\",\"confidence\":40,\"tags\":[]}\n```json\n{\"sentiment\":\"Positive\",\"classification\":\"Admin/Coordination\",\"confidence\":90,\"tags\":[\"access\"]}\n```";
        let outcome = parse(raw);
        assert_eq!(outcome.strategy(), ExtractionStrategy::FencedParse);
        assert_eq!(outcome.record().classification, Category::AdminCoordination);
    }

    #[test]
    fn fragment_naming_all_fields_wins_over_earlier_fragment() {
        let raw = "Context {\"note\": \"irrelevant\"} then {\"sentiment\":\"Positive\",\"classification\":\"Product/Stocking Requests\",\"confidence\":91,\"tags\":[\"coffee\"]}";
        let outcome = parse(raw);
        assert_eq!(outcome.strategy(), ExtractionStrategy::BraceScan);
        assert_eq!(outcome.record().classification, Category::ProductStocking);
    }

    #[test]
    fn record_wrapped_in_outer_object_is_found() {
        let raw = "Here is the result: {\"analysis\": {\"sentiment\":\"Negative\",\"classification\":\"Maintenance/Repairs\",\"confidence\":92,\"tags\":[\"cooler\"]}} hope it helps";
        let outcome = parse(raw);

        assert_eq!(outcome.strategy(), ExtractionStrategy::BraceScan);
        let record = outcome.record();
        assert_eq!(record.sentiment, Sentiment::Negative);
        assert_eq!(record.classification, Category::MaintenanceRepairs);
        assert_eq!(record.confidence, 92.0);
        assert_eq!(record.tags, vec!["cooler"]);
        assert!(record.raw_response.is_none());
    }

    #[test]
    fn wrapped_record_is_listed_before_its_wrapper() {
        let text = r#"{"analysis": {"sentiment":"a","classification":"b","confidence":1,"tags":[]}}"#;
        let fragments = brace_fragments(text);
        assert_eq!(fragments.len(), 2);
        assert!(fragments[0].starts_with(r#"{"sentiment""#));
        assert!(fragments[1].starts_with(r#"{"analysis""#));
    }

    #[test]
    fn broad_fragment_is_used_and_repaired() {
        let raw = "Answer: {\"sentiment\": \"positive\", \"confidence\": \"80\"}";
        let outcome = parse(raw);
        assert_eq!(outcome.strategy(), ExtractionStrategy::BraceScan);
        let record = outcome.record();
        assert_eq!(record.sentiment, Sentiment::Positive);
        assert_eq!(record.classification, Category::GeneralFollowUps);
        assert_eq!(record.confidence, 80.0);
        assert_eq!(record.raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn unparseable_text_uses_keyword_heuristic() {
        let raw = "I think this email is about a broken cooling machine, pretty urgent.";
        let outcome = parse(raw);

        assert_eq!(outcome.strategy(), ExtractionStrategy::HeuristicFallback);
        let record = outcome.record();
        assert_eq!(record.sentiment, Sentiment::Negative);
        assert_eq!(record.classification, Category::MaintenanceRepairs);
        assert_eq!(record.confidence, 50.0);
        assert!(record.tags.contains(&"machine".to_string()));
        assert_eq!(record.raw_response.as_deref(), Some(raw));
    }

    #[test]
    fn json_scalar_is_not_a_candidate() {
        assert!(extract_candidate("42").is_none());
        assert!(extract_candidate("[\"a\", \"b\"]").is_none());
        assert_eq!(parse("\"hello\"").strategy(), ExtractionStrategy::HeuristicFallback);
    }

    #[test]
    fn empty_input_falls_back_to_default_record() {
        let outcome = parse("");
        assert_eq!(outcome.strategy(), ExtractionStrategy::HeuristicFallback);
        let record = outcome.into_record();
        assert_eq!(record.sentiment, Sentiment::Neutral);
        assert_eq!(record.classification, Category::GeneralFollowUps);
        assert_eq!(record.confidence, 50.0);
        assert!(record.tags.is_empty());
        assert_eq!(record.raw_response.as_deref(), Some(""));
    }

    #[test]
    fn every_input_yields_a_conforming_record() {
        let inputs = [
            "",
            "   \n\t ",
            "plain prose with no structure at all",
            "{",
            "}{",
            "{{{{}}}}",
            "{\"sentiment\": }",
            "```json\n{\"sentiment\": \"Positive\",\n```",
            "{\"a\": {\"b\": {\"c\": {\"d\": 1}}}}",
            "<think>unterminated reasoning {\"confidence\": 5000}",
            "{\"sentiment\": null, \"classification\": 7, \"confidence\": -20, \"tags\": \"x\"}",
            "{\"confidence\": 1e400}",
            "\u{0}\u{1}\u{feff}{}",
            "ünïcödé {\"tags\": [\"ß\", 1, true, null, {}]}",
        ];
        for raw in inputs {
            let record = parse(raw).into_record();
            assert!(Sentiment::ALL.contains(&record.sentiment), "{raw:?}");
            assert!(Category::ALL.contains(&record.classification), "{raw:?}");
            assert!(
                (0.0..=100.0).contains(&record.confidence),
                "{raw:?} -> {}",
                record.confidence
            );
        }
    }

    #[test]
    fn brace_fragments_lists_narrow_matches_first() {
        let text = r#"{"x": 1} {"sentiment":"a","classification":"b","confidence":1,"tags":[]}"#;
        let fragments = brace_fragments(text);
        assert_eq!(fragments.len(), 3);
        assert!(fragments[0].contains("sentiment"));
        assert_eq!(fragments[1], r#"{"x": 1}"#);
    }

    #[test]
    fn strip_thinking_is_case_insensitive_and_multiline() {
        let text = "<THINK>\nline one\nline two\n</THINK>answer <thinking>more</thinking>done";
        assert_eq!(strip_thinking_sections(text), "answer done");
    }
}
