use serde::Serialize;

use super::ollama_types::GenerationOptions;
use super::AnalysisError;
use crate::models::AnalysisRecord;

/// Which extraction layer produced a candidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ExtractionStrategy {
    DirectParse,
    FencedParse,
    BraceScan,
    HeuristicFallback,
}

impl ExtractionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::DirectParse => "direct_parse",
            Self::FencedParse => "fenced_parse",
            Self::BraceScan => "brace_scan",
            Self::HeuristicFallback => "heuristic_fallback",
        }
    }
}

/// A JSON object pulled out of model text, not yet schema-checked.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    pub strategy: ExtractionStrategy,
    pub fields: serde_json::Map<String, serde_json::Value>,
}

/// Normalized record tagged with the extraction layer that produced it.
#[derive(Debug, Clone, PartialEq)]
pub enum ParseOutcome {
    DirectParse(AnalysisRecord),
    FencedParse(AnalysisRecord),
    BraceScan(AnalysisRecord),
    HeuristicFallback(AnalysisRecord),
}

impl ParseOutcome {
    pub fn new(strategy: ExtractionStrategy, record: AnalysisRecord) -> Self {
        match strategy {
            ExtractionStrategy::DirectParse => Self::DirectParse(record),
            ExtractionStrategy::FencedParse => Self::FencedParse(record),
            ExtractionStrategy::BraceScan => Self::BraceScan(record),
            ExtractionStrategy::HeuristicFallback => Self::HeuristicFallback(record),
        }
    }

    pub fn strategy(&self) -> ExtractionStrategy {
        match self {
            Self::DirectParse(_) => ExtractionStrategy::DirectParse,
            Self::FencedParse(_) => ExtractionStrategy::FencedParse,
            Self::BraceScan(_) => ExtractionStrategy::BraceScan,
            Self::HeuristicFallback(_) => ExtractionStrategy::HeuristicFallback,
        }
    }

    pub fn record(&self) -> &AnalysisRecord {
        match self {
            Self::DirectParse(r)
            | Self::FencedParse(r)
            | Self::BraceScan(r)
            | Self::HeuristicFallback(r) => r,
        }
    }

    pub fn into_record(self) -> AnalysisRecord {
        match self {
            Self::DirectParse(r)
            | Self::FencedParse(r)
            | Self::BraceScan(r)
            | Self::HeuristicFallback(r) => r,
        }
    }
}

/// Ollama LLM client abstraction (allows mocking)
pub trait LlmClient: Send + Sync {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String, AnalysisError>;

    fn is_model_available(&self, model: &str) -> Result<bool, AnalysisError>;

    fn list_models(&self) -> Result<Vec<String>, AnalysisError>;
}

/// Turns one email into one record. Implemented by the real analyzer and
/// by test doubles for the batch runner.
pub trait EmailClassifier: Send + Sync {
    fn analyze(&self, email_text: &str) -> Result<AnalysisRecord, AnalysisError>;
}
