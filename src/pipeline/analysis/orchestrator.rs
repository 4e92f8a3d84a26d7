use std::sync::Arc;

use super::ollama::OllamaClient;
use super::parser::parse_model_response;
use super::prompt::{build_analysis_prompt, ANALYSIS_SYSTEM_PROMPT};
use super::retry::run_with_retry;
use super::sanitize::clean_email_text;
use super::taxonomy::Taxonomy;
use super::types::{EmailClassifier, LlmClient, ParseOutcome};
use super::AnalysisError;
use crate::config::AnalyzerConfig;
use crate::models::AnalysisRecord;

/// Runs the full analysis pipeline for one email:
/// clean → prompt → LLM → extract → validate → confidence gate.
pub struct EmailAnalyzer {
    llm: Arc<dyn LlmClient>,
    config: AnalyzerConfig,
    taxonomy: Taxonomy,
}

impl EmailAnalyzer {
    pub fn new(llm: Arc<dyn LlmClient>, config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        config.validate()?;
        Ok(Self {
            llm,
            config,
            taxonomy: Taxonomy::standard(),
        })
    }

    /// Analyzer backed by the Ollama instance named in `config`.
    pub fn from_config(config: AnalyzerConfig) -> Result<Self, AnalysisError> {
        let client = OllamaClient::new(&config.ollama_url, config.timeout_secs)?;
        Self::new(Arc::new(client), config)
    }

    /// One model round trip. Returns the raw response text, unparsed.
    pub fn invoke(&self, email_text: &str) -> Result<String, AnalysisError> {
        let prompt = build_analysis_prompt(email_text);
        self.llm.generate(
            &self.config.model,
            &prompt,
            Some(ANALYSIS_SYSTEM_PROMPT),
            &self.config.generation_options(),
        )
    }

    /// One model call, extracted and validated.
    pub fn analyze_once(&self, email_text: &str) -> Result<ParseOutcome, AnalysisError> {
        let raw = self.invoke(email_text)?;
        let outcome = parse_model_response(&raw, &self.taxonomy);
        tracing::debug!(
            strategy = outcome.strategy().as_str(),
            confidence = outcome.record().confidence,
            "Model response parsed"
        );
        Ok(outcome)
    }

    /// Analyze already-cleaned text, overriding the configured retry budget
    /// and threshold.
    pub fn analyze_with_retry(
        &self,
        email_text: &str,
        max_retries: u32,
        threshold: f64,
    ) -> Result<AnalysisRecord, AnalysisError> {
        let mut policy = self.config.retry_policy();
        policy.max_retries = max_retries;
        policy.threshold = threshold;

        run_with_retry(&policy, |attempt| {
            self.analyze_once(email_text)
                .map(ParseOutcome::into_record)
                .inspect_err(|e| {
                    tracing::warn!(
                        model = %self.config.model,
                        attempt,
                        error = %e,
                        "Model invocation failed"
                    );
                })
        })
    }

    /// Clean the email and analyze it with the configured retry policy.
    pub fn analyze(&self, email_text: &str) -> Result<AnalysisRecord, AnalysisError> {
        let cleaned = clean_email_text(email_text);
        self.analyze_with_retry(
            &cleaned,
            self.config.max_retries,
            self.config.confidence_threshold,
        )
    }
}

impl EmailClassifier for EmailAnalyzer {
    fn analyze(&self, email_text: &str) -> Result<AnalysisRecord, AnalysisError> {
        EmailAnalyzer::analyze(self, email_text)
    }
}
