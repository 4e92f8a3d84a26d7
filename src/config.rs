use std::time::Duration;

use crate::pipeline::analysis::{
    validate_base_url, validate_model_name, AnalysisError, GenerationOptions, RetryPolicy,
};

/// Application-level constants
pub const APP_NAME: &str = "inboxlens";
pub const APP_VERSION: &str = env!("CARGO_PKG_VERSION");

/// Local Ollama endpoint.
pub const DEFAULT_OLLAMA_URL: &str = "http://localhost:11434";

/// Small reasoning model; its responses often wrap JSON in thinking sections.
pub const DEFAULT_MODEL: &str = "deepseek-r1:1.5b";

pub const DEFAULT_CONFIDENCE_THRESHOLD: f64 = 0.6;
pub const DEFAULT_MAX_RETRIES: u32 = 2;
pub const DEFAULT_RETRY_DELAY: Duration = Duration::from_secs(1);
pub const DEFAULT_TEMPERATURE: f32 = 0.7;

/// Five minutes; local models on CPU are slow.
pub const DEFAULT_TIMEOUT_SECS: u64 = 300;

pub const DEFAULT_BATCH_WORKERS: usize = 8;
pub const DEFAULT_MAX_EMAILS: usize = 600;

/// Log filter used when `RUST_LOG` is unset.
pub fn default_log_filter() -> &'static str {
    "inboxlens=info"
}

/// Everything an [`EmailAnalyzer`](crate::pipeline::analysis::EmailAnalyzer) needs.
#[derive(Debug, Clone, PartialEq)]
pub struct AnalyzerConfig {
    pub model: String,
    pub ollama_url: String,
    /// Acceptance threshold on the 0.0-1.0 scale.
    pub confidence_threshold: f64,
    pub max_retries: u32,
    pub retry_delay: Duration,
    pub temperature: f32,
    /// None = model default.
    pub max_tokens: Option<i32>,
    pub timeout_secs: u64,
}

impl Default for AnalyzerConfig {
    fn default() -> Self {
        Self {
            model: DEFAULT_MODEL.to_string(),
            ollama_url: DEFAULT_OLLAMA_URL.to_string(),
            confidence_threshold: DEFAULT_CONFIDENCE_THRESHOLD,
            max_retries: DEFAULT_MAX_RETRIES,
            retry_delay: DEFAULT_RETRY_DELAY,
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
        }
    }
}

impl AnalyzerConfig {
    /// Reject settings that would fail at the first model call.
    ///
    /// Thresholds above 1.0 are allowed: they make every analysis exhaust
    /// its retries, which is occasionally useful for sampling.
    pub fn validate(&self) -> Result<(), AnalysisError> {
        validate_base_url(&self.ollama_url)?;
        validate_model_name(&self.model)?;

        if !self.confidence_threshold.is_finite() || self.confidence_threshold < 0.0 {
            return Err(AnalysisError::Config(format!(
                "confidence threshold must be a non-negative number, got {}",
                self.confidence_threshold
            )));
        }
        if !self.temperature.is_finite() || self.temperature < 0.0 {
            return Err(AnalysisError::Config(format!(
                "temperature must be a non-negative number, got {}",
                self.temperature
            )));
        }
        if matches!(self.max_tokens, Some(n) if n <= 0) {
            return Err(AnalysisError::Config("max tokens must be positive".into()));
        }
        if self.timeout_secs == 0 {
            return Err(AnalysisError::Config("timeout must be at least 1s".into()));
        }
        Ok(())
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            threshold: self.confidence_threshold,
            retry_delay: self.retry_delay,
        }
    }

    pub fn generation_options(&self) -> GenerationOptions {
        GenerationOptions {
            temperature: self.temperature,
            num_predict: self.max_tokens,
        }
    }
}
