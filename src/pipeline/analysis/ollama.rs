use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::ollama_types::{validate_base_url, GenerationOptions, ModelInfo};
use super::types::LlmClient;
use super::AnalysisError;
use crate::config::{DEFAULT_OLLAMA_URL, DEFAULT_TIMEOUT_SECS};

/// Ollama HTTP client for local LLM inference.
#[derive(Debug)]
pub struct OllamaClient {
    base_url: String,
    client: reqwest::blocking::Client,
    timeout_secs: u64,
}

impl OllamaClient {
    /// Create a client for a loopback Ollama instance.
    ///
    /// Non-local URLs are rejected before any request is made.
    pub fn new(base_url: &str, timeout_secs: u64) -> Result<Self, AnalysisError> {
        let base_url = base_url.trim_end_matches('/');
        validate_base_url(base_url)?;

        let client = reqwest::blocking::Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .no_proxy()
            .build()
            .map_err(|e| AnalysisError::HttpClient(e.to_string()))?;

        Ok(Self {
            base_url: base_url.to_string(),
            client,
            timeout_secs,
        })
    }

    /// Default Ollama instance at localhost:11434 with 5-minute timeout.
    pub fn default_local() -> Result<Self, AnalysisError> {
        Self::new(DEFAULT_OLLAMA_URL, DEFAULT_TIMEOUT_SECS)
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Installed models with their size and modification time.
    pub fn list_model_info(&self) -> Result<Vec<ModelInfo>, AnalysisError> {
        let url = format!("{}/api/tags", self.base_url);

        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let response = check_status(response)?;
        let parsed: OllamaTagsResponse = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        Ok(parsed.models)
    }

    fn map_send_error(&self, e: reqwest::Error) -> AnalysisError {
        if e.is_connect() {
            AnalysisError::OllamaConnection(self.base_url.clone())
        } else if e.is_timeout() {
            AnalysisError::Timeout(self.timeout_secs)
        } else {
            AnalysisError::HttpClient(e.to_string())
        }
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, AnalysisError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().unwrap_or_default();
    Err(AnalysisError::OllamaError {
        status: status.as_u16(),
        body,
    })
}

/// Request body for Ollama /api/generate
#[derive(Serialize)]
struct OllamaGenerateRequest<'a> {
    model: &'a str,
    prompt: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    system: Option<&'a str>,
    stream: bool,
    options: &'a GenerationOptions,
}

/// Response body from Ollama /api/generate
#[derive(Deserialize)]
struct OllamaGenerateResponse {
    response: String,
}

/// Response body from Ollama /api/tags
#[derive(Deserialize)]
struct OllamaTagsResponse {
    #[serde(default)]
    models: Vec<ModelInfo>,
}

impl LlmClient for OllamaClient {
    fn generate(
        &self,
        model: &str,
        prompt: &str,
        system: Option<&str>,
        options: &GenerationOptions,
    ) -> Result<String, AnalysisError> {
        let url = format!("{}/api/generate", self.base_url);
        let body = OllamaGenerateRequest {
            model,
            prompt,
            system,
            stream: false,
            options,
        };

        let response = self
            .client
            .post(&url)
            .json(&body)
            .send()
            .map_err(|e| self.map_send_error(e))?;

        let response = check_status(response)?;
        let parsed: OllamaGenerateResponse = response
            .json()
            .map_err(|e| AnalysisError::ResponseParsing(e.to_string()))?;

        Ok(parsed.response)
    }

    fn is_model_available(&self, model: &str) -> Result<bool, AnalysisError> {
        let models = self.list_models()?;
        Ok(models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, AnalysisError> {
        Ok(self
            .list_model_info()?
            .into_iter()
            .map(|m| m.name)
            .collect())
    }
}

/// Mock LLM client for testing.
///
/// Replies come from a script, consumed one per `generate` call; once the
/// script is empty every call returns the default response.
pub struct MockLlmClient {
    default_response: String,
    script: Mutex<VecDeque<Result<String, AnalysisError>>>,
    available_models: Vec<String>,
    prompts: Mutex<Vec<String>>,
    calls: AtomicUsize,
}

impl MockLlmClient {
    pub fn new(response: &str) -> Self {
        Self {
            default_response: response.to_string(),
            script: Mutex::new(VecDeque::new()),
            available_models: vec!["deepseek-r1:1.5b".to_string()],
            prompts: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Replies returned in order before falling back to the default.
    pub fn with_script(self, replies: Vec<Result<String, AnalysisError>>) -> Self {
        if let Ok(mut script) = self.script.lock() {
            script.extend(replies);
        }
        self
    }

    pub fn with_models(mut self, models: Vec<String>) -> Self {
        self.available_models = models;
        self
    }

    /// Number of `generate` calls so far.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Prompts received, in call order.
    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().map(|p| p.clone()).unwrap_or_default()
    }
}

impl LlmClient for MockLlmClient {
    fn generate(
        &self,
        _model: &str,
        prompt: &str,
        _system: Option<&str>,
        _options: &GenerationOptions,
    ) -> Result<String, AnalysisError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut prompts) = self.prompts.lock() {
            prompts.push(prompt.to_string());
        }
        let scripted = self.script.lock().ok().and_then(|mut s| s.pop_front());
        scripted.unwrap_or_else(|| Ok(self.default_response.clone()))
    }

    fn is_model_available(&self, model: &str) -> Result<bool, AnalysisError> {
        Ok(self.available_models.iter().any(|m| m.starts_with(model)))
    }

    fn list_models(&self) -> Result<Vec<String>, AnalysisError> {
        Ok(self.available_models.clone())
    }
}
