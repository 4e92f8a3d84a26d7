use serde::{Deserialize, Serialize};

use super::AnalysisError;

/// Sampling parameters sent as Ollama `options`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Sampling temperature. Higher = more varied, which is what makes a
    /// low-confidence retry worth asking for.
    pub temperature: f32,
    /// Maximum tokens in the generated response.
    /// None = model default.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num_predict: Option<i32>,
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            temperature: 0.7,
            num_predict: None,
        }
    }
}

/// Model entry from Ollama `/api/tags`.
#[derive(Debug, Clone, Deserialize)]
pub struct ModelInfo {
    pub name: String,
    #[serde(default)]
    pub size: u64,
    #[serde(default)]
    pub modified_at: Option<String>,
}

/// Validate that a base URL points to localhost only.
///
/// Accepts: localhost, 127.0.0.1, [::1] (IPv6 loopback).
/// Rejects: any other host, malformed URLs.
pub fn validate_base_url(url: &str) -> Result<(), AnalysisError> {
    let after_scheme = url
        .strip_prefix("http://")
        .or_else(|| url.strip_prefix("https://"))
        .ok_or(AnalysisError::InvalidUrl)?;

    // IPv6 bracket notation: [::1]:11434
    let host = if let Some(rest) = after_scheme.strip_prefix('[') {
        rest.split(']').next().unwrap_or("")
    } else {
        after_scheme
            .split(['/', ':'])
            .next()
            .unwrap_or("")
    };

    match host {
        "" => Err(AnalysisError::InvalidUrl),
        "localhost" | "127.0.0.1" | "::1" => Ok(()),
        _ => Err(AnalysisError::NonLocalEndpoint),
    }
}

/// Validate an Ollama model name such as `deepseek-r1:1.5b` or
/// `library/llama3:8b`.
///
/// Allowed: ASCII alphanumerics plus `.`, `-`, `_`, `:`, and a single `/`
/// namespace separator. Must not start with `.`, `-`, or `/`.
pub fn validate_model_name(name: &str) -> Result<(), AnalysisError> {
    let invalid = || AnalysisError::InvalidModelName(name.to_string());

    if name.is_empty() || name.len() > 200 {
        return Err(invalid());
    }
    if name.starts_with(['.', '-', '/']) || name.ends_with('/') {
        return Err(invalid());
    }
    if name.contains("..") || name.matches('/').count() > 1 {
        return Err(invalid());
    }
    let allowed = |c: char| c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_' | ':' | '/');
    if !name.chars().all(allowed) {
        return Err(invalid());
    }
    Ok(())
}
