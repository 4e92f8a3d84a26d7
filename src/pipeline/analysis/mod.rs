pub mod types;
pub mod taxonomy;
pub mod prompt;
pub mod parser;
pub mod heuristic;
pub mod validation;
pub mod retry;
pub mod sanitize;
pub mod ollama;
pub mod ollama_types;
pub mod orchestrator;

pub use types::*;
pub use taxonomy::*;
pub use prompt::*;
pub use parser::*;
pub use heuristic::*;
pub use validation::*;
pub use retry::*;
pub use sanitize::*;
pub use ollama::*;
pub use ollama_types::*;
pub use orchestrator::*;

use thiserror::Error;

/// Hard failures of the analysis pipeline.
///
/// Low model confidence is never an error; it is resolved inside the
/// retry controller. Everything here means the model could not be asked
/// at all, or the configuration was unusable.
#[derive(Error, Debug)]
pub enum AnalysisError {
    #[error("Ollama is not running at {0}")]
    OllamaConnection(String),

    #[error("Ollama returned error (status {status}): {body}")]
    OllamaError { status: u16, body: String },

    #[error("Request timed out after {0}s")]
    Timeout(u64),

    #[error("HTTP client error: {0}")]
    HttpClient(String),

    #[error("Malformed Ollama response: {0}")]
    ResponseParsing(String),

    #[error("Invalid model name: '{0}'")]
    InvalidModelName(String),

    #[error("Only localhost Ollama endpoints are allowed")]
    NonLocalEndpoint,

    #[error("Invalid URL format")]
    InvalidUrl,

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Invalid input at line {line}: {reason}")]
    Input { line: usize, reason: String },

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}
