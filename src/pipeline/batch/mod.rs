//! Batch email analysis.
//!
//! ```text
//! JSONL/CSV input → worker pool (EmailClassifier per email) → AnalysisSink → summary
//! ```

pub mod types;
pub mod input;
pub mod sink;
pub mod runner;

pub use types::*;
pub use input::{load_email_inputs, read_csv_inputs, read_email_inputs, InputFormat};
pub use sink::{parse_email_date, AnalysisSink, JsonlSink, NewAnalysis};
pub use runner::BatchRunner;
