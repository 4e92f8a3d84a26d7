pub mod analysis; // Structured-response extraction and confidence-gated retry
pub mod batch; // Parallel batch analysis with JSONL output
