//! BatchRunner: analyzes many emails on a fixed-size worker pool.
//!
//! Each email is analyzed independently; a hard failure on one email is
//! replaced by the fallback record and never stops the batch. Results are
//! stored through the sink afterwards, in input order.

use std::time::Instant;

use rayon::prelude::*;

use super::sink::{AnalysisSink, NewAnalysis};
use super::types::{BatchOutcome, BatchReport, BatchSummary, EmailInput};
use crate::config::DEFAULT_BATCH_WORKERS;
use crate::models::AnalysisRecord;
use crate::pipeline::analysis::{AnalysisError, EmailClassifier};

pub struct BatchRunner {
    classifier: Box<dyn EmailClassifier>,
    sink: Box<dyn AnalysisSink>,
    pool: rayon::ThreadPool,
    workers: usize,
}

impl BatchRunner {
    pub fn new(
        classifier: Box<dyn EmailClassifier>,
        sink: Box<dyn AnalysisSink>,
        workers: usize,
    ) -> Result<Self, AnalysisError> {
        if workers == 0 {
            return Err(AnalysisError::Config("worker count must be at least 1".into()));
        }
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("inboxlens-worker-{i}"))
            .build()
            .map_err(|e| AnalysisError::Config(format!("failed to build worker pool: {e}")))?;

        Ok(Self {
            classifier,
            sink,
            pool,
            workers,
        })
    }

    /// Runner with the default pool size.
    pub fn with_default_workers(
        classifier: Box<dyn EmailClassifier>,
        sink: Box<dyn AnalysisSink>,
    ) -> Result<Self, AnalysisError> {
        Self::new(classifier, sink, DEFAULT_BATCH_WORKERS)
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Analyze and store every input. Outcomes come back in input order.
    pub fn run(&self, inputs: &[EmailInput]) -> BatchReport {
        let start = Instant::now();
        tracing::info!(
            total = inputs.len(),
            workers = self.workers,
            "Starting batch analysis"
        );

        let mut outcomes: Vec<BatchOutcome> = self.pool.install(|| {
            inputs
                .par_iter()
                .enumerate()
                .map(|(index, input)| self.analyze_one(index, input))
                .collect()
        });

        for outcome in &mut outcomes {
            self.store(outcome);
        }

        let summary = BatchSummary::from_outcomes(&outcomes, start.elapsed().as_secs_f64());
        tracing::info!(
            total = summary.total,
            successful = summary.successful,
            failed = summary.failed,
            average_confidence = summary.average_confidence,
            elapsed_secs = summary.elapsed_secs,
            "Batch analysis complete"
        );

        BatchReport { outcomes, summary }
    }

    fn analyze_one(&self, index: usize, input: &EmailInput) -> BatchOutcome {
        let (record, error) = match self.classifier.analyze(&input.body) {
            Ok(record) => (record, None),
            Err(e) => {
                tracing::warn!(
                    index,
                    email_date = input.date.as_deref().unwrap_or("unknown"),
                    error = %e,
                    "Analysis failed, using fallback record"
                );
                (AnalysisRecord::fallback(), Some(e.to_string()))
            }
        };

        BatchOutcome {
            index,
            email_date: input.date.clone(),
            email_text: input.body.clone(),
            record,
            error,
            record_id: None,
        }
    }

    fn store(&self, outcome: &mut BatchOutcome) {
        let saved = self.sink.save(&NewAnalysis {
            record: &outcome.record,
            email_text: &outcome.email_text,
            email_date: outcome.email_date.as_deref(),
            error: outcome.error.as_deref(),
        });

        match saved {
            Ok(id) => outcome.record_id = Some(id),
            Err(e) => {
                tracing::warn!(index = outcome.index, error = %e, "Failed to store analysis");
                let message = format!("storage failed: {e}");
                outcome.error = Some(match outcome.error.take() {
                    Some(previous) => format!("{previous}; {message}"),
                    None => message,
                });
            }
        }
    }
}
