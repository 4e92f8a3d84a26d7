//! Confidence-gated retry.
//!
//! A record is accepted as soon as its confidence reaches the threshold.
//! Otherwise the model is asked again, up to `max_retries` extra times, and
//! the most confident record seen is returned when the budget runs out.

use std::time::Duration;

use crate::models::AnalysisRecord;

/// Retry budget and acceptance threshold for one analysis.
#[derive(Debug, Clone, PartialEq)]
pub struct RetryPolicy {
    /// Extra attempts after the first. Zero means exactly one attempt.
    pub max_retries: u32,
    /// Acceptance threshold on the 0.0-1.0 scale.
    pub threshold: f64,
    /// Pause between attempts.
    pub retry_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 2,
            threshold: 0.6,
            retry_delay: Duration::from_secs(1),
        }
    }
}

/// Progress of one retry loop.
#[derive(Debug, Clone, PartialEq)]
pub enum RetryState {
    /// Waiting for the result of attempt `attempt` (0-based).
    Attempting {
        attempt: u32,
        best: Option<AnalysisRecord>,
    },
    Accepted(AnalysisRecord),
    Exhausted { best: Option<AnalysisRecord> },
}

impl RetryState {
    pub fn start() -> Self {
        Self::Attempting {
            attempt: 0,
            best: None,
        }
    }

    /// Feed the record produced by the current attempt.
    ///
    /// Terminal states ignore further candidates.
    pub fn advance(self, policy: &RetryPolicy, candidate: AnalysisRecord) -> Self {
        let (attempt, best) = match self {
            Self::Attempting { attempt, best } => (attempt, best),
            terminal => return terminal,
        };

        if candidate.confidence_fraction() >= policy.threshold {
            tracing::debug!(
                attempt,
                confidence = candidate.confidence,
                threshold = policy.threshold,
                "Analysis accepted"
            );
            return Self::Accepted(candidate);
        }

        // Ties keep the earlier record.
        let best = match best {
            Some(current) if current.confidence >= candidate.confidence => Some(current),
            _ => Some(candidate),
        };

        let next = attempt + 1;
        if next > policy.max_retries {
            tracing::warn!(
                attempts = next,
                best_confidence = best.as_ref().map(|r| r.confidence),
                threshold = policy.threshold,
                "Retries exhausted, keeping most confident analysis"
            );
            Self::Exhausted { best }
        } else {
            tracing::info!(
                attempt = next,
                max_retries = policy.max_retries,
                threshold = policy.threshold,
                "Confidence below threshold, retrying"
            );
            Self::Attempting {
                attempt: next,
                best,
            }
        }
    }

    /// Index of the attempt still to run, if any.
    pub fn pending_attempt(&self) -> Option<u32> {
        match self {
            Self::Attempting { attempt, .. } => Some(*attempt),
            _ => None,
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.pending_attempt().is_none()
    }

    /// Final record: the accepted one, else the best seen, else the fallback.
    pub fn resolve(self) -> AnalysisRecord {
        match self {
            Self::Accepted(record) => record,
            Self::Exhausted { best } | Self::Attempting { best, .. } => {
                best.unwrap_or_else(AnalysisRecord::fallback)
            }
        }
    }
}

/// Drive `attempt_fn` through the retry state machine.
///
/// `attempt_fn` receives the 0-based attempt index and must make a fresh
/// model call each time. Its errors end the loop immediately. The delay is
/// only slept when another attempt follows.
pub fn run_with_retry<E, F>(policy: &RetryPolicy, mut attempt_fn: F) -> Result<AnalysisRecord, E>
where
    F: FnMut(u32) -> Result<AnalysisRecord, E>,
{
    let mut state = RetryState::start();

    while let Some(attempt) = state.pending_attempt() {
        let candidate = attempt_fn(attempt)?;
        state = state.advance(policy, candidate);

        if !state.is_terminal() && !policy.retry_delay.is_zero() {
            std::thread::sleep(policy.retry_delay);
        }
    }

    Ok(state.resolve())
}
