//! Aggregator: combines verdicts into the overall result.
//!
//! The policy is fixed:
//! 1. If ANY verdict is RED → overall RED, score is the minimum
//! 2. Else if ANY verdict is YELLOW → overall YELLOW, score is the mean
//! 3. Else → overall GREEN, score is the mean
//!
//! A single RED must never be averaged away.

use chrono::Utc;

use crate::types::{OverallResult, Status, Verdict};
use crate::EvaluationError;

/// The Aggregator folds evaluator verdicts into an [`OverallResult`].
#[derive(Debug, Clone, Copy, Default)]
pub struct Aggregator;

impl Aggregator {
    pub fn new() -> Self {
        Self
    }

    /// Overall status and score for a set of verdicts.
    ///
    /// Independent of verdict order.
    pub fn combine(&self, verdicts: &[Verdict]) -> Result<(Status, f64), EvaluationError> {
        if verdicts.is_empty() {
            return Err(EvaluationError::NoVerdicts);
        }

        // Rule 1: any RED -> RED at the lowest score
        if verdicts.iter().any(|v| v.status.is_red()) {
            let min = verdicts
                .iter()
                .map(|v| v.score)
                .fold(f64::INFINITY, f64::min);
            return Ok((Status::Red, min));
        }

        let mean = (verdicts.iter().map(|v| v.score).sum::<f64>() / verdicts.len() as f64)
            .clamp(0.0, 100.0);

        // Rule 2: any YELLOW -> YELLOW at the mean
        if verdicts.iter().any(|v| v.status.is_yellow()) {
            return Ok((Status::Yellow, mean));
        }

        // Rule 3: otherwise GREEN at the mean
        Ok((Status::Green, mean))
    }

    /// Aggregate verdicts for one product. Verdict order is preserved.
    pub fn aggregate(
        &self,
        product_id: impl Into<String>,
        product_name: impl Into<String>,
        verdicts: Vec<Verdict>,
    ) -> Result<OverallResult, EvaluationError> {
        let (overall_status, overall_score) = self.combine(&verdicts)?;

        Ok(OverallResult {
            product_id: product_id.into(),
            product_name: product_name.into(),
            overall_score,
            overall_status,
            agent_verdicts: verdicts,
            timestamp: Utc::now(),
        })
    }
}
