//! Evaluator registry: the fixed, ordered evaluator list.
//!
//! Built once at startup and immutable afterwards. Order is the order in
//! which verdicts appear in the final result.

use std::sync::Arc;

use thiserror::Error;

use crate::evaluators::{
    AdvocacyDrafter, AlternativeFinder, DisposalGuide, Evaluator, EvaluatorKind,
    FootprintEstimator, HealthShield, OriginScout, OwnershipTrace, ValueJudge,
};
use crate::rules::RuleBook;
use crate::types::{EvaluationRequest, Verdict};

/// Errors raised while assembling a registry
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RegistryError {
    #[error("Evaluator registry must contain at least one evaluator")]
    Empty,

    #[error("Evaluator '{0}' registered more than once")]
    DuplicateKind(EvaluatorKind),
}

/// Ordered collection of evaluators.
#[derive(Clone)]
pub struct EvaluatorRegistry {
    evaluators: Vec<Arc<dyn Evaluator>>,
}

impl EvaluatorRegistry {
    /// Build a registry from an explicit list.
    pub fn new(evaluators: Vec<Arc<dyn Evaluator>>) -> Result<Self, RegistryError> {
        if evaluators.is_empty() {
            return Err(RegistryError::Empty);
        }

        let mut seen = Vec::with_capacity(evaluators.len());
        for evaluator in &evaluators {
            let kind = evaluator.kind();
            if seen.contains(&kind) {
                return Err(RegistryError::DuplicateKind(kind));
            }
            seen.push(kind);
        }

        Ok(Self { evaluators })
    }

    /// The standard eight evaluators, configured from a rule book.
    pub fn standard(rules: &RuleBook) -> Self {
        let evaluators: Vec<Arc<dyn Evaluator>> = vec![
            Arc::new(HealthShield::new(rules.health.clone())),
            Arc::new(ValueJudge::new(rules.values.clone())),
            Arc::new(OwnershipTrace::new(rules.ownership.clone())),
            Arc::new(DisposalGuide::new(rules.disposal.clone())),
            Arc::new(AlternativeFinder::new(rules.alternatives.clone())),
            Arc::new(FootprintEstimator::new(rules.footprint.clone())),
            Arc::new(OriginScout::new(rules.origin.clone())),
            Arc::new(AdvocacyDrafter::new(rules.advocacy.clone())),
        ];

        Self { evaluators }
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn Evaluator>> {
        self.evaluators.iter()
    }

    pub fn len(&self) -> usize {
        self.evaluators.len()
    }

    /// Always false for a constructed registry.
    pub fn is_empty(&self) -> bool {
        self.evaluators.is_empty()
    }

    /// Registered kinds, in invocation order.
    pub fn kinds(&self) -> Vec<EvaluatorKind> {
        self.evaluators.iter().map(|e| e.kind()).collect()
    }

    /// Run every evaluator sequentially, preserving registry order.
    pub fn evaluate_all(&self, request: &EvaluationRequest) -> Vec<Verdict> {
        self.evaluators
            .iter()
            .map(|evaluator| evaluator.evaluate(request))
            .collect()
    }
}

impl Default for EvaluatorRegistry {
    fn default() -> Self {
        Self::standard(&RuleBook::default())
    }
}

impl std::fmt::Debug for EvaluatorRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EvaluatorRegistry")
            .field("kinds", &self.kinds())
            .finish()
    }
}
