//! Runtime orchestrator for product evaluation.
//!
//! One request flows through:
//! - Resolution via the ordered source chain
//! - A data-resolution verdict describing where the data came from
//! - Parallel fan-out to every registered evaluator
//! - Deterministic fan-in through the Aggregator
//!
//! A product that no source knows gets a single neutral verdict; the
//! evaluators are not run against missing data.

use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;

use serde_json::Value as JsonValue;
use verdant_core::{
    Aggregator, Category, EvaluationError, EvaluationRequest, Evaluator, EvaluatorRegistry,
    OverallResult, RuleBook, Status, UserProfile, Verdict,
};

use crate::config::{ConfigError, RuntimeConfig};
use crate::normalize::UNKNOWN_NAME;
use crate::providers::{ProductSource, SourceError, SourceRegistry};
use crate::resilience::{CircuitBreaker, CircuitBreakerConfig};
use crate::resolver::{ChainedSource, Resolution, SourceAttempt, SourceResolver};

/// Name of the verdict describing the resolution step.
pub const DATA_RESOLUTION: &str = "Data Resolution";

/// Score for data from a source not trusted as complete.
const UNRELIABLE_SCORE: f64 = 60.0;

/// Errors from building or running the orchestrator.
#[derive(Error, Debug)]
pub enum RuntimeError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Source error: {0}")]
    Source(#[from] SourceError),

    #[error("Evaluation error: {0}")]
    Evaluation(#[from] EvaluationError),
}

/// The orchestrator resolves a product and evaluates it in parallel.
///
/// # Architecture
/// - Resolution: ordered chain, per-source timeout and circuit breaker
/// - Parallel fan-out: one blocking task per evaluator
/// - Deterministic fan-in: Aggregator applies the worst-wins policy
#[derive(Debug)]
pub struct Orchestrator {
    resolver: SourceResolver,
    registry: Arc<EvaluatorRegistry>,
    aggregator: Aggregator,
}

impl Orchestrator {
    pub fn new(resolver: SourceResolver, registry: Arc<EvaluatorRegistry>) -> Self {
        Self {
            resolver,
            registry,
            aggregator: Aggregator::new(),
        }
    }

    /// Build everything from configuration and a rule book.
    pub fn from_config(config: &RuntimeConfig, rules: &RuleBook) -> Result<Self, RuntimeError> {
        let resolver = SourceResolver::from_config(config, &SourceRegistry::with_defaults())?;
        Ok(Self::new(
            resolver,
            Arc::new(EvaluatorRegistry::standard(rules)),
        ))
    }

    pub fn builder() -> OrchestratorBuilder {
        OrchestratorBuilder::new()
    }

    pub fn resolver(&self) -> &SourceResolver {
        &self.resolver
    }

    pub fn registry(&self) -> &EvaluatorRegistry {
        &self.registry
    }

    /// Resolve, evaluate and aggregate one product.
    ///
    /// # Execution Flow
    /// 1. Resolve the identifier through the source chain
    /// 2. Not found: aggregate a single neutral verdict
    /// 3. Found: data-resolution verdict, then all evaluators in parallel
    /// 4. Fan-in once every evaluator has finished
    ///
    /// Dropping the returned future cancels in-flight source calls.
    pub async fn handle(
        &self,
        identifier: &str,
        profile: Option<UserProfile>,
    ) -> Result<OverallResult, RuntimeError> {
        match self.resolver.resolve(identifier).await {
            Resolution::NotFound { .. } => {
                let verdict = not_found_verdict(identifier);
                Ok(self
                    .aggregator
                    .aggregate(identifier, UNKNOWN_NAME, vec![verdict])?)
            }
            Resolution::Found {
                record,
                reliable,
                attempts,
            } => {
                let mut verdicts = Vec::with_capacity(self.registry.len() + 1);
                verdicts.push(resolution_verdict(
                    &record.provenance,
                    record.category,
                    reliable,
                    &attempts,
                ));

                let request = Arc::new(EvaluationRequest::new(record, profile));
                verdicts.extend(self.evaluate_parallel(Arc::clone(&request)).await);

                let result = self.aggregator.aggregate(
                    &request.record.id,
                    &request.record.name,
                    verdicts,
                )?;
                tracing::info!(
                    identifier,
                    status = %result.overall_status,
                    score = result.overall_score,
                    "Product evaluated"
                );
                Ok(result)
            }
        }
    }

    /// Run every evaluator on its own blocking task, preserving order.
    async fn evaluate_parallel(&self, request: Arc<EvaluationRequest>) -> Vec<Verdict> {
        let tasks = self.registry.iter().map(|evaluator| {
            let evaluator = Arc::clone(evaluator);
            let request = Arc::clone(&request);
            tokio::task::spawn_blocking(move || evaluator.evaluate(&request))
        });

        let outcomes = futures::future::join_all(tasks).await;

        outcomes
            .into_iter()
            .zip(self.registry.iter())
            .map(|(outcome, evaluator)| match outcome {
                Ok(verdict) => verdict,
                Err(e) => {
                    tracing::error!(evaluator = evaluator.name(), error = %e, "Evaluator task failed");
                    Verdict::neutral(
                        evaluator.name(),
                        format!("{} could not complete its check.", evaluator.name()),
                    )
                    .with_detail("neutral", true)
                    .with_detail("error", "evaluator_failed")
                }
            })
            .collect()
    }
}

fn attempts_detail(attempts: &[SourceAttempt]) -> serde_json::Value {
    serde_json::to_value(attempts).unwrap_or(serde_json::Value::Null)
}

/// Verdict for a product that resolved.
fn resolution_verdict(
    source: &str,
    category: Category,
    reliable: bool,
    attempts: &[SourceAttempt],
) -> Verdict {
    let verdict = if reliable {
        Verdict::new(
            DATA_RESOLUTION,
            100.0,
            Status::Green,
            format!("Product data found in {}.", source),
        )
    } else {
        Verdict::new(
            DATA_RESOLUTION,
            UNRELIABLE_SCORE,
            Status::Yellow,
            format!(
                "Product data found in {}; it may be incomplete or unverified.",
                source
            ),
        )
    };

    verdict
        .with_detail("source", source)
        .with_detail("category", category.as_str())
        .with_detail("reliable", reliable)
        .with_detail("attempts", attempts_detail(attempts))
}

/// Neutral verdict for a product no source knows. Carries only the
/// neutral marker; the attempts are logged by the resolver.
fn not_found_verdict(identifier: &str) -> Verdict {
    Verdict::neutral(
        DATA_RESOLUTION,
        format!("Product {} not found in any source.", identifier),
    )
    .with_detail("neutral", true)
}

/// Builder for [`Orchestrator`].
pub struct OrchestratorBuilder {
    sources: Vec<ChainedSource>,
    default_timeout: Duration,
    circuit_breaker: CircuitBreakerConfig,
    registry: Option<Arc<EvaluatorRegistry>>,
}

impl OrchestratorBuilder {
    /// Create a new builder.
    pub fn new() -> Self {
        let defaults = RuntimeConfig::default();
        Self {
            sources: Vec::new(),
            default_timeout: defaults.default_timeout,
            circuit_breaker: defaults.circuit_breaker,
            registry: None,
        }
    }

    /// Timeout for sources added after this call.
    pub fn default_timeout(mut self, timeout: Duration) -> Self {
        self.default_timeout = timeout;
        self
    }

    /// Append a source to the chain.
    pub fn source(mut self, source: Arc<dyn ProductSource>) -> Self {
        self.sources
            .push(ChainedSource::new(source, self.default_timeout));
        self
    }

    /// Append a source created by a registered factory.
    pub fn source_from(
        self,
        registry: &SourceRegistry,
        source_type: &str,
        settings: &JsonValue,
    ) -> Result<Self, RuntimeError> {
        let source = registry.create(source_type, settings)?;
        Ok(self.source(source))
    }

    /// Append a source with explicit chain settings.
    pub fn chained(mut self, source: ChainedSource) -> Self {
        self.sources.push(source);
        self
    }

    pub fn circuit_breaker(mut self, config: CircuitBreakerConfig) -> Self {
        self.circuit_breaker = config;
        self
    }

    /// Set the evaluator registry (standard evaluators when unset).
    pub fn registry(mut self, registry: EvaluatorRegistry) -> Self {
        self.registry = Some(Arc::new(registry));
        self
    }

    /// Use exactly these evaluators, in this order.
    pub fn evaluators(self, evaluators: Vec<Arc<dyn Evaluator>>) -> Result<Self, RuntimeError> {
        let registry = EvaluatorRegistry::new(evaluators).map_err(EvaluationError::from)?;
        Ok(self.registry(registry))
    }

    /// Build the orchestrator.
    pub fn build(self) -> Result<Orchestrator, RuntimeError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources.into());
        }

        let resolver = SourceResolver::new(self.sources, CircuitBreaker::new(self.circuit_breaker));
        let registry = self.registry.unwrap_or_default();

        Ok(Orchestrator::new(resolver, registry))
    }
}

impl Default for OrchestratorBuilder {
    fn default() -> Self {
        Self::new()
    }
}
