//! Source resolver chain.
//!
//! Tries each configured source in order until one answers. Each call runs
//! under its own timeout and behind the source's circuit breaker. Misses,
//! errors and timeouts are logged and the chain moves on; exhausting the
//! chain is an explicit [`Resolution::NotFound`], never a made-up record.

use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use verdant_core::CanonicalProductRecord;

use crate::config::{ConfigError, RuntimeConfig};
use crate::normalize::normalize;
use crate::providers::{ProductSource, SourceError, SourceRegistry};
use crate::resilience::CircuitBreaker;

/// Outcome of asking one source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "outcome", content = "reason")]
pub enum AttemptOutcome {
    Found,
    NotFound,
    Failed(String),
    TimedOut,
    /// Circuit open, or the source is not available in this build
    Skipped,
}

/// Audit entry for one source in the chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceAttempt {
    pub source: String,
    #[serde(flatten)]
    pub outcome: AttemptOutcome,
}

impl SourceAttempt {
    fn new(source: &str, outcome: AttemptOutcome) -> Self {
        Self {
            source: source.to_string(),
            outcome,
        }
    }
}

/// Result of resolving an identifier.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    Found {
        record: CanonicalProductRecord,
        /// Whether the answering source is trusted as complete
        reliable: bool,
        attempts: Vec<SourceAttempt>,
    },
    NotFound {
        attempts: Vec<SourceAttempt>,
    },
}

impl Resolution {
    pub fn attempts(&self) -> &[SourceAttempt] {
        match self {
            Resolution::Found { attempts, .. } | Resolution::NotFound { attempts } => attempts,
        }
    }

    pub fn is_found(&self) -> bool {
        matches!(self, Resolution::Found { .. })
    }

    pub fn record(&self) -> Option<&CanonicalProductRecord> {
        match self {
            Resolution::Found { record, .. } => Some(record),
            Resolution::NotFound { .. } => None,
        }
    }
}

/// A source with its place-in-chain settings.
#[derive(Clone)]
pub struct ChainedSource {
    source: Arc<dyn ProductSource>,
    timeout: Duration,
    reliable: bool,
}

impl ChainedSource {
    /// Wrap a source, taking its reliability claim as-is.
    pub fn new(source: Arc<dyn ProductSource>, timeout: Duration) -> Self {
        let reliable = source.reliable();
        Self {
            source,
            timeout,
            reliable,
        }
    }

    /// Override the source's reliability claim.
    pub fn with_reliable(mut self, reliable: bool) -> Self {
        self.reliable = reliable;
        self
    }

    pub fn name(&self) -> &str {
        self.source.name()
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn reliable(&self) -> bool {
        self.reliable
    }
}

impl std::fmt::Debug for ChainedSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChainedSource")
            .field("name", &self.source.name())
            .field("category", &self.source.category())
            .field("timeout", &self.timeout)
            .field("reliable", &self.reliable)
            .finish()
    }
}

/// Ordered chain of product sources.
#[derive(Debug)]
pub struct SourceResolver {
    sources: Vec<ChainedSource>,
    circuit_breaker: CircuitBreaker,
}

impl SourceResolver {
    pub fn new(sources: Vec<ChainedSource>, circuit_breaker: CircuitBreaker) -> Self {
        Self {
            sources,
            circuit_breaker,
        }
    }

    /// Build the chain described by a runtime configuration.
    pub fn from_config(config: &RuntimeConfig, registry: &SourceRegistry) -> Result<Self, ConfigError> {
        config.validate_against(registry)?;

        let mut sources = Vec::with_capacity(config.sources.len());
        for entry in &config.sources {
            let source = registry
                .create(&entry.source_type, &entry.factory_settings())
                .map_err(|e| match e {
                    SourceError::Io(io) => ConfigError::Io(io),
                    other => ConfigError::Source {
                        source_type: entry.source_type.clone(),
                        reason: other.to_string(),
                    },
                })?;

            let mut chained = ChainedSource::new(source, config.timeout_for(entry));
            if let Some(reliable) = entry.reliable {
                chained = chained.with_reliable(reliable);
            }
            sources.push(chained);
        }

        Ok(Self::new(
            sources,
            CircuitBreaker::new(config.circuit_breaker.clone()),
        ))
    }

    pub fn sources(&self) -> &[ChainedSource] {
        &self.sources
    }

    pub fn circuit_breaker(&self) -> &CircuitBreaker {
        &self.circuit_breaker
    }

    /// Resolve an identifier into a canonical record.
    pub async fn resolve(&self, identifier: &str) -> Resolution {
        let mut attempts = Vec::with_capacity(self.sources.len());

        for chained in &self.sources {
            let name = chained.name();

            if self.circuit_breaker.is_open(name) {
                tracing::debug!(source = name, identifier, "Circuit open, skipping source");
                attempts.push(SourceAttempt::new(name, AttemptOutcome::Skipped));
                continue;
            }

            let outcome = tokio::time::timeout(chained.timeout, chained.source.fetch(identifier)).await;

            match outcome {
                Ok(Ok(Some(native))) => {
                    self.circuit_breaker.record_success(name);
                    attempts.push(SourceAttempt::new(name, AttemptOutcome::Found));
                    tracing::info!(source = name, identifier, "Product resolved");

                    let record = normalize(identifier, native, name, chained.source.category());
                    return Resolution::Found {
                        record,
                        reliable: chained.reliable,
                        attempts,
                    };
                }
                Ok(Ok(None)) => {
                    self.circuit_breaker.record_success(name);
                    tracing::debug!(source = name, identifier, "Product not found in source");
                    attempts.push(SourceAttempt::new(name, AttemptOutcome::NotFound));
                }
                Ok(Err(SourceError::NotConfigured(reason))) => {
                    tracing::debug!(source = name, %reason, "Source not available, skipping");
                    attempts.push(SourceAttempt::new(name, AttemptOutcome::Skipped));
                }
                Ok(Err(e)) => {
                    self.circuit_breaker.record_failure(name);
                    tracing::warn!(source = name, identifier, error = %e, "Source lookup failed");
                    attempts.push(SourceAttempt::new(name, AttemptOutcome::Failed(e.to_string())));
                }
                Err(_) => {
                    self.circuit_breaker.record_failure(name);
                    tracing::warn!(
                        source = name,
                        identifier,
                        timeout = ?chained.timeout,
                        "Source lookup timed out"
                    );
                    attempts.push(SourceAttempt::new(name, AttemptOutcome::TimedOut));
                }
            }
        }

        tracing::info!(identifier, "Product not found in any source");
        Resolution::NotFound { attempts }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::{NativeProduct, OpenFactsProduct};
    use crate::resilience::CircuitBreakerConfig;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use verdant_core::Category;

    enum Behavior {
        Answer,
        Miss,
        Fail,
        Hang,
    }

    struct StubSource {
        name: &'static str,
        behavior: Behavior,
        calls: AtomicUsize,
    }

    impl StubSource {
        fn new(name: &'static str, behavior: Behavior) -> Arc<Self> {
            Arc::new(Self {
                name,
                behavior,
                calls: AtomicUsize::new(0),
            })
        }
    }

    #[async_trait]
    impl ProductSource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        fn category(&self) -> Category {
            Category::Food
        }

        async fn fetch(&self, _identifier: &str) -> Result<Option<NativeProduct>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            match self.behavior {
                Behavior::Answer => Ok(Some(NativeProduct::OpenFacts(OpenFactsProduct {
                    product_name: Some(format!("{} product", self.name)),
                    ingredients_text: Some("Oats, Water".to_string()),
                    ..Default::default()
                }))),
                Behavior::Miss => Ok(None),
                Behavior::Fail => Err(SourceError::Api { status: 503 }),
                Behavior::Hang => {
                    tokio::time::sleep(Duration::from_secs(3600)).await;
                    Ok(None)
                }
            }
        }
    }

    fn chain(sources: Vec<Arc<StubSource>>) -> SourceResolver {
        let chained = sources
            .into_iter()
            .map(|s| ChainedSource::new(s, Duration::from_secs(1)))
            .collect();
        SourceResolver::new(chained, CircuitBreaker::default())
    }

    #[tokio::test]
    async fn test_first_answer_wins() {
        let first = StubSource::new("first", Behavior::Miss);
        let second = StubSource::new("second", Behavior::Answer);
        let third = StubSource::new("third", Behavior::Answer);
        let resolver = chain(vec![first.clone(), second.clone(), third.clone()]);

        let resolution = resolver.resolve("123").await;

        let record = resolution.record().unwrap();
        assert_eq!(record.provenance, "second");
        assert_eq!(record.name, "second product");
        assert_eq!(record.ingredients, vec!["Oats", "Water"]);
        assert_eq!(record.category, Category::Food);
        assert_eq!(third.calls.load(Ordering::SeqCst), 0);
        assert_eq!(
            resolution.attempts(),
            &[
                SourceAttempt::new("first", AttemptOutcome::NotFound),
                SourceAttempt::new("second", AttemptOutcome::Found),
            ]
        );
    }

    #[tokio::test]
    async fn test_errors_move_the_chain_on() {
        let resolver = chain(vec![
            StubSource::new("broken", Behavior::Fail),
            StubSource::new("backup", Behavior::Answer),
        ]);

        let resolution = resolver.resolve("123").await;

        assert!(resolution.is_found());
        assert!(matches!(
            &resolution.attempts()[0].outcome,
            AttemptOutcome::Failed(reason) if reason.contains("503")
        ));
    }

    #[tokio::test]
    async fn test_exhausted_chain_is_not_found() {
        let resolver = chain(vec![
            StubSource::new("a", Behavior::Miss),
            StubSource::new("b", Behavior::Fail),
        ]);

        let resolution = resolver.resolve("000").await;

        assert!(!resolution.is_found());
        assert_eq!(resolution.attempts().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_hanging_source_times_out() {
        let resolver = chain(vec![
            StubSource::new("slow", Behavior::Hang),
            StubSource::new("fast", Behavior::Answer),
        ]);

        let resolution = resolver.resolve("123").await;

        assert_eq!(resolution.record().unwrap().provenance, "fast");
        assert_eq!(resolution.attempts()[0].outcome, AttemptOutcome::TimedOut);
    }

    #[tokio::test]
    async fn test_open_circuit_is_skipped() {
        let flaky = StubSource::new("flaky", Behavior::Fail);
        let backup = StubSource::new("backup", Behavior::Answer);
        let resolver = SourceResolver::new(
            vec![
                ChainedSource::new(flaky.clone(), Duration::from_secs(1)),
                ChainedSource::new(backup, Duration::from_secs(1)),
            ],
            CircuitBreaker::new(CircuitBreakerConfig {
                failure_threshold: 2,
                ..Default::default()
            }),
        );

        resolver.resolve("1").await;
        resolver.resolve("2").await;
        let resolution = resolver.resolve("3").await;

        assert_eq!(flaky.calls.load(Ordering::SeqCst), 2);
        assert_eq!(resolution.attempts()[0].outcome, AttemptOutcome::Skipped);
        assert!(resolution.is_found());
    }

    #[tokio::test]
    async fn test_reliability_override() {
        let source = StubSource::new("web", Behavior::Answer);
        let resolver = SourceResolver::new(
            vec![ChainedSource::new(source, Duration::from_secs(1)).with_reliable(false)],
            CircuitBreaker::default(),
        );

        match resolver.resolve("1").await {
            Resolution::Found { reliable, .. } => assert!(!reliable),
            other => panic!("Expected Found, got {:?}", other),
        }
    }

    #[test]
    fn test_attempt_serialization() {
        let attempt = SourceAttempt::new("Open Food Facts", AttemptOutcome::Failed("HTTP 500".into()));
        let value = serde_json::to_value(&attempt).unwrap();
        assert_eq!(value["source"], "Open Food Facts");
        assert_eq!(value["outcome"], "failed");
        assert_eq!(value["reason"], "HTTP 500");

        let skipped = serde_json::to_value(SourceAttempt::new("x", AttemptOutcome::Skipped)).unwrap();
        assert_eq!(skipped["outcome"], "skipped");
    }

    #[test]
    fn test_from_default_config() {
        let resolver =
            SourceResolver::from_config(&RuntimeConfig::default(), &SourceRegistry::with_defaults())
                .unwrap();
        let names: Vec<&str> = resolver.sources().iter().map(|s| s.name()).collect();

        assert_eq!(
            names,
            vec!["Open Food Facts", "Open Beauty Facts", "General Web Search", "Demo Database"]
        );
        assert!(resolver.sources()[0].reliable());
        assert!(!resolver.sources()[2].reliable());
    }
}
