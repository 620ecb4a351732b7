//! # verdant-runtime
//!
//! Async product resolution and parallel evaluation for Verdant.
//!
//! `verdant-core` judges a product it is handed. This crate finds the
//! product first: an ordered chain of catalogs is queried under per-source
//! timeouts and circuit breakers, the answer is normalized into the
//! canonical record, and the core evaluators run concurrently against it.
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_runtime::{Orchestrator, RuntimeConfig};
//! use verdant_core::{RuleBook, UserProfile};
//!
//! let orchestrator = Orchestrator::from_config(&RuntimeConfig::default(), &RuleBook::default())?;
//! let profile = UserProfile::from_file("profile.yaml")?;
//!
//! let result = orchestrator.handle("3017620422003", Some(profile)).await?;
//! println!("{} ({:.0})", result.overall_status, result.overall_score);
//! ```
//!
//! ## Features
//!
//! - `open-facts`: query the Open Food Facts and Open Beauty Facts APIs over
//!   HTTP. Without it those sources are skipped.

pub mod config;
pub mod normalize;
pub mod orchestrator;
pub mod providers;
pub mod resilience;
pub mod resolver;

pub use config::{ConfigError, RuntimeConfig, SourceConfig};
pub use orchestrator::{Orchestrator, OrchestratorBuilder, RuntimeError, DATA_RESOLUTION};
pub use providers::{NativeProduct, ProductSource, SourceError, SourceRegistry};
pub use resilience::{CircuitBreaker, CircuitBreakerConfig};
pub use resolver::{AttemptOutcome, ChainedSource, Resolution, SourceAttempt, SourceResolver};
