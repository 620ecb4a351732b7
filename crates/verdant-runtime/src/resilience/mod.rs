//! Resilience patterns for verdant-runtime.
//!
//! Per-source timeouts live in the resolver; this module provides the
//! per-source circuit breaker.

mod circuit_breaker;

pub use circuit_breaker::{CircuitBreaker, CircuitBreakerConfig, CircuitState};
