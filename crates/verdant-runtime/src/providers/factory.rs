//! Source factory pattern for dynamic product source registration.
//!
//! New catalogs are added by registering a factory, without touching the
//! resolver. Factories create sources from JSON settings.
//!
//! ## Usage
//!
//! ```ignore
//! let registry = SourceRegistry::with_defaults();
//! let source = registry.create("seed", &serde_json::json!({}))?;
//! ```

use std::collections::BTreeMap;
use std::sync::Arc;

use serde_json::Value as JsonValue;

use super::{ProductSource, SourceError};

/// Factory for creating product sources from configuration.
///
/// Each factory is responsible for:
/// 1. Validating its settings
/// 2. Creating source instances
/// 3. Providing a unique type identifier
pub trait SourceFactory: Send + Sync {
    /// Unique identifier for this source type.
    ///
    /// Examples: "open_food_facts", "catalog", "seed"
    fn source_type(&self) -> &'static str;

    /// Create a source instance from JSON settings.
    ///
    /// A `name` key, when present, overrides the source's default name.
    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn ProductSource>, SourceError>;

    /// Validate settings without creating a source.
    fn validate_config(&self, _settings: &JsonValue) -> Result<(), SourceError> {
        Ok(())
    }

    /// Default settings for this source type.
    fn default_config(&self) -> JsonValue {
        serde_json::json!({})
    }

    /// Human-readable description of this source.
    fn description(&self) -> &'static str {
        "Product source"
    }
}

/// Registry of available source factories.
#[derive(Default)]
pub struct SourceRegistry {
    factories: BTreeMap<String, Arc<dyn SourceFactory>>,
}

impl SourceRegistry {
    /// Create a new empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a source factory.
    ///
    /// If a factory with the same type already exists, it will be replaced.
    pub fn register(&mut self, factory: Arc<dyn SourceFactory>) {
        self.factories
            .insert(factory.source_type().to_string(), factory);
    }

    /// Create a source from type name and settings.
    pub fn create(
        &self,
        source_type: &str,
        settings: &JsonValue,
    ) -> Result<Arc<dyn ProductSource>, SourceError> {
        let factory = self.factory(source_type)?;
        factory.validate_config(settings)?;
        factory.create(settings)
    }

    /// Validate settings for a source type.
    pub fn validate(&self, source_type: &str, settings: &JsonValue) -> Result<(), SourceError> {
        self.factory(source_type)?.validate_config(settings)
    }

    fn factory(&self, source_type: &str) -> Result<&Arc<dyn SourceFactory>, SourceError> {
        self.factories.get(source_type).ok_or_else(|| {
            SourceError::NotConfigured(format!(
                "Unknown source type: '{}'. Available: {:?}",
                source_type,
                self.available_types()
            ))
        })
    }

    /// List available source types.
    pub fn available_types(&self) -> Vec<&str> {
        self.factories.keys().map(|s| s.as_str()).collect()
    }

    /// Check if a source type is registered.
    pub fn has_source(&self, source_type: &str) -> bool {
        self.factories.contains_key(source_type)
    }

    /// Description of a registered source type.
    pub fn description(&self, source_type: &str) -> Option<&'static str> {
        self.factories.get(source_type).map(|f| f.description())
    }

    /// Create a registry with all built-in sources registered.
    pub fn with_defaults() -> Self {
        let mut registry = Self::new();
        registry.register(Arc::new(super::OpenFoodFactsFactory));
        registry.register(Arc::new(super::OpenBeautyFactsFactory));
        registry.register(Arc::new(super::CatalogSourceFactory));
        registry.register(Arc::new(super::SeedSourceFactory));
        registry
    }
}

impl std::fmt::Debug for SourceRegistry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SourceRegistry")
            .field("sources", &self.available_types())
            .finish()
    }
}
