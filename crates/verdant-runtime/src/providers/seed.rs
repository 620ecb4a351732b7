//! Local seed data, the last source in the default chain.
//!
//! Entries use the Open Facts schema and may declare their own category.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use verdant_core::Category;

use super::{factory::SourceFactory, NativeProduct, OpenFactsProduct, ProductSource, SourceError};

const BUILTIN_SEED: &str = include_str!("../../data/seed.json");

/// In-memory seed product data.
#[derive(Debug, Clone)]
pub struct SeedSource {
    name: String,
    entries: BTreeMap<String, OpenFactsProduct>,
}

impl SeedSource {
    pub const DEFAULT_NAME: &'static str = "Demo Database";

    pub fn new(name: impl Into<String>, entries: BTreeMap<String, OpenFactsProduct>) -> Self {
        Self {
            name: name.into(),
            entries,
        }
    }

    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, SourceError> {
        let entries = serde_json::from_str(json).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(Self::new(name, entries))
    }

    pub fn from_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(name, &content)
    }

    /// The built-in seed data.
    pub fn builtin() -> Result<Self, SourceError> {
        Self::from_json(Self::DEFAULT_NAME, BUILTIN_SEED)
    }

    /// Add or replace one entry.
    pub fn with_entry(mut self, identifier: impl Into<String>, product: OpenFactsProduct) -> Self {
        self.entries.insert(identifier.into(), product);
        self
    }

    /// Known identifiers.
    pub fn identifiers(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

#[async_trait]
impl ProductSource for SeedSource {
    fn name(&self) -> &str {
        &self.name
    }

    /// Used only for entries that declare no category.
    fn category(&self) -> Category {
        Category::Unknown
    }

    async fn fetch(&self, identifier: &str) -> Result<Option<NativeProduct>, SourceError> {
        Ok(self
            .entries
            .get(identifier)
            .cloned()
            .map(NativeProduct::OpenFacts))
    }
}

/// Factory for seed data.
///
/// ## Configuration Format
/// ```json
/// {
///   "name": "Demo Database",   // Optional
///   "path": "seed.json"        // Optional, built-in data when absent
/// }
/// ```
pub struct SeedSourceFactory;

impl SourceFactory for SeedSourceFactory {
    fn source_type(&self) -> &'static str {
        "seed"
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn ProductSource>, SourceError> {
        let name = settings["name"].as_str().unwrap_or(SeedSource::DEFAULT_NAME);
        let source = match settings["path"].as_str() {
            Some(path) => SeedSource::from_file(name, path)?,
            None => SeedSource::from_json(name, BUILTIN_SEED)?,
        };
        Ok(Arc::new(source))
    }

    fn description(&self) -> &'static str {
        "Local seed product data"
    }
}
