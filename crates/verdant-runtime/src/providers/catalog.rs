//! General product catalog, the web-fallback source.
//!
//! Covers everyday items the specialty catalogs miss (snacks, toiletries,
//! electronics, clothing). Its entries are unverified, so the source is
//! unreliable by default. Unknown identifiers are reported as not found;
//! no placeholder product is ever invented.

use async_trait::async_trait;
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::path::Path;
use std::sync::Arc;

use verdant_core::Category;

use super::{factory::SourceFactory, CatalogEntry, NativeProduct, ProductSource, SourceError};

/// Built-in catalog data.
const BUILTIN_CATALOG: &str = include_str!("../../data/catalog.json");

/// In-memory general product catalog.
#[derive(Debug, Clone)]
pub struct CatalogSource {
    name: String,
    reliable: bool,
    entries: BTreeMap<String, CatalogEntry>,
}

impl CatalogSource {
    pub const DEFAULT_NAME: &'static str = "General Web Search";

    /// Create a catalog from entries.
    pub fn new(name: impl Into<String>, entries: BTreeMap<String, CatalogEntry>) -> Self {
        Self {
            name: name.into(),
            reliable: false,
            entries,
        }
    }

    /// Parse catalog entries from JSON (`{ "<id>": { ... } }`).
    pub fn from_json(name: impl Into<String>, json: &str) -> Result<Self, SourceError> {
        let entries = serde_json::from_str(json).map_err(|e| SourceError::Parse(e.to_string()))?;
        Ok(Self::new(name, entries))
    }

    /// Load catalog entries from a JSON file.
    pub fn from_file(name: impl Into<String>, path: impl AsRef<Path>) -> Result<Self, SourceError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json(name, &content)
    }

    /// The built-in catalog.
    pub fn builtin() -> Result<Self, SourceError> {
        Self::from_json(Self::DEFAULT_NAME, BUILTIN_CATALOG)
    }

    /// Mark this catalog's data as reliable or not.
    pub fn with_reliable(mut self, reliable: bool) -> Self {
        self.reliable = reliable;
        self
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

#[async_trait]
impl ProductSource for CatalogSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        Category::General
    }

    fn reliable(&self) -> bool {
        self.reliable
    }

    async fn fetch(&self, identifier: &str) -> Result<Option<NativeProduct>, SourceError> {
        Ok(self
            .entries
            .get(identifier)
            .cloned()
            .map(NativeProduct::Catalog))
    }
}

/// Factory for the general catalog.
///
/// ## Configuration Format
/// ```json
/// {
///   "name": "General Web Search",   // Optional
///   "path": "catalog.json"          // Optional, built-in data when absent
/// }
/// ```
pub struct CatalogSourceFactory;

impl SourceFactory for CatalogSourceFactory {
    fn source_type(&self) -> &'static str {
        "catalog"
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn ProductSource>, SourceError> {
        let name = settings["name"].as_str().unwrap_or(CatalogSource::DEFAULT_NAME);
        let source = match settings["path"].as_str() {
            Some(path) => CatalogSource::from_file(name, path)?,
            None => CatalogSource::from_json(name, BUILTIN_CATALOG)?,
        };
        Ok(Arc::new(source))
    }

    fn description(&self) -> &'static str {
        "General product catalog (web fallback, unverified)"
    }
}
