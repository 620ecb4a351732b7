//! Product source abstractions for verdant-runtime.
//!
//! A source answers one question: what does this catalog know about an
//! identifier? Each source speaks its own native schema; the
//! [`normalize`](crate::normalize) module converges them on the canonical
//! record.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::time::Duration;
use thiserror::Error;

use verdant_core::Category;

mod catalog;
mod factory;
mod open_facts;
mod seed;

pub use catalog::{CatalogSource, CatalogSourceFactory};
pub use factory::{SourceFactory, SourceRegistry};
pub use open_facts::{
    OpenBeautyFactsFactory, OpenFactsSource, OpenFoodFactsFactory, OPEN_BEAUTY_FACTS_URL,
    OPEN_FOOD_FACTS_URL,
};
pub use seed::{SeedSource, SeedSourceFactory};

/// Errors from product sources.
///
/// Never escalated past the resolver: every error moves the chain on to
/// the next source.
#[derive(Error, Debug)]
pub enum SourceError {
    #[error("HTTP request failed: {0}")]
    Http(String),

    #[error("Timeout after {0:?}")]
    Timeout(Duration),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("API error: status {status}")]
    Api { status: u16 },

    #[error("Source not configured: {0}")]
    NotConfigured(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// One entry of a structured ingredient list.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IngredientEntry {
    #[serde(default)]
    pub text: Option<String>,
}

/// Product in the Open Facts family schema (also used by seed data).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct OpenFactsProduct {
    #[serde(default)]
    pub product_name: Option<String>,

    /// Comma-separated brand list
    #[serde(default)]
    pub brands: Option<String>,

    /// Structured ingredients; preferred over `ingredients_text`
    #[serde(default)]
    pub ingredients: Option<Vec<IngredientEntry>>,

    #[serde(default)]
    pub ingredients_text: Option<String>,

    #[serde(default)]
    pub packaging: Option<String>,

    #[serde(default)]
    pub origins: Option<String>,

    #[serde(default)]
    pub manufacturing_places: Option<String>,

    /// Numeric nutrient facts; non-numeric entries are ignored
    #[serde(default)]
    pub nutriments: BTreeMap<String, serde_json::Value>,

    /// Declared category (seed data only)
    #[serde(default)]
    pub category: Option<Category>,
}

/// Entry in the general product catalog.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub product_name: String,

    #[serde(default)]
    pub brand: Option<String>,

    #[serde(default)]
    pub categories: Vec<String>,

    #[serde(default)]
    pub description: Option<String>,

    /// Structured material list
    #[serde(default)]
    pub materials: Vec<String>,

    #[serde(default)]
    pub packaging: Option<String>,

    #[serde(default)]
    pub origin: Option<String>,
}

/// A product as returned by a source, before normalization.
#[derive(Debug, Clone, PartialEq)]
pub enum NativeProduct {
    OpenFacts(OpenFactsProduct),
    Catalog(CatalogEntry),
}

/// Product source abstraction allows swapping catalogs.
#[async_trait]
pub trait ProductSource: Send + Sync {
    /// Source name, stamped as provenance on resolved records.
    fn name(&self) -> &str;

    /// Category assigned to every product this source answers.
    fn category(&self) -> Category;

    /// Whether this source's data can be trusted as complete.
    fn reliable(&self) -> bool {
        true
    }

    /// Look up a product. `Ok(None)` means the source does not know it.
    async fn fetch(&self, identifier: &str) -> Result<Option<NativeProduct>, SourceError>;
}
