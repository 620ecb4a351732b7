//! Open Food Facts / Open Beauty Facts catalogs.
//!
//! Both catalogs share one API shape:
//! `GET {base_url}/api/v0/product/{barcode}.json` returns
//! `{ "status": 1, "product": { ... } }` when found and `status: 0`
//! otherwise.
//!
//! HTTP support requires the `open-facts` feature. Without it the sources
//! still exist but every fetch fails with [`SourceError::NotConfigured`],
//! and the resolver records them as skipped.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::Value as JsonValue;
use std::sync::Arc;

use verdant_core::Category;

use super::{factory::SourceFactory, NativeProduct, OpenFactsProduct, ProductSource, SourceError};

/// Default Open Food Facts endpoint.
pub const OPEN_FOOD_FACTS_URL: &str = "https://world.openfoodfacts.org";

/// Default Open Beauty Facts endpoint.
pub const OPEN_BEAUTY_FACTS_URL: &str = "https://world.openbeautyfacts.org";

#[cfg(feature = "open-facts")]
const USER_AGENT: &str = concat!("verdant/", env!("CARGO_PKG_VERSION"));

/// A catalog speaking the Open Facts API.
pub struct OpenFactsSource {
    name: String,
    base_url: String,
    category: Category,
    #[cfg(feature = "open-facts")]
    client: reqwest::Client,
}

impl std::fmt::Debug for OpenFactsSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenFactsSource")
            .field("name", &self.name)
            .field("base_url", &self.base_url)
            .field("category", &self.category)
            .finish()
    }
}

impl OpenFactsSource {
    /// Create a source for the given endpoint.
    pub fn new(
        name: impl Into<String>,
        base_url: impl Into<String>,
        category: Category,
    ) -> Result<Self, SourceError> {
        Ok(Self {
            name: name.into(),
            base_url: base_url.into().trim_end_matches('/').to_string(),
            category,
            #[cfg(feature = "open-facts")]
            client: reqwest::Client::builder()
                .user_agent(USER_AGENT)
                .build()
                .map_err(|e| SourceError::Http(e.to_string()))?,
        })
    }

    /// Open Food Facts with default settings.
    pub fn food() -> Result<Self, SourceError> {
        Self::new("Open Food Facts", OPEN_FOOD_FACTS_URL, Category::Food)
    }

    /// Open Beauty Facts with default settings.
    pub fn beauty() -> Result<Self, SourceError> {
        Self::new("Open Beauty Facts", OPEN_BEAUTY_FACTS_URL, Category::Beauty)
    }

    /// Create from JSON settings, falling back to the given defaults.
    fn from_config(
        settings: &JsonValue,
        default_name: &str,
        default_url: &str,
        category: Category,
    ) -> Result<Self, SourceError> {
        let name = settings["name"].as_str().unwrap_or(default_name);
        let base_url = settings["base_url"].as_str().unwrap_or(default_url);
        Self::new(name, base_url, category)
    }

    #[cfg_attr(not(feature = "open-facts"), allow(dead_code))]
    fn product_url(&self, identifier: &str) -> String {
        format!("{}/api/v0/product/{}.json", self.base_url, identifier)
    }
}

/// Response envelope of the product endpoint.
#[derive(Debug, Deserialize)]
#[cfg_attr(not(feature = "open-facts"), allow(dead_code))]
struct Envelope {
    #[serde(default)]
    status: i64,
    #[serde(default)]
    product: Option<OpenFactsProduct>,
}

impl Envelope {
    #[cfg_attr(not(feature = "open-facts"), allow(dead_code))]
    fn into_product(self) -> Option<OpenFactsProduct> {
        if self.status == 1 {
            self.product
        } else {
            None
        }
    }
}

/// Only plain barcode-like identifiers are sent to the API.
#[cfg_attr(not(feature = "open-facts"), allow(dead_code))]
fn is_queryable(identifier: &str) -> bool {
    !identifier.is_empty()
        && identifier
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '-')
}

#[async_trait]
impl ProductSource for OpenFactsSource {
    fn name(&self) -> &str {
        &self.name
    }

    fn category(&self) -> Category {
        self.category
    }

    #[cfg(feature = "open-facts")]
    async fn fetch(&self, identifier: &str) -> Result<Option<NativeProduct>, SourceError> {
        if !is_queryable(identifier) {
            tracing::debug!(source = %self.name, identifier, "Identifier not queryable");
            return Ok(None);
        }

        let response = self
            .client
            .get(self.product_url(identifier))
            .send()
            .await
            .map_err(|e| SourceError::Http(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Ok(None);
        }
        if !status.is_success() {
            return Err(SourceError::Api {
                status: status.as_u16(),
            });
        }

        let envelope: Envelope = response
            .json()
            .await
            .map_err(|e| SourceError::Parse(e.to_string()))?;

        Ok(envelope.into_product().map(NativeProduct::OpenFacts))
    }

    #[cfg(not(feature = "open-facts"))]
    async fn fetch(&self, _identifier: &str) -> Result<Option<NativeProduct>, SourceError> {
        Err(SourceError::NotConfigured(format!(
            "{} requires the 'open-facts' feature",
            self.name
        )))
    }
}

fn validate_base_url(settings: &JsonValue) -> Result<(), SourceError> {
    if let Some(url) = settings["base_url"].as_str() {
        if !url.starts_with("http://") && !url.starts_with("https://") {
            return Err(SourceError::NotConfigured(
                "base_url must start with http:// or https://".to_string(),
            ));
        }
    }
    Ok(())
}

/// Factory for the Open Food Facts source.
///
/// ## Configuration Format
/// ```json
/// {
///   "name": "Open Food Facts",                      // Optional
///   "base_url": "https://world.openfoodfacts.org"   // Optional
/// }
/// ```
pub struct OpenFoodFactsFactory;

impl SourceFactory for OpenFoodFactsFactory {
    fn source_type(&self) -> &'static str {
        "open_food_facts"
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn ProductSource>, SourceError> {
        let source = OpenFactsSource::from_config(
            settings,
            "Open Food Facts",
            OPEN_FOOD_FACTS_URL,
            Category::Food,
        )?;
        Ok(Arc::new(source))
    }

    fn validate_config(&self, settings: &JsonValue) -> Result<(), SourceError> {
        validate_base_url(settings)
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({ "base_url": OPEN_FOOD_FACTS_URL })
    }

    fn description(&self) -> &'static str {
        "Open Food Facts product database (food)"
    }
}

/// Factory for the Open Beauty Facts source.
pub struct OpenBeautyFactsFactory;

impl SourceFactory for OpenBeautyFactsFactory {
    fn source_type(&self) -> &'static str {
        "open_beauty_facts"
    }

    fn create(&self, settings: &JsonValue) -> Result<Arc<dyn ProductSource>, SourceError> {
        let source = OpenFactsSource::from_config(
            settings,
            "Open Beauty Facts",
            OPEN_BEAUTY_FACTS_URL,
            Category::Beauty,
        )?;
        Ok(Arc::new(source))
    }

    fn validate_config(&self, settings: &JsonValue) -> Result<(), SourceError> {
        validate_base_url(settings)
    }

    fn default_config(&self) -> JsonValue {
        serde_json::json!({ "base_url": OPEN_BEAUTY_FACTS_URL })
    }

    fn description(&self) -> &'static str {
        "Open Beauty Facts product database (cosmetics)"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_envelope_found() {
        let envelope: Envelope = serde_json::from_str(
            r#"{"status": 1, "product": {"product_name": "Nutella", "ingredients_text": "Sugar, Palm Oil"}}"#,
        )
        .unwrap();
        let product = envelope.into_product().unwrap();
        assert_eq!(product.product_name.as_deref(), Some("Nutella"));
    }

    #[test]
    fn test_envelope_not_found() {
        let envelope: Envelope =
            serde_json::from_str(r#"{"status": 0, "status_verbose": "product not found"}"#).unwrap();
        assert!(envelope.into_product().is_none());
    }

    #[test]
    fn test_product_url() {
        let source = OpenFactsSource::new("OFF", "https://example.org/", Category::Food).unwrap();
        assert_eq!(
            source.product_url("3017620422003"),
            "https://example.org/api/v0/product/3017620422003.json"
        );
    }

    #[test]
    fn test_queryable_identifiers() {
        assert!(is_queryable("3017620422003"));
        assert!(!is_queryable("../etc/passwd"));
        assert!(!is_queryable(""));
    }

    #[test]
    fn test_factory_settings() {
        let factory = OpenBeautyFactsFactory;
        let source = factory
            .create(&serde_json::json!({"name": "OBF mirror"}))
            .unwrap();
        assert_eq!(source.name(), "OBF mirror");
        assert_eq!(source.category(), Category::Beauty);
        assert!(source.reliable());

        assert!(factory
            .validate_config(&serde_json::json!({"base_url": "ftp://nope"}))
            .is_err());
    }

    #[cfg(not(feature = "open-facts"))]
    #[tokio::test]
    async fn test_fetch_without_feature_is_not_configured() {
        let source = OpenFactsSource::food().unwrap();
        let result = source.fetch("3017620422003").await;
        assert!(matches!(result, Err(SourceError::NotConfigured(_))));
    }
}
