//! Native schema normalization.
//!
//! Every source speaks its own schema; this module converges them on the
//! [`CanonicalProductRecord`] the evaluators read:
//!
//! - structured ingredient entries win over raw ingredient text
//! - raw text is split on commas, each token trimmed
//! - empty tokens are dropped
//! - the category comes from the answering source, unless seed data
//!   declares one

use verdant_core::evaluators::matching::normalize_token;
use verdant_core::{CanonicalProductRecord, Category};

use crate::providers::{CatalogEntry, NativeProduct, OpenFactsProduct};

/// Name used when a source provides none.
pub const UNKNOWN_NAME: &str = "Unknown Product";

/// Normalize a native product into the canonical record.
pub fn normalize(
    identifier: &str,
    native: NativeProduct,
    provenance: &str,
    source_category: Category,
) -> CanonicalProductRecord {
    match native {
        NativeProduct::OpenFacts(product) => {
            from_open_facts(identifier, product, provenance, source_category)
        }
        NativeProduct::Catalog(entry) => from_catalog(identifier, entry, provenance, source_category),
    }
}

fn from_open_facts(
    identifier: &str,
    product: OpenFactsProduct,
    provenance: &str,
    source_category: Category,
) -> CanonicalProductRecord {
    let structured: Vec<String> = product
        .ingredients
        .as_deref()
        .unwrap_or_default()
        .iter()
        .filter_map(|entry| entry.text.as_deref())
        .filter_map(clean)
        .collect();

    let ingredients = if structured.is_empty() {
        product
            .ingredients_text
            .as_deref()
            .map(split_ingredients)
            .unwrap_or_default()
    } else {
        structured
    };

    let facts = product
        .nutriments
        .iter()
        .filter_map(|(key, value)| numeric(value).map(|v| (key.clone(), v)))
        .collect();

    CanonicalProductRecord {
        id: identifier.to_string(),
        name: product
            .product_name
            .as_deref()
            .and_then(clean)
            .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        ingredients,
        packaging: product.packaging.as_deref().and_then(clean),
        brand: product.brands.as_deref().and_then(first_brand),
        origin: product
            .origins
            .as_deref()
            .and_then(clean)
            .or_else(|| product.manufacturing_places.as_deref().and_then(clean)),
        category: product.category.unwrap_or(source_category),
        facts,
        provenance: provenance.to_string(),
    }
}

fn from_catalog(
    identifier: &str,
    entry: CatalogEntry,
    provenance: &str,
    source_category: Category,
) -> CanonicalProductRecord {
    CanonicalProductRecord {
        id: identifier.to_string(),
        name: clean(&entry.product_name).unwrap_or_else(|| UNKNOWN_NAME.to_string()),
        ingredients: entry.materials.iter().filter_map(|m| clean(m)).collect(),
        packaging: entry.packaging.as_deref().and_then(clean),
        brand: entry.brand.as_deref().and_then(clean),
        origin: entry.origin.as_deref().and_then(clean),
        category: source_category,
        facts: Default::default(),
        provenance: provenance.to_string(),
    }
}

/// Split comma-separated ingredient text into trimmed, non-empty tokens.
pub fn split_ingredients(text: &str) -> Vec<String> {
    text.split(',').filter_map(clean).collect()
}

fn clean(token: &str) -> Option<String> {
    let token = normalize_token(token);
    (!token.is_empty()).then_some(token)
}

/// Open Facts lists several brands comma-separated; the first is the owner.
fn first_brand(brands: &str) -> Option<String> {
    brands.split(',').find_map(clean)
}

/// Nutriment values arrive as numbers or numeric strings.
fn numeric(value: &serde_json::Value) -> Option<f64> {
    let number = match value {
        serde_json::Value::Number(n) => n.as_f64(),
        serde_json::Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|v| v.is_finite())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::providers::IngredientEntry;
    use proptest::prelude::*;

    fn entry(text: &str) -> IngredientEntry {
        IngredientEntry {
            text: Some(text.to_string()),
        }
    }

    #[test]
    fn test_structured_ingredients_win() {
        let product = OpenFactsProduct {
            product_name: Some("Nutella".to_string()),
            ingredients: Some(vec![entry("Sugar"), entry(" Palm Oil "), entry("")]),
            ingredients_text: Some("ignored, text".to_string()),
            ..Default::default()
        };

        let record = normalize("1", NativeProduct::OpenFacts(product), "Open Food Facts", Category::Food);

        assert_eq!(record.ingredients, vec!["Sugar", "Palm Oil"]);
        assert_eq!(record.provenance, "Open Food Facts");
        assert_eq!(record.category, Category::Food);
    }

    #[test]
    fn test_text_split_when_no_structure() {
        let product = OpenFactsProduct {
            ingredients: Some(Vec::new()),
            ingredients_text: Some("Water,  Oats ,, Salt,".to_string()),
            ..Default::default()
        };

        let record = normalize("1", NativeProduct::OpenFacts(product), "OFF", Category::Food);

        assert_eq!(record.ingredients, vec!["Water", "Oats", "Salt"]);
        assert_eq!(record.name, UNKNOWN_NAME);
    }

    #[test]
    fn test_brand_origin_and_facts() {
        let mut product = OpenFactsProduct {
            brands: Some("Ferrero, Nutella".to_string()),
            manufacturing_places: Some("Italy".to_string()),
            ..Default::default()
        };
        product.nutriments.insert("sugars_100g".into(), serde_json::json!(56.3));
        product.nutriments.insert("salt_100g".into(), serde_json::json!("0.107"));
        product.nutriments.insert("nova_group_debug".into(), serde_json::json!(" - ok"));

        let record = normalize("1", NativeProduct::OpenFacts(product), "OFF", Category::Food);

        assert_eq!(record.brand.as_deref(), Some("Ferrero"));
        assert_eq!(record.origin.as_deref(), Some("Italy"));
        assert_eq!(record.fact("sugars_100g"), Some(56.3));
        assert_eq!(record.fact("salt_100g"), Some(0.107));
        assert_eq!(record.facts.len(), 2);
    }

    #[test]
    fn test_declared_seed_category_wins() {
        let product = OpenFactsProduct {
            category: Some(Category::Beauty),
            ..Default::default()
        };
        let record = normalize("1", NativeProduct::OpenFacts(product), "Demo Database", Category::Unknown);
        assert_eq!(record.category, Category::Beauty);
    }

    #[test]
    fn test_catalog_materials_are_structured() {
        let entry = CatalogEntry {
            product_name: "Levi's 501".to_string(),
            brand: Some("Levi's".to_string()),
            materials: vec!["Cotton".into(), "Elastane, Spandex".into()],
            origin: Some("Bangladesh".to_string()),
            ..Default::default()
        };

        let record = normalize("1", NativeProduct::Catalog(entry), "General Web Search", Category::General);

        // Materials are not re-split on commas
        assert_eq!(record.ingredients, vec!["Cotton", "Elastane, Spandex"]);
        assert_eq!(record.category, Category::General);
        assert!(record.packaging.is_none());
    }

    proptest! {
        #[test]
        fn prop_split_tokens_are_trimmed_and_non_empty(text in "[ a-zA-Z,]{0,60}") {
            for token in split_ingredients(&text) {
                prop_assert!(!token.is_empty());
                prop_assert_eq!(token.trim(), token.as_str());
                prop_assert!(!token.contains(','));
            }
        }
    }
}
