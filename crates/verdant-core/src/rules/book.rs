//! Rule book parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::tables::{
    AdvocacyRules, AlternativeRules, DisposalRules, FootprintRules, HealthRules, OriginRules,
    OwnershipRules, ValueRules, DEFAULT_REGION,
};

/// Errors that can occur when loading a rule book.
#[derive(Error, Debug)]
pub enum RuleBookError {
    #[error("Failed to read rule book file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Rule book validation failed: {0}")]
    ValidationError(String),
}

/// All evaluator rule tables, one section per evaluator.
///
/// Sections omitted from a file fall back to the built-in tables.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct RuleBook {
    #[serde(default)]
    pub health: HealthRules,

    #[serde(default)]
    pub values: ValueRules,

    #[serde(default)]
    pub ownership: OwnershipRules,

    #[serde(default)]
    pub disposal: DisposalRules,

    #[serde(default)]
    pub alternatives: AlternativeRules,

    #[serde(default)]
    pub footprint: FootprintRules,

    #[serde(default)]
    pub origin: OriginRules,

    #[serde(default)]
    pub advocacy: AdvocacyRules,
}

impl RuleBook {
    /// Parse a rule book from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, RuleBookError> {
        let book: RuleBook = serde_yaml::from_str(yaml)?;
        book.validate()?;
        Ok(book)
    }

    /// Parse a rule book from JSON string.
    pub fn from_json(json: &str) -> Result<Self, RuleBookError> {
        let book: RuleBook = serde_json::from_str(json)?;
        book.validate()?;
        Ok(book)
    }

    /// Parse a rule book from a YAML file.
    pub fn from_yaml_file(path: impl AsRef<Path>) -> Result<Self, RuleBookError> {
        let contents = fs::read_to_string(path)?;
        Self::from_yaml(&contents)
    }

    /// Serialize the rule book as YAML.
    pub fn to_yaml(&self) -> Result<String, RuleBookError> {
        Ok(serde_yaml::to_string(self)?)
    }

    /// Validate table consistency.
    pub fn validate(&self) -> Result<(), RuleBookError> {
        if !self.disposal.regions.contains_key(DEFAULT_REGION) {
            return Err(RuleBookError::ValidationError(format!(
                "disposal.regions must contain a '{}' region",
                DEFAULT_REGION
            )));
        }

        let fp = &self.footprint;
        if fp.low_below >= fp.high_at {
            return Err(RuleBookError::ValidationError(format!(
                "footprint.low_below ({}) must be below footprint.high_at ({})",
                fp.low_below, fp.high_at
            )));
        }
        if fp.product_weight_kg <= 0.0 || fp.packaging_weight_kg < 0.0 || fp.baseline_kg < 0.0 {
            return Err(RuleBookError::ValidationError(
                "footprint weights must be positive".to_string(),
            ));
        }

        if !(0.0..=100.0).contains(&self.origin.imported_score) {
            return Err(RuleBookError::ValidationError(format!(
                "origin.imported_score must be within [0, 100], got {}",
                self.origin.imported_score
            )));
        }

        if self.values.max_penalty < 0.0 || self.ownership.penalty_per_issue < 0.0 {
            return Err(RuleBookError::ValidationError(
                "penalties must not be negative".to_string(),
            ));
        }

        let mut seen = std::collections::HashSet::new();
        for record in &self.ownership.brands {
            if !seen.insert(record.brand.to_lowercase()) {
                return Err(RuleBookError::ValidationError(format!(
                    "Duplicate brand in ownership table: {}",
                    record.brand
                )));
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_book_is_valid() {
        assert!(RuleBook::default().validate().is_ok());
    }

    #[test]
    fn test_partial_yaml_keeps_defaults() {
        let yaml = r#"
origin:
  home_country: "Germany"
  imported_score: 45
"#;
        let book = RuleBook::from_yaml(yaml).unwrap();
        assert_eq!(book.origin.home_country, "Germany");
        assert_eq!(book.health, HealthRules::default());
    }

    #[test]
    fn test_yaml_round_trip_of_defaults() {
        let book = RuleBook::default();
        let yaml = book.to_yaml().unwrap();
        let parsed = RuleBook::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, book);
    }

    #[test]
    fn test_missing_default_region_rejected() {
        let yaml = r#"
disposal:
  regions:
    "Berlin":
      - material: "glass"
        instruction: "Glass container"
        recyclable: true
"#;
        let result = RuleBook::from_yaml(yaml);
        assert!(matches!(result, Err(RuleBookError::ValidationError(_))));
    }

    #[test]
    fn test_duplicate_brands_rejected() {
        let yaml = r#"
ownership:
  penalty_per_issue: 20
  brands:
    - brand: "Acme"
      parent: "Acme Holdings"
    - brand: "acme"
      parent: "Other"
"#;
        let result = RuleBook::from_yaml(yaml);
        assert!(matches!(result, Err(RuleBookError::ValidationError(_))));
    }

    #[test]
    fn test_inverted_footprint_thresholds_rejected() {
        let mut book = RuleBook::default();
        book.footprint.low_below = 6.0;
        assert!(book.validate().is_err());
    }
}
