//! User profile parsing from YAML/JSON.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;
use thiserror::Error;

use super::schema::validate_profile_schema;

/// Errors that can occur when loading a profile.
#[derive(Error, Debug)]
pub enum ProfileError {
    #[error("Failed to read profile file: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    YamlError(#[from] serde_yaml::Error),

    #[error("Failed to parse JSON: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("Profile validation failed: {0}")]
    ValidationError(String),
}

/// Health-related constraints of a user.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct HealthProfile {
    /// Ingredient tokens the user is allergic to
    #[serde(default)]
    pub allergens: Vec<String>,

    /// Medical conditions (e.g. "Diabetes", "Hypertension")
    #[serde(default)]
    pub conditions: Vec<String>,

    #[serde(default)]
    pub age: Option<u32>,

    /// Dietary choices or medication markers (e.g. "Vegan", "MAOI")
    #[serde(default)]
    pub dietary_restrictions: Vec<String>,
}

impl HealthProfile {
    /// Case-insensitive membership test for a condition.
    pub fn has_condition(&self, condition: &str) -> bool {
        self.conditions
            .iter()
            .any(|c| c.eq_ignore_ascii_case(condition))
    }

    /// Case-insensitive membership test for a dietary restriction.
    pub fn has_restriction(&self, restriction: &str) -> bool {
        self.dietary_restrictions
            .iter()
            .any(|r| r.eq_ignore_ascii_case(restriction))
    }

    pub fn is_empty(&self) -> bool {
        self.allergens.is_empty()
            && self.conditions.is_empty()
            && self.age.is_none()
            && self.dietary_restrictions.is_empty()
    }
}

/// Ethical priorities, weighted from 0.0 (ignore) to 1.0 (critical).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueProfile {
    #[serde(default)]
    pub weights: BTreeMap<String, f64>,
}

impl Default for ValueProfile {
    fn default() -> Self {
        let weights = [
            "palm_oil",
            "animal_welfare",
            "carbon_footprint",
            "fair_labor",
            "plastic_waste",
        ]
        .into_iter()
        .map(|category| (category.to_string(), 0.5))
        .collect();

        Self { weights }
    }
}

impl ValueProfile {
    /// Weight for a category, zero when unset.
    pub fn weight(&self, category: &str) -> f64 {
        self.weights.get(category).copied().unwrap_or(0.0)
    }
}

/// A user's health and value preferences.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct UserProfile {
    #[serde(default)]
    pub user_id: Option<String>,

    /// Region key for disposal rules (e.g. "San Francisco, CA")
    #[serde(default)]
    pub location: Option<String>,

    /// Home country for origin checks
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,

    #[serde(default)]
    pub health_profile: HealthProfile,

    #[serde(default)]
    pub value_profile: ValueProfile,
}

impl UserProfile {
    /// Parse a profile from YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ProfileError> {
        let value: serde_json::Value = serde_yaml::from_str(yaml)?;
        Self::from_value(value)
    }

    /// Parse a profile from JSON string.
    pub fn from_json(json: &str) -> Result<Self, ProfileError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        Self::from_value(value)
    }

    /// Validate a JSON value against the profile schema and deserialize it.
    pub fn from_value(value: serde_json::Value) -> Result<Self, ProfileError> {
        validate_profile_schema(&value)
            .map_err(|errors| ProfileError::ValidationError(errors.join("; ")))?;

        let profile: UserProfile = serde_json::from_value(value)?;
        profile.validate()?;
        Ok(profile)
    }

    /// Load a profile file, picking the format from the extension.
    ///
    /// `.json` files are parsed as JSON, everything else as YAML.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ProfileError> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path)?;

        let is_json = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

        if is_json {
            Self::from_json(&contents)
        } else {
            Self::from_yaml(&contents)
        }
    }

    /// Check invariants that hold for programmatically built profiles too.
    pub fn validate(&self) -> Result<(), ProfileError> {
        for (category, weight) in &self.value_profile.weights {
            if !weight.is_finite() || !(0.0..=1.0).contains(weight) {
                return Err(ProfileError::ValidationError(format!(
                    "Weight for '{}' must be within [0.0, 1.0], got {}",
                    category, weight
                )));
            }
        }

        if let Some(allergen) = self
            .health_profile
            .allergens
            .iter()
            .find(|a| a.trim().is_empty())
        {
            return Err(ProfileError::ValidationError(format!(
                "Allergen tokens must not be blank: {:?}",
                allergen
            )));
        }

        Ok(())
    }

    /// Builder-style helper for tests and embedders.
    pub fn with_allergens<I, S>(mut self, allergens: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.health_profile.allergens = allergens.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_conditions<I, S>(mut self, conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.health_profile.conditions = conditions.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_age(mut self, age: u32) -> Self {
        self.health_profile.age = Some(age);
        self
    }

    pub fn with_weight(mut self, category: impl Into<String>, weight: f64) -> Self {
        self.value_profile.weights.insert(category.into(), weight);
        self
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    pub fn with_country(mut self, country: impl Into<String>) -> Self {
        self.country = Some(country.into());
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VALID_PROFILE: &str = r#"
user_id: "u-1"
location: "San Francisco, CA"
country: "United States"
health_profile:
  allergens: ["Peanut"]
  conditions: ["Diabetes"]
  age: 16
value_profile:
  weights:
    palm_oil: 1.0
"#;

    #[test]
    fn test_parse_valid_profile() {
        let profile = UserProfile::from_yaml(VALID_PROFILE).unwrap();
        assert_eq!(profile.user_id.as_deref(), Some("u-1"));
        assert_eq!(profile.country.as_deref(), Some("United States"));
        assert_eq!(profile.health_profile.allergens, vec!["Peanut"]);
        assert_eq!(profile.health_profile.age, Some(16));
        assert_eq!(profile.value_profile.weight("palm_oil"), 1.0);
        assert_eq!(profile.value_profile.weight("fair_labor"), 0.0);
    }

    #[test]
    fn test_missing_value_profile_uses_default_weights() {
        let profile = UserProfile::from_yaml("user_id: \"u-2\"\n").unwrap();
        assert_eq!(profile.value_profile.weights.len(), 5);
        assert_eq!(profile.value_profile.weight("palm_oil"), 0.5);
    }

    #[test]
    fn test_json_profile() {
        let profile =
            UserProfile::from_json(r#"{"health_profile": {"allergens": ["soy"]}}"#).unwrap();
        assert_eq!(profile.health_profile.allergens, vec!["soy"]);
    }

    #[test]
    fn test_schema_violation_is_validation_error() {
        let result = UserProfile::from_yaml("value_profile:\n  weights:\n    palm_oil: 3\n");
        assert!(matches!(result, Err(ProfileError::ValidationError(_))));
    }

    #[test]
    fn test_programmatic_profile_validation() {
        let profile = UserProfile::default().with_weight("palm_oil", -0.1);
        assert!(profile.validate().is_err());

        let blank = UserProfile::default().with_allergens(["  "]);
        assert!(blank.validate().is_err());
    }

    #[test]
    fn test_condition_lookup_ignores_case() {
        let profile = UserProfile::default().with_conditions(["diabetes"]);
        assert!(profile.health_profile.has_condition("Diabetes"));
        assert!(!profile.health_profile.has_condition("Hypertension"));
    }
}
