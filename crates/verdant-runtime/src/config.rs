//! Runtime configuration.
//!
//! Loaded from YAML. Durations are humantime strings (`"3s"`, `"500ms"`),
//! except circuit breaker recovery which is whole seconds.
//!
//! ```yaml
//! default_timeout: 3s
//! circuit_breaker:
//!   failure_threshold: 3
//!   recovery_timeout: 30
//! sources:
//!   - type: open_food_facts
//!   - type: catalog
//!     name: Local Catalog
//!     timeout: 500ms
//!     settings:
//!       path: catalog.json
//!   - type: seed
//! ```

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::providers::SourceRegistry;
use crate::resilience::CircuitBreakerConfig;

/// Errors from loading runtime configuration.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to parse YAML: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("Invalid duration '{value}': {reason}")]
    InvalidDuration { value: String, reason: String },

    #[error("Unknown source type: '{0}'")]
    UnknownSourceType(String),

    #[error("No sources configured")]
    NoSources,

    #[error("Failed to create source '{source_type}': {reason}")]
    Source { source_type: String, reason: String },
}

/// Runtime configuration for the orchestrator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct RuntimeConfig {
    /// Timeout applied to sources without their own
    #[serde(with = "humantime_duration")]
    pub default_timeout: Duration,

    pub circuit_breaker: CircuitBreakerConfig,

    /// Sources in resolution order
    pub sources: Vec<SourceConfig>,
}

/// One entry of the resolution chain.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SourceConfig {
    /// Registered source type, e.g. `open_food_facts`
    #[serde(rename = "type")]
    pub source_type: String,

    /// Overrides the source's default name
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(
        default,
        with = "humantime_duration::option",
        skip_serializing_if = "Option::is_none"
    )]
    pub timeout: Option<Duration>,

    /// Overrides the source's own reliability claim
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reliable: Option<bool>,

    /// Type-specific settings passed to the factory
    #[serde(default = "empty_settings", skip_serializing_if = "is_empty_settings")]
    pub settings: JsonValue,
}

fn empty_settings() -> JsonValue {
    JsonValue::Object(Default::default())
}

fn is_empty_settings(settings: &JsonValue) -> bool {
    settings.as_object().is_some_and(|o| o.is_empty()) || settings.is_null()
}

impl SourceConfig {
    pub fn new(source_type: impl Into<String>) -> Self {
        Self {
            source_type: source_type.into(),
            name: None,
            timeout: None,
            reliable: None,
            settings: empty_settings(),
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Settings handed to the factory, with `name` merged in.
    pub fn factory_settings(&self) -> JsonValue {
        let mut settings = match &self.settings {
            JsonValue::Object(map) => map.clone(),
            _ => Default::default(),
        };
        if let Some(name) = &self.name {
            settings.insert("name".to_string(), JsonValue::String(name.clone()));
        }
        JsonValue::Object(settings)
    }
}

impl Default for RuntimeConfig {
    fn default() -> Self {
        Self {
            default_timeout: Duration::from_secs(3),
            circuit_breaker: CircuitBreakerConfig::default(),
            sources: vec![
                SourceConfig::new("open_food_facts"),
                SourceConfig::new("open_beauty_facts"),
                SourceConfig::new("catalog"),
                SourceConfig::new("seed"),
            ],
        }
    }
}

impl RuntimeConfig {
    /// Parse configuration from a YAML string.
    pub fn from_yaml(yaml: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_yaml::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a YAML file.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_yaml(&content)
    }

    /// Check that the chain is non-empty and every type is registered.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.validate_against(&SourceRegistry::with_defaults())
    }

    pub fn validate_against(&self, registry: &SourceRegistry) -> Result<(), ConfigError> {
        if self.sources.is_empty() {
            return Err(ConfigError::NoSources);
        }
        for source in &self.sources {
            if !registry.has_source(&source.source_type) {
                return Err(ConfigError::UnknownSourceType(source.source_type.clone()));
            }
        }
        Ok(())
    }

    /// Effective timeout for one source.
    pub fn timeout_for(&self, source: &SourceConfig) -> Duration {
        source.timeout.unwrap_or(self.default_timeout)
    }

    pub fn to_yaml(&self) -> Result<String, ConfigError> {
        Ok(serde_yaml::to_string(self)?)
    }
}

/// Serde adapter for humantime duration strings.
mod humantime_duration {
    use serde::{de::Error, Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(&humantime::format_duration(*duration).to_string())
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Duration, D::Error>
    where
        D: Deserializer<'de>,
    {
        let value = String::deserialize(deserializer)?;
        humantime::parse_duration(&value).map_err(|e| {
            D::Error::custom(super::ConfigError::InvalidDuration {
                value,
                reason: e.to_string(),
            })
        })
    }

    pub mod option {
        use serde::{Deserialize, Deserializer, Serializer};
        use std::time::Duration;

        pub fn serialize<S>(duration: &Option<Duration>, serializer: S) -> Result<S::Ok, S::Error>
        where
            S: Serializer,
        {
            match duration {
                Some(d) => super::serialize(d, serializer),
                None => serializer.serialize_none(),
            }
        }

        pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<Duration>, D::Error>
        where
            D: Deserializer<'de>,
        {
            #[derive(Deserialize)]
            struct Wrapper(#[serde(with = "super")] Duration);

            Ok(Option::<Wrapper>::deserialize(deserializer)?.map(|Wrapper(d)| d))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_chain_order() {
        let config = RuntimeConfig::default();
        let types: Vec<&str> = config
            .sources
            .iter()
            .map(|s| s.source_type.as_str())
            .collect();

        assert_eq!(types, vec!["open_food_facts", "open_beauty_facts", "catalog", "seed"]);
        assert_eq!(config.default_timeout, Duration::from_secs(3));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_parse_yaml() {
        let yaml = r#"
default_timeout: 5s
circuit_breaker:
  failure_threshold: 2
  recovery_timeout: 10
sources:
  - type: catalog
    name: Local Catalog
    timeout: 500ms
    reliable: true
  - type: seed
"#;
        let config = RuntimeConfig::from_yaml(yaml).unwrap();

        assert_eq!(config.default_timeout, Duration::from_secs(5));
        assert_eq!(config.circuit_breaker.failure_threshold, 2);
        assert_eq!(config.circuit_breaker.recovery_timeout, Duration::from_secs(10));
        assert_eq!(config.sources.len(), 2);

        let catalog = &config.sources[0];
        assert_eq!(catalog.name.as_deref(), Some("Local Catalog"));
        assert_eq!(config.timeout_for(catalog), Duration::from_millis(500));
        assert_eq!(catalog.reliable, Some(true));
        assert_eq!(catalog.factory_settings()["name"], "Local Catalog");

        assert_eq!(config.timeout_for(&config.sources[1]), Duration::from_secs(5));
    }

    #[test]
    fn test_missing_sections_use_defaults() {
        let config = RuntimeConfig::from_yaml("default_timeout: 1s\n").unwrap();
        assert_eq!(config.sources.len(), 4);
        assert_eq!(config.circuit_breaker, CircuitBreakerConfig::default());
    }

    #[test]
    fn test_invalid_duration_rejected() {
        let result = RuntimeConfig::from_yaml("default_timeout: soon\n");
        match result {
            Err(ConfigError::Yaml(e)) => assert!(e.to_string().contains("Invalid duration")),
            other => panic!("Expected YAML error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_source_type_rejected() {
        let result = RuntimeConfig::from_yaml("sources:\n  - type: amazon\n");
        assert!(matches!(result, Err(ConfigError::UnknownSourceType(t)) if t == "amazon"));
    }

    #[test]
    fn test_empty_chain_rejected() {
        let result = RuntimeConfig::from_yaml("sources: []\n");
        assert!(matches!(result, Err(ConfigError::NoSources)));
    }

    #[test]
    fn test_yaml_round_trip() {
        let mut config = RuntimeConfig::default();
        config.sources[2] = SourceConfig::new("catalog")
            .with_name("Fallback")
            .with_timeout(Duration::from_millis(750));

        let yaml = config.to_yaml().unwrap();
        let parsed = RuntimeConfig::from_yaml(&yaml).unwrap();
        assert_eq!(parsed, config);
    }
}
