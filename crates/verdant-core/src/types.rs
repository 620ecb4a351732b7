//! Core data types shared by every evaluator, the aggregator and the runtime.

use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::profile::UserProfile;

/// Traffic-light status of a verdict.
///
/// Serialized as the literal tokens `RED`, `YELLOW` and `GREEN`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Status {
    Red,
    Yellow,
    Green,
}

impl Status {
    /// Wire token for this status.
    pub fn as_str(&self) -> &'static str {
        match self {
            Status::Red => "RED",
            Status::Yellow => "YELLOW",
            Status::Green => "GREEN",
        }
    }

    /// Severity rank: higher is worse.
    pub fn severity(&self) -> u8 {
        match self {
            Status::Green => 0,
            Status::Yellow => 1,
            Status::Red => 2,
        }
    }

    pub fn is_red(&self) -> bool {
        matches!(self, Status::Red)
    }

    pub fn is_yellow(&self) -> bool {
        matches!(self, Status::Yellow)
    }

    pub fn is_green(&self) -> bool {
        matches!(self, Status::Green)
    }
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Status {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "RED" => Ok(Status::Red),
            "YELLOW" => Ok(Status::Yellow),
            "GREEN" => Ok(Status::Green),
            other => Err(format!("Unknown status token: '{}'", other)),
        }
    }
}

/// Product category, decided by the source that answered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Category {
    Food,
    Beauty,
    General,
    #[default]
    Unknown,
}

impl Category {
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::Food => "food",
            Category::Beauty => "beauty",
            Category::General => "general",
            Category::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Category {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "food" => Ok(Category::Food),
            "beauty" => Ok(Category::Beauty),
            "general" => Ok(Category::General),
            "unknown" => Ok(Category::Unknown),
            other => Err(format!("Unknown category: '{}'", other)),
        }
    }
}

/// Auxiliary structured findings attached to a verdict.
///
/// Keys differ between evaluators; consumers must not assume a fixed set.
pub type Details = BTreeMap<String, serde_json::Value>;

/// The normalized product shape every evaluator reads.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CanonicalProductRecord {
    /// Opaque product identifier (usually a barcode)
    pub id: String,

    /// Display name
    pub name: String,

    /// Ordered ingredient or material tokens
    #[serde(default)]
    pub ingredients: Vec<String>,

    /// Packaging material descriptor
    #[serde(default)]
    pub packaging: Option<String>,

    /// Brand or owner name
    #[serde(default)]
    pub brand: Option<String>,

    /// Country or region of origin as reported by the source
    #[serde(default)]
    pub origin: Option<String>,

    #[serde(default)]
    pub category: Category,

    /// Numeric nutrient/material facts, e.g. `sugars_100g`
    #[serde(default)]
    pub facts: BTreeMap<String, f64>,

    /// Name of the source that produced this record
    pub provenance: String,
}

impl CanonicalProductRecord {
    /// Create a record with only the mandatory fields set.
    pub fn new(
        id: impl Into<String>,
        name: impl Into<String>,
        provenance: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            ingredients: Vec::new(),
            packaging: None,
            brand: None,
            origin: None,
            category: Category::Unknown,
            facts: BTreeMap::new(),
            provenance: provenance.into(),
        }
    }

    pub fn with_ingredients<I, S>(mut self, ingredients: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.ingredients = ingredients.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_packaging(mut self, packaging: impl Into<String>) -> Self {
        self.packaging = Some(packaging.into());
        self
    }

    pub fn with_brand(mut self, brand: impl Into<String>) -> Self {
        self.brand = Some(brand.into());
        self
    }

    pub fn with_origin(mut self, origin: impl Into<String>) -> Self {
        self.origin = Some(origin.into());
        self
    }

    pub fn with_category(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    pub fn with_fact(mut self, key: impl Into<String>, value: f64) -> Self {
        self.facts.insert(key.into(), value);
        self
    }

    /// Look up a numeric fact.
    pub fn fact(&self, key: &str) -> Option<f64> {
        self.facts.get(key).copied()
    }
}

/// Score-to-status banding an evaluator declares for itself.
///
/// `score < red_below` is RED, `score >= green_at` is GREEN, anything in
/// between is YELLOW.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Banding {
    pub red_below: f64,
    pub green_at: f64,
}

impl Banding {
    /// House convention: <50 RED, 50-79 YELLOW, >=80 GREEN.
    pub const HOUSE: Banding = Banding {
        red_below: 50.0,
        green_at: 80.0,
    };

    pub const fn new(red_below: f64, green_at: f64) -> Self {
        Self {
            red_below,
            green_at,
        }
    }

    /// Status this banding assigns to a score.
    pub fn status_for(&self, score: f64) -> Status {
        if score < self.red_below {
            Status::Red
        } else if score >= self.green_at {
            Status::Green
        } else {
            Status::Yellow
        }
    }

    /// Whether a verdict's status agrees with this banding.
    pub fn is_consistent(&self, verdict: &Verdict) -> bool {
        self.status_for(verdict.score) == verdict.status
    }
}

impl Default for Banding {
    fn default() -> Self {
        Self::HOUSE
    }
}

/// One evaluator's scored, classified and explained finding.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Verdict {
    pub agent_name: String,

    /// Score in [0, 100]; lower is worse
    pub score: f64,

    pub status: Status,

    /// Human-readable explanation (never empty)
    pub reasoning: String,

    #[serde(default)]
    pub details: Details,
}

impl Verdict {
    /// Neutral score used when an evaluator cannot perform its check.
    pub const NEUTRAL_SCORE: f64 = 50.0;

    /// Create a verdict, clamping the score into [0, 100].
    pub fn new(
        agent_name: impl Into<String>,
        score: f64,
        status: Status,
        reasoning: impl Into<String>,
    ) -> Self {
        let reasoning = reasoning.into();
        let reasoning = if reasoning.trim().is_empty() {
            "No findings reported.".to_string()
        } else {
            reasoning
        };

        Self {
            agent_name: agent_name.into(),
            score: clamp_score(score),
            status,
            reasoning,
            details: Details::new(),
        }
    }

    /// Create a verdict whose status is derived from the given banding.
    pub fn banded(
        agent_name: impl Into<String>,
        score: f64,
        banding: Banding,
        reasoning: impl Into<String>,
    ) -> Self {
        let score = clamp_score(score);
        Self::new(agent_name, score, banding.status_for(score), reasoning)
    }

    /// Neutral YELLOW verdict for missing or uncertain input.
    pub fn neutral(agent_name: impl Into<String>, reasoning: impl Into<String>) -> Self {
        Self::new(agent_name, Self::NEUTRAL_SCORE, Status::Yellow, reasoning)
    }

    /// Attach a detail entry.
    pub fn with_detail(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.details.insert(key.into(), value.into());
        self
    }
}

fn clamp_score(score: f64) -> f64 {
    if score.is_nan() {
        return 0.0;
    }
    score.clamp(0.0, 100.0)
}

/// Input handed to every evaluator for one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EvaluationRequest {
    /// The resolved product snapshot
    pub record: CanonicalProductRecord,

    /// The requesting user's preferences, when supplied
    #[serde(default)]
    pub profile: Option<UserProfile>,
}

impl EvaluationRequest {
    pub fn new(record: CanonicalProductRecord, profile: Option<UserProfile>) -> Self {
        Self { record, profile }
    }
}

/// The aggregated, user-facing outcome of one request.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OverallResult {
    pub product_id: String,
    pub product_name: String,
    pub overall_score: f64,
    pub overall_status: Status,

    /// Verdicts in evaluator invocation order
    pub agent_verdicts: Vec<Verdict>,

    pub timestamp: DateTime<Utc>,
}

impl OverallResult {
    /// Find a verdict by evaluator name.
    pub fn verdict(&self, agent_name: &str) -> Option<&Verdict> {
        self.agent_verdicts
            .iter()
            .find(|v| v.agent_name == agent_name)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_wire_tokens() {
        assert_eq!(serde_json::to_string(&Status::Red).unwrap(), "\"RED\"");
        assert_eq!(serde_json::to_string(&Status::Yellow).unwrap(), "\"YELLOW\"");
        assert_eq!(serde_json::to_string(&Status::Green).unwrap(), "\"GREEN\"");

        let parsed: Status = serde_json::from_str("\"YELLOW\"").unwrap();
        assert_eq!(parsed, Status::Yellow);
        assert!(serde_json::from_str::<Status>("\"yellow\"").is_err());
    }

    #[test]
    fn test_status_severity_order() {
        assert!(Status::Red.severity() > Status::Yellow.severity());
        assert!(Status::Yellow.severity() > Status::Green.severity());
    }

    #[test]
    fn test_verdict_score_is_clamped() {
        let high = Verdict::new("x", 140.0, Status::Green, "ok");
        assert_eq!(high.score, 100.0);

        let low = Verdict::new("x", -3.0, Status::Red, "bad");
        assert_eq!(low.score, 0.0);

        let nan = Verdict::new("x", f64::NAN, Status::Red, "bad");
        assert_eq!(nan.score, 0.0);
    }

    #[test]
    fn test_verdict_reasoning_never_empty() {
        let verdict = Verdict::new("x", 100.0, Status::Green, "   ");
        assert!(!verdict.reasoning.trim().is_empty());
    }

    #[test]
    fn test_house_banding() {
        let banding = Banding::HOUSE;
        assert_eq!(banding.status_for(0.0), Status::Red);
        assert_eq!(banding.status_for(49.9), Status::Red);
        assert_eq!(banding.status_for(50.0), Status::Yellow);
        assert_eq!(banding.status_for(79.9), Status::Yellow);
        assert_eq!(banding.status_for(80.0), Status::Green);
        assert_eq!(banding.status_for(100.0), Status::Green);
    }

    #[test]
    fn test_banded_verdict_is_consistent() {
        let verdict = Verdict::banded("x", 60.0, Banding::HOUSE, "meh");
        assert_eq!(verdict.status, Status::Yellow);
        assert!(Banding::HOUSE.is_consistent(&verdict));
    }

    #[test]
    fn test_verdict_serialized_field_names() {
        let verdict = Verdict::neutral("Probe", "No data").with_detail("neutral", true);
        let value = serde_json::to_value(&verdict).unwrap();

        assert_eq!(value["agent_name"], "Probe");
        assert_eq!(value["score"], 50.0);
        assert_eq!(value["status"], "YELLOW");
        assert_eq!(value["reasoning"], "No data");
        assert_eq!(value["details"]["neutral"], true);
    }

    #[test]
    fn test_category_parse() {
        assert_eq!("Food".parse::<Category>().unwrap(), Category::Food);
        assert_eq!("beauty".parse::<Category>().unwrap(), Category::Beauty);
        assert!("toys".parse::<Category>().is_err());
    }
}
