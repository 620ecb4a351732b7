//! Rule tables consumed by the evaluators.
//!
//! Each evaluator receives its own section at construction time. The
//! `Default` impls carry the built-in tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::evaluators::matching::contains_word;

/// Region key used when no location-specific disposal rules apply.
pub const DEFAULT_REGION: &str = "default";

// =========================================================================
// HEALTH
// =========================================================================

/// A per-condition nutrient ceiling, e.g. sugar for diabetes.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NutrientLimit {
    pub condition: String,

    /// Fact key in the canonical record (e.g. `sugars_100g`)
    pub fact: String,

    /// Values strictly above this trigger a warning
    pub max: f64,

    /// Short label used in reasoning (e.g. "High Sugar")
    pub label: String,
}

/// An ingredient to avoid for users carrying a given restriction marker.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Interaction {
    pub restriction: String,
    pub ingredient: String,
    pub warning: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct HealthRules {
    #[serde(default)]
    pub condition_limits: Vec<NutrientLimit>,

    /// Users younger than this are treated as minors
    pub minor_age: u32,

    /// Keywords not recommended for minors
    #[serde(default)]
    pub minor_restricted: Vec<String>,

    #[serde(default)]
    pub interactions: Vec<Interaction>,

    /// Potentially harmful chemicals flagged in any category
    #[serde(default)]
    pub toxins: Vec<String>,
}

impl Default for HealthRules {
    fn default() -> Self {
        Self {
            condition_limits: vec![
                NutrientLimit {
                    condition: "Diabetes".to_string(),
                    fact: "sugars_100g".to_string(),
                    max: 10.0,
                    label: "High Sugar".to_string(),
                },
                NutrientLimit {
                    condition: "Hypertension".to_string(),
                    fact: "salt_100g".to_string(),
                    max: 1.5,
                    label: "High Salt".to_string(),
                },
            ],
            minor_age: 18,
            minor_restricted: strings(&[
                "alcohol",
                "wine",
                "beer",
                "caffeine",
                "coffee",
                "energy drink",
            ]),
            interactions: vec![Interaction {
                restriction: "MAOI".to_string(),
                ingredient: "cheese".to_string(),
                warning: "Cheese contains Tyramine (avoid with MAOIs)".to_string(),
            }],
            toxins: strings(&["paraben", "sulfate", "phthalate", "formaldehyde", "triclosan"]),
        }
    }
}

// =========================================================================
// VALUES
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ValueRules {
    /// Ingredient keywords per ethical category
    #[serde(default)]
    pub keywords: BTreeMap<String, Vec<String>>,

    /// Penalty applied at weight 1.0; scaled linearly by weight
    pub max_penalty: f64,
}

impl Default for ValueRules {
    fn default() -> Self {
        let mut keywords = BTreeMap::new();
        keywords.insert(
            "palm_oil".to_string(),
            strings(&["palm oil", "palmitate", "palm kernel"]),
        );
        keywords.insert(
            "animal_welfare".to_string(),
            strings(&["gelatin", "lard", "tallow"]),
        );
        // Not detectable from ingredient lists alone
        keywords.insert("plastic_waste".to_string(), Vec::new());
        keywords.insert("fair_labor".to_string(), Vec::new());

        Self {
            keywords,
            max_penalty: 50.0,
        }
    }
}

// =========================================================================
// OWNERSHIP
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct BrandRecord {
    pub brand: String,
    pub parent: String,

    #[serde(default)]
    pub investors: Vec<String>,

    #[serde(default)]
    pub issues: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OwnershipRules {
    #[serde(default)]
    pub brands: Vec<BrandRecord>,

    pub penalty_per_issue: f64,
}

impl Default for OwnershipRules {
    fn default() -> Self {
        Self {
            brands: vec![
                brand("Ben & Jerry's", "Unilever", &[], &["Plastic Pollution", "Palm Oil"]),
                brand(
                    "Oatly",
                    "Oatly Group",
                    &["Blackstone"],
                    &["Deforestation links (via investor)"],
                ),
                brand(
                    "Innocent Drinks",
                    "Coca-Cola",
                    &[],
                    &["Plastic Pollution", "Water Usage"],
                ),
                brand("Seventh Generation", "Unilever", &[], &["Plastic Pollution"]),
            ],
            penalty_per_issue: 20.0,
        }
    }
}

// =========================================================================
// DISPOSAL
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisposalRule {
    /// Matched case-insensitively as a whole word of the packaging descriptor
    pub material: String,
    pub instruction: String,
    pub recyclable: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DisposalRules {
    /// Ordered rules per region; first match wins
    pub regions: BTreeMap<String, Vec<DisposalRule>>,
}

impl DisposalRules {
    /// Rules for a location, falling back to the default region.
    pub fn for_location(&self, location: Option<&str>) -> (&str, &[DisposalRule]) {
        if let Some(location) = location {
            if let Some((name, rules)) = self
                .regions
                .iter()
                .find(|(name, _)| name.eq_ignore_ascii_case(location))
            {
                return (name.as_str(), rules.as_slice());
            }
        }

        match self.regions.get_key_value(DEFAULT_REGION) {
            Some((name, rules)) => (name.as_str(), rules.as_slice()),
            None => (DEFAULT_REGION, &[]),
        }
    }
}

impl Default for DisposalRules {
    fn default() -> Self {
        let mut regions = BTreeMap::new();
        regions.insert(
            DEFAULT_REGION.to_string(),
            vec![
                disposal("non-recyclable", "Trash (Not Recyclable)", false),
                disposal("not recyclable", "Trash (Not Recyclable)", false),
                disposal("composite", "Trash (Not Recyclable)", false),
                disposal("plastic", "Recycle in Blue Bin (Clean & Dry)", true),
                disposal("glass", "Recycle in Green Bin", true),
                disposal("carton", "Recycle in Blue Bin", true),
                disposal("paper", "Recycle in Blue Bin", true),
                disposal("can", "Recycle in Blue Bin", true),
            ],
        );
        regions.insert(
            "San Francisco, CA".to_string(),
            vec![
                disposal("non-recyclable", "Landfill (Black Bin)", false),
                disposal("not recyclable", "Landfill (Black Bin)", false),
                disposal("compostable", "Compost (Green Bin)", true),
                disposal("plastic", "Recycle (Blue Bin)", true),
                disposal("glass", "Recycle (Blue Bin)", true),
                disposal("carton", "Recycle (Blue Bin)", true),
            ],
        );

        Self { regions }
    }
}

// =========================================================================
// ALTERNATIVES
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Suggestion {
    pub name: String,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlternativeCategory {
    pub name: String,

    /// Keywords matched against the lower-cased product name
    pub keywords: Vec<String>,

    #[serde(default)]
    pub suggestions: Vec<Suggestion>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AlternativeRules {
    #[serde(default)]
    pub categories: Vec<AlternativeCategory>,
}

impl Default for AlternativeRules {
    fn default() -> Self {
        Self {
            categories: vec![
                AlternativeCategory {
                    name: "Milk".to_string(),
                    keywords: strings(&["milk", "oat", "dairy"]),
                    suggestions: vec![
                        suggestion("Oatly Barista Edition", "Low Carbon, Vegan"),
                        suggestion("Almond Breeze", "Vegan, Low Calorie"),
                    ],
                },
                AlternativeCategory {
                    name: "Soda".to_string(),
                    keywords: strings(&["cola", "soda", "drink"]),
                    suggestions: vec![
                        suggestion("Zevia Zero Calorie", "No Sugar, No Artificial Colors"),
                        suggestion("Spindrift Sparkling Water", "Natural Ingredients"),
                    ],
                },
                AlternativeCategory {
                    name: "Spread".to_string(),
                    keywords: strings(&["spread", "nutella", "butter"]),
                    suggestions: vec![
                        suggestion("Rigoni di Asiago Nocciolata", "Palm Oil Free, Organic"),
                        suggestion("Justin's Hazelnut Butter", "Less Sugar"),
                    ],
                },
            ],
        }
    }
}

// =========================================================================
// FOOTPRINT
// =========================================================================

/// kg CO2e emitted per kg of a material.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct EmissionFactor {
    pub name: String,

    #[serde(default)]
    pub aliases: Vec<String>,

    pub kg_co2e_per_kg: f64,
}

impl EmissionFactor {
    /// Whether a text mentions this material by name or alias, as a whole word.
    pub fn matches(&self, text: &str) -> bool {
        contains_word(text, &self.name)
            || self.aliases.iter().any(|alias| contains_word(text, alias))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct FootprintRules {
    /// Ordered ingredient factors; first match per ingredient wins
    pub ingredient_factors: Vec<EmissionFactor>,

    /// Ordered packaging factors; first match wins
    pub packaging_factors: Vec<EmissionFactor>,

    /// Assumed product weight when none is known
    pub product_weight_kg: f64,

    pub packaging_weight_kg: f64,

    /// Transport overhead used when nothing matched
    pub baseline_kg: f64,

    /// Footprints below this are GREEN
    pub low_below: f64,

    /// Footprints at or above this are RED
    pub high_at: f64,
}

impl Default for FootprintRules {
    fn default() -> Self {
        Self {
            ingredient_factors: vec![
                factor("beef", &[], 60.0),
                factor("lamb", &[], 24.0),
                factor("cheese", &[], 21.0),
                factor("chocolate", &[], 19.0),
                factor("coffee", &[], 17.0),
                factor("pork", &[], 7.0),
                factor("chicken", &[], 6.0),
                factor("eggs", &[], 4.5),
                factor("rice", &[], 4.0),
                factor("milk", &[], 3.0),
                factor("oats", &[], 0.9),
                factor("vegetables", &[], 0.5),
                factor("plastic", &[], 6.0),
                factor("glass", &[], 0.9),
                factor("aluminum", &[], 2.3),
            ],
            packaging_factors: vec![
                factor("plastic", &[], 6.0),
                factor("glass", &[], 0.9),
                factor("aluminum", &["aluminium", "can"], 2.3),
            ],
            product_weight_kg: 0.1,
            packaging_weight_kg: 0.02,
            baseline_kg: 0.5,
            low_below: 1.0,
            high_at: 5.0,
        }
    }
}

// =========================================================================
// ORIGIN
// =========================================================================

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct OriginRules {
    /// Assumed home country when the profile names none
    pub home_country: String,

    /// Score for products imported from elsewhere
    pub imported_score: f64,

    /// Known countries and the other names they appear under on labels
    #[serde(default = "default_countries")]
    pub countries: BTreeMap<String, Vec<String>>,
}

impl OriginRules {
    /// Canonical name and aliases of a country, by name or alias.
    pub fn country(&self, name: &str) -> Option<(&str, &[String])> {
        let name = name.trim();
        self.countries
            .iter()
            .find(|(country, aliases)| {
                country.eq_ignore_ascii_case(name)
                    || aliases.iter().any(|alias| alias.eq_ignore_ascii_case(name))
            })
            .map(|(country, aliases)| (country.as_str(), aliases.as_slice()))
    }

    /// First known country mentioned in free text such as a location.
    pub fn country_in(&self, text: &str) -> Option<&str> {
        self.countries
            .iter()
            .find(|(country, aliases)| {
                contains_word(text, country)
                    || aliases.iter().any(|alias| contains_word(text, alias))
            })
            .map(|(country, _)| country.as_str())
    }

    /// Whether an origin names the given home country or one of its aliases.
    pub fn is_domestic(&self, origin: &str, home: &str) -> bool {
        if contains_word(origin, home) {
            return true;
        }
        match self.country(home) {
            Some((country, aliases)) => {
                contains_word(origin, country)
                    || aliases.iter().any(|alias| contains_word(origin, alias))
            }
            None => false,
        }
    }
}

impl Default for OriginRules {
    fn default() -> Self {
        Self {
            home_country: "United States".to_string(),
            imported_score: 40.0,
            countries: default_countries(),
        }
    }
}

fn default_countries() -> BTreeMap<String, Vec<String>> {
    [
        (
            "United States",
            &["USA", "US", "U.S.", "U.S.A.", "United States of America"][..],
        ),
        ("United Kingdom", &["UK", "U.K.", "Great Britain"][..]),
        ("Canada", &[][..]),
        ("France", &[][..]),
        ("Germany", &["Deutschland"][..]),
        ("Italy", &["Italia"][..]),
        ("Spain", &["España"][..]),
        ("Sweden", &["Sverige"][..]),
        ("Netherlands", &["Holland"][..]),
        ("Switzerland", &[][..]),
    ]
    .into_iter()
    .map(|(country, aliases)| (country.to_string(), strings(aliases)))
    .collect()
}

// =========================================================================
// ADVOCACY
// =========================================================================

/// Which part of the record an advocacy trigger inspects.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum TriggerTarget {
    Ingredients,
    Packaging,
}

/// A condition that prompts drafting advocacy messages.
///
/// Templates support `{handle}`, `{brand}`, `{product}` and `{label}`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvocacyTrigger {
    pub target: TriggerTarget,
    pub keyword: String,
    pub label: String,
    pub post_template: String,

    #[serde(default)]
    pub email_template: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct AdvocacyRules {
    #[serde(default)]
    pub triggers: Vec<AdvocacyTrigger>,
}

impl Default for AdvocacyRules {
    fn default() -> Self {
        Self {
            triggers: vec![
                AdvocacyTrigger {
                    target: TriggerTarget::Ingredients,
                    keyword: "palm oil".to_string(),
                    label: "Palm Oil".to_string(),
                    post_template:
                        "Hey @{handle}, why are you still using {label} in {product}? #Deforestation #EthicalLens"
                            .to_string(),
                    email_template: Some(
                        "Subject: Concern regarding {label} in {product}\n\nDear {brand} Team,\n\nI am a concerned consumer..."
                            .to_string(),
                    ),
                },
                AdvocacyTrigger {
                    target: TriggerTarget::Packaging,
                    keyword: "plastic".to_string(),
                    label: "Plastic Packaging".to_string(),
                    post_template:
                        "Hey @{handle}, please switch to sustainable packaging for {product}! #EndPlasticWaste"
                            .to_string(),
                    email_template: None,
                },
            ],
        }
    }
}

// Helpers for the built-in tables

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn brand(name: &str, parent: &str, investors: &[&str], issues: &[&str]) -> BrandRecord {
    BrandRecord {
        brand: name.to_string(),
        parent: parent.to_string(),
        investors: strings(investors),
        issues: strings(issues),
    }
}

fn disposal(material: &str, instruction: &str, recyclable: bool) -> DisposalRule {
    DisposalRule {
        material: material.to_string(),
        instruction: instruction.to_string(),
        recyclable,
    }
}

fn suggestion(name: &str, reason: &str) -> Suggestion {
    Suggestion {
        name: name.to_string(),
        reason: reason.to_string(),
    }
}

fn factor(name: &str, aliases: &[&str], kg_co2e_per_kg: f64) -> EmissionFactor {
    EmissionFactor {
        name: name.to_string(),
        aliases: strings(aliases),
        kg_co2e_per_kg,
    }
}
