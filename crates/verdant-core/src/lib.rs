//! # verdant-core
//!
//! Deterministic product verdict engine.
//!
//! This crate answers, for one resolved product and one user:
//! - Is it safe for them?
//! - Does it match what they care about?
//! - Taken together, is it RED, YELLOW or GREEN?
//!
//! ## Key Guarantees
//!
//! 1. **Deterministic**: Same record and profile always produce the same verdicts
//! 2. **No I/O**: Evaluators only read the request and their rule tables
//! 3. **Worst wins**: A single RED verdict is never averaged away
//! 4. **Parallel-safe**: Evaluators run independently of each other
//!
//! ## Example
//!
//! ```rust,ignore
//! use verdant_core::{evaluate, CanonicalProductRecord, EvaluationRequest, UserProfile};
//!
//! let profile = UserProfile::from_file("profile.yaml")?;
//! let record = CanonicalProductRecord::new("3017620422003", "Nutella", "Seed Catalog")
//!     .with_ingredients(["Sugar", "Palm Oil", "Hazelnuts"]);
//!
//! let result = evaluate(&EvaluationRequest::new(record, Some(profile)))?;
//! println!("{} ({:.0})", result.overall_status, result.overall_score);
//! ```

pub mod aggregator;
pub mod evaluators;
pub mod profile;
pub mod registry;
pub mod rules;
pub mod types;

// Re-export main types at crate root
pub use aggregator::Aggregator;
pub use evaluators::{
    AdvocacyDrafter, AlternativeFinder, DisposalGuide, Evaluator, EvaluatorKind,
    FootprintEstimator, HealthShield, OriginScout, OwnershipTrace, ValueJudge,
};
pub use profile::{HealthProfile, ProfileError, UserProfile, ValueProfile};
pub use registry::{EvaluatorRegistry, RegistryError};
pub use rules::{RuleBook, RuleBookError};
pub use types::{
    Banding, CanonicalProductRecord, Category, Details, EvaluationRequest, OverallResult, Status,
    Verdict,
};

use thiserror::Error;

/// Errors that can occur during evaluation
#[derive(Error, Debug)]
pub enum EvaluationError {
    #[error("No verdicts to aggregate")]
    NoVerdicts,

    #[error("Registry error: {0}")]
    Registry(#[from] RegistryError),
}

/// Evaluate a request with the standard evaluators and built-in rules.
///
/// Runs every evaluator sequentially and aggregates the verdicts. The
/// runtime crate runs the same evaluators concurrently.
pub fn evaluate(request: &EvaluationRequest) -> Result<OverallResult, EvaluationError> {
    evaluate_with(&EvaluatorRegistry::default(), request)
}

/// Evaluate a request with an explicit registry.
pub fn evaluate_with(
    registry: &EvaluatorRegistry,
    request: &EvaluationRequest,
) -> Result<OverallResult, EvaluationError> {
    let verdicts = registry.evaluate_all(request);
    Aggregator::new().aggregate(&request.record.id, &request.record.name, verdicts)
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn nutella() -> CanonicalProductRecord {
        CanonicalProductRecord::new("3017620422003", "Nutella", "Seed Catalog")
            .with_category(Category::Food)
            .with_ingredients(["Sugar", "Palm Oil", "Hazelnuts", "Skim Milk", "Cocoa"])
            .with_packaging("Glass jar")
            .with_brand("Ferrero")
            .with_origin("Italy")
            .with_fact("sugars_100g", 56.3)
    }

    #[test]
    fn test_milk_allergy_is_red_zero() {
        let profile = UserProfile::default().with_allergens(["milk"]);
        let result = evaluate(&EvaluationRequest::new(nutella(), Some(profile))).unwrap();

        assert_eq!(result.overall_status, Status::Red);
        assert_eq!(result.overall_score, 0.0);
        assert_eq!(result.agent_verdicts.len(), EvaluatorKind::ALL.len());
        assert_eq!(result.product_id, "3017620422003");
    }

    #[test]
    fn test_no_profile_is_not_red() {
        let result = evaluate(&EvaluationRequest::new(nutella(), None)).unwrap();

        // Health and values fall back to neutral; nothing else is RED for this record
        assert_eq!(result.overall_status, Status::Yellow);
        let health = result.verdict("Health Shield").unwrap();
        assert_eq!(health.status, Status::Yellow);
        assert_eq!(health.score, 50.0);
    }

    #[test]
    fn test_deterministic() {
        let request = EvaluationRequest::new(nutella(), Some(UserProfile::default()));
        let a = evaluate(&request).unwrap();
        let b = evaluate(&request).unwrap();

        assert_eq!(a.overall_status, b.overall_status);
        assert_eq!(a.overall_score, b.overall_score);
        assert_eq!(a.agent_verdicts, b.agent_verdicts);
    }

    const INGREDIENT_POOL: &[&str] = &[
        "Sugar",
        "Palm Oil",
        "Peanuts",
        "Beef",
        "Cheese",
        "Oats",
        "Water",
        "Caffeine",
        "Gelatin",
        "Methylparaben",
        "Skim Milk",
        "Chocolate",
    ];

    const PACKAGING_POOL: &[&str] = &[
        "Plastic bottle",
        "Glass jar",
        "Carton",
        "Non-recyclable film",
        "Aluminium can",
        "Wood",
    ];

    fn arb_record() -> impl Strategy<Value = CanonicalProductRecord> {
        (
            prop::sample::subsequence(INGREDIENT_POOL.to_vec(), 0..INGREDIENT_POOL.len()),
            prop::option::of(prop::sample::select(PACKAGING_POOL.to_vec())),
            prop::option::of(prop::sample::select(vec!["Oatly", "Ben & Jerry's", "Acme"])),
            prop::option::of(prop::sample::select(vec!["United States", "Italy", "Sweden"])),
            0.0f64..80.0,
        )
            .prop_map(|(ingredients, packaging, brand, origin, sugar)| {
                let mut record = CanonicalProductRecord::new("1", "Generated", "Test Source")
                    .with_ingredients(ingredients)
                    .with_fact("sugars_100g", sugar);
                record.packaging = packaging.map(str::to_string);
                record.brand = brand.map(str::to_string);
                record.origin = origin.map(str::to_string);
                record
            })
    }

    fn arb_profile() -> impl Strategy<Value = Option<UserProfile>> {
        prop::option::of(
            (
                prop::sample::subsequence(vec!["peanut", "milk", "soy"], 0..3),
                prop::sample::subsequence(vec!["Diabetes", "Hypertension"], 0..2),
                prop::option::of(5u32..90),
                0.0f64..=1.0,
                0.0f64..=1.0,
                prop::option::of(prop::sample::select(vec!["San Francisco, CA", "Sweden"])),
            )
                .prop_map(|(allergens, conditions, age, palm, welfare, location)| {
                    let mut profile = UserProfile::default()
                        .with_allergens(allergens)
                        .with_conditions(conditions)
                        .with_weight("palm_oil", palm)
                        .with_weight("animal_welfare", welfare);
                    profile.health_profile.age = age;
                    profile.location = location.map(str::to_string);
                    profile
                }),
        )
    }

    proptest! {
        #[test]
        fn prop_verdicts_agree_with_banding(record in arb_record(), profile in arb_profile()) {
            let request = EvaluationRequest::new(record, profile);
            for evaluator in EvaluatorRegistry::default().iter() {
                let verdict = evaluator.evaluate(&request);
                prop_assert!(
                    evaluator.banding().is_consistent(&verdict),
                    "{} returned {} at {}",
                    verdict.agent_name,
                    verdict.status,
                    verdict.score
                );
                prop_assert!((0.0..=100.0).contains(&verdict.score));
                prop_assert!(!verdict.reasoning.trim().is_empty());
            }
        }

        #[test]
        fn prop_red_verdict_forces_red(record in arb_record(), profile in arb_profile()) {
            let result = evaluate(&EvaluationRequest::new(record, profile)).unwrap();
            let any_red = result.agent_verdicts.iter().any(|v| v.status.is_red());
            prop_assert_eq!(result.overall_status.is_red(), any_red);
        }
    }
}
