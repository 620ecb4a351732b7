//! Health Shield
//!
//! **Question**: Is this product safe for this user's health?
//!
//! ## State Conditions
//!
//! | State | Score | Condition |
//! |-------|-------|-----------|
//! | **RED** | 0 | An ingredient contains one of the user's allergen tokens |
//! | **YELLOW** | 50 | Condition limits exceeded, minor restrictions, interactions, or toxins |
//! | **YELLOW** | 50 | No profile supplied |
//! | **GREEN** | 100 | Nothing flagged |

use crate::rules::HealthRules;
use crate::types::{EvaluationRequest, Status, Verdict};

use super::matching::{contains_ignore_case, find_ingredient, title_case};
use super::{missing_profile_verdict, Evaluator, EvaluatorKind};

/// The Health Shield evaluator.
pub struct HealthShield {
    rules: HealthRules,
}

impl HealthShield {
    pub fn new(rules: HealthRules) -> Self {
        Self { rules }
    }

    /// Ingredients matching any allergen, each listed once.
    fn detect_allergens(&self, ingredients: &[String], allergens: &[String]) -> Vec<String> {
        ingredients
            .iter()
            .filter(|ingredient| {
                allergens
                    .iter()
                    .any(|allergen| contains_ignore_case(ingredient, allergen.trim()))
            })
            .cloned()
            .collect()
    }

    fn collect_warnings(&self, request: &EvaluationRequest) -> Vec<String> {
        let record = &request.record;
        let Some(profile) = request.profile.as_ref() else {
            return Vec::new();
        };
        let health = &profile.health_profile;
        let mut warnings = Vec::new();

        // Condition guard (e.g. sugar for diabetes, salt for hypertension)
        for limit in &self.rules.condition_limits {
            if !health.has_condition(&limit.condition) {
                continue;
            }
            let value = record.fact(&limit.fact).unwrap_or(0.0);
            if value > limit.max {
                warnings.push(format!(
                    "{} ({}g/100g) - Risk for {}",
                    limit.label, value, limit.condition
                ));
            }
        }

        // Age guard
        if let Some(age) = health.age {
            if age < self.rules.minor_age {
                for keyword in &self.rules.minor_restricted {
                    if find_ingredient(&record.ingredients, keyword).is_some() {
                        warnings.push(format!(
                            "Contains {} - Not recommended for age {}",
                            keyword, age
                        ));
                    }
                }
            }
        }

        // Contraindication guard
        for interaction in &self.rules.interactions {
            if health.has_restriction(&interaction.restriction)
                && record
                    .ingredients
                    .iter()
                    .any(|i| i.eq_ignore_ascii_case(&interaction.ingredient))
            {
                warnings.push(format!("Potential Interaction: {}", interaction.warning));
            }
        }

        // Cosmetic safety guard, applied to every category
        for toxin in &self.rules.toxins {
            for ingredient in &record.ingredients {
                if contains_ignore_case(ingredient, toxin) {
                    warnings.push(format!(
                        "Contains {} (Potential Toxin: {})",
                        ingredient,
                        title_case(toxin)
                    ));
                }
            }
        }

        warnings
    }
}

impl Default for HealthShield {
    fn default() -> Self {
        Self::new(HealthRules::default())
    }
}

impl Evaluator for HealthShield {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::HealthSafety
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let Some(profile) = request.profile.as_ref() else {
            return missing_profile_verdict(self, "health check");
        };

        let detected =
            self.detect_allergens(&request.record.ingredients, &profile.health_profile.allergens);
        if !detected.is_empty() {
            tracing::debug!(
                product = %request.record.id,
                allergens = ?detected,
                "Allergens detected"
            );
            return Verdict::new(
                self.name(),
                0.0,
                Status::Red,
                format!("Detected allergens: {}", detected.join(", ")),
            )
            .with_detail("detected_allergens", detected);
        }

        let warnings = self.collect_warnings(request);
        if !warnings.is_empty() {
            return Verdict::new(self.name(), 50.0, Status::Yellow, warnings.join("; "))
                .with_detail("warnings", warnings);
        }

        Verdict::new(
            self.name(),
            100.0,
            Status::Green,
            "Safe. No allergens or health risks detected.",
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::test_support::{anonymous, record, request};
    use crate::profile::UserProfile;

    #[test]
    fn test_allergen_match_is_red_and_named() {
        let record = record(&["Sugar", "Roasted Peanuts", "Salt"]);
        let profile = UserProfile::default().with_allergens(["PEANUT"]);

        let verdict = HealthShield::default().evaluate(&request(record, profile));

        assert_eq!(verdict.status, Status::Red);
        assert_eq!(verdict.score, 0.0);
        assert!(verdict.reasoning.contains("Roasted Peanuts"));
        assert_eq!(
            verdict.details["detected_allergens"],
            serde_json::json!(["Roasted Peanuts"])
        );
    }

    #[test]
    fn test_clean_record_no_conditions_is_green_100() {
        let record = record(&["Water", "Oats", "Salt"]);
        let verdict = HealthShield::default().evaluate(&request(record, UserProfile::default()));

        assert_eq!(verdict.status, Status::Green);
        assert_eq!(verdict.score, 100.0);
    }

    #[test]
    fn test_missing_profile_is_neutral() {
        let verdict = HealthShield::default().evaluate(&anonymous(record(&["Sugar"])));

        assert_eq!(verdict.status, Status::Yellow);
        assert_eq!(verdict.score, 50.0);
        assert_eq!(verdict.details["neutral"], true);
    }

    #[test]
    fn test_diabetes_high_sugar_warns() {
        let record = record(&["Sugar", "Hazelnuts"]).with_fact("sugars_100g", 56.3);
        let profile = UserProfile::default().with_conditions(["Diabetes"]);

        let verdict = HealthShield::default().evaluate(&request(record, profile));

        assert_eq!(verdict.status, Status::Yellow);
        assert_eq!(verdict.score, 50.0);
        assert!(verdict.reasoning.contains("High Sugar"));
    }

    #[test]
    fn test_sugar_at_limit_is_fine() {
        let record = record(&["Water"]).with_fact("sugars_100g", 10.0);
        let profile = UserProfile::default().with_conditions(["Diabetes"]);

        let verdict = HealthShield::default().evaluate(&request(record, profile));
        assert_eq!(verdict.status, Status::Green);
    }

    #[test]
    fn test_minor_and_caffeine() {
        let record = record(&["Carbonated Water", "Caffeine"]);
        let profile = UserProfile::default().with_age(15);

        let verdict = HealthShield::default().evaluate(&request(record, profile));

        assert_eq!(verdict.status, Status::Yellow);
        assert!(verdict.reasoning.contains("Not recommended for age 15"));
    }

    #[test]
    fn test_maoi_cheese_interaction() {
        let record = record(&["Pasta", "Cheese"]);
        let mut profile = UserProfile::default();
        profile.health_profile.dietary_restrictions = vec!["MAOI".to_string()];

        let verdict = HealthShield::default().evaluate(&request(record, profile));

        assert_eq!(verdict.status, Status::Yellow);
        assert!(verdict.reasoning.contains("Tyramine"));
    }

    #[test]
    fn test_cosmetic_toxin_flagged() {
        let record = record(&["Aqua", "Sodium Laureth Sulfate"]);
        let verdict = HealthShield::default().evaluate(&request(record, UserProfile::default()));

        assert_eq!(verdict.status, Status::Yellow);
        assert!(verdict.reasoning.contains("Potential Toxin: Sulfate"));
    }

    #[test]
    fn test_allergen_beats_warnings() {
        let record = record(&["Soy Lecithin", "Methylparaben"]);
        let profile = UserProfile::default().with_allergens(["soy"]);

        let verdict = HealthShield::default().evaluate(&request(record, profile));
        assert_eq!(verdict.status, Status::Red);
    }
}
