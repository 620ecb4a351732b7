//! Carbon Footprint
//!
//! **Question**: What is the carbon footprint of this product?
//!
//! Estimates kg CO2e from ingredient and packaging emission factors:
//!
//! - each ingredient contributes `factor * (product_weight / ingredient_count)`
//!   using the first factor it mentions
//! - the packaging contributes `factor * packaging_weight`
//! - when nothing matched at all, `baseline_kg` is used
//!
//! The estimate is rounded to two decimals. Below `low_below` is GREEN 100,
//! below `high_at` YELLOW 50, anything higher RED 0.

use crate::rules::{EmissionFactor, FootprintRules};
use crate::types::{EvaluationRequest, Status, Verdict};

use super::{Evaluator, EvaluatorKind};

/// The Carbon Footprint evaluator.
pub struct FootprintEstimator {
    rules: FootprintRules,
}

impl FootprintEstimator {
    pub fn new(rules: FootprintRules) -> Self {
        Self { rules }
    }

    /// Estimated kg CO2e, rounded to two decimals.
    pub fn estimate(&self, ingredients: &[String], packaging: Option<&str>) -> f64 {
        let mut total = 0.0;

        if !ingredients.is_empty() {
            let share = self.rules.product_weight_kg / ingredients.len() as f64;
            for ingredient in ingredients {
                if let Some(factor) = first_match(&self.rules.ingredient_factors, ingredient) {
                    total += factor.kg_co2e_per_kg * share;
                }
            }
        }

        if let Some(packaging) = packaging {
            if let Some(factor) = first_match(&self.rules.packaging_factors, packaging) {
                total += factor.kg_co2e_per_kg * self.rules.packaging_weight_kg;
            }
        }

        if total == 0.0 {
            total = self.rules.baseline_kg;
        }

        (total * 100.0).round() / 100.0
    }
}

fn first_match<'a>(factors: &'a [EmissionFactor], text: &str) -> Option<&'a EmissionFactor> {
    factors.iter().find(|factor| factor.matches(text))
}

impl Default for FootprintEstimator {
    fn default() -> Self {
        Self::new(FootprintRules::default())
    }
}

impl Evaluator for FootprintEstimator {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Footprint
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let record = &request.record;
        let footprint = self.estimate(&record.ingredients, record.packaging.as_deref());

        let (score, status, label) = if footprint < self.rules.low_below {
            (100.0, Status::Green, "Low")
        } else if footprint < self.rules.high_at {
            (50.0, Status::Yellow, "Moderate")
        } else {
            (0.0, Status::Red, "High")
        };

        Verdict::new(
            self.name(),
            score,
            status,
            format!("{} Carbon Footprint: {:.2} kg CO2e", label, footprint),
        )
        .with_detail("footprint_kg_co2e", footprint)
        .with_detail("unit", "kg CO2e")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::test_support::{anonymous, record};

    #[test]
    fn test_plain_oat_drink_is_low() {
        let record = record(&["Water", "Oats", "Salt"]).with_packaging("Carton");
        let estimator = FootprintEstimator::default();

        // 0.9 * (0.1 / 3) = 0.03
        assert_eq!(estimator.estimate(&record.ingredients, record.packaging.as_deref()), 0.03);

        let verdict = estimator.evaluate(&anonymous(record));
        assert_eq!(verdict.status, Status::Green);
        assert_eq!(verdict.score, 100.0);
    }

    #[test]
    fn test_nothing_matched_uses_baseline() {
        let record = record(&["Water"]);
        let verdict = FootprintEstimator::default().evaluate(&anonymous(record));

        assert_eq!(verdict.details["footprint_kg_co2e"], 0.5);
        assert_eq!(verdict.status, Status::Green);
    }

    #[test]
    fn test_beef_only_is_high() {
        // 60 * 0.1 = 6.0 plus plastic 6 * 0.02 = 0.12
        let record = record(&["Beef"]).with_packaging("Plastic tray");
        let verdict = FootprintEstimator::default().evaluate(&anonymous(record));

        assert_eq!(verdict.details["footprint_kg_co2e"], 6.12);
        assert_eq!(verdict.status, Status::Red);
        assert_eq!(verdict.score, 0.0);
    }

    #[test]
    fn test_cheese_is_moderate() {
        // 21 * 0.05 + 0.5 * 0.05 = 1.075 -> 1.08
        let record = record(&["Cheese", "Vegetables"]);
        let verdict = FootprintEstimator::default().evaluate(&anonymous(record));

        assert_eq!(verdict.status, Status::Yellow);
        assert_eq!(verdict.score, 50.0);
    }

    #[test]
    fn test_aluminium_can_alias() {
        let estimator = FootprintEstimator::default();
        assert_eq!(estimator.estimate(&[], Some("Aluminium can")), 0.05);
    }

    #[test]
    fn test_packaging_alias_needs_whole_word() {
        let estimator = FootprintEstimator::default();
        assert_eq!(estimator.estimate(&[], Some("Canvas pouch")), 0.5);
        assert_eq!(estimator.estimate(&[], Some("Candle wax wrap")), 0.5);
    }
}
