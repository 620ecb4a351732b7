//! Alternatives
//!
//! Helper evaluator: suggests products to consider instead, keyed off the
//! product name. Never penalizes, so the verdict is always GREEN 100.

use serde_json::json;

use crate::rules::{AlternativeCategory, AlternativeRules};
use crate::types::{EvaluationRequest, Status, Verdict};

use super::{Evaluator, EvaluatorKind};

/// The Alternatives evaluator.
pub struct AlternativeFinder {
    rules: AlternativeRules,
}

impl AlternativeFinder {
    pub fn new(rules: AlternativeRules) -> Self {
        Self { rules }
    }

    fn category_for(&self, name: &str) -> Option<&AlternativeCategory> {
        let lowered = name.to_lowercase();
        self.rules.categories.iter().find(|category| {
            category
                .keywords
                .iter()
                .any(|keyword| lowered.contains(&keyword.to_lowercase()))
        })
    }
}

impl Default for AlternativeFinder {
    fn default() -> Self {
        Self::new(AlternativeRules::default())
    }
}

impl Evaluator for AlternativeFinder {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Alternatives
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let Some(category) = self.category_for(&request.record.name) else {
            return Verdict::new(
                self.name(),
                100.0,
                Status::Green,
                "No specific alternatives found for this category.",
            )
            .with_detail("suggestions", Vec::<serde_json::Value>::new());
        };

        let suggestions: Vec<serde_json::Value> = category
            .suggestions
            .iter()
            .map(|s| json!({ "name": s.name, "reason": s.reason }))
            .collect();

        Verdict::new(
            self.name(),
            100.0,
            Status::Green,
            format!(
                "Found {} alternatives in the {} category.",
                suggestions.len(),
                category.name
            ),
        )
        .with_detail("category", category.name.as_str())
        .with_detail("suggestions", suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluators::test_support::anonymous;
    use crate::types::CanonicalProductRecord;

    fn named(name: &str) -> CanonicalProductRecord {
        CanonicalProductRecord::new("1", name, "Test Source")
    }

    #[test]
    fn test_spread_suggestions() {
        let verdict = AlternativeFinder::default().evaluate(&anonymous(named("Nutella Hazelnut Spread")));

        assert_eq!(verdict.status, Status::Green);
        assert_eq!(verdict.score, 100.0);
        assert_eq!(verdict.details["category"], "Spread");
        assert_eq!(verdict.details["suggestions"].as_array().unwrap().len(), 2);
    }

    #[test]
    fn test_no_match_still_green() {
        let verdict = AlternativeFinder::default().evaluate(&anonymous(named("Bamboo Toothbrush")));

        assert_eq!(verdict.status, Status::Green);
        assert!(verdict.details["suggestions"].as_array().unwrap().is_empty());
    }
}
