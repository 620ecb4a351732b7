//! Value Judge
//!
//! **Question**: Does this product conflict with the user's values?
//!
//! Starts from 100 and subtracts `max_penalty * weight` once for every
//! weighted value category whose keywords appear in the ingredients.
//! House banding applies.

use serde_json::json;

use crate::rules::ValueRules;
use crate::types::{EvaluationRequest, Verdict};

use super::matching::any_ingredient_matches;
use super::{missing_profile_verdict, Evaluator, EvaluatorKind};

/// The Value Judge evaluator.
pub struct ValueJudge {
    rules: ValueRules,
}

impl ValueJudge {
    pub fn new(rules: ValueRules) -> Self {
        Self { rules }
    }
}

impl Default for ValueJudge {
    fn default() -> Self {
        Self::new(ValueRules::default())
    }
}

impl Evaluator for ValueJudge {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::ValueAlignment
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let Some(profile) = request.profile.as_ref() else {
            return missing_profile_verdict(self, "value judgment");
        };

        let weights = &profile.value_profile.weights;
        let mut score = 100.0;
        let mut reasons = Vec::new();
        let mut conflicts = Vec::new();

        for (category, weight) in weights {
            if *weight <= 0.0 {
                continue;
            }
            let Some(keywords) = self.rules.keywords.get(category) else {
                continue;
            };

            if let Some(keyword) = any_ingredient_matches(&request.record.ingredients, keywords) {
                let penalty = self.rules.max_penalty * weight;
                score -= penalty;
                reasons.push(format!("Found {} ({} conflict)", keyword, category));
                conflicts.push(json!({
                    "category": category,
                    "keyword": keyword,
                    "penalty": penalty,
                }));
            }
        }

        let reasoning = if reasons.is_empty() {
            "Aligned with values.".to_string()
        } else {
            reasons.join("; ")
        };

        let verdict = Verdict::banded(self.name(), score, self.banding(), reasoning);
        let final_score = verdict.score;

        verdict
            .with_detail("weights_applied", json!(weights))
            .with_detail("conflicts", conflicts)
            .with_detail("final_score", final_score)
    }
}
