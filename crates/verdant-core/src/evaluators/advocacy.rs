//! Advocacy
//!
//! Helper evaluator: drafts a social post (and optionally an email) to the
//! brand whenever the ingredients or packaging hit an advocacy trigger.
//! Always GREEN 100; the actions are carried in `details`.

use serde_json::json;

use crate::rules::{AdvocacyRules, AdvocacyTrigger, TriggerTarget};
use crate::types::{CanonicalProductRecord, EvaluationRequest, Status, Verdict};

use super::matching::{contains_ignore_case, find_ingredient, to_handle};
use super::{Evaluator, EvaluatorKind};

/// The Advocacy evaluator.
pub struct AdvocacyDrafter {
    rules: AdvocacyRules,
}

impl AdvocacyDrafter {
    pub fn new(rules: AdvocacyRules) -> Self {
        Self { rules }
    }

    fn triggered(&self, record: &CanonicalProductRecord) -> Vec<&AdvocacyTrigger> {
        self.rules
            .triggers
            .iter()
            .filter(|trigger| match trigger.target {
                TriggerTarget::Ingredients => {
                    find_ingredient(&record.ingredients, &trigger.keyword).is_some()
                }
                TriggerTarget::Packaging => record
                    .packaging
                    .as_deref()
                    .is_some_and(|p| contains_ignore_case(p, &trigger.keyword)),
            })
            .collect()
    }
}

fn render(template: &str, handle: &str, brand: &str, product: &str, label: &str) -> String {
    template
        .replace("{handle}", handle)
        .replace("{brand}", brand)
        .replace("{product}", product)
        .replace("{label}", label)
}

impl Default for AdvocacyDrafter {
    fn default() -> Self {
        Self::new(AdvocacyRules::default())
    }
}

impl Evaluator for AdvocacyDrafter {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Advocacy
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let record = &request.record;
        let brand = record
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty())
            .unwrap_or("the brand");
        let handle = to_handle(brand);

        let mut actions = Vec::new();
        for trigger in self.triggered(record) {
            actions.push(json!({
                "type": "social_post",
                "issue": trigger.label,
                "content": render(&trigger.post_template, &handle, brand, &record.name, &trigger.label),
            }));

            if let Some(email) = &trigger.email_template {
                actions.push(json!({
                    "type": "email",
                    "issue": trigger.label,
                    "content": render(email, &handle, brand, &record.name, &trigger.label),
                }));
            }
        }

        let reasoning = if actions.is_empty() {
            "No specific advocacy actions needed.".to_string()
        } else {
            format!("Generated {} advocacy actions.", actions.len())
        };

        Verdict::new(self.name(), 100.0, Status::Green, reasoning).with_detail("actions", actions)
    }
}
