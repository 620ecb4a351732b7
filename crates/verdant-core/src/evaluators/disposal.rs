//! Disposal Guide
//!
//! **Question**: How should the packaging be disposed of?
//!
//! The packaging descriptor is matched against the disposal rules of the
//! user's region (first rule wins). Materials match whole words only, so
//! `can` does not fire on "Canvas" and negations are listed ahead of the
//! materials they qualify.
//!
//! | State | Score | Condition |
//! |-------|-------|-----------|
//! | **GREEN** | 100 | Matched a recyclable rule |
//! | **RED** | 0 | Matched a non-recyclable rule |
//! | **YELLOW** | 50 | No packaging info, or nothing matched |

use crate::rules::DisposalRules;
use crate::types::{EvaluationRequest, Status, Verdict};

use super::matching::contains_word;
use super::{Evaluator, EvaluatorKind};

/// The Disposal Guide evaluator.
pub struct DisposalGuide {
    rules: DisposalRules,
}

impl DisposalGuide {
    pub fn new(rules: DisposalRules) -> Self {
        Self { rules }
    }
}

impl Default for DisposalGuide {
    fn default() -> Self {
        Self::new(DisposalRules::default())
    }
}

impl Evaluator for DisposalGuide {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Disposal
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let location = request
            .profile
            .as_ref()
            .and_then(|p| p.location.as_deref());
        let (region, rules) = self.rules.for_location(location);

        let packaging = request
            .record
            .packaging
            .as_deref()
            .map(str::trim)
            .filter(|p| !p.is_empty());

        let Some(packaging) = packaging else {
            return Verdict::neutral(self.name(), "No packaging information available.")
                .with_detail("location_used", region);
        };

        match rules
            .iter()
            .find(|rule| contains_word(packaging, &rule.material))
        {
            Some(rule) => {
                let (score, status) = if rule.recyclable {
                    (100.0, Status::Green)
                } else {
                    (0.0, Status::Red)
                };

                Verdict::new(
                    self.name(),
                    score,
                    status,
                    format!("{} ({})", rule.instruction, region),
                )
                .with_detail("packaging_detected", packaging)
                .with_detail("location_used", region)
                .with_detail("disposal_instructions", rule.instruction.as_str())
            }
            None => Verdict::neutral(
                self.name(),
                format!("Unknown disposal method for '{}' in {}.", packaging, region),
            )
            .with_detail("packaging_detected", packaging)
            .with_detail("location_used", region),
        }
    }
}
