//! The evaluators, one per concern.
//!
//! Each evaluator answers one question about the product for the requesting
//! user and returns a [`Verdict`]. Evaluators are pure: they read the request
//! and their own rule table, never each other's output.
//!
//! | Evaluator | Question |
//! |-----------|----------|
//! | [`HealthShield`] | Is this safe for this user's body? |
//! | [`ValueJudge`] | Does this conflict with the user's ethical priorities? |
//! | [`OwnershipTrace`] | Who really owns the brand, and what is their record? |
//! | [`DisposalGuide`] | How is the packaging disposed of locally? |
//! | [`AlternativeFinder`] | What could be bought instead? |
//! | [`FootprintEstimator`] | How much carbon does this carry? |
//! | [`OriginScout`] | How far did it travel? |
//! | [`AdvocacyDrafter`] | What could the user say to the brand? |

mod advocacy;
mod alternatives;
mod disposal;
mod footprint;
mod health;
pub mod matching;
mod origin;
mod ownership;
mod values;

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::types::{Banding, EvaluationRequest, Verdict};

pub use advocacy::AdvocacyDrafter;
pub use alternatives::AlternativeFinder;
pub use disposal::DisposalGuide;
pub use footprint::FootprintEstimator;
pub use health::HealthShield;
pub use origin::OriginScout;
pub use ownership::OwnershipTrace;
pub use values::ValueJudge;

/// The closed set of evaluator kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EvaluatorKind {
    HealthSafety,
    ValueAlignment,
    Ownership,
    Disposal,
    Alternatives,
    Footprint,
    Origin,
    Advocacy,
}

impl EvaluatorKind {
    /// Every kind, in standard invocation order.
    pub const ALL: [EvaluatorKind; 8] = [
        EvaluatorKind::HealthSafety,
        EvaluatorKind::ValueAlignment,
        EvaluatorKind::Ownership,
        EvaluatorKind::Disposal,
        EvaluatorKind::Alternatives,
        EvaluatorKind::Footprint,
        EvaluatorKind::Origin,
        EvaluatorKind::Advocacy,
    ];

    /// Name reported as `agent_name` in verdicts.
    pub fn display_name(&self) -> &'static str {
        match self {
            EvaluatorKind::HealthSafety => "Health Shield",
            EvaluatorKind::ValueAlignment => "Value Judge",
            EvaluatorKind::Ownership => "Ownership Trace",
            EvaluatorKind::Disposal => "Disposal Guide",
            EvaluatorKind::Alternatives => "Alternatives",
            EvaluatorKind::Footprint => "Carbon Footprint",
            EvaluatorKind::Origin => "Origin Scout",
            EvaluatorKind::Advocacy => "Advocacy",
        }
    }

    /// The question this evaluator answers.
    pub fn question(&self) -> &'static str {
        match self {
            EvaluatorKind::HealthSafety => "Is this product safe for this user's health?",
            EvaluatorKind::ValueAlignment => "Does this product conflict with the user's values?",
            EvaluatorKind::Ownership => "Who owns this brand and what is their track record?",
            EvaluatorKind::Disposal => "How should the packaging be disposed of?",
            EvaluatorKind::Alternatives => "Which alternatives could the user consider?",
            EvaluatorKind::Footprint => "What is the carbon footprint of this product?",
            EvaluatorKind::Origin => "Is this product locally sourced?",
            EvaluatorKind::Advocacy => "Which advocacy actions could the user take?",
        }
    }
}

impl fmt::Display for EvaluatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.display_name())
    }
}

/// Trait implemented by every evaluator.
///
/// # Contract
/// - MUST NOT mutate the request or any shared state
/// - MUST NOT depend on sibling evaluators or their order
/// - MUST return a neutral YELLOW verdict instead of failing on missing input
/// - MUST emit statuses consistent with [`Evaluator::banding`]
pub trait Evaluator: Send + Sync {
    /// The kind of this evaluator.
    fn kind(&self) -> EvaluatorKind;

    /// The name used as `agent_name`.
    fn name(&self) -> &'static str {
        self.kind().display_name()
    }

    /// The question this evaluator answers.
    fn question(&self) -> &'static str {
        self.kind().question()
    }

    /// Score-to-status banding this evaluator honors.
    fn banding(&self) -> Banding {
        Banding::HOUSE
    }

    /// Evaluate the request.
    fn evaluate(&self, request: &EvaluationRequest) -> Verdict;
}

/// Neutral verdict for an evaluator that lacks a user profile.
pub(crate) fn missing_profile_verdict(evaluator: &dyn Evaluator, check: &str) -> Verdict {
    Verdict::neutral(
        evaluator.name(),
        format!("No user profile provided for {}.", check),
    )
    .with_detail("neutral", true)
    .with_detail("missing_input", "user_profile")
}

#[cfg(test)]
pub(crate) mod test_support {
    use crate::profile::UserProfile;
    use crate::types::{CanonicalProductRecord, Category, EvaluationRequest};

    pub fn record(ingredients: &[&str]) -> CanonicalProductRecord {
        CanonicalProductRecord::new("0000000000000", "Test Product", "Test Source")
            .with_category(Category::Food)
            .with_ingredients(ingredients.iter().copied())
    }

    pub fn request(record: CanonicalProductRecord, profile: UserProfile) -> EvaluationRequest {
        EvaluationRequest::new(record, Some(profile))
    }

    pub fn anonymous(record: CanonicalProductRecord) -> EvaluationRequest {
        EvaluationRequest::new(record, None)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_display_names_unique() {
        let mut names: Vec<&str> = EvaluatorKind::ALL.iter().map(|k| k.display_name()).collect();
        names.sort();
        names.dedup();
        assert_eq!(names.len(), EvaluatorKind::ALL.len());
    }

    #[test]
    fn test_kind_serializes_snake_case() {
        let json = serde_json::to_string(&EvaluatorKind::HealthSafety).unwrap();
        assert_eq!(json, "\"health_safety\"");
    }
}
