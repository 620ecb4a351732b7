//! Ownership Trace
//!
//! **Question**: Who owns this brand and what is their track record?
//!
//! The record's brand is matched against the ownership table (a table brand
//! contained in the record brand, ignoring case). Every known issue of the
//! owner costs `penalty_per_issue` points. House banding applies.

use crate::rules::{BrandRecord, OwnershipRules};
use crate::types::{EvaluationRequest, Status, Verdict};

use super::matching::contains_ignore_case;
use super::{Evaluator, EvaluatorKind};

/// The Ownership Trace evaluator.
pub struct OwnershipTrace {
    rules: OwnershipRules,
}

impl OwnershipTrace {
    pub fn new(rules: OwnershipRules) -> Self {
        Self { rules }
    }

    fn lookup(&self, brand: &str) -> Option<&BrandRecord> {
        self.rules
            .brands
            .iter()
            .find(|record| contains_ignore_case(brand, &record.brand))
    }
}

impl Default for OwnershipTrace {
    fn default() -> Self {
        Self::new(OwnershipRules::default())
    }
}

impl Evaluator for OwnershipTrace {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Ownership
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let brand = request
            .record
            .brand
            .as_deref()
            .map(str::trim)
            .filter(|b| !b.is_empty() && !b.eq_ignore_ascii_case("unknown"));

        let Some(brand) = brand else {
            return Verdict::neutral(self.name(), "No brand information found.")
                .with_detail("neutral", true);
        };

        let Some(owner) = self.lookup(brand) else {
            return Verdict::new(
                self.name(),
                100.0,
                Status::Green,
                format!("No negative records found for brand '{}'.", brand),
            )
            .with_detail("brand_checked", brand);
        };

        let penalty = self.rules.penalty_per_issue * owner.issues.len() as f64;
        let reasoning = if owner.issues.is_empty() {
            format!(
                "Brand '{}' is owned by '{}', with no recorded issues.",
                owner.brand, owner.parent
            )
        } else {
            format!(
                "Brand '{}' is owned by '{}', associated with: {}.",
                owner.brand,
                owner.parent,
                owner.issues.join(", ")
            )
        };

        Verdict::banded(self.name(), 100.0 - penalty, self.banding(), reasoning)
            .with_detail("parent_company", owner.parent.as_str())
            .with_detail("investors", owner.investors.clone())
            .with_detail("issues", owner.issues.clone())
            .with_detail(
                "ownership_trace",
                format!("{} -> {}", owner.brand, owner.parent),
            )
    }
}
