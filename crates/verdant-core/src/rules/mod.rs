//! Evaluator rule tables.
//!
//! Keyword lists, thresholds and lookup tables live here rather than inside
//! the evaluators, so they can be swapped by loading a YAML rule book.

mod book;
mod tables;

pub use book::{RuleBook, RuleBookError};
pub use tables::{
    AdvocacyRules, AdvocacyTrigger, AlternativeCategory, AlternativeRules, BrandRecord,
    DisposalRule, DisposalRules, EmissionFactor, FootprintRules, HealthRules, Interaction,
    NutrientLimit, OriginRules, OwnershipRules, Suggestion, TriggerTarget, ValueRules,
    DEFAULT_REGION,
};
