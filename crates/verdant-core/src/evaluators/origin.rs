//! Origin Scout
//!
//! **Question**: Is this product locally sourced?
//!
//! The home country comes from the profile's `country`, then from a known
//! country named in its `location`, then from the rule default. An origin
//! is local when it names the home country or one of its aliases
//! (`USA`, `US`, ...). Uses a wider YELLOW band than the house convention:
//! `< 30` RED, `>= 80` GREEN.

use crate::profile::UserProfile;
use crate::rules::OriginRules;
use crate::types::{Banding, EvaluationRequest, Verdict};

use super::{Evaluator, EvaluatorKind};

/// The Origin Scout evaluator.
pub struct OriginScout {
    rules: OriginRules,
}

impl OriginScout {
    pub const BANDING: Banding = Banding::new(30.0, 80.0);

    pub fn new(rules: OriginRules) -> Self {
        Self { rules }
    }

    /// Home country for a user, canonicalized through the country table.
    pub fn home_country<'a>(&'a self, profile: Option<&'a UserProfile>) -> &'a str {
        let explicit = profile
            .and_then(|p| p.country.as_deref())
            .map(str::trim)
            .filter(|c| !c.is_empty());
        if let Some(country) = explicit {
            return self.rules.country(country).map_or(country, |(name, _)| name);
        }

        profile
            .and_then(|p| p.location.as_deref())
            .and_then(|location| self.rules.country_in(location))
            .unwrap_or(self.rules.home_country.as_str())
    }
}

impl Default for OriginScout {
    fn default() -> Self {
        Self::new(OriginRules::default())
    }
}

impl Evaluator for OriginScout {
    fn kind(&self) -> EvaluatorKind {
        EvaluatorKind::Origin
    }

    fn banding(&self) -> Banding {
        Self::BANDING
    }

    fn evaluate(&self, request: &EvaluationRequest) -> Verdict {
        let origin = request
            .record
            .origin
            .as_deref()
            .map(str::trim)
            .filter(|o| !o.is_empty());

        let Some(origin) = origin else {
            return Verdict::neutral(self.name(), "Origin unknown.").with_detail("neutral", true);
        };

        let home = self.home_country(request.profile.as_ref());

        let (score, reasoning) = if self.rules.is_domestic(origin, home) {
            (100.0, format!("Locally sourced from {}.", origin))
        } else {
            (
                self.rules.imported_score,
                format!("Imported from {}.", origin),
            )
        };

        Verdict::banded(self.name(), score, self.banding(), reasoning)
            .with_detail("origin", origin)
            .with_detail("home", home)
    }
}
