//! Selection of the current derivative of an original.

use crate::reconcile::naming::{derivative_stem, original_base_of};
use crate::reconcile::record::DerivativeRecord;
use serde::{Deserialize, Serialize};

/// How a derivative name is matched against an original's base name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchPolicy {
    /// The name contains `filtered_<base>` anywhere.
    ///
    /// Matches what existing stores expect, but an original named `img1`
    /// also claims derivatives of `img10`.
    #[default]
    Loose,
    /// After removing any storage-key prefix, the name is exactly
    /// `filtered_<base>.<ext>`.
    Strict,
}

impl MatchPolicy {
    pub fn matches(&self, original_base_name: &str, derivative_name: &str) -> bool {
        match self {
            MatchPolicy::Loose => derivative_name.contains(&derivative_stem(original_base_name)),
            MatchPolicy::Strict => original_base_of(derivative_name) == Some(original_base_name),
        }
    }
}

/// Picks, per original, the single authoritative derivative.
#[derive(Debug, Clone, Copy, Default)]
pub struct DerivativeResolver {
    policy: MatchPolicy,
}

impl DerivativeResolver {
    pub fn new(policy: MatchPolicy) -> Self {
        Self { policy }
    }

    pub fn strict() -> Self {
        Self::new(MatchPolicy::Strict)
    }

    pub fn policy(&self) -> MatchPolicy {
        self.policy
    }

    /// The completed, matching candidate with the greatest id.
    ///
    /// Pending, processing and failed records are never chosen. Returns
    /// `None` when nothing survives.
    pub fn resolve_current<'a>(
        &self,
        original_base_name: &str,
        candidates: &'a [DerivativeRecord],
    ) -> Option<&'a DerivativeRecord> {
        candidates
            .iter()
            .filter(|record| record.is_completed())
            .filter(|record| self.policy.matches(original_base_name, &record.name))
            .max_by_key(|record| record.id)
    }
}
