//! Candidate scoring: Σ of reward or penalty per configured agreement.

use bioref_core::{CoreferenceType, UnitId};

use super::{Agreement, ResolutionContext, Scores, Strategy};
use crate::mention::Mention;

/// One (agreement, reward, penalty) triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ScoringRule {
    /// Check to evaluate
    pub agreement: Agreement,
    /// Added when the check holds
    pub reward: i32,
    /// Subtracted when it does not
    pub penalty: i32,
}

impl ScoringRule {
    /// Create a rule.
    #[must_use]
    pub const fn new(agreement: Agreement, reward: i32, penalty: i32) -> Self {
        Self {
            agreement,
            reward,
            penalty,
        }
    }

    /// Contribution of this rule to one candidate's score.
    #[must_use]
    pub fn score(
        &self,
        ctx: &ResolutionContext<'_>,
        mention: &Mention,
        candidate: UnitId,
        coreference_type: CoreferenceType,
    ) -> i32 {
        if self
            .agreement
            .holds(ctx, mention, candidate, coreference_type)
        {
            self.reward
        } else {
            -self.penalty
        }
    }
}

/// Score every candidate under the strategy's scoring rules.
///
/// The result is keyed by candidate, so it does not depend on the order
/// candidates are given in.
#[must_use]
pub fn score_candidates(
    strategy: &Strategy,
    ctx: &ResolutionContext<'_>,
    mention: &Mention,
    coreference_type: CoreferenceType,
    candidates: &[UnitId],
) -> Scores {
    candidates
        .iter()
        .map(|c| {
            let total = strategy
                .scoring
                .iter()
                .map(|rule| rule.score(ctx, mention, *c, coreference_type))
                .sum();
            (*c, total)
        })
        .collect()
}
