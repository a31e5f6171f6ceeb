//! Post-scoring selection.

use std::collections::BTreeMap;

use bioref_core::UnitId;

use super::{ResolutionContext, Strategy};
use crate::mention::Mention;

/// Candidate → score. Ordered by unit handle so iteration is deterministic.
pub type Scores = BTreeMap<UnitId, i32>;

/// Tie-breaking heuristic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Salience {
    /// Nearest sentence, then shallowest in the dependency tree, then leftmost
    ParseTree,
    /// Smallest character distance to the mention
    Proximity,
}

/// Transforms a score map.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PostFilter {
    /// Drop candidates scoring below the threshold
    Threshold(i32),
    /// Keep only the maximal score
    TopScore,
    /// Keep only the most salient candidates
    Salience(Salience),
}

impl PostFilter {
    /// Apply to a score map.
    #[must_use]
    pub fn apply(&self, ctx: &ResolutionContext<'_>, mention: &Mention, scores: Scores) -> Scores {
        match self {
            PostFilter::Threshold(t) => scores.into_iter().filter(|(_, s)| s >= t).collect(),
            PostFilter::TopScore => {
                let Some(best) = scores.values().copied().max() else {
                    return scores;
                };
                scores.into_iter().filter(|(_, s)| *s == best).collect()
            }
            PostFilter::Salience(salience) => {
                let key = |unit: UnitId| -> (usize, usize, usize) {
                    let Some(u) = ctx.doc.unit(unit) else {
                        return (usize::MAX, usize::MAX, usize::MAX);
                    };
                    match salience {
                        Salience::ParseTree => (
                            ctx.sentence(mention.unit).abs_diff(u.sentence),
                            ctx.doc.depth(unit),
                            u.span.start,
                        ),
                        Salience::Proximity => (u.span.distance(&mention.span), 0, 0),
                    }
                };
                let Some(best) = scores.keys().map(|u| key(*u)).min() else {
                    return scores;
                };
                scores.into_iter().filter(|(u, _)| key(*u) == best).collect()
            }
        }
    }
}

/// Run the strategy's post filters in sequence. The key set of the result
/// is the mention's referent set.
#[must_use]
pub fn apply_post_filters(
    strategy: &Strategy,
    ctx: &ResolutionContext<'_>,
    mention: &Mention,
    scores: Scores,
) -> Scores {
    strategy
        .post_filters
        .iter()
        .fold(scores, |acc, filter| filter.apply(ctx, mention, acc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::DomainLexicon;
    use crate::mention::{detect_mentions, mentions_of};
    use bioref_core::Document;

    #[test]
    fn test_threshold_top_and_salience() {
        let mut doc = Document::new("d", "The protein binds the receptor. It dimerizes.");
        let s0 = doc.add_sentence_text("The protein binds the receptor.").unwrap();
        let s1 = doc.add_sentence_text("It dimerizes.").unwrap();
        let protein = doc.add_phrase(s0, "The protein", "DT NN").unwrap();
        let binds = doc.add_phrase(s0, "binds", "VBZ").unwrap();
        let receptor = doc.add_phrase(s0, "the receptor", "DT NN").unwrap();
        let it = doc.add_phrase(s1, "It", "PRP").unwrap();
        doc.add_dependency("nsubj", binds, protein).unwrap();
        doc.add_dependency("dobj", binds, receptor).unwrap();
        detect_mentions(&mut doc).unwrap();

        let lexicon = DomainLexicon::biomedical();
        let ctx = ResolutionContext::new(&doc, &lexicon);
        let mention = mentions_of(&doc, it)[0];
        let scores: Scores = [(protein, 2), (receptor, 2), (binds, -1)].into_iter().collect();

        let kept = PostFilter::Threshold(0).apply(&ctx, &mention, scores.clone());
        assert_eq!(kept.len(), 2);
        let top = PostFilter::TopScore.apply(&ctx, &mention, kept.clone());
        assert_eq!(top.len(), 2);

        let tree = PostFilter::Salience(Salience::ParseTree).apply(&ctx, &mention, top.clone());
        assert_eq!(tree.keys().copied().collect::<Vec<_>>(), vec![protein]);
        let near = PostFilter::Salience(Salience::Proximity).apply(&ctx, &mention, top);
        assert_eq!(near.keys().copied().collect::<Vec<_>>(), vec![receptor]);

        let empty = PostFilter::TopScore.apply(&ctx, &mention, Scores::new());
        assert!(empty.is_empty());
    }
}
