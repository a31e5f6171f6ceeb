//! Agreement checks between a mention and a candidate referent.
//!
//! Each check is stateless and deterministic. Unknown features never
//! disagree: a check only fails on positive evidence of a mismatch.

use bioref_core::{CoreferenceType, Span, SyntacticCategory, UnitId};

use super::ResolutionContext;
use crate::mention::Mention;

/// Dependency labels that link a copula to its predicate nominal.
const COPULA_COMPLEMENTS: &[&str] = &["attr", "dobj", "xcomp", "acomp"];

/// Capability tags of the scoring stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Agreement {
    /// Animate/inanimate match
    Animacy,
    /// Masculine/feminine/neuter match
    Gender,
    /// Singular/plural match
    Number,
    /// First/second/third person match
    Person,
    /// Nominal mention headed by a general noun whose types fit the candidate
    HypernymList,
    /// Candidate types, after coercion, fit the mention's governing predicate
    SemanticCoercion,
    /// No contrastive connective between the two
    DiscourseConnective,
    /// Candidate stands in apposition to the mention
    SyntacticAppositive,
    /// Mention is the subject of a copula whose complement is the candidate
    PredicateNominative,
    /// No noun phrase between the two
    Adjacency,
    /// Both map to a common ontology concept
    SharedConcept,
}

fn compatible<T: PartialEq>(a: Option<T>, b: Option<T>) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => a == b,
        _ => true,
    }
}

fn gap(a: Span, b: Span) -> (usize, usize) {
    if a.end <= b.start {
        (a.end, b.start)
    } else if b.end <= a.start {
        (b.end, a.start)
    } else {
        (0, 0)
    }
}

impl Agreement {
    /// Evaluate the check.
    #[must_use]
    pub fn holds(
        &self,
        ctx: &ResolutionContext<'_>,
        mention: &Mention,
        candidate: UnitId,
        _coreference_type: CoreferenceType,
    ) -> bool {
        match self {
            Agreement::Animacy => compatible(
                ctx.mention_features(mention).animate,
                ctx.unit_features(candidate).animate,
            ),
            Agreement::Gender => compatible(
                ctx.mention_features(mention).gender,
                ctx.unit_features(candidate).gender,
            ),
            Agreement::Number => compatible(
                ctx.mention_features(mention).number,
                ctx.unit_features(candidate).number,
            ),
            Agreement::Person => compatible(
                ctx.mention_features(mention).person,
                ctx.unit_features(candidate).person,
            ),
            Agreement::HypernymList => hypernym_fits(ctx, mention, candidate),
            Agreement::SemanticCoercion => coercion_fits(ctx, mention, candidate),
            Agreement::DiscourseConnective => {
                let Some(c) = ctx.doc.unit(candidate) else {
                    return false;
                };
                let (start, end) = gap(c.span, mention.span);
                let between = ctx.doc.covered_text(Span::new(start, end));
                !ctx.lexicon.has_contrastive_connective(between)
            }
            Agreement::SyntacticAppositive => is_appositive(ctx, mention, candidate),
            Agreement::PredicateNominative => is_predicate_nominative(ctx, mention, candidate),
            Agreement::Adjacency => {
                let Some(c) = ctx.doc.unit(candidate) else {
                    return false;
                };
                ctx.doc
                    .units_between(c.span, mention.span)
                    .into_iter()
                    .filter_map(|u| ctx.doc.unit(u))
                    .all(|u| {
                        !matches!(
                            u.category(),
                            SyntacticCategory::Noun | SyntacticCategory::Pronoun
                        )
                    })
            }
            Agreement::SharedConcept => {
                let ours = ctx.concept_ids(mention.unit);
                let theirs = ctx.concept_ids(candidate);
                ours.intersection(&theirs).next().is_some()
            }
        }
    }
}

fn hypernym_fits(ctx: &ResolutionContext<'_>, mention: &Mention, candidate: UnitId) -> bool {
    let head = ctx.head_lemma(mention.unit);
    let Some(types) = ctx.lexicon.hypernym_types(&head) else {
        return false;
    };
    if ctx.head_lemma(candidate) == head {
        return true;
    }
    let candidate_types = ctx.semantic_types(candidate);
    types.iter().any(|t| candidate_types.contains(t))
}

fn coercion_fits(ctx: &ResolutionContext<'_>, mention: &Mention, candidate: UnitId) -> bool {
    let Some(edge) = ctx.doc.governor_of(mention.unit) else {
        return true;
    };
    let governor = ctx.head_lemma(edge.governor);
    let Some(preferred) = ctx.lexicon.selectional_preferences.get(&governor) else {
        return true;
    };
    let candidate_types = ctx.semantic_types(candidate);
    if candidate_types.is_empty() {
        return true;
    }
    candidate_types
        .iter()
        .flat_map(|t| ctx.lexicon.coerced(t))
        .any(|t| preferred.iter().any(|p| p == t))
}

fn is_appositive(ctx: &ResolutionContext<'_>, mention: &Mention, candidate: UnitId) -> bool {
    if ctx.sentence(candidate) != ctx.sentence(mention.unit) {
        return false;
    }
    let linked = ctx
        .doc
        .outgoing(mention.unit)
        .chain(ctx.doc.outgoing(candidate))
        .any(|e| {
            e.label == "appos"
                && ((e.governor == mention.unit && e.dependent == candidate)
                    || (e.governor == candidate && e.dependent == mention.unit))
        });
    if linked {
        return true;
    }
    let Some(c) = ctx.doc.unit(candidate) else {
        return false;
    };
    let (start, end) = gap(c.span, mention.span);
    let between = ctx.doc.covered_text(Span::new(start, end)).trim();
    matches!(between, "," | "(" | "-" | "--" | ", or" | "(or")
}

fn is_predicate_nominative(
    ctx: &ResolutionContext<'_>,
    mention: &Mention,
    candidate: UnitId,
) -> bool {
    if ctx.sentence(candidate) != ctx.sentence(mention.unit) {
        return false;
    }
    let doc = ctx.doc;
    let copular_head = doc
        .outgoing(candidate)
        .any(|e| e.label == "nsubj" && e.dependent == mention.unit)
        && doc.outgoing(candidate).any(|e| e.label == "cop");
    if copular_head {
        return true;
    }
    doc.incoming(mention.unit)
        .filter(|e| e.label == "nsubj" && ctx.head_lemma(e.governor) == "be")
        .any(|subject| {
            doc.outgoing(subject.governor).any(|e| {
                e.dependent == candidate && COPULA_COMPLEMENTS.contains(&e.label.as_str())
            })
        })
}
