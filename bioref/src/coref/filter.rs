//! Mention-acceptance filters and candidate filters.

use bioref_core::{CoreferenceType, ItemKind, Span, UnitId};

use super::{ResolutionContext, Strategy};
use crate::lexicon::{is_pleonastic, pronoun_features, Person};
use crate::mention::Mention;

/// Dependency labels of core verbal arguments, used by the binding filter.
const ARGUMENT_LABELS: &[&str] = &["nsubj", "nsubjpass", "dobj", "iobj", "agent"];

// =============================================================================
// Mention filters
// =============================================================================

/// Decides whether a mention is worth resolving at all.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MentionFilter {
    /// Reject "it" in "it is likely that", "it seems to"
    PleonasticIt,
    /// Reject "that" tagged as a complementizer
    ThatComplementizer,
    /// Reject first and second person pronouns
    NonFirstSecondPerson,
    /// Nominal mentions must be headed by a general noun from the lexicon
    HypernymHeaded,
    /// Mention must precede its clause's main predicate inside a dependent clause
    CataphoricPosition,
}

impl MentionFilter {
    /// True if the mention passes.
    #[must_use]
    pub fn accepts(
        &self,
        ctx: &ResolutionContext<'_>,
        mention: &Mention,
        _coreference_type: CoreferenceType,
    ) -> bool {
        let text = ctx.doc.covered_text(mention.span).to_lowercase();
        match self {
            MentionFilter::PleonasticIt => {
                if text != "it" {
                    return true;
                }
                let Some(sentence) = ctx.doc.sentence_of(mention.unit) else {
                    return true;
                };
                let rest = ctx
                    .doc
                    .covered_text(Span::new(mention.span.start, sentence.span.end));
                !is_pleonastic(rest)
            }
            MentionFilter::ThatComplementizer => {
                text != "that" || ctx.doc.unit(mention.unit).is_some_and(|u| u.pos() != "IN")
            }
            MentionFilter::NonFirstSecondPerson => !matches!(
                pronoun_features(&text).and_then(|f| f.person),
                Some(Person::First | Person::Second)
            ),
            MentionFilter::HypernymHeaded => {
                mention.mention_type.is_pronominal()
                    || ctx
                        .lexicon
                        .hypernym_types(&ctx.head_lemma(mention.unit))
                        .is_some()
            }
            MentionFilter::CataphoricPosition => {
                let sentence = ctx.sentence(mention.unit);
                let Some(root) = ctx.doc.sentence_roots(sentence).first().copied() else {
                    return false;
                };
                let Some(root_span) = ctx.doc.unit(root).map(|u| u.span) else {
                    return false;
                };
                mention.span.is_left_of(&root_span) && ctx.doc.depth(mention.unit) >= 2
            }
        }
    }
}

// =============================================================================
// Candidate filters
// =============================================================================

/// Narrows the candidate referents of a mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CandidateFilter {
    /// At most this many sentences away
    WindowSize(usize),
    /// Candidate precedes the mention
    PriorDiscourse,
    /// Candidate follows the mention
    SubsequentDiscourse,
    /// Candidate in the mention's sentence
    SameSentence,
    /// Candidate headed by a noun
    Nominal,
    /// Candidate is not itself a pronoun
    NonPronominal,
    /// Candidate does not overlap the mention
    NonOverlapping,
    /// Pronoun and candidate are not co-arguments of one predicate
    Binding,
    /// Candidate carries entity semantics or a conjunction
    EntityBearing,
}

impl CandidateFilter {
    /// True if the single candidate passes.
    #[must_use]
    pub fn accepts(
        &self,
        ctx: &ResolutionContext<'_>,
        mention: &Mention,
        candidate: UnitId,
        _coreference_type: CoreferenceType,
    ) -> bool {
        let Some(c) = ctx.doc.unit(candidate) else {
            return false;
        };
        match self {
            CandidateFilter::WindowSize(n) => {
                ctx.sentence(mention.unit).abs_diff(c.sentence) <= *n
            }
            CandidateFilter::PriorDiscourse => c.span.is_left_of(&mention.span),
            CandidateFilter::SubsequentDiscourse => mention.span.is_left_of(&c.span),
            CandidateFilter::SameSentence => c.sentence == ctx.sentence(mention.unit),
            CandidateFilter::Nominal => ctx.is_nominal(candidate),
            CandidateFilter::NonPronominal => !ctx.is_pronominal(candidate),
            CandidateFilter::NonOverlapping => {
                candidate != mention.unit && !c.span.overlaps(&mention.span)
            }
            CandidateFilter::Binding => {
                if !mention.mention_type.is_pronominal() {
                    return true;
                }
                let governors = |unit: UnitId| {
                    ctx.doc
                        .incoming(unit)
                        .filter(|e| ARGUMENT_LABELS.contains(&e.label.as_str()))
                        .map(|e| e.governor)
                        .collect::<Vec<_>>()
                };
                let ours = governors(mention.unit);
                !governors(candidate).iter().any(|g| ours.contains(g))
            }
            CandidateFilter::EntityBearing => {
                ctx.has_conjunction(candidate)
                    || ctx
                        .doc
                        .semantics_of(candidate)
                        .any(|item| item.kind() == ItemKind::Entity)
            }
        }
    }

    /// The subset of `candidates` this filter accepts, in input order.
    #[must_use]
    pub fn apply(
        &self,
        ctx: &ResolutionContext<'_>,
        mention: &Mention,
        coreference_type: CoreferenceType,
        candidates: &[UnitId],
    ) -> Vec<UnitId> {
        candidates
            .iter()
            .copied()
            .filter(|c| self.accepts(ctx, mention, *c, coreference_type))
            .collect()
    }
}

/// Run the strategy's candidate filters in sequence.
///
/// The surviving set is intersected with each filter's output; the
/// pipeline stops once it is empty. The result is in text order without
/// duplicates.
#[must_use]
pub fn filter_candidates(
    strategy: &Strategy,
    ctx: &ResolutionContext<'_>,
    mention: &Mention,
    coreference_type: CoreferenceType,
    candidates: &[UnitId],
) -> Vec<UnitId> {
    let mut surviving: Vec<UnitId> = Vec::with_capacity(candidates.len());
    for c in candidates {
        if ctx.doc.unit(*c).is_some() && !surviving.contains(c) {
            surviving.push(*c);
        }
    }
    for filter in &strategy.candidate_filters {
        if surviving.is_empty() {
            break;
        }
        let accepted = filter.apply(ctx, mention, coreference_type, &surviving);
        surviving.retain(|c| accepted.contains(c));
    }
    surviving.sort_by_key(|c| ctx.doc.unit(*c).map(|u| u.span));
    surviving
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexicon::DomainLexicon;
    use crate::mention::{detect_mentions, mentions_of};
    use bioref_core::{Concept, Document};

    fn fixture() -> (Document, Vec<UnitId>) {
        let text = "The protein binds DNA. It is likely that it activates transcription.";
        let mut doc = Document::new("d", text);
        let s0 = doc.add_sentence_text("The protein binds DNA.").unwrap();
        let s1 = doc
            .add_sentence_text("It is likely that it activates transcription.")
            .unwrap();
        let protein = doc.add_phrase(s0, "The protein", "DT NN").unwrap();
        let binds = doc.add_phrase_with_lemmas(s0, "binds", "VBZ", "bind").unwrap();
        let dna = doc.add_phrase(s0, "DNA", "NN").unwrap();
        let it1 = doc.add_phrase(s1, "It", "PRP").unwrap();
        let is = doc.add_phrase_with_lemmas(s1, "is", "VBZ", "be").unwrap();
        let likely = doc.add_phrase(s1, "likely", "JJ").unwrap();
        let that = doc.add_phrase(s1, "that", "IN").unwrap();
        let it2 = doc.add_phrase(s1, "it", "PRP").unwrap();
        let activates = doc
            .add_phrase_with_lemmas(s1, "activates", "VBZ", "activate")
            .unwrap();
        let transcription = doc.add_phrase(s1, "transcription", "NN").unwrap();
        doc.add_dependency("nsubj", binds, protein).unwrap();
        doc.add_dependency("dobj", binds, dna).unwrap();
        doc.add_dependency("nsubj", likely, it1).unwrap();
        doc.add_dependency("cop", likely, is).unwrap();
        doc.add_dependency("ccomp", likely, activates).unwrap();
        doc.add_dependency("mark", activates, that).unwrap();
        doc.add_dependency("nsubj", activates, it2).unwrap();
        doc.add_dependency("dobj", activates, transcription).unwrap();
        doc.create_entity(protein, "aapp", vec![Concept::new("C1", "Proteins", &["aapp"])])
            .unwrap();
        doc.create_entity(dna, "nnon", vec![Concept::new("C2", "DNA", &["nnon"])])
            .unwrap();
        detect_mentions(&mut doc).unwrap();
        let units = vec![protein, binds, dna, it1, is, likely, that, it2, activates, transcription];
        (doc, units)
    }

    #[test]
    fn test_pleonastic_it_is_rejected() {
        let (doc, units) = fixture();
        let lexicon = DomainLexicon::biomedical();
        let ctx = ResolutionContext::new(&doc, &lexicon);
        let pleonastic = mentions_of(&doc, units[3])[0];
        let referential = mentions_of(&doc, units[7])[0];
        let t = CoreferenceType::Anaphora;
        assert!(!MentionFilter::PleonasticIt.accepts(&ctx, &pleonastic, t));
        assert!(MentionFilter::PleonasticIt.accepts(&ctx, &referential, t));
    }

    #[test]
    fn test_pipeline_intersects_and_sorts() {
        let (doc, units) = fixture();
        let lexicon = DomainLexicon::biomedical();
        let ctx = ResolutionContext::new(&doc, &lexicon);
        let it = mentions_of(&doc, units[7])[0];
        let strategy = Strategy::new()
            .with_candidate_filter(CandidateFilter::WindowSize(1))
            .with_candidate_filter(CandidateFilter::PriorDiscourse)
            .with_candidate_filter(CandidateFilter::Nominal)
            .with_candidate_filter(CandidateFilter::NonPronominal);
        let mut reversed = units.clone();
        reversed.reverse();
        let out = filter_candidates(&strategy, &ctx, &it, CoreferenceType::Anaphora, &reversed);
        assert_eq!(out, vec![units[0], units[2]]);
    }

    #[test]
    fn test_binding_rejects_coarguments() {
        let (doc, units) = fixture();
        let lexicon = DomainLexicon::biomedical();
        let ctx = ResolutionContext::new(&doc, &lexicon);
        let it = mentions_of(&doc, units[7])[0];
        let t = CoreferenceType::Anaphora;
        assert!(!CandidateFilter::Binding.accepts(&ctx, &it, units[9], t));
        assert!(CandidateFilter::Binding.accepts(&ctx, &it, units[0], t));
    }

    #[test]
    fn test_empty_candidates_stay_empty() {
        let (doc, units) = fixture();
        let lexicon = DomainLexicon::biomedical();
        let ctx = ResolutionContext::new(&doc, &lexicon);
        let it = mentions_of(&doc, units[7])[0];
        let strategy = Strategy::new().with_candidate_filter(CandidateFilter::SameSentence);
        assert!(filter_candidates(&strategy, &ctx, &it, CoreferenceType::Anaphora, &[]).is_empty());
    }
}
