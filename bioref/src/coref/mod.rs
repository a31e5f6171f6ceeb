//! Rule-based coreference resolution.
//!
//! # Pipeline
//!
//! For every mention and coreference type the [`Configuration`] names a
//! [`Strategy`]:
//!
//! ```text
//! mention filters ──▶ candidate filters ──▶ scoring ──▶ post filters
//!   (accept?)          (intersect, sort)    (Σ ±)       (threshold, top, salience)
//! ```
//!
//! The surviving candidates are the mention's referents. The
//! [`CorefResolver`] runs this for every coreference type in priority
//! order, materialises links as CoreferenceChain items and prunes anaphora
//! chains superseded by cataphora.
//!
//! Every stage is a pure function of the document, the lexicon and the
//! mention, so stages can be tested and reordered independently.

pub mod agreement;
pub mod filter;
pub mod post;
pub mod resolver;
pub mod scoring;
pub mod strategy;

pub use agreement::Agreement;
pub use filter::{filter_candidates, CandidateFilter, MentionFilter};
pub use post::{apply_post_filters, PostFilter, Salience, Scores};
pub use resolver::{prune_chains, resolve_document, CorefResolver};
pub use scoring::{score_candidates, ScoringRule};
pub use strategy::{Configuration, ConfigurationBuilder, Strategy};

use std::collections::BTreeSet;

use bioref_core::{Document, ItemKind, RelationKind, Semantics, SyntacticCategory, UnitId};

use crate::lexicon::{determiner_number, pronoun_features, DomainLexicon, Gender, Number, Person};
use crate::mention::Mention;

/// Read-only view handed to every pipeline stage.
#[derive(Debug, Clone, Copy)]
pub struct ResolutionContext<'a> {
    /// Document under resolution
    pub doc: &'a Document,
    /// Domain word lists
    pub lexicon: &'a DomainLexicon,
}

/// Agreement features of a mention or candidate. `None` means unknown.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Features {
    /// Person
    pub person: Option<Person>,
    /// Number
    pub number: Option<Number>,
    /// Gender
    pub gender: Option<Gender>,
    /// Animacy
    pub animate: Option<bool>,
}

impl<'a> ResolutionContext<'a> {
    /// Create a context.
    #[must_use]
    pub fn new(doc: &'a Document, lexicon: &'a DomainLexicon) -> Self {
        Self { doc, lexicon }
    }

    /// Sentence index of a unit.
    #[must_use]
    pub fn sentence(&self, unit: UnitId) -> usize {
        self.doc.unit(unit).map_or(0, |u| u.sentence)
    }

    /// Semantic types of the unit's entities (item types and active concept types).
    #[must_use]
    pub fn semantic_types(&self, unit: UnitId) -> BTreeSet<String> {
        self.doc
            .semantics_of(unit)
            .filter(|item| item.kind() == ItemKind::Entity)
            .filter(|item| !item.as_entity().is_some_and(|e| e.placeholder))
            .flat_map(|item| {
                item.type_tags()
                    .into_iter()
                    .map(str::to_string)
                    .collect::<Vec<_>>()
            })
            .collect()
    }

    /// Concept ids of the unit's entities.
    #[must_use]
    pub fn concept_ids(&self, unit: UnitId) -> BTreeSet<String> {
        self.doc
            .semantics_of(unit)
            .filter(|item| item.kind() == ItemKind::Entity)
            .filter_map(|item| item.as_entity())
            .flat_map(|e| e.concept_ids().map(str::to_string).collect::<Vec<_>>())
            .collect()
    }

    /// True if the unit carries a conjunction.
    #[must_use]
    pub fn has_conjunction(&self, unit: UnitId) -> bool {
        self.doc.semantics_of(unit).any(|item| {
            matches!(&item.semantics, Semantics::Relation(r) if r.kind == RelationKind::Conjunction)
        })
    }

    /// True if the unit is headed by a noun.
    #[must_use]
    pub fn is_nominal(&self, unit: UnitId) -> bool {
        self.doc
            .unit(unit)
            .is_some_and(|u| u.category() == SyntacticCategory::Noun)
    }

    /// True if the unit is a pronoun or carries a pronominal mention over
    /// its whole span.
    #[must_use]
    pub fn is_pronominal(&self, unit: UnitId) -> bool {
        let Some(u) = self.doc.unit(unit) else {
            return false;
        };
        u.category() == SyntacticCategory::Pronoun
            || self.doc.semantics_of(unit).any(|item| {
                item.span == u.span && item.mention_type().is_some_and(|m| m.is_pronominal())
            })
    }

    /// Lowercased head lemma of a unit.
    #[must_use]
    pub fn head_lemma(&self, unit: UnitId) -> String {
        self.doc.unit(unit).map(|u| u.lemma()).unwrap_or_default()
    }

    /// Agreement features of a candidate unit.
    #[must_use]
    pub fn unit_features(&self, unit: UnitId) -> Features {
        let Some(u) = self.doc.unit(unit) else {
            return Features::default();
        };
        if u.words.len() == 1 {
            if let Some(p) = pronoun_features(&u.text) {
                return Features {
                    person: p.person,
                    number: p.number,
                    gender: p.gender,
                    animate: p.animate,
                };
            }
        }

        let number = if self.has_conjunction(unit) || u.is_plural() {
            Some(Number::Plural)
        } else if u.words.len() > 1 {
            determiner_number(&u.first_word().text).or(Some(Number::Singular))
        } else if u.is_nominal() {
            Some(Number::Singular)
        } else {
            None
        };

        let head = u.lemma();
        let types = self.semantic_types(unit);
        let animate = if self.lexicon.animate_nouns.iter().any(|n| *n == head)
            || self.lexicon.is_animate_type(types.iter().map(String::as_str))
        {
            Some(true)
        } else if !types.is_empty() {
            Some(false)
        } else {
            None
        };
        let gender = self
            .lexicon
            .noun_gender(&head)
            .or(if animate == Some(false) {
                Some(Gender::Neuter)
            } else {
                None
            });

        Features {
            person: Some(Person::Third),
            number,
            gender,
            animate,
        }
    }

    /// Agreement features of a mention. Pronominal mentions read them off
    /// the pronoun form; nominal mentions off their unit.
    #[must_use]
    pub fn mention_features(&self, mention: &Mention) -> Features {
        if mention.mention_type.is_pronominal() {
            if let Some(p) = pronoun_features(self.doc.covered_text(mention.span)) {
                return Features {
                    person: p.person,
                    number: p.number,
                    gender: p.gender,
                    animate: p.animate,
                };
            }
            return Features {
                person: Some(Person::Third),
                ..Features::default()
            };
        }
        self.unit_features(mention.unit)
    }
}
