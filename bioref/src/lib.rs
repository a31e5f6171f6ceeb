//! # bioref
//!
//! Rule-based coreference resolution and coreference-aware predication
//! composition for biomedical text.
//!
//! - **Mentions**: pronouns and determiner-marked noun phrases become
//!   Expression items ([`detect_mentions`])
//! - **Coreference**: configurable per-type strategies link mentions to
//!   referents as CoreferenceChain items ([`CorefResolver`])
//! - **Composition**: dependency trees plus predicates become Predication
//!   items, with anaphors replaced by their antecedents
//!   ([`compose_document_predications`])
//!
//! Core types (Document, SemanticItem, SemanticGraph, etc.) are in
//! `bioref-core` and re-exported here.
//!
//! ```rust,ignore
//! use bioref::{compose_document_predications, CompositionRules, CorefResolver};
//!
//! let chains = CorefResolver::default().resolve_document(&mut doc);
//! let graph = compose_document_predications(&mut doc, &CompositionRules::biomedical(), false, false);
//! ```

#![warn(missing_docs)]

pub mod compose;
pub mod coref;
pub mod error;
pub mod lexicon;
pub mod mention;

// Re-export error types
pub use error::{Error, Result};

// Re-export bioref-core types
pub use bioref_core::{
    Argument, Concept, CoreferenceType, DependencyEdge, Document, EntityData, Indicator, ItemId,
    ItemKind, MentionType, PredicateData, RelationData, RelationDefinition, RelationKind,
    RoleDefinition, ScalarModality, SearchDirection, SemanticGraph, SemanticItem, SemanticStore,
    Semantics, Sense, Sentence, Span, SyntacticCategory, TextUnit, UnitId, Word,
};

pub use compose::{compose_document_predications, ComposeOptions, Composer, CompositionRules};
pub use coref::{resolve_document, Configuration, CorefResolver, Strategy};
pub use lexicon::DomainLexicon;
pub use mention::{detect_mentions, mentions_of, Mention};
