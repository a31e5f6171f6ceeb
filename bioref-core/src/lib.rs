//! # bioref-core
//!
//! Core types for bioref: the data model shared by the resolver and the
//! composition engine.
//!
//! This crate provides:
//! - **Text model**: `Span`, `Document`, `Sentence`, `TextUnit`, `DependencyEdge`
//! - **Semantic items**: `SemanticItem` with entity, predicate and relation
//!   variants, stored per document in a `SemanticStore` with stable handles
//! - **Relation definitions**: role inventories and filler constraints
//! - **Coreference enumerations**: `CoreferenceType`, `MentionType`
//! - **Semantic graph**: `SemanticGraph`, the coreference-augmented index

pub mod coref_type;
pub mod definition;
pub mod document;
pub mod error;
pub mod factory;
pub mod graph;
pub mod semantics;
pub mod span;

// Re-exports for convenience
pub use coref_type::{CoreferenceType, MentionType, SearchDirection};
pub use definition::{RelationDefinition, RoleDefinition};
pub use document::{DependencyEdge, Document, Sentence, SyntacticCategory, TextUnit, UnitId, Word};
pub use error::{Error, Result};
pub use factory::{CONJUNCT_ROLE, PLACEHOLDER_TYPE};
pub use graph::{SemanticGraph, COREF_LABEL};
pub use semantics::{
    Argument, Concept, EntityData, Indicator, ItemId, ItemKind, PredicateData, RelationData,
    RelationKind, ScalarModality, SemanticItem, SemanticStore, Semantics, Sense,
};
pub use span::Span;
