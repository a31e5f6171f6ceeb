//! Coreference-aware predication composition.
//!
//! Walks each sentence's dependency tree bottom-up and turns predicates
//! plus the semantics of their dependents into Predication items:
//!
//! ```text
//!            activates (STIMULATES)
//!           /nsubj           \dobj
//!         It ──Antecedent──▶ the protein      transcription
//!
//!   P1  STIMULATES:T5 SUBJ:T1 OBJ:T6
//! ```
//!
//! Roles come from [`CompositionRules`]; anaphoric mentions are replaced
//! by their antecedents through the [`SemanticGraph`](bioref_core::SemanticGraph)
//! built along the way.

pub mod engine;
pub mod readings;
pub mod rules;

pub use engine::{compose_document_predications, substitute, Composer};
pub use readings::enumerate;
pub use rules::{ComposeOptions, CompositionRules, RoleRule, COMPLEMENT_ROLE, NEGATION_ROLE};
