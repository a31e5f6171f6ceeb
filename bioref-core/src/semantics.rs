//! Semantic item model and the per-document item store.
//!
//! # Type Hierarchy
//!
//! ```text
//! SemanticItem
//! ├── Entity            (ontology concepts, active sense)
//! │   └── Expression    (coreferential mention: pronoun or NP)
//! ├── Predicate         (indicator with candidate senses)
//! └── Relation          (ordered arguments)
//!     ├── Event
//!     ├── Predication   (scalar modality, source attribution)
//!     ├── Conjunction   (conjuncts under role "CC")
//!     ├── ImplicitRelation
//!     ├── Modification
//!     └── CoreferenceChain (roles derived from CoreferenceType)
//! ```
//!
//! Items live in a [`SemanticStore`] owned by the document. Handles
//! ([`ItemId`]) are stable: removal tombstones the slot instead of shifting
//! later items.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::coref_type::{CoreferenceType, MentionType};
use crate::span::Span;

// =============================================================================
// Handles and kinds
// =============================================================================

/// Stable handle of a semantic item inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ItemId(pub u32);

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Variant tag of a semantic item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum ItemKind {
    /// Ontology-grounded entity
    Entity,
    /// Coreferential mention
    Expression,
    /// Relation anchor
    Predicate,
    /// Event relation
    Event,
    /// Composed predicate-argument structure
    Predication,
    /// Coordination grouping
    Conjunction,
    /// Relation without a lexical trigger
    ImplicitRelation,
    /// Modifier relation
    Modification,
    /// Coreference link
    CoreferenceChain,
}

impl ItemKind {
    /// Standoff label prefix. Text-bound terms share `T`.
    #[must_use]
    pub const fn prefix(&self) -> &'static str {
        match self {
            ItemKind::Entity | ItemKind::Expression | ItemKind::Predicate => "T",
            ItemKind::Event => "E",
            ItemKind::Predication => "P",
            ItemKind::Conjunction => "C",
            ItemKind::ImplicitRelation => "I",
            ItemKind::Modification => "M",
            ItemKind::CoreferenceChain => "R",
        }
    }

    /// True for the relation family.
    #[must_use]
    pub const fn is_relation(&self) -> bool {
        !self.is_term()
    }

    /// True for text-bound items.
    #[must_use]
    pub const fn is_term(&self) -> bool {
        matches!(
            self,
            ItemKind::Entity | ItemKind::Expression | ItemKind::Predicate
        )
    }
}

// =============================================================================
// Entities
// =============================================================================

/// An ontology concept an entity maps to.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Concept {
    /// Concept identifier (e.g. a CUI)
    pub id: String,
    /// Preferred name
    pub name: String,
    /// Semantic types of the concept
    #[serde(default)]
    pub semantic_types: Vec<String>,
}

impl Concept {
    /// Create a concept.
    #[must_use]
    pub fn new(id: impl Into<String>, name: impl Into<String>, semantic_types: &[&str]) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            semantic_types: semantic_types.iter().map(|s| s.to_string()).collect(),
        }
    }
}

/// Payload of entities and expressions.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EntityData {
    /// Candidate concepts
    pub concepts: Vec<Concept>,
    /// Index of the active sense in `concepts`
    pub sense: Option<usize>,
    /// Set for coreferential mentions (the Expression subtype)
    pub mention: Option<MentionType>,
    /// Synthesized so a referent without semantics still has a filler
    #[serde(default)]
    pub placeholder: bool,
}

impl EntityData {
    /// The active concept, falling back to the first one.
    #[must_use]
    pub fn active_concept(&self) -> Option<&Concept> {
        self.sense
            .and_then(|i| self.concepts.get(i))
            .or_else(|| self.concepts.first())
    }

    /// Semantic types of the active concept.
    pub fn semantic_types(&self) -> impl Iterator<Item = &str> {
        self.active_concept()
            .into_iter()
            .flat_map(|c| c.semantic_types.iter().map(String::as_str))
    }

    /// Ids of every candidate concept.
    pub fn concept_ids(&self) -> impl Iterator<Item = &str> {
        self.concepts.iter().map(|c| c.id.as_str())
    }
}

// =============================================================================
// Predicates
// =============================================================================

/// One reading of a predicate indicator.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sense {
    /// Relation type this sense produces (e.g. "INHIBITS")
    pub category: String,
    /// Embedding types licensing clausal complements
    #[serde(default)]
    pub embedding_types: Vec<String>,
    /// Subject and object roles are swapped ("is inhibited by")
    #[serde(default)]
    pub inverse: bool,
    /// Optional scope marker
    #[serde(default)]
    pub scope: Option<String>,
}

impl Sense {
    /// Create a sense with the given relation type.
    #[must_use]
    pub fn new(category: impl Into<String>) -> Self {
        Self {
            category: category.into(),
            ..Self::default()
        }
    }

    /// Mark the sense as role-inverting.
    #[must_use]
    pub fn inverse(mut self) -> Self {
        self.inverse = true;
        self
    }

    /// Add an embedding type.
    #[must_use]
    pub fn with_embedding(mut self, embedding_type: impl Into<String>) -> Self {
        self.embedding_types.push(embedding_type.into());
        self
    }
}

/// Abstract predicate indicator: a lexical item and its candidate senses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Indicator {
    /// Indicator lemma
    pub lemma: String,
    /// Candidate senses
    pub senses: Vec<Sense>,
}

/// A scalar modality value (factuality, certainty, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScalarModality {
    /// Dimension name
    pub kind: String,
    /// Value in [0, 1]
    pub value: f64,
}

impl ScalarModality {
    /// Create a modality value, clamped to [0, 1].
    #[must_use]
    pub fn new(kind: impl Into<String>, value: f64) -> Self {
        Self {
            kind: kind.into(),
            value: value.clamp(0.0, 1.0),
        }
    }
}

/// Payload of predicates.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PredicateData {
    /// Head lemma
    pub lemma: String,
    /// Indicator and senses
    pub indicator: Option<Indicator>,
    /// Index of the active sense
    pub sense: Option<usize>,
    /// Modality values propagated to predications
    #[serde(default)]
    pub modality: Vec<ScalarModality>,
    /// Source attribution propagated to predications
    #[serde(default)]
    pub sources: Vec<String>,
}

impl PredicateData {
    /// Predicate with a lemma and no indicator.
    #[must_use]
    pub fn new(lemma: impl Into<String>) -> Self {
        Self {
            lemma: lemma.into(),
            ..Self::default()
        }
    }

    /// Attach an indicator whose first sense becomes active.
    #[must_use]
    pub fn with_indicator(mut self, indicator: Indicator) -> Self {
        self.sense = if indicator.senses.is_empty() { None } else { Some(0) };
        self.indicator = Some(indicator);
        self
    }

    /// Single-sense shorthand.
    #[must_use]
    pub fn with_sense(self, sense: Sense) -> Self {
        let lemma = self.lemma.clone();
        self.with_indicator(Indicator {
            lemma,
            senses: vec![sense],
        })
    }

    /// The active sense, if any.
    #[must_use]
    pub fn active_sense(&self) -> Option<&Sense> {
        let indicator = self.indicator.as_ref()?;
        self.sense.and_then(|i| indicator.senses.get(i))
    }
}

// =============================================================================
// Relations
// =============================================================================

/// One argument of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Argument {
    /// Role name
    pub role: String,
    /// Filler
    pub item: ItemId,
}

impl Argument {
    /// Create an argument.
    #[must_use]
    pub fn new(role: impl Into<String>, item: ItemId) -> Self {
        Self {
            role: role.into(),
            item,
        }
    }
}

/// Relation variants.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum RelationKind {
    /// Event anchored by a predicate
    Event {
        /// Trigger
        predicate: ItemId,
    },
    /// Composed predication
    Predication {
        /// Trigger
        predicate: ItemId,
        /// Propagated modality values
        modality: Vec<ScalarModality>,
        /// Propagated source attribution
        sources: Vec<String>,
        /// Primary reading (not one of several enumerated alternatives)
        source_reading: bool,
    },
    /// Coordination of conjuncts
    Conjunction,
    /// Untriggered relation
    ImplicitRelation,
    /// Modifier relation
    Modification,
    /// Coreference link
    CoreferenceChain(CoreferenceType),
}

/// Payload of relations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelationData {
    /// Variant
    pub kind: RelationKind,
    /// Ordered arguments
    pub arguments: Vec<Argument>,
}

impl RelationData {
    /// Trigger predicate, for triggered variants.
    #[must_use]
    pub fn predicate(&self) -> Option<ItemId> {
        match &self.kind {
            RelationKind::Event { predicate } | RelationKind::Predication { predicate, .. } => {
                Some(*predicate)
            }
            RelationKind::Conjunction
            | RelationKind::ImplicitRelation
            | RelationKind::Modification
            | RelationKind::CoreferenceChain(_) => None,
        }
    }

    /// Fillers of a role, in argument order.
    pub fn fillers<'a>(&'a self, role: &'a str) -> impl Iterator<Item = ItemId> + 'a {
        self.arguments
            .iter()
            .filter(move |a| a.role == role)
            .map(|a| a.item)
    }

    /// True if any argument or the trigger references `id`.
    #[must_use]
    pub fn references(&self, id: ItemId) -> bool {
        self.predicate() == Some(id) || self.arguments.iter().any(|a| a.item == id)
    }

    /// Coreference type, for chains.
    #[must_use]
    pub fn coreference_type(&self) -> Option<CoreferenceType> {
        match &self.kind {
            RelationKind::CoreferenceChain(t) => Some(*t),
            _ => None,
        }
    }

    /// Expression-side fillers of a chain. Ontological chains name both
    /// sides `Equiv`; their first argument is the expression.
    #[must_use]
    pub fn expressions(&self) -> Vec<ItemId> {
        match self.coreference_type() {
            Some(CoreferenceType::Ontological) => {
                self.arguments.iter().take(1).map(|a| a.item).collect()
            }
            Some(t) => self.fillers(t.expression_role()).collect(),
            None => Vec::new(),
        }
    }

    /// Referent-side fillers of a chain.
    #[must_use]
    pub fn referents(&self) -> Vec<ItemId> {
        match self.coreference_type() {
            Some(CoreferenceType::Ontological) => {
                self.arguments.iter().skip(1).map(|a| a.item).collect()
            }
            Some(t) => self.fillers(t.referent_role()).collect(),
            None => Vec::new(),
        }
    }
}

// =============================================================================
// Semantic items
// =============================================================================

/// Variant payload of a semantic item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Semantics {
    /// Entity or expression
    Entity(EntityData),
    /// Predicate
    Predicate(PredicateData),
    /// Relation family
    Relation(RelationData),
}

/// A semantic item attached to a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SemanticItem {
    /// Stable handle
    pub id: ItemId,
    /// Standoff label (`T3`, `P1`, ...)
    pub label: String,
    /// Owning document id
    pub document: String,
    /// Primary type tag
    pub item_type: String,
    /// Character span
    pub span: Span,
    /// Free-form features
    #[serde(default)]
    pub features: BTreeMap<String, String>,
    /// Variant payload
    pub semantics: Semantics,
}

impl SemanticItem {
    /// Variant tag.
    #[must_use]
    pub fn kind(&self) -> ItemKind {
        match &self.semantics {
            Semantics::Entity(e) if e.mention.is_some() => ItemKind::Expression,
            Semantics::Entity(_) => ItemKind::Entity,
            Semantics::Predicate(_) => ItemKind::Predicate,
            Semantics::Relation(r) => match r.kind {
                RelationKind::Event { .. } => ItemKind::Event,
                RelationKind::Predication { .. } => ItemKind::Predication,
                RelationKind::Conjunction => ItemKind::Conjunction,
                RelationKind::ImplicitRelation => ItemKind::ImplicitRelation,
                RelationKind::Modification => ItemKind::Modification,
                RelationKind::CoreferenceChain(_) => ItemKind::CoreferenceChain,
            },
        }
    }

    /// Entity payload (entities and expressions).
    #[must_use]
    pub fn as_entity(&self) -> Option<&EntityData> {
        match &self.semantics {
            Semantics::Entity(e) => Some(e),
            _ => None,
        }
    }

    /// Predicate payload.
    #[must_use]
    pub fn as_predicate(&self) -> Option<&PredicateData> {
        match &self.semantics {
            Semantics::Predicate(p) => Some(p),
            _ => None,
        }
    }

    /// Relation payload.
    #[must_use]
    pub fn as_relation(&self) -> Option<&RelationData> {
        match &self.semantics {
            Semantics::Relation(r) => Some(r),
            _ => None,
        }
    }

    /// Mention type, for expressions.
    #[must_use]
    pub fn mention_type(&self) -> Option<MentionType> {
        self.as_entity().and_then(|e| e.mention)
    }

    /// True for coreferential mentions.
    #[must_use]
    pub fn is_expression(&self) -> bool {
        self.mention_type().is_some()
    }

    /// Semantic types for constraint checks: the item type plus, for
    /// entities, the active concept's semantic types.
    #[must_use]
    pub fn type_tags(&self) -> BTreeSet<&str> {
        let mut tags = BTreeSet::new();
        tags.insert(self.item_type.as_str());
        if let Some(entity) = self.as_entity() {
            tags.extend(entity.semantic_types());
        }
        tags
    }
}

// =============================================================================
// Store
// =============================================================================

/// Document-wide arena of semantic items with a per-variant index.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SemanticStore {
    slots: Vec<Option<SemanticItem>>,
    by_kind: BTreeMap<ItemKind, BTreeSet<ItemId>>,
    counters: BTreeMap<String, u32>,
}

impl SemanticStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a new item, assigning its handle and sequential label.
    pub fn insert(
        &mut self,
        document: &str,
        item_type: impl Into<String>,
        span: Span,
        semantics: Semantics,
    ) -> ItemId {
        let id = ItemId(self.slots.len() as u32);
        let mut item = SemanticItem {
            id,
            label: String::new(),
            document: document.to_string(),
            item_type: item_type.into(),
            span,
            features: BTreeMap::new(),
            semantics,
        };
        let kind = item.kind();
        let counter = self.counters.entry(kind.prefix().to_string()).or_insert(0);
        *counter += 1;
        item.label = format!("{}{}", kind.prefix(), counter);
        self.by_kind.entry(kind).or_default().insert(id);
        self.slots.push(Some(item));
        id
    }

    /// Look up a live item.
    #[must_use]
    pub fn get(&self, id: ItemId) -> Option<&SemanticItem> {
        self.slots.get(id.0 as usize).and_then(Option::as_ref)
    }

    /// Mutable lookup of a live item.
    pub fn get_mut(&mut self, id: ItemId) -> Option<&mut SemanticItem> {
        self.slots.get_mut(id.0 as usize).and_then(Option::as_mut)
    }

    /// True if the handle refers to a live item.
    #[must_use]
    pub fn contains(&self, id: ItemId) -> bool {
        self.get(id).is_some()
    }

    /// Tombstone an item without cascading. See `Document::remove_item`.
    pub fn take(&mut self, id: ItemId) -> Option<SemanticItem> {
        let item = self.slots.get_mut(id.0 as usize)?.take()?;
        if let Some(ids) = self.by_kind.get_mut(&item.kind()) {
            ids.remove(&id);
        }
        Some(item)
    }

    /// Live items in creation order.
    pub fn iter(&self) -> impl Iterator<Item = &SemanticItem> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Live items of one variant, in creation order.
    pub fn of_kind(&self, kind: ItemKind) -> impl Iterator<Item = &SemanticItem> {
        self.by_kind
            .get(&kind)
            .into_iter()
            .flat_map(|ids| ids.iter())
            .filter_map(|id| self.get(*id))
    }

    /// Relations that use `id` as an argument or trigger.
    #[must_use]
    pub fn referencing(&self, id: ItemId) -> Vec<ItemId> {
        self.iter()
            .filter(|item| item.as_relation().is_some_and(|r| r.references(id)))
            .map(|item| item.id)
            .collect()
    }

    /// Number of live items.
    #[must_use]
    pub fn len(&self) -> usize {
        self.iter().count()
    }

    /// True if no live items remain.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
