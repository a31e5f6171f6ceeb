//! Composition rules: relation definitions, dependency → role table and
//! embedding dictionary.
//!
//! The built-in table covers the common biomedical predicate types. A rule
//! set can also be loaded from JSON:
//!
//! ```json
//! {
//!   "definitions": { "BINDS": { "relation_type": "BINDS", "roles": [
//!       { "role": "SUBJ", "core": true }, { "role": "OBJ", "core": true } ] } },
//!   "role_rules": [ { "dependency": "nsubj", "role": "SUBJ" } ]
//! }
//! ```

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use bioref_core::{ItemKind, RelationDefinition, Sense, SyntacticCategory};

use crate::error::Result;

/// Role name given to arguments licensed through an embedding type.
pub const COMPLEMENT_ROLE: &str = "COMP";

/// Role name of negation arguments.
pub const NEGATION_ROLE: &str = "NEG";

/// Relation types built into [`CompositionRules::biomedical`].
const BIOMEDICAL_TYPES: &[&str] = &[
    "ADMINISTERED_TO",
    "AFFECTS",
    "ASSOCIATED_WITH",
    "AUGMENTS",
    "CAUSES",
    "COEXISTS_WITH",
    "COMPLICATES",
    "CONVERTS_TO",
    "DIAGNOSES",
    "DISRUPTS",
    "INHIBITS",
    "INTERACTS_WITH",
    "LOCATION_OF",
    "MANIFESTATION_OF",
    "METHOD_OF",
    "OCCURS_IN",
    "PART_OF",
    "PRECEDES",
    "PREDISPOSES",
    "PREVENTS",
    "PROCESS_OF",
    "PRODUCES",
    "STIMULATES",
    "TREATS",
    "USES",
];

/// Maps a dependency edge to an argument role.
///
/// Optional fields narrow the rule; the most specific matching rule wins.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleRule {
    /// Dependency label (`nsubj`, `prep_of`, ...)
    pub dependency: String,
    /// Predicate lemma
    #[serde(default)]
    pub lemma: Option<String>,
    /// Syntactic category of the predicate's unit
    #[serde(default)]
    pub category: Option<SyntacticCategory>,
    /// Embedding type the active sense must declare
    #[serde(default)]
    pub embedding: Option<String>,
    /// Resulting role
    pub role: String,
}

impl RoleRule {
    /// Unrestricted rule.
    #[must_use]
    pub fn new(dependency: impl Into<String>, role: impl Into<String>) -> Self {
        Self {
            dependency: dependency.into(),
            lemma: None,
            category: None,
            embedding: None,
            role: role.into(),
        }
    }

    /// Restrict to one predicate lemma.
    #[must_use]
    pub fn for_lemma(mut self, lemma: impl Into<String>) -> Self {
        self.lemma = Some(lemma.into());
        self
    }

    /// Restrict to one syntactic category.
    #[must_use]
    pub fn for_category(mut self, category: SyntacticCategory) -> Self {
        self.category = Some(category);
        self
    }

    /// Restrict to senses declaring an embedding type.
    #[must_use]
    pub fn for_embedding(mut self, embedding: impl Into<String>) -> Self {
        self.embedding = Some(embedding.into());
        self
    }

    /// Number of narrowing fields that matched, or `None` if the rule does
    /// not apply.
    fn specificity(
        &self,
        dependency: &str,
        lemma: &str,
        category: SyntacticCategory,
        sense: Option<&Sense>,
    ) -> Option<usize> {
        if self.dependency != dependency {
            return None;
        }
        let mut score = 0;
        if let Some(l) = &self.lemma {
            if l != lemma {
                return None;
            }
            score += 1;
        }
        if let Some(c) = self.category {
            if c != category {
                return None;
            }
            score += 1;
        }
        if let Some(e) = &self.embedding {
            if !sense.is_some_and(|s| s.embedding_types.contains(e)) {
                return None;
            }
            score += 1;
        }
        Some(score)
    }
}

/// Rule set consumed by the composition engine.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CompositionRules {
    /// Relation type → role inventory
    pub definitions: BTreeMap<String, RelationDefinition>,
    /// Dependency → role table
    pub role_rules: Vec<RoleRule>,
    /// Embedding type → dependency labels it licenses as a complement
    pub embeddings: BTreeMap<String, Vec<String>>,
    /// Dependency labels marking negation
    pub negation_labels: Vec<String>,
    /// Relation type of synthesized generic predicates
    pub generic_type: String,
    /// Upper bound on readings enumerated for one predicate
    pub max_readings: usize,
}

impl Default for CompositionRules {
    fn default() -> Self {
        Self::biomedical()
    }
}

impl CompositionRules {
    /// Rules with no definitions or role rules.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            definitions: BTreeMap::new(),
            role_rules: Vec::new(),
            embeddings: BTreeMap::new(),
            negation_labels: vec!["neg".to_string()],
            generic_type: "GENERIC".to_string(),
            max_readings: 64,
        }
    }

    /// Built-in biomedical rule set.
    #[must_use]
    pub fn biomedical() -> Self {
        let classes = [ItemKind::Entity, ItemKind::Predication, ItemKind::Event];
        let mut rules = Self::empty();
        for t in BIOMEDICAL_TYPES {
            rules = rules.with_definition(RelationDefinition::binary(*t, &classes));
        }
        let generic = rules.generic_type.clone();
        rules = rules.with_definition(RelationDefinition::generic(generic));

        use SyntacticCategory::{Noun, Verb};
        let table = [
            RoleRule::new("nsubj", "SUBJ"),
            RoleRule::new("nsubjpass", "OBJ"),
            RoleRule::new("dobj", "OBJ"),
            RoleRule::new("iobj", "OBJ"),
            RoleRule::new("agent", "SUBJ"),
            RoleRule::new("prep_by", "SUBJ"),
            RoleRule::new("prep_of", "OBJ").for_category(Noun),
            RoleRule::new("prep_of", "SUBJ").for_category(Noun).for_lemma("effect"),
            RoleRule::new("poss", "OBJ").for_category(Noun),
            RoleRule::new("nn", "SUBJ").for_category(Noun),
            RoleRule::new("amod", "SUBJ").for_category(Noun),
            RoleRule::new("prep_with", "OBJ").for_lemma("interact"),
            RoleRule::new("prep_with", "OBJ").for_lemma("associate"),
            RoleRule::new("prep_with", "SUBJ").for_lemma("treat"),
            RoleRule::new("prep_on", "OBJ").for_lemma("effect"),
            RoleRule::new("prep_in", "OBJ").for_lemma("occur"),
            RoleRule::new("prep_to", "OBJ").for_lemma("convert"),
            RoleRule::new("prep_to", "OBJ").for_lemma("lead").for_category(Verb),
            RoleRule::new("xcomp", "COMP").for_embedding("XCOMP"),
            RoleRule::new("ccomp", "COMP").for_embedding("CCOMP"),
        ];
        rules.role_rules.extend(table);

        rules
            .embeddings
            .insert("CCOMP".to_string(), vec!["ccomp".to_string()]);
        rules
            .embeddings
            .insert("XCOMP".to_string(), vec!["xcomp".to_string()]);
        rules.embeddings.insert(
            "PREP_OF".to_string(),
            vec!["prep_of".to_string(), "prepc_of".to_string()],
        );
        rules
    }

    /// Parse a rule set from JSON. Missing fields take their built-in values.
    pub fn from_json(json: &str) -> Result<Self> {
        let mut rules: Self = serde_json::from_str(json)?;
        rules.max_readings = rules.max_readings.max(1);
        Ok(rules)
    }

    /// Add or replace a definition.
    #[must_use]
    pub fn with_definition(mut self, definition: RelationDefinition) -> Self {
        self.definitions
            .insert(definition.relation_type.clone(), definition);
        self
    }

    /// Append a role rule.
    #[must_use]
    pub fn with_role_rule(mut self, rule: RoleRule) -> Self {
        self.role_rules.push(rule);
        self
    }

    /// Add dependency labels licensed by an embedding type.
    #[must_use]
    pub fn with_embedding(mut self, embedding: impl Into<String>, labels: &[&str]) -> Self {
        self.embeddings
            .entry(embedding.into())
            .or_default()
            .extend(labels.iter().map(|l| l.to_string()));
        self
    }

    /// Definition of a relation type.
    #[must_use]
    pub fn definition(&self, relation_type: &str) -> Option<&RelationDefinition> {
        self.definitions.get(relation_type)
    }

    /// True if `label` marks negation.
    #[must_use]
    pub fn is_negation(&self, label: &str) -> bool {
        self.negation_labels.iter().any(|l| l == label)
    }

    /// Role for a dependency edge of a predicate.
    ///
    /// An embedding type of the active sense that licenses the edge yields
    /// [`COMPLEMENT_ROLE`]; otherwise the most specific role rule applies,
    /// earlier rules winning ties.
    #[must_use]
    pub fn role_for(
        &self,
        dependency: &str,
        lemma: &str,
        category: SyntacticCategory,
        sense: Option<&Sense>,
    ) -> Option<String> {
        if let Some(sense) = sense {
            let embedded = sense.embedding_types.iter().any(|t| {
                self.embeddings
                    .get(t)
                    .is_some_and(|labels| labels.iter().any(|l| l == dependency))
            });
            if embedded {
                return Some(COMPLEMENT_ROLE.to_string());
            }
        }
        let mut best: Option<(usize, &RoleRule)> = None;
        for rule in &self.role_rules {
            let Some(score) = rule.specificity(dependency, lemma, category, sense) else {
                continue;
            };
            if best.map_or(true, |(b, _)| score > b) {
                best = Some((score, rule));
            }
        }
        best.map(|(_, rule)| rule.role.clone())
    }
}

/// Flags of [`crate::compose::compose_document_predications`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ComposeOptions {
    /// Synthesize a generic predicate for nodes with arguments but no predicate
    pub create_generic: bool,
    /// Register relations already attached to a node instead of composing anew
    pub reuse_existing: bool,
}

impl Default for ComposeOptions {
    fn default() -> Self {
        Self {
            create_generic: false,
            reuse_existing: true,
        }
    }
}

impl ComposeOptions {
    /// Enable generic predicate synthesis.
    #[must_use]
    pub fn with_generic(mut self, create_generic: bool) -> Self {
        self.create_generic = create_generic;
        self
    }

    /// Toggle reuse of existing relations.
    #[must_use]
    pub fn with_reuse(mut self, reuse_existing: bool) -> Self {
        self.reuse_existing = reuse_existing;
        self
    }
}
