//! Relation definitions: which roles a relation type has and what may fill them.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::semantics::{Argument, ItemKind, SemanticItem};

/// Constraint on one role of a relation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Role name
    pub role: String,
    /// Allowed item kinds; empty means any. `Entity` also admits expressions.
    #[serde(default)]
    pub classes: Vec<ItemKind>,
    /// Allowed semantic types; empty means any.
    #[serde(default)]
    pub types: Vec<String>,
    /// Mandatory for a resolved relation
    #[serde(default)]
    pub core: bool,
    /// More than one filler allowed
    #[serde(default)]
    pub multiple: bool,
}

impl RoleDefinition {
    /// Optional, single-valued role accepting anything.
    #[must_use]
    pub fn new(role: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            classes: Vec::new(),
            types: Vec::new(),
            core: false,
            multiple: false,
        }
    }

    /// Mark the role mandatory.
    #[must_use]
    pub fn core(mut self) -> Self {
        self.core = true;
        self
    }

    /// Allow several fillers.
    #[must_use]
    pub fn multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Restrict the filler kinds.
    #[must_use]
    pub fn with_classes(mut self, classes: &[ItemKind]) -> Self {
        self.classes = classes.to_vec();
        self
    }

    /// Restrict the filler semantic types.
    #[must_use]
    pub fn with_types(mut self, types: &[&str]) -> Self {
        self.types = types.iter().map(|t| t.to_string()).collect();
        self
    }

    /// Check one candidate filler.
    #[must_use]
    pub fn accepts(&self, item: &SemanticItem) -> bool {
        let kind = item.kind();
        let class_ok = self.classes.is_empty()
            || self.classes.contains(&kind)
            || (kind == ItemKind::Expression && self.classes.contains(&ItemKind::Entity));
        if !class_ok {
            return false;
        }
        if self.types.is_empty() {
            return true;
        }
        let tags = item.type_tags();
        self.types.iter().any(|t| tags.contains(t.as_str()))
    }
}

/// Role inventory of a relation type.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RelationDefinition {
    /// Relation type (e.g. "INHIBITS")
    pub relation_type: String,
    /// Roles in canonical order
    pub roles: Vec<RoleDefinition>,
    /// Role swapped with `object_role` by inverse senses
    #[serde(default = "default_subject")]
    pub subject_role: String,
    /// Role swapped with `subject_role` by inverse senses
    #[serde(default = "default_object")]
    pub object_role: String,
}

fn default_subject() -> String {
    "SUBJ".to_string()
}

fn default_object() -> String {
    "OBJ".to_string()
}

impl RelationDefinition {
    /// Definition with the default `SUBJ`/`OBJ` pair and no roles yet.
    #[must_use]
    pub fn new(relation_type: impl Into<String>) -> Self {
        Self {
            relation_type: relation_type.into(),
            roles: Vec::new(),
            subject_role: default_subject(),
            object_role: default_object(),
        }
    }

    /// Add a role.
    #[must_use]
    pub fn with_role(mut self, role: RoleDefinition) -> Self {
        self.roles.push(role);
        self
    }

    /// Binary relation with core SUBJ and OBJ restricted to `classes`,
    /// plus optional COMP.
    #[must_use]
    pub fn binary(relation_type: impl Into<String>, classes: &[ItemKind]) -> Self {
        Self::new(relation_type)
            .with_role(RoleDefinition::new("SUBJ").core().with_classes(classes))
            .with_role(RoleDefinition::new("OBJ").core().with_classes(classes))
            .with_role(RoleDefinition::new("COMP").with_classes(&[ItemKind::Predication]))
    }

    /// Permissive definition used by synthesized generic predicates: every
    /// role optional and multi-valued, at least one argument required by
    /// the composer.
    #[must_use]
    pub fn generic(relation_type: impl Into<String>) -> Self {
        let mut def = Self::new(relation_type);
        for role in ["SUBJ", "OBJ", "COMP", "ARG"] {
            def.roles.push(RoleDefinition::new(role).multiple());
        }
        def
    }

    /// Definition of a role.
    #[must_use]
    pub fn role(&self, role: &str) -> Option<&RoleDefinition> {
        self.roles.iter().find(|r| r.role == role)
    }

    /// True if `role` exists and accepts `item`.
    #[must_use]
    pub fn accepts(&self, role: &str, item: &SemanticItem) -> bool {
        self.role(role).is_some_and(|r| r.accepts(item))
    }

    /// Mandatory roles.
    pub fn core_roles(&self) -> impl Iterator<Item = &str> {
        self.roles
            .iter()
            .filter(|r| r.core)
            .map(|r| r.role.as_str())
    }

    /// True if every core role is present among `arguments`.
    #[must_use]
    pub fn is_resolved(&self, arguments: &[Argument]) -> bool {
        self.core_roles()
            .all(|core| arguments.iter().any(|a| a.role == core))
    }

    /// Single-valued roles with more than one filler, in definition order.
    #[must_use]
    pub fn multiplicity_violations(&self, arguments: &[Argument]) -> Vec<String> {
        let mut counts: BTreeMap<&str, usize> = BTreeMap::new();
        for arg in arguments {
            *counts.entry(arg.role.as_str()).or_default() += 1;
        }
        self.roles
            .iter()
            .filter(|r| !r.multiple && counts.get(r.role.as_str()).copied().unwrap_or(0) > 1)
            .map(|r| r.role.clone())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::{Concept, EntityData, ItemId, PredicateData, Semantics};
    use crate::span::Span;

    fn item(semantics: Semantics, item_type: &str) -> SemanticItem {
        SemanticItem {
            id: ItemId(0),
            label: "T1".into(),
            document: "d".into(),
            item_type: item_type.into(),
            span: Span::new(0, 1),
            features: Default::default(),
            semantics,
        }
    }

    #[test]
    fn test_role_constraints() {
        let role = RoleDefinition::new("SUBJ")
            .with_classes(&[ItemKind::Entity])
            .with_types(&["gngm", "aapp"]);
        let protein = item(
            Semantics::Entity(EntityData {
                concepts: vec![Concept::new("C1", "p53", &["gngm"])],
                sense: Some(0),
                ..EntityData::default()
            }),
            "Entity",
        );
        let predicate = item(Semantics::Predicate(PredicateData::new("bind")), "gngm");
        assert!(role.accepts(&protein));
        assert!(!role.accepts(&predicate));
    }

    #[test]
    fn test_resolution_and_multiplicity() {
        let def = RelationDefinition::binary("INHIBITS", &[ItemKind::Entity]);
        let args = vec![
            Argument::new("SUBJ", ItemId(1)),
            Argument::new("SUBJ", ItemId(2)),
            Argument::new("OBJ", ItemId(3)),
        ];
        assert!(def.is_resolved(&args));
        assert!(!def.is_resolved(&args[..2]));
        assert_eq!(def.multiplicity_violations(&args), vec!["SUBJ".to_string()]);

        let generic = RelationDefinition::generic("GENERIC");
        assert!(generic.multiplicity_violations(&args).is_empty());
        assert!(generic.is_resolved(&[]));
    }
}
