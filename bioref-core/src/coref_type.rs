//! Coreference and mention type enumerations.
//!
//! Both enumerations are closed: every consumer matches them exhaustively,
//! so adding a variant forces every strategy table, role mapping and
//! direction check to be revisited.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;
use crate::span::Span;

// =============================================================================
// Search direction
// =============================================================================

/// Where a referent may sit relative to its mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SearchDirection {
    /// Referent must precede the mention.
    Backward,
    /// Referent must follow the mention.
    Forward,
    /// Either side.
    Both,
}

impl SearchDirection {
    /// Check a referent span against a mention span.
    #[must_use]
    pub fn allows(&self, mention: &Span, referent: &Span) -> bool {
        match self {
            SearchDirection::Backward => referent.is_left_of(mention),
            SearchDirection::Forward => mention.is_left_of(referent),
            SearchDirection::Both => true,
        }
    }
}

// =============================================================================
// Coreference types
// =============================================================================

/// Kind of coreference link.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum CoreferenceType {
    /// Pronoun or NP pointing back to an earlier referent.
    Anaphora,
    /// Pronoun pointing forward to a later referent.
    Cataphora,
    /// "IL-2, a cytokine," style apposition.
    Appositive,
    /// "X is a Y" copular constructions.
    PredicateNominative,
    /// Two mentions mapped to the same ontology concept.
    Ontological,
}

impl CoreferenceType {
    /// Resolution order used by the document resolver.
    pub const PRIORITY: [CoreferenceType; 5] = [
        CoreferenceType::Appositive,
        CoreferenceType::PredicateNominative,
        CoreferenceType::Anaphora,
        CoreferenceType::Cataphora,
        CoreferenceType::Ontological,
    ];

    /// Allowed referent position.
    #[must_use]
    pub const fn direction(&self) -> SearchDirection {
        match self {
            CoreferenceType::Anaphora => SearchDirection::Backward,
            CoreferenceType::Cataphora => SearchDirection::Forward,
            CoreferenceType::Appositive
            | CoreferenceType::PredicateNominative
            | CoreferenceType::Ontological => SearchDirection::Both,
        }
    }

    /// Role carried by the mention side of a chain.
    #[must_use]
    pub const fn expression_role(&self) -> &'static str {
        match self {
            CoreferenceType::Anaphora => "Anaphor",
            CoreferenceType::Cataphora => "Cataphor",
            CoreferenceType::Appositive | CoreferenceType::PredicateNominative => "Head",
            CoreferenceType::Ontological => "Equiv",
        }
    }

    /// Role carried by the referent side of a chain.
    #[must_use]
    pub const fn referent_role(&self) -> &'static str {
        match self {
            CoreferenceType::Anaphora => "Antecedent",
            CoreferenceType::Cataphora => "Consequent",
            CoreferenceType::Appositive | CoreferenceType::PredicateNominative => "Attribute",
            CoreferenceType::Ontological => "Equiv",
        }
    }

    /// Label used in standoff output.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            CoreferenceType::Anaphora => "Anaphora",
            CoreferenceType::Cataphora => "Cataphora",
            CoreferenceType::Appositive => "Appositive",
            CoreferenceType::PredicateNominative => "PredicateNominative",
            CoreferenceType::Ontological => "Ontological",
        }
    }
}

impl fmt::Display for CoreferenceType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CoreferenceType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CoreferenceType::PRIORITY
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_input(format!("unknown coreference type '{s}'")))
    }
}

// =============================================================================
// Mention types
// =============================================================================

/// Category of a coreferential mention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum MentionType {
    /// it, they, he, she, them
    PersonalPronoun,
    /// its, their, his, her
    PossessivePronoun,
    /// this, that, these, those (standalone)
    DemonstrativePronoun,
    /// each, both, either, neither (standalone)
    DistributivePronoun,
    /// each other, one another
    ReciprocalPronoun,
    /// some, others, another, one
    IndefinitePronoun,
    /// which, who, that (relative clause)
    RelativePronoun,
    /// "the protein"
    DefiniteNP,
    /// "a protein"
    IndefiniteNP,
    /// "proteins", "IL-2"
    ZeroArticleNP,
    /// "this protein"
    DemonstrativeNP,
    /// "each protein", "both genes"
    DistributiveNP,
}

impl MentionType {
    /// All mention types in declaration order.
    pub const ALL: [MentionType; 12] = [
        MentionType::PersonalPronoun,
        MentionType::PossessivePronoun,
        MentionType::DemonstrativePronoun,
        MentionType::DistributivePronoun,
        MentionType::ReciprocalPronoun,
        MentionType::IndefinitePronoun,
        MentionType::RelativePronoun,
        MentionType::DefiniteNP,
        MentionType::IndefiniteNP,
        MentionType::ZeroArticleNP,
        MentionType::DemonstrativeNP,
        MentionType::DistributiveNP,
    ];

    /// Pronominal mention types.
    pub const PRONOMINAL: [MentionType; 7] = [
        MentionType::PersonalPronoun,
        MentionType::PossessivePronoun,
        MentionType::DemonstrativePronoun,
        MentionType::DistributivePronoun,
        MentionType::ReciprocalPronoun,
        MentionType::IndefinitePronoun,
        MentionType::RelativePronoun,
    ];

    /// Nominal mention types.
    pub const NOMINAL: [MentionType; 5] = [
        MentionType::DefiniteNP,
        MentionType::IndefiniteNP,
        MentionType::ZeroArticleNP,
        MentionType::DemonstrativeNP,
        MentionType::DistributiveNP,
    ];

    /// True for pronoun categories.
    #[must_use]
    pub const fn is_pronominal(&self) -> bool {
        matches!(
            self,
            MentionType::PersonalPronoun
                | MentionType::PossessivePronoun
                | MentionType::DemonstrativePronoun
                | MentionType::DistributivePronoun
                | MentionType::ReciprocalPronoun
                | MentionType::IndefinitePronoun
                | MentionType::RelativePronoun
        )
    }

    /// True for noun phrase categories.
    #[must_use]
    pub const fn is_nominal(&self) -> bool {
        !self.is_pronominal()
    }

    /// Type label used for Expression items.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            MentionType::PersonalPronoun => "PersonalPronoun",
            MentionType::PossessivePronoun => "PossessivePronoun",
            MentionType::DemonstrativePronoun => "DemonstrativePronoun",
            MentionType::DistributivePronoun => "DistributivePronoun",
            MentionType::ReciprocalPronoun => "ReciprocalPronoun",
            MentionType::IndefinitePronoun => "IndefinitePronoun",
            MentionType::RelativePronoun => "RelativePronoun",
            MentionType::DefiniteNP => "DefiniteNP",
            MentionType::IndefiniteNP => "IndefiniteNP",
            MentionType::ZeroArticleNP => "ZeroArticleNP",
            MentionType::DemonstrativeNP => "DemonstrativeNP",
            MentionType::DistributiveNP => "DistributiveNP",
        }
    }
}

impl fmt::Display for MentionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for MentionType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        MentionType::ALL
            .iter()
            .copied()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| Error::invalid_input(format!("unknown mention type '{s}'")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_direction_constraints() {
        let mention = Span::new(20, 22);
        let before = Span::new(0, 11);
        let after = Span::new(30, 40);
        assert!(CoreferenceType::Anaphora.direction().allows(&mention, &before));
        assert!(!CoreferenceType::Anaphora.direction().allows(&mention, &after));
        assert!(CoreferenceType::Cataphora.direction().allows(&mention, &after));
        assert!(!CoreferenceType::Cataphora.direction().allows(&mention, &before));
        assert!(CoreferenceType::Appositive.direction().allows(&mention, &before));
        assert!(CoreferenceType::Ontological.direction().allows(&mention, &after));
    }

    #[test]
    fn test_role_pairs() {
        assert_eq!(CoreferenceType::Anaphora.expression_role(), "Anaphor");
        assert_eq!(CoreferenceType::Anaphora.referent_role(), "Antecedent");
        assert_eq!(CoreferenceType::Cataphora.expression_role(), "Cataphor");
        assert_eq!(CoreferenceType::Cataphora.referent_role(), "Consequent");
        assert_eq!(CoreferenceType::Appositive.referent_role(), "Attribute");
        assert_eq!(CoreferenceType::Ontological.expression_role(), "Equiv");
    }

    #[test]
    fn test_mention_classification_is_a_partition() {
        for t in MentionType::ALL {
            assert_ne!(t.is_pronominal(), t.is_nominal(), "{t}");
            assert_eq!(MentionType::PRONOMINAL.contains(&t), t.is_pronominal());
            assert_eq!(MentionType::NOMINAL.contains(&t), t.is_nominal());
        }
    }

    #[test]
    fn test_parse_labels() {
        assert_eq!(
            "definitenp".parse::<MentionType>().unwrap(),
            MentionType::DefiniteNP
        );
        assert_eq!(
            "Cataphora".parse::<CoreferenceType>().unwrap(),
            CoreferenceType::Cataphora
        );
        assert!("Bridging".parse::<CoreferenceType>().is_err());
    }
}
