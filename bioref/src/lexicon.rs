//! English pronoun lexicon and the biomedical domain lexicon.
//!
//! The pronoun tables are static and compiled once. The [`DomainLexicon`]
//! is data: it ships with a biomedical default and can be replaced from
//! JSON without recompiling.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::Result;
use bioref_core::MentionType;

// =============================================================================
// Agreement features
// =============================================================================

/// Grammatical person.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Person {
    /// I, we
    First,
    /// you
    Second,
    /// everything else
    Third,
}

/// Grammatical number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Number {
    /// one referent
    Singular,
    /// several referents
    Plural,
}

/// Grammatical gender.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Gender {
    /// he, him, his
    Masculine,
    /// she, her, hers
    Feminine,
    /// it, its
    Neuter,
}

/// Agreement features of a pronoun. `None` means unspecified.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PronounFeatures {
    /// Person
    pub person: Option<Person>,
    /// Number
    pub number: Option<Number>,
    /// Gender
    pub gender: Option<Gender>,
    /// Animacy
    pub animate: Option<bool>,
}

const fn features(
    person: Option<Person>,
    number: Option<Number>,
    gender: Option<Gender>,
    animate: Option<bool>,
) -> PronounFeatures {
    PronounFeatures {
        person,
        number,
        gender,
        animate,
    }
}

static PRONOUN_FEATURES: Lazy<HashMap<&'static str, PronounFeatures>> = Lazy::new(|| {
    use Gender::*;
    use Number::*;
    use Person::*;
    let third_neuter = features(Some(Third), Some(Singular), Some(Neuter), Some(false));
    let third_plural = features(Some(Third), Some(Plural), None, None);
    let masculine = features(Some(Third), Some(Singular), Some(Masculine), Some(true));
    let feminine = features(Some(Third), Some(Singular), Some(Feminine), Some(true));
    let first_sg = features(Some(First), Some(Singular), None, Some(true));
    let first_pl = features(Some(First), Some(Plural), None, Some(true));
    let second = features(Some(Second), None, None, Some(true));
    let third_sg = features(Some(Third), Some(Singular), None, None);
    let third = features(Some(Third), None, None, None);

    let mut m = HashMap::new();
    for form in ["it", "its", "itself"] {
        m.insert(form, third_neuter);
    }
    for form in ["they", "them", "their", "theirs", "themselves", "these", "those", "both"] {
        m.insert(form, third_plural);
    }
    for form in ["he", "him", "his", "himself"] {
        m.insert(form, masculine);
    }
    for form in ["she", "her", "hers", "herself"] {
        m.insert(form, feminine);
    }
    for form in ["i", "me", "my", "mine", "myself"] {
        m.insert(form, first_sg);
    }
    for form in ["we", "us", "our", "ours", "ourselves"] {
        m.insert(form, first_pl);
    }
    for form in ["you", "your", "yours", "yourself", "yourselves"] {
        m.insert(form, second);
    }
    for form in ["this", "that", "each", "either", "neither", "another", "one"] {
        m.insert(form, third_sg);
    }
    for form in [
        "which", "who", "whom", "whose", "some", "others", "all", "any", "several", "many", "few",
    ] {
        m.insert(form, third);
    }
    m.insert("each other", third_plural);
    m.insert("one another", third_plural);
    m
});

/// Agreement features of a pronoun form (case-insensitive).
#[must_use]
pub fn pronoun_features(form: &str) -> Option<PronounFeatures> {
    PRONOUN_FEATURES.get(form.to_lowercase().as_str()).copied()
}

// =============================================================================
// Pronoun and determiner classes
// =============================================================================

const PERSONAL: &[&str] = &[
    "it", "they", "them", "he", "him", "she", "her", "i", "me", "we", "us", "you", "itself",
    "themselves", "himself", "herself", "myself", "ourselves", "yourself", "yourselves",
];
const POSSESSIVE: &[&str] = &[
    "its", "their", "his", "her", "my", "our", "your", "theirs", "hers", "mine", "ours", "yours",
];
const DEMONSTRATIVE: &[&str] = &["this", "that", "these", "those"];
const DISTRIBUTIVE: &[&str] = &["each", "every", "both", "either", "neither"];
const INDEFINITE: &[&str] = &[
    "some", "others", "another", "one", "all", "any", "several", "many", "few",
];
const RELATIVE: &[&str] = &["which", "who", "whom", "whose", "that"];
const RECIPROCAL: &[&str] = &["each other", "one another"];

/// Mention type of a standalone pronoun given its form and Penn tag.
///
/// Relative pronouns need a WH tag; "that" tagged `IN` is a complementizer
/// and yields `None`.
#[must_use]
pub fn pronoun_type(form: &str, pos: &str) -> Option<MentionType> {
    let form = form.to_lowercase();
    let form = form.as_str();
    if RECIPROCAL.contains(&form) {
        return Some(MentionType::ReciprocalPronoun);
    }
    match pos {
        "IN" => None,
        "WDT" | "WP" | "WP$" => RELATIVE
            .contains(&form)
            .then_some(MentionType::RelativePronoun),
        "PRP$" => POSSESSIVE
            .contains(&form)
            .then_some(MentionType::PossessivePronoun),
        _ if POSSESSIVE.contains(&form) && !PERSONAL.contains(&form) => {
            Some(MentionType::PossessivePronoun)
        }
        _ if PERSONAL.contains(&form) => Some(MentionType::PersonalPronoun),
        _ if DEMONSTRATIVE.contains(&form) => Some(MentionType::DemonstrativePronoun),
        _ if DISTRIBUTIVE.contains(&form) => Some(MentionType::DistributivePronoun),
        _ if INDEFINITE.contains(&form) => Some(MentionType::IndefinitePronoun),
        _ => None,
    }
}

/// Nominal mention type from the first word of a noun-headed unit.
#[must_use]
pub fn determiner_type(first_word: &str) -> MentionType {
    match first_word.to_lowercase().as_str() {
        "the" => MentionType::DefiniteNP,
        "a" | "an" => MentionType::IndefiniteNP,
        w if DEMONSTRATIVE.contains(&w) => MentionType::DemonstrativeNP,
        w if DISTRIBUTIVE.contains(&w) => MentionType::DistributiveNP,
        _ => MentionType::ZeroArticleNP,
    }
}

/// Number signalled by a determiner, if any.
#[must_use]
pub fn determiner_number(first_word: &str) -> Option<Number> {
    match first_word.to_lowercase().as_str() {
        "a" | "an" | "this" | "that" | "each" | "every" | "either" | "neither" => {
            Some(Number::Singular)
        }
        "these" | "those" | "both" => Some(Number::Plural),
        _ => None,
    }
}

// =============================================================================
// Pleonastic "it"
// =============================================================================

static PLEONASTIC_ADJECTIVE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^it\s+(?:is|was|has\s+been|had\s+been|will\s+be|would\s+be|may\s+be|might\s+be|could\s+be|seems|seemed|appears|appeared|remains|remained|becomes|became)\s+(?:not\s+)?(?:\w+ly\s+)?(?:possible|likely|unlikely|clear|unclear|evident|apparent|known|unknown|shown|suggested|necessary|important|interesting|noteworthy|thought|believed|reported|proposed|hypothesized|postulated|assumed|expected|conceivable|plausible|essential|critical|difficult|noted|found|observed|demonstrated|established|accepted|recognized|tempting|reasonable|surprising)\b",
    )
    .expect("Failed to compile pleonastic adjective pattern")
});

static PLEONASTIC_VERB: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^it\s+(?:seems|seemed|appears|appeared|turns\s+out|turned\s+out|follows)\s+(?:that|to|as\s+if)\b")
        .expect("Failed to compile pleonastic verb pattern")
});

/// True if the text starting at an "it" reads as a pleonastic construction
/// ("it is likely that", "it seems to").
#[must_use]
pub fn is_pleonastic(text_from_it: &str) -> bool {
    PLEONASTIC_ADJECTIVE.is_match(text_from_it) || PLEONASTIC_VERB.is_match(text_from_it)
}

// =============================================================================
// Domain lexicon
// =============================================================================

/// Word lists and type tables used by mention filters and agreements.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DomainLexicon {
    /// General head nouns usable as anaphoric NPs, with the semantic types
    /// they can denote.
    pub hypernyms: BTreeMap<String, Vec<String>>,
    /// Semantic type → types it can be coerced to.
    pub coercions: BTreeMap<String, Vec<String>>,
    /// Predicate lemma → semantic types it selects for its arguments.
    pub selectional_preferences: BTreeMap<String, Vec<String>>,
    /// Semantic types denoting animate referents.
    pub animate_types: Vec<String>,
    /// Head nouns denoting male referents.
    pub masculine_nouns: Vec<String>,
    /// Head nouns denoting female referents.
    pub feminine_nouns: Vec<String>,
    /// Head nouns denoting animate referents.
    pub animate_nouns: Vec<String>,
    /// Connectives that block anaphora across them.
    pub contrastive_connectives: Vec<String>,
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

fn table(entries: &[(&str, &[&str])]) -> BTreeMap<String, Vec<String>> {
    entries
        .iter()
        .map(|(k, v)| (k.to_string(), strings(v)))
        .collect()
}

impl Default for DomainLexicon {
    fn default() -> Self {
        Self::biomedical()
    }
}

impl DomainLexicon {
    /// Built-in biomedical lexicon (UMLS semantic type abbreviations).
    #[must_use]
    pub fn biomedical() -> Self {
        Self {
            hypernyms: table(&[
                ("protein", &["aapp", "gngm", "enzy", "rcpt", "imft", "bacs"]),
                ("enzyme", &["enzy", "aapp", "gngm"]),
                ("kinase", &["enzy", "aapp", "gngm"]),
                ("receptor", &["rcpt", "aapp", "gngm"]),
                ("gene", &["gngm", "aapp"]),
                ("cytokine", &["imft", "aapp", "gngm", "bacs"]),
                ("factor", &["aapp", "gngm", "bacs", "imft"]),
                ("drug", &["phsu", "orch", "antb", "clnd"]),
                ("agent", &["phsu", "orch", "antb", "bacs"]),
                ("compound", &["orch", "phsu", "inch"]),
                ("molecule", &["aapp", "orch", "bacs", "nnon"]),
                ("disease", &["dsyn", "neop", "mobd", "patf"]),
                ("disorder", &["dsyn", "mobd", "patf"]),
                ("tumor", &["neop"]),
                ("cell", &["cell"]),
                ("patient", &["podg", "humn"]),
                ("virus", &["virs"]),
                ("bacterium", &["bact"]),
                ("mutation", &["gngm", "comd"]),
                ("therapy", &["topp"]),
                ("treatment", &["topp", "phsu"]),
            ]),
            coercions: table(&[
                ("gngm", &["aapp", "enzy", "rcpt"]),
                ("aapp", &["gngm", "enzy", "rcpt", "imft"]),
                ("enzy", &["aapp", "gngm"]),
                ("rcpt", &["aapp", "gngm"]),
                ("orch", &["phsu"]),
                ("phsu", &["orch"]),
                ("podg", &["humn"]),
                ("humn", &["podg"]),
            ]),
            selectional_preferences: table(&[
                ("activate", &["aapp", "gngm", "enzy", "phsu", "bacs", "imft"]),
                ("inhibit", &["aapp", "gngm", "enzy", "phsu", "orch", "bacs"]),
                ("phosphorylate", &["enzy", "aapp", "gngm"]),
                ("bind", &["aapp", "gngm", "rcpt", "phsu", "orch", "nnon"]),
                ("express", &["gngm", "cell", "aapp"]),
                ("encode", &["gngm", "nnon"]),
                ("treat", &["phsu", "orch", "antb", "topp"]),
                ("administer", &["phsu", "orch", "antb"]),
                ("cause", &["dsyn", "virs", "bact", "gngm", "phsu", "orch"]),
            ]),
            animate_types: strings(&[
                "humn", "popg", "podg", "famg", "aggp", "grup", "prog", "mamm", "anim", "bird",
                "fish", "rept", "amph", "vtbt",
            ]),
            masculine_nouns: strings(&["man", "men", "boy", "father", "male", "son", "brother"]),
            feminine_nouns: strings(&[
                "woman", "women", "girl", "mother", "female", "daughter", "sister",
            ]),
            animate_nouns: strings(&[
                "patient", "subject", "participant", "volunteer", "child", "infant", "person",
                "people", "individual", "mouse", "mice", "rat", "animal", "man", "woman",
                "investigator", "author",
            ]),
            contrastive_connectives: strings(&[
                "however",
                "but",
                "whereas",
                "although",
                "though",
                "while",
                "in contrast",
                "conversely",
                "nevertheless",
                "on the other hand",
            ]),
        }
    }

    /// Load a lexicon from JSON. Missing fields fall back to the built-in values.
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(serde_json::from_str(json)?)
    }

    /// Semantic types a general head noun can denote.
    #[must_use]
    pub fn hypernym_types(&self, head: &str) -> Option<&[String]> {
        self.hypernyms.get(head).map(Vec::as_slice)
    }

    /// A type plus every type it coerces to.
    #[must_use]
    pub fn coerced<'a>(&'a self, semantic_type: &'a str) -> Vec<&'a str> {
        let mut types = vec![semantic_type];
        if let Some(extra) = self.coercions.get(semantic_type) {
            types.extend(extra.iter().map(String::as_str));
        }
        types
    }

    /// True if any type denotes an animate referent.
    #[must_use]
    pub fn is_animate_type<'a>(&self, mut types: impl Iterator<Item = &'a str>) -> bool {
        types.any(|t| self.animate_types.iter().any(|a| a == t))
    }

    /// Gender of a head noun, if lexically marked.
    #[must_use]
    pub fn noun_gender(&self, head: &str) -> Option<Gender> {
        if self.masculine_nouns.iter().any(|n| n == head) {
            Some(Gender::Masculine)
        } else if self.feminine_nouns.iter().any(|n| n == head) {
            Some(Gender::Feminine)
        } else {
            None
        }
    }

    /// True if `text` contains a contrastive connective as whole words.
    #[must_use]
    pub fn has_contrastive_connective(&self, text: &str) -> bool {
        let words: Vec<String> = text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
            .map(str::to_lowercase)
            .collect();
        self.contrastive_connectives.iter().any(|connective| {
            let parts: Vec<&str> = connective.split_whitespace().collect();
            !parts.is_empty()
                && words
                    .windows(parts.len())
                    .any(|window| window.iter().zip(&parts).all(|(w, p)| w == p))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pronoun_classification() {
        assert_eq!(pronoun_type("It", "PRP"), Some(MentionType::PersonalPronoun));
        assert_eq!(pronoun_type("its", "PRP$"), Some(MentionType::PossessivePronoun));
        assert_eq!(pronoun_type("her", "PRP$"), Some(MentionType::PossessivePronoun));
        assert_eq!(pronoun_type("her", "PRP"), Some(MentionType::PersonalPronoun));
        assert_eq!(pronoun_type("these", "DT"), Some(MentionType::DemonstrativePronoun));
        assert_eq!(pronoun_type("both", "DT"), Some(MentionType::DistributivePronoun));
        assert_eq!(pronoun_type("which", "WDT"), Some(MentionType::RelativePronoun));
        assert_eq!(pronoun_type("that", "WDT"), Some(MentionType::RelativePronoun));
        assert_eq!(pronoun_type("that", "IN"), None);
        assert_eq!(pronoun_type("which", "DT"), None);
        assert_eq!(pronoun_type("each other", "PRP"), Some(MentionType::ReciprocalPronoun));
        assert_eq!(pronoun_type("others", "NNS"), Some(MentionType::IndefinitePronoun));
    }

    #[test]
    fn test_determiners() {
        assert_eq!(determiner_type("The"), MentionType::DefiniteNP);
        assert_eq!(determiner_type("an"), MentionType::IndefiniteNP);
        assert_eq!(determiner_type("these"), MentionType::DemonstrativeNP);
        assert_eq!(determiner_type("each"), MentionType::DistributiveNP);
        assert_eq!(determiner_type("IL-2"), MentionType::ZeroArticleNP);
        assert_eq!(determiner_number("those"), Some(Number::Plural));
    }

    #[test]
    fn test_pronoun_features() {
        let it = pronoun_features("It").unwrap();
        assert_eq!(it.number, Some(Number::Singular));
        assert_eq!(it.animate, Some(false));
        assert_eq!(pronoun_features("they").unwrap().number, Some(Number::Plural));
        assert_eq!(pronoun_features("we").unwrap().person, Some(Person::First));
        assert!(pronoun_features("protein").is_none());
    }

    #[test]
    fn test_pleonastic_it() {
        assert!(is_pleonastic("it is likely that IL-2 binds"));
        assert!(is_pleonastic("It has been shown that"));
        assert!(is_pleonastic("it seems that the"));
        assert!(!is_pleonastic("It activates transcription."));
    }

    #[test]
    fn test_domain_lexicon_json_overrides() {
        let lex = DomainLexicon::from_json(r#"{"animate_types": ["humn"]}"#).unwrap();
        assert_eq!(lex.animate_types, vec!["humn".to_string()]);
        assert!(lex.hypernyms.contains_key("protein"));
        assert!(lex.has_contrastive_connective("binds DNA. In contrast, it"));
        assert!(!lex.has_contrastive_connective("binds DNA. It"));
        assert!(lex.coerced("gngm").contains(&"aapp"));
    }
}
