//! Integration tests for document-level coreference resolution.
//!
//! Tests the full pipeline: mention detection → linking → chain generation → pruning

use std::sync::Arc;

use bioref::coref::prune_chains;
use bioref::{
    resolve_document, Concept, Configuration, CoreferenceType, CorefResolver, Document, ItemId,
    ItemKind, UnitId,
};

fn chain_types(doc: &Document) -> Vec<CoreferenceType> {
    doc.items()
        .of_kind(ItemKind::CoreferenceChain)
        .filter_map(|c| c.as_relation()?.coreference_type())
        .collect()
}

fn units_of_all(doc: &Document, items: &[ItemId]) -> Vec<UnitId> {
    items.iter().flat_map(|i| doc.units_of(*i)).collect()
}

// =============================================================================
// Pruning: cataphora wins over anaphora
// =============================================================================

fn cataphora_document() -> (Document, UnitId, UnitId, UnitId) {
    let text = "The cytokine is abundant. Although it is expressed, IL-6 activates STAT3.";
    let mut doc = Document::new("cataphora", text);
    let s0 = doc.add_sentence_text("The cytokine is abundant.").unwrap();
    let s1 = doc
        .add_sentence_text("Although it is expressed, IL-6 activates STAT3.")
        .unwrap();

    let cytokine = doc.add_phrase(s0, "The cytokine", "DT NN").unwrap();
    let is0 = doc.add_phrase_with_lemmas(s0, "is", "VBZ", "be").unwrap();
    let abundant = doc.add_phrase(s0, "abundant", "JJ").unwrap();
    doc.add_dependency("nsubj", abundant, cytokine).unwrap();
    doc.add_dependency("cop", abundant, is0).unwrap();

    let although = doc.add_phrase(s1, "Although", "IN").unwrap();
    let it = doc.add_phrase(s1, "it", "PRP").unwrap();
    let is1 = doc.add_phrase_with_lemmas(s1, "is", "VBZ", "be").unwrap();
    let expressed = doc
        .add_phrase_with_lemmas(s1, "expressed", "VBN", "express")
        .unwrap();
    let il6 = doc.add_phrase(s1, "IL-6", "NN").unwrap();
    let activates = doc
        .add_phrase_with_lemmas(s1, "activates", "VBZ", "activate")
        .unwrap();
    let stat3 = doc.add_phrase(s1, "STAT3", "NN").unwrap();
    doc.add_dependency("advcl", activates, expressed).unwrap();
    doc.add_dependency("mark", expressed, although).unwrap();
    doc.add_dependency("nsubjpass", expressed, it).unwrap();
    doc.add_dependency("auxpass", expressed, is1).unwrap();
    doc.add_dependency("nsubj", activates, il6).unwrap();
    doc.add_dependency("dobj", activates, stat3).unwrap();

    doc.create_entity(cytokine, "aapp", vec![Concept::new("C0079189", "Cytokine", &["aapp", "imft"])])
        .unwrap();
    doc.create_entity(il6, "gngm", vec![Concept::new("C0021760", "IL6", &["gngm", "aapp"])])
        .unwrap();
    doc.create_entity(stat3, "gngm", vec![Concept::new("C0872212", "STAT3", &["gngm", "aapp"])])
        .unwrap();
    (doc, cytokine, it, il6)
}

#[test]
fn test_cataphora_supersedes_anaphora() {
    let (mut doc, _, it, il6) = cataphora_document();
    let chains = CorefResolver::default().resolve_document(&mut doc);

    assert_eq!(chains.len(), 1, "only the cataphora chain should survive");
    let chain = doc.item(*chains.iter().next().unwrap()).unwrap();
    let relation = chain.as_relation().unwrap();
    assert_eq!(relation.coreference_type(), Some(CoreferenceType::Cataphora));
    assert_eq!(units_of_all(&doc, &relation.expressions()), vec![it]);
    assert_eq!(units_of_all(&doc, &relation.referents()), vec![il6]);
    assert_eq!(chain_types(&doc), vec![CoreferenceType::Cataphora]);
}

#[test]
fn test_anaphora_is_found_before_pruning() {
    let (mut doc, cytokine, it, _) = cataphora_document();
    let config = Configuration::biomedical();
    let resolver = CorefResolver::new(Arc::new(config));
    bioref::detect_mentions(&mut doc).unwrap();

    let mention = bioref::mentions_of(&doc, it)[0];
    assert_eq!(
        resolver.resolve_mention(&doc, &mention, CoreferenceType::Anaphora),
        vec![cytokine]
    );

    // Nothing to prune without a cataphora chain
    let expression = mention.expression;
    let antecedent = doc.semantics_of(cytokine).find(|i| i.kind() == ItemKind::Entity).unwrap().id;
    doc.create_chain(CoreferenceType::Anaphora, &[expression], &[antecedent])
        .unwrap();
    assert!(prune_chains(&mut doc).is_empty());
    assert_eq!(chain_types(&doc), vec![CoreferenceType::Anaphora]);
}

// =============================================================================
// Appositive and ontological linking
// =============================================================================

#[test]
fn test_apposition_yields_single_chain() {
    let text = "IL-6, a cytokine, activates STAT3.";
    let mut doc = Document::new("appos", text);
    let s = doc.add_sentence_text(text).unwrap();
    let il6 = doc.add_phrase(s, "IL-6", "NN").unwrap();
    let cytokine = doc.add_phrase(s, "a cytokine", "DT NN").unwrap();
    let activates = doc
        .add_phrase_with_lemmas(s, "activates", "VBZ", "activate")
        .unwrap();
    let stat3 = doc.add_phrase(s, "STAT3", "NN").unwrap();
    doc.add_dependency("appos", il6, cytokine).unwrap();
    doc.add_dependency("nsubj", activates, il6).unwrap();
    doc.add_dependency("dobj", activates, stat3).unwrap();
    doc.create_entity(il6, "gngm", vec![Concept::new("C0021760", "IL6", &["gngm"])])
        .unwrap();
    doc.create_entity(cytokine, "aapp", vec![Concept::new("C0079189", "Cytokine", &["aapp"])])
        .unwrap();
    doc.create_entity(stat3, "gngm", vec![Concept::new("C0872212", "STAT3", &["gngm"])])
        .unwrap();

    let chains = CorefResolver::default().resolve_document(&mut doc);
    assert_eq!(chains.len(), 1, "the reverse link must not form a cycle");
    let relation = doc
        .item(*chains.iter().next().unwrap())
        .unwrap()
        .as_relation()
        .unwrap()
        .clone();
    assert_eq!(relation.coreference_type(), Some(CoreferenceType::Appositive));
    assert_eq!(units_of_all(&doc, &relation.expressions()), vec![il6]);
    assert_eq!(units_of_all(&doc, &relation.referents()), vec![cytokine]);
}

#[test]
fn test_ontological_link_alongside_apposition() {
    let text = "IL-6 (interleukin-6) activates STAT3.";
    let mut doc = Document::new("onto", text);
    let s = doc.add_sentence_text(text).unwrap();
    let il6 = doc.add_phrase(s, "IL-6", "NN").unwrap();
    let long = doc.add_phrase(s, "interleukin-6", "NN").unwrap();
    let activates = doc
        .add_phrase_with_lemmas(s, "activates", "VBZ", "activate")
        .unwrap();
    let stat3 = doc.add_phrase(s, "STAT3", "NN").unwrap();
    doc.add_dependency("nsubj", activates, il6).unwrap();
    doc.add_dependency("dobj", activates, stat3).unwrap();
    let concept = Concept::new("C0021760", "IL6", &["gngm"]);
    doc.create_entity(il6, "gngm", vec![concept.clone()]).unwrap();
    doc.create_entity(long, "gngm", vec![concept]).unwrap();
    doc.create_entity(stat3, "gngm", vec![Concept::new("C0872212", "STAT3", &["gngm"])])
        .unwrap();

    resolve_document(&mut doc, &Arc::new(Configuration::biomedical()));
    let mut types = chain_types(&doc);
    types.sort_by_key(|t| t.as_str());
    assert_eq!(
        types,
        vec![CoreferenceType::Appositive, CoreferenceType::Ontological]
    );
    for chain in doc.items().of_kind(ItemKind::CoreferenceChain) {
        let relation = chain.as_relation().unwrap();
        assert_eq!(units_of_all(&doc, &relation.expressions()), vec![il6]);
        assert_eq!(units_of_all(&doc, &relation.referents()), vec![long]);
    }
}

// =============================================================================
// Conjunctions
// =============================================================================

#[test]
fn test_plural_pronoun_links_to_conjuncts() {
    let text = "IL-6 and IL-8 activate STAT3. They are cytokines.";
    let mut doc = Document::new("conj", text);
    let s0 = doc.add_sentence_text("IL-6 and IL-8 activate STAT3.").unwrap();
    let s1 = doc.add_sentence_text("They are cytokines.").unwrap();
    let il6 = doc.add_phrase(s0, "IL-6", "NN").unwrap();
    let and = doc.add_phrase(s0, "and", "CC").unwrap();
    let il8 = doc.add_phrase(s0, "IL-8", "NN").unwrap();
    let activate = doc.add_phrase(s0, "activate", "VBP").unwrap();
    let stat3 = doc.add_phrase(s0, "STAT3", "NN").unwrap();
    let they = doc.add_phrase(s1, "They", "PRP").unwrap();
    let are = doc.add_phrase_with_lemmas(s1, "are", "VBP", "be").unwrap();
    let cytokines = doc
        .add_phrase_with_lemmas(s1, "cytokines", "NNS", "cytokine")
        .unwrap();
    doc.add_dependency("cc", il6, and).unwrap();
    doc.add_dependency("conj", il6, il8).unwrap();
    doc.add_dependency("nsubj", activate, il6).unwrap();
    doc.add_dependency("dobj", activate, stat3).unwrap();
    doc.add_dependency("nsubj", cytokines, they).unwrap();
    doc.add_dependency("cop", cytokines, are).unwrap();
    let e6 = doc
        .create_entity(il6, "gngm", vec![Concept::new("C0021760", "IL6", &["gngm"])])
        .unwrap();
    let e8 = doc
        .create_entity(il8, "gngm", vec![Concept::new("C0021766", "IL8", &["gngm"])])
        .unwrap();
    doc.create_entity(stat3, "gngm", vec![Concept::new("C0872212", "STAT3", &["gngm"])])
        .unwrap();
    doc.create_conjunction(il6, &[e6, e8]).unwrap();

    let chains = CorefResolver::default().resolve_document(&mut doc);
    let anaphora: Vec<_> = chains
        .iter()
        .filter_map(|c| doc.item(*c)?.as_relation())
        .filter(|r| r.coreference_type() == Some(CoreferenceType::Anaphora))
        .collect();
    assert_eq!(anaphora.len(), 1);
    assert_eq!(units_of_all(&doc, &anaphora[0].expressions()), vec![they]);
    assert_eq!(anaphora[0].referents(), vec![e6, e8]);
}

#[test]
fn test_conjunction_straddling_the_anaphor_contributes_nothing() {
    let text = "IL-6 is high. They bind IL-8.";
    let mut doc = Document::new("conj-straddle", text);
    let s0 = doc.add_sentence_text("IL-6 is high.").unwrap();
    let s1 = doc.add_sentence_text("They bind IL-8.").unwrap();
    let il6 = doc.add_phrase(s0, "IL-6", "NN").unwrap();
    let is = doc.add_phrase_with_lemmas(s0, "is", "VBZ", "be").unwrap();
    let high = doc.add_phrase(s0, "high", "JJ").unwrap();
    let they = doc.add_phrase(s1, "They", "PRP").unwrap();
    let bind = doc.add_phrase_with_lemmas(s1, "bind", "VBP", "bind").unwrap();
    let il8 = doc.add_phrase(s1, "IL-8", "NN").unwrap();
    doc.add_dependency("nsubj", high, il6).unwrap();
    doc.add_dependency("cop", high, is).unwrap();
    doc.add_dependency("nsubj", bind, they).unwrap();
    doc.add_dependency("dobj", bind, il8).unwrap();
    let e6 = doc
        .create_entity(il6, "gngm", vec![Concept::new("C0021760", "IL6", &["gngm"])])
        .unwrap();
    let e8 = doc
        .create_entity(il8, "gngm", vec![Concept::new("C0021766", "IL8", &["gngm"])])
        .unwrap();
    doc.create_conjunction(il6, &[e6, e8]).unwrap();

    let chains = CorefResolver::default().resolve_document(&mut doc);
    let anaphora: Vec<_> = chains
        .iter()
        .filter_map(|c| doc.item(*c)?.as_relation())
        .filter(|r| r.coreference_type() == Some(CoreferenceType::Anaphora))
        .collect();
    assert!(anaphora.is_empty(), "IL-8 follows the anaphor");
    assert!(!chain_types(&doc).contains(&CoreferenceType::Anaphora));
    assert!(doc
        .items()
        .of_kind(ItemKind::CoreferenceChain)
        .filter_map(|c| c.as_relation())
        .all(|r| !r.references(e6) || units_of_all(&doc, &r.expressions()) != vec![they]));
}

// =============================================================================
// Configuration
// =============================================================================

#[test]
fn test_empty_configuration_resolves_nothing() {
    let (mut doc, _, _, _) = cataphora_document();
    let config = Arc::new(Configuration::builder().build().unwrap());
    assert!(resolve_document(&mut doc, &config).is_empty());
    // mentions are still detected
    assert!(doc.items().of_kind(ItemKind::Expression).count() >= 3);
}
