//! Dependency-driven predication composition.
//!
//! Each sentence's dependency tree is walked depth first from its roots.
//! A node first registers its coreferential mentions (and their chains)
//! with the [`SemanticGraph`], then collects the semantics its children
//! propagate, then composes predications for its own predicates. Arguments
//! that are anaphoric mentions are replaced by their antecedents.

use std::collections::{BTreeSet, HashMap};

use bioref_core::{
    Argument, Document, ItemId, ItemKind, PredicateData, RelationDefinition, SemanticGraph,
    Semantics, Sense, Span, SyntacticCategory, UnitId, CONJUNCT_ROLE, COREF_LABEL,
};

use super::readings::enumerate;
use super::rules::{ComposeOptions, CompositionRules, NEGATION_ROLE};

/// Referent-side label followed when substituting anaphors.
const ANTECEDENT_LABEL: &str = "Antecedent";
/// Label of ontological equivalence edges.
const EQUIVALENCE_LABEL: &str = "Equiv";

/// Semantics reachable through one dependency edge.
#[derive(Debug, Clone)]
struct ArgumentSlot {
    label: String,
    items: Vec<ItemId>,
}

/// Composes predications over one document at a time.
#[derive(Debug)]
pub struct Composer<'r> {
    rules: &'r CompositionRules,
    options: ComposeOptions,
    graph: SemanticGraph,
    visited: HashMap<UnitId, Vec<ItemId>>,
    visiting: BTreeSet<UnitId>,
}

impl<'r> Composer<'r> {
    /// Create a composer.
    #[must_use]
    pub fn new(rules: &'r CompositionRules, options: ComposeOptions) -> Self {
        Self {
            rules,
            options,
            graph: SemanticGraph::new(),
            visited: HashMap::new(),
            visiting: BTreeSet::new(),
        }
    }

    /// Compose every sentence of `doc` and return the populated graph.
    pub fn compose_document(mut self, doc: &mut Document) -> SemanticGraph {
        for sentence in 0..doc.sentences().len() {
            let mut starts = doc.sentence_roots(sentence);
            // units on a dependency cycle have no root above them
            starts.extend(doc.sentences()[sentence].units.iter().copied());
            for unit in starts {
                if !self.visited.contains_key(&unit) {
                    self.visit(doc, unit);
                }
            }
        }
        log::debug!(
            "composed {}: {} nodes, {} edges",
            doc.id,
            self.graph.node_count(),
            self.graph.edge_count()
        );
        self.graph
    }

    /// Items a unit propagates to its governor.
    fn visit(&mut self, doc: &mut Document, unit: UnitId) -> Vec<ItemId> {
        if let Some(done) = self.visited.get(&unit) {
            return done.clone();
        }
        if !self.visiting.insert(unit) {
            log::error!("dependency cycle through unit {unit} in {}", doc.id);
            return Vec::new();
        }

        self.register_expressions(doc, unit);

        let children: Vec<(String, UnitId)> = doc
            .outgoing(unit)
            .filter(|e| !self.rules.is_negation(&e.label))
            .map(|e| (e.label.clone(), e.dependent))
            .collect();
        let own: Vec<ItemId> = doc.unit(unit).map(|u| u.semantics().to_vec()).unwrap_or_default();
        let mut structure = Vec::with_capacity(children.len());
        for (label, child) in children {
            let items = self.visit(doc, child);
            if items.is_empty() {
                continue;
            }
            if items.iter().any(|i| own.contains(i)) {
                log::error!("unit {child} propagates semantics of its governor {unit}");
                continue;
            }
            structure.push(ArgumentSlot { label, items });
        }

        let mut propagated = unit_fillers(doc, &self.graph, unit);
        propagated.extend(self.compose(doc, unit, &structure));
        self.visiting.remove(&unit);
        self.visited.insert(unit, propagated.clone());
        propagated
    }

    /// Put a unit's coreferential mentions, and chains they start, in the graph.
    fn register_expressions(&mut self, doc: &Document, unit: UnitId) {
        for item in doc.semantics_of(unit).filter(|i| i.is_expression()) {
            self.graph.add_node(item.id);
            for chain in doc.chains_with_expression(item.id) {
                if let Some(data) = doc.item(chain).and_then(|c| c.as_relation()) {
                    self.graph.add_chain(data);
                }
            }
        }
    }

    /// Relations composed or reused at `unit`.
    fn compose(&mut self, doc: &mut Document, unit: UnitId, structure: &[ArgumentSlot]) -> Vec<ItemId> {
        if self.options.reuse_existing {
            let existing: Vec<ItemId> = doc
                .semantics_of(unit)
                .filter(|i| matches!(i.kind(), ItemKind::Event | ItemKind::Predication))
                .map(|i| i.id)
                .collect();
            if !existing.is_empty() {
                let negations = self.negation_arguments(doc, unit);
                for relation in &existing {
                    extend_relation(doc, *relation, &negations);
                    self.register_relation(doc, *relation);
                }
                return existing;
            }
        }

        let mut predicates: Vec<(ItemId, Span)> = doc
            .semantics_of(unit)
            .filter(|i| i.kind() == ItemKind::Predicate)
            .map(|i| (i.id, i.span))
            .collect();
        if predicates.is_empty() {
            if !self.options.create_generic || structure.is_empty() {
                return Vec::new();
            }
            match self.generic_predicate(doc, unit) {
                Some(p) => predicates.push(p),
                None => return Vec::new(),
            }
        }
        predicates.sort_by(|a, b| b.1.len().cmp(&a.1.len()).then(a.1.cmp(&b.1)));

        let mut covered: Vec<Span> = Vec::new();
        let mut composed = Vec::new();
        for (predicate, span) in predicates {
            if covered
                .iter()
                .any(|c| c.subsumes(&span) && c.len() > span.len())
            {
                log::debug!("predicate {predicate} at {span} lies inside a larger predicate");
                continue;
            }
            composed.extend(self.compose_predications(doc, unit, predicate, structure));
            covered.push(span);
        }
        composed
    }

    fn generic_predicate(&mut self, doc: &mut Document, unit: UnitId) -> Option<(ItemId, Span)> {
        let u = doc.unit(unit)?;
        let (lemma, span) = (u.lemma(), u.span);
        let generic = self.rules.generic_type.clone();
        let data = PredicateData::new(lemma).with_sense(Sense::new(generic.clone()));
        match doc.create_predicate(unit, &generic, data) {
            Ok(id) => Some((id, span)),
            Err(e) => {
                log::error!("cannot synthesize generic predicate on unit {unit}: {e}");
                None
            }
        }
    }

    /// Build the predications of one predicate from the argument structure.
    fn compose_predications(
        &mut self,
        doc: &mut Document,
        unit: UnitId,
        predicate: ItemId,
        structure: &[ArgumentSlot],
    ) -> Vec<ItemId> {
        let Some(item) = doc.item(predicate) else {
            return Vec::new();
        };
        let Some(data) = item.as_predicate() else {
            return Vec::new();
        };
        let sense = data.active_sense().cloned();
        let relation_type = sense
            .as_ref()
            .map_or_else(|| item.item_type.clone(), |s| s.category.clone());
        let Some(definition) = self.rules.definition(&relation_type) else {
            log::debug!("no relation definition for {relation_type}");
            return Vec::new();
        };
        let lemma = data.lemma.clone();
        let modality = data.modality.clone();
        let sources = data.sources.clone();
        let category = doc
            .unit(unit)
            .map_or(SyntacticCategory::Other, |u| u.category());

        let mut arguments: Vec<Argument> = Vec::new();
        for slot in structure {
            let Some(role) = self
                .rules
                .role_for(&slot.label, &lemma, category, sense.as_ref())
            else {
                log::debug!("no role for '{}' under '{lemma}'", slot.label);
                continue;
            };
            for filler in &slot.items {
                let resolved = substitute(doc, &self.graph, *filler);
                if resolved == predicate {
                    log::error!("predicate {predicate} resolves as its own '{role}' argument");
                    continue;
                }
                let accepted = doc
                    .item(resolved)
                    .is_some_and(|i| definition.accepts(&role, i));
                let argument = Argument::new(role.clone(), resolved);
                if accepted && !arguments.contains(&argument) {
                    arguments.push(argument);
                }
            }
        }
        if arguments.is_empty() {
            return Vec::new();
        }
        if sense.as_ref().is_some_and(|s| s.inverse) {
            invert_roles(definition, &mut arguments);
        }

        let violations = definition.multiplicity_violations(&arguments);
        let readings: Vec<(Vec<Argument>, bool)> = if violations.is_empty() {
            if !definition.is_resolved(&arguments) {
                log::debug!("{relation_type} at {predicate} misses a core role");
                return Vec::new();
            }
            vec![(arguments, true)]
        } else {
            enumerate(&arguments, &violations, self.rules.max_readings)
                .into_iter()
                .filter(|reading| definition.is_resolved(reading))
                .map(|reading| (reading, false))
                .collect()
        };

        let negations = self.negation_arguments(doc, unit);
        let mut created = Vec::with_capacity(readings.len());
        for (mut reading, source_reading) in readings {
            reading.extend(negations.iter().cloned());
            match doc.create_predication(
                predicate,
                &relation_type,
                reading,
                modality.clone(),
                sources.clone(),
                source_reading,
            ) {
                Ok(id) => {
                    self.register_relation(doc, id);
                    created.push(id);
                }
                Err(e) => log::error!("{relation_type} predication rejected: {e}"),
            }
        }
        created
    }

    /// `NEG` arguments for the negation dependents of `unit`. A dependent
    /// without semantics gets a placeholder.
    fn negation_arguments(&self, doc: &mut Document, unit: UnitId) -> Vec<Argument> {
        let dependents: Vec<UnitId> = doc
            .outgoing(unit)
            .filter(|e| self.rules.is_negation(&e.label))
            .map(|e| e.dependent)
            .collect();
        let mut arguments = Vec::new();
        for dependent in dependents {
            let item = match doc.dominant_item(dependent) {
                Some(item) => item.id,
                None => match doc.create_placeholder(dependent) {
                    Ok(id) => id,
                    Err(e) => {
                        log::error!("cannot mark negation on unit {dependent}: {e}");
                        continue;
                    }
                },
            };
            arguments.push(Argument::new(NEGATION_ROLE, item));
        }
        arguments
    }

    fn register_relation(&mut self, doc: &Document, relation: ItemId) {
        let Some(data) = doc.item(relation).and_then(|r| r.as_relation()) else {
            return;
        };
        self.graph.add_node(relation);
        for arg in &data.arguments {
            self.graph.add_edge(relation, arg.item, &arg.role);
        }
    }
}

/// Compose predications for a whole document.
///
/// `create_generic` synthesizes generic predicates for nodes that have
/// arguments but no predicate. `create_if_exists` composes anew even where
/// a unit already carries events or predications. Per-unit problems are
/// logged and skipped.
pub fn compose_document_predications(
    doc: &mut Document,
    rules: &CompositionRules,
    create_generic: bool,
    create_if_exists: bool,
) -> SemanticGraph {
    let options = ComposeOptions::default()
        .with_generic(create_generic)
        .with_reuse(!create_if_exists);
    Composer::new(rules, options).compose_document(doc)
}

/// What a unit contributes as argument fillers.
///
/// A chained mention that resolves to an antecedent stands for the unit, so
/// it can be substituted later; otherwise a conjunction contributes its
/// conjuncts, then plain entities, then any mention.
fn unit_fillers(doc: &Document, graph: &SemanticGraph, unit: UnitId) -> Vec<ItemId> {
    let items: Vec<_> = doc.semantics_of(unit).collect();
    let chained: Vec<ItemId> = items
        .iter()
        .filter(|i| i.is_expression() && substitute(doc, graph, i.id) != i.id)
        .map(|i| i.id)
        .collect();
    if !chained.is_empty() {
        return chained;
    }
    if let Some(conjunction) = items.iter().find(|i| i.kind() == ItemKind::Conjunction) {
        if let Semantics::Relation(r) = &conjunction.semantics {
            return r.fillers(CONJUNCT_ROLE).collect();
        }
    }
    let entities: Vec<ItemId> = items
        .iter()
        .filter(|i| i.kind() == ItemKind::Entity)
        .map(|i| i.id)
        .collect();
    if !entities.is_empty() {
        return entities;
    }
    items
        .iter()
        .filter(|i| i.is_expression())
        .map(|i| i.id)
        .collect()
}

/// The antecedent an anaphoric mention stands for, or the item itself.
#[must_use]
pub fn substitute(doc: &Document, graph: &SemanticGraph, item: ItemId) -> ItemId {
    let is_chained = doc
        .item(item)
        .is_some_and(|i| i.is_expression() && !doc.chains_with_expression(item).is_empty());
    if !is_chained {
        return item;
    }
    if let Some(antecedent) = graph.follow(item, ANTECEDENT_LABEL) {
        return antecedent;
    }
    if let Some(antecedent) = graph
        .follow(item, EQUIVALENCE_LABEL)
        .and_then(|equivalent| graph.follow(equivalent, ANTECEDENT_LABEL))
    {
        return antecedent;
    }
    graph
        .incoming(item)
        .into_iter()
        .filter(|(_, label)| *label == COREF_LABEL)
        .find_map(|(anchor, _)| graph.follow(anchor, ANTECEDENT_LABEL))
        .unwrap_or(item)
}

fn invert_roles(definition: &RelationDefinition, arguments: &mut [Argument]) {
    for arg in arguments.iter_mut() {
        if arg.role == definition.subject_role {
            arg.role = definition.object_role.clone();
        } else if arg.role == definition.object_role {
            arg.role = definition.subject_role.clone();
        }
    }
}

/// Append negation arguments a reused relation does not have yet.
fn extend_relation(doc: &mut Document, relation: ItemId, negations: &[Argument]) {
    let Some(Semantics::Relation(data)) = doc.item_mut(relation).map(|r| &mut r.semantics) else {
        return;
    };
    for negation in negations {
        if !data.arguments.contains(negation) {
            data.arguments.push(negation.clone());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bioref_core::{Concept, CoreferenceType, MentionType, RelationKind};

    fn inhibits() -> PredicateData {
        PredicateData::new("inhibit").with_sense(Sense::new("INHIBITS"))
    }

    fn aspirin_document(negated: bool) -> (Document, UnitId, UnitId, UnitId) {
        let text = if negated {
            "Aspirin does not inhibit COX."
        } else {
            "Aspirin does inhibit COX."
        };
        let mut doc = Document::new("d", text);
        let s = doc.add_sentence_text(text).unwrap();
        let aspirin = doc.add_phrase(s, "Aspirin", "NN").unwrap();
        let not = negated.then(|| doc.add_phrase(s, "not", "RB").unwrap());
        let verb = doc
            .add_phrase_with_lemmas(s, "inhibit", "VB", "inhibit")
            .unwrap();
        let cox = doc.add_phrase(s, "COX", "NN").unwrap();
        doc.add_dependency("nsubj", verb, aspirin).unwrap();
        doc.add_dependency("dobj", verb, cox).unwrap();
        if let Some(not) = not {
            doc.add_dependency("neg", verb, not).unwrap();
        }
        doc.create_entity(aspirin, "phsu", vec![Concept::new("C0004057", "Aspirin", &["phsu"])])
            .unwrap();
        doc.create_entity(cox, "enzy", vec![Concept::new("C0010122", "COX", &["enzy"])])
            .unwrap();
        doc.create_predicate(verb, "INHIBITS", inhibits()).unwrap();
        (doc, aspirin, verb, cox)
    }

    fn predications(doc: &Document) -> Vec<&bioref_core::RelationData> {
        doc.items()
            .of_kind(ItemKind::Predication)
            .filter_map(|p| p.as_relation())
            .collect()
    }

    #[test]
    fn test_subject_and_object() {
        let (mut doc, aspirin, _, cox) = aspirin_document(false);
        let rules = CompositionRules::biomedical();
        let graph = compose_document_predications(&mut doc, &rules, false, false);
        let found = predications(&doc);
        assert_eq!(found.len(), 1);
        let p = found[0];
        let subj: Vec<_> = p.fillers("SUBJ").collect();
        let obj: Vec<_> = p.fillers("OBJ").collect();
        assert_eq!(doc.units_of(subj[0]), vec![aspirin]);
        assert_eq!(doc.units_of(obj[0]), vec![cox]);
        assert!(matches!(
            p.kind,
            RelationKind::Predication { source_reading: true, .. }
        ));
        assert!(graph.edge_count() >= 2);
    }

    #[test]
    fn test_negation_adds_neg_argument() {
        let (mut doc, _, _, _) = aspirin_document(true);
        let rules = CompositionRules::biomedical();
        compose_document_predications(&mut doc, &rules, false, false);
        let found = predications(&doc);
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].fillers(NEGATION_ROLE).count(), 1);
    }

    #[test]
    fn test_inverse_sense_swaps_roles() {
        let (mut doc, aspirin, verb, _) = aspirin_document(false);
        let predicate = doc.semantics_of(verb).next().unwrap().id;
        if let Some(Semantics::Predicate(p)) = doc.item_mut(predicate).map(|i| &mut i.semantics) {
            *p = PredicateData::new("inhibit").with_sense(Sense::new("INHIBITS").inverse());
        }
        let rules = CompositionRules::biomedical();
        compose_document_predications(&mut doc, &rules, false, false);
        let found = predications(&doc);
        let obj: Vec<_> = found[0].fillers("OBJ").collect();
        assert_eq!(doc.units_of(obj[0]), vec![aspirin]);
    }

    #[test]
    fn test_missing_core_role_yields_nothing() {
        let mut doc = Document::new("d", "Aspirin inhibits.");
        let s = doc.add_sentence_text("Aspirin inhibits.").unwrap();
        let aspirin = doc.add_phrase(s, "Aspirin", "NN").unwrap();
        let verb = doc
            .add_phrase_with_lemmas(s, "inhibits", "VBZ", "inhibit")
            .unwrap();
        doc.add_dependency("nsubj", verb, aspirin).unwrap();
        doc.create_entity(aspirin, "phsu", vec![]).unwrap();
        doc.create_predicate(verb, "INHIBITS", inhibits()).unwrap();
        compose_document_predications(&mut doc, &CompositionRules::biomedical(), false, false);
        assert!(predications(&doc).is_empty());
    }

    #[test]
    fn test_generic_predicate_synthesis() {
        let mut doc = Document::new("d", "Aspirin in plasma.");
        let s = doc.add_sentence_text("Aspirin in plasma.").unwrap();
        let aspirin = doc.add_phrase(s, "Aspirin", "NN").unwrap();
        let plasma = doc.add_phrase(s, "plasma", "NN").unwrap();
        doc.add_dependency("nn", aspirin, plasma).unwrap();
        doc.create_entity(aspirin, "phsu", vec![]).unwrap();
        doc.create_entity(plasma, "bdsu", vec![]).unwrap();
        let rules = CompositionRules::biomedical();

        compose_document_predications(&mut doc, &rules, false, false);
        assert!(predications(&doc).is_empty());

        compose_document_predications(&mut doc, &rules, true, false);
        let found = doc.items().of_kind(ItemKind::Predication).collect::<Vec<_>>();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].item_type, "GENERIC");
    }

    #[test]
    fn test_existing_events_are_reused() {
        let (mut doc, aspirin, verb, cox) = aspirin_document(false);
        let predicate = doc.semantics_of(verb).next().unwrap().id;
        let subj = doc.semantics_of(aspirin).next().unwrap().id;
        let obj = doc.semantics_of(cox).next().unwrap().id;
        let event = doc
            .create_event(
                predicate,
                "INHIBITS",
                vec![Argument::new("SUBJ", subj), Argument::new("OBJ", obj)],
            )
            .unwrap();
        let rules = CompositionRules::biomedical();

        let graph = compose_document_predications(&mut doc, &rules, false, false);
        assert!(predications(&doc).is_empty());
        assert!(graph.has_edge(event, subj, "SUBJ"));

        compose_document_predications(&mut doc, &rules, false, true);
        assert_eq!(predications(&doc).len(), 1);
    }

    #[test]
    fn test_substitute_through_coref_anchor() {
        let mut doc = Document::new("d", "IL-6 and it and this.");
        let s = doc.add_sentence_text("IL-6 and it and this.").unwrap();
        let il6 = doc.add_phrase(s, "IL-6", "NN").unwrap();
        let it = doc.add_phrase(s, "it", "PRP").unwrap();
        let this = doc.add_phrase(s, "this", "DT").unwrap();
        let entity = doc.create_entity(il6, "gngm", vec![]).unwrap();
        let e1 = doc.create_expression(it, MentionType::PersonalPronoun).unwrap();
        let e2 = doc
            .create_expression(this, MentionType::DemonstrativePronoun)
            .unwrap();
        let chain = doc
            .create_chain(CoreferenceType::Anaphora, &[e1, e2], &[entity])
            .unwrap();
        let mut graph = SemanticGraph::new();
        graph.add_chain(doc.item(chain).unwrap().as_relation().unwrap());
        assert_eq!(substitute(&doc, &graph, e1), entity);
        assert_eq!(substitute(&doc, &graph, e2), entity);
        assert_eq!(substitute(&doc, &graph, entity), entity);
    }
}
