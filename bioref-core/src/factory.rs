//! Semantic item factory.
//!
//! Every item is created through the owning [`Document`], which assigns a
//! stable handle and a sequential per-variant label, validates spans and
//! argument handles, and attaches text-bound items to their unit.

use crate::coref_type::{CoreferenceType, MentionType};
use crate::document::{Document, UnitId};
use crate::error::{Error, Result};
use crate::semantics::{
    Argument, Concept, EntityData, ItemId, PredicateData, RelationData, RelationKind,
    ScalarModality, SemanticItem, Semantics,
};
use crate::span::Span;

/// Type tag of synthesized placeholder entities.
pub const PLACEHOLDER_TYPE: &str = "GenericEntity";

/// Role of conjunction members.
pub const CONJUNCT_ROLE: &str = "CC";

impl Document {
    fn unit_span(&self, unit: UnitId) -> Result<Span> {
        self.unit(unit)
            .map(|u| u.span)
            .ok_or(Error::UnknownUnit(unit.0))
    }

    fn insert_term(
        &mut self,
        unit: UnitId,
        span: Span,
        item_type: &str,
        semantics: Semantics,
    ) -> Result<ItemId> {
        self.unit_span(unit)?;
        self.check_span(span)?;
        let document = self.id.clone();
        let id = self.store.insert(&document, item_type, span, semantics);
        self.attach(unit, id)?;
        Ok(id)
    }

    /// Span covering the arguments (and trigger) of a new relation.
    fn relation_span(&self, trigger: Option<ItemId>, arguments: &[Argument]) -> Result<Span> {
        let mut spans = Vec::with_capacity(arguments.len() + 1);
        for id in trigger.into_iter().chain(arguments.iter().map(|a| a.item)) {
            let item = self.store.get(id).ok_or_else(|| Error::unknown_item(id))?;
            spans.push(item.span);
        }
        Span::covering(spans).ok_or_else(|| Error::structural("relation without arguments"))
    }

    fn insert_relation(
        &mut self,
        item_type: &str,
        trigger: Option<ItemId>,
        data: RelationData,
    ) -> Result<ItemId> {
        if data.arguments.is_empty() {
            return Err(Error::structural(format!(
                "'{item_type}' relation without arguments"
            )));
        }
        let span = self.relation_span(trigger, &data.arguments)?;
        let document = self.id.clone();
        Ok(self
            .store
            .insert(&document, item_type, span, Semantics::Relation(data)))
    }

    // -------------------------------------------------------------------------
    // Terms
    // -------------------------------------------------------------------------

    /// Create an entity over a unit. The first concept becomes the active sense.
    pub fn create_entity(
        &mut self,
        unit: UnitId,
        item_type: &str,
        concepts: Vec<Concept>,
    ) -> Result<ItemId> {
        let span = self.unit_span(unit)?;
        let sense = if concepts.is_empty() { None } else { Some(0) };
        self.insert_term(
            unit,
            span,
            item_type,
            Semantics::Entity(EntityData {
                concepts,
                sense,
                ..EntityData::default()
            }),
        )
    }

    /// Create a coreferential mention over a unit.
    pub fn create_expression(&mut self, unit: UnitId, mention: MentionType) -> Result<ItemId> {
        let span = self.unit_span(unit)?;
        self.create_expression_spanning(unit, span, mention)
    }

    /// Create a coreferential mention over part of a unit ("its" in "its activity").
    pub fn create_expression_spanning(
        &mut self,
        unit: UnitId,
        span: Span,
        mention: MentionType,
    ) -> Result<ItemId> {
        self.insert_term(
            unit,
            span,
            mention.as_str(),
            Semantics::Entity(EntityData {
                mention: Some(mention),
                ..EntityData::default()
            }),
        )
    }

    /// Create a conceptless placeholder entity for a unit without semantics.
    pub fn create_placeholder(&mut self, unit: UnitId) -> Result<ItemId> {
        let span = self.unit_span(unit)?;
        self.insert_term(
            unit,
            span,
            PLACEHOLDER_TYPE,
            Semantics::Entity(EntityData {
                placeholder: true,
                ..EntityData::default()
            }),
        )
    }

    /// Create a predicate over a whole unit.
    pub fn create_predicate(
        &mut self,
        unit: UnitId,
        item_type: &str,
        data: PredicateData,
    ) -> Result<ItemId> {
        let span = self.unit_span(unit)?;
        self.create_predicate_spanning(unit, span, item_type, data)
    }

    /// Create a predicate with an explicit span, attached to `unit`.
    ///
    /// Multiword indicators ("cannot") and their parts can share a unit
    /// with different spans.
    pub fn create_predicate_spanning(
        &mut self,
        unit: UnitId,
        span: Span,
        item_type: &str,
        data: PredicateData,
    ) -> Result<ItemId> {
        self.insert_term(unit, span, item_type, Semantics::Predicate(data))
    }

    // -------------------------------------------------------------------------
    // Relations
    // -------------------------------------------------------------------------

    fn check_trigger(&self, predicate: ItemId) -> Result<()> {
        match self.store.get(predicate) {
            Some(item) if item.as_predicate().is_some() => Ok(()),
            Some(item) => Err(Error::structural(format!(
                "{} ({}) is not a predicate",
                item.label, item.item_type
            ))),
            None => Err(Error::unknown_item(predicate)),
        }
    }

    /// Create an event anchored by `predicate`. Events are attached to the
    /// trigger's units so composition can reuse them.
    pub fn create_event(
        &mut self,
        predicate: ItemId,
        item_type: &str,
        arguments: Vec<Argument>,
    ) -> Result<ItemId> {
        self.check_trigger(predicate)?;
        let id = self.insert_relation(
            item_type,
            Some(predicate),
            RelationData {
                kind: RelationKind::Event { predicate },
                arguments,
            },
        )?;
        for unit in self.units_of(predicate) {
            self.attach(unit, id)?;
        }
        Ok(id)
    }

    /// Create a predication anchored by `predicate`.
    pub fn create_predication(
        &mut self,
        predicate: ItemId,
        item_type: &str,
        arguments: Vec<Argument>,
        modality: Vec<ScalarModality>,
        sources: Vec<String>,
        source_reading: bool,
    ) -> Result<ItemId> {
        self.check_trigger(predicate)?;
        if let Some(arg) = arguments.iter().find(|a| a.item == predicate) {
            return Err(Error::structural(format!(
                "predicate {predicate} fills its own role '{}'",
                arg.role
            )));
        }
        self.insert_relation(
            item_type,
            Some(predicate),
            RelationData {
                kind: RelationKind::Predication {
                    predicate,
                    modality,
                    sources,
                    source_reading,
                },
                arguments,
            },
        )
    }

    /// Create a coreference chain. Role names follow `coreference_type`.
    pub fn create_chain(
        &mut self,
        coreference_type: CoreferenceType,
        expressions: &[ItemId],
        referents: &[ItemId],
    ) -> Result<ItemId> {
        if expressions.is_empty() || referents.is_empty() {
            return Err(Error::structural(format!(
                "{coreference_type} chain needs both an expression and a referent"
            )));
        }
        if let Some(shared) = expressions.iter().find(|e| referents.contains(e)) {
            return Err(Error::structural(format!(
                "{shared} would corefer with itself"
            )));
        }
        let arguments = expressions
            .iter()
            .map(|e| Argument::new(coreference_type.expression_role(), *e))
            .chain(
                referents
                    .iter()
                    .map(|r| Argument::new(coreference_type.referent_role(), *r)),
            )
            .collect();
        self.insert_relation(
            coreference_type.as_str(),
            None,
            RelationData {
                kind: RelationKind::CoreferenceChain(coreference_type),
                arguments,
            },
        )
    }

    /// Create a conjunction of `conjuncts` attached to `unit`.
    pub fn create_conjunction(&mut self, unit: UnitId, conjuncts: &[ItemId]) -> Result<ItemId> {
        if conjuncts.len() < 2 {
            return Err(Error::invalid_input("a conjunction needs at least two conjuncts"));
        }
        let arguments = conjuncts
            .iter()
            .map(|c| Argument::new(CONJUNCT_ROLE, *c))
            .collect();
        let id = self.insert_relation(
            "Conjunction",
            None,
            RelationData {
                kind: RelationKind::Conjunction,
                arguments,
            },
        )?;
        self.attach(unit, id)?;
        Ok(id)
    }

    /// Create an untriggered relation (implicit relation or modification).
    pub fn create_relation(
        &mut self,
        kind: RelationKind,
        item_type: &str,
        arguments: Vec<Argument>,
    ) -> Result<ItemId> {
        match kind {
            RelationKind::ImplicitRelation | RelationKind::Modification => {
                self.insert_relation(item_type, None, RelationData { kind, arguments })
            }
            RelationKind::Event { .. }
            | RelationKind::Predication { .. }
            | RelationKind::Conjunction
            | RelationKind::CoreferenceChain(_) => Err(Error::invalid_input(
                "use the dedicated constructor for triggered relations, conjunctions and chains",
            )),
        }
    }

    // -------------------------------------------------------------------------
    // Standoff
    // -------------------------------------------------------------------------

    /// Standoff line of an item.
    ///
    /// Terms render as `T1<TAB>type start end<TAB>text`; relations as
    /// `R1<TAB>type role:arg ...`, with `type:trigger` for triggered ones.
    pub fn standoff(&self, id: ItemId) -> Result<String> {
        let item = self.store.get(id).ok_or_else(|| Error::unknown_item(id))?;
        match &item.semantics {
            Semantics::Entity(_) | Semantics::Predicate(_) => Ok(format!(
                "{}\t{} {}\t{}",
                item.label,
                item.item_type,
                item.span,
                self.covered_text(item.span)
            )),
            Semantics::Relation(relation) => {
                let mut line = format!("{}\t{}", item.label, item.item_type);
                if let Some(trigger) = relation.predicate() {
                    line.push(':');
                    line.push_str(self.label_of(trigger)?);
                }
                for arg in &relation.arguments {
                    line.push(' ');
                    line.push_str(&arg.role);
                    line.push(':');
                    line.push_str(self.label_of(arg.item)?);
                }
                Ok(line)
            }
        }
    }

    fn label_of(&self, id: ItemId) -> Result<&str> {
        self.store
            .get(id)
            .map(|i| i.label.as_str())
            .ok_or_else(|| Error::unknown_item(id))
    }

    /// Most prominent item attached to a unit: conjunctions first, then
    /// concept-bearing entities, then any entity or expression, then
    /// whatever comes first.
    #[must_use]
    pub fn dominant_item(&self, unit: UnitId) -> Option<&SemanticItem> {
        let items: Vec<&SemanticItem> = self.semantics_of(unit).collect();
        let rank = |item: &SemanticItem| match &item.semantics {
            Semantics::Relation(r) if r.kind == RelationKind::Conjunction => 0,
            Semantics::Entity(e) if e.mention.is_none() && !e.concepts.is_empty() => 1,
            Semantics::Entity(e) if e.mention.is_none() => 2,
            Semantics::Entity(_) => 3,
            Semantics::Predicate(_) | Semantics::Relation(_) => 4,
        };
        items.into_iter().min_by_key(|item| rank(item))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::semantics::ItemKind;

    fn doc() -> (Document, UnitId, UnitId, UnitId) {
        let mut doc = Document::new("d1", "The protein binds DNA.");
        let s = doc.add_sentence_text("The protein binds DNA.").unwrap();
        let a = doc.add_phrase(s, "The protein", "DT NN").unwrap();
        let b = doc.add_phrase_with_lemmas(s, "binds", "VBZ", "bind").unwrap();
        let c = doc.add_phrase(s, "DNA", "NN").unwrap();
        (doc, a, b, c)
    }

    #[test]
    fn test_standoff_lines() {
        let (mut doc, a, b, c) = doc();
        let protein = doc
            .create_entity(a, "aapp", vec![Concept::new("C0033684", "Proteins", &["aapp"])])
            .unwrap();
        let bind = doc
            .create_predicate(b, "INTERACTS_WITH", PredicateData::new("bind"))
            .unwrap();
        let dna = doc.create_entity(c, "nnon", vec![]).unwrap();
        let p = doc
            .create_predication(
                bind,
                "INTERACTS_WITH",
                vec![Argument::new("SUBJ", protein), Argument::new("OBJ", dna)],
                vec![],
                vec![],
                true,
            )
            .unwrap();
        assert_eq!(doc.standoff(protein).unwrap(), "T1\taapp 0 11\tThe protein");
        assert_eq!(
            doc.standoff(p).unwrap(),
            "P1\tINTERACTS_WITH:T2 SUBJ:T1 OBJ:T3"
        );
        assert_eq!(doc.item(p).unwrap().span, Span::new(0, 21));
    }

    #[test]
    fn test_chain_roles_and_validation() {
        let (mut doc, a, _, c) = doc();
        let protein = doc.create_entity(a, "aapp", vec![]).unwrap();
        let it = doc.create_expression(c, MentionType::PersonalPronoun).unwrap();
        let chain = doc
            .create_chain(CoreferenceType::Anaphora, &[it], &[protein])
            .unwrap();
        assert_eq!(
            doc.standoff(chain).unwrap(),
            "R1\tAnaphora Anaphor:T2 Antecedent:T1"
        );
        assert!(doc
            .create_chain(CoreferenceType::Anaphora, &[it], &[])
            .is_err());
        assert!(doc
            .create_chain(CoreferenceType::Appositive, &[it], &[it])
            .is_err());
        assert_eq!(doc.chains_with_expression(it), vec![chain]);
    }

    #[test]
    fn test_remove_cascades_to_relations_and_placeholders() {
        let (mut doc, a, b, c) = doc();
        let protein = doc.create_entity(a, "aapp", vec![]).unwrap();
        let bind = doc
            .create_predicate(b, "INTERACTS_WITH", PredicateData::new("bind"))
            .unwrap();
        let filler = doc.create_placeholder(c).unwrap();
        let event = doc
            .create_event(
                bind,
                "INTERACTS_WITH",
                vec![Argument::new("SUBJ", protein), Argument::new("OBJ", filler)],
            )
            .unwrap();
        assert!(doc.unit(b).unwrap().semantics().contains(&event));

        let removed = doc.remove_item(bind).unwrap();
        assert!(removed.contains(&bind));
        assert!(removed.contains(&event));
        assert!(removed.contains(&filler));
        assert!(!removed.contains(&protein));
        assert!(doc.unit(b).unwrap().semantics().is_empty());
        assert!(doc.unit(c).unwrap().semantics().is_empty());
        assert_eq!(doc.items().of_kind(ItemKind::Event).count(), 0);
        assert!(doc.remove_item(bind).is_err());
    }

    #[test]
    fn test_dominant_item_prefers_conjunction() {
        let (mut doc, a, _, c) = doc();
        let x = doc.create_entity(a, "aapp", vec![]).unwrap();
        let y = doc.create_entity(c, "nnon", vec![]).unwrap();
        let conj = doc.create_conjunction(a, &[x, y]).unwrap();
        assert_eq!(doc.dominant_item(a).unwrap().id, conj);
        assert_eq!(doc.dominant_item(c).unwrap().id, y);
        assert!(doc.create_conjunction(a, &[x]).is_err());
    }

    #[test]
    fn test_create_relation_rejects_triggered_kinds() {
        let (mut doc, a, _, _) = doc();
        let x = doc.create_entity(a, "aapp", vec![]).unwrap();
        assert!(doc
            .create_relation(RelationKind::Conjunction, "x", vec![Argument::new("CC", x)])
            .is_err());
        let m = doc
            .create_relation(RelationKind::Modification, "MOD", vec![Argument::new("ARG", x)])
            .unwrap();
        assert_eq!(doc.item(m).unwrap().label, "M1");
    }
}
