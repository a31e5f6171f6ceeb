//! Document-level coreference resolution.
//!
//! Coreference types are resolved one after another in
//! [`CoreferenceType::PRIORITY`] order; within a type, mentions are visited
//! sentence by sentence, unit by unit. Each accepted (mention, referents)
//! pair is materialised immediately, so later mentions see earlier chains.

use std::collections::BTreeSet;
use std::sync::Arc;

use bioref_core::{
    CoreferenceType, Document, ItemId, ItemKind, RelationKind, SemanticGraph, Semantics, UnitId,
    CONJUNCT_ROLE, COREF_LABEL,
};

use super::{apply_post_filters, filter_candidates, score_candidates, Configuration, ResolutionContext};
use crate::mention::{detect_mentions, mentions_of, Mention};

/// Runs detection, linking, chain generation and pruning over documents.
#[derive(Debug, Clone)]
pub struct CorefResolver {
    config: Arc<Configuration>,
}

impl Default for CorefResolver {
    fn default() -> Self {
        Self::new(Arc::new(Configuration::biomedical()))
    }
}

impl CorefResolver {
    /// Create a resolver over a shared configuration.
    #[must_use]
    pub fn new(config: Arc<Configuration>) -> Self {
        Self { config }
    }

    /// The configuration in use.
    #[must_use]
    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// Resolve a whole document and return the surviving chains.
    ///
    /// Never fails: per-unit problems are logged and the unit is skipped.
    pub fn resolve_document(&self, doc: &mut Document) -> BTreeSet<ItemId> {
        if let Err(e) = detect_mentions(doc) {
            log::error!("mention detection failed in {}: {e}", doc.id);
        }
        let mut graph = SemanticGraph::new();
        for coreference_type in CoreferenceType::PRIORITY {
            self.resolve_type(doc, &mut graph, coreference_type);
        }
        let pruned = prune_chains(doc);
        if !pruned.is_empty() {
            log::debug!("pruned {} anaphora chains in {}", pruned.len(), doc.id);
        }
        doc.items()
            .of_kind(ItemKind::CoreferenceChain)
            .map(|c| c.id)
            .collect()
    }

    fn resolve_type(
        &self,
        doc: &mut Document,
        graph: &mut SemanticGraph,
        coreference_type: CoreferenceType,
    ) {
        let mentions: Vec<Mention> = doc
            .units_in_order()
            .flat_map(|u| mentions_of(doc, u.id))
            .collect();
        for mention in mentions {
            let mut referents = self.resolve_mention(doc, &mention, coreference_type);
            if matches!(
                coreference_type,
                CoreferenceType::Appositive | CoreferenceType::Ontological
            ) {
                referents = remove_identical(doc, graph, &mention, referents);
            }
            if referents.is_empty() {
                continue;
            }
            generate_chain(doc, graph, &mention, coreference_type, &referents);
        }
    }

    /// Best referents of one mention under one coreference type, in text order.
    #[must_use]
    pub fn resolve_mention(
        &self,
        doc: &Document,
        mention: &Mention,
        coreference_type: CoreferenceType,
    ) -> Vec<UnitId> {
        let Some(strategy) = self.config.lookup(coreference_type, mention.mention_type) else {
            return Vec::new();
        };
        let ctx = ResolutionContext::new(doc, self.config.lexicon());
        if !strategy.accepts_mention(&ctx, mention, coreference_type) {
            log::debug!(
                "{coreference_type}: mention '{}' rejected",
                doc.covered_text(mention.span)
            );
            return Vec::new();
        }
        let candidates: Vec<UnitId> = doc.units_in_order().map(|u| u.id).collect();
        let filtered = filter_candidates(strategy, &ctx, mention, coreference_type, &candidates);
        if filtered.is_empty() {
            return Vec::new();
        }
        let scores = score_candidates(strategy, &ctx, mention, coreference_type, &filtered);
        let selected = apply_post_filters(strategy, &ctx, mention, scores);
        let mut referents: Vec<UnitId> = selected.into_keys().collect();
        referents.sort_by_key(|r| doc.unit(*r).map(|u| u.span));
        referents
    }
}

/// Resolve with a shared configuration.
pub fn resolve_document(doc: &mut Document, config: &Arc<Configuration>) -> BTreeSet<ItemId> {
    CorefResolver::new(Arc::clone(config)).resolve_document(doc)
}

/// Drop referents that already anchor a chain pointing back at the mention.
///
/// A referent anchoring an unrelated chain is kept, so one referent can end
/// up in several independent chains.
fn remove_identical(
    doc: &Document,
    graph: &SemanticGraph,
    mention: &Mention,
    referents: Vec<UnitId>,
) -> Vec<UnitId> {
    referents
        .into_iter()
        .filter(|referent| {
            let cyclic = doc
                .semantics_of(*referent)
                .filter(|item| item.is_expression())
                .any(|anchor| {
                    graph.outgoing(anchor.id).iter().any(|(child, label)| {
                        *label != COREF_LABEL && doc.units_of(*child).contains(&mention.unit)
                    })
                });
            if cyclic {
                log::debug!(
                    "skipping '{}': already linked back to '{}'",
                    doc.covered_text(doc.unit(*referent).map(|u| u.span).unwrap_or_default()),
                    doc.covered_text(mention.span)
                );
            }
            !cyclic
        })
        .collect()
}

/// Referent-role fillers for one referent unit, or `None` when a conjunct
/// sits on the wrong side of the mention.
fn referent_fillers(
    doc: &mut Document,
    mention: &Mention,
    coreference_type: CoreferenceType,
    referent: UnitId,
) -> Option<Vec<ItemId>> {
    if doc.unit(referent)?.semantics().is_empty() {
        if let Err(e) = doc.create_placeholder(referent) {
            log::error!("cannot synthesize placeholder for unit {referent}: {e}");
            return None;
        }
    }
    let direction = coreference_type.direction();
    let dominant = doc.dominant_item(referent)?;

    let fillers: Vec<ItemId> = match &dominant.semantics {
        Semantics::Relation(r) if r.kind == RelationKind::Conjunction => {
            let conjuncts: Vec<ItemId> = r.fillers(CONJUNCT_ROLE).collect();
            let misplaced = conjuncts.iter().any(|c| {
                doc.item(*c)
                    .map_or(true, |item| !direction.allows(&mention.span, &item.span))
            });
            if misplaced {
                log::debug!("conjunction {} straddles the mention", dominant.label);
                return None;
            }
            conjuncts
        }
        _ => vec![dominant.id],
    };

    Some(
        fillers
            .into_iter()
            .map(|f| closest_same_concept(doc, mention, coreference_type, f))
            .collect(),
    )
}

/// An item closer to the mention that maps to the same concept, if any.
fn closest_same_concept(
    doc: &Document,
    mention: &Mention,
    coreference_type: CoreferenceType,
    filler: ItemId,
) -> ItemId {
    let Some(item) = doc.item(filler) else {
        return filler;
    };
    let Some(concept) = item.as_entity().and_then(|e| e.active_concept()) else {
        return filler;
    };
    let direction = coreference_type.direction();
    let mut best = (item.span.distance(&mention.span), filler);
    for other in doc.items().of_kind(ItemKind::Entity) {
        if other.id == filler || other.span.overlaps(&mention.span) {
            continue;
        }
        if !direction.allows(&mention.span, &other.span) {
            continue;
        }
        let same = other
            .as_entity()
            .and_then(|e| e.active_concept())
            .is_some_and(|c| c.id == concept.id);
        let distance = other.span.distance(&mention.span);
        if same && distance < best.0 {
            best = (distance, other.id);
        }
    }
    best.1
}

/// Materialise one chain per referent and register it with `graph`.
fn generate_chain(
    doc: &mut Document,
    graph: &mut SemanticGraph,
    mention: &Mention,
    coreference_type: CoreferenceType,
    referents: &[UnitId],
) -> Vec<ItemId> {
    let expressions = if doc.item(mention.expression).is_some() {
        vec![mention.expression]
    } else {
        doc.dominant_item(mention.unit)
            .map(|item| vec![item.id])
            .unwrap_or_default()
    };
    if expressions.is_empty() {
        log::error!("mention on unit {} has no semantics", mention.unit);
        return Vec::new();
    }

    let mut chains = Vec::new();
    for referent in referents {
        let Some(mut fillers) = referent_fillers(doc, mention, coreference_type, *referent)
        else {
            continue;
        };
        fillers.dedup();
        match doc.create_chain(coreference_type, &expressions, &fillers) {
            Ok(chain) => {
                if let Some(data) = doc.item(chain).and_then(|c| c.as_relation()) {
                    graph.add_chain(data);
                }
                chains.push(chain);
            }
            Err(e) => log::error!(
                "{coreference_type} chain for '{}' rejected: {e}",
                doc.covered_text(mention.span)
            ),
        }
    }
    chains
}

/// Delete every Anaphora chain whose anaphor is also the cataphor of a
/// Cataphora chain. Returns the removed chains.
pub fn prune_chains(doc: &mut Document) -> Vec<ItemId> {
    let chains: Vec<(ItemId, CoreferenceType, Vec<ItemId>)> = doc
        .items()
        .of_kind(ItemKind::CoreferenceChain)
        .filter_map(|c| {
            let r = c.as_relation()?;
            Some((c.id, r.coreference_type()?, r.expressions()))
        })
        .collect();
    let cataphors: BTreeSet<ItemId> = chains
        .iter()
        .filter(|(_, t, _)| *t == CoreferenceType::Cataphora)
        .flat_map(|(_, _, e)| e.iter().copied())
        .collect();

    let mut pruned = Vec::new();
    for (id, t, expressions) in &chains {
        if *t != CoreferenceType::Anaphora || !expressions.iter().any(|e| cataphors.contains(e)) {
            continue;
        }
        match doc.remove_item(*id) {
            Ok(_) => pruned.push(*id),
            Err(e) => log::error!("cannot prune chain {id}: {e}"),
        }
    }
    pruned
}
