//! Mention detection: tags textual units with coreferential Expression items.
//!
//! Pronouns are recognised by form and tag, noun phrases by their first
//! determiner. Bare noun phrases only count as mentions when they already
//! carry entity semantics.

use bioref_core::{Document, ItemId, ItemKind, MentionType, Span, SyntacticCategory, TextUnit, UnitId};

use crate::error::Result;
use crate::lexicon::{determiner_type, pronoun_type};

/// A detected mention: the unit, its Expression item and mention type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Mention {
    /// Textual unit carrying the mention
    pub unit: UnitId,
    /// Expression item
    pub expression: ItemId,
    /// Mention type
    pub mention_type: MentionType,
    /// Span of the expression (may be narrower than the unit)
    pub span: Span,
}

/// Mention types a unit exposes, with their spans.
#[must_use]
pub fn classify_unit(unit: &TextUnit, has_entity: bool) -> Vec<(MentionType, Span)> {
    let joined = unit
        .words
        .iter()
        .map(|w| w.text.to_lowercase())
        .collect::<Vec<_>>()
        .join(" ");
    if let Some(t @ MentionType::ReciprocalPronoun) = pronoun_type(&joined, "PRP") {
        return vec![(t, unit.span)];
    }

    if unit.words.len() == 1 {
        let word = unit.head_word();
        if let Some(t) = pronoun_type(&word.text, &word.pos) {
            return vec![(t, unit.span)];
        }
    }

    if unit.category() != SyntacticCategory::Noun {
        return Vec::new();
    }

    let first = unit.first_word();
    if first.pos == "PRP$" {
        return pronoun_type(&first.text, &first.pos)
            .map(|t| vec![(t, first.span)])
            .unwrap_or_default();
    }
    let determiner = if unit.words.len() > 1 {
        determiner_type(&first.text)
    } else {
        MentionType::ZeroArticleNP
    };
    if determiner == MentionType::ZeroArticleNP && !has_entity {
        return Vec::new();
    }
    vec![(determiner, unit.span)]
}

/// Tag every unit of the document with its mentions. Units that already
/// carry an Expression are left alone, so running twice adds nothing.
pub fn detect_mentions(doc: &mut Document) -> Result<Vec<ItemId>> {
    let mut pending = Vec::new();
    for unit in doc.units_in_order() {
        let mut has_entity = false;
        let mut has_expression = false;
        for item in doc.semantics_of(unit.id) {
            match item.kind() {
                ItemKind::Entity => has_entity = true,
                ItemKind::Expression => has_expression = true,
                _ => {}
            }
        }
        if has_expression {
            continue;
        }
        for (mention_type, span) in classify_unit(unit, has_entity) {
            pending.push((unit.id, mention_type, span));
        }
    }

    let mut created = Vec::with_capacity(pending.len());
    for (unit, mention_type, span) in pending {
        created.push(doc.create_expression_spanning(unit, span, mention_type)?);
    }
    log::debug!("detected {} mentions in {}", created.len(), doc.id);
    Ok(created)
}

/// Mentions of one unit, in attachment order.
#[must_use]
pub fn mentions_of(doc: &Document, unit: UnitId) -> Vec<Mention> {
    doc.semantics_of(unit)
        .filter_map(|item| {
            item.mention_type().map(|mention_type| Mention {
                unit,
                expression: item.id,
                mention_type,
                span: item.span,
            })
        })
        .collect()
}
