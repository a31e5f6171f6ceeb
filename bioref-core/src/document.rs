//! Document model: sentences, textual units and dependency edges.
//!
//! Tokenization, tagging and parsing happen upstream. This module only
//! holds their output in a shape the resolver and the composition engine
//! can query: ordered sentences, ordered units per sentence, typed
//! governor→dependent edges, and each unit's attached semantics.
//!
//! Offsets are byte offsets into the document text and must fall on
//! character boundaries.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashSet, VecDeque};
use std::fmt;

use crate::error::{Error, Result};
use crate::semantics::{ItemId, ItemKind, SemanticItem, SemanticStore};
use crate::span::Span;

// =============================================================================
// Words and units
// =============================================================================

/// Handle of a textual unit inside one document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct UnitId(pub usize);

impl fmt::Display for UnitId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "u{}", self.0)
    }
}

/// A token with its lemma and part-of-speech tag.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Word {
    /// Surface form
    pub text: String,
    /// Lemma
    pub lemma: String,
    /// Penn Treebank tag
    pub pos: String,
    /// Location
    pub span: Span,
}

impl Word {
    /// Create a word.
    #[must_use]
    pub fn new(
        text: impl Into<String>,
        lemma: impl Into<String>,
        pos: impl Into<String>,
        span: Span,
    ) -> Self {
        Self {
            text: text.into(),
            lemma: lemma.into(),
            pos: pos.into(),
            span,
        }
    }
}

/// Coarse syntactic category of a unit, from its head tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SyntacticCategory {
    /// NN*
    Noun,
    /// VB*, MD
    Verb,
    /// JJ*
    Adjective,
    /// PRP, PRP$, WP, WP$, WDT and standalone DT
    Pronoun,
    /// Everything else
    Other,
}

impl SyntacticCategory {
    /// Map a Penn Treebank tag.
    #[must_use]
    pub fn from_pos(pos: &str) -> Self {
        if pos.starts_with("NN") {
            SyntacticCategory::Noun
        } else if pos.starts_with("VB") || pos == "MD" {
            SyntacticCategory::Verb
        } else if pos.starts_with("JJ") {
            SyntacticCategory::Adjective
        } else if matches!(pos, "PRP" | "PRP$" | "WP" | "WP$" | "WDT" | "DT" | "EX") {
            SyntacticCategory::Pronoun
        } else {
            SyntacticCategory::Other
        }
    }

    /// Lowercase label used by role rules.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            SyntacticCategory::Noun => "noun",
            SyntacticCategory::Verb => "verb",
            SyntacticCategory::Adjective => "adj",
            SyntacticCategory::Pronoun => "pron",
            SyntacticCategory::Other => "other",
        }
    }
}

/// A textual unit: a chunk of one or more words with a head.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TextUnit {
    /// Handle
    pub id: UnitId,
    /// Owning sentence index
    pub sentence: usize,
    /// Location
    pub span: Span,
    /// Covered text
    pub text: String,
    /// Words in order
    pub words: Vec<Word>,
    /// Index of the head word
    pub head: usize,
    semantics: Vec<ItemId>,
}

impl TextUnit {
    /// Head word.
    #[must_use]
    pub fn head_word(&self) -> &Word {
        &self.words[self.head]
    }

    /// Lowercased head lemma.
    #[must_use]
    pub fn lemma(&self) -> String {
        self.head_word().lemma.to_lowercase()
    }

    /// Head tag.
    #[must_use]
    pub fn pos(&self) -> &str {
        &self.head_word().pos
    }

    /// Syntactic category of the head.
    #[must_use]
    pub fn category(&self) -> SyntacticCategory {
        SyntacticCategory::from_pos(self.pos())
    }

    /// First word.
    #[must_use]
    pub fn first_word(&self) -> &Word {
        &self.words[0]
    }

    /// Attached semantic items, in attachment order.
    #[must_use]
    pub fn semantics(&self) -> &[ItemId] {
        &self.semantics
    }

    /// True for noun-headed units.
    #[must_use]
    pub fn is_nominal(&self) -> bool {
        self.category() == SyntacticCategory::Noun
    }

    /// True if the head is plural (NNS, NNPS).
    #[must_use]
    pub fn is_plural(&self) -> bool {
        matches!(self.pos(), "NNS" | "NNPS")
    }
}

/// A typed governor→dependent edge.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct DependencyEdge {
    /// Dependency label (nsubj, dobj, prep_of, ...)
    pub label: String,
    /// Governor
    pub governor: UnitId,
    /// Dependent
    pub dependent: UnitId,
}

/// A sentence with its units and dependency edges.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Sentence {
    /// Index in the document
    pub index: usize,
    /// Location
    pub span: Span,
    /// Units in text order
    pub units: Vec<UnitId>,
    /// Dependency edges in insertion order
    pub dependencies: Vec<DependencyEdge>,
}

// =============================================================================
// Document
// =============================================================================

/// A parsed document together with its semantic items.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Document {
    /// Identifier
    pub id: String,
    text: String,
    sentences: Vec<Sentence>,
    units: Vec<TextUnit>,
    pub(crate) store: SemanticStore,
}

impl Document {
    /// Create an empty document over `text`.
    #[must_use]
    pub fn new(id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            text: text.into(),
            sentences: Vec::new(),
            units: Vec::new(),
            store: SemanticStore::new(),
        }
    }

    /// Full text.
    #[must_use]
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Text under a span (empty when the span is out of range).
    #[must_use]
    pub fn covered_text(&self, span: Span) -> &str {
        self.text.get(span.start..span.end).unwrap_or("")
    }

    pub(crate) fn check_span(&self, span: Span) -> Result<()> {
        if span.start > span.end {
            return Err(Error::invalid_span(span.start, span.end, "start after end"));
        }
        if span.end > self.text.len() {
            return Err(Error::invalid_span(
                span.start,
                span.end,
                format!("beyond text length {}", self.text.len()),
            ));
        }
        if !self.text.is_char_boundary(span.start) || !self.text.is_char_boundary(span.end) {
            return Err(Error::invalid_span(
                span.start,
                span.end,
                "not on a character boundary",
            ));
        }
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Building
    // -------------------------------------------------------------------------

    /// Add a sentence covering `span`. Sentences must be added in text order.
    pub fn add_sentence(&mut self, span: Span) -> Result<usize> {
        self.check_span(span)?;
        if let Some(last) = self.sentences.last() {
            if span.start < last.span.end {
                return Err(Error::invalid_span(
                    span.start,
                    span.end,
                    "sentence overlaps or precedes the previous sentence",
                ));
            }
        }
        let index = self.sentences.len();
        self.sentences.push(Sentence {
            index,
            span,
            units: Vec::new(),
            dependencies: Vec::new(),
        });
        Ok(index)
    }

    /// Add a sentence by locating its text after the previous sentence.
    pub fn add_sentence_text(&mut self, sentence: &str) -> Result<usize> {
        let from = self.sentences.last().map_or(0, |s| s.span.end);
        let start = self.text[from..]
            .find(sentence)
            .map(|offset| from + offset)
            .ok_or_else(|| Error::invalid_input(format!("sentence not found: '{sentence}'")))?;
        self.add_sentence(Span::new(start, start + sentence.len()))
    }

    /// Add a unit made of `words` to a sentence.
    pub fn add_unit(&mut self, sentence: usize, words: Vec<Word>, head: usize) -> Result<UnitId> {
        if words.is_empty() {
            return Err(Error::invalid_input("a textual unit needs at least one word"));
        }
        if head >= words.len() {
            return Err(Error::invalid_input(format!(
                "head index {head} out of range for {} words",
                words.len()
            )));
        }
        let sentence_span = self
            .sentences
            .get(sentence)
            .map(|s| s.span)
            .ok_or_else(|| Error::invalid_input(format!("unknown sentence {sentence}")))?;
        for word in &words {
            self.check_span(word.span)?;
        }
        let span = Span::covering(words.iter().map(|w| w.span))
            .ok_or_else(|| Error::invalid_input("empty unit"))?;
        if !sentence_span.subsumes(&span) {
            return Err(Error::invalid_span(
                span.start,
                span.end,
                format!("outside sentence {sentence}"),
            ));
        }

        let id = UnitId(self.units.len());
        let text = self.covered_text(span).to_string();
        self.units.push(TextUnit {
            id,
            sentence,
            span,
            text,
            words,
            head,
            semantics: Vec::new(),
        });

        let units = &self.units;
        let sentence = &mut self.sentences[sentence];
        let at = sentence
            .units
            .partition_point(|u| units[u.0].span <= span);
        sentence.units.insert(at, id);
        Ok(id)
    }

    /// Add a unit by locating `phrase` after the last unit of the sentence.
    ///
    /// `tags` holds one Penn tag per whitespace-separated word. Lemmas are
    /// the lowercased words; the head is the last word.
    pub fn add_phrase(&mut self, sentence: usize, phrase: &str, tags: &str) -> Result<UnitId> {
        let lemmas = phrase.to_lowercase();
        self.add_phrase_with_lemmas(sentence, phrase, tags, &lemmas)
    }

    /// Like [`Document::add_phrase`] with explicit lemmas.
    pub fn add_phrase_with_lemmas(
        &mut self,
        sentence: usize,
        phrase: &str,
        tags: &str,
        lemmas: &str,
    ) -> Result<UnitId> {
        let s = self
            .sentences
            .get(sentence)
            .ok_or_else(|| Error::invalid_input(format!("unknown sentence {sentence}")))?;
        let from = s
            .units
            .iter()
            .map(|u| self.units[u.0].span.end)
            .max()
            .unwrap_or(s.span.start);
        let start = self.text[from..s.span.end]
            .find(phrase)
            .map(|offset| from + offset)
            .ok_or_else(|| {
                Error::invalid_input(format!("phrase '{phrase}' not found in sentence {sentence}"))
            })?;

        let tokens: Vec<&str> = phrase.split_whitespace().collect();
        let tags: Vec<&str> = tags.split_whitespace().collect();
        let lemmas: Vec<&str> = lemmas.split_whitespace().collect();
        if tokens.len() != tags.len() || tokens.len() != lemmas.len() {
            return Err(Error::invalid_input(format!(
                "phrase '{phrase}' has {} words, {} tags, {} lemmas",
                tokens.len(),
                tags.len(),
                lemmas.len()
            )));
        }

        let mut words = Vec::with_capacity(tokens.len());
        let mut cursor = start;
        for ((token, tag), lemma) in tokens.iter().zip(&tags).zip(&lemmas) {
            let offset = self.text[cursor..]
                .find(token)
                .ok_or_else(|| Error::invalid_input(format!("token '{token}' not found")))?;
            let word_start = cursor + offset;
            let word_end = word_start + token.len();
            words.push(Word::new(*token, *lemma, *tag, Span::new(word_start, word_end)));
            cursor = word_end;
        }
        let head = words.len() - 1;
        self.add_unit(sentence, words, head)
    }

    /// Add a dependency edge between two units of the same sentence.
    pub fn add_dependency(
        &mut self,
        label: impl Into<String>,
        governor: UnitId,
        dependent: UnitId,
    ) -> Result<()> {
        let label = label.into();
        let g = self.unit(governor).ok_or(Error::UnknownUnit(governor.0))?;
        let d = self.unit(dependent).ok_or(Error::UnknownUnit(dependent.0))?;
        if governor == dependent {
            return Err(Error::structural(format!(
                "dependency '{label}' from {governor} to itself"
            )));
        }
        if g.sentence != d.sentence {
            return Err(Error::structural(format!(
                "dependency '{label}' crosses sentences ({governor} -> {dependent})"
            )));
        }
        let sentence = g.sentence;
        self.sentences[sentence].dependencies.push(DependencyEdge {
            label,
            governor,
            dependent,
        });
        Ok(())
    }

    // -------------------------------------------------------------------------
    // Queries
    // -------------------------------------------------------------------------

    /// Sentences in order.
    #[must_use]
    pub fn sentences(&self) -> &[Sentence] {
        &self.sentences
    }

    /// All units in creation order.
    #[must_use]
    pub fn units(&self) -> &[TextUnit] {
        &self.units
    }

    /// Units in text order across all sentences.
    pub fn units_in_order(&self) -> impl Iterator<Item = &TextUnit> {
        self.sentences
            .iter()
            .flat_map(|s| s.units.iter())
            .map(|u| &self.units[u.0])
    }

    /// Look up a unit.
    #[must_use]
    pub fn unit(&self, id: UnitId) -> Option<&TextUnit> {
        self.units.get(id.0)
    }

    /// Sentence of a unit.
    #[must_use]
    pub fn sentence_of(&self, id: UnitId) -> Option<&Sentence> {
        self.unit(id).and_then(|u| self.sentences.get(u.sentence))
    }

    /// Edges leaving `id`.
    pub fn outgoing(&self, id: UnitId) -> impl Iterator<Item = &DependencyEdge> {
        self.sentence_of(id)
            .into_iter()
            .flat_map(|s| s.dependencies.iter())
            .filter(move |e| e.governor == id)
    }

    /// Edges entering `id`.
    pub fn incoming(&self, id: UnitId) -> impl Iterator<Item = &DependencyEdge> {
        self.sentence_of(id)
            .into_iter()
            .flat_map(|s| s.dependencies.iter())
            .filter(move |e| e.dependent == id)
    }

    /// First governor of `id`.
    #[must_use]
    pub fn governor_of(&self, id: UnitId) -> Option<&DependencyEdge> {
        self.incoming(id).next()
    }

    /// Units of a sentence without incoming edges, in text order.
    #[must_use]
    pub fn sentence_roots(&self, sentence: usize) -> Vec<UnitId> {
        let Some(s) = self.sentences.get(sentence) else {
            return Vec::new();
        };
        let dependents: HashSet<UnitId> = s.dependencies.iter().map(|e| e.dependent).collect();
        s.units
            .iter()
            .copied()
            .filter(|u| !dependents.contains(u))
            .collect()
    }

    /// Undirected dependency path length between two units of one sentence.
    #[must_use]
    pub fn dependency_distance(&self, from: UnitId, to: UnitId) -> Option<usize> {
        let sentence = self.sentence_of(from)?;
        if self.unit(to)?.sentence != sentence.index {
            return None;
        }
        let mut seen = HashSet::from([from]);
        let mut queue = VecDeque::from([(from, 0usize)]);
        while let Some((node, dist)) = queue.pop_front() {
            if node == to {
                return Some(dist);
            }
            for edge in &sentence.dependencies {
                let next = if edge.governor == node {
                    edge.dependent
                } else if edge.dependent == node {
                    edge.governor
                } else {
                    continue;
                };
                if seen.insert(next) {
                    queue.push_back((next, dist + 1));
                }
            }
        }
        None
    }

    /// Number of governor hops from `id` up to a root. Cycles stop the walk.
    #[must_use]
    pub fn depth(&self, id: UnitId) -> usize {
        let mut seen = HashSet::from([id]);
        let mut current = id;
        let mut depth = 0;
        while let Some(edge) = self.governor_of(current) {
            if !seen.insert(edge.governor) {
                break;
            }
            current = edge.governor;
            depth += 1;
        }
        depth
    }

    /// Units lying strictly between two spans, in text order.
    #[must_use]
    pub fn units_between(&self, a: Span, b: Span) -> Vec<UnitId> {
        let (left, right) = if a <= b { (a, b) } else { (b, a) };
        self.units_in_order()
            .filter(|u| left.end <= u.span.start && u.span.end <= right.start)
            .map(|u| u.id)
            .collect()
    }

    // -------------------------------------------------------------------------
    // Semantics
    // -------------------------------------------------------------------------

    /// The semantic item store.
    #[must_use]
    pub fn items(&self) -> &SemanticStore {
        &self.store
    }

    /// Look up a semantic item.
    #[must_use]
    pub fn item(&self, id: ItemId) -> Option<&SemanticItem> {
        self.store.get(id)
    }

    /// Mutable lookup of a semantic item.
    pub fn item_mut(&mut self, id: ItemId) -> Option<&mut SemanticItem> {
        self.store.get_mut(id)
    }

    /// Items attached to a unit.
    pub fn semantics_of(&self, unit: UnitId) -> impl Iterator<Item = &SemanticItem> {
        self.unit(unit)
            .into_iter()
            .flat_map(|u| u.semantics.iter())
            .filter_map(|id| self.store.get(*id))
    }

    /// Attach an existing item to a unit. Attaching twice is a no-op.
    pub fn attach(&mut self, unit: UnitId, item: ItemId) -> Result<()> {
        if !self.store.contains(item) {
            return Err(Error::unknown_item(item));
        }
        let u = self
            .units
            .get_mut(unit.0)
            .ok_or(Error::UnknownUnit(unit.0))?;
        if !u.semantics.contains(&item) {
            u.semantics.push(item);
        }
        Ok(())
    }

    /// Units an item is attached to.
    #[must_use]
    pub fn units_of(&self, item: ItemId) -> Vec<UnitId> {
        self.units
            .iter()
            .filter(|u| u.semantics.contains(&item))
            .map(|u| u.id)
            .collect()
    }

    /// Coreference chains in which `item` is on the expression side.
    #[must_use]
    pub fn chains_with_expression(&self, item: ItemId) -> Vec<ItemId> {
        self.store
            .of_kind(ItemKind::CoreferenceChain)
            .filter(|c| {
                c.as_relation()
                    .is_some_and(|r| r.expressions().contains(&item))
            })
            .map(|c| c.id)
            .collect()
    }

    /// Triggered relations (events, predications) anchored by `predicate`.
    #[must_use]
    pub fn relations_with_predicate(&self, predicate: ItemId) -> Vec<ItemId> {
        self.store
            .iter()
            .filter(|item| {
                item.as_relation()
                    .is_some_and(|r| r.predicate() == Some(predicate))
            })
            .map(|item| item.id)
            .collect()
    }

    /// Remove an item and everything that depends on it.
    ///
    /// Relations referencing the item are removed recursively. Placeholder
    /// fillers of a removed relation go too, once nothing else uses them.
    /// Unit attachment sets are re-synchronised. Returns the removed handles.
    pub fn remove_item(&mut self, id: ItemId) -> Result<BTreeSet<ItemId>> {
        if !self.store.contains(id) {
            return Err(Error::unknown_item(id));
        }
        let mut removed = BTreeSet::new();
        let mut pending = vec![id];
        while let Some(next) = pending.pop() {
            if removed.contains(&next) {
                continue;
            }
            let Some(item) = self.store.take(next) else {
                continue;
            };
            removed.insert(next);
            pending.extend(self.store.referencing(next));

            if let Some(relation) = item.as_relation() {
                for arg in &relation.arguments {
                    let orphan = self.store.get(arg.item).is_some_and(|filler| {
                        filler.as_entity().is_some_and(|e| e.placeholder)
                    }) && self
                        .store
                        .referencing(arg.item)
                        .iter()
                        .all(|r| removed.contains(r) || pending.contains(r));
                    if orphan {
                        pending.push(arg.item);
                    }
                }
            }
        }
        for unit in &mut self.units {
            unit.semantics.retain(|s| !removed.contains(s));
        }
        Ok(removed)
    }
}
