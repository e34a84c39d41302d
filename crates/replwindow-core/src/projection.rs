//! The composed document: an ordered list of spans over the backing stores.
//!
//! The visible text is always the concatenation of the text of every span,
//! in order. Edits go to a backing store; every span on that store is then
//! translated and the composed text, line table and prompt-line index are
//! rebuilt.

use std::collections::BTreeMap;
use std::ops::Range;

use crate::span::{ReplSpan, ReplSpanKind, StoreId};
use crate::store::TextStore;
use crate::text;

/// Which candidate wins when a document point sits on a span boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PositionAffinity {
    /// The earlier span in document order.
    Predecessor,
    /// The later span in document order.
    Successor,
}

/// A piece of a document range that lies inside one span.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreRange {
    pub span_index: usize,
    pub store: StoreId,
    pub range: Range<usize>,
}

#[derive(Debug, Clone)]
pub struct Projection {
    prompts: TextStore,
    languages: Vec<TextStore>,
    standard_input: TextStore,
    output: TextStore,
    spans: Vec<ReplSpan>,
    text: String,
    span_starts: Vec<usize>,
    line_starts: Vec<usize>,
    prompt_lines: BTreeMap<usize, usize>,
    version: u64,
}

impl Default for Projection {
    fn default() -> Self {
        Self::new()
    }
}

impl Projection {
    pub fn new() -> Self {
        Self {
            prompts: TextStore::locked(),
            languages: Vec::new(),
            standard_input: TextStore::new(),
            output: TextStore::new(),
            spans: Vec::new(),
            text: String::new(),
            span_starts: Vec::new(),
            line_starts: vec![0],
            prompt_lines: BTreeMap::new(),
            version: 0,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Incremented after every mutation.
    pub fn version(&self) -> u64 {
        self.version
    }

    pub fn spans(&self) -> &[ReplSpan] {
        &self.spans
    }

    pub fn span(&self, index: usize) -> Option<&ReplSpan> {
        self.spans.get(index)
    }

    pub fn span_count(&self) -> usize {
        self.spans.len()
    }

    pub fn last_span(&self) -> Option<&ReplSpan> {
        self.spans.last()
    }

    pub fn span_text(&self, index: usize) -> &str {
        let span = self.spans[index].span();
        self.store(span.store()).slice(span.range())
    }

    pub fn span_document_range(&self, index: usize) -> Range<usize> {
        let start = self.span_starts[index];
        start..start + self.spans[index].len()
    }

    /// Allocates a fresh language store and returns its id.
    pub fn new_language_store(&mut self) -> StoreId {
        self.languages.push(TextStore::new());
        StoreId::Language(self.languages.len() - 1)
    }

    pub fn store(&self, id: StoreId) -> &TextStore {
        match id {
            StoreId::Prompt => &self.prompts,
            StoreId::Language(generation) => &self.languages[generation],
            StoreId::StandardInput => &self.standard_input,
            StoreId::Output => &self.output,
        }
    }

    /// Mutable access for store-level bookkeeping such as read-only regions.
    /// Text changes must go through the `*_store` methods so spans follow them.
    pub fn store_mut(&mut self, id: StoreId) -> &mut TextStore {
        match id {
            StoreId::Prompt => &mut self.prompts,
            StoreId::Language(generation) => &mut self.languages[generation],
            StoreId::StandardInput => &mut self.standard_input,
            StoreId::Output => &mut self.output,
        }
    }

    pub fn append_to_store(&mut self, id: StoreId, text: &str) -> Range<usize> {
        let start = self.store(id).len();
        self.insert_into_store(id, start, text);
        start..start + text.len()
    }

    pub fn insert_into_store(&mut self, id: StoreId, position: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        self.store_mut(id).insert(position, text);
        for span in self.spans.iter_mut().filter(|span| span.store() == id) {
            span.span_mut().track_insert(position, text.len());
        }
        self.refresh();
    }

    pub fn delete_from_store(&mut self, id: StoreId, range: Range<usize>) {
        if range.is_empty() {
            return;
        }
        self.store_mut(id).delete(range.clone());
        for span in self.spans.iter_mut().filter(|span| span.store() == id) {
            span.span_mut().track_delete(range.clone());
        }
        self.refresh();
    }

    /// Deletes a document range from whatever stores back it.
    pub fn delete_document_range(&mut self, range: Range<usize>) {
        let pieces = self.store_ranges(range);
        for piece in pieces.into_iter().rev() {
            self.delete_from_store(piece.store, piece.range);
        }
    }

    pub fn append(&mut self, span: ReplSpan) {
        self.spans.push(span);
        self.refresh();
    }

    pub fn insert_at(&mut self, index: usize, span: ReplSpan) {
        self.spans.insert(index, span);
        self.refresh();
    }

    pub fn replace_at(&mut self, index: usize, span: ReplSpan) {
        self.spans[index] = span;
        self.refresh();
    }

    /// Replaces one span with three, as done when a line is split.
    pub fn replace_with_three(&mut self, index: usize, spans: [ReplSpan; 3]) {
        self.replace_range(index, 1, spans);
    }

    pub fn replace_range(
        &mut self,
        index: usize,
        count: usize,
        spans: impl IntoIterator<Item = ReplSpan>,
    ) {
        self.spans.splice(index..index + count, spans);
        self.refresh();
    }

    pub fn remove_range(&mut self, index: usize, count: usize) {
        self.spans.drain(index..index + count);
        self.refresh();
    }

    /// Drops every span and clears every store.
    pub fn clear(&mut self) {
        self.spans.clear();
        self.prompts.clear();
        self.languages.clear();
        self.standard_input.clear();
        self.output.clear();
        self.refresh();
    }

    pub fn line_count(&self) -> usize {
        self.line_starts.len()
    }

    pub fn line_of(&self, position: usize) -> usize {
        text::line_number_at(&self.line_starts, position)
    }

    pub fn line_start(&self, line: usize) -> usize {
        self.line_starts.get(line).copied().unwrap_or(self.text.len())
    }

    /// Extent of a document line, excluding its line break.
    pub fn line_range(&self, line: usize) -> Range<usize> {
        text::line_extent(&self.text, &self.line_starts, line)
            .unwrap_or(self.text.len()..self.text.len())
    }

    /// The prompt span starting on `line`, if any.
    pub fn prompt_span_for_line(&self, line: usize) -> Option<usize> {
        self.prompt_lines.get(&line).copied()
    }

    pub fn prompt_kind_for_line(&self, line: usize) -> ReplSpanKind {
        self.prompt_span_for_line(line)
            .map_or(ReplSpanKind::None, |index| self.spans[index].kind())
    }

    /// Indices of spans whose document range contains `position`, edges included.
    pub fn spans_at(&self, position: usize) -> impl DoubleEndedIterator<Item = usize> + '_ {
        (0..self.spans.len()).filter(move |&index| {
            let range = self.span_document_range(index);
            range.start <= position && position <= range.end
        })
    }

    /// Maps a document position into `store`.
    pub fn map_to_store(
        &self,
        position: usize,
        store: StoreId,
        affinity: PositionAffinity,
    ) -> Option<usize> {
        let mut candidates = self
            .spans_at(position)
            .filter(|&index| self.spans[index].store() == store);
        let index = match affinity {
            PositionAffinity::Predecessor => candidates.next(),
            PositionAffinity::Successor => candidates.next_back(),
        }?;
        Some(self.spans[index].span().start() + position - self.span_starts[index])
    }

    /// Maps a store offset back into the document.
    pub fn map_from_store(
        &self,
        store: StoreId,
        offset: usize,
        affinity: PositionAffinity,
    ) -> Option<usize> {
        let mut candidates = (0..self.spans.len()).filter(|&index| {
            let span = self.spans[index].span();
            span.store() == store && span.start() <= offset && offset <= span.end()
        });
        let index = match affinity {
            PositionAffinity::Predecessor => candidates.next(),
            PositionAffinity::Successor => candidates.next_back(),
        }?;
        Some(self.span_starts[index] + offset - self.spans[index].span().start())
    }

    /// Splits a document range into the store ranges behind it.
    pub fn store_ranges(&self, range: Range<usize>) -> Vec<StoreRange> {
        let mut pieces = Vec::new();
        for (index, span) in self.spans.iter().enumerate() {
            let doc = self.span_document_range(index);
            let start = doc.start.max(range.start);
            let end = doc.end.min(range.end);
            if start < end {
                let offset = span.span().start();
                pieces.push(StoreRange {
                    span_index: index,
                    store: span.store(),
                    range: offset + start - doc.start..offset + end - doc.start,
                });
            }
        }
        pieces
    }

    fn refresh(&mut self) {
        self.text.clear();
        self.span_starts.clear();
        for span in &self.spans {
            let range = span.span().range();
            let store = match span.store() {
                StoreId::Prompt => &self.prompts,
                StoreId::Language(generation) => &self.languages[generation],
                StoreId::StandardInput => &self.standard_input,
                StoreId::Output => &self.output,
            };
            debug_assert!(range.end <= store.len(), "span {range:?} outside its store");
            self.span_starts.push(self.text.len());
            self.text.push_str(store.slice(range));
        }
        self.line_starts = text::line_starts(&self.text);
        self.prompt_lines.clear();
        for (index, span) in self.spans.iter().enumerate() {
            if span.kind().is_prompt() {
                let line = text::line_number_at(&self.line_starts, self.span_starts[index]);
                self.prompt_lines.insert(line, index);
            }
        }
        self.version += 1;
    }
}
