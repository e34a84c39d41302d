//! Tracked spans over the window's backing stores.
//!
//! The composed document is an ordered list of [`ReplSpan`]s. Each one names a
//! range in a backing store whose endpoints follow edits made to that store.
//! How an endpoint reacts to an insertion exactly at it is decided by its
//! [`PointTracking`]:
//!
//! * open spans (`Negative`, `Positive`) grow when text is appended at their end,
//! * closed spans (`Negative`, `Negative`) never absorb text at their edges,
//! * edge-exclusive spans (`Positive`, `Negative`) absorb nothing at either edge.

use std::ops::Range;

use crate::store::RegionId;

/// What a span of the composed document represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum ReplSpanKind {
    /// No span; reported for lines that carry no prompt.
    None,
    /// The primary prompt starting a submission.
    Prompt,
    /// The prompt shown before each continuation line of a submission.
    SecondaryPrompt,
    /// The prompt shown when the evaluator asks for standard input.
    StandardInputPrompt,
    /// Text typed in the REPL's language.
    Language,
    /// Text typed in answer to a standard input request.
    StandardInput,
    /// Output written by the evaluator or by commands.
    Output,
}

impl ReplSpanKind {
    pub fn is_prompt(self) -> bool {
        matches!(
            self,
            ReplSpanKind::Prompt | ReplSpanKind::SecondaryPrompt | ReplSpanKind::StandardInputPrompt
        )
    }

    pub fn is_input(self) -> bool {
        matches!(self, ReplSpanKind::Language | ReplSpanKind::StandardInput)
    }
}

/// Identifies one of the window's backing text stores.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreId {
    Prompt,
    /// Language input of one submission. The value is the store's generation.
    Language(usize),
    StandardInput,
    Output,
}

impl StoreId {
    pub fn is_language(self) -> bool {
        matches!(self, StoreId::Language(_))
    }

    /// Whether the user may type into this store at all.
    pub fn is_user_editable(self) -> bool {
        matches!(self, StoreId::Language(_) | StoreId::StandardInput)
    }
}

/// How a span endpoint moves when text is inserted exactly at it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointTracking {
    /// The point stays before the inserted text.
    Negative,
    /// The point moves past the inserted text.
    Positive,
}

/// A range in a backing store whose endpoints follow edits to that store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TrackingSpan {
    store: StoreId,
    start: usize,
    end: usize,
    start_tracking: PointTracking,
    end_tracking: PointTracking,
}

impl TrackingSpan {
    pub fn new(
        store: StoreId,
        range: Range<usize>,
        start_tracking: PointTracking,
        end_tracking: PointTracking,
    ) -> Self {
        debug_assert!(range.start <= range.end, "inverted span range {range:?}");
        Self {
            store,
            start: range.start,
            end: range.end,
            start_tracking,
            end_tracking,
        }
    }

    /// A span that grows when text is inserted at its end.
    pub fn open(store: StoreId, range: Range<usize>) -> Self {
        Self::new(store, range, PointTracking::Negative, PointTracking::Positive)
    }

    /// A span that never grows at its edges.
    pub fn closed(store: StoreId, range: Range<usize>) -> Self {
        Self::new(store, range, PointTracking::Negative, PointTracking::Negative)
    }

    /// A span whose edges both push insertions outside. Used for prompts.
    pub fn edge_exclusive(store: StoreId, range: Range<usize>) -> Self {
        Self::new(store, range, PointTracking::Positive, PointTracking::Negative)
    }

    pub fn store(&self) -> StoreId {
        self.store
    }

    pub fn start(&self) -> usize {
        self.start
    }

    pub fn end(&self) -> usize {
        self.end
    }

    pub fn range(&self) -> Range<usize> {
        self.start..self.end
    }

    pub fn len(&self) -> usize {
        self.end - self.start
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Whether text inserted at the end of this span becomes part of it.
    pub fn is_open_ended(&self) -> bool {
        self.end_tracking == PointTracking::Positive
    }

    /// The same range with closed tracking.
    pub fn to_closed(&self) -> Self {
        Self::closed(self.store, self.range())
    }

    pub(crate) fn track_insert(&mut self, position: usize, len: usize) {
        self.start = track_point(self.start, self.start_tracking, position, len);
        self.end = track_point(self.end, self.end_tracking, position, len);
        // an empty edge-exclusive span at the insertion point stays before it
        if self.end < self.start {
            self.start = self.end;
        }
    }

    pub(crate) fn track_delete(&mut self, range: Range<usize>) {
        self.start = track_deleted_point(self.start, &range);
        self.end = track_deleted_point(self.end, &range);
    }
}

fn track_point(point: usize, tracking: PointTracking, position: usize, len: usize) -> usize {
    if point > position || (point == position && tracking == PointTracking::Positive) {
        point + len
    } else {
        point
    }
}

fn track_deleted_point(point: usize, range: &Range<usize>) -> usize {
    if point <= range.start {
        point
    } else if point >= range.end {
        point - (range.end - range.start)
    } else {
        range.start
    }
}

/// One element of the composed document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReplSpan {
    span: TrackingSpan,
    kind: ReplSpanKind,
    read_only_region: Option<RegionId>,
}

impl ReplSpan {
    pub fn new(span: TrackingSpan, kind: ReplSpanKind) -> Self {
        debug_assert!(
            kind_matches_store(kind, span.store()),
            "{kind:?} span cannot be backed by {:?}",
            span.store()
        );
        Self {
            span,
            kind,
            read_only_region: None,
        }
    }

    pub(crate) fn with_region(span: TrackingSpan, kind: ReplSpanKind, region: RegionId) -> Self {
        Self {
            read_only_region: Some(region),
            ..Self::new(span, kind)
        }
    }

    pub fn kind(&self) -> ReplSpanKind {
        self.kind
    }

    pub fn span(&self) -> &TrackingSpan {
        &self.span
    }

    pub fn store(&self) -> StoreId {
        self.span.store()
    }

    pub fn len(&self) -> usize {
        self.span.len()
    }

    pub fn is_empty(&self) -> bool {
        self.span.is_empty()
    }

    pub fn read_only_region(&self) -> Option<RegionId> {
        self.read_only_region
    }

    pub(crate) fn span_mut(&mut self) -> &mut TrackingSpan {
        &mut self.span
    }
}

fn kind_matches_store(kind: ReplSpanKind, store: StoreId) -> bool {
    match kind {
        ReplSpanKind::None => false,
        ReplSpanKind::Prompt | ReplSpanKind::SecondaryPrompt | ReplSpanKind::StandardInputPrompt => {
            store == StoreId::Prompt
        }
        ReplSpanKind::Language => store.is_language(),
        ReplSpanKind::StandardInput => store == StoreId::StandardInput,
        ReplSpanKind::Output => store == StoreId::Output,
    }
}
