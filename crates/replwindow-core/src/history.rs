//! Bounded submission history with navigation and prefix search.

use std::time::Duration;

/// Default number of entries kept by [`History`].
pub const DEFAULT_MAX_HISTORY: usize = 50;

/// One submitted input.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct HistoryEntry {
    #[cfg_attr(feature = "serde", serde(skip))]
    id: u64,
    text: String,
    is_command: bool,
    duration: Duration,
    failed: bool,
}

impl HistoryEntry {
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            id: 0,
            text: text.into(),
            is_command: false,
            duration: Duration::ZERO,
            failed: false,
        }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    /// Whether the entry was a REPL command rather than code.
    pub fn is_command(&self) -> bool {
        self.is_command
    }

    /// How long the submission took to complete.
    pub fn duration(&self) -> Duration {
        self.duration
    }

    pub fn failed(&self) -> bool {
        self.failed
    }

    pub(crate) fn mark_command(&mut self) {
        self.is_command = true;
    }

    pub(crate) fn record_completion(&mut self, duration: Duration, failed: bool) {
        self.duration = duration;
        if failed {
            self.failed = true;
        }
    }
}

/// Ordered list of submissions, oldest first.
///
/// Navigation keeps a cursor into the list. A fresh or just-added-to history
/// has its cursor at the live end, one past the newest entry, and the first
/// [`previous_text`](History::previous_text) returns the newest entry itself.
///
/// # Examples
///
/// ```
/// use replwindow_core::history::History;
///
/// let mut history = History::new();
/// history.add("1");
/// history.add("2");
/// assert_eq!(history.previous_text().as_deref(), Some("2"));
/// assert_eq!(history.previous_text().as_deref(), Some("1"));
/// assert_eq!(history.previous_text(), None);
/// assert_eq!(history.next_text().as_deref(), Some("2"));
/// ```
#[derive(Debug, Clone)]
pub struct History {
    entries: Vec<HistoryEntry>,
    max_length: usize,
    position: Option<usize>,
    live: bool,
    next_id: u64,
}

impl Default for History {
    fn default() -> Self {
        Self::new()
    }
}

impl History {
    pub fn new() -> Self {
        Self::with_max_length(DEFAULT_MAX_HISTORY)
    }

    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            entries: Vec::new(),
            max_length: max_length.max(1),
            position: None,
            live: false,
            next_id: 1,
        }
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn max_length(&self) -> usize {
        self.max_length
    }

    pub fn entries(&self) -> &[HistoryEntry] {
        &self.entries
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    /// The entry returned by [`record`](History::record), unless evicted since.
    pub(crate) fn entry_mut(&mut self, id: u64) -> Option<&mut HistoryEntry> {
        self.entries.iter_mut().rev().find(|entry| entry.id == id)
    }

    /// Cursor position, or `None` at the live end.
    pub fn position(&self) -> Option<usize> {
        self.position
    }

    /// Records a submission.
    ///
    /// Consecutive duplicates are collapsed. The cursor returns to the live end
    /// unless it already rests on an entry equal to `text`. When the list
    /// outgrows its limit the oldest entry is evicted.
    pub fn add(&mut self, text: &str) {
        self.record(text);
    }

    /// Adds `text` like [`add`](History::add) and returns the id of the entry
    /// holding it.
    pub(crate) fn record(&mut self, text: &str) -> u64 {
        self.live = false;
        if self.entries.last().map_or(true, |entry| entry.text != text) {
            let id = self.next_id;
            self.next_id += 1;
            self.entries.push(HistoryEntry {
                id,
                ..HistoryEntry::new(text)
            });
        }
        if self.entries[self.cursor()].text != text {
            self.position = None;
        }
        if self.entries.len() > self.max_length {
            self.entries.remove(0);
            if let Some(position) = self.position {
                self.position = Some(position.saturating_sub(1));
            }
        }
        self.entries.last().map_or(0, |entry| entry.id)
    }

    /// Steps to an older entry.
    pub fn previous_text(&mut self) -> Option<String> {
        if self.live {
            self.step(-1)
        } else {
            self.live = true;
            self.step(0)
        }
    }

    /// Steps to a newer entry.
    pub fn next_text(&mut self) -> Option<String> {
        self.live = true;
        self.step(1)
    }

    /// Steps back to the nearest older entry starting with `prefix`, ignoring case.
    /// The cursor is left untouched when nothing matches.
    pub fn find_previous(&mut self, prefix: &str) -> Option<String> {
        self.find(prefix, Self::previous_text)
    }

    /// Steps forward to the nearest newer entry starting with `prefix`, ignoring case.
    pub fn find_next(&mut self, prefix: &str) -> Option<String> {
        self.find(prefix, Self::next_text)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
        self.position = None;
        self.live = false;
    }

    fn find(&mut self, prefix: &str, step: fn(&mut Self) -> Option<String>) -> Option<String> {
        let saved = (self.position, self.live);
        let prefix = prefix.to_lowercase();
        while let Some(text) = step(self) {
            if text.to_lowercase().starts_with(&prefix) {
                return Some(text);
            }
        }
        (self.position, self.live) = saved;
        None
    }

    fn cursor(&self) -> usize {
        self.position
            .unwrap_or_else(|| self.entries.len().saturating_sub(1))
    }

    fn step(&mut self, offset: isize) -> Option<String> {
        if self.entries.is_empty() {
            return None;
        }
        let target = self.cursor() as isize + offset;
        if target < 0 || target as usize >= self.entries.len() {
            return None;
        }
        self.position = Some(target as usize);
        Some(self.entries[target as usize].text.clone())
    }
}
