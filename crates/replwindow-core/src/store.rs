//! Backing text stores.

use std::ops::Range;

/// Identifier of a read-only region created on a [`TextStore`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RegionId(u64);

#[derive(Debug, Clone)]
struct StoreRegion {
    id: RegionId,
    range: Range<usize>,
}

/// A text buffer behind one kind of span in the composed document.
///
/// Programmatic edits always succeed. The `allows_user_*` checks tell the
/// window whether an edit coming from the user may touch a range: a locked
/// store rejects every user edit, and read-only regions reject user edits
/// strictly inside or overlapping them.
#[derive(Debug, Clone, Default)]
pub struct TextStore {
    text: String,
    regions: Vec<StoreRegion>,
    next_region: u64,
    locked: bool,
}

impl TextStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// A store the user can never edit.
    pub fn locked() -> Self {
        Self {
            locked: true,
            ..Self::default()
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

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    pub fn slice(&self, range: Range<usize>) -> &str {
        &self.text[range]
    }

    /// Appends text and returns the range it now occupies.
    pub fn append(&mut self, text: &str) -> Range<usize> {
        let start = self.text.len();
        self.insert(start, text);
        start..self.text.len()
    }

    pub fn insert(&mut self, position: usize, text: &str) {
        self.text.insert_str(position, text);
        let len = text.len();
        for region in &mut self.regions {
            if region.range.start >= position {
                region.range.start += len;
            }
            if region.range.end > position {
                region.range.end += len;
            }
            if region.range.end < region.range.start {
                region.range.end = region.range.start;
            }
        }
    }

    pub fn delete(&mut self, range: Range<usize>) {
        let removed = range.end - range.start;
        self.text.replace_range(range.clone(), "");
        for region in &mut self.regions {
            for point in [&mut region.range.start, &mut region.range.end] {
                if *point >= range.end {
                    *point -= removed;
                } else if *point > range.start {
                    *point = range.start;
                }
            }
        }
    }

    /// Clears text and read-only regions. A locked store stays locked.
    pub fn clear(&mut self) {
        self.text.clear();
        self.regions.clear();
    }

    pub fn create_read_only_region(&mut self, range: Range<usize>) -> RegionId {
        let id = RegionId(self.next_region);
        self.next_region += 1;
        self.regions.push(StoreRegion { id, range });
        id
    }

    /// Removes a region. Returns `false` when the region no longer exists.
    pub fn remove_read_only_region(&mut self, id: RegionId) -> bool {
        let before = self.regions.len();
        self.regions.retain(|region| region.id != id);
        self.regions.len() != before
    }

    pub fn read_only_region_count(&self) -> usize {
        self.regions.len()
    }

    pub fn allows_user_insert(&self, position: usize) -> bool {
        !self.locked
            && self
                .regions
                .iter()
                .all(|region| position <= region.range.start || position >= region.range.end)
    }

    pub fn allows_user_delete(&self, range: Range<usize>) -> bool {
        !self.locked
            && self
                .regions
                .iter()
                .all(|region| range.end <= region.range.start || range.start >= region.range.end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_append_returns_range() {
        let mut store = TextStore::new();
        assert_eq!(store.append("» "), 0..3);
        assert_eq!(store.append("..."), 3..6);
        assert_eq!(store.slice(3..6), "...");
    }

    #[test]
    fn test_locked_store_rejects_user_edits() {
        let mut store = TextStore::locked();
        store.append("> ");
        assert!(!store.allows_user_insert(0));
        assert!(!store.allows_user_delete(0..1));
        store.clear();
        assert!(store.is_locked());
    }

    #[test]
    fn test_read_only_region_bounds() {
        let mut store = TextStore::new();
        store.append("abcdef");
        let id = store.create_read_only_region(2..4);
        assert!(store.allows_user_insert(2));
        assert!(!store.allows_user_insert(3));
        assert!(store.allows_user_insert(4));
        assert!(!store.allows_user_delete(1..3));
        assert!(store.allows_user_delete(4..6));
        assert!(store.remove_read_only_region(id));
        assert!(!store.remove_read_only_region(id));
        assert!(store.allows_user_insert(3));
    }

    #[test]
    fn test_regions_follow_edits() {
        let mut store = TextStore::new();
        store.append("abcdef");
        store.create_read_only_region(2..4);
        store.insert(0, "xx");
        assert!(!store.allows_user_insert(5));
        assert!(store.allows_user_insert(3));
        store.delete(0..2);
        assert!(!store.allows_user_insert(3));
        assert_eq!(store.read_only_region_count(), 1);
    }
}
