//! Read-only protection over the composed document.
//!
//! Two regions at most. While code runs, the whole document is locked. While
//! accepting input, everything before the active input is locked with the
//! boundary itself left insertable, and an empty region at offset zero stops
//! text from being inserted before the first span.

use std::ops::Range;

/// What happens to an insertion exactly at a region edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeInsertion {
    Allow,
    Deny,
}

/// Which protection layout is in effect.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProtectionPolicy {
    Running,
    AcceptingInput,
}

#[derive(Debug, Clone, PartialEq, Eq)]
struct DocumentRegion {
    range: Range<usize>,
    edge: EdgeInsertion,
}

impl DocumentRegion {
    fn allows_insert(&self, position: usize) -> bool {
        if position == self.range.start || position == self.range.end {
            self.edge == EdgeInsertion::Allow
        } else {
            position < self.range.start || position > self.range.end
        }
    }

    fn allows_delete(&self, range: &Range<usize>) -> bool {
        range.is_empty() || range.end <= self.range.start || range.start >= self.range.end
    }
}

/// Snapshot of the active protection, for inspection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProtectionState {
    pub policy: ProtectionPolicy,
    /// First document position that is not protected.
    pub boundary: usize,
}

#[derive(Debug, Clone, Default)]
pub struct ProtectionManager {
    regions: [Option<DocumentRegion>; 2],
    state: Option<ProtectionState>,
}

impl ProtectionManager {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_active(&self) -> bool {
        self.state.is_some()
    }

    pub fn state(&self) -> Option<ProtectionState> {
        self.state
    }

    /// Removes every region. Returns whether protection was active.
    pub fn remove(&mut self) -> bool {
        self.regions = [None, None];
        self.state.take().is_some()
    }

    /// Applies protection for `policy`. `boundary` is where the active input
    /// starts and is ignored while running.
    pub fn apply(&mut self, policy: ProtectionPolicy, boundary: usize, document_len: usize) {
        if self.is_active() {
            log::error!("protection applied twice; replacing the existing regions");
            self.remove();
        }
        match policy {
            ProtectionPolicy::Running => {
                self.regions[0] = Some(DocumentRegion {
                    range: 0..document_len,
                    edge: EdgeInsertion::Deny,
                });
                self.state = Some(ProtectionState {
                    policy,
                    boundary: document_len,
                });
            }
            ProtectionPolicy::AcceptingInput => {
                let boundary = boundary.min(document_len);
                self.regions[0] = Some(DocumentRegion {
                    range: 0..boundary,
                    edge: EdgeInsertion::Allow,
                });
                if document_len > 0 {
                    self.regions[1] = Some(DocumentRegion {
                        range: 0..0,
                        edge: EdgeInsertion::Deny,
                    });
                }
                self.state = Some(ProtectionState { policy, boundary });
            }
        }
        log::trace!("protection {:?}", self.state);
    }

    pub fn can_insert(&self, position: usize) -> bool {
        self.regions
            .iter()
            .flatten()
            .all(|region| region.allows_insert(position))
    }

    pub fn can_delete(&self, range: Range<usize>) -> bool {
        self.regions
            .iter()
            .flatten()
            .all(|region| region.allows_delete(&range))
    }

    /// Whether a caret at `position` sits inside locked text.
    pub fn is_protected(&self, position: usize) -> bool {
        match self.state {
            Some(ProtectionState {
                policy: ProtectionPolicy::Running,
                ..
            }) => true,
            Some(ProtectionState { boundary, .. }) => position < boundary,
            None => false,
        }
    }
}
