//! Bounded undo/redo history
//!
//! Linear snapshot history: the snapshot under the cursor is always the live
//! working state. Committing from a non-tip cursor drops the redo tail.

use std::collections::VecDeque;

/// Default maximum number of retained snapshots
pub const DEFAULT_HISTORY_LIMIT: usize = 50;

/// Snapshot history over values of `T`
#[derive(Debug, Clone)]
pub struct History<T> {
    snapshots: VecDeque<T>,
    cursor: usize,
    limit: usize,
}

impl<T: Clone + PartialEq> History<T> {
    /// Create a history holding only `initial`
    #[must_use]
    pub fn new(initial: T, limit: usize) -> Self {
        let mut snapshots = VecDeque::with_capacity(limit.min(64));
        snapshots.push_back(initial);
        Self {
            snapshots,
            cursor: 0,
            limit: limit.max(1),
        }
    }

    /// Snapshot at the cursor
    #[must_use]
    pub fn current(&self) -> &T {
        &self.snapshots[self.cursor]
    }

    /// Record `next` as the new current snapshot.
    ///
    /// Returns `false` and leaves the history untouched when `next` equals
    /// the current snapshot.
    pub fn commit(&mut self, next: T) -> bool {
        if *self.current() == next {
            return false;
        }

        self.snapshots.truncate(self.cursor + 1);
        self.snapshots.push_back(next);
        self.cursor += 1;

        while self.snapshots.len() > self.limit {
            self.snapshots.pop_front();
            self.cursor = self.cursor.saturating_sub(1);
        }
        true
    }

    /// Step back one snapshot, or `None` at the oldest entry
    pub fn undo(&mut self) -> Option<T> {
        if !self.can_undo() {
            return None;
        }
        self.cursor -= 1;
        Some(self.current().clone())
    }

    /// Step forward one snapshot, or `None` at the tip
    pub fn redo(&mut self) -> Option<T> {
        if !self.can_redo() {
            return None;
        }
        self.cursor += 1;
        Some(self.current().clone())
    }

    /// Whether an older snapshot exists
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor > 0
    }

    /// Whether a newer snapshot exists
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor + 1 < self.snapshots.len()
    }

    /// Replace the whole history with `initial`
    pub fn reset(&mut self, initial: T) {
        self.snapshots.clear();
        self.snapshots.push_back(initial);
        self.cursor = 0;
    }

    /// Number of retained snapshots
    #[must_use]
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Always false; a history holds at least one snapshot
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Cursor position
    #[must_use]
    pub fn position(&self) -> usize {
        self.cursor
    }

    /// Configured maximum length
    #[must_use]
    pub fn limit(&self) -> usize {
        self.limit
    }
}

impl<T: Clone + PartialEq + Default> Default for History<T> {
    fn default() -> Self {
        Self::new(T::default(), DEFAULT_HISTORY_LIMIT)
    }
}
