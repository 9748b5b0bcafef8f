//! # Undo/Redo History
//!
//! A linear snapshot stack with a movable cursor.
//!
//! ```text
//! push(a) push(b) push(c)   [a b c]  cursor=c
//! undo                      [a b c]  cursor=b
//! push(d)                   [a b d]  cursor=d   (c is discarded)
//! ```
//!
//! Snapshots are whole copies of the document arrays; there is no branching.
//! An [`AutoSave`] debouncer decides when the controller should record a new
//! snapshot after a burst of edits.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::connection::Connection;
use crate::element::SystemElement;
use crate::stroke::FreehandStroke;
use crate::text::TextAnnotation;

/// Default maximum number of retained snapshots.
pub const DEFAULT_HISTORY_CAPACITY: usize = 50;

/// Default inactivity window before an automatic snapshot, in milliseconds.
pub const DEFAULT_DEBOUNCE_MS: u64 = 1000;

/// Tunables for the history buffer and its autosave.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum snapshots kept; the oldest is evicted beyond this.
    pub capacity: usize,
    /// Quiet period after the last change before autosave fires.
    pub debounce_ms: u64,
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_HISTORY_CAPACITY,
            debounce_ms: DEFAULT_DEBOUNCE_MS,
        }
    }
}

/// A saved copy of the full canvas contents.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct HistorySnapshot {
    /// Placed elements.
    pub elements: Vec<SystemElement>,
    /// Connections between elements.
    pub connections: Vec<Connection>,
    /// Freehand strokes and shapes.
    pub strokes: Vec<FreehandStroke>,
    /// Text annotations.
    #[serde(default)]
    pub texts: Vec<TextAnnotation>,
}

/// Linear undo stack.
#[derive(Debug, Clone)]
pub struct HistoryBuffer<T> {
    entries: VecDeque<T>,
    cursor: Option<usize>,
    capacity: usize,
}

impl<T: Clone + PartialEq> HistoryBuffer<T> {
    /// Create an empty buffer holding at most `capacity` entries (minimum 1).
    #[must_use]
    pub fn new(capacity: usize) -> Self {
        Self {
            entries: VecDeque::new(),
            cursor: None,
            capacity: capacity.max(1),
        }
    }

    /// Create a buffer whose first entry is `initial`.
    #[must_use]
    pub fn with_initial(capacity: usize, initial: T) -> Self {
        let mut buffer = Self::new(capacity);
        buffer.push(initial);
        buffer
    }

    /// Record a snapshot as the new tip.
    ///
    /// Entries after the cursor are discarded first. When the buffer
    /// overflows, the oldest entry is dropped.
    pub fn push(&mut self, entry: T) {
        if let Some(cursor) = self.cursor {
            self.entries.truncate(cursor + 1);
        }
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
        }
        self.cursor = Some(self.entries.len() - 1);
    }

    /// Push only if `entry` differs by value from the current entry.
    ///
    /// Returns whether a push happened.
    pub fn push_if_changed(&mut self, entry: T) -> bool {
        if self.current() == Some(&entry) {
            return false;
        }
        self.push(entry);
        true
    }

    /// Step back one entry and return a copy of it.
    ///
    /// Returns `None` (and does nothing) at the oldest entry.
    pub fn undo(&mut self) -> Option<T> {
        let cursor = self.cursor?;
        if cursor == 0 {
            return None;
        }
        self.cursor = Some(cursor - 1);
        self.entries.get(cursor - 1).cloned()
    }

    /// Step forward one entry and return a copy of it.
    ///
    /// Returns `None` (and does nothing) at the newest entry.
    pub fn redo(&mut self) -> Option<T> {
        let cursor = self.cursor?;
        if cursor + 1 >= self.entries.len() {
            return None;
        }
        self.cursor = Some(cursor + 1);
        self.entries.get(cursor + 1).cloned()
    }

    /// Whether [`undo`](Self::undo) would move.
    #[must_use]
    pub fn can_undo(&self) -> bool {
        self.cursor.is_some_and(|c| c > 0)
    }

    /// Whether [`redo`](Self::redo) would move.
    #[must_use]
    pub fn can_redo(&self) -> bool {
        self.cursor.is_some_and(|c| c + 1 < self.entries.len())
    }

    /// The entry under the cursor.
    #[must_use]
    pub fn current(&self) -> Option<&T> {
        self.cursor.and_then(|c| self.entries.get(c))
    }

    /// Cursor position, if any entry exists.
    #[must_use]
    pub fn index(&self) -> Option<usize> {
        self.cursor
    }

    /// Number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no entry has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Maximum number of entries.
    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Iterate entries from oldest to newest.
    pub fn iter(&self) -> impl Iterator<Item = &T> {
        self.entries.iter()
    }

    /// Drop every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.cursor = None;
    }
}

/// Debounced snapshot trigger.
///
/// Every edit calls [`note_change`](Self::note_change), restarting the quiet
/// period. [`poll`](Self::poll) records one snapshot once the period has
/// elapsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AutoSave {
    debounce_ms: u64,
    pending_since: Option<u64>,
}

impl AutoSave {
    /// Create a debouncer with the given quiet period.
    #[must_use]
    pub const fn new(debounce_ms: u64) -> Self {
        Self {
            debounce_ms,
            pending_since: None,
        }
    }

    /// Register an edit at `now_ms`.
    pub fn note_change(&mut self, now_ms: u64) {
        self.pending_since = Some(now_ms);
    }

    /// Forget any pending edit.
    pub fn cancel(&mut self) {
        self.pending_since = None;
    }

    /// Whether an edit is waiting to be saved.
    #[must_use]
    pub fn is_pending(&self) -> bool {
        self.pending_since.is_some()
    }

    /// Whether the quiet period has elapsed at `now_ms`.
    #[must_use]
    pub fn is_due(&self, now_ms: u64) -> bool {
        self.pending_since
            .is_some_and(|since| now_ms.saturating_sub(since) >= self.debounce_ms)
    }

    /// Push `snapshot()` into `history` if due and changed.
    ///
    /// Returns whether a snapshot was recorded.
    pub fn poll<T, F>(&mut self, now_ms: u64, history: &mut HistoryBuffer<T>, snapshot: F) -> bool
    where
        T: Clone + PartialEq,
        F: FnOnce() -> T,
    {
        if !self.is_due(now_ms) {
            return false;
        }
        self.pending_since = None;
        let pushed = history.push_if_changed(snapshot());
        if pushed {
            tracing::debug!("Autosaved history snapshot ({} entries)", history.len());
        }
        pushed
    }
}
