//! Bounded, linear undo/redo history of canvas snapshots.
//!
//! The history is a sliding window of at most `max_size` snapshots with a
//! single cursor. The first snapshot pushed into an empty history is the
//! session's initial state; once the window slides past it, the oldest
//! retained snapshot becomes the reset target.

use std::collections::VecDeque;

use serde::Serialize;

use crate::pixel::PixelBuffer;

pub const DEFAULT_MAX_HISTORY_SIZE: usize = 20;

/// Snapshot of the history's counters, used to enable/disable undo and redo
/// controls.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct HistoryInfo {
    pub total_count: usize,
    pub current_index: Option<usize>,
    pub can_undo: bool,
    pub can_redo: bool,
    pub has_changes: bool,
    pub has_initial_state: bool,
}

#[derive(Debug, Clone)]
pub struct EditHistory {
    snapshots: VecDeque<PixelBuffer>,
    current_index: Option<usize>,
    max_size: usize,
    has_initial_state: bool,
}

impl Default for EditHistory {
    fn default() -> Self {
        Self::new()
    }
}

impl EditHistory {
    pub fn new() -> Self {
        Self::with_max_size(DEFAULT_MAX_HISTORY_SIZE)
    }

    pub fn with_max_size(max_size: usize) -> Self {
        let max_size = max_size.max(1);
        Self {
            snapshots: VecDeque::with_capacity(max_size),
            current_index: None,
            max_size,
            has_initial_state: false,
        }
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn current_index(&self) -> Option<usize> {
        self.current_index
    }

    /// Records a snapshot after the cursor, dropping any redo tail. Returns
    /// `false` for malformed buffers and leaves the history untouched.
    pub fn push(&mut self, buffer: &PixelBuffer) -> bool {
        if let Err(err) = buffer.validate() {
            tracing::warn!(%err, "rejected history snapshot");
            return false;
        }

        let keep = self.current_index.map_or(0, |index| index + 1);
        if keep < self.snapshots.len() {
            tracing::debug!(
                dropped = self.snapshots.len() - keep,
                "discarding redo tail"
            );
            self.snapshots.truncate(keep);
        }

        self.snapshots.push_back(buffer.clone());

        if self.snapshots.len() > self.max_size {
            self.snapshots.pop_front();
        } else {
            self.current_index = Some(self.current_index.map_or(0, |index| index + 1));
        }

        self.has_initial_state = true;
        tracing::debug!(
            total = self.snapshots.len(),
            current = ?self.current_index,
            "history snapshot recorded"
        );
        true
    }

    pub fn can_undo(&self) -> bool {
        self.current_index.is_some_and(|index| index > 0)
    }

    pub fn can_redo(&self) -> bool {
        self.current_index
            .is_some_and(|index| index + 1 < self.snapshots.len())
    }

    pub fn has_changes(&self) -> bool {
        self.has_initial_state && self.can_undo()
    }

    pub fn undo(&mut self) -> Option<PixelBuffer> {
        if !self.can_undo() {
            return None;
        }
        let index = self.current_index? - 1;
        self.current_index = Some(index);
        self.snapshots.get(index).cloned()
    }

    pub fn redo(&mut self) -> Option<PixelBuffer> {
        if !self.can_redo() {
            return None;
        }
        let index = self.current_index? + 1;
        self.current_index = Some(index);
        self.snapshots.get(index).cloned()
    }

    pub fn current_state(&self) -> Option<PixelBuffer> {
        self.snapshots.get(self.current_index?).cloned()
    }

    pub fn initial_state(&self) -> Option<PixelBuffer> {
        self.snapshots.front().cloned()
    }

    pub fn state_at(&self, index: usize) -> Option<PixelBuffer> {
        self.snapshots.get(index).cloned()
    }

    /// Moves the cursor back to the oldest retained snapshot. The redo tail
    /// is kept, so `redo` can walk forward again.
    pub fn reset_to_initial(&mut self) -> Option<PixelBuffer> {
        let initial = self.snapshots.front()?.clone();
        self.current_index = Some(0);
        tracing::debug!("history reset to initial state");
        Some(initial)
    }

    pub fn jump_to(&mut self, index: usize) -> Option<PixelBuffer> {
        let snapshot = self.snapshots.get(index)?.clone();
        self.current_index = Some(index);
        Some(snapshot)
    }

    /// Shrinking evicts the oldest snapshots first; the cursor moves back with
    /// them but never below the first retained entry.
    pub fn set_max_size(&mut self, max_size: usize) {
        self.max_size = max_size.max(1);
        while self.snapshots.len() > self.max_size {
            self.snapshots.pop_front();
            if let Some(index) = self.current_index.filter(|index| *index > 0) {
                self.current_index = Some(index - 1);
            }
        }
    }

    pub fn clear(&mut self) {
        self.snapshots.clear();
        self.current_index = None;
        self.has_initial_state = false;
    }

    pub fn info(&self) -> HistoryInfo {
        HistoryInfo {
            total_count: self.snapshots.len(),
            current_index: self.current_index,
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            has_changes: self.has_changes(),
            has_initial_state: self.has_initial_state,
        }
    }
}
