//! Snapshot-based undo/redo.
//!
//! Each checkpoint stores a full structural copy of the canvas taken *before*
//! a mutation. Undo swaps the live state with the newest checkpoint, pushing
//! the live state onto the redo stack; redo is the mirror image.

use crate::canvas::CanvasState;
use std::collections::VecDeque;

/// Default number of undo states to keep.
pub const DEFAULT_MAX_HISTORY: usize = 30;

/// An independent copy of a canvas's semantic data.
#[derive(Debug, Clone, PartialEq)]
pub struct CanvasSnapshot(CanvasState);

impl CanvasSnapshot {
    pub fn capture(state: &CanvasState) -> Self {
        Self(state.snapshot())
    }

    pub fn state(&self) -> &CanvasState {
        &self.0
    }

    pub fn into_state(self) -> CanvasState {
        self.0
    }
}

/// Bounded undo/redo stacks.
#[derive(Debug, Clone)]
pub struct HistoryManager {
    undo_stack: VecDeque<CanvasSnapshot>,
    redo_stack: Vec<CanvasSnapshot>,
    max_size: usize,
}

impl Default for HistoryManager {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_HISTORY)
    }
}

impl HistoryManager {
    /// A `max_size` of zero is treated as one.
    pub fn new(max_size: usize) -> Self {
        Self {
            undo_stack: VecDeque::new(),
            redo_stack: Vec::new(),
            max_size: max_size.max(1),
        }
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    /// Record `state` before it is mutated.
    pub fn checkpoint(&mut self, state: &CanvasState) {
        self.redo_stack.clear();
        self.undo_stack.push_back(CanvasSnapshot::capture(state));
        while self.undo_stack.len() > self.max_size {
            self.undo_stack.pop_front();
        }
        log::debug!("History checkpoint ({} entries)", self.undo_stack.len());
    }

    /// Restore the newest checkpoint. Returns false, leaving `state`
    /// untouched, when there is nothing to undo.
    pub fn undo(&mut self, state: &mut CanvasState) -> bool {
        let Some(snapshot) = self.undo_stack.pop_back() else {
            return false;
        };
        self.redo_stack.push(CanvasSnapshot::capture(state));
        state.restore(snapshot.into_state());
        true
    }

    /// Re-apply the most recently undone state.
    pub fn redo(&mut self, state: &mut CanvasState) -> bool {
        let Some(snapshot) = self.redo_stack.pop() else {
            return false;
        };
        self.undo_stack.push_back(CanvasSnapshot::capture(state));
        state.restore(snapshot.into_state());
        true
    }

    /// Total stored states, undo plus redo.
    pub fn len(&self) -> usize {
        self.undo_stack.len() + self.redo_stack.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of steps that can be undone.
    pub fn position(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn can_undo(&self) -> bool {
        !self.undo_stack.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo_stack.is_empty()
    }

    pub fn clear(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }
}
