//! Linear undo/redo history over full-table snapshots
//!
//! The undo stack is bounded (oldest evicted first); the redo stack is
//! cleared whenever a fresh action is recorded. There is no branching.

use std::collections::VecDeque;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::HistorySnapshot;

pub const DEFAULT_MAX_DEPTH: usize = 10;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStack {
    undo: VecDeque<HistorySnapshot>,
    redo: Vec<HistorySnapshot>,
    max_depth: usize,
}

impl Default for HistoryStack {
    fn default() -> Self {
        Self::new(DEFAULT_MAX_DEPTH)
    }
}

impl HistoryStack {
    pub fn new(max_depth: usize) -> Self {
        Self {
            undo: VecDeque::new(),
            redo: Vec::new(),
            max_depth: max_depth.max(1),
        }
    }

    /// Record the state captured before a fresh action
    pub fn record(&mut self, snapshot: HistorySnapshot) {
        self.push_undo(snapshot);
        self.redo.clear();
    }

    /// Newest undo entry, i.e. the state an undo would restore
    pub fn peek_undo(&self) -> Option<&HistorySnapshot> {
        self.undo.back()
    }

    pub fn peek_redo(&self) -> Option<&HistorySnapshot> {
        self.redo.last()
    }

    /// Pop the newest undo entry and park `current` on the redo stack.
    ///
    /// Call once the store has been replaced with the returned snapshot.
    pub fn undo(&mut self, current: HistorySnapshot) -> Option<HistorySnapshot> {
        let target = self.undo.pop_back()?;
        self.redo.push(current);
        Some(target)
    }

    /// Mirror of [`HistoryStack::undo`]
    pub fn redo(&mut self, current: HistorySnapshot) -> Option<HistorySnapshot> {
        let target = self.redo.pop()?;
        self.push_undo(current);
        Some(target)
    }

    pub fn can_undo(&self) -> bool {
        !self.undo.is_empty()
    }

    pub fn can_redo(&self) -> bool {
        !self.redo.is_empty()
    }

    pub fn undo_depth(&self) -> usize {
        self.undo.len()
    }

    pub fn redo_depth(&self) -> usize {
        self.redo.len()
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Shrink or grow the bound, evicting the oldest entries if needed
    pub fn set_max_depth(&mut self, max_depth: usize) {
        self.max_depth = max_depth.max(1);
        self.evict();
    }

    /// Undo entries, oldest first
    pub fn undo_entries(&self) -> impl Iterator<Item = &HistorySnapshot> {
        self.undo.iter()
    }

    pub fn status(&self) -> HistoryStatus {
        let last = self.undo.back();
        HistoryStatus {
            can_undo: self.can_undo(),
            can_redo: self.can_redo(),
            undo_depth: self.undo_depth(),
            redo_depth: self.redo_depth(),
            max_depth: self.max_depth,
            last_action: last.map(|s| s.action.clone()),
            last_action_at: last.map(|s| s.captured_at),
        }
    }

    fn push_undo(&mut self, snapshot: HistorySnapshot) {
        self.undo.push_back(snapshot);
        self.evict();
    }

    fn evict(&mut self) {
        while self.undo.len() > self.max_depth {
            self.undo.pop_front();
        }
    }
}

/// Undo/redo availability shown next to the grid
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryStatus {
    pub can_undo: bool,
    pub can_redo: bool,
    pub undo_depth: usize,
    pub redo_depth: usize,
    pub max_depth: usize,
    pub last_action: Option<String>,
    pub last_action_at: Option<DateTime<Utc>>,
}
