//! Undo/redo history.
//!
//! [`History`] keeps two stacks of executed commands:
//!
//! ```text
//! record(c3)
//!   past:   [c1, c2, c3]
//!   future: []
//!
//! undo() x2
//!   past:   [c1]
//!   future: [c3, c2]
//!
//! record(c4)   <-- new command, clears future
//!   past:   [c1, c4]
//!   future: []
//! ```
//!
//! # Invariants
//!
//! 1. `past.len() <= depth` and `future.len() <= depth`
//! 2. Every entry carries an undo action
//! 3. `future` is cleared whenever a new command is recorded
//!
//! History only moves entries. Replaying their actions is the session's job:
//! it pops an entry, replays it, and either moves it across or puts it back.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

use tropy_core::Timestamp;

use crate::action::{Action, ActionType, Meta};

/// An executed command
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// The action that was dispatched
    pub action: Action,
    /// Its dispatch flags
    pub meta: Meta,
    /// Inverse action
    pub undo: Action,
    /// Action that re-applies the command
    pub redo: Action,
    /// When the dispatch started
    pub init: Timestamp,
    /// When the command completed
    pub done: Timestamp,
}

impl Entry {
    /// Whether any of the entry's actions satisfy `f`
    pub fn any_action(&self, mut f: impl FnMut(&Action) -> bool) -> bool {
        f(&self.action) || f(&self.undo) || f(&self.redo)
    }
}

/// Labels and depths of the undo/redo stacks
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistorySummary {
    /// Command the next undo reverts
    pub undo: Option<ActionType>,
    /// Command the next redo re-applies
    pub redo: Option<ActionType>,
    /// Number of undoable commands
    pub past: usize,
    /// Number of redoable commands
    pub future: usize,
}

/// Bounded undo/redo stacks
#[derive(Debug, Clone)]
pub struct History {
    past: VecDeque<Entry>,
    future: VecDeque<Entry>,
    depth: usize,
}

impl History {
    /// Create an empty history keeping at most `depth` entries per stack
    pub fn new(depth: usize) -> Self {
        Self {
            past: VecDeque::new(),
            future: VecDeque::new(),
            depth: depth.max(1),
        }
    }

    /// Record a new command; clears the redo stack
    pub fn record(&mut self, entry: Entry) {
        self.future.clear();
        Self::push_bounded(&mut self.past, entry, self.depth);
    }

    /// Take the newest undoable entry
    pub fn pop_undo(&mut self) -> Option<Entry> {
        self.past.pop_back()
    }

    /// Take the newest redoable entry
    pub fn pop_redo(&mut self) -> Option<Entry> {
        self.future.pop_back()
    }

    /// Move an entry whose undo succeeded onto the redo stack
    pub fn push_undone(&mut self, entry: Entry) {
        Self::push_bounded(&mut self.future, entry, self.depth);
    }

    /// Move an entry whose redo succeeded back onto the undo stack
    ///
    /// Unlike [`History::record`] this keeps the redo stack.
    pub fn push_redone(&mut self, entry: Entry) {
        Self::push_bounded(&mut self.past, entry, self.depth);
    }

    /// Put back an entry whose undo replay failed
    pub fn restore_undo(&mut self, entry: Entry) {
        self.past.push_back(entry);
    }

    /// Put back an entry whose redo replay failed
    pub fn restore_redo(&mut self, entry: Entry) {
        self.future.push_back(entry);
    }

    fn push_bounded(stack: &mut VecDeque<Entry>, entry: Entry, depth: usize) {
        stack.push_back(entry);
        while stack.len() > depth {
            stack.pop_front();
        }
    }

    /// Remove entries matching `filter` from both stacks without replaying
    /// them; returns how many were removed
    pub fn drop_where(&mut self, mut filter: impl FnMut(&Entry) -> bool) -> usize {
        let before = self.past.len() + self.future.len();
        self.past.retain(|e| !filter(e));
        self.future.retain(|e| !filter(e));
        before - self.past.len() - self.future.len()
    }

    /// Forget everything
    pub fn clear(&mut self) {
        self.past.clear();
        self.future.clear();
    }

    /// Whether undo would do anything
    pub fn can_undo(&self) -> bool {
        !self.past.is_empty()
    }

    /// Whether redo would do anything
    pub fn can_redo(&self) -> bool {
        !self.future.is_empty()
    }

    /// Undoable entries, oldest first
    pub fn past(&self) -> impl Iterator<Item = &Entry> {
        self.past.iter()
    }

    /// Redoable entries, oldest first
    pub fn future(&self) -> impl Iterator<Item = &Entry> {
        self.future.iter()
    }

    /// Labels and depths for display
    pub fn summary(&self) -> HistorySummary {
        HistorySummary {
            undo: self.past.back().map(|e| e.action.action_type()),
            redo: self.future.back().map(|e| e.action.action_type()),
            past: self.past.len(),
            future: self.future.len(),
        }
    }
}
