//! Command results.
//!
//! A handler returns an [`Outcome`]: what the caller sees, plus the
//! descriptors history needs to revert and re-apply the command.

use crate::action::Action;
use crate::output::Output;

/// Immutable result of one executed command
#[derive(Debug, Clone, PartialEq)]
pub struct Outcome {
    /// Returned to the caller
    pub output: Output,
    /// Inverse action; `None` means the command cannot be undone
    pub undo: Option<Action>,
    /// Action that re-applies the command; `None` means "dispatch the
    /// original action again"
    pub redo: Option<Action>,
}

impl Outcome {
    /// An outcome without undo
    pub fn new(output: Output) -> Self {
        Self {
            output,
            undo: None,
            redo: None,
        }
    }

    /// Set the inverse action
    pub fn with_undo(mut self, undo: Action) -> Self {
        self.undo = Some(undo);
        self
    }

    /// Set the inverse action if there is one
    pub fn with_undo_opt(mut self, undo: Option<Action>) -> Self {
        self.undo = undo;
        self
    }

    /// Set the redo action
    pub fn with_redo(mut self, redo: Action) -> Self {
        self.redo = Some(redo);
        self
    }
}
