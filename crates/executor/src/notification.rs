//! State-update notifications published on the action bus.
//!
//! Handlers emit notifications only after their transaction commits. The
//! in-memory [`State`](crate::State) projection is updated solely by applying
//! these notifications, so subscribers and the projection always agree.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use tropy_core::{Item, ItemId, Note, NoteId, Photo, PhotoId};

use crate::action::ActionType;
use crate::history::HistorySummary;

/// A state update
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Notification {
    // ==================== Items ====================
    /// New items were created
    ItemsInserted(Vec<Item>),
    /// Existing items changed (including soft delete and restore)
    ItemsUpdated(Vec<Item>),
    /// Items were read from the store on request
    ItemsLoaded(Vec<Item>),
    /// Items were destroyed
    ItemsRemoved(Vec<ItemId>),

    // ==================== Photos ====================
    /// Photos were created or moved
    PhotosUpdated(Vec<Photo>),
    /// Photos were destroyed
    PhotosRemoved(Vec<PhotoId>),

    // ==================== Notes ====================
    /// Notes were created or changed
    NotesUpdated(Vec<Note>),
    /// Notes were destroyed
    NotesRemoved(Vec<NoteId>),

    // ==================== Progress ====================
    /// One file of an import batch was processed
    ImportProgress {
        /// Zero-based position in the batch
        index: usize,
        /// Batch size
        total: usize,
        /// Source file
        path: PathBuf,
        /// What happened to it
        status: ImportStatus,
    },

    // ==================== Session ====================
    /// Undo/redo stacks changed
    HistoryChanged(HistorySummary),
    /// A dispatched command failed and was rolled back
    CommandFailed {
        /// Failed action
        action: ActionType,
        /// Rendered error
        reason: String,
    },
}

/// Per-file import outcome
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ImportStatus {
    /// A new item was created
    Imported {
        /// The created item
        item: ItemId,
    },
    /// Skipped: same content as an existing photo
    Duplicate {
        /// The existing photo
        photo: PhotoId,
    },
    /// The file could not be imported
    Failed {
        /// Rendered error
        reason: String,
    },
}
