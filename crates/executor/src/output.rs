//! Output enum for command execution results.
//!
//! Every action produces exactly one output type. The mapping is documented
//! on each [`Action`](crate::Action) variant.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use tropy_core::{Item, ItemId, Note, NoteId, Photo, PhotoId, TagId};

/// Successful command execution results.
///
/// # Example
///
/// ```text
/// use tropy_executor::{Action, Output};
///
/// match session.dispatch(Action::ItemDestroy { ids: None }).await? {
///     Output::Destroyed(report) => println!("pruned {} items", report.items.len()),
///     Output::Cancelled => println!("kept the trash"),
///     _ => unreachable!("ItemDestroy returns Destroyed or Cancelled"),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Output {
    // ==================== Control ====================
    /// No return value
    Unit,

    /// The user declined a confirmation prompt; nothing was changed
    Cancelled,

    // ==================== Items ====================
    /// A single item (create, merge, implode)
    Item(Item),

    /// Several items, in request order
    Items(Vec<Item>),

    /// Tag set of one item after the change
    Tags {
        /// The item
        id: ItemId,
        /// Its tags now
        tags: BTreeSet<TagId>,
    },

    /// Rows removed by a destroy
    Destroyed(DestroyReport),

    /// Import summary
    Imported(ImportReport),

    // ==================== Photos ====================
    /// Several photos, in request order
    Photos(Vec<Photo>),

    // ==================== Notes ====================
    /// A single note
    Note(Note),

    /// Several notes
    Notes(Vec<Note>),
}

/// Rows permanently removed by [`Action::ItemDestroy`](crate::Action::ItemDestroy)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DestroyReport {
    /// Destroyed items
    pub items: Vec<ItemId>,
    /// Destroyed photos
    pub photos: Vec<PhotoId>,
    /// Destroyed notes
    pub notes: Vec<NoteId>,
}

impl DestroyReport {
    /// Whether nothing was removed
    pub fn is_empty(&self) -> bool {
        self.items.is_empty() && self.photos.is_empty() && self.notes.is_empty()
    }
}

/// Result of [`Action::ItemImport`](crate::Action::ItemImport)
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportReport {
    /// Items created, in file order
    pub created: Vec<ItemId>,
    /// Files skipped because their content is already in the project
    pub duplicates: Vec<PathBuf>,
    /// Files that could not be imported
    pub failures: Vec<ImportFailure>,
}

/// A file that failed to import
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImportFailure {
    /// Source file
    pub path: PathBuf,
    /// Rendered error
    pub reason: String,
}
