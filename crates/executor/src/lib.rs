//! # Tropy Executor
//!
//! The command layer of Tropy: every user-visible mutation of a project is
//! an [`Action`], executed by a handler in one store transaction, recorded
//! with its inverse in an undo/redo [`History`], and announced on the
//! [`ActionBus`].
//!
//! This is the only crate users need to import. It provides:
//! - [`Session`] - dispatch, undo and redo, serialized per project
//! - [`Action`]/[`Output`] - the closed command set and its results
//! - [`ActionBus`] - notifications and the in-memory [`State`] projection
//!
//! ## Quick Start
//!
//! ```text
//! use tropy_executor::{Action, Context, Database, Session};
//!
//! let db = Database::open("/path/to/project")?;
//! let session = Session::new(Context::new(db));
//!
//! session.dispatch(Action::ItemImport { files, list: None }).await?;
//! session.dispatch(Action::ItemMerge { ids: vec![a, b] }).await?;
//! session.undo().await?;
//! ```
//!
//! ## Command Families
//!
//! | Family | Actions |
//! |--------|---------|
//! | **Item** | create, delete, restore, destroy, load, merge, split, explode, implode, import, save |
//! | **Tag** | add, remove, set, toggle, clear |
//! | **List** | add items, remove items |
//! | **Note** | create, delete, restore |

#![warn(missing_docs)]

mod action;
mod bus;
pub mod collaborators;
mod command;
mod context;
mod convert;
mod error;
mod executor;
mod history;
mod notification;
mod output;
mod session;

// Handler modules
mod handlers;

// Test modules
#[cfg(test)]
mod tests;

// =============================================================================
// Public API - Everything users need is re-exported here
// =============================================================================

pub use action::{Action, ActionType, Meta, SaveEntry, SavePayload, SplitItem};
pub use bus::{ActionBus, State};
pub use collaborators::{
    AutoConfirm, DecodedImage, FsImageLoader, ImageLoader, Prompt, PromptResponse,
};
pub use command::Outcome;
pub use context::Context;
pub use error::Error;
pub use executor::Executor;
pub use handlers::item::DESTROY_PROMPT;
pub use history::{Entry, History, HistorySummary};
pub use notification::{ImportStatus, Notification};
pub use output::{DestroyReport, ImportFailure, ImportReport, Output};
pub use session::Session;

// Re-export record and id types so users don't need tropy-core directly
pub use tropy_core::{
    Item, ItemId, List, ListId, Metadata, MetadataPatch, MetadataValue, Note, NoteId, Photo,
    PhotoId, SubjectId, Tag, TagId, Template, TemplateField, TemplateId, Timestamp,
    DEFAULT_TEMPLATE, TITLE,
};

// Re-export the store gateway so users don't need tropy-storage directly
pub use tropy_storage::{
    Database, DuplicatePolicy, HistoryConfig, ImportConfig, ProjectConfig, CONFIG_FILE_NAME,
    SNAPSHOT_FILE_NAME,
};

/// Result type for executor operations
pub type Result<T> = std::result::Result<T, Error>;
