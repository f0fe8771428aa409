//! Tropy - command, undo and notification engine for photo archives
//!
//! Tropy projects hold archival items, each owning an ordered list of
//! photos with metadata, tags, list memberships and notes. Every change to
//! a project is an [`Action`] dispatched through a [`Session`], which runs
//! it in one store transaction, records its inverse for undo, and announces
//! the result on the [`ActionBus`].
//!
//! # Quick Start
//!
//! ```ignore
//! use tropy::{Action, Context, Database, Output, Session};
//!
//! // Open (or create) a project directory
//! let session = Session::new(Context::new(Database::open("/path/to/project")?));
//!
//! // Import scans, one item per file
//! let report = session.dispatch(Action::ItemImport { files, list: None }).await?;
//!
//! // Changed your mind
//! session.undo().await?;
//! ```
//!
//! # Architecture
//!
//! All operations go through the [`Executor`], which maps each action to
//! its handler. The [`Session`] adds history and serializes dispatches.
//!
//! Internal implementation details (row tables, snapshots, transaction
//! bookkeeping) are not exposed - only the executor API is public.

// Re-export the public API from tropy-executor
pub use tropy_executor::*;
