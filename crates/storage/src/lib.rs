//! Store gateway for Tropy projects
//!
//! This crate implements the relational project store with:
//! - Tables: one ordered map per relation plus join sets
//! - Transaction: staged, all-or-nothing writes
//! - View: immutable snapshots of the committed state
//! - TransactionCoordinator: commit version and lifecycle metrics
//! - ProjectConfig: `tropy.toml` settings
//!
//! Persistent projects store their committed state in `project.json`,
//! rewritten on every commit.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod config;
pub mod coordinator;
pub mod database;
pub mod snapshot;
pub mod tables;
pub mod transaction;

pub use config::{
    DuplicatePolicy, HistoryConfig, ImportConfig, ProjectConfig, CONFIG_FILE_NAME,
    DEFAULT_HISTORY_DEPTH,
};
pub use coordinator::{TransactionCoordinator, TransactionMetrics};
pub use database::Database;
pub use snapshot::{View, SNAPSHOT_FILE_NAME};
pub use tables::Tables;
pub use transaction::{NewPhoto, PruneReport, Transaction};
