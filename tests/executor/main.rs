//! Executor Integration Tests
//!
//! End-to-end tests of the public `tropy` API against persistent projects:
//! - Import pipeline with real image decoding and thumbnails
//! - Project reopen and configuration
//! - Multi-command workflows undone step by step
//! - Notification stream as seen by a subscriber

mod common;

mod import_pipeline;
mod notifications;
mod persistence;
mod workflow;
