//! Storage Layer Tests
//!
//! Tests of the project store through the public `tropy` re-exports:
//! - Atomic transactions (all-or-nothing, including on disk)
//! - Snapshot isolation of views
//! - Commit metrics

mod atomicity;
mod snapshot_isolation;
