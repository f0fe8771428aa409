//! Commit versions and transaction counters
//!
//! The version counts commits, not writes: a merge touching twenty rows
//! advances it by one. It is persisted with every snapshot so a reopened
//! project continues where it left off.

use std::sync::atomic::{AtomicU64, Ordering};
use tracing::{debug, warn};

/// Commit version and lifecycle counters of one database
///
/// Counters are Relaxed and purely observational. The version only moves
/// while the database's writer lock is held.
#[derive(Debug)]
pub struct TransactionCoordinator {
    version: AtomicU64,
    started: AtomicU64,
    committed: AtomicU64,
    aborted: AtomicU64,
}

impl TransactionCoordinator {
    /// Continue from a persisted commit version
    pub fn new(initial_version: u64) -> Self {
        Self {
            version: AtomicU64::new(initial_version),
            started: AtomicU64::new(0),
            committed: AtomicU64::new(0),
            aborted: AtomicU64::new(0),
        }
    }

    /// A staged transaction began
    pub fn record_start(&self) {
        self.started.fetch_add(1, Ordering::Relaxed);
    }

    /// The staged tables were published; returns the new version
    pub fn record_commit(&self) -> u64 {
        self.committed.fetch_add(1, Ordering::Relaxed);
        let version = self.version.fetch_add(1, Ordering::AcqRel) + 1;
        debug!(target: "tropy::txn", version, "Transaction committed");
        version
    }

    /// The staged tables were dropped
    pub fn record_abort(&self, reason: &dyn std::fmt::Display) {
        self.aborted.fetch_add(1, Ordering::Relaxed);
        warn!(target: "tropy::txn", error = %reason, "Transaction rolled back");
    }

    /// Last committed version
    pub fn current_version(&self) -> u64 {
        self.version.load(Ordering::Acquire)
    }

    /// Counters since the database was opened
    pub fn metrics(&self) -> TransactionMetrics {
        let total_started = self.started.load(Ordering::Relaxed);
        let total_committed = self.committed.load(Ordering::Relaxed);
        let total_aborted = self.aborted.load(Ordering::Relaxed);
        TransactionMetrics {
            in_flight: total_started.saturating_sub(total_committed + total_aborted),
            total_started,
            total_committed,
            total_aborted,
        }
    }
}

/// Transaction counters since open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransactionMetrics {
    /// Started but not yet committed or rolled back (0 or 1)
    pub in_flight: u64,
    /// Transactions started
    pub total_started: u64,
    /// Transactions committed
    pub total_committed: u64,
    /// Transactions rolled back
    pub total_aborted: u64,
}
