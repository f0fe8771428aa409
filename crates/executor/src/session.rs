//! Stateful session with undo/redo history.
//!
//! The [`Session`] wraps an [`Executor`] and owns the project's
//! [`History`]. Every dispatch, undo and redo runs under one async gate, so
//! no two commands ever interleave their read, transaction and notify
//! phases.
//!
//! # Usage
//!
//! ```ignore
//! use tropy_executor::{Action, Context, Database, Session};
//!
//! let session = Session::new(Context::new(Database::cache()));
//!
//! let created = session.dispatch(Action::ItemCreate { template: None, list: None }).await?;
//! session.undo().await?;   // the item is trashed
//! session.redo().await?;   // and back
//! ```

use std::collections::BTreeSet;
use tokio::sync::Mutex as Gate;
use tracing::{debug, info, warn};

use tropy_core::{NoteId, SubjectId, Timestamp};

use crate::action::{Action, Meta};
use crate::bus::ActionBus;
use crate::context::Context;
use crate::history::{Entry, History, HistorySummary};
use crate::notification::Notification;
use crate::output::{DestroyReport, Output};
use crate::{Executor, Result};

/// A project session: executor, history and the dispatch gate.
///
/// `Session` is `Send + Sync`; share it behind an `Arc` to dispatch from
/// several tasks. Dispatches queue on the gate and run one at a time.
pub struct Session {
    executor: Executor,
    history: parking_lot::Mutex<History>,
    gate: Gate<()>,
}

impl Session {
    /// Create a session whose history depth comes from the project config.
    pub fn new(ctx: Context) -> Self {
        let depth = ctx.config().history.depth;
        Self {
            executor: Executor::new(ctx),
            history: parking_lot::Mutex::new(History::new(depth)),
            gate: Gate::new(()),
        }
    }

    /// The execution context.
    pub fn context(&self) -> &Context {
        self.executor.context()
    }

    /// The action bus.
    pub fn bus(&self) -> &ActionBus {
        &self.executor.context().bus
    }

    /// Get a reference to the underlying executor.
    pub fn executor(&self) -> &Executor {
        &self.executor
    }

    /// Dispatch an action with default flags (recorded, prompting).
    pub async fn dispatch(&self, action: Action) -> Result<Output> {
        self.dispatch_with(action, Meta::default()).await
    }

    /// Dispatch an action.
    ///
    /// On success the outcome is recorded in history when `meta.record` is
    /// set and the command has an undo. On failure nothing was committed;
    /// the failure is reported on the bus and returned.
    pub async fn dispatch_with(&self, action: Action, meta: Meta) -> Result<Output> {
        let _gate = self.gate.lock().await;
        let init = Timestamp::now();
        let action_type = action.action_type();

        let outcome = match self.executor.execute(action.clone(), &meta).await {
            Ok(outcome) => outcome,
            Err(e) => {
                if e.is_expected() {
                    debug!(target: "tropy::dispatch", action = %action_type, error = %e, "Command skipped");
                } else {
                    warn!(target: "tropy::dispatch", action = %action_type, error = %e, "Command failed");
                }
                self.bus().emit(Notification::CommandFailed {
                    action: action_type,
                    reason: e.to_string(),
                });
                return Err(e);
            }
        };

        let mut changed = false;
        {
            let mut history = self.history.lock();
            if let Output::Destroyed(report) = &outcome.output {
                changed |= drop_destroyed(&mut history, report) > 0;
            }
            if meta.record {
                if let Some(undo) = outcome.undo {
                    let redo = outcome.redo.unwrap_or_else(|| action.clone());
                    history.record(Entry {
                        action,
                        meta,
                        undo,
                        redo,
                        init,
                        done: Timestamp::now(),
                    });
                    changed = true;
                }
            }
        }
        if changed {
            self.publish_history();
        }

        debug!(target: "tropy::dispatch", action = %action_type, "Command done");
        Ok(outcome.output)
    }

    /// Revert the newest recorded command.
    ///
    /// Returns `Ok(None)` when there is nothing to undo. If the inverse
    /// fails, the entry stays undoable, the failure is reported under the
    /// inverse's action type and the error is returned.
    pub async fn undo(&self) -> Result<Option<Output>> {
        let _gate = self.gate.lock().await;
        let Some(entry) = self.history.lock().pop_undo() else {
            return Ok(None);
        };
        let action_type = entry.action.action_type();
        let replayed = entry.undo.action_type();

        match self.executor.execute(entry.undo.clone(), &Meta::replay()).await {
            Ok(outcome) => {
                info!(target: "tropy::history", action = %action_type, "Undone");
                self.history.lock().push_undone(entry);
                self.publish_history();
                Ok(Some(outcome.output))
            }
            Err(e) => {
                warn!(target: "tropy::history", action = %action_type, replayed = %replayed, error = %e, "Undo failed");
                self.history.lock().restore_undo(entry);
                self.bus().emit(Notification::CommandFailed {
                    action: replayed,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Re-apply the newest undone command.
    ///
    /// Returns `Ok(None)` when there is nothing to redo. On success the
    /// entry's undo is replaced by the one the replay produced.
    pub async fn redo(&self) -> Result<Option<Output>> {
        let _gate = self.gate.lock().await;
        let Some(mut entry) = self.history.lock().pop_redo() else {
            return Ok(None);
        };
        let action_type = entry.action.action_type();
        let replayed = entry.redo.action_type();

        match self.executor.execute(entry.redo.clone(), &Meta::replay()).await {
            Ok(outcome) => {
                info!(target: "tropy::history", action = %action_type, "Redone");
                if let Some(undo) = outcome.undo {
                    entry.undo = undo;
                }
                entry.done = Timestamp::now();
                self.history.lock().push_redone(entry);
                self.publish_history();
                Ok(Some(outcome.output))
            }
            Err(e) => {
                warn!(target: "tropy::history", action = %action_type, replayed = %replayed, error = %e, "Redo failed");
                self.history.lock().restore_redo(entry);
                self.bus().emit(Notification::CommandFailed {
                    action: replayed,
                    reason: e.to_string(),
                });
                Err(e)
            }
        }
    }

    /// Forget all history, as when the project is closed.
    pub async fn close(&self) {
        let _gate = self.gate.lock().await;
        self.history.lock().clear();
        self.publish_history();
        info!(target: "tropy::history", "History cleared");
    }

    /// Labels and depths of the undo/redo stacks.
    pub fn history_summary(&self) -> HistorySummary {
        self.history.lock().summary()
    }

    /// Read the history stacks.
    pub fn inspect_history<T>(&self, f: impl FnOnce(&History) -> T) -> T {
        f(&self.history.lock())
    }

    /// Whether undo would do anything.
    pub fn can_undo(&self) -> bool {
        self.history.lock().can_undo()
    }

    /// Whether redo would do anything.
    pub fn can_redo(&self) -> bool {
        self.history.lock().can_redo()
    }

    fn publish_history(&self) {
        let summary = self.history.lock().summary();
        self.bus().emit(Notification::HistoryChanged(summary));
    }
}

/// Drop history entries that refer to destroyed rows
fn drop_destroyed(history: &mut History, report: &DestroyReport) -> usize {
    if report.is_empty() {
        return 0;
    }
    let subjects: BTreeSet<SubjectId> = report
        .items
        .iter()
        .map(|id| SubjectId::from(*id))
        .chain(report.photos.iter().map(|id| SubjectId::from(*id)))
        .collect();
    let notes: &[NoteId] = &report.notes;

    let dropped = history.drop_where(|entry| {
        entry.any_action(|a| {
            !a.subjects().is_disjoint(&subjects) || a.notes().iter().any(|n| notes.contains(n))
        })
    });
    if dropped > 0 {
        info!(target: "tropy::history", dropped, "Dropped history of destroyed items");
    }
    dropped
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("executor", &self.executor)
            .field("history", &self.history_summary())
            .finish()
    }
}
