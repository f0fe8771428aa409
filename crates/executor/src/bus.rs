//! Action bus and state projection.
//!
//! [`ActionBus`] fans notifications out to any number of subscribers over a
//! tokio broadcast channel and folds each one into the [`State`] projection
//! before sending it. Slow subscribers may lag and miss notifications; the
//! projection never does.

use parking_lot::RwLock;
use std::collections::BTreeMap;
use tokio::sync::broadcast;
use tracing::trace;

use tropy_core::{Item, ItemId, Note, NoteId, Photo, PhotoId};

use crate::history::HistorySummary;
use crate::notification::Notification;

/// Buffered notifications per subscriber before it starts lagging
const CHANNEL_CAPACITY: usize = 1024;

/// In-memory read-through projection of the store
///
/// Only [`State::apply`] mutates it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct State {
    /// Items seen so far, by id
    pub items: BTreeMap<ItemId, Item>,
    /// Photos seen so far, by id
    pub photos: BTreeMap<PhotoId, Photo>,
    /// Notes seen so far, by id
    pub notes: BTreeMap<NoteId, Note>,
    /// Last published history summary
    pub history: HistorySummary,
}

impl State {
    /// Fold one notification into the projection
    pub fn apply(&mut self, notification: &Notification) {
        match notification {
            Notification::ItemsInserted(items)
            | Notification::ItemsUpdated(items)
            | Notification::ItemsLoaded(items) => {
                for item in items {
                    self.items.insert(item.id, item.clone());
                }
            }
            Notification::ItemsRemoved(ids) => {
                for id in ids {
                    self.items.remove(id);
                }
            }
            Notification::PhotosUpdated(photos) => {
                for photo in photos {
                    self.photos.insert(photo.id, photo.clone());
                }
            }
            Notification::PhotosRemoved(ids) => {
                for id in ids {
                    self.photos.remove(id);
                }
            }
            Notification::NotesUpdated(notes) => {
                for note in notes {
                    self.notes.insert(note.id, note.clone());
                }
            }
            Notification::NotesRemoved(ids) => {
                for id in ids {
                    self.notes.remove(id);
                }
            }
            Notification::HistoryChanged(summary) => self.history = summary.clone(),
            Notification::ImportProgress { .. } | Notification::CommandFailed { .. } => {}
        }
    }
}

/// Notification dispatcher with a state projection
#[derive(Debug)]
pub struct ActionBus {
    sender: broadcast::Sender<Notification>,
    state: RwLock<State>,
}

impl Default for ActionBus {
    fn default() -> Self {
        Self::new()
    }
}

impl ActionBus {
    /// Create a bus with an empty projection
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(CHANNEL_CAPACITY);
        Self {
            sender,
            state: RwLock::new(State::default()),
        }
    }

    /// Apply a notification to the projection and broadcast it
    pub fn emit(&self, notification: Notification) {
        self.state.write().apply(&notification);
        trace!(target: "tropy::bus", ?notification, "Emit");
        // no receivers is fine
        let _ = self.sender.send(notification);
    }

    /// Receive every notification emitted from now on
    pub fn subscribe(&self) -> broadcast::Receiver<Notification> {
        self.sender.subscribe()
    }

    /// Read from the projection
    pub fn select<T>(&self, f: impl FnOnce(&State) -> T) -> T {
        f(&self.state.read())
    }
}
