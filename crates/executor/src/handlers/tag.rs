//! Tag handlers.
//!
//! Add and remove are each other's inverses over the (item, tag) pairs that
//! actually changed. When the changed items did not all change by the same
//! tags, the inverse falls back to restoring exact tag sets with `TagSet`.
//! Toggle is its own inverse.

use std::collections::{BTreeMap, BTreeSet};

use tropy_core::{ItemId, TagId};

use crate::action::Action;
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::require_ids;
use crate::notification::Notification;
use crate::output::Output;
use crate::{Error, Result};

/// Per-item tag changes of one command
struct Changes {
    /// Tag sets before the command, for changed items only
    before: BTreeMap<ItemId, BTreeSet<TagId>>,
    /// Tags that changed, per changed item
    changed: BTreeMap<ItemId, BTreeSet<TagId>>,
}

impl Changes {
    fn new() -> Self {
        Self {
            before: BTreeMap::new(),
            changed: BTreeMap::new(),
        }
    }

    fn record(&mut self, item: ItemId, before: BTreeSet<TagId>, changed: Vec<TagId>) {
        if changed.is_empty() {
            return;
        }
        self.before.insert(item, before);
        self.changed.insert(item, changed.into_iter().collect());
    }

    /// Inverse action; `inverse` builds the pairwise form
    fn undo(self, inverse: impl FnOnce(Vec<ItemId>, Vec<TagId>) -> Action) -> Option<Action> {
        let mut sets = self.changed.values();
        let first = sets.next()?.clone();
        if sets.all(|s| *s == first) {
            let ids = self.changed.into_keys().collect();
            Some(inverse(ids, first.into_iter().collect()))
        } else {
            Some(Action::TagSet { items: self.before })
        }
    }
}

/// Handle TagAdd.
pub async fn add(ctx: &Context, ids: Vec<ItemId>, tags: Vec<TagId>) -> Result<Outcome> {
    require_ids(&ids, "items")?;
    require_ids(&tags, "tags")?;

    let (items, changes) = ctx.db.transaction(|tx| -> Result<_> {
        let mut changes = Changes::new();
        for id in &ids {
            let before = tx.tags_of(*id);
            let added = tx.add_tags(*id, &tags)?;
            changes.record(*id, before, added);
        }
        Ok((tx.items(&ids)?, changes))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(items.clone()));
    let undo = changes.undo(|ids, tags| Action::TagRemove { ids, tags });
    Ok(Outcome::new(Output::Items(items)).with_undo_opt(undo))
}

/// Handle TagRemove.
pub async fn remove(ctx: &Context, ids: Vec<ItemId>, tags: Vec<TagId>) -> Result<Outcome> {
    require_ids(&ids, "items")?;
    require_ids(&tags, "tags")?;

    let (items, changes) = ctx.db.transaction(|tx| -> Result<_> {
        let mut changes = Changes::new();
        for id in &ids {
            let before = tx.tags_of(*id);
            let removed = tx.remove_tags(*id, &tags)?;
            changes.record(*id, before, removed);
        }
        Ok((tx.items(&ids)?, changes))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(items.clone()));
    let undo = changes.undo(|ids, tags| Action::TagAdd { ids, tags });
    Ok(Outcome::new(Output::Items(items)).with_undo_opt(undo))
}

/// Handle TagSet.
pub async fn set(ctx: &Context, sets: BTreeMap<ItemId, BTreeSet<TagId>>) -> Result<Outcome> {
    if sets.is_empty() {
        return Err(Error::invalid_input("no items given"));
    }

    let (items, before) = ctx.db.transaction(|tx| -> Result<_> {
        let mut before = BTreeMap::new();
        for (id, tags) in &sets {
            before.insert(*id, tx.item(*id)?.tags);
            tx.set_tags(*id, tags)?;
        }
        let ids: Vec<ItemId> = sets.keys().copied().collect();
        Ok((tx.items(&ids)?, before))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(items.clone()));
    Ok(Outcome::new(Output::Items(items)).with_undo(Action::TagSet { items: before }))
}

/// Handle TagToggle.
///
/// Tags the item has are removed, the others added, in one pass.
pub async fn toggle(ctx: &Context, id: ItemId, tags: Vec<TagId>) -> Result<Outcome> {
    require_ids(&tags, "tags")?;
    let tags: BTreeSet<TagId> = tags.into_iter().collect();

    let item = ctx.db.transaction(|tx| -> Result<_> {
        let current = tx.item(id)?.tags;
        let (remove, add): (Vec<TagId>, Vec<TagId>) =
            tags.iter().copied().partition(|t| current.contains(t));
        tx.remove_tags(id, &remove)?;
        tx.add_tags(id, &add)?;
        Ok(tx.item(id)?)
    })?;

    let output = Output::Tags {
        id,
        tags: item.tags.clone(),
    };
    ctx.bus.emit(Notification::ItemsUpdated(vec![item]));
    Ok(Outcome::new(output).with_undo(Action::TagToggle {
        id,
        tags: tags.into_iter().collect(),
    }))
}

/// Handle TagClear.
pub async fn clear(ctx: &Context, id: ItemId) -> Result<Outcome> {
    let (cleared, item) = ctx.db.transaction(|tx| -> Result<_> {
        let cleared = tx.item(id)?.tags;
        tx.set_tags(id, &BTreeSet::new())?;
        Ok((cleared, tx.item(id)?))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(vec![item]));
    let undo = (!cleared.is_empty()).then(|| Action::TagToggle {
        id,
        tags: cleared.into_iter().collect(),
    });
    Ok(Outcome::new(Output::Tags {
        id,
        tags: BTreeSet::new(),
    })
    .with_undo_opt(undo))
}
