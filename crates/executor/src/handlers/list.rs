//! List membership handlers.

use tropy_core::{ItemId, ListId};

use crate::action::Action;
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::require_ids;
use crate::notification::Notification;
use crate::output::Output;
use crate::Result;

/// Handle ListItemsAdd.
///
/// The undo removes only the items that were not members before.
pub async fn add(ctx: &Context, list: ListId, items: Vec<ItemId>) -> Result<Outcome> {
    require_ids(&items, "items")?;

    let (added, updated) = ctx.db.transaction(|tx| -> Result<_> {
        let added = tx.add_to_list(list, &items)?;
        Ok((added, tx.items(&items)?))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(updated.clone()));
    let undo = (!added.is_empty()).then(|| Action::ListItemsRemove { list, items: added });
    Ok(Outcome::new(Output::Items(updated)).with_undo_opt(undo))
}

/// Handle ListItemsRemove.
pub async fn remove(ctx: &Context, list: ListId, items: Vec<ItemId>) -> Result<Outcome> {
    require_ids(&items, "items")?;

    let (removed, updated) = ctx.db.transaction(|tx| -> Result<_> {
        let removed = tx.remove_from_list(list, &items)?;
        Ok((removed, tx.items(&items)?))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(updated.clone()));
    let undo = (!removed.is_empty()).then(|| Action::ListItemsAdd {
        list,
        items: removed,
    });
    Ok(Outcome::new(Output::Items(updated)).with_undo_opt(undo))
}
