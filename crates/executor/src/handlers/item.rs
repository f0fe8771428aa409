//! Item lifecycle handlers.

use tracing::{info, warn};

use tropy_core::{ItemId, ListId, TemplateId};

use crate::action::{Action, Meta};
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::require_ids;
use crate::notification::Notification;
use crate::output::{DestroyReport, Output};
use crate::Result;

/// Prompt key asked before destroying items
pub const DESTROY_PROMPT: &str = "prompt.item.destroy";

/// Handle ItemCreate.
pub async fn create(
    ctx: &Context,
    template: Option<TemplateId>,
    list: Option<ListId>,
) -> Result<Outcome> {
    let template = template.unwrap_or_else(|| ctx.config().default_template.clone());

    let item = ctx.db.transaction(|tx| -> Result<_> {
        let defaults = tx.template(&template)?.defaults();
        let id = tx.create_item(&template, defaults)?;
        if let Some(list) = list {
            tx.add_to_list(list, &[id])?;
        }
        Ok(tx.item(id)?)
    })?;

    let ids = vec![item.id];
    ctx.bus.emit(Notification::ItemsInserted(vec![item.clone()]));

    Ok(Outcome::new(Output::Item(item))
        .with_undo(Action::ItemDelete { ids: ids.clone() })
        .with_redo(Action::ItemRestore { ids }))
}

/// Handle ItemDelete.
pub async fn delete(ctx: &Context, ids: Vec<ItemId>) -> Result<Outcome> {
    require_ids(&ids, "items")?;

    let (changed, items) = ctx.db.transaction(|tx| -> Result<_> {
        let changed = tx.delete_items(&ids)?;
        let items = tx.items(&ids)?;
        Ok((changed, items))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(items.clone()));

    let undo = (!changed.is_empty()).then(|| Action::ItemRestore { ids: changed });
    Ok(Outcome::new(Output::Items(items)).with_undo_opt(undo))
}

/// Handle ItemRestore.
///
/// Restoring a destroyed item fails with `NotFound`.
pub async fn restore(ctx: &Context, ids: Vec<ItemId>) -> Result<Outcome> {
    require_ids(&ids, "items")?;

    let (changed, items) = ctx.db.transaction(|tx| -> Result<_> {
        let changed = tx.restore_items(&ids)?;
        let items = tx.items(&ids)?;
        Ok((changed, items))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(items.clone()));

    let undo = (!changed.is_empty()).then(|| Action::ItemDelete { ids: changed });
    Ok(Outcome::new(Output::Items(items)).with_undo_opt(undo))
}

/// Handle ItemDestroy.
///
/// Only trashed items are destroyed; live ids are skipped. Without ids the
/// whole trash is emptied, including trashed photos and notes.
pub async fn destroy(ctx: &Context, ids: Option<Vec<ItemId>>, meta: &Meta) -> Result<Outcome> {
    if meta.prompt && ctx.prompt.confirm(DESTROY_PROMPT).await.cancel {
        info!(target: "tropy::dispatch", "Destroy cancelled by user");
        return Ok(Outcome::new(Output::Cancelled));
    }

    let report = ctx.db.transaction(|tx| -> Result<_> {
        let report = match &ids {
            Some(ids) => {
                for id in ids {
                    match tx.item(*id) {
                        Ok(item) if !item.is_deleted() => {
                            warn!(target: "tropy::dispatch", item = %id, "Not destroying live item")
                        }
                        Ok(_) => {}
                        Err(_) => warn!(target: "tropy::dispatch", item = %id, "Not destroying missing item"),
                    }
                }
                tx.destroy_items(ids)
            }
            None => tx.prune(),
        };
        Ok(DestroyReport {
            items: report.items,
            photos: report.photos,
            notes: report.notes,
        })
    })?;

    if !report.items.is_empty() {
        ctx.bus.emit(Notification::ItemsRemoved(report.items.clone()));
    }
    if !report.photos.is_empty() {
        ctx.bus.emit(Notification::PhotosRemoved(report.photos.clone()));
    }
    if !report.notes.is_empty() {
        ctx.bus.emit(Notification::NotesRemoved(report.notes.clone()));
    }

    info!(
        target: "tropy::dispatch",
        items = report.items.len(),
        photos = report.photos.len(),
        notes = report.notes.len(),
        "Destroyed"
    );
    Ok(Outcome::new(Output::Destroyed(report)))
}

/// Handle ItemLoad.
pub async fn load(ctx: &Context, ids: Vec<ItemId>) -> Result<Outcome> {
    require_ids(&ids, "items")?;

    let (items, photos) = ctx.db.sequence(|view| -> Result<_> {
        let items = view.items(&ids)?;
        let photo_ids: Vec<_> = items.iter().flat_map(|i| i.photos.iter().copied()).collect();
        let photos = view.photos(&photo_ids)?;
        Ok((items, photos))
    })?;

    ctx.bus.emit(Notification::ItemsLoaded(items.clone()));
    if !photos.is_empty() {
        ctx.bus.emit(Notification::PhotosUpdated(photos));
    }
    Ok(Outcome::new(Output::Items(items)))
}
