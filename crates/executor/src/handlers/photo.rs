//! Photo trash handlers.
//!
//! A trashed photo drops out of its item's photo list but keeps its slot,
//! so restoring it puts it back where it was. Pruning the trash removes it
//! for good.

use std::collections::BTreeSet;

use tropy_core::{Item, ItemId, Photo, PhotoId};
use tropy_storage::Transaction;

use crate::action::Action;
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::{require_distinct, require_ids};
use crate::notification::Notification;
use crate::output::Output;
use crate::Result;

/// Handle PhotoDelete.
pub async fn delete(ctx: &Context, ids: Vec<PhotoId>) -> Result<Outcome> {
    require_ids(&ids, "photos")?;
    require_distinct(&ids)?;

    let (changed, photos, owners) = ctx.db.transaction(|tx| -> Result<_> {
        let changed = tx.delete_photos(&ids)?;
        let (photos, owners) = reload(tx, &ids)?;
        Ok((changed, photos, owners))
    })?;

    ctx.bus.emit(Notification::PhotosUpdated(photos.clone()));
    ctx.bus.emit(Notification::ItemsUpdated(owners));
    let undo = (!changed.is_empty()).then(|| Action::PhotoRestore { ids: changed });
    Ok(Outcome::new(Output::Photos(photos)).with_undo_opt(undo))
}

/// Handle PhotoRestore.
///
/// Restoring a pruned photo fails with `NotFound`.
pub async fn restore(ctx: &Context, ids: Vec<PhotoId>) -> Result<Outcome> {
    require_ids(&ids, "photos")?;
    require_distinct(&ids)?;

    let (changed, photos, owners) = ctx.db.transaction(|tx| -> Result<_> {
        let changed = tx.restore_photos(&ids)?;
        let (photos, owners) = reload(tx, &ids)?;
        Ok((changed, photos, owners))
    })?;

    ctx.bus.emit(Notification::PhotosUpdated(photos.clone()));
    ctx.bus.emit(Notification::ItemsUpdated(owners));
    let undo = (!changed.is_empty()).then(|| Action::PhotoDelete { ids: changed });
    Ok(Outcome::new(Output::Photos(photos)).with_undo_opt(undo))
}

/// The photos and their owning items, after the change
fn reload(tx: &Transaction<'_>, ids: &[PhotoId]) -> Result<(Vec<Photo>, Vec<Item>)> {
    let photos = tx.photos(ids)?;
    let owners: BTreeSet<ItemId> = photos.iter().map(|p| p.item).collect();
    let owners: Vec<ItemId> = owners.into_iter().collect();
    Ok((photos, tx.items(&owners)?))
}
