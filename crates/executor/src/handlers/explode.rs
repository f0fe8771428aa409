//! Explode and implode handlers.
//!
//! Exploding gives photos of an item their own items; imploding folds them
//! back. The two are each other's inverses:
//!
//! ```text
//! explode A (photos [a1, a2, a3])
//!   A: [a1]   N1: [a2]   N2: [a3]
//!   undo = implode { item: A, items: [N1, N2], order: [a1, a2, a3] }
//!   redo = explode { id: A, items: { N1: [a2], N2: [a3] } }
//!
//! implode { item: A, items: [N1, N2], order: [a1, a2, a3] }
//!   A: [a1, a2, a3]   N1, N2 trashed
//!   undo = explode { id: A, items: { N1: [a2], N2: [a3] } }
//! ```
//!
//! The map form of explode restores the trashed items instead of creating
//! new ones, so ids stay stable across undo and redo. The first photo of
//! an item never leaves it, and the `order` carried by the implode puts
//! the photos back where they were before the explode.

use std::collections::BTreeMap;

use tropy_core::{Item, ItemId, PhotoId};
use tropy_storage::Transaction;

use crate::action::Action;
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::{require_distinct, require_ids};
use crate::notification::Notification;
use crate::output::Output;
use crate::{Error, Result};

/// Handle ItemExplode.
pub async fn explode(
    ctx: &Context,
    id: ItemId,
    photos: Option<Vec<PhotoId>>,
    items: Option<BTreeMap<ItemId, Vec<PhotoId>>>,
) -> Result<Outcome> {
    let (source, order, created, moved, map, inserted) = ctx.db.transaction(|tx| -> Result<_> {
        let source = tx.live_item(id)?;
        let (map, inserted) = match &items {
            Some(map) => {
                restore_exploded(tx, id, map)?;
                (map.clone(), false)
            }
            None => {
                let detached = detached_photos(&source.photos, photos.as_deref())?;
                (explode_fresh(tx, &source, &detached)?, true)
            }
        };

        let ids: Vec<ItemId> = map.keys().copied().collect();
        let moved: Vec<PhotoId> = map.values().flatten().copied().collect();
        Ok((
            tx.item(id)?,
            source.photos,
            tx.items(&ids)?,
            tx.photos(&moved)?,
            map,
            inserted,
        ))
    })?;

    if inserted {
        ctx.bus.emit(Notification::ItemsInserted(created.clone()));
        ctx.bus.emit(Notification::ItemsUpdated(vec![source]));
    } else {
        let mut updated = vec![source];
        updated.extend(created.iter().cloned());
        ctx.bus.emit(Notification::ItemsUpdated(updated));
    }
    ctx.bus.emit(Notification::PhotosUpdated(moved));

    let ids: Vec<ItemId> = map.keys().copied().collect();
    Ok(Outcome::new(Output::Items(created))
        .with_undo(Action::ItemImplode {
            item: id,
            items: ids,
            order: Some(order),
        })
        .with_redo(Action::ItemExplode {
            id,
            photos: None,
            items: Some(map),
        }))
}

/// Photos an explode takes away from an item with `owned` photos
///
/// Without an explicit list every photo but the first is detached. An
/// explicit list must name photos of the item; the first one stays behind
/// even when the list names it.
fn detached_photos(owned: &[PhotoId], requested: Option<&[PhotoId]>) -> Result<Vec<PhotoId>> {
    let detached: Vec<PhotoId> = match requested {
        None => owned.iter().skip(1).copied().collect(),
        Some(requested) => {
            require_distinct(requested)?;
            if let Some(stray) = requested.iter().find(|p| !owned.contains(p)) {
                return Err(Error::invalid_input(format!(
                    "{} does not belong to the exploded item",
                    stray
                )));
            }
            requested
                .iter()
                .filter(|p| Some(*p) != owned.first())
                .copied()
                .collect()
        }
    };
    if detached.is_empty() {
        return Err(Error::invalid_input("nothing to explode"));
    }
    Ok(detached)
}

fn explode_fresh(
    tx: &mut Transaction<'_>,
    source: &Item,
    detached: &[PhotoId],
) -> Result<BTreeMap<ItemId, Vec<PhotoId>>> {
    let tags: Vec<_> = source.tags.iter().copied().collect();
    let mut map = BTreeMap::new();
    for photo in detached {
        let item = tx.create_item(&source.template, source.data.clone())?;
        tx.add_tags(item, &tags)?;
        tx.set_lists(item, &source.lists)?;
        tx.move_photos(&[*photo], item)?;
        map.insert(item, vec![*photo]);
    }
    Ok(map)
}

fn restore_exploded(
    tx: &mut Transaction<'_>,
    id: ItemId,
    map: &BTreeMap<ItemId, Vec<PhotoId>>,
) -> Result<()> {
    if map.is_empty() {
        return Err(Error::invalid_input("nothing to explode"));
    }
    for (item, photos) in map {
        if *item == id {
            return Err(Error::invalid_input("an item cannot explode into itself"));
        }
        for photo in photos {
            let owner = tx.photo(*photo)?.item;
            if owner != id {
                return Err(Error::invalid_input(format!(
                    "{} belongs to {}, not {}",
                    photo, owner, id
                )));
            }
        }
        tx.restore_items(&[*item])?;
        tx.move_photos(photos, *item)?;
    }
    Ok(())
}

/// Handle ItemImplode.
///
/// The absorbed photos are appended to `item`; with `order` the item's
/// photos are then sorted into that order.
pub async fn implode(
    ctx: &Context,
    item: ItemId,
    items: Vec<ItemId>,
    order: Option<Vec<PhotoId>>,
) -> Result<Outcome> {
    require_ids(&items, "items")?;
    require_distinct(&items)?;
    if items.contains(&item) {
        return Err(Error::invalid_input("an item cannot implode into itself"));
    }

    let (target, absorbed, photos, map) = ctx.db.transaction(|tx| -> Result<_> {
        tx.live_item(item)?;
        let mut map = BTreeMap::new();
        let mut moved = Vec::new();
        for id in &items {
            let photos = tx.live_item(*id)?.photos;
            moved.extend(photos.iter().copied());
            map.insert(*id, photos);
        }
        tx.move_photos(&moved, item)?;
        if let Some(order) = &order {
            tx.order_photos(item, order)?;
        }
        tx.delete_items(&items)?;
        Ok((tx.item(item)?, tx.items(&items)?, tx.photos(&moved)?, map))
    })?;

    let mut updated = vec![target.clone()];
    updated.extend(absorbed);
    ctx.bus.emit(Notification::ItemsUpdated(updated));
    if !photos.is_empty() {
        ctx.bus.emit(Notification::PhotosUpdated(photos));
    }

    Ok(Outcome::new(Output::Item(target)).with_undo(Action::ItemExplode {
        id: item,
        photos: None,
        items: Some(map),
    }))
}
