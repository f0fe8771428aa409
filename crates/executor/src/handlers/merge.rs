//! Merge and split handlers.
//!
//! Merging folds several items into the first one:
//!
//! ```text
//! before                      after merge [A, B, C]
//!   A: photos [a1]              A: photos [a1, b1, b2, c1]
//!   B: photos [b1, b2]          B: trashed, no photos
//!   C: photos [c1]              C: trashed, no photos
//! ```
//!
//! Tags and list memberships are unioned into the survivor. Metadata is
//! merged property by property; the survivor's own values win. The split
//! descriptor returned as undo is captured in the same transaction, so it
//! describes exactly the state the merge replaced.

use std::collections::BTreeSet;

use tropy_core::{ItemId, ListId, Metadata, MetadataPatch, TagId};

use crate::action::{Action, SplitItem};
use crate::command::Outcome;
use crate::context::Context;
use crate::handlers::{require_distinct, require_ids};
use crate::notification::Notification;
use crate::output::Output;
use crate::{Error, Result};

/// Handle ItemMerge.
pub async fn merge(ctx: &Context, ids: Vec<ItemId>) -> Result<Outcome> {
    require_ids(&ids, "items")?;
    require_distinct(&ids)?;
    let Some((&survivor, absorbed)) = ids.split_first() else {
        return Err(Error::invalid_input("no items given"));
    };
    if absorbed.is_empty() {
        return Err(Error::invalid_input("merge needs at least two items"));
    }

    let (merged, others, photos, split) = ctx.db.transaction(|tx| -> Result<_> {
        let target = tx.live_item(survivor)?;
        let others = absorbed
            .iter()
            .map(|id| tx.live_item(*id))
            .collect::<tropy_core::Result<Vec<_>>>()?;

        let split = Action::ItemSplit {
            item: survivor,
            items: others
                .iter()
                .map(|item| SplitItem {
                    id: item.id,
                    photos: item.photos.clone(),
                    tags: item.tags.clone(),
                    lists: item.lists.clone(),
                    data: item.data.clone(),
                    template: item.template.clone(),
                })
                .collect(),
            data: target.data.clone(),
            lists: target.lists.clone(),
            tags: target.tags.clone(),
        };

        let photos: Vec<_> = others
            .iter()
            .flat_map(|item| item.photos.iter().copied())
            .collect();
        tx.move_photos(&photos, survivor)?;

        let tags: Vec<TagId> = others
            .iter()
            .flat_map(|item| item.tags.iter().copied())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        tx.add_tags(survivor, &tags)?;

        let lists: BTreeSet<ListId> = others
            .iter()
            .flat_map(|item| item.lists.iter().copied())
            .collect();
        for list in lists {
            tx.add_to_list(list, &[survivor])?;
        }

        let patch = merged_metadata(&target.data, others.iter().map(|item| &item.data));
        if !patch.is_empty() {
            tx.update_metadata(survivor.into(), &patch)?;
        }

        tx.delete_items(absorbed)?;

        let merged = tx.item(survivor)?;
        let others = tx.items(absorbed)?;
        let photos = tx.photos(&photos)?;
        Ok((merged, others, photos, split))
    })?;

    let mut updated = vec![merged.clone()];
    updated.extend(others);
    ctx.bus.emit(Notification::ItemsUpdated(updated));
    if !photos.is_empty() {
        ctx.bus.emit(Notification::PhotosUpdated(photos));
    }

    Ok(Outcome::new(Output::Item(merged)).with_undo(split))
}

/// Properties of `others` missing from `survivor`, first occurrence wins
fn merged_metadata<'a>(
    survivor: &Metadata,
    others: impl Iterator<Item = &'a Metadata>,
) -> MetadataPatch {
    let mut patch = MetadataPatch::new();
    for data in others {
        for (property, value) in data {
            if !survivor.contains_key(property) && !patch.contains_key(property) {
                patch.insert(property.clone(), Some(value.clone()));
            }
        }
    }
    patch
}

/// Handle ItemSplit.
///
/// Restores the absorbed items with their photos (in original order),
/// metadata, tags, lists and template, and resets the survivor.
pub async fn split(
    ctx: &Context,
    item: ItemId,
    items: Vec<SplitItem>,
    data: Metadata,
    lists: BTreeSet<ListId>,
    tags: BTreeSet<TagId>,
) -> Result<Outcome> {
    require_ids(&items, "items")?;

    let mut ids = vec![item];
    ids.extend(items.iter().map(|s| s.id));
    require_distinct(&ids)?;

    let (restored, photos) = ctx.db.transaction(|tx| -> Result<_> {
        tx.item(item)?;
        for s in &items {
            tx.restore_items(&[s.id])?;
            tx.move_photos(&s.photos, s.id)?;
            tx.set_template(s.id, &s.template)?;
            tx.replace_metadata(s.id.into(), s.data.clone())?;
            tx.set_tags(s.id, &s.tags)?;
            tx.set_lists(s.id, &s.lists)?;
        }
        tx.replace_metadata(item.into(), data.clone())?;
        tx.set_tags(item, &tags)?;
        tx.set_lists(item, &lists)?;

        let moved: Vec<_> = items.iter().flat_map(|s| s.photos.iter().copied()).collect();
        Ok((tx.items(&ids)?, tx.photos(&moved)?))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(restored.clone()));
    if !photos.is_empty() {
        ctx.bus.emit(Notification::PhotosUpdated(photos));
    }

    Ok(Outcome::new(Output::Items(restored)).with_undo(Action::ItemMerge { ids }))
}
