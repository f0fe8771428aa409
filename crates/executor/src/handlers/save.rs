//! Save handler: metadata and template changes.
//!
//! Every payload form is normalized to a list of [`SaveEntry`] values and
//! applied in one transaction. The undo is a `Bulk` payload holding the
//! pre-change values of every touched property, in reverse order.
//!
//! Switching an item's template fills in the new template's default values
//! for properties the item does not have yet. The inverse lists those
//! properties with `None` so undoing the switch removes them again, and
//! lists the previous template's defaults that were missing so switching
//! back does not invent them.

use std::collections::BTreeSet;

use tropy_core::{validate_property, ItemId, MetadataPatch, PhotoId, SubjectId};
use tropy_storage::Transaction;

use crate::action::{Action, SaveEntry, SavePayload};
use crate::command::Outcome;
use crate::context::Context;
use crate::notification::Notification;
use crate::output::Output;
use crate::{Error, Result};

/// Handle ItemSave.
pub async fn save(ctx: &Context, payload: SavePayload) -> Result<Outcome> {
    let entries = normalize(payload);
    if entries.is_empty() {
        return Err(Error::invalid_input("nothing to save"));
    }
    for entry in &entries {
        for property in entry.data.keys() {
            validate_property(property).map_err(Error::invalid_input)?;
        }
    }

    let (inverse, items, photos) = ctx.db.transaction(|tx| -> Result<_> {
        let mut inverse = Vec::with_capacity(entries.len());
        let mut items = BTreeSet::new();
        let mut photos = BTreeSet::new();

        for entry in &entries {
            match subject_kind(tx, entry.id)? {
                Subject::Item(id) => {
                    items.insert(id);
                }
                Subject::Photo(id) => {
                    if entry.template.is_some() {
                        return Err(Error::invalid_input(format!(
                            "{} is a photo; templates apply to items",
                            id
                        )));
                    }
                    items.insert(tx.photo(id)?.item);
                    photos.insert(id);
                }
            }
            inverse.push(apply_entry(tx, entry)?);
        }

        let items: Vec<ItemId> = items.into_iter().collect();
        let photos: Vec<PhotoId> = photos.into_iter().collect();
        Ok((inverse, tx.items(&items)?, tx.photos(&photos)?))
    })?;

    ctx.bus.emit(Notification::ItemsUpdated(items.clone()));
    if !photos.is_empty() {
        ctx.bus.emit(Notification::PhotosUpdated(photos));
    }

    let undo = SavePayload::Bulk(inverse.into_iter().rev().collect());
    Ok(Outcome::new(Output::Items(items)).with_undo(Action::ItemSave { payload: undo }))
}

fn normalize(payload: SavePayload) -> Vec<SaveEntry> {
    match payload {
        SavePayload::Property {
            id,
            property,
            value,
        } => {
            let mut data = MetadataPatch::new();
            data.insert(property, value);
            vec![SaveEntry {
                id,
                template: None,
                data,
            }]
        }
        SavePayload::Template { id, template } => vec![SaveEntry {
            id: id.into(),
            template: Some(template),
            data: MetadataPatch::new(),
        }],
        SavePayload::Bulk(entries) => entries,
    }
}

enum Subject {
    Item(ItemId),
    Photo(PhotoId),
}

fn subject_kind(tx: &Transaction<'_>, id: SubjectId) -> Result<Subject> {
    let item = ItemId(id.get());
    if tx.has_item(item) {
        return Ok(Subject::Item(item));
    }
    let photo = PhotoId(id.get());
    if tx.photo(photo).is_ok() {
        return Ok(Subject::Photo(photo));
    }
    Err(Error::NotFound {
        entity: "subject".to_string(),
        id: id.to_string(),
    })
}

/// Apply one entry and return its inverse
fn apply_entry(tx: &mut Transaction<'_>, entry: &SaveEntry) -> Result<SaveEntry> {
    let mut inverse = SaveEntry {
        id: entry.id,
        template: None,
        data: MetadataPatch::new(),
    };

    if let Some(template) = &entry.template {
        let item = ItemId(entry.id.get());
        let current = tx.metadata(entry.id);
        let incoming = tx.template(template)?;
        let previous = tx.set_template(item, template)?;

        let fill: MetadataPatch = incoming
            .defaults()
            .into_iter()
            .filter(|(k, _)| !current.contains_key(k) && !entry.data.contains_key(k))
            .map(|(k, v)| (k, Some(v)))
            .collect();
        if !fill.is_empty() {
            inverse.data.extend(tx.update_metadata(entry.id, &fill)?);
        }

        for property in tx.template(&previous)?.defaults().into_keys() {
            if !current.contains_key(&property) {
                inverse.data.entry(property).or_insert(None);
            }
        }
        inverse.template = Some(previous);
    }

    if !entry.data.is_empty() {
        inverse.data.extend(tx.update_metadata(entry.id, &entry.data)?);
    }

    Ok(inverse)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tropy_core::{MetadataValue, TemplateId};

    #[test]
    fn test_property_payload_becomes_one_entry() {
        let entries = normalize(SavePayload::Property {
            id: SubjectId(3),
            property: "dc:title".into(),
            value: Some(MetadataValue::text("Letter")),
        });
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].id, SubjectId(3));
        assert_eq!(
            entries[0].data["dc:title"],
            Some(MetadataValue::text("Letter"))
        );
    }

    #[test]
    fn test_template_payload_targets_item() {
        let entries = normalize(SavePayload::Template {
            id: ItemId(4),
            template: TemplateId::new("urn:tpl"),
        });
        assert_eq!(entries[0].id, SubjectId(4));
        assert_eq!(entries[0].template, Some(TemplateId::new("urn:tpl")));
        assert!(entries[0].data.is_empty());
    }
}
