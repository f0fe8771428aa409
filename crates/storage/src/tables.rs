//! Relational tables and read access
//!
//! [`Tables`] is the complete state of a project: one `BTreeMap` per
//! relation plus join sets. A photo's owner is stored on its row and its
//! place in the per-item order index; only the transaction's photo helpers
//! write either, and they always write both.
//!
//! All read helpers live here so they are shared by committed snapshots
//! ([`View`](crate::View)) and open transactions.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;

use tropy_core::{
    Error, Item, ItemId, List, ListId, Metadata, Note, NoteId, Photo, PhotoId, Result, SubjectId,
    Tag, TagId, Template, TemplateId, Timestamp,
};

/// Item row (relations are stored separately)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct ItemRow {
    pub template: TemplateId,
    pub created: Timestamp,
    pub modified: Timestamp,
    pub deleted: Option<Timestamp>,
}

/// Photo row
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct PhotoRow {
    pub item: ItemId,
    pub path: PathBuf,
    pub checksum: String,
    pub mimetype: String,
    pub width: u32,
    pub height: u32,
    pub deleted: Option<Timestamp>,
}

/// Id sequences
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub(crate) struct Sequences {
    pub subject: u64,
    pub tag: u64,
    pub list: u64,
    pub note: u64,
}

impl Default for Sequences {
    fn default() -> Self {
        Self {
            subject: 1,
            tag: 1,
            list: 1,
            note: 1,
        }
    }
}

/// The complete relational state of a project
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Tables {
    pub(crate) items: BTreeMap<ItemId, ItemRow>,
    pub(crate) photos: BTreeMap<PhotoId, PhotoRow>,
    /// Photo ids of each item in display order, trashed photos included
    pub(crate) photo_order: BTreeMap<ItemId, Vec<PhotoId>>,
    pub(crate) metadata: BTreeMap<SubjectId, Metadata>,
    pub(crate) tags: BTreeMap<TagId, Tag>,
    pub(crate) item_tags: BTreeSet<(ItemId, TagId)>,
    pub(crate) lists: BTreeMap<ListId, List>,
    pub(crate) list_items: BTreeSet<(ListId, ItemId)>,
    pub(crate) notes: BTreeMap<NoteId, Note>,
    pub(crate) templates: BTreeMap<TemplateId, Template>,
    pub(crate) seq: Sequences,
}

impl Tables {
    /// Empty tables with the built-in generic template registered
    pub fn new() -> Self {
        let mut tables = Self::default();
        let generic = Template::generic();
        tables.templates.insert(generic.id.clone(), generic);
        tables
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Whether an item row exists (deleted or not)
    pub fn has_item(&self, id: ItemId) -> bool {
        self.items.contains_key(&id)
    }

    /// Load one item with its photos, tags, lists and metadata
    pub fn item(&self, id: ItemId) -> Result<Item> {
        let row = self
            .items
            .get(&id)
            .ok_or_else(|| Error::not_found("item", id))?;
        Ok(Item {
            id,
            photos: self.photos_of(id),
            tags: self.tags_of(id),
            lists: self.lists_of(id),
            template: row.template.clone(),
            data: self.metadata(id.into()),
            deleted: row.deleted,
            created: row.created,
            modified: row.modified,
        })
    }

    /// Load several items, failing on the first missing id
    pub fn items(&self, ids: &[ItemId]) -> Result<Vec<Item>> {
        ids.iter().map(|id| self.item(*id)).collect()
    }

    /// Load an item that must not be soft-deleted
    pub fn live_item(&self, id: ItemId) -> Result<Item> {
        let item = self.item(id)?;
        if item.is_deleted() {
            return Err(Error::invalid_input(format!("{} is deleted", id)));
        }
        Ok(item)
    }

    /// Ids of all items, in id order
    pub fn item_ids(&self) -> Vec<ItemId> {
        self.items.keys().copied().collect()
    }

    /// Ids of all soft-deleted items
    pub fn deleted_items(&self) -> Vec<ItemId> {
        self.items
            .iter()
            .filter(|(_, row)| row.deleted.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// Every photo row of an item in order, trashed ones included
    pub fn photo_slots(&self, item: ItemId) -> &[PhotoId] {
        self.photo_order.get(&item).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Live photos of an item, in position order
    pub fn photos_of(&self, item: ItemId) -> Vec<PhotoId> {
        self.photo_slots(item)
            .iter()
            .copied()
            .filter(|id| self.photos.get(id).is_some_and(|row| row.deleted.is_none()))
            .collect()
    }

    /// Ids of all soft-deleted photos
    pub fn deleted_photos(&self) -> Vec<PhotoId> {
        self.photos
            .iter()
            .filter(|(_, row)| row.deleted.is_some())
            .map(|(id, _)| *id)
            .collect()
    }

    /// Load one photo
    ///
    /// Its position is the index among all photo rows of the item, so a
    /// trashed photo keeps its slot until it is restored or pruned.
    pub fn photo(&self, id: PhotoId) -> Result<Photo> {
        let row = self
            .photos
            .get(&id)
            .ok_or_else(|| Error::not_found("photo", id))?;
        let position = self
            .photo_slots(row.item)
            .iter()
            .position(|slot| *slot == id)
            .unwrap_or_default();
        Ok(Photo {
            id,
            item: row.item,
            position: position as u32,
            path: row.path.clone(),
            checksum: row.checksum.clone(),
            mimetype: row.mimetype.clone(),
            width: row.width,
            height: row.height,
            data: self.metadata(id.into()),
            deleted: row.deleted,
        })
    }

    /// Load several photos
    pub fn photos(&self, ids: &[PhotoId]) -> Result<Vec<Photo>> {
        ids.iter().map(|id| self.photo(*id)).collect()
    }

    /// Find a live photo of a live item with the given content checksum
    pub fn find_photo_by_checksum(&self, checksum: &str) -> Option<PhotoId> {
        self.photos
            .iter()
            .find(|(_, row)| {
                row.checksum == checksum
                    && row.deleted.is_none()
                    && self
                        .items
                        .get(&row.item)
                        .is_some_and(|item| item.deleted.is_none())
            })
            .map(|(id, _)| *id)
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Metadata of a subject (empty if none)
    pub fn metadata(&self, subject: SubjectId) -> Metadata {
        self.metadata.get(&subject).cloned().unwrap_or_default()
    }

    // =========================================================================
    // Tags and lists
    // =========================================================================

    /// Tags attached to an item
    pub fn tags_of(&self, item: ItemId) -> BTreeSet<TagId> {
        self.item_tags
            .range((item, TagId(0))..=(item, TagId(u64::MAX)))
            .map(|(_, tag)| *tag)
            .collect()
    }

    /// Load a tag
    pub fn tag(&self, id: TagId) -> Result<Tag> {
        self.tags
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("tag", id))
    }

    /// All tags, in id order
    pub fn all_tags(&self) -> Vec<Tag> {
        self.tags.values().cloned().collect()
    }

    /// Lists an item belongs to
    pub fn lists_of(&self, item: ItemId) -> BTreeSet<ListId> {
        self.list_items
            .iter()
            .filter(|(_, member)| *member == item)
            .map(|(list, _)| *list)
            .collect()
    }

    /// Items of a list, in id order
    pub fn list_members(&self, list: ListId) -> Vec<ItemId> {
        self.list_items
            .range((list, ItemId(0))..=(list, ItemId(u64::MAX)))
            .map(|(_, item)| *item)
            .collect()
    }

    /// Load a list
    pub fn list(&self, id: ListId) -> Result<List> {
        self.lists
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("list", id))
    }

    // =========================================================================
    // Notes and templates
    // =========================================================================

    /// Load a note
    pub fn note(&self, id: NoteId) -> Result<Note> {
        self.notes
            .get(&id)
            .cloned()
            .ok_or_else(|| Error::not_found("note", id))
    }

    /// Live notes of a photo
    pub fn notes_of(&self, photo: PhotoId) -> Vec<NoteId> {
        self.notes
            .values()
            .filter(|n| n.photo == photo && n.deleted.is_none())
            .map(|n| n.id)
            .collect()
    }

    /// Load a template
    pub fn template(&self, id: &TemplateId) -> Result<Template> {
        self.templates
            .get(id)
            .cloned()
            .ok_or_else(|| Error::not_found("template", id))
    }
}
