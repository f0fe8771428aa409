//! Write access inside a transaction
//!
//! A [`Transaction`] mutates a staged copy of the tables. Nothing written
//! here is visible outside the transaction until [`Database::transaction`]
//! commits it; an error returned from the transaction closure discards the
//! staged copy entirely.
//!
//! [`Database::transaction`]: crate::Database::transaction

use std::collections::BTreeSet;
use std::ops::Deref;
use std::path::PathBuf;

use tropy_core::{
    apply_patch, Error, ItemId, List, ListId, Metadata, MetadataPatch, Note, NoteId, PhotoId,
    Result, SubjectId, Tag, TagId, Template, TemplateId, Timestamp,
};

use crate::tables::{ItemRow, PhotoRow, Tables};

/// Input for [`Transaction::create_photo`]
#[derive(Debug, Clone)]
pub struct NewPhoto {
    /// Owning item
    pub item: ItemId,
    /// Source path
    pub path: PathBuf,
    /// Hex SHA-256 of the content
    pub checksum: String,
    /// MIME type
    pub mimetype: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Initial photo metadata
    pub data: Metadata,
}

/// What a prune removed
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PruneReport {
    /// Destroyed items
    pub items: Vec<ItemId>,
    /// Destroyed photos (of destroyed items, or individually deleted)
    pub photos: Vec<PhotoId>,
    /// Destroyed notes
    pub notes: Vec<NoteId>,
}

/// An open write transaction
///
/// Reads go through `Deref<Target = Tables>` and see the transaction's own
/// writes.
pub struct Transaction<'a> {
    tables: &'a mut Tables,
    now: Timestamp,
}

impl Deref for Transaction<'_> {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        self.tables
    }
}

impl<'a> Transaction<'a> {
    pub(crate) fn new(tables: &'a mut Tables, now: Timestamp) -> Self {
        Self { tables, now }
    }

    /// Timestamp assigned to every write of this transaction
    pub fn now(&self) -> Timestamp {
        self.now
    }

    fn next_subject(&mut self) -> u64 {
        let id = self.tables.seq.subject;
        self.tables.seq.subject += 1;
        id
    }

    fn item_row_mut(&mut self, id: ItemId) -> Result<&mut ItemRow> {
        self.tables
            .items
            .get_mut(&id)
            .ok_or_else(|| Error::not_found("item", id))
    }

    // =========================================================================
    // Items
    // =========================================================================

    /// Insert a new item described by `template` with initial metadata
    pub fn create_item(&mut self, template: &TemplateId, data: Metadata) -> Result<ItemId> {
        self.tables.template(template)?;
        let id = ItemId(self.next_subject());
        self.tables.items.insert(
            id,
            ItemRow {
                template: template.clone(),
                created: self.now,
                modified: self.now,
                deleted: None,
            },
        );
        if !data.is_empty() {
            self.tables.metadata.insert(id.into(), data);
        }
        Ok(id)
    }

    /// Mark an item as modified now
    pub fn touch(&mut self, id: ItemId) -> Result<()> {
        let now = self.now;
        self.item_row_mut(id)?.modified = now;
        Ok(())
    }

    /// Soft-delete items; returns the ids whose flag changed
    pub fn delete_items(&mut self, ids: &[ItemId]) -> Result<Vec<ItemId>> {
        let now = self.now;
        let mut changed = Vec::new();
        for id in ids {
            let row = self.item_row_mut(*id)?;
            if row.deleted.is_none() {
                row.deleted = Some(now);
                changed.push(*id);
            }
        }
        Ok(changed)
    }

    /// Clear the soft-delete flag; returns the ids whose flag changed
    ///
    /// Fails with `NotFound` if any item was destroyed.
    pub fn restore_items(&mut self, ids: &[ItemId]) -> Result<Vec<ItemId>> {
        let mut changed = Vec::new();
        for id in ids {
            let row = self.item_row_mut(*id)?;
            if row.deleted.take().is_some() {
                changed.push(*id);
            }
        }
        Ok(changed)
    }

    /// Change an item's template; returns the previous one
    pub fn set_template(&mut self, id: ItemId, template: &TemplateId) -> Result<TemplateId> {
        self.tables.template(template)?;
        let now = self.now;
        let row = self.item_row_mut(id)?;
        row.modified = now;
        Ok(std::mem::replace(&mut row.template, template.clone()))
    }

    /// Permanently remove soft-deleted items among `ids`
    ///
    /// Live items are left untouched. Photos, notes, metadata and relations
    /// of the destroyed items go with them.
    pub fn destroy_items(&mut self, ids: &[ItemId]) -> PruneReport {
        let mut report = PruneReport::default();
        for id in ids {
            let deleted = self
                .tables
                .items
                .get(id)
                .is_some_and(|row| row.deleted.is_some());
            if !deleted {
                continue;
            }
            self.tables.items.remove(id);
            self.tables.metadata.remove(&SubjectId::from(*id));
            self.tables.item_tags.retain(|(item, _)| item != id);
            self.tables.list_items.retain(|(_, item)| item != id);

            let photos = self.tables.photo_order.remove(id).unwrap_or_default();
            for photo in photos {
                self.remove_photo(photo, &mut report);
            }
            report.items.push(*id);
        }
        report
    }

    /// Permanently remove every soft-deleted item, photo and note
    pub fn prune(&mut self) -> PruneReport {
        let deleted = self.tables.deleted_items();
        let mut report = self.destroy_items(&deleted);

        for photo in self.tables.deleted_photos() {
            self.remove_photo(photo, &mut report);
        }

        let notes: Vec<NoteId> = self
            .tables
            .notes
            .values()
            .filter(|n| n.deleted.is_some())
            .map(|n| n.id)
            .collect();
        for note in notes {
            self.tables.notes.remove(&note);
            report.notes.push(note);
        }
        report
    }

    fn remove_photo(&mut self, photo: PhotoId, report: &mut PruneReport) {
        if let Some(row) = self.tables.photos.remove(&photo) {
            self.release_slot(row.item, photo);
        }
        self.tables.metadata.remove(&SubjectId::from(photo));
        let notes: Vec<NoteId> = self
            .tables
            .notes
            .values()
            .filter(|n| n.photo == photo)
            .map(|n| n.id)
            .collect();
        for note in notes {
            self.tables.notes.remove(&note);
            report.notes.push(note);
        }
        report.photos.push(photo);
    }

    // =========================================================================
    // Photos
    // =========================================================================

    /// Insert a photo at the end of its item
    pub fn create_photo(&mut self, photo: NewPhoto) -> Result<PhotoId> {
        if !self.tables.has_item(photo.item) {
            return Err(Error::constraint(format!(
                "photo must belong to an existing item, {} does not exist",
                photo.item
            )));
        }
        let id = PhotoId(self.next_subject());
        self.tables.photo_order.entry(photo.item).or_default().push(id);
        self.tables.photos.insert(
            id,
            PhotoRow {
                item: photo.item,
                path: photo.path,
                checksum: photo.checksum,
                mimetype: photo.mimetype,
                width: photo.width,
                height: photo.height,
                deleted: None,
            },
        );
        if !photo.data.is_empty() {
            self.tables.metadata.insert(id.into(), photo.data);
        }
        self.touch(photo.item)?;
        Ok(id)
    }

    /// Move photos, in the given order, to the end of `to`
    pub fn move_photos(&mut self, photos: &[PhotoId], to: ItemId) -> Result<()> {
        if !self.tables.has_item(to) {
            return Err(Error::not_found("item", to));
        }
        let mut sources = BTreeSet::new();
        for photo in photos {
            let row = self
                .tables
                .photos
                .get_mut(photo)
                .ok_or_else(|| Error::not_found("photo", *photo))?;
            let from = std::mem::replace(&mut row.item, to);
            sources.insert(from);
            self.release_slot(from, *photo);
            self.tables.photo_order.entry(to).or_default().push(*photo);
        }
        sources.insert(to);
        for item in sources {
            self.touch(item)?;
        }
        Ok(())
    }

    /// Put an item's photos in the given order
    ///
    /// Photos of `item` missing from `order` follow in their current order.
    /// Ids in `order` that belong to another item are ignored.
    pub fn order_photos(&mut self, item: ItemId, order: &[PhotoId]) -> Result<()> {
        if !self.tables.has_item(item) {
            return Err(Error::not_found("item", item));
        }
        let Some(slots) = self.tables.photo_order.get_mut(&item) else {
            return Ok(());
        };
        let owned: BTreeSet<PhotoId> = slots.iter().copied().collect();
        let mut placed = BTreeSet::new();
        let mut sorted: Vec<PhotoId> = order
            .iter()
            .copied()
            .filter(|id| owned.contains(id) && placed.insert(*id))
            .collect();
        sorted.extend(slots.iter().copied().filter(|id| !placed.contains(id)));
        *slots = sorted;
        self.touch(item)
    }

    /// Soft-delete photos; returns the ids whose flag changed
    pub fn delete_photos(&mut self, ids: &[PhotoId]) -> Result<Vec<PhotoId>> {
        let now = self.now;
        let mut changed = Vec::new();
        for id in ids {
            let row = self
                .tables
                .photos
                .get_mut(id)
                .ok_or_else(|| Error::not_found("photo", *id))?;
            if row.deleted.is_none() {
                row.deleted = Some(now);
                let item = row.item;
                self.touch(item)?;
                changed.push(*id);
            }
        }
        Ok(changed)
    }

    /// Clear the photos' soft-delete flag; returns the ids whose flag changed
    ///
    /// A restored photo returns to the slot it held when it was trashed.
    /// Fails with `NotFound` if any photo was pruned.
    pub fn restore_photos(&mut self, ids: &[PhotoId]) -> Result<Vec<PhotoId>> {
        let mut changed = Vec::new();
        for id in ids {
            let row = self
                .tables
                .photos
                .get_mut(id)
                .ok_or_else(|| Error::not_found("photo", *id))?;
            if row.deleted.take().is_some() {
                let item = row.item;
                self.touch(item)?;
                changed.push(*id);
            }
        }
        Ok(changed)
    }

    fn release_slot(&mut self, item: ItemId, photo: PhotoId) {
        if let Some(slots) = self.tables.photo_order.get_mut(&item) {
            slots.retain(|slot| *slot != photo);
            if slots.is_empty() {
                self.tables.photo_order.remove(&item);
            }
        }
    }

    // =========================================================================
    // Metadata
    // =========================================================================

    /// Apply a metadata patch; returns the inverse patch
    pub fn update_metadata(
        &mut self,
        subject: SubjectId,
        patch: &MetadataPatch,
    ) -> Result<MetadataPatch> {
        self.require_subject(subject)?;
        let data = self.tables.metadata.entry(subject).or_default();
        let inverse = apply_patch(data, patch);
        if data.is_empty() {
            self.tables.metadata.remove(&subject);
        }
        self.touch_subject(subject)?;
        Ok(inverse)
    }

    /// Replace a subject's metadata wholesale; returns the previous bag
    pub fn replace_metadata(&mut self, subject: SubjectId, data: Metadata) -> Result<Metadata> {
        self.require_subject(subject)?;
        let previous = if data.is_empty() {
            self.tables.metadata.remove(&subject)
        } else {
            self.tables.metadata.insert(subject, data)
        };
        self.touch_subject(subject)?;
        Ok(previous.unwrap_or_default())
    }

    fn require_subject(&self, subject: SubjectId) -> Result<()> {
        let exists = self.tables.items.contains_key(&ItemId(subject.0))
            || self.tables.photos.contains_key(&PhotoId(subject.0));
        if exists {
            Ok(())
        } else {
            Err(Error::not_found("subject", subject))
        }
    }

    fn touch_subject(&mut self, subject: SubjectId) -> Result<()> {
        let item = match self.tables.photos.get(&PhotoId(subject.0)) {
            Some(row) => row.item,
            None => ItemId(subject.0),
        };
        self.touch(item)
    }

    // =========================================================================
    // Tags
    // =========================================================================

    /// Create a tag
    pub fn create_tag(&mut self, name: impl Into<String>) -> Result<TagId> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(Error::invalid_input("tag name must not be empty"));
        }
        let id = TagId(self.tables.seq.tag);
        self.tables.seq.tag += 1;
        self.tables.tags.insert(id, Tag { id, name });
        Ok(id)
    }

    /// Attach tags to an item; returns the tags that were newly attached
    pub fn add_tags(&mut self, item: ItemId, tags: &[TagId]) -> Result<Vec<TagId>> {
        if !self.tables.has_item(item) {
            return Err(Error::not_found("item", item));
        }
        let mut added = Vec::new();
        for tag in tags {
            self.tables.tag(*tag)?;
            if self.tables.item_tags.insert((item, *tag)) {
                added.push(*tag);
            }
        }
        if !added.is_empty() {
            self.touch(item)?;
        }
        Ok(added)
    }

    /// Detach tags from an item; returns the tags that were attached before
    pub fn remove_tags(&mut self, item: ItemId, tags: &[TagId]) -> Result<Vec<TagId>> {
        if !self.tables.has_item(item) {
            return Err(Error::not_found("item", item));
        }
        let removed: Vec<TagId> = tags
            .iter()
            .copied()
            .filter(|tag| self.tables.item_tags.remove(&(item, *tag)))
            .collect();
        if !removed.is_empty() {
            self.touch(item)?;
        }
        Ok(removed)
    }

    /// Replace an item's tag set exactly
    pub fn set_tags(&mut self, item: ItemId, tags: &BTreeSet<TagId>) -> Result<()> {
        let current: Vec<TagId> = self.tables.tags_of(item).into_iter().collect();
        self.remove_tags(item, &current)?;
        let wanted: Vec<TagId> = tags.iter().copied().collect();
        self.add_tags(item, &wanted)?;
        Ok(())
    }

    // =========================================================================
    // Lists
    // =========================================================================

    /// Create a list
    pub fn create_list(&mut self, name: impl Into<String>, parent: Option<ListId>) -> Result<ListId> {
        if let Some(parent) = parent {
            self.tables.list(parent)?;
        }
        let id = ListId(self.tables.seq.list);
        self.tables.seq.list += 1;
        self.tables.lists.insert(
            id,
            List {
                id,
                name: name.into(),
                parent,
            },
        );
        Ok(id)
    }

    /// Add items to a list; returns the items that were newly added
    pub fn add_to_list(&mut self, list: ListId, items: &[ItemId]) -> Result<Vec<ItemId>> {
        self.tables.list(list)?;
        let mut added = Vec::new();
        for item in items {
            if !self.tables.has_item(*item) {
                return Err(Error::not_found("item", *item));
            }
            if self.tables.list_items.insert((list, *item)) {
                added.push(*item);
            }
        }
        Ok(added)
    }

    /// Remove items from a list; returns the items that were members before
    pub fn remove_from_list(&mut self, list: ListId, items: &[ItemId]) -> Result<Vec<ItemId>> {
        self.tables.list(list)?;
        Ok(items
            .iter()
            .copied()
            .filter(|item| self.tables.list_items.remove(&(list, *item)))
            .collect())
    }

    /// Replace the set of lists an item belongs to
    pub fn set_lists(&mut self, item: ItemId, lists: &BTreeSet<ListId>) -> Result<()> {
        for list in self.tables.lists_of(item) {
            self.tables.list_items.remove(&(list, item));
        }
        for list in lists {
            self.add_to_list(*list, &[item])?;
        }
        Ok(())
    }

    // =========================================================================
    // Notes
    // =========================================================================

    /// Attach a note to a photo
    pub fn create_note(&mut self, photo: PhotoId, text: impl Into<String>) -> Result<NoteId> {
        self.tables.photo(photo)?;
        let id = NoteId(self.tables.seq.note);
        self.tables.seq.note += 1;
        self.tables.notes.insert(
            id,
            Note {
                id,
                photo,
                text: text.into(),
                deleted: None,
                modified: self.now,
            },
        );
        Ok(id)
    }

    /// Soft-delete notes; returns the ids whose flag changed
    pub fn delete_notes(&mut self, ids: &[NoteId]) -> Result<Vec<NoteId>> {
        let now = self.now;
        let mut changed = Vec::new();
        for id in ids {
            let note = self
                .tables
                .notes
                .get_mut(id)
                .ok_or_else(|| Error::not_found("note", *id))?;
            if note.deleted.is_none() {
                note.deleted = Some(now);
                changed.push(*id);
            }
        }
        Ok(changed)
    }

    /// Restore soft-deleted notes; returns the ids whose flag changed
    pub fn restore_notes(&mut self, ids: &[NoteId]) -> Result<Vec<NoteId>> {
        let mut changed = Vec::new();
        for id in ids {
            let note = self
                .tables
                .notes
                .get_mut(id)
                .ok_or_else(|| Error::not_found("note", *id))?;
            if note.deleted.take().is_some() {
                changed.push(*id);
            }
        }
        Ok(changed)
    }

    // =========================================================================
    // Templates
    // =========================================================================

    /// Register (or replace) a template
    pub fn register_template(&mut self, template: Template) {
        self.tables.templates.insert(template.id.clone(), template);
    }
}
