//! Action enum defining every Tropy command.
//!
//! Actions are the "instruction set" of the command layer. Every mutation a
//! user can trigger, and every inverse registered for undo, is a variant of
//! this enum.
//!
//! Actions are:
//! - **Self-contained**: All parameters needed for execution are in the variant
//! - **Serializable**: Undo descriptors are plain data, never closures
//! - **Closed**: Dispatch is an exhaustive `match`, no runtime registry

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::path::PathBuf;

use tropy_core::{
    ItemId, ListId, Metadata, MetadataPatch, MetadataValue, NoteId, PhotoId, SubjectId, TagId,
    TemplateId,
};

/// A command is a self-contained, serializable operation.
///
/// # Action Categories
///
/// | Category | Count | Description |
/// |----------|-------|-------------|
/// | Item | 11 | Lifecycle, merge/split, explode/implode, import, save |
/// | Photo | 2 | Photo trash |
/// | Tag | 5 | Tag membership of items |
/// | List | 2 | List membership of items |
/// | Note | 3 | Notes on photos |
///
/// # Example
///
/// ```ignore
/// use tropy_executor::Action;
///
/// let action = Action::ItemMerge { ids: vec![ItemId(1), ItemId(2)] };
/// session.dispatch(action).await?;
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub enum Action {
    // ==================== Item (11) ====================
    /// Create an empty item.
    /// Returns: `Output::Item`
    ItemCreate {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        template: Option<TemplateId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<ListId>,
    },

    /// Move items to the trash.
    /// Returns: `Output::Items`
    ItemDelete { ids: Vec<ItemId> },

    /// Take items out of the trash.
    /// Returns: `Output::Items`
    ItemRestore { ids: Vec<ItemId> },

    /// Permanently remove trashed items (all of them when `ids` is absent).
    /// Returns: `Output::Destroyed` or `Output::Cancelled`
    ItemDestroy {
        #[serde(default, skip_serializing_if = "Option::is_none")]
        ids: Option<Vec<ItemId>>,
    },

    /// Load items into the state projection.
    /// Returns: `Output::Items`
    ItemLoad { ids: Vec<ItemId> },

    /// Merge items into the first one.
    /// Returns: `Output::Item`
    ItemMerge { ids: Vec<ItemId> },

    /// Undo a merge.
    /// Returns: `Output::Items`
    ItemSplit {
        item: ItemId,
        items: Vec<SplitItem>,
        data: Metadata,
        lists: BTreeSet<ListId>,
        tags: BTreeSet<TagId>,
    },

    /// Give photos of an item their own items.
    /// Returns: `Output::Items` (the new items)
    ItemExplode {
        id: ItemId,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        photos: Option<Vec<PhotoId>>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        items: Option<BTreeMap<ItemId, Vec<PhotoId>>>,
    },

    /// Move all photos of `items` into `item` and trash the emptied items.
    /// With `order`, the item's photos are then arranged in that order.
    /// Returns: `Output::Item`
    ItemImplode {
        item: ItemId,
        items: Vec<ItemId>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        order: Option<Vec<PhotoId>>,
    },

    /// Create one item per image file.
    /// Returns: `Output::Imported`
    ItemImport {
        files: Vec<PathBuf>,
        #[serde(default, skip_serializing_if = "Option::is_none")]
        list: Option<ListId>,
    },

    /// Change metadata or templates.
    /// Returns: `Output::Items`
    ItemSave { payload: SavePayload },

    // ==================== Photo (2) ====================
    /// Move photos to the trash.
    /// Returns: `Output::Photos`
    PhotoDelete { ids: Vec<PhotoId> },

    /// Take photos out of the trash.
    /// Returns: `Output::Photos`
    PhotoRestore { ids: Vec<PhotoId> },

    // ==================== Tag (5) ====================
    /// Attach tags to items.
    /// Returns: `Output::Items`
    TagAdd { ids: Vec<ItemId>, tags: Vec<TagId> },

    /// Detach tags from items.
    /// Returns: `Output::Items`
    TagRemove { ids: Vec<ItemId>, tags: Vec<TagId> },

    /// Restore exact tag sets (inverse of uneven multi-item add/remove).
    /// Returns: `Output::Items`
    TagSet {
        items: BTreeMap<ItemId, BTreeSet<TagId>>,
    },

    /// Flip membership of each tag on one item.
    /// Returns: `Output::Tags`
    TagToggle { id: ItemId, tags: Vec<TagId> },

    /// Detach every tag from one item.
    /// Returns: `Output::Tags`
    TagClear { id: ItemId },

    // ==================== List (2) ====================
    /// Add items to a list.
    /// Returns: `Output::Items`
    ListItemsAdd { list: ListId, items: Vec<ItemId> },

    /// Remove items from a list.
    /// Returns: `Output::Items`
    ListItemsRemove { list: ListId, items: Vec<ItemId> },

    // ==================== Note (3) ====================
    /// Attach a note to a photo.
    /// Returns: `Output::Note`
    NoteCreate { photo: PhotoId, text: String },

    /// Trash notes.
    /// Returns: `Output::Notes`
    NoteDelete { ids: Vec<NoteId> },

    /// Take notes out of the trash.
    /// Returns: `Output::Notes`
    NoteRestore { ids: Vec<NoteId> },
}

/// Pre-image of one item absorbed by a merge
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SplitItem {
    /// Absorbed item
    pub id: ItemId,
    /// Its photos, in order
    pub photos: Vec<PhotoId>,
    /// Its tags
    pub tags: BTreeSet<TagId>,
    /// Its list memberships
    pub lists: BTreeSet<ListId>,
    /// Its metadata
    pub data: Metadata,
    /// Its template
    pub template: TemplateId,
}

/// Payload of [`Action::ItemSave`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SavePayload {
    /// Set (`Some`) or remove (`None`) one property
    Property {
        id: SubjectId,
        property: String,
        value: Option<MetadataValue>,
    },
    /// Switch an item to another template
    Template { id: ItemId, template: TemplateId },
    /// Apply several changes in one transaction
    Bulk(Vec<SaveEntry>),
}

/// One change inside [`SavePayload::Bulk`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveEntry {
    /// Item or photo
    pub id: SubjectId,
    /// New template (items only)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub template: Option<TemplateId>,
    /// Property changes
    #[serde(default)]
    pub data: MetadataPatch,
}

/// Per-dispatch flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Meta {
    /// Record the outcome in history
    #[serde(default = "enabled")]
    pub record: bool,
    /// Ask the user before destructive operations
    #[serde(default = "enabled")]
    pub prompt: bool,
}

fn enabled() -> bool {
    true
}

impl Default for Meta {
    fn default() -> Self {
        Self {
            record: true,
            prompt: true,
        }
    }
}

impl Meta {
    /// Flags for undo/redo replays: never recorded, never prompted
    pub fn replay() -> Self {
        Self {
            record: false,
            prompt: false,
        }
    }
}

/// Name of an action variant, used in logs, failure reports and history
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ActionType {
    #[serde(rename = "item.create")]
    ItemCreate,
    #[serde(rename = "item.delete")]
    ItemDelete,
    #[serde(rename = "item.restore")]
    ItemRestore,
    #[serde(rename = "item.destroy")]
    ItemDestroy,
    #[serde(rename = "item.load")]
    ItemLoad,
    #[serde(rename = "item.merge")]
    ItemMerge,
    #[serde(rename = "item.split")]
    ItemSplit,
    #[serde(rename = "item.explode")]
    ItemExplode,
    #[serde(rename = "item.implode")]
    ItemImplode,
    #[serde(rename = "item.import")]
    ItemImport,
    #[serde(rename = "item.save")]
    ItemSave,
    #[serde(rename = "photo.delete")]
    PhotoDelete,
    #[serde(rename = "photo.restore")]
    PhotoRestore,
    #[serde(rename = "item.tag.add")]
    TagAdd,
    #[serde(rename = "item.tag.remove")]
    TagRemove,
    #[serde(rename = "item.tag.set")]
    TagSet,
    #[serde(rename = "item.tag.toggle")]
    TagToggle,
    #[serde(rename = "item.tag.clear")]
    TagClear,
    #[serde(rename = "list.item.add")]
    ListItemsAdd,
    #[serde(rename = "list.item.remove")]
    ListItemsRemove,
    #[serde(rename = "note.create")]
    NoteCreate,
    #[serde(rename = "note.delete")]
    NoteDelete,
    #[serde(rename = "note.restore")]
    NoteRestore,
}

impl ActionType {
    /// Dotted action name
    pub fn as_str(self) -> &'static str {
        match self {
            ActionType::ItemCreate => "item.create",
            ActionType::ItemDelete => "item.delete",
            ActionType::ItemRestore => "item.restore",
            ActionType::ItemDestroy => "item.destroy",
            ActionType::ItemLoad => "item.load",
            ActionType::ItemMerge => "item.merge",
            ActionType::ItemSplit => "item.split",
            ActionType::ItemExplode => "item.explode",
            ActionType::ItemImplode => "item.implode",
            ActionType::ItemImport => "item.import",
            ActionType::ItemSave => "item.save",
            ActionType::PhotoDelete => "photo.delete",
            ActionType::PhotoRestore => "photo.restore",
            ActionType::TagAdd => "item.tag.add",
            ActionType::TagRemove => "item.tag.remove",
            ActionType::TagSet => "item.tag.set",
            ActionType::TagToggle => "item.tag.toggle",
            ActionType::TagClear => "item.tag.clear",
            ActionType::ListItemsAdd => "list.item.add",
            ActionType::ListItemsRemove => "list.item.remove",
            ActionType::NoteCreate => "note.create",
            ActionType::NoteDelete => "note.delete",
            ActionType::NoteRestore => "note.restore",
        }
    }
}

impl fmt::Display for ActionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Action {
    /// The variant's name
    pub fn action_type(&self) -> ActionType {
        match self {
            Action::ItemCreate { .. } => ActionType::ItemCreate,
            Action::ItemDelete { .. } => ActionType::ItemDelete,
            Action::ItemRestore { .. } => ActionType::ItemRestore,
            Action::ItemDestroy { .. } => ActionType::ItemDestroy,
            Action::ItemLoad { .. } => ActionType::ItemLoad,
            Action::ItemMerge { .. } => ActionType::ItemMerge,
            Action::ItemSplit { .. } => ActionType::ItemSplit,
            Action::ItemExplode { .. } => ActionType::ItemExplode,
            Action::ItemImplode { .. } => ActionType::ItemImplode,
            Action::ItemImport { .. } => ActionType::ItemImport,
            Action::ItemSave { .. } => ActionType::ItemSave,
            Action::PhotoDelete { .. } => ActionType::PhotoDelete,
            Action::PhotoRestore { .. } => ActionType::PhotoRestore,
            Action::TagAdd { .. } => ActionType::TagAdd,
            Action::TagRemove { .. } => ActionType::TagRemove,
            Action::TagSet { .. } => ActionType::TagSet,
            Action::TagToggle { .. } => ActionType::TagToggle,
            Action::TagClear { .. } => ActionType::TagClear,
            Action::ListItemsAdd { .. } => ActionType::ListItemsAdd,
            Action::ListItemsRemove { .. } => ActionType::ListItemsRemove,
            Action::NoteCreate { .. } => ActionType::NoteCreate,
            Action::NoteDelete { .. } => ActionType::NoteDelete,
            Action::NoteRestore { .. } => ActionType::NoteRestore,
        }
    }

    /// Items and photos this action refers to
    ///
    /// Used to drop history entries whose subjects were destroyed.
    pub fn subjects(&self) -> BTreeSet<SubjectId> {
        fn items(out: &mut BTreeSet<SubjectId>, ids: &[ItemId]) {
            out.extend(ids.iter().map(|id| SubjectId::from(*id)));
        }
        fn photos(out: &mut BTreeSet<SubjectId>, ids: &[PhotoId]) {
            out.extend(ids.iter().map(|id| SubjectId::from(*id)));
        }

        let mut out = BTreeSet::new();
        match self {
            Action::ItemCreate { .. }
            | Action::ItemDestroy { .. }
            | Action::ItemImport { .. }
            | Action::NoteDelete { .. }
            | Action::NoteRestore { .. } => {}
            Action::ItemDelete { ids }
            | Action::ItemRestore { ids }
            | Action::ItemLoad { ids }
            | Action::ItemMerge { ids }
            | Action::TagAdd { ids, .. }
            | Action::TagRemove { ids, .. } => items(&mut out, ids),
            Action::ItemSplit {
                item, items: split, ..
            } => {
                items(&mut out, &[*item]);
                for s in split {
                    items(&mut out, &[s.id]);
                    photos(&mut out, &s.photos);
                }
            }
            Action::ItemExplode {
                id,
                photos: detached,
                items: exploded,
            } => {
                items(&mut out, &[*id]);
                if let Some(detached) = detached {
                    photos(&mut out, detached);
                }
                for (item, moved) in exploded.iter().flatten() {
                    items(&mut out, &[*item]);
                    photos(&mut out, moved);
                }
            }
            Action::ItemImplode {
                item,
                items: others,
                order,
            } => {
                items(&mut out, &[*item]);
                items(&mut out, others);
                if let Some(order) = order {
                    photos(&mut out, order);
                }
            }
            Action::PhotoDelete { ids } | Action::PhotoRestore { ids } => photos(&mut out, ids),
            Action::ItemSave { payload } => match payload {
                SavePayload::Property { id, .. } => {
                    out.insert(*id);
                }
                SavePayload::Template { id, .. } => items(&mut out, &[*id]),
                SavePayload::Bulk(entries) => out.extend(entries.iter().map(|e| e.id)),
            },
            Action::TagSet { items: sets } => {
                out.extend(sets.keys().map(|id| SubjectId::from(*id)));
            }
            Action::TagToggle { id, .. } | Action::TagClear { id } => items(&mut out, &[*id]),
            Action::ListItemsAdd { items: members, .. }
            | Action::ListItemsRemove { items: members, .. } => items(&mut out, members),
            Action::NoteCreate { photo, .. } => photos(&mut out, &[*photo]),
        }
        out
    }

    /// Notes this action refers to
    pub fn notes(&self) -> &[NoteId] {
        match self {
            Action::NoteDelete { ids } | Action::NoteRestore { ids } => ids,
            _ => &[],
        }
    }
}
