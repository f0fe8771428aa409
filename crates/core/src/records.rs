//! Entity records
//!
//! These are plain projections of store rows. The store owns the
//! authoritative copy; everything else holds transient clones.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;

use crate::timestamp::Timestamp;
use crate::types::{ItemId, ListId, NoteId, PhotoId, TagId, TemplateId};
use crate::value::{Metadata, MetadataValue};

/// Template URI of the built-in generic item template
pub const DEFAULT_TEMPLATE: &str = "https://tropy.org/v1/templates/generic";

/// An archival record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Item {
    /// Store-assigned id
    pub id: ItemId,
    /// Owned photos, in position order
    pub photos: Vec<PhotoId>,
    /// Attached tags
    pub tags: BTreeSet<TagId>,
    /// Lists this item belongs to
    pub lists: BTreeSet<ListId>,
    /// Template the item was described with
    pub template: TemplateId,
    /// Metadata of the item
    pub data: Metadata,
    /// Soft-delete timestamp
    pub deleted: Option<Timestamp>,
    /// Creation time
    pub created: Timestamp,
    /// Last modification time
    pub modified: Timestamp,
}

impl Item {
    /// Whether the item is soft-deleted
    pub fn is_deleted(&self) -> bool {
        self.deleted.is_some()
    }
}

/// A digitized image owned by exactly one item
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Photo {
    /// Store-assigned id
    pub id: PhotoId,
    /// Owning item
    pub item: ItemId,
    /// Slot inside the owning item; trashed photos keep theirs
    pub position: u32,
    /// Source image path
    pub path: PathBuf,
    /// Hex SHA-256 of the source content
    pub checksum: String,
    /// MIME type of the source
    pub mimetype: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Metadata of the photo
    pub data: Metadata,
    /// Soft-delete timestamp
    pub deleted: Option<Timestamp>,
}

/// A named label
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// Tag id
    pub id: TagId,
    /// Label text
    pub name: String,
}

/// A named collection of items
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct List {
    /// List id
    pub id: ListId,
    /// List name
    pub name: String,
    /// Parent list, if nested
    pub parent: Option<ListId>,
}

/// A text note attached to a photo
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    /// Note id
    pub id: NoteId,
    /// Owning photo
    pub photo: PhotoId,
    /// Note text
    pub text: String,
    /// Soft-delete timestamp
    pub deleted: Option<Timestamp>,
    /// Last modification time
    pub modified: Timestamp,
}

/// One field of a template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateField {
    /// Property URI
    pub property: String,
    /// Value filled in when an item adopts the template
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default: Option<MetadataValue>,
}

/// An item description template
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Template {
    /// Template URI
    pub id: TemplateId,
    /// Display name
    pub name: String,
    /// Ordered fields
    pub fields: Vec<TemplateField>,
}

impl Template {
    /// The built-in generic template (title and date fields, no defaults)
    pub fn generic() -> Self {
        Self {
            id: TemplateId::new(DEFAULT_TEMPLATE),
            name: "Generic".to_string(),
            fields: vec![
                TemplateField {
                    property: crate::value::TITLE.to_string(),
                    default: None,
                },
                TemplateField {
                    property: "http://purl.org/dc/elements/1.1/date".to_string(),
                    default: None,
                },
            ],
        }
    }

    /// Default values this template contributes to a metadata bag
    pub fn defaults(&self) -> Metadata {
        self.fields
            .iter()
            .filter_map(|f| f.default.clone().map(|v| (f.property.clone(), v)))
            .collect()
    }
}
