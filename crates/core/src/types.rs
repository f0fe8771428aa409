//! Identifier types
//!
//! Items and photos share one subject id space (metadata is keyed by
//! [`SubjectId`]), tags, lists and notes each have their own sequence.
//! Templates are identified by URI strings.

use serde::{Deserialize, Serialize};
use std::fmt;

macro_rules! numeric_id {
    ($(#[$doc:meta])* $name:ident, $prefix:literal) => {
        $(#[$doc])*
        #[derive(
            Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
        )]
        #[serde(transparent)]
        pub struct $name(pub u64);

        impl $name {
            /// Raw integer value
            #[inline]
            pub const fn get(self) -> u64 {
                self.0
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, concat!($prefix, "#{}"), self.0)
            }
        }

        impl From<u64> for $name {
            fn from(id: u64) -> Self {
                Self(id)
            }
        }
    };
}

numeric_id!(
    /// Archival record id (subject id space)
    ItemId,
    "item"
);
numeric_id!(
    /// Photo id (subject id space)
    PhotoId,
    "photo"
);
numeric_id!(
    /// Tag id
    TagId,
    "tag"
);
numeric_id!(
    /// List id
    ListId,
    "list"
);
numeric_id!(
    /// Note id
    NoteId,
    "note"
);
numeric_id!(
    /// Id of anything that can carry metadata (items and photos)
    SubjectId,
    "subject"
);

impl From<ItemId> for SubjectId {
    fn from(id: ItemId) -> Self {
        SubjectId(id.0)
    }
}

impl From<PhotoId> for SubjectId {
    fn from(id: PhotoId) -> Self {
        SubjectId(id.0)
    }
}

/// Template identifier (a URI)
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TemplateId(String);

impl TemplateId {
    /// Create a template id from its URI
    pub fn new(uri: impl Into<String>) -> Self {
        Self(uri.into())
    }

    /// The template URI
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TemplateId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for TemplateId {
    fn from(uri: &str) -> Self {
        Self::new(uri)
    }
}
