//! Core types for Tropy
//!
//! This crate defines the foundational types used throughout the system:
//! - Ids: ItemId, PhotoId, TagId, ListId, NoteId, SubjectId, TemplateId
//! - Records: Item, Photo, Tag, List, Note, Template
//! - Metadata: MetadataValue, Metadata, MetadataPatch
//! - Timestamp: microsecond-precision time
//! - Error: store-level error type

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod error;
pub mod records;
pub mod timestamp;
pub mod types;
pub mod value;

pub use error::{Error, Result};
pub use records::{Item, List, Note, Photo, Tag, Template, TemplateField, DEFAULT_TEMPLATE};
pub use timestamp::Timestamp;
pub use types::{ItemId, ListId, NoteId, PhotoId, SubjectId, TagId, TemplateId};
pub use value::{
    apply_patch, validate_property, Metadata, MetadataPatch, MetadataValue, TEXT_TYPE, TITLE,
};
