//! Error types for the Tropy store
//!
//! This module defines the errors raised below the command layer.
//! We use `thiserror` for automatic `Display` and `Error` trait implementations.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

use crate::types::PhotoId;

/// Result type alias for store operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the Tropy store
#[derive(Debug, Error)]
pub enum Error {
    /// Referenced row does not exist
    #[error("{entity} not found: {id}")]
    NotFound {
        /// Entity kind ("item", "photo", ...)
        entity: &'static str,
        /// Rendered id
        id: String,
    },

    /// Content is already present in the project
    #[error("duplicate of {photo}: {}", path.display())]
    Duplicate {
        /// Offending source file
        path: PathBuf,
        /// Existing photo with the same content
        photo: PhotoId,
    },

    /// Invalid input (bad property name, empty id list, ...)
    #[error("invalid input: {reason}")]
    InvalidInput {
        /// What was wrong
        reason: String,
    },

    /// Relational constraint violated
    #[error("constraint violation: {reason}")]
    ConstraintViolation {
        /// Which constraint
        reason: String,
    },

    /// I/O error (project files, images, thumbnails)
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Serialization/deserialization error
    #[error("serialization error: {reason}")]
    Serialization {
        /// Underlying message
        reason: String,
    },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal {
        /// Underlying message
        reason: String,
    },
}

impl Error {
    /// Build a `NotFound` error for any displayable id
    pub fn not_found(entity: &'static str, id: impl std::fmt::Display) -> Self {
        Error::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    /// Build an `InvalidInput` error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Build a `ConstraintViolation` error
    pub fn constraint(reason: impl Into<String>) -> Self {
        Error::ConstraintViolation {
            reason: reason.into(),
        }
    }

    /// Build an `Internal` error
    pub fn internal(reason: impl Into<String>) -> Self {
        Error::Internal {
            reason: reason.into(),
        }
    }
}

impl From<serde_json::Error> for Error {
    fn from(e: serde_json::Error) -> Self {
        Error::Serialization {
            reason: e.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ItemId;

    #[test]
    fn test_error_display_not_found() {
        let err = Error::not_found("item", ItemId(4));
        assert_eq!(err.to_string(), "item not found: item#4");
    }

    #[test]
    fn test_error_display_duplicate() {
        let err = Error::Duplicate {
            path: PathBuf::from("/tmp/a.jpg"),
            photo: PhotoId(9),
        };
        let msg = err.to_string();
        assert!(msg.contains("duplicate of photo#9"));
        assert!(msg.contains("/tmp/a.jpg"));
    }

    #[test]
    fn test_error_from_io() {
        let io_err = io::Error::new(io::ErrorKind::PermissionDenied, "access denied");
        let err: Error = io_err.into();
        assert!(matches!(err, Error::Io(_)));
    }

    #[test]
    fn test_error_from_serde_json() {
        let result: std::result::Result<u64, _> = serde_json::from_str("not json");
        let err: Error = result.unwrap_err().into();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn test_error_pattern_matching() {
        match Error::constraint("photo must belong to an item") {
            Error::ConstraintViolation { reason } => {
                assert!(reason.contains("photo"));
            }
            _ => panic!("Wrong error variant"),
        }
    }
}
