//! Error types for command execution.
//!
//! All errors from command execution are represented by the [`Error`] enum.
//! These errors are:
//! - **Structured**: Each variant has typed fields for error details
//! - **Serializable**: Can be converted to/from JSON
//! - **Lossless**: No error information is lost in conversion from store errors

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use tropy_core::PhotoId;

/// Command execution errors.
///
/// # Categories
///
/// | Category | Variants | Description |
/// |----------|----------|-------------|
/// | Not Found | `NotFound`, `UnknownTemplate` | Referenced row doesn't exist |
/// | Validation | `InvalidInput` | Bad payload |
/// | Import | `Duplicate` | Content already in the project |
/// | Constraint | `ConstraintViolation` | Relational invariant violated |
/// | System | `Io`, `Serialization`, `Internal` | Infrastructure errors |
///
/// # Example
///
/// ```ignore
/// use tropy_executor::{Action, Error};
///
/// match session.dispatch(Action::ItemRestore { ids }).await {
///     Ok(output) => { /* handle success */ }
///     Err(Error::NotFound { entity, id }) => {
///         println!("{} {} was destroyed", entity, id);
///     }
///     Err(e) => println!("Error: {}", e),
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, thiserror::Error)]
pub enum Error {
    // ==================== Not Found ====================
    /// Item, photo, tag, list or note not found
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// Template not registered in the project
    #[error("unknown template: {template}")]
    UnknownTemplate { template: String },

    // ==================== Validation Errors ====================
    /// Invalid input
    #[error("invalid input: {reason}")]
    InvalidInput { reason: String },

    // ==================== Import ====================
    /// File content is already in the project
    #[error("duplicate of {photo}: {}", path.display())]
    Duplicate { path: PathBuf, photo: PhotoId },

    // ==================== Constraint Errors ====================
    /// Constraint violation
    #[error("constraint violation: {reason}")]
    ConstraintViolation { reason: String },

    // ==================== System Errors ====================
    /// I/O error
    #[error("I/O error: {reason}")]
    Io { reason: String },

    /// Serialization error
    #[error("serialization error: {reason}")]
    Serialization { reason: String },

    /// Internal error (bug or invariant violation)
    #[error("internal error: {reason}")]
    Internal { reason: String },
}

impl Error {
    /// Build an `InvalidInput` error
    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Error::InvalidInput {
            reason: reason.into(),
        }
    }

    /// Whether this error is an expected outcome rather than a failure.
    ///
    /// Duplicate imports are skipped, not reported as failures.
    pub fn is_expected(&self) -> bool {
        matches!(self, Error::Duplicate { .. })
    }
}
