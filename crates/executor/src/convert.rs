//! Error conversion from store errors.
//!
//! This module provides conversions from [`tropy_core::Error`] to the
//! executor's [`Error`] type.

use crate::Error;
use tropy_core::Error as StoreError;

/// Convert a store error to an executor Error.
///
/// Missing templates get their own variant so callers can tell a stale
/// template reference from a missing row.
impl From<StoreError> for Error {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound {
                entity: "template",
                id,
            } => Error::UnknownTemplate { template: id },
            StoreError::NotFound { entity, id } => Error::NotFound {
                entity: entity.to_string(),
                id,
            },
            StoreError::Duplicate { path, photo } => Error::Duplicate { path, photo },
            StoreError::InvalidInput { reason } => Error::InvalidInput { reason },
            StoreError::ConstraintViolation { reason } => Error::ConstraintViolation { reason },
            StoreError::Io(e) => Error::Io {
                reason: e.to_string(),
            },
            StoreError::Serialization { reason } => Error::Serialization { reason },
            StoreError::Internal { reason } => Error::Internal { reason },
        }
    }
}
