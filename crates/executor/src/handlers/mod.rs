//! Command handlers organized by entity.
//!
//! Each submodule handles the actions for one area:
//!
//! | Module | Actions | Notes |
//! |--------|---------|-------|
//! | `item` | 5 | Create, delete, restore, destroy, load |
//! | `merge` | 2 | Merge and its inverse, split |
//! | `explode` | 2 | Explode and its inverse, implode |
//! | `import` | 1 | Sequential per-file import |
//! | `save` | 1 | Metadata and template changes |
//! | `photo` | 2 | Photo trash |
//! | `tag` | 5 | Tag membership |
//! | `list` | 2 | List membership |
//! | `note` | 3 | Notes on photos |
//!
//! Every handler follows the same shape: read, write inside one
//! transaction, emit notifications after the commit, return an
//! [`Outcome`](crate::command::Outcome).

pub mod explode;
pub mod import;
pub mod item;
pub mod list;
pub mod merge;
pub mod note;
pub mod photo;
pub mod save;
pub mod tag;

use std::collections::BTreeSet;

use crate::{Error, Result};

/// Reject empty id lists
pub(crate) fn require_ids<T>(ids: &[T], what: &str) -> Result<()> {
    if ids.is_empty() {
        return Err(Error::invalid_input(format!("no {} given", what)));
    }
    Ok(())
}

/// Reject id lists that name the same id twice
pub(crate) fn require_distinct<T: Ord + Copy + std::fmt::Display>(ids: &[T]) -> Result<()> {
    let mut seen = BTreeSet::new();
    for id in ids {
        if !seen.insert(*id) {
            return Err(Error::invalid_input(format!("{} given more than once", id)));
        }
    }
    Ok(())
}
