//! Committed snapshots
//!
//! [`View`] is an immutable point-in-time view of the committed tables.
//! Commits never mutate a published snapshot; they publish a new `Arc`.
//!
//! Persistent projects keep their committed state in `project.json`. The
//! file is rewritten through a temporary file and a rename so a crash never
//! leaves a half-written snapshot behind.

use serde::{Deserialize, Serialize};
use std::ops::Deref;
use std::path::Path;
use std::sync::Arc;

use tropy_core::{Error, Result};

use crate::tables::Tables;

/// Snapshot file name placed in the project directory.
pub const SNAPSHOT_FILE_NAME: &str = "project.json";

/// A read-only view of the committed tables
///
/// # Example
///
/// ```ignore
/// let view = db.view();
/// db.transaction(|tx| tx.create_item(&template, Metadata::new()))?;
///
/// // The commit above is not visible through the older view
/// assert!(view.item_ids().is_empty());
/// ```
#[derive(Debug, Clone)]
pub struct View {
    version: u64,
    tables: Arc<Tables>,
}

impl View {
    pub(crate) fn new(version: u64, tables: Arc<Tables>) -> Self {
        Self { version, tables }
    }

    /// Commit version this view was taken at
    pub fn version(&self) -> u64 {
        self.version
    }
}

impl Deref for View {
    type Target = Tables;

    fn deref(&self) -> &Tables {
        &self.tables
    }
}

#[derive(Serialize, Deserialize)]
struct SnapshotFile {
    version: u64,
    tables: Tables,
}

#[derive(Serialize)]
struct SnapshotFileRef<'a> {
    version: u64,
    tables: &'a Tables,
}

/// Write `tables` at `version` to `path` atomically
pub(crate) fn write(path: &Path, version: u64, tables: &Tables) -> Result<()> {
    let json = serde_json::to_vec(&SnapshotFileRef { version, tables })?;
    let tmp = path.with_extension("json.tmp");
    std::fs::write(&tmp, json)?;
    std::fs::rename(&tmp, path)?;
    Ok(())
}

/// Read a snapshot file; `Ok(None)` if it does not exist yet
pub(crate) fn read(path: &Path) -> Result<Option<(u64, Tables)>> {
    let bytes = match std::fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(e) => return Err(Error::from(e)),
    };
    let file: SnapshotFile = serde_json::from_slice(&bytes).map_err(|e| Error::Serialization {
        reason: format!("corrupt snapshot '{}': {}", path.display(), e),
    })?;
    Ok(Some((file.version, file.tables)))
}
