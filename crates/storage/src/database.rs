//! Database: the store gateway
//!
//! ## Design
//!
//! The committed state is an `Arc<Tables>` behind a read-write lock.
//! Readers ([`Database::sequence`], [`Database::view`]) clone the `Arc` and
//! never block writers for longer than that clone.
//!
//! Writers are serialized by a mutex. [`Database::transaction`] clones the
//! committed tables into a staging copy, runs the closure against it, and on
//! success publishes the staging copy as the new committed state. On error
//! the staging copy is dropped, so partial writes are never observable.
//!
//! Persistent databases ([`Database::open`]) also rewrite `project.json`
//! before publishing a commit. A failed write aborts the commit.

use parking_lot::{Mutex, RwLock};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::info;

use tropy_core::{Error, Result, Timestamp};

use crate::config::{ProjectConfig, CONFIG_FILE_NAME};
use crate::coordinator::{TransactionCoordinator, TransactionMetrics};
use crate::snapshot::{self, View, SNAPSHOT_FILE_NAME};
use crate::tables::Tables;
use crate::transaction::Transaction;

/// The project store
#[derive(Debug)]
pub struct Database {
    committed: RwLock<Arc<Tables>>,
    writer: Mutex<()>,
    coordinator: TransactionCoordinator,
    config: ProjectConfig,
    data_dir: Option<PathBuf>,
}

impl Database {
    /// Open an in-memory database with the default configuration
    pub fn cache() -> Arc<Self> {
        Self::cache_with_config(ProjectConfig::default())
    }

    /// Open an in-memory database with an explicit configuration
    pub fn cache_with_config(config: ProjectConfig) -> Arc<Self> {
        Arc::new(Self {
            committed: RwLock::new(Arc::new(Tables::new())),
            writer: Mutex::new(()),
            coordinator: TransactionCoordinator::new(0),
            config,
            data_dir: None,
        })
    }

    /// Open (or create) a project directory
    ///
    /// Creates a default `tropy.toml` if none exists and loads the last
    /// committed `project.json` snapshot.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Arc<Self>> {
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;

        let config_path = data_dir.join(CONFIG_FILE_NAME);
        ProjectConfig::write_default_if_missing(&config_path)?;
        let config = ProjectConfig::from_file(&config_path)?;

        Self::open_with_config(data_dir, config)
    }

    /// Open a project directory with an explicit configuration
    ///
    /// The supplied config is written to `tropy.toml` so that later
    /// [`Database::open`] calls pick up the same settings.
    pub fn open_with_config<P: AsRef<Path>>(path: P, config: ProjectConfig) -> Result<Arc<Self>> {
        config.validate()?;
        let data_dir = path.as_ref().to_path_buf();
        std::fs::create_dir_all(&data_dir)?;
        config.write_to_file(&data_dir.join(CONFIG_FILE_NAME))?;

        let (version, tables) = match snapshot::read(&data_dir.join(SNAPSHOT_FILE_NAME))? {
            Some((version, tables)) => (version, tables),
            None => (0, Tables::new()),
        };

        info!(
            target: "tropy::db",
            path = %data_dir.display(),
            version,
            items = tables.item_ids().len(),
            "Project opened"
        );

        Ok(Arc::new(Self {
            committed: RwLock::new(Arc::new(tables)),
            writer: Mutex::new(()),
            coordinator: TransactionCoordinator::new(version),
            config,
            data_dir: Some(data_dir),
        }))
    }

    /// Run `f` atomically
    ///
    /// All writes made through the [`Transaction`] become visible together
    /// when `f` returns `Ok`. If `f` returns `Err`, nothing is written.
    ///
    /// # Example
    ///
    /// ```ignore
    /// let id = db.transaction(|tx| {
    ///     let id = tx.create_item(&template, Metadata::new())?;
    ///     tx.add_tags(id, &[tag])?;
    ///     Ok(id)
    /// })?;
    /// ```
    pub fn transaction<F, T, E>(&self, f: F) -> std::result::Result<T, E>
    where
        F: FnOnce(&mut Transaction<'_>) -> std::result::Result<T, E>,
        E: From<Error> + std::fmt::Display,
    {
        let _guard = self.writer.lock();
        let mut staged = Tables::clone(&self.committed.read());

        self.coordinator.record_start();
        let result = {
            let mut tx = Transaction::new(&mut staged, Timestamp::now());
            f(&mut tx)
        };

        match result {
            Ok(value) => {
                let version = self.coordinator.current_version() + 1;
                if let Some(dir) = &self.data_dir {
                    if let Err(e) = snapshot::write(&dir.join(SNAPSHOT_FILE_NAME), version, &staged)
                    {
                        self.coordinator.record_abort(&e);
                        return Err(E::from(e));
                    }
                }
                *self.committed.write() = Arc::new(staged);
                self.coordinator.record_commit();
                Ok(value)
            }
            Err(e) => {
                self.coordinator.record_abort(&e);
                Err(e)
            }
        }
    }

    /// Run a read-only function against the committed state
    ///
    /// The function sees one consistent snapshot and cannot write.
    pub fn sequence<F, T>(&self, f: F) -> T
    where
        F: FnOnce(&View) -> T,
    {
        f(&self.view())
    }

    /// Take a snapshot of the committed state
    pub fn view(&self) -> View {
        let tables = Arc::clone(&self.committed.read());
        View::new(self.coordinator.current_version(), tables)
    }

    /// Current commit version
    pub fn version(&self) -> u64 {
        self.coordinator.current_version()
    }

    /// Transaction statistics
    pub fn stats(&self) -> TransactionMetrics {
        self.coordinator.metrics()
    }

    /// Project configuration
    pub fn config(&self) -> &ProjectConfig {
        &self.config
    }

    /// Project directory, `None` for in-memory databases
    pub fn data_dir(&self) -> Option<&Path> {
        self.data_dir.as_deref()
    }

    /// Whether this database lives only in memory
    pub fn is_cache(&self) -> bool {
        self.data_dir.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;
    use tropy_core::{Metadata, TemplateId, DEFAULT_TEMPLATE};

    fn generic() -> TemplateId {
        TemplateId::new(DEFAULT_TEMPLATE)
    }

    #[test]
    fn test_transaction_commits_on_ok() {
        let db = Database::cache();
        let id = db
            .transaction(|tx| tx.create_item(&generic(), Metadata::new()))
            .unwrap();

        assert!(db.sequence(|view| view.has_item(id)));
        assert_eq!(db.version(), 1);
        assert_eq!(db.stats().total_committed, 1);
    }

    #[test]
    fn test_transaction_rolls_back_on_err() {
        let db = Database::cache();
        let result: Result<()> = db.transaction(|tx| {
            tx.create_item(&generic(), Metadata::new())?;
            tx.create_tag("kept?")?;
            Err(Error::internal("fail after writes"))
        });

        assert!(result.is_err());
        assert!(db.sequence(|view| view.item_ids().is_empty()));
        assert!(db.sequence(|view| view.all_tags().is_empty()));
        assert_eq!(db.version(), 0);
        assert_eq!(db.stats().total_aborted, 1);
    }

    #[test]
    fn test_view_does_not_see_later_commits() {
        let db = Database::cache();
        let before = db.view();
        db.transaction(|tx| tx.create_item(&generic(), Metadata::new()))
            .unwrap();

        assert!(before.item_ids().is_empty());
        assert_eq!(db.view().item_ids().len(), 1);
        assert_eq!(before.version() + 1, db.view().version());
    }

    #[test]
    fn test_open_creates_config_and_reloads_snapshot() {
        let dir = TempDir::new().unwrap();
        let id = {
            let db = Database::open(dir.path()).unwrap();
            assert!(!db.is_cache());
            db.transaction(|tx| tx.create_item(&generic(), Metadata::new()))
                .unwrap()
        };
        assert!(dir.path().join(CONFIG_FILE_NAME).exists());
        assert!(dir.path().join(SNAPSHOT_FILE_NAME).exists());

        let db = Database::open(dir.path()).unwrap();
        assert!(db.sequence(|view| view.has_item(id)));
        assert_eq!(db.version(), 1);
    }

    #[test]
    fn test_open_with_config_persists_settings() {
        let dir = TempDir::new().unwrap();
        let mut config = ProjectConfig::default();
        config.history.depth = 9;
        Database::open_with_config(dir.path(), config).unwrap();

        let db = Database::open(dir.path()).unwrap();
        assert_eq!(db.config().history.depth, 9);
    }

    #[test]
    fn test_concurrent_writers_are_serialized() {
        let db = Database::cache();
        let handles: Vec<_> = (0..8)
            .map(|_| {
                let db = Arc::clone(&db);
                std::thread::spawn(move || {
                    db.transaction(|tx| tx.create_item(&generic(), Metadata::new()))
                        .unwrap()
                })
            })
            .collect();
        let mut ids: Vec<_> = handles.into_iter().map(|h| h.join().unwrap()).collect();
        ids.sort();
        ids.dedup();

        assert_eq!(ids.len(), 8);
        assert_eq!(db.version(), 8);
    }
}
