//! Common test utilities for executor integration tests

use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use image::{Rgb, RgbImage};
use tempfile::TempDir;
use tracing_subscriber::EnvFilter;
use tropy::{Context, Database, Error, ItemId, ListId, ProjectConfig, Session, TagId};

static INIT_TRACING: Once = Once::new();

/// Route `tracing` output to the test harness; filter with `RUST_LOG`
pub fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// A persistent project in a temporary directory
pub struct TestProject {
    pub session: Session,
    pub dir: TempDir,
}

impl TestProject {
    /// Create a project with thumbnails cached under `<tmp>/cache`
    pub fn new() -> Self {
        init_tracing();
        let dir = TempDir::new().unwrap();
        let config = ProjectConfig {
            cache_dir: Some(dir.path().join("cache")),
            ..ProjectConfig::default()
        };
        let db = Database::open_with_config(dir.path().join("project"), config).unwrap();
        Self {
            session: Session::new(Context::new(db)),
            dir,
        }
    }

    pub fn project_dir(&self) -> PathBuf {
        self.dir.path().join("project")
    }

    pub fn cache_dir(&self) -> PathBuf {
        self.dir.path().join("cache")
    }

    pub fn db(&self) -> &Arc<Database> {
        &self.session.context().db
    }

    /// Drop the session and open the same directory again
    pub fn reopen(self) -> Self {
        let Self { session, dir } = self;
        drop(session);
        let db = Database::open(dir.path().join("project")).unwrap();
        Self {
            session: Session::new(Context::new(db)),
            dir,
        }
    }

    /// Write a small solid-color PNG into the scratch directory
    pub fn scan(&self, name: &str, shade: u8) -> PathBuf {
        write_png(&self.dir.path().join("scans"), name, shade)
    }

    pub fn tag(&self, name: &str) -> TagId {
        self.db()
            .transaction::<_, _, Error>(|tx| Ok(tx.create_tag(name)?))
            .unwrap()
    }

    pub fn list(&self, name: &str) -> ListId {
        self.db()
            .transaction::<_, _, Error>(|tx| Ok(tx.create_list(name, None)?))
            .unwrap()
    }

    pub fn item(&self, id: ItemId) -> tropy::Item {
        self.db().sequence(|view| view.item(id)).unwrap()
    }
}

/// Write an 8x6 PNG filled with `shade`; different shades give different checksums
pub fn write_png(dir: &Path, name: &str, shade: u8) -> PathBuf {
    std::fs::create_dir_all(dir).unwrap();
    let path = dir.join(name);
    RgbImage::from_pixel(8, 6, Rgb([shade, 128, 255 - shade]))
        .save(&path)
        .unwrap();
    path
}
