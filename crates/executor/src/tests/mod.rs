//! Test modules for the executor crate.
//!
//! Fixtures shared by the modules below: an in-memory session with a fake
//! image loader, a prompt that always cancels, and helpers that seed rows
//! straight through the store.


use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Once};

use tropy_storage::NewPhoto;

use crate::collaborators::{checksum, file_metadata};
use crate::{
    Action, Context, Database, DecodedImage, Error, ImageLoader, Item, ItemId, ListId, Output,
    PhotoId, ProjectConfig, Prompt, PromptResponse, Result, Session, TagId,
};

// =============================================================================
// Collaborator doubles
// =============================================================================

/// Image loader that hashes file bytes without decoding them
#[derive(Debug, Default)]
pub struct FakeImages {
    /// Paths whose thumbnails fail to render
    pub broken_thumbnails: Mutex<BTreeSet<PathBuf>>,
    /// Photos thumbnails were rendered for
    pub rendered: Mutex<Vec<PhotoId>>,
}

#[async_trait]
impl ImageLoader for FakeImages {
    async fn load(&self, path: &Path) -> Result<DecodedImage> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Io {
            reason: e.to_string(),
        })?;
        Ok(DecodedImage {
            path: path.to_path_buf(),
            checksum: checksum(&bytes),
            mimetype: "image/jpeg".to_string(),
            width: 640,
            height: 480,
            data: file_metadata(path),
            pixels: None,
        })
    }

    async fn thumbnails(&self, photo: PhotoId, image: &DecodedImage) -> Result<Vec<PathBuf>> {
        if self.broken_thumbnails.lock().contains(&image.path) {
            return Err(Error::Io {
                reason: "thumbnail device on fire".to_string(),
            });
        }
        self.rendered.lock().push(photo);
        Ok(Vec::new())
    }
}

/// Prompt that declines everything and remembers what it was asked
#[derive(Debug, Default)]
pub struct CancelPrompt {
    pub asked: Mutex<Vec<String>>,
}

#[async_trait]
impl Prompt for CancelPrompt {
    async fn confirm(&self, key: &str) -> PromptResponse {
        self.asked.lock().push(key.to_string());
        PromptResponse { cancel: true }
    }
}

// =============================================================================
// Sessions
// =============================================================================

static INIT_TRACING: Once = Once::new();

/// Send `tracing` output to the test harness; set `RUST_LOG=tropy=debug` to see it
fn init_tracing() {
    INIT_TRACING.call_once(|| {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();
    });
}

/// Create a test session over an in-memory database.
pub fn create_test_session() -> Session {
    create_test_session_with(ProjectConfig::default()).0
}

/// Create a test session with an explicit config; also returns the image
/// loader so tests can inspect or sabotage it.
pub fn create_test_session_with(config: ProjectConfig) -> (Session, Arc<FakeImages>) {
    init_tracing();
    let images = Arc::new(FakeImages::default());
    let ctx = Context::new(Database::cache_with_config(config)).with_images(images.clone());
    (Session::new(ctx), images)
}

// =============================================================================
// Seeding helpers
// =============================================================================

/// Dispatch an ItemCreate and return the new item's id
pub async fn create_item(session: &Session) -> ItemId {
    match session
        .dispatch(Action::ItemCreate {
            template: None,
            list: None,
        })
        .await
        .unwrap()
    {
        Output::Item(item) => item.id,
        other => panic!("expected Output::Item, got {:?}", other),
    }
}

/// Seed an item with `n` photos straight through the store (no history)
pub fn seed_item_with_photos(session: &Session, n: usize) -> (ItemId, Vec<PhotoId>) {
    let db = &session.context().db;
    let template = db.config().default_template.clone();
    db.transaction(|tx| -> tropy_core::Result<_> {
        let item = tx.create_item(&template, Default::default())?;
        let mut photos = Vec::new();
        for i in 0..n {
            photos.push(tx.create_photo(NewPhoto {
                item,
                path: PathBuf::from(format!("/scans/{}-{}.jpg", item.get(), i)),
                checksum: format!("{}-{}", item.get(), i),
                mimetype: "image/jpeg".to_string(),
                width: 10,
                height: 10,
                data: Default::default(),
            })?);
        }
        Ok((item, photos))
    })
    .unwrap()
}

/// Create a tag straight through the store
pub fn seed_tag(session: &Session, name: &str) -> TagId {
    session
        .context()
        .db
        .transaction(|tx| tx.create_tag(name))
        .unwrap()
}

/// Create a list straight through the store
pub fn seed_list(session: &Session, name: &str) -> ListId {
    session
        .context()
        .db
        .transaction(|tx| tx.create_list(name, None))
        .unwrap()
}

/// Load an item from the committed store
pub fn load_item(session: &Session, id: ItemId) -> Item {
    session.context().db.sequence(|view| view.item(id)).unwrap()
}

/// Write `content` to `dir/name` and return the path
pub fn write_file(dir: &Path, name: &str, content: &[u8]) -> PathBuf {
    let path = dir.join(name);
    std::fs::write(&path, content).unwrap();
    path
}
