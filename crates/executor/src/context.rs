//! Execution context shared by all handlers.

use std::sync::Arc;

use tropy_storage::{Database, ProjectConfig};

use crate::bus::ActionBus;
use crate::collaborators::{AutoConfirm, FsImageLoader, ImageLoader, Prompt};

/// Everything a handler may touch: the store, the bus and collaborators
#[derive(Clone)]
pub struct Context {
    /// Store gateway
    pub db: Arc<Database>,
    /// Notification bus and state projection
    pub bus: Arc<ActionBus>,
    /// Confirmation prompts
    pub prompt: Arc<dyn Prompt>,
    /// Image decoding and thumbnails
    pub images: Arc<dyn ImageLoader>,
}

impl Context {
    /// Create a context with auto-confirming prompts and a file-system image
    /// loader configured from the project settings
    pub fn new(db: Arc<Database>) -> Self {
        let config = db.config();
        let images = FsImageLoader::new(
            config.cache_dir.clone(),
            config.import.thumbnail_sizes.clone(),
        );
        Self {
            db,
            bus: Arc::new(ActionBus::new()),
            prompt: Arc::new(AutoConfirm),
            images: Arc::new(images),
        }
    }

    /// Replace the prompt implementation
    pub fn with_prompt(mut self, prompt: Arc<dyn Prompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Replace the image loader
    pub fn with_images(mut self, images: Arc<dyn ImageLoader>) -> Self {
        self.images = images;
        self
    }

    /// Project configuration
    pub fn config(&self) -> &ProjectConfig {
        self.db.config()
    }
}

impl std::fmt::Debug for Context {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Context")
            .field("db", &self.db)
            .field("bus", &self.bus)
            .finish_non_exhaustive()
    }
}
