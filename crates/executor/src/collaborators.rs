//! External collaborators: user prompts and image decoding.
//!
//! Both are async traits so handlers can suspend on them. Implementations
//! must be `Send + Sync`; the session shares them between commands.

use async_trait::async_trait;
use image::imageops::FilterType;
use image::DynamicImage;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::debug;

use tropy_core::{Metadata, MetadataValue, PhotoId, TITLE};

use crate::{Error, Result};

// =============================================================================
// Prompt
// =============================================================================

/// Answer to a confirmation prompt
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PromptResponse {
    /// The user declined
    pub cancel: bool,
}

/// Asks the user to confirm destructive operations
#[async_trait]
pub trait Prompt: Send + Sync {
    /// Ask for confirmation of the operation named by `key`
    /// (for example `prompt.item.destroy`)
    async fn confirm(&self, key: &str) -> PromptResponse;
}

/// Confirms everything without asking
#[derive(Debug, Clone, Copy, Default)]
pub struct AutoConfirm;

#[async_trait]
impl Prompt for AutoConfirm {
    async fn confirm(&self, _key: &str) -> PromptResponse {
        PromptResponse::default()
    }
}

// =============================================================================
// Images
// =============================================================================

/// A decoded source image
#[derive(Debug, Clone)]
pub struct DecodedImage {
    /// Source path
    pub path: PathBuf,
    /// Hex SHA-256 of the file content
    pub checksum: String,
    /// MIME type
    pub mimetype: String,
    /// Pixel width
    pub width: u32,
    /// Pixel height
    pub height: u32,
    /// Initial photo metadata
    pub data: Metadata,
    /// Decoded pixels, when the loader keeps them for thumbnailing
    pub pixels: Option<Arc<DynamicImage>>,
}

/// Decodes images and renders thumbnails
#[async_trait]
pub trait ImageLoader: Send + Sync {
    /// Read and decode an image file
    async fn load(&self, path: &Path) -> Result<DecodedImage>;

    /// Render thumbnails for an imported photo; returns the files written
    async fn thumbnails(&self, photo: PhotoId, image: &DecodedImage) -> Result<Vec<PathBuf>>;
}

/// Hex SHA-256 of `bytes`
pub fn checksum(bytes: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

/// Photo metadata derived from the file name
pub fn file_metadata(path: &Path) -> Metadata {
    let mut data = Metadata::new();
    if let Some(stem) = path.file_stem().and_then(|s| s.to_str()) {
        data.insert(TITLE.to_string(), MetadataValue::text(stem));
    }
    data
}

/// Loads images from the file system with the `image` crate
#[derive(Debug, Clone)]
pub struct FsImageLoader {
    cache_dir: Option<PathBuf>,
    sizes: Vec<u32>,
}

impl FsImageLoader {
    /// Create a loader writing square thumbnails of `sizes` into `cache_dir`
    ///
    /// Without a cache directory no thumbnails are written.
    pub fn new(cache_dir: Option<PathBuf>, sizes: Vec<u32>) -> Self {
        Self { cache_dir, sizes }
    }

    fn thumbnail_path(dir: &Path, photo: PhotoId, size: u32) -> PathBuf {
        dir.join(format!("{}_{}.jpg", photo.get(), size))
    }
}

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn load(&self, path: &Path) -> Result<DecodedImage> {
        let bytes = tokio::fs::read(path).await.map_err(|e| Error::Io {
            reason: format!("{}: {}", path.display(), e),
        })?;
        let checksum = checksum(&bytes);

        let format = image::guess_format(&bytes).map_err(|e| {
            Error::invalid_input(format!("unsupported image {}: {}", path.display(), e))
        })?;
        let decoded = tokio::task::spawn_blocking(move || image::load_from_memory(&bytes))
            .await
            .map_err(|e| Error::Internal {
                reason: format!("decoder task failed: {}", e),
            })?
            .map_err(|e| Error::invalid_input(format!("cannot decode {}: {}", path.display(), e)))?;

        debug!(
            target: "tropy::import",
            path = %path.display(),
            width = decoded.width(),
            height = decoded.height(),
            "Image decoded"
        );

        Ok(DecodedImage {
            path: path.to_path_buf(),
            checksum,
            mimetype: format.to_mime_type().to_string(),
            width: decoded.width(),
            height: decoded.height(),
            data: file_metadata(path),
            pixels: Some(Arc::new(decoded)),
        })
    }

    async fn thumbnails(&self, photo: PhotoId, image: &DecodedImage) -> Result<Vec<PathBuf>> {
        let (Some(dir), Some(pixels)) = (self.cache_dir.clone(), image.pixels.clone()) else {
            return Ok(Vec::new());
        };
        let sizes = self.sizes.clone();

        tokio::task::spawn_blocking(move || -> Result<Vec<PathBuf>> {
            std::fs::create_dir_all(&dir).map_err(|e| Error::Io {
                reason: format!("{}: {}", dir.display(), e),
            })?;
            let mut written = Vec::with_capacity(sizes.len());
            for size in sizes {
                let thumbnail = pixels.resize(size, size, FilterType::Lanczos3).to_rgb8();
                let path = Self::thumbnail_path(&dir, photo, size);
                thumbnail.save(&path).map_err(|e| Error::Io {
                    reason: format!("{}: {}", path.display(), e),
                })?;
                written.push(path);
            }
            Ok(written)
        })
        .await
        .map_err(|e| Error::Internal {
            reason: format!("thumbnail task failed: {}", e),
        })?
    }
}
