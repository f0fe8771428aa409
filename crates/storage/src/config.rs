//! Project configuration via `tropy.toml`
//!
//! On first open a default `tropy.toml` is created in the project
//! directory. To change settings, edit the file and reopen the project.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tropy_core::{Error, Result, TemplateId, DEFAULT_TEMPLATE};

/// Config file name placed in the project directory.
pub const CONFIG_FILE_NAME: &str = "tropy.toml";

/// Default number of undoable commands kept in history.
pub const DEFAULT_HISTORY_DEPTH: usize = 50;

/// What an import does with a file whose content is already in the project.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DuplicatePolicy {
    /// Skip the file and report it as a duplicate
    #[default]
    Skip,
    /// Import it anyway
    Import,
}

/// `[history]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryConfig {
    /// Maximum number of undoable commands kept
    #[serde(default = "default_depth")]
    pub depth: usize,
}

fn default_depth() -> usize {
    DEFAULT_HISTORY_DEPTH
}

impl Default for HistoryConfig {
    fn default() -> Self {
        Self {
            depth: default_depth(),
        }
    }
}

/// `[import]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImportConfig {
    /// Duplicate policy: `"skip"` (default) or `"import"`
    #[serde(default)]
    pub duplicates: DuplicatePolicy,
    /// Square thumbnail edge lengths in pixels
    #[serde(default = "default_thumbnail_sizes")]
    pub thumbnail_sizes: Vec<u32>,
}

fn default_thumbnail_sizes() -> Vec<u32> {
    vec![48, 512]
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            duplicates: DuplicatePolicy::default(),
            thumbnail_sizes: default_thumbnail_sizes(),
        }
    }
}

/// Project configuration loaded from `tropy.toml`.
///
/// # Example
///
/// ```toml
/// default_template = "https://tropy.org/v1/templates/generic"
///
/// [history]
/// depth = 50
///
/// [import]
/// duplicates = "skip"
/// thumbnail_sizes = [48, 512]
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectConfig {
    /// Template used by item creation and import when none is given
    #[serde(default = "default_template")]
    pub default_template: TemplateId,
    /// Thumbnail cache directory; `None` disables thumbnail generation
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache_dir: Option<PathBuf>,
    /// Undo history settings
    #[serde(default)]
    pub history: HistoryConfig,
    /// Import settings
    #[serde(default)]
    pub import: ImportConfig,
}

fn default_template() -> TemplateId {
    TemplateId::new(DEFAULT_TEMPLATE)
}

impl Default for ProjectConfig {
    fn default() -> Self {
        Self {
            default_template: default_template(),
            cache_dir: None,
            history: HistoryConfig::default(),
            import: ImportConfig::default(),
        }
    }
}

impl ProjectConfig {
    /// Check values that serde cannot.
    ///
    /// # Errors
    ///
    /// Returns an error for a zero history depth or a zero thumbnail size.
    pub fn validate(&self) -> Result<()> {
        if self.history.depth == 0 {
            return Err(Error::invalid_input(
                "history depth in tropy.toml must be at least 1",
            ));
        }
        if self.import.thumbnail_sizes.contains(&0) {
            return Err(Error::invalid_input(
                "thumbnail sizes in tropy.toml must be positive",
            ));
        }
        Ok(())
    }

    /// Returns the default config file content with comments.
    pub fn default_toml() -> &'static str {
        r#"# Tropy project configuration
#
# Template used for new and imported items
default_template = "https://tropy.org/v1/templates/generic"

# Thumbnail cache directory (thumbnails are skipped when unset)
# cache_dir = "/path/to/cache"

[history]
# Number of undoable commands kept (default: 50)
depth = 50

[import]
# What to do with files already in the project: "skip" (default) or "import"
duplicates = "skip"
# Square thumbnail sizes in pixels
thumbnail_sizes = [48, 512]
"#
    }

    /// Read and parse config from a file path.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, parsed or validated.
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::internal(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        let config: ProjectConfig = toml::from_str(&content).map_err(|e| {
            Error::invalid_input(format!(
                "Failed to parse config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Write the default config file if it does not already exist.
    pub fn write_default_if_missing(path: &Path) -> Result<()> {
        if !path.exists() {
            std::fs::write(path, Self::default_toml()).map_err(|e| {
                Error::internal(format!(
                    "Failed to write default config file '{}': {}",
                    path.display(),
                    e
                ))
            })?;
        }
        Ok(())
    }

    /// Serialize this config to TOML and write it to the given path.
    pub fn write_to_file(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self)
            .map_err(|e| Error::internal(format!("Failed to serialize config: {}", e)))?;
        std::fs::write(path, content).map_err(|e| {
            Error::internal(format!(
                "Failed to write config file '{}': {}",
                path.display(),
                e
            ))
        })
    }
}
