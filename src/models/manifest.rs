//! Manifest of viewable items.

use serde::{Deserialize, Serialize};
use std::path::Path;

use super::image::ImageRef;
use super::pair::{build_page_pairs, PagePair};
use crate::error::{ErrorCode, ViewerError, ViewerResult};

/// A list of items that can be opened in the viewer.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Manifest {
    pub items: Vec<ManifestItem>,
}

/// One viewable item: a single plate or a multi-page book.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ManifestItem {
    pub name: String,
    /// Page width in meters.
    pub width: f32,
    /// Page height in meters.
    pub height: f32,
    pub images: Vec<ImageRef>,
}

impl Manifest {
    /// Parses and validates a manifest document.
    pub fn from_json(json: &str) -> ViewerResult<Self> {
        let manifest: Manifest = serde_json::from_str(json).map_err(|e| {
            ViewerError::with_message(
                ErrorCode::InvalidManifest,
                format!("Invalid manifest: {}", e),
            )
        })?;
        manifest.validate()?;
        Ok(manifest)
    }

    /// Reads a manifest file.
    pub async fn load(path: impl AsRef<Path>) -> ViewerResult<Self> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            ViewerError::with_message(
                ErrorCode::InvalidManifest,
                format!("Failed to read manifest {}: {}", path.display(), e),
            )
        })?;
        Self::from_json(&json)
    }

    /// Returns the item with the given name.
    pub fn item(&self, name: &str) -> ViewerResult<&ManifestItem> {
        self.items.iter().find(|item| item.name == name).ok_or_else(|| {
            ViewerError::with_message(
                ErrorCode::ManifestItemNotFound,
                format!("No item named '{}'", name),
            )
        })
    }

    pub fn first(&self) -> Option<&ManifestItem> {
        self.items.first()
    }

    fn validate(&self) -> ViewerResult<()> {
        for item in &self.items {
            if item.images.is_empty() {
                return Err(ViewerError::with_message(
                    ErrorCode::InvalidManifest,
                    format!("Item '{}' has no images", item.name),
                ));
            }
            if !(item.width > 0.0 && item.height > 0.0) {
                return Err(ViewerError::with_message(
                    ErrorCode::InvalidManifest,
                    format!("Item '{}' must have a positive size", item.name),
                ));
            }
        }
        Ok(())
    }
}

impl ManifestItem {
    /// Whether the item pages like a book rather than showing one plate.
    pub fn is_book(&self) -> bool {
        self.images.len() > 1
    }

    pub fn page_pairs(&self) -> Vec<PagePair<ImageRef>> {
        build_page_pairs(self.images.iter().cloned())
    }
}
