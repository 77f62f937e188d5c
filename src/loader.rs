//! Image loaders.

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::{DashMap, DashSet};
use std::io::ErrorKind;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::fs;

use crate::error::{ErrorCode, ViewerError, ViewerResult};
use crate::models::{ImageRef, Texture};

/// Trait for loading textures. Called from background tasks.
#[async_trait]
pub trait ImageLoader: Send + Sync {
    async fn load(&self, image: &ImageRef) -> ViewerResult<Texture>;
}

/// In-memory image loader with optional latency and injected failures.
pub struct MemoryImageLoader {
    images: DashMap<ImageRef, Bytes>,
    failing: DashSet<ImageRef>,
    delays: DashMap<ImageRef, Duration>,
    latency: Duration,
    loads: AtomicUsize,
}

impl MemoryImageLoader {
    pub fn new() -> Self {
        Self::with_latency(Duration::ZERO)
    }

    /// Every load sleeps for `latency` before answering.
    pub fn with_latency(latency: Duration) -> Self {
        Self {
            images: DashMap::new(),
            failing: DashSet::new(),
            delays: DashMap::new(),
            latency,
            loads: AtomicUsize::new(0),
        }
    }

    pub fn insert(&self, image: ImageRef, data: impl Into<Bytes>) {
        self.images.insert(image, data.into());
    }

    /// Makes every load of `image` fail with `ImageReadFailed`.
    pub fn fail(&self, image: ImageRef) {
        self.failing.insert(image);
    }

    /// Makes loads of `image` sleep for `delay` instead of the shared latency.
    pub fn delay(&self, image: ImageRef, delay: Duration) {
        self.delays.insert(image, delay);
    }

    /// Number of load calls so far, failed ones included.
    pub fn load_count(&self) -> usize {
        self.loads.load(Ordering::Relaxed)
    }
}

impl Default for MemoryImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageLoader for MemoryImageLoader {
    async fn load(&self, image: &ImageRef) -> ViewerResult<Texture> {
        self.loads.fetch_add(1, Ordering::Relaxed);
        let latency = self
            .delays
            .get(image)
            .map(|delay| *delay.value())
            .unwrap_or(self.latency);
        if !latency.is_zero() {
            tokio::time::sleep(latency).await;
        }

        if self.failing.contains(image) {
            return Err(ViewerError::with_message(
                ErrorCode::ImageReadFailed,
                format!("Failed to read {}", image),
            ));
        }

        let data = self
            .images
            .get(image)
            .map(|data| data.value().clone())
            .ok_or_else(|| {
                ViewerError::with_message(
                    ErrorCode::ImageNotFound,
                    format!("No image at {}", image),
                )
            })?;

        Texture::from_bytes(image.clone(), data)
    }
}

/// File system image loader for `file://` references.
pub struct FsImageLoader;

impl FsImageLoader {
    pub fn new() -> Self {
        Self
    }
}

impl Default for FsImageLoader {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ImageLoader for FsImageLoader {
    async fn load(&self, image: &ImageRef) -> ViewerResult<Texture> {
        if image.scheme() != "file" {
            return Err(ViewerError::with_message(
                ErrorCode::UnsupportedImageScheme,
                format!("Cannot load '{}' scheme: {}", image.scheme(), image),
            ));
        }

        let path = image.url().to_file_path().map_err(|_| {
            ViewerError::with_message(
                ErrorCode::InvalidImageRef,
                format!("Not a local file path: {}", image),
            )
        })?;

        let data = fs::read(&path).await.map_err(|e| {
            let code = if e.kind() == ErrorKind::NotFound {
                ErrorCode::ImageNotFound
            } else {
                ErrorCode::ImageReadFailed
            };
            ViewerError::with_message(code, format!("Failed to read {}: {}", path.display(), e))
        })?;

        Texture::from_bytes(image.clone(), Bytes::from(data))
    }
}
