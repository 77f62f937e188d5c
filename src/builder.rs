//! Builds two-sided leaves from page images.

use std::sync::Arc;
use tracing::{debug, warn};

use crate::loader::ImageLoader;
use crate::models::{ImageRef, Leaf, Material, Surface};

/// Turns a pair of optional image references into an unattached leaf.
#[derive(Clone)]
pub struct PageContentBuilder {
    loader: Arc<dyn ImageLoader>,
    width: f32,
    height: f32,
}

impl PageContentBuilder {
    pub fn new(loader: Arc<dyn ImageLoader>, width: f32, height: f32) -> Self {
        Self {
            loader,
            width,
            height,
        }
    }

    /// Builds a leaf resting on the right.
    ///
    /// A side whose image is absent or fails to load is painted blank; the leaf
    /// itself is always produced.
    pub async fn build_leaf(&self, front: Option<&ImageRef>, back: Option<&ImageRef>) -> Leaf {
        let (front_material, back_material) =
            futures::join!(self.material_for(front), self.material_for(back));

        Leaf::new(
            Surface::front(front_material, self.width, self.height),
            Surface::back(back_material, self.width, self.height),
        )
    }

    async fn material_for(&self, image: Option<&ImageRef>) -> Material {
        let Some(image) = image else {
            return Material::Blank;
        };

        match self.loader.load(image).await {
            Ok(texture) => {
                debug!(image = %image, bytes = texture.len(), "loaded page texture");
                Material::Textured(texture)
            }
            Err(e) => {
                warn!(image = %image, error = %e, "page texture failed to load, using blank");
                Material::Blank
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::loader::MemoryImageLoader;
    use crate::models::ImageFormat;

    const PNG: &[u8] = b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR";

    #[tokio::test]
    async fn test_missing_and_failed_sides_are_blank() {
        let loader = Arc::new(MemoryImageLoader::new());
        let good = ImageRef::parse("mem://pages/good").unwrap();
        let broken = ImageRef::parse("mem://pages/broken").unwrap();
        loader.insert(good.clone(), PNG);
        loader.insert(broken.clone(), PNG);
        loader.fail(broken.clone());

        let builder = PageContentBuilder::new(loader.clone(), 1.0, 1.4);

        let leaf = builder.build_leaf(Some(&good), Some(&broken)).await;
        assert_eq!(leaf.front().material.texture().unwrap().format(), ImageFormat::Png);
        assert!(leaf.back().material.is_blank());

        let leaf = builder.build_leaf(None, None).await;
        assert!(leaf.front().material.is_blank());
        assert!(leaf.back().material.is_blank());

        assert_eq!(loader.load_count(), 2);
    }

    #[tokio::test]
    async fn test_surfaces_share_size_and_offset() {
        let builder = PageContentBuilder::new(Arc::new(MemoryImageLoader::new()), 2.0, 3.0);
        let leaf = builder.build_leaf(None, None).await;

        assert_eq!(leaf.front().width, 2.0);
        assert_eq!(leaf.back().height, 3.0);
        assert_eq!(leaf.front().offset.x, 1.0);
        assert_eq!(leaf.front().offset, leaf.back().offset);
        assert_eq!(leaf.angle(), 0.0);
    }
}
