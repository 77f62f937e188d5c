//! Single-image entity.

use async_trait::async_trait;
use glam::Vec3;
use parking_lot::Mutex;
use std::sync::Arc;
use tracing::info;
use uuid::Uuid;

use crate::entity::ImageEntity;
use crate::error::ViewerResult;
use crate::loader::ImageLoader;
use crate::models::{ImageRef, Material, Surface};
use crate::pose::Anchor;

/// One image shown as a flat plane. It has no pages to turn.
pub struct Plate {
    id: Uuid,
    image: ImageRef,
    width: f32,
    height: f32,
    loader: Arc<dyn ImageLoader>,
    surface: Mutex<Option<Surface>>,
    anchor: Mutex<Anchor>,
}

impl Plate {
    pub fn new(image: ImageRef, width: f32, height: f32, loader: Arc<dyn ImageLoader>) -> Self {
        Self {
            id: Uuid::new_v4(),
            image,
            width,
            height,
            loader,
            surface: Mutex::new(None),
            anchor: Mutex::new(Anchor::default()),
        }
    }

    pub fn image(&self) -> &ImageRef {
        &self.image
    }

    /// The textured surface, once loaded.
    pub fn surface(&self) -> Option<Surface> {
        self.surface.lock().clone()
    }
}

#[async_trait]
impl ImageEntity for Plate {
    fn id(&self) -> Uuid {
        self.id
    }

    /// Unlike book pages, a plate that fails to load reports the error.
    async fn load_initial(&self) -> ViewerResult<()> {
        let texture = self.loader.load(&self.image).await?;
        info!(
            plate = %self.id,
            image = %self.image,
            format = texture.format().as_str(),
            "plate loaded"
        );
        *self.surface.lock() = Some(Surface::front(
            Material::Textured(texture),
            self.width,
            self.height,
        ));
        Ok(())
    }

    fn turn_forward(&self) {}

    fn turn_backward(&self) {}

    fn collision_extents(&self) -> Vec3 {
        Vec3::new(self.width, 0.0, self.height)
    }

    fn anchor(&self) -> &Mutex<Anchor> {
        &self.anchor
    }
}
