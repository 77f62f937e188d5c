//! Common interface of placeable image entities.

use async_trait::async_trait;
use glam::{Quat, Vec3};
use parking_lot::Mutex;
use uuid::Uuid;

use crate::error::ViewerResult;
use crate::models::Pose;
use crate::pose::Anchor;

/// An image entity the gesture layer can load, page, and move around.
#[async_trait]
pub trait ImageEntity: Send + Sync {
    fn id(&self) -> Uuid;

    /// Loads whatever the entity shows first.
    async fn load_initial(&self) -> ViewerResult<()>;

    /// Fire-and-forget forward turn. No-op for entities without pages.
    fn turn_forward(&self);

    /// Fire-and-forget backward turn. No-op for entities without pages.
    fn turn_backward(&self);

    /// Size of the box that receives input.
    fn collision_extents(&self) -> Vec3;

    fn anchor(&self) -> &Mutex<Anchor>;

    fn pose(&self) -> Pose {
        self.anchor().lock().pose()
    }

    fn set_position(&self, position: Vec3) {
        self.anchor().lock().set_position(position);
    }

    fn set_rotation(&self, rotation: Quat) {
        self.anchor().lock().set_rotation(rotation);
    }

    fn drag(&self, translation: Vec3) {
        self.anchor().lock().drag(translation);
    }

    fn end_drag(&self) {
        self.anchor().lock().end_drag();
    }

    fn twist(&self, radians: f32) {
        self.anchor().lock().twist(radians);
    }

    fn end_twist(&self) {
        self.anchor().lock().end_twist();
    }
}
