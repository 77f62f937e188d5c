//! Anchor pose and gesture pass-through.

use glam::{Quat, Vec3};

use crate::models::Pose;

/// Pose of an entity's anchor plus the in-progress drag and twist gestures.
#[derive(Debug, Clone, Default)]
pub struct Anchor {
    pose: Pose,
    drag_origin: Option<Vec3>,
    twist_origin: Option<Quat>,
}

impl Anchor {
    pub fn new(pose: Pose) -> Self {
        Self {
            pose,
            drag_origin: None,
            twist_origin: None,
        }
    }

    pub fn pose(&self) -> Pose {
        self.pose
    }

    pub fn set_position(&mut self, position: Vec3) {
        self.pose.position = position;
    }

    pub fn set_rotation(&mut self, rotation: Quat) {
        self.pose.rotation = rotation;
    }

    /// Moves the anchor by `translation` from where the drag started.
    /// Only the X and Z components are applied, so the entity stays on its plane.
    pub fn drag(&mut self, translation: Vec3) {
        let origin = *self.drag_origin.get_or_insert(self.pose.position);
        self.pose.position = origin + Vec3::new(translation.x, 0.0, translation.z);
    }

    pub fn end_drag(&mut self) {
        self.drag_origin = None;
    }

    /// Turns the anchor about the vertical axis from where the twist started.
    pub fn twist(&mut self, radians: f32) {
        let origin = *self.twist_origin.get_or_insert(self.pose.rotation);
        self.pose.rotation = origin * Quat::from_rotation_y(-radians);
    }

    pub fn end_twist(&mut self) {
        self.twist_origin = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_drag_is_relative_to_start_and_ignores_height() {
        let mut anchor = Anchor::new(Pose::new(Vec3::new(1.0, 2.0, 3.0), Quat::IDENTITY));

        anchor.drag(Vec3::new(0.5, 9.0, -1.0));
        anchor.drag(Vec3::new(1.0, 9.0, -2.0));
        assert_eq!(anchor.pose().position, Vec3::new(2.0, 2.0, 1.0));

        anchor.end_drag();
        anchor.drag(Vec3::new(1.0, 0.0, 0.0));
        assert_eq!(anchor.pose().position, Vec3::new(3.0, 2.0, 1.0));
    }

    #[test]
    fn test_twist_is_relative_to_start() {
        let mut anchor = Anchor::default();

        anchor.twist(0.2);
        anchor.twist(0.4);
        let expected = Quat::from_rotation_y(-0.4);
        assert!(anchor.pose().rotation.abs_diff_eq(expected, 1e-5));

        anchor.end_twist();
        anchor.twist(0.1);
        let expected = Quat::from_rotation_y(-0.5);
        assert!(anchor.pose().rotation.abs_diff_eq(expected, 1e-5));
    }
}
