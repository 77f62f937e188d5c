//! Leaf data models.

use glam::{Quat, Vec3};
use parking_lot::{Mutex, MutexGuard};
use std::f32::consts::PI;
use uuid::Uuid;

use super::image::Texture;

/// Axis every leaf hinges around.
pub const SPINE_AXIS: Vec3 = Vec3::Z;

/// Position and rotation relative to a parent frame.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Quat,
}

impl Pose {
    pub fn new(position: Vec3, rotation: Quat) -> Self {
        Self { position, rotation }
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
        }
    }
}

/// What a surface is painted with.
#[derive(Debug, Clone)]
pub enum Material {
    Textured(Texture),
    /// Transparent tint, used for missing pages and failed loads.
    Blank,
}

impl Material {
    pub fn is_blank(&self) -> bool {
        matches!(self, Material::Blank)
    }

    pub fn texture(&self) -> Option<&Texture> {
        match self {
            Material::Textured(texture) => Some(texture),
            Material::Blank => None,
        }
    }
}

/// One visible face of a leaf.
#[derive(Debug, Clone)]
pub struct Surface {
    pub material: Material,
    pub width: f32,
    pub height: f32,
    /// Offset from the spine so the plane's edge sits on it.
    pub offset: Vec3,
    pub rotation: Quat,
}

impl Surface {
    pub fn front(material: Material, width: f32, height: f32) -> Self {
        Self {
            material,
            width,
            height,
            offset: Vec3::new(width / 2.0, 0.0, 0.0),
            rotation: Quat::IDENTITY,
        }
    }

    /// The back face: the front mirrored half a turn about the spine.
    pub fn back(material: Material, width: f32, height: f32) -> Self {
        Self {
            material,
            width,
            height,
            offset: Vec3::new(width / 2.0, 0.0, 0.0),
            rotation: Quat::from_axis_angle(SPINE_AXIS, -PI),
        }
    }
}

/// Which side of the spine a leaf rests on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Left,
    Right,
}

impl Side {
    /// Resting angle about the spine.
    pub fn angle(&self) -> f32 {
        match self {
            Side::Left => PI,
            Side::Right => 0.0,
        }
    }
}

/// An armed turn animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RotationAnimation {
    pub target_angle: f32,
    pub axis: Vec3,
    pub speed: f32,
}

impl RotationAnimation {
    pub fn new(target_angle: f32, axis: Vec3, speed: f32) -> Self {
        Self {
            target_angle,
            axis,
            speed,
        }
    }

    /// +1 when the animation opens the angle about the spine, -1 when it closes it.
    pub fn direction(&self) -> f32 {
        if self.axis.dot(SPINE_AXIS) < 0.0 {
            -1.0
        } else {
            1.0
        }
    }
}

/// Mutable part of a leaf, shared between turn tasks and the update loop.
#[derive(Debug, Clone)]
pub struct LeafState {
    /// Angle about the spine axis; 0 rests right, pi rests left.
    pub angle: f32,
    pub animation: Option<RotationAnimation>,
}

/// One physical page with a front and a back surface.
#[derive(Debug)]
pub struct Leaf {
    id: Uuid,
    front: Surface,
    back: Surface,
    state: Mutex<LeafState>,
}

impl Leaf {
    /// Creates an unattached leaf resting on the right.
    pub fn new(front: Surface, back: Surface) -> Self {
        Self {
            id: Uuid::new_v4(),
            front,
            back,
            state: Mutex::new(LeafState {
                angle: Side::Right.angle(),
                animation: None,
            }),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn front(&self) -> &Surface {
        &self.front
    }

    pub fn back(&self) -> &Surface {
        &self.back
    }

    /// Current angle about the spine.
    pub fn angle(&self) -> f32 {
        self.state.lock().angle
    }

    /// Pose relative to the book anchor. Leaves hinge on the spine at the origin.
    pub fn pose(&self) -> Pose {
        Pose::new(Vec3::ZERO, Quat::from_axis_angle(SPINE_AXIS, self.angle()))
    }

    /// Places the leaf at rest on one side of the spine.
    pub fn rest_on(&self, side: Side) {
        self.state.lock().angle = side.angle();
    }

    pub fn is_animating(&self) -> bool {
        self.state.lock().animation.is_some()
    }

    pub fn animation(&self) -> Option<RotationAnimation> {
        self.state.lock().animation
    }

    /// Arms a rotation unless one is already running. Returns whether it was armed.
    pub fn arm(&self, animation: RotationAnimation) -> bool {
        let mut state = self.state.lock();
        if state.animation.is_some() {
            return false;
        }
        state.animation = Some(animation);
        true
    }

    pub(crate) fn state(&self) -> MutexGuard<'_, LeafState> {
        self.state.lock()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blank_leaf() -> Leaf {
        Leaf::new(
            Surface::front(Material::Blank, 1.0, 1.5),
            Surface::back(Material::Blank, 1.0, 1.5),
        )
    }

    #[test]
    fn test_arm_refuses_second_animation() {
        let leaf = blank_leaf();
        assert!(leaf.arm(RotationAnimation::new(PI, Vec3::Z, 3.0)));
        assert!(!leaf.arm(RotationAnimation::new(0.0, Vec3::NEG_Z, 3.0)));
        assert_eq!(leaf.animation().unwrap().target_angle, PI);
    }

    #[test]
    fn test_back_surface_mirrors_front() {
        let leaf = blank_leaf();
        assert_eq!(leaf.front().offset, leaf.back().offset);
        let flipped = leaf.back().rotation * Vec3::X;
        assert!((flipped - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_rest_on_left_faces_back_up() {
        let leaf = blank_leaf();
        leaf.rest_on(Side::Left);
        assert_eq!(leaf.angle(), PI);
        assert_eq!(leaf.pose().position, Vec3::ZERO);
        let edge = leaf.pose().rotation * Vec3::X;
        assert!((edge - Vec3::NEG_X).length() < 1e-5);
    }

    #[test]
    fn test_animation_direction_follows_axis() {
        assert_eq!(RotationAnimation::new(PI, Vec3::Z, 3.0).direction(), 1.0);
        assert_eq!(RotationAnimation::new(0.0, Vec3::NEG_Z, 3.0).direction(), -1.0);
    }
}
