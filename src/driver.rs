//! Rotation driver: steps armed rotations once per frame.

use std::sync::Arc;
use tracing::debug;

use crate::events::{BookEvent, EventBus};
use crate::models::{LeafIndex, LeafState};
use crate::storage::PageStore;

/// Advances every armed rotation by a fixed angular speed.
pub struct RotationDriver {
    store: Arc<dyn PageStore>,
    events: EventBus,
    tolerance: f32,
}

impl RotationDriver {
    pub fn new(store: Arc<dyn PageStore>, events: EventBus, tolerance: f32) -> Self {
        Self {
            store,
            events,
            tolerance,
        }
    }

    /// Runs one frame. Returns the leaves whose rotation landed during it.
    pub fn update(&self, dt: f32) -> Vec<LeafIndex> {
        assert!(
            dt.is_finite() && dt >= 0.0,
            "frame delta must be finite and non-negative, got {}",
            dt
        );

        let mut landed = Vec::new();
        for (index, leaf) in self.store.snapshot() {
            let done = step(&mut leaf.state(), dt, self.tolerance);
            if done {
                debug!(leaf = index, angle = leaf.angle(), "turn landed");
                self.events.publish(BookEvent::TurnFinished { leaf: index });
                landed.push(index);
            }
        }
        landed
    }
}

/// Moves one leaf toward its target. Returns true when the rotation landed.
///
/// Within `tolerance` of the target, or past it, the leaf snaps to the target
/// and the animation is cleared.
fn step(state: &mut LeafState, dt: f32, tolerance: f32) -> bool {
    let Some(animation) = state.animation else {
        return false;
    };

    let direction = animation.direction();
    let remaining = animation.target_angle - state.angle;
    if remaining.abs() <= tolerance || remaining * direction < 0.0 {
        state.angle = animation.target_angle;
        state.animation = None;
        return true;
    }

    state.angle += direction * animation.speed * dt;
    false
}
