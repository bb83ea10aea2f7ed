//! Pointer-drag tracking and the rotation a single drag step produces.
//!
//! Screen-space deltas map to small world-space rotations: vertical pointer
//! travel tilts the globe about the viewer's horizontal (X) axis, horizontal
//! travel spins it about the viewer's vertical (Y) axis.

use glam::{Quat, Vec2, Vec3};

/// A pointer event forwarded by the host.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum PointerEvent {
    /// Button pressed at a screen position.
    Down(Vec2),
    /// Pointer moved to a screen position.
    Move(Vec2),
    /// Button released.
    Up,
    /// Pointer left the drag surface.
    Leave,
}

/// How the controller dealt with a [`PointerEvent`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum EventResponse {
    /// The event had no effect (fixed mode, or no drag in progress).
    Ignored,
    /// The event updated drag state.
    Handled,
    /// A drag started; the host should stop the event from reaching
    /// underlying controls such as page scroll.
    StopPropagation,
}

impl EventResponse {
    /// Whether the host should stop propagating the event.
    pub fn stops_propagation(self) -> bool {
        self == EventResponse::StopPropagation
    }
}

/// Drag gesture in progress, if any.
///
/// Only the last pointer position is stored, so "active" and "has a last
/// position" cannot disagree.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DragState {
    last_position: Option<Vec2>,
}

impl DragState {
    /// Start a drag at `pos`.
    pub fn begin(&mut self, pos: Vec2) {
        self.last_position = Some(pos);
    }

    /// Record a new pointer position and return the delta from the previous
    /// one, or `None` when no drag is active.
    pub fn advance(&mut self, pos: Vec2) -> Option<Vec2> {
        let last = self.last_position.as_mut()?;
        let delta = pos - *last;
        *last = pos;
        Some(delta)
    }

    /// End the drag.
    pub fn clear(&mut self) {
        self.last_position = None;
    }

    /// Whether a drag is in progress.
    pub fn is_active(&self) -> bool {
        self.last_position.is_some()
    }

    /// Pointer position recorded by the last down/move event.
    pub fn last_position(&self) -> Option<Vec2> {
        self.last_position
    }
}

/// Result of converting one pointer delta into motion.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DragStep {
    /// Incremental rotation to pre-multiply into the orientation.
    pub rotation: Quat,
    /// Residual spin implied by this step alone.
    pub angular_velocity: Vec3,
}

/// Convert a screen-space pointer delta into a world-space rotation step.
pub fn drag_step(delta: Vec2, sensitivity: f32) -> DragStep {
    let angle_x = delta.y * sensitivity;
    let angle_y = delta.x * sensitivity;

    let rotation = Quat::from_rotation_x(angle_x) * Quat::from_rotation_y(angle_y);

    let spin = Vec3::new(angle_x, angle_y, 0.0);
    let speed = (angle_x * angle_x + angle_y * angle_y).sqrt();
    let angular_velocity = spin.normalize_or_zero() * speed;

    DragStep {
        rotation: rotation.normalize(),
        angular_velocity,
    }
}
