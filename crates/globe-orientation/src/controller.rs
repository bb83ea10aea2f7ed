//! The orientation controller: one owner for the globe's rotation state.
//!
//! Three motion sources compete for the orientation each frame, in priority
//! order:
//!
//! 1. **Tracking** a fixed geographic target (fixed mode with a known
//!    location): exponential slerp toward the target.
//! 2. **Dragging**: the pointer handlers already rotated the globe, so the
//!    frame leaves it alone.
//! 3. **Coasting / idle**: residual spin from the last drag decays by
//!    friction; once it is negligible the globe auto-spins about its tilted
//!    axis.
//!
//! Every incremental rotation is pre-multiplied (applied in world space), so
//! drags and idle spin act relative to the viewer no matter how the globe is
//! currently turned.

use chrono::{DateTime, FixedOffset, Local};
use glam::{Quat, Vec2, Vec3};
use tracing::{debug, trace, warn};

use crate::day_night::DayNightCache;
use crate::drag::{DragState, EventResponse, PointerEvent, drag_step};
use crate::geolocation::{GeolocationRequest, LocationState};
use crate::target::{GeoCoordinate, TargetCache};
use crate::tuning::ControllerTuning;

/// Per-frame inputs owned by the host.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct HostInputs {
    /// Disable dragging and track a location instead.
    pub is_fixed: bool,
    /// Always render the night face.
    pub force_night: bool,
    /// Location that takes precedence over the device position.
    pub target_location: Option<GeoCoordinate>,
}

/// Which motion branch the last frame took.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum MotionPhase {
    /// Slerping toward a fixed target.
    Tracking,
    /// A drag is in progress.
    Dragging,
    /// Residual drag spin is decaying.
    Coasting,
    /// Constant auto-spin.
    #[default]
    Idle,
}

/// What the renderer consumes each frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct FrameOutput {
    /// Unit quaternion for the globe mesh.
    pub orientation: Quat,
    /// Whether to bind the night texture.
    pub use_night_texture: bool,
}

/// Owns the globe's orientation, spin, drag and location state.
///
/// Pointer handlers and [`tick`](Self::tick) both read-modify-write the
/// orientation; a multi-threaded host must serialize them, e.g. by keeping
/// the controller on one thread or behind a mutex.
#[derive(Debug)]
pub struct OrientationController {
    tuning: ControllerTuning,
    orientation: Quat,
    angular_velocity: Vec3,
    drag: DragState,
    inputs: HostInputs,
    location: LocationState,
    geolocation: Option<GeolocationRequest>,
    target: TargetCache,
    day_night: DayNightCache,
    phase: MotionPhase,
}

impl Default for OrientationController {
    fn default() -> Self {
        Self::new(ControllerTuning::default())
    }
}

impl OrientationController {
    /// A controller at rest, tilted by the axial tilt, with no location.
    pub fn new(tuning: ControllerTuning) -> Self {
        let orientation = tuning.axial_tilt_quat();
        Self {
            tuning,
            orientation,
            angular_velocity: Vec3::ZERO,
            drag: DragState::default(),
            inputs: HostInputs::default(),
            location: LocationState::Unknown,
            geolocation: None,
            target: TargetCache::default(),
            day_night: DayNightCache::default(),
            phase: MotionPhase::Idle,
        }
    }

    /// Builder form of [`start_geolocation`](Self::start_geolocation).
    pub fn with_geolocation(mut self, request: GeolocationRequest) -> Self {
        self.start_geolocation(request);
        self
    }

    /// Hand over a device lookup. Its result is picked up by a later tick.
    pub fn start_geolocation(&mut self, request: GeolocationRequest) {
        self.location = LocationState::Pending;
        self.geolocation = Some(request);
    }

    /// Update the host-owned mode flags and target override.
    ///
    /// Entering fixed mode ends any drag in progress, since pointer events
    /// are ignored from then on and could never release it.
    pub fn set_inputs(&mut self, inputs: HostInputs) {
        if inputs.is_fixed != self.inputs.is_fixed {
            debug!(fixed = inputs.is_fixed, "Fixed mode changed");
            if inputs.is_fixed && self.drag.is_active() {
                debug!("Clearing drag on entry to fixed mode");
                self.drag.clear();
            }
        }
        if inputs.target_location != self.inputs.target_location {
            debug!(target = ?inputs.target_location, "Target location changed");
        }
        self.inputs = inputs;
    }

    /// Replace the tuning constants. Cached target and night flag are
    /// re-derived on the next tick.
    pub fn set_tuning(&mut self, tuning: ControllerTuning) {
        self.tuning = tuning;
        self.target.invalidate();
        self.day_night.invalidate();
    }

    // ── Pointer input ──────────────────────────────────────────────

    /// Dispatch a pointer event to the matching handler.
    pub fn handle_pointer(&mut self, event: PointerEvent) -> EventResponse {
        match event {
            PointerEvent::Down(pos) => self.on_pointer_down(pos),
            PointerEvent::Move(pos) => self.on_pointer_move(pos),
            PointerEvent::Up => self.on_pointer_up(),
            PointerEvent::Leave => self.on_pointer_leave(),
        }
    }

    /// Start a drag. The host should stop propagation when told to.
    pub fn on_pointer_down(&mut self, pos: Vec2) -> EventResponse {
        if self.inputs.is_fixed {
            return EventResponse::Ignored;
        }
        self.drag.begin(pos);
        EventResponse::StopPropagation
    }

    /// Rotate by the pointer delta and re-derive the residual spin.
    pub fn on_pointer_move(&mut self, pos: Vec2) -> EventResponse {
        if self.inputs.is_fixed {
            return EventResponse::Ignored;
        }
        let Some(delta) = self.drag.advance(pos) else {
            return EventResponse::Ignored;
        };
        let step = drag_step(delta, self.tuning.drag_sensitivity);
        self.rotate_world(step.rotation);
        self.angular_velocity = step.angular_velocity;
        EventResponse::Handled
    }

    /// End the drag; the residual spin keeps the globe coasting.
    pub fn on_pointer_up(&mut self) -> EventResponse {
        if self.inputs.is_fixed || !self.drag.is_active() {
            return EventResponse::Ignored;
        }
        self.drag.clear();
        EventResponse::Handled
    }

    /// Same as releasing the button.
    pub fn on_pointer_leave(&mut self) -> EventResponse {
        self.on_pointer_up()
    }

    // ── Frame update ───────────────────────────────────────────────

    /// Advance one frame using the local wall clock for day/night.
    pub fn tick(&mut self, delta: f32) -> FrameOutput {
        self.tick_at(delta, Local::now().fixed_offset())
    }

    /// Advance one frame of `delta` seconds at the instant `now`.
    ///
    /// `now`'s offset is taken as the viewer's local civil time.
    pub fn tick_at(&mut self, delta: f32, now: DateTime<FixedOffset>) -> FrameOutput {
        let delta = if delta.is_finite() { delta.max(0.0) } else { 0.0 };

        self.poll_geolocation();
        let location = self.effective_location();

        let target = self
            .target
            .get(self.inputs.is_fixed, location, &self.tuning.calibration);
        let phase = match target {
            Some(target) => {
                let t = (delta * self.tuning.transition_speed).clamp(0.0, 1.0);
                self.orientation = self.orientation.slerp(target, t).normalize();
                MotionPhase::Tracking
            }
            None if self.drag.is_active() => MotionPhase::Dragging,
            None => self.coast_or_idle(delta),
        };
        self.set_phase(phase);

        let night = self.day_night.evaluate(
            self.inputs.force_night,
            location,
            now,
            f64::from(delta),
            &self.tuning.day_night,
        );

        FrameOutput {
            orientation: self.orientation,
            use_night_texture: night,
        }
    }

    fn coast_or_idle(&mut self, delta: f32) -> MotionPhase {
        let speed = self.angular_velocity.length();
        if speed > self.tuning.velocity_threshold {
            let axis = self.angular_velocity / speed;
            self.rotate_world(Quat::from_axis_angle(axis, speed * delta));
            self.angular_velocity *= self.tuning.friction;
            MotionPhase::Coasting
        } else {
            let spin = Quat::from_axis_angle(self.tuning.idle_axis(), self.tuning.idle_rate * delta);
            self.rotate_world(spin);
            MotionPhase::Idle
        }
    }

    /// Pre-multiply `rotation` so it acts in the viewer's frame.
    fn rotate_world(&mut self, rotation: Quat) {
        self.orientation = (rotation * self.orientation).normalize();
    }

    fn set_phase(&mut self, phase: MotionPhase) {
        if phase != self.phase {
            trace!(from = ?self.phase, to = ?phase, "Motion phase changed");
            self.phase = phase;
        }
    }

    fn poll_geolocation(&mut self) {
        let Some(request) = self.geolocation.as_mut() else {
            return;
        };
        match request.poll() {
            None => {}
            Some(Ok(coord)) => {
                debug!(
                    latitude = coord.latitude,
                    longitude = coord.longitude,
                    "Device location resolved"
                );
                self.location = LocationState::Known(coord);
                self.geolocation = None;
            }
            Some(Err(err)) => {
                warn!(%err, "Device location unavailable, using fallbacks");
                self.location = LocationState::Unknown;
                self.geolocation = None;
            }
        }
    }

    /// Return to the initial tilted orientation with no spin and no drag.
    pub fn reset(&mut self) {
        self.orientation = self.tuning.axial_tilt_quat();
        self.angular_velocity = Vec3::ZERO;
        self.drag.clear();
        self.phase = MotionPhase::Idle;
    }

    // ── Queries ────────────────────────────────────────────────────

    /// Current orientation (unit quaternion).
    pub fn orientation(&self) -> Quat {
        self.orientation
    }

    /// Residual spin: axis scaled by speed.
    pub fn angular_velocity(&self) -> Vec3 {
        self.angular_velocity
    }

    /// Whether a drag is in progress.
    pub fn is_dragging(&self) -> bool {
        self.drag.is_active()
    }

    /// The drag state, for hosts that draw a grab cursor.
    pub fn drag_state(&self) -> &DragState {
        &self.drag
    }

    /// Device location state.
    pub fn location(&self) -> LocationState {
        self.location
    }

    /// Target override if set, else the device location if known.
    pub fn effective_location(&self) -> Option<GeoCoordinate> {
        self.inputs
            .target_location
            .or_else(|| self.location.coordinate())
    }

    /// Night flag as of the last tick.
    pub fn use_night_texture(&self) -> bool {
        self.day_night.is_night()
    }

    /// Fixed-mode target as of the last tick.
    pub fn target(&self) -> Option<Quat> {
        self.target.current()
    }

    /// Branch taken by the last tick.
    pub fn motion_phase(&self) -> MotionPhase {
        self.phase
    }

    /// Current host inputs.
    pub fn inputs(&self) -> HostInputs {
        self.inputs
    }

    /// Current tuning.
    pub fn tuning(&self) -> &ControllerTuning {
        &self.tuning
    }
}
