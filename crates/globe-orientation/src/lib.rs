//! Orientation controller for a rotating globe.
//!
//! Blends idle auto-spin, drag-driven inertia with friction, and a smooth
//! transition toward a fixed geographic orientation into a single unit
//! quaternion per frame, and decides from real-world time and an optional
//! location whether the night face of the globe should be shown.

pub mod controller;
pub mod day_night;
pub mod drag;
pub mod frame_clock;
pub mod geolocation;
pub mod target;
pub mod tuning;

pub use controller::{FrameOutput, HostInputs, MotionPhase, OrientationController};
pub use day_night::{DayNightCache, SolarDay, is_night, is_night_by_clock, solar_events};
pub use drag::{DragState, DragStep, EventResponse, PointerEvent, drag_step};
pub use frame_clock::{FrameClock, MAX_FRAME_DELTA};
pub use geolocation::{
    FixedProvider, GeolocationError, GeolocationProvider, GeolocationRequest, LocationState,
    UnavailableProvider,
};
pub use target::{GeoCoordinate, GeoError, TargetCache, angular_distance, target_orientation};
pub use tuning::{Calibration, ControllerTuning, DayNightSettings};
