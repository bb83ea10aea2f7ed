//! Constants that shape the globe's motion and texture selection.

use glam::{Quat, Vec3};

/// Motion and calibration constants for [`OrientationController`].
///
/// [`OrientationController`]: crate::OrientationController
#[derive(Clone, Debug, PartialEq)]
pub struct ControllerTuning {
    /// Radians of rotation per pixel of pointer travel.
    pub drag_sensitivity: f32,
    /// Per-frame multiplier applied to residual spin. Must be in `(0, 1)`.
    pub friction: f32,
    /// Spin speed at or below which idle rotation takes over.
    pub velocity_threshold: f32,
    /// Idle auto-spin rate in radians per second.
    pub idle_rate: f32,
    /// Tilt of the idle spin axis away from the viewer's vertical, in radians.
    pub axial_tilt: f32,
    /// Slerp factor per second when tracking a fixed target.
    pub transition_speed: f32,
    /// Texture UV calibration.
    pub calibration: Calibration,
    /// Day/night fallback and refresh settings.
    pub day_night: DayNightSettings,
}

impl Default for ControllerTuning {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.005,
            friction: 0.98,
            velocity_threshold: 0.001,
            idle_rate: 0.1,
            axial_tilt: 23.4_f32.to_radians(),
            transition_speed: 1.0,
            calibration: Calibration::default(),
            day_night: DayNightSettings::default(),
        }
    }
}

impl ControllerTuning {
    /// The fixed tilt applied to the idle spin frame.
    pub fn axial_tilt_quat(&self) -> Quat {
        Quat::from_rotation_z(self.axial_tilt)
    }

    /// World vertical axis as tilted by [`axial_tilt_quat`](Self::axial_tilt_quat).
    pub fn idle_axis(&self) -> Vec3 {
        (self.axial_tilt_quat() * Vec3::Y).normalize()
    }
}

/// Offsets that align the globe texture's UV layout with geographic
/// latitude 0 / longitude 0. They belong to the texture, not the globe.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Calibration {
    /// Degrees subtracted from latitude before conversion.
    pub latitude_offset_deg: f64,
    /// Degrees added to longitude before conversion.
    pub longitude_offset_deg: f64,
}

impl Default for Calibration {
    fn default() -> Self {
        Self {
            latitude_offset_deg: 0.0,
            longitude_offset_deg: 90.0,
        }
    }
}

/// Settings for the day/night decision.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DayNightSettings {
    /// Local hour from which the clock fallback reports night.
    pub night_start_hour: u32,
    /// Local hour until which the clock fallback reports night.
    pub night_end_hour: u32,
    /// Seconds of frame time between re-evaluations; `0.0` re-evaluates only
    /// when the force flag or the location changes.
    pub recheck_interval_s: f64,
}

impl Default for DayNightSettings {
    fn default() -> Self {
        Self {
            night_start_hour: 18,
            night_end_hour: 6,
            recheck_interval_s: 60.0,
        }
    }
}
