//! Geographic coordinates and the globe orientation that faces them.

use glam::{EulerRot, Quat};

use crate::tuning::Calibration;

/// Errors from constructing a [`GeoCoordinate`].
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeoError {
    /// Latitude or longitude is NaN or infinite.
    #[error("coordinate is not finite: ({latitude}, {longitude})")]
    NotFinite {
        /// Offending latitude.
        latitude: f64,
        /// Offending longitude.
        longitude: f64,
    },
    /// Latitude outside `[-90, 90]`.
    #[error("latitude {0} is outside [-90, 90]")]
    LatitudeOutOfRange(f64),
    /// Longitude outside `[-180, 180]`.
    #[error("longitude {0} is outside [-180, 180]")]
    LongitudeOutOfRange(f64),
}

/// A point on Earth in degrees. East and north are positive.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct GeoCoordinate {
    /// Degrees north of the equator.
    pub latitude: f64,
    /// Degrees east of Greenwich.
    pub longitude: f64,
}

impl GeoCoordinate {
    /// Validated constructor.
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, GeoError> {
        if !latitude.is_finite() || !longitude.is_finite() {
            return Err(GeoError::NotFinite {
                latitude,
                longitude,
            });
        }
        if !(-90.0..=90.0).contains(&latitude) {
            return Err(GeoError::LatitudeOutOfRange(latitude));
        }
        if !(-180.0..=180.0).contains(&longitude) {
            return Err(GeoError::LongitudeOutOfRange(longitude));
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// Constructor for known-good constants.
    pub const fn new_unchecked(latitude: f64, longitude: f64) -> Self {
        Self {
            latitude,
            longitude,
        }
    }
}

/// Orientation that brings `coord` to face the viewer, given the texture's
/// calibration offsets.
///
/// Equivalent to the Euler rotation `(lat_angle, lon_angle, 0)` in XYZ order.
pub fn target_orientation(coord: GeoCoordinate, calibration: &Calibration) -> Quat {
    let lat_angle = (coord.latitude - calibration.latitude_offset_deg).to_radians();
    let lon_angle = -(coord.longitude + calibration.longitude_offset_deg).to_radians();
    Quat::from_euler(EulerRot::XYZ, lat_angle as f32, lon_angle as f32, 0.0).normalize()
}

/// Shortest rotation angle in radians between two orientations.
pub fn angular_distance(a: Quat, b: Quat) -> f32 {
    // atan2 keeps precision for tiny angles, where acos(dot) does not.
    let relative = a.conjugate() * b;
    2.0 * relative.xyz().length().atan2(relative.w.abs())
}

/// Memoized fixed-mode target, recomputed only when the mode or the
/// location changes.
#[derive(Clone, Debug, Default)]
pub struct TargetCache {
    key: Option<(bool, Option<GeoCoordinate>)>,
    value: Option<Quat>,
    recomputations: u32,
}

impl TargetCache {
    /// The target for the given inputs, or `None` when not fixed or when no
    /// location is known.
    pub fn get(
        &mut self,
        is_fixed: bool,
        location: Option<GeoCoordinate>,
        calibration: &Calibration,
    ) -> Option<Quat> {
        let key = (is_fixed, location);
        if self.key != Some(key) {
            self.value = match location {
                Some(coord) if is_fixed => Some(target_orientation(coord, calibration)),
                _ => None,
            };
            self.key = Some(key);
            self.recomputations += 1;
        }
        self.value
    }

    /// Last computed target without touching the key.
    pub fn current(&self) -> Option<Quat> {
        self.value
    }

    /// How many times the target has been derived.
    pub fn recomputations(&self) -> u32 {
        self.recomputations
    }

    /// Forget the memoized value.
    pub fn invalidate(&mut self) {
        self.key = None;
        self.value = None;
    }
}
