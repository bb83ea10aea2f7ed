//! Translating loaded configuration into controller inputs.

use std::time::Duration;

use globe_config::Config;
use globe_orientation::{
    Calibration, ControllerTuning, DayNightSettings, FixedProvider, GeoCoordinate, GeoError,
    GeolocationRequest, HostInputs, UnavailableProvider,
};

/// Controller constants from the `controller` and `day_night` sections.
pub fn tuning_from_config(config: &Config) -> ControllerTuning {
    let c = &config.controller;
    let d = &config.day_night;
    ControllerTuning {
        drag_sensitivity: c.drag_sensitivity,
        friction: c.friction,
        velocity_threshold: c.velocity_threshold,
        idle_rate: c.idle_rate,
        axial_tilt: c.axial_tilt_deg.to_radians(),
        transition_speed: c.transition_speed,
        calibration: Calibration {
            latitude_offset_deg: c.latitude_offset_deg,
            longitude_offset_deg: c.longitude_offset_deg,
        },
        day_night: DayNightSettings {
            night_start_hour: d.night_start_hour,
            night_end_hour: d.night_end_hour,
            recheck_interval_s: d.recheck_interval_s,
        },
    }
}

/// Pair two optional degrees into a coordinate, if both are present.
fn coordinate(lat: Option<f64>, lon: Option<f64>) -> Result<Option<GeoCoordinate>, GeoError> {
    match (lat, lon) {
        (Some(lat), Some(lon)) => GeoCoordinate::new(lat, lon).map(Some),
        _ => Ok(None),
    }
}

/// Mode flags and target override as the host would supply them.
pub fn inputs_from_config(config: &Config) -> Result<HostInputs, GeoError> {
    Ok(HostInputs {
        is_fixed: config.location.fixed,
        force_night: config.day_night.force_night,
        target_location: coordinate(
            config.location.target_latitude,
            config.location.target_longitude,
        )?,
    })
}

/// Start the simulated device lookup: it reports the configured device
/// position after the configured delay, or fails when none is set.
pub fn start_device_lookup(config: &Config) -> Result<GeolocationRequest, GeoError> {
    let l = &config.location;
    let request = match coordinate(l.device_latitude, l.device_longitude)? {
        Some(coord) => GeolocationRequest::spawn(FixedProvider::with_delay(
            coord,
            Duration::from_millis(l.device_delay_ms),
        )),
        None => GeolocationRequest::spawn(UnavailableProvider::default()),
    };
    Ok(request)
}
