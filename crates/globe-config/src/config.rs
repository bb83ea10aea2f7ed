//! Configuration structs with sensible defaults and RON persistence.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// File name used inside the config directory.
const CONFIG_FILE: &str = "config.ron";

/// Top-level configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Orientation controller tuning.
    pub controller: ControllerConfig,
    /// Day/night texture selection.
    pub day_night: DayNightConfig,
    /// Fixed mode and location sources.
    pub location: LocationConfig,
    /// Headless demo host settings.
    pub demo: DemoConfig,
    /// Debug/development settings.
    pub debug: DebugConfig,
}

/// Motion constants for the orientation controller.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ControllerConfig {
    /// Radians of rotation per pixel of pointer travel.
    pub drag_sensitivity: f32,
    /// Per-frame multiplier applied to residual spin (< 1).
    pub friction: f32,
    /// Spin speed below which the globe falls back to idle rotation.
    pub velocity_threshold: f32,
    /// Idle auto-spin rate in radians per second.
    pub idle_rate: f32,
    /// Axial tilt of the idle spin axis in degrees.
    pub axial_tilt_deg: f32,
    /// Slerp factor per second when tracking a fixed target.
    pub transition_speed: f32,
    /// Texture calibration offset subtracted from latitude, in degrees.
    pub latitude_offset_deg: f64,
    /// Texture calibration offset added to longitude, in degrees.
    pub longitude_offset_deg: f64,
}

/// Day/night determination settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DayNightConfig {
    /// Always render the night face.
    pub force_night: bool,
    /// Local hour at which the clock fallback starts treating time as night.
    pub night_start_hour: u32,
    /// Local hour at which the clock fallback stops treating time as night.
    pub night_end_hour: u32,
    /// Seconds of frame time between re-evaluations (0 = only on input change).
    pub recheck_interval_s: f64,
}

/// Fixed mode and location sources.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LocationConfig {
    /// Start in fixed mode (drag disabled, globe tracks a location).
    pub fixed: bool,
    /// Target location latitude override in degrees.
    pub target_latitude: Option<f64>,
    /// Target location longitude override in degrees.
    pub target_longitude: Option<f64>,
    /// Latitude reported by the simulated device geolocation provider.
    pub device_latitude: Option<f64>,
    /// Longitude reported by the simulated device geolocation provider.
    pub device_longitude: Option<f64>,
    /// Simulated latency of the device lookup in milliseconds.
    pub device_delay_ms: u64,
}

/// Headless demo host settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DemoConfig {
    /// Number of frames to simulate.
    pub frames: u32,
    /// Simulated frame rate.
    pub fps: u32,
    /// Play a scripted drag gesture at the start of the run.
    pub scripted_drag: bool,
    /// Log a status line every this many frames.
    pub report_every: u32,
}

/// Debug/development settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DebugConfig {
    /// Log level filter (e.g., "debug", "info", "globe_orientation=trace").
    pub log_level: String,
    /// Also write JSON logs to a file in debug builds.
    pub log_to_file: bool,
}

// --- Default implementations ---

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            drag_sensitivity: 0.005,
            friction: 0.98,
            velocity_threshold: 0.001,
            idle_rate: 0.1,
            axial_tilt_deg: 23.4,
            transition_speed: 1.0,
            latitude_offset_deg: 0.0,
            longitude_offset_deg: 90.0,
        }
    }
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            force_night: false,
            night_start_hour: 18,
            night_end_hour: 6,
            recheck_interval_s: 60.0,
        }
    }
}

impl Default for DemoConfig {
    fn default() -> Self {
        Self {
            frames: 600,
            fps: 60,
            scripted_drag: true,
            report_every: 60,
        }
    }
}

impl Default for DebugConfig {
    fn default() -> Self {
        Self {
            log_level: "info".to_string(),
            log_to_file: false,
        }
    }
}

/// Platform config directory for the globe (`<config_dir>/globe`), or the
/// current directory when the platform has none.
pub fn default_config_dir() -> PathBuf {
    dirs::config_dir()
        .map(|dir| dir.join("globe"))
        .unwrap_or_else(|| PathBuf::from("."))
}

// --- Validation ---

impl Config {
    /// Check that values are inside the ranges the controller can use.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let c = &self.controller;
        if !(c.drag_sensitivity.is_finite() && c.drag_sensitivity > 0.0) {
            return Err(invalid("controller.drag_sensitivity", "must be positive"));
        }
        if !(c.friction > 0.0 && c.friction < 1.0) {
            return Err(invalid("controller.friction", "must be in (0, 1)"));
        }
        if !(c.velocity_threshold.is_finite() && c.velocity_threshold > 0.0) {
            return Err(invalid("controller.velocity_threshold", "must be positive"));
        }
        if !c.idle_rate.is_finite() {
            return Err(invalid("controller.idle_rate", "must be finite"));
        }
        if !(c.transition_speed.is_finite() && c.transition_speed >= 0.0) {
            return Err(invalid("controller.transition_speed", "must be non-negative"));
        }

        let d = &self.day_night;
        if d.night_start_hour > 24 || d.night_end_hour > 24 {
            return Err(invalid("day_night", "hours must be within 0..=24"));
        }
        if d.night_end_hour >= d.night_start_hour {
            return Err(invalid(
                "day_night.night_end_hour",
                "must be earlier than night_start_hour",
            ));
        }
        if !(d.recheck_interval_s.is_finite() && d.recheck_interval_s >= 0.0) {
            return Err(invalid("day_night.recheck_interval_s", "must be non-negative"));
        }

        let l = &self.location;
        for (field, lat) in [
            ("location.target_latitude", l.target_latitude),
            ("location.device_latitude", l.device_latitude),
        ] {
            if let Some(lat) = lat
                && !(-90.0..=90.0).contains(&lat)
            {
                return Err(invalid(field, "must be within [-90, 90]"));
            }
        }
        for (field, lon) in [
            ("location.target_longitude", l.target_longitude),
            ("location.device_longitude", l.device_longitude),
        ] {
            if let Some(lon) = lon
                && !(-180.0..=180.0).contains(&lon)
            {
                return Err(invalid(field, "must be within [-180, 180]"));
            }
        }

        if self.demo.fps == 0 {
            return Err(invalid("demo.fps", "must be at least 1"));
        }
        Ok(())
    }
}

fn invalid(field: &'static str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field,
        reason: reason.to_string(),
    }
}

// --- Load / Save / Reload ---

impl Config {
    /// Load config from the given directory, or create a default config file.
    pub fn load_or_create(config_dir: &Path) -> Result<Self, ConfigError> {
        let config_path = config_dir.join(CONFIG_FILE);

        if config_path.exists() {
            let contents = std::fs::read_to_string(&config_path).map_err(ConfigError::ReadError)?;
            let config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
            config.validate()?;
            log::info!("Loaded config from {}", config_path.display());
            Ok(config)
        } else {
            let config = Config::default();
            config.save(config_dir)?;
            log::info!("Created default config at {}", config_path.display());
            Ok(config)
        }
    }

    /// Save config to the given directory as `config.ron`.
    pub fn save(&self, config_dir: &Path) -> Result<(), ConfigError> {
        std::fs::create_dir_all(config_dir).map_err(ConfigError::WriteError)?;

        let pretty = ron::ser::PrettyConfig::new()
            .depth_limit(3)
            .separate_tuple_members(true)
            .enumerate_arrays(false);
        let serialized =
            ron::ser::to_string_pretty(self, pretty).map_err(ConfigError::SerializeError)?;

        std::fs::write(config_dir.join(CONFIG_FILE), serialized)
            .map_err(ConfigError::WriteError)?;
        Ok(())
    }

    /// Hot-reload: returns `Some(new_config)` if the file changed, `None` otherwise.
    pub fn reload(&self, config_dir: &Path) -> Result<Option<Self>, ConfigError> {
        let contents = std::fs::read_to_string(config_dir.join(CONFIG_FILE))
            .map_err(ConfigError::ReadError)?;
        let new_config: Config = ron::from_str(&contents).map_err(ConfigError::ParseError)?;
        new_config.validate()?;

        if &new_config != self {
            log::info!("Config reloaded with changes");
            Ok(Some(new_config))
        } else {
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        Config::default().validate().unwrap();
    }

    #[test]
    fn test_default_config_serializes() {
        let config = Config::default();
        let ron_str =
            ron::ser::to_string_pretty(&config, ron::ser::PrettyConfig::new().depth_limit(3))
                .unwrap();
        assert!(ron_str.contains("friction: 0.98"));
        assert!(ron_str.contains("night_start_hour: 18"));
    }

    #[test]
    fn test_missing_section_uses_default() {
        let ron_str = "(controller: (friction: 0.9))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert!((config.controller.friction - 0.9).abs() < f32::EPSILON);
        assert_eq!(config.controller.drag_sensitivity, 0.005);
        assert_eq!(config.day_night, DayNightConfig::default());
    }

    #[test]
    fn test_extra_field_ignored() {
        let result: Result<Config, _> = ron::from_str("(spin_mode: \"wild\")");
        assert!(result.is_ok());
    }

    #[test]
    fn test_optional_location_parses() {
        let ron_str = "(location: (fixed: true, target_latitude: Some(51.5), target_longitude: Some(-0.12)))";
        let config: Config = ron::from_str(ron_str).unwrap();
        assert!(config.location.fixed);
        assert_eq!(config.location.target_latitude, Some(51.5));
        assert_eq!(config.location.device_latitude, None);
    }

    #[test]
    fn test_friction_out_of_range_rejected() {
        let mut config = Config::default();
        config.controller.friction = 1.0;
        let err = config.validate().unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "controller.friction",
                ..
            }
        ));
    }

    #[test]
    fn test_inverted_night_hours_rejected() {
        let mut config = Config::default();
        config.day_night.night_start_hour = 5;
        config.day_night.night_end_hour = 7;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_equal_night_hours_rejected() {
        let mut config = Config::default();
        config.day_night.night_start_hour = 0;
        config.day_night.night_end_hour = 0;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue {
                field: "day_night.night_end_hour",
                ..
            })
        ));
    }

    #[test]
    fn test_latitude_out_of_range_rejected() {
        let mut config = Config::default();
        config.location.target_latitude = Some(95.0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = Config::default();
        config.location.fixed = true;
        config.location.target_latitude = Some(35.68);
        config.location.target_longitude = Some(139.69);

        config.save(dir.path()).unwrap();
        let loaded = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, loaded);
    }

    #[test]
    fn test_load_creates_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_create(dir.path()).unwrap();
        assert_eq!(config, Config::default());
        assert!(dir.path().join("config.ron").exists());
    }

    #[test]
    fn test_load_rejects_invalid_values() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(
            dir.path().join("config.ron"),
            "(controller: (friction: 2.0))",
        )
        .unwrap();
        let result = Config::load_or_create(dir.path());
        assert!(matches!(result, Err(ConfigError::InvalidValue { .. })));
    }

    #[test]
    fn test_reload_detects_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();

        let mut modified = config.clone();
        modified.day_night.force_night = true;
        modified.save(dir.path()).unwrap();

        let result = config.reload(dir.path()).unwrap();
        assert!(result.unwrap().day_night.force_night);
    }

    #[test]
    fn test_reload_no_changes() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::default();
        config.save(dir.path()).unwrap();
        assert!(config.reload(dir.path()).unwrap().is_none());
    }

    #[test]
    fn test_invalid_ron_produces_error() {
        let result: Result<Config, _> = ron::from_str("{{not valid}}");
        assert!(result.is_err());
    }
}
