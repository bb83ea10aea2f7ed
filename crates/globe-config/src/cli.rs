//! Command-line argument parsing for the globe demo host.

use std::path::PathBuf;

use clap::Parser;

use crate::Config;

/// Globe demo command-line arguments.
///
/// CLI values override settings loaded from `config.ron`.
#[derive(Parser, Debug, Default)]
#[command(name = "globe-demo", about = "Headless rotating globe orientation demo")]
pub struct CliArgs {
    /// Track a fixed location instead of accepting drag input.
    #[arg(long)]
    pub fixed: bool,

    /// Always render the night face.
    #[arg(long)]
    pub force_night: bool,

    /// Target location latitude in degrees.
    #[arg(long, allow_hyphen_values = true, requires = "lon")]
    pub lat: Option<f64>,

    /// Target location longitude in degrees.
    #[arg(long, allow_hyphen_values = true, requires = "lat")]
    pub lon: Option<f64>,

    /// Number of frames to simulate.
    #[arg(long)]
    pub frames: Option<u32>,

    /// Simulated frame rate.
    #[arg(long)]
    pub fps: Option<u32>,

    /// Log level (error, warn, info, debug, trace).
    #[arg(long)]
    pub log_level: Option<String>,

    /// Path to config directory (overrides default location).
    #[arg(long)]
    pub config: Option<PathBuf>,
}

impl Config {
    /// Apply CLI overrides to a loaded config.
    ///
    /// Boolean flags can only switch a mode on; leaving them off keeps the
    /// value from the file.
    pub fn apply_cli_overrides(&mut self, args: &CliArgs) {
        if args.fixed {
            self.location.fixed = true;
        }
        if args.force_night {
            self.day_night.force_night = true;
        }
        if let (Some(lat), Some(lon)) = (args.lat, args.lon) {
            self.location.target_latitude = Some(lat);
            self.location.target_longitude = Some(lon);
        }
        if let Some(frames) = args.frames {
            self.demo.frames = frames;
        }
        if let Some(fps) = args.fps {
            self.demo.fps = fps;
        }
        if let Some(ref level) = args.log_level {
            self.debug.log_level = level.clone();
        }
    }
}
