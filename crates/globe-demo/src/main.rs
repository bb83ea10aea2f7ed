//! Headless host that drives the globe orientation controller.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI
//! flags. The demo paces frames at the configured rate, optionally plays a
//! scripted drag, and logs the orientation and day/night flag as it goes.
//!
//! `cargo run -p globe-demo -- --fixed --lat 48.85 --lon 2.35` tracks Paris.

mod script;
mod setup;

use std::time::Duration;

use clap::Parser;
use globe_config::{CliArgs, Config, default_config_dir};
use globe_orientation::{FrameClock, MotionPhase, OrientationController, angular_distance};
use tracing::{error, info};

use crate::script::PointerScript;

fn main() {
    let args = CliArgs::parse();

    let config_dir = args.config.clone().unwrap_or_else(default_config_dir);

    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args);

    let log_dir = config_dir.join("logs");
    globe_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if let Err(e) = config.validate() {
        error!("{e}");
        std::process::exit(2);
    }

    let inputs = match setup::inputs_from_config(&config) {
        Ok(inputs) => inputs,
        Err(e) => {
            error!("Invalid target location: {e}");
            std::process::exit(2);
        }
    };

    let mut controller = OrientationController::new(setup::tuning_from_config(&config));
    controller.set_inputs(inputs);
    match setup::start_device_lookup(&config) {
        Ok(request) => controller.start_geolocation(request),
        Err(e) => error!("Ignoring invalid device location: {e}"),
    }

    let script = if config.demo.scripted_drag {
        PointerScript::flick(config.demo.fps, 100.0, 5)
    } else {
        PointerScript::default()
    };

    run(&mut controller, &script, &config);
}

fn run(controller: &mut OrientationController, script: &PointerScript, config: &Config) {
    let frame_time = Duration::from_secs_f64(1.0 / f64::from(config.demo.fps));
    let report_every = config.demo.report_every.max(1);
    let mut clock = FrameClock::new();
    let mut last_phase = controller.motion_phase();
    let mut last_night = None;

    info!(
        frames = config.demo.frames,
        fps = config.demo.fps,
        fixed = controller.inputs().is_fixed,
        "Starting globe demo"
    );

    for frame in 0..config.demo.frames {
        for event in script.events_at(frame) {
            let response = controller.handle_pointer(event);
            if response.stops_propagation() {
                info!(frame, "Drag started, pointer event captured");
            }
        }
        if script.last_frame() == Some(frame) {
            info!(frame, "Scripted drag finished, globe coasting");
        }

        std::thread::sleep(frame_time);
        let delta = clock.tick();
        let output = controller.tick(delta);

        let phase = controller.motion_phase();
        if phase != last_phase {
            info!(frame, ?phase, "Motion phase changed");
            last_phase = phase;
        }
        if last_night != Some(output.use_night_texture) {
            info!(
                frame,
                night = output.use_night_texture,
                location = ?controller.effective_location(),
                "Texture selected"
            );
            last_night = Some(output.use_night_texture);
        }

        if frame % report_every == 0 {
            let (axis, angle) = output.orientation.to_axis_angle();
            let distance = controller
                .target()
                .map(|target| angular_distance(output.orientation, target));
            info!(
                frame,
                angle_deg = angle.to_degrees(),
                axis = ?axis,
                speed = controller.angular_velocity().length(),
                target_distance_deg = ?distance.map(f32::to_degrees),
                "Frame"
            );
        }
    }

    let tracking = controller.motion_phase() == MotionPhase::Tracking;
    info!(
        frames = clock.frame_count(),
        seconds = clock.total_time(),
        tracking,
        location = ?controller.location(),
        "Globe demo finished"
    );
}
