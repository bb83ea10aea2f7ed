//! Variable-rate frame clock supplying the per-frame `delta`.
//!
//! The controller's motion is frame-driven rather than fixed-step, so the
//! clock only measures elapsed time and clamps pathological gaps (a
//! backgrounded tab, a debugger pause) so the globe does not lurch.

use std::time::Instant;
use tracing::warn;

/// Largest delta handed to the controller, in seconds.
pub const MAX_FRAME_DELTA: f32 = 0.25;

/// Measures time between frames.
#[derive(Debug, Clone)]
pub struct FrameClock {
    previous: Option<Instant>,
    frame_count: u64,
    total_time: f64,
}

impl FrameClock {
    /// A clock whose first [`tick`](Self::tick) reports zero elapsed time.
    pub fn new() -> Self {
        Self {
            previous: None,
            frame_count: 0,
            total_time: 0.0,
        }
    }

    /// Measure wall-clock time since the previous call.
    pub fn tick(&mut self) -> f32 {
        let now = Instant::now();
        let elapsed = self
            .previous
            .map(|prev| now.duration_since(prev).as_secs_f32())
            .unwrap_or(0.0);
        self.previous = Some(now);
        self.advance_by(elapsed)
    }

    /// Advance by an explicit amount, for scripted hosts and tests.
    pub fn advance_by(&mut self, seconds: f32) -> f32 {
        let mut delta = if seconds.is_finite() {
            seconds.max(0.0)
        } else {
            0.0
        };
        if delta > MAX_FRAME_DELTA {
            warn!(
                "Frame delta {:.1}ms exceeds maximum, clamping to {:.1}ms",
                delta * 1000.0,
                MAX_FRAME_DELTA * 1000.0
            );
            delta = MAX_FRAME_DELTA;
        }
        self.frame_count += 1;
        self.total_time += f64::from(delta);
        delta
    }

    /// Number of frames measured so far.
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    /// Sum of all deltas handed out, in seconds.
    pub fn total_time(&self) -> f64 {
        self.total_time
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}
