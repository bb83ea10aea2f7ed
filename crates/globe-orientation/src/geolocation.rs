//! One-shot, best-effort device geolocation.
//!
//! The lookup runs on its own thread and hands its single result back over a
//! channel. The controller polls that channel at the start of each frame, so
//! the host never registers callbacks and the controller stays free of any
//! particular async runtime.

use std::time::Duration;

use crossbeam_channel::{Receiver, TryRecvError, bounded};

use crate::target::{GeoCoordinate, GeoError};

/// Why a location lookup failed.
#[derive(Clone, Debug, PartialEq, thiserror::Error)]
pub enum GeolocationError {
    /// The user or platform refused access.
    #[error("geolocation permission denied")]
    PermissionDenied,
    /// No position source is available.
    #[error("geolocation unavailable: {0}")]
    Unavailable(String),
    /// The provider gave up waiting for a fix.
    #[error("geolocation timed out")]
    Timeout,
    /// The provider returned a coordinate that is not on Earth.
    #[error("geolocation returned an invalid coordinate: {0}")]
    Invalid(#[from] GeoError),
}

/// A source of the device's position.
///
/// `locate` may block; it is only ever called on the lookup thread.
pub trait GeolocationProvider: Send + 'static {
    /// Resolve the current position once.
    fn locate(&self) -> Result<GeoCoordinate, GeolocationError>;
}

impl<F> GeolocationProvider for F
where
    F: Fn() -> Result<GeoCoordinate, GeolocationError> + Send + 'static,
{
    fn locate(&self) -> Result<GeoCoordinate, GeolocationError> {
        self()
    }
}

/// Provider that reports a fixed position after an optional delay.
#[derive(Clone, Debug)]
pub struct FixedProvider {
    /// Position to report.
    pub coordinate: GeoCoordinate,
    /// Simulated lookup latency.
    pub delay: Duration,
}

impl FixedProvider {
    /// Reports `coordinate` immediately.
    pub fn new(coordinate: GeoCoordinate) -> Self {
        Self {
            coordinate,
            delay: Duration::ZERO,
        }
    }

    /// Reports `coordinate` after `delay`.
    pub fn with_delay(coordinate: GeoCoordinate, delay: Duration) -> Self {
        Self { coordinate, delay }
    }
}

impl GeolocationProvider for FixedProvider {
    fn locate(&self) -> Result<GeoCoordinate, GeolocationError> {
        if !self.delay.is_zero() {
            std::thread::sleep(self.delay);
        }
        Ok(self.coordinate)
    }
}

/// Provider that always fails with the given error.
#[derive(Clone, Debug)]
pub struct UnavailableProvider(pub GeolocationError);

impl Default for UnavailableProvider {
    fn default() -> Self {
        Self(GeolocationError::Unavailable("no position source".into()))
    }
}

impl GeolocationProvider for UnavailableProvider {
    fn locate(&self) -> Result<GeoCoordinate, GeolocationError> {
        Err(self.0.clone())
    }
}

/// Handle to a lookup in flight. Yields its result at most once.
///
/// Dropping the handle abandons the lookup; the thread finishes on its own
/// and its result is discarded.
#[derive(Debug)]
pub struct GeolocationRequest {
    receiver: Option<Receiver<Result<GeoCoordinate, GeolocationError>>>,
}

impl GeolocationRequest {
    /// Start a lookup on a background thread.
    pub fn spawn(provider: impl GeolocationProvider) -> Self {
        let (sender, receiver) = bounded(1);
        let spawned = std::thread::Builder::new()
            .name("geolocation".into())
            .spawn(move || {
                let _ = sender.send(provider.locate());
            });

        match spawned {
            Ok(_) => Self {
                receiver: Some(receiver),
            },
            Err(err) => Self::resolved(Err(GeolocationError::Unavailable(format!(
                "failed to start lookup thread: {err}"
            )))),
        }
    }

    /// A request that has already completed with `result`.
    pub fn resolved(result: Result<GeoCoordinate, GeolocationError>) -> Self {
        let (sender, receiver) = bounded(1);
        let _ = sender.send(result);
        Self {
            receiver: Some(receiver),
        }
    }

    /// Non-blocking check for the result.
    ///
    /// Returns `Some` exactly once: with the provider's answer, or with an
    /// error if the lookup thread exited without answering.
    pub fn poll(&mut self) -> Option<Result<GeoCoordinate, GeolocationError>> {
        let receiver = self.receiver.as_ref()?;
        let outcome = match receiver.try_recv() {
            Ok(result) => result,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => Err(GeolocationError::Unavailable(
                "lookup ended without a result".into(),
            )),
        };
        self.receiver = None;
        Some(outcome)
    }

    /// Whether the result has already been handed out.
    pub fn is_finished(&self) -> bool {
        self.receiver.is_none()
    }
}

/// What the controller knows about the device position.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum LocationState {
    /// A lookup is in flight.
    Pending,
    /// The lookup succeeded.
    Known(GeoCoordinate),
    /// No lookup was started, or it failed.
    #[default]
    Unknown,
}

impl LocationState {
    /// The coordinate, if known.
    pub fn coordinate(&self) -> Option<GeoCoordinate> {
        match self {
            LocationState::Known(coord) => Some(*coord),
            _ => None,
        }
    }
}
