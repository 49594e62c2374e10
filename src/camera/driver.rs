//! The seam between the controller and a concrete camera backend.

use std::path::Path;
use std::time::Duration;

use super::types::{CameraError, CameraMode, CameraProperties, StreamConfig};

/// Operations the controller needs from a camera.
///
/// A driver owns the device exclusively. Streaming and the live window are
/// separate so a still capture can reconfigure the sensor while the operator
/// keeps the preview window semantics.
pub trait CameraDriver {
    /// Static properties of the opened camera (model, sensor size, ...).
    fn properties(&mut self) -> Result<CameraProperties, CameraError>;

    /// Apply a stream configuration. Takes effect on the next `start`.
    fn configure(&mut self, mode: CameraMode, config: &StreamConfig) -> Result<(), CameraError>;

    /// Configuration applied by the last `configure`.
    fn current(&self) -> Option<(CameraMode, StreamConfig)>;

    /// Begin streaming in the current configuration.
    fn start(&mut self) -> Result<(), CameraError>;

    /// Stop streaming. No-op when not streaming.
    fn stop(&mut self) -> Result<(), CameraError>;

    /// Show the live preview window.
    fn start_preview(&mut self) -> Result<(), CameraError>;

    /// Hide the live preview window.
    fn stop_preview(&mut self) -> Result<(), CameraError>;

    /// Capture one JPEG frame to `path` using the current configuration.
    ///
    /// `settle` is how long the sensor runs in that configuration before the
    /// frame is taken, so exposure and white balance can converge after a
    /// mode switch. `Duration::ZERO` means the driver's own minimum.
    fn capture_file(&mut self, path: &Path, settle: Duration) -> Result<(), CameraError>;

    /// Release the device. Safe to call more than once.
    fn close(&mut self) -> Result<(), CameraError>;
}
