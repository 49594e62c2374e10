//! CLI enum types.

use clap::ValueEnum;

use crate::camera::CameraMode;

/// Configuration used by a one-shot capture.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum CaptureMode {
    /// Preview resolution, quick
    Preview,
    /// Full sensor resolution
    #[default]
    Still,
}

impl From<CaptureMode> for CameraMode {
    fn from(m: CaptureMode) -> Self {
        match m {
            CaptureMode::Preview => CameraMode::Preview,
            CaptureMode::Still => CameraMode::Still,
        }
    }
}
