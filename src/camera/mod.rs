//! Camera access for the HQ camera module.
//!
//! This module provides:
//! - Device enumeration via [`list_devices`]
//! - The [`CameraDriver`] seam used by the controller
//! - The production [`RpicamDriver`] built on rpicam-apps
//! - Mode presets via [`StreamConfig`] and [`Resolution`]

mod device;
mod driver;
mod process;
mod rpicam;
mod types;

pub use device::{find_device, list_devices, parse_camera_list};
pub use driver::CameraDriver;
pub use process::{run_tool, ToolProcess};
pub use rpicam::{preview_args, still_args, RpicamDriver, RpicamSettings};
pub use types::{
    CameraError, CameraInfo, CameraMode, CameraProperties, PixelFormat, Resolution, StreamConfig,
};
