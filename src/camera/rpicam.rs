//! Camera driver backed by the Raspberry Pi `rpicam-apps` tools.
//!
//! The preview stream is a long-running `rpicam-hello` process; stills are
//! taken with one `rpicam-still` run per photo. libcamera only lets one
//! process hold the sensor, so the preview process is stopped around every
//! still capture and restarted afterwards.

use std::path::Path;
use std::time::Duration;

use super::device::find_device;
use super::driver::CameraDriver;
use super::process::{run_tool, ToolProcess};
use super::types::{CameraError, CameraMode, CameraProperties, StreamConfig};

/// Settings for the rpicam driver.
#[derive(Debug, Clone)]
pub struct RpicamSettings {
    /// Camera index as listed by `--list-cameras`
    pub camera_index: u32,
    /// Preview/enumeration binary
    pub hello_tool: String,
    /// Still capture binary
    pub still_tool: String,
    /// Shortest time `rpicam-still` runs before taking the frame
    pub capture_timeout: Duration,
    /// Show a preview window at all (false on headless setups)
    pub window: bool,
    /// How long a fresh preview process must stay up to count as started
    pub startup_grace: Duration,
}

impl Default for RpicamSettings {
    fn default() -> Self {
        Self {
            camera_index: 0,
            hello_tool: "rpicam-hello".to_string(),
            still_tool: "rpicam-still".to_string(),
            capture_timeout: Duration::from_millis(500),
            window: true,
            startup_grace: Duration::from_millis(300),
        }
    }
}

/// Production [`CameraDriver`].
#[derive(Debug)]
pub struct RpicamDriver {
    settings: RpicamSettings,
    current: Option<(CameraMode, StreamConfig)>,
    streaming: bool,
    window: bool,
    preview: Option<ToolProcess>,
    closed: bool,
}

impl RpicamDriver {
    /// Open the camera at `settings.camera_index`.
    ///
    /// # Errors
    /// * `CameraError::NoCameras` - If libcamera reports no cameras
    /// * `CameraError::DeviceNotFound` - If the index doesn't exist
    /// * `CameraError::ToolNotFound` - If rpicam-apps is not installed
    pub fn open(settings: RpicamSettings) -> Result<Self, CameraError> {
        let info = find_device(&settings.hello_tool, settings.camera_index)?;
        log::info!("opened camera {}", info);

        Ok(Self {
            settings,
            current: None,
            streaming: false,
            window: false,
            preview: None,
            closed: false,
        })
    }

    pub fn settings(&self) -> &RpicamSettings {
        &self.settings
    }

    /// Run the preview process when streaming in preview mode with the
    /// preview requested. Nothing is spawned for one-shot captures.
    fn spawn_preview_if_needed(&mut self) -> Result<(), CameraError> {
        if !self.streaming || !self.window || self.preview.is_some() {
            return Ok(());
        }
        let Some((CameraMode::Preview, config)) = &self.current else {
            return Ok(());
        };
        let args = preview_args(&self.settings, config, self.settings.window);
        let mut process = ToolProcess::spawn(&self.settings.hello_tool, &args)?;
        process.check_startup(self.settings.startup_grace)?;
        self.preview = Some(process);
        Ok(())
    }

    fn shutdown_preview(&mut self) -> Result<(), CameraError> {
        if let Some(mut process) = self.preview.take() {
            if !process.is_running() {
                log::warn!(
                    "{} exited on its own: {}",
                    self.settings.hello_tool,
                    process.stderr_tail().join(" | ")
                );
            }
            let status = process.shutdown()?;
            log::debug!("{} exited with {}", self.settings.hello_tool, status);
        }
        Ok(())
    }
}

/// Arguments for the long-running preview process.
pub fn preview_args(settings: &RpicamSettings, config: &StreamConfig, window: bool) -> Vec<String> {
    let mut args = vec![
        "--camera".to_string(),
        settings.camera_index.to_string(),
        "-t".to_string(),
        "0".to_string(),
        "--width".to_string(),
        config.main.width.to_string(),
        "--height".to_string(),
        config.main.height.to_string(),
        "--buffer-count".to_string(),
        config.buffer_count.to_string(),
    ];
    if let Some((lores, _)) = config.lores {
        args.extend([
            "--lores-width".to_string(),
            lores.width.to_string(),
            "--lores-height".to_string(),
            lores.height.to_string(),
        ]);
    }
    if !window {
        args.push("--nopreview".to_string());
    }
    args
}

/// Arguments for a single still capture to `path`.
///
/// The tool runs for `settle`, but never less than `capture_timeout`;
/// `-t 0` would make it run forever.
pub fn still_args(
    settings: &RpicamSettings,
    config: &StreamConfig,
    path: &Path,
    settle: Duration,
) -> Vec<String> {
    let run_for = settle.max(settings.capture_timeout);
    vec![
        "--camera".to_string(),
        settings.camera_index.to_string(),
        "--nopreview".to_string(),
        "-t".to_string(),
        run_for.as_millis().to_string(),
        "--width".to_string(),
        config.main.width.to_string(),
        "--height".to_string(),
        config.main.height.to_string(),
        "--buffer-count".to_string(),
        config.buffer_count.to_string(),
        "--encoding".to_string(),
        "jpg".to_string(),
        "-o".to_string(),
        path.display().to_string(),
    ]
}

impl CameraDriver for RpicamDriver {
    fn properties(&mut self) -> Result<CameraProperties, CameraError> {
        let info = find_device(&self.settings.hello_tool, self.settings.camera_index)?;
        Ok(CameraProperties::from(&info))
    }

    fn configure(&mut self, mode: CameraMode, config: &StreamConfig) -> Result<(), CameraError> {
        log::debug!("configuring {} mode at {}", mode, config.main);
        self.current = Some((mode, config.clone()));
        Ok(())
    }

    fn current(&self) -> Option<(CameraMode, StreamConfig)> {
        self.current.clone()
    }

    fn start(&mut self) -> Result<(), CameraError> {
        if self.current.is_none() {
            return Err(CameraError::NotConfigured);
        }
        self.streaming = true;
        self.spawn_preview_if_needed()
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.streaming = false;
        self.shutdown_preview()
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        self.window = true;
        self.spawn_preview_if_needed()
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.window = false;
        self.shutdown_preview()
    }

    fn capture_file(&mut self, path: &Path, settle: Duration) -> Result<(), CameraError> {
        let (_, config) = self.current.clone().ok_or(CameraError::NotConfigured)?;

        self.shutdown_preview()?;
        let result = run_tool(
            &self.settings.still_tool,
            &still_args(&self.settings, &config, path, settle),
        );
        self.spawn_preview_if_needed()?;

        result.map(|_| ())
    }

    fn close(&mut self) -> Result<(), CameraError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.streaming = false;
        self.window = false;
        self.shutdown_preview()
    }
}

impl Drop for RpicamDriver {
    fn drop(&mut self) {
        let _ = self.close();
    }
}
