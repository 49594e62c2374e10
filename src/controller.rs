//! Camera session state: preview lifecycle, mode switching, and captures.

use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use chrono::Local;
use thiserror::Error;

use crate::camera::{CameraDriver, CameraError, CameraMode, CameraProperties, StreamConfig};
use crate::config::Settings;
use crate::photo::{ensure_photos_dir, photo_path, CaptureReport};

/// Errors from a single capture.
#[derive(Debug, Error)]
pub enum CaptureError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    /// The driver reported success but nothing was written
    #[error("Photo file was not created: {}", .0.display())]
    PhotoMissing(PathBuf),
    #[error("Failed to read photo '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Snapshot of the controller state for display.
#[derive(Debug, Clone, PartialEq)]
pub struct Status {
    pub preview_active: bool,
    pub running: bool,
    pub mode: Option<CameraMode>,
    pub photos_dir: PathBuf,
    pub preview: StreamConfig,
    pub still: StreamConfig,
}

impl fmt::Display for Status {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Camera Status:")?;
        writeln!(f, "  Preview active: {}", self.preview_active)?;
        writeln!(f, "  Running: {}", self.running)?;
        match self.mode {
            Some(mode) => writeln!(f, "  Mode: {}", mode)?,
            None => writeln!(f, "  Mode: unconfigured")?,
        }
        writeln!(f, "  Photos directory: {}", self.photos_dir.display())?;
        writeln!(f, "  Preview size: {}", self.preview.main)?;
        write!(f, "  Still size: {}", self.still.main)
    }
}

/// Owns the camera for the lifetime of a session.
pub struct CameraController<D: CameraDriver> {
    driver: D,
    preview: StreamConfig,
    still: StreamConfig,
    photos_dir: PathBuf,
    settle: Duration,
    created_photos_dir: bool,
    preview_active: bool,
    running: bool,
    closed: bool,
}

impl<D: CameraDriver> fmt::Debug for CameraController<D> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CameraController")
            .field("photos_dir", &self.photos_dir)
            .field("preview_active", &self.preview_active)
            .field("running", &self.running)
            .finish_non_exhaustive()
    }
}

impl<D: CameraDriver> CameraController<D> {
    /// Build the presets from `settings` and make sure the photos directory exists.
    pub fn new(driver: D, settings: &Settings) -> std::io::Result<Self> {
        let created_photos_dir = ensure_photos_dir(&settings.photos_dir)?;
        if created_photos_dir {
            log::info!("created {}", settings.photos_dir.display());
        }

        Ok(Self {
            driver,
            preview: StreamConfig::preview(settings.preview_size),
            still: StreamConfig::still(settings.still_size),
            photos_dir: settings.photos_dir.clone(),
            settle: settings.settle,
            created_photos_dir,
            preview_active: false,
            running: false,
            closed: false,
        })
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    pub fn photos_dir(&self) -> &Path {
        &self.photos_dir
    }

    /// Whether `new` had to create the photos directory.
    pub fn created_photos_dir(&self) -> bool {
        self.created_photos_dir
    }

    pub fn is_preview_active(&self) -> bool {
        self.preview_active
    }

    fn preset(&self, mode: CameraMode) -> &StreamConfig {
        match mode {
            CameraMode::Preview => &self.preview,
            CameraMode::Still => &self.still,
        }
    }

    /// Configure the preview preset and show the live window.
    ///
    /// Returns `false` when the preview was already running.
    pub fn start_preview(&mut self) -> Result<bool, CameraError> {
        if self.preview_active {
            log::info!("preview already active");
            return Ok(false);
        }
        log::info!("starting preview at {}", self.preview.main);
        let preview = self.preview.clone();
        self.driver.configure(CameraMode::Preview, &preview)?;
        let started = self
            .driver
            .start_preview()
            .and_then(|()| self.driver.start());
        if let Err(e) = started {
            let _ = self.driver.stop_preview();
            let _ = self.driver.stop();
            return Err(e);
        }
        self.preview_active = true;
        self.running = true;
        Ok(true)
    }

    /// Hide the live window and stop streaming.
    ///
    /// Returns `false` when the preview was not running.
    pub fn stop_preview(&mut self) -> Result<bool, CameraError> {
        if !self.preview_active {
            return Ok(false);
        }
        log::info!("stopping preview");
        self.driver.stop_preview()?;
        self.driver.stop()?;
        self.preview_active = false;
        Ok(true)
    }

    /// Switch the running camera to `mode`, keeping the window state.
    fn switch_to(&mut self, mode: CameraMode) -> Result<(), CameraError> {
        let config = self.preset(mode).clone();
        log::info!("switching to {} mode ({})", mode, config.main);

        if self.preview_active {
            self.driver.stop_preview()?;
        }
        self.driver.stop()?;
        self.driver.configure(mode, &config)?;
        if self.preview_active {
            self.driver.start_preview()?;
        }
        self.driver.start()
    }

    /// Capture a photo with the `mode` preset.
    ///
    /// When the camera is running a different configuration it is switched
    /// to `mode`, the driver runs the sensor for the settle delay before
    /// taking the frame, and the preview is restored afterwards if it was
    /// active. The returned report carries the size of the file on disk.
    pub fn capture(&mut self, mode: CameraMode) -> Result<CaptureReport, CaptureError> {
        let path = photo_path(&self.photos_dir, &Local::now());
        log::info!("capturing {} photo to {}", mode, path.display());

        let wanted = self.preset(mode).clone();
        let needs_switch = self
            .driver
            .current()
            .map_or(true, |(_, current)| current != wanted);

        let settle = if needs_switch {
            self.switch_to(mode)?;
            self.settle
        } else {
            Duration::ZERO
        };

        let captured = self.driver.capture_file(&path, settle);

        if needs_switch && self.preview_active {
            log::info!("returning to preview mode");
            self.switch_to(CameraMode::Preview)?;
        }
        captured?;

        if !path.exists() {
            return Err(CaptureError::PhotoMissing(path));
        }
        let bytes = std::fs::metadata(&path)
            .map_err(|e| CaptureError::Io {
                path: path.clone(),
                source: e,
            })?
            .len();

        Ok(CaptureReport { path, bytes, mode })
    }

    /// Hook for image post-processing. Returns the path of the processed image.
    pub fn post_process(&self, report: &CaptureReport) -> PathBuf {
        // TODO: film grain and colour filters once an image pipeline is chosen
        log::debug!("no post-processing for {}", report.path.display());
        report.path.clone()
    }

    /// Camera properties, or `None` when they cannot be read.
    pub fn camera_info(&mut self) -> Option<CameraProperties> {
        match self.driver.properties() {
            Ok(props) => Some(props),
            Err(e) => {
                log::warn!("Error getting camera info: {}", e);
                None
            }
        }
    }

    pub fn status(&self) -> Status {
        Status {
            preview_active: self.preview_active,
            running: self.running,
            mode: self.driver.current().map(|(mode, _)| mode),
            photos_dir: self.photos_dir.clone(),
            preview: self.preview.clone(),
            still: self.still.clone(),
        }
    }

    /// Stop the preview and release the camera. Safe to call more than once.
    pub fn cleanup(&mut self) -> Result<(), CameraError> {
        if self.closed {
            return Ok(());
        }
        self.closed = true;
        self.running = false;
        let stopped = self.stop_preview();
        let closed = self.driver.close();
        stopped?;
        closed
    }
}

impl<D: CameraDriver> Drop for CameraController<D> {
    fn drop(&mut self) {
        if let Err(e) = self.cleanup() {
            log::error!("Error during cleanup: {}", e);
        }
    }
}
