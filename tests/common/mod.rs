//! Shared test helpers: a camera driver that records calls and writes fake JPEGs.

#![allow(dead_code)]

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;
use std::time::Duration;

use picam_hq::camera::{
    CameraDriver, CameraError, CameraMode, CameraProperties, Resolution, StreamConfig,
};
use picam_hq::config::Settings;

/// One driver call, as seen by the fake.
#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    Properties,
    Configure(CameraMode, Resolution),
    Start,
    Stop,
    StartPreview,
    StopPreview,
    Capture(PathBuf, Resolution),
    Close,
}

pub type CallLog = Rc<RefCell<Vec<Call>>>;

/// Records every call and writes `photo_bytes` zero bytes per capture.
#[derive(Debug)]
pub struct FakeDriver {
    pub log: CallLog,
    pub current: Option<(CameraMode, StreamConfig)>,
    pub photo_bytes: usize,
    /// Fail every capture with `ToolFailed`
    pub fail_capture: bool,
    /// Report success without writing a file
    pub skip_write: bool,
    pub fail_properties: bool,
    pub fail_start: bool,
    /// Settle delay passed to each capture, in order
    pub settles: Rc<RefCell<Vec<Duration>>>,
}

impl FakeDriver {
    pub fn new() -> (Self, CallLog) {
        let log = CallLog::default();
        let driver = FakeDriver {
            log: Rc::clone(&log),
            current: None,
            photo_bytes: 2 * 1_048_576,
            fail_capture: false,
            skip_write: false,
            fail_properties: false,
            fail_start: false,
            settles: Rc::default(),
        };
        (driver, log)
    }

    fn record(&self, call: Call) {
        self.log.borrow_mut().push(call);
    }
}

impl CameraDriver for FakeDriver {
    fn properties(&mut self) -> Result<CameraProperties, CameraError> {
        self.record(Call::Properties);
        if self.fail_properties {
            return Err(CameraError::NoCameras);
        }
        let mut props = CameraProperties::new();
        props.insert("Model", "imx477");
        props.insert("PixelArraySize", Resolution::STILL);
        Ok(props)
    }

    fn configure(&mut self, mode: CameraMode, config: &StreamConfig) -> Result<(), CameraError> {
        self.record(Call::Configure(mode, config.main));
        self.current = Some((mode, config.clone()));
        Ok(())
    }

    fn current(&self) -> Option<(CameraMode, StreamConfig)> {
        self.current.clone()
    }

    fn start(&mut self) -> Result<(), CameraError> {
        self.record(Call::Start);
        if self.fail_start {
            return Err(CameraError::ToolNotFound("rpicam-hello".to_string()));
        }
        Ok(())
    }

    fn stop(&mut self) -> Result<(), CameraError> {
        self.record(Call::Stop);
        Ok(())
    }

    fn start_preview(&mut self) -> Result<(), CameraError> {
        self.record(Call::StartPreview);
        Ok(())
    }

    fn stop_preview(&mut self) -> Result<(), CameraError> {
        self.record(Call::StopPreview);
        Ok(())
    }

    fn capture_file(&mut self, path: &Path, settle: Duration) -> Result<(), CameraError> {
        let (_, config) = self.current.clone().ok_or(CameraError::NotConfigured)?;
        self.settles.borrow_mut().push(settle);
        self.record(Call::Capture(path.to_path_buf(), config.main));
        if self.fail_capture {
            return Err(CameraError::ToolFailed {
                tool: "rpicam-still".to_string(),
                exit_code: Some(255),
                stderr: "ERROR: *** failed to acquire camera ***".to_string(),
            });
        }
        if !self.skip_write {
            std::fs::write(path, vec![0u8; self.photo_bytes])?;
        }
        Ok(())
    }

    fn close(&mut self) -> Result<(), CameraError> {
        self.record(Call::Close);
        Ok(())
    }
}

/// Default presets, photos in `dir`, no settle delay.
pub fn test_settings(dir: &Path) -> Settings {
    Settings {
        photos_dir: dir.to_path_buf(),
        settle: Duration::ZERO,
        ..Default::default()
    }
}

/// Captures recorded in `log`, in order.
pub fn captures(log: &CallLog) -> Vec<(PathBuf, Resolution)> {
    log.borrow()
        .iter()
        .filter_map(|c| match c {
            Call::Capture(path, size) => Some((path.clone(), *size)),
            _ => None,
        })
        .collect()
}
