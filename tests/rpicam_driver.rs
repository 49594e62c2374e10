//! RpicamDriver against stand-in rpicam-hello / rpicam-still scripts.
//!
//! The scripts append their arguments to a log file so each test can check
//! which processes were spawned and with what flags.

#![cfg(unix)]

use std::fs;
use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::time::{Duration, Instant};

use picam_hq::camera::{CameraError, CameraMode, RpicamDriver};
use picam_hq::config::Settings;
use picam_hq::controller::CameraController;
use tempfile::TempDir;

/// Writing an executable while another test forks can make exec fail with
/// ETXTBSY, so these tests run one at a time.
static SERIAL: Mutex<()> = Mutex::new(());

fn serial() -> MutexGuard<'static, ()> {
    SERIAL.lock().unwrap_or_else(|e| e.into_inner())
}

const LISTING: &str = "Available cameras\n-----------------\n\
0 : imx477 [4056x3040 12-bit RGGB] (/base/soc/i2c0mux/i2c@1/imx477@1a)\n";

struct FakeTools {
    dir: TempDir,
    hello: PathBuf,
    still: PathBuf,
}

impl FakeTools {
    /// `preview_body` runs for every rpicam-hello call except `--list-cameras`.
    fn new(preview_body: &str) -> Self {
        let dir = TempDir::new().unwrap();
        let hello = dir.path().join("rpicam-hello");
        let still = dir.path().join("rpicam-still");
        let hello_log = dir.path().join("hello.log");
        let still_log = dir.path().join("still.log");

        write_script(
            &hello,
            &format!(
                "echo \"$*\" >> '{log}'\n\
                 case \"$*\" in *--list-cameras*) printf '{listing}'; exit 0;; esac\n\
                 {preview_body}\n",
                log = hello_log.display(),
                listing = LISTING.replace('\n', "\\n"),
            ),
        );
        write_script(
            &still,
            &format!(
                "echo \"$*\" >> '{log}'\n\
                 while [ $# -gt 0 ]; do\n\
                 if [ \"$1\" = \"-o\" ]; then printf '\\377\\330fake' > \"$2\"; fi\n\
                 shift\n\
                 done\n",
                log = still_log.display(),
            ),
        );

        FakeTools { dir, hello, still }
    }

    fn settings(&self, photos: &Path) -> Settings {
        Settings {
            photos_dir: photos.to_path_buf(),
            hello_tool: self.hello.display().to_string(),
            still_tool: self.still.display().to_string(),
            window: false,
            ..Default::default()
        }
    }

    fn read_log(&self, name: &str) -> Vec<String> {
        fs::read_to_string(self.dir.path().join(name))
            .unwrap_or_default()
            .lines()
            .map(str::to_string)
            .collect()
    }

    /// rpicam-hello runs that were preview streams, not enumeration.
    fn preview_runs(&self) -> Vec<String> {
        self.read_log("hello.log")
            .into_iter()
            .filter(|l| !l.contains("--list-cameras"))
            .collect()
    }

    fn still_runs(&self) -> Vec<String> {
        self.read_log("still.log")
    }
}

fn write_script(path: &Path, body: &str) {
    fs::write(path, format!("#!/bin/sh\n{}", body)).unwrap();
    fs::set_permissions(path, fs::Permissions::from_mode(0o755)).unwrap();
}

fn open(settings: &Settings) -> CameraController<RpicamDriver> {
    let driver = RpicamDriver::open(settings.rpicam()).unwrap();
    CameraController::new(driver, settings).unwrap()
}

#[test]
fn test_preview_that_exits_at_once_is_an_error() {
    let _guard = serial();
    let tools = FakeTools::new("echo 'ERROR: *** failed to acquire camera ***' >&2\nexit 255");
    let photos = TempDir::new().unwrap();
    let mut controller = open(&tools.settings(photos.path()));

    let err = controller.start_preview().unwrap_err();

    match err {
        CameraError::ToolFailed {
            exit_code, stderr, ..
        } => {
            assert_eq!(exit_code, Some(255));
            assert!(stderr.contains("failed to acquire camera"));
        }
        other => panic!("Expected ToolFailed, got {:?}", other),
    }
    assert!(!controller.is_preview_active());
}

#[test]
fn test_still_runs_for_the_settle_delay() {
    let _guard = serial();
    let tools = FakeTools::new("exec sleep 30");
    let photos = TempDir::new().unwrap();
    let mut settings = tools.settings(photos.path());
    settings.settle = Duration::from_millis(5000);
    let mut controller = open(&settings);
    controller.start_preview().unwrap();

    let started = Instant::now();
    let report = controller.capture(CameraMode::Still).unwrap();

    assert!(started.elapsed() < Duration::from_millis(5000));
    assert!(fs::read(&report.path).unwrap().starts_with(&[0xFF, 0xD8]));

    let stills = tools.still_runs();
    assert_eq!(stills.len(), 1);
    assert!(stills[0].contains("-t 5000"), "got: {}", stills[0]);
    assert!(stills[0].contains("--width 4056 --height 3040"));

    // Started once, then restarted after the still
    assert_eq!(tools.preview_runs().len(), 2);
    assert!(controller.is_preview_active());

    controller.cleanup().unwrap();
}

#[test]
fn test_preview_capture_uses_capture_timeout() {
    let _guard = serial();
    let tools = FakeTools::new("exec sleep 30");
    let photos = TempDir::new().unwrap();
    let mut controller = open(&tools.settings(photos.path()));
    controller.start_preview().unwrap();

    controller.capture(CameraMode::Preview).unwrap();

    let stills = tools.still_runs();
    assert_eq!(stills.len(), 1);
    assert!(stills[0].contains("-t 500"), "got: {}", stills[0]);
    assert!(stills[0].contains("--width 1640 --height 1232"));

    controller.cleanup().unwrap();
}

#[test]
fn test_one_shot_capture_spawns_no_preview() {
    let _guard = serial();
    let tools = FakeTools::new("exec sleep 30");
    let photos = TempDir::new().unwrap();
    let mut controller = open(&tools.settings(photos.path()));

    controller.capture(CameraMode::Preview).unwrap();
    controller.capture(CameraMode::Still).unwrap();

    assert!(tools.preview_runs().is_empty());
    assert_eq!(tools.still_runs().len(), 2);
    controller.cleanup().unwrap();
}
