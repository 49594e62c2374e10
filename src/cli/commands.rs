//! Subcommand handlers.

use std::io::Write;
use std::path::Path;

use thiserror::Error;

use super::args::ConfigAction;
use crate::camera::{self, CameraError, CameraMode, RpicamDriver};
use crate::config::{default_path, ConfigError, Settings, DEFAULT_CONFIG};
use crate::controller::{CameraController, CaptureError};
use crate::session::{run_session, SessionEnd, SessionError};
use crate::signal;

/// Errors surfaced to `main`, which prints them and exits 1.
#[derive(Debug, Error)]
pub enum CommandError {
    #[error(transparent)]
    Camera(#[from] CameraError),
    #[error(transparent)]
    Config(#[from] ConfigError),
    #[error(transparent)]
    Capture(#[from] CaptureError),
    #[error(transparent)]
    Session(#[from] SessionError),
    #[error("Config file already exists: {}\nUse 'picam-hq config show' to view current settings.", .0.display())]
    ConfigExists(std::path::PathBuf),
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn open_controller(settings: &Settings) -> Result<CameraController<RpicamDriver>, CommandError> {
    let driver = RpicamDriver::open(settings.rpicam())?;
    Ok(CameraController::new(driver, settings)?)
}

/// List available cameras.
pub fn list_cameras<W: Write>(settings: &Settings, out: &mut W) -> Result<(), CommandError> {
    let devices = camera::list_devices(&settings.hello_tool)?;
    if devices.is_empty() {
        writeln!(out, "No cameras found.")?;
        writeln!(out)?;
        writeln!(
            out,
            "Check the ribbon cable and that the camera is enabled in /boot/firmware/config.txt."
        )?;
    } else {
        writeln!(out, "Available cameras:")?;
        for device in devices {
            writeln!(out, "  {}", device)?;
        }
        writeln!(out)?;
        writeln!(out, "Use --camera <index> to select a camera.")?;
    }
    Ok(())
}

/// Print camera properties and the settings a session would use.
pub fn show_info<W: Write>(settings: &Settings, out: &mut W) -> Result<(), CommandError> {
    let mut controller = open_controller(settings)?;
    if let Some(info) = controller.camera_info() {
        writeln!(out, "Camera Information:")?;
        writeln!(out, "{}", "-".repeat(20))?;
        for (key, value) in info.iter() {
            writeln!(out, "{}: {}", key, value)?;
        }
        writeln!(out)?;
    }
    writeln!(out, "{}", controller.status())?;
    Ok(())
}

/// Take a single photo without the interactive loop.
pub fn capture_once<W: Write>(
    settings: &Settings,
    mode: CameraMode,
    out: &mut W,
) -> Result<(), CommandError> {
    let mut controller = open_controller(settings)?;
    let report = controller.capture(mode)?;
    controller.post_process(&report);
    writeln!(out, "{}", report)?;
    controller.cleanup()?;
    Ok(())
}

/// Interactive session on stdin/stdout.
pub fn run_interactive(settings: &Settings) -> Result<(), CommandError> {
    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "Raspberry Pi HQ Camera Controller")?;
    writeln!(out, "{}", "=".repeat(50))?;

    let mut controller = open_controller(settings)?;
    let summary = run_session(
        &mut controller,
        std::io::stdin().lock(),
        &mut out,
        signal::interrupt_flag(),
    );

    writeln!(out, "Cleaning up...")?;
    let cleanup = controller.cleanup();
    let summary = summary?;
    cleanup?;
    writeln!(out, "Cleanup completed successfully")?;

    if summary.end == SessionEnd::Interrupted {
        log::info!("session interrupted");
    }
    writeln!(
        out,
        "{} photo(s) saved to {}",
        summary.photos.len(),
        settings.photos_dir.display()
    )?;
    Ok(())
}

/// Handle config subcommand actions.
pub fn handle_config_action<W: Write>(
    action: ConfigAction,
    config_path: Option<&Path>,
    settings: &Settings,
    out: &mut W,
) -> Result<(), CommandError> {
    let config_path = config_path.map(Path::to_path_buf).unwrap_or_else(default_path);

    match action {
        ConfigAction::Show => {
            writeln!(out, "Current configuration:")?;
            writeln!(out, "  Camera: {}", settings.camera_index)?;
            writeln!(out, "  Preview size: {}", settings.preview_size)?;
            writeln!(out, "  Still size: {}", settings.still_size)?;
            writeln!(out, "  Settle delay: {} ms", settings.settle.as_millis())?;
            writeln!(out, "  Capture timeout: {} ms", settings.capture_timeout.as_millis())?;
            writeln!(
                out,
                "  Preview window: {}",
                if settings.window { "yes" } else { "no" }
            )?;
            writeln!(out, "  Photos directory: {}", settings.photos_dir.display())?;
            writeln!(out, "  Tools: {}, {}", settings.hello_tool, settings.still_tool)?;
            writeln!(out)?;

            if config_path.exists() {
                writeln!(out, "Config file: {} (exists)", config_path.display())?;
            } else {
                writeln!(out, "Config file: {} (not found)", config_path.display())?;
            }
        }
        ConfigAction::Init => {
            if config_path.exists() {
                return Err(CommandError::ConfigExists(config_path));
            }

            if let Some(parent) = config_path.parent() {
                std::fs::create_dir_all(parent)?;
            }
            std::fs::write(&config_path, DEFAULT_CONFIG)?;

            writeln!(out, "Created config file: {}", config_path.display())?;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_init_writes_default_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let mut out = Vec::new();

        handle_config_action(ConfigAction::Init, Some(path.as_path()), &Settings::default(), &mut out)
            .unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), DEFAULT_CONFIG);
        let printed = String::from_utf8(out).unwrap();
        assert!(printed.starts_with("Created config file:"));
    }

    #[test]
    fn test_config_init_refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "# mine\n").unwrap();

        let err = handle_config_action(
            ConfigAction::Init,
            Some(path.as_path()),
            &Settings::default(),
            &mut Vec::new(),
        )
        .unwrap_err();

        assert!(matches!(err, CommandError::ConfigExists(_)));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "# mine\n");
    }

    #[test]
    fn test_config_show_prints_settings() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let mut out = Vec::new();

        handle_config_action(ConfigAction::Show, Some(path.as_path()), &Settings::default(), &mut out)
            .unwrap();

        let printed = String::from_utf8(out).unwrap();
        assert!(printed.contains("Preview size: 1640x1232"));
        assert!(printed.contains("Still size: 4056x3040"));
        assert!(printed.contains("Photos directory: photos"));
        assert!(printed.contains("(not found)"));
    }

    #[test]
    fn test_list_cameras_without_tool_fails() {
        let settings = Settings {
            hello_tool: "picam-hq-no-such-hello".to_string(),
            ..Default::default()
        };
        let err = list_cameras(&settings, &mut Vec::new()).unwrap_err();
        assert!(matches!(
            err,
            CommandError::Camera(CameraError::ToolNotFound(_))
        ));
    }
}
