//! Interactive console loop: `c` captures, `s` takes a full-resolution
//! still, `q` quits.

use std::io::{BufRead, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};

use thiserror::Error;

use crate::camera::{CameraDriver, CameraError, CameraMode};
use crate::controller::CameraController;

/// Prompt shown before every command.
pub const PROMPT: &str = "Command (c/s/q): ";

/// Printed for anything that is not `c`, `s` or `q`.
pub const INVALID_COMMAND_MESSAGE: &str =
    "Invalid command. Use 'c' to capture, 's' for a full-resolution still, 'q' to quit.";

/// One line of operator input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionCommand {
    /// `c`: capture with the active preview configuration
    Capture,
    /// `s`: switch to the still configuration, capture, switch back
    StillCapture,
    /// `q`
    Quit,
    Invalid(String),
}

impl SessionCommand {
    /// Parse a line; surrounding whitespace and case are ignored.
    pub fn parse(line: &str) -> Self {
        let command = line.trim().to_lowercase();
        match command.as_str() {
            "c" => SessionCommand::Capture,
            "s" => SessionCommand::StillCapture,
            "q" => SessionCommand::Quit,
            _ => SessionCommand::Invalid(command),
        }
    }
}

/// Why the loop ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEnd {
    Quit,
    EndOfInput,
    Interrupted,
}

/// What happened during a session.
#[derive(Debug, Clone, PartialEq)]
pub struct SessionSummary {
    pub end: SessionEnd,
    pub photos: Vec<PathBuf>,
    pub failed_captures: usize,
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Error starting preview: {0}")]
    Preview(#[from] CameraError),
    #[error("Console I/O error: {0}")]
    Io(#[from] std::io::Error),
}

fn print_banner<D: CameraDriver, W: Write>(
    controller: &mut CameraController<D>,
    out: &mut W,
) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Camera Interactive Mode")?;
    writeln!(out, "{}", "=".repeat(25))?;

    if controller.created_photos_dir() {
        writeln!(out, "Created {} directory", controller.photos_dir().display())?;
    }

    if let Some(info) = controller.camera_info() {
        writeln!(out)?;
        writeln!(out, "Camera Information:")?;
        writeln!(out, "{}", "-".repeat(20))?;
        for (key, value) in info.iter() {
            writeln!(out, "{}: {}", key, value)?;
        }
    }
    Ok(())
}

fn print_controls<W: Write>(out: &mut W) -> std::io::Result<()> {
    writeln!(out)?;
    writeln!(out, "Camera Preview Controls:")?;
    writeln!(out, "Press 'c' + Enter to capture a photo")?;
    writeln!(out, "Press 's' + Enter to capture a full-resolution still")?;
    writeln!(out, "Press 'q' + Enter to quit")?;
    writeln!(out, "{}", "-".repeat(40))
}

/// Run the command loop until `q`, end of input, or an interrupt.
///
/// Capture failures are reported on `out` and the loop carries on; only a
/// preview that cannot be started or a broken console ends it with an error.
pub fn run_session<D, R, W>(
    controller: &mut CameraController<D>,
    mut input: R,
    out: &mut W,
    interrupt: &AtomicBool,
) -> Result<SessionSummary, SessionError>
where
    D: CameraDriver,
    R: BufRead,
    W: Write,
{
    print_banner(controller, out)?;

    writeln!(out, "Starting camera preview...")?;
    if controller.start_preview()? {
        writeln!(out, "Preview started successfully")?;
    } else {
        writeln!(out, "Preview already active")?;
    }
    print_controls(out)?;

    let mut summary = SessionSummary {
        end: SessionEnd::Quit,
        photos: Vec::new(),
        failed_captures: 0,
    };

    let mut line = String::new();
    loop {
        if interrupt.load(Ordering::SeqCst) {
            writeln!(out, "Shutting down...")?;
            summary.end = SessionEnd::Interrupted;
            break;
        }

        write!(out, "{}", PROMPT)?;
        out.flush()?;

        line.clear();
        if input.read_line(&mut line)? == 0 {
            writeln!(out)?;
            summary.end = SessionEnd::EndOfInput;
            break;
        }
        if interrupt.load(Ordering::SeqCst) {
            continue;
        }

        let mode = match SessionCommand::parse(&line) {
            SessionCommand::Capture => CameraMode::Preview,
            SessionCommand::StillCapture => CameraMode::Still,
            SessionCommand::Quit => {
                writeln!(out, "Quitting...")?;
                summary.end = SessionEnd::Quit;
                break;
            }
            SessionCommand::Invalid(_) => {
                writeln!(out, "{}", INVALID_COMMAND_MESSAGE)?;
                continue;
            }
        };

        if mode == CameraMode::Still {
            writeln!(out, "Switching to high-resolution mode...")?;
        }
        match controller.capture(mode) {
            Ok(report) => {
                writeln!(out, "{}", report)?;
                summary.photos.push(controller.post_process(&report));
            }
            Err(e) => {
                log::error!("capture failed: {}", e);
                writeln!(out, "Error capturing photo: {}", e)?;
                summary.failed_captures += 1;
            }
        }
    }

    Ok(summary)
}
