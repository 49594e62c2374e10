//! Command-line interface definitions and helpers.
//!
//! This module contains all CLI argument parsing, enums, and subcommand handlers.

mod args;
mod commands;
mod enums;

pub use args::{Args, Command, ConfigAction};
pub use commands::{
    capture_once, handle_config_action, list_cameras, run_interactive, show_info, CommandError,
};
pub use enums::CaptureMode;
