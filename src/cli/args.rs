//! CLI argument parsing with clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::enums::CaptureMode;
use crate::camera::Resolution;
use crate::config::Overrides;

/// Parse and validate a resolution (WIDTHxHEIGHT format)
fn parse_resolution(s: &str) -> Result<Resolution, String> {
    s.parse()
}

/// Raspberry Pi HQ camera controller: live preview and timestamped JPEG captures
#[derive(Parser, Debug)]
#[command(name = "picam-hq")]
#[command(version, about = "Raspberry Pi HQ camera preview and capture", long_about = None)]
pub struct Args {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Config file path
    #[arg(long, short, global = true)]
    pub config: Option<PathBuf>,

    /// Directory photos are written to (default: photos)
    #[arg(long, global = true)]
    pub photos_dir: Option<PathBuf>,

    /// Camera index (from list-cameras)
    #[arg(long, global = true)]
    pub camera: Option<u32>,

    /// Preview resolution, WIDTHxHEIGHT (default: 1640x1232)
    #[arg(long, value_parser = parse_resolution, global = true)]
    pub preview_size: Option<Resolution>,

    /// Still resolution, WIDTHxHEIGHT (default: 4056x3040)
    #[arg(long, value_parser = parse_resolution, global = true)]
    pub still_size: Option<Resolution>,

    /// Sensor run time before a still after a mode switch, in milliseconds (default: 1000)
    #[arg(long, global = true)]
    pub settle_ms: Option<u64>,

    /// Run without a preview window
    #[arg(long, global = true)]
    pub no_window: bool,

    /// More log output (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// List available cameras
    ListCameras,
    /// Show camera properties and the resolved settings
    Info,
    /// Take one photo and exit
    Capture {
        /// Configuration to capture with
        #[arg(long, value_enum, default_value_t = CaptureMode::Still)]
        mode: CaptureMode,
    },
    /// Configuration management
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug, Clone)]
pub enum ConfigAction {
    /// Show current configuration
    Show,
    /// Create default config file
    Init,
}

impl Args {
    /// Command-line values that override the config file.
    pub fn overrides(&self) -> Overrides {
        Overrides {
            camera_index: self.camera,
            photos_dir: self.photos_dir.clone(),
            preview_size: self.preview_size,
            still_size: self.still_size,
            settle_ms: self.settle_ms,
            no_window: self.no_window,
        }
    }

    /// Log level implied by `-v` flags.
    pub fn log_level(&self) -> log::LevelFilter {
        match self.verbose {
            0 => log::LevelFilter::Warn,
            1 => log::LevelFilter::Info,
            _ => log::LevelFilter::Debug,
        }
    }
}
