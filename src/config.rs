//! Configuration file handling for picam-hq.
//!
//! Loads configuration from `~/.config/picam-hq/config.toml` or a custom path.

use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

use crate::camera::{Resolution, RpicamSettings};

/// Configuration file structure for picam-hq.
/// Loaded from ~/.config/picam-hq/config.toml (or custom path via --config).
#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default)]
    pub camera: CameraConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub tools: ToolsConfig,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct CameraConfig {
    #[serde(default)]
    pub index: Option<u32>,
    /// `WIDTHxHEIGHT`
    #[serde(default)]
    pub preview_size: Option<String>,
    /// `WIDTHxHEIGHT`
    #[serde(default)]
    pub still_size: Option<String>,
    #[serde(default)]
    pub settle_ms: Option<u64>,
    #[serde(default)]
    pub capture_timeout_ms: Option<u64>,
    #[serde(default)]
    pub window: Option<bool>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(default)]
    pub photos_dir: Option<PathBuf>,
}

#[derive(Debug, Deserialize, Default, PartialEq)]
#[serde(deny_unknown_fields)]
pub struct ToolsConfig {
    #[serde(default)]
    pub hello: Option<String>,
    #[serde(default)]
    pub still: Option<String>,
}

impl Config {
    /// Load configuration from a file path.
    /// Returns default config if the file doesn't exist.
    /// Returns an error if the file exists but cannot be parsed.
    pub fn load(path: Option<&Path>) -> Result<Self, ConfigError> {
        let path = path.map(PathBuf::from).unwrap_or_else(default_path);

        if path.exists() {
            Self::load_from_explicit(&path)
        } else {
            log::debug!("no config file at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    /// Load a file the user named explicitly; a missing file is an error.
    pub fn load_from_explicit(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        })?;
        let config = Self::parse(&content).map_err(|e| ConfigError::Parse {
            path: path.to_path_buf(),
            source: e,
        })?;
        log::info!("loaded config from {}", path.display());
        Ok(config)
    }

    pub fn parse(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }
}

/// Errors that can occur when loading configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file '{}': {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config file '{}': {source}", .path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
    #[error("Invalid {field} '{value}': {reason}")]
    InvalidValue {
        field: &'static str,
        value: String,
        reason: String,
    },
}

/// Get the default config file path.
pub fn default_path() -> PathBuf {
    dirs::config_dir()
        .map(|d| d.join("picam-hq").join("config.toml"))
        .unwrap_or_else(|| {
            let home = std::env::var("HOME").unwrap_or_else(|_| ".".to_string());
            PathBuf::from(home).join(".config/picam-hq/config.toml")
        })
}

/// Values given on the command line. `None` means "not given".
#[derive(Debug, Default, Clone)]
pub struct Overrides {
    pub camera_index: Option<u32>,
    pub photos_dir: Option<PathBuf>,
    pub preview_size: Option<Resolution>,
    pub still_size: Option<Resolution>,
    pub settle_ms: Option<u64>,
    pub no_window: bool,
}

/// Fully resolved settings for a session.
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    pub photos_dir: PathBuf,
    pub preview_size: Resolution,
    pub still_size: Resolution,
    /// Pause after switching configuration so exposure can adjust
    pub settle: Duration,
    pub camera_index: u32,
    pub window: bool,
    pub hello_tool: String,
    pub still_tool: String,
    pub capture_timeout: Duration,
}

impl Default for Settings {
    fn default() -> Self {
        let rpicam = RpicamSettings::default();
        Self {
            photos_dir: PathBuf::from("photos"),
            preview_size: Resolution::PREVIEW,
            still_size: Resolution::STILL,
            settle: Duration::from_secs(1),
            camera_index: rpicam.camera_index,
            window: rpicam.window,
            hello_tool: rpicam.hello_tool,
            still_tool: rpicam.still_tool,
            capture_timeout: rpicam.capture_timeout,
        }
    }
}

fn parse_size(field: &'static str, value: &str) -> Result<Resolution, ConfigError> {
    value.parse().map_err(|reason| ConfigError::InvalidValue {
        field,
        value: value.to_string(),
        reason,
    })
}

impl Settings {
    /// Merge settings: CLI args > config file > built-in defaults.
    pub fn resolve(config: &Config, overrides: &Overrides) -> Result<Self, ConfigError> {
        let defaults = Settings::default();

        let preview_size = match (overrides.preview_size, &config.camera.preview_size) {
            (Some(size), _) => size,
            (None, Some(s)) => parse_size("camera.preview_size", s)?,
            (None, None) => defaults.preview_size,
        };
        let still_size = match (overrides.still_size, &config.camera.still_size) {
            (Some(size), _) => size,
            (None, Some(s)) => parse_size("camera.still_size", s)?,
            (None, None) => defaults.still_size,
        };

        let window = !overrides.no_window && config.camera.window.unwrap_or(defaults.window);

        Ok(Settings {
            photos_dir: overrides
                .photos_dir
                .clone()
                .or_else(|| config.output.photos_dir.clone())
                .unwrap_or(defaults.photos_dir),
            preview_size,
            still_size,
            settle: overrides
                .settle_ms
                .or(config.camera.settle_ms)
                .map(Duration::from_millis)
                .unwrap_or(defaults.settle),
            camera_index: overrides
                .camera_index
                .or(config.camera.index)
                .unwrap_or(defaults.camera_index),
            window,
            hello_tool: config.tools.hello.clone().unwrap_or(defaults.hello_tool),
            still_tool: config.tools.still.clone().unwrap_or(defaults.still_tool),
            capture_timeout: config
                .camera
                .capture_timeout_ms
                .map(Duration::from_millis)
                .unwrap_or(defaults.capture_timeout),
        })
    }

    /// Driver settings derived from these settings.
    pub fn rpicam(&self) -> RpicamSettings {
        RpicamSettings {
            camera_index: self.camera_index,
            hello_tool: self.hello_tool.clone(),
            still_tool: self.still_tool.clone(),
            capture_timeout: self.capture_timeout,
            window: self.window,
            ..RpicamSettings::default()
        }
    }
}

/// Commented default file written by `config init`.
pub const DEFAULT_CONFIG: &str = r#"# picam-hq configuration

[camera]
# Camera index (see `picam-hq list-cameras`)
index = 0
# Live preview resolution
preview_size = "1640x1232"
# Full-resolution still size (HQ camera sensor)
still_size = "4056x3040"
# Time the sensor runs in still mode before the frame is taken (ms)
settle_ms = 1000
# Shortest time rpicam-still runs before taking the frame (ms)
capture_timeout_ms = 500
# Show the preview window (disable on headless setups)
window = true

[output]
# Where photos are written
photos_dir = "photos"

[tools]
# hello = "rpicam-hello"
# still = "rpicam-still"
"#;
