//! Camera types and data structures.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

/// Sensor output resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    pub width: u32,
    pub height: u32,
}

impl Resolution {
    /// Preview main stream (1640x1232), a 2x2 binned HQ sensor mode
    pub const PREVIEW: Resolution = Resolution {
        width: 1640,
        height: 1232,
    };

    /// Low-res side stream used alongside the preview (640x480)
    pub const LORES: Resolution = Resolution {
        width: 640,
        height: 480,
    };

    /// Full HQ sensor (4056x3040)
    pub const STILL: Resolution = Resolution {
        width: 4056,
        height: 3040,
    };

    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for Resolution {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

impl FromStr for Resolution {
    type Err = String;

    /// Parse `WIDTHxHEIGHT`, e.g. `1640x1232`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (w, h) = s.trim().split_once(['x', 'X']).ok_or_else(|| {
            format!(
                "Invalid resolution format '{}'. Use WIDTHxHEIGHT (e.g., 1640x1232)",
                s
            )
        })?;
        let width: u32 = w
            .parse()
            .map_err(|_| format!("Invalid width '{}' in resolution", w))?;
        let height: u32 = h
            .parse()
            .map_err(|_| format!("Invalid height '{}' in resolution", h))?;
        if width == 0 || height == 0 {
            return Err(format!("Resolution must be non-zero, got {}x{}", width, height));
        }
        Ok(Resolution { width, height })
    }
}

/// Pixel format of a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PixelFormat {
    Yuv420,
    Rgb888,
    Jpeg,
}

impl fmt::Display for PixelFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            PixelFormat::Yuv420 => write!(f, "YUV420"),
            PixelFormat::Rgb888 => write!(f, "RGB888"),
            PixelFormat::Jpeg => write!(f, "JPEG"),
        }
    }
}

/// Stream layout requested from the camera for one mode.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StreamConfig {
    /// Main output stream
    pub main: Resolution,
    /// Optional low-resolution side stream
    pub lores: Option<(Resolution, PixelFormat)>,
    /// Number of frame buffers to allocate
    pub buffer_count: u32,
}

impl StreamConfig {
    /// Preview layout: main stream plus a 640x480 YUV420 side stream.
    pub fn preview(main: Resolution) -> Self {
        Self {
            main,
            lores: Some((Resolution::LORES, PixelFormat::Yuv420)),
            buffer_count: 4,
        }
    }

    /// Still layout: a single full-size buffer.
    pub fn still(main: Resolution) -> Self {
        Self {
            main,
            lores: None,
            buffer_count: 1,
        }
    }
}

/// Which preset the camera is running.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CameraMode {
    Preview,
    Still,
}

impl fmt::Display for CameraMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CameraMode::Preview => write!(f, "preview"),
            CameraMode::Still => write!(f, "still"),
        }
    }
}

/// One camera reported by the enumeration tool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CameraInfo {
    /// Device index for selection
    pub index: u32,
    /// Sensor model, e.g. `imx477`
    pub model: String,
    /// Native sensor resolution
    pub sensor: Option<Resolution>,
    /// Raw bit depth
    pub bit_depth: Option<u8>,
    /// Bayer order, e.g. `RGGB`
    pub bayer_order: Option<String>,
    /// Device tree path
    pub path: String,
}

impl fmt::Display for CameraInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.index, self.model)?;
        if let Some(sensor) = self.sensor {
            write!(f, " [{}]", sensor)?;
        }
        write!(f, " ({})", self.path)
    }
}

/// Ordered key/value properties of an opened camera.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CameraProperties {
    entries: Vec<(String, String)>,
}

impl CameraProperties {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, key: impl Into<String>, value: impl ToString) {
        let key = key.into();
        let value = value.to_string();
        match self.entries.iter_mut().find(|(k, _)| *k == key) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((key, value)),
        }
    }

    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

impl From<&CameraInfo> for CameraProperties {
    fn from(info: &CameraInfo) -> Self {
        let mut props = CameraProperties::new();
        props.insert("Model", &info.model);
        props.insert("Index", info.index);
        if let Some(sensor) = info.sensor {
            props.insert("PixelArraySize", sensor);
        }
        if let Some(depth) = info.bit_depth {
            props.insert("BitDepth", depth);
        }
        if let Some(order) = &info.bayer_order {
            props.insert("BayerOrder", order);
        }
        props.insert("Location", &info.path);
        props
    }
}

/// Errors that can occur during camera operations.
#[derive(Debug, Error)]
pub enum CameraError {
    /// Camera tool binary is not installed
    #[error("{0} not found. Install the camera apps with:\n\n    sudo apt install rpicam-apps\n")]
    ToolNotFound(String),
    /// Failed to spawn a camera tool
    #[error("Failed to spawn {tool}: {source}")]
    SpawnFailed {
        tool: String,
        #[source]
        source: std::io::Error,
    },
    /// Camera tool exited with a non-zero status
    #[error("{tool} exited with code {exit_code:?}\n{stderr}")]
    ToolFailed {
        tool: String,
        exit_code: Option<i32>,
        stderr: String,
    },
    /// No cameras found on the system
    #[error("No cameras found. Check the ribbon cable and that the camera is enabled")]
    NoCameras,
    /// Camera device not found at specified index
    #[error("Camera device {0} not found. Run 'list-cameras' to see available devices")]
    DeviceNotFound(u32),
    /// Stream operation requested before `configure`
    #[error("Camera has not been configured")]
    NotConfigured,
    /// I/O error talking to a camera tool
    #[error("Camera I/O error: {0}")]
    Io(#[from] std::io::Error),
}
