//! Camera device enumeration.

use super::process::run_tool;
use super::types::{CameraError, CameraInfo, Resolution};

/// List all cameras known to libcamera via `<hello_tool> --list-cameras`.
///
/// If no cameras are found, returns an empty vector (not an error).
pub fn list_devices(hello_tool: &str) -> Result<Vec<CameraInfo>, CameraError> {
    let output = run_tool(hello_tool, &["--list-cameras".to_string()])?;
    Ok(parse_camera_list(&output))
}

/// Find the camera at `index`.
pub fn find_device(hello_tool: &str, index: u32) -> Result<CameraInfo, CameraError> {
    let devices = list_devices(hello_tool)?;
    if devices.is_empty() {
        return Err(CameraError::NoCameras);
    }
    devices
        .into_iter()
        .find(|d| d.index == index)
        .ok_or(CameraError::DeviceNotFound(index))
}

/// Parse the `--list-cameras` listing.
///
/// Camera lines look like
/// `0 : imx477 [4056x3040 12-bit RGGB] (/base/soc/i2c0mux/i2c@1/imx477@1a)`.
/// Headers and indented mode lines are skipped.
pub fn parse_camera_list(output: &str) -> Vec<CameraInfo> {
    output.lines().filter_map(parse_camera_line).collect()
}

fn parse_camera_line(line: &str) -> Option<CameraInfo> {
    if line.starts_with(char::is_whitespace) {
        return None;
    }
    let (index, rest) = line.split_once(" : ")?;
    let index: u32 = index.trim().parse().ok()?;
    let rest = rest.trim();

    let (model, rest) = match rest.find(' ') {
        Some(pos) => (&rest[..pos], rest[pos..].trim()),
        None => (rest, ""),
    };

    let mut sensor = None;
    let mut bit_depth = None;
    let mut bayer_order = None;
    let mut rest = rest;
    if let Some(inner) = rest.strip_prefix('[') {
        if let Some(end) = inner.find(']') {
            let mut fields = inner[..end].split_whitespace();
            sensor = fields.next().and_then(|s| s.parse::<Resolution>().ok());
            bit_depth = fields
                .next()
                .and_then(|s| s.strip_suffix("-bit"))
                .and_then(|s| s.parse().ok());
            bayer_order = fields.next().map(str::to_string);
            rest = inner[end + 1..].trim();
        }
    }

    let path = rest
        .strip_prefix('(')
        .and_then(|r| r.strip_suffix(')'))
        .unwrap_or(rest)
        .to_string();

    Some(CameraInfo {
        index,
        model: model.to_string(),
        sensor,
        bit_depth,
        bayer_order,
        path,
    })
}
