//! Photo file naming and on-disk bookkeeping.

use std::fmt;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Local};

use crate::camera::CameraMode;

/// Bytes per megabyte used for reported file sizes.
pub const BYTES_PER_MB: f64 = 1_048_576.0;

/// Timestamp layout embedded in photo names (local time, second granularity).
pub const TIMESTAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// `photo_<YYYYMMDD_HHMMSS>.jpg`
pub fn photo_filename(ts: &DateTime<Local>) -> String {
    format!("photo_{}.jpg", ts.format(TIMESTAMP_FORMAT))
}

/// Path of a new photo in `dir`.
///
/// Two captures inside the same second would share a name, so a `_2`, `_3`,
/// ... suffix is added until the path is free. Existing photos are never
/// overwritten.
pub fn photo_path(dir: &Path, ts: &DateTime<Local>) -> PathBuf {
    let first = dir.join(photo_filename(ts));
    if !first.exists() {
        return first;
    }
    let stamp = ts.format(TIMESTAMP_FORMAT);
    (2u32..)
        .map(|n| dir.join(format!("photo_{}_{}.jpg", stamp, n)))
        .find(|p| !p.exists())
        .unwrap_or(first)
}

/// Create the photos directory. Returns `true` if it did not exist before.
pub fn ensure_photos_dir(dir: &Path) -> std::io::Result<bool> {
    if dir.is_dir() {
        return Ok(false);
    }
    std::fs::create_dir_all(dir)?;
    Ok(true)
}

/// Convert a byte count to megabytes (1 MB = 1,048,576 bytes).
pub fn bytes_to_mb(bytes: u64) -> f64 {
    bytes as f64 / BYTES_PER_MB
}

/// Outcome of a successful capture.
#[derive(Debug, Clone, PartialEq)]
pub struct CaptureReport {
    /// Where the JPEG was written
    pub path: PathBuf,
    /// Size on disk
    pub bytes: u64,
    /// Configuration the frame was taken with
    pub mode: CameraMode,
}

impl CaptureReport {
    pub fn size_mb(&self) -> f64 {
        bytes_to_mb(self.bytes)
    }
}

impl fmt::Display for CaptureReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Photo saved successfully: {}", self.path.display())?;
        write!(f, "File size: {:.1} MB", self.size_mb())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn at(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> DateTime<Local> {
        Local.with_ymd_and_hms(y, mo, d, h, mi, s).unwrap()
    }

    #[test]
    fn test_photo_filename_pattern() {
        assert_eq!(
            photo_filename(&at(2024, 3, 7, 9, 5, 1)),
            "photo_20240307_090501.jpg"
        );
        assert_eq!(
            photo_filename(&at(1999, 12, 31, 23, 59, 59)),
            "photo_19991231_235959.jpg"
        );
    }

    #[test]
    fn test_photo_path_is_inside_dir() {
        let dir = tempfile::tempdir().unwrap();
        let path = photo_path(dir.path(), &at(2024, 1, 1, 12, 0, 0));
        assert_eq!(path, dir.path().join("photo_20240101_120000.jpg"));
    }

    #[test]
    fn test_photo_path_same_second_gets_suffix() {
        let dir = tempfile::tempdir().unwrap();
        let ts = at(2024, 1, 1, 12, 0, 0);

        std::fs::write(photo_path(dir.path(), &ts), b"first").unwrap();
        let second = photo_path(dir.path(), &ts);
        assert_eq!(second, dir.path().join("photo_20240101_120000_2.jpg"));

        std::fs::write(&second, b"second").unwrap();
        let third = photo_path(dir.path(), &ts);
        assert_eq!(third, dir.path().join("photo_20240101_120000_3.jpg"));

        let first = std::fs::read(dir.path().join("photo_20240101_120000.jpg")).unwrap();
        assert_eq!(first, b"first");
    }

    #[test]
    fn test_ensure_photos_dir_reports_creation() {
        let root = tempfile::tempdir().unwrap();
        let dir = root.path().join("nested").join("photos");
        assert!(ensure_photos_dir(&dir).unwrap());
        assert!(dir.is_dir());
        assert!(!ensure_photos_dir(&dir).unwrap());
    }

    #[test]
    fn test_bytes_to_mb() {
        assert_eq!(bytes_to_mb(0), 0.0);
        assert_eq!(bytes_to_mb(1_048_576), 1.0);
        assert_eq!(bytes_to_mb(3 * 1_048_576 / 2), 1.5);
    }

    #[test]
    fn test_capture_report_display() {
        let report = CaptureReport {
            path: PathBuf::from("photos/photo_20240101_120000.jpg"),
            bytes: 3_460_000,
            mode: CameraMode::Still,
        };
        assert_eq!(
            report.to_string(),
            "Photo saved successfully: photos/photo_20240101_120000.jpg\nFile size: 3.3 MB"
        );
    }
}
