//! Calibration Output
//!
//! Renders a transform as an X.org `InputClass` snippet, as an
//! `xinput set-prop` command, or as raw property values, and writes the
//! snippet to disk.
//!
//! Numbers are printed with the shortest representation that reads back to
//! the same `f32`, never in exponent notation.

use std::fmt::Write as _;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::info;

use crate::calibration::transform::Transform;
use crate::device::{DeviceInfo, MATRIX_PROPERTY};

/// Output error types
#[derive(Error, Debug)]
pub enum OutputError {
    /// Output file could not be written
    #[error("Failed to write {}: {source}", .path.display())]
    Write {
        /// Target path
        path: PathBuf,
        /// OS error
        #[source]
        source: std::io::Error,
    },

    /// Standard output could not be written
    #[error("Failed to print calibration: {0}")]
    Print(#[from] std::io::Error),

    /// Device list could not be encoded
    #[error("Failed to encode device list: {0}")]
    Encode(#[from] serde_json::Error),
}

/// X.org configuration snippet applying `transform` to `device_name`
pub fn xorg_config(transform: &Transform, device_name: &str) -> String {
    let mut out = String::new();
    out.push_str("Section \"InputClass\"\n");
    out.push_str("\tIdentifier\t\"calibration\"\n");
    let _ = writeln!(out, "\tMatchProduct\t\"{}\"", device_name);
    let _ = writeln!(out, "\tOption\t\"TransformationMatrix\"\t\"{}\"", transform);
    out.push_str("EndSection\n");
    out
}

/// Shell command applying `transform` to a running X server
pub fn xinput_command(transform: &Transform, device_name: &str) -> String {
    format!(
        "xinput set-prop \"{}\" \"{}\" {}",
        escape_quoted(device_name),
        MATRIX_PROPERTY,
        transform
    )
}

/// Row-major values in device property order
pub fn property_values(transform: &Transform) -> [f32; 9] {
    *transform.values()
}

fn escape_quoted(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '"' | '\\' | '$' | '`') {
            escaped.push('\\');
        }
        escaped.push(c);
    }
    escaped
}

/// Render the `--list` output, one device per line or as JSON
pub fn device_listing(devices: &[DeviceInfo], json: bool) -> Result<String, OutputError> {
    if json {
        let mut text = serde_json::to_string_pretty(devices)?;
        text.push('\n');
        return Ok(text);
    }

    let mut text = String::new();
    for device in devices {
        let _ = writeln!(text, "{}", device);
    }
    Ok(text)
}

/// Write the configuration snippet in a single call
pub fn write_config(path: &Path, contents: &str) -> Result<(), OutputError> {
    std::fs::write(path, contents).map_err(|source| OutputError::Write {
        path: path.to_path_buf(),
        source,
    })?;
    info!("Calibration written to {:?}", path);
    Ok(())
}
