//! Screen Geometry Probing
//!
//! Reads screen dimensions from `xdpyinfo`, the same tool users reach for
//! when checking their X display layout.

use std::process::Command;

use tracing::{debug, info};

use super::{Result, ScreenError};
use crate::calibration::geometry::ScreenGeometry;

/// Query the dimensions of `screen_num` (or the default screen)
pub fn probe_geometry(xdpyinfo: &str, screen_num: Option<u32>) -> Result<ScreenGeometry> {
    debug!("Probing screen geometry with {}", xdpyinfo);

    let output = Command::new(xdpyinfo).output().map_err(|e| {
        ScreenError::Unavailable(format!("Failed to execute {}: {}", xdpyinfo, e))
    })?;

    if !output.status.success() {
        let stderr = String::from_utf8_lossy(&output.stderr);
        return Err(ScreenError::Unavailable(format!(
            "{} failed ({}): {}",
            xdpyinfo,
            output.status,
            stderr.trim()
        )));
    }

    let stdout = String::from_utf8_lossy(&output.stdout);
    let geometry = parse_xdpyinfo_dimensions(&stdout, screen_num)?;
    info!("Screen geometry: {}", geometry);
    Ok(geometry)
}

/// Extract `dimensions: WxH pixels` for a screen from `xdpyinfo` output
///
/// Without an explicit screen the `default screen number` line decides,
/// falling back to screen 0.
pub fn parse_xdpyinfo_dimensions(output: &str, screen_num: Option<u32>) -> Result<ScreenGeometry> {
    let wanted = screen_num.unwrap_or_else(|| default_screen(output).unwrap_or(0));
    let mut current: Option<u32> = None;

    for line in output.lines() {
        let line = line.trim();

        if let Some(rest) = line.strip_prefix("screen #") {
            current = rest.trim_end_matches(':').trim().parse().ok();
            continue;
        }

        if current != Some(wanted) {
            continue;
        }

        if let Some(rest) = line.strip_prefix("dimensions:") {
            let dims = rest.split_whitespace().next().unwrap_or_default();
            return parse_dimensions(dims).ok_or_else(|| {
                ScreenError::Unavailable(format!("Unparseable screen dimensions: {}", rest.trim()))
            });
        }
    }

    Err(ScreenError::ScreenNotFound(wanted))
}

fn default_screen(output: &str) -> Option<u32> {
    output.lines().find_map(|line| {
        line.trim()
            .strip_prefix("default screen number:")
            .and_then(|n| n.trim().parse().ok())
    })
}

fn parse_dimensions(dims: &str) -> Option<ScreenGeometry> {
    let (width, height) = dims.split_once('x')?;
    let width: u32 = width.parse().ok()?;
    let height: u32 = height.parse().ok()?;
    (width > 0 && height > 0).then(|| ScreenGeometry::new(width, height))
}
