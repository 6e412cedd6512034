//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Calibration session configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CalibrationConfig {
    /// Targets sit `1 / margin_divisor` of the screen in from each edge
    pub margin_divisor: u32,

    /// Seconds to wait for each touch (0 = wait forever)
    pub timeout_secs: u64,

    /// Milliseconds between surface polls
    pub poll_interval_ms: u64,
}

impl Default for CalibrationConfig {
    fn default() -> Self {
        Self {
            margin_divisor: 9,
            timeout_secs: 0,
            poll_interval_ms: 100,
        }
    }
}

/// Display configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// X screen to calibrate (None = default screen)
    pub screen_num: Option<u32>,

    /// Screen width override in pixels (skips probing with `height`)
    pub width: Option<u32>,

    /// Screen height override in pixels
    pub height: Option<u32>,
}

/// External tool configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DeviceConfig {
    /// `xinput` executable
    pub xinput_path: String,

    /// `xdpyinfo` executable
    pub xdpyinfo_path: String,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            xinput_path: "xinput".to_string(),
            xdpyinfo_path: "xdpyinfo".to_string(),
        }
    }
}

/// Output configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Write the X.org snippet to this file
    pub filename: Option<PathBuf>,

    /// Print the `xinput set-prop` command to stderr after calibrating
    pub print_command: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            filename: None,
            print_command: true,
        }
    }
}

/// On-screen instructions
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct MessagesConfig {
    /// Lines shown centred during calibration
    pub lines: Vec<String>,
}

impl Default for MessagesConfig {
    fn default() -> Self {
        Self {
            lines: vec![
                "Touchscreen calibration".to_string(),
                "Press red cross center".to_string(),
                "Any key to abort".to_string(),
            ],
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    /// Log level used when no `-v` flag or `RUST_LOG` is given
    pub level: String,

    /// Output format ("pretty", "compact", "json")
    pub format: String,

    /// Also write logs to this file
    pub file: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "warn".to_string(),
            format: "compact".to_string(),
            file: None,
        }
    }
}
