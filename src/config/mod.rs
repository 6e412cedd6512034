//! Configuration management
//!
//! Handles loading, validation, and merging of configuration from:
//! - TOML files
//! - CLI arguments

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

pub mod types;

pub use types::{
    CalibrationConfig, DeviceConfig, DisplayConfig, LoggingConfig, MessagesConfig, OutputConfig,
};

use crate::calibration::geometry::{ScreenGeometry, TargetSet};
use crate::calibration::session::SessionConfig;

/// Config file consulted when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "/etc/lamco-touch-calibrator/config.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Calibration session configuration
    pub calibration: CalibrationConfig,
    /// Display configuration
    pub display: DisplayConfig,
    /// External tool configuration
    pub device: DeviceConfig,
    /// Output configuration
    pub output: OutputConfig,
    /// On-screen instructions
    pub messages: MessagesConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

/// Values given on the command line, applied on top of the file
#[derive(Debug, Clone, Default)]
pub struct CliOverrides {
    /// `--timeout`
    pub timeout_secs: Option<u64>,
    /// `--screen-num`
    pub screen_num: Option<u32>,
    /// `--output-filename`
    pub output_filename: Option<PathBuf>,
    /// `--message`, unsplit
    pub message: Option<String>,
    /// `--log-format`
    pub log_format: Option<String>,
    /// `--log-file`
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Load configuration from file
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .context(format!("Failed to read config file: {}", path.display()))?;

        let config: Config = toml::from_str(&content).context("Failed to parse config file")?;

        config.validate()?;
        Ok(config)
    }

    /// Load `path`, or the default location if it exists, or built-in defaults
    pub fn resolve(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::load(path),
            None => {
                let default_path = Path::new(DEFAULT_CONFIG_PATH);
                if default_path.exists() {
                    Self::load(default_path)
                } else {
                    debug!("No config file at {}, using defaults", DEFAULT_CONFIG_PATH);
                    Ok(Self::default_config())
                }
            }
        }
    }

    /// Create default configuration
    pub fn default_config() -> Self {
        Config::default()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<()> {
        if self.calibration.margin_divisor < 2 {
            anyhow::bail!(
                "margin_divisor must be at least 2, got {}",
                self.calibration.margin_divisor
            );
        }

        if self.calibration.poll_interval_ms == 0 {
            anyhow::bail!("poll_interval_ms must be greater than 0");
        }

        if self.display.width == Some(0) || self.display.height == Some(0) {
            anyhow::bail!("Display width and height must be greater than 0");
        }

        if self.display.width.is_some() != self.display.height.is_some() {
            anyhow::bail!("Display width and height must be given together");
        }

        match self.logging.format.as_str() {
            "pretty" | "compact" | "json" => {}
            _ => anyhow::bail!("Invalid log format: {}", self.logging.format),
        }

        match self.logging.level.as_str() {
            "trace" | "debug" | "info" | "warn" | "error" => {}
            _ => anyhow::bail!("Invalid log level: {}", self.logging.level),
        }

        Ok(())
    }

    /// Override config with CLI arguments
    pub fn with_overrides(mut self, overrides: &CliOverrides) -> Result<Self> {
        if let Some(timeout) = overrides.timeout_secs {
            self.calibration.timeout_secs = timeout;
        }
        if let Some(screen_num) = overrides.screen_num {
            self.display.screen_num = Some(screen_num);
        }
        if let Some(ref filename) = overrides.output_filename {
            self.output.filename = Some(filename.clone());
        }
        if let Some(ref message) = overrides.message {
            self.messages.lines = split_message(message);
        }
        if let Some(ref format) = overrides.log_format {
            self.logging.format = format.clone();
        }
        if let Some(ref file) = overrides.log_file {
            self.logging.file = Some(file.clone());
        }

        self.validate()?;
        Ok(self)
    }

    /// Session parameters
    pub fn session_config(&self) -> SessionConfig {
        SessionConfig {
            poll_interval: Duration::from_millis(self.calibration.poll_interval_ms),
            ..SessionConfig::from_timeout_secs(self.calibration.timeout_secs)
        }
    }

    /// Target positions for a screen
    pub fn target_layout(&self, geometry: ScreenGeometry) -> TargetSet {
        TargetSet::inset(geometry, self.calibration.margin_divisor)
    }

    /// Fixed screen size, when both dimensions are configured
    pub fn geometry_override(&self) -> Option<ScreenGeometry> {
        match (self.display.width, self.display.height) {
            (Some(width), Some(height)) => Some(ScreenGeometry::new(width, height)),
            _ => None,
        }
    }
}

/// Split a message argument into lines on literal `\n` and on `|`
pub fn split_message(raw: &str) -> Vec<String> {
    raw.split("\\n")
        .flat_map(|part| part.split('|'))
        .map(str::to_string)
        .collect()
}
