//! Calibrator Error Types
//!
//! Wraps the per-module errors and maps each one to a failure kind and a
//! process exit code.

use thiserror::Error;

use crate::calibration::CalibrationError;
use crate::device::DeviceError;
use crate::output::OutputError;
use crate::screen::ScreenError;

/// Result type for calibrator operations
pub type Result<T> = std::result::Result<T, CalibratorError>;

/// Top-level calibrator error
#[derive(Error, Debug)]
pub enum CalibratorError {
    /// Session, solver or validation failure
    #[error(transparent)]
    Calibration(#[from] CalibrationError),

    /// Device registry failure
    #[error(transparent)]
    Device(#[from] DeviceError),

    /// Display surface failure
    #[error(transparent)]
    Screen(#[from] ScreenError),

    /// Output file failure
    #[error(transparent)]
    Output(#[from] OutputError),

    /// Configuration file or arguments rejected
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CalibratorError {
    /// Build a configuration error from an `anyhow` chain
    pub fn configuration(error: &anyhow::Error) -> Self {
        CalibratorError::Configuration(format!("{:#}", error))
    }

    /// Failure kind of this error
    pub fn kind(&self) -> ErrorKind {
        classify_error(self)
    }

    /// Process exit code for this error
    pub fn exit_code(&self) -> u8 {
        self.kind().exit_code()
    }
}

/// Failure kinds reported to the user
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// Display or device subsystem unreachable
    InputUnavailable,
    /// Nothing usable, or the requested device is missing or unusable
    NoCalibratableDevice,
    /// Key pressed during collection
    SessionAborted,
    /// No touch within the timeout
    SessionTimedOut,
    /// Solver output is not finite
    InvalidTransform,
    /// Matrix property missing or malformed
    PropertyUnavailable,
    /// Output file write failed
    IoFailure,
    /// Config file unreadable or invalid
    Configuration,
}

impl ErrorKind {
    /// Exit code reported by the binary
    pub fn exit_code(self) -> u8 {
        match self {
            ErrorKind::InputUnavailable => 2,
            ErrorKind::NoCalibratableDevice => 3,
            ErrorKind::SessionAborted => 4,
            ErrorKind::SessionTimedOut => 5,
            ErrorKind::InvalidTransform => 6,
            ErrorKind::PropertyUnavailable => 7,
            ErrorKind::IoFailure => 8,
            ErrorKind::Configuration => 9,
        }
    }
}

/// Classify error type
pub fn classify_error(error: &CalibratorError) -> ErrorKind {
    match error {
        CalibratorError::Calibration(e) => match e {
            CalibrationError::SessionAborted { .. } => ErrorKind::SessionAborted,
            CalibrationError::SessionTimedOut { .. } => ErrorKind::SessionTimedOut,
            CalibrationError::InvalidTransform { .. } => ErrorKind::InvalidTransform,
        },

        CalibratorError::Device(e) => match e {
            DeviceError::InputUnavailable(_) | DeviceError::Io(_) => ErrorKind::InputUnavailable,
            DeviceError::NoCalibratableDevice
            | DeviceError::DeviceNotFound(_)
            | DeviceError::NotCalibratable { .. } => ErrorKind::NoCalibratableDevice,
            DeviceError::PropertyUnavailable { .. } => ErrorKind::PropertyUnavailable,
            DeviceError::InvalidTransform(_) => ErrorKind::InvalidTransform,
        },

        CalibratorError::Screen(_) => ErrorKind::InputUnavailable,
        CalibratorError::Output(_) => ErrorKind::IoFailure,
        CalibratorError::Configuration(_) => ErrorKind::Configuration,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::geometry::Corner;
    use crate::calibration::transform::Transform;
    use std::collections::HashSet;
    use std::time::Duration;

    #[test]
    fn test_classification() {
        let aborted: CalibratorError = CalibrationError::SessionAborted {
            corner: Corner::UpperLeft,
            collected: 0,
        }
        .into();
        assert_eq!(aborted.kind(), ErrorKind::SessionAborted);
        assert_eq!(aborted.exit_code(), 4);

        let timed_out: CalibratorError = CalibrationError::SessionTimedOut {
            corner: Corner::LowerRight,
            collected: 3,
            timeout: Duration::from_secs(2),
        }
        .into();
        assert_eq!(timed_out.exit_code(), 5);

        let missing: CalibratorError = DeviceError::DeviceNotFound("\"x\"".to_string()).into();
        assert_eq!(missing.kind(), ErrorKind::NoCalibratableDevice);

        let property: CalibratorError = DeviceError::PropertyUnavailable {
            id: 3,
            reason: "gone".to_string(),
        }
        .into();
        assert_eq!(property.exit_code(), 7);

        let invalid: CalibratorError =
            DeviceError::InvalidTransform(Transform::from_values([f32::NAN; 9])).into();
        assert_eq!(invalid.kind(), ErrorKind::InvalidTransform);

        let screen: CalibratorError = ScreenError::ScreenNotFound(2).into();
        assert_eq!(screen.kind(), ErrorKind::InputUnavailable);

        let config = CalibratorError::configuration(&anyhow::anyhow!("bad divisor"));
        assert_eq!(config.exit_code(), 9);
    }

    #[test]
    fn test_exit_codes_distinct_and_nonzero() {
        let kinds = [
            ErrorKind::InputUnavailable,
            ErrorKind::NoCalibratableDevice,
            ErrorKind::SessionAborted,
            ErrorKind::SessionTimedOut,
            ErrorKind::InvalidTransform,
            ErrorKind::PropertyUnavailable,
            ErrorKind::IoFailure,
            ErrorKind::Configuration,
        ];
        let codes: HashSet<u8> = kinds.iter().map(|k| k.exit_code()).collect();
        assert_eq!(codes.len(), kinds.len());
        assert!(!codes.contains(&0));
    }
}
