//! Calibration Error Types

use std::time::Duration;

use thiserror::Error;

use crate::calibration::geometry::Corner;
use crate::calibration::transform::Transform;

/// Result type for calibration operations
pub type Result<T> = std::result::Result<T, CalibrationError>;

/// Calibration engine error types
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CalibrationError {
    /// A key was pressed before all four corners were touched
    #[error("Calibration aborted by key press at {corner} corner ({collected} of 4 points collected)")]
    SessionAborted {
        /// Corner being waited on
        corner: Corner,
        /// Points collected before the abort
        collected: usize,
    },

    /// No touch arrived within the per-corner timeout
    #[error(
        "No touch within {} sec. at {corner} corner ({collected} of 4 points collected)",
        .timeout.as_secs_f64()
    )]
    SessionTimedOut {
        /// Corner being waited on
        corner: Corner,
        /// Points collected before the timeout
        collected: usize,
        /// Configured per-corner timeout
        timeout: Duration,
    },

    /// Solver output contains non-finite components
    #[error("Invalid transform matrix: {transform}")]
    InvalidTransform {
        /// The rejected matrix
        transform: Transform,
    },
}

impl CalibrationError {
    /// Short hint for the user, if one applies
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CalibrationError::SessionAborted { .. } => {
                Some("Run the calibrator again and touch every red cross")
            }
            CalibrationError::SessionTimedOut { .. } => {
                Some("Increase --timeout or use --timeout=0 to wait forever")
            }
            CalibrationError::InvalidTransform { .. } => Some("Probably there were misclicks"),
        }
    }
}
