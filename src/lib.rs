//! # lamco-touch-calibrator
//!
//! Four-point touchscreen calibration for X.org.
//!
//! The user touches four targets inset from the screen corners. The raw
//! touch coordinates are fitted to the target positions with a closed-form
//! affine transform, which is applied to the device's
//! "Coordinate Transformation Matrix" and emitted as an X.org
//! `InputClass` snippet for permanent installation.
//!
//! # Architecture
//!
//! ```text
//! lamco-touch-calibrator
//!   ├─> Device Registry (xinput: list, read and write the matrix)
//!   ├─> Display Surface (targets, messages, touch and key events)
//!   ├─> Calibration Session (UL → UR → LL → LR, timeout / abort)
//!   ├─> Solver + Validator (closed-form fit, finite check)
//!   └─> Output (X.org snippet, xinput command, file)
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Calibration engine: geometry, session, solver, validation
pub mod calibration;

/// Calibration workflow orchestration
pub mod calibrator;

/// Command line interface
pub mod cli;

/// Calibrator configuration
pub mod config;

/// Input device registry
pub mod device;

/// Crate-level errors and exit codes
pub mod error;

/// Calibration output rendering
pub mod output;

/// Display surfaces and screen geometry
pub mod screen;

/// Utility functions
pub mod utils;

pub use calibrator::{CalibrationReport, Calibrator, RunOptions};
pub use error::{classify_error, CalibratorError, ErrorKind};
