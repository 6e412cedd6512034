//! Input Device Registry
//!
//! Enumerates pointer devices and reads or writes their
//! "Coordinate Transformation Matrix" property.
//!
//! The [`DeviceRegistry`] trait is the only way the calibrator touches
//! device state. [`XinputRegistry`] drives the `xinput` tool; tests plug in
//! in-memory registries.

pub mod xinput;

pub use xinput::{parse_list_long, parse_matrix_property, XinputRegistry};

use std::fmt;

use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::calibration::transform::Transform;

/// Name of the X input property holding the 3x3 matrix
pub const MATRIX_PROPERTY: &str = "Coordinate Transformation Matrix";

/// Device name used by `--fake` runs
pub const FAKE_DEVICE_NAME: &str = "fake";

/// Device registry error types
#[derive(Error, Debug)]
pub enum DeviceError {
    /// Device subsystem could not be reached
    #[error("Input subsystem unavailable: {0}")]
    InputUnavailable(String),

    /// No device reports two absolute axes
    #[error("No calibratable devices found")]
    NoCalibratableDevice,

    /// Requested device does not exist
    #[error("Device {0} not found; use --list to list the calibratable input devices")]
    DeviceNotFound(String),

    /// Requested device exists but cannot be calibrated
    #[error("Device id: {id} \"{name}\" is not calibratable")]
    NotCalibratable {
        /// Device id
        id: u32,
        /// Device name
        name: String,
    },

    /// Matrix property missing or in an unexpected format
    #[error("Failed to access \"Coordinate Transformation Matrix\" on device {id}: {reason}")]
    PropertyUnavailable {
        /// Device id
        id: u32,
        /// What went wrong
        reason: String,
    },

    /// Refused to write a matrix with non-finite components
    #[error("Refusing to apply invalid transform matrix: {0}")]
    InvalidTransform(Transform),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for device operations
pub type Result<T> = std::result::Result<T, DeviceError>;

/// One slave pointer device
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DeviceInfo {
    /// X input device id
    pub id: u32,
    /// Product name
    pub name: String,
    /// Reports two absolute axes with a defined range
    pub calibratable: bool,
}

impl DeviceInfo {
    /// Create device info
    pub fn new(id: u32, name: impl Into<String>, calibratable: bool) -> Self {
        Self {
            id,
            name: name.into(),
            calibratable,
        }
    }
}

impl fmt::Display for DeviceInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "id: {} \"{}\" calibratable:{}",
            self.id,
            self.name,
            u8::from(self.calibratable)
        )
    }
}

/// Access to input devices and their transformation matrix
#[cfg_attr(test, mockall::automock)]
pub trait DeviceRegistry {
    /// All slave input devices
    fn list_devices(&self) -> Result<Vec<DeviceInfo>>;

    /// Current matrix, `None` when the device has no such property
    fn get_transform_property(&self, id: u32) -> Result<Option<Transform>>;

    /// Replace the matrix
    fn set_transform_property(&self, id: u32, transform: &Transform) -> Result<()>;
}

/// Which device the user asked for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DeviceSelector {
    /// Match by id
    pub id: Option<u32>,
    /// Match by exact name
    pub name: Option<String>,
}

impl DeviceSelector {
    fn describe(&self) -> String {
        match (&self.name, self.id) {
            (Some(name), _) => format!("\"{}\"", name),
            (None, Some(id)) => format!("id: {}", id),
            (None, None) => "<any>".to_string(),
        }
    }
}

/// Pick the device to calibrate
///
/// An id or name match wins outright. Without a selector the last
/// calibratable device is chosen.
pub fn select_device(devices: &[DeviceInfo], selector: &DeviceSelector) -> Result<DeviceInfo> {
    let explicit = selector.id.is_some() || selector.name.is_some();

    if explicit {
        let found = devices.iter().find(|info| {
            selector.id == Some(info.id) || selector.name.as_deref() == Some(info.name.as_str())
        });

        return match found {
            Some(info) if info.calibratable => {
                info!("Selected device id: {} \"{}\"", info.id, info.name);
                Ok(info.clone())
            }
            Some(info) => Err(DeviceError::NotCalibratable {
                id: info.id,
                name: info.name.clone(),
            }),
            None => Err(DeviceError::DeviceNotFound(selector.describe())),
        };
    }

    let calibratable: Vec<&DeviceInfo> = devices.iter().filter(|d| d.calibratable).collect();
    let chosen = calibratable
        .last()
        .copied()
        .ok_or(DeviceError::NoCalibratableDevice)?;

    if calibratable.len() > 1 {
        warn!(
            "Multiple calibratable devices found, calibrating last one (\"{}\"); \
             use --device-name or --device-id to choose another",
            chosen.name
        );
    }

    info!("Selected device id: {} \"{}\"", chosen.id, chosen.name);
    Ok(chosen.clone())
}

/// Write a validated transform to a device
///
/// The current property must exist before it is replaced.
pub fn apply_transform<R>(registry: &R, id: u32, transform: &Transform) -> Result<()>
where
    R: DeviceRegistry + ?Sized,
{
    if !transform.is_valid() {
        return Err(DeviceError::InvalidTransform(*transform));
    }

    let current = registry
        .get_transform_property(id)?
        .ok_or_else(|| DeviceError::PropertyUnavailable {
            id,
            reason: "property not present".to_string(),
        })?;
    debug!("Device {} matrix before apply: {}", id, current);

    registry.set_transform_property(id, transform)?;
    info!("Applied transform to device {}: {}", id, transform);
    Ok(())
}

/// Put the identity matrix back so raw coordinates are reported
pub fn reset_calibration<R>(registry: &R, id: u32) -> Result<()>
where
    R: DeviceRegistry + ?Sized,
{
    debug!("Resetting calibration of device {}", id);
    apply_transform(registry, id, &Transform::IDENTITY)
}
