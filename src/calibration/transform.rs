//! Affine Transform
//!
//! The 3x3 coordinate transformation matrix handed to the input subsystem,
//! and the validity check that guards every use of it.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::calibration::geometry::Point;

/// Row-major 3x3 matrix `[[a, b, c], [d, e, f], [0, 0, 1]]`
///
/// Maps normalized touch coordinates to normalized screen coordinates. The
/// values are 32-bit floats because that is the device property format.
/// Validity is not enforced on construction; call [`Transform::is_valid`]
/// before applying a transform anywhere.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Transform {
    values: [f32; 9],
}

impl Transform {
    /// The identity transform (no calibration)
    pub const IDENTITY: Transform = Transform {
        values: [1.0, 0.0, 0.0, 0.0, 1.0, 0.0, 0.0, 0.0, 1.0],
    };

    /// Wrap nine row-major values
    pub const fn from_values(values: [f32; 9]) -> Self {
        Self { values }
    }

    /// Build an affine transform from its six free coefficients
    pub fn affine(a: f32, b: f32, c: f32, d: f32, e: f32, f: f32) -> Self {
        Self::from_values([a, b, c, d, e, f, 0.0, 0.0, 1.0])
    }

    /// Row-major values
    pub fn values(&self) -> &[f32; 9] {
        &self.values
    }

    /// Value at `row`, `col`
    pub fn get(&self, row: usize, col: usize) -> f32 {
        self.values[row * 3 + col]
    }

    /// True when every component is finite
    ///
    /// NaN and infinities both reject: an infinite coefficient comes from a
    /// denominator that underflowed and would send the pointer off-screen.
    pub fn is_valid(&self) -> bool {
        self.values.iter().all(|v| v.is_finite())
    }

    /// Apply the transform to a normalized point (each axis in `[0, 1]`)
    pub fn apply_normalized(&self, x: f64, y: f64) -> (f64, f64) {
        let v = self.values.map(f64::from);
        (
            v[0] * x + v[1] * y + v[2],
            v[3] * x + v[4] * y + v[5],
        )
    }

    /// Map a raw touch point to screen pixels for a `width` x `height` screen
    pub fn map_point(&self, point: Point, width: u32, height: u32) -> (f64, f64) {
        let (w, h) = (f64::from(width), f64::from(height));
        let (x, y) = self.apply_normalized(f64::from(point.x) / w, f64::from(point.y) / h);
        (x * w, y * h)
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::IDENTITY
    }
}

impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (idx, value) in self.values.iter().enumerate() {
            if idx > 0 {
                f.write_str(" ")?;
            }
            write!(f, "{}", value)?;
        }
        Ok(())
    }
}

/// Free-function form of [`Transform::is_valid`]
pub fn is_valid(transform: &Transform) -> bool {
    transform.is_valid()
}
