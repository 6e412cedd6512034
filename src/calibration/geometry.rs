//! Calibration Geometry
//!
//! Integer points, the four calibration corners and the correspondence set
//! collected during a session.

use std::fmt;
use std::ops::Index;

use serde::{Deserialize, Serialize};

/// Integer 2D point, used for both pixel positions and raw sensor samples
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Point {
    /// X coordinate
    pub x: i32,
    /// Y coordinate
    pub y: i32,
}

impl Point {
    /// Create a new point
    pub const fn new(x: i32, y: i32) -> Self {
        Self { x, y }
    }
}

impl fmt::Display for Point {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.x, self.y)
    }
}

/// Calibration corner
///
/// The discriminant is the slot index inside every four-element calibration
/// array. The solver pairs corners by these positions, so the order is fixed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Corner {
    /// Upper-left
    UpperLeft = 0,
    /// Upper-right
    UpperRight = 1,
    /// Lower-left
    LowerLeft = 2,
    /// Lower-right
    LowerRight = 3,
}

impl Corner {
    /// All corners in collection order
    pub const ALL: [Corner; 4] = [
        Corner::UpperLeft,
        Corner::UpperRight,
        Corner::LowerLeft,
        Corner::LowerRight,
    ];

    /// Slot index of this corner
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Corner collected after this one, if any
    pub fn next(self) -> Option<Corner> {
        Self::ALL.get(self.index() + 1).copied()
    }

    /// Corner collected before this one, if any
    pub fn previous(self) -> Option<Corner> {
        self.index().checked_sub(1).map(|idx| Self::ALL[idx])
    }
}

impl fmt::Display for Corner {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Corner::UpperLeft => "upper-left",
            Corner::UpperRight => "upper-right",
            Corner::LowerLeft => "lower-left",
            Corner::LowerRight => "lower-right",
        };
        f.write_str(name)
    }
}

/// Screen extents in pixels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScreenGeometry {
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
}

impl ScreenGeometry {
    /// Create a new geometry
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }
}

impl fmt::Display for ScreenGeometry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}x{}", self.width, self.height)
    }
}

/// The four on-screen calibration targets, known before collection starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TargetSet {
    points: [Point; 4],
}

impl TargetSet {
    /// Build a target set from explicit points in corner order
    pub const fn new(points: [Point; 4]) -> Self {
        Self { points }
    }

    /// Targets inset from each screen corner by `1 / margin_divisor` of the
    /// screen extent on each axis
    ///
    /// Uses integer division, so a 1000x1000 screen with divisor 9 yields
    /// targets at 111 and 889.
    pub fn inset(geometry: ScreenGeometry, margin_divisor: u32) -> Self {
        let divisor = margin_divisor.max(1) as i32;
        let width = geometry.width as i32;
        let height = geometry.height as i32;
        let offset_x = width / divisor;
        let offset_y = height / divisor;

        Self::new([
            Point::new(offset_x, offset_y),
            Point::new(width - offset_x, offset_y),
            Point::new(offset_x, height - offset_y),
            Point::new(width - offset_x, height - offset_y),
        ])
    }

    /// Target for a corner
    pub fn get(&self, corner: Corner) -> Point {
        self.points[corner.index()]
    }

    /// Targets in corner order
    pub fn points(&self) -> &[Point; 4] {
        &self.points
    }
}

impl Index<Corner> for TargetSet {
    type Output = Point;

    fn index(&self, corner: Corner) -> &Point {
        &self.points[corner.index()]
    }
}

/// One expected-target / observed-touch pair
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Correspondence {
    /// On-screen location the user was asked to touch
    pub target: Point,
    /// Raw coordinate reported by the touch event
    pub observed: Point,
}

/// Exactly four correspondences in upper-left, upper-right, lower-left,
/// lower-right order
///
/// Only constructible with every observation present; a session holds its
/// partial observations separately until the last corner is touched.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CorrespondenceSet {
    pairs: [Correspondence; 4],
}

impl CorrespondenceSet {
    /// Pair targets with observed touches, both in corner order
    pub fn new(targets: TargetSet, observed: [Point; 4]) -> Self {
        let pairs = Corner::ALL.map(|corner| Correspondence {
            target: targets[corner],
            observed: observed[corner.index()],
        });
        Self { pairs }
    }

}

impl Index<Corner> for CorrespondenceSet {
    type Output = Correspondence;

    fn index(&self, corner: Corner) -> &Correspondence {
        &self.pairs[corner.index()]
    }
}
