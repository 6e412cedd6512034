//! Four-Point Transform Solver
//!
//! Closed-form affine fit for the four-corner calibration pattern.
//!
//! Each output row is derived from two midpoints of the normalized touches.
//! For the X row, `x0` is the midpoint of the left touches and `x1` the
//! midpoint of the right touches. The row must satisfy:
//!
//! ```text
//! x0x * a + x0y * b + c = width_coef                (left edge)
//! (x1x - x0x) * a + (x1y - x0y) * b = height_coef   (span between edges)
//! a / b = dxx / dxy                                 (row follows the delta)
//! ```
//!
//! which gives `a = height_coef * dxx / (dxx² + dxy²)`, the same for `b`
//! with `dxy`, and `c` by substituting back into the left-edge equation.
//! The Y row uses the top and bottom midpoints in the same way.
//!
//! The solver is total: degenerate touches (coincident midpoints) produce
//! NaN or infinite coefficients, which [`Transform::is_valid`] rejects.

use tracing::debug;

use crate::calibration::geometry::{Corner, CorrespondenceSet};
use crate::calibration::transform::Transform;

/// Normalized touch coordinate
#[derive(Debug, Clone, Copy, PartialEq)]
struct Unit {
    x: f64,
    y: f64,
}

impl Unit {
    fn midpoint(self, other: Unit) -> Unit {
        Unit {
            x: (self.x + other.x) / 2.0,
            y: (self.y + other.y) / 2.0,
        }
    }
}

/// Solve the touch-to-screen transform from four correspondences
///
/// `width` and `height` are the screen extents in pixels. The corner pairing
/// is fixed: left/right edges come from (UL, LL) and (UR, LR), top/bottom
/// edges from (UL, UR) and (LL, LR).
pub fn solve(set: &CorrespondenceSet, width: u32, height: u32) -> Transform {
    let width = f64::from(width);
    let height = f64::from(height);

    let ul_target = set[Corner::UpperLeft].target;
    let ur_target = set[Corner::UpperRight].target;
    let lr_target = set[Corner::LowerRight].target;

    let width_coef = f64::from(ul_target.x) / width;
    let height_coef = f64::from(lr_target.y - ur_target.y) / height;
    debug!(
        "width: {} height: {} width_coef: {} height_coef: {}",
        width, height, width_coef, height_coef
    );

    let clicks = Corner::ALL.map(|corner| {
        let observed = set[corner].observed;
        Unit {
            x: f64::from(observed.x) / width,
            y: f64::from(observed.y) / height,
        }
    });
    let click = |corner: Corner| clicks[corner.index()];

    let x0 = click(Corner::UpperLeft).midpoint(click(Corner::LowerLeft));
    let x1 = click(Corner::UpperRight).midpoint(click(Corner::LowerRight));
    let y0 = click(Corner::UpperLeft).midpoint(click(Corner::UpperRight));
    let y1 = click(Corner::LowerLeft).midpoint(click(Corner::LowerRight));

    let dxx = x1.x - x0.x;
    let dxy = x1.y - x0.y;
    let dyx = y1.x - y0.x;
    let dyy = y1.y - y0.y;

    let x_norm = dxx * dxx + dxy * dxy;
    let a = height_coef * (dxx / x_norm);
    let b = height_coef * (dxy / x_norm);
    let c = width_coef - a * x0.x - b * x0.y;

    let y_norm = dyx * dyx + dyy * dyy;
    let d = height_coef * (dyx / y_norm);
    let e = height_coef * (dyy / y_norm);
    let f = width_coef - d * y0.x - e * y0.y;

    let transform = Transform::affine(a as f32, b as f32, c as f32, d as f32, e as f32, f as f32);
    debug!("Solved transform: {}", transform);
    transform
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::geometry::{Point, ScreenGeometry, TargetSet};
    use proptest::prelude::*;

    const EPS: f32 = 1e-5;

    fn assert_close(actual: f32, expected: f32) {
        assert!(
            (actual - expected).abs() < EPS,
            "expected {} got {}",
            expected,
            actual
        );
    }

    fn square_targets() -> TargetSet {
        TargetSet::inset(ScreenGeometry::new(1000, 1000), 9)
    }

    #[test]
    fn test_identity_when_touches_match_targets() {
        let targets = square_targets();
        let set = CorrespondenceSet::new(targets, *targets.points());

        let t = solve(&set, 1000, 1000);

        assert!(t.is_valid());
        assert_close(t.get(0, 0), 1.0);
        assert_close(t.get(0, 1), 0.0);
        assert_close(t.get(0, 2), 0.0);
        assert_close(t.get(1, 0), 0.0);
        assert_close(t.get(1, 1), 1.0);
        assert_close(t.get(1, 2), 0.0);
        assert_eq!(&t.values()[6..], &[0.0, 0.0, 1.0]);
    }

    #[test]
    fn test_identity_on_wide_screen() {
        let geometry = ScreenGeometry::new(1800, 900);
        let targets = TargetSet::inset(geometry, 9);
        let set = CorrespondenceSet::new(targets, *targets.points());

        let t = solve(&set, geometry.width, geometry.height);

        assert_close(t.get(0, 0), 1.0);
        assert_close(t.get(1, 1), 1.0);
        assert_close(t.get(0, 2), 0.0);
        assert_close(t.get(1, 2), 0.0);
    }

    #[test]
    fn test_compressed_sensor_scales_up() {
        // Sensor only reports half the screen span around the centre
        let targets = square_targets();
        let observed = [
            Point::new(306, 306),
            Point::new(694, 306),
            Point::new(306, 694),
            Point::new(694, 694),
        ];
        let set = CorrespondenceSet::new(targets, observed);

        let t = solve(&set, 1000, 1000);

        assert!(t.is_valid());
        assert!((t.get(0, 0) - 2.005).abs() < 0.01);
        assert!((t.get(1, 1) - 2.005).abs() < 0.01);

        let (x, y) = t.map_point(Point::new(306, 306), 1000, 1000);
        assert!((x - 111.0).abs() < 2.0);
        assert!((y - 111.0).abs() < 2.0);
    }

    #[test]
    fn test_swapped_axes_produce_off_diagonal() {
        let targets = square_targets();
        let observed = targets.points().map(|p| Point::new(p.y, p.x));
        let set = CorrespondenceSet::new(targets, observed);

        let t = solve(&set, 1000, 1000);

        assert_close(t.get(0, 0), 0.0);
        assert_close(t.get(0, 1), 1.0);
        assert_close(t.get(1, 0), 1.0);
        assert_close(t.get(1, 1), 0.0);
    }

    #[test]
    fn test_identical_touches_are_degenerate() {
        let targets = square_targets();
        let set = CorrespondenceSet::new(targets, [Point::new(500, 500); 4]);

        let t = solve(&set, 1000, 1000);

        assert!(t.values().iter().any(|v| v.is_nan()));
        assert!(!t.is_valid());
    }

    #[test]
    fn test_coincident_left_right_midpoints_are_degenerate() {
        // UL == UR and LL == LR: the left and right edge midpoints coincide
        let targets = square_targets();
        let observed = [
            Point::new(200, 100),
            Point::new(200, 100),
            Point::new(800, 900),
            Point::new(800, 900),
        ];
        let set = CorrespondenceSet::new(targets, observed);

        let t = solve(&set, 1000, 1000);

        assert!(t.get(0, 0).is_nan());
        assert!(!t.is_valid());
    }

    proptest! {
        #[test]
        fn prop_solve_is_deterministic(
            coords in prop::array::uniform8(0i32..4096),
            width in 320u32..4000,
            height in 240u32..3000,
        ) {
            let targets = TargetSet::inset(ScreenGeometry::new(width, height), 9);
            let observed = [
                Point::new(coords[0], coords[1]),
                Point::new(coords[2], coords[3]),
                Point::new(coords[4], coords[5]),
                Point::new(coords[6], coords[7]),
            ];
            let set = CorrespondenceSet::new(targets, observed);

            let first = solve(&set, width, height);
            let second = solve(&set, width, height);

            let first_bits = first.values().map(f32::to_bits);
            let second_bits = second.values().map(f32::to_bits);
            prop_assert_eq!(first_bits, second_bits);
        }
    }
}
