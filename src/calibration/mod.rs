//! Calibration Engine
//!
//! Four-point touch calibration: collect correspondences, solve the affine
//! transform, validate it.
//!
//! # Architecture
//!
//! ```text
//! DisplaySurface events
//!       ↓
//! ┌──────────────────────────┐
//! │  CalibrationSession      │ ← UL → UR → LL → LR, timeout / abort
//! └──────────────────────────┘
//!       ↓ CorrespondenceSet
//! ┌──────────────────────────┐
//! │  solve()                 │ ← closed-form four-corner fit
//! └──────────────────────────┘
//!       ↓ Transform
//! ┌──────────────────────────┐
//! │  validate()              │ ← rejects NaN / infinite components
//! └──────────────────────────┘
//!       ↓
//! Serializer / device registry
//! ```
//!
//! # Usage Example
//!
//! ```rust
//! use lamco_touch_calibrator::calibration::{
//!     solve, validate, CorrespondenceSet, ScreenGeometry, TargetSet,
//! };
//!
//! let geometry = ScreenGeometry::new(1000, 1000);
//! let targets = TargetSet::inset(geometry, 9);
//!
//! // A perfectly aligned sensor reports exactly the target positions
//! let set = CorrespondenceSet::new(targets, *targets.points());
//! let transform = validate(solve(&set, geometry.width, geometry.height)).unwrap();
//!
//! assert!((transform.get(0, 0) - 1.0).abs() < 1e-5);
//! ```

pub mod error;
pub mod geometry;
pub mod session;
pub mod solver;
pub mod transform;

pub use error::{CalibrationError, Result};
pub use geometry::{
    Corner, Correspondence, CorrespondenceSet, Point, ScreenGeometry, TargetSet,
};
pub use session::{
    CalibrationSession, Clock, SessionConfig, SessionState, SystemClock, DEFAULT_POLL_INTERVAL,
};
pub use solver::solve;
pub use transform::{is_valid, Transform};

/// Default inset divisor: targets sit one ninth of the screen in from each edge
pub const DEFAULT_MARGIN_DIVISOR: u32 = 9;

/// Pass a transform through if every component is finite
pub fn validate(transform: Transform) -> Result<Transform> {
    if transform.is_valid() {
        Ok(transform)
    } else {
        Err(CalibrationError::InvalidTransform { transform })
    }
}
