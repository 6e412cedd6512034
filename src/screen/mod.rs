//! Display Surface
//!
//! The calibration session draws its targets and reads touches through the
//! [`DisplaySurface`] trait. Window creation, fonts and input grabs live
//! behind it, so the engine never talks to the display server directly.
//!
//! # Provided Surfaces
//!
//! - [`ReplaySurface`] - plays back a scripted touch trace (`--replay`)
//!
//! Screen extents for a live display are read with [`probe_geometry`], which
//! parses `xdpyinfo` output for the requested screen.

pub mod geometry;
pub mod replay;

pub use geometry::{parse_xdpyinfo_dimensions, probe_geometry};
pub use replay::{ReplayStep, ReplaySurface};

use thiserror::Error;

use crate::calibration::geometry::{Point, ScreenGeometry};

/// Display surface error types
#[derive(Error, Debug)]
pub enum ScreenError {
    /// Display server could not be queried
    #[error("Display unavailable: {0}")]
    Unavailable(String),

    /// Requested screen does not exist
    #[error("Screen {0} not found")]
    ScreenNotFound(u32),

    /// Replay script could not be read or parsed
    #[error("Replay script error at line {line}: {message}")]
    Replay {
        /// 1-based line number
        line: usize,
        /// What went wrong
        message: String,
    },

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for display surface operations
pub type Result<T> = std::result::Result<T, ScreenError>;

/// Colour role of a drawn target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TargetColor {
    /// Target the user must touch now (red cross)
    Active,
    /// Target already collected (white cross)
    Done,
}

/// One result of a non-blocking poll
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SurfaceEvent {
    /// Nothing happened since the previous poll
    Idle,
    /// Pointer button or touch activation at a raw position
    TouchAt(Point),
    /// Any key was pressed
    KeyPressed,
}

/// Fullscreen overlay used during calibration
pub trait DisplaySurface {
    /// Screen extents covered by the surface
    fn geometry(&self) -> ScreenGeometry;

    /// Draw the target at `point`
    fn highlight_target(&mut self, point: Point, color: TargetColor);

    /// Redraw the target at `point` in its inactive colour
    fn clear_target(&mut self, point: Point, color: TargetColor);

    /// Show instruction lines centred on screen
    fn show_message(&mut self, lines: &[String]);

    /// Poll for the next input event without blocking
    fn poll_event(&mut self) -> SurfaceEvent;
}

impl<S: DisplaySurface + ?Sized> DisplaySurface for &mut S {
    fn geometry(&self) -> ScreenGeometry {
        (**self).geometry()
    }

    fn highlight_target(&mut self, point: Point, color: TargetColor) {
        (**self).highlight_target(point, color)
    }

    fn clear_target(&mut self, point: Point, color: TargetColor) {
        (**self).clear_target(point, color)
    }

    fn show_message(&mut self, lines: &[String]) {
        (**self).show_message(lines)
    }

    fn poll_event(&mut self) -> SurfaceEvent {
        (**self).poll_event()
    }
}
