//! Replay Display Surface
//!
//! Plays back a scripted touch trace instead of reading a live display.
//! Useful for headless runs, demos and reproducing calibration problems.
//!
//! # Script Format
//!
//! One step per line, `#` starts a comment:
//!
//! ```text
//! # upper-left, then two idle polls
//! touch 213 120
//! idle 2
//! touch 1707 120
//! touch 213 960
//! touch 1707 960
//! key
//! ```
//!
//! Each `touch` and `key` answers one poll; `idle N` answers N polls with
//! nothing. Once the script is exhausted every poll reports a key press, so
//! a short script ends the session instead of hanging it.

use std::collections::VecDeque;
use std::path::Path;

use tracing::{debug, warn};

use super::{DisplaySurface, Result, ScreenError, SurfaceEvent, TargetColor};
use crate::calibration::geometry::{Point, ScreenGeometry};

/// One parsed script line
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReplayStep {
    /// Touch at a raw position
    Touch(Point),
    /// Key press
    Key,
    /// N polls with no event
    Idle(u32),
}

/// Display surface driven by a replay script
#[derive(Debug)]
pub struct ReplaySurface {
    geometry: ScreenGeometry,
    steps: VecDeque<ReplayStep>,
    exhausted: bool,
    message: Vec<String>,
}

impl ReplaySurface {
    /// Build a surface from parsed steps
    pub fn new(geometry: ScreenGeometry, steps: &[ReplayStep]) -> Self {
        let steps = steps
            .iter()
            .copied()
            .filter(|step| *step != ReplayStep::Idle(0))
            .collect();

        Self {
            geometry,
            steps,
            exhausted: false,
            message: Vec::new(),
        }
    }

    /// Parse a script and build a surface from it
    pub fn from_script(geometry: ScreenGeometry, script: &str) -> Result<Self> {
        let steps = parse_script(script)?;
        Ok(Self::new(geometry, &steps))
    }

    /// Load a script file
    pub fn from_file(geometry: ScreenGeometry, path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("Loading replay script: {:?}", path);
        let script = std::fs::read_to_string(path)?;
        Self::from_script(geometry, &script)
    }

    /// Polls the script still answers before it is exhausted
    pub fn remaining(&self) -> u64 {
        self.steps
            .iter()
            .map(|step| match step {
                ReplayStep::Idle(count) => u64::from(*count),
                _ => 1,
            })
            .sum()
    }

    /// Lines passed to the last `show_message` call
    pub fn message(&self) -> &[String] {
        &self.message
    }
}

/// Parse a replay script into steps
pub fn parse_script(script: &str) -> Result<Vec<ReplayStep>> {
    let mut steps = Vec::new();

    for (idx, raw) in script.lines().enumerate() {
        let line_no = idx + 1;
        let line = raw.split('#').next().unwrap_or_default().trim();
        if line.is_empty() {
            continue;
        }

        let mut parts = line.split_whitespace();
        let keyword = parts.next().unwrap_or_default();
        let args: Vec<&str> = parts.collect();
        let error = |message: String| ScreenError::Replay {
            line: line_no,
            message,
        };

        let step = match (keyword, args.as_slice()) {
            ("touch", [x, y]) => {
                let x = x
                    .parse()
                    .map_err(|_| error(format!("invalid x coordinate '{}'", x)))?;
                let y = y
                    .parse()
                    .map_err(|_| error(format!("invalid y coordinate '{}'", y)))?;
                ReplayStep::Touch(Point::new(x, y))
            }
            ("key", []) => ReplayStep::Key,
            ("idle", []) => ReplayStep::Idle(1),
            ("idle", [count]) => ReplayStep::Idle(
                count
                    .parse()
                    .map_err(|_| error(format!("invalid idle count '{}'", count)))?,
            ),
            _ => return Err(error(format!("unrecognised step '{}'", line))),
        };
        steps.push(step);
    }

    Ok(steps)
}

impl DisplaySurface for ReplaySurface {
    fn geometry(&self) -> ScreenGeometry {
        self.geometry
    }

    fn highlight_target(&mut self, point: Point, color: TargetColor) {
        debug!("Draw {:?} target at {}", color, point);
    }

    fn clear_target(&mut self, point: Point, color: TargetColor) {
        debug!("Clear target at {} ({:?})", point, color);
    }

    fn show_message(&mut self, lines: &[String]) {
        for line in lines {
            debug!("Message: {}", line);
        }
        self.message = lines.to_vec();
    }

    fn poll_event(&mut self) -> SurfaceEvent {
        if let Some(ReplayStep::Idle(count)) = self.steps.front_mut() {
            *count -= 1;
            if *count == 0 {
                self.steps.pop_front();
            }
            return SurfaceEvent::Idle;
        }

        match self.steps.pop_front() {
            Some(ReplayStep::Touch(point)) => SurfaceEvent::TouchAt(point),
            Some(ReplayStep::Key) => SurfaceEvent::KeyPressed,
            Some(ReplayStep::Idle(_)) | None => {
                if !self.exhausted {
                    warn!("Replay script exhausted, treating as key press");
                    self.exhausted = true;
                }
                SurfaceEvent::KeyPressed
            }
        }
    }
}
