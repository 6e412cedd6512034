//! Calibration Session
//!
//! Collects the four touch correspondences from a [`DisplaySurface`].
//!
//! # State Machine
//!
//! ```text
//! AwaitingPoint(UL) ─touch→ AwaitingPoint(UR) ─touch→ AwaitingPoint(LL)
//!        │                        │                         │
//!        │                        │                       touch
//!        │                        │                         ↓
//!        │                        │                  AwaitingPoint(LR) ─touch→ Completed
//!        └──── key ───────────────┴──── key ────────────────┴──── key ────→ Aborted
//!        └──── timeout ───────────┴──── timeout ────────────┴──── timeout → TimedOut
//! ```
//!
//! Every corner has its own timeout window. `Aborted` and `TimedOut` are
//! terminal: once reached, no further events are read from the surface.

use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::calibration::error::{CalibrationError, Result};
use crate::calibration::geometry::{Corner, CorrespondenceSet, Point, TargetSet};
use crate::screen::{DisplaySurface, SurfaceEvent, TargetColor};

/// Default pause between two polls of the surface
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);

/// Session timing configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SessionConfig {
    /// Maximum wait per corner (None = wait forever)
    pub timeout: Option<Duration>,

    /// Sleep between polls
    pub poll_interval: Duration,
}

impl SessionConfig {
    /// Build a configuration from a timeout in seconds (0 = wait forever)
    pub fn from_timeout_secs(timeout_secs: u64) -> Self {
        Self {
            timeout: (timeout_secs > 0).then(|| Duration::from_secs(timeout_secs)),
            ..Self::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            timeout: None,
            poll_interval: DEFAULT_POLL_INTERVAL,
        }
    }
}

/// Time source for the wait loop
pub trait Clock {
    /// Current instant
    fn now(&self) -> Instant;

    /// Block for `duration`
    fn sleep(&self, duration: Duration);
}

/// Wall clock backed by `std::thread::sleep`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn sleep(&self, duration: Duration) {
        std::thread::sleep(duration);
    }
}

/// Session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    /// Waiting for a touch on the given corner
    AwaitingPoint(Corner),
    /// All four corners collected
    Completed,
    /// A key was pressed while waiting on the given corner
    Aborted(Corner),
    /// The per-corner timeout expired on the given corner
    TimedOut(Corner),
}

/// One calibration run against a display surface
pub struct CalibrationSession<S: DisplaySurface, C: Clock = SystemClock> {
    surface: S,
    clock: C,
    config: SessionConfig,
    targets: TargetSet,
    observed: [Option<Point>; 4],
    state: SessionState,
    corner_started: Option<Instant>,
}

impl<S: DisplaySurface> CalibrationSession<S, SystemClock> {
    /// Create a session using the system clock
    pub fn new(surface: S, targets: TargetSet, config: SessionConfig) -> Self {
        Self::with_clock(surface, targets, config, SystemClock)
    }
}

impl<S: DisplaySurface, C: Clock> CalibrationSession<S, C> {
    /// Create a session with an explicit clock
    pub fn with_clock(surface: S, targets: TargetSet, config: SessionConfig, clock: C) -> Self {
        Self {
            surface,
            clock,
            config,
            targets,
            observed: [None; 4],
            state: SessionState::AwaitingPoint(Corner::UpperLeft),
            corner_started: None,
        }
    }

    /// Current state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Touches recorded so far, in corner order
    pub fn observed(&self) -> &[Option<Point>; 4] {
        &self.observed
    }

    /// Number of corners collected
    pub fn collected(&self) -> usize {
        self.observed.iter().filter(|p| p.is_some()).count()
    }

    /// Perform one poll of the surface and return the resulting state
    ///
    /// The first call for a corner draws its target and starts that corner's
    /// timeout window. Terminal states are sticky and never poll again.
    pub fn advance(&mut self) -> SessionState {
        let corner = match self.state {
            SessionState::AwaitingPoint(corner) => corner,
            terminal => return terminal,
        };

        let started = match self.corner_started {
            Some(started) => started,
            None => self.begin_corner(corner),
        };

        match self.surface.poll_event() {
            SurfaceEvent::TouchAt(point) => {
                debug!("Touch for {} corner at {}", corner, point);
                self.observed[corner.index()] = Some(point);
                self.corner_started = None;
                self.state = match corner.next() {
                    Some(next) => SessionState::AwaitingPoint(next),
                    None => SessionState::Completed,
                };
            }
            SurfaceEvent::KeyPressed => {
                info!("Key pressed, calibration aborted at {} corner", corner);
                self.state = SessionState::Aborted(corner);
            }
            SurfaceEvent::Idle => {
                if let Some(timeout) = self.config.timeout {
                    if self.clock.now().saturating_duration_since(started) >= timeout {
                        warn!("Timeout {} sec. is over", timeout.as_secs_f64());
                        self.state = SessionState::TimedOut(corner);
                    }
                }
            }
        }

        self.state
    }

    /// Drive the session to a terminal state
    ///
    /// Sleeps for the poll interval between idle polls. Returns the complete
    /// correspondence set, or the reason collection stopped.
    pub fn run(mut self) -> Result<CorrespondenceSet> {
        loop {
            match self.advance() {
                SessionState::AwaitingPoint(corner) => {
                    if self.corner_started.is_some() {
                        self.clock.sleep(self.config.poll_interval);
                    } else {
                        debug!("Advancing to {} corner", corner);
                    }
                }
                SessionState::Completed => break,
                SessionState::Aborted(corner) => {
                    return Err(CalibrationError::SessionAborted {
                        corner,
                        collected: self.collected(),
                    });
                }
                SessionState::TimedOut(corner) => {
                    return Err(CalibrationError::SessionTimedOut {
                        corner,
                        collected: self.collected(),
                        timeout: self.config.timeout.unwrap_or_default(),
                    });
                }
            }
        }

        // Completed is only reached once every corner holds a touch
        let observed = self.observed.map(Option::unwrap_or_default);
        let set = CorrespondenceSet::new(self.targets, observed);
        for corner in Corner::ALL {
            debug!(
                "{}: point {} touch {}",
                corner, set[corner].target, set[corner].observed
            );
        }
        Ok(set)
    }

    fn begin_corner(&mut self, corner: Corner) -> Instant {
        self.surface
            .highlight_target(self.targets[corner], TargetColor::Active);
        if let Some(previous) = corner.previous() {
            self.surface
                .clear_target(self.targets[previous], TargetColor::Done);
        }

        let now = self.clock.now();
        self.corner_started = Some(now);
        now
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::calibration::geometry::ScreenGeometry;
    use std::cell::Cell;
    use std::collections::VecDeque;

    #[derive(Debug, Clone, PartialEq)]
    enum Draw {
        Highlight(Point),
        Clear(Point),
    }

    struct ScriptedSurface {
        events: VecDeque<SurfaceEvent>,
        draws: Vec<Draw>,
        polls: usize,
    }

    impl ScriptedSurface {
        fn new(events: impl IntoIterator<Item = SurfaceEvent>) -> Self {
            Self {
                events: events.into_iter().collect(),
                draws: Vec::new(),
                polls: 0,
            }
        }
    }

    impl DisplaySurface for ScriptedSurface {
        fn geometry(&self) -> ScreenGeometry {
            ScreenGeometry::new(1000, 1000)
        }

        fn highlight_target(&mut self, point: Point, _color: TargetColor) {
            self.draws.push(Draw::Highlight(point));
        }

        fn clear_target(&mut self, point: Point, _color: TargetColor) {
            self.draws.push(Draw::Clear(point));
        }

        fn show_message(&mut self, _lines: &[String]) {}

        fn poll_event(&mut self) -> SurfaceEvent {
            self.polls += 1;
            self.events.pop_front().unwrap_or(SurfaceEvent::Idle)
        }
    }

    /// Clock whose sleep advances time instantly
    struct ManualClock {
        origin: Instant,
        elapsed: Cell<Duration>,
    }

    impl ManualClock {
        fn new() -> Self {
            Self {
                origin: Instant::now(),
                elapsed: Cell::new(Duration::ZERO),
            }
        }
    }

    impl Clock for &ManualClock {
        fn now(&self) -> Instant {
            self.origin + self.elapsed.get()
        }

        fn sleep(&self, duration: Duration) {
            self.elapsed.set(self.elapsed.get() + duration);
        }
    }

    fn targets() -> TargetSet {
        TargetSet::inset(ScreenGeometry::new(1000, 1000), 9)
    }

    fn touch(x: i32, y: i32) -> SurfaceEvent {
        SurfaceEvent::TouchAt(Point::new(x, y))
    }

    #[test]
    fn test_touches_recorded_in_corner_order() {
        let surface = ScriptedSurface::new([
            touch(5, 6),
            SurfaceEvent::Idle,
            touch(900, 7),
            touch(8, 950),
            SurfaceEvent::Idle,
            SurfaceEvent::Idle,
            touch(990, 991),
        ]);
        let clock = ManualClock::new();
        let session =
            CalibrationSession::with_clock(surface, targets(), SessionConfig::default(), &clock);

        let set = session.run().unwrap();

        assert_eq!(set[Corner::UpperLeft].observed, Point::new(5, 6));
        assert_eq!(set[Corner::UpperRight].observed, Point::new(900, 7));
        assert_eq!(set[Corner::LowerLeft].observed, Point::new(8, 950));
        assert_eq!(set[Corner::LowerRight].observed, Point::new(990, 991));
        assert_eq!(set[Corner::LowerRight].target, Point::new(889, 889));
    }

    #[test]
    fn test_previous_target_cleared_when_advancing() {
        let mut surface =
            ScriptedSurface::new([touch(1, 1), touch(2, 2), touch(3, 3), touch(4, 4)]);
        let clock = ManualClock::new();
        let t = targets();
        let session =
            CalibrationSession::with_clock(&mut surface, t, SessionConfig::default(), &clock);
        session.run().unwrap();

        assert_eq!(
            surface.draws,
            vec![
                Draw::Highlight(t[Corner::UpperLeft]),
                Draw::Highlight(t[Corner::UpperRight]),
                Draw::Clear(t[Corner::UpperLeft]),
                Draw::Highlight(t[Corner::LowerLeft]),
                Draw::Clear(t[Corner::UpperRight]),
                Draw::Highlight(t[Corner::LowerRight]),
                Draw::Clear(t[Corner::LowerLeft]),
            ]
        );
    }

    #[test]
    fn test_key_press_aborts_and_ignores_later_touches() {
        let mut surface = ScriptedSurface::new([
            touch(1, 1),
            SurfaceEvent::KeyPressed,
            touch(2, 2),
            touch(3, 3),
            touch(4, 4),
        ]);
        let clock = ManualClock::new();
        let mut session =
            CalibrationSession::with_clock(&mut surface, targets(), SessionConfig::default(), &clock);

        assert_eq!(session.advance(), SessionState::AwaitingPoint(Corner::UpperRight));
        assert_eq!(session.advance(), SessionState::Aborted(Corner::UpperRight));
        for _ in 0..5 {
            assert_eq!(session.advance(), SessionState::Aborted(Corner::UpperRight));
        }
        assert_eq!(session.collected(), 1);
        assert_eq!(session.observed()[1], None);
        drop(session);

        assert_eq!(surface.polls, 2);
        assert_eq!(surface.events.len(), 3);
    }

    #[test]
    fn test_run_reports_abort() {
        let surface = ScriptedSurface::new([touch(1, 1), touch(2, 2), SurfaceEvent::KeyPressed]);
        let clock = ManualClock::new();
        let session =
            CalibrationSession::with_clock(surface, targets(), SessionConfig::default(), &clock);

        match session.run() {
            Err(CalibrationError::SessionAborted { corner, collected }) => {
                assert_eq!(corner, Corner::LowerLeft);
                assert_eq!(collected, 2);
            }
            other => panic!("Expected abort, got {:?}", other),
        }
    }

    #[test]
    fn test_timeout_within_one_poll_interval() {
        let config = SessionConfig {
            timeout: Some(Duration::from_secs(3)),
            poll_interval: Duration::from_millis(70),
        };
        let surface = ScriptedSurface::new([]);
        let clock = ManualClock::new();
        let session = CalibrationSession::with_clock(surface, targets(), config, &clock);

        match session.run() {
            Err(CalibrationError::SessionTimedOut {
                corner, timeout, ..
            }) => {
                assert_eq!(corner, Corner::UpperLeft);
                assert_eq!(timeout, Duration::from_secs(3));
            }
            other => panic!("Expected timeout, got {:?}", other),
        }

        let elapsed = clock.elapsed.get();
        assert!(elapsed >= Duration::from_secs(3));
        assert!(elapsed <= Duration::from_secs(3) + config.poll_interval);
    }

    #[test]
    fn test_timeout_restarts_for_each_corner() {
        let config = SessionConfig {
            timeout: Some(Duration::from_secs(1)),
            poll_interval: Duration::from_millis(100),
        };
        // 8 idle polls (0.8s) before each touch keeps every corner inside its window
        let mut events = Vec::new();
        for corner in 0..4 {
            events.extend(std::iter::repeat(SurfaceEvent::Idle).take(8));
            events.push(touch(corner, corner));
        }
        let surface = ScriptedSurface::new(events);
        let clock = ManualClock::new();
        let session = CalibrationSession::with_clock(surface, targets(), config, &clock);

        assert!(session.run().is_ok());
        assert!(clock.elapsed.get() > Duration::from_secs(3));
    }

    #[test]
    fn test_no_timeout_waits_until_touch() {
        let mut events = vec![SurfaceEvent::Idle; 500];
        events.extend([touch(1, 1), touch(2, 2), touch(3, 3), touch(4, 4)]);
        let surface = ScriptedSurface::new(events);
        let clock = ManualClock::new();
        let config = SessionConfig::from_timeout_secs(0);
        let session = CalibrationSession::with_clock(surface, targets(), config, &clock);

        assert!(session.run().is_ok());
        assert_eq!(clock.elapsed.get(), DEFAULT_POLL_INTERVAL * 500);
    }

    #[test]
    fn test_timeout_with_system_clock() {
        let config = SessionConfig {
            timeout: Some(Duration::from_millis(150)),
            poll_interval: Duration::from_millis(10),
        };
        let started = Instant::now();
        let session = CalibrationSession::new(ScriptedSurface::new([]), targets(), config);

        assert!(matches!(
            session.run(),
            Err(CalibrationError::SessionTimedOut { .. })
        ));
        assert!(started.elapsed() >= Duration::from_millis(150));
    }

    #[test]
    fn test_session_config_from_timeout_secs() {
        assert_eq!(SessionConfig::from_timeout_secs(0).timeout, None);
        assert_eq!(
            SessionConfig::from_timeout_secs(7).timeout,
            Some(Duration::from_secs(7))
        );
    }
}
