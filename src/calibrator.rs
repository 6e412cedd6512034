//! Calibration Workflow
//!
//! Ties the pieces together for one invocation:
//!
//! ```text
//! list devices → select → reset to identity → show message
//!     → collect four touches → solve → validate → apply → emit snippet
//! ```
//!
//! The device registry, display surface and clock are all injected, so the
//! whole flow runs in tests without an X server.

use std::io::Write;

use tracing::{error, info, warn};

use crate::calibration::geometry::CorrespondenceSet;
use crate::calibration::session::{CalibrationSession, Clock, SystemClock};
use crate::calibration::transform::Transform;
use crate::calibration::{solve, validate};
use crate::config::Config;
use crate::device::{
    apply_transform, reset_calibration, select_device, DeviceError, DeviceInfo, DeviceRegistry,
    DeviceSelector, FAKE_DEVICE_NAME,
};
use crate::error::{CalibratorError, Result};
use crate::output::{device_listing, write_config, xinput_command, xorg_config, OutputError};
use crate::screen::DisplaySurface;

/// Per-invocation choices that are not configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    /// Which device to calibrate
    pub selector: DeviceSelector,
    /// Do not read or write any device
    pub fake: bool,
}

/// Result of a successful collection and solve
#[derive(Debug)]
pub struct CalibrationReport {
    /// Calibrated device
    pub device: DeviceInfo,
    /// Validated transform
    pub transform: Transform,
    /// Raw correspondences the transform was solved from
    pub correspondences: CorrespondenceSet,
    /// X.org configuration snippet
    pub xorg_config: String,
    /// Equivalent `xinput set-prop` command
    pub xinput_command: String,
    /// Live apply failure; the snippet is still emitted
    pub apply_error: Option<DeviceError>,
}

/// Calibration workflow over an injected registry and clock
pub struct Calibrator<'a, R: DeviceRegistry + ?Sized, C: Clock + Clone = SystemClock> {
    config: &'a Config,
    registry: &'a R,
    clock: C,
}

impl<'a, R: DeviceRegistry + ?Sized> Calibrator<'a, R, SystemClock> {
    /// Create a calibrator using the system clock
    pub fn new(config: &'a Config, registry: &'a R) -> Self {
        Self::with_clock(config, registry, SystemClock)
    }
}

impl<'a, R: DeviceRegistry + ?Sized, C: Clock + Clone> Calibrator<'a, R, C> {
    /// Create a calibrator with an explicit clock
    pub fn with_clock(config: &'a Config, registry: &'a R, clock: C) -> Self {
        Self {
            config,
            registry,
            clock,
        }
    }

    /// Text for `--list`
    pub fn list(&self, json: bool) -> Result<String> {
        let devices = self.registry.list_devices()?;
        Ok(device_listing(&devices, json)?)
    }

    /// Resolve the device to calibrate
    pub fn select(&self, options: &RunOptions) -> Result<DeviceInfo> {
        if options.fake {
            info!("Using fake device");
            return Ok(DeviceInfo::new(0, FAKE_DEVICE_NAME, true));
        }

        let devices = self.registry.list_devices()?;
        if devices.is_empty() {
            error!("No input devices found");
            return Err(DeviceError::NoCalibratableDevice.into());
        }
        Ok(select_device(&devices, &options.selector)?)
    }

    /// Select the device and reset it to identity so raw coordinates are reported
    pub fn prepare(&self, options: &RunOptions) -> Result<DeviceInfo> {
        let device = self.select(options)?;
        if !options.fake {
            reset_calibration(self.registry, device.id)?;
            info!("Calibration of \"{}\" reset to identity", device.name);
        }
        Ok(device)
    }

    /// Run the workflow up to, but not including, emitting output
    pub fn run<S: DisplaySurface>(
        &self,
        mut surface: S,
        options: &RunOptions,
    ) -> Result<CalibrationReport> {
        let device = self.prepare(options)?;

        let geometry = surface.geometry();
        info!("Calibrating \"{}\" on a {} screen", device.name, geometry);
        surface.show_message(&self.config.messages.lines);

        let targets = self.config.target_layout(geometry);
        let session = CalibrationSession::with_clock(
            &mut surface,
            targets,
            self.config.session_config(),
            self.clock.clone(),
        );
        let correspondences = session.run()?;

        let transform = validate(solve(&correspondences, geometry.width, geometry.height))?;
        info!("Transform matrix: {}", transform);

        let apply_error = if options.fake {
            None
        } else {
            match apply_transform(self.registry, device.id, &transform) {
                Ok(()) => None,
                Err(e @ DeviceError::PropertyUnavailable { .. }) => {
                    warn!("Live apply failed: {}", e);
                    Some(e)
                }
                Err(e) => return Err(e.into()),
            }
        };

        Ok(CalibrationReport {
            xorg_config: xorg_config(&transform, &device.name),
            xinput_command: xinput_command(&transform, &device.name),
            device,
            transform,
            correspondences,
            apply_error,
        })
    }

    /// Print the snippet, write the output file, then surface any failure
    ///
    /// Every step runs even when an earlier one fails; the first failure is
    /// returned and the rest are logged.
    pub fn emit<W: Write>(&self, report: CalibrationReport, stdout: &mut W) -> Result<()> {
        let printed = stdout
            .write_all(report.xorg_config.as_bytes())
            .and_then(|()| stdout.flush())
            .map_err(|e| CalibratorError::from(OutputError::Print(e)));

        info!("Apply without restarting X: {}", report.xinput_command);
        if self.config.output.print_command {
            eprintln!("{}", report.xinput_command);
        }

        let written = match self.config.output.filename {
            Some(ref path) => {
                write_config(path, &report.xorg_config).map_err(CalibratorError::from)
            }
            None => Ok(()),
        };

        let failures = [
            printed.err(),
            written.err(),
            report.apply_error.map(CalibratorError::Device),
        ];
        let mut failures = failures.into_iter().flatten();
        match failures.next() {
            Some(first) => {
                for other in failures {
                    error!("{}", other);
                }
                Err(first)
            }
            None => Ok(()),
        }
    }
}
