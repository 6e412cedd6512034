//! User-Friendly Error Formatting
//!
//! Provides user-friendly error messages with troubleshooting hints
//! for common error scenarios.

use std::fmt::Write;

use crate::calibration::CalibrationError;
use crate::error::{CalibratorError, ErrorKind};

/// Format error for user consumption
///
/// Takes technical error and produces user-friendly message with
/// troubleshooting steps and context.
pub fn format_user_error(error: &CalibratorError) -> String {
    let mut output = String::new();

    // Header
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "╔════════════════════════════════════════════════════════════╗"
    )
    .ok();
    writeln!(
        &mut output,
        "║                  CALIBRATION FAILED                        ║"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();
    writeln!(&mut output).ok();

    match error.kind() {
        ErrorKind::InputUnavailable => format_input_error(&mut output),
        ErrorKind::NoCalibratableDevice => format_device_error(&mut output),
        ErrorKind::SessionAborted | ErrorKind::SessionTimedOut => {
            format_session_error(&mut output, error)
        }
        ErrorKind::InvalidTransform => format_transform_error(&mut output),
        ErrorKind::PropertyUnavailable => format_property_error(&mut output),
        ErrorKind::IoFailure => format_io_error(&mut output),
        ErrorKind::Configuration => format_config_error(&mut output),
    }

    // Technical details
    writeln!(&mut output).ok();
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Technical Details:").ok();
    writeln!(&mut output).ok();
    writeln!(&mut output, "{}", error).ok();
    writeln!(&mut output).ok();

    // Footer with help
    writeln!(
        &mut output,
        "━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━━"
    )
    .ok();
    writeln!(&mut output, "Need Help?").ok();
    writeln!(
        &mut output,
        "  - Run with --verbose for detailed logs: lamco-touch-calibrator -vv"
    )
    .ok();
    writeln!(
        &mut output,
        "  - List input devices: lamco-touch-calibrator --list"
    )
    .ok();
    writeln!(
        &mut output,
        "╚════════════════════════════════════════════════════════════╝"
    )
    .ok();

    output
}

fn format_input_error(output: &mut String) {
    writeln!(output, "Display or Input System Unavailable").ok();
    writeln!(output).ok();
    writeln!(output, "Could not query the X server or its input devices.").ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Not running inside an X session").ok();
    writeln!(output, "     → Check: echo $DISPLAY (should not be empty)").ok();
    writeln!(output).ok();
    writeln!(output, "  2. xinput or xdpyinfo not installed").ok();
    writeln!(
        output,
        "     → Install: sudo apt install xinput x11-utils"
    )
    .ok();
    writeln!(output, "     → Or set [device] paths in the config file").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Replay script missing or malformed").ok();
    writeln!(
        output,
        "     → Lines must be 'touch X Y', 'key' or 'idle [N]'"
    )
    .ok();
}

fn format_device_error(output: &mut String) {
    writeln!(output, "No Calibratable Device").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "No input device reporting absolute X and Y axes was selected."
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "Common Causes:").ok();
    writeln!(output).ok();
    writeln!(output, "  1. Wrong --device-name or --device-id").ok();
    writeln!(
        output,
        "     → Run: lamco-touch-calibrator --list and look for calibratable:1"
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  2. Touchscreen not connected or driver not loaded").ok();
    writeln!(output, "     → Run: xinput list").ok();
    writeln!(output).ok();
    writeln!(output, "  3. Testing without hardware").ok();
    writeln!(output, "     → Use --fake to skip device access").ok();
}

fn format_session_error(output: &mut String, error: &CalibratorError) {
    writeln!(output, "Calibration Session Ended Early").ok();
    writeln!(output).ok();
    writeln!(output, "Not all four targets were touched.").ok();
    writeln!(output).ok();
    if let CalibratorError::Calibration(inner) = error {
        if let Some(hint) = inner.hint() {
            writeln!(output, "  → {}", hint).ok();
        }
        if let CalibrationError::SessionAborted { .. } = inner {
            writeln!(output, "  → Any key press during calibration aborts it").ok();
        }
    }
}

fn format_transform_error(output: &mut String) {
    writeln!(output, "Invalid Calibration Result").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "The touches did not produce a usable transformation matrix."
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  → Probably there were misclicks").ok();
    writeln!(
        output,
        "  → Touch the centre of each red cross, one corner at a time"
    )
    .ok();
    writeln!(output, "  → The device was left uncalibrated").ok();
}

fn format_property_error(output: &mut String) {
    writeln!(output, "Transformation Matrix Property Unavailable").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "The device has no usable \"Coordinate Transformation Matrix\"."
    )
    .ok();
    writeln!(output).ok();
    writeln!(output, "  → Check: xinput list-props <id>").ok();
    writeln!(
        output,
        "  → The X.org configuration snippet above can still be installed by hand"
    )
    .ok();
}

fn format_io_error(output: &mut String) {
    writeln!(output, "Could Not Write Calibration File").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "  → Writing to /usr/share/X11/xorg.conf.d usually needs root"
    )
    .ok();
    writeln!(output, "  → Check that the target directory exists").ok();
}

fn format_config_error(output: &mut String) {
    writeln!(output, "Configuration Error").ok();
    writeln!(output).ok();
    writeln!(output, "The configuration file or arguments are invalid.").ok();
    writeln!(output).ok();
    writeln!(
        output,
        "  → Default location: /etc/lamco-touch-calibrator/config.toml"
    )
    .ok();
    writeln!(output, "  → Check TOML syntax and value ranges").ok();
}
