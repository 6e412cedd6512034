//! xinput Registry Backend
//!
//! Talks to the X input subsystem through the `xinput` command line tool:
//!
//! - `xinput list --long` for device enumeration
//! - `xinput list-props <id>` to read the matrix
//! - `xinput set-prop <id> "Coordinate Transformation Matrix" ...` to write it

use std::process::Command;

use tracing::{debug, trace};

use super::{DeviceError, DeviceInfo, DeviceRegistry, Result, MATRIX_PROPERTY};
use crate::calibration::transform::Transform;
use crate::output::property_values;

/// Registry backed by the `xinput` binary
#[derive(Debug, Clone)]
pub struct XinputRegistry {
    program: String,
}

impl XinputRegistry {
    /// Use the given `xinput` executable
    pub fn new(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }

    /// Run xinput, returning stdout or a description of the failure
    fn run(&self, args: &[String]) -> std::result::Result<String, String> {
        trace!("Running {} {:?}", self.program, args);

        let output = Command::new(&self.program)
            .args(args)
            .output()
            .map_err(|e| format!("Failed to execute {}: {}", self.program, e))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(format!(
                "{} {} failed ({}): {}",
                self.program,
                args.first().map(String::as_str).unwrap_or_default(),
                output.status,
                stderr.trim()
            ));
        }

        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl Default for XinputRegistry {
    fn default() -> Self {
        Self::new("xinput")
    }
}

impl DeviceRegistry for XinputRegistry {
    fn list_devices(&self) -> Result<Vec<DeviceInfo>> {
        let stdout = self
            .run(&["list".to_string(), "--long".to_string()])
            .map_err(DeviceError::InputUnavailable)?;
        let devices = parse_list_long(&stdout);
        debug!("xinput reported {} slave devices", devices.len());
        Ok(devices)
    }

    fn get_transform_property(&self, id: u32) -> Result<Option<Transform>> {
        let stdout = self
            .run(&["list-props".to_string(), id.to_string()])
            .map_err(|reason| DeviceError::PropertyUnavailable { id, reason })?;
        parse_matrix_property(&stdout)
            .map_err(|reason| DeviceError::PropertyUnavailable { id, reason })
    }

    fn set_transform_property(&self, id: u32, transform: &Transform) -> Result<()> {
        let mut args = vec![
            "set-prop".to_string(),
            id.to_string(),
            MATRIX_PROPERTY.to_string(),
        ];
        args.extend(property_values(transform).iter().map(|v| v.to_string()));

        self.run(&args)
            .map_err(|reason| DeviceError::PropertyUnavailable { id, reason })?;
        Ok(())
    }
}

#[derive(Debug, Default)]
struct Valuator {
    absolute: bool,
    range: Option<(f64, f64)>,
}

impl Valuator {
    fn usable(&self) -> bool {
        self.absolute && !matches!(self.range, Some((min, max)) if min == -1.0 && max == -1.0)
    }
}

#[derive(Debug)]
struct PendingDevice {
    id: u32,
    name: String,
    master: bool,
    valuators: [Valuator; 2],
    current_valuator: Option<usize>,
}

impl PendingDevice {
    fn finish(self) -> Option<DeviceInfo> {
        if self.master {
            return None;
        }
        let calibratable = self.valuators.iter().all(Valuator::usable);
        if !calibratable {
            debug!(
                "Device \"{}\" id={} lacks two absolute calibratable axes",
                self.name, self.id
            );
        }
        Some(DeviceInfo::new(self.id, self.name, calibratable))
    }
}

/// Parse `xinput list --long` output into slave devices
///
/// Master devices are skipped. A device is calibratable when valuators 0
/// and 1 are both absolute and neither has the undefined `-1 - -1` range.
pub fn parse_list_long(output: &str) -> Vec<DeviceInfo> {
    let mut devices = Vec::new();
    let mut pending: Option<PendingDevice> = None;

    for line in output.lines() {
        if let Some(header) = parse_header(line) {
            if let Some(device) = pending.take().and_then(PendingDevice::finish) {
                devices.push(device);
            }
            pending = Some(header);
            continue;
        }

        let Some(device) = pending.as_mut() else {
            continue;
        };
        let detail = line.trim();

        if let Some(rest) = detail.strip_prefix("Detail for Valuator") {
            device.current_valuator = rest
                .trim()
                .trim_end_matches(':')
                .parse::<usize>()
                .ok()
                .filter(|idx| *idx < 2);
        } else if detail.starts_with("Class originated from") {
            device.current_valuator = None;
        } else if let Some(idx) = device.current_valuator {
            if let Some(mode) = detail.strip_prefix("Mode:") {
                device.valuators[idx].absolute = mode.trim().eq_ignore_ascii_case("absolute");
            } else if let Some(range) = detail.strip_prefix("Range:") {
                device.valuators[idx].range = parse_range(range);
            }
        }
    }

    if let Some(device) = pending.and_then(PendingDevice::finish) {
        devices.push(device);
    }
    devices
}

fn parse_header(line: &str) -> Option<PendingDevice> {
    let (name, rest) = line.split_once("id=")?;
    let (id, role) = rest.split_once('\t')?;
    if !role.trim_start().starts_with('[') {
        return None;
    }
    let id: u32 = id.trim().parse().ok()?;

    let name = name
        .trim_start_matches(|c: char| c.is_whitespace() || "⎡⎜⎣↳∼~".contains(c))
        .trim_end();

    Some(PendingDevice {
        id,
        name: name.to_string(),
        master: role.contains("master"),
        valuators: Default::default(),
        current_valuator: None,
    })
}

fn parse_range(range: &str) -> Option<(f64, f64)> {
    let (min, max) = range.split_once(" - ")?;
    Some((min.trim().parse().ok()?, max.trim().parse().ok()?))
}

/// Extract the matrix from `xinput list-props` output
///
/// `Ok(None)` when the property is absent; an error when it is present but
/// does not hold exactly nine numbers.
pub fn parse_matrix_property(output: &str) -> std::result::Result<Option<Transform>, String> {
    let Some(line) = output
        .lines()
        .map(str::trim)
        .find(|line| line.starts_with(MATRIX_PROPERTY))
    else {
        return Ok(None);
    };

    let values = line
        .split_once(':')
        .map(|(_, values)| values)
        .ok_or_else(|| format!("Malformed property line: {}", line))?;

    let parsed: Vec<f32> = values
        .split(',')
        .map(|v| v.trim().parse::<f32>())
        .collect::<std::result::Result<_, _>>()
        .map_err(|e| format!("Unparseable matrix value in '{}': {}", values.trim(), e))?;

    let values: [f32; 9] = parsed
        .try_into()
        .map_err(|v: Vec<f32>| format!("Expected 9 matrix values, found {}", v.len()))?;

    Ok(Some(Transform::from_values(values)))
}

#[cfg(test)]
mod tests {
    use super::*;

    const LIST_LONG: &str = "\
⎡ Virtual core pointer                    \tid=2\t[master pointer  (3)]
\tReporting 7 classes:
\t\tClass originated from: 11. Type: XIValuatorClass
\t\tDetail for Valuator 0:
\t\t  Label: Rel X
\t\t  Range: -1.000000 - -1.000000
\t\t  Resolution: 0 units/m
\t\t  Mode: relative
⎜   ↳ Virtual core XTEST pointer              \tid=4\t[slave  pointer  (2)]
\tReporting 4 classes:
\t\tClass originated from: 4. Type: XIValuatorClass
\t\tDetail for Valuator 0:
\t\t  Label: Rel X
\t\t  Range: -1.000000 - -1.000000
\t\t  Resolution: 0 units/m
\t\t  Mode: relative
\t\tClass originated from: 4. Type: XIValuatorClass
\t\tDetail for Valuator 1:
\t\t  Label: Rel Y
\t\t  Range: -1.000000 - -1.000000
\t\t  Resolution: 0 units/m
\t\t  Mode: relative
⎜   ↳ eGalax Inc. USB TouchController         \tid=11\t[slave  pointer  (2)]
\tReporting 4 classes:
\t\tClass originated from: 11. Type: XIButtonClass
\t\tButtons supported: 5
\t\tClass originated from: 11. Type: XIValuatorClass
\t\tDetail for Valuator 0:
\t\t  Label: Abs X
\t\t  Range: 0.000000 - 4095.000000
\t\t  Resolution: 0 units/m
\t\t  Mode: absolute
\t\t  Current value: 1203.000000
\t\tClass originated from: 11. Type: XIValuatorClass
\t\tDetail for Valuator 1:
\t\t  Label: Abs Y
\t\t  Range: 0.000000 - 4095.000000
\t\t  Resolution: 0 units/m
\t\t  Mode: absolute
\t\t  Current value: 2301.000000
⎣ Virtual core keyboard                   \tid=3\t[master keyboard (2)]
    ↳ Virtual core XTEST keyboard             \tid=5\t[slave  keyboard (3)]
\tReporting 1 classes:
\t\tClass originated from: 5. Type: XIKeyClass
\t\tKeycodes supported: 248
";

    #[test]
    fn test_parse_list_long() {
        let devices = parse_list_long(LIST_LONG);

        assert_eq!(
            devices,
            vec![
                DeviceInfo::new(4, "Virtual core XTEST pointer", false),
                DeviceInfo::new(11, "eGalax Inc. USB TouchController", true),
                DeviceInfo::new(5, "Virtual core XTEST keyboard", false),
            ]
        );
    }

    #[test]
    fn test_single_absolute_axis_not_calibratable() {
        let output = "\
⎜   ↳ Half Pad  \tid=9\t[slave  pointer  (2)]
\t\tClass originated from: 9. Type: XIValuatorClass
\t\tDetail for Valuator 0:
\t\t  Range: 0.000000 - 100.000000
\t\t  Mode: absolute
";
        assert_eq!(
            parse_list_long(output),
            vec![DeviceInfo::new(9, "Half Pad", false)]
        );
    }

    #[test]
    fn test_parse_matrix_property() {
        let output = "\
Device 'eGalax Inc. USB TouchController':
\tDevice Enabled (115):\t1
\tCoordinate Transformation Matrix (117):\t1.500000, 0.000000, -0.250000, 0.000000, 2.000000, 0.125000, 0.000000, 0.000000, 1.000000
\tlibinput Calibration Matrix (250):\t1.000000, 0.000000, 0.000000, 0.000000, 1.000000, 0.000000, 0.000000, 0.000000, 1.000000
";
        let transform = parse_matrix_property(output).unwrap().unwrap();
        assert_eq!(
            transform,
            Transform::affine(1.5, 0.0, -0.25, 0.0, 2.0, 0.125)
        );
    }

    #[test]
    fn test_matrix_property_absent_or_malformed() {
        assert_eq!(
            parse_matrix_property("Device 'x':\n\tDevice Enabled (115):\t1\n").unwrap(),
            None
        );
        assert!(parse_matrix_property(
            "\tCoordinate Transformation Matrix (117):\t1.0, 0.0, 0.0\n"
        )
        .is_err());
        assert!(parse_matrix_property(
            "\tCoordinate Transformation Matrix (117):\tone, 0, 0, 0, 1, 0, 0, 0, 1\n"
        )
        .is_err());
    }

    #[test]
    fn test_missing_binary_is_input_unavailable() {
        let registry = XinputRegistry::new("/nonexistent/xinput");
        assert!(matches!(
            registry.list_devices(),
            Err(DeviceError::InputUnavailable(_))
        ));
        assert!(matches!(
            registry.get_transform_property(11),
            Err(DeviceError::PropertyUnavailable { id: 11, .. })
        ));
    }
}
