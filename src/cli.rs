//! Command Line Interface
//!
//! Arguments are parsed with clap. Older invocations spelled options
//! without dashes and with underscores (`device_name=foo timeout=5`);
//! [`normalize_args`] rewrites those into the long-flag form first.

use std::path::PathBuf;

use clap::Parser;

use crate::config::CliOverrides;
use crate::device::DeviceSelector;

/// Command-line arguments for lamco-touch-calibrator
#[derive(Parser, Debug)]
#[command(name = "lamco-touch-calibrator")]
#[command(
    version,
    about = "Four-point touchscreen calibration for X.org",
    after_help = "If neither --device-name nor --device-id is given the last calibratable device is selected.\n\n\
                  Example:\n  lamco-touch-calibrator --replay touches.txt \
                  --output-filename=/usr/share/X11/xorg.conf.d/99-calibration.conf"
)]
pub struct Args {
    /// Configuration file path
    #[arg(short, long, env = "LAMCO_CALIBRATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// List input devices and exit
    #[arg(long)]
    pub list: bool,

    /// Print the device list as JSON
    #[arg(long, requires = "list")]
    pub json: bool,

    /// Name of the device to calibrate
    #[arg(long)]
    pub device_name: Option<String>,

    /// Id of the device to calibrate
    #[arg(long)]
    pub device_id: Option<u32>,

    /// Use a fake device; nothing is read from or written to devices
    #[arg(long)]
    pub fake: bool,

    /// Reset calibration to identity and exit
    #[arg(long)]
    pub reset: bool,

    /// Number of the screen to calibrate
    #[arg(long)]
    pub screen_num: Option<u32>,

    /// Message shown during calibration; lines separated by \n or |
    #[arg(long)]
    pub message: Option<String>,

    /// File to write the X.org calibration snippet to
    #[arg(long)]
    pub output_filename: Option<PathBuf>,

    /// Seconds to wait for each touch (0 = wait forever)
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Read touches from a replay script instead of a live display
    #[arg(long)]
    pub replay: Option<PathBuf>,

    /// Verbose logging (can be specified multiple times)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Log format (json|pretty|compact)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Write logs to file (in addition to stderr)
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}

impl Args {
    /// Parse the process arguments, accepting the legacy spelling
    pub fn parse_normalized() -> Self {
        Self::parse_from(normalize_args(std::env::args()))
    }

    /// Configuration overrides carried by these arguments
    pub fn overrides(&self) -> CliOverrides {
        CliOverrides {
            timeout_secs: self.timeout,
            screen_num: self.screen_num,
            output_filename: self.output_filename.clone(),
            message: self.message.clone(),
            log_format: self.log_format.clone(),
            log_file: self.log_file.clone(),
        }
    }

    /// Device selection carried by these arguments
    pub fn selector(&self) -> DeviceSelector {
        DeviceSelector {
            id: self.device_id,
            name: self.device_name.clone(),
        }
    }
}

const LEGACY_KEYS: &[&str] = &[
    "list",
    "json",
    "fake",
    "reset",
    "help",
    "device_name",
    "device_id",
    "screen_num",
    "message",
    "output_filename",
    "verbose",
    "timeout",
    "replay",
    "config",
];

/// Long options whose value may follow as a separate argument
const VALUE_FLAGS: &[&str] = &[
    "config",
    "device-name",
    "device-id",
    "screen-num",
    "message",
    "output-filename",
    "timeout",
    "replay",
    "log-format",
    "log-file",
];

/// Rewrite legacy `key=value` arguments into `--key-name=value`
///
/// The first element (program name) is passed through, as is the value
/// following an option that takes one. Keys may carry any number of leading
/// dashes; long flags spelled with underscores get dashes in the key part.
pub fn normalize_args<I>(args: I) -> Vec<String>
where
    I: IntoIterator<Item = String>,
{
    let mut args = args.into_iter();
    let mut normalized: Vec<String> = args.next().into_iter().collect();
    let mut value_pending = false;

    for arg in args {
        if value_pending {
            value_pending = false;
            normalized.push(arg);
            continue;
        }

        let arg = normalize_one(arg);
        value_pending = takes_separate_value(&arg);
        normalized.push(arg);
    }
    normalized
}

fn takes_separate_value(arg: &str) -> bool {
    match arg.strip_prefix("--") {
        Some(key) => VALUE_FLAGS.contains(&key),
        None => arg == "-c",
    }
}

fn normalize_one(arg: String) -> String {
    if arg == "h" {
        return "-h".to_string();
    }

    let bare = arg.trim_start_matches('-');
    let dashes = arg.len() - bare.len();

    let (key, value) = match bare.split_once('=') {
        Some((key, value)) => (key, Some(value)),
        None => (bare, None),
    };

    if dashes < 2 && !LEGACY_KEYS.contains(&key) {
        return arg;
    }

    let key = key.replace('_', "-");
    match value {
        Some(value) => format!("--{}={}", key, value),
        None => format!("--{}", key),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn argv(args: &[&str]) -> Vec<String> {
        std::iter::once("lamco-touch-calibrator")
            .chain(args.iter().copied())
            .map(str::to_string)
            .collect()
    }

    #[test]
    fn test_legacy_arguments() {
        let normalized = normalize_args(argv(&[
            "device_name=eGalax Touch",
            "timeout=5",
            "fake",
            "h",
        ]));
        assert_eq!(
            normalized,
            argv(&["--device-name=eGalax Touch", "--timeout=5", "--fake", "-h"])
        );
    }

    #[test]
    fn test_modern_arguments_untouched() {
        let args = argv(&["-vv", "--list", "--json", "--device-id=11", "touches.txt"]);
        assert_eq!(normalize_args(args.clone()), args);
    }

    #[test]
    fn test_underscored_long_flags() {
        assert_eq!(
            normalize_args(argv(&["--output_filename=/tmp/a.conf"])),
            argv(&["--output-filename=/tmp/a.conf"])
        );
    }

    #[test]
    fn test_parse_legacy_invocation() {
        let args = Args::parse_from(normalize_args(argv(&[
            "device_id=11",
            "message=Touch\\nthe crosses",
            "verbose",
            "screen_num=1",
        ])));

        assert_eq!(args.device_id, Some(11));
        assert_eq!(args.verbose, 1);
        assert_eq!(args.selector().id, Some(11));

        let overrides = args.overrides();
        assert_eq!(overrides.screen_num, Some(1));
        assert_eq!(overrides.message.as_deref(), Some("Touch\\nthe crosses"));
    }

    #[test]
    fn test_separate_values_kept_verbatim() {
        let args = argv(&["--device-name", "reset", "--message", "help", "-c", "list"]);
        assert_eq!(normalize_args(args.clone()), args);

        let parsed = Args::try_parse_from(normalize_args(argv(&[
            "--device-name",
            "reset",
            "--message",
            "help",
        ])))
        .unwrap();
        assert_eq!(parsed.device_name.as_deref(), Some("reset"));
        assert_eq!(parsed.message.as_deref(), Some("help"));
        assert!(!parsed.reset);
    }

    #[test]
    fn test_value_after_legacy_key_kept_verbatim() {
        assert_eq!(
            normalize_args(argv(&["device_name", "fake", "list"])),
            argv(&["--device-name", "fake", "--list"])
        );
    }

    #[test]
    fn test_single_dash_legacy_keys() {
        assert_eq!(
            normalize_args(argv(&["-list", "-device_name=eGalax", "-v", "-h"])),
            argv(&["--list", "--device-name=eGalax", "-v", "-h"])
        );

        let parsed = Args::try_parse_from(normalize_args(argv(&["-list", "-json"]))).unwrap();
        assert!(parsed.list);
        assert!(parsed.json);
    }

    #[test]
    fn test_json_requires_list() {
        assert!(Args::try_parse_from(argv(&["--json"])).is_err());
        assert!(Args::try_parse_from(argv(&["--list", "--json"])).is_ok());
    }
}
