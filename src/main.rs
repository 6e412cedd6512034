//! lamco-touch-calibrator - Touchscreen Calibration for X.org
//!
//! Entry point for the calibrator binary.

use std::process::ExitCode;

use anyhow::Result;
use tracing::{debug, error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use lamco_touch_calibrator::cli::Args;
use lamco_touch_calibrator::config::{Config, LoggingConfig};
use lamco_touch_calibrator::device::XinputRegistry;
use lamco_touch_calibrator::screen::{probe_geometry, ReplaySurface, ScreenError};
use lamco_touch_calibrator::utils::format_user_error;
use lamco_touch_calibrator::{Calibrator, CalibratorError, RunOptions};

fn main() -> ExitCode {
    let args = Args::parse_normalized();

    let config = match Config::resolve(args.config.as_deref())
        .and_then(|config| config.with_overrides(&args.overrides()))
    {
        Ok(config) => config,
        Err(e) => return report(CalibratorError::configuration(&e)),
    };

    if let Err(e) = init_logging(args.verbose, &config.logging) {
        return report(CalibratorError::configuration(&e));
    }

    info!("lamco-touch-calibrator v{}", env!("CARGO_PKG_VERSION"));
    debug!("Config: {:?}", config);

    match run(&args, &config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => report(e),
    }
}

fn run(args: &Args, config: &Config) -> lamco_touch_calibrator::error::Result<()> {
    let registry = XinputRegistry::new(config.device.xinput_path.clone());
    let calibrator = Calibrator::new(config, &registry);

    if args.list {
        print!("{}", calibrator.list(args.json)?);
        return Ok(());
    }

    let options = RunOptions {
        selector: args.selector(),
        fake: args.fake,
    };

    if args.reset {
        calibrator.prepare(&options)?;
        return Ok(());
    }

    let Some(ref script) = args.replay else {
        return Err(ScreenError::Unavailable(
            "No interactive display surface available; pass --replay <script>".to_string(),
        )
        .into());
    };

    let geometry = match config.geometry_override() {
        Some(geometry) => geometry,
        None => probe_geometry(&config.device.xdpyinfo_path, config.display.screen_num)?,
    };
    let surface = ReplaySurface::from_file(geometry, script)?;

    let report = calibrator.run(surface, &options)?;
    calibrator.emit(report, &mut std::io::stdout().lock())
}

fn report(error: CalibratorError) -> ExitCode {
    error!("{}", error);
    eprintln!("{}", format_user_error(&error));
    ExitCode::from(error.exit_code())
}

fn init_logging(verbose: u8, logging: &LoggingConfig) -> Result<()> {
    use std::fs::File;

    let log_level = match verbose {
        0 => logging.level.as_str(),
        1 => "info",
        2 => "debug",
        _ => "trace",
    };

    // stdout carries the calibration snippet, so every layer writes to stderr
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        tracing_subscriber::EnvFilter::new(format!(
            "lamco_touch_calibrator={level},warn",
            level = log_level
        ))
    });

    // If log file is specified, write to both stderr and file
    if let Some(log_file_path) = &logging.file {
        let file = File::create(log_file_path)?;

        match logging.format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .json()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .pretty()
                            .with_writer(std::io::stderr),
                    )
                    .with(
                        tracing_subscriber::fmt::layer()
                            .with_writer(file)
                            .with_ansi(false),
                    )
                    .init();
            }
        }
        info!("Logging to file: {}", log_file_path.display());
    } else {
        match logging.format.as_str() {
            "json" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().json().with_writer(std::io::stderr))
                    .init();
            }
            "compact" => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(
                        tracing_subscriber::fmt::layer()
                            .compact()
                            .with_writer(std::io::stderr),
                    )
                    .init();
            }
            _ => {
                tracing_subscriber::registry()
                    .with(env_filter)
                    .with(tracing_subscriber::fmt::layer().pretty().with_writer(std::io::stderr))
                    .init();
            }
        }
    }

    Ok(())
}
