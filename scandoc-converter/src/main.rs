//! Scan-log converter binary.
//!
//! Initializes tracing, loads configuration, ingests the configured scan-log
//! XML files, and runs the conversion pipeline that merges them with legacy
//! measurement data and streams typed documents to the JSON output file.

use std::time::Duration;

use tracing::info;
use tracing_subscriber::EnvFilter;

use scandoc::destination::JsonFileDestination;
use scandoc::pipeline::Pipeline;
use scandoc::progress::ProgressReporter;
use scandoc::registry::{ScanRegistry, load_scan_log};
use scandoc_config::load::load_config;
use scandoc_config::shared::ConverterConfig;

use crate::error::{ConverterError, ConverterResult};
use crate::source::SpecFileOpener;

mod error;
mod source;

fn main() {
    if let Err(err) = try_main() {
        eprintln!("{}", err.render_report());
        std::process::exit(1);
    }
}

/// Entry point for the converter.
///
/// Loads configuration, initializes tracing, and runs the conversion to
/// completion, reporting summary counts on success.
fn try_main() -> ConverterResult<()> {
    init_tracing();

    let config = load_config::<ConverterConfig>().map_err(ConverterError::config)?;
    config.validate().map_err(ConverterError::config)?;

    run(config)
}

/// Runs one conversion described by the configuration.
fn run(config: ConverterConfig) -> ConverterResult<()> {
    let mut registry = ScanRegistry::new();

    // Load in sorted path order so reruns resolve identical-key collisions
    // the same way every time.
    let mut scan_logs = config.scan_logs.clone();
    scan_logs.sort();
    for scan_log in &scan_logs {
        load_scan_log(&mut registry, scan_log)?;
    }
    info!("{} scans", registry.len());

    let progress = ProgressReporter::new(
        Duration::from_secs(config.progress.interval_secs),
        config.progress.every_scans,
    );
    let destination = JsonFileDestination::new(&config.output.path);
    let pipeline =
        Pipeline::new(registry, SpecFileOpener, destination).with_progress(progress);

    let report = pipeline.run()?;
    info!(
        "{} documents written to `{}`",
        report.documents,
        config.output.path.display()
    );

    Ok(())
}

/// Initializes process-wide tracing with env-filter support.
///
/// `RUST_LOG` controls verbosity; the default level is `info`.
fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();
}
