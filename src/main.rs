//! # TRIFIC: Simulated Particle-Identification Spectra
//!
//! Reads SRIM collision logs and prints, per isotope, the energy each ion
//! deposits in two groups of the detector's collection regions.
//!
//! ## Usage
//! ```bash
//! # One isotope per file, default chamber
//! trific Sr94/COLLISON.txt Rb94/COLLISON.txt > pid.csv
//!
//! # Other group pair, Bragg curve instead of PID
//! trific COLLISON.txt --pair 23
//! trific COLLISON.txt --report bragg --out bragg.txt
//!
//! # With profiling output
//! trific COLLISON.txt --profile
//! ```

use std::time::Instant;

use tracing_subscriber::filter::LevelFilter;

use trific::config::Config;
use trific::pipelines::SimulationPipeline;
use trific::Result;

fn main() {
    if let Err(e) = run() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

/// Initialize the tracing subscriber on stderr; span-close timing when profiling
fn init_logging(verbose: u8, profile: bool) {
    use tracing_subscriber::fmt::format::FmtSpan;
    use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let level = match (verbose, profile) {
        (0, false) => LevelFilter::WARN,
        (0, true) | (1, _) => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    let span_events = if profile {
        FmtSpan::CLOSE
    } else {
        FmtSpan::NONE
    };

    tracing_subscriber::registry()
        .with(
            fmt::layer()
                .with_writer(std::io::stderr)
                .with_span_events(span_events)
                .with_target(false)
                .with_timer(fmt::time::uptime()),
        )
        .with(level)
        .init();
}

fn run() -> Result<()> {
    let start = Instant::now();

    // Parse and validate configuration
    let config = Config::parse_and_validate()?;

    init_logging(config.verbose, config.profile);
    if config.profile {
        eprintln!("=== Profiling enabled ===\n");
    }

    eprintln!("TRIFIC sim v{}", env!("CARGO_PKG_VERSION"));
    if config.files.is_empty() {
        eprintln!("Input: <stdin>");
    } else {
        eprintln!("Inputs: {:?}", config.files);
    }
    eprintln!(
        "Chamber: {} grids, {:.2} mm spacing, wires at {:.2} mm",
        config.num_grids, config.spacing, config.window_to_wires
    );
    eprintln!("Report: {} ({} vs {})", config.report.title(), config.groups, config.pair);

    let pipeline = SimulationPipeline::new(config);
    let summary = pipeline.run()?;

    if summary.streams_skipped > 0 {
        eprintln!("Skipped {} unreadable input(s)", summary.streams_skipped);
    }
    eprintln!(
        "Isotopes: {}, ions: {}, rows: {}",
        summary.isotopes_reported, summary.ions_closed, summary.rows_written
    );

    let elapsed = start.elapsed();
    eprintln!("\nCompleted in {:.2}s", elapsed.as_secs_f64());

    Ok(())
}
