//! # Simulation Pipeline
//!
//! Orchestrates one run:
//! 1. Resolve input sources (files in order, or stdin)
//! 2. Stream each source through the aggregator into the shared run state
//! 3. After each stream, report every isotope started in it or that
//!    received ions in it; PID rows cover only ions not reported before
//!
//! A source that cannot be opened is logged and skipped; capacity errors
//! abort the run.

use std::fs::File;
use std::io::{self, BufRead, BufWriter, Write};

use tracing::{info, info_span, warn};

use crate::config::Config;
use crate::data::IsotopeIdx;
use crate::error::{Result, TrificError};
use crate::io::{InputSource, ReportWriter};
use crate::model::aggregator::{Aggregator, RunState, StreamSummary};
use crate::model::reporter::Reporter;

/// Totals for a whole run
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub streams_processed: usize,
    pub streams_skipped: usize,
    pub isotopes_reported: usize,
    pub rows_written: usize,
    pub ions_closed: u64,
}

pub struct SimulationPipeline {
    config: Config,
    aggregator: Aggregator,
    reporter: Reporter,
}

impl SimulationPipeline {
    pub fn new(config: Config) -> Self {
        let aggregator = Aggregator::new(config.geometry(), config.aggregator_options());
        let reporter = config.reporter();
        Self {
            config,
            aggregator,
            reporter,
        }
    }

    /// Run over the configured sources, writing to `--out` or stdout
    pub fn run(&self) -> Result<RunSummary> {
        let sources = self.config.sources();
        match &self.config.out {
            Some(path) => {
                let file = File::create(path)?;
                self.run_with(&sources, BufWriter::new(file))
            }
            None => {
                let stdout = io::stdout();
                self.run_with(&sources, BufWriter::new(stdout.lock()))
            }
        }
    }

    /// Run over explicit sources into any writer
    pub fn run_with<W: Write>(&self, sources: &[InputSource], out: W) -> Result<RunSummary> {
        let mut state = self.aggregator.new_state(self.config.capacity());
        let mut writer = ReportWriter::new(out);
        let mut summary = RunSummary::default();

        for source in sources {
            let reader = match source.open() {
                Ok(reader) => reader,
                Err(e) => {
                    warn!(source = %source.name(), error = %e, "skipping input");
                    summary.streams_skipped += 1;
                    continue;
                }
            };
            let stream = self.process_reader(&mut state, reader, &mut writer)?;
            info!(
                source = %source.name(),
                ions = stream.ions_closed,
                isotopes = stream.isotopes_started,
                "input processed"
            );
            summary.streams_processed += 1;
            summary.isotopes_reported += stream.reportable_isotopes().len();
        }

        writer.flush()?;
        summary.rows_written = writer.rows_written();
        summary.ions_closed = state.ions_closed();
        Ok(summary)
    }

    /// Aggregate one stream and report the isotopes it started or extended
    pub fn process_reader<R: BufRead, W: Write>(
        &self,
        state: &mut RunState,
        reader: R,
        writer: &mut ReportWriter<W>,
    ) -> Result<StreamSummary> {
        let stream = self.aggregator.process_stream(state, reader)?;

        let isotopes = stream.reportable_isotopes();
        info_span!("report", isotopes = isotopes.len()).in_scope(|| {
            for idx in isotopes {
                let idx = IsotopeIdx::from(idx);
                if let Some(report) = self.reporter.report_pending(state, idx) {
                    writer.write_report(&report)?;
                }
                state.mark_reported(idx);
            }
            Ok::<_, TrificError>(())
        })?;

        Ok(stream)
    }
}
