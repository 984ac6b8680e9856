//! # Isotope Reports
//!
//! Turns the accumulated region table into per-isotope report rows.
//!
//! ## PID
//! For each ion of the isotope, the summed energies of the two selected bin
//! groups (`ΔE_x, ΔE_y`). This is the particle-identification scatter plot.
//!
//! ## Bragg
//! Energy summed over all the isotope's ions for consecutive grid pairs
//! `(1,2), (3,4), …`, numbered from 1. This traces the Bragg curve of the
//! isotope through the chamber.
//!
//! ## Incremental Reports
//! [`Reporter::report_pending`] emits PID rows only for ions past the isotope's
//! reporting cursor in [`RunState`]. Bragg rows are always cumulative.

use clap::ValueEnum;

use crate::data::{CollectionRegions, IonIdx, IsotopeIdx, IsotopeRecord};
use crate::model::aggregator::RunState;
use crate::model::partition::{GroupPair, PartitionScheme};

/// Which report to emit per isotope
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum ReportKind {
    /// Per-ion energy in two bin groups
    #[default]
    Pid,
    /// Per-grid-pair energy summed over the isotope
    Bragg,
}

impl ReportKind {
    pub fn title(&self) -> &'static str {
        match self {
            ReportKind::Pid => "PID",
            ReportKind::Bragg => "Bragg",
        }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum ReportRow {
    Pair { ion: IonIdx, x: f64, y: f64 },
    Bragg { grid_pair: usize, energy: f64 },
}

/// Rows for one isotope, ready to be written
#[derive(Clone, Debug, PartialEq)]
pub struct IsotopeReport {
    pub kind: ReportKind,
    pub label: String,
    pub rows: Vec<ReportRow>,
}

#[derive(Clone, Debug)]
pub struct Reporter {
    kind: ReportKind,
    scheme: PartitionScheme,
    pair: GroupPair,
}

impl Reporter {
    pub fn new(kind: ReportKind, scheme: PartitionScheme, pair: GroupPair) -> Self {
        Self { kind, scheme, pair }
    }

    pub fn kind(&self) -> ReportKind {
        self.kind
    }

    /// Report for one isotope covering all its ions, `None` if the index is unknown
    pub fn report(&self, state: &RunState, idx: IsotopeIdx) -> Option<IsotopeReport> {
        self.build(state, idx, 0)
    }

    /// Report for the ions of `idx` not yet marked as reported
    pub fn report_pending(&self, state: &RunState, idx: IsotopeIdx) -> Option<IsotopeReport> {
        self.build(state, idx, state.reported_ions(idx))
    }

    fn build(&self, state: &RunState, idx: IsotopeIdx, skip: u32) -> Option<IsotopeReport> {
        let isotope = state.isotopes().get(idx)?;
        let rows = match self.kind {
            ReportKind::Pid => self.pid_rows_from(state.regions(), isotope, skip),
            ReportKind::Bragg => bragg_rows(state.regions(), isotope),
        };
        Some(IsotopeReport {
            kind: self.kind,
            label: isotope.label(),
            rows,
        })
    }

    /// One `(ΔE_x, ΔE_y)` row per ion, in ion order
    pub fn pid_rows(&self, table: &CollectionRegions, isotope: &IsotopeRecord) -> Vec<ReportRow> {
        self.pid_rows_from(table, isotope, 0)
    }

    /// PID rows skipping the isotope's first `skip` ions
    pub fn pid_rows_from(
        &self,
        table: &CollectionRegions,
        isotope: &IsotopeRecord,
        skip: u32,
    ) -> Vec<ReportRow> {
        isotope
            .ion_indices()
            .skip(skip as usize)
            .map(|ion| {
                let sums = self.scheme.group_sums(table, ion);
                let (x, y) = self.pair.select(&sums);
                ReportRow::Pair { ion, x, y }
            })
            .collect()
    }
}

/// Energy per consecutive grid pair, summed over the isotope's ions
pub fn bragg_rows(table: &CollectionRegions, isotope: &IsotopeRecord) -> Vec<ReportRow> {
    let num_grids = table.n_bins().saturating_sub(1);
    (1..num_grids)
        .step_by(2)
        .map(|first| {
            let bins = first as u16..=(first + 1) as u16;
            let energy = isotope
                .ion_indices()
                .map(|ion| table.range_sum(ion, bins.clone()))
                .sum();
            ReportRow::Bragg {
                grid_pair: (first + 1) / 2,
                energy,
            }
        })
        .collect()
}
