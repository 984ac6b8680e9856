//! # SRIM Aggregator
//!
//! ## Role
//! Streams a collision log line by line, frames ion records, and folds each
//! closed record into the collection region table.
//!
//! ## Run State
//! All run-wide bookkeeping lives in [`RunState`], threaded explicitly through
//! every [`Aggregator::process_stream`] call, so several files processed in
//! sequence share one ion numbering:
//!
//! ```text
//! global ion = ordinal (from the row) + total ions before the current isotope
//! ```
//!
//! ## Record Framing
//! - collision rows append to the open record;
//! - any other line closes it (header lines close it *before* their metadata
//!   is applied);
//! - a record still open at end of stream is dropped unless
//!   `flush_trailing_record` is set.
//!
//! ## Reporting Cursor
//! `RunState` remembers how many ions of each isotope have been written, so
//! an isotope whose ions span several streams is reported incrementally.
//!
//! ## Offset Update
//! On an `Ion Energy` header the total advances by the ion count of the
//! isotope that was receiving ions until then. Before the first isotope that
//! is the count of headerless ions (records closed before any header), which
//! is zero for well-formed logs.

use std::io::BufRead;
use std::mem;

use tracing::{debug, info_span, warn};

use crate::data::{
    Collision, CollectionRegions, DetectorGeometry, IonIdx, IsotopeIdx, IsotopeRecord, Isotopes,
};
use crate::error::{Resource, Result, TrificError};
use crate::io::srim::{classify, trim_line_ending, SrimLine};

pub const DEFAULT_MAX_IONS: usize = 10_000;
pub const DEFAULT_MAX_ISOTOPES: usize = 25;

/// Upper bounds on run-wide indices
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Capacity {
    /// Ion indices must be below this
    pub max_ions: usize,
    /// At most this many isotopes per run
    pub max_isotopes: usize,
}

impl Default for Capacity {
    fn default() -> Self {
        Self {
            max_ions: DEFAULT_MAX_IONS,
            max_isotopes: DEFAULT_MAX_ISOTOPES,
        }
    }
}

/// Switches for the ambiguous framing cases
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct AggregatorOptions {
    /// Close a record left open at end of stream instead of dropping it
    pub flush_trailing_record: bool,
    /// Reject ion records that appear before any `Ion Energy` header
    pub strict_headers: bool,
}

/// Name and mass seen since the last isotope was started
#[derive(Clone, Debug, Default)]
struct PendingHeader {
    name: Option<String>,
    mass: Option<f64>,
}

/// Run-wide state shared by every stream of one run
#[derive(Clone, Debug)]
pub struct RunState {
    isotopes: Isotopes,
    regions: CollectionRegions,
    /// Ions processed before the current isotope
    total_ions: u32,
    /// Ions closed before any isotope header
    headerless_ions: u32,
    pending: PendingHeader,
    /// Ions of each isotope already written to a report
    reported: Vec<u32>,
}

impl RunState {
    pub fn new(geometry: &DetectorGeometry, capacity: Capacity) -> Self {
        Self {
            isotopes: Isotopes::with_capacity(capacity.max_isotopes),
            regions: CollectionRegions::new(geometry.n_bins(), capacity.max_ions),
            total_ions: 0,
            headerless_ions: 0,
            pending: PendingHeader::default(),
            reported: Vec::new(),
        }
    }

    pub fn isotopes(&self) -> &Isotopes {
        &self.isotopes
    }

    pub fn regions(&self) -> &CollectionRegions {
        &self.regions
    }

    /// Running ion offset applied to the current isotope's ordinals
    pub fn total_ions(&self) -> u32 {
        self.total_ions
    }

    pub fn headerless_ions(&self) -> u32 {
        self.headerless_ions
    }

    /// Ions of `idx` already written to a report
    pub fn reported_ions(&self, idx: IsotopeIdx) -> u32 {
        self.reported.get(idx.as_usize()).copied().unwrap_or(0)
    }

    /// Advance the reporting cursor of `idx` to its current ion count
    pub fn mark_reported(&mut self, idx: IsotopeIdx) {
        let Some(count) = self.isotopes.get(idx).map(|iso| iso.ion_count) else {
            return;
        };
        if self.reported.len() <= idx.as_usize() {
            self.reported.resize(idx.as_usize() + 1, 0);
        }
        self.reported[idx.as_usize()] = count;
    }

    /// All ions closed so far, across isotopes
    pub fn ions_closed(&self) -> u64 {
        let counted: u64 = self
            .isotopes
            .iter()
            .map(|(_, iso)| iso.ion_count as u64)
            .sum();
        counted + self.headerless_ions as u64
    }
}

/// Counters for one processed stream
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StreamSummary {
    pub lines: usize,
    pub collisions: usize,
    pub ions_closed: usize,
    /// Index of the first isotope started in this stream
    pub first_isotope: usize,
    pub isotopes_started: usize,
    /// Lowest isotope index that received an ion in this stream
    pub first_touched_isotope: Option<usize>,
    /// A record was still open at end of stream and was not accumulated
    pub dropped_trailing: bool,
}

impl StreamSummary {
    /// Arena indices of the isotopes started in this stream
    pub fn new_isotopes(&self) -> std::ops::Range<usize> {
        self.first_isotope..self.first_isotope + self.isotopes_started
    }

    /// Isotopes started in this stream or that received ions in it
    pub fn reportable_isotopes(&self) -> std::ops::Range<usize> {
        let start = self
            .first_touched_isotope
            .map_or(self.first_isotope, |t| t.min(self.first_isotope));
        start..self.first_isotope + self.isotopes_started
    }

    fn touch(&mut self, isotope: Option<usize>) {
        if let Some(idx) = isotope {
            let first = self.first_touched_isotope.map_or(idx, |t| t.min(idx));
            self.first_touched_isotope = Some(first);
        }
    }
}

/// Collision rows of the ion currently being read
#[derive(Clone, Debug, Default)]
struct IonRecord {
    /// Ordinal of the most recent row
    ordinal: u32,
    collisions: Vec<Collision>,
}

impl IonRecord {
    fn is_open(&self) -> bool {
        !self.collisions.is_empty()
    }

    fn push(&mut self, ordinal: u32, collision: Collision) {
        self.ordinal = ordinal;
        self.collisions.push(collision);
    }

    fn clear(&mut self) {
        self.ordinal = 0;
        self.collisions.clear();
    }
}

/// Parses collision logs and accumulates energy loss into a [`RunState`]
#[derive(Clone, Debug)]
pub struct Aggregator {
    geometry: DetectorGeometry,
    options: AggregatorOptions,
}

impl Aggregator {
    pub fn new(geometry: DetectorGeometry, options: AggregatorOptions) -> Self {
        Self { geometry, options }
    }

    pub fn geometry(&self) -> &DetectorGeometry {
        &self.geometry
    }

    /// Fresh run state sized for this aggregator's geometry
    pub fn new_state(&self, capacity: Capacity) -> RunState {
        RunState::new(&self.geometry, capacity)
    }

    /// Drain one stream into `state`
    pub fn process_stream<R: BufRead>(
        &self,
        state: &mut RunState,
        mut reader: R,
    ) -> Result<StreamSummary> {
        info_span!("srim_stream").in_scope(|| {
            let mut summary = StreamSummary {
                first_isotope: state.isotopes.len(),
                ..StreamSummary::default()
            };
            let mut record = IonRecord::default();
            let mut buf = Vec::with_capacity(128);

            loop {
                buf.clear();
                let bytes_read = reader.read_until(b'\n', &mut buf)?;
                if bytes_read == 0 {
                    break;
                }
                summary.lines += 1;

                match classify(trim_line_ending(&buf)) {
                    SrimLine::Collision { ordinal, collision } => {
                        record.push(ordinal, collision);
                        summary.collisions += 1;
                    }
                    line => {
                        if record.is_open() {
                            let touched = self.close_record(state, &mut record, summary.lines)?;
                            summary.touch(touched);
                            summary.ions_closed += 1;
                        }
                        match line {
                            SrimLine::IonName(name) => state.pending.name = Some(name),
                            SrimLine::IonMass(mass) => state.pending.mass = Some(mass),
                            SrimLine::IonEnergy(energy) => {
                                self.start_isotope(state, energy)?;
                                summary.isotopes_started += 1;
                            }
                            _ => {}
                        }
                    }
                }
            }

            if record.is_open() {
                if self.options.flush_trailing_record {
                    let touched = self.close_record(state, &mut record, summary.lines)?;
                    summary.touch(touched);
                    summary.ions_closed += 1;
                } else {
                    warn!(
                        ordinal = record.ordinal,
                        collisions = record.collisions.len(),
                        "stream ended inside an ion record; record dropped"
                    );
                    summary.dropped_trailing = true;
                }
            }

            debug!(
                lines = summary.lines,
                collisions = summary.collisions,
                ions = summary.ions_closed,
                isotopes = summary.isotopes_started,
                "stream processed"
            );
            Ok(summary)
        })
    }

    /// Finish the current isotope and start a new one from the pending header
    fn start_isotope(&self, state: &mut RunState, energy: f64) -> Result<()> {
        let finished = state
            .isotopes
            .current()
            .map(|iso| iso.ion_count)
            .unwrap_or(state.headerless_ions);
        state.total_ions = state.total_ions.checked_add(finished).ok_or_else(|| {
            TrificError::capacity(
                Resource::Ions,
                state.total_ions as i64 + finished as i64,
                state.regions.ion_capacity(),
            )
        })?;

        let PendingHeader { name, mass } = mem::take(&mut state.pending);
        let record = IsotopeRecord {
            name: name.unwrap_or_default(),
            mass: mass.unwrap_or(0.0),
            initial_energy: energy,
            ion_count: 0,
            ion_offset: state.total_ions,
        };
        debug!(isotope = %record.label(), offset = record.ion_offset, "isotope started");
        state.isotopes.push(record)?;
        Ok(())
    }

    /// Accumulate a finished ion record and reset it.
    ///
    /// Returns the index of the isotope the ion was counted for, if any.
    fn close_record(
        &self,
        state: &mut RunState,
        record: &mut IonRecord,
        line_num: usize,
    ) -> Result<Option<usize>> {
        let global = record.ordinal as u64 + state.total_ions as u64;
        if global >= state.regions.ion_capacity() as u64 {
            return Err(TrificError::capacity(
                Resource::Ions,
                global as i64,
                state.regions.ion_capacity(),
            ));
        }
        let ion = IonIdx::new(global as u32);

        let touched = state.isotopes.len().checked_sub(1);
        match state.isotopes.current_mut() {
            Some(iso) => iso.ion_count += 1,
            None if self.options.strict_headers => {
                return Err(TrificError::parse(
                    line_num,
                    format!(
                        "ion record {} appears before any 'Ion Energy' header",
                        record.ordinal
                    ),
                ));
            }
            None => state.headerless_ions += 1,
        }

        // Loss is the drop between consecutive samples; the first row has no predecessor
        for pair in record.collisions.windows(2) {
            let (prev, cur) = (&pair[0], &pair[1]);
            if let Some(bin) = self.geometry.locate(cur.depth_mm(), cur.lateral_mm())? {
                state.regions.add(ion, bin, cur.loss_since_mev(prev))?;
            }
        }

        record.clear();
        Ok(touched)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::BinIdx;

    fn put(line: &mut Vec<u8>, offset: usize, value: &str) {
        if line.len() < offset + value.len() {
            line.resize(offset + value.len(), b' ');
        }
        line[offset..offset + value.len()].copy_from_slice(value.as_bytes());
    }

    fn header(label: &str, value_offset: usize, value: &str) -> String {
        let mut line = b" ".to_vec();
        put(&mut line, 6, label);
        put(&mut line, value_offset, value);
        line.resize(40, b' ');
        String::from_utf8(line).unwrap()
    }

    /// Collision row with depth and lateral offset given in mm
    fn row(ordinal: u32, energy_kev: f64, depth_mm: f64, lateral_mm: f64) -> String {
        let mut line = b" ".to_vec();
        put(&mut line, 1, &format!("{:05}", ordinal));
        put(&mut line, 7, &format!("{:9.3E}", energy_kev));
        put(&mut line, 17, &format!("{:10.4E}", depth_mm * 1.0e7));
        put(&mut line, 39, &format!("{:10.3E}", lateral_mm * 1.0e7));
        String::from_utf8(line).unwrap()
    }

    fn isotope_header(name: &str, mass: f64) -> Vec<String> {
        vec![
            header("Ion Name", 23, name),
            header("Ion Mass", 22, &format!("{:7.3}", mass)),
            header("Ion Energy", 18, &format!("{:11.3E}", 470000.0)),
        ]
    }

    fn run(lines: &[String], options: AggregatorOptions) -> (RunState, StreamSummary) {
        let aggregator = Aggregator::new(DetectorGeometry::default(), options);
        let mut state = aggregator.new_state(Capacity::default());
        let text = lines.join("\n") + "\n";
        let summary = aggregator
            .process_stream(&mut state, text.as_bytes())
            .unwrap();
        (state, summary)
    }

    #[test]
    fn test_single_ion_binning() {
        let mut lines = isotope_header("Sr", 93.915);
        lines.push(row(1, 1000.0, 30.0, 0.0));
        lines.push(row(1, 900.0, 40.0, 0.0));
        lines.push(row(1, 700.0, 50.0, 0.0));
        lines.push("=".repeat(20));

        let (state, summary) = run(&lines, AggregatorOptions::default());
        assert_eq!(summary.collisions, 3);
        assert_eq!(summary.ions_closed, 1);
        assert_eq!(summary.isotopes_started, 1);

        let iso = state.isotopes().current().unwrap();
        assert_eq!(iso.name, "Sr");
        assert_eq!(iso.label(), "Sr-94");
        assert_eq!(iso.ion_count, 1);
        assert_eq!(iso.ion_offset, 0);

        let table = state.regions();
        // depth 40 mm -> bin 2 gets 0.1 MeV, depth 50 mm -> bin 3 gets 0.2 MeV
        assert!((table.get(IonIdx(1), BinIdx(2)) - 0.1).abs() < 1e-9);
        assert!((table.get(IonIdx(1), BinIdx(3)) - 0.2).abs() < 1e-9);
        assert!((table.ion_total(IonIdx(1)) - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_first_collision_contributes_nothing() {
        let mut lines = isotope_header("Sr", 94.0);
        // Large first-sample energy would dominate if it were differenced against anything
        lines.push(row(1, 5000.0, 30.0, 0.0));
        lines.push("-".repeat(5));
        let (state, _) = run(&lines, AggregatorOptions::default());
        assert_eq!(state.regions().ion_total(IonIdx(1)), 0.0);
        assert_eq!(state.isotopes().current().unwrap().ion_count, 1);
    }

    #[test]
    fn test_out_of_window_collisions_are_discarded() {
        let mut lines = isotope_header("Sr", 94.0);
        lines.push(row(1, 1000.0, 10.0, 0.0));
        lines.push(row(1, 950.0, 20.0, 0.0)); // before first wires
        lines.push(row(1, 900.0, 40.0, 0.0)); // inside: bin 2
        lines.push(row(1, 800.0, 300.0, 0.0)); // beyond last grid (291.95 mm)
        lines.push(String::new());
        let (state, _) = run(&lines, AggregatorOptions::default());
        assert!((state.regions().ion_total(IonIdx(1)) - 0.05).abs() < 1e-9);
        assert!((state.regions().get(IonIdx(1), BinIdx(2)) - 0.05).abs() < 1e-9);
    }

    #[test]
    fn test_trailing_record_dropped_by_default() {
        let mut lines = isotope_header("Sr", 94.0);
        lines.push(row(1, 1000.0, 30.0, 0.0));
        lines.push(row(1, 900.0, 40.0, 0.0));
        let (state, summary) = run(&lines, AggregatorOptions::default());
        assert!(summary.dropped_trailing);
        assert_eq!(summary.ions_closed, 0);
        assert_eq!(state.isotopes().current().unwrap().ion_count, 0);
        assert_eq!(state.regions().ion_total(IonIdx(1)), 0.0);
    }

    #[test]
    fn test_trailing_record_flushed_when_enabled() {
        let mut lines = isotope_header("Sr", 94.0);
        lines.push(row(1, 1000.0, 30.0, 0.0));
        lines.push(row(1, 900.0, 40.0, 0.0));
        let options = AggregatorOptions {
            flush_trailing_record: true,
            ..AggregatorOptions::default()
        };
        let (state, summary) = run(&lines, options);
        assert!(!summary.dropped_trailing);
        assert_eq!(summary.ions_closed, 1);
        assert!((state.regions().ion_total(IonIdx(1)) - 0.1).abs() < 1e-9);
    }

    #[test]
    fn test_header_line_closes_open_record_before_offset_update() {
        let mut lines = isotope_header("Sr", 94.0);
        lines.push(row(1, 1000.0, 30.0, 0.0));
        lines.push(row(1, 900.0, 40.0, 0.0));
        lines.extend(isotope_header("Rb", 94.0));
        lines.push(row(1, 1000.0, 30.0, 0.0));
        lines.push(row(1, 800.0, 40.0, 0.0));
        lines.push("end".to_string());
        let (state, summary) = run(&lines, AggregatorOptions::default());
        assert_eq!(summary.ions_closed, 2);

        let (_, sr) = state.isotopes().iter().next().unwrap();
        let rb = state.isotopes().current().unwrap();
        assert_eq!(sr.ion_count, 1);
        assert_eq!(rb.ion_offset, 1);
        assert!((state.regions().ion_total(IonIdx(1)) - 0.1).abs() < 1e-9);
        assert!((state.regions().ion_total(IonIdx(2)) - 0.2).abs() < 1e-9);
    }

    #[test]
    fn test_headerless_ions_shift_first_isotope() {
        let mut lines = vec![row(1, 1000.0, 30.0, 0.0), row(1, 900.0, 40.0, 0.0), "x".to_string()];
        lines.extend(isotope_header("Sr", 94.0));
        lines.push(row(1, 1000.0, 30.0, 0.0));
        lines.push(row(1, 900.0, 40.0, 0.0));
        lines.push("x".to_string());
        let (state, _) = run(&lines, AggregatorOptions::default());
        assert_eq!(state.headerless_ions(), 1);
        let sr = state.isotopes().current().unwrap();
        assert_eq!(sr.ion_offset, 1);
        assert!((state.regions().ion_total(IonIdx(2)) - 0.1).abs() < 1e-9);
        assert_eq!(state.ions_closed(), 2);
    }

    #[test]
    fn test_strict_headers_rejects_headerless_ions() {
        let aggregator = Aggregator::new(
            DetectorGeometry::default(),
            AggregatorOptions {
                strict_headers: true,
                ..AggregatorOptions::default()
            },
        );
        let mut state = aggregator.new_state(Capacity::default());
        let text = format!("{}\nx\n", row(1, 1000.0, 30.0, 0.0));
        let err = aggregator
            .process_stream(&mut state, text.as_bytes())
            .unwrap_err();
        assert!(matches!(err, TrificError::Parse { line: 2, .. }));
    }

    #[test]
    fn test_ion_capacity_fails_fast() {
        let aggregator = Aggregator::new(DetectorGeometry::default(), AggregatorOptions::default());
        let mut state = aggregator.new_state(Capacity {
            max_ions: 5,
            max_isotopes: 25,
        });
        let mut lines = isotope_header("Sr", 94.0);
        lines.push(row(5, 1000.0, 30.0, 0.0));
        lines.push("x".to_string());
        let text = lines.join("\n") + "\n";
        let err = aggregator
            .process_stream(&mut state, text.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            TrificError::CapacityExceeded {
                resource: Resource::Ions,
                value: 5,
                limit: 5
            }
        ));
    }

    #[test]
    fn test_isotope_capacity_fails_fast() {
        let aggregator = Aggregator::new(DetectorGeometry::default(), AggregatorOptions::default());
        let mut state = aggregator.new_state(Capacity {
            max_ions: 100,
            max_isotopes: 1,
        });
        let mut lines = isotope_header("Sr", 94.0);
        lines.extend(isotope_header("Rb", 94.0));
        let text = lines.join("\n") + "\n";
        let err = aggregator
            .process_stream(&mut state, text.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            TrificError::CapacityExceeded {
                resource: Resource::Isotopes,
                ..
            }
        ));
    }

    #[test]
    fn test_bin_out_of_range_fails_fast() {
        let mut lines = isotope_header("Sr", 94.0);
        lines.push(row(1, 1000.0, 30.0, 0.0));
        // Near the last grid with a large positive lateral offset
        lines.push(row(1, 900.0, 290.0, 50.0));
        lines.push("x".to_string());
        let aggregator = Aggregator::new(DetectorGeometry::default(), AggregatorOptions::default());
        let mut state = aggregator.new_state(Capacity::default());
        let text = lines.join("\n") + "\n";
        let err = aggregator
            .process_stream(&mut state, text.as_bytes())
            .unwrap_err();
        assert!(matches!(
            err,
            TrificError::CapacityExceeded {
                resource: Resource::Bins,
                ..
            }
        ));
    }

    #[test]
    fn test_state_persists_across_streams() {
        let aggregator = Aggregator::new(DetectorGeometry::default(), AggregatorOptions::default());
        let mut state = aggregator.new_state(Capacity::default());

        let mut first = isotope_header("Sr", 94.0);
        for ordinal in 1..=5 {
            first.push(row(ordinal, 1000.0, 30.0, 0.0));
            first.push(row(ordinal, 900.0, 40.0, 0.0));
            first.push("x".to_string());
        }
        let mut second = isotope_header("Rb", 94.0);
        second.push(row(1, 1000.0, 30.0, 0.0));
        second.push(row(1, 600.0, 40.0, 0.0));
        second.push("x".to_string());

        let s1 = aggregator
            .process_stream(&mut state, (first.join("\n") + "\n").as_bytes())
            .unwrap();
        let s2 = aggregator
            .process_stream(&mut state, (second.join("\n") + "\n").as_bytes())
            .unwrap();

        assert_eq!(s1.new_isotopes(), 0..1);
        assert_eq!(s2.new_isotopes(), 1..2);
        assert_eq!(s2.reportable_isotopes(), 1..2);
        assert_eq!(state.total_ions(), 5);
        assert!((state.regions().ion_total(IonIdx(6)) - 0.4).abs() < 1e-9);
    }

    #[test]
    fn test_rows_without_header_continue_current_isotope() {
        let aggregator = Aggregator::new(DetectorGeometry::default(), AggregatorOptions::default());
        let mut state = aggregator.new_state(Capacity::default());

        let mut first = isotope_header("Sr", 94.0);
        first.push(row(1, 1000.0, 30.0, 0.0));
        first.push(row(1, 900.0, 40.0, 0.0));
        first.push("x".to_string());
        let second = [row(2, 1000.0, 30.0, 0.0), row(2, 800.0, 40.0, 0.0), "x".to_string()];

        let s1 = aggregator
            .process_stream(&mut state, (first.join("\n") + "\n").as_bytes())
            .unwrap();
        assert_eq!(s1.reportable_isotopes(), 0..1);
        state.mark_reported(IsotopeIdx(0));
        assert_eq!(state.reported_ions(IsotopeIdx(0)), 1);

        let s2 = aggregator
            .process_stream(&mut state, (second.join("\n") + "\n").as_bytes())
            .unwrap();
        assert!(s2.new_isotopes().is_empty());
        assert_eq!(s2.first_touched_isotope, Some(0));
        assert_eq!(s2.reportable_isotopes(), 0..1);
        assert_eq!(state.isotopes().current().unwrap().ion_count, 2);
        assert!((state.regions().ion_total(IonIdx(2)) - 0.2).abs() < 1e-9);
    }
}
