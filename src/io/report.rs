//! # Report Output
//!
//! Plain-text report blocks, one per isotope:
//!
//! ```text
//!
//! PID for Sr-94
//!
//! 0.3000, 0.0000
//! ...
//! ```
//! Bragg blocks use the same header shape with rows `<pair>, <energy>`.

use std::io::Write;

use crate::error::Result;
use crate::model::reporter::{IsotopeReport, ReportRow};

/// Writes isotope reports to any byte sink
pub struct ReportWriter<W: Write> {
    out: W,
    rows_written: usize,
}

impl<W: Write> ReportWriter<W> {
    pub fn new(out: W) -> Self {
        Self {
            out,
            rows_written: 0,
        }
    }

    /// Header line followed by one line per row
    pub fn write_report(&mut self, report: &IsotopeReport) -> Result<()> {
        write!(self.out, "\n{} for {}\n\n", report.kind.title(), report.label)?;
        for row in &report.rows {
            match row {
                ReportRow::Pair { x, y, .. } => writeln!(self.out, "{:.4}, {:.4}", x, y)?,
                ReportRow::Bragg { grid_pair, energy } => {
                    writeln!(self.out, "{}, {:.4}", grid_pair, energy)?
                }
            }
        }
        self.rows_written += report.rows.len();
        Ok(())
    }

    pub fn rows_written(&self) -> usize {
        self.rows_written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush()?;
        Ok(())
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data::IonIdx;
    use crate::model::reporter::ReportKind;

    #[test]
    fn test_pid_block() {
        let report = IsotopeReport {
            kind: ReportKind::Pid,
            label: "Sr-94".to_string(),
            rows: vec![
                ReportRow::Pair {
                    ion: IonIdx(1),
                    x: 0.3,
                    y: 0.0,
                },
                ReportRow::Pair {
                    ion: IonIdx(2),
                    x: 1.23456,
                    y: 12.0,
                },
            ],
        };
        let mut writer = ReportWriter::new(Vec::new());
        writer.write_report(&report).unwrap();
        assert_eq!(writer.rows_written(), 2);
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "\nPID for Sr-94\n\n0.3000, 0.0000\n1.2346, 12.0000\n");
    }

    #[test]
    fn test_bragg_block_and_empty_isotope() {
        let mut writer = ReportWriter::new(Vec::new());
        writer
            .write_report(&IsotopeReport {
                kind: ReportKind::Bragg,
                label: "Rb-94".to_string(),
                rows: vec![ReportRow::Bragg {
                    grid_pair: 1,
                    energy: 2.5,
                }],
            })
            .unwrap();
        writer
            .write_report(&IsotopeReport {
                kind: ReportKind::Pid,
                label: "Kr-94".to_string(),
                rows: Vec::new(),
            })
            .unwrap();
        let text = String::from_utf8(writer.into_inner()).unwrap();
        assert_eq!(text, "\nBragg for Rb-94\n\n1, 2.5000\n\nPID for Kr-94\n\n");
    }
}
