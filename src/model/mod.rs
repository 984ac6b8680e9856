//! # Model Module
//!
//! Energy-loss accumulation and the reports derived from it.
//!
//! ## Components
//! - `aggregator`: streams collision logs into the collection region table
//! - `partition`: bin groups and the pair of groups plotted for PID
//! - `reporter`: per-isotope PID and Bragg rows

pub mod aggregator;
pub mod partition;
pub mod reporter;

pub use aggregator::{Aggregator, AggregatorOptions, Capacity, RunState, StreamSummary};
pub use partition::{BinGroup, GroupPair, PartitionScheme};
pub use reporter::{IsotopeReport, ReportKind, ReportRow, Reporter};
