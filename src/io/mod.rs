//! # I/O Module
//!
//! File reading/writing boundaries: SRIM collision logs in, region-sum
//! report lines out.

pub mod input;
pub mod report;
pub mod srim;

pub use input::InputSource;
pub use report::ReportWriter;
pub use srim::{classify, Field, SrimLine};
