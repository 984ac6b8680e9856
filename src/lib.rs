//! # TRIFIC Library Root
//!
//! ## Role
//! The crate root that declares all public modules and re-exports common types.
//!
//! ## Spec
//! - Declare all public modules (`pub mod data`, `pub mod model`, etc.).
//! - Re-export commonly used types for ergonomic access.
//! - The binary is a thin wrapper over [`pipelines::SimulationPipeline`].
//!
//! ## Module Structure
//! ```text
//! trific
//! ├── data        # Collisions, detector geometry, isotopes, region table
//! ├── io          # SRIM log schema, input sources, report output
//! ├── model       # Aggregation, bin partitions, reports
//! └── pipelines   # Run orchestration
//! ```

pub mod config;
pub mod data;
pub mod error;
pub mod io;
pub mod model;
pub mod pipelines;

pub use config::Config;
pub use data::{BinIdx, CollectionRegions, DetectorGeometry, IonIdx, IsotopeIdx};
pub use error::{Result, TrificError};
pub use model::{Aggregator, AggregatorOptions, Capacity, PartitionScheme, ReportKind, RunState};
pub use pipelines::{RunSummary, SimulationPipeline};
