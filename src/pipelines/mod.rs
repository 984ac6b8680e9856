//! # Pipeline Module
//!
//! High-level orchestration of a simulation run.
//! Coordinates input sources, aggregation and report output.

pub mod simulation;

pub use simulation::{RunSummary, SimulationPipeline};
