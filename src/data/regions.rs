//! # Collection Region Table
//!
//! Accumulated energy loss per (ion, bin). Replaces a fixed
//! `[bins][ions]` array with a flat ion-major buffer that grows one row at
//! a time as new ion indices are touched, up to a configured ion capacity.
//!
//! ```text
//!            bin 0   bin 1   ...   bin N
//! ion 0    [  0.0  ,  0.0  , ... ,  0.0  ]
//! ion 1    [  0.0  ,  0.35 , ... ,  0.0  ]
//! ...
//! ```
//! Rows never touched read back as zero.

use std::ops::RangeInclusive;

use crate::data::{BinIdx, IonIdx};
use crate::error::{Resource, Result, TrificError};

#[derive(Clone, Debug)]
pub struct CollectionRegions {
    /// Energy (MeV), `n_bins` cells per ion row
    cells: Vec<f64>,
    /// Bins per ion (number of grids + 1)
    n_bins: usize,
    /// Maximum number of ion rows
    ion_capacity: usize,
}

impl CollectionRegions {
    pub fn new(n_bins: usize, ion_capacity: usize) -> Self {
        Self {
            cells: Vec::new(),
            n_bins,
            ion_capacity,
        }
    }

    pub fn n_bins(&self) -> usize {
        self.n_bins
    }

    pub fn ion_capacity(&self) -> usize {
        self.ion_capacity
    }

    /// Number of ion rows currently materialized
    pub fn n_ion_rows(&self) -> usize {
        self.cells.len() / self.n_bins.max(1)
    }

    /// Fail unless `ion` is a valid row index under the configured capacity
    pub fn check_ion(&self, ion: IonIdx) -> Result<()> {
        if ion.as_usize() >= self.ion_capacity {
            return Err(TrificError::capacity(
                Resource::Ions,
                ion.0 as i64,
                self.ion_capacity,
            ));
        }
        Ok(())
    }

    fn check_bin(&self, bin: BinIdx) -> Result<()> {
        if bin.as_usize() >= self.n_bins {
            return Err(TrificError::capacity(
                Resource::Bins,
                bin.0 as i64,
                self.n_bins,
            ));
        }
        Ok(())
    }

    /// Add energy to a cell, growing the table to include `ion` if needed
    pub fn add(&mut self, ion: IonIdx, bin: BinIdx, energy_mev: f64) -> Result<()> {
        self.check_ion(ion)?;
        self.check_bin(bin)?;
        let row_end = (ion.as_usize() + 1) * self.n_bins;
        if self.cells.len() < row_end {
            self.cells.resize(row_end, 0.0);
        }
        self.cells[ion.as_usize() * self.n_bins + bin.as_usize()] += energy_mev;
        Ok(())
    }

    /// Energy in a cell; zero for rows never written or indices out of range
    #[inline]
    pub fn get(&self, ion: IonIdx, bin: BinIdx) -> f64 {
        if bin.as_usize() >= self.n_bins {
            return 0.0;
        }
        self.cells
            .get(ion.as_usize() * self.n_bins + bin.as_usize())
            .copied()
            .unwrap_or(0.0)
    }

    /// All bins for one ion (all zeros if the row was never written)
    pub fn row(&self, ion: IonIdx) -> Vec<f64> {
        let start = ion.as_usize() * self.n_bins;
        match self.cells.get(start..start + self.n_bins) {
            Some(row) => row.to_vec(),
            None => vec![0.0; self.n_bins],
        }
    }

    /// Sum of an inclusive bin range for one ion; bins past the table are ignored
    pub fn range_sum(&self, ion: IonIdx, bins: RangeInclusive<u16>) -> f64 {
        bins.map(|b| self.get(ion, BinIdx::new(b))).sum()
    }

    /// Total energy collected for one ion across all bins
    pub fn ion_total(&self, ion: IonIdx) -> f64 {
        self.row(ion).iter().sum()
    }
}
