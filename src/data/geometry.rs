//! # Detector Geometry
//!
//! TRIFIC wire-grid layout along the drift axis and the mapping from a
//! collision position to a collection region.
//!
//! ## Bin Formula
//! ```text
//! bin = floor(((depth - window_to_wires) + lateral / sqrt(3)) / spacing) + 1
//! ```
//! Only collisions strictly between the first wires and the last grid
//! (`window_to_wires < depth < window_to_wires + spacing * num_grids`) are
//! binned; the region in front of the first wires and behind the last grid
//! is not collected.

use crate::data::BinIdx;
use crate::error::{Resource, Result, TrificError};

pub const DEFAULT_NUM_GRIDS: usize = 21;
pub const DEFAULT_SPACING_MM: f64 = 12.77;
pub const DEFAULT_WINDOW_TO_WIRES_MM: f64 = 23.78;
pub const DEFAULT_WINDOW_TO_END_MM: f64 = 505.52;

/// Grid layout of the detector (all lengths in mm)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DetectorGeometry {
    /// Number of installed grids
    pub num_grids: usize,
    /// Distance between consecutive grids
    pub spacing: f64,
    /// Distance from the entrance window to the first wires
    pub window_to_wires: f64,
    /// Distance from the entrance window to the end of the chamber
    pub window_to_end: f64,
}

impl Default for DetectorGeometry {
    fn default() -> Self {
        Self {
            num_grids: DEFAULT_NUM_GRIDS,
            spacing: DEFAULT_SPACING_MM,
            window_to_wires: DEFAULT_WINDOW_TO_WIRES_MM,
            window_to_end: DEFAULT_WINDOW_TO_END_MM,
        }
    }
}

impl DetectorGeometry {
    /// Number of collection bins (one per grid plus bin 0)
    pub fn n_bins(&self) -> usize {
        self.num_grids + 1
    }

    /// Depth of the last grid
    pub fn last_grid_depth(&self) -> f64 {
        self.window_to_wires + self.spacing * self.num_grids as f64
    }

    /// Whether a depth lies inside the collected region (exclusive on both ends)
    #[inline]
    pub fn in_window(&self, depth_mm: f64) -> bool {
        depth_mm > self.window_to_wires && depth_mm < self.last_grid_depth()
    }

    /// Raw bin formula; may fall outside `0..n_bins` for large lateral offsets
    #[inline]
    pub fn bin_index(&self, depth_mm: f64, lateral_mm: f64) -> i64 {
        let drift = (depth_mm - self.window_to_wires) + lateral_mm / 3f64.sqrt();
        (drift / self.spacing).floor() as i64 + 1
    }

    /// Collection bin for a collision, `None` when the depth is outside the window.
    ///
    /// A bin outside `0..n_bins` is a capacity error rather than a silent write.
    pub fn locate(&self, depth_mm: f64, lateral_mm: f64) -> Result<Option<BinIdx>> {
        if !self.in_window(depth_mm) {
            return Ok(None);
        }
        let bin = self.bin_index(depth_mm, lateral_mm);
        if bin < 0 || bin as usize >= self.n_bins() {
            return Err(TrificError::capacity(Resource::Bins, bin, self.n_bins()));
        }
        Ok(Some(BinIdx::new(bin as u16)))
    }

    /// Check the layout is physically consistent
    pub fn validate(&self) -> Result<()> {
        if self.num_grids == 0 || self.num_grids >= u16::MAX as usize {
            return Err(TrificError::config(format!(
                "numGrids must be between 1 and {}, got {}",
                u16::MAX - 1,
                self.num_grids
            )));
        }
        if !(self.spacing.is_finite() && self.spacing > 0.0) {
            return Err(TrificError::config(format!(
                "spacing must be positive, got {}",
                self.spacing
            )));
        }
        if !(self.window_to_wires.is_finite() && self.window_to_wires >= 0.0) {
            return Err(TrificError::config(format!(
                "windowToWires must be non-negative, got {}",
                self.window_to_wires
            )));
        }
        if self.window_to_end < self.last_grid_depth() {
            return Err(TrificError::config(format!(
                "windowToEnd ({}) lies in front of the last grid ({:.2})",
                self.window_to_end,
                self.last_grid_depth()
            )));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Power-of-two layout so every grid boundary is exactly representable
    fn exact_geometry() -> DetectorGeometry {
        DetectorGeometry {
            num_grids: 21,
            spacing: 8.0,
            window_to_wires: 16.0,
            window_to_end: 400.0,
        }
    }

    #[test]
    fn test_default_geometry_is_valid() {
        let g = DetectorGeometry::default();
        assert!(g.validate().is_ok());
        assert_eq!(g.n_bins(), 22);
        assert!((g.last_grid_depth() - 291.95).abs() < 1e-9);
    }

    #[test]
    fn test_bin_at_every_grid_transition() {
        let g = exact_geometry();
        for k in 1..g.num_grids {
            let boundary = g.window_to_wires + g.spacing * k as f64;
            assert_eq!(g.bin_index(boundary, 0.0), k as i64 + 1, "at grid {}", k);
            assert_eq!(g.bin_index(boundary - 1e-9, 0.0), k as i64, "below grid {}", k);
        }
    }

    #[test]
    fn test_lateral_offset_shifts_bin() {
        let g = exact_geometry();
        // 8 mm * sqrt(3) of lateral offset is exactly one spacing of drift
        let lateral = 8.0 * 3f64.sqrt();
        assert_eq!(g.bin_index(20.0, 0.0), 1);
        assert_eq!(g.bin_index(20.0, lateral), 2);
    }

    #[test]
    fn test_window_is_exclusive() {
        let g = exact_geometry();
        assert!(!g.in_window(16.0));
        assert!(g.in_window(16.0 + 1e-9));
        assert!(!g.in_window(g.last_grid_depth()));
        assert_eq!(g.locate(10.0, 0.0).unwrap(), None);
        assert_eq!(g.locate(g.last_grid_depth() + 1.0, 0.0).unwrap(), None);
    }

    #[test]
    fn test_locate_rejects_out_of_range_bin() {
        let g = exact_geometry();
        // Large negative lateral offset drives the formula below bin 0
        let err = g.locate(17.0, -100.0).unwrap_err();
        assert!(matches!(
            err,
            TrificError::CapacityExceeded {
                resource: Resource::Bins,
                ..
            }
        ));
        // Large positive offset near the last grid overshoots the last bin
        assert!(g.locate(g.last_grid_depth() - 0.5, 100.0).is_err());
    }

    #[test]
    fn test_validate_rejects_short_chamber() {
        let g = DetectorGeometry {
            window_to_end: 100.0,
            ..DetectorGeometry::default()
        };
        assert!(g.validate().is_err());
    }
}
