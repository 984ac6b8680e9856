//! # Data Module
//!
//! In-memory representations of the run: detector geometry, isotope
//! bookkeeping and the collection region table.
//!
//! ## Design Philosophy
//! - **Zero-cost newtypes:** `IonIdx`, `BinIdx`, `IsotopeIdx` keep the three
//!   index spaces of the table apart at compile time.
//! - **Arena + index:** isotopes live in a `Vec` addressed by `IsotopeIdx`;
//!   the region table is a flat, ion-major buffer addressed by `(IonIdx, BinIdx)`.
//! - **Bounds checked:** every index is validated against the configured
//!   capacity before it touches storage.

pub mod collision;
pub mod geometry;
pub mod isotope;
pub mod regions;

pub use collision::Collision;
pub use geometry::DetectorGeometry;
pub use isotope::{IsotopeRecord, Isotopes};
pub use regions::CollectionRegions;

/// Run-wide ion index (per-file ordinal plus the running ion offset)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IonIdx(pub u32);

impl IonIdx {
    pub fn new(idx: u32) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for IonIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u32)
    }
}

impl From<IonIdx> for usize {
    fn from(idx: IonIdx) -> usize {
        idx.0 as usize
    }
}

/// Spatial collection bin (0 ..= number of grids)
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct BinIdx(pub u16);

impl BinIdx {
    pub fn new(idx: u16) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<BinIdx> for usize {
    fn from(idx: BinIdx) -> usize {
        idx.0 as usize
    }
}

/// Position of an isotope in processing order
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Default)]
pub struct IsotopeIdx(pub u16);

impl IsotopeIdx {
    pub fn new(idx: u16) -> Self {
        Self(idx)
    }

    pub fn as_usize(self) -> usize {
        self.0 as usize
    }
}

impl From<usize> for IsotopeIdx {
    fn from(idx: usize) -> Self {
        Self(idx as u16)
    }
}
