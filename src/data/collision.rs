//! # Collision Samples
//!
//! One row of the SRIM collision log, in SRIM's native units. Samples are
//! buffered per ion and converted only when the ion's record closes.

/// Angstrom to millimetre
pub const ANGSTROM_TO_MM: f64 = 1.0e-7;

/// keV to MeV
pub const KEV_TO_MEV: f64 = 1.0e-3;

/// A single collision: ion energy after the collision and its position
#[derive(Clone, Copy, Debug, PartialEq, Default)]
pub struct Collision {
    /// Ion energy at this collision (keV)
    pub energy_kev: f64,
    /// Depth along the drift axis (Å)
    pub depth_angstrom: f64,
    /// Lateral offset (Å)
    pub lateral_angstrom: f64,
}

impl Collision {
    pub fn new(energy_kev: f64, depth_angstrom: f64, lateral_angstrom: f64) -> Self {
        Self {
            energy_kev,
            depth_angstrom,
            lateral_angstrom,
        }
    }

    #[inline]
    pub fn depth_mm(&self) -> f64 {
        self.depth_angstrom * ANGSTROM_TO_MM
    }

    #[inline]
    pub fn lateral_mm(&self) -> f64 {
        self.lateral_angstrom * ANGSTROM_TO_MM
    }

    /// Energy lost between `prev` and this collision (MeV)
    #[inline]
    pub fn loss_since_mev(&self, prev: &Collision) -> f64 {
        (prev.energy_kev - self.energy_kev) * KEV_TO_MEV
    }
}
