//! # Isotope Bookkeeping
//!
//! Per-isotope metadata gathered from the SRIM header lines, plus the ion
//! count and ion offset that place the isotope's ions in the region table.

use crate::data::{IonIdx, IsotopeIdx};
use crate::error::{Resource, Result, TrificError};

/// Metadata and ion bookkeeping for one isotope
#[derive(Clone, Debug, PartialEq)]
pub struct IsotopeRecord {
    /// Element symbol as written in the header (e.g. "Sr")
    pub name: String,
    /// Mass in amu
    pub mass: f64,
    /// Initial beam energy in keV
    pub initial_energy: f64,
    /// Ions completed for this isotope so far
    pub ion_count: u32,
    /// Total ions processed before this isotope's first ion
    pub ion_offset: u32,
}

impl IsotopeRecord {
    /// Label used in report headers, e.g. `Sr-94`
    pub fn label(&self) -> String {
        format!("{}-{:.0}", self.name, self.mass.ceil())
    }

    /// Global indices of this isotope's ions, in processing order.
    ///
    /// Ordinals in a SRIM log start at 1, so the first ion sits at `offset + 1`.
    pub fn ion_indices(&self) -> impl Iterator<Item = IonIdx> {
        let first = self.ion_offset + 1;
        (first..first + self.ion_count).map(IonIdx::new)
    }
}

/// Arena of isotopes in processing order, bounded by a configured capacity
#[derive(Clone, Debug)]
pub struct Isotopes {
    records: Vec<IsotopeRecord>,
    capacity: usize,
}

impl Isotopes {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            records: Vec::new(),
            capacity,
        }
    }

    /// Append a new isotope; fails once the configured limit is reached
    pub fn push(&mut self, record: IsotopeRecord) -> Result<IsotopeIdx> {
        if self.records.len() >= self.capacity {
            return Err(TrificError::capacity(
                Resource::Isotopes,
                self.records.len() as i64 + 1,
                self.capacity,
            ));
        }
        let idx = IsotopeIdx::from(self.records.len());
        self.records.push(record);
        Ok(idx)
    }

    pub fn get(&self, idx: IsotopeIdx) -> Option<&IsotopeRecord> {
        self.records.get(idx.as_usize())
    }

    /// The isotope currently receiving ions
    pub fn current_mut(&mut self) -> Option<&mut IsotopeRecord> {
        self.records.last_mut()
    }

    pub fn current(&self) -> Option<&IsotopeRecord> {
        self.records.last()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn iter(&self) -> impl Iterator<Item = (IsotopeIdx, &IsotopeRecord)> {
        self.records
            .iter()
            .enumerate()
            .map(|(i, r)| (IsotopeIdx::from(i), r))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record(name: &str, mass: f64, offset: u32, count: u32) -> IsotopeRecord {
        IsotopeRecord {
            name: name.to_string(),
            mass,
            initial_energy: 0.0,
            ion_count: count,
            ion_offset: offset,
        }
    }

    #[test]
    fn test_label_rounds_mass_up() {
        assert_eq!(record("Sr", 93.915, 0, 0).label(), "Sr-94");
        assert_eq!(record("Rb", 94.0, 0, 0).label(), "Rb-94");
    }

    #[test]
    fn test_ion_indices_follow_offset() {
        let ions: Vec<u32> = record("Mo", 94.0, 5, 3).ion_indices().map(|i| i.0).collect();
        assert_eq!(ions, vec![6, 7, 8]);
    }

    #[test]
    fn test_push_respects_capacity() {
        let mut isotopes = Isotopes::with_capacity(2);
        assert_eq!(isotopes.push(record("A", 1.0, 0, 0)).unwrap(), IsotopeIdx(0));
        assert_eq!(isotopes.push(record("B", 1.0, 0, 0)).unwrap(), IsotopeIdx(1));
        let err = isotopes.push(record("C", 1.0, 0, 0)).unwrap_err();
        assert!(matches!(
            err,
            TrificError::CapacityExceeded {
                resource: Resource::Isotopes,
                value: 3,
                limit: 2
            }
        ));
        assert_eq!(isotopes.len(), 2);
    }
}
