//! # Partition Scheme
//!
//! Groups of contiguous collection bins whose energies are summed together
//! for the PID plot, and the pair of groups plotted against each other.
//!
//! ## Defaults
//! ```text
//! group 1: bins  1..=6
//! group 2: bins  7..=12
//! group 3: bins 13..=20
//! pair:    group 1 vs group 3
//! ```
//! Both are parsed from the command line (`--groups 1-6,7-12,13-20`,
//! `--pair 13` or `--pair 1,3`).

use std::fmt;
use std::ops::RangeInclusive;
use std::str::FromStr;

use crate::data::{CollectionRegions, IonIdx};
use crate::error::{Result, TrificError};

/// Inclusive range of bins
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BinGroup {
    pub first: u16,
    pub last: u16,
}

impl BinGroup {
    pub fn new(first: u16, last: u16) -> Self {
        Self { first, last }
    }

    pub fn bins(&self) -> RangeInclusive<u16> {
        self.first..=self.last
    }

    pub fn len(&self) -> usize {
        if self.last < self.first {
            0
        } else {
            (self.last - self.first) as usize + 1
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Summed energy of this group for one ion
    pub fn sum(&self, table: &CollectionRegions, ion: IonIdx) -> f64 {
        table.range_sum(ion, self.bins())
    }
}

impl FromStr for BinGroup {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let parse_bin = |t: &str| {
            t.trim()
                .parse::<u16>()
                .map_err(|_| format!("invalid bin number '{}' in group '{}'", t.trim(), s))
        };
        match s.split_once('-') {
            Some((a, b)) => Ok(BinGroup::new(parse_bin(a)?, parse_bin(b)?)),
            None => {
                let bin = parse_bin(s)?;
                Ok(BinGroup::new(bin, bin))
            }
        }
    }
}

impl fmt::Display for BinGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.first == self.last {
            write!(f, "{}", self.first)
        } else {
            write!(f, "{}-{}", self.first, self.last)
        }
    }
}

/// Ordered list of bin groups
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct PartitionScheme {
    groups: Vec<BinGroup>,
}

impl Default for PartitionScheme {
    fn default() -> Self {
        Self {
            groups: vec![
                BinGroup::new(1, 6),
                BinGroup::new(7, 12),
                BinGroup::new(13, 20),
            ],
        }
    }
}

impl PartitionScheme {
    pub fn new(groups: Vec<BinGroup>) -> Self {
        Self { groups }
    }

    pub fn groups(&self) -> &[BinGroup] {
        &self.groups
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    /// Groups must be non-empty, ascending, disjoint and inside the table
    pub fn validate(&self, n_bins: usize) -> Result<()> {
        if self.groups.is_empty() {
            return Err(TrificError::config("partition scheme has no groups"));
        }
        let mut prev_last: Option<u16> = None;
        for group in &self.groups {
            if group.is_empty() {
                return Err(TrificError::config(format!(
                    "bin group {} is empty",
                    group
                )));
            }
            if group.last as usize >= n_bins {
                return Err(TrificError::config(format!(
                    "bin group {} exceeds the last bin {}",
                    group,
                    n_bins - 1
                )));
            }
            if let Some(prev) = prev_last {
                if group.first <= prev {
                    return Err(TrificError::config(format!(
                        "bin group {} overlaps or precedes the previous group",
                        group
                    )));
                }
            }
            prev_last = Some(group.last);
        }
        Ok(())
    }

    /// Summed energy of every group for one ion, in group order
    pub fn group_sums(&self, table: &CollectionRegions, ion: IonIdx) -> Vec<f64> {
        self.groups.iter().map(|g| g.sum(table, ion)).collect()
    }
}

impl FromStr for PartitionScheme {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let groups = s
            .split(',')
            .filter(|t| !t.trim().is_empty())
            .map(BinGroup::from_str)
            .collect::<std::result::Result<Vec<_>, _>>()?;
        if groups.is_empty() {
            return Err("expected at least one bin group, e.g. 1-6,7-12,13-20".to_string());
        }
        Ok(Self { groups })
    }
}

impl fmt::Display for PartitionScheme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, g) in self.groups.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", g)?;
        }
        Ok(())
    }
}

/// The two groups plotted against each other (0-based group indices)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct GroupPair {
    pub x: usize,
    pub y: usize,
}

impl Default for GroupPair {
    fn default() -> Self {
        Self { x: 0, y: 2 }
    }
}

impl GroupPair {
    pub fn validate(&self, scheme: &PartitionScheme) -> Result<()> {
        let n = scheme.len();
        if self.x >= n || self.y >= n {
            return Err(TrificError::config(format!(
                "group pair {} refers to a group beyond the {} configured",
                self, n
            )));
        }
        Ok(())
    }

    /// Pick the pair out of per-group sums
    pub fn select(&self, sums: &[f64]) -> (f64, f64) {
        (
            sums.get(self.x).copied().unwrap_or(0.0),
            sums.get(self.y).copied().unwrap_or(0.0),
        )
    }
}

impl FromStr for GroupPair {
    type Err = String;

    /// Accepts `1,3` or the compact `13` form (1-based group numbers)
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let s = s.trim();
        let (a, b) = match s.split_once(',') {
            Some((a, b)) => (a.trim(), b.trim()),
            None if s.len() == 2 && s.is_ascii() => (&s[..1], &s[1..]),
            None => return Err(format!("expected a group pair like 13 or 1,3, got '{}'", s)),
        };
        let parse = |t: &str| match t.parse::<usize>() {
            Ok(n) if n >= 1 => Ok(n - 1),
            _ => Err(format!("invalid group number '{}' (groups are numbered from 1)", t)),
        };
        Ok(GroupPair {
            x: parse(a)?,
            y: parse(b)?,
        })
    }
}

impl fmt::Display for GroupPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.x + 1, self.y + 1)
    }
}
