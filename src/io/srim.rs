//! # SRIM Collision Log Records
//!
//! Fixed-column layout of TRIM's `COLLISON.txt` and classification of its
//! lines. Lines are handled as raw bytes: SRIM draws its table borders with
//! CP437 box characters, which are not valid UTF-8, while every field this
//! crate reads is plain ASCII at a fixed byte offset.
//!
//! ## Layout
//! ```text
//! header lines (length > 30):
//!   [6, 14)  "Ion Name"     name    [23, 25)
//!   [6, 14)  "Ion Mass"     mass    [22, 29)
//!   [6, 16)  "Ion Energy"   energy  [18, 29)
//! collision rows (byte 1 is '0' or '1'):
//!   ordinal [1, 6)  energy keV [7, 16)  depth Å [17, 27)  lateral Å [39, 49)
//! ```
//! Anything else terminates the current ion record.

use std::borrow::Cow;

use crate::data::Collision;

/// A fixed-width column: byte offset and width
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Field {
    pub offset: usize,
    pub width: usize,
}

impl Field {
    pub const fn new(offset: usize, width: usize) -> Self {
        Self { offset, width }
    }

    /// Bytes of this field, clamped to the end of the line
    #[inline]
    pub fn slice<'a>(&self, line: &'a [u8]) -> &'a [u8] {
        let start = self.offset.min(line.len());
        let end = (self.offset + self.width).min(line.len());
        &line[start..end]
    }

    pub fn text<'a>(&self, line: &'a [u8]) -> Cow<'a, str> {
        String::from_utf8_lossy(self.slice(line))
    }

    #[inline]
    pub fn matches(&self, line: &[u8], expected: &[u8]) -> bool {
        self.slice(line) == expected
    }

    /// Permissive float: leading numeric prefix, 0.0 when there is none
    #[inline]
    pub fn float(&self, line: &[u8]) -> f64 {
        parse_leading_f64(self.slice(line))
    }
}

/// Column schema of the collision log
pub mod schema {
    use super::Field;

    /// Header lines must be longer than this to carry metadata
    pub const HEADER_MIN_LEN: usize = 30;

    pub const NAME_LABEL: Field = Field::new(6, 8);
    pub const MASS_LABEL: Field = Field::new(6, 8);
    pub const ENERGY_LABEL: Field = Field::new(6, 10);

    pub const NAME: Field = Field::new(23, 2);
    pub const MASS: Field = Field::new(22, 7);
    pub const ENERGY: Field = Field::new(18, 11);

    pub const ROW_MARKER: Field = Field::new(1, 1);
    pub const ORDINAL: Field = Field::new(1, 5);
    pub const COLLISION_ENERGY: Field = Field::new(7, 9);
    pub const DEPTH: Field = Field::new(17, 10);
    pub const LATERAL: Field = Field::new(39, 10);
}

/// A classified line of the collision log
#[derive(Clone, Debug, PartialEq)]
pub enum SrimLine {
    IonName(String),
    IonMass(f64),
    IonEnergy(f64),
    Collision { ordinal: u32, collision: Collision },
    /// Anything else; closes an open ion record
    Terminator,
}

impl SrimLine {
    pub fn is_collision(&self) -> bool {
        matches!(self, SrimLine::Collision { .. })
    }
}

/// Classify one line (without its line ending). First match wins:
/// name, mass, energy, collision row, terminator.
pub fn classify(line: &[u8]) -> SrimLine {
    use schema::*;

    if line.len() > HEADER_MIN_LEN {
        if NAME_LABEL.matches(line, b"Ion Name") {
            return SrimLine::IonName(NAME.text(line).trim().to_string());
        }
        if MASS_LABEL.matches(line, b"Ion Mass") {
            return SrimLine::IonMass(MASS.float(line));
        }
        if ENERGY_LABEL.matches(line, b"Ion Energy") {
            return SrimLine::IonEnergy(ENERGY.float(line));
        }
    }

    let marker = ROW_MARKER.slice(line);
    if marker == b"0" || marker == b"1" {
        let ordinal = ORDINAL.float(line);
        let collision = Collision::new(
            COLLISION_ENERGY.float(line),
            DEPTH.float(line),
            LATERAL.float(line),
        );
        return SrimLine::Collision {
            // float-to-int `as` saturates: negatives and NaN become 0
            ordinal: ordinal as u32,
            collision,
        };
    }

    SrimLine::Terminator
}

/// Strip a trailing `\n` / `\r\n`
#[inline]
pub fn trim_line_ending(mut line: &[u8]) -> &[u8] {
    if let Some(rest) = line.strip_suffix(b"\n") {
        line = rest;
    }
    if let Some(rest) = line.strip_suffix(b"\r") {
        line = rest;
    }
    line
}

/// Parse the longest leading float in `bytes`, skipping leading whitespace.
///
/// Mirrors C `strtod`: `"1.5E+03abc"` is 1500, `"abc"` is 0, `"2.0E"` is 2.
pub fn parse_leading_f64(bytes: &[u8]) -> f64 {
    let start = bytes
        .iter()
        .position(|b| !b.is_ascii_whitespace())
        .unwrap_or(bytes.len());
    let s = &bytes[start..];

    let count_digits = |from: usize| s[from.min(s.len())..].iter().take_while(|b| b.is_ascii_digit()).count();

    let mut end = 0;
    if matches!(s.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_digits = count_digits(end);
    end += int_digits;

    let mut frac_digits = 0;
    if s.get(end) == Some(&b'.') {
        frac_digits = count_digits(end + 1);
        if int_digits + frac_digits > 0 {
            end += 1 + frac_digits;
        }
    }
    if int_digits + frac_digits == 0 {
        return 0.0;
    }

    if matches!(s.get(end), Some(b'e' | b'E')) {
        let mut exp_end = end + 1;
        if matches!(s.get(exp_end), Some(b'+' | b'-')) {
            exp_end += 1;
        }
        let exp_digits = count_digits(exp_end);
        if exp_digits > 0 {
            end = exp_end + exp_digits;
        }
    }

    std::str::from_utf8(&s[..end])
        .ok()
        .and_then(|t| t.parse().ok())
        .unwrap_or(0.0)
}
