//! Whole-grid rotation in quarter turns.
//!
//! Panels are mounted in whatever orientation suits the wall, while the strip
//! wiring stays fixed. Rotation is applied to the logical grid before any
//! addressing happens, counting counter-clockwise quarter turns.

use crate::{Error, Result};
use std::str::FromStr;

/// Number of counter-clockwise quarter turns (0-3).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rotation(u8);

impl Rotation {
    /// No rotation.
    pub const NONE: Rotation = Rotation(0);

    /// Creates a rotation of `quarter_turns`, which must be 0-3.
    pub fn new(quarter_turns: u8) -> Result<Self> {
        if quarter_turns > 3 {
            return Err(Error::InvalidRotation(quarter_turns));
        }
        Ok(Self(quarter_turns))
    }

    /// Returns the number of quarter turns.
    pub fn quarter_turns(&self) -> u8 {
        self.0
    }

    /// Returns the rotation in degrees.
    pub fn degrees(&self) -> u16 {
        self.0 as u16 * 90
    }

    /// Maps a logical `(row, col)` on a `side`-square grid to where that cell
    /// lands after rotating the whole grid.
    pub fn apply(&self, row: usize, col: usize, side: usize) -> (usize, usize) {
        let (mut r, mut c) = (row, col);
        for _ in 0..self.0 {
            // One counter-clockwise turn: the left column becomes the bottom row.
            (r, c) = (side - 1 - c, r);
        }
        (r, c)
    }
}

impl FromStr for Rotation {
    type Err = Error;

    /// Accepts quarter turns (`0`-`3`) or degrees (`90`, `180`, `270`).
    fn from_str(s: &str) -> Result<Self> {
        let value: u16 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidRotation(u8::MAX))?;
        match value {
            0..=3 => Self::new(value as u8),
            90 => Ok(Self(1)),
            180 => Ok(Self(2)),
            270 => Ok(Self(3)),
            _ => Err(Error::InvalidRotation(value.min(u8::MAX as u16) as u8)),
        }
    }
}

impl std::fmt::Display for Rotation {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}°", self.degrees())
    }
}
