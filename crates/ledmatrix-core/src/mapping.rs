//! Logical grid to physical strip index mapping.
//!
//! Strips are wired boustrophedon style: columns are walked in index order,
//! even columns top-to-bottom and odd columns bottom-to-top, so the strip
//! zig-zags instead of running a return wire after every column.
//!
//! ```text
//!   4x4, no rotation:
//!     0   7   8  15
//!     1   6   9  14
//!     2   5  10  13
//!     3   4  11  12
//! ```

use crate::color::Rgb;
use crate::frame::Frame;
use crate::rotation::Rotation;
use crate::{Error, Result};

/// Physical index of `(row, col)` on an unrotated serpentine grid of height `height`.
#[inline]
pub fn serpentine_index(row: usize, col: usize, height: usize) -> usize {
    if col % 2 == 0 {
        col * height + row
    } else {
        col * height + (height - 1 - row)
    }
}

/// Immutable bijection between logical cells and physical strip indices.
///
/// Built once per session from the side length and panel rotation, then
/// shared read-only by the encoder, player and compositor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressMap {
    side: u16,
    rotation: Rotation,
    /// Physical index for each logical cell, row-major.
    to_physical: Vec<u32>,
    /// Logical row-major cell for each physical index.
    to_logical: Vec<u32>,
}

impl AddressMap {
    /// Builds the map for a `side`-square panel mounted with `rotation`.
    pub fn new(side: u16, rotation: Rotation) -> Self {
        let n = side as usize;
        let mut to_physical = vec![0u32; n * n];
        let mut to_logical = vec![0u32; n * n];

        for row in 0..n {
            for col in 0..n {
                let (r, c) = rotation.apply(row, col, n);
                let physical = serpentine_index(r, c, n);
                let logical = row * n + col;
                to_physical[logical] = physical as u32;
                to_logical[physical] = logical as u32;
            }
        }

        Self {
            side,
            rotation,
            to_physical,
            to_logical,
        }
    }

    /// Returns the side length.
    pub fn side_length(&self) -> u16 {
        self.side
    }

    /// Returns the rotation the map was built with.
    pub fn rotation(&self) -> Rotation {
        self.rotation
    }

    /// Returns the number of pixels.
    pub fn len(&self) -> usize {
        self.to_physical.len()
    }

    /// Returns true for a zero-sized panel.
    pub fn is_empty(&self) -> bool {
        self.to_physical.is_empty()
    }

    /// Physical strip index for a logical cell.
    ///
    /// # Panics
    ///
    /// Panics if `row` or `col` is outside the grid.
    #[inline]
    pub fn physical(&self, row: usize, col: usize) -> usize {
        let side = self.side as usize;
        assert!(row < side && col < side, "cell ({row}, {col}) outside {side}x{side} grid");
        self.to_physical[row * side + col] as usize
    }

    /// Logical `(row, col)` for a physical strip index, or `None` when out of range.
    #[inline]
    pub fn logical(&self, physical: usize) -> Option<(usize, usize)> {
        let side = self.side as usize;
        self.to_logical
            .get(physical)
            .map(|&cell| (cell as usize / side, cell as usize % side))
    }

    /// Lays a logical frame out in strip order.
    pub fn to_strip(&self, frame: &Frame) -> Result<Vec<Rgb>> {
        self.check_frame(frame)?;
        Ok(self
            .to_logical
            .iter()
            .map(|&cell| frame.pixels()[cell as usize])
            .collect())
    }

    /// Rebuilds a logical frame from strip-ordered pixels.
    pub fn to_frame(&self, strip: &[Rgb]) -> Result<Frame> {
        if strip.len() != self.len() {
            return Err(Error::SizeMismatch {
                expected: self.len(),
                actual: strip.len(),
            });
        }
        let mut pixels = vec![Rgb::BLACK; self.len()];
        for (physical, &cell) in self.to_logical.iter().enumerate() {
            pixels[cell as usize] = strip[physical];
        }
        Frame::from_pixels(self.side, pixels)
    }

    /// Fails unless the frame has the map's side length.
    pub fn check_frame(&self, frame: &Frame) -> Result<()> {
        if frame.side_length() != self.side {
            return Err(Error::SizeMismatch {
                expected: self.len(),
                actual: frame.len(),
            });
        }
        Ok(())
    }

    pub(crate) fn logical_cells(&self) -> &[u32] {
        &self.to_logical
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serpentine_formula() {
        assert_eq!(serpentine_index(0, 0, 16), 0);
        assert_eq!(serpentine_index(15, 0, 16), 15);
        assert_eq!(serpentine_index(15, 1, 16), 16);
        assert_eq!(serpentine_index(0, 1, 16), 31);
        assert_eq!(serpentine_index(0, 2, 16), 32);
    }

    #[test]
    fn test_scenario_row0_col1() {
        let map = AddressMap::new(16, Rotation::NONE);
        assert_eq!(map.physical(0, 1), 31);
        assert_eq!(map.logical(31), Some((0, 1)));
    }

    #[test]
    fn test_bijection_all_rotations() {
        for side in 1..=9u16 {
            for k in 0..4 {
                let map = AddressMap::new(side, Rotation::new(k).unwrap());
                let n = side as usize;
                let mut seen = vec![false; n * n];
                for row in 0..n {
                    for col in 0..n {
                        let p = map.physical(row, col);
                        assert!(p < n * n);
                        assert!(!seen[p], "index {p} mapped twice (side {side}, k {k})");
                        seen[p] = true;
                        assert_eq!(map.logical(p), Some((row, col)));
                    }
                }
                assert!(seen.iter().all(|&s| s));
            }
        }
    }

    #[test]
    fn test_rotation_matches_rotated_grid() {
        // Addressing a logical cell through a rotated map lands where the
        // unrotated map sends the same cell of the rotated frame.
        let side = 6u16;
        let plain = AddressMap::new(side, Rotation::NONE);
        for k in 0..4 {
            let rotation = Rotation::new(k).unwrap();
            let map = AddressMap::new(side, rotation);
            for row in 0..side as usize {
                for col in 0..side as usize {
                    let (r, c) = rotation.apply(row, col, side as usize);
                    assert_eq!(map.physical(row, col), plain.physical(r, c));
                }
            }
        }
    }

    #[test]
    fn test_strip_round_trip() {
        let map = AddressMap::new(4, Rotation::new(3).unwrap());
        let mut frame = Frame::new(4);
        frame.set(0, 1, Rgb::new(10, 20, 30));
        frame.set(3, 2, Rgb::new(1, 1, 1));
        let strip = map.to_strip(&frame).unwrap();
        assert_eq!(strip[map.physical(0, 1)], Rgb::new(10, 20, 30));
        assert_eq!(map.to_frame(&strip).unwrap(), frame);
    }

    #[test]
    fn test_size_checks() {
        let map = AddressMap::new(4, Rotation::NONE);
        assert!(map.to_strip(&Frame::new(5)).is_err());
        assert!(map.to_frame(&[Rgb::BLACK; 3]).is_err());
        assert_eq!(map.logical(16), None);
    }
}
