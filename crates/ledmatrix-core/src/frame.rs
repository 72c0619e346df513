//! Square RGB frame, the unit every stage of the pipeline works on.

use crate::color::Rgb;
use crate::rotation::Rotation;
use crate::{Error, Result};

/// A `side × side` grid of colors stored row-major.
///
/// Frames are superseded rather than mutated between steps, so the previous
/// value can serve as the diff baseline. `Clone` is a deep copy.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    side: u16,
    pixels: Vec<Rgb>,
}

impl Frame {
    /// Creates a frame initialized to black.
    pub fn new(side: u16) -> Self {
        let size = side as usize * side as usize;
        Self {
            side,
            pixels: vec![Rgb::BLACK; size],
        }
    }

    /// Creates a frame from row-major pixel data.
    pub fn from_pixels(side: u16, pixels: Vec<Rgb>) -> Result<Self> {
        let expected = side as usize * side as usize;
        if pixels.len() != expected {
            return Err(Error::SizeMismatch {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self { side, pixels })
    }

    /// Returns the side length.
    pub fn side_length(&self) -> u16 {
        self.side
    }

    /// Returns the pixel count.
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Returns true for a zero-sized frame.
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    /// Returns the row-major pixel data.
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    /// Gets the pixel at `(row, col)`, or `None` when out of bounds.
    pub fn get(&self, row: usize, col: usize) -> Option<Rgb> {
        let side = self.side as usize;
        if row < side && col < side {
            Some(self.pixels[row * side + col])
        } else {
            None
        }
    }

    /// Sets the pixel at `(row, col)`. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, color: Rgb) {
        let side = self.side as usize;
        if row < side && col < side {
            self.pixels[row * side + col] = color;
        }
    }

    /// Fills every pixel with one color.
    pub fn fill(&mut self, color: Rgb) {
        self.pixels.fill(color);
    }

    /// Returns true if every pixel is black.
    pub fn is_black(&self) -> bool {
        self.pixels.iter().all(|p| p.is_black())
    }

    /// Returns a copy of the frame rotated as a whole.
    pub fn rotated(&self, rotation: Rotation) -> Frame {
        if rotation == Rotation::NONE {
            return self.clone();
        }
        let side = self.side as usize;
        let mut out = Frame::new(self.side);
        for row in 0..side {
            for col in 0..side {
                let (r, c) = rotation.apply(row, col, side);
                out.pixels[r * side + c] = self.pixels[row * side + col];
            }
        }
        out
    }
}
