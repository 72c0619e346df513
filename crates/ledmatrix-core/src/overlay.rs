//! Stencil overlays composited onto the panel.
//!
//! A cell is transparent, takes the current accent color, or holds a
//! literal color. The packed stencil form uses 0 for transparent, 1 for the
//! accent and any other value as a literal `0xRRGGBB`.

use crate::color::Rgb;
use crate::frame::Frame;
use crate::glyphs::{self, Glyph};
use tracing::trace;

/// Packed stencil value meaning "paint with the accent color".
pub const ACCENT: u32 = 1;

/// One stencil cell.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Cell {
    #[default]
    Clear,
    Accent,
    Color(Rgb),
}

impl Cell {
    /// Decodes a packed stencil value.
    pub fn from_stencil(value: u32) -> Self {
        match value {
            0 => Cell::Clear,
            ACCENT => Cell::Accent,
            literal => Cell::Color(Rgb::from_u32(literal)),
        }
    }

    /// Color this cell paints, or `None` when transparent.
    #[inline]
    pub fn paint(self, accent: Rgb) -> Option<Rgb> {
        match self {
            Cell::Clear => None,
            Cell::Accent => Some(accent),
            Cell::Color(color) => Some(color),
        }
    }
}

/// A square stencil grid, row-major.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OverlayMatrix {
    side: u16,
    cells: Vec<Cell>,
}

impl OverlayMatrix {
    /// Creates a fully transparent overlay.
    pub fn new(side: u16) -> Self {
        Self {
            side,
            cells: vec![Cell::Clear; side as usize * side as usize],
        }
    }

    pub fn side_length(&self) -> u16 {
        self.side
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Row-major cells.
    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, row: usize, col: usize) -> Option<Cell> {
        let side = self.side as usize;
        (row < side && col < side).then(|| self.cells[row * side + col])
    }

    /// Sets one cell. Out-of-bounds writes are ignored.
    pub fn set(&mut self, row: usize, col: usize, cell: Cell) {
        let side = self.side as usize;
        if row < side && col < side {
            self.cells[row * side + col] = cell;
        }
    }

    /// Sets one cell to a literal color. Black is stored as transparent.
    pub fn set_color(&mut self, row: usize, col: usize, color: Rgb) {
        let cell = if color.is_black() {
            Cell::Clear
        } else {
            Cell::Color(color)
        };
        self.set(row, col, cell);
    }

    /// Makes every cell transparent.
    pub fn clear(&mut self) {
        self.cells.fill(Cell::Clear);
    }

    /// Number of non-transparent cells.
    pub fn coverage(&self) -> usize {
        self.cells.iter().filter(|&&c| c != Cell::Clear).count()
    }

    /// Writes the glyph's lit cells as accent cells with its top-left corner
    /// at `(row, col)`, clipping at the grid edge. Unlit glyph cells are left
    /// untouched.
    pub fn stamp(&mut self, glyph: &Glyph, row: usize, col: usize) {
        for (r, c) in glyph.lit_cells() {
            self.set(row + r, col + c, Cell::Accent);
        }
    }

    /// Lays out `h:mm` or `hh:mm` across the top rows.
    ///
    /// Single-digit hours are shifted right so the colon sits in the same
    /// column either way, and a one-column gap follows the first hour digit
    /// and precedes the last minute digit.
    pub fn render_time(&mut self, hour12: u32, minute: u32) {
        self.clear();
        let text = format!("{}:{:02}", hour12, minute % 60);

        let mut col = 0;
        let mut position = 0;
        if text.len() == 4 {
            position += 1;
            col += 3;
        }
        for c in text.chars() {
            if position == 1 || position == 4 {
                col += 1;
            }
            if let Some(glyph) = glyphs::clock_glyph(c) {
                self.stamp(&glyph, 0, col);
                col += glyph.width();
            }
            position += 1;
        }
        trace!("Rendered time {}", text);
    }

    /// Lays out the temperature followed by `F` on the lower half.
    pub fn render_temperature(&mut self, degrees: i32) {
        self.clear();
        let text = degrees.to_string();
        let side = self.side as usize;
        let row = side / 2;

        let mut col = if text.len() >= 3 { 1 } else { side / 4 + 1 };
        let mut end = col;
        for c in text.chars() {
            if let Some(glyph) = glyphs::temperature_glyph(c) {
                self.stamp(&glyph, row, col);
                end = col + glyph.width();
                col = end + 1;
            }
        }
        if let Some(f) = glyphs::temperature_glyph('F') {
            self.stamp(&f, row, end + 1);
        }
        trace!("Rendered temperature {}F", text);
    }

    /// Renders the stencil as a frame: accent cells in `accent`, literal
    /// colors as themselves, transparent cells black.
    pub fn to_frame(&self, accent: Rgb) -> Frame {
        let mut frame = Frame::new(self.side);
        let side = self.side as usize;
        for (i, &cell) in self.cells.iter().enumerate() {
            if let Some(color) = cell.paint(accent) {
                frame.set(i / side, i % side, color);
            }
        }
        frame
    }
}

impl AsRef<OverlayMatrix> for OverlayMatrix {
    fn as_ref(&self) -> &OverlayMatrix {
        self
    }
}
