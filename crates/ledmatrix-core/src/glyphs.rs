//! Built-in 3x5 pixel font for the clock and thermometer.
//!
//! Two variants of `1` exist: the clock draws it as a bare stroke so `11:11`
//! stays legible, the thermometer gives it a flag.

/// Glyph height in rows.
pub const GLYPH_HEIGHT: usize = 5;

/// A monochrome bitmap, row-major, 1 = lit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Glyph {
    width: usize,
    bits: &'static [u8],
}

impl Glyph {
    const fn new(width: usize, bits: &'static [u8]) -> Self {
        Self { width, bits }
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.bits.len() / self.width
    }

    /// True if the cell at `(row, col)` is lit.
    pub fn is_lit(&self, row: usize, col: usize) -> bool {
        col < self.width && self.bits.get(row * self.width + col) == Some(&1)
    }

    /// Lit cells as `(row, col)` offsets.
    pub fn lit_cells(&self) -> impl Iterator<Item = (usize, usize)> + '_ {
        let width = self.width;
        self.bits
            .iter()
            .enumerate()
            .filter(|(_, &bit)| bit == 1)
            .map(move |(i, _)| (i / width, i % width))
    }
}

#[rustfmt::skip]
const DIGITS: [Glyph; 10] = [
    Glyph::new(3, &[1,1,1, 1,0,1, 1,0,1, 1,0,1, 1,1,1]),
    Glyph::new(3, &[0,1,0, 1,1,0, 0,1,0, 0,1,0, 1,1,1]),
    Glyph::new(3, &[1,1,1, 0,0,1, 1,1,1, 1,0,0, 1,1,1]),
    Glyph::new(3, &[1,1,1, 0,0,1, 1,1,1, 0,0,1, 1,1,1]),
    Glyph::new(3, &[1,0,1, 1,0,1, 1,1,1, 0,0,1, 0,0,1]),
    Glyph::new(3, &[1,1,1, 1,0,0, 1,1,1, 0,0,1, 1,1,1]),
    Glyph::new(3, &[1,1,1, 1,0,0, 1,1,1, 1,0,1, 1,1,1]),
    Glyph::new(3, &[1,1,1, 0,0,1, 0,0,1, 0,0,1, 0,0,1]),
    Glyph::new(3, &[1,1,1, 1,0,1, 1,1,1, 1,0,1, 1,1,1]),
    Glyph::new(3, &[1,1,1, 1,0,1, 1,1,1, 0,0,1, 1,1,1]),
];

#[rustfmt::skip]
const CLOCK_ONE: Glyph = Glyph::new(3, &[0,1,0, 0,1,0, 0,1,0, 0,1,0, 0,1,0]);

#[rustfmt::skip]
const COLON: Glyph = Glyph::new(2, &[0,0, 0,1, 0,0, 1,0, 0,0]);

#[rustfmt::skip]
const MINUS: Glyph = Glyph::new(3, &[0,0,0, 0,0,0, 1,1,1, 0,0,0, 0,0,0]);

#[rustfmt::skip]
const LETTER_F: Glyph = Glyph::new(3, &[1,1,1, 1,0,0, 1,1,1, 1,0,0, 1,0,0]);

/// Glyph for `c` in the clock face (`0`-`9` and `:`).
pub fn clock_glyph(c: char) -> Option<Glyph> {
    match c {
        '1' => Some(CLOCK_ONE),
        ':' => Some(COLON),
        _ => digit(c),
    }
}

/// Glyph for `c` on the thermometer (`0`-`9`, `-` and `F`).
pub fn temperature_glyph(c: char) -> Option<Glyph> {
    match c {
        '-' => Some(MINUS),
        'F' | 'f' => Some(LETTER_F),
        _ => digit(c),
    }
}

fn digit(c: char) -> Option<Glyph> {
    c.to_digit(10).map(|d| DIGITS[d as usize])
}
