//! A day of minute-by-minute clock faces in the built-in font.

use anyhow::{bail, Result};
use ledmatrix_core::glyphs::clock_glyph;
use ledmatrix_core::{Frame, FrameSource, OverlayMatrix, Rgb};

/// One frame per minute of the day.
pub const CLOCK_FRAMES: u32 = 1440;

/// Clock animations play at this rate so a full day is a one-minute loop.
pub const CLOCK_FPS: f64 = 24.0;

const DIGIT_WIDTH: usize = 3;
const COLON_WIDTH: usize = 2;

/// Column offset that centers the 16-column face on wider panels.
pub fn centered_col(side: u16) -> usize {
    if side > 16 {
        ((side as usize / 16) / 2) * 16 - 8
    } else {
        0
    }
}

/// Renders `h:mm` faces from 12:00 through 11:59, twice.
pub struct ClockFaceSource {
    side: u16,
    color: Rgb,
    row: usize,
    col: usize,
    minute: u32,
    stencil: OverlayMatrix,
}

impl ClockFaceSource {
    pub fn new(side: u16, color: Rgb, row: usize, col: usize) -> Result<Self> {
        if side <= 8 {
            bail!("A clock needs a panel wider than 8 pixels (got {})", side);
        }
        Ok(Self {
            side,
            color,
            row,
            col,
            minute: 0,
            stencil: OverlayMatrix::new(side),
        })
    }

    /// Stamps the face for `minute` minutes past midnight.
    fn render(&mut self, minute: u32) -> Frame {
        let hour = match (minute / 60) % 12 {
            0 => 12,
            h => h,
        };
        let minute = minute % 60;
        let (row, col) = (self.row, self.col);

        self.stencil.clear();
        if hour >= 10 {
            self.put(hour / 10, row, col);
        }
        self.put(hour % 10, row, col + DIGIT_WIDTH + 1);
        if let Some(colon) = clock_glyph(':') {
            self.stencil.stamp(&colon, row, col + DIGIT_WIDTH * 2 + 1);
        }
        self.put(minute / 10, row, col + DIGIT_WIDTH * 2 + 1 + COLON_WIDTH);
        self.put(minute % 10, row, col + DIGIT_WIDTH * 3 + 2 + COLON_WIDTH);
        self.stencil.to_frame(self.color)
    }

    fn put(&mut self, digit: u32, row: usize, col: usize) {
        let glyph = char::from_digit(digit, 10).and_then(clock_glyph);
        if let Some(glyph) = glyph {
            self.stencil.stamp(&glyph, row, col);
        }
    }
}

impl FrameSource for ClockFaceSource {
    fn side_length(&self) -> u16 {
        self.side
    }

    fn frame_count(&self) -> u32 {
        CLOCK_FRAMES
    }

    fn next_frame(&mut self) -> ledmatrix_core::Result<Option<Frame>> {
        if self.minute >= CLOCK_FRAMES {
            return Ok(None);
        }
        let frame = self.render(self.minute);
        self.minute += 1;
        Ok(Some(frame))
    }
}
