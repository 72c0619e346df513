//! In-process strip used headless and in tests.

use super::PixelSink;
use crate::color::Rgb;
use crate::Result;

/// Pixel buffer that records what would have been shown.
#[derive(Debug, Clone)]
pub struct MemoryStrip {
    buffer: Vec<Rgb>,
    shown: Vec<Rgb>,
    brightness: u8,
    flushes: u64,
}

impl MemoryStrip {
    /// Creates a black strip of `count` pixels at full brightness.
    pub fn new(count: usize) -> Self {
        Self {
            buffer: vec![Rgb::BLACK; count],
            shown: vec![Rgb::BLACK; count],
            brightness: 255,
            flushes: 0,
        }
    }

    /// Buffered pixels, including writes not yet shown.
    pub fn buffer(&self) -> &[Rgb] {
        &self.buffer
    }

    /// Pixels as of the last `show`.
    pub fn shown(&self) -> &[Rgb] {
        &self.shown
    }

    /// Number of `show` calls so far.
    pub fn flush_count(&self) -> u64 {
        self.flushes
    }
}

impl PixelSink for MemoryStrip {
    fn pixel_count(&self) -> usize {
        self.buffer.len()
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        if let Some(slot) = self.buffer.get_mut(index) {
            *slot = color;
        }
    }

    fn pixel(&self, index: usize) -> Option<Rgb> {
        self.buffer.get(index).copied()
    }

    fn show(&mut self) -> Result<()> {
        self.shown.copy_from_slice(&self.buffer);
        self.flushes += 1;
        Ok(())
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }
}
