//! Physical output sinks.
//!
//! A sink holds the strip-ordered pixel buffer. Writes are buffered until
//! `show` pushes the whole buffer to the hardware in one go.

mod memory;
mod serial;

pub use memory::MemoryStrip;
pub use serial::SerialStrip;

use crate::color::Rgb;
use crate::Result;

/// A strip of individually addressable pixels.
pub trait PixelSink {
    /// Number of pixels on the strip.
    fn pixel_count(&self) -> usize;

    /// Sets one physical pixel. Indices past the end are ignored.
    fn set_pixel(&mut self, index: usize, color: Rgb);

    /// Returns the buffered color of one physical pixel.
    fn pixel(&self, index: usize) -> Option<Rgb>;

    /// Pushes the buffer to the strip.
    fn show(&mut self) -> Result<()>;

    /// Sets the global brightness applied on `show`.
    fn set_brightness(&mut self, brightness: u8);

    /// Returns the global brightness.
    fn brightness(&self) -> u8;

    /// Sets every pixel to one color without flushing.
    fn fill(&mut self, color: Rgb) {
        for index in 0..self.pixel_count() {
            self.set_pixel(index, color);
        }
    }

    /// Blacks out the buffer without flushing.
    fn clear(&mut self) {
        self.fill(Rgb::BLACK);
    }
}

impl<S: PixelSink + ?Sized> PixelSink for Box<S> {
    fn pixel_count(&self) -> usize {
        (**self).pixel_count()
    }

    fn set_pixel(&mut self, index: usize, color: Rgb) {
        (**self).set_pixel(index, color)
    }

    fn pixel(&self, index: usize) -> Option<Rgb> {
        (**self).pixel(index)
    }

    fn show(&mut self) -> Result<()> {
        (**self).show()
    }

    fn set_brightness(&mut self, brightness: u8) {
        (**self).set_brightness(brightness)
    }

    fn brightness(&self) -> u8 {
        (**self).brightness()
    }
}
