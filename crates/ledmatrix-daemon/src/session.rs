//! Per-run panel context: the address map, the output sink and the
//! user-adjustable settings that go with it.

use crate::cancel::CancelFlag;
use ledmatrix_core::color::Rgb;
use ledmatrix_core::{AddressMap, PixelSink};
use tracing::info;

/// Everything a playback or clock loop needs to drive the panel.
///
/// The session is the single writer of the sink; loops borrow it mutably for
/// as long as they run.
pub struct Session {
    map: AddressMap,
    sink: Box<dyn PixelSink>,
    cancel: CancelFlag,
    max_brightness: u8,
}

impl Session {
    pub fn new(
        map: AddressMap,
        mut sink: Box<dyn PixelSink>,
        brightness: u8,
        max_brightness: u8,
        cancel: CancelFlag,
    ) -> Self {
        sink.set_brightness(brightness);
        Self {
            map,
            sink,
            cancel,
            max_brightness,
        }
    }

    pub fn map(&self) -> &AddressMap {
        &self.map
    }

    pub fn side_length(&self) -> u16 {
        self.map.side_length()
    }

    pub fn sink(&self) -> &dyn PixelSink {
        self.sink.as_ref()
    }

    pub fn sink_mut(&mut self) -> &mut dyn PixelSink {
        self.sink.as_mut()
    }

    /// Splits the borrow so callers can read the map while writing the sink.
    pub fn parts_mut(&mut self) -> (&AddressMap, &mut dyn PixelSink) {
        (&self.map, self.sink.as_mut())
    }

    pub fn cancel(&self) -> &CancelFlag {
        &self.cancel
    }

    pub fn brightness(&self) -> u8 {
        self.sink.brightness()
    }

    pub fn max_brightness(&self) -> u8 {
        self.max_brightness
    }

    /// Sets brightness and pushes the change to the strip.
    pub fn set_brightness(&mut self, brightness: u8) -> ledmatrix_core::Result<()> {
        self.sink.set_brightness(brightness);
        self.sink.show()?;
        info!("Changed brightness to {}", brightness);
        Ok(())
    }

    /// One step brighter, up to the configured maximum.
    pub fn brightness_up(&mut self) -> ledmatrix_core::Result<()> {
        let current = self.brightness();
        if current < self.max_brightness {
            self.set_brightness(current + 1)?;
        }
        Ok(())
    }

    /// One step dimmer, never below 1.
    pub fn brightness_down(&mut self) -> ledmatrix_core::Result<()> {
        let current = self.brightness();
        if current > 1 {
            self.set_brightness(current - 1)?;
        }
        Ok(())
    }

    /// Fills the whole panel with one color and shows it.
    pub fn fill(&mut self, color: Rgb) -> ledmatrix_core::Result<()> {
        self.sink.fill(color);
        self.sink.show()
    }

    /// Blacks out the panel and shows it.
    pub fn blank(&mut self) -> ledmatrix_core::Result<()> {
        self.fill(Rgb::BLACK)
    }
}
