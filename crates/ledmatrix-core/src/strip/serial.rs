//! Strip controller over a serial port (Adalight framing).

use super::PixelSink;
use crate::color::Rgb;
use crate::{Error, Result};
use std::io::Write;
use tokio_serial::{DataBits, Parity, SerialPort, StopBits};
use tracing::{debug, info};

/// Frame magic expected by the controller.
const MAGIC: &[u8; 3] = b"Ada";

/// Header length: magic, count high, count low, checksum.
const HEADER_LEN: usize = 6;

/// Strip driven by an Adalight-compatible microcontroller.
pub struct SerialStrip {
    port_path: String,
    port: Box<dyn SerialPort>,
    buffer: Vec<Rgb>,
    brightness: u8,
    packet: Vec<u8>,
}

impl SerialStrip {
    /// Opens the serial port for a strip of `count` pixels.
    pub fn open(port_path: &str, baud: u32, count: usize, brightness: u8) -> Result<Self> {
        let port = tokio_serial::new(port_path, baud)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .open()
            .map_err(|e| {
                if let tokio_serial::ErrorKind::Io(kind) = &e.kind {
                    if (*kind == std::io::ErrorKind::NotFound
                        || *kind == std::io::ErrorKind::PermissionDenied)
                        && !std::path::Path::new(port_path).exists()
                    {
                        return Error::StripNotFound(port_path.to_string());
                    }
                }
                Error::Serial(e)
            })?;

        info!("Opened LED strip on {} ({} pixels, {} baud)", port_path, count, baud);

        Ok(Self {
            port_path: port_path.to_string(),
            port,
            buffer: vec![Rgb::BLACK; count],
            brightness,
            packet: Vec::with_capacity(HEADER_LEN + count * 3),
        })
    }

    /// Returns the port path.
    pub fn port_path(&self) -> &str {
        &self.port_path
    }

    /// Builds the 6-byte frame header for `count` pixels.
    fn header(count: usize) -> [u8; HEADER_LEN] {
        let n = count.saturating_sub(1) as u16;
        let hi = (n >> 8) as u8;
        let lo = (n & 0xFF) as u8;
        [MAGIC[0], MAGIC[1], MAGIC[2], hi, lo, hi ^ lo ^ 0x55]
    }

    /// Serializes the buffer with brightness applied.
    fn encode(buffer: &[Rgb], brightness: u8, packet: &mut Vec<u8>) {
        packet.clear();
        packet.extend_from_slice(&Self::header(buffer.len()));
        for pixel in buffer {
            let p = pixel.scale(brightness);
            packet.extend_from_slice(&[p.r, p.g, p.b]);
        }
    }
}

impl PixelSink for SerialStrip {
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
        Self::encode(&self.buffer, self.brightness, &mut self.packet);
        self.port.write_all(&self.packet)?;
        self.port.flush()?;
        debug!("Sent {} bytes to {}", self.packet.len(), self.port_path);
        Ok(())
    }

    fn set_brightness(&mut self, brightness: u8) {
        self.brightness = brightness;
    }

    fn brightness(&self) -> u8 {
        self.brightness
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_header() {
        let header = SerialStrip::header(256);
        // 255 pixels after the first: hi 0x00, lo 0xFF
        assert_eq!(header, [b'A', b'd', b'a', 0x00, 0xFF, 0x00 ^ 0xFF ^ 0x55]);

        let header = SerialStrip::header(1024);
        assert_eq!(header[3], 0x03);
        assert_eq!(header[4], 0xFF);
        assert_eq!(header[5], 0x03 ^ 0xFF ^ 0x55);
    }

    #[test]
    fn test_encode_applies_brightness() {
        let mut packet = Vec::new();
        let buffer = [Rgb::new(255, 0, 100), Rgb::WHITE];
        SerialStrip::encode(&buffer, 51, &mut packet);
        assert_eq!(packet.len(), HEADER_LEN + 6);
        assert_eq!(&packet[HEADER_LEN..], &[51, 0, 20, 51, 51, 51]);
    }

    #[test]
    #[ignore = "requires strip controller hardware"]
    fn test_open_missing_port() {
        let result = SerialStrip::open("/dev/does-not-exist", 115200, 256, 25);
        assert!(matches!(result, Err(Error::StripNotFound(_))));
    }
}
