//! RGB colors and the named palettes used by authoring and the live clock.

use crate::{Error, Result};
use std::str::FromStr;

/// An 8-bit-per-channel RGB triple.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    /// Creates a color from its channels.
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Unpacks a `0xRRGGBB` value. Bits above 24 are ignored.
    pub const fn from_u32(value: u32) -> Self {
        Self {
            r: ((value >> 16) & 0xFF) as u8,
            g: ((value >> 8) & 0xFF) as u8,
            b: (value & 0xFF) as u8,
        }
    }

    /// Packs the color as `0xRRGGBB`.
    pub const fn to_u32(self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    /// Returns true if every channel is zero.
    pub const fn is_black(self) -> bool {
        self.r == 0 && self.g == 0 && self.b == 0
    }

    /// Scales every channel by `brightness / 255`.
    pub fn scale(self, brightness: u8) -> Self {
        let scale = |c: u8| ((c as u16 * brightness as u16) / 255) as u8;
        Self {
            r: scale(self.r),
            g: scale(self.g),
            b: scale(self.b),
        }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self { r, g, b }
    }
}

impl std::fmt::Display for Rgb {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{:02X}{:02X}{:02X}", self.r, self.g, self.b)
    }
}

/// Parses a `#RRGGBB` (or `RRGGBB`) hex string.
pub fn parse_hex_color(hex: &str) -> Option<Rgb> {
    let hex = hex.trim_start_matches('#');
    if hex.len() != 6 || !hex.is_ascii() {
        return None;
    }
    let r = u8::from_str_radix(&hex[0..2], 16).ok()?;
    let g = u8::from_str_radix(&hex[2..4], 16).ok()?;
    let b = u8::from_str_radix(&hex[4..6], 16).ok()?;
    Some(Rgb::new(r, g, b))
}

impl FromStr for Rgb {
    type Err = Error;

    /// Accepts a primary palette name or a hex string.
    fn from_str(s: &str) -> Result<Self> {
        named_color(s)
            .or_else(|| parse_hex_color(s))
            .ok_or_else(|| Error::InvalidColor(s.to_string()))
    }
}

/// Primary colors offered to animation authors.
pub const PRIMARY_COLORS: [(&str, Rgb); 18] = [
    ("red", Rgb::new(255, 0, 0)),
    ("green", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("black", Rgb::new(0, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("purple", Rgb::new(128, 0, 128)),
    ("orange", Rgb::new(255, 165, 0)),
    ("pink", Rgb::new(255, 192, 203)),
    ("brown", Rgb::new(165, 42, 42)),
    ("gray", Rgb::new(128, 128, 128)),
    ("light_gray", Rgb::new(192, 192, 192)),
    ("dark_gray", Rgb::new(64, 64, 64)),
    ("olive", Rgb::new(128, 128, 0)),
    ("teal", Rgb::new(0, 128, 128)),
    ("navy", Rgb::new(0, 0, 128)),
];

/// Looks up a primary color by name (case-insensitive, `-` and `_` interchangeable).
pub fn named_color(name: &str) -> Option<Rgb> {
    let name = name.trim().to_lowercase().replace('-', "_");
    PRIMARY_COLORS
        .iter()
        .find(|(n, _)| *n == name)
        .map(|(_, c)| *c)
}

/// Accent colors the live clock steps through with the remote.
pub const ACCENT_PALETTE: [(&str, Rgb); 52] = [
    ("red", Rgb::new(255, 0, 0)),
    ("white", Rgb::new(255, 255, 255)),
    ("green", Rgb::new(0, 255, 0)),
    ("blue", Rgb::new(0, 0, 255)),
    ("yellow", Rgb::new(255, 255, 0)),
    ("cyan", Rgb::new(0, 255, 255)),
    ("magenta", Rgb::new(255, 0, 255)),
    ("orange", Rgb::new(255, 165, 0)),
    ("pink", Rgb::new(255, 192, 203)),
    ("purple", Rgb::new(128, 0, 128)),
    ("brown", Rgb::new(165, 42, 42)),
    ("lime", Rgb::new(0, 255, 0)),
    ("turquoise", Rgb::new(64, 224, 208)),
    ("gold", Rgb::new(255, 215, 0)),
    ("silver", Rgb::new(192, 192, 192)),
    ("maroon", Rgb::new(128, 0, 0)),
    ("navy", Rgb::new(0, 0, 128)),
    ("olive", Rgb::new(128, 128, 0)),
    ("sky blue", Rgb::new(135, 206, 235)),
    ("violet", Rgb::new(238, 130, 238)),
    ("tan", Rgb::new(210, 180, 140)),
    ("salmon", Rgb::new(250, 128, 114)),
    ("peach", Rgb::new(255, 218, 185)),
    ("lavender", Rgb::new(230, 230, 250)),
    ("beige", Rgb::new(245, 245, 220)),
    ("chartreuse", Rgb::new(127, 255, 0)),
    ("indigo", Rgb::new(75, 0, 130)),
    ("khaki", Rgb::new(240, 230, 140)),
    ("orchid", Rgb::new(218, 112, 214)),
    ("plum", Rgb::new(221, 160, 221)),
    ("coral", Rgb::new(255, 127, 80)),
    ("teal", Rgb::new(0, 128, 128)),
    ("azure", Rgb::new(240, 255, 255)),
    ("aquamarine", Rgb::new(127, 255, 212)),
    ("crimson", Rgb::new(220, 20, 60)),
    ("firebrick", Rgb::new(178, 34, 34)),
    ("green yellow", Rgb::new(173, 255, 47)),
    ("dark orange", Rgb::new(255, 140, 0)),
    ("light green", Rgb::new(144, 238, 144)),
    ("dark turquoise", Rgb::new(0, 206, 209)),
    ("medium purple", Rgb::new(147, 112, 219)),
    ("dark khaki", Rgb::new(189, 183, 107)),
    ("hot pink", Rgb::new(255, 105, 180)),
    ("sandy brown", Rgb::new(244, 164, 96)),
    ("deep sky blue", Rgb::new(0, 191, 255)),
    ("medium orchid", Rgb::new(186, 85, 211)),
    ("pale violet red", Rgb::new(219, 112, 147)),
    ("rosy brown", Rgb::new(188, 143, 143)),
    ("spring green", Rgb::new(0, 255, 127)),
    ("tomato", Rgb::new(255, 99, 71)),
    ("wheat", Rgb::new(245, 222, 179)),
    ("yellow green", Rgb::new(154, 205, 50)),
];
