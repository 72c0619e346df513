//! Decoded images to logical frames.

use anyhow::{Context, Result};
use image::imageops::FilterType;
use image::{DynamicImage, RgbaImage};
use ledmatrix_core::color::Rgb;
use ledmatrix_core::Frame;
use std::path::Path;

/// How decoded pixels are turned into panel colors.
#[derive(Debug, Clone, Copy, Default)]
pub struct PixelStyle {
    /// Push reds and blues up and greens down to offset the strip's cold cast.
    pub warm: bool,
    /// Paint every lit pixel in this color.
    pub tint: Option<Rgb>,
}

impl PixelStyle {
    pub fn apply(&self, color: Rgb) -> Rgb {
        let color = if self.warm { warm_boost(color) } else { color };
        match self.tint {
            Some(tint) if !color.is_black() => tint,
            Some(_) => Rgb::BLACK,
            None => color,
        }
    }
}

/// Red +20 and blue +30 when above 5, green -5, all saturating.
pub fn warm_boost(color: Rgb) -> Rgb {
    let r = if color.r > 5 { color.r.saturating_add(20) } else { color.r };
    let b = if color.b > 5 { color.b.saturating_add(30) } else { color.b };
    Rgb::new(r, color.g.saturating_sub(5), b)
}

/// Scales `image` to `side`x`side` (nearest neighbor) and converts it.
/// Fully transparent pixels become black.
pub fn image_to_frame(image: &RgbaImage, side: u16, style: PixelStyle) -> Frame {
    let side_px = side as u32;
    let resized;
    let image = if image.dimensions() != (side_px, side_px) {
        resized = image::imageops::resize(image, side_px, side_px, FilterType::Nearest);
        &resized
    } else {
        image
    };

    let mut frame = Frame::new(side);
    for (x, y, pixel) in image.enumerate_pixels() {
        let [r, g, b, a] = pixel.0;
        let color = if a == 0 { Rgb::BLACK } else { Rgb::new(r, g, b) };
        frame.set(y as usize, x as usize, style.apply(color));
    }
    frame
}

/// Opens an image file and converts it.
pub fn load_frame(path: &Path, side: u16, style: PixelStyle) -> Result<Frame> {
    let image: DynamicImage = image::open(path)
        .with_context(|| format!("Failed to decode image {}", path.display()))?;
    Ok(image_to_frame(&image.to_rgba8(), side, style))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_warm_boost() {
        assert_eq!(warm_boost(Rgb::new(100, 100, 100)), Rgb::new(120, 95, 130));
        assert_eq!(warm_boost(Rgb::new(5, 3, 5)), Rgb::new(5, 0, 5));
        assert_eq!(warm_boost(Rgb::new(250, 0, 240)), Rgb::new(255, 0, 255));
    }

    #[test]
    fn test_tint_keeps_black() {
        let style = PixelStyle {
            warm: false,
            tint: Some(Rgb::new(0, 0, 255)),
        };
        assert_eq!(style.apply(Rgb::new(9, 9, 9)), Rgb::new(0, 0, 255));
        assert_eq!(style.apply(Rgb::BLACK), Rgb::BLACK);
    }

    #[test]
    fn test_downscale_nearest() {
        // 32x32 with the top-left quadrant red.
        let mut image = RgbaImage::new(32, 32);
        for y in 0..16 {
            for x in 0..16 {
                image.put_pixel(x, y, image::Rgba([255, 0, 0, 255]));
            }
        }
        let frame = image_to_frame(&image, 4, PixelStyle::default());
        assert_eq!(frame.get(0, 0), Some(Rgb::new(255, 0, 0)));
        assert_eq!(frame.get(1, 1), Some(Rgb::new(255, 0, 0)));
        assert_eq!(frame.get(3, 3), Some(Rgb::BLACK));
    }

    #[test]
    fn test_transparent_is_black() {
        let image = RgbaImage::from_pixel(2, 2, image::Rgba([200, 200, 200, 0]));
        let frame = image_to_frame(&image, 2, PixelStyle::default());
        assert!(frame.is_black());
    }
}
