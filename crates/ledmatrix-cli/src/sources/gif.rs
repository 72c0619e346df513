//! Animated gifs.

use super::raster::{image_to_frame, PixelStyle};
use anyhow::{Context, Result};
use image::codecs::gif::GifDecoder;
use image::{AnimationDecoder, Rgba, RgbaImage};
use ledmatrix_core::pipeline::FrameList;
use ledmatrix_core::{Fps, Frame};
use std::collections::HashMap;
use std::fs::File;
use std::io::BufReader;
use std::path::Path;
use tracing::{debug, info};

/// Frame rate used when a gif declares a zero delay.
const FALLBACK_FPS: f64 = 10.0;

/// Knobs for gif conversion.
#[derive(Debug, Clone, Copy, Default)]
pub struct GifOptions {
    /// Overrides the gif's own frame rate.
    pub fps: Option<f64>,
    /// Appends an all-black frame so the animation ends dark.
    pub black_frame: bool,
    /// Collapses upscaled pixel art back to one color per cell.
    pub remove_grid: bool,
    pub style: PixelStyle,
}

/// A decoded gif ready for encoding.
pub struct DecodedGif {
    pub frames: FrameList,
    pub fps: Fps,
}

/// Frames per second from a frame delay in milliseconds.
pub fn fps_from_delay_ms(delay_ms: f64) -> f64 {
    if delay_ms > 0.0 {
        1000.0 / delay_ms
    } else {
        FALLBACK_FPS
    }
}

/// Decodes every frame of the gif at `path`.
pub fn decode(path: &Path, side: u16, options: GifOptions) -> Result<DecodedGif> {
    let file = File::open(path).with_context(|| format!("Failed to open {}", path.display()))?;
    let decoder = GifDecoder::new(BufReader::new(file))
        .with_context(|| format!("Failed to read gif {}", path.display()))?;
    let gif_frames = decoder
        .into_frames()
        .collect_frames()
        .with_context(|| format!("Failed to decode gif {}", path.display()))?;

    let delay_ms = gif_frames
        .first()
        .map(|f| {
            let (numer, denom) = f.delay().numer_denom_ms();
            numer as f64 / denom.max(1) as f64
        })
        .unwrap_or(0.0);
    let fps = Fps::new(options.fps.unwrap_or_else(|| fps_from_delay_ms(delay_ms)))?;

    let mut frames: Vec<Frame> = gif_frames
        .iter()
        .map(|f| {
            let buffer = f.buffer();
            if options.remove_grid {
                image_to_frame(&remove_grid(buffer, side), side, options.style)
            } else {
                image_to_frame(buffer, side, options.style)
            }
        })
        .collect();
    if options.black_frame {
        frames.push(Frame::new(side));
    }

    info!(
        "Decoded {} ({} frames at {} fps)",
        path.display(),
        frames.len(),
        fps
    );
    Ok(DecodedGif {
        frames: FrameList::new(side, frames),
        fps,
    })
}

/// Replaces each cell of an upscaled image with the cell's most common
/// color. The image is split into `side` cells per axis.
pub fn remove_grid(image: &RgbaImage, side: u16) -> RgbaImage {
    let (width, height) = image.dimensions();
    let cell_w = (width / side as u32).max(1);
    let cell_h = (height / side as u32).max(1);
    let mut out = RgbaImage::from_pixel(width, height, Rgba([0, 0, 0, 255]));

    for cell_y in 0..height.div_ceil(cell_h) {
        for cell_x in 0..width.div_ceil(cell_w) {
            let x0 = cell_x * cell_w;
            let y0 = cell_y * cell_h;
            let x1 = (x0 + cell_w).min(width);
            let y1 = (y0 + cell_h).min(height);

            let mut counts: HashMap<Rgba<u8>, u32> = HashMap::new();
            for y in y0..y1 {
                for x in x0..x1 {
                    *counts.entry(*image.get_pixel(x, y)).or_default() += 1;
                }
            }
            let Some((&common, _)) = counts.iter().max_by_key(|(_, &n)| n) else {
                continue;
            };
            for y in y0..y1 {
                for x in x0..x1 {
                    out.put_pixel(x, y, common);
                }
            }
        }
    }
    debug!("Removed grid from {}x{} image", width, height);
    out
}
