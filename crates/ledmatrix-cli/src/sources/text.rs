//! Text, one character per frame, from a folder of glyph images.
//!
//! Uppercase letters are `A.png`, lowercase `al.png`, and the space is
//! `space.png`.

use super::raster::{load_frame, PixelStyle};
use anyhow::Result;
use ledmatrix_core::color::Rgb;
use ledmatrix_core::pipeline::FrameList;
use std::path::{Path, PathBuf};
use tracing::warn;

/// Glyph image for `c`, or `None` for characters without one.
pub fn glyph_path(dir: &Path, c: char) -> Option<PathBuf> {
    if c.is_uppercase() {
        Some(dir.join(format!("{}.png", c)))
    } else if c.is_lowercase() {
        Some(dir.join(format!("{}l.png", c)))
    } else if c.is_whitespace() {
        Some(dir.join("space.png"))
    } else {
        None
    }
}

/// One frame per supported character of `text`, lit pixels in `color`.
pub fn text_frames(
    text: &str,
    glyph_dir: &Path,
    color: Rgb,
    side: u16,
    warm: bool,
) -> Result<FrameList> {
    let style = PixelStyle {
        warm,
        tint: Some(color),
    };
    let mut frames = Vec::new();
    for c in text.chars() {
        match glyph_path(glyph_dir, c) {
            Some(path) => frames.push(load_frame(&path, side, style)?),
            None => warn!("No glyph for {:?}, skipping", c),
        }
    }
    Ok(FrameList::new(side, frames))
}
