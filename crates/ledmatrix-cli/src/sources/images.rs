//! Still images: folders of frames and single pictures.

use super::raster::{load_frame, PixelStyle};
use anyhow::{bail, Context, Result};
use ledmatrix_core::pipeline::FrameList;
use std::path::{Path, PathBuf};
use tracing::debug;

/// `1.png` through `count.png` inside `dir`.
pub fn numbered_paths(dir: &Path, count: u32) -> Vec<PathBuf> {
    (1..=count).map(|i| dir.join(format!("{}.png", i))).collect()
}

/// Every file in `dir`, sorted by name.
pub fn sorted_paths(dir: &Path) -> Result<Vec<PathBuf>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read image folder {}", dir.display()))?
    {
        let path = entry?.path();
        if path.is_file() {
            paths.push(path);
        }
    }
    paths.sort();
    Ok(paths)
}

/// Loads `paths` in order, one frame each.
pub fn load_sequence(paths: &[PathBuf], side: u16, style: PixelStyle) -> Result<FrameList> {
    if paths.is_empty() {
        bail!("No images to encode");
    }
    let frames = paths
        .iter()
        .map(|path| {
            debug!("Loading {}", path.display());
            load_frame(path, side, style)
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(FrameList::new(side, frames))
}
