//! Looking inside encoded animations: header and delta statistics, and
//! single-frame PNG previews.

use anyhow::{bail, Context, Result};
use ledmatrix_core::container::{self, ANIMATION_EXTENSION};
use ledmatrix_core::{delta, AddressMap, AnimationReader, Frame, Rgb};
use serde::Serialize;
use std::io::BufRead;
use std::path::Path;
use tracing::debug;

/// What `inspect` reports about an animation.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct InspectReport {
    pub path: String,
    pub fps: f64,
    pub frame_count: u32,
    pub kind: String,
    pub side_length: u16,
    pub duration_secs: f64,
    /// Frames actually present in the file.
    pub frames_read: u32,
    /// Pixel updates across all frames.
    pub records: u64,
    /// Largest single-frame update.
    pub max_records: usize,
    /// Frames that change nothing.
    pub empty_frames: u32,
    pub min_index: Option<u32>,
    pub max_index: Option<u32>,
}

impl InspectReport {
    /// Reads every frame of `reader`, tallying the deltas.
    pub fn collect<R: BufRead>(path: &str, mut reader: AnimationReader<R>) -> Result<Self> {
        let header = *reader.header();
        let mut report = Self {
            path: path.to_string(),
            fps: header.fps.get(),
            frame_count: header.frame_count,
            kind: header.kind.to_string(),
            side_length: header.side_length,
            duration_secs: header.duration_secs(),
            frames_read: 0,
            records: 0,
            max_records: 0,
            empty_frames: 0,
            min_index: None,
            max_index: None,
        };

        let mut records = Vec::new();
        while reader.read_frame_into(&mut records)? {
            report.frames_read += 1;
            report.records += records.len() as u64;
            report.max_records = report.max_records.max(records.len());
            if records.is_empty() {
                report.empty_frames += 1;
            }
            for record in &records {
                let i = record.index;
                report.min_index = Some(report.min_index.map_or(i, |m| m.min(i)));
                report.max_index = Some(report.max_index.map_or(i, |m| m.max(i)));
            }
        }
        Ok(report)
    }

    /// Mean pixel updates per frame.
    pub fn mean_records(&self) -> f64 {
        if self.frames_read == 0 {
            0.0
        } else {
            self.records as f64 / self.frames_read as f64
        }
    }

    /// Multi-line summary for the terminal.
    pub fn to_text(&self) -> String {
        let mut out = String::new();
        out.push_str(&format!("Animation: {}\n", self.path));
        out.push_str(&format!("  Type: {}\n", self.kind));
        out.push_str(&format!("  Side length: {}\n", self.side_length));
        out.push_str(&format!("  FPS: {}\n", self.fps));
        out.push_str(&format!(
            "  Frames: {} declared, {} read\n",
            self.frame_count, self.frames_read
        ));
        out.push_str(&format!("  Duration: {:.2}s\n", self.duration_secs));
        out.push_str(&format!(
            "  Pixel updates: {} total, {:.1} per frame, {} max\n",
            self.records,
            self.mean_records(),
            self.max_records
        ));
        out.push_str(&format!("  Unchanged frames: {}\n", self.empty_frames));
        if let (Some(min), Some(max)) = (self.min_index, self.max_index) {
            out.push_str(&format!("  Pixel indices: {}..={}\n", min, max));
        }
        out
    }
}

/// Inspects the animation at `path`.
pub fn inspect(path: &Path) -> Result<InspectReport> {
    let path = container::with_extension(path, ANIMATION_EXTENSION);
    let reader = container::open_animation(&path)
        .with_context(|| format!("Failed to open {}", path.display()))?;
    InspectReport::collect(&path.display().to_string(), reader)
}

/// Replays deltas up to and including frame `index` (zero-based) and
/// returns the logical picture at that point.
pub fn reconstruct<R: BufRead>(
    mut reader: AnimationReader<R>,
    map: &AddressMap,
    index: u32,
) -> Result<Frame> {
    reader.header().check_side_length(map.side_length())?;
    let mut strip = vec![Rgb::BLACK; map.len()];
    let mut records = Vec::new();
    let mut played = 0;
    while played <= index {
        if !reader.read_frame_into(&mut records)? {
            bail!("Animation has only {} frames", played);
        }
        delta::apply(&records, &mut strip)?;
        played += 1;
    }
    debug!("Reconstructed frame {}", index);
    Ok(map.to_frame(&strip)?)
}

/// Encodes `frame` as an RGB PNG, each pixel blown up to a `scale`x`scale` block.
pub fn frame_png(frame: &Frame, scale: u32) -> Result<Vec<u8>> {
    let scale = scale.max(1);
    let side = frame.side_length() as u32;
    let size = side * scale;

    let mut rgb = Vec::with_capacity((size * size * 3) as usize);
    for y in 0..size {
        for x in 0..size {
            let pixel = frame
                .get((y / scale) as usize, (x / scale) as usize)
                .unwrap_or(Rgb::BLACK);
            rgb.extend_from_slice(&[pixel.r, pixel.g, pixel.b]);
        }
    }

    let mut png_data = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut png_data, size, size);
        encoder.set_color(png::ColorType::Rgb);
        encoder.set_depth(png::BitDepth::Eight);
        let mut writer = encoder.write_header()?;
        writer.write_image_data(&rgb)?;
    }

    Ok(png_data)
}
