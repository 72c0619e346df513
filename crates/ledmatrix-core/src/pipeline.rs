//! Frame source to animation file: the one authoring path every generator uses.

use crate::container::{AnimationHeader, AnimationWriter};
use crate::delta;
use crate::frame::Frame;
use crate::mapping::AddressMap;
use crate::{Error, Result};
use std::io::Write;
use tracing::{debug, info};

/// Produces logical frames for an animation.
pub trait FrameSource {
    /// Side length of every frame produced.
    fn side_length(&self) -> u16;

    /// Number of frames the source promises to deliver.
    fn frame_count(&self) -> u32;

    /// Produces the next frame, or `None` once the source is spent.
    fn next_frame(&mut self) -> Result<Option<Frame>>;
}

/// How frame lines are produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EncodeMode {
    /// Only pixels that changed since the previous frame.
    #[default]
    Delta,
    /// Every pixel of every frame.
    Full,
}

/// Totals from one encode run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct EncodeStats {
    pub frames: u32,
    pub records: u64,
}

/// Pulls `source.frame_count()` frames, diffs them through `map` and writes
/// them after `header`. The header's frame count and side length are taken
/// from the source.
pub fn encode_animation<S, W>(
    source: &mut S,
    mut header: AnimationHeader,
    out: W,
    map: &AddressMap,
    mode: EncodeMode,
) -> Result<(W, EncodeStats)>
where
    S: FrameSource + ?Sized,
    W: Write,
{
    let side = source.side_length();
    if side != map.side_length() {
        return Err(Error::SideLengthMismatch {
            expected: map.side_length(),
            actual: side,
        });
    }
    header.frame_count = source.frame_count();
    header.side_length = side;

    let mut writer = AnimationWriter::new(out, header)?;
    let mut stats = EncodeStats::default();
    let mut previous = Frame::new(side);

    while stats.frames < header.frame_count {
        let Some(frame) = source.next_frame()? else {
            return Err(Error::SourceExhausted {
                declared: header.frame_count,
                produced: stats.frames,
            });
        };
        if frame.side_length() != side {
            return Err(Error::SideLengthMismatch {
                expected: side,
                actual: frame.side_length(),
            });
        }

        let records = match mode {
            EncodeMode::Delta => delta::diff(&previous, &frame, map)?,
            EncodeMode::Full => delta::full(&frame, map)?,
        };
        writer.write_frame(&records)?;

        stats.frames += 1;
        stats.records += records.len() as u64;
        if stats.frames % 100 == 0 {
            debug!("Encoded {}/{} frames", stats.frames, header.frame_count);
        }
        previous = frame;
    }

    info!(
        "Encoded {} {} frames ({} pixel updates)",
        stats.frames, header.kind, stats.records
    );
    Ok((writer.finish()?, stats))
}

/// A fixed list of frames.
#[derive(Debug, Clone)]
pub struct FrameList {
    side: u16,
    frames: std::collections::VecDeque<Frame>,
    count: u32,
}

impl FrameList {
    pub fn new(side: u16, frames: Vec<Frame>) -> Self {
        let count = frames.len() as u32;
        Self {
            side,
            frames: frames.into(),
            count,
        }
    }
}

impl FrameSource for FrameList {
    fn side_length(&self) -> u16 {
        self.side
    }

    fn frame_count(&self) -> u32 {
        self.count
    }

    fn next_frame(&mut self) -> Result<Option<Frame>> {
        Ok(self.frames.pop_front())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::container::{AnimationKind, AnimationReader, Fps};
    use crate::rotation::Rotation;
    use std::io::Cursor;

    fn header() -> AnimationHeader {
        AnimationHeader::new(Fps::new(10.0).unwrap(), 0, AnimationKind::Effect, 0)
    }

    fn frames(side: u16) -> Vec<Frame> {
        let mut a = Frame::new(side);
        a.set(0, 1, Rgb::new(10, 20, 30));
        let b = a.clone();
        let mut c = b.clone();
        c.set(2, 2, Rgb::WHITE);
        c.set(0, 1, Rgb::BLACK);
        vec![a, b, c]
    }

    fn decode(bytes: Vec<u8>, map: &AddressMap) -> (AnimationHeader, Vec<Frame>) {
        let reader = AnimationReader::new(Cursor::new(bytes)).unwrap();
        let header = *reader.header();
        let mut buffer = vec![Rgb::BLACK; map.len()];
        let mut out = Vec::new();
        for records in reader {
            delta::apply(&records.unwrap(), &mut buffer).unwrap();
            out.push(map.to_frame(&buffer).unwrap());
        }
        (header, out)
    }

    #[test]
    fn test_round_trip_reconstructs_frames() {
        let map = AddressMap::new(4, Rotation::new(3).unwrap());
        let mut source = FrameList::new(4, frames(4));
        let (bytes, stats) =
            encode_animation(&mut source, header(), Vec::new(), &map, EncodeMode::Delta).unwrap();
        assert_eq!(stats.frames, 3);
        // first frame: one lit pixel; second: nothing; third: two changes
        assert_eq!(stats.records, 3);

        let (h, decoded) = decode(bytes, &map);
        assert_eq!(h.frame_count, 3);
        assert_eq!(h.side_length, 4);
        assert_eq!(h.kind, AnimationKind::Effect);
        assert_eq!(decoded, frames(4));
    }

    #[test]
    fn test_full_mode_writes_every_pixel() {
        let map = AddressMap::new(4, Rotation::NONE);
        let mut source = FrameList::new(4, frames(4));
        let (bytes, stats) =
            encode_animation(&mut source, header(), Vec::new(), &map, EncodeMode::Full).unwrap();
        assert_eq!(stats.records, 3 * 16);
        let (_, decoded) = decode(bytes, &map);
        assert_eq!(decoded, frames(4));
    }

    struct Short;

    impl FrameSource for Short {
        fn side_length(&self) -> u16 {
            4
        }
        fn frame_count(&self) -> u32 {
            2
        }
        fn next_frame(&mut self) -> Result<Option<Frame>> {
            Ok(None)
        }
    }

    #[test]
    fn test_exhausted_source() {
        let map = AddressMap::new(4, Rotation::NONE);
        let result = encode_animation(&mut Short, header(), Vec::new(), &map, EncodeMode::Delta);
        assert!(matches!(
            result,
            Err(Error::SourceExhausted {
                declared: 2,
                produced: 0
            })
        ));
    }

    #[test]
    fn test_side_mismatch() {
        let map = AddressMap::new(8, Rotation::NONE);
        let mut source = FrameList::new(4, frames(4));
        let result = encode_animation(&mut source, header(), Vec::new(), &map, EncodeMode::Delta);
        assert!(matches!(result, Err(Error::SideLengthMismatch { .. })));
    }
}
