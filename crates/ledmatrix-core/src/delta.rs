//! Frame diffing ("only update necessary pixels").
//!
//! Records are emitted in increasing physical index order, so a frame line
//! can be applied to the strip front to back without seeking.

use crate::color::Rgb;
use crate::frame::Frame;
use crate::mapping::AddressMap;
use crate::strip::PixelSink;
use crate::{Error, Result};

/// "This physical pixel must become this color."
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DeltaRecord {
    pub index: u32,
    pub color: Rgb,
}

impl DeltaRecord {
    pub fn new(index: u32, color: Rgb) -> Self {
        Self { index, color }
    }
}

/// Diffs `current` against `previous` and returns the changed pixels.
///
/// Both frames are logical; the map folds in rotation, so callers never
/// rotate frames themselves.
pub fn diff(previous: &Frame, current: &Frame, map: &AddressMap) -> Result<Vec<DeltaRecord>> {
    map.check_frame(previous)?;
    map.check_frame(current)?;

    let before = previous.pixels();
    let after = current.pixels();
    let records = map
        .logical_cells()
        .iter()
        .enumerate()
        .filter(|(_, &cell)| before[cell as usize] != after[cell as usize])
        .map(|(physical, &cell)| DeltaRecord::new(physical as u32, after[cell as usize]))
        .collect();
    Ok(records)
}

/// Emits every pixel of `current`, black included.
pub fn full(current: &Frame, map: &AddressMap) -> Result<Vec<DeltaRecord>> {
    Ok(map
        .to_strip(current)?
        .into_iter()
        .enumerate()
        .map(|(physical, color)| DeltaRecord::new(physical as u32, color))
        .collect())
}

/// Applies records to a strip-ordered buffer.
pub fn apply(records: &[DeltaRecord], buffer: &mut [Rgb]) -> Result<()> {
    let len = buffer.len();
    for record in records {
        let index = record.index as usize;
        let slot = buffer.get_mut(index).ok_or(Error::SizeMismatch {
            expected: index + 1,
            actual: len,
        })?;
        *slot = record.color;
    }
    Ok(())
}

/// Applies records straight to a sink, without flushing.
pub fn apply_to_sink<S: PixelSink + ?Sized>(records: &[DeltaRecord], sink: &mut S) -> Result<()> {
    let count = sink.pixel_count();
    for record in records {
        let index = record.index as usize;
        if index >= count {
            return Err(Error::SizeMismatch {
                expected: index + 1,
                actual: count,
            });
        }
        sink.set_pixel(index, record.color);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::Rotation;

    fn pattern(side: u16, seed: u32) -> Frame {
        let pixels = (0..side as u32 * side as u32)
            .map(|i| {
                let v = i.wrapping_mul(2654435761).wrapping_add(seed);
                if v % 3 == 0 {
                    Rgb::BLACK
                } else {
                    Rgb::from_u32(v)
                }
            })
            .collect();
        Frame::from_pixels(side, pixels).unwrap()
    }

    #[test]
    fn test_diff_self_is_empty() {
        let map = AddressMap::new(8, Rotation::new(3).unwrap());
        let frame = pattern(8, 7);
        assert!(diff(&frame, &frame, &map).unwrap().is_empty());
    }

    #[test]
    fn test_single_pixel_scenario() {
        let map = AddressMap::new(16, Rotation::NONE);
        let mut frame = Frame::new(16);
        frame.set(0, 1, Rgb::new(10, 20, 30));
        let records = diff(&Frame::new(16), &frame, &map).unwrap();
        assert_eq!(records, vec![DeltaRecord::new(31, Rgb::new(10, 20, 30))]);

        let mut buffer = vec![Rgb::BLACK; 256];
        apply(&records, &mut buffer).unwrap();
        assert_eq!(buffer.iter().filter(|p| !p.is_black()).count(), 1);
        assert_eq!(buffer[31], Rgb::new(10, 20, 30));
    }

    #[test]
    fn test_apply_reproduces_target() {
        for k in 0..4 {
            let map = AddressMap::new(7, Rotation::new(k).unwrap());
            let a = pattern(7, 1);
            let b = pattern(7, 99);
            let records = diff(&a, &b, &map).unwrap();

            let mut buffer = map.to_strip(&a).unwrap();
            apply(&records, &mut buffer).unwrap();
            assert_eq!(map.to_frame(&buffer).unwrap(), b);
        }
    }

    #[test]
    fn test_indices_increase() {
        let map = AddressMap::new(8, Rotation::new(1).unwrap());
        let records = diff(&Frame::new(8), &pattern(8, 3), &map).unwrap();
        assert!(records.windows(2).all(|w| w[0].index < w[1].index));
    }

    #[test]
    fn test_first_frame_emits_only_non_black() {
        let map = AddressMap::new(6, Rotation::NONE);
        let frame = pattern(6, 5);
        let records = diff(&Frame::new(6), &frame, &map).unwrap();
        let lit = frame.pixels().iter().filter(|p| !p.is_black()).count();
        assert_eq!(records.len(), lit);
        assert!(records.iter().all(|r| !r.color.is_black()));
    }

    #[test]
    fn test_rotated_map_matches_rotated_frames() {
        // Diffing through a rotated map equals rotating both frames and
        // diffing them through the plain serpentine map.
        let rotation = Rotation::new(3).unwrap();
        let rotated = AddressMap::new(8, rotation);
        let plain = AddressMap::new(8, Rotation::NONE);
        let a = pattern(8, 11);
        let b = pattern(8, 12);
        assert_eq!(
            diff(&a, &b, &rotated).unwrap(),
            diff(&a.rotated(rotation), &b.rotated(rotation), &plain).unwrap()
        );
    }

    #[test]
    fn test_full_covers_every_pixel() {
        let map = AddressMap::new(4, Rotation::NONE);
        let records = full(&Frame::new(4), &map).unwrap();
        assert_eq!(records.len(), 16);
        assert!(records.iter().enumerate().all(|(i, r)| r.index == i as u32));
    }

    #[test]
    fn test_apply_out_of_range() {
        let mut buffer = vec![Rgb::BLACK; 4];
        let records = [DeltaRecord::new(4, Rgb::WHITE)];
        assert!(apply(&records, &mut buffer).is_err());
    }
}
