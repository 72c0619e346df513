//! Layers stencil overlays onto the physical strip.

use crate::color::Rgb;
use crate::mapping::AddressMap;
use crate::overlay::OverlayMatrix;
use crate::strip::PixelSink;
use crate::{Error, Result};
use tracing::trace;

/// Clears the strip, paints `overlays` in order through `map`, then flushes
/// once. Later overlays win where cells overlap; transparent cells let
/// lower layers (or the black background) show through.
pub fn compose<S, O>(sink: &mut S, overlays: &[O], map: &AddressMap, accent: Rgb) -> Result<()>
where
    S: PixelSink + ?Sized,
    O: AsRef<OverlayMatrix>,
{
    if sink.pixel_count() < map.len() {
        return Err(Error::SizeMismatch {
            expected: map.len(),
            actual: sink.pixel_count(),
        });
    }
    for overlay in overlays {
        let overlay = overlay.as_ref();
        if overlay.len() != map.len() {
            return Err(Error::SizeMismatch {
                expected: map.len(),
                actual: overlay.len(),
            });
        }
    }

    sink.clear();
    let side = map.side_length() as usize;
    let mut painted = 0usize;
    for overlay in overlays {
        for (i, cell) in overlay.as_ref().cells().iter().enumerate() {
            if let Some(color) = cell.paint(accent) {
                sink.set_pixel(map.physical(i / side, i % side), color);
                painted += 1;
            }
        }
    }
    sink.show()?;

    trace!("Composited {} overlays ({} cells)", overlays.len(), painted);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rotation::Rotation;
    use crate::overlay::Cell;
    use crate::strip::MemoryStrip;

    const RED: Rgb = Rgb::new(255, 0, 0);

    #[test]
    fn test_layers_in_order() {
        let map = AddressMap::new(4, Rotation::NONE);
        let mut strip = MemoryStrip::new(16);

        let mut lower = OverlayMatrix::new(4);
        lower.set(0, 0, Cell::Accent);
        lower.set(0, 1, Cell::Accent);
        let mut upper = OverlayMatrix::new(4);
        upper.set_color(0, 1, Rgb::new(0, 0, 255));

        compose(&mut strip, &[lower, upper], &map, RED).unwrap();

        assert_eq!(strip.flush_count(), 1);
        assert_eq!(strip.shown()[map.physical(0, 0)], RED);
        assert_eq!(strip.shown()[map.physical(0, 1)], Rgb::new(0, 0, 255));
        assert_eq!(strip.shown().iter().filter(|p| !p.is_black()).count(), 2);
    }

    #[test]
    fn test_clears_previous_content() {
        let map = AddressMap::new(4, Rotation::new(3).unwrap());
        let mut strip = MemoryStrip::new(16);
        strip.fill(Rgb::WHITE);

        let mut overlay = OverlayMatrix::new(4);
        overlay.set(3, 2, Cell::Accent);
        compose(&mut strip, &[&overlay], &map, RED).unwrap();

        let lit: Vec<usize> = (0..16).filter(|&i| !strip.shown()[i].is_black()).collect();
        assert_eq!(lit, vec![map.physical(3, 2)]);
    }

    #[test]
    fn test_accent_change_recolors() {
        let map = AddressMap::new(16, Rotation::new(3).unwrap());
        let mut strip = MemoryStrip::new(256);
        let mut time = OverlayMatrix::new(16);
        time.render_time(10, 10);

        compose(&mut strip, &[&time], &map, RED).unwrap();
        let first: Vec<_> = strip.shown().to_vec();
        compose(&mut strip, &[&time], &map, Rgb::new(0, 255, 0)).unwrap();

        for (a, b) in first.iter().zip(strip.shown()) {
            assert_eq!(a.is_black(), b.is_black());
        }
        assert_eq!(strip.flush_count(), 2);
    }

    #[test]
    fn test_size_mismatch() {
        let map = AddressMap::new(4, Rotation::NONE);
        let mut strip = MemoryStrip::new(16);
        let overlay = OverlayMatrix::new(5);
        assert!(matches!(
            compose(&mut strip, &[overlay], &map, RED),
            Err(Error::SizeMismatch { .. })
        ));
        assert_eq!(strip.flush_count(), 0);

        let mut small = MemoryStrip::new(8);
        let empty: [OverlayMatrix; 0] = [];
        assert!(compose(&mut small, &empty, &map, RED).is_err());
    }
}
