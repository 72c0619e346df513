//! Day-long itineraries: hand-written windows or a random shuffle of a
//! folder of animations.

use crate::rng::Rng;
use anyhow::{bail, Context, Result};
use ledmatrix_core::container::{self, ANIMATION_EXTENSION};
use ledmatrix_core::itinerary::ITINERARY_EXTENSION;
use ledmatrix_core::{Itinerary, ItineraryBuilder};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Parses `path=seconds` from the command line.
pub fn parse_entry(s: &str) -> Result<(PathBuf, u32), String> {
    let (path, secs) = s
        .rsplit_once('=')
        .ok_or_else(|| format!("expected PATH=SECONDS, got {:?}", s))?;
    if path.is_empty() {
        return Err("empty animation path".to_string());
    }
    let secs = secs
        .trim()
        .parse::<u32>()
        .map_err(|e| format!("bad seconds {:?}: {}", secs, e))?;
    Ok((PathBuf::from(path), secs))
}

/// Builds an itinerary from explicit windows, which must cover the day exactly.
pub fn from_entries(entries: &[(PathBuf, u32)]) -> Result<Itinerary> {
    let mut builder = ItineraryBuilder::new();
    for (path, secs) in entries {
        let path = container::with_extension(path, ANIMATION_EXTENSION);
        builder
            .push(&path, *secs)
            .with_context(|| format!("Cannot schedule {}", path.display()))?;
    }
    Ok(builder.finish()?)
}

/// Whole seconds one loop of the animation at `path` lasts.
pub fn loop_seconds(path: &Path) -> Result<u32> {
    let reader = container::open_animation(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(reader.header().duration_secs().floor() as u32)
}

/// Every `.ani` in `dir` with its loop length, sorted by name. Animations
/// shorter than a second are left out.
pub fn scan_loops(dir: &Path) -> Result<Vec<(PathBuf, u32)>> {
    let mut paths = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read animation folder {}", dir.display()))?
    {
        let path = entry?.path();
        let is_ani = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case(ANIMATION_EXTENSION));
        if is_ani {
            paths.push(path);
        }
    }
    paths.sort();

    let mut loops = Vec::with_capacity(paths.len());
    for path in paths {
        match loop_seconds(&path)? {
            0 => warn!("{} lasts under a second, skipping", path.display()),
            secs => {
                debug!("{}: {}s per loop", path.display(), secs);
                loops.push((path, secs));
            }
        }
    }
    Ok(loops)
}

/// Fills the day with random picks, each playing two to five whole loops.
/// The last pick is cut short at midnight.
pub fn random_fill(loops: &[(PathBuf, u32)], rng: &mut Rng) -> Result<Itinerary> {
    if loops.is_empty() {
        bail!("No animations to choose from");
    }
    let mut builder = ItineraryBuilder::new();
    while builder.remaining() > 0 {
        let Some((path, secs)) = rng.pick(loops) else {
            break;
        };
        let wanted = rng.between(2, 5).saturating_mul(*secs);
        builder.push_clipped(path, wanted)?;
    }
    Ok(builder.finish()?)
}

/// Writes the itinerary to `path`, adding the `.iti` extension if missing.
pub fn save(itinerary: &Itinerary, path: &Path) -> Result<PathBuf> {
    let path = container::with_extension(path, ITINERARY_EXTENSION);
    let file =
        File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;
    let mut out = BufWriter::new(file);
    itinerary.write(&mut out)?;
    out.flush()?;
    info!(
        "Wrote {} ({} segments)",
        path.display(),
        itinerary.len()
    );
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledmatrix_core::color::Rgb;
    use ledmatrix_core::{AnimationHeader, AnimationKind, DeltaRecord, Fps, DAY_SECONDS};

    fn scratch_dir(name: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("ledani-iti-{}-{}", name, std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        dir
    }

    fn write_animation(path: &Path, fps: f64, frames: u32) {
        let header = AnimationHeader::new(Fps::new(fps).unwrap(), frames, AnimationKind::Gif, 4);
        let mut writer = container::create_animation(path, header).unwrap();
        for _ in 0..frames {
            writer
                .write_frame(&[DeltaRecord::new(0, Rgb::new(1, 2, 3))])
                .unwrap();
        }
        writer.finish().unwrap();
    }

    #[test]
    fn test_parse_entry() {
        assert_eq!(
            parse_entry("rain.ani=400").unwrap(),
            (PathBuf::from("rain.ani"), 400)
        );
        assert_eq!(
            parse_entry("dir/a=b.ani=5").unwrap(),
            (PathBuf::from("dir/a=b.ani"), 5)
        );
        assert!(parse_entry("rain.ani").is_err());
        assert!(parse_entry("=5").is_err());
        assert!(parse_entry("rain=-1").is_err());
    }

    #[test]
    fn test_from_entries_adds_extension() {
        let itinerary = from_entries(&[
            (PathBuf::from("rain"), 400),
            (PathBuf::from("clock.ani"), 86_000),
        ])
        .unwrap();
        let entries = itinerary.entries();
        assert_eq!(entries[0].animation, PathBuf::from("rain.ani"));
        assert_eq!(entries[0].start, DAY_SECONDS);
        assert_eq!(entries[0].end, 86_000);
        assert_eq!(entries[1].animation, PathBuf::from("clock.ani"));
        assert_eq!(entries[1].end, 0);
    }

    #[test]
    fn test_from_entries_must_cover_day() {
        assert!(from_entries(&[(PathBuf::from("rain"), 400)]).is_err());
        assert!(from_entries(&[(PathBuf::from("rain"), DAY_SECONDS + 1)]).is_err());
    }

    #[test]
    fn test_scan_loops() {
        let dir = scratch_dir("scan");
        write_animation(&dir.join("b.ani"), 10.0, 50);
        write_animation(&dir.join("a.ani"), 24.0, 1440);
        write_animation(&dir.join("blip.ani"), 10.0, 3);
        std::fs::write(dir.join("notes.txt"), "x").unwrap();

        let loops = scan_loops(&dir).unwrap();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(loops.len(), 2);
        assert!(loops[0].0.ends_with("a.ani"));
        assert_eq!(loops[0].1, 60);
        assert!(loops[1].0.ends_with("b.ani"));
        assert_eq!(loops[1].1, 5);
    }

    #[test]
    fn test_random_fill_covers_day_in_whole_loops() {
        let loops = vec![
            (PathBuf::from("a.ani"), 60),
            (PathBuf::from("b.ani"), 7),
        ];
        let itinerary = random_fill(&loops, &mut Rng::new(3)).unwrap();
        assert_eq!(itinerary.total_secs(), DAY_SECONDS);

        let entries = itinerary.entries();
        let (last, rest) = entries.split_last().unwrap();
        assert_eq!(last.end, 0);
        for entry in rest {
            let per_loop = if entry.animation == Path::new("a.ani") { 60 } else { 7 };
            let loops = entry.duration_secs() / per_loop;
            assert_eq!(entry.duration_secs() % per_loop, 0);
            assert!((2..=5).contains(&loops));
        }
    }

    #[test]
    fn test_random_fill_needs_candidates() {
        assert!(random_fill(&[], &mut Rng::new(1)).is_err());
    }

    #[test]
    fn test_save_round_trips() {
        let dir = scratch_dir("save");
        let itinerary = from_entries(&[(PathBuf::from("clock"), DAY_SECONDS)]).unwrap();
        let path = save(&itinerary, &dir.join("day")).unwrap();
        assert!(path.ends_with("day.iti"));
        let loaded = Itinerary::load(&dir.join("day")).unwrap();
        std::fs::remove_dir_all(&dir).ok();
        assert_eq!(loaded.entries(), itinerary.entries());
    }
}
