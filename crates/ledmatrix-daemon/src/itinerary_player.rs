//! Plays an itinerary: each segment loops its animation until the segment's
//! window closes, then the panel is blanked and the next segment starts.

use crate::playback::{self, PlaybackState, StopReason};
use crate::sensors::ClockSource;
use crate::session::Session;
use anyhow::{Context, Result};
use chrono::Timelike;
use ledmatrix_core::{Itinerary, ItineraryEntry, DAY_SECONDS};
use std::time::Duration;
use tokio::time::Instant;
use tracing::info;

/// Where to start the first day.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StartPoint {
    pub index: usize,
    /// Seconds to play the first segment for, when joining it part way.
    pub first_secs: Option<u32>,
}

impl StartPoint {
    pub const BEGINNING: StartPoint = StartPoint {
        index: 0,
        first_secs: None,
    };

    /// The segment covering `elapsed` seconds past midnight and what is left of it.
    pub fn aligned(itinerary: &Itinerary, elapsed: u32) -> Self {
        let index = itinerary.entry_at(elapsed);
        let first_secs = itinerary
            .entries()
            .get(index)
            .map(|entry| seconds_left(entry, elapsed));
        Self { index, first_secs }
    }
}

/// Seconds of `entry` still to come `elapsed` seconds past midnight.
pub fn seconds_left(entry: &ItineraryEntry, elapsed: u32) -> u32 {
    let remaining = DAY_SECONDS - elapsed % DAY_SECONDS;
    remaining
        .saturating_sub(entry.end)
        .min(entry.duration_secs())
}

/// Plays the itinerary forever.
pub async fn run<C: ClockSource>(
    session: &mut Session,
    itinerary: &Itinerary,
    clock: &C,
    align: bool,
) -> Result<()> {
    let mut start = if align {
        let elapsed = clock.now().num_seconds_from_midnight();
        let start = StartPoint::aligned(itinerary, elapsed);
        info!(
            "Joining segment {} with {:?}s left",
            start.index + 1,
            start.first_secs
        );
        start
    } else {
        StartPoint::BEGINNING
    };

    loop {
        play_day(session, itinerary, start).await?;
        info!("Itinerary complete, starting over");
        start = StartPoint::BEGINNING;
    }
}

/// Plays the segments from `start` to the end of the day. Returns how many
/// segments were played.
pub async fn play_day(
    session: &mut Session,
    itinerary: &Itinerary,
    start: StartPoint,
) -> Result<usize> {
    let mut played = 0;
    for (i, entry) in itinerary.entries().iter().enumerate().skip(start.index) {
        let secs = match start.first_secs {
            Some(secs) if i == start.index => secs,
            _ => entry.duration_secs(),
        };
        info!(
            "Segment {}/{}: {} for {}s",
            i + 1,
            itinerary.len(),
            entry.animation.display(),
            secs
        );

        let deadline = Instant::now() + Duration::from_secs(secs as u64);
        let report = playback::play_looped(session, &entry.animation, Some(deadline))
            .await
            .with_context(|| format!("Segment {} failed", i + 1))?;
        if report.state == PlaybackState::Interrupted(StopReason::Cancelled) {
            info!("Skipped to the next segment");
        }

        session.blank().context("Failed to clear panel")?;
        played += 1;
    }
    Ok(played)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::session::tests::memory_session;
    use ledmatrix_core::color::Rgb;
    use ledmatrix_core::container;
    use ledmatrix_core::{AnimationHeader, AnimationKind, DeltaRecord, Fps, ItineraryBuilder};
    use std::path::{Path, PathBuf};

    fn write_animation(path: &Path, fps: f64) {
        let header = AnimationHeader::new(Fps::new(fps).unwrap(), 1, AnimationKind::Gif, 4);
        let mut writer = container::create_animation(path, header).unwrap();
        writer
            .write_frame(&[DeltaRecord::new(0, Rgb::new(9, 9, 9))])
            .unwrap();
        writer.finish().unwrap();
    }

    fn two_halves(a: PathBuf, b: PathBuf) -> Itinerary {
        let mut builder = ItineraryBuilder::new();
        builder.push(a, 43_200).unwrap();
        builder.push(b, 43_200).unwrap();
        builder.finish().unwrap()
    }

    #[test]
    fn test_aligned_start() {
        let itinerary = two_halves("a.ani".into(), "b.ani".into());

        let start = StartPoint::aligned(&itinerary, 0);
        assert_eq!(start.index, 0);
        assert_eq!(start.first_secs, Some(43_200));

        let start = StartPoint::aligned(&itinerary, 3_600);
        assert_eq!(start.index, 0);
        assert_eq!(start.first_secs, Some(39_600));

        let start = StartPoint::aligned(&itinerary, 43_200);
        assert_eq!(start.index, 1);
        assert_eq!(start.first_secs, Some(43_200));

        let start = StartPoint::aligned(&itinerary, 86_399);
        assert_eq!(start.index, 1);
        assert_eq!(start.first_secs, Some(1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_plays_each_segment_until_its_deadline() {
        let dir = std::env::temp_dir().join(format!("ledmatrixd-iti-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let (a, b) = (dir.join("a.ani"), dir.join("b.ani"));
        // One frame every three hours keeps the virtual day short to simulate.
        write_animation(&a, 1.0 / 10_800.0);
        write_animation(&b, 1.0 / 10_800.0);
        let itinerary = two_halves(a, b);

        let mut session = memory_session(4);
        let began = Instant::now();
        let played = play_day(&mut session, &itinerary, StartPoint::BEGINNING)
            .await
            .unwrap();
        let took = began.elapsed();
        std::fs::remove_dir_all(&dir).ok();

        assert_eq!(played, 2);
        assert!(took >= Duration::from_secs(86_400));
        assert!(took < Duration::from_secs(86_400 + 60));
        assert_eq!(session.sink().pixel(0), Some(Rgb::BLACK));
    }

    #[tokio::test(start_paused = true)]
    async fn test_cancel_skips_to_next_segment() {
        let dir = std::env::temp_dir().join(format!("ledmatrixd-iti-skip-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let (a, b) = (dir.join("a.ani"), dir.join("b.ani"));
        write_animation(&a, 1.0 / 10_800.0);
        write_animation(&b, 1.0 / 10_800.0);
        let itinerary = two_halves(a, b);

        let mut session = memory_session(4);
        session.cancel().raise();
        let began = Instant::now();
        let start = StartPoint {
            index: 0,
            first_secs: Some(600),
        };
        let played = play_day(&mut session, &itinerary, start).await.unwrap();
        let took = began.elapsed();
        std::fs::remove_dir_all(&dir).ok();

        // The first segment ends at once, the second runs its full window.
        assert_eq!(played, 2);
        assert!(took >= Duration::from_secs(43_200));
        assert!(took < Duration::from_secs(43_200 + 60));
    }

    #[tokio::test]
    async fn test_missing_animation_is_fatal() {
        let itinerary = two_halves("/nonexistent/a.ani".into(), "/nonexistent/b.ani".into());
        let mut session = memory_session(4);
        assert!(play_day(&mut session, &itinerary, StartPoint::BEGINNING)
            .await
            .is_err());
    }
}
