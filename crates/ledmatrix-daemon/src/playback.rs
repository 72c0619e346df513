//! Animation playback engine.
//!
//! Frames are applied straight onto the sink buffer, flushed, and paced to the
//! file's frame rate. A frame that overruns its budget is counted as lagged
//! and playback carries on; every delta is still applied so the buffer stays
//! correct for the next one.

use crate::session::Session;
use anyhow::{Context, Result};
use ledmatrix_core::container::{self, AnimationReader};
use ledmatrix_core::delta;
use ledmatrix_core::AnimationHeader;
use std::io::BufRead;
use std::path::Path;
use std::time::Duration;
use tokio::time::Instant;
use tracing::{debug, info, trace, warn};

/// Where a playback is in its lifecycle.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlaybackState {
    Idle,
    Loading,
    Streaming,
    Done,
    Interrupted(StopReason),
}

/// Why a playback ended early.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StopReason {
    /// The cancel flag was raised.
    Cancelled,
    /// The caller's wall-clock deadline passed.
    Deadline,
}

/// Outcome of one pass through an animation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlaybackReport {
    pub header: AnimationHeader,
    pub state: PlaybackState,
    pub frames: u32,
    pub lagged: u32,
}

fn transition(state: &mut PlaybackState, next: PlaybackState) {
    trace!("Playback {:?} -> {:?}", state, next);
    *state = next;
}

/// Opens and plays an animation file once.
pub async fn play_file(
    session: &mut Session,
    path: &Path,
    deadline: Option<Instant>,
) -> Result<PlaybackReport> {
    let mut state = PlaybackState::Idle;
    transition(&mut state, PlaybackState::Loading);
    let reader = container::open_animation(path)
        .with_context(|| format!("Failed to open animation {}", path.display()))?;
    info!(
        "Playing {} ({} frames, {} fps, {})",
        path.display(),
        reader.header().frame_count,
        reader.header().fps,
        reader.header().kind
    );
    play(session, reader, deadline).await
}

/// Plays an already opened animation once.
///
/// The header's side length must match the panel; a mismatch is returned as
/// an error before anything is drawn.
pub async fn play<R: BufRead>(
    session: &mut Session,
    mut reader: AnimationReader<R>,
    deadline: Option<Instant>,
) -> Result<PlaybackReport> {
    let mut state = PlaybackState::Loading;
    let header = *reader.header();
    header
        .check_side_length(session.side_length())
        .context("Animation does not fit this panel")?;

    let interval = header.fps.interval();
    let mut frames = 0u32;
    let mut lagged = 0u32;
    let mut records = Vec::new();

    // The first frame was diffed against black.
    session.sink_mut().clear();
    transition(&mut state, PlaybackState::Streaming);

    loop {
        if session.cancel().take() {
            transition(&mut state, PlaybackState::Interrupted(StopReason::Cancelled));
            break;
        }
        if deadline.is_some_and(|d| Instant::now() >= d) {
            transition(&mut state, PlaybackState::Interrupted(StopReason::Deadline));
            break;
        }

        let start = Instant::now();
        let more = reader
            .read_frame_into(&mut records)
            .with_context(|| format!("Failed to read frame {}", frames))?;
        if !more {
            transition(&mut state, PlaybackState::Done);
            break;
        }
        let sink = session.sink_mut();
        delta::apply_to_sink(&records, sink)
            .with_context(|| format!("Frame {} does not fit the strip", frames))?;
        sink.show().context("Failed to show frame")?;
        frames += 1;

        let elapsed = start.elapsed();
        if elapsed < interval {
            let mut pause = interval - elapsed;
            if let Some(d) = deadline {
                pause = pause.min(d.saturating_duration_since(Instant::now()));
            }
            tokio::time::sleep(pause).await;
        } else {
            lagged += 1;
            let over = elapsed - interval;
            if lagged == 1 {
                warn!(
                    "Frame {} took {:?}, {:?} over its {:?} budget",
                    frames, elapsed, over, interval
                );
            } else {
                debug!("Frame {} lagged by {:?}", frames, over);
            }
            // Let the remote listener run even when every frame overruns.
            tokio::task::yield_now().await;
        }
    }

    if lagged > 0 {
        info!(
            "{} of {} frames took longer than the {:?} frame interval",
            lagged, frames, interval
        );
    }

    match state {
        PlaybackState::Done if header.kind.is_looping() => {}
        _ => session.blank().context("Failed to clear panel")?,
    }

    Ok(PlaybackReport {
        header,
        state,
        frames,
        lagged,
    })
}

/// Plays an animation over and over until `deadline`, or forever when there
/// is none. Cancelling stops the loop only when a deadline is set; without
/// one the animation restarts from the top.
pub async fn play_looped(
    session: &mut Session,
    path: &Path,
    deadline: Option<Instant>,
) -> Result<PlaybackReport> {
    loop {
        let report = play_file(session, path, deadline).await?;
        match report.state {
            PlaybackState::Interrupted(StopReason::Deadline) => return Ok(report),
            PlaybackState::Interrupted(StopReason::Cancelled) if deadline.is_some() => {
                return Ok(report)
            }
            PlaybackState::Interrupted(StopReason::Cancelled) => {
                info!("Restarting {}", path.display());
            }
            _ => {}
        }
        if report.frames == 0 {
            // Nothing to show; wait out the window instead of spinning.
            match deadline {
                Some(d) => {
                    tokio::time::sleep_until(d).await;
                    return Ok(report);
                }
                None => tokio::time::sleep(Duration::from_secs(1)).await,
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cancel::CancelFlag;
    use ledmatrix_core::color::Rgb;
    use ledmatrix_core::{
        AddressMap, AnimationKind, AnimationWriter, DeltaRecord, Fps, PixelSink, Rotation,
    };
    use std::io::Cursor;
    use std::sync::{Arc, Mutex};

    /// Memory strip that stalls on chosen flushes and records what it showed.
    struct SlowStrip {
        pixels: Vec<Rgb>,
        brightness: u8,
        slow_flush: Option<usize>,
        shown: Arc<Mutex<Vec<Vec<Rgb>>>>,
    }

    impl PixelSink for SlowStrip {
        fn pixel_count(&self) -> usize {
            self.pixels.len()
        }
        fn set_pixel(&mut self, index: usize, color: Rgb) {
            if let Some(p) = self.pixels.get_mut(index) {
                *p = color;
            }
        }
        fn pixel(&self, index: usize) -> Option<Rgb> {
            self.pixels.get(index).copied()
        }
        fn show(&mut self) -> ledmatrix_core::Result<()> {
            let mut shown = self.shown.lock().unwrap();
            shown.push(self.pixels.clone());
            if Some(shown.len()) == self.slow_flush {
                std::thread::sleep(Duration::from_millis(500));
            }
            Ok(())
        }
        fn set_brightness(&mut self, brightness: u8) {
            self.brightness = brightness;
        }
        fn brightness(&self) -> u8 {
            self.brightness
        }
    }

    type Shown = Arc<Mutex<Vec<Vec<Rgb>>>>;

    fn session(side: u16, slow_flush: Option<usize>) -> (Session, Shown) {
        let map = AddressMap::new(side, Rotation::NONE);
        let shown = Arc::new(Mutex::new(Vec::new()));
        let strip = SlowStrip {
            pixels: vec![Rgb::BLACK; map.len()],
            brightness: 0,
            slow_flush,
            shown: shown.clone(),
        };
        let session = Session::new(map, Box::new(strip), 25, 45, CancelFlag::new());
        (session, shown)
    }

    fn animation(kind: AnimationKind, fps: f64, frames: u32, side: u16) -> Vec<u8> {
        let fps = Fps::new(fps).unwrap();
        let header = ledmatrix_core::AnimationHeader::new(fps, frames, kind, side);
        let mut writer = AnimationWriter::new(Vec::new(), header).unwrap();
        for i in 0..frames {
            let color = Rgb::new(i as u8 + 1, 0, 0);
            let index = i % (side as u32 * side as u32);
            writer
                .write_frame(&[DeltaRecord::new(index, color)])
                .unwrap();
        }
        writer.finish().unwrap()
    }

    fn reader(bytes: Vec<u8>) -> AnimationReader<Cursor<Vec<u8>>> {
        AnimationReader::new(Cursor::new(bytes)).unwrap()
    }

    #[tokio::test]
    async fn test_lagging_frame_does_not_abort() {
        // Flush 2 is the second frame; it takes 500 ms against a 100 ms budget.
        let (mut session, shown) = session(4, Some(2));
        let bytes = animation(AnimationKind::Effect, 10.0, 3, 4);

        let report = play(&mut session, reader(bytes), None).await.unwrap();

        assert_eq!(report.state, PlaybackState::Done);
        assert_eq!(report.frames, 3);
        assert!(report.lagged >= 1);

        let shown = shown.lock().unwrap();
        // Three frames plus the final clear of a non-looping animation.
        assert_eq!(shown.len(), 4);
        assert_eq!(shown[0][0], Rgb::new(1, 0, 0));
        assert_eq!(shown[1][1], Rgb::new(2, 0, 0));
        assert_eq!(shown[2][2], Rgb::new(3, 0, 0));
        // Deltas accumulate on the buffer.
        assert_eq!(shown[2][0], Rgb::new(1, 0, 0));
        assert!(shown[3].iter().all(|p| p.is_black()));
    }

    #[tokio::test]
    async fn test_looping_kind_keeps_last_frame() {
        let (mut session, shown) = session(4, None);
        let bytes = animation(AnimationKind::Gif, 200.0, 2, 4);
        let report = play(&mut session, reader(bytes), None).await.unwrap();
        assert_eq!(report.state, PlaybackState::Done);
        assert_eq!(shown.lock().unwrap().len(), 2);
        assert_eq!(session.sink().pixel(1), Some(Rgb::new(2, 0, 0)));
    }

    #[tokio::test]
    async fn test_cancel_stops_at_frame_boundary() {
        let (mut session, shown) = session(4, None);
        session.cancel().raise();
        let bytes = animation(AnimationKind::Gif, 10.0, 5, 4);
        let report = play(&mut session, reader(bytes), None).await.unwrap();
        assert_eq!(
            report.state,
            PlaybackState::Interrupted(StopReason::Cancelled)
        );
        assert_eq!(report.frames, 0);
        assert!(!session.cancel().is_raised());
        // Interrupted playback leaves a blank panel.
        let shown = shown.lock().unwrap();
        assert_eq!(shown.len(), 1);
        assert!(shown[0].iter().all(|p| p.is_black()));
    }

    #[tokio::test]
    async fn test_deadline_interrupts() {
        let (mut session, _) = session(4, None);
        let bytes = animation(AnimationKind::Effect, 10.0, 100, 4);
        let deadline = Instant::now() + Duration::from_millis(250);
        let report = play(&mut session, reader(bytes), Some(deadline)).await.unwrap();
        assert_eq!(report.state, PlaybackState::Interrupted(StopReason::Deadline));
        assert!(report.frames >= 1 && report.frames < 100);
    }

    #[tokio::test]
    async fn test_side_length_mismatch_is_fatal() {
        let (mut session, shown) = session(4, None);
        let bytes = animation(AnimationKind::Effect, 10.0, 1, 8);
        let err = play(&mut session, reader(bytes), None).await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<ledmatrix_core::Error>(),
            Some(ledmatrix_core::Error::SideLengthMismatch {
                expected: 4,
                actual: 8
            })
        ));
        assert!(shown.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_missing_file() {
        let (mut session, _) = session(4, None);
        let path = std::env::temp_dir().join("ledmatrixd-does-not-exist");
        assert!(play_file(&mut session, &path, None).await.is_err());
    }
}
