//! Day-long animation schedules (`.iti`).
//!
//! Each line covers one window, counting down the seconds left in the day:
//!
//! ```text
//! 86400 - 86000 : anis/rain.ani
//! 86000 - 0 : anis/clock.ani
//! ```

use crate::{Error, Result, DAY_SECONDS};
use std::io::{BufRead, Write};
use std::path::{Path, PathBuf};

/// File extension for itineraries.
pub const ITINERARY_EXTENSION: &str = "iti";

/// One scheduled window, in seconds remaining before midnight.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ItineraryEntry {
    pub start: u32,
    pub end: u32,
    pub animation: PathBuf,
}

impl ItineraryEntry {
    /// Length of the window in seconds.
    pub fn duration_secs(&self) -> u32 {
        self.start.saturating_sub(self.end)
    }
}

/// An ordered schedule covering exactly one day with no gaps or overlaps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Itinerary {
    entries: Vec<ItineraryEntry>,
}

impl Itinerary {
    /// Validates and wraps a list of entries.
    pub fn new(entries: Vec<ItineraryEntry>) -> Result<Self> {
        let Some(first) = entries.first() else {
            return Err(Error::Itinerary("no entries".into()));
        };
        if first.start != DAY_SECONDS {
            return Err(Error::Itinerary(format!(
                "first window starts at {}, expected {DAY_SECONDS}",
                first.start
            )));
        }
        for (i, entry) in entries.iter().enumerate() {
            if entry.end >= entry.start {
                return Err(Error::Itinerary(format!(
                    "line {}: window {} - {} does not count down",
                    i + 1,
                    entry.start,
                    entry.end
                )));
            }
            if let Some(next) = entries.get(i + 1) {
                if next.start != entry.end {
                    return Err(Error::Itinerary(format!(
                        "line {}: window ends at {} but the next starts at {}",
                        i + 1,
                        entry.end,
                        next.start
                    )));
                }
            }
        }
        if let Some(last) = entries.last() {
            if last.end != 0 {
                return Err(Error::Itinerary(format!(
                    "last window ends at {}, expected 0",
                    last.end
                )));
            }
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[ItineraryEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Sum of all window lengths. Always a full day for a valid itinerary.
    pub fn total_secs(&self) -> u32 {
        self.entries.iter().map(ItineraryEntry::duration_secs).sum()
    }

    /// Index of the entry playing `elapsed` seconds after midnight.
    pub fn entry_at(&self, elapsed: u32) -> usize {
        let remaining = DAY_SECONDS.saturating_sub(elapsed % DAY_SECONDS);
        self.entries
            .iter()
            .position(|e| e.start >= remaining && remaining > e.end)
            .unwrap_or(0)
    }

    /// Parses and validates an itinerary stream.
    pub fn parse<R: BufRead>(input: R) -> Result<Self> {
        let mut entries = Vec::new();
        for (i, line) in input.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            entries.push(parse_line(&line, i + 1)?);
        }
        Self::new(entries)
    }

    /// Reads an itinerary file, adding the `.iti` extension if missing.
    pub fn load(path: &Path) -> Result<Self> {
        let path = crate::container::with_extension(path, ITINERARY_EXTENSION);
        let file = std::fs::File::open(path)?;
        Self::parse(std::io::BufReader::new(file))
    }

    /// Writes one line per entry.
    pub fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        for entry in &self.entries {
            writeln!(
                out,
                "{} - {} : {}",
                entry.start,
                entry.end,
                entry.animation.display()
            )?;
        }
        Ok(())
    }
}

fn parse_line(line: &str, number: usize) -> Result<ItineraryEntry> {
    let bad = |what: &str| Error::Itinerary(format!("line {number}: {what}: {line:?}"));

    let (window, animation) = line.split_once(':').ok_or_else(|| bad("missing ':'"))?;
    let (start, end) = window.split_once('-').ok_or_else(|| bad("missing '-'"))?;
    let start: u32 = start.trim().parse().map_err(|_| bad("bad start"))?;
    let end: u32 = end.trim().parse().map_err(|_| bad("bad end"))?;
    let animation = animation.trim();
    if animation.is_empty() {
        return Err(bad("missing animation path"));
    }
    Ok(ItineraryEntry {
        start,
        end,
        animation: PathBuf::from(animation),
    })
}

/// Hands out the day's seconds one window at a time.
#[derive(Debug, Clone)]
pub struct ItineraryBuilder {
    entries: Vec<ItineraryEntry>,
    remaining: u32,
}

impl Default for ItineraryBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ItineraryBuilder {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            remaining: DAY_SECONDS,
        }
    }

    /// Seconds not yet allotted.
    pub fn remaining(&self) -> u32 {
        self.remaining
    }

    /// Schedules `animation` for the next `seconds`.
    pub fn push(&mut self, animation: impl Into<PathBuf>, seconds: u32) -> Result<()> {
        if seconds == 0 {
            return Err(Error::Itinerary("window of zero seconds".into()));
        }
        if seconds > self.remaining {
            return Err(Error::Itinerary(format!(
                "{seconds} s requested but only {} s left in the day",
                self.remaining
            )));
        }
        let start = self.remaining;
        self.remaining -= seconds;
        self.entries.push(ItineraryEntry {
            start,
            end: self.remaining,
            animation: animation.into(),
        });
        Ok(())
    }

    /// Like `push`, but clips the window to what is left of the day.
    /// Returns the seconds actually scheduled.
    pub fn push_clipped(&mut self, animation: impl Into<PathBuf>, seconds: u32) -> Result<u32> {
        let seconds = seconds.min(self.remaining);
        self.push(animation, seconds)?;
        Ok(seconds)
    }

    /// Fails unless every second of the day has been allotted.
    pub fn finish(self) -> Result<Itinerary> {
        if self.remaining != 0 {
            return Err(Error::Itinerary(format!(
                "{} s of the day left unscheduled",
                self.remaining
            )));
        }
        Itinerary::new(self.entries)
    }
}
