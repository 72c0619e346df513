//! Animation container (`.ani`) text codec.
//!
//! ```text
//! "                      <- comment lines; a quote ends the comment block
//! "
//! FPS: 24
//! Length: 3
//! Type: gif
//! Side_Length: 16
//!  31 10 20 30, 32 0 0 255,     <- one line per frame, `index r g b, ` tokens
//!                               <- no-op frame: a single space
//! ```
//!
//! The first frame is always diffed against an all-black panel; there is no
//! header flag for it.

use crate::delta::DeltaRecord;
use crate::color::Rgb;
use crate::{Error, Result};
use std::fs::File;
use std::io::{BufRead, BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::debug;

/// File extension for animations.
pub const ANIMATION_EXTENSION: &str = "ani";

/// What an animation was authored from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationKind {
    Images,
    Text,
    Gif,
    Effect,
    Clock,
    SingleImage,
}

impl AnimationKind {
    pub const ALL: [AnimationKind; 6] = [
        AnimationKind::Images,
        AnimationKind::Text,
        AnimationKind::Gif,
        AnimationKind::Effect,
        AnimationKind::Clock,
        AnimationKind::SingleImage,
    ];

    /// Name written in the `Type:` header line.
    pub fn as_str(&self) -> &'static str {
        match self {
            AnimationKind::Images => "images",
            AnimationKind::Text => "text",
            AnimationKind::Gif => "gif",
            AnimationKind::Effect => "effect",
            AnimationKind::Clock => "clock",
            AnimationKind::SingleImage => "single_image",
        }
    }

    /// Looping kinds end on their last frame; the rest leave a blank panel.
    pub fn is_looping(&self) -> bool {
        matches!(self, AnimationKind::Gif)
    }
}

impl FromStr for AnimationKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "images" => Ok(AnimationKind::Images),
            "text" => Ok(AnimationKind::Text),
            "gif" => Ok(AnimationKind::Gif),
            "effect" => Ok(AnimationKind::Effect),
            "clock" => Ok(AnimationKind::Clock),
            // Older single image files were tagged "image".
            "single_image" | "image" => Ok(AnimationKind::SingleImage),
            other => Err(Error::InvalidKind(other.to_string())),
        }
    }
}

impl std::fmt::Display for AnimationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Frames per second. Always positive and finite.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Fps(f64);

impl Fps {
    /// Rejects rates that are not positive or whose frame interval does
    /// not fit in a `Duration`.
    pub fn new(value: f64) -> Result<Self> {
        let fits = std::time::Duration::try_from_secs_f64(1.0 / value).is_ok();
        if value.is_finite() && value > 0.0 && fits {
            Ok(Self(value))
        } else {
            Err(Error::InvalidFps(value.to_string()))
        }
    }

    pub fn get(&self) -> f64 {
        self.0
    }

    /// Time budget for one frame.
    pub fn interval(&self) -> std::time::Duration {
        std::time::Duration::try_from_secs_f64(1.0 / self.0).unwrap_or(std::time::Duration::MAX)
    }
}

impl FromStr for Fps {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let value: f64 = s
            .trim()
            .parse()
            .map_err(|_| Error::InvalidFps(s.trim().to_string()))?;
        Self::new(value)
    }
}

impl std::fmt::Display for Fps {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.0.fract() == 0.0 {
            write!(f, "{}", self.0 as u64)
        } else {
            write!(f, "{}", self.0)
        }
    }
}

/// Metadata at the top of every animation file.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AnimationHeader {
    pub fps: Fps,
    pub frame_count: u32,
    pub kind: AnimationKind,
    pub side_length: u16,
}

impl AnimationHeader {
    pub fn new(fps: Fps, frame_count: u32, kind: AnimationKind, side_length: u16) -> Self {
        Self {
            fps,
            frame_count,
            kind,
            side_length,
        }
    }

    /// Playing time of one pass, in seconds.
    pub fn duration_secs(&self) -> f64 {
        self.frame_count as f64 / self.fps.get()
    }

    /// Fails unless the animation was authored for a panel of `side_length`.
    pub fn check_side_length(&self, side_length: u16) -> Result<()> {
        if self.side_length != side_length {
            return Err(Error::SideLengthMismatch {
                expected: side_length,
                actual: self.side_length,
            });
        }
        Ok(())
    }

    fn write<W: Write>(&self, out: &mut W) -> Result<()> {
        out.write_all(b"\"\n\"\n")?;
        writeln!(out, "FPS: {}", self.fps)?;
        writeln!(out, "Length: {}", self.frame_count)?;
        writeln!(out, "Type: {}", self.kind)?;
        writeln!(out, "Side_Length: {}", self.side_length)?;
        Ok(())
    }

    fn read<R: BufRead>(input: &mut R) -> Result<Self> {
        let mut line = String::new();

        // The first line is a comment whatever it holds; the sentinel is
        // searched for from the second line on.
        if input.read_line(&mut line)? == 0 {
            return Err(Error::MalformedHeader("empty file".into()));
        }
        loop {
            line.clear();
            if input.read_line(&mut line)? == 0 {
                return Err(Error::MalformedHeader(
                    "missing '\"' end-of-comment marker".into(),
                ));
            }
            if line.contains('"') {
                break;
            }
        }

        let fps = read_field(input, "FPS")?;
        let fps: Fps = fps.parse()?;
        let frame_count = read_field(input, "Length")?;
        let frame_count: u32 = frame_count
            .parse()
            .map_err(|_| Error::MalformedHeader(format!("bad Length: {frame_count}")))?;
        let kind: AnimationKind = read_field(input, "Type")?.parse()?;
        let side_length = read_field(input, "Side_Length")?;
        let side_length: u16 = side_length
            .parse()
            .map_err(|_| Error::MalformedHeader(format!("bad Side_Length: {side_length}")))?;

        Ok(Self::new(fps, frame_count, kind, side_length))
    }
}

/// Reads one `Name: value` line and returns the last whitespace token.
fn read_field<R: BufRead>(input: &mut R, name: &str) -> Result<String> {
    let mut line = String::new();
    if input.read_line(&mut line)? == 0 {
        return Err(Error::MalformedHeader(format!("missing {name} line")));
    }
    let (key, value) = line
        .split_once(':')
        .ok_or_else(|| Error::MalformedHeader(format!("expected {name}, got {:?}", line.trim())))?;
    if key.trim() != name {
        return Err(Error::MalformedHeader(format!(
            "expected {name}, got {:?}",
            key.trim()
        )));
    }
    value
        .split_whitespace()
        .last()
        .map(str::to_string)
        .ok_or_else(|| Error::MalformedHeader(format!("{name} has no value")))
}

/// Append-only animation writer.
pub struct AnimationWriter<W: Write> {
    out: W,
    header: AnimationHeader,
    frames: u32,
}

impl<W: Write> AnimationWriter<W> {
    /// Writes the header and returns a writer positioned at the first frame.
    pub fn new(mut out: W, header: AnimationHeader) -> Result<Self> {
        header.write(&mut out)?;
        Ok(Self {
            out,
            header,
            frames: 0,
        })
    }

    pub fn header(&self) -> &AnimationHeader {
        &self.header
    }

    /// Number of frame lines written so far.
    pub fn frames_written(&self) -> u32 {
        self.frames
    }

    /// Writes one frame line. An empty slice writes a no-op frame.
    pub fn write_frame(&mut self, records: &[DeltaRecord]) -> Result<()> {
        self.out.write_all(b" ")?;
        for record in records {
            let c = record.color;
            write!(self.out, "{} {} {} {}, ", record.index, c.r, c.g, c.b)?;
        }
        self.out.write_all(b"\n")?;
        self.frames += 1;
        Ok(())
    }

    /// Flushes and returns the underlying stream.
    pub fn finish(mut self) -> Result<W> {
        self.out.flush()?;
        if self.frames != self.header.frame_count {
            debug!(
                "Wrote {} frames, header declares {}",
                self.frames, self.header.frame_count
            );
        }
        Ok(self.out)
    }
}

/// Sequential animation reader; yields one frame of records per step.
pub struct AnimationReader<R: BufRead> {
    input: R,
    header: AnimationHeader,
    line: String,
    frame: u32,
}

impl<R: BufRead> AnimationReader<R> {
    /// Parses the header.
    pub fn new(mut input: R) -> Result<Self> {
        let header = AnimationHeader::read(&mut input)?;
        Ok(Self {
            input,
            header,
            line: String::new(),
            frame: 0,
        })
    }

    pub fn header(&self) -> &AnimationHeader {
        &self.header
    }

    /// Index of the next frame to be read.
    pub fn position(&self) -> u32 {
        self.frame
    }

    /// Reads the next frame into `records`, returning false at end of stream.
    pub fn read_frame_into(&mut self, records: &mut Vec<DeltaRecord>) -> Result<bool> {
        records.clear();
        self.line.clear();
        if self.input.read_line(&mut self.line)? == 0 {
            return Ok(false);
        }
        parse_frame_line(&self.line, self.frame, records)?;
        self.frame += 1;
        Ok(true)
    }
}

impl<R: BufRead> Iterator for AnimationReader<R> {
    type Item = Result<Vec<DeltaRecord>>;

    fn next(&mut self) -> Option<Self::Item> {
        let mut records = Vec::new();
        match self.read_frame_into(&mut records) {
            Ok(true) => Some(Ok(records)),
            Ok(false) => None,
            Err(e) => Some(Err(e)),
        }
    }
}

fn parse_frame_line(line: &str, frame: u32, records: &mut Vec<DeltaRecord>) -> Result<()> {
    let malformed = |reason: String| Error::MalformedFrame { frame, reason };

    for token in line.split(',') {
        let token = token.trim();
        if token.is_empty() {
            continue;
        }
        let mut fields = token.split_whitespace();
        let mut next = |what: &str| -> Result<u32> {
            let field = fields
                .next()
                .ok_or_else(|| malformed(format!("missing {what} in {token:?}")))?;
            field
                .parse::<u32>()
                .map_err(|_| malformed(format!("bad {what} {field:?}")))
        };
        let index = next("index")?;
        let channel = |v: u32, what: &str| -> Result<u8> {
            u8::try_from(v).map_err(|_| malformed(format!("{what} {v} out of range")))
        };
        let r = channel(next("red")?, "red")?;
        let g = channel(next("green")?, "green")?;
        let b = channel(next("blue")?, "blue")?;
        if fields.next().is_some() {
            return Err(malformed(format!("trailing data in {token:?}")));
        }
        records.push(DeltaRecord::new(index, Rgb::new(r, g, b)));
    }
    Ok(())
}

/// Appends `.ext` unless the path already ends with it (case-insensitive).
pub fn with_extension(path: &Path, ext: &str) -> PathBuf {
    let has = path
        .extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case(ext));
    if has {
        path.to_path_buf()
    } else {
        let mut name = path.as_os_str().to_os_string();
        name.push(".");
        name.push(ext);
        PathBuf::from(name)
    }
}

/// Opens an animation file for reading, adding the `.ani` extension if missing.
pub fn open_animation(path: &Path) -> Result<AnimationReader<BufReader<File>>> {
    let path = with_extension(path, ANIMATION_EXTENSION);
    let file = File::open(&path)?;
    AnimationReader::new(BufReader::new(file))
}

/// Creates (or truncates) an animation file, adding the `.ani` extension if missing.
pub fn create_animation(
    path: &Path,
    header: AnimationHeader,
) -> Result<AnimationWriter<BufWriter<File>>> {
    let path = with_extension(path, ANIMATION_EXTENSION);
    let file = File::create(&path)?;
    AnimationWriter::new(BufWriter::new(file), header)
}
