//! LED Matrix Animation Tool
//!
//! Turns images, text, gifs, procedural effects and clock faces into
//! delta-encoded `.ani` files, builds day-long `.iti` itineraries, and looks
//! inside existing animations.

mod inspect;
mod itinerary;
mod rng;
mod sources;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use ledmatrix_core::color::named_color;
use ledmatrix_core::container::{self, ANIMATION_EXTENSION};
use ledmatrix_core::pipeline::FrameList;
use ledmatrix_core::{
    encode_animation, AddressMap, AnimationHeader, AnimationKind, EncodeMode, EncodeStats, Fps,
    FrameSource, Rgb, Rotation, DEFAULT_ROTATION, DEFAULT_SIDE_LENGTH,
};
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

use rng::Rng;
use sources::clock::{centered_col, CLOCK_FPS};
use sources::{ClockFaceSource, EffectKind, EffectSource, EffectTunables, GifOptions, PixelStyle};

#[derive(Parser)]
#[command(name = "ledani")]
#[command(about = "Authoring tool for LED matrix animations")]
#[command(version)]
struct Cli {
    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,

    /// Pixels per side of the panel
    #[arg(long, default_value_t = DEFAULT_SIDE_LENGTH)]
    side_length: u16,

    /// Mounting rotation in counter-clockwise quarter turns (0-3)
    #[arg(long, default_value_t = DEFAULT_ROTATION)]
    rotation: u8,

    /// Write every pixel of every frame instead of only the changes
    #[arg(long)]
    full_frames: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Encode a folder of images, one frame each
    Images {
        /// Folder holding the images
        dir: PathBuf,

        /// Use 1.png through N.png instead of every file in name order
        #[arg(long)]
        count: Option<u32>,

        /// Frames per second
        #[arg(long, default_value_t = 10.0)]
        fps: f64,

        /// Output file (.ani extension optional)
        #[arg(short, long)]
        output: PathBuf,

        /// Warm up the colors
        #[arg(long)]
        warm: bool,
    },
    /// Spell out text, one character per frame
    Text {
        /// Text to show
        text: String,

        /// Folder of glyph images (A.png, al.png, space.png, ...)
        #[arg(long, default_value = "Alphabet")]
        glyphs: PathBuf,

        /// Color name (red, green, ..., navy) or #RRGGBB
        #[arg(long, default_value = "white", value_parser = parse_color)]
        color: Rgb,

        /// Frames per second
        #[arg(long, default_value_t = 2.0)]
        fps: f64,

        /// Output file (.ani extension optional)
        #[arg(short, long)]
        output: PathBuf,

        /// Warm up the colors
        #[arg(long)]
        warm: bool,
    },
    /// Convert an animated gif, or every gif in a folder
    Gif {
        /// Gif file, or a folder of gifs converted to sibling .ani files
        input: PathBuf,

        /// Output file for a single gif (defaults to the input with .ani)
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Override the gif's frame rate
        #[arg(long)]
        fps: Option<f64>,

        /// Append an all-black frame
        #[arg(long)]
        black_frame: bool,

        /// Collapse upscaled pixel art to one color per cell
        #[arg(long)]
        remove_grid: bool,

        /// Warm up the colors
        #[arg(long)]
        warm: bool,
    },
    /// Generate a procedural effect
    Effect {
        /// Which effect
        #[arg(value_enum)]
        kind: EffectKind,

        /// Length in seconds
        #[arg(long, default_value_t = 60)]
        seconds: u32,

        /// Frames per second
        #[arg(long, default_value_t = 10.0)]
        fps: f64,

        /// Output file (.ani extension optional)
        #[arg(short, long)]
        output: PathBuf,

        /// Random seed (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,

        #[command(flatten)]
        tunables: EffectTunables,
    },
    /// Render a day of clock faces, one per minute
    Clock {
        /// Output file (.ani extension optional)
        #[arg(short, long)]
        output: PathBuf,

        /// Color name (red, green, ..., navy) or #RRGGBB
        #[arg(long, default_value = "red", value_parser = parse_color)]
        color: Rgb,

        /// Center the face horizontally on wide panels
        #[arg(long, conflicts_with_all = ["row_offset", "col_offset"])]
        center: bool,

        /// Rows to shift the face down
        #[arg(long, default_value_t = 0)]
        row_offset: usize,

        /// Columns to shift the face right
        #[arg(long, default_value_t = 0)]
        col_offset: usize,
    },
    /// Build a day-long itinerary
    Itinerary {
        /// Output file (.iti extension optional)
        #[arg(short, long)]
        output: PathBuf,

        /// Window as PATH=SECONDS, in order; must add up to a day
        #[arg(long = "entry", value_parser = itinerary::parse_entry, conflicts_with = "random")]
        entries: Vec<(PathBuf, u32)>,

        /// Fill the day with random picks from this folder of .ani files
        #[arg(long)]
        random: Option<PathBuf>,

        /// Random seed (defaults to the clock)
        #[arg(long)]
        seed: Option<u64>,
    },
    /// Encode a single still image
    SingleImage {
        /// Image file
        file: PathBuf,

        /// Output file (.ani extension optional)
        #[arg(short, long)]
        output: PathBuf,

        /// Warm up the colors
        #[arg(long)]
        warm: bool,
    },
    /// Show header and delta statistics of an animation
    Inspect {
        /// Animation file (.ani extension optional)
        file: PathBuf,

        /// Print JSON instead of text
        #[arg(long)]
        json: bool,
    },
    /// Render one frame of an animation to a PNG
    Preview {
        /// Animation file (.ani extension optional)
        file: PathBuf,

        /// Zero-based frame to render
        #[arg(long, default_value_t = 0)]
        frame: u32,

        /// Output PNG
        #[arg(short, long, default_value = "preview.png")]
        output: PathBuf,

        /// Screen pixels per panel pixel
        #[arg(long, default_value_t = 16)]
        scale: u32,
    },
}

/// Accepts a palette name or `#RRGGBB`.
fn parse_color(s: &str) -> Result<Rgb, String> {
    named_color(s)
        .or_else(|| s.parse::<Rgb>().ok())
        .ok_or_else(|| format!("unknown color {:?}", s))
}

/// Encoding settings shared by every authoring command.
struct Encoder {
    map: AddressMap,
    mode: EncodeMode,
}

impl Encoder {
    fn new(cli: &Cli) -> Result<Self> {
        let rotation = Rotation::new(cli.rotation)?;
        let mode = if cli.full_frames {
            EncodeMode::Full
        } else {
            EncodeMode::Delta
        };
        Ok(Self {
            map: AddressMap::new(cli.side_length, rotation),
            mode,
        })
    }

    fn side(&self) -> u16 {
        self.map.side_length()
    }

    /// Encodes `source` to `output`, adding the `.ani` extension if missing.
    fn write<S: FrameSource + ?Sized>(
        &self,
        source: &mut S,
        fps: f64,
        kind: AnimationKind,
        output: &Path,
    ) -> Result<EncodeStats> {
        let header = AnimationHeader::new(Fps::new(fps)?, source.frame_count(), kind, self.side());
        let path = container::with_extension(output, ANIMATION_EXTENSION);
        let file =
            File::create(&path).with_context(|| format!("Failed to create {}", path.display()))?;

        let (mut out, stats) =
            encode_animation(source, header, BufWriter::new(file), &self.map, self.mode)
                .with_context(|| format!("Failed to encode {}", path.display()))?;
        out.flush()?;

        println!(
            "Wrote {} ({} frames, {} pixel updates)",
            path.display(),
            stats.frames,
            stats.records
        );
        Ok(stats)
    }
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Setup logging
    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::new("warn")
    };
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let encoder = Encoder::new(&cli)?;
    match cli.command {
        Command::Images {
            dir,
            count,
            fps,
            output,
            warm,
        } => {
            let paths = match count {
                Some(count) => sources::images::numbered_paths(&dir, count),
                None => sources::images::sorted_paths(&dir)?,
            };
            let style = PixelStyle { warm, tint: None };
            let mut frames = sources::images::load_sequence(&paths, encoder.side(), style)?;
            encoder.write(&mut frames, fps, AnimationKind::Images, &output)?;
        }
        Command::Text {
            text,
            glyphs,
            color,
            fps,
            output,
            warm,
        } => {
            let mut frames =
                sources::text::text_frames(&text, &glyphs, color, encoder.side(), warm)?;
            if frames.frame_count() == 0 {
                bail!("Nothing to show: no character of {:?} has a glyph", text);
            }
            encoder.write(&mut frames, fps, AnimationKind::Text, &output)?;
        }
        Command::Gif {
            input,
            output,
            fps,
            black_frame,
            remove_grid,
            warm,
        } => {
            let options = GifOptions {
                fps,
                black_frame,
                remove_grid,
                style: PixelStyle { warm, tint: None },
            };
            if input.is_dir() {
                if output.is_some() {
                    warn!("--output is ignored when converting a folder");
                }
                convert_gif_folder(&encoder, &input, options)?;
            } else {
                let output = output.unwrap_or_else(|| input.with_extension(ANIMATION_EXTENSION));
                convert_gif(&encoder, &input, &output, options)?;
            }
        }
        Command::Effect {
            kind,
            seconds,
            fps,
            output,
            seed,
            tunables,
        } => {
            let frames = (seconds as f64 * fps).round() as u32;
            if frames == 0 {
                bail!("{}s at {} fps is not a single frame", seconds, fps);
            }
            let rng = seeded(seed);
            let mut source = EffectSource::new(kind, encoder.side(), frames, tunables, rng);
            encoder.write(&mut source, fps, AnimationKind::Effect, &output)?;
        }
        Command::Clock {
            output,
            color,
            center,
            row_offset,
            col_offset,
        } => {
            let (row, col) = if center {
                (0, centered_col(encoder.side()))
            } else {
                (row_offset, col_offset)
            };
            debug!("Clock face at row {}, column {}", row, col);
            let mut source = ClockFaceSource::new(encoder.side(), color, row, col)?;
            encoder.write(&mut source, CLOCK_FPS, AnimationKind::Clock, &output)?;
        }
        Command::Itinerary {
            output,
            entries,
            random,
            seed,
        } => {
            let plan = match random {
                Some(dir) => {
                    let loops = itinerary::scan_loops(&dir)?;
                    itinerary::random_fill(&loops, &mut seeded(seed))?
                }
                None if entries.is_empty() => {
                    bail!("Give --entry PATH=SECONDS windows or --random FOLDER")
                }
                None => itinerary::from_entries(&entries)?,
            };
            let path = itinerary::save(&plan, &output)?;
            println!("Wrote {} ({} segments)", path.display(), plan.len());
        }
        Command::SingleImage { file, output, warm } => {
            let style = PixelStyle { warm, tint: None };
            let frame = sources::raster::load_frame(&file, encoder.side(), style)?;
            let mut frames = FrameList::new(encoder.side(), vec![frame]);
            encoder.write(&mut frames, 1.0, AnimationKind::SingleImage, &output)?;
        }
        Command::Inspect { file, json } => {
            let report = inspect::inspect(&file)?;
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                print!("{}", report.to_text());
            }
        }
        Command::Preview {
            file,
            frame,
            output,
            scale,
        } => {
            let reader = container::open_animation(&file)
                .with_context(|| format!("Failed to open {}", file.display()))?;
            let map = AddressMap::new(reader.header().side_length, Rotation::new(cli.rotation)?);
            let picture = inspect::reconstruct(reader, &map, frame)?;
            let png = inspect::frame_png(&picture, scale)?;
            std::fs::write(&output, png)
                .with_context(|| format!("Failed to write {}", output.display()))?;
            println!("Frame {} saved to: {}", frame, output.display());
        }
    }

    Ok(())
}

fn seeded(seed: Option<u64>) -> Rng {
    match seed {
        Some(seed) => Rng::new(seed),
        None => {
            let rng = Rng::from_time();
            info!("Seeded from the clock");
            rng
        }
    }
}

fn convert_gif(encoder: &Encoder, input: &Path, output: &Path, options: GifOptions) -> Result<()> {
    let mut decoded = sources::gif::decode(input, encoder.side(), options)?;
    encoder.write(
        &mut decoded.frames,
        decoded.fps.get(),
        AnimationKind::Gif,
        output,
    )?;
    Ok(())
}

/// Converts every `.gif` in `dir` to a sibling `.ani`. A gif that fails to
/// convert is reported and skipped.
fn convert_gif_folder(encoder: &Encoder, dir: &Path, options: GifOptions) -> Result<()> {
    let mut gifs = Vec::new();
    for entry in std::fs::read_dir(dir)
        .with_context(|| format!("Failed to read gif folder {}", dir.display()))?
    {
        let path = entry?.path();
        let is_gif = path
            .extension()
            .and_then(|e| e.to_str())
            .is_some_and(|e| e.eq_ignore_ascii_case("gif"));
        if is_gif {
            gifs.push(path);
        }
    }
    gifs.sort();
    if gifs.is_empty() {
        bail!("No gifs in {}", dir.display());
    }

    let mut failed = 0;
    for gif in &gifs {
        let output = gif.with_extension(ANIMATION_EXTENSION);
        if let Err(e) = convert_gif(encoder, gif, &output, options) {
            warn!("Skipping {}: {:#}", gif.display(), e);
            failed += 1;
        }
    }
    println!("Converted {}/{} gifs", gifs.len() - failed, gifs.len());
    Ok(())
}
