//! LED Matrix Daemon
//!
//! Plays animations and itineraries on a serpentine LED matrix, or runs the
//! live clock with remote control.

mod cancel;
mod clock_display;
mod config;
mod input;
mod itinerary_player;
mod library;
mod playback;
mod remote;
mod scheduler;
mod sensors;
mod session;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use ledmatrix_core::{AddressMap, Itinerary, MemoryStrip, PixelSink, SerialStrip};
use std::path::{Path, PathBuf};
use tokio::sync::mpsc;
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use cancel::CancelFlag;
use clock_display::{ClockDisplay, ClockSettings};
use config::Config;
use input::{ChannelInput, InputEvent};
use library::Library;
use sensors::{LocalClock, SysfsClimate};
use session::Session;

const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

#[derive(Parser)]
#[command(name = "ledmatrixd")]
#[command(about = "Playback and live clock daemon for LED matrix panels")]
#[command(version)]
struct Cli {
    /// Configuration file
    #[arg(short, long, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    mode: Mode,
}

#[derive(Subcommand)]
enum Mode {
    /// Loop one animation until interrupted
    Play {
        /// Animation file (.ani extension optional)
        file: PathBuf,
    },
    /// Play a day-long itinerary, repeating daily
    Itinerary {
        /// Itinerary file (.iti extension optional)
        file: PathBuf,

        /// Start at the segment covering the current time of day
        #[arg(long)]
        align: bool,
    },
    /// Show the live clock and temperature
    Clock,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    // Setup logging
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env().add_directive("info".parse()?))
        .init();

    let cli = Cli::parse();
    let config = load_config(&cli.config)?;

    let map = AddressMap::new(config.side_length, config.panel_rotation()?);
    let sink = open_sink(&config, map.len())?;
    let cancel = CancelFlag::new();
    let mut session = Session::new(
        map,
        sink,
        config.brightness,
        config.max_brightness,
        cancel.clone(),
    );

    // Remote events; the sender lives in the listener task
    let (event_tx, event_rx) = mpsc::unbounded_channel::<InputEvent>();
    let _listener = if config.remote.enable {
        let socket = remote::bind(&config.remote.listen).await?;
        Some(remote::spawn_listener(socket, event_tx, cancel))
    } else {
        info!("Remote listener disabled");
        drop(event_tx);
        None
    };

    // Setup Unix signal handlers
    let mut sigterm = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())?;
    let mut sigint = tokio::signal::unix::signal(tokio::signal::unix::SignalKind::interrupt())?;

    let outcome = {
        let mode = run_mode(&mut session, &config, cli.mode, ChannelInput::new(event_rx));
        tokio::select! {
            result = mode => result,
            _ = sigterm.recv() => {
                info!("Received SIGTERM, shutting down");
                Ok(())
            }
            _ = sigint.recv() => {
                info!("Received SIGINT, shutting down");
                Ok(())
            }
        }
    };

    if let Err(e) = session.blank() {
        warn!("Failed to clear panel on exit: {}", e);
    }
    outcome
}

/// Loads the configuration. A missing file at the default path means
/// defaults; any other missing file is an error.
fn load_config(path: &Path) -> Result<Config> {
    if !path.exists() && path == Path::new(DEFAULT_CONFIG_PATH) {
        info!("No configuration at {}, using defaults", path.display());
        return Ok(Config::default());
    }
    let config = Config::load(path).context("Failed to load configuration")?;
    info!("Loaded configuration from: {}", path.display());
    Ok(config)
}

fn open_sink(config: &Config, count: usize) -> Result<Box<dyn PixelSink>> {
    if config.strip.is_headless() {
        info!("Headless mode, rendering {} pixels to memory", count);
        return Ok(Box::new(MemoryStrip::new(count)));
    }
    let strip = SerialStrip::open(
        &config.strip.device,
        config.strip.baud,
        count,
        config.brightness,
    )
    .with_context(|| format!("Failed to open LED strip at {}", config.strip.device))?;
    info!("LED strip on {} at {} baud", config.strip.device, config.strip.baud);
    Ok(Box::new(strip))
}

async fn run_mode(
    session: &mut Session,
    config: &Config,
    mode: Mode,
    input: ChannelInput,
) -> Result<()> {
    match mode {
        Mode::Play { file } => {
            playback::play_looped(session, &file, None).await?;
            Ok(())
        }
        Mode::Itinerary { file, align } => {
            let itinerary = Itinerary::load(&file)
                .with_context(|| format!("Failed to load itinerary {}", file.display()))?;
            info!(
                "Loaded itinerary {} ({} segments)",
                file.display(),
                itinerary.len()
            );
            itinerary_player::run(session, &itinerary, &LocalClock, align).await
        }
        Mode::Clock => {
            let library = match Library::scan(&config.library.directory) {
                Ok(library) => library,
                Err(e) => {
                    warn!("{:#}. Animation keys will do nothing.", e);
                    Library::default()
                }
            };
            let sensor = SysfsClimate::new(
                &config.sensor.temperature_path,
                &config.sensor.humidity_path,
                config.sensor.fallback_fahrenheit,
            );
            let settings = ClockSettings::from_config(&config.clock)?;
            let mut display =
                ClockDisplay::new(session, LocalClock, sensor, input, library, settings);
            display.run().await
        }
    }
}
