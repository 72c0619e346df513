//! Live clock: a time overlay and a temperature overlay kept current by the
//! task scheduler, plus remote control handling between ticks.

use crate::input::{InputEvent, InputSource, RemoteKey};
use crate::library::Library;
use crate::playback::{self, PlaybackReport};
use crate::scheduler::{next_minute, Scheduler, TaskLabel};
use crate::sensors::{ClockSource, TemperatureSource};
use crate::session::Session;
use anyhow::{Context, Result};
use chrono::{NaiveDateTime, Timelike};
use ledmatrix_core::color::{Rgb, ACCENT_PALETTE};
use ledmatrix_core::compositor;
use ledmatrix_core::OverlayMatrix;
use std::path::PathBuf;
use std::time::Duration;
use tracing::{debug, info, warn};

/// Timing and colors for the live clock.
#[derive(Debug, Clone)]
pub struct ClockSettings {
    pub accent: Rgb,
    pub temperature_interval: chrono::Duration,
    pub idle_sleep: Duration,
    pub notice: chrono::Duration,
    pub notice_color: Rgb,
}

impl ClockSettings {
    pub fn from_config(config: &crate::config::ClockConfig) -> Result<Self> {
        Ok(Self {
            accent: config.accent_color()?,
            temperature_interval: chrono::Duration::seconds(
                config.temperature_interval_secs as i64,
            ),
            idle_sleep: config.idle_sleep(),
            notice: chrono::Duration::seconds(config.notice_secs as i64),
            notice_color: config.notice_rgb()?,
        })
    }
}

/// The clock loop and everything it owns.
pub struct ClockDisplay<'a, C, T, I> {
    session: &'a mut Session,
    clock: C,
    sensor: T,
    input: I,
    library: Library,
    settings: ClockSettings,
    scheduler: Scheduler,
    time: OverlayMatrix,
    temperature: OverlayMatrix,
    accent_index: usize,
    accent: Rgb,
    notice_active: bool,
}

impl<'a, C, T, I> ClockDisplay<'a, C, T, I>
where
    C: ClockSource,
    T: TemperatureSource,
    I: InputSource,
{
    pub fn new(
        session: &'a mut Session,
        clock: C,
        sensor: T,
        input: I,
        library: Library,
        settings: ClockSettings,
    ) -> Self {
        let side = session.side_length();
        // Start the palette cursor on the configured accent if it is listed.
        let accent_index = ACCENT_PALETTE
            .iter()
            .position(|(_, c)| *c == settings.accent)
            .unwrap_or(0);
        let accent = settings.accent;
        Self {
            session,
            clock,
            sensor,
            input,
            library,
            settings,
            scheduler: Scheduler::new(),
            time: OverlayMatrix::new(side),
            temperature: OverlayMatrix::new(side),
            accent_index,
            accent,
            notice_active: false,
        }
    }

    /// Runs until the surrounding future is dropped.
    pub async fn run(&mut self) -> Result<()> {
        let now = self.clock.now();
        self.start(now)?;
        loop {
            let now = self.clock.now();
            let handled = self.tick(now)?;
            if let Some(event) = self.input.try_next() {
                self.handle_event(event, now).await?;
            }
            if !handled {
                tokio::time::sleep(self.settings.idle_sleep).await;
            }
        }
    }

    /// Draws both overlays and queues their first refreshes.
    pub fn start(&mut self, now: NaiveDateTime) -> Result<()> {
        info!("Starting clock");
        self.refresh_time(now);
        self.refresh_temperature();
        self.scheduler.schedule(next_minute(now), TaskLabel::Time);
        self.scheduler
            .schedule(now + self.settings.temperature_interval, TaskLabel::Temperature);
        self.recompose()
    }

    /// Runs at most one due task. Returns whether one ran.
    pub fn tick(&mut self, now: NaiveDateTime) -> Result<bool> {
        let Some(card) = self.scheduler.pop_due(now) else {
            return Ok(false);
        };
        debug!("Running task {}", card.label);

        match card.label {
            TaskLabel::Time => {
                self.refresh_time(now);
                self.scheduler.schedule(next_minute(now), TaskLabel::Time);
                self.recompose()?;
            }
            TaskLabel::Temperature => {
                self.refresh_temperature();
                self.scheduler
                    .schedule(now + self.settings.temperature_interval, TaskLabel::Temperature);
                self.recompose()?;
            }
            TaskLabel::PrintDone => {
                info!("Print finished");
                self.notice_active = true;
                self.session
                    .fill(self.settings.notice_color)
                    .context("Failed to show print notice")?;
                self.scheduler
                    .schedule(now + self.settings.notice, TaskLabel::Redraw);
            }
            TaskLabel::Redraw => {
                self.notice_active = false;
                self.recompose()?;
            }
        }
        Ok(true)
    }

    /// Reacts to one input event. Returns the report of any animation played.
    pub async fn handle_event(
        &mut self,
        event: InputEvent,
        now: NaiveDateTime,
    ) -> Result<Option<PlaybackReport>> {
        let key = match event {
            InputEvent::PrintDone => {
                self.scheduler.schedule(now, TaskLabel::PrintDone);
                return Ok(None);
            }
            InputEvent::Key(key) => key,
        };
        debug!("Remote key {:?} ({})", key, key.code());

        let mut report = None;
        match key {
            RemoteKey::BrightnessUp => self.session.brightness_up()?,
            RemoteKey::BrightnessDown => self.session.brightness_down()?,
            RemoteKey::Off => self.session.set_brightness(0)?,
            RemoteKey::NextColor => {
                if self.accent_index + 1 < ACCENT_PALETTE.len() {
                    self.set_accent_index(self.accent_index + 1)?;
                }
            }
            RemoteKey::PreviousColor => {
                if self.accent_index > 0 {
                    self.set_accent_index(self.accent_index - 1)?;
                }
            }
            RemoteKey::NextAnimation => {
                let entry = self.library.next().map(PathBuf::from);
                report = self.play_entry(entry).await?;
            }
            RemoteKey::PreviousAnimation => {
                let entry = self.library.previous().map(PathBuf::from);
                report = self.play_entry(entry).await?;
            }
            RemoteKey::Replay => {
                let entry = self.library.current().map(PathBuf::from);
                report = self.play_entry(entry).await?;
            }
            RemoteKey::LoopToggle => report = self.loop_current().await?,
        }

        let dropped = self.input.drain();
        if dropped > 0 {
            debug!("Discarded {} queued events", dropped);
        }
        Ok(report)
    }

    fn set_accent_index(&mut self, index: usize) -> Result<()> {
        let (name, color) = ACCENT_PALETTE[index];
        self.accent_index = index;
        self.accent = color;
        info!("Clock color {} ({})", name, color);
        self.recompose()
    }

    fn refresh_time(&mut self, now: NaiveDateTime) {
        let (_, hour12) = now.hour12();
        self.time.render_time(hour12, now.minute());
    }

    fn refresh_temperature(&mut self) {
        let reading = self.sensor.read();
        debug!(
            "Temperature {}F, humidity {}%",
            reading.fahrenheit, reading.humidity
        );
        self.temperature.render_temperature(reading.fahrenheit);
    }

    /// Paints both overlays unless the print notice is up.
    fn recompose(&mut self) -> Result<()> {
        if self.notice_active {
            return Ok(());
        }
        let (map, sink) = self.session.parts_mut();
        compositor::compose(sink, &[&self.time, &self.temperature], map, self.accent)
            .context("Failed to compose clock")
    }

    /// Plays one library entry, then restores the clock face. A broken file
    /// is reported and skipped so the clock keeps running.
    async fn play_entry(&mut self, entry: Option<PathBuf>) -> Result<Option<PlaybackReport>> {
        let Some(path) = entry else {
            warn!("No animations in the library");
            return Ok(None);
        };
        // The key that got us here raised the flag on arrival.
        self.session.cancel().clear();
        let report = match playback::play_file(self.session, &path, None).await {
            Ok(report) => Some(report),
            Err(e) => {
                warn!("Skipping {}: {:#}", path.display(), e);
                None
            }
        };
        self.recompose()?;
        Ok(report)
    }

    /// Replays the current entry until the loop key is pressed again.
    async fn loop_current(&mut self) -> Result<Option<PlaybackReport>> {
        let Some(path) = self.library.current().map(PathBuf::from) else {
            warn!("No animations in the library");
            return Ok(None);
        };
        info!("Looping {}", path.display());
        self.input.drain();
        let mut last = None;
        loop {
            match self.input.try_next() {
                Some(InputEvent::Key(RemoteKey::LoopToggle)) => break,
                Some(other) => debug!("Ignoring {:?} while looping", other),
                None => {}
            }
            self.session.cancel().clear();
            match playback::play_file(self.session, &path, None).await {
                Ok(report) => last = Some(report),
                Err(e) => {
                    warn!("Stopping loop over {}: {:#}", path.display(), e);
                    break;
                }
            }
            // A pass over an empty file never suspends, so the listener
            // would otherwise starve.
            tokio::task::yield_now().await;
        }
        self.session.cancel().clear();
        self.recompose()?;
        Ok(last)
    }
}
