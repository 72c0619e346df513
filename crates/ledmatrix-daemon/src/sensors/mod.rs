//! Clock and climate sources for the live clock.

mod clock;
mod temperature;

pub use clock::LocalClock;
pub use temperature::SysfsClimate;

use chrono::NaiveDateTime;

/// A temperature sample. Humidity is 0 when the reading is a fallback.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClimateReading {
    pub fahrenheit: i32,
    pub humidity: u8,
}

/// Supplies the current wall-clock time.
pub trait ClockSource {
    /// Local time without a zone, as shown on the panel.
    fn now(&self) -> NaiveDateTime;
}

/// Supplies the current temperature.
pub trait TemperatureSource {
    /// Samples the sensor. Never fails; a failed read repeats the last value.
    fn read(&mut self) -> ClimateReading;
}
