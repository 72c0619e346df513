//! Temperature and humidity from Linux IIO sysfs attributes.
//!
//! DHT-family sensors driven by the `dht11` kernel module expose
//! `in_temp_input` in milli-degrees Celsius and `in_humidityrelative_input`
//! in milli-percent. Reads fail intermittently on these parts, so a failure
//! simply repeats the last good temperature.

use super::{ClimateReading, TemperatureSource};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

/// Climate sensor backed by two sysfs files.
pub struct SysfsClimate {
    temperature_path: PathBuf,
    humidity_path: PathBuf,
    last_fahrenheit: i32,
}

impl SysfsClimate {
    /// Creates a sensor that reports `fallback_fahrenheit` until the first good read.
    pub fn new(temperature_path: &Path, humidity_path: &Path, fallback_fahrenheit: i32) -> Self {
        Self {
            temperature_path: temperature_path.to_path_buf(),
            humidity_path: humidity_path.to_path_buf(),
            last_fahrenheit: fallback_fahrenheit,
        }
    }

    fn read_milli(path: &Path) -> Option<i64> {
        let content = fs::read_to_string(path)
            .map_err(|e| debug!("Failed to read {}: {}", path.display(), e))
            .ok()?;
        content.trim().parse().ok()
    }
}

/// Converts milli-degrees Celsius to whole degrees Fahrenheit, truncating.
pub fn milli_celsius_to_fahrenheit(milli: i64) -> i32 {
    (milli as f64 / 1000.0 * 9.0 / 5.0 + 32.0) as i32
}

impl TemperatureSource for SysfsClimate {
    fn read(&mut self) -> ClimateReading {
        let temperature = Self::read_milli(&self.temperature_path);
        let humidity = Self::read_milli(&self.humidity_path);

        match (temperature, humidity) {
            (Some(t), Some(h)) => {
                let fahrenheit = milli_celsius_to_fahrenheit(t);
                self.last_fahrenheit = fahrenheit;
                ClimateReading {
                    fahrenheit,
                    humidity: (h / 1000).clamp(0, 100) as u8,
                }
            }
            _ => {
                debug!(
                    "Climate read failed, keeping {}F",
                    self.last_fahrenheit
                );
                ClimateReading {
                    fahrenheit: self.last_fahrenheit,
                    humidity: 0,
                }
            }
        }
    }
}
