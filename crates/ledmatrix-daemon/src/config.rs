//! Configuration management.

use anyhow::{Context, Result};
use ledmatrix_core::color::Rgb;
use ledmatrix_core::{Rotation, DEFAULT_ROTATION, DEFAULT_SIDE_LENGTH};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Main configuration structure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Panel side length in pixels
    #[serde(default = "default_side_length")]
    pub side_length: u16,

    /// Mounting rotation in counter-clockwise quarter turns (0-3)
    #[serde(default = "default_rotation")]
    pub rotation: u8,

    /// Brightness at startup (0-255)
    #[serde(default = "default_brightness")]
    pub brightness: u8,

    /// Upper bound for the remote's brightness-up key
    #[serde(default = "default_max_brightness")]
    pub max_brightness: u8,

    /// LED strip configuration
    #[serde(default)]
    pub strip: StripConfig,

    /// Live clock configuration
    #[serde(default)]
    pub clock: ClockConfig,

    /// Temperature sensor configuration
    #[serde(default)]
    pub sensor: SensorConfig,

    /// Remote control listener configuration
    #[serde(default)]
    pub remote: RemoteConfig,

    /// Animation library configuration
    #[serde(default)]
    pub library: LibraryConfig,
}

/// LED strip configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StripConfig {
    /// Serial port path, or "headless" to render into memory only
    #[serde(default = "default_strip_device")]
    pub device: String,

    /// Serial baud rate
    #[serde(default = "default_baud")]
    pub baud: u32,
}

impl Default for StripConfig {
    fn default() -> Self {
        Self {
            device: default_strip_device(),
            baud: default_baud(),
        }
    }
}

impl StripConfig {
    /// True when no hardware should be opened.
    pub fn is_headless(&self) -> bool {
        self.device.eq_ignore_ascii_case("headless")
    }
}

/// Live clock configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClockConfig {
    /// Initial accent color (name or hex)
    #[serde(default = "default_accent")]
    pub accent: String,

    /// Seconds between temperature refreshes
    #[serde(default = "default_temperature_interval")]
    pub temperature_interval_secs: u64,

    /// Idle sleep when no task is due, in milliseconds
    #[serde(default = "default_idle_sleep")]
    pub idle_sleep_ms: u64,

    /// How long a print-done notice stays up, in seconds
    #[serde(default = "default_notice_secs")]
    pub notice_secs: u64,

    /// Fill color for the print-done notice
    #[serde(default = "default_notice_color")]
    pub notice_color: String,
}

impl Default for ClockConfig {
    fn default() -> Self {
        Self {
            accent: default_accent(),
            temperature_interval_secs: default_temperature_interval(),
            idle_sleep_ms: default_idle_sleep(),
            notice_secs: default_notice_secs(),
            notice_color: default_notice_color(),
        }
    }
}

impl ClockConfig {
    pub fn accent_color(&self) -> Result<Rgb> {
        self.accent
            .parse::<Rgb>()
            .with_context(|| format!("Invalid clock accent color: {}", self.accent))
    }

    pub fn notice_rgb(&self) -> Result<Rgb> {
        self.notice_color
            .parse::<Rgb>()
            .with_context(|| format!("Invalid notice color: {}", self.notice_color))
    }

    pub fn idle_sleep(&self) -> Duration {
        Duration::from_millis(self.idle_sleep_ms)
    }
}

/// Temperature sensor configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SensorConfig {
    /// sysfs file holding the temperature in milli-degrees Celsius
    #[serde(default = "default_temperature_path")]
    pub temperature_path: PathBuf,

    /// sysfs file holding relative humidity in milli-percent
    #[serde(default = "default_humidity_path")]
    pub humidity_path: PathBuf,

    /// Temperature shown until the first successful read
    #[serde(default = "default_fallback_fahrenheit")]
    pub fallback_fahrenheit: i32,
}

impl Default for SensorConfig {
    fn default() -> Self {
        Self {
            temperature_path: default_temperature_path(),
            humidity_path: default_humidity_path(),
            fallback_fahrenheit: default_fallback_fahrenheit(),
        }
    }
}

/// Remote control listener configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemoteConfig {
    /// Enable the UDP listener
    #[serde(default = "default_remote_enable")]
    pub enable: bool,

    /// Listen address (e.g., "0.0.0.0:12345")
    #[serde(default = "default_remote_listen")]
    pub listen: String,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            enable: default_remote_enable(),
            listen: default_remote_listen(),
        }
    }
}

/// Animation library configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LibraryConfig {
    /// Directory of `.ani` files the remote steps through
    #[serde(default = "default_library_directory")]
    pub directory: PathBuf,
}

impl Default for LibraryConfig {
    fn default() -> Self {
        Self {
            directory: default_library_directory(),
        }
    }
}

// Default value functions
fn default_side_length() -> u16 {
    DEFAULT_SIDE_LENGTH
}

fn default_rotation() -> u8 {
    DEFAULT_ROTATION
}

fn default_brightness() -> u8 {
    25
}

fn default_max_brightness() -> u8 {
    45
}

fn default_strip_device() -> String {
    "headless".to_string()
}

fn default_baud() -> u32 {
    115_200
}

fn default_accent() -> String {
    "#FF0000".to_string()
}

fn default_temperature_interval() -> u64 {
    10
}

fn default_idle_sleep() -> u64 {
    16
}

fn default_notice_secs() -> u64 {
    10
}

fn default_notice_color() -> String {
    "#00FF00".to_string()
}

fn default_temperature_path() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices/iio:device0/in_temp_input")
}

fn default_humidity_path() -> PathBuf {
    PathBuf::from("/sys/bus/iio/devices/iio:device0/in_humidityrelative_input")
}

fn default_fallback_fahrenheit() -> i32 {
    10
}

fn default_remote_enable() -> bool {
    true
}

fn default_remote_listen() -> String {
    "0.0.0.0:12345".to_string()
}

fn default_library_directory() -> PathBuf {
    PathBuf::from("random_gif_anis")
}

impl Config {
    /// Loads configuration from a TOML file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content =
            std::fs::read_to_string(path.as_ref()).context("Failed to read configuration file")?;
        let config: Config = toml::from_str(&content).context("Failed to parse configuration")?;
        config.validate()?;
        Ok(config)
    }

    #[cfg(test)]
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize configuration")?;
        std::fs::write(path.as_ref(), content).context("Failed to write configuration file")?;
        Ok(())
    }

    /// Rejects values that would only fail later at runtime.
    pub fn validate(&self) -> Result<()> {
        if self.side_length == 0 {
            anyhow::bail!("side_length must be positive");
        }
        self.panel_rotation()?;
        self.clock.accent_color()?;
        self.clock.notice_rgb()?;
        Ok(())
    }

    pub fn panel_rotation(&self) -> Result<Rotation> {
        Rotation::new(self.rotation).context("Invalid rotation")
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            side_length: default_side_length(),
            rotation: default_rotation(),
            brightness: default_brightness(),
            max_brightness: default_max_brightness(),
            strip: StripConfig::default(),
            clock: ClockConfig::default(),
            sensor: SensorConfig::default(),
            remote: RemoteConfig::default(),
            library: LibraryConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_file_uses_defaults() {
        let config: Config = toml::from_str("").unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.side_length, 16);
        assert_eq!(config.rotation, 3);
        assert_eq!(config.brightness, 25);
        assert_eq!(config.max_brightness, 45);
        assert!(config.strip.is_headless());
        assert_eq!(config.remote.listen, "0.0.0.0:12345");
    }

    #[test]
    fn test_partial_sections() {
        let config: Config = toml::from_str(
            r#"
            rotation = 0

            [strip]
            device = "/dev/ttyACM0"

            [clock]
            accent = "teal"
            "#,
        )
        .unwrap();
        assert_eq!(config.rotation, 0);
        assert_eq!(config.strip.device, "/dev/ttyACM0");
        assert_eq!(config.strip.baud, 115_200);
        assert_eq!(config.clock.accent_color().unwrap(), Rgb::new(0, 128, 128));
        assert_eq!(config.clock.notice_secs, 10);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        let mut config = Config {
            rotation: 4,
            ..Config::default()
        };
        assert!(config.validate().is_err());

        config.rotation = 1;
        config.clock.accent = "not-a-color".into();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_save_load_round_trip() {
        let path = std::env::temp_dir()
            .join(format!("ledmatrixd-config-{}.toml", std::process::id()));
        let config = Config {
            brightness: 40,
            ..Config::default()
        };
        config.save(&path).unwrap();
        let loaded = Config::load(&path).unwrap();
        std::fs::remove_file(&path).ok();
        assert_eq!(loaded, config);
    }
}
