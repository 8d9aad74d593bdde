//! Runtime configuration of the display stack.

use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use crate::epd2in13::pins::Pins;

/// Relative path of the text preview written by the simulated backend
pub const DEFAULT_PREVIEW_PATH: &str = "bmps/text_preview.bmp";
pub const DEFAULT_SPI_DEVICE: &str = "/dev/spidev0.0";
pub const DEFAULT_GPIO_CHIP: &str = "/dev/gpiochip0";
pub const DEFAULT_SETTLE_DELAY: Duration = Duration::from_secs(2);
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);
pub const DEFAULT_QUEUE_CAPACITY: usize = 8;

/// Everything the driver, session and worker need to know up front
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DisplayConfig {
    /// Wait after clearing and after pushing. The hardware backend never
    /// goes below its own minimum.
    pub settle_delay: Duration,
    /// Longest wait for the BUSY line to drop after a refresh
    pub busy_timeout: Duration,
    /// Where the simulated backend writes rendered text
    pub preview_path: PathBuf,
    pub spi_device: PathBuf,
    pub gpio_chip: PathBuf,
    pub pins: Pins,
    /// Requests waiting behind the one being displayed
    pub queue_capacity: usize,
    /// Use the simulated backend even on a Raspberry Pi
    pub force_simulated: bool,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        DisplayConfig {
            settle_delay: DEFAULT_SETTLE_DELAY,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            preview_path: PathBuf::from(DEFAULT_PREVIEW_PATH),
            spi_device: PathBuf::from(DEFAULT_SPI_DEVICE),
            gpio_chip: PathBuf::from(DEFAULT_GPIO_CHIP),
            pins: Pins::HAT,
            queue_capacity: DEFAULT_QUEUE_CAPACITY,
            force_simulated: false,
        }
    }
}

impl DisplayConfig {
    /// Defaults overlaid with the `EPAPER_*` environment variables
    pub fn from_env() -> Self {
        Self::default().overlay(|key| std::env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Values that do not parse are logged
    /// and the current setting is kept.
    pub fn overlay<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(flag) = parse_var(&lookup, "EPAPER_SIMULATE", parse_flag) {
            self.force_simulated = flag;
        }
        if let Some(path) = lookup("EPAPER_PREVIEW_PATH").filter(|p| !p.trim().is_empty()) {
            self.preview_path = PathBuf::from(path);
        }
        if let Some(ms) = parse_var(&lookup, "EPAPER_SETTLE_MS", u64::from_str) {
            self.settle_delay = Duration::from_millis(ms);
        }
        match parse_var(&lookup, "EPAPER_QUEUE_CAPACITY", usize::from_str) {
            Some(0) => log::warn!("Ignoring EPAPER_QUEUE_CAPACITY=0, keeping {}", self.queue_capacity),
            Some(capacity) => self.queue_capacity = capacity,
            None => {}
        }
        self
    }

    pub fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    pub fn with_preview_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.preview_path = path.into();
        self
    }

    pub fn with_spi_device(mut self, path: impl Into<PathBuf>) -> Self {
        self.spi_device = path.into();
        self
    }

    pub fn with_gpio_chip(mut self, path: impl Into<PathBuf>) -> Self {
        self.gpio_chip = path.into();
        self
    }

    /// A capacity of zero is raised to one
    pub fn with_queue_capacity(mut self, capacity: usize) -> Self {
        self.queue_capacity = capacity.max(1);
        self
    }

    pub fn with_force_simulated(mut self, force: bool) -> Self {
        self.force_simulated = force;
        self
    }
}

fn parse_var<F, T, E>(lookup: &F, key: &str, parse: impl Fn(&str) -> Result<T, E>) -> Option<T>
where
    F: Fn(&str) -> Option<String>,
    E: core::fmt::Display,
{
    let raw = lookup(key)?;
    match parse(raw.trim()) {
        Ok(value) => Some(value),
        Err(e) => {
            log::warn!("Ignoring {}={:?}: {}", key, raw, e);
            None
        }
    }
}

fn parse_flag(raw: &str) -> Result<bool, String> {
    match raw.to_ascii_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => Err(format!("expected a boolean, got {:?}", other)),
    }
}
