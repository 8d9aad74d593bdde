//! Pin definitions for the Waveshare 2.13" e-Paper HAT on a Raspberry Pi
//!
//! Numbers are BCM line offsets on `/dev/gpiochip0`. Chip select (CE0)
//! belongs to the spidev device and is not listed here.

/// Pin configuration constants for the e-paper HAT
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pins {
    /// Reset pin for display
    pub rst: u32,
    /// Data/Command control pin (High for data, Low for command)
    pub dc: u32,
    /// Busy status pin (High when display is busy)
    pub busy: u32,
}

impl Pins {
    /// Reset pin for display
    pub const RST: u32 = 17;
    /// Data/Command control pin
    pub const DC: u32 = 25;
    /// Busy status pin
    pub const BSY: u32 = 24;

    /// Wiring of the stock HAT
    pub const HAT: Pins = Pins {
        rst: Self::RST,
        dc: Self::DC,
        busy: Self::BSY,
    };
}

impl Default for Pins {
    fn default() -> Self {
        Self::HAT
    }
}
