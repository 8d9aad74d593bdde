//! Backend-polymorphic display driver.
//!
//! The session orchestrator only ever talks to a [`DisplayDriver`]. Which one
//! it gets is decided once, by [`select`], from the hardware probe result.

pub mod panel;
pub mod simulated;

#[cfg(target_os = "linux")]
pub mod hardware;

use std::path::PathBuf;
use std::time::Duration;

use crate::canvas::{Canvas, Orientation};
use crate::config::DisplayConfig;
use crate::epd2in13::driver::LutMode;
use crate::error::ProtocolError;
use crate::layout::FontFit;

pub use panel::PanelDriver;
pub use simulated::SimulatedDriver;

/// Which implementation is behind a [`DisplayDriver`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Backend {
    Hardware,
    Simulated,
}

impl core::fmt::Display for Backend {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Backend::Hardware => write!(f, "hardware"),
            Backend::Simulated => write!(f, "simulated"),
        }
    }
}

/// What a frame was produced from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FrameContent {
    Bitmap { path: PathBuf },
    Text { text: String, fit: Option<FontFit> },
}

/// Everything `push` needs: the canvas, the push path it was produced for
/// and its encoded framebuffer
#[derive(Debug, Clone)]
pub struct Frame {
    pub canvas: Canvas,
    pub orientation: Orientation,
    pub buffer: Vec<u8>,
    pub content: FrameContent,
}

/// Protocol steps of the panel. Both backends take the same inputs and
/// report failures the same way.
pub trait DisplayDriver: Send {
    fn backend(&self) -> Backend;

    /// Wait required after clearing and after pushing
    fn settle_delay(&self) -> Duration;

    /// Block for [`Self::settle_delay`] so the panel can finish a refresh
    fn settle(&mut self);

    fn init(&mut self, lut: LutMode) -> Result<(), ProtocolError>;

    fn clear(&mut self, fill: u8) -> Result<(), ProtocolError>;

    fn push(&mut self, frame: &Frame) -> Result<(), ProtocolError>;

    fn sleep(&mut self) -> Result<(), ProtocolError>;
}

/// Pick the driver for this process.
///
/// Falls back to the simulated driver when the probe found no panel, when
/// simulation is forced, or when the hardware cannot be opened.
pub fn select(config: &DisplayConfig, hardware_present: bool) -> Box<dyn DisplayDriver> {
    if config.force_simulated {
        log::info!("Simulation forced by configuration");
        return Box::new(SimulatedDriver::new(config));
    }

    if !hardware_present {
        log::info!("Not running on a Raspberry Pi - e-paper display functionality will be simulated");
        return Box::new(SimulatedDriver::new(config));
    }

    match open_hardware(config) {
        Ok(driver) => {
            log::info!("Running on Raspberry Pi with e-paper support");
            driver
        }
        Err(e) => {
            log::error!("Failed to open e-paper hardware, simulating instead: {:#}", e);
            Box::new(SimulatedDriver::new(config))
        }
    }
}

#[cfg(target_os = "linux")]
fn open_hardware(config: &DisplayConfig) -> anyhow::Result<Box<dyn DisplayDriver>> {
    Ok(Box::new(hardware::open(config)?))
}

#[cfg(not(target_os = "linux"))]
fn open_hardware(_config: &DisplayConfig) -> anyhow::Result<Box<dyn DisplayDriver>> {
    anyhow::bail!("e-paper hardware access is only implemented for Linux")
}
