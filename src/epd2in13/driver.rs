//! Waveshare 2.13" (V1) Display Driver Implementation
//!
//! High level protocol for the panel controller: init with a LUT, clear to a
//! fill byte, write a framebuffer, deep sleep.
//!
//! ## Critical Implementation Details
//!
//! ### Window and cursor
//!
//! The controller is driven with data entry mode X+/Y+, a full RAM window and a
//! cursor reset before every row. Rows are [`LINE_WIDTH`] bytes; the last byte
//! of each row carries 6 padding bits (122 = 15 * 8 + 2).
//!
//! ### Polarity
//!
//! - `1` bit = white pixel
//! - `0` bit = black pixel
//!
//! ### BUSY Pin Wait
//!
//! After `MASTER_ACTIVATE` the driver **must** wait for BUSY to go LOW. A full
//! refresh takes 2-3 seconds on this panel.

use core::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::epd2in13::interface::DisplayInterface;
use crate::epd2in13::{cmd::Cmd, flag::Flag, BUFFER_LEN, HEIGHT, LINE_WIDTH, WIDTH};
use crate::error::ProtocolError;

/// Lookup-table refresh profile loaded by [`Epd2in13::init`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LutMode {
    /// Full refresh: flashes the panel, no ghosting
    #[default]
    Full,
}

impl LutMode {
    /// Full update waveform from the vendor reference driver
    const LUT_FULL_UPDATE: [u8; 30] = [
        0x22, 0x55, 0xAA, 0x55, 0xAA, 0x55, 0xAA, 0x11, // VS phases
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, // VS phases (unused)
        0x1E, 0x1E, 0x1E, 0x1E, 0x1E, 0x1E, 0x1E, 0x1E, // TP phase lengths
        0x01, 0x00, 0x00, 0x00, 0x00, 0x00, // TP phase lengths
    ];

    /// Waveform bytes for the `WRITE_LUT_REGISTER` command
    pub fn table(self) -> &'static [u8] {
        match self {
            LutMode::Full => &Self::LUT_FULL_UPDATE,
        }
    }
}

impl core::fmt::Display for LutMode {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            LutMode::Full => write!(f, "full"),
        }
    }
}

/// Waveshare 2.13" E-Paper Display Driver
///
/// ## Type Parameters
///
/// - `SPI` - SPI device for communication
/// - `BSY` - BUSY input pin (HIGH when display is busy)
/// - `DC` - Data/Command output pin
/// - `RST` - Reset output pin
/// - `DELAY` - Delay provider for timing
pub struct Epd2in13<SPI, BSY, DC, RST, DELAY> {
    /// The display interface
    pub interface: DisplayInterface<SPI, BSY, DC, RST, DELAY>,
}

impl<SPI, BSY, DC, RST, DELAY> Epd2in13<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Create the driver. The panel is left untouched until [`Self::init`].
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, delay: DELAY, busy_timeout_ms: u32) -> Self {
        let interface = DisplayInterface::new(spi, busy, dc, rst, delay, busy_timeout_ms);
        Epd2in13 { interface }
    }

    /// Hardware reset followed by the controller setup and LUT upload
    ///
    /// # Initialization Sequence
    ///
    /// 1. **Hardware Reset** - RST HIGH → LOW → HIGH
    /// 2. **Driver Output Control** (0x01) - 250 gate lines
    /// 3. **Booster Soft Start** (0x0C)
    /// 4. **VCOM** (0x2C)
    /// 5. **Dummy Line Period** (0x3A) and **Gate Time** (0x3B)
    /// 6. **Data Entry Mode** (0x11) - Y+, X+
    /// 7. **LUT** (0x32) - waveform for the requested mode
    pub fn init(&mut self, lut: LutMode) -> Result<(), ProtocolError> {
        log::info!("Initializing e-paper panel with {} update LUT", lut);

        self.interface.reset()?;

        let gates = HEIGHT - 1;
        self.interface.cmd_with_data(
            Cmd::DRIVER_OUTPUT_CONTROL,
            &[
                (gates & 0xFF) as u8,
                ((gates >> 8) & 0xFF) as u8,
                Flag::DRIVER_OUTPUT_GATE_SCAN_FROM_G0,
            ],
        )?;
        self.interface.cmd_with_data(
            Cmd::BOOSTER_SOFT_START_CONTROL,
            &[
                Flag::BOOSTER_SOFT_START_PHASE1,
                Flag::BOOSTER_SOFT_START_PHASE2,
                Flag::BOOSTER_SOFT_START_PHASE3,
            ],
        )?;
        self.interface
            .cmd_with_data(Cmd::WRITE_VCOM_REGISTER, &[Flag::VCOM_DEFAULT])?;
        self.interface
            .cmd_with_data(Cmd::SET_DUMMY_LINE_PERIOD, &[Flag::DUMMY_LINE_PERIOD])?;
        self.interface
            .cmd_with_data(Cmd::SET_GATE_TIME, &[Flag::GATE_TIME])?;
        self.interface
            .cmd_with_data(Cmd::DATA_ENTRY_MODE, &[Flag::DATA_ENTRY_INCRY_INCRX])?;

        self.set_lut(lut)?;

        log::info!("Panel initialization complete");
        Ok(())
    }

    /// Fill the whole RAM with `fill` and refresh
    ///
    /// `Flag::FILL_WHITE` (0xFF) gives a white panel.
    pub fn clear(&mut self, fill: u8) -> Result<(), ProtocolError> {
        log::info!("Clearing panel with fill 0x{:02X}", fill);
        self.use_full_frame()?;
        for y in 0..HEIGHT {
            self.set_ram_counter(0, y)?;
            self.interface.cmd(Cmd::WRITE_BW_DATA)?;
            self.interface.data_x_times(fill, LINE_WIDTH)?;
        }
        self.interface.turn_on_display(Flag::DISPLAY_UPDATE_FULL)
    }

    /// Write an encoded framebuffer of [`BUFFER_LEN`] bytes and refresh
    pub fn display(&mut self, buffer: &[u8]) -> Result<(), ProtocolError> {
        if buffer.len() != BUFFER_LEN {
            return Err(ProtocolError::BufferLength {
                expected: BUFFER_LEN,
                actual: buffer.len(),
            });
        }

        log::info!("Writing {} byte framebuffer to panel", buffer.len());
        self.use_full_frame()?;
        for (y, row) in (0..HEIGHT).zip(buffer.chunks(LINE_WIDTH as usize)) {
            self.set_ram_counter(0, y)?;
            self.interface.cmd_with_data(Cmd::WRITE_BW_DATA, row)?;
        }
        self.interface.turn_on_display(Flag::DISPLAY_UPDATE_FULL)
    }

    /// Put device into deep sleep mode to save power
    ///
    /// Only a hardware reset (done by [`Self::init`]) wakes it up again.
    pub fn sleep(&mut self) -> Result<(), ProtocolError> {
        log::info!("Putting display into deep sleep mode");
        self.interface
            .cmd_with_data(Cmd::DEEP_SLEEP_MODE, &[Flag::DEEP_SLEEP_MODE_1])?;
        Ok(())
    }

    /// Hold off further commands while the panel finishes a refresh
    pub fn settle(&mut self, delay: Duration) {
        let ms = u32::try_from(delay.as_millis()).unwrap_or(u32::MAX);
        log::debug!("Letting the panel settle for {} ms", ms);
        self.interface.pause_ms(ms);
    }

    /// Set the Look-Up Table (LUT) for the display
    fn set_lut(&mut self, lut: LutMode) -> Result<(), ProtocolError> {
        log::debug!("Setting {} LUT data", lut);
        self.interface
            .cmd_with_data(Cmd::WRITE_LUT_REGISTER, lut.table())?;
        Ok(())
    }

    fn use_full_frame(&mut self) -> Result<(), ProtocolError> {
        self.set_ram_area(0, 0, u32::from(WIDTH) - 1, u32::from(HEIGHT) - 1)
    }

    fn set_ram_area(
        &mut self,
        start_x: u32,
        start_y: u32,
        end_x: u32,
        end_y: u32,
    ) -> Result<(), ProtocolError> {
        // X is addressed in bytes
        self.interface.cmd_with_data(
            Cmd::SET_RAMX_START_END,
            &[(start_x >> 3) as u8, (end_x >> 3) as u8],
        )?;

        self.interface.cmd_with_data(
            Cmd::SET_RAMY_START_END,
            &[
                start_y as u8,
                (start_y >> 8) as u8,
                end_y as u8,
                (end_y >> 8) as u8,
            ],
        )?;
        Ok(())
    }

    fn set_ram_counter(&mut self, x: u32, y: u16) -> Result<(), ProtocolError> {
        // x is positioned in bytes, so the last 3 bits which show the position inside a byte in the ram
        // aren't relevant
        self.interface
            .cmd_with_data(Cmd::SET_RAMX_COUNTER, &[(x >> 3) as u8])?;

        // 2 Databytes: A[7:0] & 0..A[8]
        self.interface
            .cmd_with_data(Cmd::SET_RAMY_COUNTER, &[y as u8, (y >> 8) as u8])?;
        self.interface.wait_until_idle()
    }
}
