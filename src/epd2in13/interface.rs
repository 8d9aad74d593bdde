//! Display interface using SPI
use crate::epd2in13::cmd::Cmd;
use crate::error::ProtocolError;
use display_interface::DisplayError;
use embedded_hal::{
    delay::DelayNs,
    digital::{InputPin, OutputPin},
    spi::SpiDevice,
};

const RESET_HIGH_MS: u32 = 200;
const RESET_LOW_MS: u32 = 10;
const BUSY_POLL_MS: u32 = 10;

/// Largest single SPI write
const CHUNK_SIZE: usize = 32;

/// The connection interface of the Waveshare 2.13" panel
pub struct DisplayInterface<SPI, BSY, DC, RST, DELAY> {
    /// SPI device
    spi: SPI,
    /// High for busy, wait until display is ready!
    busy: BSY,
    /// Data/Command Control Pin (High for data, Low for command)
    dc: DC,
    /// Pin for Reseting
    rst: RST,
    delay: DELAY,
    busy_timeout_ms: u32,
}

impl<SPI, BSY, DC, RST, DELAY> DisplayInterface<SPI, BSY, DC, RST, DELAY> {
    /// Create the interface; nothing is sent until [`Self::reset`]
    pub fn new(spi: SPI, busy: BSY, dc: DC, rst: RST, delay: DELAY, busy_timeout_ms: u32) -> Self {
        DisplayInterface {
            spi,
            busy,
            dc,
            rst,
            delay,
            busy_timeout_ms,
        }
    }
}

impl<SPI, BSY, DC, RST, DELAY> DisplayInterface<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice,
    RST: OutputPin,
    DC: OutputPin,
    BSY: InputPin,
    DELAY: DelayNs,
{
    /// Basic function for sending commands
    pub(crate) fn cmd(&mut self, command: u8) -> Result<(), DisplayError> {
        // low for commands
        self.dc.set_low().map_err(|_| DisplayError::DCError)?;

        match self.spi.write(&[command]) {
            Ok(_) => Ok(()),
            Err(e) => {
                log::error!("SPI write error for command 0x{:02X}: {:?}", command, e);
                Err(DisplayError::BusWriteError)
            }
        }
    }

    /// Basic function for sending an array of u8-values of data over spi
    pub(crate) fn data(&mut self, data: &[u8]) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;
        for chunk in data.chunks(CHUNK_SIZE) {
            self.spi
                .write(chunk)
                .map_err(|_| DisplayError::BusWriteError)?;
        }
        Ok(())
    }

    /// Basic function for sending a command and the data belonging to it.
    pub(crate) fn cmd_with_data(&mut self, command: u8, data: &[u8]) -> Result<(), DisplayError> {
        self.cmd(command)?;
        self.data(data)
    }

    /// Basic function for sending the same byte of data (one u8) multiple times over spi
    /// Used for setting one color for a whole row
    pub(crate) fn data_x_times(&mut self, val: u8, repetitions: u32) -> Result<(), DisplayError> {
        // high for data
        self.dc.set_high().map_err(|_| DisplayError::DCError)?;

        let buffer = [val; CHUNK_SIZE];
        let full_chunks = (repetitions as usize) / CHUNK_SIZE;
        let remainder = (repetitions as usize) % CHUNK_SIZE;

        for _ in 0..full_chunks {
            self.spi
                .write(&buffer)
                .map_err(|_| DisplayError::BusWriteError)?;
        }

        if remainder > 0 {
            self.spi
                .write(&buffer[0..remainder])
                .map_err(|_| DisplayError::BusWriteError)?;
        }
        Ok(())
    }

    /// Turn on the display with the loaded LUT and wait for the refresh to finish
    pub(crate) fn turn_on_display(&mut self, ctrl2: u8) -> Result<(), ProtocolError> {
        self.cmd_with_data(Cmd::UPDATE_DISPLAY_CTRL2, &[ctrl2])?;
        self.cmd(Cmd::MASTER_ACTIVATE)?;
        self.cmd(Cmd::TERMINATE_FRAME_READ_WRITE)?;
        self.wait_until_idle()
    }

    /// Wait for the busy pin to go LOW, bounded by the configured timeout
    pub(crate) fn wait_until_idle(&mut self) -> Result<(), ProtocolError> {
        let mut waited_ms = 0u32;
        loop {
            match self.busy.is_high() {
                Ok(false) => {
                    if waited_ms > 0 {
                        log::debug!("BUSY released after {} ms", waited_ms);
                    }
                    return Ok(());
                }
                Ok(true) if waited_ms >= self.busy_timeout_ms => {
                    log::error!("TIMEOUT waiting for BUSY pin to go LOW after {} ms", waited_ms);
                    return Err(ProtocolError::BusyTimeout { waited_ms });
                }
                Ok(true) => {
                    self.delay.delay_ms(BUSY_POLL_MS);
                    waited_ms = waited_ms.saturating_add(BUSY_POLL_MS);
                }
                Err(e) => {
                    log::error!("Error reading BUSY pin state: {:?}", e);
                    return Err(ProtocolError::BusyPin);
                }
            }
        }
    }

    /// Block for `ms` on the panel's own delay provider
    pub(crate) fn pause_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    /// Resets the device: high, low, high with the vendor timings
    pub(crate) fn reset(&mut self) -> Result<(), DisplayError> {
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_HIGH_MS);
        self.rst.set_low().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_LOW_MS);
        self.rst.set_high().map_err(|_| DisplayError::RSError)?;
        self.delay.delay_ms(RESET_HIGH_MS);
        Ok(())
    }
}
