//! Opens the panel on a Raspberry Pi through spidev and the GPIO character device.

use anyhow::Context;
use linux_embedded_hal::{
    gpio_cdev::{Chip, LineRequestFlags},
    spidev::{SpiModeFlags, SpidevOptions},
    CdevPin, Delay, SpidevDevice,
};

use crate::config::DisplayConfig;
use crate::driver::PanelDriver;
use crate::epd2in13::driver::Epd2in13;

const SPI_SPEED_HZ: u32 = 4_000_000;

pub type HardwareDriver = PanelDriver<SpidevDevice, CdevPin, CdevPin, CdevPin, Delay>;

fn request_line(
    chip: &mut Chip,
    offset: u32,
    flags: LineRequestFlags,
    default: u8,
    name: &str,
) -> anyhow::Result<CdevPin> {
    let handle = chip
        .get_line(offset)
        .with_context(|| format!("getting {} line {}", name, offset))?
        .request(flags, default, &format!("epaper-{}", name.to_lowercase()))
        .with_context(|| format!("requesting {} line", name))?;
    CdevPin::new(handle).with_context(|| format!("creating {} pin", name))
}

/// Claim the SPI device and the RST, DC and BUSY lines.
/// CS is toggled by the spidev driver itself.
pub fn open(config: &DisplayConfig) -> anyhow::Result<HardwareDriver> {
    let mut spi = SpidevDevice::open(&config.spi_device)
        .with_context(|| format!("opening SPI device {}", config.spi_device.display()))?;
    let options = SpidevOptions::new()
        .bits_per_word(8)
        .max_speed_hz(SPI_SPEED_HZ)
        .mode(SpiModeFlags::SPI_MODE_0)
        .build();
    spi.configure(&options).context("configuring SPI")?;

    let mut chip = Chip::new(&config.gpio_chip)
        .with_context(|| format!("opening GPIO chip {}", config.gpio_chip.display()))?;
    let pins = config.pins;
    let busy = request_line(&mut chip, pins.busy, LineRequestFlags::INPUT, 0, "BUSY")?;
    let dc = request_line(&mut chip, pins.dc, LineRequestFlags::OUTPUT, 0, "DC")?;
    let rst = request_line(&mut chip, pins.rst, LineRequestFlags::OUTPUT, 1, "RST")?;

    let busy_timeout_ms = u32::try_from(config.busy_timeout.as_millis()).unwrap_or(u32::MAX);
    log::info!(
        "Opened {} and {} (RST {}, DC {}, BUSY {})",
        config.spi_device.display(),
        config.gpio_chip.display(),
        pins.rst,
        pins.dc,
        pins.busy
    );

    let epd = Epd2in13::new(spi, busy, dc, rst, Delay {}, busy_timeout_ms);
    Ok(PanelDriver::new(epd, config.settle_delay))
}
