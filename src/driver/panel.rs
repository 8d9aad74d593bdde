//! Real backend: the 2.13" panel protocol behind [`DisplayDriver`].

use std::time::Duration;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital::{InputPin, OutputPin};
use embedded_hal::spi::SpiDevice;

use crate::driver::{Backend, DisplayDriver, Frame};
use crate::epd2in13::driver::{Epd2in13, LutMode};
use crate::error::ProtocolError;

/// The panel needs this long after a refresh before the next command,
/// whatever the configuration says
pub const PANEL_SETTLE_MIN: Duration = Duration::from_secs(2);

pub struct PanelDriver<SPI, BSY, DC, RST, DELAY> {
    epd: Epd2in13<SPI, BSY, DC, RST, DELAY>,
    settle_delay: Duration,
}

impl<SPI, BSY, DC, RST, DELAY> PanelDriver<SPI, BSY, DC, RST, DELAY> {
    /// `settle_delay` is raised to [`PANEL_SETTLE_MIN`] if shorter
    pub fn new(epd: Epd2in13<SPI, BSY, DC, RST, DELAY>, settle_delay: Duration) -> Self {
        if settle_delay < PANEL_SETTLE_MIN {
            log::warn!(
                "Settle delay {:?} is below the panel minimum, using {:?}",
                settle_delay,
                PANEL_SETTLE_MIN
            );
        }
        PanelDriver {
            epd,
            settle_delay: settle_delay.max(PANEL_SETTLE_MIN),
        }
    }
}

impl<SPI, BSY, DC, RST, DELAY> DisplayDriver for PanelDriver<SPI, BSY, DC, RST, DELAY>
where
    SPI: SpiDevice + Send,
    RST: OutputPin + Send,
    DC: OutputPin + Send,
    BSY: InputPin + Send,
    DELAY: DelayNs + Send,
{
    fn backend(&self) -> Backend {
        Backend::Hardware
    }

    fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    fn settle(&mut self) {
        self.epd.settle(self.settle_delay);
    }

    fn init(&mut self, lut: LutMode) -> Result<(), ProtocolError> {
        self.epd.init(lut)
    }

    fn clear(&mut self, fill: u8) -> Result<(), ProtocolError> {
        self.epd.clear(fill)
    }

    fn push(&mut self, frame: &Frame) -> Result<(), ProtocolError> {
        log::info!(
            "Pushing {}x{} canvas ({} orientation)",
            frame.canvas.width(),
            frame.canvas.height(),
            frame.orientation
        );
        self.epd.display(&frame.buffer)
    }

    fn sleep(&mut self) -> Result<(), ProtocolError> {
        self.epd.sleep()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Orientation, Panel};
    use crate::codec;
    use crate::driver::FrameContent;
    use crate::epd2in13::cmd::Cmd;
    use crate::epd2in13::fakes::fake_epd;
    use crate::epd2in13::flag::Flag;
    use crate::epd2in13::BUFFER_LEN;
    use crate::layout;
    use crate::session::{EpaperDisplay, TextRequest};

    #[test]
    fn settle_delay_never_below_panel_minimum() {
        let (epd, bus) = fake_epd(Some(0), 100);
        let mut driver = PanelDriver::new(epd, Duration::ZERO);
        assert_eq!(driver.settle_delay(), PANEL_SETTLE_MIN);
        driver.settle();
        assert_eq!(bus.lock().unwrap().delays, vec![(0, 2000)]);

        let (epd, bus) = fake_epd(Some(0), 100);
        let mut driver = PanelDriver::new(epd, Duration::from_secs(3));
        assert_eq!(driver.settle_delay(), Duration::from_secs(3));
        driver.settle();
        assert_eq!(bus.lock().unwrap().delays, vec![(0, 3000)]);
    }

    #[test]
    fn text_session_reaches_the_bus_at_panel_geometry() {
        let (epd, bus) = fake_epd(Some(0), 100);
        let mut display = EpaperDisplay::new(Box::new(PanelDriver::new(epd, Duration::ZERO)));
        display.display_text(&TextRequest::new("Hi")).unwrap();

        let laid = layout::layout("Hi", 122, 250, true).unwrap();
        let expected = codec::encode(&laid.canvas, Panel::EPD_2IN13, Orientation::Native).unwrap();

        let bus = bus.lock().unwrap();
        let rows = bus.data_for(Cmd::WRITE_BW_DATA);
        assert_eq!(rows.len(), 500);
        assert!(rows.iter().all(|row| row.len() == 16));
        assert_eq!(rows[250..].concat(), expected);

        // one settle after the clear refresh, one after the push refresh
        assert_eq!(
            bus.long_delays(PANEL_SETTLE_MIN.as_millis() as u32),
            vec![
                (Some(Cmd::SET_RAMX_START_END), 2000),
                (Some(Cmd::DEEP_SLEEP_MODE), 2000)
            ]
        );
        assert_eq!(bus.command_bytes().last(), Some(&Cmd::DEEP_SLEEP_MODE));
    }

    #[test]
    fn protocol_steps_reach_the_bus() {
        let (epd, bus) = fake_epd(Some(0), 100);
        let mut driver = PanelDriver::new(epd, PANEL_SETTLE_MIN);
        let frame = Frame {
            canvas: Canvas::new(122, 250).unwrap(),
            orientation: Orientation::Native,
            buffer: vec![0x0F; BUFFER_LEN],
            content: FrameContent::Text {
                text: String::new(),
                fit: None,
            },
        };

        driver.init(LutMode::Full).unwrap();
        driver.clear(Flag::FILL_WHITE).unwrap();
        driver.push(&frame).unwrap();
        driver.sleep().unwrap();

        let bus = bus.lock().unwrap();
        let writes = bus.data_for(Cmd::WRITE_BW_DATA);
        assert_eq!(writes.len(), 500);
        assert!(writes[..250].iter().all(|row| row.iter().all(|b| *b == 0xFF)));
        assert!(writes[250..].iter().all(|row| row.iter().all(|b| *b == 0x0F)));
        assert_eq!(bus.command_bytes().last(), Some(&Cmd::DEEP_SLEEP_MODE));
    }
}
