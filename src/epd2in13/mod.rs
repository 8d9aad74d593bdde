//! Waveshare 2.13" ePaper Display Driver
//!
//! Used in the [Waveshare 2.13inch e-Paper HAT](https://www.waveshare.com/wiki/2.13inch_e-Paper_HAT)
//! (first revision, 122×250, black/white).
//!
//! This driver is losely modeled after the
//! [epd-waveshare](https://github.com/caemor/epd-waveshare) drivers and the
//! vendor Python reference, built on `embedded-hal` 1.0 so it runs over
//! Linux spidev/gpio-cdev as well as test fakes.
//!
//! ### Usage
//! 1. [`driver::Epd2in13::init`] with [`driver::LutMode::Full`]
//! 1. [`driver::Epd2in13::clear`] to a fill byte
//! 1. [`driver::Epd2in13::display`] an encoded framebuffer (see [`crate::codec`])
//! 1. [`driver::Epd2in13::sleep`]

pub mod cmd;
pub mod driver;
pub mod flag;
pub mod interface;
pub mod pins;

/// Display width, pixels horizontally
pub const WIDTH: u16 = 122;

/// Display height, pixels vertically
pub const HEIGHT: u16 = 250;

/// Bytes per RAM row, the last one partially used
pub const LINE_WIDTH: u32 = (WIDTH as u32).div_ceil(8);

/// Size of a full framebuffer
pub const BUFFER_LEN: usize = LINE_WIDTH as usize * HEIGHT as usize;

#[cfg(test)]
pub(crate) mod fakes {
    //! Recording stand-ins for the SPI bus and the control pins.

    use core::convert::Infallible;
    use embedded_hal::delay::DelayNs;
    use embedded_hal::digital::{ErrorType as PinErrorType, InputPin, OutputPin};
    use embedded_hal::spi::{ErrorType as SpiErrorType, Operation, SpiDevice};
    use std::sync::{Arc, Mutex};

    /// Commands seen on the bus, each with the data bytes that followed it
    #[derive(Debug, Default)]
    pub struct Bus {
        dc_high: bool,
        pub commands: Vec<(u8, Vec<u8>)>,
        pub resets: u32,
        /// Each delay in ms, with the number of commands sent before it
        pub delays: Vec<(usize, u32)>,
    }

    impl Bus {
        pub fn command_bytes(&self) -> Vec<u8> {
            self.commands.iter().map(|(cmd, _)| *cmd).collect()
        }

        /// Delays of at least `min_ms`, keyed by the command that followed
        pub fn long_delays(&self, min_ms: u32) -> Vec<(Option<u8>, u32)> {
            self.delays
                .iter()
                .filter(|(_, ms)| *ms >= min_ms)
                .map(|(sent, ms)| (self.commands.get(*sent).map(|(cmd, _)| *cmd), *ms))
                .collect()
        }

        pub fn data_for(&self, cmd: u8) -> Vec<&[u8]> {
            self.commands
                .iter()
                .filter(|(c, _)| *c == cmd)
                .map(|(_, data)| data.as_slice())
                .collect()
        }
    }

    pub type SharedBus = Arc<Mutex<Bus>>;

    pub struct FakeSpi(pub SharedBus);

    impl SpiErrorType for FakeSpi {
        type Error = Infallible;
    }

    impl SpiDevice for FakeSpi {
        fn transaction(&mut self, operations: &mut [Operation<'_, u8>]) -> Result<(), Infallible> {
            let mut bus = self.0.lock().unwrap();
            for op in operations.iter() {
                if let Operation::Write(bytes) = op {
                    if bus.dc_high {
                        if let Some((_, data)) = bus.commands.last_mut() {
                            data.extend_from_slice(bytes);
                        }
                    } else {
                        for byte in bytes.iter() {
                            bus.commands.push((*byte, Vec::new()));
                        }
                    }
                }
            }
            Ok(())
        }
    }

    pub struct FakeDc(pub SharedBus);

    impl PinErrorType for FakeDc {
        type Error = Infallible;
    }

    impl OutputPin for FakeDc {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.lock().unwrap().dc_high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.0.lock().unwrap().dc_high = true;
            Ok(())
        }
    }

    pub struct FakeRst(pub SharedBus);

    impl PinErrorType for FakeRst {
        type Error = Infallible;
    }

    impl OutputPin for FakeRst {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.0.lock().unwrap().resets += 1;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            Ok(())
        }
    }

    /// Reports busy for `busy_reads` polls, then idle. `None` stays busy forever.
    pub struct FakeBusy {
        pub busy_reads: Option<u32>,
    }

    impl PinErrorType for FakeBusy {
        type Error = Infallible;
    }

    impl InputPin for FakeBusy {
        fn is_high(&mut self) -> Result<bool, Infallible> {
            match self.busy_reads.as_mut() {
                None => Ok(true),
                Some(0) => Ok(false),
                Some(n) => {
                    *n -= 1;
                    Ok(true)
                }
            }
        }

        fn is_low(&mut self) -> Result<bool, Infallible> {
            self.is_high().map(|high| !high)
        }
    }

    /// Returns at once, logging every requested delay on the bus
    pub struct FakeDelay(pub SharedBus);

    impl FakeDelay {
        fn record(&mut self, ms: u32) {
            let mut bus = self.0.lock().unwrap();
            let sent = bus.commands.len();
            bus.delays.push((sent, ms));
        }
    }

    impl DelayNs for FakeDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.record(ns / 1_000_000);
        }

        fn delay_ms(&mut self, ms: u32) {
            self.record(ms);
        }
    }

    pub type FakeEpd = super::driver::Epd2in13<FakeSpi, FakeBusy, FakeDc, FakeRst, FakeDelay>;

    pub fn fake_epd(busy_reads: Option<u32>, busy_timeout_ms: u32) -> (FakeEpd, SharedBus) {
        let bus = SharedBus::default();
        let epd = super::driver::Epd2in13::new(
            FakeSpi(bus.clone()),
            FakeBusy { busy_reads },
            FakeDc(bus.clone()),
            FakeRst(bus.clone()),
            FakeDelay(bus.clone()),
            busy_timeout_ms,
        );
        (epd, bus)
    }
}
