//! Simulated backend for hosts without the panel.
//!
//! Every protocol step is logged with the parameters the hardware would have
//! received. Text frames are also written to the preview path so the output
//! can be inspected.

use std::path::PathBuf;
use std::time::Duration;

use image::{ImageError, ImageFormat};

use crate::config::DisplayConfig;
use crate::driver::{Backend, DisplayDriver, Frame, FrameContent};
use crate::epd2in13::driver::LutMode;
use crate::error::ProtocolError;

#[derive(Debug)]
pub struct SimulatedDriver {
    preview_path: PathBuf,
    settle_delay: Duration,
}

impl SimulatedDriver {
    /// Uses the configured settle delay as is, so tests can run with none
    pub fn new(config: &DisplayConfig) -> Self {
        SimulatedDriver {
            preview_path: config.preview_path.clone(),
            settle_delay: config.settle_delay,
        }
    }

    fn write_preview(&self, frame: &Frame) -> Result<(), ProtocolError> {
        let preview_error = |source| ProtocolError::Preview {
            path: self.preview_path.clone(),
            source,
        };

        if let Some(parent) = self.preview_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| preview_error(ImageError::IoError(e)))?;
        }
        frame
            .canvas
            .to_luma()
            .save_with_format(&self.preview_path, ImageFormat::Bmp)
            .map_err(preview_error)?;

        log::info!("[sim] Text preview saved to: {}", self.preview_path.display());
        Ok(())
    }
}

impl DisplayDriver for SimulatedDriver {
    fn backend(&self) -> Backend {
        Backend::Simulated
    }

    fn settle_delay(&self) -> Duration {
        self.settle_delay
    }

    fn settle(&mut self) {
        if !self.settle_delay.is_zero() {
            log::info!("[sim] Waiting {:?} for the panel to settle", self.settle_delay);
            std::thread::sleep(self.settle_delay);
        }
    }

    fn init(&mut self, lut: LutMode) -> Result<(), ProtocolError> {
        log::info!("[sim] Would initialise the panel with the {} LUT", lut);
        Ok(())
    }

    fn clear(&mut self, fill: u8) -> Result<(), ProtocolError> {
        log::info!("[sim] Would clear the panel to 0x{:02X}", fill);
        Ok(())
    }

    fn push(&mut self, frame: &Frame) -> Result<(), ProtocolError> {
        log::info!(
            "[sim] Would push a {}x{} canvas ({} orientation, {} bytes)",
            frame.canvas.width(),
            frame.canvas.height(),
            frame.orientation,
            frame.buffer.len()
        );

        match &frame.content {
            FrameContent::Bitmap { path } => {
                log::info!("[sim] Would display image: {}", path.display());
                Ok(())
            }
            FrameContent::Text { text, fit } => {
                log::info!("[sim] Would display text: {:?}", text);
                match fit {
                    Some(fit) => log::info!(
                        "[sim] Text size: {}x{}, Font size: {}",
                        fit.width,
                        fit.height,
                        fit.font_size
                    ),
                    None => log::info!("[sim] Empty text, blank canvas"),
                }
                self.write_preview(frame)
            }
        }
    }

    fn sleep(&mut self) -> Result<(), ProtocolError> {
        log::info!("[sim] Would put the panel to sleep");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::canvas::{Canvas, Orientation, Panel};
    use crate::codec;
    use crate::layout;

    fn text_frame(text: &str) -> Frame {
        let laid = layout::layout(text, 122, 250, true).unwrap();
        let buffer = codec::encode(&laid.canvas, Panel::EPD_2IN13, Orientation::Native).unwrap();
        Frame {
            canvas: laid.canvas,
            orientation: Orientation::Native,
            buffer,
            content: FrameContent::Text {
                text: text.to_string(),
                fit: laid.fit,
            },
        }
    }

    #[test]
    fn settle_delay_is_not_clamped() {
        let config = DisplayConfig::default().with_settle_delay(Duration::ZERO);
        assert_eq!(SimulatedDriver::new(&config).settle_delay(), Duration::ZERO);
    }

    #[test]
    fn text_push_writes_and_overwrites_the_preview() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bmps").join("text_preview.bmp");
        let mut driver = SimulatedDriver::new(&DisplayConfig::default().with_preview_path(&path));

        let frame = text_frame("Hi");
        driver.push(&frame).unwrap();
        let saved = image::open(&path).unwrap().to_luma8();
        assert_eq!(Canvas::from_luma(&saved, codec::THRESHOLD).unwrap(), frame.canvas);

        driver.push(&text_frame("")).unwrap();
        let saved = image::open(&path).unwrap().to_luma8();
        assert!(Canvas::from_luma(&saved, codec::THRESHOLD).unwrap().is_blank());
    }

    #[test]
    fn bitmap_push_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("preview.bmp");
        let mut driver = SimulatedDriver::new(&DisplayConfig::default().with_preview_path(&path));

        let mut frame = text_frame("Hi");
        frame.content = FrameContent::Bitmap {
            path: PathBuf::from("upload.bmp"),
        };
        driver.push(&frame).unwrap();
        assert!(!path.exists());
    }

    #[test]
    fn unwritable_preview_is_a_protocol_error() {
        let dir = tempfile::tempdir().unwrap();
        let blocker = dir.path().join("file");
        std::fs::write(&blocker, b"").unwrap();
        let path = blocker.join("preview.bmp");
        let mut driver = SimulatedDriver::new(&DisplayConfig::default().with_preview_path(&path));

        assert!(matches!(
            driver.push(&text_frame("Hi")),
            Err(ProtocolError::Preview { .. })
        ));
    }
}
