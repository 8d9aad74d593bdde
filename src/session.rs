//! Display Session Orchestrator.
//!
//! One request is one session: init, clear, settle, render, push, settle,
//! sleep. Inputs are checked before the first driver call, so a bad path or a
//! bad size never touches the panel. A failed step ends the session in
//! [`SessionState::Error`] after a best-effort sleep.

use std::path::Path;

use crate::canvas::{Orientation, Panel};
use crate::codec;
use crate::config::DisplayConfig;
use crate::driver::{self, Backend, DisplayDriver, Frame, FrameContent};
use crate::epd2in13::driver::LutMode;
use crate::epd2in13::flag::Flag;
use crate::error::{DisplayError, ProtocolError};
use crate::layout;
use crate::probe;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Idle,
    Initializing,
    Clearing,
    Rendering,
    Pushing,
    Sleeping,
    Error,
}

impl core::fmt::Display for SessionState {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            SessionState::Idle => "idle",
            SessionState::Initializing => "initializing",
            SessionState::Clearing => "clearing",
            SessionState::Rendering => "rendering",
            SessionState::Pushing => "pushing",
            SessionState::Sleeping => "sleeping",
            SessionState::Error => "error",
        };
        f.write_str(name)
    }
}

/// Text to autofit onto the panel.
///
/// Defaults to the full panel, laid out landscape and turned upright.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextRequest {
    pub text: String,
    pub max_width: u32,
    pub max_height: u32,
    pub rotate: bool,
}

impl TextRequest {
    pub fn new(text: impl Into<String>) -> Self {
        TextRequest {
            text: text.into(),
            max_width: Panel::EPD_2IN13.width,
            max_height: Panel::EPD_2IN13.height,
            rotate: true,
        }
    }

    pub fn with_size(mut self, max_width: u32, max_height: u32) -> Self {
        self.max_width = max_width;
        self.max_height = max_height;
        self
    }

    pub fn with_rotate(mut self, rotate: bool) -> Self {
        self.rotate = rotate;
        self
    }

    /// The rendered canvas is always `max_width`×`max_height`, so both must
    /// be positive and fit `panel` one way or the other.
    pub fn validate(&self, panel: Panel) -> Result<Orientation, DisplayError> {
        let (width, height) = (self.max_width, self.max_height);
        if width == 0 || height == 0 {
            return Err(DisplayError::InvalidDimensions { width, height });
        }
        panel
            .orientation_for(width, height)
            .ok_or_else(|| panel.too_large(width, height))
    }
}

/// Owns the driver picked at startup and runs one session per request.
///
/// Both backends stand for the 2.13" panel, so frames are always built for
/// [`Panel::EPD_2IN13`].
pub struct EpaperDisplay {
    driver: Box<dyn DisplayDriver>,
    panel: Panel,
}

impl EpaperDisplay {
    pub fn new(driver: Box<dyn DisplayDriver>) -> Self {
        EpaperDisplay {
            driver,
            panel: Panel::EPD_2IN13,
        }
    }

    /// Probe the machine once and pick the matching backend
    pub fn from_config(config: &DisplayConfig) -> Self {
        Self::new(driver::select(config, probe::hardware_present()))
    }

    pub fn backend(&self) -> Backend {
        self.driver.backend()
    }

    /// Decode the bitmap at `path` and show it
    pub fn display_image(&mut self, path: &Path) -> Result<(), DisplayError> {
        let result = self.try_display_image(path);
        if let Err(e) = &result {
            log::error!("Error with image {}: {}", path.display(), e);
        }
        result
    }

    fn try_display_image(&mut self, path: &Path) -> Result<(), DisplayError> {
        let panel = self.panel;
        let (canvas, orientation) = codec::decode_bitmap(path, panel)?;
        log::info!("Displaying image: {}", path.display());

        self.run(|| {
            let buffer = codec::encode(&canvas, panel, orientation)?;
            Ok(Frame {
                canvas,
                orientation,
                buffer,
                content: FrameContent::Bitmap {
                    path: path.to_path_buf(),
                },
            })
        })
    }

    /// Autofit `request.text` and show it
    pub fn display_text(&mut self, request: &TextRequest) -> Result<(), DisplayError> {
        let result = self.try_display_text(request);
        if let Err(e) = &result {
            log::error!("Error displaying text: {}", e);
        }
        result
    }

    fn try_display_text(&mut self, request: &TextRequest) -> Result<(), DisplayError> {
        let panel = self.panel;
        let orientation = request.validate(panel)?;
        log::info!("Displaying text: {:?}", request.text);

        self.run(|| {
            let laid = layout::layout(&request.text, request.max_width, request.max_height, request.rotate)?;
            let buffer = codec::encode(&laid.canvas, panel, orientation)?;
            Ok(Frame {
                canvas: laid.canvas,
                orientation,
                buffer,
                content: FrameContent::Text {
                    text: request.text.clone(),
                    fit: laid.fit,
                },
            })
        })
    }

    fn run<F>(&mut self, render: F) -> Result<(), DisplayError>
    where
        F: FnOnce() -> Result<Frame, DisplayError>,
    {
        let mut session = Session::new(self.driver.as_mut());
        let result = session.drive(render);
        if result.is_err() {
            session.abort();
        }
        result
    }
}

struct Session<'a> {
    driver: &'a mut dyn DisplayDriver,
    state: SessionState,
}

impl<'a> Session<'a> {
    fn new(driver: &'a mut dyn DisplayDriver) -> Self {
        Session {
            driver,
            state: SessionState::Idle,
        }
    }

    fn enter(&mut self, next: SessionState) {
        log::debug!("Session {} -> {}", self.state, next);
        self.state = next;
    }

    fn step<F>(&mut self, state: SessionState, op: F) -> Result<(), DisplayError>
    where
        F: FnOnce(&mut dyn DisplayDriver) -> Result<(), ProtocolError>,
    {
        self.enter(state);
        op(&mut *self.driver).map_err(|source| DisplayError::Protocol { stage: state, source })
    }

    fn settle(&mut self) {
        log::debug!("Session {}: settling for {:?}", self.state, self.driver.settle_delay());
        self.driver.settle();
    }

    fn drive<F>(&mut self, render: F) -> Result<(), DisplayError>
    where
        F: FnOnce() -> Result<Frame, DisplayError>,
    {
        self.step(SessionState::Initializing, |d| d.init(LutMode::Full))?;
        self.step(SessionState::Clearing, |d| d.clear(Flag::FILL_WHITE))?;
        self.settle();

        self.enter(SessionState::Rendering);
        let frame = render()?;

        self.step(SessionState::Pushing, |d| d.push(&frame))?;
        self.settle();

        // Put the display to sleep to save power
        self.step(SessionState::Sleeping, |d| d.sleep())?;
        self.enter(SessionState::Idle);
        Ok(())
    }

    /// Leave the panel asleep rather than mid-protocol
    fn abort(&mut self) {
        let failed = self.state;
        self.enter(SessionState::Error);
        if failed == SessionState::Sleeping {
            return;
        }
        if let Err(e) = self.driver.sleep() {
            log::warn!("Cleanup sleep after {} failure also failed: {}", failed, e);
        }
    }
}
