//! Drive a Waveshare 2.13" e-paper panel from bitmaps or autofit text.
//!
//! [`EpaperDisplay`] runs one init/clear/push/sleep session per request on a
//! [`DisplayDriver`] picked once at startup: the real panel on a Raspberry Pi,
//! or a simulated one that logs each step and writes a preview bitmap.
//! [`DisplayWorker`] serialises requests from many callers onto that display.

pub mod canvas;
pub mod codec;
pub mod config;
pub mod driver;
pub mod epd2in13;
pub mod error;
pub mod layout;
pub mod probe;
pub mod session;
pub mod worker;

pub use crate::canvas::{Canvas, Orientation, Panel};
pub use crate::config::DisplayConfig;
pub use crate::driver::{Backend, DisplayDriver, Frame, FrameContent};
pub use crate::error::{DisplayError, ProtocolError};
pub use crate::layout::{FontFit, TextLayout};
pub use crate::session::{EpaperDisplay, SessionState, TextRequest};
pub use crate::worker::{DisplayHandle, DisplayRequest, DisplayWorker, Ticket};
