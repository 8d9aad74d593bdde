use std::path::PathBuf;

use crate::session::SessionState;

/// A single protocol step failed on a driver backend.
#[derive(Debug, thiserror::Error)]
pub enum ProtocolError {
    #[error("bus error: {0:?}")]
    Bus(display_interface::DisplayError),

    #[error("could not read the BUSY line")]
    BusyPin,

    #[error("panel stayed busy for {waited_ms} ms")]
    BusyTimeout { waited_ms: u32 },

    #[error("framebuffer is {actual} bytes, panel expects {expected}")]
    BufferLength { expected: usize, actual: usize },

    #[error("could not write preview {}: {source}", path.display())]
    Preview {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

// display_interface::DisplayError does not implement std::error::Error,
// so it cannot be a #[from] source.
impl From<display_interface::DisplayError> for ProtocolError {
    fn from(err: display_interface::DisplayError) -> Self {
        ProtocolError::Bus(err)
    }
}

/// Why a display request did not reach the panel.
#[derive(Debug, thiserror::Error)]
pub enum DisplayError {
    #[error("could not decode bitmap {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("{width}x{height} does not fit the {panel_width}x{panel_height} panel in either orientation")]
    CanvasTooLarge {
        width: u32,
        height: u32,
        panel_width: u32,
        panel_height: u32,
    },

    #[error("invalid canvas size {width}x{height}")]
    InvalidDimensions { width: u32, height: u32 },

    #[error("{stage} failed: {source}")]
    Protocol {
        stage: SessionState,
        #[source]
        source: ProtocolError,
    },

    #[error("display queue is full")]
    Busy,

    #[error("request was cancelled before it started")]
    Cancelled,

    #[error("display worker has stopped")]
    WorkerStopped,
}

impl DisplayError {
    /// True when the request was refused before any hardware interaction.
    pub fn is_precondition(&self) -> bool {
        matches!(
            self,
            DisplayError::Decode { .. }
                | DisplayError::CanvasTooLarge { .. }
                | DisplayError::InvalidDimensions { .. }
        )
    }
}
