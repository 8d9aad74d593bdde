//! Autofit text layout.
//!
//! Text is sized to the largest font that fits the canvas minus a margin,
//! centred, and optionally laid out landscape and turned onto the panel.

pub mod font;

use embedded_graphics::prelude::*;

use crate::canvas::Canvas;
use crate::error::DisplayError;
use font::ScaledFont;

/// First size tried by the search
pub const SEED_FONT_SIZE: u32 = 40;
/// The search never goes below this; text that still overflows is clipped
pub const MIN_FONT_SIZE: u32 = 8;
pub const FONT_SIZE_STEP: u32 = 2;
/// Total space kept free around the text, per axis
pub const MARGIN: u32 = 10;

/// Outcome of the font size search
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FontFit {
    pub font_size: u32,
    pub width: u32,
    pub height: u32,
}

/// A rendered text canvas plus the fit that produced it
#[derive(Debug, Clone)]
pub struct TextLayout {
    pub canvas: Canvas,
    /// `None` for empty text
    pub fit: Option<FontFit>,
}

fn fits(measured: Size, width: u32, height: u32) -> bool {
    i64::from(measured.width) <= i64::from(width) - i64::from(MARGIN)
        && i64::from(measured.height) <= i64::from(height) - i64::from(MARGIN)
}

/// Walk down from [`SEED_FONT_SIZE`] in [`FONT_SIZE_STEP`]s until `text`
/// fits `width`×`height` less the margin, stopping at [`MIN_FONT_SIZE`].
pub fn autofit(text: &str, width: u32, height: u32) -> FontFit {
    let mut font_size = SEED_FONT_SIZE;
    let mut measured = ScaledFont::for_size(font_size).measure(text);

    while !fits(measured, width, height) && font_size > MIN_FONT_SIZE {
        font_size -= FONT_SIZE_STEP;
        measured = ScaledFont::for_size(font_size).measure(text);
    }

    FontFit {
        font_size,
        width: measured.width,
        height: measured.height,
    }
}

/// Render `text` onto a new canvas.
///
/// With `rotate` the text is laid out on a `max_height`×`max_width` canvas
/// which is then turned a quarter clockwise, so the result is always
/// `max_width`×`max_height`.
pub fn layout(
    text: &str,
    max_width: u32,
    max_height: u32,
    rotate: bool,
) -> Result<TextLayout, DisplayError> {
    let (width, height) = if rotate {
        (max_height, max_width)
    } else {
        (max_width, max_height)
    };

    let mut canvas = Canvas::new(width, height)?;

    let fit = if text.is_empty() {
        None
    } else {
        let fit = autofit(text, width, height);
        if !fits(Size::new(fit.width, fit.height), width, height) {
            log::warn!(
                "Text does not fit {}x{} even at {}px, it will be clipped",
                width,
                height,
                fit.font_size
            );
        }

        // floor division, the offset goes negative when the text overflows
        let x = (i64::from(width) - i64::from(fit.width)).div_euclid(2);
        let y = (i64::from(height) - i64::from(fit.height)).div_euclid(2);
        ScaledFont::for_size(fit.font_size).draw(text, &mut canvas, Point::new(x as i32, y as i32));
        Some(fit)
    };

    if rotate {
        canvas = canvas.rotated_270();
    }

    Ok(TextLayout { canvas, fit })
}
