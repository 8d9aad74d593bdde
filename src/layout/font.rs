//! Size-addressable fonts built from the embedded-graphics mono fonts.
//!
//! A font "size" is the pixel height of a rendered text line. Sizes between the
//! native cell heights are served by integer-scaling a smaller face.

use core::convert::Infallible;

use embedded_graphics::mono_font::iso_8859_15::{
    FONT_10X20, FONT_5X8, FONT_6X10, FONT_6X12, FONT_6X13, FONT_6X9, FONT_7X14, FONT_9X15,
    FONT_9X18,
};
use embedded_graphics::mono_font::{MonoFont, MonoTextStyle};
use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use embedded_graphics::text::renderer::TextRenderer;
use embedded_graphics::text::{Baseline, Text};

use crate::canvas::Canvas;

/// Faces in ascending cell height
const FACES: [&MonoFont<'static>; 9] = [
    &FONT_5X8, &FONT_6X9, &FONT_6X10, &FONT_6X12, &FONT_6X13, &FONT_7X14, &FONT_9X15, &FONT_9X18,
    &FONT_10X20,
];

/// Largest pixel multiplier applied to a face
pub const MAX_SCALE: u32 = 3;

/// A mono face drawn at an integer scale
#[derive(Clone, Copy)]
pub struct ScaledFont {
    face: &'static MonoFont<'static>,
    scale: u32,
}

impl ScaledFont {
    /// The face/scale pair with the tallest line height not above `size`.
    /// Ties go to the smaller scale. Sizes under the smallest face get it anyway.
    pub fn for_size(size: u32) -> ScaledFont {
        let mut best = ScaledFont {
            face: FACES[0],
            scale: 1,
        };
        for scale in 1..=MAX_SCALE {
            for face in FACES {
                let candidate = ScaledFont { face, scale };
                let height = candidate.line_height();
                if height <= size && height > best.line_height() {
                    best = candidate;
                }
            }
        }
        best
    }

    pub fn line_height(&self) -> u32 {
        self.face.character_size.height * self.scale
    }

    fn style(&self) -> MonoTextStyle<'static, BinaryColor> {
        MonoTextStyle::new(self.face, BinaryColor::On)
    }

    /// Bounding box of `text`: widest line by number of lines
    pub fn measure(&self, text: &str) -> Size {
        let style = self.style();
        let mut width = 0;
        let mut lines = 0;
        for line in text.split('\n') {
            let metrics = style.measure_string(line, Point::zero(), Baseline::Top);
            width = width.max(metrics.bounding_box.size.width);
            lines += 1;
        }
        Size::new(width * self.scale, lines * self.line_height())
    }

    /// Draw `text` in black with its top-left corner at `origin`; anything
    /// outside the canvas is clipped
    pub fn draw(&self, text: &str, canvas: &mut Canvas, origin: Point) {
        let style = self.style();
        let mut target = ScaledTarget {
            canvas,
            origin,
            scale: self.scale,
        };
        let cell_height = self.face.character_size.height as i32;
        for (row, line) in text.split('\n').enumerate() {
            let position = Point::new(0, row as i32 * cell_height);
            // Infallible
            let _ = Text::with_baseline(line, position, style, Baseline::Top).draw(&mut target);
        }
    }
}

impl core::fmt::Debug for ScaledFont {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(
            f,
            "{}x{}*{}",
            self.face.character_size.width, self.face.character_size.height, self.scale
        )
    }
}

/// Blows every drawn pixel up into a `scale`×`scale` block at `origin`
struct ScaledTarget<'a> {
    canvas: &'a mut Canvas,
    origin: Point,
    scale: u32,
}

impl OriginDimensions for ScaledTarget<'_> {
    fn size(&self) -> Size {
        Size::new(
            self.canvas.width().div_ceil(self.scale),
            self.canvas.height().div_ceil(self.scale),
        )
    }
}

impl DrawTarget for ScaledTarget<'_> {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        let scale = self.scale as i32;
        for Pixel(point, color) in pixels {
            if color != BinaryColor::On {
                continue;
            }
            let x0 = self.origin.x + point.x * scale;
            let y0 = self.origin.y + point.y * scale;
            for dy in 0..scale {
                for dx in 0..scale {
                    self.canvas.set_pixel(x0 + dx, y0 + dy, BinaryColor::On);
                }
            }
        }
        Ok(())
    }
}
