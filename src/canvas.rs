//! Monochrome pixel grid shared by the layout engine, the codec and the drivers.
//!
//! `BinaryColor::On` is a black pixel, `BinaryColor::Off` is white, matching
//! how the panel RAM is drawn with embedded-graphics.

use core::convert::Infallible;

use embedded_graphics::pixelcolor::BinaryColor;
use embedded_graphics::prelude::*;
use image::{GrayImage, Luma};

use crate::epd2in13;
use crate::error::DisplayError;

/// Largest edge accepted for any canvas, in pixels
pub const MAX_DIMENSION: u32 = 4096;

/// Native pixel dimensions of a panel
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Panel {
    pub width: u32,
    pub height: u32,
}

impl Panel {
    /// The 2.13" panel driven by [`crate::epd2in13`]
    pub const EPD_2IN13: Panel = Panel {
        width: epd2in13::WIDTH as u32,
        height: epd2in13::HEIGHT as u32,
    };

    /// Which push path a canvas of `width`×`height` takes, if it fits at all.
    /// Native is preferred when both fit.
    pub fn orientation_for(&self, width: u32, height: u32) -> Option<Orientation> {
        if width <= self.width && height <= self.height {
            Some(Orientation::Native)
        } else if width <= self.height && height <= self.width {
            Some(Orientation::Landscape)
        } else {
            None
        }
    }

    pub(crate) fn too_large(&self, width: u32, height: u32) -> DisplayError {
        DisplayError::CanvasTooLarge {
            width,
            height,
            panel_width: self.width,
            panel_height: self.height,
        }
    }
}

impl Default for Panel {
    fn default() -> Self {
        Self::EPD_2IN13
    }
}

/// How a canvas maps onto the panel RAM
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Orientation {
    /// Canvas x/y are panel x/y
    Native,
    /// Canvas is the panel turned a quarter: canvas x runs up the panel
    Landscape,
}

impl core::fmt::Display for Orientation {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Orientation::Native => write!(f, "native"),
            Orientation::Landscape => write!(f, "landscape"),
        }
    }
}

/// A 2D black/white pixel grid, row-major
#[derive(Clone, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    pixels: Vec<BinaryColor>,
}

impl Canvas {
    /// All-white canvas. Both edges must be in `1..=MAX_DIMENSION`.
    pub fn new(width: u32, height: u32) -> Result<Self, DisplayError> {
        if width == 0 || height == 0 || width > MAX_DIMENSION || height > MAX_DIMENSION {
            return Err(DisplayError::InvalidDimensions { width, height });
        }
        Ok(Canvas {
            width,
            height,
            pixels: vec![BinaryColor::Off; width as usize * height as usize],
        })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    fn index(&self, x: i32, y: i32) -> Option<usize> {
        let (x, y) = (u32::try_from(x).ok()?, u32::try_from(y).ok()?);
        if x < self.width && y < self.height {
            Some(y as usize * self.width as usize + x as usize)
        } else {
            None
        }
    }

    /// Colour at `(x, y)`, `None` outside the canvas
    pub fn pixel(&self, x: i32, y: i32) -> Option<BinaryColor> {
        self.index(x, y).map(|i| self.pixels[i])
    }

    /// Set a pixel; coordinates outside the canvas are clipped silently
    pub fn set_pixel(&mut self, x: i32, y: i32, color: BinaryColor) {
        if let Some(i) = self.index(x, y) {
            self.pixels[i] = color;
        }
    }

    /// No black pixel anywhere
    pub fn is_blank(&self) -> bool {
        self.pixels.iter().all(|p| *p == BinaryColor::Off)
    }

    /// Coordinates of every black pixel, row by row
    pub fn black_pixels(&self) -> impl Iterator<Item = (u32, u32)> + '_ {
        let width = self.width as usize;
        self.pixels
            .iter()
            .enumerate()
            .filter(|(_, p)| **p == BinaryColor::On)
            .map(move |(i, _)| ((i % width) as u32, (i / width) as u32))
    }

    /// Rotate 270° counter-clockwise (a quarter turn clockwise), expanding
    /// the bounds so a `w`×`h` canvas becomes `h`×`w`.
    pub fn rotated_270(&self) -> Canvas {
        let (w, h) = (self.width, self.height);
        let mut out = Canvas {
            width: h,
            height: w,
            pixels: vec![BinaryColor::Off; self.pixels.len()],
        };
        for (x, y) in self.black_pixels() {
            let (nx, ny) = (h - 1 - y, x);
            out.pixels[ny as usize * h as usize + nx as usize] = BinaryColor::On;
        }
        out
    }

    /// Threshold a grayscale image: luma below `threshold` becomes black
    pub fn from_luma(image: &GrayImage, threshold: u8) -> Result<Self, DisplayError> {
        let mut canvas = Canvas::new(image.width(), image.height())?;
        for (x, y, Luma([luma])) in image.enumerate_pixels() {
            if *luma < threshold {
                canvas.pixels[y as usize * canvas.width as usize + x as usize] = BinaryColor::On;
            }
        }
        Ok(canvas)
    }

    /// 8-bit grayscale copy, black = 0 and white = 255
    pub fn to_luma(&self) -> GrayImage {
        GrayImage::from_fn(self.width, self.height, |x, y| {
            match self.pixels[y as usize * self.width as usize + x as usize] {
                BinaryColor::On => Luma([0]),
                BinaryColor::Off => Luma([255]),
            }
        })
    }
}

impl core::fmt::Debug for Canvas {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Canvas")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("black", &self.black_pixels().count())
            .finish()
    }
}

impl OriginDimensions for Canvas {
    fn size(&self) -> Size {
        Size::new(self.width, self.height)
    }
}

impl DrawTarget for Canvas {
    type Color = BinaryColor;
    type Error = Infallible;

    fn draw_iter<I>(&mut self, pixels: I) -> Result<(), Self::Error>
    where
        I: IntoIterator<Item = Pixel<Self::Color>>,
    {
        for Pixel(point, color) in pixels {
            self.set_pixel(point.x, point.y, color);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::primitives::{PrimitiveStyle, Rectangle};

    #[test]
    fn new_canvas_is_white() {
        let canvas = Canvas::new(3, 2).unwrap();
        assert!(canvas.is_blank());
        assert_eq!(canvas.size(), Size::new(3, 2));
    }

    #[test]
    fn zero_or_huge_dimensions_are_rejected() {
        assert!(matches!(
            Canvas::new(0, 10),
            Err(DisplayError::InvalidDimensions { width: 0, height: 10 })
        ));
        assert!(Canvas::new(10, MAX_DIMENSION + 1).is_err());
    }

    #[test]
    fn drawing_outside_is_clipped() {
        let mut canvas = Canvas::new(4, 4).unwrap();
        Rectangle::new(Point::new(-2, -2), Size::new(4, 4))
            .into_styled(PrimitiveStyle::with_fill(BinaryColor::On))
            .draw(&mut canvas)
            .unwrap();
        let black: Vec<_> = canvas.black_pixels().collect();
        assert_eq!(black, vec![(0, 0), (1, 0), (0, 1), (1, 1)]);
    }

    #[test]
    fn rotation_turns_a_quarter_clockwise() {
        // 3 wide, 2 tall, top-left pixel black
        let mut canvas = Canvas::new(3, 2).unwrap();
        canvas.set_pixel(0, 0, BinaryColor::On);
        canvas.set_pixel(2, 1, BinaryColor::On);

        let rotated = canvas.rotated_270();
        assert_eq!((rotated.width(), rotated.height()), (2, 3));
        // top-left ends up top-right, bottom-right ends up bottom-left
        assert_eq!(rotated.pixel(1, 0), Some(BinaryColor::On));
        assert_eq!(rotated.pixel(0, 2), Some(BinaryColor::On));
        assert_eq!(rotated.black_pixels().count(), 2);
    }

    #[test]
    fn orientation_prefers_native() {
        let panel = Panel::EPD_2IN13;
        assert_eq!(panel.orientation_for(122, 250), Some(Orientation::Native));
        assert_eq!(panel.orientation_for(100, 100), Some(Orientation::Native));
        assert_eq!(panel.orientation_for(250, 122), Some(Orientation::Landscape));
        assert_eq!(panel.orientation_for(251, 122), None);
    }

    #[test]
    fn luma_round_trip_keeps_pixels() {
        let mut canvas = Canvas::new(5, 5).unwrap();
        canvas.set_pixel(2, 3, BinaryColor::On);
        let back = Canvas::from_luma(&canvas.to_luma(), 128).unwrap();
        assert_eq!(back, canvas);
    }
}
