//! Framebuffer encoding for the panel RAM and bitmap decoding.
//!
//! ## Buffer Format
//!
//! - Each byte represents 8 horizontal pixels, MSB first (leftmost pixel)
//! - Rows are `ceil(width / 8)` bytes, padding bits stay white
//! - bit 1 = white, bit 0 = black
//! - Total size for the 2.13" panel: 16 × 250 = 4000 bytes

use std::path::Path;

use crate::canvas::{Canvas, Orientation, Panel};
use crate::error::DisplayError;

/// Luma below this is drawn black
pub const THRESHOLD: u8 = 128;

/// Encode `canvas` into the panel's native framebuffer.
///
/// A `Landscape` canvas is turned onto the panel so its x axis runs from the
/// bottom of the panel upwards. Smaller canvases are anchored at the origin.
pub fn encode(canvas: &Canvas, panel: Panel, orientation: Orientation) -> Result<Vec<u8>, DisplayError> {
    let (max_w, max_h) = match orientation {
        Orientation::Native => (panel.width, panel.height),
        Orientation::Landscape => (panel.height, panel.width),
    };
    if canvas.width() > max_w || canvas.height() > max_h {
        return Err(panel.too_large(canvas.width(), canvas.height()));
    }

    let line_width = panel.width.div_ceil(8) as usize;
    let mut buffer = vec![0xFF; line_width * panel.height as usize];

    for (x, y) in canvas.black_pixels() {
        let (px, py) = match orientation {
            Orientation::Native => (x, y),
            Orientation::Landscape => (y, panel.height - 1 - x),
        };
        buffer[px as usize / 8 + py as usize * line_width] &= !(0x80 >> (px % 8));
    }

    Ok(buffer)
}

/// Open a bitmap and threshold it into a canvas that fits `panel`.
///
/// Returns the orientation the image has to be pushed with.
pub fn decode_bitmap(path: &Path, panel: Panel) -> Result<(Canvas, Orientation), DisplayError> {
    let image = image::open(path).map_err(|source| DisplayError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let gray = image.to_luma8();
    let orientation = panel
        .orientation_for(gray.width(), gray.height())
        .ok_or_else(|| panel.too_large(gray.width(), gray.height()))?;

    log::debug!(
        "Decoded {} as {}x{} ({} orientation)",
        path.display(),
        gray.width(),
        gray.height(),
        orientation
    );
    Ok((Canvas::from_luma(&gray, THRESHOLD)?, orientation))
}

#[cfg(test)]
mod tests {
    use super::*;
    use embedded_graphics::pixelcolor::BinaryColor;
    use proptest::prelude::*;

    const PANEL: Panel = Panel::EPD_2IN13;

    #[test]
    fn blank_canvas_encodes_all_white() {
        let canvas = Canvas::new(122, 250).unwrap();
        let buffer = encode(&canvas, PANEL, Orientation::Native).unwrap();
        assert_eq!(buffer.len(), 4000);
        assert!(buffer.iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn native_pixels_clear_msb_first_bits() {
        let mut canvas = Canvas::new(122, 250).unwrap();
        canvas.set_pixel(0, 0, BinaryColor::On);
        canvas.set_pixel(9, 0, BinaryColor::On);
        canvas.set_pixel(121, 249, BinaryColor::On);

        let buffer = encode(&canvas, PANEL, Orientation::Native).unwrap();
        assert_eq!(buffer[0], 0x7F);
        assert_eq!(buffer[1], 0xBF);
        // x = 121 is bit 1 of byte 15 on the last row
        assert_eq!(buffer[249 * 16 + 15], 0xBF);
        assert_eq!(buffer.iter().filter(|b| **b != 0xFF).count(), 3);
    }

    #[test]
    fn landscape_pixels_are_turned_onto_the_panel() {
        let mut canvas = Canvas::new(250, 122).unwrap();
        // canvas origin lands on the bottom-left of the panel
        canvas.set_pixel(0, 0, BinaryColor::On);
        // canvas x runs upwards
        canvas.set_pixel(249, 10, BinaryColor::On);

        let buffer = encode(&canvas, PANEL, Orientation::Landscape).unwrap();
        assert_eq!(buffer[249 * 16], 0x7F);
        assert_eq!(buffer[1], !(0x80 >> 2));
    }

    #[test]
    fn small_canvas_is_anchored_and_padded_white() {
        let mut canvas = Canvas::new(8, 1).unwrap();
        canvas.set_pixel(7, 0, BinaryColor::On);
        let buffer = encode(&canvas, PANEL, Orientation::Native).unwrap();
        assert_eq!(buffer[0], 0xFE);
        assert!(buffer[1..].iter().all(|b| *b == 0xFF));
    }

    #[test]
    fn oversized_canvas_is_rejected() {
        let canvas = Canvas::new(250, 122).unwrap();
        assert!(matches!(
            encode(&canvas, PANEL, Orientation::Native),
            Err(DisplayError::CanvasTooLarge { width: 250, height: 122, .. })
        ));
    }

    #[test]
    fn missing_bitmap_is_a_decode_error() {
        let err = decode_bitmap(Path::new("does/not/exist.bmp"), PANEL).unwrap_err();
        assert!(matches!(err, DisplayError::Decode { .. }));
    }

    #[test]
    fn garbage_bitmap_is_a_decode_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("junk.bmp");
        std::fs::write(&path, b"not a bitmap at all").unwrap();
        assert!(matches!(
            decode_bitmap(&path, PANEL),
            Err(DisplayError::Decode { .. })
        ));
    }

    #[test]
    fn landscape_bitmap_decodes_with_landscape_orientation() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("wide.bmp");
        let mut canvas = Canvas::new(250, 122).unwrap();
        canvas.set_pixel(3, 4, BinaryColor::On);
        canvas.to_luma().save(&path).unwrap();

        let (decoded, orientation) = decode_bitmap(&path, PANEL).unwrap();
        assert_eq!(orientation, Orientation::Landscape);
        assert_eq!(decoded, canvas);
    }

    proptest! {
        #[test]
        fn encoding_is_deterministic_and_pixel_exact(
            pixels in proptest::collection::vec((0i32..122, 0i32..250), 0..64),
            flip in (0i32..122, 0i32..250),
        ) {
            let mut canvas = Canvas::new(122, 250).unwrap();
            for (x, y) in &pixels {
                canvas.set_pixel(*x, *y, BinaryColor::On);
            }
            let first = encode(&canvas, PANEL, Orientation::Native).unwrap();
            let second = encode(&canvas, PANEL, Orientation::Native).unwrap();
            prop_assert_eq!(&first, &second);

            let mut other = canvas.clone();
            let current = other.pixel(flip.0, flip.1).unwrap();
            other.set_pixel(flip.0, flip.1, current.invert());
            prop_assert_ne!(first, encode(&other, PANEL, Orientation::Native).unwrap());
        }
    }
}
