//! Detection overlay rendering.
//!
//! Annotated frames are an observability side effect only; reported data
//! never includes the overlay.

use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use rwatch_models::Detection;

/// Overlay box color.
const BOX_COLOR: Rgb<u8> = Rgb([220, 20, 20]);

/// Draw a hollow bounding box for each detection onto the frame.
///
/// Boxes are clamped to frame bounds; a second inset rectangle thickens the
/// line so it stays visible on noisy road footage.
pub fn annotate_frame(frame: &mut RgbImage, detections: &[Detection]) {
    let (fw, fh) = frame.dimensions();
    for det in detections {
        let Some((x, y, w, h)) = det.bbox.to_pixel_rect(fw, fh) else {
            continue;
        };

        draw_hollow_rect_mut(frame, Rect::at(x as i32, y as i32).of_size(w, h), BOX_COLOR);
        if w > 4 && h > 4 {
            draw_hollow_rect_mut(
                frame,
                Rect::at(x as i32 + 1, y as i32 + 1).of_size(w - 2, h - 2),
                BOX_COLOR,
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rwatch_models::BoundingBox;

    #[test]
    fn test_annotate_draws_box_border() {
        let mut frame = RgbImage::from_pixel(100, 100, Rgb([0, 0, 0]));
        let det = Detection::new(BoundingBox::new(10.0, 10.0, 30.0, 30.0), 0.9);

        annotate_frame(&mut frame, &[det]);

        assert_eq!(*frame.get_pixel(10, 10), BOX_COLOR);
        assert_eq!(*frame.get_pixel(25, 10), BOX_COLOR);
        // Interior untouched
        assert_eq!(*frame.get_pixel(25, 25), Rgb([0, 0, 0]));
    }

    #[test]
    fn test_annotate_skips_offscreen_box() {
        let mut frame = RgbImage::from_pixel(50, 50, Rgb([0, 0, 0]));
        let det = Detection::new(BoundingBox::new(200.0, 200.0, 30.0, 30.0), 0.9);
        annotate_frame(&mut frame, &[det]);
        assert!(frame.pixels().all(|p| *p == Rgb([0, 0, 0])));
    }
}
