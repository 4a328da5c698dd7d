use image::{Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::adapters::render::bitmap_font;
use crate::application::ports::OverlayPort;
use crate::domain::annotation::label_block;
use crate::domain::detection::{BoundingBox, Detection};

const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
const TEXT_COLOR: Rgb<u8> = Rgb([255, 255, 0]);
const BOX_THICKNESS: i32 = 3;
const TEXT_SCALE: i32 = 2;

/// Draws each detection's label block and box, in detection order.
pub struct BoxOverlay {
    box_color: Rgb<u8>,
    text_color: Rgb<u8>,
    thickness: i32,
    text_scale: i32,
}

impl Default for BoxOverlay {
    fn default() -> Self {
        Self {
            box_color: BOX_COLOR,
            text_color: TEXT_COLOR,
            thickness: BOX_THICKNESS,
            text_scale: TEXT_SCALE,
        }
    }
}

impl BoxOverlay {
    fn draw_box(&self, img: &mut RgbImage, bbox: &BoundingBox) {
        // both corners are part of the outline
        let rect = Rect::at(bbox.x1, bbox.y1).of_size(bbox.width() + 1, bbox.height() + 1);

        // thick border as nested rectangles growing outwards
        for offset in 0..self.thickness {
            let expanded = Rect::at(rect.left() - offset, rect.top() - offset).of_size(
                rect.width() + (offset * 2) as u32,
                rect.height() + (offset * 2) as u32,
            );
            draw_hollow_rect_mut(img, expanded, self.box_color);
        }
    }
}

impl OverlayPort for BoxOverlay {
    fn draw(&self, image: &mut RgbImage, detections: &[Detection]) {
        for det in detections {
            let block = label_block(det);
            for (x, y, line) in block.line_origins() {
                bitmap_font::draw_text(image, line, x, y, self.text_scale, self.text_color);
            }
            self.draw_box(image, &det.bounding_box);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::detection::ObjectClass;

    fn det(x1: i32, y1: i32, x2: i32, y2: i32) -> Detection {
        Detection {
            class: ObjectClass::Ship,
            confidence: 90.0,
            bounding_box: BoundingBox { x1, y1, x2, y2 },
            length_m: 0.0,
            latitude: 23.81,
            longitude: 90.41,
        }
    }

    #[test]
    fn draws_box_edges() {
        let mut img = RgbImage::new(400, 400);
        BoxOverlay::default().draw(&mut img, &[det(150, 200, 250, 300)]);
        assert_eq!(*img.get_pixel(150, 250), BOX_COLOR);
        assert_eq!(*img.get_pixel(148, 250), BOX_COLOR, "border is three pixels thick");
        assert_eq!(*img.get_pixel(200, 240), Rgb([0, 0, 0]), "box interior untouched");
    }

    #[test]
    fn far_corner_is_on_the_outline() {
        let mut img = RgbImage::new(400, 400);
        BoxOverlay::default().draw(&mut img, &[det(150, 200, 250, 300)]);
        assert_eq!(*img.get_pixel(250, 240), BOX_COLOR);
        assert_eq!(*img.get_pixel(200, 300), BOX_COLOR);
        assert_eq!(*img.get_pixel(249, 240), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(200, 299), Rgb([0, 0, 0]));
        assert_eq!(*img.get_pixel(253, 240), Rgb([0, 0, 0]), "three pixels outwards from x2");
    }

    #[test]
    fn label_text_lands_above_box_when_room() {
        let mut img = RgbImage::new(400, 400);
        BoxOverlay::default().draw(&mut img, &[det(150, 200, 250, 300)]);
        // first line baseline at y=190, glyphs occupy rows 176..190
        let text_rows = (176..190).any(|y| (160..300).any(|x| *img.get_pixel(x, y) == TEXT_COLOR));
        assert!(text_rows);
    }

    #[test]
    fn boxes_at_the_edge_do_not_panic() {
        let mut img = RgbImage::new(50, 50);
        BoxOverlay::default().draw(&mut img, &[det(0, 0, 0, 0), det(40, 40, 90, 90)]);
        assert_eq!(*img.get_pixel(0, 0), BOX_COLOR);
    }
}
