//! Draw detections onto a copy of an image.

use image::{DynamicImage, Rgb, RgbImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;

use crate::error::AnnotateError;
use crate::models::Detection;

pub const BOX_COLOR: Rgb<u8> = Rgb([0, 255, 0]);
pub const GLYPH_WIDTH: i32 = 5;
pub const GLYPH_HEIGHT: i32 = 7;
/// Horizontal advance per character
pub const GLYPH_ADVANCE: i32 = GLYPH_WIDTH + 1;
/// Distance from the box's top edge to the top of the label
pub const LABEL_OFFSET: i32 = 10;

/// Return an RGB copy of `image` with every detection's box and label drawn.
pub fn annotate(image: &DynamicImage, detections: &[Detection]) -> Result<RgbImage, AnnotateError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(AnnotateError::EmptyImage);
    }

    let mut canvas = image.to_rgb8();
    for detection in detections {
        draw_box(&mut canvas, detection, BOX_COLOR);
        let (x, y) = label_origin(&canvas, detection);
        draw_text(&mut canvas, x, y, &detection.label(), BOX_COLOR);
    }
    Ok(canvas)
}

/// Top-left of the label: above the box's top-left corner, clamped into the canvas
pub fn label_origin(canvas: &RgbImage, detection: &Detection) -> (i32, i32) {
    let max_x = canvas.width() as i32 - 1;
    let max_y = canvas.height() as i32 - 1;
    let left = detection.x1.min(detection.x2);
    let top = detection.y1.min(detection.y2);
    (left.clamp(0, max_x), top.saturating_sub(LABEL_OFFSET).clamp(0, max_y))
}

/// Width in pixels the label for `text` occupies
pub fn text_width(text: &str) -> i32 {
    text.chars().count() as i32 * GLYPH_ADVANCE
}

// Two pixels thick; corners are inclusive. Corners are pulled in to just
// outside the canvas so off-canvas edges stay invisible.
fn draw_box(canvas: &mut RgbImage, detection: &Detection, color: Rgb<u8>) {
    let max_x = canvas.width() as i32 + 1;
    let max_y = canvas.height() as i32 + 1;
    let left = detection.x1.min(detection.x2).clamp(-2, max_x);
    let right = detection.x1.max(detection.x2).clamp(-2, max_x);
    let top = detection.y1.min(detection.y2).clamp(-2, max_y);
    let bottom = detection.y1.max(detection.y2).clamp(-2, max_y);

    for inset in 0..2 {
        let width = right - left + 1 - 2 * inset;
        let height = bottom - top + 1 - 2 * inset;
        if width <= 0 || height <= 0 {
            break;
        }
        let rect = Rect::at(left + inset, top + inset).of_size(width as u32, height as u32);
        draw_hollow_rect_mut(canvas, rect, color);
    }
}

fn draw_text(canvas: &mut RgbImage, x: i32, y: i32, text: &str, color: Rgb<u8>) {
    let width = canvas.width() as i32;
    let height = canvas.height() as i32;

    for (i, ch) in text.chars().enumerate() {
        let Some(rows) = glyph(ch) else {
            continue;
        };
        let origin_x = x + i as i32 * GLYPH_ADVANCE;
        for (row, bits) in rows.iter().enumerate() {
            let py = y + row as i32;
            if py < 0 || py >= height {
                continue;
            }
            for col in 0..GLYPH_WIDTH {
                if (bits >> (GLYPH_WIDTH - 1 - col)) & 1 == 0 {
                    continue;
                }
                let px = origin_x + col;
                if px >= 0 && px < width {
                    canvas.put_pixel(px as u32, py as u32, color);
                }
            }
        }
    }
}

/// 5×7 bitmap for `ch`; lowercase letters render as capitals
fn glyph(ch: char) -> Option<[u8; 7]> {
    let rows = match ch.to_ascii_uppercase() {
        'A' => [0b01110, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'B' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10001, 0b10001, 0b11110],
        'C' => [0b01110, 0b10001, 0b10000, 0b10000, 0b10000, 0b10001, 0b01110],
        'D' => [0b11100, 0b10010, 0b10001, 0b10001, 0b10001, 0b10010, 0b11100],
        'E' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b11111],
        'F' => [0b11111, 0b10000, 0b10000, 0b11110, 0b10000, 0b10000, 0b10000],
        'G' => [0b01110, 0b10001, 0b10000, 0b10111, 0b10001, 0b10001, 0b01111],
        'H' => [0b10001, 0b10001, 0b10001, 0b11111, 0b10001, 0b10001, 0b10001],
        'I' => [0b01110, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        'J' => [0b00111, 0b00010, 0b00010, 0b00010, 0b00010, 0b10010, 0b01100],
        'K' => [0b10001, 0b10010, 0b10100, 0b11000, 0b10100, 0b10010, 0b10001],
        'L' => [0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b10000, 0b11111],
        'M' => [0b10001, 0b11011, 0b10101, 0b10101, 0b10001, 0b10001, 0b10001],
        'N' => [0b10001, 0b11001, 0b10101, 0b10011, 0b10001, 0b10001, 0b10001],
        'O' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'P' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10000, 0b10000, 0b10000],
        'Q' => [0b01110, 0b10001, 0b10001, 0b10001, 0b10101, 0b10010, 0b01101],
        'R' => [0b11110, 0b10001, 0b10001, 0b11110, 0b10100, 0b10010, 0b10001],
        'S' => [0b01111, 0b10000, 0b10000, 0b01110, 0b00001, 0b00001, 0b11110],
        'T' => [0b11111, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100, 0b00100],
        'U' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01110],
        'V' => [0b10001, 0b10001, 0b10001, 0b10001, 0b10001, 0b01010, 0b00100],
        'W' => [0b10001, 0b10001, 0b10001, 0b10101, 0b10101, 0b10101, 0b01010],
        'X' => [0b10001, 0b10001, 0b01010, 0b00100, 0b01010, 0b10001, 0b10001],
        'Y' => [0b10001, 0b10001, 0b01010, 0b00100, 0b00100, 0b00100, 0b00100],
        'Z' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b10000, 0b11111],
        '0' => [0b01110, 0b10001, 0b10011, 0b10101, 0b11001, 0b10001, 0b01110],
        '1' => [0b00100, 0b01100, 0b00100, 0b00100, 0b00100, 0b00100, 0b01110],
        '2' => [0b01110, 0b10001, 0b00001, 0b00010, 0b00100, 0b01000, 0b11111],
        '3' => [0b11110, 0b00001, 0b00001, 0b01110, 0b00001, 0b00001, 0b11110],
        '4' => [0b00010, 0b00110, 0b01010, 0b10010, 0b11111, 0b00010, 0b00010],
        '5' => [0b11111, 0b10000, 0b11110, 0b00001, 0b00001, 0b10001, 0b01110],
        '6' => [0b00110, 0b01000, 0b10000, 0b11110, 0b10001, 0b10001, 0b01110],
        '7' => [0b11111, 0b00001, 0b00010, 0b00100, 0b01000, 0b01000, 0b01000],
        '8' => [0b01110, 0b10001, 0b10001, 0b01110, 0b10001, 0b10001, 0b01110],
        '9' => [0b01110, 0b10001, 0b10001, 0b01111, 0b00001, 0b00010, 0b01100],
        ':' => [0, 0b01100, 0b01100, 0, 0b01100, 0b01100, 0],
        '.' => [0, 0, 0, 0, 0, 0b01100, 0b01100],
        '-' => [0, 0, 0, 0b11111, 0, 0, 0],
        '_' => [0, 0, 0, 0, 0, 0, 0b11111],
        '%' => [0b11001, 0b11010, 0b00010, 0b00100, 0b01000, 0b01011, 0b10011],
        ' ' => [0; 7],
        _ => return None,
    };
    Some(rows)
}
