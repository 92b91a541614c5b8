use std::path::PathBuf;

use image::imageops::{self, FilterType};
use image::{DynamicImage, Rgb, RgbImage};
use tracing::{error, info};

use crate::session::{Presenter, ResultViews};

pub const TILE_WIDTH: u32 = 400;
pub const TILE_HEIGHT: u32 = 300;
const TILE_GAP: u32 = 10;

pub const ANNOTATED_FILE: &str = "object_detection.png";
pub const COMPARISON_FILE: &str = "comparison.png";

/// Original, enhanced and annotated images resized to equal tiles, left to right
pub fn compose_side_by_side(views: &ResultViews) -> RgbImage {
    let tiles = [
        views.original.to_rgb8(),
        views.enhanced.to_rgb8(),
        views.annotated.clone(),
    ];
    let width = TILE_WIDTH * tiles.len() as u32 + TILE_GAP * (tiles.len() as u32 - 1);
    let mut canvas = RgbImage::from_pixel(width, TILE_HEIGHT, Rgb([0, 0, 0]));

    for (i, tile) in tiles.iter().enumerate() {
        let resized = imageops::resize(tile, TILE_WIDTH, TILE_HEIGHT, FilterType::Triangle);
        let x = i as u32 * (TILE_WIDTH + TILE_GAP);
        imageops::overlay(&mut canvas, &resized, x.into(), 0);
    }
    canvas
}

/// Presenter for the command line: dialogs go to stdout/stderr and results
/// are written as image files next to the artifacts
pub struct TerminalPresenter {
    out_dir: PathBuf,
    pub errors: usize,
}

impl TerminalPresenter {
    pub fn new(out_dir: impl Into<PathBuf>) -> Self {
        Self {
            out_dir: out_dir.into(),
            errors: 0,
        }
    }
}

impl Presenter for TerminalPresenter {
    fn show_info(&mut self, title: &str, message: &str) {
        println!("[{title}] {message}");
    }

    fn show_error(&mut self, title: &str, message: &str) {
        self.errors += 1;
        eprintln!("[{title}] {message}");
    }

    fn render(&mut self, views: &ResultViews) {
        println!("\n=== Object Detection Results ===");
        println!("Total detections: {}", views.detections.len());
        for detection in &views.detections {
            let (x1, y1, x2, y2, score, class) = detection.as_record();
            println!("  ({x1}, {y1}, {x2}, {y2}, {score}, {class})");
        }

        let annotated_path = self.out_dir.join(ANNOTATED_FILE);
        let comparison_path = self.out_dir.join(COMPARISON_FILE);
        let annotated = DynamicImage::ImageRgb8(views.annotated.clone());
        let comparison = DynamicImage::ImageRgb8(compose_side_by_side(views));

        for (path, image) in [(&annotated_path, &annotated), (&comparison_path, &comparison)] {
            match image.save(path) {
                Ok(()) => info!(path = %path.display(), "saved"),
                Err(err) => {
                    error!(path = %path.display(), "failed to save: {err}");
                    self.show_error("Error", &format!("Could not save {}: {err}", path.display()));
                }
            }
        }
        println!("Original / Dehazed / Object Detection: {}", comparison_path.display());
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn composite_has_three_tiles() {
        let views = ResultViews {
            original: DynamicImage::ImageRgb8(RgbImage::from_pixel(80, 60, Rgb([255, 0, 0]))),
            enhanced: DynamicImage::ImageRgb8(RgbImage::from_pixel(80, 60, Rgb([0, 255, 0]))),
            annotated: RgbImage::from_pixel(80, 60, Rgb([0, 0, 255])),
            detections: Vec::new(),
        };
        let composite = compose_side_by_side(&views);

        assert_eq!(composite.dimensions(), (3 * TILE_WIDTH + 2 * TILE_GAP, TILE_HEIGHT));
        assert_eq!(composite.get_pixel(10, 10), &Rgb([255, 0, 0]));
        assert_eq!(composite.get_pixel(TILE_WIDTH + TILE_GAP + 10, 10), &Rgb([0, 255, 0]));
        assert_eq!(composite.get_pixel(2 * (TILE_WIDTH + TILE_GAP) + 10, 10), &Rgb([0, 0, 255]));
        assert_eq!(composite.get_pixel(TILE_WIDTH + 2, 10), &Rgb([0, 0, 0]));
    }

    #[test]
    fn render_writes_result_files() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut presenter = TerminalPresenter::new(dir.path());
        let views = ResultViews {
            original: DynamicImage::ImageRgb8(RgbImage::new(20, 10)),
            enhanced: DynamicImage::ImageRgb8(RgbImage::new(20, 10)),
            annotated: RgbImage::new(20, 10),
            detections: Vec::new(),
        };
        presenter.render(&views);

        assert_eq!(presenter.errors, 0);
        assert!(dir.path().join(ANNOTATED_FILE).exists());
        assert!(dir.path().join(COMPARISON_FILE).exists());
    }
}
