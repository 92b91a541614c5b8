pub mod contours;
pub mod preprocessing;

use image::DynamicImage;
use tracing::debug;

use crate::models::{Contour, Detection};

/// Produces bounding-box detections for an image
pub trait Detector: Send + Sync {
    fn detect(&self, img: &DynamicImage) -> anyhow::Result<Vec<Detection>>;
}

/// Classical edge/contour object detector.
///
/// Edges are closed with a one-pixel dilation before grouping so corners
/// that Canny leaves open do not split an outline. Each outline is
/// classified by how much of its bounding box the edge pixels cover.
pub struct ContourDetector {
    pub blur_sigma: f32,
    pub low_threshold: f32,
    pub high_threshold: f32,
    /// Minimum box side in pixels
    pub min_size: u32,
    pub circularity_threshold: f32,
    /// Dilation radius used to close gaps in outlines
    pub close_radius: u8,
    pub max_detections: usize,
}

impl ContourDetector {
    pub fn new() -> Self {
        Self {
            blur_sigma: 1.5,
            low_threshold: 50.0,
            high_threshold: 100.0,
            min_size: 8,
            circularity_threshold: 2.0,
            close_radius: 1,
            max_detections: 100,
        }
    }

    /// Outlines found in `img`, before classification
    pub fn outlines(&self, img: &DynamicImage) -> Vec<Contour> {
        let edges = preprocessing::edge_map(img, self.blur_sigma, self.low_threshold, self.high_threshold);
        contours::find_contours(&edges, self.min_size, self.close_radius)
            .into_iter()
            .filter(|c| c.width() >= self.min_size && c.height() >= self.min_size)
            .collect()
    }

    fn classify(&self, contour: &Contour) -> (&'static str, f32) {
        let coverage = contour.edge_coverage();
        let circle_coverage = std::f32::consts::FRAC_PI_4;

        if coverage >= 0.9 {
            ("rectangle", coverage)
        } else if contour.is_circular(self.circularity_threshold) && coverage >= 0.6 {
            let score = 1.0 - (coverage - circle_coverage).abs() / circle_coverage;
            ("circle", score.clamp(0.0, 1.0))
        } else {
            ("object", coverage * 0.5)
        }
    }
}

impl Default for ContourDetector {
    fn default() -> Self {
        Self::new()
    }
}

impl Detector for ContourDetector {
    fn detect(&self, img: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        if img.width() == 0 || img.height() == 0 {
            anyhow::bail!("cannot run detection on an empty image");
        }

        let outlines = self.outlines(img);
        debug!("found {} outlines", outlines.len());

        let mut detections: Vec<Detection> = outlines
            .iter()
            .map(|c| {
                let (class, score) = self.classify(c);
                Detection::new(
                    c.min_x as i32,
                    c.min_y as i32,
                    c.max_x as i32,
                    c.max_y as i32,
                    score,
                    class,
                )
            })
            .collect();

        detections.sort_by(|a, b| b.score.total_cmp(&a.score));
        detections.truncate(self.max_detections);
        Ok(detections)
    }
}
