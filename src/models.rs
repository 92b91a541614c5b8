/// One detected object: integer box corners, a confidence score and a class name
#[derive(Debug, Clone, PartialEq)]
pub struct Detection {
    pub x1: i32,
    pub y1: i32,
    pub x2: i32,
    pub y2: i32,
    /// Confidence, always rounded to 3 decimal places
    pub score: f32,
    pub class_label: String,
}

impl Detection {
    pub fn new(x1: i32, y1: i32, x2: i32, y2: i32, score: f32, class_label: impl Into<String>) -> Self {
        Self {
            x1,
            y1,
            x2,
            y2,
            score: round_score(score),
            class_label: class_label.into(),
        }
    }

    /// Text drawn next to the box, e.g. "cat: 0.95"
    pub fn label(&self) -> String {
        format!("{}: {}", self.class_label, self.score)
    }

    /// Ordered record shape `(x1, y1, x2, y2, score, class_label)`
    pub fn as_record(&self) -> (i32, i32, i32, i32, f32, &str) {
        (self.x1, self.y1, self.x2, self.y2, self.score, self.class_label.as_str())
    }
}

pub fn round_score(score: f32) -> f32 {
    ((score as f64 * 1000.0).round() / 1000.0) as f32
}

/// Edge pixels of one connected component and the box around them
#[derive(Debug, Clone)]
pub struct Contour {
    pub label: u32,
    pub min_x: u32,
    pub min_y: u32,
    pub max_x: u32,
    pub max_y: u32,
    pub pixel_count: u32,
}

impl Contour {
    pub fn width(&self) -> u32 {
        self.max_x - self.min_x + 1
    }

    pub fn height(&self) -> u32 {
        self.max_y - self.min_y + 1
    }

    /// Length of the box outline in pixels
    pub fn outline_length(&self) -> f32 {
        2.0 * (self.width() + self.height()) as f32
    }

    /// Outline length squared over 4π times the box area. A square box gives 4/π.
    pub fn roundness(&self) -> f32 {
        let box_area = self.width() as f32 * self.height() as f32;
        if box_area == 0.0 {
            return 0.0;
        }
        self.outline_length().powi(2) / (4.0 * std::f32::consts::PI * box_area)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width() as f32 / self.height().max(1) as f32
    }

    /// Near-square box whose roundness falls in `0.7..=max_roundness`
    pub fn is_circular(&self, max_roundness: f32) -> bool {
        (0.7..=max_roundness).contains(&self.roundness()) && (0.7..=1.4).contains(&self.aspect_ratio())
    }

    /// Share of the box outline covered by edge pixels, at most 1
    pub fn edge_coverage(&self) -> f32 {
        let outline = self.outline_length();
        if outline == 0.0 {
            return 0.0;
        }
        (self.pixel_count as f32 / outline).min(1.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn score_is_rounded_to_three_decimals() {
        let detection = Detection::new(10, 10, 50, 50, 0.94999, "cat");
        assert_eq!(detection.score, 0.95);
        assert_eq!(detection.label(), "cat: 0.95");

        let detection = Detection::new(0, 0, 1, 1, 0.12345, "dog");
        assert_eq!(detection.label(), "dog: 0.123");
    }

    #[test]
    fn record_shape_is_ordered() {
        let detection = Detection::new(1, 2, 3, 4, 0.5, "person");
        assert_eq!(detection.as_record(), (1, 2, 3, 4, 0.5, "person"));
    }

    #[test]
    fn square_contour_geometry() {
        let contour = Contour {
            label: 1,
            min_x: 10,
            min_y: 10,
            max_x: 29,
            max_y: 29,
            pixel_count: 76,
        };
        assert_eq!(contour.width(), 20);
        assert_eq!(contour.height(), 20);
        assert_eq!(contour.aspect_ratio(), 1.0);
        assert!((contour.roundness() - 4.0 / std::f32::consts::PI).abs() < 1e-5);
        assert!(contour.is_circular(2.0));
        assert!(!contour.is_circular(1.2));
        assert!((contour.edge_coverage() - 0.95).abs() < 1e-6);
    }
}
