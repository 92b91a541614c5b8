use image::DynamicImage;
use imageproc::filter::gaussian_blur_f32;

use crate::enhance::dehaze;
use crate::error::EnhanceError;
use crate::pipeline::{Stage, StageContext};

pub const DEHAZED_ARTIFACT: &str = "dehazed_image";
pub const CONTRAST_ARTIFACT: &str = "contrast_stretched_image";
pub const GAUSSIAN_BLURRED_ARTIFACT: &str = "gaussian_blurred_image";

fn ensure_not_empty(stage: &str, image: &DynamicImage) -> Result<(), EnhanceError> {
    if image.width() == 0 || image.height() == 0 {
        return Err(EnhanceError::stage(stage, "image has zero width or height"));
    }
    Ok(())
}

/// Remove haze with the dark channel prior
pub struct DehazeStage {
    pub patch_radius: u8,
    pub omega: f32,
    pub min_transmission: f32,
    /// Sigma of the blur applied to the transmission map; 0 disables it
    pub refine_sigma: f32,
}

impl Default for DehazeStage {
    fn default() -> Self {
        Self {
            patch_radius: 7,
            omega: 0.95,
            min_transmission: 0.1,
            refine_sigma: 2.0,
        }
    }
}

impl Stage for DehazeStage {
    fn process(&self, image: DynamicImage, _context: &StageContext) -> Result<DynamicImage, EnhanceError> {
        ensure_not_empty(self.name(), &image)?;
        let rgb = image.to_rgb8();
        let out = dehaze::dehaze(
            &rgb,
            self.patch_radius,
            self.omega,
            self.min_transmission,
            self.refine_sigma,
        );
        Ok(DynamicImage::ImageRgb8(out))
    }

    fn name(&self) -> &str {
        "Dehaze"
    }

    fn artifact(&self) -> Option<&str> {
        Some(DEHAZED_ARTIFACT)
    }
}

/// Per-channel percentile contrast stretch
pub struct ContrastStretchStage {
    pub clip: f32,
}

impl Stage for ContrastStretchStage {
    fn process(&self, image: DynamicImage, _context: &StageContext) -> Result<DynamicImage, EnhanceError> {
        ensure_not_empty(self.name(), &image)?;
        let rgb = image.to_rgb8();
        Ok(DynamicImage::ImageRgb8(dehaze::contrast_stretch(&rgb, self.clip)))
    }

    fn name(&self) -> &str {
        "Contrast Stretch"
    }

    fn artifact(&self) -> Option<&str> {
        Some(CONTRAST_ARTIFACT)
    }
}

/// Gaussian blur to suppress noise amplified by dehazing
pub struct GaussianBlurStage {
    pub sigma: f32,
}

impl Stage for GaussianBlurStage {
    fn process(&self, image: DynamicImage, _context: &StageContext) -> Result<DynamicImage, EnhanceError> {
        ensure_not_empty(self.name(), &image)?;
        if self.sigma <= 0.0 {
            return Err(EnhanceError::stage(self.name(), format!("sigma must be positive, got {}", self.sigma)));
        }
        let rgb = image.to_rgb8();
        Ok(DynamicImage::ImageRgb8(gaussian_blur_f32(&rgb, self.sigma)))
    }

    fn name(&self) -> &str {
        "Gaussian Blur"
    }

    fn artifact(&self) -> Option<&str> {
        Some(GAUSSIAN_BLURRED_ARTIFACT)
    }
}
