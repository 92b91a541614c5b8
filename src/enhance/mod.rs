pub mod dehaze;
pub mod stages;

use std::path::PathBuf;
use std::sync::Arc;

use image::DynamicImage;
use tracing::{debug, info};

use crate::config::{EnhanceConfig, OutputLayout};
use crate::error::EnhanceError;
use crate::pipeline::{Pipeline, StageOutput};
use stages::{ContrastStretchStage, DehazeStage, GaussianBlurStage};

/// Produces processed versions of an image and persists named artifacts
pub trait Enhancer: Send + Sync {
    fn enhance(&self, image: &DynamicImage, label: &str) -> Result<Enhancement, EnhanceError>;
}

/// Result of one enhancement run
#[derive(Clone, Default)]
pub struct Enhancement {
    pub outputs: Vec<StageOutput>,
    /// Paths of every artifact written, in stage order
    pub artifacts: Vec<PathBuf>,
}

/// Enhancer backed by a stage [`Pipeline`]; each stage that names an
/// artifact is written to the output layout's results directory
pub struct DehazeEnhancer {
    pipeline: Pipeline,
    layout: OutputLayout,
}

impl DehazeEnhancer {
    pub fn new(pipeline: Pipeline, layout: OutputLayout) -> Self {
        Self { pipeline, layout }
    }
}

impl Enhancer for DehazeEnhancer {
    fn enhance(&self, image: &DynamicImage, label: &str) -> Result<Enhancement, EnhanceError> {
        if self.pipeline.artifact_names().is_empty() {
            return Err(EnhanceError::NoArtifacts);
        }

        info!(label, stages = self.pipeline.len(), "enhancing image");
        let outputs = self.pipeline.run(image.clone(), label)?;

        std::fs::create_dir_all(self.layout.results_dir())?;
        let mut artifacts = Vec::new();
        for output in &outputs {
            let Some(name) = &output.artifact else {
                continue;
            };
            let path = self.layout.artifact_path(name);
            output
                .image
                .save(&path)
                .map_err(|source| EnhanceError::Artifact {
                    path: path.clone(),
                    source,
                })?;
            debug!(artifact = %path.display(), "wrote artifact");
            artifacts.push(path);
        }

        Ok(Enhancement { outputs, artifacts })
    }
}

/// Build the standard dehaze → contrast stretch → blur pipeline
pub fn build_standard_pipeline(config: &EnhanceConfig) -> Pipeline {
    let mut pipeline = Pipeline::new()
        .add_stage(Arc::new(DehazeStage {
            patch_radius: config.patch_radius,
            omega: config.omega,
            min_transmission: config.min_transmission,
            ..DehazeStage::default()
        }))
        .add_stage(Arc::new(ContrastStretchStage {
            clip: config.contrast_clip,
        }))
        .add_stage(Arc::new(GaussianBlurStage {
            sigma: config.blur_sigma,
        }));

    if let Some(dir) = &config.debug_dir {
        pipeline = pipeline.with_debug(dir.clone());
    }

    pipeline
}
