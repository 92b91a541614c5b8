use image::DynamicImage;
use std::path::PathBuf;
use std::sync::Arc;
use tracing::debug;

use crate::error::EnhanceError;

/// Debug configuration for pipeline execution
#[derive(Clone, Debug)]
pub struct DebugConfig {
    /// Root directory for debug outputs; each run gets a `<label>/` subdirectory
    pub output_dir: PathBuf,
}

/// Context available to all pipeline stages
#[derive(Clone, Default)]
pub struct StageContext {
    /// Label of the job being processed (derived from the source file name)
    pub label: String,
    pub debug: Option<DebugConfig>,
}

/// Trait that all enhancement stages must implement
pub trait Stage: Send + Sync {
    /// Transform one image into the next
    fn process(&self, image: DynamicImage, context: &StageContext) -> Result<DynamicImage, EnhanceError>;

    /// Human-readable name for this stage (used in logs and debug file names)
    fn name(&self) -> &str;

    /// Name of the artifact this stage persists, if any
    fn artifact(&self) -> Option<&str> {
        None
    }
}

/// Image produced by one stage
#[derive(Clone)]
pub struct StageOutput {
    pub stage: String,
    pub artifact: Option<String>,
    pub image: DynamicImage,
}

/// Composable stage pipeline
#[derive(Clone, Default)]
pub struct Pipeline {
    stages: Vec<Arc<dyn Stage>>,
    debug: Option<DebugConfig>,
}

impl Pipeline {
    /// Create a new empty pipeline
    pub fn new() -> Self {
        Self::default()
    }

    /// Dump every stage output under `output_dir/<label>/`
    pub fn with_debug(mut self, output_dir: PathBuf) -> Self {
        self.debug = Some(DebugConfig { output_dir });
        self
    }

    /// Add a processing stage to the pipeline
    pub fn add_stage(mut self, stage: Arc<dyn Stage>) -> Self {
        self.stages.push(stage);
        self
    }

    /// Helper method to add a stage from a Box (for convenience)
    pub fn add_stage_boxed(mut self, stage: Box<dyn Stage>) -> Self {
        self.stages.push(Arc::from(stage));
        self
    }

    pub fn len(&self) -> usize {
        self.stages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stages.is_empty()
    }

    /// Names of the artifacts the stages persist, in stage order
    pub fn artifact_names(&self) -> Vec<&str> {
        self.stages.iter().filter_map(|s| s.artifact()).collect()
    }

    /// Run every stage in order, returning each stage's output
    pub fn run(&self, input: DynamicImage, label: &str) -> Result<Vec<StageOutput>, EnhanceError> {
        let context = StageContext {
            label: label.to_string(),
            debug: self.debug.clone(),
        };

        if let Some(dir) = debug_dir(&context) {
            std::fs::create_dir_all(&dir)?;
            save_debug(&input, dir.join("00_input.png"))?;
        }

        let mut outputs: Vec<StageOutput> = Vec::with_capacity(self.stages.len());
        let mut current = input;

        for (idx, stage) in self.stages.iter().enumerate() {
            debug!(
                stage = stage.name(),
                width = current.width(),
                height = current.height(),
                "running stage"
            );

            current = stage.process(current, &context)?;

            if let Some(dir) = debug_dir(&context) {
                let file_name = format!("{:02}_{}.png", idx + 1, stage.name().to_lowercase().replace(' ', "_"));
                save_debug(&current, dir.join(&file_name))?;
                debug!("saved debug output {}", file_name);
            }

            outputs.push(StageOutput {
                stage: stage.name().to_string(),
                artifact: stage.artifact().map(str::to_string),
                image: current.clone(),
            });
        }

        Ok(outputs)
    }
}

fn debug_dir(context: &StageContext) -> Option<PathBuf> {
    context
        .debug
        .as_ref()
        .map(|debug| debug.output_dir.join(&context.label))
}

fn save_debug(image: &DynamicImage, path: PathBuf) -> Result<(), EnhanceError> {
    image
        .save(&path)
        .map_err(|source| EnhanceError::Artifact { path, source })
}
