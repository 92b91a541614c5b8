use std::fmt;
use std::path::PathBuf;

use thiserror::Error;

/// Coarse category of a failed job, carried on the result channel so the
/// consumer can branch without parsing text.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    Enhancement,
    Io,
    Panic,
}

impl FailureKind {
    pub fn as_str(self) -> &'static str {
        match self {
            FailureKind::Enhancement => "enhancement",
            FailureKind::Io => "io",
            FailureKind::Panic => "panic",
        }
    }
}

/// Failure payload posted by the worker when a job does not succeed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Failure {
    pub kind: FailureKind,
    pub message: String,
}

impl Failure {
    pub fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// Build a failure from a caught panic payload
    pub fn from_panic(payload: &(dyn std::any::Any + Send)) -> Self {
        let message = if let Some(s) = payload.downcast_ref::<&str>() {
            (*s).to_string()
        } else if let Some(s) = payload.downcast_ref::<String>() {
            s.clone()
        } else {
            "worker panicked".to_string()
        };
        Self::new(FailureKind::Panic, message)
    }
}

impl fmt::Display for Failure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "An error occurred: {}", self.message)
    }
}

impl From<&EnhanceError> for Failure {
    fn from(err: &EnhanceError) -> Self {
        Self::new(err.kind(), err.to_string())
    }
}

/// Problems with the user's input, reported before a job starts
#[derive(Error, Debug)]
pub enum InputError {
    #[error("No image selected")]
    NoImageSelected,
    #[error("Could not open image {}: {source}", path.display())]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Could not read image {}: {source}", path.display())]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
}

#[derive(Error, Debug)]
pub enum SubmitError {
    #[error(transparent)]
    Input(#[from] InputError),
    #[error("A job is already being processed")]
    Busy,
    #[error("Failed to spawn worker thread: {0}")]
    Spawn(#[source] std::io::Error),
}

/// Errors raised while enhancing an image
#[derive(Error, Debug)]
pub enum EnhanceError {
    #[error("{stage} failed: {reason}")]
    Stage { stage: String, reason: String },
    #[error("Failed to write artifact {}: {source}", path.display())]
    Artifact {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },
    #[error("{0}")]
    Io(#[from] std::io::Error),
    #[error("Pipeline produced no named output artifact")]
    NoArtifacts,
}

impl EnhanceError {
    pub fn stage(stage: impl Into<String>, reason: impl fmt::Display) -> Self {
        EnhanceError::Stage {
            stage: stage.into(),
            reason: reason.to_string(),
        }
    }

    pub fn kind(&self) -> FailureKind {
        match self {
            EnhanceError::Stage { .. } | EnhanceError::NoArtifacts => FailureKind::Enhancement,
            EnhanceError::Artifact { .. } | EnhanceError::Io(_) => FailureKind::Io,
        }
    }
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum AnnotateError {
    #[error("Cannot annotate an image with zero width or height")]
    EmptyImage,
}

#[derive(Error, Debug, PartialEq)]
pub enum ConfigError {
    #[error("{name} must be greater than zero (got {value})")]
    NotPositive { name: &'static str, value: f32 },
    #[error("omega must be in (0, 1] (got {0})")]
    OmegaOutOfRange(f32),
    #[error("{0} interval must be non-zero")]
    ZeroInterval(&'static str),
    #[error("artifact name must not be empty")]
    EmptyArtifactName,
    #[error("could not locate the running executable: {0}")]
    ExecutableDir(String),
}
