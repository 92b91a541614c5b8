pub mod animation;
pub mod annotate;
pub mod channel;
pub mod config;
pub mod controller;
pub mod detection;
pub mod enhance;
pub mod error;
pub mod job;
pub mod models;
pub mod pipeline;
pub mod session;
pub mod shell;

pub use animation::{AnimationDriver, DisplaySlot, StderrSlot};
pub use annotate::annotate;
pub use channel::{ResultMessage, ResultReceiver, ResultSender, result_channel};
pub use config::{Config, EnhanceConfig, OutputLayout};
pub use controller::PipelineController;
pub use detection::{ContourDetector, Detector};
pub use enhance::{DehazeEnhancer, Enhancement, Enhancer, build_standard_pipeline};
pub use error::{AnnotateError, ConfigError, EnhanceError, Failure, FailureKind, InputError, SubmitError};
pub use job::Job;
pub use models::Detection;
pub use pipeline::{Pipeline, Stage, StageContext, StageOutput};
pub use session::{PollReport, Presenter, ResultViews, Session};
