#![allow(dead_code)]

mod fixtures;
pub use fixtures::*;

// Re-export commonly used types from hazeview for tests
pub use hazeview::{
    Detection, FailureKind, Job, OutputLayout, PipelineController, ResultMessage, Session, SubmitError,
    result_channel,
};
