//! Shell-facing side of the pipeline: submit a job, then poll on a timer.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use image::{DynamicImage, RgbImage};
use tracing::{error, info, warn};

use crate::animation::{AnimationDriver, DisplaySlot};
use crate::annotate::annotate;
use crate::channel::{ResultMessage, ResultReceiver, result_channel};
use crate::config::OutputLayout;
use crate::controller::PipelineController;
use crate::detection::Detector;
use crate::enhance::Enhancer;
use crate::error::SubmitError;
use crate::job::Job;
use crate::models::Detection;

pub const OUTPUT_MISSING: &str = "Output image not found";

/// The three images shown after a successful job
pub struct ResultViews {
    pub original: DynamicImage,
    pub enhanced: DynamicImage,
    pub annotated: RgbImage,
    pub detections: Vec<Detection>,
}

/// Whatever displays dialogs and results to the user
pub trait Presenter {
    fn show_info(&mut self, title: &str, message: &str);
    fn show_error(&mut self, title: &str, message: &str);
    fn render(&mut self, views: &ResultViews);
}

/// What one call to [`Session::poll`] did
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PollReport {
    /// Messages drained from the channel
    pub messages: usize,
    /// Output artifact that was loaded, if any
    pub loaded: Option<PathBuf>,
    pub rendered: bool,
    /// A `Finished` sentinel was seen
    pub finished: bool,
}

/// Owns the controller, the receiving end of the result channel, the
/// spinner, and the detector. Lives on the consumer thread.
pub struct Session {
    controller: PipelineController,
    receiver: ResultReceiver,
    animation: AnimationDriver,
    detector: Option<Arc<dyn Detector>>,
    layout: OutputLayout,
    original: Option<DynamicImage>,
    /// Set on submit, cleared once `poll` drains that job's `Finished`
    awaiting_finish: bool,
}

impl Session {
    pub fn new(
        enhancer: Arc<dyn Enhancer>,
        detector: Option<Arc<dyn Detector>>,
        layout: OutputLayout,
        slot: Arc<dyn DisplaySlot>,
        spinner_interval: Duration,
    ) -> Self {
        let (sender, receiver) = result_channel();
        Self {
            controller: PipelineController::new(enhancer, sender),
            receiver,
            animation: AnimationDriver::new(slot, spinner_interval),
            detector,
            layout,
            original: None,
            awaiting_finish: false,
        }
    }

    pub fn layout(&self) -> &OutputLayout {
        &self.layout
    }

    /// True from an accepted submit until its `Finished` has been polled
    pub fn is_busy(&self) -> bool {
        self.awaiting_finish || self.controller.is_busy()
    }

    /// Decode the image at `path` and start processing it. Input problems
    /// are returned here and no job starts.
    pub fn submit(&mut self, path: Option<&Path>) -> Result<(), SubmitError> {
        if self.is_busy() {
            return Err(SubmitError::Busy);
        }
        let job = Job::load(path)?;
        info!(source = %job.source.display(), "submitting job");

        let original = job.image.clone();
        if let Err(err) = self.animation.start() {
            warn!("could not start animation: {err}");
        }
        if let Err(err) = self.controller.run_job(job) {
            self.animation.stop();
            return Err(err);
        }
        self.original = Some(original);
        self.awaiting_finish = true;
        Ok(())
    }

    /// Drain the result channel and act on every message. Never blocks on
    /// the worker; detection and annotation run inline on success.
    pub fn poll(&mut self, presenter: &mut dyn Presenter) -> PollReport {
        let mut report = PollReport::default();

        for message in self.receiver.try_receive_all() {
            report.messages += 1;
            match message {
                ResultMessage::Success(text) => {
                    presenter.show_info("Success", &text);
                    self.display_output(presenter, &mut report);
                }
                ResultMessage::Failure(failure) => {
                    presenter.show_error("Error", &failure.to_string());
                }
                ResultMessage::Finished => {
                    self.animation.stop();
                    self.awaiting_finish = false;
                    report.finished = true;
                }
            }
        }

        report
    }

    fn display_output(&mut self, presenter: &mut dyn Presenter, report: &mut PollReport) {
        let path = self.layout.primary_path();
        if !path.exists() {
            warn!(path = %path.display(), "expected output missing");
            presenter.show_error("Error", OUTPUT_MISSING);
            return;
        }

        let enhanced = match image::open(&path) {
            Ok(img) => img,
            Err(err) => {
                error!(path = %path.display(), "could not load output: {err}");
                presenter.show_error("Error", &format!("Could not load output image: {err}"));
                return;
            }
        };
        report.loaded = Some(path);

        let detections = match &self.detector {
            Some(detector) => match detector.detect(&enhanced) {
                Ok(detections) => detections,
                Err(err) => {
                    presenter.show_error("Error", &format!("Object detection failed: {err}"));
                    Vec::new()
                }
            },
            None => Vec::new(),
        };
        for detection in &detections {
            info!(?detection, "detected");
        }

        let annotated = match annotate(&enhanced, &detections) {
            Ok(img) => img,
            Err(err) => {
                presenter.show_error("Error", &err.to_string());
                return;
            }
        };

        let original = self.original.clone().unwrap_or_else(|| enhanced.clone());
        presenter.render(&ResultViews {
            original,
            enhanced,
            annotated,
            detections,
        });
        report.rendered = true;
    }
}
