use std::path::Path;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::mpsc::Receiver;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use hazeview::{
    Detection, Detector, EnhanceError, Enhancement, Enhancer, OutputLayout, PollReport, Presenter, ResultMessage,
    ResultReceiver, ResultViews, Session,
};
use image::{DynamicImage, ImageBuffer, Rgb};
use tempfile::NamedTempFile;

pub const WAIT: Duration = Duration::from_secs(5);

/// Creates a 100x100 red test image and returns the temp file.
/// The file will be automatically cleaned up when dropped.
pub fn create_test_image() -> NamedTempFile {
    let img = ImageBuffer::from_fn(100, 100, |_, _| Rgb([255u8, 0u8, 0u8]));
    let file = tempfile::Builder::new()
        .suffix(".png")
        .tempfile()
        .expect("Failed to create temp image file");
    img.save_with_format(file.path(), image::ImageFormat::Png)
        .expect("Failed to save test image");
    file
}

pub fn test_image() -> DynamicImage {
    DynamicImage::ImageRgb8(ImageBuffer::from_pixel(64, 48, Rgb([120u8, 130u8, 140u8])))
}

/// Layout rooted in a fresh temp directory (keep the dir alive)
pub fn temp_layout() -> (OutputLayout, tempfile::TempDir) {
    let dir = tempfile::TempDir::new().expect("Failed to create temp directory");
    let layout = OutputLayout::new(dir.path().join("output/results"), "gaussian_blurred_image");
    (layout, dir)
}

/// Writes a gray image to the layout's primary artifact path
pub struct WritingEnhancer {
    pub layout: OutputLayout,
    pub calls: AtomicUsize,
}

impl WritingEnhancer {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            calls: AtomicUsize::new(0),
        }
    }
}

impl Enhancer for WritingEnhancer {
    fn enhance(&self, image: &DynamicImage, _label: &str) -> Result<Enhancement, EnhanceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        std::fs::create_dir_all(self.layout.results_dir())?;
        let path = self.layout.primary_path();
        image
            .grayscale()
            .to_rgb8()
            .save(&path)
            .map_err(|source| EnhanceError::Artifact {
                path: path.clone(),
                source,
            })?;
        Ok(Enhancement {
            outputs: Vec::new(),
            artifacts: vec![path],
        })
    }
}

/// Reports success without writing anything
pub struct SilentEnhancer;

impl Enhancer for SilentEnhancer {
    fn enhance(&self, _image: &DynamicImage, _label: &str) -> Result<Enhancement, EnhanceError> {
        Ok(Enhancement::default())
    }
}

/// Fails with an I/O error carrying `message`
pub struct FailingEnhancer {
    pub message: &'static str,
}

impl Enhancer for FailingEnhancer {
    fn enhance(&self, _image: &DynamicImage, _label: &str) -> Result<Enhancement, EnhanceError> {
        Err(EnhanceError::Io(std::io::Error::other(self.message)))
    }
}

pub struct PanickingEnhancer;

impl Enhancer for PanickingEnhancer {
    fn enhance(&self, _image: &DynamicImage, _label: &str) -> Result<Enhancement, EnhanceError> {
        panic!("enhancer exploded");
    }
}

/// Blocks inside `enhance` until the test sends on the paired channel
pub struct GatedEnhancer {
    gate: Mutex<Receiver<()>>,
}

impl GatedEnhancer {
    pub fn new() -> (Self, std::sync::mpsc::Sender<()>) {
        let (tx, rx) = std::sync::mpsc::channel();
        (Self { gate: Mutex::new(rx) }, tx)
    }
}

impl Enhancer for GatedEnhancer {
    fn enhance(&self, _image: &DynamicImage, _label: &str) -> Result<Enhancement, EnhanceError> {
        let gate = self.gate.lock().expect("gate poisoned");
        let _ = gate.recv_timeout(WAIT);
        Ok(Enhancement::default())
    }
}

/// Returns a fixed list of detections and counts invocations
pub struct FixedDetector {
    pub detections: Vec<Detection>,
    pub calls: Arc<AtomicUsize>,
}

impl FixedDetector {
    pub fn new(detections: Vec<Detection>) -> Self {
        Self {
            detections,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }
}

impl Detector for FixedDetector {
    fn detect(&self, _img: &DynamicImage) -> anyhow::Result<Vec<Detection>> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.detections.clone())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ShellEvent {
    Info(String),
    Error(String),
    Render {
        original: (u32, u32),
        enhanced: (u32, u32),
        annotated: (u32, u32),
        detections: usize,
    },
}

/// Presenter that records every call
#[derive(Default)]
pub struct RecordingPresenter {
    pub events: Vec<ShellEvent>,
}

impl Presenter for RecordingPresenter {
    fn show_info(&mut self, _title: &str, message: &str) {
        self.events.push(ShellEvent::Info(message.to_string()));
    }

    fn show_error(&mut self, _title: &str, message: &str) {
        self.events.push(ShellEvent::Error(message.to_string()));
    }

    fn render(&mut self, views: &ResultViews) {
        self.events.push(ShellEvent::Render {
            original: (views.original.width(), views.original.height()),
            enhanced: (views.enhanced.width(), views.enhanced.height()),
            annotated: views.annotated.dimensions(),
            detections: views.detections.len(),
        });
    }
}

/// Drain `receiver` until `Finished` arrives or `timeout` passes
pub async fn drain_until_finished(receiver: &ResultReceiver, timeout: Duration) -> Vec<ResultMessage> {
    let start = Instant::now();
    let mut messages = Vec::new();
    while start.elapsed() < timeout {
        messages.extend(receiver.try_receive_all());
        if messages.contains(&ResultMessage::Finished) {
            break;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    messages
}

/// Poll `session` every 10ms until a poll reports `Finished`
pub async fn poll_until_finished(session: &mut Session, presenter: &mut RecordingPresenter) -> Vec<PollReport> {
    let start = Instant::now();
    let mut reports = Vec::new();
    while start.elapsed() < WAIT {
        let report = session.poll(presenter);
        let finished = report.finished;
        if report.messages > 0 {
            reports.push(report);
        }
        if finished {
            break;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    reports
}

pub fn exists(path: &Path) -> bool {
    path.exists()
}
