use clap::Parser;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing::Level;

use hazeview::{
    Config, ContourDetector, DehazeEnhancer, Detector, EnhanceConfig, OutputLayout, Session,
    StderrSlot, build_standard_pipeline, shell::TerminalPresenter,
};

#[derive(Parser)]
#[command(name = "hazeview")]
#[command(about = "Dehaze an image, detect objects in the result and show both side by side")]
struct Cli {
    /// Path to input image file
    #[arg(value_name = "IMAGE")]
    image_path: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,

    /// Directory for output artifacts [default: output/results next to the executable]
    #[arg(long, value_name = "DIR")]
    output_dir: Option<PathBuf>,

    /// Artifact loaded for detection after enhancement
    #[arg(long, value_name = "NAME", default_value = "gaussian_blurred_image")]
    artifact: String,

    /// Save every stage's output under DIR/<image name>/
    #[arg(long, value_name = "DIR")]
    debug_out: Option<PathBuf>,

    /// How often to check for results, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    poll_ms: u64,

    /// Spinner frame interval, in milliseconds
    #[arg(long, value_name = "MS", default_value_t = 100)]
    spinner_ms: u64,

    /// Dark channel patch radius
    #[arg(long, default_value_t = 7)]
    patch_radius: u8,

    /// Fraction of haze to remove
    #[arg(long, default_value_t = 0.95)]
    omega: f32,

    /// Sigma of the final gaussian blur
    #[arg(long, default_value_t = 1.0)]
    blur_sigma: f32,

    /// Skip object detection (faster, enhancement only)
    #[arg(long)]
    skip_detection: bool,
}

impl Cli {
    fn config(&self) -> anyhow::Result<Config> {
        let layout = match &self.output_dir {
            Some(dir) => OutputLayout::new(dir, self.artifact.clone()),
            None => OutputLayout::beside_executable()?.with_primary_artifact(self.artifact.clone()),
        };
        let enhance = EnhanceConfig {
            patch_radius: self.patch_radius,
            omega: self.omega,
            blur_sigma: self.blur_sigma,
            debug_dir: self.debug_out.clone(),
            ..EnhanceConfig::default()
        };
        let config = Config::new(layout)
            .with_enhance(enhance)
            .with_poll_interval(Duration::from_millis(self.poll_ms))
            .with_spinner_interval(Duration::from_millis(self.spinner_ms))
            .with_detection(!self.skip_detection);
        config.validate()?;
        Ok(config)
    }
}

fn init_logging(verbose: bool) {
    let level = if verbose { Level::DEBUG } else { Level::INFO };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    init_logging(args.verbose);
    let config = args.config()?;

    let enhancer = Arc::new(DehazeEnhancer::new(
        build_standard_pipeline(&config.enhance),
        config.layout.clone(),
    ));
    let detector: Option<Arc<dyn Detector>> = if config.detect {
        Some(Arc::new(ContourDetector::new()))
    } else {
        None
    };

    let mut session = Session::new(
        enhancer,
        detector,
        config.layout.clone(),
        Arc::new(StderrSlot::default()),
        config.spinner_interval,
    );
    let mut presenter = TerminalPresenter::new(config.layout.results_dir());

    session.submit(args.image_path.as_deref())?;

    let mut ticker = tokio::time::interval(config.poll_interval);
    loop {
        ticker.tick().await;
        if session.poll(&mut presenter).finished {
            break;
        }
    }
    // let the spinner thread clear its line before the process exits
    tokio::time::sleep(config.spinner_interval).await;

    if presenter.errors > 0 {
        anyhow::bail!("processing finished with {} error(s)", presenter.errors);
    }
    Ok(())
}
