use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::enhance::stages::GAUSSIAN_BLURRED_ARTIFACT;
use crate::error::ConfigError;

pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(100);
pub const DEFAULT_SPINNER_INTERVAL: Duration = Duration::from_millis(100);

/// Where enhancement artifacts are written and which one the consumer loads.
///
/// Producer and consumer both derive paths from this; the success message
/// never carries a path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLayout {
    results_dir: PathBuf,
    primary_artifact: String,
}

impl OutputLayout {
    pub fn new(results_dir: impl Into<PathBuf>, primary_artifact: impl Into<String>) -> Self {
        Self {
            results_dir: results_dir.into(),
            primary_artifact: primary_artifact.into(),
        }
    }

    /// `output/results` next to the running executable
    pub fn beside_executable() -> Result<Self, ConfigError> {
        let exe = std::env::current_exe().map_err(|e| ConfigError::ExecutableDir(e.to_string()))?;
        let dir = exe
            .parent()
            .ok_or_else(|| ConfigError::ExecutableDir(exe.display().to_string()))?;
        Ok(Self::new(dir.join("output").join("results"), GAUSSIAN_BLURRED_ARTIFACT))
    }

    pub fn with_primary_artifact(mut self, name: impl Into<String>) -> Self {
        self.primary_artifact = name.into();
        self
    }

    pub fn results_dir(&self) -> &Path {
        &self.results_dir
    }

    pub fn primary_artifact(&self) -> &str {
        &self.primary_artifact
    }

    pub fn artifact_path(&self, name: &str) -> PathBuf {
        self.results_dir.join(format!("{name}.png"))
    }

    /// Path of the artifact the consumer loads after a successful job
    pub fn primary_path(&self) -> PathBuf {
        self.artifact_path(&self.primary_artifact)
    }
}

/// Parameters of the standard enhancement pipeline
#[derive(Debug, Clone, PartialEq)]
pub struct EnhanceConfig {
    pub patch_radius: u8,
    pub omega: f32,
    pub min_transmission: f32,
    pub contrast_clip: f32,
    pub blur_sigma: f32,
    /// Dump each stage's output here when set
    pub debug_dir: Option<PathBuf>,
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            patch_radius: 7,
            omega: 0.95,
            min_transmission: 0.1,
            contrast_clip: 0.01,
            blur_sigma: 1.0,
            debug_dir: None,
        }
    }
}

impl EnhanceConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.omega > 0.0 && self.omega <= 1.0) {
            return Err(ConfigError::OmegaOutOfRange(self.omega));
        }
        if self.blur_sigma <= 0.0 {
            return Err(ConfigError::NotPositive {
                name: "blur sigma",
                value: self.blur_sigma,
            });
        }
        if self.min_transmission <= 0.0 {
            return Err(ConfigError::NotPositive {
                name: "minimum transmission",
                value: self.min_transmission,
            });
        }
        Ok(())
    }
}

/// Runtime configuration of the whole application
#[derive(Debug, Clone)]
pub struct Config {
    pub layout: OutputLayout,
    pub enhance: EnhanceConfig,
    pub poll_interval: Duration,
    pub spinner_interval: Duration,
    /// Run the detector on the enhanced image after a successful job
    pub detect: bool,
}

impl Config {
    pub fn new(layout: OutputLayout) -> Self {
        Self {
            layout,
            enhance: EnhanceConfig::default(),
            poll_interval: DEFAULT_POLL_INTERVAL,
            spinner_interval: DEFAULT_SPINNER_INTERVAL,
            detect: true,
        }
    }

    pub fn with_enhance(mut self, enhance: EnhanceConfig) -> Self {
        self.enhance = enhance;
        self
    }

    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    pub fn with_spinner_interval(mut self, interval: Duration) -> Self {
        self.spinner_interval = interval;
        self
    }

    pub fn with_detection(mut self, detect: bool) -> Self {
        self.detect = detect;
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.layout.primary_artifact().trim().is_empty() {
            return Err(ConfigError::EmptyArtifactName);
        }
        if self.poll_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("poll"));
        }
        if self.spinner_interval.is_zero() {
            return Err(ConfigError::ZeroInterval("spinner"));
        }
        self.enhance.validate()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> Config {
        Config::new(OutputLayout::new("/tmp/out/results", GAUSSIAN_BLURRED_ARTIFACT))
    }

    #[test]
    fn artifact_paths_follow_convention() {
        let layout = OutputLayout::new("/srv/app/output/results", GAUSSIAN_BLURRED_ARTIFACT);
        assert_eq!(
            layout.primary_path(),
            PathBuf::from("/srv/app/output/results/gaussian_blurred_image.png")
        );
        assert_eq!(
            layout.artifact_path("dehazed_image"),
            PathBuf::from("/srv/app/output/results/dehazed_image.png")
        );
    }

    #[test]
    fn beside_executable_ends_in_output_results() {
        let layout = OutputLayout::beside_executable().unwrap();
        assert!(layout.results_dir().ends_with("output/results"));
        assert_eq!(layout.primary_artifact(), GAUSSIAN_BLURRED_ARTIFACT);
    }

    #[test]
    fn defaults_are_valid() {
        assert_eq!(config().validate(), Ok(()));
        assert_eq!(config().poll_interval, Duration::from_millis(100));
    }

    #[test]
    fn invalid_values_are_rejected() {
        let bad_omega = config().with_enhance(EnhanceConfig {
            omega: 1.5,
            ..EnhanceConfig::default()
        });
        assert_eq!(bad_omega.validate(), Err(ConfigError::OmegaOutOfRange(1.5)));

        let bad_sigma = config().with_enhance(EnhanceConfig {
            blur_sigma: 0.0,
            ..EnhanceConfig::default()
        });
        assert!(matches!(bad_sigma.validate(), Err(ConfigError::NotPositive { .. })));

        let zero_poll = config().with_poll_interval(Duration::ZERO);
        assert_eq!(zero_poll.validate(), Err(ConfigError::ZeroInterval("poll")));

        let zero_spin = config().with_spinner_interval(Duration::ZERO);
        assert_eq!(zero_spin.validate(), Err(ConfigError::ZeroInterval("spinner")));

        let mut no_name = config();
        no_name.layout = no_name.layout.with_primary_artifact(" ");
        assert_eq!(no_name.validate(), Err(ConfigError::EmptyArtifactName));
    }
}
