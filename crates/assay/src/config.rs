//! Session configuration
//!
//! Loaded from YAML, optionally overridden from the environment, and
//! validated before a run starts.
//!
//! ```yaml
//! default_wait_secs: 5.0
//! poll_interval_ms: 100
//! screenshots: on_failure
//! output_dir: target/assay-reports
//! formats: [html, junit, json]
//! ```

use crate::reporter::ReportFormat;
use crate::result::{AssayError, AssayResult};
use crate::wait::{DEFAULT_POLL_INTERVAL_MS, DEFAULT_WAIT_SECS};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Environment variable overriding the default wait
pub const ENV_DEFAULT_WAIT: &str = "ASSAY_DEFAULT_WAIT";
/// Environment variable overriding the poll interval
pub const ENV_POLL_INTERVAL_MS: &str = "ASSAY_POLL_INTERVAL_MS";
/// Environment variable overriding the report directory
pub const ENV_OUTPUT_DIR: &str = "ASSAY_OUTPUT_DIR";
/// Environment variable overriding the screenshot policy
pub const ENV_SCREENSHOTS: &str = "ASSAY_SCREENSHOTS";

/// When to attach screenshots to results
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ScreenshotPolicy {
    /// Never capture
    Never,
    /// Capture for FAIL results
    #[default]
    OnFailure,
    /// Capture for every element and page check
    Always,
}

impl ScreenshotPolicy {
    /// Whether a result with `failed` status should carry a screenshot
    #[must_use]
    pub const fn wants(&self, failed: bool) -> bool {
        match self {
            Self::Never => false,
            Self::OnFailure => failed,
            Self::Always => true,
        }
    }

    fn parse(value: &str) -> AssayResult<Self> {
        match value.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "never" => Ok(Self::Never),
            "on_failure" => Ok(Self::OnFailure),
            "always" => Ok(Self::Always),
            other => Err(AssayError::Config {
                message: format!("unknown screenshot policy `{other}`"),
            }),
        }
    }
}

/// Configuration for a test session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssayConfig {
    /// Session default wait in seconds
    pub default_wait_secs: f64,
    /// Interval between predicate evaluations
    pub poll_interval_ms: u64,
    /// Screenshot policy
    pub screenshots: ScreenshotPolicy,
    /// Directory reports are written to
    pub output_dir: PathBuf,
    /// Report formats to write
    pub formats: Vec<ReportFormat>,
}

impl Default for AssayConfig {
    fn default() -> Self {
        Self {
            default_wait_secs: DEFAULT_WAIT_SECS,
            poll_interval_ms: DEFAULT_POLL_INTERVAL_MS,
            screenshots: ScreenshotPolicy::OnFailure,
            output_dir: PathBuf::from("target/assay-reports"),
            formats: ReportFormat::ALL.to_vec(),
        }
    }
}

impl AssayConfig {
    /// Parse and validate YAML
    ///
    /// # Errors
    ///
    /// Returns error if the YAML is malformed or a value is out of range
    pub fn from_yaml_str(yaml: &str) -> AssayResult<Self> {
        let config: Self = serde_yaml_ng::from_str(yaml)?;
        config.validate()?;
        Ok(config)
    }

    /// Load and validate a YAML file
    ///
    /// # Errors
    ///
    /// Returns error if the file cannot be read or is invalid
    pub fn load(path: &Path) -> AssayResult<Self> {
        let yaml = std::fs::read_to_string(path)?;
        Self::from_yaml_str(&yaml)
    }

    /// Apply `ASSAY_*` environment overrides
    ///
    /// # Errors
    ///
    /// Returns `Config` when a variable does not parse or the result is
    /// invalid
    pub fn with_env_overrides(self) -> AssayResult<Self> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides<F>(mut self, lookup: F) -> AssayResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(raw) = lookup(ENV_DEFAULT_WAIT) {
            self.default_wait_secs = raw.trim().parse().map_err(|_| AssayError::Config {
                message: format!("{ENV_DEFAULT_WAIT}=`{raw}` is not a number"),
            })?;
        }
        if let Some(raw) = lookup(ENV_POLL_INTERVAL_MS) {
            self.poll_interval_ms = raw.trim().parse().map_err(|_| AssayError::Config {
                message: format!("{ENV_POLL_INTERVAL_MS}=`{raw}` is not a whole number"),
            })?;
        }
        if let Some(raw) = lookup(ENV_OUTPUT_DIR) {
            self.output_dir = PathBuf::from(raw);
        }
        if let Some(raw) = lookup(ENV_SCREENSHOTS) {
            self.screenshots = ScreenshotPolicy::parse(&raw)?;
        }
        self.validate()?;
        Ok(self)
    }

    /// Check value ranges
    ///
    /// # Errors
    ///
    /// Returns `Config` describing the first invalid value
    pub fn validate(&self) -> AssayResult<()> {
        if !self.default_wait_secs.is_finite()
            || self.default_wait_secs < 0.0
            || Duration::try_from_secs_f64(self.default_wait_secs).is_err()
        {
            return Err(AssayError::Config {
                message: format!(
                    "default_wait_secs must be a non-negative number, got {}",
                    self.default_wait_secs
                ),
            });
        }
        if self.poll_interval_ms == 0 {
            return Err(AssayError::Config {
                message: "poll_interval_ms must be greater than zero".to_string(),
            });
        }
        Ok(())
    }

    /// Set the default wait
    #[must_use]
    pub fn with_default_wait(mut self, seconds: f64) -> Self {
        self.default_wait_secs = seconds;
        self
    }

    /// Set the poll interval
    #[must_use]
    pub fn with_poll_interval_ms(mut self, ms: u64) -> Self {
        self.poll_interval_ms = ms;
        self
    }

    /// Set the screenshot policy
    #[must_use]
    pub fn with_screenshots(mut self, policy: ScreenshotPolicy) -> Self {
        self.screenshots = policy;
        self
    }

    /// Set the report directory
    #[must_use]
    pub fn with_output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.output_dir = dir.into();
        self
    }

    /// Set the report formats
    #[must_use]
    pub fn with_formats(mut self, formats: &[ReportFormat]) -> Self {
        self.formats = formats.to_vec();
        self
    }

    /// Poll interval as a duration
    #[must_use]
    pub const fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }
}
