//! Session configuration.
//!
//! Values are layered: built-in defaults, then an optional file, then
//! `WORKOUT_*` environment variables (nested keys joined with `__`, e.g.
//! `WORKOUT_THRESHOLDS__SQUATS__KNEE__MIN=65`). Command-line flags are
//! applied on top by the binary.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use workout_core::{Error, ExerciseMode, Result};
use workout_tracker::{PredictorConfig, Thresholds};

const ENV_PREFIX: &str = "WORKOUT";

/// Complete session configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Camera the upstream pose model reads from
    pub camera_index: u32,

    /// "Automatic Detection" or one of the exercise labels
    pub exercise_type: String,

    /// Landmark stream to read; stdin when absent
    pub input: Option<PathBuf>,

    /// Delay after each processed frame (milliseconds)
    pub frame_interval_ms: u64,

    /// Distinct feedback messages published with each frame
    pub feedback_history: usize,

    /// Reps between progression suggestions
    pub milestone_every: u32,

    pub thresholds: Thresholds,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            camera_index: 0,
            exercise_type: ExerciseMode::AUTOMATIC_LABEL.to_string(),
            input: None,
            frame_interval_ms: 50,
            feedback_history: 3,
            milestone_every: 10,
            thresholds: Thresholds::default(),
        }
    }
}

impl SessionConfig {
    /// Load configuration from file, with environment overrides
    pub fn from_file(path: &Path) -> Result<Self> {
        Self::build(Self::defaults()?.add_source(config::File::from(path)))
    }

    /// Load from environment variables
    pub fn from_env() -> Result<Self> {
        Self::build(Self::defaults()?)
    }

    /// Load from an optional file plus the environment
    pub fn load(path: Option<&Path>) -> Result<Self> {
        match path {
            Some(path) => Self::from_file(path),
            None => Self::from_env(),
        }
    }

    fn defaults() -> Result<config::ConfigBuilder<config::builder::DefaultState>> {
        let defaults = config::Config::try_from(&SessionConfig::default()).map_err(config_error)?;
        Ok(config::Config::builder().add_source(defaults))
    }

    fn build(builder: config::ConfigBuilder<config::builder::DefaultState>) -> Result<Self> {
        let settings = builder
            .add_source(
                config::Environment::with_prefix(ENV_PREFIX)
                    .prefix_separator("_")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(config_error)?;

        let config: SessionConfig = settings.try_deserialize().map_err(config_error)?;
        config.validate()?;
        Ok(config)
    }

    /// Reject values the session cannot run with
    pub fn validate(&self) -> Result<()> {
        self.mode()?;
        if self.feedback_history == 0 {
            return Err(Error::Config("feedback_history must be at least 1".into()));
        }
        Ok(())
    }

    pub fn mode(&self) -> Result<ExerciseMode> {
        self.exercise_type
            .parse()
            .map_err(|e: Error| Error::Config(e.to_string()))
    }

    pub fn frame_interval(&self) -> Duration {
        Duration::from_millis(self.frame_interval_ms)
    }

    pub fn predictor_config(&self) -> Result<PredictorConfig> {
        Ok(PredictorConfig {
            mode: self.mode()?,
            thresholds: self.thresholds,
            feedback_history: self.feedback_history,
            milestone_every: self.milestone_every,
        })
    }
}

fn config_error(e: config::ConfigError) -> Error {
    Error::Config(e.to_string())
}
