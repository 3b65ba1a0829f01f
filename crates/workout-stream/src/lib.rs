//! # Workout-Stream
//!
//! Feeds landmark frames from an external pose model through a
//! [`workout_tracker::ExercisePredictor`] and publishes one JSON message per
//! frame.
//!
//! ## Message stream
//!
//! - `VIDEO_FRAME`: rep count, exercise label, form feedback and session
//!   statistics for a processed frame
//! - `ERROR`: a frame that could not be decoded, or a source that could not
//!   be opened
//!
//! ## Usage
//!
//! ```bash
//! # Count squats from a recorded landmark stream
//! workout-assistant --input session.jsonl --exercise-type Squats
//!
//! # Classify automatically from a live pose model on stdin
//! pose-model --camera 0 | workout-assistant --camera-index 0
//! ```

use clap::Parser;
use std::path::PathBuf;

pub mod config;
pub mod message;
pub mod pipeline;
pub mod source;

pub use config::*;
pub use message::*;
pub use pipeline::*;
pub use source::*;

/// Workout assistant command line
#[derive(Parser, Debug)]
#[command(name = "workout-assistant")]
#[command(author, version, about = "Exercise recognition and rep counting from pose landmarks")]
pub struct Cli {
    /// Configuration file (TOML, YAML or JSON)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Camera the pose model reads from
    #[arg(long)]
    pub camera_index: Option<u32>,

    /// "Automatic Detection" or an exercise label such as "Squats"
    #[arg(long)]
    pub exercise_type: Option<String>,

    /// Landmark stream (JSON lines); stdin when omitted
    #[arg(long)]
    pub input: Option<PathBuf>,

    /// Delay after each frame in milliseconds
    #[arg(long)]
    pub frame_interval_ms: Option<u64>,
}

impl Cli {
    /// Load the layered configuration and apply command-line overrides
    pub fn session_config(&self) -> workout_core::Result<SessionConfig> {
        let mut config = SessionConfig::load(self.config.as_deref())?;

        if let Some(camera_index) = self.camera_index {
            config.camera_index = camera_index;
        }
        if let Some(exercise_type) = &self.exercise_type {
            config.exercise_type = exercise_type.clone();
        }
        if let Some(input) = &self.input {
            config.input = Some(input.clone());
        }
        if let Some(frame_interval_ms) = self.frame_interval_ms {
            config.frame_interval_ms = frame_interval_ms;
        }

        config.validate()?;
        Ok(config)
    }
}
