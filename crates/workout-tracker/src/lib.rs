//! # Workout-Tracker
//!
//! Turns a stream of landmark frames into an exercise label, a repetition
//! count and form feedback.
//!
//! ## Per-frame flow
//!
//! 1. **Classifier**: a rolling window of frames feeds an ordered list of
//!    angle heuristics; raw guesses are smoothed by a majority vote over the
//!    last five predictions before the displayed label changes.
//! 2. **Repetition state machine**: the label selects a counting routine
//!    that advances a shared start → end → start posture machine and
//!    returns at most one form-feedback message.
//! 3. **Statistics**: rep count and elapsed time give calories and pace.
//!
//! The [`ExercisePredictor`] owns all of this state for one session and is
//! driven one frame at a time.

pub mod buffer;
pub mod classifier;
pub mod features;
pub mod feedback;
pub mod predictor;
pub mod repetition;
pub mod stats;
pub mod thresholds;

#[cfg(any(test, feature = "test-support"))]
pub mod test_support;

pub use buffer::*;
pub use classifier::*;
pub use features::*;
pub use feedback::*;
pub use predictor::*;
pub use repetition::*;
pub use stats::*;
pub use thresholds::*;
