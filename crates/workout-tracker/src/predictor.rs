//! Session object tying classification, counting and feedback together.

use serde::{Deserialize, Serialize};
use workout_core::{extract_joint_positions, ExerciseKind, ExerciseLabel, ExerciseMode, Landmark};

use crate::classifier::ExerciseClassifier;
use crate::feedback::{milestone_message, FeedbackLog};
use crate::repetition::{PostureState, RepetitionCounter};
use crate::stats::SessionStats;
use crate::thresholds::Thresholds;

/// Predictor configuration
#[derive(Debug, Clone, PartialEq)]
pub struct PredictorConfig {
    /// Automatic classification or a forced exercise
    pub mode: ExerciseMode,
    pub thresholds: Thresholds,
    /// Distinct feedback messages carried in each report
    pub feedback_history: usize,
    /// Reps between progression suggestions
    pub milestone_every: u32,
}

impl Default for PredictorConfig {
    fn default() -> Self {
        Self {
            mode: ExerciseMode::Automatic,
            thresholds: Thresholds::default(),
            feedback_history: 3,
            milestone_every: 10,
        }
    }
}

/// Everything published for one processed frame
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FrameReport {
    pub rep_count: u32,
    pub exercise: String,
    /// Feedback produced by this frame, if any
    pub feedback: Option<String>,
    /// Most recent distinct feedback messages, oldest first
    pub recent_feedback: Vec<String>,
    pub stats: SessionStats,
}

/// Long-lived per-session state, driven one frame at a time
#[derive(Debug, Clone)]
pub struct ExercisePredictor {
    config: PredictorConfig,
    classifier: ExerciseClassifier,
    counter: RepetitionCounter,
    label: ExerciseLabel,
    feedback_log: FeedbackLog,
    completed: Vec<ExerciseKind>,
}

impl ExercisePredictor {
    pub fn new(config: PredictorConfig) -> Self {
        let counter = RepetitionCounter::new(config.thresholds);
        Self {
            config,
            classifier: ExerciseClassifier::new(),
            counter,
            label: ExerciseLabel::NoneDetected,
            feedback_log: FeedbackLog::new(),
            completed: Vec::new(),
        }
    }

    /// Classify, count and collect feedback for one frame.
    ///
    /// Never fails: a frame whose joints cannot be resolved is logged and
    /// leaves the counter and posture untouched.
    pub fn process_frame(&mut self, landmarks: &[Landmark], elapsed_secs: f64) -> FrameReport {
        if landmarks.is_empty() {
            // The forced label survives frames without a pose
            if self.config.mode == ExerciseMode::Automatic {
                self.label = self.classifier.classify(landmarks);
            }
            return self.report(None, elapsed_secs);
        }

        self.label = match self.config.mode {
            ExerciseMode::Automatic => self.classifier.classify(landmarks),
            ExerciseMode::Fixed(kind) => ExerciseLabel::Exercise(kind),
        };

        let mut feedback = None;
        if let Some(kind) = self.label.exercise() {
            let positions = extract_joint_positions(landmarks);
            match self.counter.count(kind, &positions) {
                Ok(Some(f)) => {
                    let message = f.message().to_string();
                    if self.feedback_log.push(message.clone()) {
                        tracing::debug!(feedback = %message, "New form feedback");
                    }
                    feedback = Some(message);
                }
                Ok(None) => {}
                Err(e) => {
                    tracing::warn!(exercise = %kind, error = %e, "Skipping repetition count for frame");
                }
            }
            self.check_milestone(kind);
        }

        self.report(feedback, elapsed_secs)
    }

    fn check_milestone(&mut self, kind: ExerciseKind) {
        let reps = self.counter.rep_count();
        if self.config.milestone_every == 0
            || reps == 0
            || reps % self.config.milestone_every != 0
            || self.completed.contains(&kind)
        {
            return;
        }

        let message = milestone_message(kind);
        tracing::info!(exercise = %kind, rep_count = reps, next = %kind.next(), "Milestone reached");
        self.feedback_log.push(message);
        self.completed.push(kind);
    }

    fn report(&self, feedback: Option<String>, elapsed_secs: f64) -> FrameReport {
        let rep_count = self.counter.rep_count();
        FrameReport {
            rep_count,
            exercise: self.label.to_string(),
            feedback,
            recent_feedback: self.feedback_log.recent(self.config.feedback_history),
            stats: SessionStats::compute(rep_count, elapsed_secs),
        }
    }

    pub fn rep_count(&self) -> u32 {
        self.counter.rep_count()
    }

    pub fn label(&self) -> ExerciseLabel {
        self.label
    }

    pub fn posture(&self) -> PostureState {
        self.counter.posture()
    }

    /// Exercises that have earned a progression suggestion, in order
    pub fn completed_exercises(&self) -> &[ExerciseKind] {
        &self.completed
    }

    pub fn feedback_log(&self) -> &FeedbackLog {
        &self.feedback_log
    }

    pub fn classifier(&self) -> &ExerciseClassifier {
        &self.classifier
    }

    pub fn config(&self) -> &PredictorConfig {
        &self.config
    }
}

impl Default for ExercisePredictor {
    fn default() -> Self {
        Self::new(PredictorConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::feedback::Feedback;
    use crate::test_support::PoseBuilder;

    fn fixed(kind: ExerciseKind) -> ExercisePredictor {
        ExercisePredictor::new(PredictorConfig {
            mode: ExerciseMode::Fixed(kind),
            ..PredictorConfig::default()
        })
    }

    fn squat_frame(knee: f64) -> Vec<Landmark> {
        PoseBuilder::standing().knee_angles(knee, knee).build()
    }

    fn squat_rep(predictor: &mut ExercisePredictor) -> Vec<FrameReport> {
        [170.0, 130.0, 60.0, 130.0, 170.0]
            .iter()
            .map(|&k| predictor.process_frame(&squat_frame(k), 10.0))
            .collect()
    }

    #[test]
    fn test_initial_label() {
        let predictor = ExercisePredictor::default();
        assert_eq!(predictor.label(), ExerciseLabel::NoneDetected);
        assert_eq!(predictor.rep_count(), 0);
    }

    #[test]
    fn test_fixed_mode_counts_squats() {
        let mut predictor = fixed(ExerciseKind::Squats);
        let reports = squat_rep(&mut predictor);

        let last = reports.last().unwrap();
        assert_eq!(last.rep_count, 1);
        assert_eq!(last.exercise, "Squats");
        assert_eq!(reports[3].feedback.as_deref(), Some(Feedback::SquatDeeper.message()));
        assert_eq!(last.recent_feedback, vec!["Try to squat deeper".to_string()]);
        assert!((last.stats.calories - 0.3).abs() < 1e-9);
    }

    #[test]
    fn test_empty_frames_fixed_mode() {
        let mut predictor = fixed(ExerciseKind::Lunges);
        let report = predictor.process_frame(&[], 1.0);
        assert_eq!(report.exercise, "None detected");
        assert_eq!(report.rep_count, 0);

        predictor.process_frame(&PoseBuilder::standing().build(), 1.0);
        let report = predictor.process_frame(&[], 2.0);
        assert_eq!(report.exercise, "Lunges");
    }

    #[test]
    fn test_empty_frames_automatic_mode() {
        let mut predictor = ExercisePredictor::default();
        let report = predictor.process_frame(&[], 1.0);
        assert_eq!(report.exercise, "No pose detected");
        assert_eq!(predictor.classifier().frames_observed(), 0);
    }

    #[test]
    fn test_automatic_mode_locks_then_counts() {
        let mut predictor = ExercisePredictor::default();
        let deep = PoseBuilder::standing().deep_squat().build();

        let labels: Vec<String> = (0..7)
            .map(|_| predictor.process_frame(&deep, 1.0).exercise)
            .collect();
        assert_eq!(labels[0], "Warming up...");
        assert_eq!(labels[4], "Movement detected");
        assert_eq!(labels[6], "Squats");
        assert_eq!(predictor.label(), ExerciseLabel::Exercise(ExerciseKind::Squats));
    }

    #[test]
    fn test_milestone_after_ten_reps() {
        let mut predictor = fixed(ExerciseKind::Squats);
        for _ in 0..10 {
            squat_rep(&mut predictor);
        }

        assert_eq!(predictor.rep_count(), 10);
        assert_eq!(predictor.completed_exercises(), &[ExerciseKind::Squats]);
        let messages = predictor.feedback_log().messages();
        assert_eq!(messages.last().map(String::as_str), Some("Great job! Try Lunges next"));
        let logged = messages.len();

        // Staying at ten reps does not repeat the suggestion
        predictor.process_frame(&squat_frame(170.0), 60.0);
        assert_eq!(predictor.completed_exercises().len(), 1);
        assert_eq!(predictor.feedback_log().len(), logged);
    }

    #[test]
    fn test_recent_feedback_is_bounded() {
        let mut predictor = ExercisePredictor::new(PredictorConfig {
            mode: ExerciseMode::Fixed(ExerciseKind::JumpingJacks),
            feedback_history: 2,
            ..PredictorConfig::default()
        });
        let jacks = |arm: f64, leg: f64| PoseBuilder::standing().spread(arm, leg).build();

        predictor.process_frame(&jacks(30.0, 15.0), 1.0);
        predictor.process_frame(&jacks(130.0, 45.0), 1.0);
        predictor.process_frame(&jacks(100.0, 45.0), 1.0);
        let report = predictor.process_frame(&jacks(100.0, 25.0), 1.0);

        assert_eq!(predictor.feedback_log().len(), 2);
        assert_eq!(
            report.recent_feedback,
            vec!["Raise your arms higher".to_string(), "Spread your legs wider".to_string()]
        );
    }

    #[test]
    fn test_malformed_frame_is_absorbed() {
        let mut predictor = fixed(ExerciseKind::Squats);
        predictor.process_frame(&squat_frame(170.0), 1.0);
        let posture = predictor.posture();

        let truncated = PoseBuilder::standing().truncate(20).build();
        let report = predictor.process_frame(&truncated, 2.0);

        assert_eq!(report.rep_count, 0);
        assert_eq!(report.feedback, None);
        assert_eq!(predictor.posture(), posture);
    }

    #[test]
    fn test_report_serializes_camel_case() {
        let mut predictor = fixed(ExerciseKind::Squats);
        let report = predictor.process_frame(&squat_frame(170.0), 30.0);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(json["repCount"], 0);
        assert_eq!(json["exercise"], "Squats");
        assert!(json["recentFeedback"].is_array());
        assert!(json["stats"]["repsPerMin"].is_number());
    }
}
