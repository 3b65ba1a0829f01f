//! Heuristic exercise classification with majority-vote smoothing.
//!
//! Each frame is reduced to a handful of joint angles and body-center
//! positions, then matched against [`CLASSIFICATION_RULES`] in order; the
//! first matching rule is the frame's raw guess. Raw guesses go into a
//! five-deep history and the displayed exercise only changes once one
//! label holds at least three of those five slots.

use std::collections::HashMap;

use serde::Serialize;
use workout_core::{
    extract_joint_positions, ExerciseKind, ExerciseLabel, Joint, JointPositions, Landmark, Point2,
    Result,
};

use crate::buffer::BoundedWindow;
use crate::features::JointAngles;

/// Frames retained in the landmark window
pub const WINDOW_CAPACITY: usize = 30;

/// Raw predictions retained for smoothing
pub const HISTORY_CAPACITY: usize = 5;

/// Frames needed before the first classification attempt
pub const WARMUP_FRAMES: usize = 5;

/// Votes within the history needed to lock a label
pub const LOCK_VOTES: usize = 3;

/// Everything the classification rules look at for one frame
#[derive(Debug, Clone, Copy, Serialize)]
pub struct PoseFeatures {
    pub angles: JointAngles,
    pub shoulder_center: Point2,
    pub hip_center: Point2,
    pub knee_center: Point2,
    pub ankle_center: Point2,
}

impl PoseFeatures {
    pub fn resolve(positions: &JointPositions) -> Result<Self> {
        Ok(Self {
            angles: JointAngles::resolve(positions)?,
            shoulder_center: positions.require(Joint::ShoulderCenter)?,
            hip_center: positions.require(Joint::HipCenter)?,
            knee_center: positions.require(Joint::KneeCenter)?,
            ankle_center: positions.require(Joint::AnkleCenter)?,
        })
    }
}

/// A heuristic that recognizes one exercise from a single frame
#[derive(Debug, Clone, Copy)]
pub struct ClassificationRule {
    pub kind: ExerciseKind,
    pub confidence: f64,
    pub matches: fn(&PoseFeatures) -> bool,
}

/// Rules in priority order; the first match wins.
///
/// The heuristics overlap (a squat held with curled arms also satisfies
/// the curl rule), so the order is part of the classification.
pub static CLASSIFICATION_RULES: [ClassificationRule; 5] = [
    ClassificationRule {
        kind: ExerciseKind::Squats,
        confidence: 0.7,
        matches: is_squat,
    },
    ClassificationRule {
        kind: ExerciseKind::PushUps,
        confidence: 0.8,
        matches: is_push_up,
    },
    ClassificationRule {
        kind: ExerciseKind::JumpingJacks,
        confidence: 0.9,
        matches: is_jumping_jack,
    },
    ClassificationRule {
        kind: ExerciseKind::Lunges,
        confidence: 0.7,
        matches: is_lunge,
    },
    ClassificationRule {
        kind: ExerciseKind::BicepCurls,
        confidence: 0.8,
        matches: is_bicep_curl,
    },
];

/// Both knees bent with the hips dropped below the knees, arms low
fn is_squat(f: &PoseFeatures) -> bool {
    f.angles.right_knee < 120.0
        && f.angles.left_knee < 120.0
        && f.hip_center.y > f.knee_center.y
        && f.angles.arm_spread < 100.0
}

/// Body roughly horizontal with both elbows bent
fn is_push_up(f: &PoseFeatures) -> bool {
    (f.shoulder_center.y - f.ankle_center.y).abs() < 0.15
        && f.angles.right_elbow < 120.0
        && f.angles.left_elbow < 120.0
}

/// Arms and legs spread
fn is_jumping_jack(f: &PoseFeatures) -> bool {
    f.angles.arm_spread > 100.0 && f.angles.leg_spread > 30.0
}

/// One knee bent while the other stays straight
fn is_lunge(f: &PoseFeatures) -> bool {
    let a = &f.angles;
    (a.right_knee < 120.0 && a.left_knee > 150.0) || (a.left_knee < 120.0 && a.right_knee > 150.0)
}

/// A bent elbow with the upper arm held against the body
fn is_bicep_curl(f: &PoseFeatures) -> bool {
    let a = &f.angles;
    (a.right_elbow < 100.0 && a.right_shoulder < 60.0)
        || (a.left_elbow < 100.0 && a.left_shoulder < 60.0)
}

/// First rule matching the frame, if any
pub fn raw_prediction(features: &PoseFeatures) -> Option<&'static ClassificationRule> {
    CLASSIFICATION_RULES
        .iter()
        .find(|rule| (rule.matches)(features))
}

/// Stateful classifier producing a stable exercise label
#[derive(Debug, Clone)]
pub struct ExerciseClassifier {
    window: BoundedWindow<Vec<Landmark>>,
    history: BoundedWindow<ExerciseKind>,
    current: Option<ExerciseKind>,
    confidence: f64,
    last_raw: Option<(ExerciseKind, f64)>,
}

impl ExerciseClassifier {
    pub fn new() -> Self {
        Self {
            window: BoundedWindow::new(WINDOW_CAPACITY),
            history: BoundedWindow::new(HISTORY_CAPACITY),
            current: None,
            confidence: 0.0,
            last_raw: None,
        }
    }

    /// Classify one frame and return the label to display
    pub fn classify(&mut self, landmarks: &[Landmark]) -> ExerciseLabel {
        if landmarks.is_empty() {
            return ExerciseLabel::NoPose;
        }

        self.window.push(landmarks.to_vec());
        if self.window.len() < WARMUP_FRAMES {
            return ExerciseLabel::WarmingUp;
        }

        let positions = extract_joint_positions(landmarks);
        if positions.is_empty() {
            return ExerciseLabel::IncompletePose;
        }

        match PoseFeatures::resolve(&positions) {
            Ok(features) => {
                self.last_raw = raw_prediction(&features).map(|rule| (rule.kind, rule.confidence));
                if let Some((kind, _)) = self.last_raw {
                    self.record_prediction(kind);
                }
            }
            Err(e) => {
                tracing::warn!(error = %e, "Skipping exercise classification for frame");
            }
        }

        self.label()
    }

    /// Add a raw prediction to the history and re-evaluate the locked label
    pub fn record_prediction(&mut self, kind: ExerciseKind) {
        self.history.push(kind);

        let mut tally: HashMap<ExerciseKind, usize> = HashMap::new();
        for k in self.history.iter() {
            *tally.entry(*k).or_insert(0) += 1;
        }

        let Some((&leader, &votes)) = tally.iter().max_by_key(|(_, votes)| **votes) else {
            return;
        };

        if votes >= LOCK_VOTES {
            if self.current != Some(leader) {
                tracing::debug!(
                    exercise = %leader,
                    votes,
                    "Exercise label locked"
                );
            }
            self.current = Some(leader);
            self.confidence = votes as f64 / self.history.len() as f64;
        }
    }

    /// Locked exercise, or the movement sentinel before any lock
    pub fn label(&self) -> ExerciseLabel {
        self.current
            .map(ExerciseLabel::Exercise)
            .unwrap_or(ExerciseLabel::MovementDetected)
    }

    pub fn current_exercise(&self) -> Option<ExerciseKind> {
        self.current
    }

    /// Share of the history agreeing with the locked label
    pub fn confidence(&self) -> f64 {
        self.confidence
    }

    /// Raw guess of the most recent classified frame
    pub fn last_raw_prediction(&self) -> Option<(ExerciseKind, f64)> {
        self.last_raw
    }

    pub fn frames_observed(&self) -> usize {
        self.window.len()
    }

    pub fn history(&self) -> impl Iterator<Item = &ExerciseKind> {
        self.history.iter()
    }
}

impl Default for ExerciseClassifier {
    fn default() -> Self {
        Self::new()
    }
}
