//! Fundamental types for the workout assistant.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use nalgebra::Vector2;
use serde::{Deserialize, Serialize, Serializer};
use uuid::Uuid;

use crate::error::{Error, Result};

/// Identifier of one coaching session (one process lifetime)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for SessionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Timestamp wrapper with nanosecond precision
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub i64);

impl Timestamp {
    pub fn now() -> Self {
        Self(Utc::now().timestamp_nanos_opt().unwrap_or(0))
    }

    pub fn from_millis(millis: i64) -> Self {
        Self(millis.saturating_mul(1_000_000))
    }

    /// Seconds elapsed from `earlier` to `self`, never negative
    pub fn secs_since(&self, earlier: Timestamp) -> f64 {
        let nanos = i128::from(self.0) - i128::from(earlier.0);
        (nanos as f64 / 1_000_000_000.0).max(0.0)
    }

    pub fn to_datetime(&self) -> DateTime<Utc> {
        DateTime::from_timestamp_nanos(self.0)
    }
}

/// One landmark record produced by the pose model.
///
/// `x` and `y` are normalized to [0, 1] relative to the frame; `z` is the
/// model's relative depth and `visibility` its per-point confidence.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Landmark {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub z: f64,
    #[serde(default)]
    pub visibility: f64,
}

impl Landmark {
    pub fn new(x: f64, y: f64, z: f64, visibility: f64) -> Self {
        Self { x, y, z, visibility }
    }

    pub fn position(&self) -> Point2 {
        Point2::new(self.x, self.y)
    }
}

/// Number of landmarks in the MediaPipe Pose topology
pub const POSE_LANDMARK_COUNT: usize = 33;

/// Landmark indices of the MediaPipe Pose topology used by the tracker
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum PoseLandmark {
    Nose = 0,
    LeftEye = 2,
    RightEye = 5,
    LeftShoulder = 11,
    RightShoulder = 12,
    LeftElbow = 13,
    RightElbow = 14,
    LeftWrist = 15,
    RightWrist = 16,
    LeftHip = 23,
    RightHip = 24,
    LeftKnee = 25,
    RightKnee = 26,
    LeftAnkle = 27,
    RightAnkle = 28,
}

impl PoseLandmark {
    pub fn index(self) -> usize {
        self as usize
    }
}

/// Body side, for per-side feedback
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Side {
    Left,
    Right,
}

impl Side {
    pub fn as_str(&self) -> &'static str {
        match self {
            Side::Left => "left",
            Side::Right => "right",
        }
    }
}

/// Named joints, including midpoints derived from left/right pairs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
#[repr(u8)]
pub enum Joint {
    Nose = 0,
    LeftEye = 1,
    RightEye = 2,
    LeftShoulder = 3,
    RightShoulder = 4,
    LeftElbow = 5,
    RightElbow = 6,
    LeftWrist = 7,
    RightWrist = 8,
    LeftHip = 9,
    RightHip = 10,
    LeftKnee = 11,
    RightKnee = 12,
    LeftAnkle = 13,
    RightAnkle = 14,
    // Derived midpoints
    Neck = 15,
    ShoulderCenter = 16,
    HipCenter = 17,
    KneeCenter = 18,
    AnkleCenter = 19,
}

impl Joint {
    pub const COUNT: usize = 20;

    /// Joints read directly from a landmark
    pub const NAMED: [Joint; 15] = [
        Joint::Nose,
        Joint::LeftEye,
        Joint::RightEye,
        Joint::LeftShoulder,
        Joint::RightShoulder,
        Joint::LeftElbow,
        Joint::RightElbow,
        Joint::LeftWrist,
        Joint::RightWrist,
        Joint::LeftHip,
        Joint::RightHip,
        Joint::LeftKnee,
        Joint::RightKnee,
        Joint::LeftAnkle,
        Joint::RightAnkle,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Joint::Nose => "nose",
            Joint::LeftEye => "left_eye",
            Joint::RightEye => "right_eye",
            Joint::LeftShoulder => "left_shoulder",
            Joint::RightShoulder => "right_shoulder",
            Joint::LeftElbow => "left_elbow",
            Joint::RightElbow => "right_elbow",
            Joint::LeftWrist => "left_wrist",
            Joint::RightWrist => "right_wrist",
            Joint::LeftHip => "left_hip",
            Joint::RightHip => "right_hip",
            Joint::LeftKnee => "left_knee",
            Joint::RightKnee => "right_knee",
            Joint::LeftAnkle => "left_ankle",
            Joint::RightAnkle => "right_ankle",
            Joint::Neck => "neck",
            Joint::ShoulderCenter => "shoulder_center",
            Joint::HipCenter => "hip_center",
            Joint::KneeCenter => "knee_center",
            Joint::AnkleCenter => "ankle_center",
        }
    }

    /// Source landmark for named joints, `None` for derived midpoints
    pub fn landmark(&self) -> Option<PoseLandmark> {
        match self {
            Joint::Nose => Some(PoseLandmark::Nose),
            Joint::LeftEye => Some(PoseLandmark::LeftEye),
            Joint::RightEye => Some(PoseLandmark::RightEye),
            Joint::LeftShoulder => Some(PoseLandmark::LeftShoulder),
            Joint::RightShoulder => Some(PoseLandmark::RightShoulder),
            Joint::LeftElbow => Some(PoseLandmark::LeftElbow),
            Joint::RightElbow => Some(PoseLandmark::RightElbow),
            Joint::LeftWrist => Some(PoseLandmark::LeftWrist),
            Joint::RightWrist => Some(PoseLandmark::RightWrist),
            Joint::LeftHip => Some(PoseLandmark::LeftHip),
            Joint::RightHip => Some(PoseLandmark::RightHip),
            Joint::LeftKnee => Some(PoseLandmark::LeftKnee),
            Joint::RightKnee => Some(PoseLandmark::RightKnee),
            Joint::LeftAnkle => Some(PoseLandmark::LeftAnkle),
            Joint::RightAnkle => Some(PoseLandmark::RightAnkle),
            Joint::Neck
            | Joint::ShoulderCenter
            | Joint::HipCenter
            | Joint::KneeCenter
            | Joint::AnkleCenter => None,
        }
    }

    pub fn is_derived(&self) -> bool {
        self.landmark().is_none()
    }
}

/// 2D point in normalized image space (y grows downwards)
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point2 {
    pub x: f64,
    pub y: f64,
}

impl Point2 {
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    pub fn origin() -> Self {
        Self::new(0.0, 0.0)
    }

    pub fn midpoint(&self, other: &Point2) -> Point2 {
        Point2::new((self.x + other.x) / 2.0, (self.y + other.y) / 2.0)
    }

    pub fn is_nan(&self) -> bool {
        self.x.is_nan() || self.y.is_nan()
    }

    /// Vector from `origin` to `self`
    pub fn vector_from(&self, origin: &Point2) -> Vector2<f64> {
        Vector2::new(self.x - origin.x, self.y - origin.y)
    }
}

/// Joint positions resolved from one landmark frame.
///
/// Built fresh per frame. Named joints whose landmark index was out of
/// range are stored as `None`; lenient reads substitute the origin while
/// strict reads report the joint as missing. Derived midpoints are always
/// present on a non-empty mapping.
#[derive(Debug, Clone, PartialEq)]
pub struct JointPositions {
    points: [Option<Point2>; Joint::COUNT],
    landmark_count: usize,
}

impl JointPositions {
    /// Mapping for an absent or empty frame
    pub fn empty() -> Self {
        Self {
            points: [None; Joint::COUNT],
            landmark_count: 0,
        }
    }

    pub(crate) fn with_landmark_count(landmark_count: usize) -> Self {
        Self {
            points: [None; Joint::COUNT],
            landmark_count,
        }
    }

    pub(crate) fn set(&mut self, joint: Joint, point: Point2) {
        self.points[joint as usize] = Some(point);
    }

    pub fn is_empty(&self) -> bool {
        self.points.iter().all(Option::is_none)
    }

    /// Whether the joint was resolved (from the frame or as a midpoint default)
    pub fn contains(&self, joint: Joint) -> bool {
        self.points[joint as usize].is_some()
    }

    /// Lenient read: unresolved joints read as (0.0, 0.0)
    pub fn get(&self, joint: Joint) -> Point2 {
        self.points[joint as usize].unwrap_or_else(Point2::origin)
    }

    /// Strict read: unresolved joints are an error
    pub fn require(&self, joint: Joint) -> Result<Point2> {
        self.points[joint as usize].ok_or_else(|| match joint.landmark() {
            Some(landmark) => Error::MissingJoint {
                joint: joint.name(),
                index: landmark.index(),
                available: self.landmark_count,
            },
            None => Error::InvalidInput(format!("{} was not derived", joint.name())),
        })
    }

    /// Number of landmarks in the frame these positions came from
    pub fn landmark_count(&self) -> usize {
        self.landmark_count
    }
}

impl Default for JointPositions {
    fn default() -> Self {
        Self::empty()
    }
}

/// The closed set of exercises the tracker knows how to count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ExerciseKind {
    #[serde(rename = "Squats")]
    Squats,
    #[serde(rename = "Push-ups")]
    PushUps,
    #[serde(rename = "Jumping Jacks")]
    JumpingJacks,
    #[serde(rename = "Lunges")]
    Lunges,
    #[serde(rename = "Bicep Curls")]
    BicepCurls,
}

impl ExerciseKind {
    pub const ALL: [ExerciseKind; 5] = [
        ExerciseKind::Squats,
        ExerciseKind::PushUps,
        ExerciseKind::JumpingJacks,
        ExerciseKind::Lunges,
        ExerciseKind::BicepCurls,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            ExerciseKind::Squats => "Squats",
            ExerciseKind::PushUps => "Push-ups",
            ExerciseKind::JumpingJacks => "Jumping Jacks",
            ExerciseKind::Lunges => "Lunges",
            ExerciseKind::BicepCurls => "Bicep Curls",
        }
    }

    /// Suggested follow-up exercise in the workout progression
    pub fn next(&self) -> ExerciseKind {
        match self {
            ExerciseKind::Squats => ExerciseKind::Lunges,
            ExerciseKind::Lunges => ExerciseKind::PushUps,
            ExerciseKind::PushUps => ExerciseKind::BicepCurls,
            ExerciseKind::BicepCurls => ExerciseKind::JumpingJacks,
            ExerciseKind::JumpingJacks => ExerciseKind::Squats,
        }
    }
}

impl fmt::Display for ExerciseKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for ExerciseKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        ExerciseKind::ALL
            .into_iter()
            .find(|kind| kind.label().eq_ignore_ascii_case(wanted))
            .ok_or_else(|| Error::UnknownExercise(s.to_string()))
    }
}

/// Label shown for the current exercise: a locked exercise or a sentinel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ExerciseLabel {
    /// Nothing has been processed yet
    NoneDetected,
    /// The frame carried no landmarks
    NoPose,
    /// Too few frames observed to classify
    WarmingUp,
    /// Landmarks present but no joints could be resolved
    IncompletePose,
    /// Moving, but no exercise has been locked yet
    MovementDetected,
    Exercise(ExerciseKind),
}

impl ExerciseLabel {
    pub fn as_str(&self) -> &'static str {
        match self {
            ExerciseLabel::NoneDetected => "None detected",
            ExerciseLabel::NoPose => "No pose detected",
            ExerciseLabel::WarmingUp => "Warming up...",
            ExerciseLabel::IncompletePose => "Pose incomplete",
            ExerciseLabel::MovementDetected => "Movement detected",
            ExerciseLabel::Exercise(kind) => kind.label(),
        }
    }

    pub fn exercise(&self) -> Option<ExerciseKind> {
        match self {
            ExerciseLabel::Exercise(kind) => Some(*kind),
            _ => None,
        }
    }
}

impl fmt::Display for ExerciseLabel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl Serialize for ExerciseLabel {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(self.as_str())
    }
}

impl From<ExerciseKind> for ExerciseLabel {
    fn from(kind: ExerciseKind) -> Self {
        ExerciseLabel::Exercise(kind)
    }
}

/// How the session chooses the exercise to count
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ExerciseMode {
    /// Run the classifier on every frame
    #[default]
    Automatic,
    /// Count a fixed exercise, bypassing the classifier
    Fixed(ExerciseKind),
}

impl ExerciseMode {
    pub const AUTOMATIC_LABEL: &'static str = "Automatic Detection";
}

impl FromStr for ExerciseMode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim();
        if wanted.is_empty()
            || wanted.eq_ignore_ascii_case(Self::AUTOMATIC_LABEL)
            || wanted.eq_ignore_ascii_case("auto")
        {
            return Ok(ExerciseMode::Automatic);
        }
        wanted.parse().map(ExerciseMode::Fixed)
    }
}

impl fmt::Display for ExerciseMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ExerciseMode::Automatic => f.write_str(Self::AUTOMATIC_LABEL),
            ExerciseMode::Fixed(kind) => f.write_str(kind.label()),
        }
    }
}
