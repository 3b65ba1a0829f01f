//! Synthetic landmark frames for tests and benchmarks.

use workout_core::{Landmark, PoseLandmark, POSE_LANDMARK_COUNT};

/// Builds MediaPipe-topology frames around an upright, front-facing pose.
///
/// The person's right side appears on the left of the image. Upper and
/// lower limb segments are 0.15 long so joint angles can be dialed in.
pub struct PoseBuilder {
    landmarks: Vec<Landmark>,
}

const SEGMENT: f64 = 0.15;
const SPREAD_REACH: f64 = 0.3;

impl PoseBuilder {
    pub fn standing() -> Self {
        let blank = Self {
            landmarks: vec![Landmark::new(0.5, 0.5, 0.0, 0.5); POSE_LANDMARK_COUNT],
        };
        blank
            .set(PoseLandmark::Nose, 0.5, 0.1)
            .set(PoseLandmark::LeftEye, 0.52, 0.08)
            .set(PoseLandmark::RightEye, 0.48, 0.08)
            .set(PoseLandmark::RightShoulder, 0.45, 0.3)
            .set(PoseLandmark::LeftShoulder, 0.55, 0.3)
            .set(PoseLandmark::RightElbow, 0.45, 0.45)
            .set(PoseLandmark::LeftElbow, 0.55, 0.45)
            .set(PoseLandmark::RightWrist, 0.45, 0.6)
            .set(PoseLandmark::LeftWrist, 0.55, 0.6)
            .set(PoseLandmark::RightHip, 0.47, 0.6)
            .set(PoseLandmark::LeftHip, 0.53, 0.6)
            .set(PoseLandmark::RightKnee, 0.47, 0.75)
            .set(PoseLandmark::LeftKnee, 0.53, 0.75)
            .set(PoseLandmark::RightAnkle, 0.47, 0.9)
            .set(PoseLandmark::LeftAnkle, 0.53, 0.9)
    }

    pub fn set(mut self, landmark: PoseLandmark, x: f64, y: f64) -> Self {
        self.landmarks[landmark.index()] = Landmark::new(x, y, 0.0, 0.99);
        self
    }

    fn get(&self, landmark: PoseLandmark) -> (f64, f64) {
        let l = self.landmarks[landmark.index()];
        (l.x, l.y)
    }

    /// Place the end of a limb so the angle at `joint` equals `degrees`.
    /// The upper segment must hang straight down into `joint`.
    fn bend(self, joint: PoseLandmark, end: PoseLandmark, degrees: f64, outward: f64) -> Self {
        let (jx, jy) = self.get(joint);
        let theta = degrees.to_radians();
        self.set(
            end,
            jx + outward * SEGMENT * theta.sin(),
            jy - SEGMENT * theta.cos(),
        )
    }

    pub fn knee_angles(self, right: f64, left: f64) -> Self {
        self.bend(PoseLandmark::RightKnee, PoseLandmark::RightAnkle, right, 1.0)
            .bend(PoseLandmark::LeftKnee, PoseLandmark::LeftAnkle, left, -1.0)
    }

    pub fn elbow_angles(self, right: f64, left: f64) -> Self {
        self.bend(PoseLandmark::RightElbow, PoseLandmark::RightWrist, right, 1.0)
            .bend(PoseLandmark::LeftElbow, PoseLandmark::LeftWrist, left, -1.0)
    }

    /// Arm spread measured at the neck, leg spread at the hip center
    pub fn spread(self, arm_degrees: f64, leg_degrees: f64) -> Self {
        let half_arm = (arm_degrees / 2.0).to_radians();
        let half_leg = (leg_degrees / 2.0).to_radians();
        let (neck_x, neck_y) = (0.5, 0.3);
        let (hip_x, hip_y) = (0.5, 0.6);
        self.set(
            PoseLandmark::RightWrist,
            neck_x - SPREAD_REACH * half_arm.sin(),
            neck_y + SPREAD_REACH * half_arm.cos(),
        )
        .set(
            PoseLandmark::LeftWrist,
            neck_x + SPREAD_REACH * half_arm.sin(),
            neck_y + SPREAD_REACH * half_arm.cos(),
        )
        .set(
            PoseLandmark::RightAnkle,
            hip_x - SPREAD_REACH * half_leg.sin(),
            hip_y + SPREAD_REACH * half_leg.cos(),
        )
        .set(
            PoseLandmark::LeftAnkle,
            hip_x + SPREAD_REACH * half_leg.sin(),
            hip_y + SPREAD_REACH * half_leg.cos(),
        )
    }

    /// Bent knees with the hips dropped below them
    pub fn deep_squat(self) -> Self {
        self.set(PoseLandmark::RightHip, 0.48, 0.65)
            .set(PoseLandmark::LeftHip, 0.52, 0.65)
            .set(PoseLandmark::RightKnee, 0.4, 0.6)
            .set(PoseLandmark::LeftKnee, 0.6, 0.6)
            .set(PoseLandmark::RightAnkle, 0.4, 0.8)
            .set(PoseLandmark::LeftAnkle, 0.6, 0.8)
    }

    /// Keep only the first `len` landmarks
    pub fn truncate(mut self, len: usize) -> Self {
        self.landmarks.truncate(len);
        self
    }

    pub fn build(self) -> Vec<Landmark> {
        self.landmarks
    }
}
