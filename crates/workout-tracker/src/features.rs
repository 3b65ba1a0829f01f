//! Joint-angle features shared by the classifier and the counting routines.
//!
//! Every feature reads joints strictly: a joint whose landmark was missing
//! from the frame makes the feature fail instead of silently measuring an
//! angle against the origin.

use serde::Serialize;
use workout_core::{angle_at, Joint, JointPositions, Result, Side};

/// Joints of one body side
#[derive(Debug, Clone, Copy)]
struct SideJoints {
    shoulder: Joint,
    elbow: Joint,
    wrist: Joint,
    hip: Joint,
    knee: Joint,
    ankle: Joint,
}

impl SideJoints {
    fn of(side: Side) -> Self {
        match side {
            Side::Left => Self {
                shoulder: Joint::LeftShoulder,
                elbow: Joint::LeftElbow,
                wrist: Joint::LeftWrist,
                hip: Joint::LeftHip,
                knee: Joint::LeftKnee,
                ankle: Joint::LeftAnkle,
            },
            Side::Right => Self {
                shoulder: Joint::RightShoulder,
                elbow: Joint::RightElbow,
                wrist: Joint::RightWrist,
                hip: Joint::RightHip,
                knee: Joint::RightKnee,
                ankle: Joint::RightAnkle,
            },
        }
    }
}

/// Angle between two joints as seen from a vertex joint
pub fn joint_angle(positions: &JointPositions, a: Joint, vertex: Joint, c: Joint) -> Result<f64> {
    Ok(angle_at(
        positions.require(a)?,
        positions.require(vertex)?,
        positions.require(c)?,
    ))
}

/// Hip → knee → ankle
pub fn knee_angle(positions: &JointPositions, side: Side) -> Result<f64> {
    let j = SideJoints::of(side);
    joint_angle(positions, j.hip, j.knee, j.ankle)
}

/// Shoulder → elbow → wrist
pub fn elbow_angle(positions: &JointPositions, side: Side) -> Result<f64> {
    let j = SideJoints::of(side);
    joint_angle(positions, j.shoulder, j.elbow, j.wrist)
}

/// Hip → shoulder → elbow
pub fn shoulder_angle(positions: &JointPositions, side: Side) -> Result<f64> {
    let j = SideJoints::of(side);
    joint_angle(positions, j.hip, j.shoulder, j.elbow)
}

/// Left wrist → neck → right wrist
pub fn arm_spread(positions: &JointPositions) -> Result<f64> {
    joint_angle(positions, Joint::LeftWrist, Joint::Neck, Joint::RightWrist)
}

/// Left ankle → hip center → right ankle
pub fn leg_spread(positions: &JointPositions) -> Result<f64> {
    joint_angle(positions, Joint::LeftAnkle, Joint::HipCenter, Joint::RightAnkle)
}

/// The characteristic angles of one frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct JointAngles {
    pub right_knee: f64,
    pub left_knee: f64,
    pub right_elbow: f64,
    pub left_elbow: f64,
    pub right_shoulder: f64,
    pub left_shoulder: f64,
    pub arm_spread: f64,
    pub leg_spread: f64,
}

impl JointAngles {
    pub fn resolve(positions: &JointPositions) -> Result<Self> {
        Ok(Self {
            right_knee: knee_angle(positions, Side::Right)?,
            left_knee: knee_angle(positions, Side::Left)?,
            right_elbow: elbow_angle(positions, Side::Right)?,
            left_elbow: elbow_angle(positions, Side::Left)?,
            right_shoulder: shoulder_angle(positions, Side::Right)?,
            left_shoulder: shoulder_angle(positions, Side::Left)?,
            arm_spread: arm_spread(positions)?,
            leg_spread: leg_spread(positions)?,
        })
    }
}
