//! Geometric utilities: joint angles and named-joint extraction.

use nalgebra::Vector2;

use crate::types::{Joint, JointPositions, Landmark, Point2};

/// Default neck and shoulder-center position when a shoulder is missing
pub const DEFAULT_NECK: Point2 = Point2 { x: 0.5, y: 0.2 };
/// Default hip-center position when a hip is missing
pub const DEFAULT_HIP_CENTER: Point2 = Point2 { x: 0.5, y: 0.5 };
/// Default knee-center position when a knee is missing
pub const DEFAULT_KNEE_CENTER: Point2 = Point2 { x: 0.5, y: 0.7 };
/// Default ankle-center position when an ankle is missing
pub const DEFAULT_ANKLE_CENTER: Point2 = Point2 { x: 0.5, y: 0.9 };

/// Calculate angle between two vectors, in radians
pub fn angle_between(v1: &Vector2<f64>, v2: &Vector2<f64>) -> f64 {
    let dot = v1.dot(v2);
    let norms = v1.norm() * v2.norm();
    if norms < 1e-12 {
        0.0
    } else {
        (dot / norms).clamp(-1.0, 1.0).acos()
    }
}

/// Angle in degrees at vertex `b` between the rays `b→a` and `b→c`.
///
/// Never fails: coincident points, zero-length vectors and NaN
/// coordinates all yield `0.0`.
pub fn angle_at(a: Point2, b: Point2, c: Point2) -> f64 {
    if a.is_nan() || b.is_nan() || c.is_nan() || a == b || b == c {
        return 0.0;
    }

    let ba = a.vector_from(&b);
    let bc = c.vector_from(&b);
    if ba == Vector2::zeros() || bc == Vector2::zeros() {
        return 0.0;
    }

    let angle = angle_between(&ba, &bc).to_degrees();
    if angle.is_nan() {
        0.0
    } else {
        angle
    }
}

/// Resolve named joints and derived midpoints from one landmark frame.
///
/// An empty frame yields an empty mapping. Named joints whose landmark
/// index is out of range stay unresolved. Each midpoint averages its
/// left/right pair when both were resolved and otherwise falls back to a
/// fixed default, so angle math downstream never sees undefined values.
///
/// A lone surviving side is never averaged against a zero substitute for
/// its missing partner; the whole midpoint takes the default instead.
pub fn extract_joint_positions(landmarks: &[Landmark]) -> JointPositions {
    if landmarks.is_empty() {
        return JointPositions::empty();
    }

    let mut positions = JointPositions::with_landmark_count(landmarks.len());

    for joint in Joint::NAMED {
        let Some(source) = joint.landmark() else {
            continue;
        };
        if let Some(landmark) = landmarks.get(source.index()) {
            positions.set(joint, landmark.position());
        }
    }

    let neck = pair_midpoint(&positions, Joint::LeftShoulder, Joint::RightShoulder)
        .unwrap_or(DEFAULT_NECK);
    positions.set(Joint::Neck, neck);
    positions.set(Joint::ShoulderCenter, neck);

    positions.set(
        Joint::HipCenter,
        pair_midpoint(&positions, Joint::LeftHip, Joint::RightHip).unwrap_or(DEFAULT_HIP_CENTER),
    );
    positions.set(
        Joint::KneeCenter,
        pair_midpoint(&positions, Joint::LeftKnee, Joint::RightKnee)
            .unwrap_or(DEFAULT_KNEE_CENTER),
    );
    positions.set(
        Joint::AnkleCenter,
        pair_midpoint(&positions, Joint::LeftAnkle, Joint::RightAnkle)
            .unwrap_or(DEFAULT_ANKLE_CENTER),
    );

    positions
}

fn pair_midpoint(positions: &JointPositions, left: Joint, right: Joint) -> Option<Point2> {
    let l = positions.require(left).ok()?;
    let r = positions.require(right).ok()?;
    Some(l.midpoint(&r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{PoseLandmark, POSE_LANDMARK_COUNT};

    fn p(x: f64, y: f64) -> Point2 {
        Point2::new(x, y)
    }

    #[test]
    fn test_straight_line_is_180() {
        let angle = angle_at(p(0.0, 0.0), p(0.5, 0.0), p(1.0, 0.0));
        assert!((angle - 180.0).abs() < 1e-6);
    }

    #[test]
    fn test_right_angle() {
        let angle = angle_at(p(0.0, 0.0), p(0.5, 0.0), p(0.5, 0.5));
        assert!((angle - 90.0).abs() < 1e-6);
    }

    #[test]
    fn test_coincident_points_are_zero() {
        assert_eq!(angle_at(p(0.3, 0.3), p(0.3, 0.3), p(0.9, 0.1)), 0.0);
        assert_eq!(angle_at(p(0.9, 0.1), p(0.3, 0.3), p(0.3, 0.3)), 0.0);
    }

    #[test]
    fn test_nan_is_zero() {
        assert_eq!(angle_at(p(f64::NAN, 0.0), p(0.5, 0.0), p(1.0, 0.0)), 0.0);
        assert_eq!(angle_at(p(0.0, 0.0), p(0.5, f64::NAN), p(1.0, 0.0)), 0.0);
    }

    #[test]
    fn test_cosine_overshoot_is_clamped() {
        // Collinear diagonals can push the cosine past -1.0 in floating point
        let angle = angle_at(p(0.1, 0.1), p(0.2, 0.2), p(0.3, 0.3));
        assert!(angle.is_finite());
        assert!((angle - 180.0).abs() < 1e-4);

        let angle = angle_at(p(0.3, 0.3), p(0.1, 0.1), p(0.7, 0.7));
        assert!(angle.is_finite());
        assert!(angle.abs() < 1e-4);
    }

    #[test]
    fn test_empty_frame_yields_empty_mapping() {
        let positions = extract_joint_positions(&[]);
        assert!(positions.is_empty());
    }

    #[test]
    fn test_full_frame_midpoints() {
        let mut landmarks = vec![Landmark::default(); POSE_LANDMARK_COUNT];
        landmarks[PoseLandmark::LeftShoulder.index()] = Landmark::new(0.6, 0.3, 0.0, 1.0);
        landmarks[PoseLandmark::RightShoulder.index()] = Landmark::new(0.4, 0.3, 0.0, 1.0);
        landmarks[PoseLandmark::LeftHip.index()] = Landmark::new(0.56, 0.6, 0.0, 1.0);
        landmarks[PoseLandmark::RightHip.index()] = Landmark::new(0.44, 0.6, 0.0, 1.0);

        let positions = extract_joint_positions(&landmarks);

        assert!(!positions.is_empty());
        assert_eq!(positions.get(Joint::LeftShoulder), p(0.6, 0.3));
        let neck = positions.get(Joint::Neck);
        assert!((neck.x - 0.5).abs() < 1e-12 && (neck.y - 0.3).abs() < 1e-12);
        assert_eq!(positions.get(Joint::ShoulderCenter), neck);
        let hip = positions.get(Joint::HipCenter);
        assert!((hip.x - 0.5).abs() < 1e-12 && (hip.y - 0.6).abs() < 1e-12);
    }

    #[test]
    fn test_truncated_frame_uses_defaults() {
        // Only the face and shoulders are present
        let landmarks = vec![Landmark::new(0.5, 0.5, 0.0, 1.0); 13];
        let positions = extract_joint_positions(&landmarks);

        assert!(positions.contains(Joint::LeftShoulder));
        assert!(!positions.contains(Joint::LeftKnee));
        assert_eq!(positions.get(Joint::LeftKnee), Point2::origin());
        assert!(positions.require(Joint::LeftKnee).is_err());

        assert_eq!(positions.get(Joint::Neck), p(0.5, 0.5));
        assert_eq!(positions.get(Joint::HipCenter), DEFAULT_HIP_CENTER);
        assert_eq!(positions.get(Joint::KneeCenter), DEFAULT_KNEE_CENTER);
        assert_eq!(positions.get(Joint::AnkleCenter), DEFAULT_ANKLE_CENTER);
    }

    #[test]
    fn test_single_landmark_frame_defaults_neck() {
        let positions = extract_joint_positions(&[Landmark::new(0.4, 0.1, 0.0, 0.9)]);
        assert_eq!(positions.get(Joint::Nose), p(0.4, 0.1));
        assert_eq!(positions.get(Joint::Neck), DEFAULT_NECK);
        assert_eq!(positions.landmark_count(), 1);
    }
}
