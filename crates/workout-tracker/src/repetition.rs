//! Repetition state machine and per-exercise counting routines.
//!
//! All exercises share one posture machine: a rep is counted when the body
//! goes start → end → back to start. Each routine measures its own angles,
//! applies hysteresis margins around the [`Thresholds`] ranges, advances the
//! machine by at most one transition and then runs its form checks.

use serde::Serialize;
use workout_core::{ExerciseKind, Joint, JointPositions, Result, Side, Timestamp};

use crate::features::{arm_spread, elbow_angle, joint_angle, knee_angle, leg_spread, shoulder_angle};
use crate::feedback::Feedback;
use crate::thresholds::Thresholds;

/// Two-flag posture state shared by every exercise
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct PostureState {
    pub in_start: bool,
    pub in_end: bool,
}

/// A transition fired by the posture machine
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Transition {
    EnterStart,
    EnterEnd,
    Rep,
}

type CountingRoutine = fn(&mut RepetitionCounter, &JointPositions) -> Result<Option<Feedback>>;

/// Counts repetitions across a whole session.
///
/// The count and posture flags are not reset when the exercise changes, so
/// a movement started as one exercise can be completed as another.
#[derive(Debug, Clone)]
pub struct RepetitionCounter {
    rep_count: u32,
    posture: PostureState,
    last_rep_time: Timestamp,
    thresholds: Thresholds,
}

impl RepetitionCounter {
    pub fn new(thresholds: Thresholds) -> Self {
        Self {
            rep_count: 0,
            posture: PostureState::default(),
            last_rep_time: Timestamp::now(),
            thresholds,
        }
    }

    /// Run the counting routine for `kind` on one frame.
    ///
    /// Angles are resolved before any state changes, so an error leaves the
    /// count and posture exactly as they were.
    pub fn count(&mut self, kind: ExerciseKind, positions: &JointPositions) -> Result<Option<Feedback>> {
        let routine: CountingRoutine = match kind {
            ExerciseKind::Squats => Self::count_squat,
            ExerciseKind::PushUps => Self::count_push_up,
            ExerciseKind::JumpingJacks => Self::count_jumping_jack,
            ExerciseKind::Lunges => Self::count_lunge,
            ExerciseKind::BicepCurls => Self::count_bicep_curl,
        };
        routine(self, positions)
    }

    pub fn rep_count(&self) -> u32 {
        self.rep_count
    }

    pub fn posture(&self) -> PostureState {
        self.posture
    }

    pub fn last_rep_time(&self) -> Timestamp {
        self.last_rep_time
    }

    pub fn thresholds(&self) -> &Thresholds {
        &self.thresholds
    }

    /// Apply at most one transition, checked in start, end, rep order
    fn advance(&mut self, kind: ExerciseKind, start: bool, end: bool, rep: bool) {
        let p = &mut self.posture;
        let transition = if !p.in_start && start {
            p.in_start = true;
            p.in_end = false;
            Transition::EnterStart
        } else if p.in_start && !p.in_end && end {
            p.in_end = true;
            Transition::EnterEnd
        } else if p.in_start && p.in_end && rep {
            p.in_start = true;
            p.in_end = false;
            self.rep_count = self.rep_count.saturating_add(1);
            self.last_rep_time = Timestamp::now();
            Transition::Rep
        } else {
            return;
        };

        tracing::debug!(exercise = %kind, ?transition, posture = ?self.posture, "Posture transition");
        if transition == Transition::Rep {
            tracing::info!(exercise = %kind, rep_count = self.rep_count, "Repetition counted");
        }
    }

    fn count_squat(&mut self, positions: &JointPositions) -> Result<Option<Feedback>> {
        let knee = (knee_angle(positions, Side::Left)? + knee_angle(positions, Side::Right)?) / 2.0;
        let hip = joint_angle(positions, Joint::ShoulderCenter, Joint::HipCenter, Joint::KneeCenter)?;
        let knee_center = positions.require(Joint::KneeCenter)?;
        let ankle_center = positions.require(Joint::AnkleCenter)?;

        let range = self.thresholds.squats.knee;
        self.advance(
            ExerciseKind::Squats,
            range.near_max(knee, 10.0),
            range.near_min(knee, 10.0),
            range.near_max(knee, 20.0),
        );

        let mut feedback = None;
        if knee < 100.0 && knee_center.x - ankle_center.x > 0.1 {
            feedback = Some(Feedback::KneesBehindToes);
        }
        if hip < 120.0 {
            feedback = Some(Feedback::KeepBackStraight);
        }
        if self.posture.in_end && knee > 100.0 {
            feedback = Some(Feedback::SquatDeeper);
        }
        Ok(feedback)
    }

    fn count_push_up(&mut self, positions: &JointPositions) -> Result<Option<Feedback>> {
        let elbow = (elbow_angle(positions, Side::Left)? + elbow_angle(positions, Side::Right)?) / 2.0;
        let back = joint_angle(positions, Joint::ShoulderCenter, Joint::HipCenter, Joint::AnkleCenter)?;

        let range = self.thresholds.push_ups.elbow;
        self.advance(
            ExerciseKind::PushUps,
            range.near_max(elbow, 10.0),
            range.near_min(elbow, 10.0),
            range.near_max(elbow, 20.0),
        );

        let mut feedback = None;
        if back < 160.0 || back > 200.0 {
            feedback = Some(Feedback::KeepBackStraight);
        }
        if self.posture.in_end && elbow > 100.0 {
            feedback = Some(Feedback::LowerChest);
        }
        Ok(feedback)
    }

    fn count_jumping_jack(&mut self, positions: &JointPositions) -> Result<Option<Feedback>> {
        let arm = arm_spread(positions)?;
        let leg = leg_spread(positions)?;

        let t = self.thresholds.jumping_jacks;
        self.advance(
            ExerciseKind::JumpingJacks,
            t.arm_spread.near_min(arm, 20.0) && t.leg_spread.near_min(leg, 10.0),
            t.arm_spread.near_max(arm, 20.0) && t.leg_spread.near_max(leg, 10.0),
            t.arm_spread.near_min(arm, 30.0) && t.leg_spread.near_min(leg, 20.0),
        );

        let mut feedback = None;
        if self.posture.in_end && arm < 120.0 {
            feedback = Some(Feedback::RaiseArmsHigher);
        }
        if self.posture.in_end && leg < 30.0 {
            feedback = Some(Feedback::SpreadLegsWider);
        }
        Ok(feedback)
    }

    fn count_lunge(&mut self, positions: &JointPositions) -> Result<Option<Feedback>> {
        let right = knee_angle(positions, Side::Right)?;
        let left = knee_angle(positions, Side::Left)?;
        let right_knee = positions.require(Joint::RightKnee)?;
        let right_ankle = positions.require(Joint::RightAnkle)?;
        let left_knee = positions.require(Joint::LeftKnee)?;
        let left_ankle = positions.require(Joint::LeftAnkle)?;

        let t = self.thresholds.lunges;
        // Either leg may lead
        let end = (t.front_knee.near_min(right, 20.0) && t.back_knee.near_min(left, 20.0))
            || (t.front_knee.near_min(left, 20.0) && t.back_knee.near_min(right, 20.0));
        self.advance(
            ExerciseKind::Lunges,
            t.front_knee.near_max(right, 20.0) && t.back_knee.near_max(left, 20.0),
            end,
            t.front_knee.near_max(right, 30.0) && t.back_knee.near_max(left, 30.0),
        );

        let mut feedback = None;
        if right < 100.0 && (right_knee.x - right_ankle.x).abs() > 0.1 {
            feedback = Some(Feedback::KneeAlignment(Side::Right));
        }
        if left < 100.0 && (left_knee.x - left_ankle.x).abs() > 0.1 {
            feedback = Some(Feedback::KneeAlignment(Side::Left));
        }
        if self.posture.in_end && right.min(left) > 100.0 {
            feedback = Some(Feedback::DeeperLunge);
        }
        Ok(feedback)
    }

    fn count_bicep_curl(&mut self, positions: &JointPositions) -> Result<Option<Feedback>> {
        let elbow = elbow_angle(positions, Side::Left)?.min(elbow_angle(positions, Side::Right)?);
        let shoulder = shoulder_angle(positions, Side::Left)?.min(shoulder_angle(positions, Side::Right)?);

        let range = self.thresholds.bicep_curls.elbow;
        self.advance(
            ExerciseKind::BicepCurls,
            range.near_max(elbow, 20.0),
            range.near_min(elbow, 10.0),
            range.near_max(elbow, 30.0),
        );

        let mut feedback = None;
        if shoulder < 70.0 {
            feedback = Some(Feedback::AvoidSwinging);
        }
        if self.posture.in_end && elbow > 70.0 {
            feedback = Some(Feedback::CurlAllTheWay);
        }
        Ok(feedback)
    }
}

impl Default for RepetitionCounter {
    fn default() -> Self {
        Self::new(Thresholds::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::PoseBuilder;
    use workout_core::{extract_joint_positions, Landmark, PoseLandmark};

    fn positions(landmarks: Vec<Landmark>) -> JointPositions {
        extract_joint_positions(&landmarks)
    }

    fn knees(right: f64, left: f64) -> JointPositions {
        positions(PoseBuilder::standing().knee_angles(right, left).build())
    }

    fn elbows(right: f64, left: f64) -> JointPositions {
        positions(PoseBuilder::standing().elbow_angles(right, left).build())
    }

    fn spread(arm: f64, leg: f64) -> JointPositions {
        positions(PoseBuilder::standing().spread(arm, leg).build())
    }

    #[test]
    fn test_squat_full_cycle() {
        let mut counter = RepetitionCounter::default();
        let sequence = [170.0, 170.0, 130.0, 90.0, 60.0, 60.0, 90.0, 130.0, 170.0, 170.0];

        let feedback: Vec<Option<Feedback>> = sequence
            .iter()
            .map(|&k| counter.count(ExerciseKind::Squats, &knees(k, k)).unwrap())
            .collect();

        assert_eq!(counter.rep_count(), 1);
        assert_eq!(feedback[7], Some(Feedback::SquatDeeper));
        let others = feedback
            .iter()
            .enumerate()
            .filter(|(i, _)| *i != 7)
            .all(|(_, f)| f.is_none());
        assert!(others);
        assert_eq!(counter.posture(), PostureState { in_start: true, in_end: false });
    }

    #[test]
    fn test_half_cycle_does_not_count() {
        let mut counter = RepetitionCounter::default();
        for k in [170.0, 120.0, 60.0, 60.0] {
            counter.count(ExerciseKind::Squats, &knees(k, k)).unwrap();
        }
        assert_eq!(counter.rep_count(), 0);
        assert_eq!(counter.posture(), PostureState { in_start: true, in_end: true });
    }

    #[test]
    fn test_at_most_one_transition_per_frame() {
        let mut counter = RepetitionCounter::default();
        // From the neutral state a deep frame cannot enter the end posture
        counter.count(ExerciseKind::Squats, &knees(60.0, 60.0)).unwrap();
        assert_eq!(counter.posture(), PostureState::default());

        counter.count(ExerciseKind::Squats, &knees(170.0, 170.0)).unwrap();
        counter.count(ExerciseKind::Squats, &knees(60.0, 60.0)).unwrap();
        assert!(counter.posture().in_end);
        assert_eq!(counter.rep_count(), 0);
    }

    /// Knees pushed well past the ankles, bent to about 79 degrees
    fn knees_forward(pose: PoseBuilder) -> PoseBuilder {
        pose.set(PoseLandmark::RightKnee, 0.62, 0.7)
            .set(PoseLandmark::LeftKnee, 0.68, 0.7)
            .set(PoseLandmark::RightAnkle, 0.47, 0.85)
            .set(PoseLandmark::LeftAnkle, 0.53, 0.85)
    }

    /// Shoulders pitched forward of the hips
    fn leaning(pose: PoseBuilder) -> PoseBuilder {
        pose.set(PoseLandmark::RightShoulder, 0.7, 0.5)
            .set(PoseLandmark::LeftShoulder, 0.8, 0.5)
    }

    /// Hips dropped out of the shoulder-ankle line
    fn sagging(pose: PoseBuilder) -> PoseBuilder {
        pose.set(PoseLandmark::RightHip, 0.6, 0.6)
            .set(PoseLandmark::LeftHip, 0.66, 0.6)
    }

    #[test]
    fn test_squat_knees_past_toes() {
        let mut counter = RepetitionCounter::default();
        let frame = positions(knees_forward(PoseBuilder::standing()).build());

        let feedback = counter.count(ExerciseKind::Squats, &frame).unwrap();
        assert_eq!(feedback, Some(Feedback::KneesBehindToes));
        assert_eq!(counter.posture(), PostureState::default());
    }

    #[test]
    fn test_squat_back_straight() {
        let mut counter = RepetitionCounter::default();
        let frame = positions(leaning(PoseBuilder::standing()).build());

        let feedback = counter.count(ExerciseKind::Squats, &frame).unwrap();
        assert_eq!(feedback, Some(Feedback::KeepBackStraight));
        assert!(counter.posture().in_start);
    }

    #[test]
    fn test_squat_feedback_override_order() {
        let mut counter = RepetitionCounter::default();

        // Knees and back both fail; the back check runs later
        let both = positions(leaning(knees_forward(PoseBuilder::standing())).build());
        let feedback = counter.count(ExerciseKind::Squats, &both).unwrap();
        assert_eq!(feedback, Some(Feedback::KeepBackStraight));

        counter.count(ExerciseKind::Squats, &knees(170.0, 170.0)).unwrap();
        counter.count(ExerciseKind::Squats, &knees(60.0, 60.0)).unwrap();
        assert!(counter.posture().in_end);

        // Depth is checked last and beats a bent back
        let shallow = positions(leaning(PoseBuilder::standing().knee_angles(110.0, 110.0)).build());
        let feedback = counter.count(ExerciseKind::Squats, &shallow).unwrap();
        assert_eq!(feedback, Some(Feedback::SquatDeeper));
        assert_eq!(counter.rep_count(), 0);
    }

    #[test]
    fn test_push_up_back_straight() {
        let mut counter = RepetitionCounter::default();
        let sag = |elbow: f64| positions(sagging(PoseBuilder::standing().elbow_angles(elbow, elbow)).build());

        let feedback = counter.count(ExerciseKind::PushUps, &sag(170.0)).unwrap();
        assert_eq!(feedback, Some(Feedback::KeepBackStraight));
        assert!(counter.posture().in_start);

        counter.count(ExerciseKind::PushUps, &elbows(40.0, 40.0)).unwrap();
        assert!(counter.posture().in_end);

        // Chest depth overrides the back check
        let feedback = counter.count(ExerciseKind::PushUps, &sag(110.0)).unwrap();
        assert_eq!(feedback, Some(Feedback::LowerChest));
    }

    #[test]
    fn test_push_up_cycle() {
        let mut counter = RepetitionCounter::default();
        for e in [170.0, 40.0, 170.0] {
            assert_eq!(counter.count(ExerciseKind::PushUps, &elbows(e, e)).unwrap(), None);
        }
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_push_up_lower_chest() {
        let mut counter = RepetitionCounter::default();
        counter.count(ExerciseKind::PushUps, &elbows(170.0, 170.0)).unwrap();
        counter.count(ExerciseKind::PushUps, &elbows(75.0, 75.0)).unwrap();
        let feedback = counter.count(ExerciseKind::PushUps, &elbows(110.0, 110.0)).unwrap();
        assert_eq!(feedback, Some(Feedback::LowerChest));
    }

    #[test]
    fn test_jumping_jack_cycle() {
        let mut counter = RepetitionCounter::default();
        counter.count(ExerciseKind::JumpingJacks, &spread(30.0, 15.0)).unwrap();
        let open = counter.count(ExerciseKind::JumpingJacks, &spread(130.0, 45.0)).unwrap();
        assert!(counter.posture().in_end);
        assert_eq!(open, None);
        counter.count(ExerciseKind::JumpingJacks, &spread(30.0, 15.0)).unwrap();
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_jumping_jack_feedback_override() {
        let mut counter = RepetitionCounter::default();
        counter.count(ExerciseKind::JumpingJacks, &spread(30.0, 15.0)).unwrap();
        counter.count(ExerciseKind::JumpingJacks, &spread(130.0, 45.0)).unwrap();

        let arms = counter.count(ExerciseKind::JumpingJacks, &spread(100.0, 45.0)).unwrap();
        assert_eq!(arms, Some(Feedback::RaiseArmsHigher));

        // Both checks fail; the later one wins
        let both = counter.count(ExerciseKind::JumpingJacks, &spread(100.0, 25.0)).unwrap();
        assert_eq!(both, Some(Feedback::SpreadLegsWider));
    }

    #[test]
    fn test_lunge_cycle() {
        let mut counter = RepetitionCounter::default();
        assert_eq!(counter.count(ExerciseKind::Lunges, &knees(170.0, 170.0)).unwrap(), None);

        let bottom = counter.count(ExerciseKind::Lunges, &knees(80.0, 85.0)).unwrap();
        assert!(counter.posture().in_end);
        assert_eq!(bottom, Some(Feedback::KneeAlignment(Side::Left)));

        assert_eq!(counter.count(ExerciseKind::Lunges, &knees(170.0, 170.0)).unwrap(), None);
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_lunge_deeper() {
        let mut counter = RepetitionCounter::default();
        counter.count(ExerciseKind::Lunges, &knees(170.0, 170.0)).unwrap();
        counter.count(ExerciseKind::Lunges, &knees(80.0, 85.0)).unwrap();
        let feedback = counter.count(ExerciseKind::Lunges, &knees(110.0, 120.0)).unwrap();
        assert_eq!(feedback, Some(Feedback::DeeperLunge));
        assert_eq!(counter.rep_count(), 0);
    }

    #[test]
    fn test_bicep_curl_cycle() {
        let mut counter = RepetitionCounter::default();
        for e in [170.0, 40.0, 170.0] {
            // Arms hang at the sides, so the upper-arm check always fires
            let feedback = counter.count(ExerciseKind::BicepCurls, &elbows(e, e)).unwrap();
            assert_eq!(feedback, Some(Feedback::AvoidSwinging));
        }
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_bicep_curl_uses_tighter_arm() {
        let mut counter = RepetitionCounter::default();
        counter.count(ExerciseKind::BicepCurls, &elbows(170.0, 170.0)).unwrap();
        counter.count(ExerciseKind::BicepCurls, &elbows(40.0, 170.0)).unwrap();
        assert!(counter.posture().in_end);

        let feedback = counter.count(ExerciseKind::BicepCurls, &elbows(90.0, 170.0)).unwrap();
        assert_eq!(feedback, Some(Feedback::CurlAllTheWay));
    }

    #[test]
    fn test_counter_shared_across_exercises() {
        let mut counter = RepetitionCounter::default();
        counter.count(ExerciseKind::Squats, &knees(170.0, 170.0)).unwrap();
        counter.count(ExerciseKind::Squats, &knees(60.0, 60.0)).unwrap();
        assert!(counter.posture().in_end);

        // A squat bottom finished by standing up as a lunge
        counter.count(ExerciseKind::Lunges, &knees(170.0, 170.0)).unwrap();
        assert_eq!(counter.rep_count(), 1);
    }

    #[test]
    fn test_missing_joints_leave_state_unchanged() {
        let mut counter = RepetitionCounter::default();
        counter.count(ExerciseKind::Squats, &knees(170.0, 170.0)).unwrap();
        let before = counter.posture();

        let truncated = positions(PoseBuilder::standing().truncate(14).build());
        for kind in ExerciseKind::ALL {
            assert!(counter.count(kind, &truncated).is_err());
        }

        assert_eq!(counter.posture(), before);
        assert_eq!(counter.rep_count(), 0);
    }
}
