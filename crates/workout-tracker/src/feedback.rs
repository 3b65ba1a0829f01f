//! Form-feedback catalogue and the running log of coaching messages.

use std::fmt;

use serde::{Serialize, Serializer};
use workout_core::{ExerciseKind, Side};

/// One form-correction message produced by a counting routine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feedback {
    KneesBehindToes,
    KeepBackStraight,
    SquatDeeper,
    LowerChest,
    RaiseArmsHigher,
    SpreadLegsWider,
    KneeAlignment(Side),
    DeeperLunge,
    AvoidSwinging,
    CurlAllTheWay,
}

impl Feedback {
    pub fn message(&self) -> &'static str {
        match self {
            Feedback::KneesBehindToes => "Keep knees behind toes during squat",
            Feedback::KeepBackStraight => "Keep your back straight",
            Feedback::SquatDeeper => "Try to squat deeper",
            Feedback::LowerChest => "Try to lower your chest more",
            Feedback::RaiseArmsHigher => "Raise your arms higher",
            Feedback::SpreadLegsWider => "Spread your legs wider",
            Feedback::KneeAlignment(Side::Right) => "Keep your right knee aligned with your ankle",
            Feedback::KneeAlignment(Side::Left) => "Keep your left knee aligned with your ankle",
            Feedback::DeeperLunge => "Lower your body more for a deeper lunge",
            Feedback::AvoidSwinging => "Keep your upper arms still, avoid swinging",
            Feedback::CurlAllTheWay => "Try to curl all the way up",
        }
    }
}

impl fmt::Display for Feedback {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.message())
    }
}

impl Serialize for Feedback {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.message())
    }
}

/// Progression suggestion once an exercise reaches a rep milestone
pub fn milestone_message(completed: ExerciseKind) -> String {
    format!("Great job! Try {} next", completed.next())
}

/// Distinct coaching messages in order of first appearance
#[derive(Debug, Clone, Default)]
pub struct FeedbackLog {
    messages: Vec<String>,
}

impl FeedbackLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message; returns false if it was already logged
    pub fn push(&mut self, message: impl Into<String>) -> bool {
        let message = message.into();
        if self.messages.contains(&message) {
            return false;
        }
        self.messages.push(message);
        true
    }

    /// The `n` most recent distinct messages, oldest first
    pub fn recent(&self, n: usize) -> Vec<String> {
        let start = self.messages.len().saturating_sub(n);
        self.messages[start..].to_vec()
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn messages(&self) -> &[String] {
        &self.messages
    }
}
