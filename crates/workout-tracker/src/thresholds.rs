//! Per-exercise angle thresholds defining start and end postures.
//!
//! All values are joint angles in degrees. Each counting routine applies
//! its own hysteresis margins on top of these ranges.

use serde::{Deserialize, Serialize};

/// A (min, max) pair of angles in degrees
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct AngleRange {
    pub min: f64,
    pub max: f64,
}

impl AngleRange {
    pub const fn new(min: f64, max: f64) -> Self {
        Self { min, max }
    }

    /// `angle` is past `max - margin` (extended side)
    pub fn near_max(&self, angle: f64, margin: f64) -> bool {
        angle > self.max - margin
    }

    /// `angle` is below `min + margin` (contracted side)
    pub fn near_min(&self, angle: f64, margin: f64) -> bool {
        angle < self.min + margin
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SquatThresholds {
    pub knee: AngleRange,
    pub hip: AngleRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PushUpThresholds {
    pub elbow: AngleRange,
    pub shoulder: AngleRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct JumpingJackThresholds {
    pub arm_spread: AngleRange,
    pub leg_spread: AngleRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LungeThresholds {
    pub front_knee: AngleRange,
    pub back_knee: AngleRange,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BicepCurlThresholds {
    pub elbow: AngleRange,
}

/// Threshold table for every exercise, fixed for the lifetime of a session
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub squats: SquatThresholds,
    pub push_ups: PushUpThresholds,
    pub jumping_jacks: JumpingJackThresholds,
    pub lunges: LungeThresholds,
    pub bicep_curls: BicepCurlThresholds,
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            squats: SquatThresholds {
                knee: AngleRange::new(70.0, 160.0),
                hip: AngleRange::new(50.0, 160.0),
            },
            push_ups: PushUpThresholds {
                elbow: AngleRange::new(70.0, 160.0),
                shoulder: AngleRange::new(30.0, 90.0),
            },
            jumping_jacks: JumpingJackThresholds {
                arm_spread: AngleRange::new(20.0, 140.0),
                leg_spread: AngleRange::new(10.0, 50.0),
            },
            lunges: LungeThresholds {
                front_knee: AngleRange::new(70.0, 160.0),
                back_knee: AngleRange::new(70.0, 160.0),
            },
            bicep_curls: BicepCurlThresholds {
                elbow: AngleRange::new(45.0, 160.0),
            },
        }
    }
}

impl Default for SquatThresholds {
    fn default() -> Self {
        Thresholds::default().squats
    }
}

impl Default for PushUpThresholds {
    fn default() -> Self {
        Thresholds::default().push_ups
    }
}

impl Default for JumpingJackThresholds {
    fn default() -> Self {
        Thresholds::default().jumping_jacks
    }
}

impl Default for LungeThresholds {
    fn default() -> Self {
        Thresholds::default().lunges
    }
}

impl Default for BicepCurlThresholds {
    fn default() -> Self {
        Thresholds::default().bicep_curls
    }
}
