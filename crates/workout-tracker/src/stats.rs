//! Session statistics derived from the rep count and elapsed time.

use serde::{Deserialize, Serialize};

/// Estimated energy per repetition, in kilocalories
pub const CALORIES_PER_REP: f64 = 0.3;

/// Lower bound on the elapsed time used for pace, in minutes
const MIN_ELAPSED_MINUTES: f64 = 0.01;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionStats {
    pub calories: f64,
    pub reps_per_min: f64,
}

impl SessionStats {
    pub fn compute(rep_count: u32, elapsed_secs: f64) -> Self {
        let reps = f64::from(rep_count);
        let minutes = (elapsed_secs / 60.0).max(MIN_ELAPSED_MINUTES);
        Self {
            calories: reps * CALORIES_PER_REP,
            reps_per_min: reps / minutes,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ten_reps_in_a_minute() {
        let stats = SessionStats::compute(10, 60.0);
        assert!((stats.calories - 3.0).abs() < 1e-9);
        assert!((stats.reps_per_min - 10.0).abs() < 1e-9);
    }

    #[test]
    fn test_zero_elapsed_is_bounded() {
        let stats = SessionStats::compute(1, 0.0);
        assert!(stats.reps_per_min.is_finite());
        assert!((stats.reps_per_min - 100.0).abs() < 1e-9);

        let idle = SessionStats::compute(0, 0.0);
        assert_eq!(idle.reps_per_min, 0.0);
        assert_eq!(idle.calories, 0.0);
    }

    #[test]
    fn test_serializes_camel_case() {
        let json = serde_json::to_value(SessionStats::compute(2, 30.0)).unwrap();
        assert!(json.get("repsPerMin").is_some());
        assert!(json.get("calories").is_some());
    }
}
