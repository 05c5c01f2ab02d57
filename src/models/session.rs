use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::config::DEFAULT_WEIGHT_ROUNDING;
use super::result::ProgressionResult;
use crate::progression::rounding::round_to_increment;

/// Persisted progression record for one (program, exercise) pair
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionState {
  pub max_weight: Option<f64>,
  pub max_reps: Option<u32>,
  /// Seconds
  pub max_time: Option<f64>,
  pub consecutive_failures: u32,
  pub last_progression_at: Option<DateTime<Utc>>,
}

impl ProgressionState {
  /// Merge an engine result into the state the caller persists next
  pub fn apply(&self, result: &ProgressionResult, now: DateTime<Utc>) -> Self {
    Self {
      max_weight: result.new_max_weight.or(self.max_weight),
      max_reps: result.new_max_reps.or(self.max_reps),
      max_time: result.new_max_time.or(self.max_time),
      consecutive_failures: result.new_consecutive_failures,
      last_progression_at: if result.progression_occurred {
        Some(now)
      } else {
        self.last_progression_at
      },
    }
  }
}

/// Inclusive target envelope
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TargetRange<T> {
  pub min: T,
  pub max: T,
}

impl<T> TargetRange<T> {
  pub fn new(min: T, max: T) -> Self {
    Self { min, max }
  }
}

/// Planned set envelope supplied by the template
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TemplateContext {
  pub rep_range: Option<TargetRange<u32>>,
  /// Seconds
  pub time_range: Option<TargetRange<f64>>,
  /// Fraction of max weight prescribed for the set (0.8 = 80%)
  pub load: Option<f64>,
}

impl TemplateContext {
  /// Absolute target weight for this set from the stored max
  pub fn target_weight(&self, max_weight: f64, step: Option<f64>) -> f64 {
    let raw = max_weight * self.load.unwrap_or(1.0);
    round_to_increment(raw, step.unwrap_or(DEFAULT_WEIGHT_ROUNDING)).max(0.0)
  }
}

/// One logged set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetRecord {
  pub weight: Option<f64>,
  pub reps: Option<u32>,
  /// Seconds
  pub duration: Option<f64>,
  pub completed: bool,
  pub failed: bool,
}

/// One exercise's logged outcome for a session, in set order
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ExercisePerformance {
  pub sets: Vec<SetRecord>,
}

impl ExercisePerformance {
  pub fn new(sets: Vec<SetRecord>) -> Self {
    Self { sets }
  }

  /// Sets paired with their 1-based position
  pub fn positioned(&self) -> impl Iterator<Item = (u32, &SetRecord)> {
    self.sets.iter().enumerate().map(|(i, set)| (i as u32 + 1, set))
  }

  pub fn max_logged_reps(&self) -> Option<u32> {
    self.sets.iter().filter_map(|s| s.reps).max()
  }

  pub fn max_logged_weight(&self) -> Option<f64> {
    self.sets.iter().filter_map(|s| s.weight).reduce(f64::max)
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::models::result::{ProgressionAction, ProgressionResult};

  fn set(weight: f64, reps: u32) -> SetRecord {
    SetRecord {
      weight: Some(weight),
      reps: Some(reps),
      completed: true,
      ..Default::default()
    }
  }

  #[test]
  fn test_apply_progression_stamps_timestamp() {
    let state = ProgressionState {
      max_weight: Some(100.0),
      max_reps: Some(5),
      consecutive_failures: 2,
      ..Default::default()
    };
    let result = ProgressionResult {
      progression_occurred: true,
      new_max_weight: Some(105.0),
      new_max_reps: None,
      new_max_time: None,
      new_consecutive_failures: 0,
      action: ProgressionAction::Progression,
      details: String::new(),
    };
    let now = Utc::now();

    let next = state.apply(&result, now);

    assert_eq!(next.max_weight, Some(105.0));
    assert_eq!(next.max_reps, Some(5), "unset result fields keep the stored value");
    assert_eq!(next.consecutive_failures, 0);
    assert_eq!(next.last_progression_at, Some(now));
  }

  #[test]
  fn test_apply_maintain_keeps_timestamp() {
    let earlier = Utc::now() - chrono::Duration::days(3);
    let state = ProgressionState {
      max_weight: Some(100.0),
      last_progression_at: Some(earlier),
      ..Default::default()
    };
    let result = ProgressionResult::maintain(&state, 1, "held");

    let next = state.apply(&result, Utc::now());
    assert_eq!(next.consecutive_failures, 1);
    assert_eq!(next.last_progression_at, Some(earlier));
  }

  #[test]
  fn test_target_weight_from_load() {
    let template = TemplateContext { load: Some(0.8), ..Default::default() };
    // 0.8 * 137.5 = 110
    assert_eq!(template.target_weight(137.5, None), 110.0);
    // 0.8 * 101 = 80.8 -> nearest 2.5
    assert_eq!(template.target_weight(101.0, None), 80.0);
    assert_eq!(template.target_weight(101.0, Some(1.0)), 81.0);
    assert_eq!(TemplateContext::default().target_weight(100.0, None), 100.0);
  }

  #[test]
  fn test_observed_maxima_span_all_sets() {
    let performance = ExercisePerformance::new(vec![set(60.0, 10), set(100.0, 5), set(80.0, 12)]);
    assert_eq!(performance.max_logged_reps(), Some(12));
    assert_eq!(performance.max_logged_weight(), Some(100.0));
    assert_eq!(ExercisePerformance::default().max_logged_weight(), None);

    let positions: Vec<u32> = performance.positioned().map(|(p, _)| p).collect();
    assert_eq!(positions, vec![1, 2, 3]);
  }
}
