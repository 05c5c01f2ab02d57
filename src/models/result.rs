use serde::{Deserialize, Serialize};

use super::session::ProgressionState;

/// What the engine decided for this session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionAction {
  Progression,
  Deload,
  Maintain,
}

impl std::fmt::Display for ProgressionAction {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Progression => write!(f, "progression"),
      Self::Deload => write!(f, "deload"),
      Self::Maintain => write!(f, "maintain"),
    }
  }
}

impl std::str::FromStr for ProgressionAction {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "progression" => Ok(Self::Progression),
      "deload" => Ok(Self::Deload),
      "maintain" => Ok(Self::Maintain),
      _ => Err(format!("Unknown progression action: {}", s)),
    }
  }
}

/// Engine output; the only thing the caller persists
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProgressionResult {
  pub progression_occurred: bool,
  pub new_max_weight: Option<f64>,
  pub new_max_reps: Option<u32>,
  pub new_max_time: Option<f64>,
  pub new_consecutive_failures: u32,
  pub action: ProgressionAction,
  pub details: String,
}

impl ProgressionResult {
  /// No change: echoes the current max values back
  pub fn maintain(state: &ProgressionState, consecutive_failures: u32, details: impl Into<String>) -> Self {
    Self {
      progression_occurred: false,
      new_max_weight: state.max_weight,
      new_max_reps: state.max_reps,
      new_max_time: state.max_time,
      new_consecutive_failures: consecutive_failures,
      action: ProgressionAction::Maintain,
      details: details.into(),
    }
  }

  /// Successful step; fields left `None` fall back to the current state
  pub fn progressed(
    state: &ProgressionState,
    weight: Option<f64>,
    reps: Option<u32>,
    time: Option<f64>,
    details: impl Into<String>,
  ) -> Self {
    Self {
      progression_occurred: true,
      new_max_weight: weight.or(state.max_weight),
      new_max_reps: reps.or(state.max_reps),
      new_max_time: time.or(state.max_time),
      new_consecutive_failures: 0,
      action: ProgressionAction::Progression,
      details: details.into(),
    }
  }
}
