//! Progression policy attached to a training template

use serde::{Deserialize, Serialize};

/// ---------------------------------------------------------------------------
/// Centralized Defaults
/// ---------------------------------------------------------------------------

/// Reps added per successful session when `reps_increment` is unset
pub const DEFAULT_REPS_INCREMENT: u32 = 1;
/// Seconds added per successful session when `time_increment` is unset
pub const DEFAULT_TIME_INCREMENT: f64 = 5.0;
/// Smallest plate pair step used when no weight rounding is configured
pub const DEFAULT_WEIGHT_ROUNDING: f64 = 2.5;

/// ---------------------------------------------------------------------------
/// Enumerations
/// ---------------------------------------------------------------------------

/// Flat tag mirroring the configuration variants, for logging and storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProgressionVariant {
  Linear,
  Reps,
  Time,
  None,
}

impl std::fmt::Display for ProgressionVariant {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Linear => write!(f, "linear"),
      Self::Reps => write!(f, "reps"),
      Self::Time => write!(f, "time"),
      Self::None => write!(f, "none"),
    }
  }
}

impl std::str::FromStr for ProgressionVariant {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "linear" => Ok(Self::Linear),
      "reps" => Ok(Self::Reps),
      "time" => Ok(Self::Time),
      "none" => Ok(Self::None),
      _ => Err(format!("Unknown progression variant: {}", s)),
    }
  }
}

/// How an increment or deload amount is applied
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum AdjustmentKind {
  /// Absolute amount (kg/lb, reps, seconds)
  #[default]
  Fixed,
  /// Relative amount
  Percentage,
}

impl std::fmt::Display for AdjustmentKind {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::Fixed => write!(f, "fixed"),
      Self::Percentage => write!(f, "percentage"),
    }
  }
}

impl std::str::FromStr for AdjustmentKind {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "fixed" => Ok(Self::Fixed),
      "percentage" => Ok(Self::Percentage),
      _ => Err(format!("Unknown adjustment kind: {}", s)),
    }
  }
}

/// Which target a deload reduces
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum DeloadStrategy {
  #[default]
  WeightOnly,
  RepsOnly,
  TimeOnly,
  /// Shorten the hold until it reaches the range floor, then drop weight
  TimeThenWeight,
  /// Percentage weight reduction regardless of `DeloadPolicy::kind`
  Percentage,
}

impl std::fmt::Display for DeloadStrategy {
  fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
    match self {
      Self::WeightOnly => write!(f, "weight_only"),
      Self::RepsOnly => write!(f, "reps_only"),
      Self::TimeOnly => write!(f, "time_only"),
      Self::TimeThenWeight => write!(f, "time_then_weight"),
      Self::Percentage => write!(f, "percentage"),
    }
  }
}

impl std::str::FromStr for DeloadStrategy {
  type Err = String;
  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "weight_only" => Ok(Self::WeightOnly),
      "reps_only" => Ok(Self::RepsOnly),
      "time_only" => Ok(Self::TimeOnly),
      "time_then_weight" => Ok(Self::TimeThenWeight),
      "percentage" => Ok(Self::Percentage),
      _ => Err(format!("Unknown deload strategy: {}", s)),
    }
  }
}

/// ---------------------------------------------------------------------------
/// Policy Structures
/// ---------------------------------------------------------------------------

/// Deload policy applied once consecutive failures reach the threshold
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DeloadPolicy {
  pub strategy: DeloadStrategy,
  pub kind: AdjustmentKind,
  /// Fixed amount, or a percentage given either as a fraction (`0.1`) or a
  /// whole percentage (`10`). Values below 1 are read as fractions.
  pub amount: Option<f64>,
  /// Consecutive failed sessions before a deload fires. Unset = never deload.
  pub failure_threshold: Option<u32>,
}

impl DeloadPolicy {
  /// Deload amount as a fraction in `0..=1`, accepting both `0.1` and `10`
  pub fn normalized_fraction(&self) -> Option<f64> {
    self.amount.map(normalize_fraction)
  }
}

/// `0.1` and `10` both mean ten percent
pub fn normalize_fraction(amount: f64) -> f64 {
  let fraction = if amount < 1.0 { amount } else { amount / 100.0 };
  fraction.clamp(0.0, 1.0)
}

/// Parameters shared by the progressing variants
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionRules {
  /// 1-based set positions that decide success. Empty = every logged set.
  pub counted_set_positions: Vec<u32>,
  pub increment_kind: AdjustmentKind,
  /// Fixed: added to weight. Percentage: whole percent of current weight.
  pub weight_increment: Option<f64>,
  pub reps_increment: Option<u32>,
  pub time_increment: Option<f64>,
  pub weight_rounding_step: Option<f64>,
  pub time_rounding_step: Option<f64>,
  /// Reps/Time variants: add weight and reset to the range floor once capped
  pub enable_weight_progression_on_cap: bool,
  pub deload: DeloadPolicy,
}

impl ProgressionRules {
  pub fn counts_position(&self, position: u32) -> bool {
    self.counted_set_positions.is_empty() || self.counted_set_positions.contains(&position)
  }

  pub fn reps_step(&self) -> u32 {
    self.reps_increment.unwrap_or(DEFAULT_REPS_INCREMENT)
  }

  pub fn time_step(&self) -> f64 {
    self.time_increment.unwrap_or(DEFAULT_TIME_INCREMENT)
  }
}

/// Progression policy. `None` is a first-class "static exercise" and carries
/// no parameters, so nothing downstream can read them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "variant", rename_all = "snake_case")]
#[derive(Default)]
pub enum ProgressionConfiguration {
  /// Add weight after every successful session
  Linear(ProgressionRules),
  /// Double progression on reps inside `TemplateContext::rep_range`
  Reps(ProgressionRules),
  /// Double progression on hold time inside `TemplateContext::time_range`
  Time(ProgressionRules),
  #[default]
  None,
}

impl ProgressionConfiguration {
  pub fn from_json(json: &str) -> Result<Self, String> {
    serde_json::from_str(json).map_err(|e| format!("Failed to parse progression config: {}", e))
  }

  pub fn to_json(&self) -> String {
    serde_json::to_string(self).unwrap_or_default()
  }

  pub fn variant(&self) -> ProgressionVariant {
    match self {
      Self::Linear(_) => ProgressionVariant::Linear,
      Self::Reps(_) => ProgressionVariant::Reps,
      Self::Time(_) => ProgressionVariant::Time,
      Self::None => ProgressionVariant::None,
    }
  }

  pub fn rules(&self) -> Option<&ProgressionRules> {
    match self {
      Self::Linear(rules) | Self::Reps(rules) | Self::Time(rules) => Some(rules),
      Self::None => None,
    }
  }
}
