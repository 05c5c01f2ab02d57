pub mod config;
pub mod result;
pub mod session;

pub use config::{
  AdjustmentKind, DeloadPolicy, DeloadStrategy, ProgressionConfiguration, ProgressionRules,
  ProgressionVariant,
};
pub use result::{ProgressionAction, ProgressionResult};
pub use session::{ExercisePerformance, ProgressionState, SetRecord, TargetRange, TemplateContext};
