//! Progression Engine
//!
//! Decides, after each logged session, whether an exercise's working
//! weight, rep target or hold time goes up, holds, or is deloaded.
//!
//! Flow:
//! - `None` variant short-circuits before anything else is read
//! - counted sets are resolved from the configured positions
//! - any failed counted set is a failure; failures accumulate toward the
//!   deload threshold
//! - a successful attempt must also hit its targets before the variant's
//!   calculator runs
//!
//! The engine is pure and total: every input yields a result, and
//! conditions it cannot act on come back as `Maintain` with a reason.

pub mod calculators;
pub mod failure;
pub mod manual_override;
pub mod rounding;

use tracing::debug;

use crate::models::{
    ExercisePerformance, ProgressionConfiguration, ProgressionResult, ProgressionState, SetRecord,
    TemplateContext,
};
use failure::FailureOutcome;
use rounding::display_amount;

/// Evaluate one completed session for one exercise
pub fn calculate_progression(
    config: &ProgressionConfiguration,
    state: &ProgressionState,
    performance: &ExercisePerformance,
    template: &TemplateContext,
) -> ProgressionResult {
    let Some(rules) = config.rules() else {
        return ProgressionResult::maintain(
            state,
            state.consecutive_failures,
            "Progression disabled for this exercise",
        );
    };

    let counted = failure::counted_sets(rules, performance);
    if counted.is_empty() {
        debug!(variant = %config.variant(), "no counted sets logged");
        return ProgressionResult::maintain(
            state,
            state.consecutive_failures,
            "No counted sets logged; nothing to evaluate",
        );
    }

    match failure::evaluate(rules, state, &counted) {
        FailureOutcome::Deload { failures } => {
            return failure::deload(rules, state, template, failures);
        }
        FailureOutcome::Hold { failures } => {
            debug!(variant = %config.variant(), failures, "failed attempt, holding");
            let threshold = rules
                .deload
                .failure_threshold
                .map(|t| format!(" of {}", t))
                .unwrap_or_default();
            return ProgressionResult::maintain(
                state,
                failures,
                format!("Failed attempt ({}{} before deload); holding", failures, threshold),
            );
        }
        FailureOutcome::Success => {}
    }

    if let Some(reason) = missed_target(config, state, template, &counted) {
        debug!(variant = %config.variant(), %reason, "targets not met");
        return ProgressionResult::maintain(state, state.consecutive_failures, reason);
    }

    let result = match config {
        ProgressionConfiguration::Linear(rules) => calculators::linear(rules, state),
        ProgressionConfiguration::Reps(rules) => {
            calculators::reps(rules, state, performance, template)
        }
        ProgressionConfiguration::Time(rules) => calculators::time(rules, state, template),
        ProgressionConfiguration::None => ProgressionResult::maintain(
            state,
            state.consecutive_failures,
            "Progression disabled for this exercise",
        ),
    };

    debug!(
        variant = %config.variant(),
        action = %result.action,
        details = %result.details,
        "progression evaluated"
    );
    result
}

/// Success without failures still has to hit the session's targets.
/// Returns the reason when a counted set fell short.
fn missed_target(
    config: &ProgressionConfiguration,
    state: &ProgressionState,
    template: &TemplateContext,
    counted: &[(u32, &SetRecord)],
) -> Option<String> {
    match config {
        ProgressionConfiguration::Linear(_) => match template.rep_range {
            Some(range) => missed_reps(counted, range.max),
            None => missed_weight(counted, state.max_weight.unwrap_or(0.0)),
        },
        ProgressionConfiguration::Reps(_) => template
            .rep_range
            .and_then(|range| missed_reps(counted, state.max_reps.unwrap_or(range.min))),
        ProgressionConfiguration::Time(_) => template
            .time_range
            .and_then(|range| missed_time(counted, state.max_time.unwrap_or(range.min))),
        ProgressionConfiguration::None => None,
    }
}

fn missed_reps(counted: &[(u32, &SetRecord)], target: u32) -> Option<String> {
    counted.iter().find_map(|(position, set)| {
        if !set.completed {
            Some(format!("Set {} was not completed; holding", position))
        } else if set.reps.unwrap_or(0) < target {
            Some(format!(
                "Set {} logged {} of {} target reps; holding",
                position,
                set.reps.unwrap_or(0),
                target
            ))
        } else {
            None
        }
    })
}

fn missed_weight(counted: &[(u32, &SetRecord)], target: f64) -> Option<String> {
    counted.iter().find_map(|(position, set)| {
        let weight = set.weight.unwrap_or(0.0);
        if !set.completed {
            Some(format!("Set {} was not completed; holding", position))
        } else if weight < target {
            Some(format!(
                "Set {} used {} below the {} target; holding",
                position,
                display_amount(weight),
                display_amount(target)
            ))
        } else {
            None
        }
    })
}

fn missed_time(counted: &[(u32, &SetRecord)], target: f64) -> Option<String> {
    counted.iter().find_map(|(position, set)| {
        let duration = set.duration.unwrap_or(0.0);
        if !set.completed {
            Some(format!("Set {} was not completed; holding", position))
        } else if duration < target {
            Some(format!(
                "Set {} held {}s of {}s target; holding",
                position,
                display_amount(duration),
                display_amount(target)
            ))
        } else {
            None
        }
    })
}
