//! Failure detection and deload
//!
//! Only counted sets decide the outcome. Any failed counted set fails the
//! attempt; consecutive failures accumulate until the deload threshold.

use tracing::{debug, warn};

use super::rounding::{display_amount, round_optional, round_to_increment};
use crate::models::{
    AdjustmentKind, DeloadStrategy, ExercisePerformance, ProgressionAction, ProgressionResult,
    ProgressionRules, ProgressionState, SetRecord, TemplateContext,
};

/// Outcome of the failure check for one attempt
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    Success,
    /// Failed, threshold not reached
    Hold { failures: u32 },
    /// Failed, threshold reached
    Deload { failures: u32 },
}

/// Counted sets with their 1-based position
pub fn counted_sets<'a>(
    rules: &ProgressionRules,
    performance: &'a ExercisePerformance,
) -> Vec<(u32, &'a SetRecord)> {
    performance
        .positioned()
        .filter(|(position, _)| rules.counts_position(*position))
        .collect()
}

pub fn evaluate(
    rules: &ProgressionRules,
    state: &ProgressionState,
    counted: &[(u32, &SetRecord)],
) -> FailureOutcome {
    if !counted.iter().any(|(_, set)| set.failed) {
        return FailureOutcome::Success;
    }

    let failures = state.consecutive_failures.saturating_add(1);
    match rules.deload.failure_threshold {
        Some(threshold) if failures >= threshold => FailureOutcome::Deload { failures },
        _ => FailureOutcome::Hold { failures },
    }
}

#[derive(Debug, Clone, Copy)]
enum Cut {
    Fixed(f64),
    Fraction(f64),
}

fn reduce(value: f64, cut: Cut) -> f64 {
    match cut {
        Cut::Fixed(amount) => value - amount,
        Cut::Fraction(fraction) => value * (1.0 - fraction),
    }
}

/// Rounded cut of `current`. When rounding cancels the cut, drop one
/// rounding step instead.
fn cut_down(current: f64, cut: Cut, step: Option<f64>) -> f64 {
    let reduced = round_optional(reduce(current, cut), step);
    if reduced < current {
        return reduced;
    }
    match step.filter(|s| s.is_finite() && *s > 0.0) {
        Some(step) => round_to_increment(current - step, step),
        None => reduced,
    }
}

/// Deload once the failure threshold is crossed. A missing deload amount,
/// or a tracked value that cannot go any lower, is reported as Maintain
/// with the incremented counter.
pub fn deload(
    rules: &ProgressionRules,
    state: &ProgressionState,
    template: &TemplateContext,
    failures: u32,
) -> ProgressionResult {
    let policy = &rules.deload;
    let kind = match policy.strategy {
        DeloadStrategy::Percentage => AdjustmentKind::Percentage,
        _ => policy.kind,
    };
    let cut = match kind {
        AdjustmentKind::Fixed => policy.amount.map(Cut::Fixed),
        AdjustmentKind::Percentage => policy.normalized_fraction().map(Cut::Fraction),
    };
    let Some(cut) = cut else {
        warn!(failures, "failure threshold reached without a deload amount");
        return ProgressionResult::maintain(
            state,
            failures,
            format!(
                "{} consecutive failures reached the deload threshold, but no deload amount is configured",
                failures
            ),
        );
    };

    let deload_weight = || {
        state
            .max_weight
            .map(|weight| (weight, cut_down(weight, cut, rules.weight_rounding_step).max(0.0)))
    };
    let deload_time = |floor: f64| {
        state
            .max_time
            .map(|time| (time, cut_down(time, cut, rules.time_rounding_step).max(floor)))
    };

    let mut new_weight = None;
    let mut new_reps = None;
    let mut new_time = None;

    match policy.strategy {
        DeloadStrategy::WeightOnly | DeloadStrategy::Percentage => new_weight = deload_weight(),
        DeloadStrategy::RepsOnly => {
            let floor = template.rep_range.map(|r| r.min).unwrap_or(0);
            new_reps = state.max_reps.map(|reps| {
                let reduced = cut_down(reps as f64, cut, Some(1.0)).max(0.0) as u32;
                (reps, reduced.max(floor))
            });
        }
        DeloadStrategy::TimeOnly => new_time = deload_time(0.0),
        DeloadStrategy::TimeThenWeight => {
            let floor = template.time_range.map(|r| r.min).unwrap_or(0.0);
            match state.max_time {
                Some(time) if time > floor => new_time = deload_time(floor),
                _ => new_weight = deload_weight(),
            }
        }
    }

    let tracked = new_weight.is_some() || new_reps.is_some() || new_time.is_some();
    let lowered = new_weight.is_some_and(|(from, to)| to < from)
        || new_reps.is_some_and(|(from, to)| to < from)
        || new_time.is_some_and(|(from, to)| to < from);

    if tracked && !lowered {
        warn!(failures, strategy = %policy.strategy, "deload cannot lower the tracked values");
        return ProgressionResult::maintain(
            state,
            failures,
            format!(
                "{} consecutive failures reached the deload threshold, but {} has nothing left to reduce",
                failures, policy.strategy
            ),
        );
    }

    let mut changes = Vec::new();
    if let Some((from, to)) = new_weight {
        changes.push(format!("weight {} -> {}", display_amount(from), display_amount(to)));
    }
    if let Some((from, to)) = new_reps {
        changes.push(format!("reps {} -> {}", from, to));
    }
    if let Some((from, to)) = new_time {
        changes.push(format!("time {}s -> {}s", display_amount(from), display_amount(to)));
    }
    let summary = if changes.is_empty() {
        format!("nothing tracked to reduce for {}", policy.strategy)
    } else {
        changes.join(", ")
    };

    debug!(failures, strategy = %policy.strategy, "deload applied");

    ProgressionResult {
        progression_occurred: false,
        new_max_weight: new_weight.map(|(_, to)| to).or(state.max_weight),
        new_max_reps: new_reps.map(|(_, to)| to).or(state.max_reps),
        new_max_time: new_time.map(|(_, to)| to).or(state.max_time),
        new_consecutive_failures: 0,
        action: ProgressionAction::Deload,
        details: format!("Deload after {} consecutive failures: {}", failures, summary),
    }
}
