//! Success-path calculators, one per progressing variant
//!
//! Each calculator assumes the attempt already succeeded; failures and
//! deloads are resolved by the dispatcher before any of these run.

use tracing::warn;

use super::manual_override;
use super::rounding::{display_amount, round_optional};
use crate::models::{
    AdjustmentKind, ExercisePerformance, ProgressionResult, ProgressionRules, ProgressionState,
    TemplateContext,
};

/// Next working weight from `base`. `None` when no weight increment is
/// configured or when rounding cancels the step.
pub fn stepped_weight(base: f64, rules: &ProgressionRules) -> Option<f64> {
    let increment = rules.weight_increment?;
    let raw = match rules.increment_kind {
        AdjustmentKind::Fixed => base + increment,
        AdjustmentKind::Percentage => base * (1.0 + increment / 100.0),
    };
    let next = round_optional(raw, rules.weight_rounding_step).max(0.0);
    if next > base {
        Some(next)
    } else {
        warn!(base, next, "weight increment is swallowed by the rounding step");
        None
    }
}

/// Why `stepped_weight` gave nothing for `base`
fn no_weight_step(base: f64, rules: &ProgressionRules) -> String {
    match rules.weight_increment {
        None => "no weight increment is configured".to_string(),
        Some(_) => format!(
            "the weight increment rounds back to {}; check the weight rounding step",
            display_amount(base)
        ),
    }
}

/// Hold at the top of a range when no weight step can be taken
fn hold_at_cap(
    rules: &ProgressionRules,
    state: &ProgressionState,
    weight: f64,
    top: String,
) -> ProgressionResult {
    let reason = if rules.enable_weight_progression_on_cap {
        no_weight_step(weight, rules)
    } else {
        "weight progression on cap is off".to_string()
    };
    ProgressionResult::maintain(state, 0, format!("At top of {} and {}; holding", top, reason))
}

// ---------------------------------------------------------------------------
/// Linear: weight only
// ---------------------------------------------------------------------------

pub fn linear(rules: &ProgressionRules, state: &ProgressionState) -> ProgressionResult {
    let current = state.max_weight.unwrap_or(0.0);

    match stepped_weight(current, rules) {
        Some(new_weight) => ProgressionResult::progressed(
            state,
            Some(new_weight),
            None,
            None,
            format!(
                "Weight increased from {} to {}",
                display_amount(current),
                display_amount(new_weight)
            ),
        ),
        None => ProgressionResult::maintain(
            state,
            0,
            format!("Linear progression holds: {}", no_weight_step(current, rules)),
        ),
    }
}

// ---------------------------------------------------------------------------
/// Reps: double progression inside the template's rep range
// ---------------------------------------------------------------------------

pub fn reps(
    rules: &ProgressionRules,
    state: &ProgressionState,
    performance: &ExercisePerformance,
    template: &TemplateContext,
) -> ProgressionResult {
    let Some(range) = template.rep_range else {
        warn!("rep-based progression configured on a template without a rep range");
        return ProgressionResult::maintain(
            state,
            0,
            "Rep-based progression requires a rep range on the template",
        );
    };

    if let Some(result) = manual_override::reconcile_reps(rules, state, performance, range) {
        return result;
    }

    let current_reps = state.max_reps.unwrap_or(range.min);
    let current_weight = state.max_weight.unwrap_or(0.0);

    if current_reps < range.max {
        let new_reps = current_reps.saturating_add(rules.reps_step()).min(range.max);
        return ProgressionResult::progressed(
            state,
            None,
            Some(new_reps),
            None,
            format!("Reps increased from {} to {}", current_reps, new_reps),
        );
    }

    if rules.enable_weight_progression_on_cap {
        if let Some(new_weight) = stepped_weight(current_weight, rules) {
            return ProgressionResult::progressed(
                state,
                Some(new_weight),
                Some(range.min),
                None,
                format!(
                    "Top of rep range reached ({} reps): weight increased from {} to {}, reps reset to {}",
                    range.max,
                    display_amount(current_weight),
                    display_amount(new_weight),
                    range.min
                ),
            );
        }
    }

    hold_at_cap(
        rules,
        state,
        current_weight,
        format!("rep range ({} reps)", range.max),
    )
}

// ---------------------------------------------------------------------------
/// Time: double progression inside the template's hold-time range
// ---------------------------------------------------------------------------

pub fn time(
    rules: &ProgressionRules,
    state: &ProgressionState,
    template: &TemplateContext,
) -> ProgressionResult {
    let Some(range) = template.time_range else {
        warn!("time-based progression configured on a template without a time range");
        return ProgressionResult::maintain(
            state,
            0,
            "Time-based progression requires a time range on the template",
        );
    };

    let current_time = state.max_time.unwrap_or(range.min);
    let current_weight = state.max_weight.unwrap_or(0.0);

    if current_time < range.max {
        let stepped = (current_time + rules.time_step()).min(range.max);
        let new_time = round_optional(stepped, rules.time_rounding_step).min(range.max);

        if new_time <= current_time {
            warn!(
                current_time,
                new_time, "time increment is swallowed by the rounding step"
            );
            return ProgressionResult::maintain(
                state,
                0,
                format!(
                    "Time increment rounds back to {}s; check the time rounding step",
                    display_amount(new_time)
                ),
            );
        }

        return ProgressionResult::progressed(
            state,
            None,
            None,
            Some(new_time),
            format!(
                "Hold time increased from {}s to {}s",
                display_amount(current_time),
                display_amount(new_time)
            ),
        );
    }

    if rules.enable_weight_progression_on_cap {
        if let Some(new_weight) = stepped_weight(current_weight, rules) {
            return ProgressionResult::progressed(
                state,
                Some(new_weight),
                None,
                Some(range.min),
                format!(
                    "Top of time range reached ({}s): weight increased from {} to {}, time reset to {}s",
                    display_amount(range.max),
                    display_amount(current_weight),
                    display_amount(new_weight),
                    display_amount(range.min)
                ),
            );
        }
    }

    hold_at_cap(
        rules,
        state,
        current_weight,
        format!("time range ({}s)", display_amount(range.max)),
    )
}
