//! Manual-override reconciliation for rep-based progression
//!
//! There is no explicit "edited by hand" flag on logged sets. Instead, when
//! the best logged reps or weight exceed the stored state, the log is taken
//! as a correction (AMRAP sets, catch-up after a break, typed-in numbers)
//! and adopted instead of an algorithmic step. This is best-effort: every
//! logged set is inspected, counted or not, so a light warm-up with extra
//! reps also reads as a rep override. Replace this module once callers can
//! flag manual edits explicitly.

use tracing::debug;

use super::calculators::stepped_weight;
use super::rounding::display_amount;
use crate::models::{
    ExercisePerformance, ProgressionResult, ProgressionRules, ProgressionState, TargetRange,
};

/// `Some` when the logged sets override the stored reps/weight
pub fn reconcile_reps(
    rules: &ProgressionRules,
    state: &ProgressionState,
    performance: &ExercisePerformance,
    range: TargetRange<u32>,
) -> Option<ProgressionResult> {
    let current_reps = state.max_reps.unwrap_or(range.min);
    let current_weight = state.max_weight.unwrap_or(0.0);

    let higher_reps = performance.max_logged_reps().filter(|&r| r > current_reps);
    let higher_weight = performance
        .max_logged_weight()
        .filter(|&w| w > current_weight);

    if higher_reps.is_none() && higher_weight.is_none() {
        return None;
    }

    let observed_reps = performance.max_logged_reps().unwrap_or(0);

    if observed_reps >= range.max && rules.enable_weight_progression_on_cap {
        let bumped = higher_weight.and_then(|w| stepped_weight(w, rules).map(|new| (w, new)));
        if let Some((observed_weight, new_weight)) = bumped {
            debug!(observed_reps, observed_weight, "manual override past rep cap");
            return Some(ProgressionResult::progressed(
                state,
                Some(new_weight),
                Some(range.min),
                None,
                format!(
                    "Logged {} reps at {} (past the {}-rep cap): weight increased to {}, reps reset to {}",
                    observed_reps,
                    display_amount(observed_weight),
                    range.max,
                    display_amount(new_weight),
                    range.min
                ),
            ));
        }
    }

    debug!(?higher_reps, ?higher_weight, "adopting logged values as manual catch-up");

    let mut adopted = Vec::new();
    if let Some(reps) = higher_reps {
        adopted.push(format!("reps {} -> {}", current_reps, reps));
    }
    if let Some(weight) = higher_weight {
        adopted.push(format!(
            "weight {} -> {}",
            display_amount(current_weight),
            display_amount(weight)
        ));
    }

    Some(ProgressionResult::progressed(
        state,
        higher_weight,
        higher_reps,
        None,
        format!("Adopted logged values: {}", adopted.join(", ")),
    ))
}
