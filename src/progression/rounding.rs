//! Rounding to plate / stopwatch increments

/// Nearest multiple of `increment`. Non-positive or non-finite increments
/// leave the value untouched.
pub fn round_to_increment(value: f64, increment: f64) -> f64 {
    if !increment.is_finite() || increment <= 0.0 {
        return value;
    }
    (value / increment).round() * increment
}

/// Round only when a step is configured
pub fn round_optional(value: f64, step: Option<f64>) -> f64 {
    match step {
        Some(step) => round_to_increment(value, step),
        None => value,
    }
}

/// Human-readable amount for result details: `105`, `102.5`, `33.33`
pub fn display_amount(value: f64) -> String {
    let text = format!("{:.2}", value);
    text.trim_end_matches('0').trim_end_matches('.').to_string()
}
