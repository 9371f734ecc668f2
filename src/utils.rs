// Utility functions
pub const DAY_MS: i64 = 86_400_000;

/// Price deltas at or below this magnitude are treated as noise.
pub const PRICE_EPSILON: f64 = 0.01;

/// Rounds a monetary amount to two decimal places.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rounds a percentage to one decimal place.
pub fn round1(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}

/// Whole elapsed days in a millisecond span, floored.
pub fn floor_days(span_ms: i64) -> i64 {
    span_ms.div_euclid(DAY_MS)
}
