//! Deal-meter scoring.

use crate::utils::PRICE_EPSILON;

/// Maps the current price against the usual/lowest/highest context to a
/// 0-100 score. 0 is the worst observed price, 100 the best, 50 typical.
///
/// The rules are evaluated in order and the first match wins:
/// 1. below the observed floor (data anomaly) — best possible
/// 2. above the observed ceiling — worst possible
/// 3. the usual price is the floor and we are at it — best possible
/// 4. the usual price is the ceiling and we are at it — typical, not worst
/// 5. within a cent of the usual price — typical
/// 6. cheaper than usual — interpolate 50..100 towards the floor
/// 7. dearer than usual — interpolate 50..0 towards the ceiling
///
/// Rules 1/2 guarantee the interpolation denominators are positive, but a
/// zero span is still clamped to the matching extreme so no non-finite value
/// can escape.
pub fn calculate_meter_score(current: f64, usual: f64, lowest: f64, highest: f64) -> f64 {
    if current < lowest {
        return 100.0;
    }
    if current > highest {
        return 0.0;
    }
    if lowest == usual && current == lowest {
        return 100.0;
    }
    if highest == usual && current == highest {
        return 50.0;
    }
    if (current - usual).abs() < PRICE_EPSILON {
        return 50.0;
    }

    if current < usual {
        let span = usual - lowest;
        if span <= 0.0 {
            return 100.0;
        }
        50.0 + 50.0 * (usual - current) / span
    } else {
        let span = highest - usual;
        if span <= 0.0 {
            return 0.0;
        }
        50.0 - 50.0 * (current - usual) / span
    }
}
