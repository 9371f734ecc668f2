//! Pure statistics over one windowed price series.
//!
//! Every function takes the series plus an explicit `now_ms` so results are
//! deterministic and testable. Callers are responsible for never passing an
//! empty series; emptiness is short-circuited upstream as "no analysis".

use std::collections::HashMap;

use crate::model::{Direction, DropSummary, LastChange, PriceDrop, PricePoint, TimeAtPrice, UsualPrice};
use crate::utils::{DAY_MS, PRICE_EPSILON, floor_days, round1, round2};

/// Time-weighted mode of the series.
///
/// Each point's price is considered in effect from its own timestamp until
/// the next point, or until `now_ms` for the final point. Durations
/// accumulate per price level (rounded to cents before bucketing) and the
/// level with the largest total wins. The scan is left-to-right and a
/// candidate must strictly exceed the current maximum, so equal totals keep
/// the price seen first.
pub fn find_usual_price(data: &[PricePoint], now_ms: i64) -> UsualPrice {
    let mut order: Vec<i64> = Vec::new();
    let mut weights: HashMap<i64, i64> = HashMap::new();

    for (i, point) in data.iter().enumerate() {
        let until = data.get(i + 1).map_or(now_ms, |next| next.timestamp);
        let cents = (round2(point.price) * 100.0).round() as i64;
        if !weights.contains_key(&cents) {
            order.push(cents);
        }
        *weights.entry(cents).or_insert(0) += until - point.timestamp;
    }

    // Intervals tile [first timestamp, now] exactly, so the total span is
    // also the sum of all accumulated weights.
    let total_ms = now_ms - data[0].timestamp;

    let mut best_cents = order[0];
    let mut best_weight = i64::MIN;
    for &cents in &order {
        let weight = weights[&cents];
        if weight > best_weight {
            best_weight = weight;
            best_cents = cents;
        }
    }

    let percentage_of_time = if total_ms > 0 {
        ((best_weight as f64 / total_ms as f64) * 100.0).round() as u8
    } else {
        100
    };

    UsualPrice {
        price: best_cents as f64 / 100.0,
        duration_days: (best_weight as f64 / DAY_MS as f64).round() as i64,
        percentage_of_time,
    }
}

/// Scans adjacent pairs for price decreases beyond the noise threshold.
///
/// Returns every drop event along with the aggregate summary the output
/// record carries.
pub fn analyze_price_drops(data: &[PricePoint], now_ms: i64) -> (Vec<PriceDrop>, DropSummary) {
    let mut drops = Vec::new();
    for i in 1..data.len() {
        let delta = data[i].price - data[i - 1].price;
        if delta < -PRICE_EPSILON {
            let until = data.get(i + 1).map_or(now_ms, |next| next.timestamp);
            drops.push(PriceDrop {
                from_price: data[i - 1].price,
                to_price: data[i].price,
                amount: delta.abs(),
                timestamp: data[i].timestamp,
                duration_ms: until - data[i].timestamp,
            });
        }
    }

    let average_drop = if drops.is_empty() {
        0.0
    } else {
        round2(drops.iter().map(|d| d.amount).sum::<f64>() / drops.len() as f64)
    };
    let summary = DropSummary {
        total: drops.len(),
        average_drop,
        days_since_last_drop: drops.last().map(|d| floor_days(now_ms - d.timestamp)),
    };

    (drops, summary)
}

/// Compares the last two points. `None` when the series has fewer than two.
pub fn analyze_last_movement(data: &[PricePoint], now_ms: i64) -> Option<LastChange> {
    if data.len() < 2 {
        return None;
    }

    let last = data[data.len() - 1];
    let previous = data[data.len() - 2];
    let change = last.price - previous.price;

    let direction = if change > 0.0 {
        Direction::Increase
    } else if change < 0.0 {
        Direction::Decrease
    } else {
        Direction::Stable
    };

    // A zero prior price would push the percentage to infinity; report 0
    // instead of letting a non-finite value into the record.
    let percentage = if previous.price == 0.0 {
        0.0
    } else {
        round1(change / previous.price * 100.0)
    };

    Some(LastChange {
        amount: round2(change),
        percentage,
        days_ago: floor_days(now_ms - last.timestamp),
        direction,
    })
}

/// Whole days the most recent price level has held. The final point is still
/// in effect by construction, so this is simply the floored distance from it
/// to `now_ms`.
pub fn analyze_stability(data: &[PricePoint], now_ms: i64) -> i64 {
    data.last().map_or(0, |p| floor_days(now_ms - p.timestamp))
}

/// Aggregates the maximal contiguous runs the series spent within a cent of
/// `target`. A run ends when the next point leaves the level, or at `now_ms`
/// for a run still in effect.
pub fn analyze_time_at_price(data: &[PricePoint], target: f64, now_ms: i64) -> TimeAtPrice {
    // (duration, end) per run
    let mut runs: Vec<(i64, i64)> = Vec::new();
    let mut start: Option<i64> = None;

    for (i, point) in data.iter().enumerate() {
        if (point.price - target).abs() > PRICE_EPSILON {
            continue;
        }
        if start.is_none() {
            start = Some(point.timestamp);
        }
        let end = match data.get(i + 1) {
            Some(next) if (next.price - target).abs() <= PRICE_EPSILON => None,
            Some(next) => Some(next.timestamp),
            None => Some(now_ms),
        };
        if let (Some(s), Some(e)) = (start, end) {
            runs.push((e - s, e));
            start = None;
        }
    }

    let total_ms: i64 = runs.iter().map(|(duration, _)| duration).sum();
    let average_duration_days = if runs.is_empty() {
        0.0
    } else {
        round2(total_ms as f64 / runs.len() as f64 / DAY_MS as f64)
    };

    TimeAtPrice {
        total_duration_days: round2(total_ms as f64 / DAY_MS as f64),
        average_duration_days,
        number_of_periods: runs.len(),
        days_since_last: runs.last().map_or(0, |&(_, end)| floor_days(now_ms - end)),
    }
}

/// Number of adjacent changes whose magnitude clears the noise threshold.
pub fn count_significant_changes(data: &[PricePoint]) -> usize {
    data.windows(2)
        .filter(|w| (w[1].price - w[0].price).abs() > PRICE_EPSILON)
        .count()
}

/// Arithmetic mean rounded to cents; 0 for an empty list.
pub fn calculate_average(prices: &[f64]) -> f64 {
    if prices.is_empty() {
        return 0.0;
    }
    round2(prices.iter().sum::<f64>() / prices.len() as f64)
}
