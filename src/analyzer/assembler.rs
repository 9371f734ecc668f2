//! Channel selection and assembly of the final analysis record.

use crate::analyzer::{meter, statistics};
use crate::decoder;
use crate::model::{
    AnalysisRecord, Channel, ChannelSeries, CurrentPriceContext, LowestPriceMetrics, MeterScore,
    PricePoint, PriceRange, RecentActivity, VolatilityMetrics,
};
use crate::utils::round2;

pub const DEFAULT_WINDOW_DAYS: i64 = 90;

/// Composes decoder, statistics and meter into one analysis pass.
pub struct PriceAnalyzer {
    window_days: i64,
}

impl Default for PriceAnalyzer {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_DAYS)
    }
}

impl PriceAnalyzer {
    pub fn new(window_days: i64) -> Self {
        Self { window_days }
    }

    /// First channel with any decoded data, in priority order. Priority only
    /// matters among non-empty channels; an empty channel is skipped no
    /// matter how early it is listed.
    pub fn select_channel(channels: &[ChannelSeries]) -> Option<&ChannelSeries> {
        channels.iter().find(|c| !c.points.is_empty())
    }

    /// Runs the full analysis for a product's channels.
    ///
    /// `None` means "no analysis available": either every channel is empty
    /// or the selected channel has no data inside the trailing window. Both
    /// are expected outcomes, not errors.
    pub fn analyze(&self, channels: &[ChannelSeries], now_ms: i64) -> Option<AnalysisRecord> {
        let selected = Self::select_channel(channels)?;
        let windowed = decoder::filter_window(&selected.points, self.window_days, now_ms);
        if windowed.is_empty() {
            return None;
        }
        Some(Self::assemble(selected.channel, &windowed, now_ms))
    }

    /// Pure composition over a non-empty windowed series.
    fn assemble(channel: Channel, data: &[PricePoint], now_ms: i64) -> AnalysisRecord {
        let current_price = data[data.len() - 1].price;
        let lowest_price = data.iter().map(|p| p.price).fold(f64::INFINITY, f64::min);
        let highest_price = data
            .iter()
            .map(|p| p.price)
            .fold(f64::NEG_INFINITY, f64::max);

        let usual_price = statistics::find_usual_price(data, now_ms);
        let (_, drop_summary) = statistics::analyze_price_drops(data, now_ms);
        let last_change = statistics::analyze_last_movement(data, now_ms);
        let stable_days = statistics::analyze_stability(data, now_ms);
        let at_floor = statistics::analyze_time_at_price(data, lowest_price, now_ms);

        let score = meter::calculate_meter_score(
            current_price,
            usual_price.price,
            lowest_price,
            highest_price,
        )
        .round() as u8;

        AnalysisRecord {
            price_source: channel,
            current_price_context: CurrentPriceContext {
                current_price,
                usual_price,
                lowest_price,
                highest_price,
            },
            price_drops: drop_summary,
            recent_activity: RecentActivity {
                stable_days,
                last_change,
            },
            volatility_metrics: VolatilityMetrics {
                total_changes: statistics::count_significant_changes(data),
                price_range: PriceRange {
                    min: lowest_price,
                    max: highest_price,
                },
                spread: round2(highest_price - lowest_price),
            },
            lowest_price_metrics: LowestPriceMetrics {
                price: lowest_price,
                average_duration_days: at_floor.average_duration_days,
                number_of_periods: at_floor.number_of_periods,
                days_since_lowest: at_floor.days_since_last,
            },
            meter_score: MeterScore {
                score,
                current_price,
                usual_price: usual_price.price,
                lowest_price,
                highest_price,
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Channel;
    use crate::utils::DAY_MS;

    fn channel(channel: Channel, points: &[(i64, f64)]) -> ChannelSeries {
        ChannelSeries {
            channel,
            points: points
                .iter()
                .map(|&(day, price)| PricePoint {
                    timestamp: day * DAY_MS,
                    price,
                })
                .collect(),
        }
    }

    #[test]
    fn selector_skips_empty_channels_regardless_of_priority() {
        let channels = vec![
            channel(Channel::BuyBox, &[]),
            channel(Channel::Amazon, &[]),
            channel(Channel::New, &[(95, 10.0)]),
        ];

        let selected = PriceAnalyzer::select_channel(&channels).unwrap();
        assert_eq!(selected.channel, Channel::New);
    }

    #[test]
    fn all_channels_empty_means_no_analysis() {
        let channels = vec![channel(Channel::BuyBox, &[]), channel(Channel::Amazon, &[])];
        let analyzer = PriceAnalyzer::default();

        assert!(analyzer.analyze(&channels, 100 * DAY_MS).is_none());
    }

    #[test]
    fn stale_selected_channel_means_no_analysis() {
        // Data exists but all of it predates the 90-day window.
        let channels = vec![channel(Channel::Amazon, &[(1, 9.99), (2, 8.99)])];
        let analyzer = PriceAnalyzer::default();

        assert!(analyzer.analyze(&channels, 200 * DAY_MS).is_none());
    }

    #[test]
    fn record_carries_the_selected_price_source() {
        let channels = vec![
            channel(Channel::BuyBox, &[]),
            channel(Channel::Amazon, &[(95, 12.0), (98, 11.0)]),
        ];
        let analyzer = PriceAnalyzer::default();

        let record = analyzer.analyze(&channels, 100 * DAY_MS).unwrap();
        assert_eq!(record.price_source, Channel::Amazon);
    }

    #[test]
    fn assembles_a_consistent_record() {
        // 20.00 for 60 days, drop to 15.00 for the last 30.
        let channels = vec![channel(Channel::New, &[(10, 20.0), (70, 15.0)])];
        let analyzer = PriceAnalyzer::default();
        let now_ms = 100 * DAY_MS;

        let record = analyzer.analyze(&channels, now_ms).unwrap();

        assert_eq!(record.current_price_context.current_price, 15.0);
        assert_eq!(record.current_price_context.lowest_price, 15.0);
        assert_eq!(record.current_price_context.highest_price, 20.0);
        assert_eq!(record.current_price_context.usual_price.price, 20.0);
        assert_eq!(record.current_price_context.usual_price.percentage_of_time, 67);

        assert_eq!(record.price_drops.total, 1);
        assert_eq!(record.price_drops.average_drop, 5.0);
        assert_eq!(record.price_drops.days_since_last_drop, Some(30));

        assert_eq!(record.recent_activity.stable_days, 30);
        let last_change = record.recent_activity.last_change.unwrap();
        assert_eq!(last_change.amount, -5.0);
        assert_eq!(last_change.percentage, -25.0);

        assert_eq!(record.volatility_metrics.total_changes, 1);
        assert_eq!(record.volatility_metrics.spread, 5.0);

        assert_eq!(record.lowest_price_metrics.price, 15.0);
        assert_eq!(record.lowest_price_metrics.number_of_periods, 1);
        assert_eq!(record.lowest_price_metrics.average_duration_days, 30.0);
        assert_eq!(record.lowest_price_metrics.days_since_lowest, 0);

        // Current price is the floor: interpolation lands on 100.
        assert_eq!(record.meter_score.score, 100);
    }

    #[test]
    fn record_serializes_with_stable_field_names() {
        let channels = vec![channel(Channel::Fba, &[(95, 10.0), (97, 9.0)])];
        let analyzer = PriceAnalyzer::default();
        let record = analyzer.analyze(&channels, 100 * DAY_MS).unwrap();

        let json = serde_json::to_string(&record).unwrap();
        for field in [
            "\"priceSource\":\"fba\"",
            "\"currentPriceContext\"",
            "\"usualPrice\"",
            "\"percentageOfTime\"",
            "\"priceDrops\"",
            "\"daysSinceLastDrop\"",
            "\"recentActivity\"",
            "\"stableDays\"",
            "\"volatilityMetrics\"",
            "\"priceRange\"",
            "\"lowestPriceMetrics\"",
            "\"meterScore\"",
        ] {
            assert!(json.contains(field), "missing {field} in {json}");
        }

        let back: AnalysisRecord = serde_json::from_str(&json).unwrap();
        assert_eq!(back, record);
    }
}
