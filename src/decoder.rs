// Vendor-specific price history decoding
use crate::model::{Channel, ChannelSeries, PricePoint};
use crate::utils::DAY_MS;

/// Minutes between the vendor's custom epoch and the Unix epoch.
pub const EPOCH_OFFSET_MINUTES: i64 = 21_564_000;

/// Price value meaning "no price recorded at this time code".
const SENTINEL_NO_DATA: i64 = -1;

/// Converts a vendor time code (minutes since the vendor epoch) to epoch
/// milliseconds.
pub fn vendor_time_to_epoch_ms(time_code: i64) -> i64 {
    (time_code + EPOCH_OFFSET_MINUTES) * 60_000
}

/// Decodes one channel's flat `[timeCode, priceCents, ...]` array into a
/// chronological series of price points.
///
/// Sentinel pairs are dropped, cents become major units, and the result is
/// sorted ascending by timestamp with duplicate timestamps collapsed to the
/// first occurrence. An absent channel decodes to an empty series.
pub fn decode_series(raw: Option<&[i64]>) -> Vec<PricePoint> {
    let Some(raw) = raw else {
        return Vec::new();
    };

    let mut points = Vec::with_capacity(raw.len() / 2);
    for pair in raw.chunks_exact(2) {
        let price_cents = pair[1];
        if price_cents == SENTINEL_NO_DATA {
            continue;
        }
        points.push(PricePoint {
            timestamp: vendor_time_to_epoch_ms(pair[0]),
            price: price_cents as f64 / 100.0,
        });
    }

    // Vendor arrays are not guaranteed sorted; the sort is stable so the
    // first-seen point wins when timestamps collide.
    points.sort_by_key(|p| p.timestamp);
    points.dedup_by_key(|p| p.timestamp);
    points
}

/// Keeps only points inside the trailing window of `window_days` before
/// `now_ms`. Order is preserved and the result may be empty.
pub fn filter_window(points: &[PricePoint], window_days: i64, now_ms: i64) -> Vec<PricePoint> {
    let cutoff = now_ms - window_days * DAY_MS;
    points
        .iter()
        .copied()
        .filter(|p| p.timestamp >= cutoff)
        .collect()
}

/// Decodes every known channel out of the vendor's `csv` array, in priority
/// order. Channels missing from the payload yield empty series.
pub fn decode_channels(csv: &[Option<Vec<i64>>]) -> Vec<ChannelSeries> {
    Channel::PRIORITY
        .iter()
        .map(|&channel| {
            let raw = csv.get(channel.csv_index()).and_then(|c| c.as_deref());
            ChannelSeries {
                channel,
                points: decode_series(raw),
            }
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_pairs_into_sorted_points() {
        // Second pair is earlier than the first.
        let raw = vec![7_000_000, 1999, 6_000_000, 2499];
        let points = decode_series(Some(&raw));

        assert_eq!(points.len(), 2);
        assert_eq!(points[0].timestamp, vendor_time_to_epoch_ms(6_000_000));
        assert_eq!(points[0].price, 24.99);
        assert_eq!(points[1].price, 19.99);
        assert!(points[0].timestamp < points[1].timestamp);
    }

    #[test]
    fn time_code_conversion_is_linear() {
        assert_eq!(vendor_time_to_epoch_ms(0), EPOCH_OFFSET_MINUTES * 60_000);
        assert_eq!(
            vendor_time_to_epoch_ms(1) - vendor_time_to_epoch_ms(0),
            60_000
        );
    }

    #[test]
    fn sentinel_pairs_contribute_nothing() {
        let raw = vec![6_000_000, -1, 6_000_100, 999, 6_000_200, -1];
        let points = decode_series(Some(&raw));

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 9.99);
    }

    #[test]
    fn absent_channel_decodes_to_empty() {
        assert!(decode_series(None).is_empty());
        assert!(decode_series(Some(&[])).is_empty());
    }

    #[test]
    fn odd_trailing_value_is_ignored() {
        let raw = vec![6_000_000, 1500, 6_000_100];
        assert_eq!(decode_series(Some(&raw)).len(), 1);
    }

    #[test]
    fn duplicate_timestamps_keep_first_occurrence() {
        let raw = vec![6_000_000, 1000, 6_000_000, 2000];
        let points = decode_series(Some(&raw));

        assert_eq!(points.len(), 1);
        assert_eq!(points[0].price, 10.0);
    }

    #[test]
    fn window_keeps_boundary_point() {
        let now_ms = 100 * DAY_MS;
        let points = vec![
            PricePoint {
                timestamp: now_ms - 90 * DAY_MS,
                price: 1.0,
            },
            PricePoint {
                timestamp: now_ms - 90 * DAY_MS - 1,
                price: 2.0,
            },
        ];
        let windowed = filter_window(&points, 90, now_ms);

        assert_eq!(windowed.len(), 1);
        assert_eq!(windowed[0].price, 1.0);
    }

    #[test]
    fn window_filter_is_idempotent() {
        let now_ms = 200 * DAY_MS;
        let points: Vec<PricePoint> = (0..10)
            .map(|i| PricePoint {
                timestamp: now_ms - i * 20 * DAY_MS,
                price: i as f64,
            })
            .collect();

        let once = filter_window(&points, 90, now_ms);
        let twice = filter_window(&once, 90, now_ms);
        assert_eq!(once, twice);
    }

    #[test]
    fn channels_map_to_their_csv_slots() {
        let mut csv: Vec<Option<Vec<i64>>> = vec![None; 19];
        csv[Channel::New.csv_index()] = Some(vec![6_000_000, 1234]);
        csv[Channel::BuyBox.csv_index()] = Some(vec![6_000_000, 5678]);

        let channels = decode_channels(&csv);
        assert_eq!(channels.len(), Channel::PRIORITY.len());
        assert_eq!(channels[0].channel, Channel::BuyBox);
        assert_eq!(channels[0].points[0].price, 56.78);

        let new = channels
            .iter()
            .find(|c| c.channel == Channel::New)
            .unwrap();
        assert_eq!(new.points[0].price, 12.34);

        let amazon = channels
            .iter()
            .find(|c| c.channel == Channel::Amazon)
            .unwrap();
        assert!(amazon.points.is_empty());
    }

    #[test]
    fn short_csv_array_yields_empty_channels() {
        let csv: Vec<Option<Vec<i64>>> = vec![Some(vec![6_000_000, 100])];
        let channels = decode_channels(&csv);

        // Only index 0 (amazon) has data; the rest fall off the end.
        let amazon = channels
            .iter()
            .find(|c| c.channel == Channel::Amazon)
            .unwrap();
        assert_eq!(amazon.points.len(), 1);
        assert!(channels[0].points.is_empty()); // buyBox, index 18
    }
}
