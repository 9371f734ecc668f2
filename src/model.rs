// Core structs: PricePoint, AnalysisRecord and friends
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// One decoded observation in a price history: when a price took effect and
/// what it was, in major currency units.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PricePoint {
    /// Epoch milliseconds.
    pub timestamp: i64,
    pub price: f64,
}

/// A competing price feed for the same product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Channel {
    BuyBox,
    Amazon,
    New,
    Used,
    Fba,
}

impl Channel {
    /// Channels in the order they are considered when picking a price source.
    pub const PRIORITY: [Channel; 5] = [
        Channel::BuyBox,
        Channel::Amazon,
        Channel::New,
        Channel::Used,
        Channel::Fba,
    ];

    /// Index of this channel inside the vendor's `csv` array.
    pub fn csv_index(self) -> usize {
        match self {
            Channel::BuyBox => 18,
            Channel::Amazon => 0,
            Channel::New => 1,
            Channel::Used => 2,
            Channel::Fba => 11,
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            Channel::BuyBox => "buyBox",
            Channel::Amazon => "amazon",
            Channel::New => "new",
            Channel::Used => "used",
            Channel::Fba => "fba",
        }
    }
}

/// A decoded series for one channel, sorted ascending by timestamp.
#[derive(Debug, Clone)]
pub struct ChannelSeries {
    pub channel: Channel,
    pub points: Vec<PricePoint>,
}

/// The price level that held the longest over the analysis window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UsualPrice {
    pub price: f64,
    pub duration_days: i64,
    pub percentage_of_time: u8,
}

/// A single adjacent-point price decrease beyond the noise threshold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceDrop {
    pub from_price: f64,
    pub to_price: f64,
    pub amount: f64,
    pub timestamp: i64,
    /// How long the dropped price persisted, until the next point or "now".
    pub duration_ms: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DropSummary {
    pub total: usize,
    pub average_drop: f64,
    pub days_since_last_drop: Option<i64>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Increase,
    Decrease,
    Stable,
}

/// The most recent price movement: the last two points compared.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LastChange {
    pub amount: f64,
    pub percentage: f64,
    pub days_ago: i64,
    pub direction: Direction,
}

/// Aggregated time the series spent at a given price level.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TimeAtPrice {
    pub total_duration_days: f64,
    pub average_duration_days: f64,
    pub number_of_periods: usize,
    /// Floor days since the series was last seen at the level; 0 while it
    /// still holds.
    pub days_since_last: i64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CurrentPriceContext {
    pub current_price: f64,
    pub usual_price: UsualPrice,
    pub lowest_price: f64,
    pub highest_price: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RecentActivity {
    pub stable_days: i64,
    pub last_change: Option<LastChange>,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceRange {
    pub min: f64,
    pub max: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VolatilityMetrics {
    pub total_changes: usize,
    pub price_range: PriceRange,
    pub spread: f64,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LowestPriceMetrics {
    pub price: f64,
    pub average_duration_days: f64,
    pub number_of_periods: usize,
    pub days_since_lowest: i64,
}

/// 0 = worst observed price, 100 = best observed, 50 = typical.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MeterScore {
    pub score: u8,
    pub current_price: f64,
    pub usual_price: f64,
    pub lowest_price: f64,
    pub highest_price: f64,
}

/// The assembled analysis consumed by the text-generation step.
///
/// Field names are part of the contract with the downstream consumer and must
/// not change.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisRecord {
    pub price_source: Channel,
    pub current_price_context: CurrentPriceContext,
    pub price_drops: DropSummary,
    pub recent_activity: RecentActivity,
    pub volatility_metrics: VolatilityMetrics,
    pub lowest_price_metrics: LowestPriceMetrics,
    pub meter_score: MeterScore,
}

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("http error: {0}")]
    Http(String),
    #[error("vendor responded with status {0}")]
    Status(u16),
    #[error("invalid payload: {0}")]
    Decode(String),
}

#[derive(Debug, Error)]
pub enum StorageError {
    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
    #[error("payload error: {0}")]
    Payload(#[from] serde_json::Error),
}

#[derive(Debug, Error)]
pub enum NarrateError {
    #[error("narration disabled: no API key configured")]
    Disabled,
    #[error("text API error: {0}")]
    Api(String),
    #[error("unexpected completion shape: {0}")]
    MalformedResponse(String),
}
