mod analyzer;
mod config;
mod decoder;
mod fetcher;
mod marketplace;
mod model;
mod narrator;
mod storage;
mod utils;

use analyzer::PriceAnalyzer;
use config::{AppConfig, ProductConfig, load_config};
use fetcher::{KeepaClient, VendorApi};
use narrator::Narrator;
use storage::SqliteStorage;

use chrono::Utc;
use futures::future::join_all;
use rand::Rng;
use std::sync::Arc;
use tokio::sync::Mutex;
use tokio::time::{Duration, sleep};
use tracing::{error, info, warn};

#[tokio::main]
async fn main() {
    // Initialize logging
    tracing_subscriber::fmt::init();

    // Set panic hook to log details about any panic
    std::panic::set_hook(Box::new(|panic_info| {
        eprintln!("😱 Panic occurred: {:?}", panic_info);
    }));

    // Load configuration from file
    let config: Arc<AppConfig> = match load_config("config.json") {
        Ok(cfg) => Arc::new(cfg),
        Err(e) => {
            error!("Config load error: {}", e);
            return;
        }
    };

    let fetcher = Arc::new(KeepaClient::new(config.keepa_api_key.clone()));
    let narrator = Arc::new(Narrator::new(config.openai_api_key.clone()));
    let analyzer = Arc::new(PriceAnalyzer::new(config.window_days));

    let storage = match SqliteStorage::new("data.db", config.cache_ttl_minutes * 60_000) {
        Ok(s) => Arc::new(Mutex::new(s)),
        Err(e) => {
            error!("Failed to initialize storage: {:?}", e);
            return;
        }
    };

    info!(
        "🚀 dealmeter started, watching {} product(s)",
        config.products.len()
    );
    if !narrator.is_enabled() {
        info!("Narration disabled: no text API key configured.");
    }

    // Main processing loop
    loop {
        let tasks: Vec<_> = config
            .products
            .iter()
            .map(|product| {
                process_product(
                    product,
                    fetcher.clone(),
                    analyzer.clone(),
                    storage.clone(),
                    narrator.clone(),
                )
            })
            .collect();
        join_all(tasks).await;

        // Jitter keeps rounds from hammering the vendor on a fixed beat.
        let jitter = rand::rng().random_range(0..30);
        let wait = config.check_interval_seconds + jitter;
        info!("Waiting {}s until the next round...", wait);
        sleep(Duration::from_secs(wait)).await;
    }
}

/// Runs one product through cache, fetch, analysis and narration. Failures
/// are logged and skip the product; they never end the loop.
async fn process_product(
    product: &ProductConfig,
    fetcher: Arc<KeepaClient>,
    analyzer: Arc<PriceAnalyzer>,
    storage: Arc<Mutex<SqliteStorage>>,
    narrator: Arc<Narrator>,
) {
    let asin = &product.asin;
    let now_ms = Utc::now().timestamp_millis();
    info!("Processing {} ({})", asin, product.marketplace);

    // A fresh cached analysis short-circuits the whole round for this ASIN.
    match storage.lock().await.get_cached(asin, now_ms) {
        Ok(Some(record)) => {
            info!(
                "Using cached analysis for {}: score {}",
                asin, record.meter_score.score
            );
            return;
        }
        Ok(None) => {}
        Err(e) => warn!("Cache lookup failed for {}: {:?}", asin, e),
    }

    let domain_id = marketplace::domain_id(&product.marketplace);
    let payload = match fetcher.fetch_product(asin, domain_id).await {
        Ok(p) => p,
        Err(e) => {
            warn!("Fetch error for {}: {}", asin, e);
            return;
        }
    };
    let Some(data) = payload.products.first() else {
        warn!("Vendor returned no product for {}", asin);
        return;
    };

    let channels = decoder::decode_channels(&data.csv);
    let record = match analyzer.analyze(&channels, now_ms) {
        Some(r) => r,
        None => {
            info!("ℹ️ No price data in the window for {}", asin);
            return;
        }
    };

    let context = &record.current_price_context;
    info!(
        "💰 {} [{}] score={} current={:.2} usual={:.2} low={:.2} high={:.2}",
        asin,
        record.price_source.label(),
        record.meter_score.score,
        context.current_price,
        context.usual_price.price,
        context.lowest_price,
        context.highest_price
    );

    {
        let storage = storage.lock().await;
        match storage.last_score(asin) {
            Ok(Some(previous)) if previous != record.meter_score.score => {
                info!(
                    "📈 Score for {} moved {} -> {}",
                    asin, previous, record.meter_score.score
                );
            }
            Ok(_) => {}
            Err(e) => warn!("Score lookup failed for {}: {:?}", asin, e),
        }
        if let Err(e) = storage.update_score(asin, record.meter_score.score, now_ms) {
            warn!("Score update failed for {}: {:?}", asin, e);
        }
        if let Err(e) = storage.put_cached(asin, &record, now_ms) {
            warn!("Cache store failed for {}: {:?}", asin, e);
        }
    }

    if narrator.is_enabled() {
        match narrator.narrate(&record, &product.marketplace).await {
            Ok(text) => {
                info!("🗣️ {}: {}", asin, text.header);
                info!("   {}", text.first_phrase);
                info!("   {}", text.second_phrase);
                info!("   {}", text.third_phrase);
            }
            Err(e) => warn!("Narration failed for {}: {}", asin, e),
        }
    }
}
