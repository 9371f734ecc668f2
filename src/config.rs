use serde::Deserialize;
use std::fs;

fn default_marketplace() -> String {
    "amazon.com".to_string()
}

fn default_window_days() -> i64 {
    90
}

fn default_cache_ttl_minutes() -> i64 {
    15
}

#[derive(Debug, Deserialize)]
pub struct ProductConfig {
    pub asin: String,
    #[serde(default = "default_marketplace")]
    pub marketplace: String,
}

#[derive(Debug, Deserialize)]
pub struct AppConfig {
    pub keepa_api_key: String,
    #[serde(default)]
    pub openai_api_key: Option<String>,
    pub check_interval_seconds: u64,
    #[serde(default = "default_window_days")]
    pub window_days: i64,
    #[serde(default = "default_cache_ttl_minutes")]
    pub cache_ttl_minutes: i64,
    pub products: Vec<ProductConfig>,
}

pub fn load_config(path: &str) -> Result<AppConfig, Box<dyn std::error::Error>> {
    let content = fs::read_to_string(path)?;
    let config: AppConfig = serde_json::from_str(&content)?;
    Ok(config)
}
