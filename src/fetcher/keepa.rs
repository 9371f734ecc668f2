use crate::fetcher::traits::VendorApi;
use crate::model::FetchError;

use reqwest::Client;
use serde::Deserialize;
use std::time::Duration;

const DEFAULT_BASE_URL: &str = "https://api.keepa.com";

/// Raw product payload as the vendor returns it.
#[derive(Debug, Deserialize)]
pub struct ProductPayload {
    #[serde(default)]
    pub products: Vec<ProductData>,
}

#[derive(Debug, Deserialize)]
pub struct ProductData {
    pub asin: String,
    #[serde(default)]
    pub title: Option<String>,
    /// One flat `[timeCode, priceCents, ...]` array per price channel;
    /// channels the vendor has no data for arrive as `null`.
    #[serde(default)]
    pub csv: Vec<Option<Vec<i64>>>,
}

pub struct KeepaClient {
    client: Client,
    api_key: String,
    base_url: String,
}

impl KeepaClient {
    pub fn new(api_key: String) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(15))
            .user_agent("dealmeter/0.1")
            .build()
            .expect("❗ Failed to create HTTP client");

        Self {
            client,
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
        }
    }

    fn build_url(&self, asin: &str, domain_id: u8) -> String {
        format!(
            "{}/product?key={}&domain={}&asin={}",
            self.base_url, self.api_key, domain_id, asin
        )
    }
}

#[async_trait::async_trait]
impl VendorApi for KeepaClient {
    async fn fetch_product(&self, asin: &str, domain_id: u8) -> Result<ProductPayload, FetchError> {
        let url = self.build_url(asin, domain_id);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Http(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(FetchError::Status(status.as_u16()));
        }

        response
            .json::<ProductPayload>()
            .await
            .map_err(|e| FetchError::Decode(e.to_string()))
    }
}
