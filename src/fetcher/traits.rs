use crate::fetcher::ProductPayload;
use crate::model::FetchError;

#[async_trait::async_trait]
pub trait VendorApi: Send + Sync {
    async fn fetch_product(&self, asin: &str, domain_id: u8) -> Result<ProductPayload, FetchError>;
}
