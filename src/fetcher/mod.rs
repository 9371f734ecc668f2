// Fetcher module: HTTP access to the third-party pricing data provider.

pub mod keepa;
pub mod traits;

pub use keepa::{KeepaClient, ProductData, ProductPayload};
pub use traits::VendorApi;
