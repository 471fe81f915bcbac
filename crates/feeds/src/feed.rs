//! Price feed abstraction.

use crate::FeedError;
use async_trait::async_trait;
use cryptowatch_core::PriceSnapshot;

/// Source of normalized price snapshots.
///
/// Implementations only return snapshots that pass `PriceSnapshot::validate`.
#[async_trait]
pub trait PriceFeed: Send + Sync {
    /// Fetch the current reading for each requested asset id.
    ///
    /// Assets unknown to the feed are simply absent from the result.
    async fn fetch_snapshots(&self, asset_ids: &[String]) -> Result<Vec<PriceSnapshot>, FeedError>;

    /// Feed name for logs.
    fn name(&self) -> &str;
}
