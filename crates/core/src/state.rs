//! Last-known classified state of a tracked asset.

use crate::{classify, Direction, PriceSnapshot, VolatilityLevel};
use compact_str::CompactString;
use serde::{Deserialize, Serialize};

/// Tracked state for one asset, keyed by `asset_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AssetState {
    pub asset_id: CompactString,
    pub direction: Direction,
    pub level: VolatilityLevel,
    /// Unix epoch milliseconds of the last notification
    pub last_notified_at: i64,
}

impl AssetState {
    pub fn new(
        asset_id: &str,
        direction: Direction,
        level: VolatilityLevel,
        last_notified_at: i64,
    ) -> Self {
        Self {
            asset_id: CompactString::new(asset_id),
            direction,
            level,
            last_notified_at,
        }
    }

    /// Classify a snapshot into the state it would leave behind if notified at `at_ms`.
    pub fn from_snapshot(snapshot: &PriceSnapshot, at_ms: i64) -> Self {
        Self {
            asset_id: snapshot.asset_id.clone(),
            direction: snapshot.direction(),
            level: classify(snapshot.percent_change_1h),
            last_notified_at: at_ms,
        }
    }
}
