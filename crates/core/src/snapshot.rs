//! Normalized price readings handed to the alert engine.

use compact_str::CompactString;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Price direction over the last hour.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
}

impl Direction {
    /// `Up` for a strictly positive change, `Down` otherwise (zero included).
    #[inline]
    pub fn from_change(percent_change: f64) -> Self {
        if percent_change > 0.0 {
            Direction::Up
        } else {
            Direction::Down
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Up => "up",
            Direction::Down => "down",
        }
    }
}

impl std::fmt::Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Reasons a snapshot is refused before evaluation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum SnapshotError {
    #[error("empty asset id")]
    EmptyAssetId,

    #[error("{asset}: 1h change is not finite ({value})")]
    NonFiniteChange { asset: String, value: f64 },

    #[error("{asset}: price must be positive and finite ({value})")]
    InvalidPrice { asset: String, value: f64 },
}

/// One asset's reading for the current poll cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PriceSnapshot {
    /// Feed identifier of the asset (e.g. "bitcoin")
    pub asset_id: CompactString,
    /// Signed percent change over the last hour
    pub percent_change_1h: f64,
    /// Last traded price in the quote currency
    pub current_price: f64,
}

impl PriceSnapshot {
    pub fn new(asset_id: &str, percent_change_1h: f64, current_price: f64) -> Self {
        Self {
            asset_id: CompactString::new(asset_id),
            percent_change_1h,
            current_price,
        }
    }

    #[inline]
    pub fn direction(&self) -> Direction {
        Direction::from_change(self.percent_change_1h)
    }

    /// Check the reading is usable by the engine.
    pub fn validate(&self) -> Result<(), SnapshotError> {
        if self.asset_id.trim().is_empty() {
            return Err(SnapshotError::EmptyAssetId);
        }
        if !self.percent_change_1h.is_finite() {
            return Err(SnapshotError::NonFiniteChange {
                asset: self.asset_id.to_string(),
                value: self.percent_change_1h,
            });
        }
        if !self.current_price.is_finite() || self.current_price <= 0.0 {
            return Err(SnapshotError::InvalidPrice {
                asset: self.asset_id.to_string(),
                value: self.current_price,
            });
        }
        Ok(())
    }
}
