//! Volatility buckets for hourly price moves.

use serde::{Deserialize, Serialize};

/// Discrete severity of an absolute 1h percent change.
///
/// Ordered: `None < Lv1 < Lv2 < Lv3 < Lv4 < Lv5`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum VolatilityLevel {
    #[serde(rename = "NONE")]
    None = 0,
    #[serde(rename = "LV1")]
    Lv1 = 1, // ±5%
    #[serde(rename = "LV2")]
    Lv2 = 2, // ±10%
    #[serde(rename = "LV3")]
    Lv3 = 3, // ±20%
    #[serde(rename = "LV4")]
    Lv4 = 4, // ±30%
    #[serde(rename = "LV5")]
    Lv5 = 5, // ±50%
}

/// Lower bound (inclusive, absolute percent) of each bucket, highest first.
const BREAKPOINTS: [(f64, VolatilityLevel); 5] = [
    (50.0, VolatilityLevel::Lv5),
    (30.0, VolatilityLevel::Lv4),
    (20.0, VolatilityLevel::Lv3),
    (10.0, VolatilityLevel::Lv2),
    (5.0, VolatilityLevel::Lv1),
];

impl VolatilityLevel {
    pub fn as_str(&self) -> &'static str {
        match self {
            VolatilityLevel::None => "NONE",
            VolatilityLevel::Lv1 => "LV1",
            VolatilityLevel::Lv2 => "LV2",
            VolatilityLevel::Lv3 => "LV3",
            VolatilityLevel::Lv4 => "LV4",
            VolatilityLevel::Lv5 => "LV5",
        }
    }
}

impl Default for VolatilityLevel {
    fn default() -> Self {
        VolatilityLevel::None
    }
}

impl std::fmt::Display for VolatilityLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Map a signed percent change to its volatility bucket.
///
/// Uses the absolute value, so a drop and a rise of the same size land in the
/// same bucket. Anything under 5% (and NaN) is `VolatilityLevel::None`.
pub fn classify(percent_change: f64) -> VolatilityLevel {
    let change = percent_change.abs();
    BREAKPOINTS
        .iter()
        .find(|(bound, _)| change >= *bound)
        .map(|(_, level)| *level)
        .unwrap_or(VolatilityLevel::None)
}
