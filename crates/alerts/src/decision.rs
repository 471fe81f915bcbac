//! Per-asset trigger decision.

use cryptowatch_core::AssetState;
use serde::{Deserialize, Serialize};

/// Why a known asset notified again.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TriggerReason {
    /// Price direction flipped since the last notification.
    Direction,
    /// Volatility bucket moved since the last notification.
    Level,
    /// Cooldown elapsed with nothing else changing.
    Timer,
}

impl TriggerReason {
    pub fn as_str(&self) -> &'static str {
        match self {
            TriggerReason::Direction => "direction",
            TriggerReason::Level => "level",
            TriggerReason::Timer => "timer",
        }
    }
}

impl std::fmt::Display for TriggerReason {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Result of comparing a candidate state against what is stored.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    /// Nothing stored for this asset yet.
    Unseen,
    /// Stored state stays as is; no notification.
    Unchanged,
    /// Stored state must be replaced by the candidate and the asset notified.
    Triggered(TriggerReason),
}

/// Decide what to do with `candidate` given the `stored` state.
///
/// Checks run in a fixed order (direction, level, timer) and stop at the first
/// match. The timer boundary is inclusive.
pub fn decide(candidate: &AssetState, stored: Option<&AssetState>, cooldown_ms: i64) -> Decision {
    let Some(stored) = stored else {
        return Decision::Unseen;
    };

    if candidate.direction != stored.direction {
        return Decision::Triggered(TriggerReason::Direction);
    }
    if candidate.level != stored.level {
        return Decision::Triggered(TriggerReason::Level);
    }
    if candidate.last_notified_at - stored.last_notified_at >= cooldown_ms {
        return Decision::Triggered(TriggerReason::Timer);
    }

    Decision::Unchanged
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptowatch_core::{Direction, VolatilityLevel};

    const T: i64 = 1_767_590_000_000;
    const HOUR: i64 = 3_600_000;

    fn state(direction: Direction, level: VolatilityLevel, at: i64) -> AssetState {
        AssetState::new("bitcoin", direction, level, at)
    }

    #[test]
    fn test_unseen() {
        let candidate = state(Direction::Up, VolatilityLevel::Lv1, T);
        assert_eq!(decide(&candidate, None, HOUR), Decision::Unseen);
    }

    #[test]
    fn test_direction_change() {
        let stored = state(Direction::Down, VolatilityLevel::Lv2, T);
        let candidate = state(Direction::Up, VolatilityLevel::Lv1, T + 1);
        assert_eq!(
            decide(&candidate, Some(&stored), HOUR),
            Decision::Triggered(TriggerReason::Direction)
        );
    }

    #[test]
    fn test_direction_wins_over_level() {
        let stored = state(Direction::Up, VolatilityLevel::None, T);
        let candidate = state(Direction::Down, VolatilityLevel::Lv4, T + 2 * HOUR);
        assert_eq!(
            decide(&candidate, Some(&stored), HOUR),
            Decision::Triggered(TriggerReason::Direction)
        );
    }

    #[test]
    fn test_level_wins_over_timer() {
        let stored = state(Direction::Down, VolatilityLevel::Lv2, T);
        let candidate = state(Direction::Down, VolatilityLevel::Lv4, T + 2 * HOUR);
        assert_eq!(
            decide(&candidate, Some(&stored), HOUR),
            Decision::Triggered(TriggerReason::Level)
        );
    }

    #[test]
    fn test_unchanged_within_cooldown() {
        let stored = state(Direction::Down, VolatilityLevel::Lv2, T);
        let candidate = state(Direction::Down, VolatilityLevel::Lv2, T + HOUR / 2);
        assert_eq!(decide(&candidate, Some(&stored), HOUR), Decision::Unchanged);
    }

    #[test]
    fn test_timer_boundary_inclusive() {
        let stored = state(Direction::Down, VolatilityLevel::Lv2, T);
        let exact = state(Direction::Down, VolatilityLevel::Lv2, T + HOUR);
        let just_before = state(Direction::Down, VolatilityLevel::Lv2, T + HOUR - 1);
        assert_eq!(
            decide(&exact, Some(&stored), HOUR),
            Decision::Triggered(TriggerReason::Timer)
        );
        assert_eq!(decide(&just_before, Some(&stored), HOUR), Decision::Unchanged);
    }

    #[test]
    fn test_reason_display() {
        assert_eq!(TriggerReason::Direction.to_string(), "direction");
        assert_eq!(TriggerReason::Level.to_string(), "level");
        assert_eq!(TriggerReason::Timer.to_string(), "timer");
    }
}
