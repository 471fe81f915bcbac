//! Per-asset state storage.

use compact_str::CompactString;
use cryptowatch_core::AssetState;
use std::collections::HashMap;

/// Storage capability used by the alert engine.
///
/// Entries are keyed by `AssetState::asset_id`; there is at most one per asset.
pub trait CoinStateStore: Send + Sync {
    /// Look up the stored state for an asset.
    fn get(&self, asset_id: &str) -> Option<AssetState>;

    /// Insert or fully replace the state for `state.asset_id`.
    fn upsert(&mut self, state: AssetState);

    /// All tracked states, in first-seen order.
    fn all(&self) -> Vec<AssetState>;

    fn len(&self) -> usize {
        self.all().len()
    }

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Process-local store. Nothing is evicted while the process runs.
#[derive(Debug, Clone, Default)]
pub struct InMemoryStore {
    index: HashMap<CompactString, usize>,
    states: Vec<AssetState>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Pre-seed the store; later duplicates of an id replace earlier ones.
    pub fn with_states(states: impl IntoIterator<Item = AssetState>) -> Self {
        let mut store = Self::new();
        for state in states {
            store.upsert(state);
        }
        store
    }
}

impl CoinStateStore for InMemoryStore {
    fn get(&self, asset_id: &str) -> Option<AssetState> {
        self.index.get(asset_id).map(|&idx| self.states[idx].clone())
    }

    fn upsert(&mut self, state: AssetState) {
        match self.index.get(&state.asset_id) {
            Some(&idx) => self.states[idx] = state,
            None => {
                self.index.insert(state.asset_id.clone(), self.states.len());
                self.states.push(state);
            }
        }
    }

    fn all(&self) -> Vec<AssetState> {
        self.states.clone()
    }

    fn len(&self) -> usize {
        self.states.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use cryptowatch_core::{Direction, VolatilityLevel};
    use pretty_assertions::assert_eq;

    fn state(id: &str, direction: Direction, level: VolatilityLevel, at: i64) -> AssetState {
        AssetState::new(id, direction, level, at)
    }

    #[test]
    fn test_empty_store() {
        let store = InMemoryStore::new();
        assert!(store.is_empty());
        assert_eq!(store.get("bitcoin"), None);
        assert!(store.all().is_empty());
    }

    #[test]
    fn test_upsert_inserts_then_replaces() {
        let mut store = InMemoryStore::new();
        store.upsert(state("bitcoin", Direction::Down, VolatilityLevel::Lv2, 1));
        store.upsert(state("bitcoin", Direction::Up, VolatilityLevel::Lv1, 2));

        assert_eq!(store.len(), 1);
        assert_eq!(
            store.get("bitcoin"),
            Some(state("bitcoin", Direction::Up, VolatilityLevel::Lv1, 2))
        );
    }

    #[test]
    fn test_all_keeps_first_seen_order() {
        let mut store = InMemoryStore::new();
        store.upsert(state("solana", Direction::Up, VolatilityLevel::Lv1, 1));
        store.upsert(state("bitcoin", Direction::Up, VolatilityLevel::Lv1, 1));
        store.upsert(state("solana", Direction::Down, VolatilityLevel::Lv3, 5));

        let ids: Vec<String> = store.all().iter().map(|s| s.asset_id.to_string()).collect();
        assert_eq!(ids, vec!["solana".to_string(), "bitcoin".to_string()]);
        assert_eq!(store.all()[0].level, VolatilityLevel::Lv3);
    }

    #[test]
    fn test_with_states() {
        let store = InMemoryStore::with_states([
            state("bitcoin", Direction::Down, VolatilityLevel::Lv2, 10),
            state("ethereum", Direction::Down, VolatilityLevel::Lv1, 10),
        ]);
        assert_eq!(store.len(), 2);
        assert!(store.get("ethereum").is_some());
        assert!(store.get("ripple").is_none());
    }
}
