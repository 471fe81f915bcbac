//! Fixed-cadence poll loop.

use crate::state::{AppState, SharedState};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tracing::{debug, error, info, warn};

/// Poll the configured coins now and then every `interval_secs` until stopped.
pub async fn run_poll_loop(state: SharedState) {
    let interval_secs = state.config.poll.interval_secs.max(1);
    info!(
        "Starting poll loop: {} every {}s",
        state.config.poll.coins.join(", "),
        interval_secs
    );

    let mut ticker = tokio::time::interval(Duration::from_secs(interval_secs));
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    while state.is_running() {
        ticker.tick().await;
        if !state.is_running() {
            break;
        }
        run_cycle(&state).await;
    }

    info!("Poll loop stopped");
}

/// One scheduled cycle. Feed failures are logged and the cycle skipped.
pub async fn run_cycle(state: &AppState) -> Option<String> {
    let coins = &state.config.poll.coins;
    if coins.is_empty() {
        debug!("No coins configured, skipping cycle");
        return None;
    }

    match state.poll(coins).await {
        Ok(outcome) => {
            match &outcome.notification {
                Some(message) => info!("🔔 Sending notification\n{}", message),
                None => debug!(
                    snapshots = outcome.snapshots.len(),
                    "Cycle complete, nothing to notify"
                ),
            }
            outcome.notification
        }
        Err(e) if e.is_permanent() => {
            error!(
                feed = state.feed.name(),
                error = %e,
                "Poll cycle failed, check the API key"
            );
            None
        }
        Err(e) => {
            warn!(
                feed = state.feed.name(),
                error = %e,
                transient = e.is_transient(),
                retry_in = ?e.suggested_retry_delay(),
                "Poll cycle failed"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::state::{create_state, testing::StubFeed};
    use cryptowatch_core::PriceSnapshot;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_run_cycle_notifies() {
        let state = create_state(
            AppConfig::default(),
            Arc::new(StubFeed::with(vec![PriceSnapshot::new("ethereum", -12.0, 2800.0)])),
        )
        .unwrap();

        let message = run_cycle(&state).await.expect("notification");
        assert!(message.contains("ethereum"));
        assert_eq!(state.stats_summary().cycles, 1);
    }

    #[tokio::test]
    async fn test_run_cycle_survives_feed_failure() {
        let state = create_state(AppConfig::default(), Arc::new(StubFeed::failing())).unwrap();
        assert!(run_cycle(&state).await.is_none());
        assert_eq!(state.stats_summary().feed_failures, 1);
    }

    #[tokio::test]
    async fn test_run_cycle_without_coins() {
        let mut config = AppConfig::default();
        config.poll.coins.clear();
        let state = create_state(config, Arc::new(StubFeed::with(Vec::new()))).unwrap();
        assert!(run_cycle(&state).await.is_none());
        assert_eq!(state.stats_summary().cycles, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn test_poll_loop_runs_on_interval() {
        let state = create_state(
            AppConfig::default(),
            Arc::new(StubFeed::with(vec![PriceSnapshot::new("bitcoin", 6.0, 50000.0)])),
        )
        .unwrap();
        state.start();

        let handle = tokio::spawn(run_poll_loop(state.clone()));

        // Immediate first tick, then one more after 20s.
        tokio::time::sleep(Duration::from_secs(21)).await;
        state.stop();
        handle.abort();

        assert_eq!(state.stats_summary().cycles, 2);
    }

    #[tokio::test]
    async fn test_poll_loop_exits_when_stopped() {
        let state =
            create_state(AppConfig::default(), Arc::new(StubFeed::with(Vec::new()))).unwrap();
        // Never started: returns straight away.
        run_poll_loop(state).await;
    }
}
