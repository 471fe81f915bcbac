//! Application state management.

use crate::config::{AppConfig, ConfigError};
use cryptowatch_alerts::{AlertEngine, Assessment, EngineConfig, TextRenderer};
use cryptowatch_core::{AssetState, PriceSnapshot};
use cryptowatch_feeds::{FeedError, PriceFeed};
use serde::Serialize;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;
use tokio::sync::Mutex;

/// Poll statistics.
#[derive(Debug)]
pub struct PollStats {
    /// Completed evaluations (scheduled and manual).
    pub cycles: AtomicU64,
    /// Evaluations that produced a notification.
    pub notifications: AtomicU64,
    /// Fetches that failed before reaching the engine.
    pub feed_failures: AtomicU64,
    /// Start time in milliseconds.
    pub started_at_ms: i64,
}

impl PollStats {
    pub fn new() -> Self {
        Self {
            cycles: AtomicU64::new(0),
            notifications: AtomicU64::new(0),
            feed_failures: AtomicU64::new(0),
            started_at_ms: chrono::Utc::now().timestamp_millis(),
        }
    }

    pub fn record_cycle(&self, notified: bool) {
        self.cycles.fetch_add(1, Ordering::Relaxed);
        if notified {
            self.notifications.fetch_add(1, Ordering::Relaxed);
        }
    }

    pub fn record_feed_failure(&self) {
        self.feed_failures.fetch_add(1, Ordering::Relaxed);
    }

    pub fn uptime_secs(&self) -> u64 {
        let now = chrono::Utc::now().timestamp_millis();
        (now - self.started_at_ms).max(0) as u64 / 1000
    }

    pub fn summary(&self) -> StatsSummary {
        StatsSummary {
            cycles: self.cycles.load(Ordering::Relaxed),
            notifications: self.notifications.load(Ordering::Relaxed),
            feed_failures: self.feed_failures.load(Ordering::Relaxed),
            uptime_secs: self.uptime_secs(),
        }
    }
}

impl Default for PollStats {
    fn default() -> Self {
        Self::new()
    }
}

/// Summary of statistics.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsSummary {
    pub cycles: u64,
    pub notifications: u64,
    pub feed_failures: u64,
    pub uptime_secs: u64,
}

/// Outcome of one fetch + evaluate round.
#[derive(Debug, Clone)]
pub struct PollOutcome {
    pub snapshots: Vec<PriceSnapshot>,
    pub assessments: Vec<Assessment>,
    pub notification: Option<String>,
}

/// Application state shared across components.
pub struct AppState {
    /// Configuration.
    pub config: AppConfig,
    /// Alert engine; the mutex keeps evaluations from overlapping.
    pub engine: Mutex<AlertEngine>,
    /// Price feed client.
    pub feed: Arc<dyn PriceFeed>,
    /// Poll statistics.
    pub stats: PollStats,
    /// Running flag.
    running: AtomicBool,
}

impl AppState {
    /// Create new application state. Fails on engine settings the engine cannot run with.
    pub fn new(config: AppConfig, feed: Arc<dyn PriceFeed>) -> Result<Self, ConfigError> {
        let engine_config: EngineConfig = (&config.engine).into();
        engine_config.validate()?;
        let engine =
            AlertEngine::new(engine_config).with_renderer(TextRenderer::for_locale(config.locale));

        Ok(Self {
            config,
            engine: Mutex::new(engine),
            feed,
            stats: PollStats::new(),
            running: AtomicBool::new(false),
        })
    }

    pub fn start(&self) {
        self.running.store(true, Ordering::SeqCst);
    }

    pub fn stop(&self) {
        self.running.store(false, Ordering::SeqCst);
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// Fetch snapshots for `coins` and run them through the engine.
    pub async fn poll(&self, coins: &[String]) -> Result<PollOutcome, FeedError> {
        let snapshots = match self.feed.fetch_snapshots(coins).await {
            Ok(snapshots) => snapshots,
            Err(e) => {
                self.stats.record_feed_failure();
                return Err(e);
            }
        };

        let (evaluation, notification) = {
            let mut engine = self.engine.lock().await;
            let evaluation = engine.evaluate_batch(&snapshots);
            let notification = evaluation.notification.as_ref().map(|n| engine.render(n));
            (evaluation, notification)
        };

        self.stats.record_cycle(notification.is_some());

        Ok(PollOutcome {
            snapshots,
            assessments: evaluation.assessments,
            notification,
        })
    }

    /// Current tracked asset states.
    pub async fn coin_states(&self) -> Vec<AssetState> {
        self.engine.lock().await.states()
    }

    /// Get statistics summary.
    pub fn stats_summary(&self) -> StatsSummary {
        self.stats.summary()
    }
}

/// Shared state handle.
pub type SharedState = Arc<AppState>;

/// Create shared state.
pub fn create_state(
    config: AppConfig,
    feed: Arc<dyn PriceFeed>,
) -> Result<SharedState, ConfigError> {
    Ok(Arc::new(AppState::new(config, feed)?))
}
