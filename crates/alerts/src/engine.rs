//! Alert evaluation engine.
//!
//! Filters a batch of snapshots by threshold, compares each survivor against
//! the stored state, updates the store and collects a single notification.

use crate::clock::{Clock, SystemClock};
use crate::config::EngineConfig;
use crate::decision::{decide, Decision, TriggerReason};
use crate::message::{Notification, NotificationEntry, NotificationRenderer, TextRenderer};
use crate::store::{CoinStateStore, InMemoryStore};
use compact_str::CompactString;
use cryptowatch_core::{classify, AssetState, Direction, PriceSnapshot, VolatilityLevel};
use serde::Serialize;
use tracing::{debug, info, warn};

/// What happened to one snapshot during an evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "reason", rename_all = "snake_case")]
pub enum Outcome {
    /// Failed validation; never reached the store.
    Rejected,
    /// Absolute change under the threshold; ignored.
    BelowThreshold,
    /// First time this asset was seen; tracked and notified.
    FirstSighting,
    /// Known asset, nothing changed, still in cooldown.
    Unchanged,
    /// Known asset that notified again.
    Triggered(TriggerReason),
}

impl Outcome {
    #[inline]
    pub fn is_notified(&self) -> bool {
        matches!(self, Outcome::FirstSighting | Outcome::Triggered(_))
    }

    /// Trigger reason, for assets that notified again.
    pub fn reason(&self) -> Option<TriggerReason> {
        match self {
            Outcome::Triggered(reason) => Some(*reason),
            _ => None,
        }
    }
}

/// Classified view of one input snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Assessment {
    pub asset_id: CompactString,
    pub direction: Direction,
    pub level: VolatilityLevel,
    pub outcome: Outcome,
}

/// Result of evaluating a batch.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Evaluation {
    /// One entry per input snapshot, in input order.
    pub assessments: Vec<Assessment>,
    /// Present when at least one asset triggered.
    pub notification: Option<Notification>,
}

/// Alert engine owning the per-asset state store.
///
/// Calls must not overlap: wrap the engine in a mutex when shared.
pub struct AlertEngine<S = InMemoryStore, C = SystemClock> {
    store: S,
    clock: C,
    config: EngineConfig,
    renderer: Box<dyn NotificationRenderer>,
}

impl AlertEngine {
    /// Engine with an empty in-memory store and the wall clock.
    pub fn new(config: EngineConfig) -> Self {
        Self::with_parts(InMemoryStore::new(), SystemClock, config)
    }
}

impl<S: CoinStateStore, C: Clock> AlertEngine<S, C> {
    /// Engine over an explicit store and clock.
    pub fn with_parts(store: S, clock: C, config: EngineConfig) -> Self {
        Self {
            store,
            clock,
            config,
            renderer: Box::new(TextRenderer::default()),
        }
    }

    /// Replace the message renderer.
    pub fn with_renderer(mut self, renderer: impl NotificationRenderer + 'static) -> Self {
        self.renderer = Box::new(renderer);
        self
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn clock(&self) -> &C {
        &self.clock
    }

    /// Current contents of the store, for status reporting.
    pub fn states(&self) -> Vec<AssetState> {
        self.store.all()
    }

    /// Render a notification with the configured renderer.
    pub fn render(&self, notification: &Notification) -> String {
        self.renderer.render(notification)
    }

    /// Evaluate a batch and render the notification, if any.
    pub fn evaluate(&mut self, snapshots: &[PriceSnapshot]) -> Option<String> {
        self.evaluate_batch(snapshots)
            .notification
            .map(|notification| self.renderer.render(&notification))
    }

    /// Evaluate a batch, returning the per-snapshot view and the structured notification.
    ///
    /// Snapshots are processed in order; an asset listed twice sees the state
    /// written by its first occurrence.
    pub fn evaluate_batch(&mut self, snapshots: &[PriceSnapshot]) -> Evaluation {
        let now = self.clock.now_ms();
        let mut assessments = Vec::with_capacity(snapshots.len());
        let mut entries = Vec::new();

        for snapshot in snapshots {
            let outcome = self.assess(snapshot, now);

            if outcome.is_notified() {
                entries.push(NotificationEntry::from_snapshot(snapshot, outcome.reason()));
            }

            assessments.push(Assessment {
                asset_id: snapshot.asset_id.clone(),
                direction: snapshot.direction(),
                level: classify(snapshot.percent_change_1h),
                outcome,
            });
        }

        let notification = if entries.is_empty() {
            debug!(snapshots = snapshots.len(), "No assets triggered");
            None
        } else {
            info!(assets = entries.len(), "Notification composed");
            Some(Notification {
                generated_at_ms: now,
                entries,
            })
        };

        Evaluation {
            assessments,
            notification,
        }
    }

    fn assess(&mut self, snapshot: &PriceSnapshot, now: i64) -> Outcome {
        if let Err(e) = snapshot.validate() {
            warn!(error = %e, "Rejecting snapshot");
            return Outcome::Rejected;
        }

        if snapshot.percent_change_1h.abs() < self.config.threshold_percent {
            return Outcome::BelowThreshold;
        }

        let mut candidate = AssetState::from_snapshot(snapshot, now);
        let stored = self.store.get(&snapshot.asset_id);

        match decide(&candidate, stored.as_ref(), self.config.cooldown_ms) {
            Decision::Unseen => {
                // Backdated so the next cycle is not held back by the cooldown.
                candidate.last_notified_at = now - self.config.cooldown_ms;
                info!(
                    asset = %snapshot.asset_id,
                    direction = %candidate.direction,
                    level = %candidate.level,
                    "Tracking new asset"
                );
                self.store.upsert(candidate);
                Outcome::FirstSighting
            }
            Decision::Unchanged => {
                debug!(asset = %snapshot.asset_id, "Skipping alert: nothing changed");
                Outcome::Unchanged
            }
            Decision::Triggered(reason) => {
                if let Some(stored) = &stored {
                    // lastNotifiedAt never moves backwards, even if the clock does.
                    candidate.last_notified_at =
                        candidate.last_notified_at.max(stored.last_notified_at);
                }
                info!(
                    asset = %snapshot.asset_id,
                    reason = %reason,
                    direction = %candidate.direction,
                    level = %candidate.level,
                    "Alert triggered"
                );
                self.store.upsert(candidate);
                Outcome::Triggered(reason)
            }
        }
    }
}
