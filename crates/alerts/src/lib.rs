//! Alert evaluation for tracked crypto assets.
//!
//! This crate provides:
//! - In-memory per-asset state tracking
//! - Trigger decisions (direction, volatility level, cooldown timer)
//! - Aggregated notification payloads and their text rendering

pub mod clock;
pub mod config;
pub mod decision;
pub mod engine;
pub mod message;
pub mod store;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{ConfigError, EngineConfig, NOTIFICATION_COOLDOWN_MS, THRESHOLD_PERCENT};
pub use decision::{decide, Decision, TriggerReason};
pub use engine::{AlertEngine, Assessment, Evaluation, Outcome};
pub use message::{
    Labels, Locale, Notification, NotificationEntry, NotificationRenderer, TextRenderer,
};
pub use store::{CoinStateStore, InMemoryStore};
