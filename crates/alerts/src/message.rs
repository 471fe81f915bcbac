//! Notification payloads and their human-readable rendering.

use crate::decision::TriggerReason;
use compact_str::CompactString;
use cryptowatch_core::{Direction, PriceSnapshot};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// One notified asset.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NotificationEntry {
    pub asset_id: CompactString,
    pub direction: Direction,
    pub percent_change_1h: f64,
    pub current_price: f64,
    /// `None` when the asset was seen for the first time
    pub reason: Option<TriggerReason>,
}

impl NotificationEntry {
    pub fn from_snapshot(snapshot: &PriceSnapshot, reason: Option<TriggerReason>) -> Self {
        Self {
            asset_id: snapshot.asset_id.clone(),
            direction: snapshot.direction(),
            percent_change_1h: snapshot.percent_change_1h,
            current_price: snapshot.current_price,
            reason,
        }
    }
}

/// Aggregated notification for every asset that triggered in one evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Notification {
    /// Unix epoch milliseconds of the evaluation
    pub generated_at_ms: i64,
    /// Triggered assets, in input order
    pub entries: Vec<NotificationEntry>,
}

/// Turns a notification payload into a message body.
pub trait NotificationRenderer: Send + Sync {
    fn render(&self, notification: &Notification) -> String;
}

/// Message language.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Locale {
    #[default]
    #[serde(rename = "en")]
    English,
    #[serde(rename = "zh-TW")]
    TraditionalChinese,
}

impl FromStr for Locale {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "en" | "english" => Ok(Locale::English),
            "zh-tw" | "zh" | "chinese" => Ok(Locale::TraditionalChinese),
            _ => Err(format!("Unknown locale: {}", s)),
        }
    }
}

/// Fixed strings used by `TextRenderer`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Labels {
    pub header: String,
    pub up: String,
    pub down: String,
}

impl Labels {
    pub fn english() -> Self {
        Self {
            header: "Crypto Market Alert".to_string(),
            up: "up".to_string(),
            down: "down".to_string(),
        }
    }

    pub fn traditional_chinese() -> Self {
        Self {
            header: "幣圈行情通知".to_string(),
            up: "漲幅".to_string(),
            down: "跌幅".to_string(),
        }
    }

    pub fn for_locale(locale: Locale) -> Self {
        match locale {
            Locale::English => Self::english(),
            Locale::TraditionalChinese => Self::traditional_chinese(),
        }
    }

    fn direction(&self, direction: Direction) -> &str {
        match direction {
            Direction::Up => &self.up,
            Direction::Down => &self.down,
        }
    }
}

impl Default for Labels {
    fn default() -> Self {
        Self::english()
    }
}

/// Plain-text renderer: header, one line per asset, UTC timestamp footer.
#[derive(Debug, Clone, Default)]
pub struct TextRenderer {
    labels: Labels,
}

impl TextRenderer {
    pub fn new(labels: Labels) -> Self {
        Self { labels }
    }

    pub fn for_locale(locale: Locale) -> Self {
        Self::new(Labels::for_locale(locale))
    }

    /// Single asset line, e.g. `•up bitcoin: +8% | $50000`.
    pub fn format_entry(&self, entry: &NotificationEntry) -> String {
        format!(
            "•{} {}: {:+}% | ${}",
            self.labels.direction(entry.direction),
            entry.asset_id,
            entry.percent_change_1h,
            entry.current_price
        )
    }
}

impl NotificationRenderer for TextRenderer {
    fn render(&self, notification: &Notification) -> String {
        let mut msg = format!("{}\n", self.labels.header);

        for entry in &notification.entries {
            msg.push('\n');
            msg.push_str(&self.format_entry(entry));
        }

        if let Some(at) = chrono::DateTime::from_timestamp_millis(notification.generated_at_ms) {
            msg.push_str(&format!("\n\n⏰ {}", at.format("%Y-%m-%d %H:%M:%S UTC")));
        }

        msg
    }
}
