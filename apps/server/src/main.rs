//! Crypto Watcher - Headless Server
//!
//! Polls a price feed on a fixed cadence, decides which assets deserve a
//! notification and exposes manual polling and status over HTTP.

mod api;
mod config;
mod poller;
mod state;

use clap::Parser;
use config::AppConfig;
use cryptowatch_alerts::Locale;
use cryptowatch_feeds::CoinGeckoClient;
use state::create_state;
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn, Level};
use tracing_subscriber::FmtSubscriber;

/// Crypto Watcher CLI
#[derive(Parser, Debug)]
#[command(name = "crypto-watcher")]
#[command(about = "Hourly volatility alerts for crypto assets", long_about = None)]
struct Args {
    /// Configuration file path
    #[arg(short, long, default_value = "config.json")]
    config: String,

    /// HTTP API port
    #[arg(short, long)]
    port: Option<u16>,

    /// Seconds between poll cycles
    #[arg(short, long)]
    interval: Option<u64>,

    /// Comma-separated asset ids to poll (e.g. bitcoin,ethereum)
    #[arg(long, value_delimiter = ',')]
    coins: Option<Vec<String>>,

    /// Notification language: en, zh-TW
    #[arg(long)]
    locale: Option<String>,

    /// Log level: trace, debug, info, warn, error
    #[arg(short, long)]
    log_level: Option<String>,

    /// Serve the HTTP API only, without the background poll loop
    #[arg(long, default_value_t = false)]
    no_poll: bool,
}

fn init_logging(level: &str) {
    let level = match level {
        "trace" => Level::TRACE,
        "debug" => Level::DEBUG,
        "info" => Level::INFO,
        "warn" => Level::WARN,
        "error" => Level::ERROR,
        _ => Level::INFO,
    };

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber)
        .expect("Failed to set tracing subscriber");
}

/// Layer CLI flags over the file configuration.
fn apply_args(config: &mut AppConfig, args: &Args) {
    if let Some(port) = args.port {
        config.http.port = port;
    }
    if let Some(interval) = args.interval {
        config.poll.interval_secs = interval;
    }
    if let Some(coins) = &args.coins {
        config.poll.coins = coins
            .iter()
            .map(|c| c.trim().to_string())
            .filter(|c| !c.is_empty())
            .collect();
    }
    if let Some(locale) = args.locale.as_deref().and_then(|l| l.parse::<Locale>().ok()) {
        config.locale = locale;
    }
    if let Some(level) = &args.log_level {
        config.log_level = level.clone();
    }
    if args.no_poll {
        config.poll.enabled = false;
    }
}

#[tokio::main]
async fn main() {
    // Load .env file if present
    let _ = dotenvy::dotenv();

    let args = Args::parse();

    let mut config = match AppConfig::load(&args.config) {
        Ok(config) => config,
        Err(e) => {
            init_logging(args.log_level.as_deref().unwrap_or("info"));
            error!("Failed to load config {}: {}", args.config, e);
            return;
        }
    };
    apply_args(&mut config, &args);

    init_logging(&config.log_level);

    info!("🚀 Crypto Watcher starting...");
    info!("  Coins: {}", config.poll.coins.join(", "));
    info!("  Interval: {}s", config.poll.interval_secs);
    info!(
        "  Threshold: {}% | Cooldown: {}s",
        config.engine.threshold_percent,
        config.engine.cooldown_ms / 1000
    );
    info!("  Locale: {:?}", config.locale);
    info!("  HTTP Port: {}", config.http.port);

    let api_key = std::env::var("API_KEY").ok().filter(|k| !k.is_empty());
    if api_key.is_none() {
        warn!("API_KEY not set, using the public CoinGecko rate limit");
    }

    let feed = match CoinGeckoClient::new(config.feed.to_client_config(api_key)) {
        Ok(feed) => feed,
        Err(e) => {
            error!("Failed to create price feed client: {}", e);
            return;
        }
    };

    let port = config.http.port;
    let poll_enabled = config.poll.enabled;

    let state = match create_state(config, Arc::new(feed)) {
        Ok(state) => state,
        Err(e) => {
            error!("Invalid configuration: {}", e);
            return;
        }
    };
    state.start();

    let server_handle = match api::start_server(state.clone(), port).await {
        Ok(handle) => handle,
        Err(e) => {
            error!("Failed to start HTTP server: {}", e);
            return;
        }
    };

    let poll_handle = if poll_enabled {
        let poll_state = state.clone();
        Some(tokio::spawn(async move {
            poller::run_poll_loop(poll_state).await;
        }))
    } else {
        info!("Background polling disabled");
        None
    };

    info!("Press Ctrl+C to stop...");

    if let Err(e) = tokio::signal::ctrl_c().await {
        error!("Failed to listen for Ctrl+C: {}", e);
    }

    warn!("Shutdown signal received");
    state.stop();

    // The loop may be parked on its interval; give it a moment, then abort.
    if let Some(handle) = poll_handle {
        let abort = handle.abort_handle();
        if tokio::time::timeout(Duration::from_secs(1), handle).await.is_err() {
            abort.abort();
        }
    }
    server_handle.abort();

    let summary = state.stats_summary();
    info!("📈 Final Stats:");
    info!("  Total uptime: {} seconds", summary.uptime_secs);
    info!("  Poll cycles: {}", summary.cycles);
    info!("  Notifications: {}", summary.notifications);
    info!("  Feed failures: {}", summary.feed_failures);

    info!("👋 Crypto Watcher stopped");
}
