//! CoinGecko REST client.
//!
//! Fetches `coins/markets` rows with the 1h change and normalizes them into
//! `PriceSnapshot`s. Rows with missing or invalid fields never leave this module.

use crate::{FeedError, PriceFeed};
use async_trait::async_trait;
use cryptowatch_core::PriceSnapshot;
use serde::Deserialize;
use std::time::Duration;
use tracing::{debug, warn};
use url::Url;

/// Header carrying the CoinGecko demo API key.
const API_KEY_HEADER: &str = "x-cg-demo-api-key";

/// One row of the `coins/markets` response. Only the fields we use.
#[derive(Debug, Clone, Deserialize)]
pub struct MarketRow {
    pub id: String,
    #[serde(default)]
    pub price_change_percentage_1h_in_currency: Option<f64>,
    #[serde(default)]
    pub current_price: Option<f64>,
}

/// Map market rows to snapshots, dropping rows that are incomplete or invalid.
pub fn normalize_markets(rows: Vec<MarketRow>) -> Vec<PriceSnapshot> {
    rows.into_iter()
        .filter_map(|row| {
            let (Some(change), Some(price)) =
                (row.price_change_percentage_1h_in_currency, row.current_price)
            else {
                warn!(asset = %row.id, "Dropping market row: missing 1h change or price");
                return None;
            };

            let snapshot = PriceSnapshot::new(&row.id, change, price);
            match snapshot.validate() {
                Ok(()) => Some(snapshot),
                Err(e) => {
                    warn!(error = %e, "Dropping market row");
                    None
                }
            }
        })
        .collect()
}

/// CoinGecko client configuration.
#[derive(Debug, Clone)]
pub struct CoinGeckoConfig {
    /// API root, e.g. `https://api.coingecko.com/api/v3`
    pub base_url: String,
    /// Quote currency for prices.
    pub vs_currency: String,
    /// Optional demo API key.
    pub api_key: Option<String>,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl Default for CoinGeckoConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.coingecko.com/api/v3".to_string(),
            vs_currency: "usd".to_string(),
            api_key: None,
            timeout: Duration::from_secs(10),
        }
    }
}

/// CoinGecko `coins/markets` fetcher.
#[derive(Debug, Clone)]
pub struct CoinGeckoClient {
    http: reqwest::Client,
    config: CoinGeckoConfig,
}

impl CoinGeckoClient {
    pub fn new(config: CoinGeckoConfig) -> Result<Self, FeedError> {
        let http = reqwest::Client::builder().timeout(config.timeout).build()?;
        Ok(Self { http, config })
    }

    pub fn config(&self) -> &CoinGeckoConfig {
        &self.config
    }

    /// Full request URL for the given ids. Query values are percent-encoded.
    pub fn markets_url(&self, asset_ids: &[String]) -> Result<Url, FeedError> {
        let endpoint = format!("{}/coins/markets", self.config.base_url.trim_end_matches('/'));
        let url = Url::parse_with_params(
            &endpoint,
            &[
                ("vs_currency", self.config.vs_currency.as_str()),
                ("ids", asset_ids.join(",").as_str()),
                ("price_change_percentage", "1h"),
            ],
        )?;
        Ok(url)
    }

    /// Fetch raw market rows.
    pub async fn fetch_markets(&self, asset_ids: &[String]) -> Result<Vec<MarketRow>, FeedError> {
        let url = self.markets_url(asset_ids)?;
        debug!(url = %url, "Fetching markets");

        let mut request = self.http.get(url);
        if let Some(key) = &self.config.api_key {
            request = request.header(API_KEY_HEADER, key);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(FeedError::from_status(status.as_u16(), body));
        }

        let body = response.text().await?;
        let rows: Vec<MarketRow> = serde_json::from_str(&body)?;
        debug!(rows = rows.len(), "Fetched markets");
        Ok(rows)
    }
}

#[async_trait]
impl PriceFeed for CoinGeckoClient {
    async fn fetch_snapshots(&self, asset_ids: &[String]) -> Result<Vec<PriceSnapshot>, FeedError> {
        if asset_ids.is_empty() {
            return Ok(Vec::new());
        }
        let rows = self.fetch_markets(asset_ids).await?;
        Ok(normalize_markets(rows))
    }

    fn name(&self) -> &str {
        "coingecko"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    const MARKETS_JSON: &str = r#"[
        {"id":"bitcoin","symbol":"btc","current_price":50000,"price_change_percentage_1h_in_currency":6.2},
        {"id":"ethereum","symbol":"eth","current_price":3000.5,"price_change_percentage_1h_in_currency":-1.2},
        {"id":"ghost","symbol":"gst","current_price":null,"price_change_percentage_1h_in_currency":3.0},
        {"id":"newcoin","symbol":"new","current_price":1.5},
        {"id":"broken","symbol":"brk","current_price":0,"price_change_percentage_1h_in_currency":9.0}
    ]"#;

    #[test]
    fn test_normalize_markets() {
        let rows: Vec<MarketRow> = serde_json::from_str(MARKETS_JSON).unwrap();
        let snapshots = normalize_markets(rows);

        assert_eq!(
            snapshots,
            vec![
                PriceSnapshot::new("bitcoin", 6.2, 50000.0),
                PriceSnapshot::new("ethereum", -1.2, 3000.5),
            ]
        );
    }

    fn query_pairs(url: &Url) -> Vec<(String, String)> {
        url.query_pairs().map(|(k, v)| (k.into_owned(), v.into_owned())).collect()
    }

    #[test]
    fn test_markets_url() {
        let client = CoinGeckoClient::new(CoinGeckoConfig {
            base_url: "http://localhost:9999/api/v3/".to_string(),
            ..Default::default()
        })
        .unwrap();

        let url = client.markets_url(&["bitcoin".to_string(), "ethereum".to_string()]).unwrap();
        assert_eq!(url.path(), "/api/v3/coins/markets");
        assert_eq!(
            query_pairs(&url),
            vec![
                ("vs_currency".to_string(), "usd".to_string()),
                ("ids".to_string(), "bitcoin,ethereum".to_string()),
                ("price_change_percentage".to_string(), "1h".to_string()),
            ]
        );
    }

    #[test]
    fn test_markets_url_escapes_ids() {
        let client = CoinGeckoClient::new(CoinGeckoConfig::default()).unwrap();

        let url = client
            .markets_url(&["bitcoin&vs_currency=eur#".to_string(), "ethereum".to_string()])
            .unwrap();

        assert_eq!(url.fragment(), None);
        assert_eq!(
            query_pairs(&url),
            vec![
                ("vs_currency".to_string(), "usd".to_string()),
                ("ids".to_string(), "bitcoin&vs_currency=eur#,ethereum".to_string()),
                ("price_change_percentage".to_string(), "1h".to_string()),
            ]
        );
    }

    #[tokio::test]
    async fn test_empty_ids_skip_request() {
        // Unroutable base URL: any request would fail.
        let client = CoinGeckoClient::new(CoinGeckoConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            ..Default::default()
        })
        .unwrap();

        let snapshots = client.fetch_snapshots(&[]).await.unwrap();
        assert!(snapshots.is_empty());
        assert_eq!(client.name(), "coingecko");
    }

    #[tokio::test]
    async fn test_connection_failure_surfaces_as_error() {
        let client = CoinGeckoClient::new(CoinGeckoConfig {
            base_url: "http://127.0.0.1:1".to_string(),
            timeout: Duration::from_secs(2),
            ..Default::default()
        })
        .unwrap();

        let result = client.fetch_snapshots(&["bitcoin".to_string()]).await;
        assert!(result.is_err());
    }
}
