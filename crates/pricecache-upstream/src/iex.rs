//! IEX Cloud historical chart client.

use async_trait::async_trait;
use chrono::NaiveDate;
use pricecache_core::error::UpstreamError;
use pricecache_core::traits::HistoricalSource;
use pricecache_core::types::{normalize_symbol, HistoricalRecord};
use reqwest::{Client, Url};
use rust_decimal::Decimal;
use serde::Deserialize;
use std::time::Duration;
use tracing::debug;

const DEFAULT_BASE_URL: &str = "https://cloud.iexapis.com/stable";
const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// IEX API configuration.
#[derive(Clone)]
pub struct IexConfig {
    pub base_url: String,
    pub token: String,
    pub timeout: Duration,
}

impl IexConfig {
    /// Create config directly with base URL and token.
    pub fn new(base_url: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            token: token.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Config for `base_url` with the token read from the `token_env`
    /// environment variable.
    pub fn from_env(base_url: impl Into<String>, token_env: &str) -> Result<Self, UpstreamError> {
        let token = std::env::var(token_env)
            .map_err(|_| UpstreamError::Configuration(format!("{} not set", token_env)))?;

        Ok(Self::new(base_url, token))
    }

    /// Set the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

// The token never shows up in logs.
impl std::fmt::Debug for IexConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IexConfig")
            .field("base_url", &self.base_url)
            .field("token", &"***")
            .field("timeout", &self.timeout)
            .finish()
    }
}

/// One element of the `/stock/{symbol}/chart/{range}` response.
#[derive(Debug, Deserialize)]
struct IexChartBar {
    #[serde(default)]
    symbol: Option<String>,
    date: NaiveDate,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    open: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    high: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    low: Decimal,
    #[serde(with = "rust_decimal::serde::arbitrary_precision")]
    close: Decimal,
    volume: u64,
}

/// IEX Cloud client for daily historical prices.
pub struct IexClient {
    config: IexConfig,
    client: Client,
}

impl IexClient {
    /// Create a new IEX client.
    pub fn new(config: IexConfig) -> Result<Self, UpstreamError> {
        if config.token.is_empty() {
            return Err(UpstreamError::Configuration("IEX token is empty".into()));
        }

        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| UpstreamError::Configuration(e.to_string()))?;

        Ok(Self { config, client })
    }

    /// Build `{base}/stock/{symbol}/chart/{range}?token=...`.
    fn chart_url(&self, symbol: &str, range: &str) -> Result<Url, UpstreamError> {
        let mut url = Url::parse(&self.config.base_url)
            .map_err(|e| UpstreamError::Configuration(format!("bad base URL: {}", e)))?;

        url.path_segments_mut()
            .map_err(|_| {
                UpstreamError::Configuration(format!(
                    "base URL cannot take a path: {}",
                    self.config.base_url
                ))
            })?
            .pop_if_empty()
            .extend(["stock", symbol, "chart", range]);
        url.query_pairs_mut().append_pair("token", &self.config.token);

        Ok(url)
    }
}

/// Decode a chart response body. Records missing a symbol get `symbol`.
fn parse_chart(body: &str, symbol: &str) -> Result<Vec<HistoricalRecord>, UpstreamError> {
    let bars: Vec<IexChartBar> =
        serde_json::from_str(body).map_err(|e| UpstreamError::Parse(e.to_string()))?;

    let records = bars
        .into_iter()
        .map(|b| {
            HistoricalRecord::new(
                b.symbol.unwrap_or_else(|| normalize_symbol(symbol)),
                b.date,
                b.open,
                b.high,
                b.low,
                b.close,
                b.volume,
            )
        })
        .collect();

    Ok(records)
}

#[async_trait]
impl HistoricalSource for IexClient {
    async fn fetch_historical(
        &self,
        symbol: &str,
        range: &str,
    ) -> Result<Vec<HistoricalRecord>, UpstreamError> {
        let url = self.chart_url(symbol, range)?;
        debug!(symbol, range, "Requesting IEX chart");

        let resp = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| UpstreamError::Connection(e.without_url().to_string()))?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(UpstreamError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let body = resp
            .text()
            .await
            .map_err(|e| UpstreamError::Connection(e.without_url().to_string()))?;

        let records = parse_chart(&body, symbol)?;
        debug!(symbol, range, records = records.len(), "IEX chart received");
        Ok(records)
    }

    fn name(&self) -> &str {
        "iex"
    }
}
