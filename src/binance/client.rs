//! Binance HTTP Client
//!
//! HTTP client wrapper for the public Binance REST market data endpoints.
//! One client talks to one host; the kline source holds several of them.

use crate::binance::types::{parse_klines, KlineData, TickerPrice};
use crate::error::{ProviderError, SourceError};
use crate::types::Candle;
use reqwest::Client;
use std::time::Duration;

/// Default Binance REST base URL
pub const DEFAULT_BASE_URL: &str = "https://api.binance.com";

const USER_AGENT: &str = concat!("btc-guess-provider/", env!("CARGO_PKG_VERSION"));

/// Builds the shared reqwest client used by every upstream adapter
pub fn build_http_client(timeout: Duration) -> Result<Client, ProviderError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(USER_AGENT)
        .build()
        .map_err(|e| ProviderError::Initialization(format!("Failed to create HTTP client: {}", e)))
}

/// Binance REST API HTTP client
#[derive(Clone)]
pub struct BinanceClient {
    /// HTTP client for making requests
    pub(crate) client: Client,
    /// Base URL for Binance API (default: https://api.binance.com)
    pub(crate) base_url: String,
}

impl std::fmt::Debug for BinanceClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BinanceClient")
            .field("base_url", &self.base_url)
            .finish()
    }
}

impl BinanceClient {
    /// Creates a client for https://api.binance.com with a 10 second timeout
    pub fn new() -> Result<Self, ProviderError> {
        Ok(Self::with_client(
            build_http_client(Duration::from_secs(10))?,
            DEFAULT_BASE_URL,
        ))
    }

    /// Wraps an existing reqwest client
    pub fn with_client(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Creates a client for a bare hostname ("api1.binance.com") or a full base URL
    ///
    /// # Example
    /// ```
    /// use btc_guess_provider::binance::client::{build_http_client, BinanceClient};
    /// use std::time::Duration;
    ///
    /// let http = build_http_client(Duration::from_secs(5)).unwrap();
    /// let client = BinanceClient::for_host(http, "api2.binance.com");
    /// assert_eq!(client.base_url(), "https://api2.binance.com");
    /// ```
    pub fn for_host(client: Client, host: &str) -> Self {
        if host.contains("://") {
            Self::with_client(client, host)
        } else {
            Self::with_client(client, format!("https://{}", host))
        }
    }

    /// Returns the configured base URL
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Host part of the base URL, used in error messages
    pub fn host(&self) -> &str {
        self.base_url
            .split_once("://")
            .map(|(_, rest)| rest)
            .unwrap_or(&self.base_url)
    }

    /// Get latest price for a symbol
    ///
    /// Calls GET /api/v3/ticker/price
    pub async fn get_ticker_price(&self, symbol: &str) -> Result<TickerPrice, SourceError> {
        let url = format!("{}/api/v3/ticker/price?symbol={}", self.base_url, symbol);
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::from_status(self.host(), response.status()));
        }

        let ticker: TickerPrice = response.json().await?;
        Ok(ticker)
    }

    /// Latest trade price as a number
    pub async fn get_price(&self, symbol: &str) -> Result<f64, SourceError> {
        self.get_ticker_price(symbol).await?.price_f64()
    }

    /// Get candlestick/kline data
    ///
    /// Calls GET /api/v3/klines
    ///
    /// # Arguments
    /// * `symbol` - Trading pair symbol (e.g., "BTCUSDT")
    /// * `interval` - Kline interval (e.g., "1m", "5m", "1h", "1d")
    /// * `limit` - Number of klines to return (max 1000)
    pub async fn get_klines(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, SourceError> {
        let url = format!(
            "{}/api/v3/klines?symbol={}&interval={}&limit={}",
            self.base_url, symbol, interval, limit
        );

        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::from_status(self.host(), response.status()));
        }

        let klines: KlineData = response.json().await?;
        parse_klines(&klines)
    }
}
