//! Binance WebSocket Client
//!
//! Streams `<symbol>@ticker` updates and publishes the last price into a
//! [`PriceFeed`]. A dropped or failed connection is retried after a fixed
//! backoff until shutdown is signalled.

use crate::binance::types::parse_price;
use crate::clock::SharedClock;
use crate::error::SourceError;
use crate::price::PriceFeed;
use crate::types::PriceSample;
use futures_util::StreamExt;
use serde::Deserialize;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::sleep;
use tokio_tungstenite::{connect_async, tungstenite::protocol::Message};

/// Base URL for Binance WebSocket streams
pub const BINANCE_WS_URL: &str = "wss://stream.binance.com:9443/ws";

/// Delay between reconnection attempts
pub const DEFAULT_RECONNECT_BACKOFF: Duration = Duration::from_secs(1);

/// Binance WebSocket client for the ticker stream
#[derive(Debug, Clone)]
pub struct BinanceWebSocketClient {
    /// Base WebSocket URL
    pub base_url: String,
    /// Fixed wait before reconnecting
    pub reconnect_backoff: Duration,
}

/// How a single connection ended
enum StreamEnd {
    Disconnected,
    Shutdown,
}

impl BinanceWebSocketClient {
    pub fn new() -> Self {
        Self {
            base_url: BINANCE_WS_URL.to_string(),
            reconnect_backoff: DEFAULT_RECONNECT_BACKOFF,
        }
    }

    pub fn with_base_url(base_url: impl Into<String>, reconnect_backoff: Duration) -> Self {
        Self {
            base_url: base_url.into().trim_end_matches('/').to_string(),
            reconnect_backoff,
        }
    }

    /// Stream URL for a symbol's ticker channel
    pub fn ticker_url(&self, symbol: &str) -> String {
        format!("{}/{}@ticker", self.base_url, symbol.to_lowercase())
    }

    /// Keeps a ticker subscription alive and publishes every price it receives
    ///
    /// Returns once `shutdown` fires (or its sender is dropped).
    ///
    /// ## Example
    /// ```rust,no_run
    /// use btc_guess_provider::binance::websocket::BinanceWebSocketClient;
    /// use btc_guess_provider::clock::{SharedClock, SystemClock};
    /// use btc_guess_provider::price::PriceFeed;
    /// use std::sync::Arc;
    /// use tokio::sync::broadcast;
    ///
    /// # async fn example() {
    /// let client = BinanceWebSocketClient::new();
    /// let feed = PriceFeed::new();
    /// let clock: SharedClock = Arc::new(SystemClock);
    /// let (shutdown_tx, shutdown_rx) = broadcast::channel(1);
    ///
    /// tokio::spawn(async move {
    ///     client.ticker_stream_task("BTCUSDT", feed, clock, shutdown_rx).await
    /// });
    /// let _ = shutdown_tx.send(());
    /// # }
    /// ```
    pub async fn ticker_stream_task(
        &self,
        symbol: &str,
        feed: PriceFeed,
        clock: SharedClock,
        mut shutdown: broadcast::Receiver<()>,
    ) {
        let url = self.ticker_url(symbol);

        loop {
            tracing::info!("Connecting to Binance WebSocket: {}", url);

            match self.run_connection(&url, &feed, &clock, &mut shutdown).await {
                Ok(StreamEnd::Shutdown) => {
                    tracing::info!("Ticker stream for {} stopped", symbol);
                    return;
                }
                Ok(StreamEnd::Disconnected) => {
                    tracing::warn!(
                        "Ticker stream for {} disconnected, reconnecting in {:?}",
                        symbol,
                        self.reconnect_backoff
                    );
                }
                Err(e) => {
                    tracing::warn!(
                        "Ticker stream for {} failed: {}. Retrying in {:?}",
                        symbol,
                        e,
                        self.reconnect_backoff
                    );
                }
            }

            tokio::select! {
                _ = sleep(self.reconnect_backoff) => {}
                _ = shutdown.recv() => {
                    tracing::info!("Ticker stream for {} stopped", symbol);
                    return;
                }
            }
        }
    }

    async fn run_connection(
        &self,
        url: &str,
        feed: &PriceFeed,
        clock: &SharedClock,
        shutdown: &mut broadcast::Receiver<()>,
    ) -> Result<StreamEnd, SourceError> {
        let (ws_stream, _) = tokio::select! {
            connected = connect_async(url) => connected
                .map_err(|e| SourceError::ConnectionError(e.to_string()))?,
            _ = shutdown.recv() => return Ok(StreamEnd::Shutdown),
        };
        tracing::info!("Connected to Binance WebSocket: {}", url);

        let (_write, mut read) = ws_stream.split();

        loop {
            let msg_result = tokio::select! {
                next = read.next() => match next {
                    Some(msg) => msg,
                    None => return Ok(StreamEnd::Disconnected),
                },
                _ = shutdown.recv() => return Ok(StreamEnd::Shutdown),
            };

            match msg_result {
                Ok(Message::Text(text)) => match parse_ticker_price(&text) {
                    Ok(price) => {
                        feed.publish(PriceSample::new(clock.now_ms(), price));
                    }
                    Err(e) => {
                        tracing::warn!("Failed to parse ticker update: {}", e);
                    }
                },
                Ok(Message::Ping(data)) => {
                    tracing::debug!("Received ping with {} bytes", data.len());
                }
                Ok(Message::Close(frame)) => {
                    tracing::info!("WebSocket closed: {:?}", frame);
                    return Ok(StreamEnd::Disconnected);
                }
                Err(e) => {
                    tracing::error!("WebSocket read error: {}", e);
                    return Ok(StreamEnd::Disconnected);
                }
                _ => {
                    tracing::debug!("Received other message type");
                }
            }
        }
    }
}

impl Default for BinanceWebSocketClient {
    fn default() -> Self {
        Self::new()
    }
}

/// Ticker price update message from Binance WebSocket
///
/// Received from the `<symbol>@ticker` stream every 1000ms. Only the fields
/// this service reads are kept.
#[derive(Debug, Clone, Deserialize, serde::Serialize)]
pub struct TickerUpdate {
    /// Event type (always "24hrTicker")
    #[serde(rename = "e")]
    pub event_type: String,

    /// Event time (milliseconds since Unix epoch)
    #[serde(rename = "E")]
    pub event_time: i64,

    /// Trading pair symbol
    #[serde(rename = "s")]
    pub symbol: String,

    /// Last price
    #[serde(rename = "c")]
    pub last_price: String,
}

/// Extracts the last price from a raw ticker message
pub fn parse_ticker_price(text: &str) -> Result<f64, SourceError> {
    let update: TickerUpdate = serde_json::from_str(text)?;
    parse_price(&update.last_price, "last price")
}
