//! Price acquisition tasks
//!
//! Poll mode repeats a one-shot REST request on a fixed interval; stream mode
//! keeps a WebSocket subscription open. Both write into the same [`PriceFeed`].

use super::PriceFeed;
use crate::binance::BinanceClient;
use crate::clock::SharedClock;
use crate::types::PriceSample;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PriceMode {
    /// GET /api/v3/ticker/price every `interval`
    Poll { interval: Duration },
    /// `<symbol>@ticker` WebSocket stream
    Stream,
}

/// Fetches once and publishes on success; failures are logged and skipped
pub async fn poll_once(
    client: &BinanceClient,
    symbol: &str,
    feed: &PriceFeed,
    clock: &SharedClock,
) -> bool {
    match client.get_price(symbol).await {
        Ok(price) => {
            feed.publish(PriceSample::new(clock.now_ms(), price));
            true
        }
        Err(e) => {
            tracing::warn!("Price poll for {} failed: {}", symbol, e);
            false
        }
    }
}

async fn poll_loop(
    client: BinanceClient,
    symbol: String,
    feed: PriceFeed,
    clock: SharedClock,
    every: Duration,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(every);
    ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Delay);

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                poll_once(&client, &symbol, &feed, &clock).await;
            }
            _ = shutdown.recv() => {
                tracing::info!("Price poller for {} stopped", symbol);
                return;
            }
        }
    }
}

/// Starts the price task for `mode`
///
/// Stream mode without the `websocket` feature degrades to polling every 5s.
pub fn spawn_price_task(
    mode: PriceMode,
    client: BinanceClient,
    #[cfg(feature = "websocket")] ws_client: crate::binance::BinanceWebSocketClient,
    symbol: String,
    feed: PriceFeed,
    clock: SharedClock,
    shutdown: broadcast::Receiver<()>,
) -> JoinHandle<()> {
    match mode {
        PriceMode::Poll { interval } => {
            tracing::info!("Polling {} price every {:?}", symbol, interval);
            tokio::spawn(poll_loop(client, symbol, feed, clock, interval, shutdown))
        }
        #[cfg(feature = "websocket")]
        PriceMode::Stream => {
            tracing::info!("Streaming {} price from {}", symbol, ws_client.base_url);
            tokio::spawn(async move {
                ws_client
                    .ticker_stream_task(&symbol, feed, clock, shutdown)
                    .await
            })
        }
        #[cfg(not(feature = "websocket"))]
        PriceMode::Stream => {
            tracing::warn!("websocket feature disabled, falling back to polling");
            tokio::spawn(poll_loop(
                client,
                symbol,
                feed,
                clock,
                Duration::from_secs(5),
                shutdown,
            ))
        }
    }
}
