//! Wiring of clients, sources, cache and prediction desk

use crate::analysis::{AnalysisResult, DepthAnalyzer};
use crate::binance::client::{build_http_client, BinanceClient};
use crate::cache::ExpiringCache;
use crate::clock::SharedClock;
use crate::config::MarketConfig;
use crate::error::Result;
use crate::prediction::{PredictionBook, SettlementTask, SharedBook};
use crate::price::PriceFeed;
use crate::service::GuessService;
use crate::sources::{BinanceKlineSource, CoinCapSource, CoinGeckoSource, SourceChain};
use std::sync::Arc;
use std::time::Duration;

/// Every long-lived component of the service
#[derive(Clone)]
pub struct GuessProvider {
    pub market: MarketConfig,
    /// Client for the first configured Binance host; serves price requests
    pub binance_client: BinanceClient,
    #[cfg(feature = "websocket")]
    pub ws_client: crate::binance::BinanceWebSocketClient,
    pub feed: PriceFeed,
    pub book: SharedBook,
    pub service: GuessService,
    pub clock: SharedClock,
}

/// Binance hosts first, then CoinGecko, then CoinCap
pub fn default_chain(
    http: reqwest::Client,
    market: &MarketConfig,
    clock: SharedClock,
) -> SourceChain {
    SourceChain::default()
        .with_source(Arc::new(BinanceKlineSource::from_hosts(
            http.clone(),
            &market.binance_hosts,
        )))
        .with_source(Arc::new(CoinGeckoSource::new(
            http.clone(),
            market.coingecko_base_url.clone(),
            market.asset_id.clone(),
            clock,
        )))
        .with_source(Arc::new(CoinCapSource::new(
            http,
            market.coincap_base_url.clone(),
            market.asset_id.clone(),
        )))
}

impl GuessProvider {
    pub fn from_config(market: MarketConfig, clock: SharedClock) -> Result<Self> {
        let http = build_http_client(Duration::from_secs(10))?;
        let chain = default_chain(http.clone(), &market, clock.clone());
        tracing::info!("Candle sources in order: {}", chain.names().join(" -> "));

        let cache: Arc<ExpiringCache<AnalysisResult>> =
            Arc::new(ExpiringCache::new(market.depth_cache_ttl, clock.clone()));
        let analyzer = Arc::new(DepthAnalyzer::new(chain, cache, market.candle_request()));

        let feed = PriceFeed::new();
        let book = PredictionBook::shared();
        let service = GuessService::new(
            analyzer,
            book.clone(),
            feed.clone(),
            clock.clone(),
            market.thresholds,
        );

        // from_env guarantees at least one host
        let primary_host = market
            .binance_hosts
            .first()
            .map(String::as_str)
            .unwrap_or("api.binance.com");
        let binance_client = BinanceClient::for_host(http, primary_host);

        Ok(Self {
            #[cfg(feature = "websocket")]
            ws_client: crate::binance::BinanceWebSocketClient::with_base_url(
                market.binance_ws_url.clone(),
                crate::binance::websocket::DEFAULT_RECONNECT_BACKOFF,
            ),
            market,
            binance_client,
            feed,
            book,
            service,
            clock,
        })
    }

    pub fn settlement_task(&self, every: Duration) -> SettlementTask {
        SettlementTask::new(self.book.clone(), self.feed.clone(), self.clock.clone(), every)
    }

    #[cfg(feature = "http_transport")]
    pub fn app_state(&self, http: &crate::config::HttpConfig) -> crate::transport::AppState {
        crate::transport::AppState {
            binance_client: self.binance_client.clone(),
            service: self.service.clone(),
            symbol: self.market.symbol.clone(),
            price_cache_control: http.price_cache_control(),
        }
    }
}
