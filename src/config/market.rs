//! Market data configuration
//!
//! Symbol, candle request and upstream endpoints. Every field has a default
//! so the service runs with no environment at all.

use crate::analysis::{CandleRequest, ThresholdConfig};
use crate::sources::binance::DEFAULT_HOSTS;
use std::time::Duration;

/// ## Environment Variables
///
/// - `MARKET_SYMBOL`: Binance symbol (default: BTCUSDT)
/// - `MARKET_INTERVAL`: Candle interval (default: 1h)
/// - `MARKET_LIMIT`: Candles per analysis (default: 20)
/// - `DEPTH_CACHE_TTL_SECS`: Depth analysis cache lifetime (default: 60)
/// - `BINANCE_HOSTS`: Comma-separated REST hosts in priority order
/// - `BINANCE_WS_URL`: WebSocket base URL
/// - `COINGECKO_BASE_URL`, `COINCAP_BASE_URL`: Fallback API base URLs
/// - `SUPPORT_PRICE`, `RESISTANCE_PRICE`: Threshold heuristic levels
#[derive(Debug, Clone)]
pub struct MarketConfig {
    pub symbol: String,
    pub interval: String,
    pub limit: u32,
    pub depth_cache_ttl: Duration,
    pub binance_hosts: Vec<String>,
    pub binance_ws_url: String,
    pub coingecko_base_url: String,
    pub coincap_base_url: String,
    /// Asset id understood by CoinGecko and CoinCap
    pub asset_id: String,
    pub thresholds: ThresholdConfig,
}

impl Default for MarketConfig {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: "1h".to_string(),
            limit: 20,
            depth_cache_ttl: Duration::from_secs(60),
            binance_hosts: DEFAULT_HOSTS.iter().map(|h| h.to_string()).collect(),
            binance_ws_url: "wss://stream.binance.com:9443/ws".to_string(),
            coingecko_base_url: crate::sources::coingecko::DEFAULT_BASE_URL.to_string(),
            coincap_base_url: crate::sources::coincap::DEFAULT_BASE_URL.to_string(),
            asset_id: "bitcoin".to_string(),
            thresholds: ThresholdConfig::default(),
        }
    }
}

impl MarketConfig {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        let defaults = Self::default();

        let symbol = std::env::var("MARKET_SYMBOL")
            .map(|s| s.trim().to_uppercase())
            .unwrap_or(defaults.symbol);
        let interval = std::env::var("MARKET_INTERVAL").unwrap_or(defaults.interval);
        if crate::types::interval_to_ms(&interval).is_none() {
            return Err(format!("MARKET_INTERVAL {:?} is not a valid interval", interval).into());
        }

        let limit: u32 = match std::env::var("MARKET_LIMIT") {
            Ok(v) => v.parse()?,
            Err(_) => defaults.limit,
        };
        if !(2..=1000).contains(&limit) {
            return Err(format!("MARKET_LIMIT must be between 2 and 1000, got {}", limit).into());
        }

        let depth_cache_ttl = match std::env::var("DEPTH_CACHE_TTL_SECS") {
            Ok(v) => parse_cache_ttl(&v)?,
            Err(_) => defaults.depth_cache_ttl,
        };

        let binance_hosts = match std::env::var("BINANCE_HOSTS") {
            Ok(v) => parse_hosts(&v),
            Err(_) => defaults.binance_hosts,
        };
        if binance_hosts.is_empty() {
            return Err("BINANCE_HOSTS must list at least one host".into());
        }

        let thresholds = ThresholdConfig {
            support: match std::env::var("SUPPORT_PRICE") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.thresholds.support,
            },
            resistance: match std::env::var("RESISTANCE_PRICE") {
                Ok(v) => v.parse()?,
                Err(_) => defaults.thresholds.resistance,
            },
        };

        Ok(Self {
            symbol,
            interval,
            limit,
            depth_cache_ttl,
            binance_hosts,
            binance_ws_url: std::env::var("BINANCE_WS_URL").unwrap_or(defaults.binance_ws_url),
            coingecko_base_url: std::env::var("COINGECKO_BASE_URL")
                .unwrap_or(defaults.coingecko_base_url),
            coincap_base_url: std::env::var("COINCAP_BASE_URL")
                .unwrap_or(defaults.coincap_base_url),
            asset_id: defaults.asset_id,
            thresholds,
        })
    }

    pub fn candle_request(&self) -> CandleRequest {
        CandleRequest {
            symbol: self.symbol.clone(),
            interval: self.interval.clone(),
            limit: self.limit,
        }
    }
}

/// Longest accepted depth cache lifetime (one day)
pub const MAX_DEPTH_CACHE_TTL_SECS: u64 = 86_400;

fn parse_cache_ttl(raw: &str) -> Result<Duration, String> {
    let secs: u64 = raw
        .trim()
        .parse()
        .map_err(|_| format!("DEPTH_CACHE_TTL_SECS {:?} is not a whole number", raw))?;
    if secs > MAX_DEPTH_CACHE_TTL_SECS {
        return Err(format!(
            "DEPTH_CACHE_TTL_SECS must be at most {}, got {}",
            MAX_DEPTH_CACHE_TTL_SECS, secs
        ));
    }
    Ok(Duration::from_secs(secs))
}

fn parse_hosts(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|h| !h.is_empty())
        .map(str::to_string)
        .collect()
}
