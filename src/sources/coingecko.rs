//! CoinGecko spot price, reshaped into a flat candle series
//!
//! CoinGecko's simple price endpoint returns one number. The adapter repeats
//! it across `limit` buckets so the analyzer sees zero volatility and a
//! "down" recommendation rather than an error.

use super::CandleSource;
use crate::clock::SharedClock;
use crate::error::SourceError;
use crate::types::{flat_series, interval_to_ms, Candle};
use async_trait::async_trait;
use std::collections::HashMap;

pub const DEFAULT_BASE_URL: &str = "https://api.coingecko.com";

/// `{"bitcoin": {"usd": 94512.0}}`
type SimplePriceResponse = HashMap<String, HashMap<String, f64>>;

pub struct CoinGeckoSource {
    client: reqwest::Client,
    base_url: String,
    /// CoinGecko asset id, e.g. "bitcoin"
    coin_id: String,
    vs_currency: String,
    /// Anchors the synthetic series
    clock: SharedClock,
}

impl CoinGeckoSource {
    pub fn new(
        client: reqwest::Client,
        base_url: impl Into<String>,
        coin_id: impl Into<String>,
        clock: SharedClock,
    ) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            coin_id: coin_id.into(),
            vs_currency: "usd".to_string(),
            clock,
        }
    }

    pub async fn spot_price(&self) -> Result<f64, SourceError> {
        let url = format!(
            "{}/api/v3/simple/price?ids={}&vs_currencies={}",
            self.base_url, self.coin_id, self.vs_currency
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::from_status("coingecko", response.status()));
        }

        let body: SimplePriceResponse = response.json().await?;
        extract_price(&body, &self.coin_id, &self.vs_currency)
    }
}

fn extract_price(
    body: &SimplePriceResponse,
    coin_id: &str,
    vs_currency: &str,
) -> Result<f64, SourceError> {
    body.get(coin_id)
        .and_then(|prices| prices.get(vs_currency))
        .copied()
        .filter(|p| p.is_finite() && *p > 0.0)
        .ok_or_else(|| {
            SourceError::InvalidResponse(format!(
                "no {} price for {} in CoinGecko response",
                vs_currency, coin_id
            ))
        })
}

#[async_trait]
impl CandleSource for CoinGeckoSource {
    fn name(&self) -> &str {
        "coingecko"
    }

    async fn fetch_candles(
        &self,
        _symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, SourceError> {
        let interval_ms = interval_to_ms(interval).ok_or_else(|| {
            SourceError::InvalidResponse(format!("unsupported interval {}", interval))
        })?;
        let price = self.spot_price().await?;

        Ok(flat_series(
            price,
            limit as usize,
            interval_ms,
            self.clock.now_ms(),
        ))
    }
}
