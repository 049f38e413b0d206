//! CoinCap asset history

use super::CandleSource;
use crate::binance::types::parse_price;
use crate::error::SourceError;
use crate::types::{interval_to_ms, Candle};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_BASE_URL: &str = "https://api.coincap.io";

#[derive(Debug, Deserialize)]
struct HistoryResponse {
    data: Vec<HistoryPoint>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct HistoryPoint {
    price_usd: String,
    /// Milliseconds since Unix epoch
    time: i64,
}

pub struct CoinCapSource {
    client: reqwest::Client,
    base_url: String,
    /// CoinCap asset id, e.g. "bitcoin"
    asset_id: String,
}

impl CoinCapSource {
    pub fn new(client: reqwest::Client, base_url: impl Into<String>, asset_id: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            asset_id: asset_id.into(),
        }
    }
}

/// Maps "1h" to CoinCap's "h1" ("1m" → "m1", "1d" → "d1")
pub fn coincap_interval(interval: &str) -> Option<String> {
    interval_to_ms(interval)?;
    let (count, unit) = interval.split_at(interval.len() - 1);
    match unit {
        "m" | "h" | "d" => Some(format!("{}{}", unit, count)),
        _ => None,
    }
}

/// Keeps the last `limit` points, one flat candle per point
fn to_candles(points: &[HistoryPoint], interval_ms: i64, limit: usize) -> Result<Vec<Candle>, SourceError> {
    let start = points.len().saturating_sub(limit);
    points[start..]
        .iter()
        .map(|p| {
            let price = parse_price(&p.price_usd, "priceUsd")?;
            Ok(Candle::flat(p.time, p.time.saturating_add(interval_ms - 1), price))
        })
        .collect()
}

#[async_trait]
impl CandleSource for CoinCapSource {
    fn name(&self) -> &str {
        "coincap"
    }

    async fn fetch_candles(
        &self,
        _symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, SourceError> {
        let cc_interval = coincap_interval(interval).ok_or_else(|| {
            SourceError::InvalidResponse(format!("unsupported interval {}", interval))
        })?;
        let interval_ms = interval_to_ms(interval).unwrap_or(3_600_000);

        let url = format!(
            "{}/v2/assets/{}/history?interval={}",
            self.base_url, self.asset_id, cc_interval
        );
        let response = self.client.get(&url).send().await?;

        if !response.status().is_success() {
            return Err(SourceError::from_status("coincap", response.status()));
        }

        let body: HistoryResponse = response.json().await?;
        to_candles(&body.data, interval_ms, limit as usize)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coincap_interval() {
        assert_eq!(coincap_interval("1h").as_deref(), Some("h1"));
        assert_eq!(coincap_interval("15m").as_deref(), Some("m15"));
        assert_eq!(coincap_interval("1d").as_deref(), Some("d1"));
        assert_eq!(coincap_interval("1w"), None);
        assert_eq!(coincap_interval("x"), None);
    }

    #[test]
    fn test_history_keeps_last_points() {
        let body: HistoryResponse = serde_json::from_str(
            r#"{"data": [
                {"priceUsd": "100.0", "time": 0},
                {"priceUsd": "101.0", "time": 3600000},
                {"priceUsd": "102.5", "time": 7200000}
            ]}"#,
        )
        .unwrap();

        let candles = to_candles(&body.data, 3_600_000, 2).unwrap();
        assert_eq!(candles.len(), 2);
        assert_eq!(candles[0].close, 101.0);
        assert_eq!(candles[1].close, 102.5);
        assert_eq!(candles[1].close_time, 10_799_999);
    }

    #[test]
    fn test_history_bad_price() {
        let body: HistoryResponse =
            serde_json::from_str(r#"{"data": [{"priceUsd": "n/a", "time": 0}]}"#).unwrap();
        assert!(to_candles(&body.data, 3_600_000, 20).is_err());
    }
}
