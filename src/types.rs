//! Market Data Types
//!
//! Source-independent representations of prices and candles. Every upstream
//! adapter converts its wire format into these types.

use serde::{Deserialize, Serialize};

/// Latest observed trade price
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PriceSample {
    /// Observation time in milliseconds since Unix epoch
    pub timestamp: i64,
    pub price: f64,
}

impl PriceSample {
    pub fn new(timestamp: i64, price: f64) -> Self {
        Self { timestamp, price }
    }
}

/// OHLCV summary for a fixed time bucket
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Candle {
    pub open_time: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
    pub close_time: i64,
}

impl Candle {
    /// A candle whose open, high, low and close all equal `price`
    pub fn flat(open_time: i64, close_time: i64, price: f64) -> Self {
        Self {
            open_time,
            open: price,
            high: price,
            low: price,
            close: price,
            volume: 0.0,
            close_time,
        }
    }
}

/// Closing prices of a candle series, oldest first
pub fn closes(candles: &[Candle]) -> Vec<f64> {
    candles.iter().map(|c| c.close).collect()
}

/// Converts a Binance-style interval ("1m", "15m", "1h", "1d", "1w") to milliseconds
pub fn interval_to_ms(interval: &str) -> Option<i64> {
    if interval.len() < 2 {
        return None;
    }
    let (count, unit) = interval.split_at(interval.len() - 1);
    let count: i64 = count.parse().ok().filter(|c| *c > 0)?;
    let unit_ms = match unit {
        "m" => 60_000,
        "h" => 3_600_000,
        "d" => 86_400_000,
        "w" => 604_800_000,
        _ => return None,
    };
    count.checked_mul(unit_ms)
}

/// Builds `limit` flat candles ending at `now_ms`, all priced at `price`.
///
/// Used when an upstream only offers a spot price.
pub fn flat_series(price: f64, limit: usize, interval_ms: i64, now_ms: i64) -> Vec<Candle> {
    (0..limit)
        .map(|i| {
            let buckets_back = (limit - i) as i64;
            let open_time = now_ms.saturating_sub(buckets_back.saturating_mul(interval_ms));
            Candle::flat(open_time, open_time.saturating_add(interval_ms - 1), price)
        })
        .collect()
}
