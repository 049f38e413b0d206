//! Binance API Type Definitions
//!
//! Wire types for the Binance REST endpoints this service uses, with
//! conversion into the crate's source-independent [`Candle`].

use crate::error::SourceError;
use crate::types::Candle;
use serde::{Deserialize, Serialize};

/// Response from /api/v3/ticker/price endpoint
///
/// # Example Response
/// ```json
/// { "symbol": "BTCUSDT", "price": "94512.01000000" }
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TickerPrice {
    /// Trading pair symbol (e.g., "BTCUSDT")
    pub symbol: String,
    /// Current price as string to preserve precision
    pub price: String,
}

impl TickerPrice {
    /// Parses the price, rejecting values that are not finite and positive
    pub fn price_f64(&self) -> Result<f64, SourceError> {
        parse_price(&self.price, "price")
    }
}

/// Response from /api/v3/klines endpoint
///
/// Array format: [open_time, open, high, low, close, volume, close_time, quote_volume, trades, taker_buy_base, taker_buy_quote, ignore]
pub type KlineData = Vec<serde_json::Value>;

/// Converts one kline array into a [`Candle`]
pub fn parse_kline(raw: &serde_json::Value) -> Result<Candle, SourceError> {
    let fields = raw
        .as_array()
        .ok_or_else(|| SourceError::InvalidResponse("kline is not an array".to_string()))?;

    if fields.len() < 7 {
        return Err(SourceError::InvalidResponse(format!(
            "kline has {} fields, expected at least 7",
            fields.len()
        )));
    }

    Ok(Candle {
        open_time: as_i64(&fields[0], "open_time")?,
        open: as_price(&fields[1], "open")?,
        high: as_price(&fields[2], "high")?,
        low: as_price(&fields[3], "low")?,
        close: as_price(&fields[4], "close")?,
        volume: as_f64(&fields[5], "volume")?,
        close_time: as_i64(&fields[6], "close_time")?,
    })
}

pub fn parse_klines(data: &KlineData) -> Result<Vec<Candle>, SourceError> {
    data.iter().map(parse_kline).collect()
}

fn as_i64(value: &serde_json::Value, field: &str) -> Result<i64, SourceError> {
    value
        .as_i64()
        .ok_or_else(|| SourceError::InvalidResponse(format!("kline {} is not an integer", field)))
}

// Binance sends prices as strings; accept bare numbers too.
fn as_f64(value: &serde_json::Value, field: &str) -> Result<f64, SourceError> {
    let parsed = match value {
        serde_json::Value::String(s) => s.trim().parse::<f64>().map_err(|_| {
            SourceError::ParseError(format!("kline {} {:?} is not a number", field, s))
        })?,
        serde_json::Value::Number(n) => n
            .as_f64()
            .ok_or_else(|| SourceError::InvalidResponse(format!("kline {} out of range", field)))?,
        _ => {
            return Err(SourceError::InvalidResponse(format!(
                "kline {} has unexpected type",
                field
            )))
        }
    };

    if !parsed.is_finite() {
        return Err(SourceError::InvalidResponse(format!(
            "kline {} is not finite",
            field
        )));
    }
    Ok(parsed)
}

// Volume may be zero; prices may not.
fn as_price(value: &serde_json::Value, field: &str) -> Result<f64, SourceError> {
    let price = as_f64(value, field)?;
    if price <= 0.0 {
        return Err(SourceError::InvalidResponse(format!(
            "kline {} must be positive, got {}",
            field, price
        )));
    }
    Ok(price)
}

pub(crate) fn parse_price(raw: &str, field: &str) -> Result<f64, SourceError> {
    let value: f64 = raw
        .trim()
        .parse()
        .map_err(|_| SourceError::ParseError(format!("{} {:?} is not a number", field, raw)))?;

    if !value.is_finite() || value <= 0.0 {
        return Err(SourceError::InvalidResponse(format!(
            "{} must be a positive finite number, got {}",
            field, value
        )));
    }
    Ok(value)
}
