// Library exports for btc-guess-provider

pub mod error;
pub mod types;
pub mod clock;
pub mod cache;

// Upstream market data
pub mod binance; // Binance REST + WebSocket clients
pub mod sources; // Candle sources with ordered fallback
pub mod config; // Configuration management

pub mod analysis; // Depth analysis and threshold heuristic
pub mod prediction; // Prediction book and settlement
pub mod price; // Live price feed
pub mod service;
pub mod provider;

#[cfg(feature = "http_transport")]
pub mod transport; // HTTP API
