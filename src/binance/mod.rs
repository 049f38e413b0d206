//! Binance API Client
//!
//! REST client for ticker prices and klines, plus the ticker WebSocket stream.

pub mod client;
pub mod types;

#[cfg(feature = "websocket")]
pub mod websocket;

// Re-export commonly used types
pub use client::BinanceClient;
pub use types::TickerPrice;

#[cfg(feature = "websocket")]
pub use websocket::{BinanceWebSocketClient, TickerUpdate};
