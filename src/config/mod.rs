//! Configuration Management
//!
//! Environment-driven settings for the HTTP server and the market data
//! upstreams.

pub mod http;
pub mod market;

// Re-export
pub use http::HttpConfig;
pub use market::MarketConfig;
