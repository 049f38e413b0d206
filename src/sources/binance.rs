//! Binance klines across equivalent hostnames

use super::CandleSource;
use crate::binance::BinanceClient;
use crate::error::SourceError;
use crate::types::Candle;
use async_trait::async_trait;

/// Hostnames serving the same Binance REST API
pub const DEFAULT_HOSTS: [&str; 4] = [
    "api.binance.com",
    "api1.binance.com",
    "api2.binance.com",
    "api3.binance.com",
];

/// Tries each host in order; the first 2xx response wins
pub struct BinanceKlineSource {
    clients: Vec<BinanceClient>,
}

impl BinanceKlineSource {
    pub fn new(clients: Vec<BinanceClient>) -> Self {
        Self { clients }
    }

    pub fn from_hosts<S: AsRef<str>>(http: reqwest::Client, hosts: &[S]) -> Self {
        Self::new(
            hosts
                .iter()
                .map(|h| BinanceClient::for_host(http.clone(), h.as_ref()))
                .collect(),
        )
    }

    pub fn hosts(&self) -> Vec<&str> {
        self.clients.iter().map(|c| c.host()).collect()
    }
}

#[async_trait]
impl CandleSource for BinanceKlineSource {
    fn name(&self) -> &str {
        "binance"
    }

    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, SourceError> {
        let mut last_err =
            SourceError::InvalidResponse("no Binance hosts configured".to_string());

        for client in &self.clients {
            match client.get_klines(symbol, interval, limit).await {
                Ok(candles) => return Ok(candles),
                Err(e) => {
                    tracing::debug!("Binance host {} failed: {}", client.host(), e);
                    last_err = e;
                }
            }
        }

        Err(last_err)
    }
}
