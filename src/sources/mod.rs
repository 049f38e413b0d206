//! Candle sources and the ordered fallback chain
//!
//! Every upstream is wrapped in a [`CandleSource`]. A [`SourceChain`] tries
//! them in priority order; a failure is logged and the next source is tried.
//! Only when every source has failed does the chain return an error, built
//! from the last error of each attempted source.

pub mod binance;
pub mod coincap;
pub mod coingecko;

use crate::error::{ProviderError, SourceError};
use crate::types::Candle;
use async_trait::async_trait;
use std::sync::Arc;

pub use binance::BinanceKlineSource;
pub use coincap::CoinCapSource;
pub use coingecko::CoinGeckoSource;

/// Fewest candles a source must return to count as a success
pub const MIN_CANDLES: usize = 2;

/// Uniform adapter over one upstream market data API
#[async_trait]
pub trait CandleSource: Send + Sync {
    /// Short name used in logs and aggregated errors (e.g. "binance")
    fn name(&self) -> &str;

    /// Recent candles, oldest first
    async fn fetch_candles(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<Vec<Candle>, SourceError>;
}

/// Candles together with the source that produced them
#[derive(Debug, Clone)]
pub struct SourcedCandles {
    pub source: String,
    pub candles: Vec<Candle>,
}

/// Ordered list of sources; the first success wins
#[derive(Clone, Default)]
pub struct SourceChain {
    sources: Vec<Arc<dyn CandleSource>>,
}

impl SourceChain {
    pub fn new(sources: Vec<Arc<dyn CandleSource>>) -> Self {
        Self { sources }
    }

    /// Appends a lower-priority source
    pub fn with_source(mut self, source: Arc<dyn CandleSource>) -> Self {
        self.sources.push(source);
        self
    }

    pub fn len(&self) -> usize {
        self.sources.len()
    }

    pub fn is_empty(&self) -> bool {
        self.sources.is_empty()
    }

    pub fn names(&self) -> Vec<String> {
        self.sources.iter().map(|s| s.name().to_string()).collect()
    }

    pub async fn fetch(
        &self,
        symbol: &str,
        interval: &str,
        limit: u32,
    ) -> Result<SourcedCandles, ProviderError> {
        if self.sources.is_empty() {
            return Err(ProviderError::SourcesExhausted(
                "no data sources configured".to_string(),
            ));
        }

        let mut failures: Vec<String> = Vec::with_capacity(self.sources.len());

        for source in &self.sources {
            let result = source
                .fetch_candles(symbol, interval, limit)
                .await
                .and_then(usable);

            match result {
                Ok(candles) => {
                    tracing::debug!(
                        source = source.name(),
                        count = candles.len(),
                        "Fetched candles for {}",
                        symbol
                    );
                    return Ok(SourcedCandles {
                        source: source.name().to_string(),
                        candles,
                    });
                }
                Err(e) => {
                    tracing::warn!(
                        source = source.name(),
                        error_type = e.error_type(),
                        "Candle source failed for {}: {}",
                        symbol,
                        e
                    );
                    failures.push(format!("{}: {}", source.name(), e));
                }
            }
        }

        let message = failures.join("; ");
        tracing::error!("All candle sources failed for {}: {}", symbol, message);
        Err(ProviderError::SourcesExhausted(message))
    }
}

/// A series the analyzer can work with: enough candles, every close a
/// positive finite price
fn usable(candles: Vec<Candle>) -> Result<Vec<Candle>, SourceError> {
    if candles.len() < MIN_CANDLES {
        return Err(SourceError::InsufficientData {
            got: candles.len(),
            needed: MIN_CANDLES,
        });
    }
    if let Some(i) = candles
        .iter()
        .position(|c| !c.close.is_finite() || c.close <= 0.0)
    {
        return Err(SourceError::InvalidResponse(format!(
            "close at index {} is not a positive price",
            i
        )));
    }
    Ok(candles)
}

#[cfg(test)]
pub(crate) mod testing {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Scripted source that counts its calls
    pub struct StubSource {
        pub name: &'static str,
        pub response: Result<Vec<Candle>, SourceError>,
        pub calls: AtomicUsize,
    }

    impl StubSource {
        pub fn ok(name: &'static str, closes: &[f64]) -> Arc<Self> {
            let candles = closes
                .iter()
                .enumerate()
                .map(|(i, c)| Candle::flat(i as i64 * 60_000, i as i64 * 60_000 + 59_999, *c))
                .collect();
            Arc::new(Self {
                name,
                response: Ok(candles),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn failing(name: &'static str, err: SourceError) -> Arc<Self> {
            Arc::new(Self {
                name,
                response: Err(err),
                calls: AtomicUsize::new(0),
            })
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl CandleSource for StubSource {
        fn name(&self) -> &str {
            self.name
        }

        async fn fetch_candles(
            &self,
            _symbol: &str,
            _interval: &str,
            _limit: u32,
        ) -> Result<Vec<Candle>, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.response.clone()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::testing::StubSource;
    use super::*;

    fn http_500(host: &str) -> SourceError {
        SourceError::HttpStatus {
            host: host.to_string(),
            status: 500,
        }
    }

    #[tokio::test]
    async fn test_first_success_wins() {
        let a = StubSource::ok("a", &[1.0, 2.0]);
        let b = StubSource::ok("b", &[3.0, 4.0]);
        let chain = SourceChain::default()
            .with_source(a.clone())
            .with_source(b.clone());

        let got = chain.fetch("BTCUSDT", "1h", 20).await.unwrap();
        assert_eq!(got.source, "a");
        assert_eq!(a.calls(), 1);
        assert_eq!(b.calls(), 0);
    }

    #[tokio::test]
    async fn test_falls_back_after_http_500() {
        let a = StubSource::failing("a", http_500("a.example"));
        let b = StubSource::ok("b", &[3.0, 4.0]);
        let chain = SourceChain::default()
            .with_source(a.clone())
            .with_source(b.clone());

        let got = chain.fetch("BTCUSDT", "1h", 20).await.unwrap();
        assert_eq!(got.source, "b");
        assert_eq!(got.candles.len(), 2);
        assert_eq!(a.calls(), 1);
    }

    #[tokio::test]
    async fn test_too_few_candles_moves_on() {
        let a = StubSource::ok("a", &[1.0]);
        let b = StubSource::ok("b", &[3.0, 4.0]);
        let chain = SourceChain::default().with_source(a).with_source(b);

        assert_eq!(chain.fetch("BTCUSDT", "1h", 20).await.unwrap().source, "b");
    }

    #[tokio::test]
    async fn test_unusable_closes_move_on() {
        let zeros = StubSource::ok("a", &[0.0; 20]);
        let nan = StubSource::ok("b", &[100.0, f64::NAN]);
        let c = StubSource::ok("c", &[94_000.0, 94_100.0]);
        let chain = SourceChain::default()
            .with_source(zeros.clone())
            .with_source(nan.clone())
            .with_source(c.clone());

        let got = chain.fetch("BTCUSDT", "1h", 20).await.unwrap();
        assert_eq!(got.source, "c");
        assert_eq!((zeros.calls(), nan.calls(), c.calls()), (1, 1, 1));
    }

    #[tokio::test]
    async fn test_exhausted_chain_reports_every_source() {
        let chain = SourceChain::default()
            .with_source(StubSource::failing("a", http_500("a.example")))
            .with_source(StubSource::failing(
                "b",
                SourceError::ParseError("bad body".to_string()),
            ))
            .with_source(StubSource::ok("c", &[]));

        let err = chain.fetch("BTCUSDT", "1h", 20).await.unwrap_err();
        let msg = err.to_string();
        assert!(msg.starts_with("depth analysis failed: "));
        assert!(msg.contains("a: HTTP 500 from a.example"));
        assert!(msg.contains("b: Parse error: bad body"));
        assert!(msg.contains("c: Insufficient data: got 0 candles"));
    }

    #[tokio::test]
    async fn test_empty_chain_fails() {
        let err = SourceChain::default().fetch("BTCUSDT", "1h", 20).await;
        assert!(matches!(err, Err(ProviderError::SourcesExhausted(_))));
    }
}
