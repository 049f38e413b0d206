//! Depth analyzer: source chain + statistics + result cache

use super::{analyze_closes, AnalysisResult};
use crate::cache::ExpiringCache;
use crate::error::{ProviderError, Result};
use crate::sources::SourceChain;
use crate::types::closes;
use std::sync::Arc;

/// What to ask every candle source for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CandleRequest {
    pub symbol: String,
    pub interval: String,
    pub limit: u32,
}

impl Default for CandleRequest {
    fn default() -> Self {
        Self {
            symbol: "BTCUSDT".to_string(),
            interval: "1h".to_string(),
            limit: 20,
        }
    }
}

/// Produces an [`AnalysisResult`] for one symbol
///
/// The cache is owned by the caller and shared in; a fresh result is stored
/// only after a successful analysis, so failures are never cached.
pub struct DepthAnalyzer {
    chain: SourceChain,
    cache: Arc<ExpiringCache<AnalysisResult>>,
    request: CandleRequest,
}

impl DepthAnalyzer {
    pub fn new(
        chain: SourceChain,
        cache: Arc<ExpiringCache<AnalysisResult>>,
        request: CandleRequest,
    ) -> Self {
        Self {
            chain,
            cache,
            request,
        }
    }

    pub fn request(&self) -> &CandleRequest {
        &self.request
    }

    pub async fn analyze(&self) -> Result<AnalysisResult> {
        if let Some(cached) = self.cache.get() {
            tracing::debug!("Depth analysis cache hit for {}", self.request.symbol);
            return Ok(cached);
        }

        let fetched = self
            .chain
            .fetch(
                &self.request.symbol,
                &self.request.interval,
                self.request.limit,
            )
            .await?;

        let analysis = analyze_closes(&closes(&fetched.candles)).map_err(|e| {
            ProviderError::SourcesExhausted(format!("{}: {}", fetched.source, e))
        })?;
        let result = analysis.to_result();

        tracing::info!(
            source = %fetched.source,
            recommendation = ?result.recommendation,
            risk = ?result.risk_index,
            "Depth analysis for {}: {}",
            self.request.symbol,
            result.analysis_detail
        );

        self.cache.set(result.clone());
        Ok(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::{Recommendation, RiskIndex};
    use crate::clock::ManualClock;
    use crate::error::SourceError;
    use crate::sources::testing::StubSource;
    use std::time::Duration;

    fn analyzer(
        chain: SourceChain,
        clock: Arc<ManualClock>,
    ) -> (DepthAnalyzer, Arc<ExpiringCache<AnalysisResult>>) {
        let cache = Arc::new(ExpiringCache::new(Duration::from_secs(60), clock));
        (
            DepthAnalyzer::new(chain, cache.clone(), CandleRequest::default()),
            cache,
        )
    }

    #[tokio::test]
    async fn test_second_call_within_window_is_cached() {
        let clock = Arc::new(ManualClock::new(0));
        let source = StubSource::ok("binance", &[100.0, 101.0, 102.0, 103.0]);
        let (analyzer, _) = analyzer(SourceChain::default().with_source(source.clone()), clock.clone());

        let first = analyzer.analyze().await.unwrap();
        clock.advance_ms(59_000);
        let second = analyzer.analyze().await.unwrap();

        assert_eq!(first, second);
        assert_eq!(first.recommendation, Recommendation::Up);
        assert_eq!(source.calls(), 1);
    }

    #[tokio::test]
    async fn test_call_after_window_refetches() {
        let clock = Arc::new(ManualClock::new(0));
        let source = StubSource::ok("binance", &[100.0, 100.0, 100.0, 100.0]);
        let (analyzer, _) = analyzer(SourceChain::default().with_source(source.clone()), clock.clone());

        analyzer.analyze().await.unwrap();
        clock.advance_ms(60_000);
        let again = analyzer.analyze().await.unwrap();

        assert_eq!(source.calls(), 2);
        assert_eq!(again.risk_index, RiskIndex::Low);
        assert_eq!(again.recommendation, Recommendation::Down);
    }

    #[tokio::test]
    async fn test_failures_are_not_cached() {
        let clock = Arc::new(ManualClock::new(0));
        let source = StubSource::failing(
            "binance",
            SourceError::ConnectionError("unreachable".to_string()),
        );
        let (analyzer, cache) = analyzer(SourceChain::default().with_source(source.clone()), clock);

        let err = analyzer.analyze().await.unwrap_err();
        assert!(matches!(err, ProviderError::SourcesExhausted(_)));
        assert!(err.to_string().contains("binance: Connection error: unreachable"));
        assert_eq!(cache.get(), None);

        analyzer.analyze().await.unwrap_err();
        assert_eq!(source.calls(), 2);
    }

    #[tokio::test]
    async fn test_unanalyzable_series_reports_its_source() {
        let clock = Arc::new(ManualClock::new(0));
        // each close is finite but their sum is not
        let source = StubSource::ok("binance", &[f64::MAX, f64::MAX]);
        let (analyzer, cache) = analyzer(SourceChain::default().with_source(source), clock);

        let err = analyzer.analyze().await.unwrap_err();
        assert!(matches!(err, ProviderError::SourcesExhausted(_)));
        assert!(err
            .to_string()
            .starts_with("depth analysis failed: binance: average closing price"));
        assert_eq!(cache.get(), None);
    }

    #[tokio::test]
    async fn test_fallback_source_feeds_analysis() {
        let clock = Arc::new(ManualClock::new(0));
        let primary = StubSource::failing(
            "binance",
            SourceError::HttpStatus {
                host: "api.binance.com".to_string(),
                status: 500,
            },
        );
        let secondary = StubSource::ok("coingecko", &[94_000.0; 20]);
        let chain = SourceChain::default()
            .with_source(primary)
            .with_source(secondary.clone());
        let (analyzer, _) = analyzer(chain, clock);

        let result = analyzer.analyze().await.unwrap();
        assert_eq!(result.risk_index, RiskIndex::Low);
        assert_eq!(secondary.calls(), 1);
    }
}
