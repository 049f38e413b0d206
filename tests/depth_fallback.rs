// Integration tests for depth analysis over the candle source chain
//
// Every upstream is a local axum server, so these cover host fallback,
// provider fallback, error aggregation and result caching end to end.

mod common;

use axum::http::StatusCode;
use btc_guess_provider::analysis::{AnalysisResult, DepthAnalyzer, Recommendation, RiskIndex};
use btc_guess_provider::binance::client::build_http_client;
use btc_guess_provider::cache::ExpiringCache;
use btc_guess_provider::clock::{ManualClock, SharedClock};
use btc_guess_provider::error::ProviderError;
use btc_guess_provider::provider::default_chain;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

fn analyzer(
    market: &btc_guess_provider::config::MarketConfig,
    clock: SharedClock,
) -> DepthAnalyzer {
    let http = build_http_client(Duration::from_secs(2)).unwrap();
    let cache: Arc<ExpiringCache<AnalysisResult>> =
        Arc::new(ExpiringCache::new(market.depth_cache_ttl, clock.clone()));
    DepthAnalyzer::new(
        default_chain(http, market, clock),
        cache,
        market.candle_request(),
    )
}

#[tokio::test]
async fn test_second_binance_host_answers() {
    let hits = Arc::new(AtomicUsize::new(0));
    let broken = common::failing_binance(StatusCode::INTERNAL_SERVER_ERROR).await;
    let healthy = common::binance_with_klines(common::rising_closes(20), hits.clone()).await;

    let market = common::market(vec![broken, healthy], common::dead_url(), common::dead_url());
    let result = analyzer(&market, Arc::new(ManualClock::new(0)))
        .analyze()
        .await
        .unwrap();

    assert_eq!(result.recommendation, Recommendation::Up);
    // stddev ≈ 5.77 on a mean of 109.5
    assert_eq!(result.risk_index, RiskIndex::High);
    assert!(result.analysis_detail.starts_with("SMA=109.50, volatility="));
    assert!(result.analysis_detail.ends_with("last=119.00"));
    assert_eq!(hits.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn test_coingecko_flat_series_when_binance_is_down() {
    let a = common::failing_binance(StatusCode::INTERNAL_SERVER_ERROR).await;
    let b = common::failing_binance(StatusCode::SERVICE_UNAVAILABLE).await;
    let gecko = common::coingecko(94_000.0).await;

    let market = common::market(vec![a, b], gecko, common::dead_url());
    let result = analyzer(&market, Arc::new(ManualClock::new(0)))
        .analyze()
        .await
        .unwrap();

    // last == average resolves to down
    assert_eq!(result.recommendation, Recommendation::Down);
    assert_eq!(result.risk_index, RiskIndex::Low);
    assert_eq!(
        result.analysis_detail,
        "SMA=94000.00, volatility=0.00%, last=94000.00"
    );
}

#[tokio::test]
async fn test_zero_closes_fall_through_to_coingecko() {
    let hits = Arc::new(AtomicUsize::new(0));
    let zeros = common::binance_with_klines(vec![0.0; 20], hits.clone()).await;
    let gecko = common::coingecko(94_000.0).await;

    let market = common::market(vec![zeros], gecko, common::dead_url());
    let result = analyzer(&market, Arc::new(ManualClock::new(0)))
        .analyze()
        .await
        .unwrap();

    assert_eq!(hits.load(Ordering::SeqCst), 1);
    assert_eq!(
        result.analysis_detail,
        "SMA=94000.00, volatility=0.00%, last=94000.00"
    );
}

#[tokio::test]
async fn test_coincap_is_last_resort() {
    let a = common::failing_binance(StatusCode::INTERNAL_SERVER_ERROR).await;
    let cap = common::coincap(vec![100.0, 100.0, 100.0, 100.2, 100.4]).await;

    let market = common::market(vec![a], common::dead_url(), cap);
    let result = analyzer(&market, Arc::new(ManualClock::new(0)))
        .analyze()
        .await
        .unwrap();

    assert_eq!(result.recommendation, Recommendation::Up);
    assert_eq!(result.risk_index, RiskIndex::Low);
}

#[tokio::test]
async fn test_exhausted_chain_names_every_source() {
    let a = common::failing_binance(StatusCode::INTERNAL_SERVER_ERROR).await;

    let market = common::market(vec![a], common::dead_url(), common::dead_url());
    let err = analyzer(&market, Arc::new(ManualClock::new(0)))
        .analyze()
        .await
        .unwrap_err();

    assert!(matches!(err, ProviderError::SourcesExhausted(_)));
    let message = err.to_string();
    assert!(message.starts_with("depth analysis failed: "));
    assert!(message.contains("binance: HTTP 500"));
    assert!(message.contains("coingecko: "));
    assert!(message.contains("coincap: "));
}

#[tokio::test]
async fn test_result_is_cached_for_the_ttl() {
    let hits = Arc::new(AtomicUsize::new(0));
    let host = common::binance_with_klines(common::rising_closes(20), hits.clone()).await;

    let market = common::market(vec![host], common::dead_url(), common::dead_url());
    let clock = Arc::new(ManualClock::new(1_000));
    let analyzer = analyzer(&market, clock.clone());

    let first = analyzer.analyze().await.unwrap();
    clock.advance_ms(59_000);
    let second = analyzer.analyze().await.unwrap();
    assert_eq!(first, second);
    assert_eq!(hits.load(Ordering::SeqCst), 1);

    clock.advance_ms(2_000);
    analyzer.analyze().await.unwrap();
    assert_eq!(hits.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_failure_is_not_cached() {
    let market = common::market(
        vec![common::dead_url()],
        common::dead_url(),
        common::dead_url(),
    );
    let clock = Arc::new(ManualClock::new(0));
    let analyzer = analyzer(&market, clock);

    assert!(analyzer.analyze().await.is_err());
    assert!(analyzer.analyze().await.is_err());
}
