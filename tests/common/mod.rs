// Local stand-ins for Binance, CoinGecko and CoinCap

#![allow(dead_code)]

use axum::{http::StatusCode, routing::get, Json, Router};
use btc_guess_provider::config::MarketConfig;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

/// Serves `router` on an ephemeral port and returns its base URL
pub async fn serve(router: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}", addr)
}

/// Base URL that refuses connections
pub fn dead_url() -> String {
    "http://127.0.0.1:9".to_string()
}

/// Binance-style kline rows for the given closes, one hour apart
pub fn kline_rows(closes: &[f64]) -> Value {
    let rows: Vec<Value> = closes
        .iter()
        .enumerate()
        .map(|(i, close)| {
            let open_time = i as i64 * 3_600_000;
            json!([
                open_time,
                format!("{:.2}", close),
                format!("{:.2}", close),
                format!("{:.2}", close),
                format!("{:.2}", close),
                "12.5",
                open_time + 3_599_999,
                "0",
                10,
                "0",
                "0",
                "0"
            ])
        })
        .collect();
    Value::Array(rows)
}

/// Binance host that always answers `status`
pub async fn failing_binance(status: StatusCode) -> String {
    let router = Router::new()
        .route("/api/v3/klines", get(move || async move { status }))
        .route("/api/v3/ticker/price", get(move || async move { status }));
    serve(router).await
}

/// Binance host serving fixed klines; `hits` counts kline requests
pub async fn binance_with_klines(closes: Vec<f64>, hits: Arc<AtomicUsize>) -> String {
    let body = kline_rows(&closes);
    let router = Router::new().route(
        "/api/v3/klines",
        get(move || {
            let body = body.clone();
            let hits = hits.clone();
            async move {
                hits.fetch_add(1, Ordering::SeqCst);
                Json(body)
            }
        }),
    );
    serve(router).await
}

/// Binance host with both a climbing ticker and fixed klines
pub async fn binance_full(start: f64, step: f64, closes: Vec<f64>) -> String {
    let calls = Arc::new(AtomicUsize::new(0));
    let body = kline_rows(&closes);
    let router = Router::new()
        .route(
            "/api/v3/ticker/price",
            get(move || {
                let calls = calls.clone();
                async move {
                    let n = calls.fetch_add(1, Ordering::SeqCst) as f64;
                    Json(json!({
                        "symbol": "BTCUSDT",
                        "price": format!("{:.2}", start + step * n),
                    }))
                }
            }),
        )
        .route(
            "/api/v3/klines",
            get(move || {
                let body = body.clone();
                async move { Json(body) }
            }),
        );
    serve(router).await
}

/// CoinGecko simple-price endpoint quoting `price`
pub async fn coingecko(price: f64) -> String {
    let router = Router::new().route(
        "/api/v3/simple/price",
        get(move || async move { Json(json!({ "bitcoin": { "usd": price } })) }),
    );
    serve(router).await
}

/// CoinCap history endpoint over `prices`
pub async fn coincap(prices: Vec<f64>) -> String {
    let data: Vec<Value> = prices
        .iter()
        .enumerate()
        .map(|(i, p)| json!({ "priceUsd": format!("{:.2}", p), "time": i as i64 * 3_600_000 }))
        .collect();
    let body = json!({ "data": data });
    let router = Router::new().route(
        "/v2/assets/bitcoin/history",
        get(move || {
            let body = body.clone();
            async move { Json(body) }
        }),
    );
    serve(router).await
}

/// Market config pointed at local upstreams
pub fn market(binance_hosts: Vec<String>, coingecko_url: String, coincap_url: String) -> MarketConfig {
    MarketConfig {
        binance_hosts,
        binance_ws_url: "ws://127.0.0.1:9".to_string(),
        coingecko_base_url: coingecko_url,
        coincap_base_url: coincap_url,
        ..MarketConfig::default()
    }
}

/// Closes 100.0, 101.0, ... rising by one per hour
pub fn rising_closes(n: usize) -> Vec<f64> {
    (0..n).map(|i| 100.0 + i as f64).collect()
}
