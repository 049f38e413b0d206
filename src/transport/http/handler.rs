//! HTTP request handlers
//!
//! - GET /api/btc-price: latest price straight from Binance
//! - GET /api/btc-depth: cached depth analysis
//! - GET /api/predictions: prediction history
//! - POST /api/predictions: open a prediction
//! - GET /health

use axum::{
    extract::{rejection::JsonRejection, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use super::error::{HttpTransportError, Result};
use crate::analysis::AnalysisResult;
use crate::binance::client::BinanceClient;
use crate::prediction::{Horizon, Prediction};
use crate::service::GuessService;
use crate::types::PriceSample;

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    /// Binance API client for one-shot price requests
    pub binance_client: BinanceClient,

    pub service: GuessService,

    pub symbol: String,

    /// `Cache-Control` header value for price responses
    pub price_cache_control: String,
}

#[derive(Debug, Serialize, Deserialize)]
pub struct RateResponse {
    pub rate: f64,
}

#[derive(Debug, Deserialize)]
pub struct PlacePredictionRequest {
    pub horizon: String,
}

/// GET /api/btc-price
pub async fn handle_price(State(state): State<AppState>) -> Result<Response> {
    let rate = state
        .binance_client
        .get_price(&state.symbol)
        .await
        .map_err(|e| HttpTransportError::PriceFetch(e.to_string()))?;

    let now = state.service.clock().now_ms();
    state.service.feed().publish(PriceSample::new(now, rate));

    Ok((
        StatusCode::OK,
        [(header::CACHE_CONTROL, state.price_cache_control.clone())],
        Json(RateResponse { rate }),
    )
        .into_response())
}

/// GET /api/btc-depth
pub async fn handle_depth(State(state): State<AppState>) -> Result<Json<AnalysisResult>> {
    let result = state.service.analyzer().analyze().await?;
    Ok(Json(result))
}

/// GET /api/predictions
pub async fn handle_list_predictions(State(state): State<AppState>) -> Json<Vec<Prediction>> {
    Json(state.service.predictions())
}

/// POST /api/predictions
pub async fn handle_place_prediction(
    State(state): State<AppState>,
    body: std::result::Result<Json<PlacePredictionRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<Prediction>)> {
    let Json(request) = body.map_err(|e| HttpTransportError::InvalidRequest(e.body_text()))?;

    let horizon: Horizon = request
        .horizon
        .parse()
        .map_err(|e: crate::error::PredictionError| HttpTransportError::InvalidRequest(e.to_string()))?;

    let prediction = state.service.place_prediction(horizon).await?;
    Ok((StatusCode::CREATED, Json(prediction)))
}

/// GET /health
pub async fn handle_health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok" }))
}
