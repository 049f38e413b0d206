//! Prediction desk
//!
//! Opens predictions from the current price. Direction, reason and risk come
//! from the support/resistance levels; the depth analysis, when a candle
//! source answers, only supplies the detail text.

use crate::analysis::{DepthAnalyzer, ThresholdConfig};
use crate::clock::SharedClock;
use crate::error::{ProviderError, Result};
use crate::prediction::{Horizon, NewPrediction, Prediction, SharedBook};
use crate::price::PriceFeed;
use std::sync::Arc;

#[derive(Clone)]
pub struct GuessService {
    analyzer: Arc<DepthAnalyzer>,
    book: SharedBook,
    feed: PriceFeed,
    clock: SharedClock,
    thresholds: ThresholdConfig,
}

impl GuessService {
    pub fn new(
        analyzer: Arc<DepthAnalyzer>,
        book: SharedBook,
        feed: PriceFeed,
        clock: SharedClock,
        thresholds: ThresholdConfig,
    ) -> Self {
        Self {
            analyzer,
            book,
            feed,
            clock,
            thresholds,
        }
    }

    pub fn analyzer(&self) -> &DepthAnalyzer {
        &self.analyzer
    }

    pub fn feed(&self) -> &PriceFeed {
        &self.feed
    }

    pub fn clock(&self) -> &SharedClock {
        &self.clock
    }

    pub fn predictions(&self) -> Vec<Prediction> {
        self.book
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .list()
            .to_vec()
    }

    /// Opens a prediction at the current price over `horizon`
    pub async fn place_prediction(&self, horizon: Horizon) -> Result<Prediction> {
        let sample = self.feed.latest().ok_or_else(|| {
            ProviderError::PriceUnavailable("no price has been received yet".to_string())
        })?;

        let signal = self.thresholds.assess(sample.price);
        let analysis_detail = match self.analyzer.analyze().await {
            Ok(analysis) => analysis.analysis_detail,
            Err(e) => {
                tracing::warn!("Depth analysis unavailable: {}", e);
                format!("{}, risk: {:?}", signal.reason, signal.risk).to_lowercase()
            }
        };

        let new = NewPrediction {
            price: sample.price,
            horizon,
            recommendation: signal.direction,
            reason: signal.reason.to_string(),
            risk: signal.risk,
            analysis_detail,
        };

        let prediction = Prediction::open(new, self.clock.now_ms());
        tracing::info!(
            prediction = %prediction.id,
            horizon = %horizon,
            direction = ?prediction.recommendation,
            "Opened prediction at {:.2}",
            prediction.price
        );

        self.book
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .insert(prediction.clone());
        Ok(prediction)
    }
}
