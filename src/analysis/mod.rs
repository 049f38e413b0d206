//! Closing-price statistics and trade signals
//!
//! [`analyze_closes`] computes the simple moving average, the coefficient of
//! variation (`vol_ratio`) and the derived recommendation and risk label.
//! [`depth::DepthAnalyzer`] feeds it from the source chain and caches the
//! result; [`threshold`] is the support/resistance heuristic.

pub mod depth;
pub mod threshold;

use crate::error::AnalysisError;
use serde::{Deserialize, Serialize};

pub use depth::{CandleRequest, DepthAnalyzer};
pub use threshold::{ThresholdConfig, ThresholdSignal};

/// `vol_ratio` below this is low risk
pub const LOW_RISK_MAX: f64 = 0.005;
/// `vol_ratio` above this is high risk
pub const HIGH_RISK_MIN: f64 = 0.01;

pub const MIN_CLOSES: usize = 2;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Recommendation {
    Up,
    Down,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RiskIndex {
    Low,
    Medium,
    High,
}

impl RiskIndex {
    /// Buckets a volatility ratio; both boundaries fall into `Medium`
    pub fn from_vol_ratio(vol_ratio: f64) -> Self {
        if vol_ratio < LOW_RISK_MAX {
            RiskIndex::Low
        } else if vol_ratio > HIGH_RISK_MIN {
            RiskIndex::High
        } else {
            RiskIndex::Medium
        }
    }
}

/// Full statistics over a closing-price series
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Analysis {
    pub avg: f64,
    pub variance: f64,
    pub vol_ratio: f64,
    pub last_close: f64,
    pub recommendation: Recommendation,
    pub risk_index: RiskIndex,
}

impl Analysis {
    pub fn detail(&self) -> String {
        format!(
            "SMA={:.2}, volatility={:.2}%, last={:.2}",
            self.avg,
            self.vol_ratio * 100.0,
            self.last_close
        )
    }

    pub fn to_result(&self) -> AnalysisResult {
        AnalysisResult {
            recommendation: self.recommendation,
            risk_index: self.risk_index,
            analysis_detail: self.detail(),
        }
    }
}

/// Wire shape of a depth analysis
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnalysisResult {
    pub recommendation: Recommendation,
    pub risk_index: RiskIndex,
    pub analysis_detail: String,
}

/// Computes mean, population variance and volatility ratio over `closes`
/// (oldest first).
///
/// The recommendation is `Up` only when the last close is strictly above the
/// mean; a tie is `Down`.
///
/// # Example
/// ```
/// use btc_guess_provider::analysis::{analyze_closes, Recommendation, RiskIndex};
///
/// let a = analyze_closes(&[100.0, 101.0, 102.0, 103.0]).unwrap();
/// assert_eq!(a.avg, 101.5);
/// assert_eq!(a.recommendation, Recommendation::Up);
/// assert_eq!(a.risk_index, RiskIndex::High);
/// ```
pub fn analyze_closes(closes: &[f64]) -> Result<Analysis, AnalysisError> {
    if closes.len() < MIN_CLOSES {
        return Err(AnalysisError::InsufficientData {
            got: closes.len(),
            needed: MIN_CLOSES,
        });
    }
    if let Some(idx) = closes.iter().position(|c| !c.is_finite()) {
        return Err(AnalysisError::NonFinite(idx));
    }

    let n = closes.len() as f64;
    let avg = closes.iter().sum::<f64>() / n;
    if !avg.is_finite() || avg <= 0.0 {
        return Err(AnalysisError::NonPositiveMean(avg));
    }

    let variance = closes.iter().map(|c| (c - avg).powi(2)).sum::<f64>() / n;
    let vol_ratio = variance.sqrt() / avg;
    let last_close = closes[closes.len() - 1];

    let recommendation = if last_close > avg {
        Recommendation::Up
    } else {
        Recommendation::Down
    };

    Ok(Analysis {
        avg,
        variance,
        vol_ratio,
        last_close,
        recommendation,
        risk_index: RiskIndex::from_vol_ratio(vol_ratio),
    })
}
