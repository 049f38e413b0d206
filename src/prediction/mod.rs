//! Prediction records and their settlement
//!
//! A [`Prediction`] starts open and is settled exactly once, after its
//! `end_time` has passed and a current price is known.

pub mod book;
pub mod scheduler;

use crate::analysis::{Recommendation, RiskIndex};
use crate::error::PredictionError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

pub use book::{PredictionBook, SharedBook};
pub use scheduler::SettlementTask;

/// User-selected prediction duration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Horizon {
    #[serde(rename = "10m")]
    TenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "1d")]
    OneDay,
}

impl Horizon {
    pub const ALL: [Horizon; 4] = [
        Horizon::TenMinutes,
        Horizon::ThirtyMinutes,
        Horizon::OneHour,
        Horizon::OneDay,
    ];

    pub fn as_millis(self) -> i64 {
        match self {
            Horizon::TenMinutes => 10 * 60 * 1000,
            Horizon::ThirtyMinutes => 30 * 60 * 1000,
            Horizon::OneHour => 60 * 60 * 1000,
            Horizon::OneDay => 24 * 60 * 60 * 1000,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Horizon::TenMinutes => "10m",
            Horizon::ThirtyMinutes => "30m",
            Horizon::OneHour => "1h",
            Horizon::OneDay => "1d",
        }
    }
}

impl fmt::Display for Horizon {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Horizon {
    type Err = PredictionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Horizon::ALL
            .into_iter()
            .find(|h| h.as_str() == s.trim())
            .ok_or_else(|| PredictionError::UnknownHorizon(s.to_string()))
    }
}

/// Direction a prediction bets on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    Up,
    Down,
    /// No call; settles as `Unknown`
    Sideways,
}

impl From<Recommendation> for Direction {
    fn from(rec: Recommendation) -> Self {
        match rec {
            Recommendation::Up => Direction::Up,
            Recommendation::Down => Direction::Down,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Outcome {
    Correct,
    Incorrect,
    Unknown,
}

impl Direction {
    /// Scores `actual` against `predicted`; an unchanged price is never correct
    pub fn score(self, predicted: f64, actual: f64) -> Outcome {
        match self {
            Direction::Up if actual > predicted => Outcome::Correct,
            Direction::Down if actual < predicted => Outcome::Correct,
            Direction::Up | Direction::Down => Outcome::Incorrect,
            Direction::Sideways => Outcome::Unknown,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PredictionState {
    Open,
    Settled,
}

/// Inputs for opening a prediction
#[derive(Debug, Clone)]
pub struct NewPrediction {
    pub price: f64,
    pub horizon: Horizon,
    pub recommendation: Direction,
    pub reason: String,
    pub risk: RiskIndex,
    pub analysis_detail: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Prediction {
    pub id: Uuid,
    /// Creation time, ms since Unix epoch
    pub time: i64,
    pub price: f64,
    pub horizon: Horizon,
    pub recommendation: Direction,
    pub reason: String,
    pub risk: RiskIndex,
    pub analysis_detail: String,
    pub predicted_price: f64,
    pub end_time: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub actual_price: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub result: Option<Outcome>,
}

impl Prediction {
    pub fn open(new: NewPrediction, now_ms: i64) -> Self {
        Self {
            id: Uuid::new_v4(),
            time: now_ms,
            price: new.price,
            horizon: new.horizon,
            recommendation: new.recommendation,
            reason: new.reason,
            risk: new.risk,
            analysis_detail: new.analysis_detail,
            predicted_price: new.price,
            end_time: now_ms + new.horizon.as_millis(),
            actual_price: None,
            result: None,
        }
    }

    pub fn state(&self) -> PredictionState {
        if self.result.is_some() {
            PredictionState::Settled
        } else {
            PredictionState::Open
        }
    }

    pub fn is_due(&self, now_ms: i64) -> bool {
        self.state() == PredictionState::Open && now_ms >= self.end_time
    }

    /// Records the actual price and scores the prediction
    pub fn settle(&mut self, actual_price: f64, now_ms: i64) -> Result<Outcome, PredictionError> {
        if self.state() == PredictionState::Settled {
            return Err(PredictionError::AlreadySettled(self.id));
        }
        if now_ms < self.end_time {
            return Err(PredictionError::NotDue {
                id: self.id,
                end_time: self.end_time,
            });
        }

        let outcome = self.recommendation.score(self.predicted_price, actual_price);
        self.actual_price = Some(actual_price);
        self.result = Some(outcome);
        Ok(outcome)
    }
}
