//! In-memory prediction history for the process lifetime

use super::{Outcome, Prediction, PredictionState};
use std::sync::{Arc, Mutex};
use uuid::Uuid;

pub type SharedBook = Arc<Mutex<PredictionBook>>;

#[derive(Debug, Default)]
pub struct PredictionBook {
    predictions: Vec<Prediction>,
}

impl PredictionBook {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn shared() -> SharedBook {
        Arc::new(Mutex::new(Self::new()))
    }

    pub fn insert(&mut self, prediction: Prediction) {
        self.predictions.push(prediction);
    }

    /// Every prediction in creation order
    pub fn list(&self) -> &[Prediction] {
        &self.predictions
    }

    pub fn get(&self, id: Uuid) -> Option<&Prediction> {
        self.predictions.iter().find(|p| p.id == id)
    }

    pub fn open_count(&self) -> usize {
        self.predictions
            .iter()
            .filter(|p| p.state() == PredictionState::Open)
            .count()
    }

    /// Settles every open prediction whose end time has passed
    ///
    /// Without a current price nothing is settled.
    pub fn settle_due(&mut self, now_ms: i64, price: Option<f64>) -> Vec<(Uuid, Outcome)> {
        let Some(price) = price else {
            return Vec::new();
        };

        self.predictions
            .iter_mut()
            .filter(|p| p.is_due(now_ms))
            .filter_map(|p| p.settle(price, now_ms).ok().map(|outcome| (p.id, outcome)))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::RiskIndex;
    use crate::prediction::{Direction, Horizon, NewPrediction};

    fn open(book: &mut PredictionBook, horizon: Horizon, direction: Direction, now: i64) -> Uuid {
        let p = Prediction::open(
            NewPrediction {
                price: 100.0,
                horizon,
                recommendation: direction,
                reason: String::new(),
                risk: RiskIndex::Medium,
                analysis_detail: String::new(),
            },
            now,
        );
        let id = p.id;
        book.insert(p);
        id
    }

    #[test]
    fn test_settle_due_only_touches_expired() {
        let mut book = PredictionBook::new();
        let short = open(&mut book, Horizon::TenMinutes, Direction::Up, 0);
        let long = open(&mut book, Horizon::OneHour, Direction::Up, 0);

        let settled = book.settle_due(Horizon::TenMinutes.as_millis(), Some(105.0));
        assert_eq!(settled, vec![(short, Outcome::Correct)]);
        assert_eq!(book.open_count(), 1);
        assert_eq!(book.get(long).unwrap().state(), PredictionState::Open);
    }

    #[test]
    fn test_settle_due_needs_a_price() {
        let mut book = PredictionBook::new();
        open(&mut book, Horizon::TenMinutes, Direction::Down, 0);
        assert!(book.settle_due(i64::MAX, None).is_empty());
        assert_eq!(book.open_count(), 1);
    }

    #[test]
    fn test_settled_predictions_are_not_resettled() {
        let mut book = PredictionBook::new();
        let id = open(&mut book, Horizon::TenMinutes, Direction::Down, 0);
        book.settle_due(600_000, Some(95.0));
        assert!(book.settle_due(700_000, Some(200.0)).is_empty());
        let p = book.get(id).unwrap();
        assert_eq!(p.actual_price, Some(95.0));
        assert_eq!(p.result, Some(Outcome::Correct));
        assert_eq!(book.list().len(), 1);
    }
}
