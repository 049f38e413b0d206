//! Periodic settlement sweep
//!
//! `tick` is the whole sweep and reads time from the injected clock, so tests
//! call it directly. `run` only adds the interval timer and shutdown.

use super::{Outcome, SharedBook};
use crate::clock::SharedClock;
use crate::price::PriceFeed;
use std::time::Duration;
use tokio::sync::broadcast;
use uuid::Uuid;

pub const DEFAULT_SETTLE_EVERY: Duration = Duration::from_secs(1);

pub struct SettlementTask {
    book: SharedBook,
    feed: PriceFeed,
    clock: SharedClock,
    every: Duration,
}

impl SettlementTask {
    pub fn new(book: SharedBook, feed: PriceFeed, clock: SharedClock, every: Duration) -> Self {
        Self {
            book,
            feed,
            clock,
            every,
        }
    }

    /// One sweep over all open predictions
    pub fn tick(&self) -> Vec<(Uuid, Outcome)> {
        let now = self.clock.now_ms();
        let price = self.feed.latest().map(|s| s.price);

        let settled = {
            let mut book = self.book.lock().unwrap_or_else(|e| e.into_inner());
            book.settle_due(now, price)
        };

        for (id, outcome) in &settled {
            tracing::info!(prediction = %id, outcome = ?outcome, price = ?price, "Prediction settled");
        }
        settled
    }

    pub async fn run(self, mut shutdown: broadcast::Receiver<()>) {
        let mut ticker = tokio::time::interval(self.every);
        ticker.set_missed_tick_behavior(tokio::time::MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    self.tick();
                }
                _ = shutdown.recv() => {
                    tracing::info!("Settlement sweep stopped");
                    return;
                }
            }
        }
    }
}
