//! Latest-price tracking
//!
//! A [`PriceFeed`] holds the most recent [`PriceSample`]. Writers are the
//! poller and the WebSocket stream; readers are the HTTP handlers and the
//! settlement sweep. The most recent write wins.

pub mod poller;

use crate::types::PriceSample;
use std::sync::Arc;
use tokio::sync::watch;

pub use poller::{spawn_price_task, PriceMode};

#[derive(Debug, Clone)]
pub struct PriceFeed {
    tx: Arc<watch::Sender<Option<PriceSample>>>,
}

impl PriceFeed {
    pub fn new() -> Self {
        let (tx, _rx) = watch::channel(None);
        Self { tx: Arc::new(tx) }
    }

    /// Replaces the current sample
    pub fn publish(&self, sample: PriceSample) {
        self.tx.send_replace(Some(sample));
    }

    pub fn latest(&self) -> Option<PriceSample> {
        *self.tx.borrow()
    }

    /// Receiver notified on every publish
    pub fn subscribe(&self) -> watch::Receiver<Option<PriceSample>> {
        self.tx.subscribe()
    }
}

impl Default for PriceFeed {
    fn default() -> Self {
        Self::new()
    }
}
