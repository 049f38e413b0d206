//! Support/resistance heuristic
//!
//! Sets the direction of every prediction. A price at or below support is
//! expected to bounce and one at or above resistance to pull back. Anything
//! between is a sideways call.

use super::RiskIndex;
use crate::prediction::Direction;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdConfig {
    pub support: f64,
    pub resistance: f64,
}

impl Default for ThresholdConfig {
    fn default() -> Self {
        Self {
            support: 94_200.0,
            resistance: 94_800.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdSignal {
    pub direction: Direction,
    pub reason: &'static str,
    pub risk: RiskIndex,
}

impl ThresholdConfig {
    pub fn assess(&self, price: f64) -> ThresholdSignal {
        if price <= self.support {
            ThresholdSignal {
                direction: Direction::Up,
                reason: "price is near intraday support, likely to rebound",
                risk: RiskIndex::Low,
            }
        } else if price >= self.resistance {
            ThresholdSignal {
                direction: Direction::Down,
                reason: "price is near resistance, likely to pull back",
                risk: RiskIndex::Medium,
            }
        } else {
            ThresholdSignal {
                direction: Direction::Sideways,
                reason: "price is in the neutral range, direction unclear",
                risk: RiskIndex::High,
            }
        }
    }
}
