use std::ops::Range;

use serde::{Deserialize, Serialize};

/// Minimum price increment for A-share equities.
pub const TICK_SIZE: f64 = 0.01;
pub const DEPTH_LEVELS: u8 = 5;
const VOLUME_RANGE: Range<u64> = 100..1_100;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DepthLevel {
    pub level: u8,
    pub price: f64,
    pub volume: u64,
}

/// Five-level bid/ask ladder.
///
/// Ladders built by [`DepthLadder::synthetic`] are fabricated for display and
/// carry `is_synthetic: true`; they are not observed market depth.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthLadder {
    pub is_synthetic: bool,
    pub bids: Vec<DepthLevel>,
    pub asks: Vec<DepthLevel>,
}

impl DepthLadder {
    /// Bids at `price - TICK_SIZE * n` and asks at `price + TICK_SIZE * n` for
    /// `n` in `1..=5`, each with a random volume in `100..1100`.
    pub fn synthetic(price: f64, rng: &mut fastrand::Rng) -> Self {
        let mut level = |n: u8, sign: f64| DepthLevel {
            level: n,
            price: price + sign * TICK_SIZE * f64::from(n),
            volume: rng.u64(VOLUME_RANGE),
        };

        let mut bids = Vec::with_capacity(usize::from(DEPTH_LEVELS));
        let mut asks = Vec::with_capacity(usize::from(DEPTH_LEVELS));
        for n in 1..=DEPTH_LEVELS {
            bids.push(level(n, -1.0));
            asks.push(level(n, 1.0));
        }

        Self {
            is_synthetic: true,
            bids,
            asks,
        }
    }

    /// Bid at 1-based `level`.
    pub fn bid(&self, level: u8) -> Option<&DepthLevel> {
        self.bids.iter().find(|entry| entry.level == level)
    }

    /// Ask at 1-based `level`.
    pub fn ask(&self, level: u8) -> Option<&DepthLevel> {
        self.asks.iter().find(|entry| entry.level == level)
    }
}
