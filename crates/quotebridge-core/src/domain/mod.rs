//! # Domain Models
//!
//! Canonical records produced by the adapter.
//!
//! | Type | Description |
//! |------|-------------|
//! | [`ResolvedSymbol`] | 6-digit code with its [`Exchange`] |
//! | [`QuoteRecord`] | Normalized quote with estimated previous close |
//! | [`CandleRecord`] | OHLCV bar |
//! | [`DetailRecord`] | Quote plus synthetic depth and unavailable metrics |
//! | [`DepthLadder`] | Five-level bid/ask ladder |
//! | [`Interval`] | Named candle periods and their upstream codes |
//! | [`EpochMillis`] | Upstream millisecond timestamp |
//!
//! Every record is an immutable value built per request. Nothing is cached.

mod depth;
mod interval;
mod models;
mod symbol;
mod timestamp;

pub use depth::{DepthLadder, DepthLevel, DEPTH_LEVELS, TICK_SIZE};
pub use interval::{Interval, ParseIntervalError};
pub use models::{
    change_percent, estimate_previous_close, CandleRecord, DetailRecord, MetricValue,
    PriceSnapshot, QuoteRecord, PREVIOUS_CLOSE_FACTOR,
};
pub use symbol::{resolve, Exchange, ResolvedSymbol};
pub use timestamp::EpochMillis;
