use serde::{Deserialize, Serialize};

use crate::{DepthLadder, EpochMillis, ResolvedSymbol};

/// Factor applied to the open (or current) price to approximate the previous
/// close, which the upstream does not report.
pub const PREVIOUS_CLOSE_FACTOR: f64 = 0.99;

/// Prices and volumes read from one upstream quote, after defaults were applied.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PriceSnapshot {
    pub current: f64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub volume: f64,
    pub turnover: f64,
}

/// Canonical normalized quote.
///
/// `previous_close` is an **estimate** (see [`estimate_previous_close`]) and
/// `change`/`change_percent` inherit that approximation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct QuoteRecord {
    /// Symbol exactly as the caller supplied it.
    pub symbol: String,
    pub resolved: ResolvedSymbol,
    pub name: String,
    pub current_price: f64,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub volume: f64,
    pub turnover: f64,
    pub previous_close: f64,
    pub change: f64,
    pub change_percent: f64,
    pub timestamp: EpochMillis,
    /// Upstream `data` object, kept for debugging.
    pub raw_payload: serde_json::Value,
}

impl QuoteRecord {
    pub fn new(
        symbol: impl Into<String>,
        resolved: ResolvedSymbol,
        name: impl Into<String>,
        prices: PriceSnapshot,
        timestamp: EpochMillis,
        raw_payload: serde_json::Value,
    ) -> Self {
        let previous_close = estimate_previous_close(prices.open, prices.current);
        let change = prices.current - previous_close;

        Self {
            symbol: symbol.into(),
            resolved,
            name: name.into(),
            current_price: prices.current,
            open_price: prices.open,
            high_price: prices.high,
            low_price: prices.low,
            volume: prices.volume,
            turnover: prices.turnover,
            previous_close,
            change,
            change_percent: change_percent(change, previous_close),
            timestamp,
            raw_payload,
        }
    }
}

/// `open × 0.99`, or `current × 0.99` when no positive open is known.
pub fn estimate_previous_close(open: f64, current: f64) -> f64 {
    if open > 0.0 {
        open * PREVIOUS_CLOSE_FACTOR
    } else {
        current * PREVIOUS_CLOSE_FACTOR
    }
}

pub fn change_percent(change: f64, previous_close: f64) -> f64 {
    if previous_close > 0.0 {
        change / previous_close * 100.0
    } else {
        0.0
    }
}

/// One OHLCV bar, in the order the upstream returned it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CandleRecord {
    pub timestamp: EpochMillis,
    pub open_price: f64,
    pub high_price: f64,
    pub low_price: f64,
    pub close_price: f64,
    pub volume: f64,
    pub turnover: f64,
}

impl CandleRecord {
    /// Bar time as RFC3339 UTC.
    pub fn time(&self) -> Option<String> {
        self.timestamp.format_rfc3339()
    }
}

/// Field the upstream tier cannot supply.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(tag = "status", content = "value", rename_all = "snake_case")]
pub enum MetricValue {
    Available(f64),
    Unavailable,
}

impl MetricValue {
    pub const fn value(self) -> Option<f64> {
        match self {
            Self::Available(value) => Some(value),
            Self::Unavailable => None,
        }
    }
}

/// Quote plus a display-only order book and the fields the upstream lacks.
///
/// `depth` is synthetic and `amount` is estimated as `volume × current`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DetailRecord {
    #[serde(flatten)]
    pub quote: QuoteRecord,
    pub amount: f64,
    pub depth: DepthLadder,
    pub turnover_rate: MetricValue,
    pub valuation_ratio: MetricValue,
}

impl DetailRecord {
    pub fn new(quote: QuoteRecord, depth: DepthLadder) -> Self {
        Self {
            amount: quote.volume * quote.current_price,
            quote,
            depth,
            turnover_rate: MetricValue::Unavailable,
            valuation_ratio: MetricValue::Unavailable,
        }
    }
}
