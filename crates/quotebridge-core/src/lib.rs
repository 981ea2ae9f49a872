//! # Quotebridge Core
//!
//! Client-side adapter that turns a loosely specified A-share market-data API
//! into stable quote and candle records for a frontend.
//!
//! ## Overview
//!
//! - **Symbol resolution**: `sh600519`, `000001`, ... to `{exchange, code}`
//! - **Quote normalization** with derived previous close, change and change percent
//! - **Batch fetch** with per-symbol failure isolation
//! - **Candles** passed through in upstream order
//! - **Detail view** with a synthetic five-level depth ladder
//! - **Connectivity probe** returning a plain boolean
//!
//! ## Modules
//!
//! | Module | Description |
//! |--------|-------------|
//! | [`adapter`] | [`QuoteAdapter`] and [`CandleRequest`] |
//! | [`config`] | Environment-driven [`AdapterConfig`] |
//! | [`domain`] | Records, symbols, intervals, depth ladder |
//! | [`envelope`] | Upstream `{code, msg, data}` envelope and field mapping |
//! | [`error`] | [`AdapterError`] and [`ValidationError`] |
//! | [`http_client`] | HTTP client abstraction |
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quotebridge_core::{AdapterConfig, QuoteAdapter};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let adapter = QuoteAdapter::new(AdapterConfig::from_env());
//!
//!     let quote = adapter.fetch_quote("600519").await?;
//!     println!("{} {:.2} ({:+.2}%)", quote.name, quote.current_price, quote.change_percent);
//!
//!     let quotes = adapter.fetch_batch(&["000001", "600519", "300750"]).await;
//!     println!("{} quotes", quotes.len());
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Error Handling
//!
//! ```rust
//! use quotebridge_core::{AdapterError, AdapterErrorKind};
//!
//! fn handle_error(error: AdapterError) {
//!     match error.kind() {
//!         AdapterErrorKind::InvalidSymbol => {
//!             // Ask the user for a different code
//!         }
//!         AdapterErrorKind::Upstream => {
//!             // Surface the upstream message
//!         }
//!         AdapterErrorKind::Transport => {
//!             // Safe to retry later
//!         }
//!     }
//! }
//! ```
//!
//! ## Approximations
//!
//! The upstream tier does not report a previous close, depth or valuation
//! data. `previous_close` is estimated from the open price, the depth ladder
//! in [`DetailRecord`] is synthetic (`is_synthetic: true`), and turnover rate
//! and valuation ratio are [`MetricValue::Unavailable`].

pub mod adapter;
pub mod config;
pub mod domain;
pub mod envelope;
pub mod error;
pub mod http_client;

pub use adapter::{CandleRequest, QuoteAdapter, DEFAULT_CANDLE_LIMIT};

pub use config::AdapterConfig;

pub use domain::{
    change_percent, estimate_previous_close, resolve, CandleRecord, DepthLadder, DepthLevel,
    DetailRecord, EpochMillis, Exchange, Interval, MetricValue, ParseIntervalError,
    PriceSnapshot, QuoteRecord, ResolvedSymbol, DEPTH_LEVELS, PREVIOUS_CLOSE_FACTOR, TICK_SIZE,
};

pub use envelope::Envelope;

pub use error::{AdapterError, AdapterErrorKind, ValidationError};

pub use http_client::{
    HttpAuth, HttpClient, HttpError, HttpRequest, HttpResponse, ReqwestHttpClient,
};
