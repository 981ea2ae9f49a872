//! Adapter configuration.
//!
//! Values are read from the environment by [`AdapterConfig::from_env`] and can
//! be overridden with the `with_*` setters.
//!
//! | Variable | Default |
//! |----------|---------|
//! | `QUOTEBRIDGE_BASE_URL` | `https://api.itick.org` |
//! | `QUOTEBRIDGE_API_TOKEN` | `demo` |
//! | `QUOTEBRIDGE_TIMEOUT_MS` | `10000` |
//! | `QUOTEBRIDGE_PROBE_SYMBOL` | `000001` |

use std::fmt::{Debug, Formatter};

use crate::http_client::HttpAuth;

pub const DEFAULT_BASE_URL: &str = "https://api.itick.org";
pub const DEFAULT_TIMEOUT_MS: u64 = 10_000;
pub const DEFAULT_PROBE_SYMBOL: &str = "000001";
const TOKEN_HEADER: &str = "token";

#[derive(Clone, PartialEq, Eq)]
pub struct AdapterConfig {
    pub base_url: String,
    pub token: String,
    pub timeout_ms: u64,
    pub probe_symbol: String,
}

impl Default for AdapterConfig {
    fn default() -> Self {
        Self {
            base_url: String::from(DEFAULT_BASE_URL),
            token: String::from("demo"),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            probe_symbol: String::from(DEFAULT_PROBE_SYMBOL),
        }
    }
}

impl AdapterConfig {
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            base_url: std::env::var("QUOTEBRIDGE_BASE_URL").unwrap_or(defaults.base_url),
            token: std::env::var("QUOTEBRIDGE_API_TOKEN").unwrap_or(defaults.token),
            timeout_ms: std::env::var("QUOTEBRIDGE_TIMEOUT_MS")
                .ok()
                .and_then(|value| value.trim().parse().ok())
                .filter(|value| *value > 0)
                .unwrap_or(defaults.timeout_ms),
            probe_symbol: std::env::var("QUOTEBRIDGE_PROBE_SYMBOL")
                .unwrap_or(defaults.probe_symbol),
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// A zero timeout would fail every request, so it falls back to the default.
    pub fn with_timeout_ms(mut self, timeout_ms: u64) -> Self {
        self.timeout_ms = if timeout_ms > 0 {
            timeout_ms
        } else {
            DEFAULT_TIMEOUT_MS
        };
        self
    }

    pub fn with_probe_symbol(mut self, probe_symbol: impl Into<String>) -> Self {
        self.probe_symbol = probe_symbol.into();
        self
    }

    /// Endpoint URL for an upstream path such as `/stock/quote`.
    pub fn endpoint(&self, path: &str) -> String {
        format!("{}{}", self.base_url.trim_end_matches('/'), path)
    }

    pub fn auth(&self) -> HttpAuth {
        if self.token.is_empty() {
            return HttpAuth::None;
        }
        HttpAuth::Header {
            name: String::from(TOKEN_HEADER),
            value: self.token.clone(),
        }
    }
}

impl Debug for AdapterConfig {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AdapterConfig")
            .field("base_url", &self.base_url)
            .field("token", &"<redacted>")
            .field("timeout_ms", &self.timeout_ms)
            .field("probe_symbol", &self.probe_symbol)
            .finish()
    }
}
