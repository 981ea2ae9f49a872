use thiserror::Error;

use crate::http_client::HttpError;

/// Input validation errors raised before any upstream call is made.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("symbol cannot be empty")]
    EmptySymbol,
    #[error("symbol must be exactly 6 digits after removing an exchange prefix: '{value}'")]
    SymbolNotSixDigits { value: String },
}

/// Coarse classification used by callers to decide how to react to a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdapterErrorKind {
    InvalidSymbol,
    Upstream,
    Transport,
}

/// Failure surfaced by [`QuoteAdapter`](crate::QuoteAdapter) operations.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AdapterError {
    /// Malformed caller input. Not retryable; the caller must fix the symbol.
    #[error("invalid symbol: {0}")]
    InvalidSymbol(#[from] ValidationError),

    /// The upstream answered but reported a failure or sent a malformed envelope.
    #[error("upstream error: {message}")]
    Upstream { message: String },

    /// Network, timeout or HTTP-status failure. Not retryable when the request
    /// could not be built or the upstream answered with a client-error status
    /// other than 408/429.
    #[error("transport error: {message}")]
    Transport { message: String, retryable: bool },
}

impl AdapterError {
    pub fn upstream(message: impl Into<String>) -> Self {
        Self::Upstream {
            message: message.into(),
        }
    }

    pub fn transport(message: impl Into<String>) -> Self {
        Self::Transport {
            message: message.into(),
            retryable: true,
        }
    }

    pub const fn kind(&self) -> AdapterErrorKind {
        match self {
            Self::InvalidSymbol(_) => AdapterErrorKind::InvalidSymbol,
            Self::Upstream { .. } => AdapterErrorKind::Upstream,
            Self::Transport { .. } => AdapterErrorKind::Transport,
        }
    }

    pub const fn code(&self) -> &'static str {
        match self {
            Self::InvalidSymbol(_) => "adapter.invalid_symbol",
            Self::Upstream { .. } => "adapter.upstream",
            Self::Transport { .. } => "adapter.transport",
        }
    }

    pub const fn retryable(&self) -> bool {
        match self {
            Self::Transport { retryable, .. } => *retryable,
            _ => false,
        }
    }

    /// Message reported by the upstream, when this is an upstream failure.
    pub fn upstream_message(&self) -> Option<&str> {
        match self {
            Self::Upstream { message } => Some(message),
            _ => None,
        }
    }
}

impl From<HttpError> for AdapterError {
    fn from(error: HttpError) -> Self {
        Self::Transport {
            message: error.message().to_owned(),
            retryable: error.retryable(),
        }
    }
}
