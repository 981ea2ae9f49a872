use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};

use crate::ValidationError;

const CODE_LEN: usize = 6;
const EXCHANGE_PREFIXES: [&str; 2] = ["sh", "sz"];

/// Venue a 6-digit A-share code trades on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Exchange {
    /// Primary venue. Also the fallback for unrecognized leading digits.
    Shanghai,
    /// Secondary venue.
    Shenzhen,
}

impl Exchange {
    /// Region code expected by the upstream `region` parameter.
    pub const fn region(self) -> &'static str {
        match self {
            Self::Shanghai => "SH",
            Self::Shenzhen => "SZ",
        }
    }

    fn from_code(code: &str) -> Self {
        match code.as_bytes().first() {
            Some(b'6') => Self::Shanghai,
            Some(b'0') | Some(b'3') => Self::Shenzhen,
            _ => Self::Shanghai,
        }
    }
}

impl Display for Exchange {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.region())
    }
}

/// Symbol resolved to the upstream `{region, code}` encoding.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ResolvedSymbol {
    exchange: Exchange,
    code: String,
}

impl ResolvedSymbol {
    /// Strip an optional `sh`/`sz` prefix (any case) and require exactly six
    /// ASCII digits. The exchange is derived from the leading digit only; a
    /// prefix hint never overrides it. Surrounding whitespace is rejected.
    pub fn parse(input: &str) -> Result<Self, ValidationError> {
        if input.is_empty() {
            return Err(ValidationError::EmptySymbol);
        }

        let code = strip_exchange_prefix(input);
        let is_valid =
            code.len() == CODE_LEN && code.bytes().all(|byte| byte.is_ascii_digit());
        if !is_valid {
            return Err(ValidationError::SymbolNotSixDigits {
                value: input.to_owned(),
            });
        }

        Ok(Self {
            exchange: Exchange::from_code(code),
            code: code.to_owned(),
        })
    }

    pub const fn exchange(&self) -> Exchange {
        self.exchange
    }

    pub fn code(&self) -> &str {
        &self.code
    }
}

/// Resolve a raw ticker to its exchange and 6-digit code.
pub fn resolve(symbol: &str) -> Result<ResolvedSymbol, ValidationError> {
    ResolvedSymbol::parse(symbol)
}

fn strip_exchange_prefix(input: &str) -> &str {
    match input.get(..2) {
        Some(head)
            if EXCHANGE_PREFIXES
                .iter()
                .any(|prefix| head.eq_ignore_ascii_case(prefix)) =>
        {
            &input[2..]
        }
        _ => input,
    }
}

impl Display for ResolvedSymbol {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}{}", self.exchange.region(), self.code)
    }
}

impl TryFrom<String> for ResolvedSymbol {
    type Error = ValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl TryFrom<&str> for ResolvedSymbol {
    type Error = ValidationError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        Self::parse(value)
    }
}

impl From<ResolvedSymbol> for String {
    fn from(value: ResolvedSymbol) -> Self {
        value.to_string()
    }
}
