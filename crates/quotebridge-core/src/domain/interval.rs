use std::fmt::{Display, Formatter};
use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Candle periods understood by the upstream `kType` parameter.
///
/// The adapter itself forwards any code verbatim; this enum only names the
/// documented ones.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Interval {
    #[serde(rename = "1m")]
    OneMinute,
    #[serde(rename = "5m")]
    FiveMinutes,
    #[serde(rename = "15m")]
    FifteenMinutes,
    #[serde(rename = "30m")]
    ThirtyMinutes,
    #[serde(rename = "1h")]
    OneHour,
    #[serde(rename = "2h")]
    TwoHours,
    #[serde(rename = "4h")]
    FourHours,
    #[default]
    #[serde(rename = "1d")]
    OneDay,
    #[serde(rename = "1w")]
    OneWeek,
    #[serde(rename = "1mo")]
    OneMonth,
}

impl Interval {
    pub const ALL: [Self; 10] = [
        Self::OneMinute,
        Self::FiveMinutes,
        Self::FifteenMinutes,
        Self::ThirtyMinutes,
        Self::OneHour,
        Self::TwoHours,
        Self::FourHours,
        Self::OneDay,
        Self::OneWeek,
        Self::OneMonth,
    ];

    pub const fn as_str(self) -> &'static str {
        match self {
            Self::OneMinute => "1m",
            Self::FiveMinutes => "5m",
            Self::FifteenMinutes => "15m",
            Self::ThirtyMinutes => "30m",
            Self::OneHour => "1h",
            Self::TwoHours => "2h",
            Self::FourHours => "4h",
            Self::OneDay => "1d",
            Self::OneWeek => "1w",
            Self::OneMonth => "1mo",
        }
    }

    /// Upstream `kType` code.
    pub const fn code(self) -> &'static str {
        match self {
            Self::OneMinute => "1",
            Self::FiveMinutes => "2",
            Self::FifteenMinutes => "3",
            Self::ThirtyMinutes => "4",
            Self::OneHour => "5",
            Self::TwoHours => "6",
            Self::FourHours => "7",
            Self::OneDay => "8",
            Self::OneWeek => "9",
            Self::OneMonth => "10",
        }
    }
}

impl Display for Interval {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Unrecognized interval label.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid interval '{value}', expected one of 1m, 5m, 15m, 30m, 1h, 2h, 4h, 1d, 1w, 1mo")]
pub struct ParseIntervalError {
    value: String,
}

impl FromStr for Interval {
    type Err = ParseIntervalError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let normalized = value.trim().to_ascii_lowercase();
        Self::ALL
            .into_iter()
            .find(|interval| interval.as_str() == normalized)
            .ok_or(ParseIntervalError { value: normalized })
    }
}
