use std::fmt::{Display, Formatter};

use serde::{Deserialize, Serialize};
use time::format_description::well_known::Rfc3339;
use time::OffsetDateTime;

/// Upstream timestamp in Unix epoch milliseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EpochMillis(i64);

impl EpochMillis {
    pub const fn new(millis: i64) -> Self {
        Self(millis)
    }

    pub fn now() -> Self {
        let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos();
        Self((nanos / 1_000_000) as i64)
    }

    pub const fn as_millis(self) -> i64 {
        self.0
    }

    pub fn to_offset_datetime(self) -> Option<OffsetDateTime> {
        OffsetDateTime::from_unix_timestamp_nanos(i128::from(self.0) * 1_000_000).ok()
    }

    /// RFC3339 UTC rendering, or `None` when the value is out of range.
    pub fn format_rfc3339(self) -> Option<String> {
        self.to_offset_datetime()
            .and_then(|value| value.format(&Rfc3339).ok())
    }
}

impl Display for EpochMillis {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self.format_rfc3339() {
            Some(formatted) => f.write_str(&formatted),
            None => write!(f, "{}ms", self.0),
        }
    }
}

impl From<i64> for EpochMillis {
    fn from(value: i64) -> Self {
        Self(value)
    }
}
