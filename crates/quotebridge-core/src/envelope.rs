//! Upstream response envelope and payload normalization.
//!
//! Every upstream response is wrapped as `{code, msg, data}` where `code == 0`
//! means success. Quote payload field mapping:
//!
//! | Upstream | Record field |
//! |----------|--------------|
//! | `ld` (last) | `current_price` |
//! | `o` | `open_price` |
//! | `h` | `high_price` |
//! | `l` | `low_price` |
//! | `v` | `volume` |
//! | `tu` | `turnover` |
//! | `t` | `timestamp` |
//! | `name`, then `stock_name` | `name` |
//!
//! Candle bars map `t, o, h, l, c, v, tu` onto [`CandleRecord`]. Numbers may
//! arrive as JSON numbers or as numeric strings.

use serde::{Deserialize, Deserializer};
use serde_json::Value;

use crate::{AdapterError, CandleRecord, EpochMillis, PriceSnapshot, QuoteRecord, ResolvedSymbol};

const UNKNOWN_ERROR: &str = "unknown error";

/// Outer wrapper of every upstream response.
#[derive(Debug, Clone, Deserialize)]
pub struct Envelope {
    pub code: i64,
    #[serde(default)]
    pub msg: Option<String>,
    #[serde(default)]
    pub data: Value,
}

impl Envelope {
    pub fn parse(body: &str) -> Result<Self, AdapterError> {
        serde_json::from_str(body).map_err(|error| {
            AdapterError::upstream(format!("malformed response envelope: {error}"))
        })
    }

    pub const fn is_success(&self) -> bool {
        self.code == 0
    }

    /// Payload of a successful envelope, or the upstream failure message.
    pub fn into_data(self) -> Result<Value, AdapterError> {
        if self.is_success() {
            return Ok(self.data);
        }

        let message = self
            .msg
            .filter(|msg| !msg.trim().is_empty())
            .unwrap_or_else(|| String::from(UNKNOWN_ERROR));
        Err(AdapterError::upstream(message))
    }
}

#[derive(Debug, Clone, Deserialize)]
struct QuotePayload {
    #[serde(default, deserialize_with = "lenient_f64")]
    ld: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    o: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    l: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    v: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    tu: Option<f64>,
    #[serde(default, deserialize_with = "lenient_i64")]
    t: Option<i64>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    stock_name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
struct BarPayload {
    #[serde(default, deserialize_with = "lenient_i64")]
    t: Option<i64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    o: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    h: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    l: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    c: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    v: Option<f64>,
    #[serde(default, deserialize_with = "lenient_f64")]
    tu: Option<f64>,
}

/// Map a quote `data` object onto a [`QuoteRecord`].
///
/// Absent, empty or zero prices fall back: `ld` to 0, `o`/`h`/`l` to the
/// current price. Volume and turnover default to 0, the name to
/// `"Stock {code}"` and the timestamp to now.
pub fn normalize_quote(
    symbol: &str,
    resolved: ResolvedSymbol,
    data: Value,
) -> Result<QuoteRecord, AdapterError> {
    if data.is_null() {
        return Err(AdapterError::upstream("quote payload is empty"));
    }

    let payload = QuotePayload::deserialize(&data)
        .map_err(|error| AdapterError::upstream(format!("malformed quote payload: {error}")))?;

    let current = payload.ld.unwrap_or(0.0);
    let prices = PriceSnapshot {
        current,
        open: non_zero(payload.o).unwrap_or(current),
        high: non_zero(payload.h).unwrap_or(current),
        low: non_zero(payload.l).unwrap_or(current),
        volume: payload.v.unwrap_or(0.0),
        turnover: payload.tu.unwrap_or(0.0),
    };

    let name = [payload.name, payload.stock_name]
        .into_iter()
        .flatten()
        .find(|name| !name.trim().is_empty())
        .unwrap_or_else(|| format!("Stock {}", resolved.code()));

    let timestamp = payload
        .t
        .filter(|t| *t != 0)
        .map(EpochMillis::new)
        .unwrap_or_else(EpochMillis::now);

    Ok(QuoteRecord::new(symbol, resolved, name, prices, timestamp, data))
}

/// Map a candle `data` array onto records, preserving upstream order.
pub fn normalize_candles(data: Value) -> Result<Vec<CandleRecord>, AdapterError> {
    let bars = match data {
        Value::Null => return Ok(Vec::new()),
        Value::Array(bars) => bars,
        other => {
            return Err(AdapterError::upstream(format!(
                "malformed candle payload: expected an array, got {}",
                json_type(&other)
            )))
        }
    };

    bars.iter()
        .enumerate()
        .map(|(index, bar)| {
            let payload = BarPayload::deserialize(bar).map_err(|error| {
                AdapterError::upstream(format!("malformed candle bar at index {index}: {error}"))
            })?;

            Ok(CandleRecord {
                timestamp: EpochMillis::new(payload.t.unwrap_or(0)),
                open_price: payload.o.unwrap_or(0.0),
                high_price: payload.h.unwrap_or(0.0),
                low_price: payload.l.unwrap_or(0.0),
                close_price: payload.c.unwrap_or(0.0),
                volume: payload.v.unwrap_or(0.0),
                turnover: payload.tu.unwrap_or(0.0),
            })
        })
        .collect()
}

fn non_zero(value: Option<f64>) -> Option<f64> {
    value.filter(|value| *value != 0.0)
}

fn json_type(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

fn number_from_value(value: &Value) -> Option<f64> {
    let number = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    number.filter(|number| number.is_finite())
}

fn lenient_f64<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(number_from_value))
}

fn lenient_i64<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<Value>::deserialize(deserializer)?;
    Ok(value.as_ref().and_then(|value| match value {
        Value::Number(number) => number.as_i64().or_else(|| number.as_f64().map(|n| n as i64)),
        other => number_from_value(other).map(|n| n as i64),
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn moutai() -> ResolvedSymbol {
        ResolvedSymbol::parse("600519").expect("valid symbol")
    }

    #[test]
    fn non_zero_code_carries_upstream_message() {
        let envelope = Envelope::parse(r#"{"code":-1,"msg":"rate limited"}"#).expect("parse");
        let error = envelope.into_data().expect_err("must fail");
        assert_eq!(error.upstream_message(), Some("rate limited"));
    }

    #[test]
    fn missing_message_becomes_unknown_error() {
        let envelope = Envelope::parse(r#"{"code":3}"#).expect("parse");
        let error = envelope.into_data().expect_err("must fail");
        assert_eq!(error.upstream_message(), Some("unknown error"));
    }

    #[test]
    fn envelope_without_code_is_malformed() {
        let error = Envelope::parse(r#"{"data":{}}"#).expect_err("must fail");
        assert!(matches!(error, AdapterError::Upstream { .. }));

        let error = Envelope::parse("<html>bad gateway</html>").expect_err("must fail");
        assert!(matches!(error, AdapterError::Upstream { .. }));
    }

    #[test]
    fn quote_fields_map_from_short_codes() {
        let data = json!({
            "ld": "10.50", "o": "10.00", "h": 10.8, "l": "9.95",
            "v": "1000", "tu": 10500.0, "t": 1704067200000_i64, "name": "Moutai"
        });
        let quote = normalize_quote("600519", moutai(), data.clone()).expect("normalize");

        assert_eq!(quote.current_price, 10.5);
        assert_eq!(quote.open_price, 10.0);
        assert_eq!(quote.high_price, 10.8);
        assert_eq!(quote.low_price, 9.95);
        assert_eq!(quote.volume, 1000.0);
        assert_eq!(quote.turnover, 10500.0);
        assert_eq!(quote.timestamp, EpochMillis::new(1_704_067_200_000));
        assert_eq!(quote.name, "Moutai");
        assert_eq!(quote.raw_payload, data);
    }

    #[test]
    fn missing_fields_use_documented_defaults() {
        let quote = normalize_quote("sh600519", moutai(), json!({ "ld": 12.0 })).expect("normalize");

        assert_eq!(quote.symbol, "sh600519");
        assert_eq!(quote.open_price, 12.0);
        assert_eq!(quote.high_price, 12.0);
        assert_eq!(quote.low_price, 12.0);
        assert_eq!(quote.volume, 0.0);
        assert_eq!(quote.turnover, 0.0);
        assert_eq!(quote.name, "Stock 600519");
        assert!(quote.timestamp.as_millis() > 0);
    }

    #[test]
    fn stock_name_is_used_when_name_is_blank() {
        let data = json!({ "ld": 1.0, "name": "", "stock_name": "Ping An Bank" });
        let quote = normalize_quote("000001", moutai(), data).expect("normalize");
        assert_eq!(quote.name, "Ping An Bank");
    }

    #[test]
    fn unparseable_price_is_treated_as_missing() {
        let quote = normalize_quote("600519", moutai(), json!({ "ld": "--" })).expect("normalize");
        assert_eq!(quote.current_price, 0.0);
        assert_eq!(quote.previous_close, 0.0);
        assert_eq!(quote.change_percent, 0.0);
    }

    #[test]
    fn null_quote_payload_is_an_upstream_error() {
        let error = normalize_quote("600519", moutai(), Value::Null).expect_err("must fail");
        assert!(matches!(error, AdapterError::Upstream { .. }));
    }

    #[test]
    fn candles_preserve_upstream_order_and_duplicates() {
        let data = json!([
            { "t": 3000, "o": 1.0, "h": 2.0, "l": 0.5, "c": 1.5, "v": 10, "tu": 15 },
            { "t": 1000, "o": "1.1", "h": "2.1", "l": "0.6", "c": "1.6", "v": "11", "tu": "16" },
            { "t": 1000, "o": 1.1, "h": 2.1, "l": 0.6, "c": 1.6, "v": 11, "tu": 16 }
        ]);
        let candles = normalize_candles(data).expect("normalize");

        let stamps: Vec<i64> = candles.iter().map(|c| c.timestamp.as_millis()).collect();
        assert_eq!(stamps, vec![3000, 1000, 1000]);
        assert_eq!(candles[1].close_price, 1.6);
        assert_eq!(candles[1].turnover, 16.0);
    }

    #[test]
    fn null_candle_payload_is_empty_series() {
        assert!(normalize_candles(Value::Null).expect("normalize").is_empty());
    }

    #[test]
    fn non_array_candle_payload_is_rejected() {
        let error = normalize_candles(json!({ "t": 1 })).expect_err("must fail");
        assert!(error.to_string().contains("expected an array"));
    }
}
