//! Scalar kinds. All forward transforms are total except `array`; coercion
//! failures surface as `Value::NaN` rather than errors.

use crate::{transform::TransformError, value::Value};
use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde_json::{Number, Value as JsonValue};

const NAIVE_DATE_TIME_FORMATS: [&str; 3] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S",
];

// Largest magnitude an f64 can hold while still converting into i64 exactly.
const I64_SAFE_F64: f64 = 9_007_199_254_740_992.0;

/// Integer coercion: numbers truncate toward zero, strings parse their
/// leading decimal digits, everything else becomes NaN.
#[must_use]
pub fn int(raw: &JsonValue) -> Value {
    match raw {
        JsonValue::Number(n) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map_or(Value::NaN, truncate),
        },
        JsonValue::String(s) => leading_int(s),
        _ => Value::NaN,
    }
}

#[allow(clippy::cast_possible_truncation)]
fn truncate(f: f64) -> Value {
    if f.is_finite() && f.abs() <= I64_SAFE_F64 {
        Value::Int(f.trunc() as i64)
    } else {
        Value::NaN
    }
}

fn leading_int(s: &str) -> Value {
    let s = s.trim_start();
    let (sign, digits) = match s.as_bytes().first() {
        Some(b'-') => ("-", &s[1..]),
        Some(b'+') => ("", &s[1..]),
        _ => ("", s),
    };

    let end = digits
        .bytes()
        .position(|b| !b.is_ascii_digit())
        .unwrap_or(digits.len());
    if end == 0 {
        return Value::NaN;
    }

    format!("{sign}{}", &digits[..end])
        .parse::<i64>()
        .map_or(Value::NaN, Value::Int)
}

/// String coercion; null stays null.
#[must_use]
pub fn text(raw: &JsonValue) -> Value {
    match raw {
        JsonValue::Null => Value::Null,
        other => Value::Text(stringify(other)),
    }
}

fn stringify(raw: &JsonValue) -> String {
    match raw {
        JsonValue::Null => String::new(),
        JsonValue::Bool(b) => b.to_string(),
        JsonValue::Number(n) => number_text(n),
        JsonValue::String(s) => s.clone(),
        JsonValue::Array(items) => items.iter().map(stringify).collect::<Vec<_>>().join(","),
        JsonValue::Object(_) => "[object Object]".to_string(),
    }
}

// Integral floats print without a fractional part; `-0` prints as `0`.
fn number_text(n: &Number) -> String {
    match n.as_f64() {
        Some(f) if n.is_f64() && f.is_finite() && f.fract() == 0.0 => {
            if f == 0.0 {
                "0".to_string()
            } else {
                format!("{f:.0}")
            }
        }
        _ => n.to_string(),
    }
}

/// Truthiness.
#[must_use]
pub fn boolean(raw: &JsonValue) -> Value {
    let truthy = match raw {
        JsonValue::Null => false,
        JsonValue::Bool(b) => *b,
        JsonValue::Number(n) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        JsonValue::String(s) => !s.is_empty(),
        JsonValue::Array(_) | JsonValue::Object(_) => true,
    };

    Value::Bool(truthy)
}

/// Sequences pass through; keyed maps yield their values in order.
pub fn array(raw: &JsonValue) -> Result<Value, TransformError> {
    match raw {
        JsonValue::Array(items) => Ok(Value::List(items.clone())),
        JsonValue::Object(map) => Ok(Value::List(map.values().cloned().collect())),
        other => Err(TransformError::unsupported("array", other)),
    }
}

/// Opaque deep copy.
#[must_use]
pub fn object(raw: &JsonValue) -> Value {
    Value::Json(raw.clone())
}

/// Date-time coercion. Strings are RFC 3339 or naive UTC forms, numbers are
/// epoch milliseconds; unparseable input is an invalid date (NaN).
#[must_use]
pub fn date(raw: &JsonValue) -> Value {
    match raw {
        JsonValue::Null => Value::Null,
        JsonValue::String(s) => parse_date(s).map_or(Value::NaN, Value::Date),
        JsonValue::Number(n) => n
            .as_i64()
            .or_else(|| match truncate(n.as_f64()?) {
                Value::Int(i) => Some(i),
                _ => None,
            })
            .and_then(DateTime::from_timestamp_millis)
            .map_or(Value::NaN, Value::Date),
        _ => Value::NaN,
    }
}

fn parse_date(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    if let Some(dt) = NAIVE_DATE_TIME_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(s, format).ok())
    {
        return Some(dt.and_utc());
    }

    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

/// Backward transform shared by every scalar kind: plain pass-through.
#[must_use]
pub fn reverse(value: &Value) -> JsonValue {
    value.to_json()
}
