//! Cell scalars shared by query results, typed columns and statistics.

use std::fmt;

use arrow::array::Array;
use chrono::{DateTime, NaiveDate, NaiveDateTime, NaiveTime, TimeDelta, Utc};
use datafusion::scalar::ScalarValue;
use ordered_float::OrderedFloat;
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// Display format for date-time cells and date-time statistics.
pub const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// A single scalar value read from the Tabular Store or computed by a profile.
///
/// Values are totally ordered and hashable so that whole rows can be compared
/// for duplicates and cells can be grouped into frequency tables. Floats are
/// wrapped in [`OrderedFloat`] for that reason.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(tag = "type", content = "value")]
pub enum Value {
    /// A missing cell, or a statistic that is undefined for the input.
    Null,
    Boolean(bool),
    Integer(i64),
    Float(OrderedFloat<f64>),
    Text(String),
    DateTime(NaiveDateTime),
}

impl Value {
    /// Creates a float value.
    pub fn float(value: f64) -> Self {
        Value::Float(OrderedFloat(value))
    }

    /// Creates a text value.
    pub fn text(value: impl Into<String>) -> Self {
        Value::Text(value.into())
    }

    /// Creates a count value.
    pub fn count(value: usize) -> Self {
        Value::Integer(value as i64)
    }

    /// Wraps an optional value, mapping `None` to [`Value::Null`].
    pub fn from_option<T: Into<Value>>(value: Option<T>) -> Self {
        value.map(Into::into).unwrap_or(Value::Null)
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns the numeric value as f64, if the cell holds a number.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Value::Integer(v) => Some(*v as f64),
            Value::Float(v) => Some(v.0),
            Value::Boolean(b) => Some(if *b { 1.0 } else { 0.0 }),
            _ => None,
        }
    }

    /// Returns the value as i64 when it is an integer or an integral float.
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Value::Integer(v) => Some(*v),
            Value::Float(v) if v.0.fract() == 0.0 => Some(v.0 as i64),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_datetime(&self) -> Option<NaiveDateTime> {
        match self {
            Value::DateTime(dt) => Some(*dt),
            _ => None,
        }
    }

    /// Reads one cell of an Arrow array.
    pub fn from_array(array: &dyn Array, row: usize) -> Result<Self> {
        if array.is_null(row) {
            return Ok(Value::Null);
        }
        let scalar = ScalarValue::try_from_array(array, row)?;
        Ok(Self::from_scalar(scalar))
    }

    /// Converts a DataFusion scalar into a cell value.
    ///
    /// Integer widths collapse to `Integer` (unsigned values beyond `i64`
    /// become `Float`), float widths to `Float` and string encodings to
    /// `Text`. Dates and timestamps become `DateTime`; a time of day is
    /// placed on 1970-01-01.
    /// Anything else is kept in its display form.
    pub fn from_scalar(scalar: ScalarValue) -> Self {
        match scalar {
            ScalarValue::Null => Value::Null,
            ScalarValue::Boolean(v) => Value::from_option(v),
            ScalarValue::Int8(v) => Value::from_option(v.map(i64::from)),
            ScalarValue::Int16(v) => Value::from_option(v.map(i64::from)),
            ScalarValue::Int32(v) => Value::from_option(v.map(i64::from)),
            ScalarValue::Int64(v) => Value::from_option(v),
            ScalarValue::UInt8(v) => Value::from_option(v.map(i64::from)),
            ScalarValue::UInt16(v) => Value::from_option(v.map(i64::from)),
            ScalarValue::UInt32(v) => Value::from_option(v.map(i64::from)),
            ScalarValue::UInt64(v) => Value::from_option(v.map(|v| match i64::try_from(v) {
                Ok(v) => Value::Integer(v),
                Err(_) => Value::float(v as f64),
            })),
            ScalarValue::Float32(v) => Value::from_option(v.map(f64::from)),
            ScalarValue::Float64(v) => Value::from_option(v),
            ScalarValue::Decimal128(v, _, scale) => {
                Value::from_option(v.map(|v| v as f64 / 10f64.powi(i32::from(scale))))
            }
            ScalarValue::Utf8(v) | ScalarValue::LargeUtf8(v) | ScalarValue::Utf8View(v) => {
                Value::from_option(v)
            }
            ScalarValue::Date32(v) => {
                Value::from_option(v.and_then(|days| epoch_date_plus_days(i64::from(days))))
            }
            ScalarValue::Date64(v) => Value::from_option(
                v.and_then(DateTime::from_timestamp_millis)
                    .map(|dt| dt.naive_utc()),
            ),
            ScalarValue::TimestampSecond(v, _) => Value::from_option(
                v.and_then(|s| DateTime::from_timestamp(s, 0))
                    .map(|dt| dt.naive_utc()),
            ),
            ScalarValue::TimestampMillisecond(v, _) => Value::from_option(
                v.and_then(DateTime::from_timestamp_millis)
                    .map(|dt| dt.naive_utc()),
            ),
            ScalarValue::TimestampMicrosecond(v, _) => Value::from_option(
                v.and_then(DateTime::from_timestamp_micros)
                    .map(|dt| dt.naive_utc()),
            ),
            ScalarValue::TimestampNanosecond(v, _) => {
                Value::from_option(v.map(|ns| DateTime::from_timestamp_nanos(ns).naive_utc()))
            }
            ScalarValue::Time32Second(v) => {
                Value::from_option(v.and_then(|s| time_of_day(i64::from(s), 1_000_000_000)))
            }
            ScalarValue::Time32Millisecond(v) => {
                Value::from_option(v.and_then(|ms| time_of_day(i64::from(ms), 1_000_000)))
            }
            ScalarValue::Time64Microsecond(v) => {
                Value::from_option(v.and_then(|us| time_of_day(us, 1_000)))
            }
            ScalarValue::Time64Nanosecond(v) => Value::from_option(v.and_then(|ns| time_of_day(ns, 1))),
            other if other.is_null() => Value::Null,
            other => Value::Text(other.to_string()),
        }
    }
}

fn epoch_date_plus_days(days: i64) -> Option<NaiveDateTime> {
    let epoch = NaiveDate::from_ymd_opt(1970, 1, 1)?;
    let date = epoch.checked_add_signed(TimeDelta::try_days(days)?)?;
    date.and_hms_opt(0, 0, 0)
}

/// A time of day, counted in `ticks` of `nanos_per_tick`, on the epoch day.
fn time_of_day(ticks: i64, nanos_per_tick: i64) -> Option<NaiveDateTime> {
    let nanos = ticks.checked_mul(nanos_per_tick)?;
    let secs = u32::try_from(nanos.div_euclid(1_000_000_000)).ok()?;
    let frac = u32::try_from(nanos.rem_euclid(1_000_000_000)).ok()?;
    let time = NaiveTime::from_num_seconds_from_midnight_opt(secs, frac)?;
    Some(unix_epoch().date().and_time(time))
}

/// Midnight of 1970-01-01, the sentinel for missing date cells.
pub fn unix_epoch() -> NaiveDateTime {
    DateTime::<Utc>::default().naive_utc()
}

/// Text layouts accepted when a date column holds strings.
const DATETIME_INPUT_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%Y-%m-%dT%H:%M",
];

/// Parses an ISO-like date or date-time; a bare date means midnight.
pub fn parse_datetime(text: &str) -> Option<NaiveDateTime> {
    let text = text.trim();
    DATETIME_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDateTime::parse_from_str(text, format).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|date| date.and_hms_opt(0, 0, 0))
        })
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => write!(f, "N/A"),
            Value::Boolean(b) => write!(f, "{b}"),
            Value::Integer(v) => write!(f, "{v}"),
            Value::Float(v) => write!(f, "{}", v.0),
            Value::Text(s) => write!(f, "{s}"),
            Value::DateTime(dt) => write!(f, "{}", dt.format(DATETIME_FORMAT)),
        }
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Boolean(v)
    }
}

impl From<i64> for Value {
    fn from(v: i64) -> Self {
        Value::Integer(v)
    }
}

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::float(v)
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Text(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Text(v.to_string())
    }
}

impl From<NaiveDateTime> for Value {
    fn from(v: NaiveDateTime) -> Self {
        Value::DateTime(v)
    }
}
