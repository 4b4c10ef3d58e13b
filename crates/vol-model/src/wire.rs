//! Wire-format helpers for backend dates and times.
//!
//! The backend is not consistent about temporal values: dates arrive as
//! `2024-05-01` or as full timestamps (`2024-05-01T00:00:00`), times as
//! `09:00` or `09:00:00`. Parsing accepts every form. Times are written back
//! as `HH:MM`, or `HH:MM:SS` when they carry seconds.
//!
//! The serde adapters never reject a record: a value that does not parse is
//! logged and read as `None`, so one malformed row cannot hide a whole list.

use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

use crate::error::{ModelError, Result};

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMAT: &str = "%H:%M";
const TIME_FORMAT_SECONDS: &str = "%H:%M:%S";

/// Parses a backend date, ignoring any time or timezone suffix.
pub fn parse_date(value: &str) -> Result<NaiveDate> {
    let trimmed = value.trim();
    let date_part = trimmed
        .split(['T', ' '])
        .next()
        .unwrap_or(trimmed);
    NaiveDate::parse_from_str(date_part, DATE_FORMAT)
        .map_err(|_| ModelError::InvalidDate(value.to_string()))
}

/// Parses a backend time in `HH:MM` or `HH:MM:SS` form.
pub fn parse_time(value: &str) -> Result<NaiveTime> {
    let trimmed = value.trim();
    NaiveTime::parse_from_str(trimmed, TIME_FORMAT)
        .or_else(|_| NaiveTime::parse_from_str(trimmed, TIME_FORMAT_SECONDS))
        .map_err(|_| ModelError::InvalidTime(value.to_string()))
}

pub fn date_to_wire(date: NaiveDate) -> String {
    date.format(DATE_FORMAT).to_string()
}

pub fn time_to_wire(time: NaiveTime) -> String {
    if time.second() == 0 {
        time.format(TIME_FORMAT).to_string()
    } else {
        time.format(TIME_FORMAT_SECONDS).to_string()
    }
}

/// Reads an optional temporal value, turning anything unparseable into
/// `None` with a warning. The raw value is not logged: birth dates are
/// personal data.
fn lenient<T>(raw: Option<Value>, kind: &'static str, parse: fn(&str) -> Result<T>) -> Option<T> {
    match raw? {
        Value::Null => None,
        Value::String(text) if text.trim().is_empty() => None,
        Value::String(text) => match parse(&text) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(kind, "ignoring unparseable backend value");
                None
            }
        },
        _ => {
            tracing::warn!(kind, "ignoring non-text backend value");
            None
        }
    }
}

/// Serde adapter for `Option<NaiveDate>` fields.
pub mod opt_date {
    use super::{
        Deserialize, Deserializer, NaiveDate, Serializer, Value, date_to_wire, lenient, parse_date,
    };

    pub fn serialize<S: Serializer>(value: &Option<NaiveDate>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(date) => s.serialize_str(&date_to_wire(*date)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveDate>, D::Error> {
        let raw: Option<Value> = Option::deserialize(d)?;
        Ok(lenient(raw, "date", parse_date))
    }
}

/// Serde adapter for `Option<NaiveTime>` fields.
pub mod opt_time {
    use super::{
        Deserialize, Deserializer, NaiveTime, Serializer, Value, lenient, parse_time, time_to_wire,
    };

    pub fn serialize<S: Serializer>(value: &Option<NaiveTime>, s: S) -> Result<S::Ok, S::Error> {
        match value {
            Some(time) => s.serialize_str(&time_to_wire(*time)),
            None => s.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Option<NaiveTime>, D::Error> {
        let raw: Option<Value> = Option::deserialize(d)?;
        Ok(lenient(raw, "time", parse_time))
    }
}
