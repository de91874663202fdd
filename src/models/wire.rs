//! Lenient serde helpers for the backend's JSON.
//!
//! Numeric fields come back as numbers, numeric strings, empty strings or
//! `null` depending on how the record was first written. All of them are
//! accepted; anything non-numeric reads as zero.

use std::str::FromStr;

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Deserializer, Serializer};
use serde_json::Value;

/// Parse user or wire text into an amount. Empty or non-numeric input is zero.
pub fn parse_amount(input: &str) -> Decimal {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Decimal::ZERO;
    }
    Decimal::from_str(trimmed)
        .or_else(|_| Decimal::from_scientific(trimmed))
        .unwrap_or(Decimal::ZERO)
}

/// Parse user or wire text into a quantity. Fractions are truncated.
pub fn parse_quantity(input: &str) -> i64 {
    let trimmed = input.trim();
    trimmed
        .parse::<i64>()
        .ok()
        .or_else(|| parse_amount(trimmed).trunc().to_i64())
        .unwrap_or(0)
}

/// Slash-separated day formats written by older clients, month first.
const SLASHED_DAY_FORMATS: [&str; 2] = ["%m/%d/%Y", "%d/%m/%Y"];

/// Parse a backend date: an RFC 3339 timestamp, a bare `YYYY-MM-DD`, or a
/// locale day such as `5/2/2024`.
pub fn parse_date(input: &str) -> Option<DateTime<Utc>> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(naive.and_utc());
    }
    trimmed
        .get(..10)
        .and_then(|day| NaiveDate::parse_from_str(day, "%Y-%m-%d").ok())
        .or_else(|| {
            SLASHED_DAY_FORMATS
                .iter()
                .find_map(|format| NaiveDate::parse_from_str(trimmed, format).ok())
        })
        .and_then(|day| day.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

fn value_to_amount(value: &Value) -> Decimal {
    match value {
        Value::Number(n) => parse_amount(&n.to_string()),
        Value::String(s) => parse_amount(s),
        _ => Decimal::ZERO,
    }
}

/// `#[serde(with = "wire::amount")]`: decimal written as a JSON number.
pub mod amount {
    use super::*;

    pub fn serialize<S: Serializer>(value: &Decimal, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_f64(value.to_f64().unwrap_or(0.0))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Decimal, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(value.as_ref().map(value_to_amount).unwrap_or(Decimal::ZERO))
    }
}

/// `#[serde(with = "wire::quantity")]`
pub mod quantity {
    use super::*;

    pub fn serialize<S: Serializer>(value: &i64, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_i64(*value)
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::Number(n)) => n
                .as_i64()
                .or_else(|| n.as_f64().map(|f| f.trunc() as i64))
                .unwrap_or(0),
            Some(Value::String(s)) => parse_quantity(&s),
            None => 1,
            _ => 0,
        })
    }
}

/// `#[serde(with = "wire::timestamp")]`: optional instant, absent when unparseable.
pub mod timestamp {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(dt) => serializer.serialize_str(&dt.to_rfc3339()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => parse_date(&s),
            Some(Value::Number(n)) => n
                .as_i64()
                .and_then(DateTime::<Utc>::from_timestamp_millis),
            _ => None,
        })
    }
}

/// `#[serde(with = "wire::day")]`: optional calendar day, written as `YYYY-MM-DD`.
pub mod day {
    use super::*;

    pub fn serialize<S: Serializer>(
        value: &Option<NaiveDate>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(day) => serializer.serialize_str(&day.format("%Y-%m-%d").to_string()),
            None => serializer.serialize_str(""),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<NaiveDate>, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => parse_date(&s).map(|dt| dt.date_naive()),
            _ => None,
        })
    }
}

/// Nested objects the backend may send as `null`.
pub mod or_default {
    use super::*;

    pub fn deserialize<'de, D, T>(deserializer: D) -> Result<T, D::Error>
    where
        D: Deserializer<'de>,
        T: Default + Deserialize<'de>,
    {
        Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
    }
}

/// Free text that may arrive as a number (phone numbers, mileage).
pub mod text {
    use super::*;

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
        let value = Option::<Value>::deserialize(deserializer)?;
        Ok(match value {
            Some(Value::String(s)) => s,
            Some(Value::Number(n)) => n.to_string(),
            Some(Value::Bool(b)) => b.to_string(),
            _ => String::new(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Datelike;
    use rust_decimal_macros::dec;

    #[test]
    fn amounts_parse_leniently() {
        assert_eq!(parse_amount("12.50"), dec!(12.50));
        assert_eq!(parse_amount("  7 "), dec!(7));
        assert_eq!(parse_amount(""), Decimal::ZERO);
        assert_eq!(parse_amount("abc"), Decimal::ZERO);
        assert_eq!(parse_amount("1e2"), dec!(100));
    }

    #[test]
    fn quantities_truncate_fractions() {
        assert_eq!(parse_quantity("3"), 3);
        assert_eq!(parse_quantity("2.9"), 2);
        assert_eq!(parse_quantity(""), 0);
        assert_eq!(parse_quantity("-1"), -1);
    }

    #[test]
    fn dates_accept_timestamps_and_days() {
        let ts = parse_date("2024-03-05T22:10:00.000Z").unwrap();
        assert_eq!((ts.year(), ts.month(), ts.day()), (2024, 3, 5));

        let day = parse_date("2023-12-31").unwrap();
        assert_eq!((day.year(), day.month(), day.day()), (2023, 12, 31));

        assert!(parse_date("").is_none());
        assert!(parse_date("not a date").is_none());
    }

    #[test]
    fn dates_accept_locale_days() {
        let us = parse_date("5/2/2024").unwrap();
        assert_eq!((us.year(), us.month(), us.day()), (2024, 5, 2));

        let padded = parse_date("12/31/2023").unwrap();
        assert_eq!((padded.year(), padded.month(), padded.day()), (2023, 12, 31));

        // Day-first when the month-first reading is impossible.
        let day_first = parse_date("25/2/2024").unwrap();
        assert_eq!((day_first.year(), day_first.month(), day_first.day()), (2024, 2, 25));

        assert!(parse_date("13/13/2024").is_none());
    }

    #[test]
    fn locale_completion_day_survives_a_round_trip() {
        #[derive(serde::Deserialize, serde::Serialize)]
        struct Holder {
            #[serde(with = "day")]
            completion_date: Option<NaiveDate>,
        }
        let holder: Holder = serde_json::from_str(r#"{"completion_date": "5/2/2024"}"#).unwrap();
        assert_eq!(holder.completion_date, NaiveDate::from_ymd_opt(2024, 5, 2));
        let back = serde_json::to_value(&holder).unwrap();
        assert_eq!(back["completion_date"], "2024-05-02");
    }
}
