/// Date coercions
///
/// Date-only fields accept `YYYY-MM-DD`. A full RFC 3339 timestamp is also
/// accepted so records read from the API can be sent back unchanged; for
/// date-only fields it is truncated to its UTC calendar day.
///
/// Nullable timestamps (`completion_date`) accept these JSON shapes:
///
/// | Input                                   | Result            |
/// |-----------------------------------------|-------------------|
/// | absent, `null`, `""`                    | no value          |
/// | `"2024-03-01"` / RFC 3339 string        | value             |
/// | `{}`, `{"time": null}`                  | no value          |
/// | `{"time": "2024-03-01"}`                | value             |
/// | `{"time": "2024-03-01", "valid": false}`| no value          |
///
/// A `time` string is parsed even when `valid` is false, so a malformed date
/// is rejected either way. Anything else is rejected.

use crate::mapper::MapError;
use chrono::{DateTime, NaiveDate, NaiveTime, Utc};
use serde_json::Value;

const DATE_FORMAT: &str = "%Y-%m-%d";

const NULLABLE_SHAPES: &str =
    "expected a date string, an empty string, null, or an object with an optional \"time\" string";

/// Parses a date-only field
pub fn parse_date(field: &'static str, value: &str) -> Result<NaiveDate, MapError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date);
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc).date_naive())
        .map_err(|_| MapError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Parses a timestamp field; bare dates become midnight UTC
pub fn parse_timestamp(field: &'static str, value: &str) -> Result<DateTime<Utc>, MapError> {
    if let Ok(date) = NaiveDate::parse_from_str(value, DATE_FORMAT) {
        return Ok(date.and_time(NaiveTime::MIN).and_utc());
    }

    DateTime::parse_from_rfc3339(value)
        .map(|dt| dt.with_timezone(&Utc))
        .map_err(|_| MapError::InvalidDate {
            field,
            value: value.to_string(),
        })
}

/// Maps a nullable timestamp in any accepted shape
pub fn parse_nullable_timestamp(
    field: &'static str,
    value: &Value,
) -> Result<Option<DateTime<Utc>>, MapError> {
    match value {
        Value::Null => Ok(None),
        Value::String(s) if s.is_empty() => Ok(None),
        Value::String(s) => parse_timestamp(field, s).map(Some),
        Value::Object(map) => {
            let valid = match map.get("valid") {
                None | Some(Value::Null) => true,
                Some(Value::Bool(b)) => *b,
                Some(_) => {
                    return Err(MapError::InvalidField {
                        field,
                        message: "\"valid\" must be a boolean".to_string(),
                    })
                }
            };

            let time = match map.get("time") {
                None | Some(Value::Null) => None,
                Some(Value::String(s)) if s.is_empty() => None,
                Some(Value::String(s)) => Some(parse_timestamp(field, s)?),
                Some(_) => {
                    return Err(MapError::InvalidField {
                        field,
                        message: NULLABLE_SHAPES.to_string(),
                    })
                }
            };

            // a parsed time is still discarded when flagged invalid
            Ok(time.filter(|_| valid))
        }
        _ => Err(MapError::InvalidField {
            field,
            message: NULLABLE_SHAPES.to_string(),
        }),
    }
}
