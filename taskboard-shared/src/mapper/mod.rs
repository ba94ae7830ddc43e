/// Request mapping
///
/// Turns decoded-but-untyped request data (JSON bodies, query strings, path
/// ids) into the typed parameter structs of the query layer:
///
/// - `dates`: `YYYY-MM-DD` parsing and the nullable timestamp input shapes
/// - `requests`: create/update bodies for each entity
/// - `search`: query-string search criteria
///
/// Every failure is a [`MapError`], which the HTTP layer renders as a
/// validation error.

pub mod dates;
pub mod requests;
pub mod search;

use crate::models::ParseEnumError;
use serde::Serialize;
use std::str::FromStr;
use thiserror::Error;
use validator::ValidationErrors;

/// One rejected field
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FieldViolation {
    pub field: String,
    pub message: String,
}

/// Request mapping failures
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MapError {
    /// A date field did not parse
    #[error("{field}: expected a YYYY-MM-DD date, got {value:?}")]
    InvalidDate { field: &'static str, value: String },

    /// A field had the wrong shape or an unknown enum value
    #[error("{field}: {message}")]
    InvalidField { field: &'static str, message: String },

    /// A search request named no criterion
    #[error("missing query parameter, expected one of: {expected}")]
    MissingCriterion { expected: &'static str },

    /// Declarative field rules failed
    #[error("request validation failed")]
    Validation(Vec<FieldViolation>),
}

impl MapError {
    /// Per-field breakdown for error payloads
    pub fn violations(&self) -> Vec<FieldViolation> {
        match self {
            MapError::InvalidDate { field, .. } | MapError::InvalidField { field, .. } => {
                vec![FieldViolation {
                    field: field.to_string(),
                    message: self.to_string(),
                }]
            }
            MapError::MissingCriterion { .. } => Vec::new(),
            MapError::Validation(violations) => violations.clone(),
        }
    }
}

impl From<ValidationErrors> for MapError {
    fn from(errors: ValidationErrors) -> Self {
        let mut violations: Vec<FieldViolation> = errors
            .field_errors()
            .iter()
            .flat_map(|(field, errors)| {
                errors.iter().map(move |error| FieldViolation {
                    field: field.to_string(),
                    message: error
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{field} is invalid")),
                })
            })
            .collect();
        violations.sort_by(|a, b| a.field.cmp(&b.field));

        MapError::Validation(violations)
    }
}

/// Parses a closed enum, naming the field on failure
pub(crate) fn parse_enum<T>(field: &'static str, value: &str) -> Result<T, MapError>
where
    T: FromStr<Err = ParseEnumError>,
{
    value.parse().map_err(|e: ParseEnumError| MapError::InvalidField {
        field,
        message: e.to_string(),
    })
}

/// Parses an integer id supplied as text (query strings)
pub(crate) fn parse_id(field: &'static str, value: &str) -> Result<i64, MapError> {
    value.trim().parse().map_err(|_| MapError::InvalidField {
        field,
        message: format!("expected an integer id, got {value:?}"),
    })
}
