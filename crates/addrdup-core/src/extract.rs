//! Field rules deriving comparison keys from row values
//!
//! A rule maps one row's target column(s) to an optional comparison key.
//! `None` means extraction failed (the pattern found nothing); absent
//! keys never compare equal, so only the identity rule — which always
//! yields a key — admits empty-string equality.

use addrdup_table::{Table, Value};
use lazy_static::lazy_static;
use regex::Regex;

use crate::error::{MatchError, MatchResult};

lazy_static! {
    // Leading house number plus up to six alnum/space characters.
    static ref NUMERIC_PREFIX: Regex = Regex::new(r"^[0-9]+[A-Za-z0-9 ]{0,6}").unwrap();
    // First short run of letters anywhere in the value.
    static ref TEXT_RUN: Regex = Regex::new(r"[A-Za-z]{2,4}").unwrap();
    static ref LEADING_DIGITS: Regex = Regex::new(r"^[0-9]+").unwrap();
    // First alphabetic run long enough to be a street name.
    static ref STREET_TOKEN: Regex = Regex::new(r"[A-Za-z]{5,}").unwrap();
    // Leading word of a multi-word name; the trailing space-plus-letter
    // is required but not part of the key (capture group stands in for
    // lookahead, which the regex crate does not support).
    static ref FACILITY_NAME: Regex = Regex::new(r"^([A-Za-z]{3,}) [A-Za-z]").unwrap();
}

/// How a comparison key is derived from a row
#[derive(Debug, Clone)]
pub enum FieldRule {
    /// Raw rendered value, verbatim
    Exact { column: String },
    /// Both coordinate values concatenated into one key
    CoordinatePair {
        longitude: String,
        latitude: String,
    },
    /// Leading digit run plus up to 6 following alnum/space characters
    NumericPrefix { column: String },
    /// First run of 2-4 letters anywhere in the value
    TextRun { column: String },
    /// Leading digit run of the whitespace-trimmed value
    LeadingDigits { column: String },
    /// First alphabetic run of length >= 5
    StreetToken { column: String },
    /// Leading alphabetic run of >= 3 letters followed by a space and a
    /// letter, key excludes the trailing space and letter
    FacilityName { column: String },
    /// Identity on a date-typed column
    DateValue { column: String },
    /// Caller-supplied pattern, first overall match
    Pattern { column: String, regex: Regex },
}

impl FieldRule {
    /// Compile a caller-supplied pattern into a rule
    pub fn pattern(column: impl Into<String>, pattern: &str) -> MatchResult<FieldRule> {
        let regex = Regex::new(pattern).map_err(|e| MatchError::InvalidPattern {
            pattern: pattern.to_string(),
            reason: e.to_string(),
        })?;
        Ok(FieldRule::Pattern {
            column: column.into(),
            regex,
        })
    }

    /// Column names the rule reads
    pub fn columns(&self) -> Vec<&str> {
        match self {
            FieldRule::CoordinatePair {
                longitude,
                latitude,
            } => vec![longitude, latitude],
            FieldRule::Exact { column }
            | FieldRule::NumericPrefix { column }
            | FieldRule::TextRun { column }
            | FieldRule::LeadingDigits { column }
            | FieldRule::StreetToken { column }
            | FieldRule::FacilityName { column }
            | FieldRule::DateValue { column }
            | FieldRule::Pattern { column, .. } => vec![column],
        }
    }

    /// Derive the comparison key for one row
    pub fn key(&self, table: &Table, row: usize) -> MatchResult<Option<String>> {
        match self {
            FieldRule::Exact { column } => Ok(Some(rendered(table, row, column)?)),
            FieldRule::CoordinatePair {
                longitude,
                latitude,
            } => {
                let lon = rendered(table, row, longitude)?;
                let lat = rendered(table, row, latitude)?;
                Ok(Some(format!("{lon}{lat}")))
            }
            FieldRule::NumericPrefix { column } => {
                let raw = rendered(table, row, column)?;
                Ok(NUMERIC_PREFIX.find(&raw).map(|m| m.as_str().to_string()))
            }
            FieldRule::TextRun { column } => {
                let raw = rendered(table, row, column)?;
                Ok(TEXT_RUN.find(&raw).map(|m| m.as_str().to_string()))
            }
            FieldRule::LeadingDigits { column } => {
                let raw = rendered(table, row, column)?;
                Ok(LEADING_DIGITS
                    .find(raw.trim())
                    .map(|m| m.as_str().to_string()))
            }
            FieldRule::StreetToken { column } => {
                let raw = rendered(table, row, column)?;
                Ok(STREET_TOKEN.find(&raw).map(|m| m.as_str().to_string()))
            }
            FieldRule::FacilityName { column } => {
                let raw = rendered(table, row, column)?;
                Ok(FACILITY_NAME
                    .captures(&raw)
                    .map(|c| c[1].to_string()))
            }
            FieldRule::DateValue { column } => {
                let value = cell(table, row, column)?;
                match value.as_date() {
                    Some(d) => Ok(Some(d.format("%Y-%m-%d").to_string())),
                    None => Err(MatchError::TypeMismatch {
                        column: column.clone(),
                        expected: "date",
                        actual: value.kind(),
                    }),
                }
            }
            FieldRule::Pattern { column, regex } => {
                let raw = rendered(table, row, column)?;
                Ok(regex.find(&raw).map(|m| m.as_str().to_string()))
            }
        }
    }
}

fn cell<'a>(table: &'a Table, row: usize, column: &str) -> MatchResult<&'a Value> {
    let index = table
        .column_index(column)
        .ok_or_else(|| MatchError::MissingParameter(format!("column `{column}`")))?;
    table
        .value(row, index)
        .ok_or_else(|| MatchError::MissingParameter(format!("column `{column}`")))
}

/// Rendered form of a text or number cell; dates under a text rule are a
/// type error, never silently coerced
fn rendered(table: &Table, row: usize, column: &str) -> MatchResult<String> {
    let value = cell(table, row, column)?;
    match value {
        Value::Date(_) => Err(MatchError::TypeMismatch {
            column: column.to_string(),
            expected: "text or number",
            actual: value.kind(),
        }),
        other => Ok(other.render()),
    }
}
