//! The ten deduplication operations
//!
//! Each is a thin parameterization of [`engine::find_adjacent`]: a field
//! rule, a comparator, and the exclusion filters the operation honors.
//! The returned table has the input's schema and is designed to be
//! subtracted from the input (anti-join on full row identity) to produce
//! the deduplicated dataset.

use addrdup_table::Table;
use serde::{Deserialize, Serialize};

use crate::engine::{self, Comparator, Direction, MatchConfig};
use crate::error::{MatchError, MatchResult};
use crate::extract::FieldRule;
use crate::filter::ExclusionFilter;

/// Caller-facing switches shared by every operation
///
/// Each operation documents which of the filter flags it honors; the
/// others are ignored by contract.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MatchOptions {
    /// Surface both members of each matching pair (predecessor and
    /// successor passes), not just the later row of each pair
    pub include_context: bool,
    /// Drop flagged rows whose raw target value is the empty string
    pub filter_blanks: bool,
    /// Drop flagged rows whose raw target value is a PO-box address
    pub filter_pobox: bool,
    /// Stable re-sort of the result by these columns; when absent the
    /// result keeps pass-concatenation order
    pub sort_keys: Option<Vec<String>>,
}

/// Rows whose longitude+latitude pair equals their neighbor's
///
/// Honors no filter flags.
pub fn same_coordinates(
    table: &Table,
    group_keys: &[String],
    longitude: &str,
    latitude: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, longitude, "longitude column")?;
    require_column(table, latitude, "latitude column")?;
    let rule = FieldRule::CoordinatePair {
        longitude: longitude.to_string(),
        latitude: latitude.to_string(),
    };
    let config = config(group_keys, options, Vec::new(), Vec::new(), Comparator::Exact);
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows whose raw address equals their neighbor's verbatim
///
/// The only operation where two empty addresses count as a match; honors
/// `filter_blanks` and `filter_pobox`.
pub fn exact_address(
    table: &Table,
    group_keys: &[String],
    address: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, address, "address column")?;
    let rule = FieldRule::Exact {
        column: address.to_string(),
    };
    let mut filters = Vec::new();
    if options.filter_blanks {
        filters.push(ExclusionFilter::Blank);
    }
    if options.filter_pobox {
        filters.push(ExclusionFilter::PoBox);
    }
    let config = config(
        group_keys,
        options,
        filters,
        vec![address.to_string()],
        Comparator::Exact,
    );
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows sharing a house number and the first few street characters
/// (partial address-number heuristic)
///
/// Honors `filter_blanks` only.
pub fn similar_address(
    table: &Table,
    group_keys: &[String],
    address: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, address, "address column")?;
    let rule = FieldRule::NumericPrefix {
        column: address.to_string(),
    };
    let filters = if options.filter_blanks {
        vec![ExclusionFilter::Blank]
    } else {
        Vec::new()
    };
    let config = config(
        group_keys,
        options,
        filters,
        vec![address.to_string()],
        Comparator::Exact,
    );
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows sharing a coarse text fingerprint (first short run of letters)
///
/// Honors no filter flags.
pub fn similar_text(
    table: &Table,
    group_keys: &[String],
    address: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, address, "address column")?;
    let rule = FieldRule::TextRun {
        column: address.to_string(),
    };
    let config = config(group_keys, options, Vec::new(), Vec::new(), Comparator::Exact);
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows whose second address column equals a neighbor row's *first*
/// address column (cross-column adjacency)
///
/// Catches the moved-patient case where one visit's "previous address"
/// repeats the prior visit's "current address". Honors `filter_pobox`,
/// evaluated against the flagged row's raw value in both columns: if
/// either is a PO-box address the row is dropped.
pub fn adjacent_dual_column(
    table: &Table,
    group_keys: &[String],
    column_a: &str,
    column_b: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, column_a, "first address column")?;
    require_column(table, column_b, "second address column")?;
    let probe = FieldRule::Exact {
        column: column_b.to_string(),
    };
    let base = FieldRule::Exact {
        column: column_a.to_string(),
    };
    let filters = if options.filter_pobox {
        vec![ExclusionFilter::PoBox]
    } else {
        Vec::new()
    };
    let config = config(
        group_keys,
        options,
        filters,
        vec![column_a.to_string(), column_b.to_string()],
        Comparator::Exact,
    );
    engine::find_adjacent(table, &probe, &base, &config)
}

/// Rows sharing a leading house number (whitespace-trimmed digit run)
///
/// Honors `filter_pobox`, checked against the full raw address rather
/// than the extracted digits.
pub fn same_numeric_id(
    table: &Table,
    group_keys: &[String],
    address: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, address, "address column")?;
    let rule = FieldRule::LeadingDigits {
        column: address.to_string(),
    };
    let filters = if options.filter_pobox {
        vec![ExclusionFilter::PoBox]
    } else {
        Vec::new()
    };
    let config = config(
        group_keys,
        options,
        filters,
        vec![address.to_string()],
        Comparator::TrimWhitespace,
    );
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows sharing a street-name token (first alphabetic run of >= 5
/// letters)
///
/// Honors `filter_pobox`.
pub fn similar_street_name(
    table: &Table,
    group_keys: &[String],
    address: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, address, "address column")?;
    let rule = FieldRule::StreetToken {
        column: address.to_string(),
    };
    let filters = if options.filter_pobox {
        vec![ExclusionFilter::PoBox]
    } else {
        Vec::new()
    };
    let config = config(
        group_keys,
        options,
        filters,
        vec![address.to_string()],
        Comparator::Exact,
    );
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows sharing a repeated facility/building name (leading word of a
/// multi-word name)
///
/// Honors `filter_pobox`.
pub fn facility_name(
    table: &Table,
    group_keys: &[String],
    address: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, address, "address column")?;
    let rule = FieldRule::FacilityName {
        column: address.to_string(),
    };
    let filters = if options.filter_pobox {
        vec![ExclusionFilter::PoBox]
    } else {
        Vec::new()
    };
    let config = config(
        group_keys,
        options,
        filters,
        vec![address.to_string()],
        Comparator::Exact,
    );
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows whose date value equals their neighbor's (pure temporal
/// duplicate)
///
/// Fails with `TypeMismatch` on non-date cells; honors no filter flags.
pub fn same_date(
    table: &Table,
    group_keys: &[String],
    date: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, date, "date column")?;
    let rule = FieldRule::DateValue {
        column: date.to_string(),
    };
    let config = config(group_keys, options, Vec::new(), Vec::new(), Comparator::Exact);
    engine::find_adjacent(table, &rule, &rule, &config)
}

/// Rows sharing the first match of a caller-supplied pattern
///
/// Generalizes the street-name and facility-name heuristics; honors
/// `filter_pobox`. An uncompilable pattern fails with `InvalidPattern`.
pub fn precise_text(
    table: &Table,
    group_keys: &[String],
    address: &str,
    pattern: &str,
    options: &MatchOptions,
) -> MatchResult<Table> {
    require_group_keys(table, group_keys)?;
    require_column(table, address, "address column")?;
    if pattern.is_empty() {
        return Err(MatchError::MissingParameter(
            "extraction pattern".to_string(),
        ));
    }
    let rule = FieldRule::pattern(address, pattern)?;
    let filters = if options.filter_pobox {
        vec![ExclusionFilter::PoBox]
    } else {
        Vec::new()
    };
    let config = config(
        group_keys,
        options,
        filters,
        vec![address.to_string()],
        Comparator::Exact,
    );
    engine::find_adjacent(table, &rule, &rule, &config)
}

fn config(
    group_keys: &[String],
    options: &MatchOptions,
    filters: Vec<ExclusionFilter>,
    filter_columns: Vec<String>,
    comparator: Comparator,
) -> MatchConfig {
    MatchConfig {
        group_keys: group_keys.to_vec(),
        direction: if options.include_context {
            Direction::Bidirectional
        } else {
            Direction::PredecessorOnly
        },
        comparator,
        filters,
        filter_columns,
        sort_keys: options.sort_keys.clone(),
    }
}

fn require_group_keys(table: &Table, group_keys: &[String]) -> MatchResult<()> {
    if group_keys.is_empty() {
        return Err(MatchError::MissingParameter("group keys".to_string()));
    }
    for key in group_keys {
        require_column(table, key, "group key")?;
    }
    Ok(())
}

fn require_column(table: &Table, name: &str, what: &str) -> MatchResult<()> {
    if name.is_empty() {
        return Err(MatchError::MissingParameter(what.to_string()));
    }
    if table.column_index(name).is_none() {
        return Err(MatchError::MissingParameter(format!(
            "{what} `{name}` is not a column of the table"
        )));
    }
    Ok(())
}
