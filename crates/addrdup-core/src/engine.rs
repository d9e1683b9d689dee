//! The adjacency match engine
//!
//! Partitions a table by its group keys (order-preserving), compares each
//! row's derived key against its immediate neighbor(s) inside the
//! partition, applies the active exclusion filters to the flagged rows,
//! and returns the surviving rows as a new table with the input's schema.

use std::cmp::Ordering;
use std::collections::HashMap;

use addrdup_table::Table;
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::error::{MatchError, MatchResult};
use crate::extract::FieldRule;
use crate::filter::ExclusionFilter;

/// Which neighbor passes run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Direction {
    /// Flag a row when its key equals the preceding row's key
    #[default]
    PredecessorOnly,
    /// Additionally flag rows matching their following row; both members
    /// of each pair surface (the in-context mode)
    Bidirectional,
}

/// How two derived keys are judged equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Comparator {
    #[default]
    Exact,
    /// Surrounding whitespace trimmed from both keys before equality
    TrimWhitespace,
}

/// Engine parameters shared by every operation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MatchConfig {
    /// Columns partitioning the table; neighbor comparison never crosses
    /// a partition boundary. Required.
    pub group_keys: Vec<String>,
    pub direction: Direction,
    pub comparator: Comparator,
    /// Active exclusion filters, evaluated in order
    pub filters: Vec<ExclusionFilter>,
    /// Columns whose raw values the filters inspect on a flagged row
    pub filter_columns: Vec<String>,
    /// Stable re-sort of the result; when absent the concatenation order
    /// (successor pass before predecessor pass) is the contract
    pub sort_keys: Option<Vec<String>>,
}

/// Flag every row participating in an adjacent-duplicate pair
///
/// `probe` derives the flagged row's key, `base` the neighbor's; the
/// predecessor pass compares `probe[i]` to `base[i-1]` and the successor
/// pass `probe[i]` to `base[i+1]`. Single-column operations pass the same
/// rule for both. A row flagged by both passes appears twice in the
/// output — it is the duplicate of its predecessor and the original for
/// its successor at once.
pub fn find_adjacent(
    table: &Table,
    probe: &FieldRule,
    base: &FieldRule,
    config: &MatchConfig,
) -> MatchResult<Table> {
    if config.group_keys.is_empty() {
        return Err(MatchError::MissingParameter("group keys".to_string()));
    }
    let group_indices = resolve_columns(table, &config.group_keys)?;
    let filter_indices = resolve_columns(table, &config.filter_columns)?;
    let sort_indices = match &config.sort_keys {
        Some(keys) => Some(resolve_columns(table, keys)?),
        None => None,
    };

    let (prev, next) = neighbor_links(table, &group_indices);

    let probe_keys = derive_keys(table, probe)?;
    let base_keys = derive_keys(table, base)?;

    let survives = |row: usize| -> bool {
        config.filters.iter().all(|filter| {
            filter_indices
                .iter()
                .all(|&col| !filter.excludes(&table.rows()[row].values()[col].render()))
        })
    };

    let mut flagged = Vec::new();
    if config.direction == Direction::Bidirectional {
        for (i, succ) in next.iter().enumerate() {
            if let Some(s) = succ {
                if keys_equal(&probe_keys[i], &base_keys[*s], config.comparator) && survives(i) {
                    flagged.push(i);
                }
            }
        }
    }
    for (i, pred) in prev.iter().enumerate() {
        if let Some(p) = pred {
            if keys_equal(&probe_keys[i], &base_keys[*p], config.comparator) && survives(i) {
                flagged.push(i);
            }
        }
    }

    if let Some(sort_indices) = sort_indices {
        flagged.sort_by(|&a, &b| {
            for &col in &sort_indices {
                let ord = table.rows()[a].values()[col].sort_cmp(&table.rows()[b].values()[col]);
                if ord != Ordering::Equal {
                    return ord;
                }
            }
            Ordering::Equal
        });
    }

    let result = table.select(&flagged);
    info!(rows = result.len(), "adjacent duplicate rows flagged");
    Ok(result)
}

/// Predecessor/successor row index within each partition, computed in one
/// pass over the table in original row order
fn neighbor_links(table: &Table, group_indices: &[usize]) -> (Vec<Option<usize>>, Vec<Option<usize>>) {
    let mut prev = vec![None; table.len()];
    let mut next = vec![None; table.len()];
    let mut last_in_group: HashMap<String, usize> = HashMap::new();

    for i in 0..table.len() {
        let key = group_key(table, i, group_indices);
        if let Some(&p) = last_in_group.get(&key) {
            prev[i] = Some(p);
            next[p] = Some(i);
        }
        last_in_group.insert(key, i);
    }
    (prev, next)
}

/// Rendered group-key tuple; the separator keeps adjacent column values
/// from colliding across rows
fn group_key(table: &Table, row: usize, group_indices: &[usize]) -> String {
    let parts: Vec<String> = group_indices
        .iter()
        .map(|&col| table.rows()[row].values()[col].render())
        .collect();
    parts.join("\u{1f}")
}

fn derive_keys(table: &Table, rule: &FieldRule) -> MatchResult<Vec<Option<String>>> {
    (0..table.len()).map(|i| rule.key(table, i)).collect()
}

fn keys_equal(a: &Option<String>, b: &Option<String>, comparator: Comparator) -> bool {
    match (a, b) {
        (Some(a), Some(b)) => match comparator {
            Comparator::Exact => a == b,
            Comparator::TrimWhitespace => a.trim() == b.trim(),
        },
        // Absent keys never compare equal, not even to each other
        _ => false,
    }
}

fn resolve_columns(table: &Table, names: &[String]) -> MatchResult<Vec<usize>> {
    names
        .iter()
        .map(|name| {
            table
                .column_index(name)
                .ok_or_else(|| MatchError::MissingParameter(format!("column `{name}`")))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use addrdup_table::Value;

    fn table(rows: &[(i64, &str)]) -> Table {
        let mut t = Table::new(["patient_id", "address"]);
        for (id, addr) in rows {
            t.push_row(vec![Value::from(*id), Value::from(*addr)])
                .unwrap();
        }
        t
    }

    fn exact() -> FieldRule {
        FieldRule::Exact {
            column: "address".into(),
        }
    }

    fn config() -> MatchConfig {
        MatchConfig {
            group_keys: vec!["patient_id".into()],
            direction: Direction::PredecessorOnly,
            comparator: Comparator::Exact,
            filters: Vec::new(),
            filter_columns: vec!["address".into()],
            sort_keys: None,
        }
    }

    fn addresses(t: &Table) -> Vec<String> {
        (0..t.len())
            .map(|i| t.value(i, 1).unwrap().render())
            .collect()
    }

    #[test]
    fn test_predecessor_flags_later_row_only() {
        let t = table(&[(1, "123 Main St"), (1, "123 Main St"), (1, "456 Oak Ave")]);
        let rule = exact();
        let result = find_adjacent(&t, &rule, &rule, &config()).unwrap();
        assert_eq!(addresses(&result), vec!["123 Main St"]);
    }

    #[test]
    fn test_comparison_never_crosses_partitions() {
        // Same address, different patients: no adjacency
        let t = table(&[(1, "123 Main St"), (2, "123 Main St")]);
        let rule = exact();
        let result = find_adjacent(&t, &rule, &rule, &config()).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_partitions_interleave_by_row_order() {
        // Patient 1's rows are adjacent within their partition even with
        // patient 2's row between them in the table
        let t = table(&[(1, "9 Elm"), (2, "9 Elm"), (1, "9 Elm")]);
        let rule = exact();
        let result = find_adjacent(&t, &rule, &rule, &config()).unwrap();
        assert_eq!(result.len(), 1);
        assert_eq!(result.value(0, 0).unwrap().render(), "1");
    }

    #[test]
    fn test_bidirectional_emits_successor_pass_first() {
        let t = table(&[(1, "9 Elm"), (1, "9 Elm"), (1, "456 Oak Ave")]);
        let rule = exact();
        let mut cfg = config();
        cfg.direction = Direction::Bidirectional;
        let result = find_adjacent(&t, &rule, &rule, &cfg).unwrap();
        // Row 0 from the successor pass, then row 1 from the predecessor
        // pass
        assert_eq!(result.len(), 2);
        assert_eq!(result.rows()[0], t.rows()[0]);
        assert_eq!(result.rows()[1], t.rows()[1]);
    }

    #[test]
    fn test_middle_row_appears_twice_in_context_mode() {
        let t = table(&[(1, "9 Elm"), (1, "9 Elm"), (1, "9 Elm")]);
        let rule = exact();
        let mut cfg = config();
        cfg.direction = Direction::Bidirectional;
        let result = find_adjacent(&t, &rule, &rule, &cfg).unwrap();
        // Successor pass: rows 0, 1; predecessor pass: rows 1, 2
        assert_eq!(result.len(), 4);
    }

    #[test]
    fn test_sort_keys_stable_sort() {
        let mut t = Table::new(["patient_id", "address", "seq"]);
        for (id, addr, seq) in [
            (2i64, "9 Elm", 4i64),
            (2, "9 Elm", 5),
            (1, "9 Elm", 1),
            (1, "9 Elm", 2),
        ] {
            t.push_row(vec![Value::from(id), Value::from(addr), Value::from(seq)])
                .unwrap();
        }
        let rule = exact();
        let mut cfg = config();
        cfg.sort_keys = Some(vec!["patient_id".into()]);
        let result = find_adjacent(&t, &rule, &rule, &cfg).unwrap();
        let ids: Vec<String> = (0..result.len())
            .map(|i| result.value(i, 0).unwrap().render())
            .collect();
        assert_eq!(ids, vec!["1", "2"]);
    }

    #[test]
    fn test_empty_group_keys_fail_before_processing() {
        let t = table(&[(1, "9 Elm"), (1, "9 Elm")]);
        let rule = exact();
        let mut cfg = config();
        cfg.group_keys = Vec::new();
        let err = find_adjacent(&t, &rule, &rule, &cfg).unwrap_err();
        assert!(matches!(err, MatchError::MissingParameter(_)));
    }

    #[test]
    fn test_unknown_sort_key_is_missing_parameter() {
        let t = table(&[(1, "9 Elm")]);
        let rule = exact();
        let mut cfg = config();
        cfg.sort_keys = Some(vec!["visit_date".into()]);
        let err = find_adjacent(&t, &rule, &rule, &cfg).unwrap_err();
        assert!(matches!(err, MatchError::MissingParameter(_)));
    }

    #[test]
    fn test_group_key_tuple_does_not_collide_across_columns() {
        // ("ab","c") and ("a","bc") must be distinct partitions
        let mut t = Table::new(["k1", "k2", "address"]);
        for (k1, k2) in [("ab", "c"), ("a", "bc")] {
            t.push_row(vec![
                Value::from(k1),
                Value::from(k2),
                Value::from("9 Elm"),
            ])
            .unwrap();
        }
        let rule = exact();
        let mut cfg = config();
        cfg.group_keys = vec!["k1".into(), "k2".into()];
        let result = find_adjacent(&t, &rule, &rule, &cfg).unwrap();
        assert!(result.is_empty());
    }

    #[test]
    fn test_blank_filter_drops_matching_blank_rows() {
        let t = table(&[(1, ""), (1, "")]);
        let rule = exact();
        let mut cfg = config();
        cfg.filters = vec![ExclusionFilter::Blank];
        let result = find_adjacent(&t, &rule, &rule, &cfg).unwrap();
        assert!(result.is_empty());
        // Without the filter the blank pair does match
        let unfiltered = find_adjacent(&t, &rule, &rule, &config()).unwrap();
        assert_eq!(unfiltered.len(), 1);
    }
}
