//! addrdup-core: Row-adjacency duplicate detection for grouped tabular
//! geographic records.
//!
//! Repeated measurements of one location often log near-identical address
//! rows ("123 Main Street" vs "123 Main St" across clinic visits). Within
//! a partition of rows defined by one or more grouping keys, each
//! operation compares a row's value — raw, normalized, or
//! pattern-extracted — against its immediate predecessor and/or
//! successor, and flags rows whose value matches that neighbor. The
//! flagged table is meant to be subtracted from the input to produce a
//! deduplicated dataset.
//!
//! Every public operation in [`ops`] is a thin parameterization of the
//! single engine in [`engine`]: a field rule, a comparator, and a set of
//! exclusion filters. Not a fuzzy-matching system: no edit distance, no
//! phonetic matching, and no comparison beyond immediate neighbors.

pub mod engine;
pub mod error;
pub mod extract;
pub mod filter;
pub mod ops;

pub use engine::{find_adjacent, Comparator, Direction, MatchConfig};
pub use error::{MatchError, MatchResult};
pub use extract::FieldRule;
pub use filter::ExclusionFilter;
pub use ops::*;
