//! addrdup-table: In-memory tabular data model.
//!
//! Tables are ordered sequences of rows over named columns. Row order is
//! caller-determined and preserved by every operation built on top of this
//! crate — it encodes the record sequence that adjacency comparison
//! depends on.

pub mod table;
pub mod value;

pub use table::*;
pub use value::*;
