//! Exclusion filters dropping flagged rows from a match result

use lazy_static::lazy_static;
use regex::Regex;
use serde::{Deserialize, Serialize};

lazy_static! {
    // Case-sensitive: anchored spellings plus the standalone token
    // anywhere in the address.
    static ref PO_BOX: Regex =
        Regex::new(r"^(PO BOX|P\.O\. BOX|P O BOX|P\.O\.|POBOX|P\.O)|\bPO BOX\b").unwrap();
}

/// A predicate over a flagged row's raw target value; rows satisfying an
/// active filter are removed from the result even though they matched
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExclusionFilter {
    /// Raw value is the empty string
    Blank,
    /// Raw value is a post-office-box-only address
    PoBox,
}

impl ExclusionFilter {
    pub fn excludes(&self, raw: &str) -> bool {
        match self {
            ExclusionFilter::Blank => raw.is_empty(),
            ExclusionFilter::PoBox => PO_BOX.is_match(raw),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank() {
        assert!(ExclusionFilter::Blank.excludes(""));
        assert!(!ExclusionFilter::Blank.excludes(" "));
        assert!(!ExclusionFilter::Blank.excludes("123 Main St"));
    }

    #[test]
    fn test_po_box_anchored_spellings() {
        for addr in [
            "PO BOX 12",
            "P.O. BOX 12",
            "P O BOX 12",
            "P.O. 12",
            "POBOX 12",
            "P.O 12",
        ] {
            assert!(ExclusionFilter::PoBox.excludes(addr), "{addr}");
        }
    }

    #[test]
    fn test_po_box_token_anywhere() {
        assert!(ExclusionFilter::PoBox.excludes("RURAL ROUTE 2 PO BOX 9"));
    }

    #[test]
    fn test_po_box_is_case_sensitive() {
        assert!(!ExclusionFilter::PoBox.excludes("po box 12"));
        assert!(!ExclusionFilter::PoBox.excludes("P.o. Box 12"));
    }

    #[test]
    fn test_street_addresses_pass() {
        assert!(!ExclusionFilter::PoBox.excludes("123 Main St"));
        assert!(!ExclusionFilter::PoBox.excludes("POINT PLEASANT RD"));
    }
}
