//! # Ordered Table Index
//!
//! Each table's records sit behind a B-tree whose nodes are container blocks
//! addressed by node id. This module implements the read side of that tree:
//! node decoding ([`interior`], [`leaf`]) and the lookup protocol
//! ([`tree`]).
//!
//! ## Node kinds
//!
//! The first node byte selects the layout. Only the long-key family (64-bit
//! signed integer keys) is implemented; the var-key and fixed-key families
//! exist in the format and are rejected as corruption if encountered, rather
//! than misread.
//!
//! | Code | Layout |
//! |------|--------------------------------|
//! | 0 | long-key interior node |
//! | 1 | long-key variable-record leaf |
//! | 2 | long-key fixed-record leaf |
//! | 3-7 | var-key / fixed-key families (unsupported) |
//! | 8 | chained buffer index |
//! | 9 | chained buffer data |
//!
//! ## Lookup protocol
//!
//! Every node visit is an independent source read; nothing is cached between
//! calls, and a lookup is O(tree height) node reads. A decode failure at any
//! depth aborts the whole lookup; a partially-materialized record is never
//! returned.

pub mod interior;
pub mod leaf;
pub mod tree;

use crate::error::Result;

/// Node kind codes, stored as the first byte of every node.
pub mod node_kind {
    pub const LONG_INTERIOR: u8 = 0;
    pub const LONG_VAR_LEAF: u8 = 1;
    pub const LONG_FIXED_LEAF: u8 = 2;
    pub const VARKEY_INTERIOR: u8 = 3;
    pub const VARKEY_LEAF: u8 = 4;
    pub const FIXEDKEY_INTERIOR: u8 = 5;
    pub const FIXEDKEY_VAR_LEAF: u8 = 6;
    pub const FIXEDKEY_FIXED_LEAF: u8 = 7;
    pub const CHAINED_INDEX: u8 = 8;
    pub const CHAINED_DATA: u8 = 9;
}

/// Outcome of a sorted-key search within one node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchOutcome {
    /// Exact match at this entry index.
    Found(i32),
    /// No match; the key would sort immediately before this entry index
    /// (the insertion point, in `0..=entry_count`).
    Missing(i32),
}

/// Binary search over a node's sorted key sequence. `key_at` reads the key
/// at an entry index and may fail, aborting the search.
///
/// Keys are unique in a well-formed file; if a corrupt file repeats a key,
/// whichever duplicate the probe sequence lands on first wins (best effort,
/// not a guarantee).
pub(crate) fn search_keys<F>(entry_count: i32, target: i64, mut key_at: F) -> Result<SearchOutcome>
where
    F: FnMut(i32) -> Result<i64>,
{
    let mut lo = 0;
    let mut hi = entry_count - 1;
    while lo <= hi {
        let mid = lo + (hi - lo) / 2;
        let key = key_at(mid)?;
        if key == target {
            return Ok(SearchOutcome::Found(mid));
        } else if key < target {
            lo = mid + 1;
        } else {
            hi = mid - 1;
        }
    }
    Ok(SearchOutcome::Missing(lo))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn search(keys: &[i64], target: i64) -> SearchOutcome {
        search_keys(keys.len() as i32, target, |i| Ok(keys[i as usize])).unwrap()
    }

    #[test]
    fn finds_every_present_key() {
        let keys = [1, 3, 5, 7, 9];
        for (i, k) in keys.iter().enumerate() {
            assert_eq!(search(&keys, *k), SearchOutcome::Found(i as i32));
        }
    }

    #[test]
    fn missing_keys_report_insertion_point() {
        let keys = [1, 3, 5, 7, 9];
        assert_eq!(search(&keys, 0), SearchOutcome::Missing(0));
        assert_eq!(search(&keys, 2), SearchOutcome::Missing(1));
        assert_eq!(search(&keys, 6), SearchOutcome::Missing(3));
        assert_eq!(search(&keys, 10), SearchOutcome::Missing(5));
    }

    #[test]
    fn empty_node_always_misses_at_zero() {
        assert_eq!(search(&[], 42), SearchOutcome::Missing(0));
    }

    #[test]
    fn key_read_failure_aborts_search() {
        let result = search_keys(4, 2, |_| {
            Err(crate::error::GbfError::corrupt("bad key read"))
        });
        assert!(result.is_err());
    }
}
