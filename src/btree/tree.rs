//! # Table Views and the Lookup Protocol
//!
//! A [`TableView`] binds one schema and one index root against one
//! container. Views are stateless between calls: every lookup descends from
//! the root again, re-reading each node through the byte source (the source
//! itself, e.g. an mmap, is the caching layer). This keeps views trivially
//! shareable and immune to invalidation.
//!
//! ## Lookup semantics
//!
//! All lookups take a 64-bit signed key and return at most one record:
//!
//! | Operation | Returns |
//! |--------------------|---------|
//! | [`get_at`] | the record with exactly this key |
//! | [`get_after`] | the record with the smallest key strictly greater |
//! | [`get_at_after`] | `get_at` if present, else `get_after` (ceiling) |
//! | [`get_before`] | the record with the greatest key strictly smaller |
//! | [`get_at_before`] | `get_at` if present, else `get_before` (floor) |
//!
//! Descent binary-searches each interior node and lands on the leaf whose
//! range covers the key; successor and predecessor results that fall past
//! the leaf boundary are fetched through the sibling links, so no ancestor
//! backtracking is needed. "No such key" is an explicit `None`, never an
//! error; any decode failure mid-descent aborts the lookup with that error.
//!
//! [`get_at`]: TableView::get_at
//! [`get_after`]: TableView::get_after
//! [`get_at_after`]: TableView::get_at_after
//! [`get_before`]: TableView::get_before
//! [`get_at_before`]: TableView::get_at_before

use tracing::trace;

use super::interior::InteriorNode;
use super::leaf::LeafNode;
use super::{node_kind, SearchOutcome};
use crate::container::Database;
use crate::error::{GbfError, Result};
use crate::record::Record;
use crate::schema::TableSchema;

/// Upper bound on descent depth; a corrupt file with a child-pointer cycle
/// fails here instead of looping.
const MAX_DESCENT: u32 = 64;

/// A read-only lookup view over one table's ordered index.
pub struct TableView<'d, 's> {
    db: &'d Database,
    schema: &'s TableSchema,
    root: i32,
}

impl<'d, 's> TableView<'d, 's> {
    pub fn new(db: &'d Database, schema: &'s TableSchema, root_node_id: i32) -> Result<Self> {
        db.check_node_id(root_node_id)?;
        Ok(TableView {
            db,
            schema,
            root: root_node_id,
        })
    }

    pub fn schema(&self) -> &TableSchema {
        self.schema
    }

    /// Exact match: the record keyed `key`, or `None`.
    pub fn get_at(&self, key: i64) -> Result<Option<Record>> {
        let leaf = self.leaf_for(key)?;
        match leaf.search(key)? {
            SearchOutcome::Found(i) => leaf.record_at(i, self.schema).map(Some),
            SearchOutcome::Missing(_) => Ok(None),
        }
    }

    /// Strict successor: the record with the smallest key greater than
    /// `key`, or `None` if `key` is at or past the table maximum.
    pub fn get_after(&self, key: i64) -> Result<Option<Record>> {
        let leaf = self.leaf_for(key)?;
        let index = match leaf.search(key)? {
            SearchOutcome::Found(i) => i + 1,
            SearchOutcome::Missing(ins) => ins,
        };
        if index >= leaf.entry_count() {
            return leaf.first_of_next(self.schema);
        }
        leaf.record_at(index, self.schema).map(Some)
    }

    /// Ceiling: `get_at(key)` if present, else `get_after(key)`.
    pub fn get_at_after(&self, key: i64) -> Result<Option<Record>> {
        let leaf = self.leaf_for(key)?;
        let index = match leaf.search(key)? {
            SearchOutcome::Found(i) => i,
            SearchOutcome::Missing(ins) => ins,
        };
        if index >= leaf.entry_count() {
            return leaf.first_of_next(self.schema);
        }
        leaf.record_at(index, self.schema).map(Some)
    }

    /// Strict predecessor: the record with the greatest key smaller than
    /// `key`, or `None` if `key` is at or below the table minimum.
    pub fn get_before(&self, key: i64) -> Result<Option<Record>> {
        let leaf = self.leaf_for(key)?;
        let index = match leaf.search(key)? {
            SearchOutcome::Found(i) => i - 1,
            SearchOutcome::Missing(ins) => ins - 1,
        };
        if index < 0 {
            return leaf.last_of_prev(self.schema);
        }
        leaf.record_at(index, self.schema).map(Some)
    }

    /// Floor: `get_at(key)` if present, else `get_before(key)`.
    pub fn get_at_before(&self, key: i64) -> Result<Option<Record>> {
        let leaf = self.leaf_for(key)?;
        let index = match leaf.search(key)? {
            SearchOutcome::Found(i) => i,
            SearchOutcome::Missing(ins) => ins - 1,
        };
        if index < 0 {
            return leaf.last_of_prev(self.schema);
        }
        leaf.record_at(index, self.schema).map(Some)
    }

    /// Forward iterator starting at the ceiling of `key` and running to the
    /// end of the table via sibling links. Pass `i64::MIN` for a full scan.
    pub fn iter_from(&self, key: i64) -> Result<RecordIter<'d, 's>> {
        let leaf = self.leaf_for(key)?;
        let index = match leaf.search(key)? {
            SearchOutcome::Found(i) => i,
            SearchOutcome::Missing(ins) => ins,
        };
        Ok(RecordIter {
            schema: self.schema,
            leaf: Some(leaf),
            index,
        })
    }

    /// Root-to-leaf descent toward `key`.
    fn leaf_for(&self, key: i64) -> Result<LeafNode<'d>> {
        let mut nid = self.root;
        for _ in 0..MAX_DESCENT {
            match self.db.read_node_kind(nid)? {
                node_kind::LONG_INTERIOR => {
                    trace!(nid, "descending interior node");
                    nid = InteriorNode::read(self.db, nid)?.child_for(key)?;
                }
                node_kind::LONG_VAR_LEAF | node_kind::LONG_FIXED_LEAF => {
                    return LeafNode::read(self.db, nid, self.schema);
                }
                other => {
                    return Err(GbfError::corrupt(format!(
                        "unexpected node kind {other} at id {nid} during descent"
                    )));
                }
            }
        }
        Err(GbfError::corrupt("index descent exceeded maximum depth"))
    }
}

/// Ordered forward iteration over a table's records.
///
/// Each step materializes one record; decode failures surface per item, and
/// iteration ends after the first failure.
pub struct RecordIter<'d, 's> {
    schema: &'s TableSchema,
    leaf: Option<LeafNode<'d>>,
    index: i32,
}

impl<'d, 's> Iterator for RecordIter<'d, 's> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let leaf = self.leaf.as_ref()?;

            if self.index < leaf.entry_count() {
                let record = leaf.record_at(self.index, self.schema);
                self.index += 1;
                if record.is_err() {
                    self.leaf = None;
                }
                return Some(record);
            }

            let next_nid = leaf.next_leaf();
            if next_nid == -1 {
                self.leaf = None;
                return None;
            }

            match LeafNode::read(leaf.db(), next_nid, self.schema) {
                Ok(next) => {
                    self.leaf = Some(next);
                    self.index = 0;
                }
                Err(err) => {
                    self.leaf = None;
                    return Some(Err(err));
                }
            }
        }
    }
}
