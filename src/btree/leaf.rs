//! # Leaf Nodes
//!
//! Leaf nodes hold the actual records. Both long-key leaf layouts share a
//! 13-byte header and sibling links that stitch all leaves of one table into
//! an ordered doubly-linked list (link value `-1` means no sibling):
//!
//! ```text
//! +------+-----------+---------------+---------------+
//! | kind | count:i32 | prev_leaf:i32 | next_leaf:i32 |
//! +------+-----------+---------------+---------------+
//! ```
//!
//! ## Fixed-record leaves (kind 2)
//!
//! Every record image has the same width (the schema is all fixed-width
//! columns), so entries are simply packed:
//!
//! ```text
//! | key0:i64 | image0 | key1:i64 | image1 | ...
//! ```
//!
//! ## Variable-record leaves (kind 1)
//!
//! Entries are (key, locator) pairs; record images are packed from the node
//! end downward and located by a 31-bit byte offset from the node base:
//!
//! ```text
//! | key0:i64 | loc0:u32 | ... | keyN:i64 | locN:u32 | free | imgN | ... | img0 |
//! ```
//!
//! A set high bit in the locator marks indirect storage: the 4 bytes at the
//! offset hold a chained-buffer node id, and the record image lives in that
//! chained buffer (used by producers when a record outgrows the node). The
//! materializer reads it through [`ChainedSource`] transparently.
//!
//! [`ChainedSource`]: crate::source::ChainedSource

use zerocopy::big_endian::I32;
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use super::{node_kind, search_keys, SearchOutcome};
use crate::container::Database;
use crate::cursor::Cursor;
use crate::error::{GbfError, Result};
use crate::record::Record;
use crate::schema::TableSchema;
use crate::source::ChainedSource;
use crate::value::FieldValue;

const HEADER_LEN: u64 = 13;
const KEY_LEN: u64 = 8;
const LOCATOR_LEN: u64 = 4;

/// High locator bit marking an indirectly-stored record image.
const INDIRECT_FLAG: u32 = 0x8000_0000;

/// No sibling in this direction.
const NO_SIBLING: i32 = -1;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
struct RawLeafHeader {
    kind: u8,
    entry_count: I32,
    prev_leaf: I32,
    next_leaf: I32,
}

const _: () = assert!(std::mem::size_of::<RawLeafHeader>() == HEADER_LEN as usize);

fn read_header(db: &Database, nid: i32, expected_kind: u8) -> Result<(RawLeafHeader, u64)> {
    db.check_node_id(nid)?;
    let base = db.buffer_address(nid);

    let mut raw = [0u8; HEADER_LEN as usize];
    db.source().read_at(base, &mut raw)?;
    let header = RawLeafHeader::ref_from_bytes(&raw)
        .map_err(|_| GbfError::corrupt("malformed leaf header"))?;

    if header.kind != expected_kind {
        return Err(GbfError::corrupt(format!(
            "expected leaf kind {expected_kind} at node {nid}, found {}",
            header.kind
        )));
    }
    if header.entry_count.get() < 0 {
        return Err(GbfError::corrupt(format!(
            "leaf node {nid} has negative entry count"
        )));
    }

    Ok((*header, base))
}

/// Long-key leaf with fixed-width record images.
pub(crate) struct FixedLeaf<'d> {
    db: &'d Database,
    entry_count: i32,
    prev_leaf: i32,
    next_leaf: i32,
    base: u64,
    value_len: u32,
}

impl<'d> FixedLeaf<'d> {
    pub(crate) fn read(db: &'d Database, nid: i32, value_len: u32) -> Result<FixedLeaf<'d>> {
        let (header, base) = read_header(db, nid, node_kind::LONG_FIXED_LEAF)?;
        Ok(FixedLeaf {
            db,
            entry_count: header.entry_count.get(),
            prev_leaf: header.prev_leaf.get(),
            next_leaf: header.next_leaf.get(),
            base,
            value_len,
        })
    }

    fn entry_offset(&self, index: i32) -> u64 {
        self.base + HEADER_LEN + index as u64 * (KEY_LEN + self.value_len as u64)
    }

    fn key_at(&self, index: i32) -> Result<i64> {
        let mut cursor = Cursor::new(self.db.source(), self.entry_offset(index));
        cursor.read_i64(self.db.endian())
    }

    fn record_at(&self, index: i32, schema: &TableSchema) -> Result<Record> {
        let key = self.key_at(index)?;
        let mut cursor = Cursor::new(self.db.source(), self.entry_offset(index) + KEY_LEN);
        schema.read_record(FieldValue::Long(key), &mut cursor, self.db.endian())
    }
}

/// Long-key leaf with variable-width record images.
pub(crate) struct VarLeaf<'d> {
    db: &'d Database,
    entry_count: i32,
    prev_leaf: i32,
    next_leaf: i32,
    base: u64,
}

impl<'d> VarLeaf<'d> {
    pub(crate) fn read(db: &'d Database, nid: i32) -> Result<VarLeaf<'d>> {
        let (header, base) = read_header(db, nid, node_kind::LONG_VAR_LEAF)?;
        Ok(VarLeaf {
            db,
            entry_count: header.entry_count.get(),
            prev_leaf: header.prev_leaf.get(),
            next_leaf: header.next_leaf.get(),
            base,
        })
    }

    fn entry_offset(&self, index: i32) -> u64 {
        self.base + HEADER_LEN + index as u64 * (KEY_LEN + LOCATOR_LEN)
    }

    fn key_at(&self, index: i32) -> Result<i64> {
        let mut cursor = Cursor::new(self.db.source(), self.entry_offset(index));
        cursor.read_i64(self.db.endian())
    }

    fn locator_at(&self, index: i32) -> Result<u32> {
        let mut cursor = Cursor::new(self.db.source(), self.entry_offset(index) + KEY_LEN);
        cursor.read_u32(self.db.endian())
    }

    fn record_at(&self, index: i32, schema: &TableSchema) -> Result<Record> {
        let key = self.key_at(index)?;
        let locator = self.locator_at(index)?;
        let offset = (locator & !INDIRECT_FLAG) as u64;
        if offset >= self.db.buffer_size() {
            return Err(GbfError::corrupt(format!(
                "record locator offset {offset} past node end"
            )));
        }

        if locator & INDIRECT_FLAG != 0 {
            // The slot holds a chained-buffer id; the image lives there.
            let mut id_cursor = Cursor::new(self.db.source(), self.base + offset);
            let chain_id = id_cursor.read_i32(self.db.endian())?;
            let chain = ChainedSource::new(self.db, chain_id)?;
            let mut cursor = Cursor::new(&chain, 0);
            schema.read_record(FieldValue::Long(key), &mut cursor, self.db.endian())
        } else {
            let mut cursor = Cursor::new(self.db.source(), self.base + offset);
            schema.read_record(FieldValue::Long(key), &mut cursor, self.db.endian())
        }
    }
}

/// A decoded leaf of either layout, presenting one record interface to the
/// lookup protocol.
pub(crate) enum LeafNode<'d> {
    Fixed(FixedLeaf<'d>),
    Var(VarLeaf<'d>),
}

impl<'d> LeafNode<'d> {
    /// Decodes the leaf at `nid`, dispatching on its kind byte. The schema
    /// decides the fixed record width; a fixed-record node for a schema with
    /// variable-width columns cannot be well-formed.
    pub(crate) fn read(db: &'d Database, nid: i32, schema: &TableSchema) -> Result<LeafNode<'d>> {
        match db.read_node_kind(nid)? {
            node_kind::LONG_VAR_LEAF => Ok(LeafNode::Var(VarLeaf::read(db, nid)?)),
            node_kind::LONG_FIXED_LEAF => {
                let value_len = schema.fixed_value_len().ok_or_else(|| {
                    GbfError::corrupt(format!(
                        "fixed-record node {nid} for variable-width table '{}'",
                        schema.name()
                    ))
                })?;
                Ok(LeafNode::Fixed(FixedLeaf::read(db, nid, value_len)?))
            }
            other => Err(GbfError::corrupt(format!(
                "expected leaf node at id {nid}, found kind {other}"
            ))),
        }
    }

    pub(crate) fn db(&self) -> &'d Database {
        match self {
            LeafNode::Fixed(leaf) => leaf.db,
            LeafNode::Var(leaf) => leaf.db,
        }
    }

    pub(crate) fn entry_count(&self) -> i32 {
        match self {
            LeafNode::Fixed(leaf) => leaf.entry_count,
            LeafNode::Var(leaf) => leaf.entry_count,
        }
    }

    pub(crate) fn next_leaf(&self) -> i32 {
        match self {
            LeafNode::Fixed(leaf) => leaf.next_leaf,
            LeafNode::Var(leaf) => leaf.next_leaf,
        }
    }

    pub(crate) fn prev_leaf(&self) -> i32 {
        match self {
            LeafNode::Fixed(leaf) => leaf.prev_leaf,
            LeafNode::Var(leaf) => leaf.prev_leaf,
        }
    }

    pub(crate) fn key_at(&self, index: i32) -> Result<i64> {
        match self {
            LeafNode::Fixed(leaf) => leaf.key_at(index),
            LeafNode::Var(leaf) => leaf.key_at(index),
        }
    }

    pub(crate) fn record_at(&self, index: i32, schema: &TableSchema) -> Result<Record> {
        match self {
            LeafNode::Fixed(leaf) => leaf.record_at(index, schema),
            LeafNode::Var(leaf) => leaf.record_at(index, schema),
        }
    }

    pub(crate) fn search(&self, key: i64) -> Result<SearchOutcome> {
        search_keys(self.entry_count(), key, |i| self.key_at(i))
    }

    /// First record of the next sibling leaf, or `None` at the table end.
    pub(crate) fn first_of_next(&self, schema: &TableSchema) -> Result<Option<Record>> {
        if self.next_leaf() == NO_SIBLING {
            return Ok(None);
        }
        let next = LeafNode::read(self.db(), self.next_leaf(), schema)?;
        if next.entry_count() < 1 {
            return Ok(None);
        }
        next.record_at(0, schema).map(Some)
    }

    /// Last record of the previous sibling leaf, or `None` at the table
    /// start.
    pub(crate) fn last_of_prev(&self, schema: &TableSchema) -> Result<Option<Record>> {
        if self.prev_leaf() == NO_SIBLING {
            return Ok(None);
        }
        let prev = LeafNode::read(self.db(), self.prev_leaf(), schema)?;
        if prev.entry_count() < 1 {
            return Ok(None);
        }
        prev.record_at(prev.entry_count() - 1, schema).map(Some)
    }
}
