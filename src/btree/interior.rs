//! # Interior Nodes
//!
//! A long-key interior node partitions the key space among its children.
//! After the kind byte and entry count, entries are packed 12 bytes each:
//!
//! ```text
//! +------+-----------+  +----------+----------+     +----------+----------+
//! | kind | count:i32 |  | key0:i64 | nid0:i32 | ... | keyN:i64 | nidN:i32 |
//! +------+-----------+  +----------+----------+     +----------+----------+
//! ```
//!
//! Entry keys ascend, and entry `i`'s key is the smallest key reachable in
//! child `i`'s subtree; entry 0 therefore stands for the lower bound of the
//! leftmost child. Descent for a target key follows the greatest entry whose
//! key is `<=` the target, and child 0 when the target precedes every entry,
//! so any in-range key has exactly one descent path.

use super::{node_kind, search_keys, SearchOutcome};
use crate::container::Database;
use crate::cursor::Cursor;
use crate::error::{GbfError, Result};

const HEADER_LEN: u64 = 1 + 4;
const KEY_LEN: u64 = 8;
const CHILD_LEN: u64 = 4;
const ENTRY_LEN: u64 = KEY_LEN + CHILD_LEN;

pub(crate) struct InteriorNode<'d> {
    db: &'d Database,
    entry_count: i32,
    base: u64,
}

impl<'d> InteriorNode<'d> {
    pub(crate) fn read(db: &'d Database, nid: i32) -> Result<InteriorNode<'d>> {
        db.check_node_id(nid)?;
        let base = db.buffer_address(nid);
        let mut cursor = Cursor::new(db.source(), base);

        let kind = cursor.read_u8()?;
        if kind != node_kind::LONG_INTERIOR {
            return Err(GbfError::corrupt(format!(
                "expected interior node at id {nid}, found kind {kind}"
            )));
        }

        let entry_count = cursor.read_i32(db.endian())?;
        if entry_count < 0 {
            return Err(GbfError::corrupt(format!(
                "interior node {nid} has negative entry count {entry_count}"
            )));
        }

        Ok(InteriorNode {
            db,
            entry_count,
            base,
        })
    }

    fn entry_offset(&self, index: i32) -> u64 {
        self.base + HEADER_LEN + index as u64 * ENTRY_LEN
    }

    pub(crate) fn key_at(&self, index: i32) -> Result<i64> {
        let mut cursor = Cursor::new(self.db.source(), self.entry_offset(index));
        cursor.read_i64(self.db.endian())
    }

    pub(crate) fn child_at(&self, index: i32) -> Result<i32> {
        let mut cursor = Cursor::new(self.db.source(), self.entry_offset(index) + KEY_LEN);
        cursor.read_i32(self.db.endian())
    }

    /// The child node id whose subtree range contains `key`.
    pub(crate) fn child_for(&self, key: i64) -> Result<i32> {
        if self.entry_count == 0 {
            return Err(GbfError::corrupt("interior node holds no entries"));
        }

        let index = match search_keys(self.entry_count, key, |i| self.key_at(i))? {
            SearchOutcome::Found(i) => i,
            // Keys below every entry belong to the leftmost child.
            SearchOutcome::Missing(ins) => (ins - 1).max(0),
        };
        self.child_at(index)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::container::Database;
    use crate::source::MemSource;

    const BLOCK_SIZE: usize = 128;

    /// Minimal container with block 0 = parameter block and block 1 = the
    /// interior node under test. The master root points at a block we never
    /// touch in these tests, so the catalog scan needs a real (empty) leaf.
    fn container_with_interior(entries: &[(i64, i32)]) -> Database {
        let mut image = vec![0u8; BLOCK_SIZE * 4];

        // Header: magic, file id, format version, block size, first free.
        image[16..20].copy_from_slice(&1i32.to_be_bytes());
        image[20..24].copy_from_slice(&(BLOCK_SIZE as i32).to_be_bytes());

        // Block 0: parameter block (chained data node).
        let b0 = BLOCK_SIZE + 5;
        image[b0] = node_kind::CHAINED_DATA;
        image[b0 + 1..b0 + 5].copy_from_slice(&13i32.to_be_bytes());
        image[b0 + 5] = 1; // version
        image[b0 + 6..b0 + 10].copy_from_slice(&2i32.to_be_bytes()); // master root = node 2
        // database id halves stay zero

        // Block 1 (node id 1): interior node.
        let b1 = 2 * BLOCK_SIZE + 5;
        image[b1] = node_kind::LONG_INTERIOR;
        image[b1 + 1..b1 + 5].copy_from_slice(&(entries.len() as i32).to_be_bytes());
        let mut at = b1 + 5;
        for (key, child) in entries {
            image[at..at + 8].copy_from_slice(&key.to_be_bytes());
            image[at + 8..at + 12].copy_from_slice(&child.to_be_bytes());
            at += 12;
        }

        // Block 2 (node id 2): empty var leaf, so the master scan is empty.
        let b2 = 3 * BLOCK_SIZE + 5;
        image[b2] = node_kind::LONG_VAR_LEAF;
        image[b2 + 1..b2 + 5].copy_from_slice(&0i32.to_be_bytes());
        image[b2 + 5..b2 + 9].copy_from_slice(&(-1i32).to_be_bytes());
        image[b2 + 9..b2 + 13].copy_from_slice(&(-1i32).to_be_bytes());

        Database::open(Box::new(MemSource::new(image)), 0).unwrap()
    }

    #[test]
    fn descent_follows_the_containing_child() {
        let db = container_with_interior(&[(i64::MIN, 10), (100, 11), (200, 12)]);
        let node = InteriorNode::read(&db, 1).unwrap();

        assert_eq!(node.child_for(-5).unwrap(), 10);
        assert_eq!(node.child_for(99).unwrap(), 10);
        assert_eq!(node.child_for(100).unwrap(), 11);
        assert_eq!(node.child_for(150).unwrap(), 11);
        assert_eq!(node.child_for(200).unwrap(), 12);
        assert_eq!(node.child_for(i64::MAX).unwrap(), 12);
    }

    #[test]
    fn keys_below_every_entry_go_left() {
        let db = container_with_interior(&[(50, 7), (100, 8)]);
        let node = InteriorNode::read(&db, 1).unwrap();
        assert_eq!(node.child_for(10).unwrap(), 7);
    }

    #[test]
    fn empty_interior_node_is_corrupt() {
        let db = container_with_interior(&[]);
        let node = InteriorNode::read(&db, 1).unwrap();
        assert!(node.child_for(1).is_err());
    }

    #[test]
    fn wrong_kind_byte_is_rejected() {
        let db = container_with_interior(&[(0, 2)]);
        // Node 2 is a leaf, not an interior node.
        assert!(InteriorNode::read(&db, 2).is_err());
    }
}
