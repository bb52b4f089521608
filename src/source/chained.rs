//! # Chained Buffers
//!
//! Payloads larger than one block (the container parameters, and record
//! images spilled out of variable-record leaves) are stored as *chained
//! buffers*: a logical byte sequence spread over container blocks and read
//! back through this module as an ordinary [`ByteSource`].
//!
//! ## Single-block form
//!
//! A payload that fits one block is a lone chained-data node:
//!
//! ```text
//! +------+-----------+------------------+
//! | kind | size:u32  | data (size bytes)|
//! +------+-----------+------------------+
//! ```
//!
//! ## Indexed form
//!
//! Larger payloads start at a chained-index node mapping logical block
//! positions to data node ids; index nodes link forward when the map itself
//! outgrows a block:
//!
//! ```text
//! index node:  | kind | size:u32 | next_index:i32 | data_id0:i32 | ... |
//! data node:   | kind | data ...                                      |
//! ```
//!
//! Only the first index node's size field is meaningful. A negative data
//! node id marks a block that was never written and reads back as zeroes.
//!
//! The high bit of the size field marks an obfuscated payload. Obfuscation
//! is a producer-side option this engine does not implement, so such
//! buffers are rejected at construction.

use crate::btree::node_kind;
use crate::container::Database;
use crate::cursor::Cursor;
use crate::error::{GbfError, Result};
use crate::source::ByteSource;

/// High bit of the stored size field: payload bytes are obfuscated.
const OBFUSCATED_FLAG: u32 = 0x8000_0000;

/// kind + size prefix of a single-block chained-data node.
const DATA_HEADER_LEN: u64 = 1 + 4;

/// kind + size + next-index prefix of a chained-index node.
const INDEX_HEADER_LEN: u64 = 1 + 4 + 4;

/// A chained buffer opened for reading, addressed as a contiguous byte
/// sequence starting at offset 0.
pub struct ChainedSource<'d> {
    db: &'d Database,
    size: u64,
    /// Offset of payload bytes within each data node's buffer.
    data_start: u64,
    /// Payload bytes per data node.
    per_block: u64,
    /// Data node ids in logical order; negative ids are sparse zero blocks.
    blocks: Vec<i32>,
}

impl<'d> ChainedSource<'d> {
    /// Opens the chained buffer rooted at `nid`, resolving its full block
    /// map up front so reads cannot fail on chain structure.
    pub fn new(db: &'d Database, nid: i32) -> Result<ChainedSource<'d>> {
        match db.read_node_kind(nid)? {
            node_kind::CHAINED_DATA => Self::open_single(db, nid),
            node_kind::CHAINED_INDEX => Self::open_indexed(db, nid),
            other => Err(GbfError::corrupt(format!(
                "expected chained buffer at node {nid}, found kind {other}"
            ))),
        }
    }

    fn open_single(db: &'d Database, nid: i32) -> Result<ChainedSource<'d>> {
        let mut cursor = Cursor::new(db.source(), db.buffer_address(nid) + 1);
        let size = read_size(&mut cursor, db)?;

        let capacity = db.buffer_size() - DATA_HEADER_LEN;
        if size > capacity {
            return Err(GbfError::corrupt(format!(
                "chained buffer of {size} bytes overflows its single block"
            )));
        }

        Ok(ChainedSource {
            db,
            size,
            data_start: DATA_HEADER_LEN,
            per_block: capacity,
            blocks: vec![nid],
        })
    }

    fn open_indexed(db: &'d Database, nid: i32) -> Result<ChainedSource<'d>> {
        let per_block = db.buffer_size() - 1;
        let ids_per_index = (db.buffer_size() - INDEX_HEADER_LEN) / 4;
        if ids_per_index == 0 {
            return Err(GbfError::corrupt(
                "block size leaves no room for a chained buffer index",
            ));
        }

        let mut cursor = Cursor::new(db.source(), db.buffer_address(nid) + 1);
        let size = read_size(&mut cursor, db)?;

        let needed = (size.div_ceil(per_block)) as usize;
        let index_limit = needed.div_ceil(ids_per_index as usize).max(1);

        let mut blocks = Vec::with_capacity(needed);
        let mut index_id = nid;
        let mut walked = 0usize;

        while blocks.len() < needed {
            walked += 1;
            if walked > index_limit {
                return Err(GbfError::corrupt(
                    "chained buffer index chain is longer than its size allows",
                ));
            }
            if walked > 1 && db.read_node_kind(index_id)? != node_kind::CHAINED_INDEX {
                return Err(GbfError::corrupt(format!(
                    "chained buffer index chain reaches non-index node {index_id}"
                )));
            }

            let mut cursor = Cursor::new(db.source(), db.buffer_address(index_id) + 1 + 4);
            let next_index = cursor.read_i32(db.endian())?;

            let take = (needed - blocks.len()).min(ids_per_index as usize);
            for _ in 0..take {
                let id = cursor.read_i32(db.endian())?;
                if id >= 0 {
                    db.check_node_id(id)?;
                    if db.read_node_kind(id)? != node_kind::CHAINED_DATA {
                        return Err(GbfError::corrupt(format!(
                            "chained buffer maps non-data node {id}"
                        )));
                    }
                }
                blocks.push(id);
            }

            if blocks.len() < needed {
                if next_index < 0 {
                    return Err(GbfError::corrupt(format!(
                        "chained buffer index ends after {} of {needed} blocks",
                        blocks.len()
                    )));
                }
                db.check_node_id(next_index)?;
                index_id = next_index;
            }
        }

        Ok(ChainedSource {
            db,
            size,
            data_start: 1,
            per_block,
            blocks,
        })
    }
}

fn read_size(cursor: &mut Cursor<'_>, db: &Database) -> Result<u64> {
    let stored = cursor.read_u32(db.endian())?;
    if stored & OBFUSCATED_FLAG != 0 {
        return Err(GbfError::corrupt(
            "obfuscated chained buffers are not supported",
        ));
    }
    Ok(stored as u64)
}

impl ByteSource for ChainedSource<'_> {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.check_read(offset, buf.len())?;

        let mut pos = offset;
        let mut filled = 0usize;
        while filled < buf.len() {
            let block = (pos / self.per_block) as usize;
            let within = pos % self.per_block;
            let take = ((self.per_block - within) as usize).min(buf.len() - filled);

            let chunk = &mut buf[filled..filled + take];
            let id = self.blocks[block];
            if id < 0 {
                chunk.fill(0);
            } else {
                let at = self.db.buffer_address(id) + self.data_start + within;
                self.db.source().read_at(at, chunk)?;
            }

            pos += take as u64;
            filled += take;
        }
        Ok(())
    }

    fn extent(&self) -> u64 {
        self.size
    }
}
