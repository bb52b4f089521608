//! Shared fixture builder: assembles well-formed container images in memory
//! so each test can open a real `Database` over exactly the block layout it
//! wants to exercise.
#![allow(dead_code)]

use gbfdb::btree::node_kind;
use gbfdb::{Database, FieldKind, MemSource};

pub const BLOCK_SIZE: usize = 256;
pub const BUFFER_SIZE: usize = BLOCK_SIZE - 5;

const NO_SIBLING: i32 = -1;
const INDIRECT_FLAG: u32 = 0x8000_0000;

/// A variable-record leaf entry: the image either sits inside the node or
/// behind a chained buffer id.
pub enum VarRecord<'a> {
    Inline(&'a [u8]),
    Chained(i32),
}

/// Block-by-block container image builder. Node 0 (the parameter block) is
/// reserved at construction; `finish` stitches the header on and emits the
/// final byte image.
pub struct ImageBuilder {
    buffers: Vec<Vec<u8>>,
}

impl ImageBuilder {
    pub fn new() -> ImageBuilder {
        ImageBuilder {
            buffers: vec![vec![0u8; BUFFER_SIZE]],
        }
    }

    /// Reserves the next node id.
    pub fn alloc(&mut self) -> i32 {
        self.buffers.push(vec![0u8; BUFFER_SIZE]);
        (self.buffers.len() - 1) as i32
    }

    fn buffer(&mut self, nid: i32) -> &mut [u8] {
        &mut self.buffers[nid as usize]
    }

    pub fn write_interior(&mut self, nid: i32, entries: &[(i64, i32)]) {
        let buf = self.buffer(nid);
        buf[0] = node_kind::LONG_INTERIOR;
        buf[1..5].copy_from_slice(&(entries.len() as i32).to_be_bytes());
        let mut at = 5;
        for (key, child) in entries {
            buf[at..at + 8].copy_from_slice(&key.to_be_bytes());
            buf[at + 8..at + 12].copy_from_slice(&child.to_be_bytes());
            at += 12;
        }
    }

    pub fn write_fixed_leaf(&mut self, nid: i32, prev: i32, next: i32, entries: &[(i64, &[u8])]) {
        let buf = self.buffer(nid);
        buf[0] = node_kind::LONG_FIXED_LEAF;
        buf[1..5].copy_from_slice(&(entries.len() as i32).to_be_bytes());
        buf[5..9].copy_from_slice(&prev.to_be_bytes());
        buf[9..13].copy_from_slice(&next.to_be_bytes());
        let mut at = 13;
        for (key, image) in entries {
            buf[at..at + 8].copy_from_slice(&key.to_be_bytes());
            buf[at + 8..at + 8 + image.len()].copy_from_slice(image);
            at += 8 + image.len();
        }
    }

    /// Entries pack forward from the header, images backward from the node
    /// end, matching producer layout.
    pub fn write_var_leaf(&mut self, nid: i32, prev: i32, next: i32, entries: &[(i64, VarRecord)]) {
        let buf = self.buffer(nid);
        buf[0] = node_kind::LONG_VAR_LEAF;
        buf[1..5].copy_from_slice(&(entries.len() as i32).to_be_bytes());
        buf[5..9].copy_from_slice(&prev.to_be_bytes());
        buf[9..13].copy_from_slice(&next.to_be_bytes());

        let mut at = 13;
        let mut tail = BUFFER_SIZE;
        for (key, record) in entries {
            let locator = match record {
                VarRecord::Inline(image) => {
                    tail -= image.len();
                    buf[tail..tail + image.len()].copy_from_slice(image);
                    tail as u32
                }
                VarRecord::Chained(chain_id) => {
                    tail -= 4;
                    buf[tail..tail + 4].copy_from_slice(&chain_id.to_be_bytes());
                    tail as u32 | INDIRECT_FLAG
                }
            };
            buf[at..at + 8].copy_from_slice(&key.to_be_bytes());
            buf[at + 8..at + 12].copy_from_slice(&locator.to_be_bytes());
            at += 12;
        }
        assert!(at <= tail, "leaf overflow in test fixture");
    }

    pub fn write_empty_leaf(&mut self, nid: i32) {
        self.write_var_leaf(nid, NO_SIBLING, NO_SIBLING, &[]);
    }

    /// Stores `data` as a chained buffer, allocating whatever blocks it
    /// needs, and returns the buffer's root node id.
    pub fn add_chained(&mut self, data: &[u8]) -> i32 {
        if data.len() <= BUFFER_SIZE - 5 {
            let nid = self.alloc();
            let buf = self.buffer(nid);
            buf[0] = node_kind::CHAINED_DATA;
            buf[1..5].copy_from_slice(&(data.len() as u32).to_be_bytes());
            buf[5..5 + data.len()].copy_from_slice(data);
            return nid;
        }

        let per_block = BUFFER_SIZE - 1;
        let mut data_ids = Vec::new();
        for chunk in data.chunks(per_block) {
            let nid = self.alloc();
            let buf = self.buffer(nid);
            buf[0] = node_kind::CHAINED_DATA;
            buf[1..1 + chunk.len()].copy_from_slice(chunk);
            data_ids.push(nid);
        }
        assert!(9 + 4 * data_ids.len() <= BUFFER_SIZE, "chain needs multiple index blocks");

        let index = self.alloc();
        let buf = self.buffer(index);
        buf[0] = node_kind::CHAINED_INDEX;
        buf[1..5].copy_from_slice(&(data.len() as u32).to_be_bytes());
        buf[5..9].copy_from_slice(&NO_SIBLING.to_be_bytes());
        let mut at = 9;
        for id in data_ids {
            buf[at..at + 4].copy_from_slice(&id.to_be_bytes());
            at += 4;
        }
        index
    }

    /// Writes the parameter block and emits the full image, header first.
    pub fn finish(mut self, master_root: i32) -> Vec<u8> {
        let params = self.buffer(0);
        params[0] = node_kind::CHAINED_DATA;
        params[1..5].copy_from_slice(&13i32.to_be_bytes()); // version + 3 values
        params[5] = 1;
        params[6..10].copy_from_slice(&master_root.to_be_bytes());
        // database id halves stay zero

        // Header field order on disk: magic, file id, format version,
        // block size, first free block.
        let mut image = vec![0u8; BLOCK_SIZE * (1 + self.buffers.len())];
        image[0..8].copy_from_slice(&0x4742_4600_0000_0001u64.to_be_bytes());
        image[8..16].copy_from_slice(&7i64.to_be_bytes());
        image[16..20].copy_from_slice(&1i32.to_be_bytes());
        image[20..24].copy_from_slice(&(BLOCK_SIZE as i32).to_be_bytes());
        image[24..28].copy_from_slice(&(-1i32).to_be_bytes());
        for (i, buf) in self.buffers.iter().enumerate() {
            let at = BLOCK_SIZE * (i + 1) + 5;
            image[at..at + buf.len()].copy_from_slice(buf);
        }
        image
    }

    pub fn open(self, master_root: i32) -> Database {
        let image = self.finish(master_root);
        Database::open(Box::new(MemSource::new(image)), 0).unwrap()
    }
}

pub fn push_i32(buf: &mut Vec<u8>, v: i32) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn push_i64(buf: &mut Vec<u8>, v: i64) {
    buf.extend_from_slice(&v.to_be_bytes());
}

pub fn push_string(buf: &mut Vec<u8>, s: &str) {
    push_i32(buf, s.len() as i32);
    buf.extend_from_slice(s.as_bytes());
}

/// Encodes one master-table record image describing a user table.
pub fn master_record(
    name: &str,
    root: i32,
    key_kind: FieldKind,
    key_name: &str,
    columns: &[(FieldKind, &str)],
) -> Vec<u8> {
    let mut image = Vec::new();
    push_string(&mut image, name);
    push_i32(&mut image, 1); // SchemaVersion
    push_i32(&mut image, root);
    image.push(key_kind.tag());

    push_i32(&mut image, columns.len() as i32);
    for (kind, _) in columns {
        image.push(kind.tag());
    }

    let mut names = String::from(key_name);
    names.push(';');
    for (_, col_name) in columns {
        names.push_str(col_name);
        names.push(';');
    }
    push_string(&mut image, &names);

    push_i32(&mut image, -1); // IndexColumn
    push_i64(&mut image, 0); // MaxKey
    push_i32(&mut image, 0); // RecordCount
    image
}
