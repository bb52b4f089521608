//! # Container Layer
//!
//! A GBF container is a block-structured byte space. The first `block_size`
//! bytes hold the file header; every subsequent block is addressable by an
//! integer node id. Node ids, not byte offsets, are what the index tree and
//! the catalog store, and this module owns the id-to-offset resolution.
//!
//! ## File layout
//!
//! ```text
//! offset 0:             file header (magic, file id, version,
//!                       block size, first free block)
//! offset 1*block_size:  block 0   <- always the parameter block
//! offset 2*block_size:  block 1
//! ...
//! ```
//!
//! Each block begins with a 5-byte prefix (producer-side buffer management
//! state); node data starts after it, and the first node byte is the node
//! kind. The addressable region of a block is called its *buffer*:
//!
//! ```text
//! block_address(id)  = base + (id + 1) * block_size
//! buffer_address(id) = block_address(id) + 5
//! buffer_size        = block_size - 5
//! ```
//!
//! The container extent past the opening offset must be an exact multiple of
//! the block size; anything else means truncation and is rejected at open.
//!
//! ## Parameter block
//!
//! Block 0 must be a chained-buffer data node holding the container
//! parameters: a node code, a payload length, a format version, and at least
//! three auxiliary integers, the first of which is the master catalog
//! table's root node id (see [`params::DbParams`]).
//!
//! ## Endianness
//!
//! Every observed container is big-endian. The byte order is still held as
//! a container property and threaded through all decodes rather than
//! assumed at the decode sites.

pub mod catalog;
pub mod params;

pub use catalog::{Catalog, TableDef};
pub use params::DbParams;

use tracing::debug;
use zerocopy::big_endian::{I32, I64, U64};
use zerocopy::{FromBytes, Immutable, KnownLayout, Unaligned};

use crate::btree::node_kind;
use crate::btree::tree::TableView;
use crate::cursor::Cursor;
use crate::error::{GbfError, Result};
use crate::source::{ByteSource, Endian, FileSource, MemSource};

/// Bytes of producer-side buffer state preceding node data in every block.
pub const BLOCK_PREFIX_SIZE: u64 = 1 + 4;

/// Size of the fixed file header at the container's opening offset.
const FILE_HEADER_SIZE: usize = 28;

#[repr(C)]
#[derive(Debug, Clone, Copy, FromBytes, Immutable, KnownLayout, Unaligned)]
struct RawFileHeader {
    magic: U64,
    file_id: I64,
    format_version: I32,
    block_size: I32,
    first_free_block: I32,
}

const _: () = assert!(std::mem::size_of::<RawFileHeader>() == FILE_HEADER_SIZE);

/// An opened, validated container: header, parameters, catalog, and the
/// block-addressing scheme. Immutable once open; shareable across threads
/// for concurrent lookups.
pub struct Database {
    source: Box<dyn ByteSource>,
    base: u64,
    endian: Endian,
    magic: u64,
    file_id: i64,
    format_version: i32,
    block_size: u32,
    block_count: u32,
    first_free_block: i32,
    params: DbParams,
    catalog: Catalog,
}

impl Database {
    /// Opens a container at `offset` within `source`: decodes and validates
    /// the header and parameter block, then scans the master catalog table.
    pub fn open(source: Box<dyn ByteSource>, offset: u64) -> Result<Database> {
        // The format is written big-endian; kept as a container property so
        // no decode site assumes a byte order.
        let endian = Endian::Big;

        let mut raw = [0u8; FILE_HEADER_SIZE];
        source.read_at(offset, &mut raw)?;
        let header = RawFileHeader::ref_from_bytes(&raw)
            .map_err(|_| GbfError::corrupt("malformed file header"))?;

        let block_size = header.block_size.get();
        if block_size <= BLOCK_PREFIX_SIZE as i32 {
            return Err(GbfError::corrupt(format!(
                "invalid block size {block_size}"
            )));
        }
        let block_size = block_size as u32;

        let extent = source.extent();
        let span = extent
            .checked_sub(offset)
            .ok_or(GbfError::EndOfStream)?;
        if span % block_size as u64 != 0 {
            return Err(GbfError::corrupt(format!(
                "container span {span} is not a multiple of block size {block_size}"
            )));
        }

        let block_count = (span / block_size as u64) as u32;
        // The header occupies the first block-sized slot.
        let block_count = block_count.saturating_sub(1);
        if block_count == 0 {
            return Err(GbfError::corrupt("container holds no blocks"));
        }

        // Block 0 always carries the container parameters.
        let param_base = offset + block_size as u64 + BLOCK_PREFIX_SIZE;
        let mut kind = [0u8; 1];
        source.read_at(param_base, &mut kind)?;
        if kind[0] != node_kind::CHAINED_DATA {
            return Err(GbfError::corrupt(format!(
                "expected chained-buffer data node for parameter block, found kind {}",
                kind[0]
            )));
        }
        let mut cursor = Cursor::new(source.as_ref(), param_base);
        let params = DbParams::read(&mut cursor, endian)?;

        let mut db = Database {
            source,
            base: offset,
            endian,
            magic: header.magic.get(),
            file_id: header.file_id.get(),
            format_version: header.format_version.get(),
            block_size,
            block_count,
            first_free_block: header.first_free_block.get(),
            params,
            catalog: Catalog::default(),
        };

        debug!(
            block_size = db.block_size,
            block_count = db.block_count,
            format_version = db.format_version,
            "opened container"
        );

        db.catalog = Catalog::scan(&db)?;
        Ok(db)
    }

    /// Opens a container file, mapping it read-only.
    pub fn open_path<P: AsRef<std::path::Path>>(path: P) -> Result<Database> {
        Database::open(Box::new(FileSource::open(path)?), 0)
    }

    /// Opens a container held entirely in memory.
    pub fn from_bytes(data: Vec<u8>) -> Result<Database> {
        Database::open(Box::new(MemSource::new(data)), 0)
    }

    pub fn endian(&self) -> Endian {
        self.endian
    }

    pub fn source(&self) -> &dyn ByteSource {
        self.source.as_ref()
    }

    pub fn magic(&self) -> u64 {
        self.magic
    }

    pub fn file_id(&self) -> i64 {
        self.file_id
    }

    pub fn format_version(&self) -> i32 {
        self.format_version
    }

    pub fn block_size(&self) -> u32 {
        self.block_size
    }

    /// Addressable blocks, excluding the header slot.
    pub fn block_count(&self) -> u32 {
        self.block_count
    }

    pub fn first_free_block(&self) -> i32 {
        self.first_free_block
    }

    pub fn params(&self) -> &DbParams {
        &self.params
    }

    /// Looks up one table definition by exact name. Absence is not an error.
    pub fn table(&self, name: &str) -> Option<&TableDef> {
        self.catalog.get(name)
    }

    /// All table definitions, in no particular order.
    pub fn tables(&self) -> impl Iterator<Item = &TableDef> {
        self.catalog.iter()
    }

    /// Constructs a lookup view over a named table, `None` if absent.
    pub fn view(&self, name: &str) -> Result<Option<TableView<'_, '_>>> {
        match self.catalog.get(name) {
            Some(def) => Ok(Some(TableView::new(self, def.schema(), def.root_node_id())?)),
            None => Ok(None),
        }
    }

    pub(crate) fn check_node_id(&self, id: i32) -> Result<()> {
        if id < 0 || id as u32 >= self.block_count {
            return Err(GbfError::corrupt(format!(
                "node id {id} out of range (block count {})",
                self.block_count
            )));
        }
        Ok(())
    }

    pub(crate) fn block_address(&self, id: i32) -> u64 {
        self.base + (id as u64 + 1) * self.block_size as u64
    }

    /// Start of a block's node data, past the block prefix.
    pub(crate) fn buffer_address(&self, id: i32) -> u64 {
        self.block_address(id) + BLOCK_PREFIX_SIZE
    }

    /// Usable node bytes per block.
    pub(crate) fn buffer_size(&self) -> u64 {
        self.block_size as u64 - BLOCK_PREFIX_SIZE
    }

    /// Probes the node kind byte of a block.
    pub(crate) fn read_node_kind(&self, id: i32) -> Result<u8> {
        self.check_node_id(id)?;
        let mut buf = [0u8; 1];
        self.source.read_at(self.buffer_address(id), &mut buf)?;
        Ok(buf[0])
    }
}

impl std::fmt::Debug for Database {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Database")
            .field("magic", &self.magic)
            .field("file_id", &self.file_id)
            .field("format_version", &self.format_version)
            .field("block_size", &self.block_size)
            .field("block_count", &self.block_count)
            .finish_non_exhaustive()
    }
}
