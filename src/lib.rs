//! # gbfdb - Read-Only Schema-Typed Table Container
//!
//! gbfdb reads GBF containers: block-structured files holding a set of
//! named, schema-typed tables, each indexed by a B-tree over 64-bit signed
//! keys. The engine is strictly read-only and prioritizes:
//!
//! - **Validation before trust**: every length, offset, node id, and type
//!   tag is checked against the container before it drives a read or an
//!   allocation
//! - **Shared immutable state**: an opened container never mutates, so any
//!   number of threads look up concurrently without locking
//! - **Explicit absence**: "no such key" and "no such table" are `None`,
//!   never errors; an error always means the container could not be decoded
//!
//! ## Quick Start
//!
//! ```ignore
//! use gbfdb::{Database, FileSource};
//!
//! let source = FileSource::open("./program.gbf")?;
//! let db = Database::open(Box::new(source), 0)?;
//!
//! if let Some(view) = db.view("SYMBOLS")? {
//!     if let Some(record) = view.get_at(0x1000)? {
//!         println!("{}", record.get_string(0)?);
//!     }
//! }
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │   Lookup API (TableView / Record)    │
//! ├─────────────────────────────────────┤
//! │  Schema Catalog │ Ordered B-Tree     │
//! ├─────────────────┼───────────────────┤
//! │   Record Materialization (schema)    │
//! ├─────────────────────────────────────┤
//! │  Container Layer (blocks, params)    │
//! ├─────────────────────────────────────┤
//! │  Cursor / Chained Buffers (decode)   │
//! ├─────────────────────────────────────┤
//! │   ByteSource (mmap / memory / ...)   │
//! └─────────────────────────────────────┘
//! ```
//!
//! ## Container Layout
//!
//! ```text
//! offset 0:        file header (magic, id, version, block size)
//! block 0:         container parameters (master catalog root)
//! blocks 1..N:     B-tree nodes, record images, chained buffers
//! ```
//!
//! The master catalog table (block 0's parameters point at its root) maps
//! table names to schemas and root node ids; user tables hang off it. All
//! multi-byte values are big-endian on disk.
//!
//! ## Module Overview
//!
//! - [`source`]: Byte sources - mmap, in-memory, chained buffers
//! - [`cursor`]: Positional primitive and length-prefixed decoding
//! - [`container`]: Header, block addressing, parameters, catalog
//! - [`btree`]: Interior/leaf node decoding and the lookup protocol
//! - [`schema`]: Table schemas and record materialization
//! - [`record`]: Typed accessors over materialized records
//! - [`value`]: Field kinds and values
//! - [`error`]: The crate-wide error taxonomy

pub mod btree;
pub mod container;
pub mod cursor;
pub mod error;
pub mod record;
pub mod schema;
pub mod source;
pub mod value;

pub use btree::tree::{RecordIter, TableView};
pub use container::{Catalog, Database, DbParams, TableDef};
pub use cursor::Cursor;
pub use error::{GbfError, Result};
pub use record::Record;
pub use schema::TableSchema;
pub use source::{ByteSource, ChainedSource, Endian, FileSource, MemSource};
pub use value::{FieldKind, FieldValue};
