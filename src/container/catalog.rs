//! # Schema Catalog
//!
//! Table definitions live in the *master table*, an ordinary long-key table
//! whose root node id is parameter 0 of the parameter block and whose schema
//! is fixed by the format:
//!
//! | # | Column | Kind | Notes |
//! |---|--------------|--------|-------|
//! | 0 | TableName | String | catalog lookup key |
//! | 1 | SchemaVersion| Int | |
//! | 2 | RootBufferId | Int | root node id of the table's index |
//! | 3 | KeyType | Byte | field-kind tag of the table's key |
//! | 4 | FieldTypes | Bytes | one kind tag per column; `0xff` terminates |
//! | 5 | FieldNames | String | `;`-separated, key name first |
//! | 6 | IndexColumn | Int | |
//! | 7 | MaxKey | Long | |
//! | 8 | RecordCount | Int | |
//!
//! The scan walks the master table in key order and fully validates every
//! definition: each stored kind tag must resolve, and the kind and name
//! lists must be the same length. An unknown tag or a mismatch fails the
//! whole container open; nothing is defaulted or skipped.
//!
//! A `0xff` byte inside FieldTypes marks the producer's sparse-field
//! extension; columns past it are not part of the dense record image and are
//! not exposed.

use hashbrown::HashMap;
use tracing::debug;

use super::Database;
use crate::btree::tree::TableView;
use crate::error::{GbfError, Result};
use crate::schema::TableSchema;
use crate::value::FieldKind;

const TABLE_NAME: usize = 0;
const ROOT_BUFFER_ID: usize = 2;
const KEY_TYPE: usize = 3;
const FIELD_TYPES: usize = 4;
const FIELD_NAMES: usize = 5;

/// Marks the start of the sparse-field extension inside FieldTypes.
const FIELD_EXTENSION: u8 = 0xFF;

/// One table known to the container: its schema and index root.
#[derive(Debug, Clone)]
pub struct TableDef {
    schema: TableSchema,
    root_node_id: i32,
}

impl TableDef {
    pub fn name(&self) -> &str {
        self.schema.name()
    }

    pub fn schema(&self) -> &TableSchema {
        &self.schema
    }

    /// Root node id of the table's index, resolved through the container's
    /// block addressing rather than a byte offset.
    pub fn root_node_id(&self) -> i32 {
        self.root_node_id
    }
}

/// All table definitions of one container, keyed by table name.
#[derive(Debug, Default)]
pub struct Catalog {
    tables: HashMap<String, TableDef>,
}

impl Catalog {
    /// The master table's schema is fixed by the format, never read from
    /// the container itself.
    fn master_schema() -> TableSchema {
        TableSchema::new("Master table", "TableNum", FieldKind::Long)
            .with_column(FieldKind::String, "TableName")
            .with_column(FieldKind::Int, "SchemaVersion")
            .with_column(FieldKind::Int, "RootBufferId")
            .with_column(FieldKind::Byte, "KeyType")
            .with_column(FieldKind::Bytes, "FieldTypes")
            .with_column(FieldKind::String, "FieldNames")
            .with_column(FieldKind::Int, "IndexColumn")
            .with_column(FieldKind::Long, "MaxKey")
            .with_column(FieldKind::Int, "RecordCount")
    }

    pub(crate) fn scan(db: &Database) -> Result<Catalog> {
        let master = Self::master_schema();
        let root = db.params().master_table_root();
        let view = TableView::new(db, &master, root)?;

        let mut tables = HashMap::new();
        for record in view.iter_from(i64::MIN)? {
            let record = record?;

            let name = record.get_string(TABLE_NAME)?.to_owned();
            let root_node_id = record.get_int(ROOT_BUFFER_ID)?;
            let key_tag = record.get_byte(KEY_TYPE)? as u8;
            let key_kind = FieldKind::try_from_tag(key_tag)?;

            let (key_name, column_names) = split_field_names(record.get_string(FIELD_NAMES)?);

            let mut kinds = Vec::new();
            for tag in record.get_bytes(FIELD_TYPES)? {
                if *tag == FIELD_EXTENSION {
                    break;
                }
                kinds.push(FieldKind::try_from_tag(*tag)?);
            }

            if kinds.len() != column_names.len() {
                return Err(GbfError::corrupt(format!(
                    "table '{name}': {} column kinds but {} column names",
                    kinds.len(),
                    column_names.len()
                )));
            }

            let mut schema = TableSchema::new(name.clone(), key_name, key_kind);
            for (kind, col_name) in kinds.into_iter().zip(column_names) {
                schema = schema.with_column(kind, col_name);
            }

            tables.insert(
                name,
                TableDef {
                    schema,
                    root_node_id,
                },
            );
        }

        debug!(tables = tables.len(), "scanned master table");
        Ok(Catalog { tables })
    }

    pub fn get(&self, name: &str) -> Option<&TableDef> {
        self.tables.get(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &TableDef> {
        self.tables.values()
    }

    pub fn len(&self) -> usize {
        self.tables.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tables.is_empty()
    }
}

/// FieldNames stores the key name first, then one entry per column, all
/// `;`-separated with an optional trailing separator. A string with no
/// separator names a key-only table.
fn split_field_names(raw: &str) -> (String, Vec<String>) {
    match raw.split_once(';') {
        Some((key_name, rest)) => {
            let rest = rest.strip_suffix(';').unwrap_or(rest);
            let names = if rest.is_empty() {
                Vec::new()
            } else {
                rest.split(';').map(str::to_owned).collect()
            };
            (key_name.to_owned(), names)
        }
        None => (raw.to_owned(), Vec::new()),
    }
}
