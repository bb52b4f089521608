//! # Table Schemas and Record Materialization
//!
//! A [`TableSchema`] describes one table: its name, the key's name and kind,
//! and two index-aligned lists of column kinds and names. Schemas are parsed
//! once by the catalog and immutable afterward.
//!
//! The schema doubles as the record materializer: given a key and a cursor
//! positioned at a record image, [`TableSchema::read_record`] decodes each
//! column in schema order into a fully-owned [`Record`]. Fixed-width columns
//! decode by their kind's width; String/Bytes columns are length-prefixed.
//! The materializer either produces a complete record or fails; it never
//! coerces a malformed column into a default.
//!
//! ## Record image layout
//!
//! ```text
//! +-----------+-----------+------+-------------+
//! | column 0  | column 1  | ...  | column N-1  |
//! +-----------+-----------+------+-------------+
//! ```
//!
//! Columns are concatenated with no padding. A table whose columns are all
//! fixed-width has a constant record image size ([`fixed_value_len`]), which
//! the fixed-record leaf layout depends on.
//!
//! [`fixed_value_len`]: TableSchema::fixed_value_len

use crate::cursor::Cursor;
use crate::error::Result;
use crate::record::Record;
use crate::source::Endian;
use crate::value::{FieldKind, FieldValue};

#[derive(Debug, Clone, PartialEq)]
pub struct TableSchema {
    name: String,
    key_name: String,
    key_kind: FieldKind,
    kinds: Vec<FieldKind>,
    names: Vec<String>,
}

impl TableSchema {
    pub fn new(
        name: impl Into<String>,
        key_name: impl Into<String>,
        key_kind: FieldKind,
    ) -> TableSchema {
        TableSchema {
            name: name.into(),
            key_name: key_name.into(),
            key_kind,
            kinds: Vec::new(),
            names: Vec::new(),
        }
    }

    /// Builder-style column append, used by the catalog while parsing.
    pub fn with_column(mut self, kind: FieldKind, name: impl Into<String>) -> TableSchema {
        self.kinds.push(kind);
        self.names.push(name.into());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn key_name(&self) -> &str {
        &self.key_name
    }

    pub fn key_kind(&self) -> FieldKind {
        self.key_kind
    }

    pub fn column_count(&self) -> usize {
        self.kinds.len()
    }

    /// Column kinds, index-aligned with [`column_names`].
    ///
    /// [`column_names`]: TableSchema::column_names
    pub fn column_kinds(&self) -> &[FieldKind] {
        &self.kinds
    }

    pub fn column_names(&self) -> &[String] {
        &self.names
    }

    pub fn column_index(&self, name: &str) -> Option<usize> {
        self.names.iter().position(|n| n == name)
    }

    /// Total record image size when every column is fixed-width, `None` if
    /// any column is variable-length.
    pub fn fixed_value_len(&self) -> Option<u32> {
        self.kinds
            .iter()
            .try_fold(0u32, |acc, kind| Some(acc + kind.fixed_len()?))
    }

    /// Materializes a record: decodes one value per column, in schema order,
    /// from the cursor position.
    pub fn read_record(
        &self,
        key: FieldValue,
        cursor: &mut Cursor<'_>,
        endian: Endian,
    ) -> Result<Record> {
        let mut values = Vec::with_capacity(self.kinds.len());
        for kind in &self.kinds {
            values.push(read_value(*kind, cursor, endian)?);
        }
        Ok(Record::new(key, values))
    }
}

fn read_value(kind: FieldKind, cursor: &mut Cursor<'_>, endian: Endian) -> Result<FieldValue> {
    let value = match kind {
        FieldKind::Byte => FieldValue::Byte(cursor.read_i8()?),
        FieldKind::Short => FieldValue::Short(cursor.read_i16(endian)?),
        FieldKind::Int => FieldValue::Int(cursor.read_i32(endian)?),
        FieldKind::Long => FieldValue::Long(cursor.read_i64(endian)?),
        FieldKind::Boolean => FieldValue::Boolean(cursor.read_u8()? != 0),
        FieldKind::String => FieldValue::String(cursor.read_string(endian)?),
        // Producers encode an absent byte column as length -1; readers see it
        // as an empty payload.
        FieldKind::Bytes => FieldValue::Bytes(cursor.read_blob(endian)?.unwrap_or_default()),
    };
    Ok(value)
}
