//! # Typed Value Model
//!
//! Every stored field in a GBF table is one of seven kinds. [`FieldKind`] is
//! the schema-side tag; [`FieldValue`] is the decoded runtime value. The two
//! sit at the center of the engine: the catalog validates kinds, the
//! materializer decodes by kind, and key comparison is defined per kind.
//!
//! ## Kinds
//!
//! | Kind | Tag | Width | Key ordering |
//! |---------|-----|-------|--------------|
//! | Byte | 0 | 1 | integer |
//! | Short | 1 | 2 | integer |
//! | Int | 2 | 4 | integer |
//! | Long | 3 | 8 | integer |
//! | String | 4 | varies | lexicographic bytes |
//! | Bytes | 5 | varies | none |
//! | Boolean | 6 | 1 | integer (false < true) |
//!
//! An unknown tag is a corruption, never a default: the producer's kind set
//! is closed and anything outside it means the catalog bytes are bad. The
//! high nibble of a stored tag carries a producer-side indexed-column flag
//! and is masked off before matching.

use std::cmp::Ordering;

use crate::error::{GbfError, Result};

/// Schema-side tag selecting how a field's bytes are interpreted.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    Byte,
    Short,
    Int,
    Long,
    String,
    Bytes,
    Boolean,
}

impl FieldKind {
    pub const fn tag(self) -> u8 {
        match self {
            FieldKind::Byte => 0,
            FieldKind::Short => 1,
            FieldKind::Int => 2,
            FieldKind::Long => 3,
            FieldKind::String => 4,
            FieldKind::Bytes => 5,
            FieldKind::Boolean => 6,
        }
    }

    /// Resolves a stored tag byte. The indexed-column flag in the high
    /// nibble is masked off; an unrecognized low nibble yields `None`.
    pub fn from_tag(tag: u8) -> Option<FieldKind> {
        match tag & 0x0F {
            0 => Some(FieldKind::Byte),
            1 => Some(FieldKind::Short),
            2 => Some(FieldKind::Int),
            3 => Some(FieldKind::Long),
            4 => Some(FieldKind::String),
            5 => Some(FieldKind::Bytes),
            6 => Some(FieldKind::Boolean),
            _ => None,
        }
    }

    /// Like [`from_tag`] but maps an unknown tag to a decode failure.
    ///
    /// [`from_tag`]: FieldKind::from_tag
    pub fn try_from_tag(tag: u8) -> Result<FieldKind> {
        FieldKind::from_tag(tag)
            .ok_or_else(|| GbfError::corrupt(format!("unknown field kind tag {tag:#04x}")))
    }

    /// Stored width in bytes, or `None` for length-prefixed kinds.
    pub const fn fixed_len(self) -> Option<u32> {
        match self {
            FieldKind::Byte | FieldKind::Boolean => Some(1),
            FieldKind::Short => Some(2),
            FieldKind::Int => Some(4),
            FieldKind::Long => Some(8),
            FieldKind::String | FieldKind::Bytes => None,
        }
    }
}

/// A decoded field value. Variable-length kinds own their payload; a value
/// holds no reference into the source it was decoded from.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    Byte(i8),
    Short(i16),
    Int(i32),
    Long(i64),
    String(String),
    Bytes(Vec<u8>),
    Boolean(bool),
}

impl FieldValue {
    pub fn kind(&self) -> FieldKind {
        match self {
            FieldValue::Byte(_) => FieldKind::Byte,
            FieldValue::Short(_) => FieldKind::Short,
            FieldValue::Int(_) => FieldKind::Int,
            FieldValue::Long(_) => FieldKind::Long,
            FieldValue::String(_) => FieldKind::String,
            FieldValue::Bytes(_) => FieldKind::Bytes,
            FieldValue::Boolean(_) => FieldKind::Boolean,
        }
    }

    /// The value widened to i64, for the integer-ordered kinds.
    fn as_ordinal(&self) -> Option<i64> {
        match self {
            FieldValue::Byte(v) => Some(*v as i64),
            FieldValue::Short(v) => Some(*v as i64),
            FieldValue::Int(v) => Some(*v as i64),
            FieldValue::Long(v) => Some(*v),
            FieldValue::Boolean(v) => Some(*v as i64),
            FieldValue::String(_) | FieldValue::Bytes(_) => None,
        }
    }

    /// Key ordering: natural integer order for Byte/Short/Int/Long/Boolean,
    /// lexicographic byte order for String. Bytes values and mismatched
    /// kind families are unordered.
    pub fn key_cmp(&self, other: &FieldValue) -> Option<Ordering> {
        match (self, other) {
            (FieldValue::String(a), FieldValue::String(b)) => {
                Some(a.as_bytes().cmp(b.as_bytes()))
            }
            (FieldValue::Bytes(_), _) | (_, FieldValue::Bytes(_)) => None,
            (a, b) => Some(a.as_ordinal()?.cmp(&b.as_ordinal()?)),
        }
    }
}
