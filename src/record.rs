//! # Materialized Records
//!
//! A [`Record`] is the fully-owned result of a lookup: the key plus one
//! decoded value per schema column, index-aligned with the schema's column
//! lists. Once materialized a record holds no reference into the source it
//! came from, so it may outlive the container and cross thread boundaries
//! freely.
//!
//! The typed accessors mirror the producer's access conventions: integer
//! kinds convert freely between each other (widening or truncating exactly
//! as an `as` cast does), while String and Bytes are strict. Asking for a
//! kind the slot cannot provide is a decode-consistency failure, never a
//! silent default.

use crate::error::{GbfError, Result};
use crate::value::FieldValue;

/// One table row: the key plus columns in schema order.
#[derive(Debug, Clone, PartialEq)]
pub struct Record {
    key: FieldValue,
    values: Vec<FieldValue>,
}

impl Record {
    pub fn new(key: FieldValue, values: Vec<FieldValue>) -> Record {
        Record { key, values }
    }

    pub fn key(&self) -> &FieldValue {
        &self.key
    }

    pub fn values(&self) -> &[FieldValue] {
        &self.values
    }

    pub fn value(&self, index: usize) -> Result<&FieldValue> {
        self.values
            .get(index)
            .ok_or_else(|| GbfError::corrupt(format!("column index {index} out of bounds")))
    }

    pub fn get_boolean(&self, index: usize) -> Result<bool> {
        match self.value(index)? {
            FieldValue::Boolean(v) => Ok(*v),
            FieldValue::Byte(v) => Ok(*v != 0),
            FieldValue::Short(v) => Ok(*v != 0),
            FieldValue::Int(v) => Ok(*v != 0),
            FieldValue::Long(v) => Ok(*v != 0),
            other => Err(unexpected_kind("boolean", other)),
        }
    }

    pub fn get_byte(&self, index: usize) -> Result<i8> {
        match self.value(index)? {
            FieldValue::Byte(v) => Ok(*v),
            FieldValue::Short(v) => Ok(*v as i8),
            FieldValue::Int(v) => Ok(*v as i8),
            FieldValue::Long(v) => Ok(*v as i8),
            other => Err(unexpected_kind("byte", other)),
        }
    }

    pub fn get_short(&self, index: usize) -> Result<i16> {
        match self.value(index)? {
            FieldValue::Byte(v) => Ok(*v as i16),
            FieldValue::Short(v) => Ok(*v),
            FieldValue::Int(v) => Ok(*v as i16),
            FieldValue::Long(v) => Ok(*v as i16),
            other => Err(unexpected_kind("short", other)),
        }
    }

    pub fn get_int(&self, index: usize) -> Result<i32> {
        match self.value(index)? {
            FieldValue::Byte(v) => Ok(*v as i32),
            FieldValue::Short(v) => Ok(*v as i32),
            FieldValue::Int(v) => Ok(*v),
            FieldValue::Long(v) => Ok(*v as i32),
            other => Err(unexpected_kind("int", other)),
        }
    }

    pub fn get_long(&self, index: usize) -> Result<i64> {
        match self.value(index)? {
            FieldValue::Byte(v) => Ok(*v as i64),
            FieldValue::Short(v) => Ok(*v as i64),
            FieldValue::Int(v) => Ok(*v as i64),
            FieldValue::Long(v) => Ok(*v),
            other => Err(unexpected_kind("long", other)),
        }
    }

    pub fn get_string(&self, index: usize) -> Result<&str> {
        match self.value(index)? {
            FieldValue::String(v) => Ok(v),
            other => Err(unexpected_kind("string", other)),
        }
    }

    pub fn get_bytes(&self, index: usize) -> Result<&[u8]> {
        match self.value(index)? {
            FieldValue::Bytes(v) => Ok(v),
            other => Err(unexpected_kind("bytes", other)),
        }
    }
}

fn unexpected_kind(wanted: &str, got: &FieldValue) -> GbfError {
    GbfError::corrupt(format!("expected {wanted} column, found {:?}", got.kind()))
}
