//! Container parameter block.
//!
//! Block 0 of every container is a chained-buffer data node whose payload is
//! the parameter record:
//!
//! ```text
//! +------------+--------------+-------------+---------------------------+
//! | node_code  | data_len:i32 | version: u8 | values: i32 x N           |
//! +------------+--------------+-------------+---------------------------+
//! ```
//!
//! `data_len` counts the version byte plus the value words, so
//! `N = (data_len - 1) / 4`. At least three values must be present; extra
//! trailing values are preserved but uninterpreted. Value 0 is the master
//! catalog table's root node id; values 1 and 2 are the high and low halves
//! of the producer's database id.

use smallvec::SmallVec;

use crate::cursor::Cursor;
use crate::error::{GbfError, Result};
use crate::source::Endian;

// No Default: a DbParams only exists via `read`, which guarantees at least
// three values, so the positional accessors cannot go out of bounds.
#[derive(Debug, Clone)]
pub struct DbParams {
    node_code: u8,
    data_len: i32,
    version: u8,
    values: SmallVec<[i32; 4]>,
}

impl DbParams {
    pub const MASTER_TABLE_ROOT: usize = 0;
    pub const DATABASE_ID_HIGH: usize = 1;
    pub const DATABASE_ID_LOW: usize = 2;

    pub(crate) fn read(cursor: &mut Cursor<'_>, endian: Endian) -> Result<DbParams> {
        let node_code = cursor.read_u8()?;
        let data_len = cursor.read_i32(endian)?;
        let version = cursor.read_u8()?;

        if data_len < 1 {
            return Err(GbfError::corrupt(format!(
                "invalid parameter payload length {data_len}"
            )));
        }

        let value_count = ((data_len - 1) / 4) as usize;
        if value_count < 3 {
            return Err(GbfError::corrupt(format!(
                "expected at least 3 container parameters, found {value_count}"
            )));
        }

        let mut values = SmallVec::with_capacity(value_count);
        for _ in 0..value_count {
            values.push(cursor.read_i32(endian)?);
        }

        Ok(DbParams {
            node_code,
            data_len,
            version,
            values,
        })
    }

    /// Format/node-addressing discriminator carried by the parameter block.
    pub fn node_code(&self) -> u8 {
        self.node_code
    }

    pub fn data_len(&self) -> i32 {
        self.data_len
    }

    pub fn version(&self) -> u8 {
        self.version
    }

    /// The auxiliary parameter list, in stored order.
    pub fn values(&self) -> &[i32] {
        &self.values
    }

    /// Root node id of the master catalog table.
    pub fn master_table_root(&self) -> i32 {
        self.values[Self::MASTER_TABLE_ROOT]
    }

    /// Producer-assigned database id, reassembled from its two halves.
    pub fn database_id(&self) -> i64 {
        let high = self.values[Self::DATABASE_ID_HIGH] as i64;
        let low = self.values[Self::DATABASE_ID_LOW] as u32 as i64;
        (high << 32) | low
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source::MemSource;

    fn encode(node_code: u8, version: u8, values: &[i32]) -> Vec<u8> {
        let mut buf = vec![node_code];
        let data_len = 1 + 4 * values.len() as i32;
        buf.extend_from_slice(&data_len.to_be_bytes());
        buf.push(version);
        for v in values {
            buf.extend_from_slice(&v.to_be_bytes());
        }
        buf
    }

    #[test]
    fn decodes_parameters_in_stored_order() {
        let src = MemSource::new(encode(9, 2, &[17, 0x1234, 0x5678, 42]));
        let mut cur = Cursor::new(&src, 0);
        let params = DbParams::read(&mut cur, Endian::Big).unwrap();

        assert_eq!(params.node_code(), 9);
        assert_eq!(params.version(), 2);
        assert_eq!(params.values(), &[17, 0x1234, 0x5678, 42]);
        assert_eq!(params.master_table_root(), 17);
        assert_eq!(params.database_id(), 0x0000_1234_0000_5678);
    }

    #[test]
    fn fewer_than_three_values_is_corrupt() {
        let src = MemSource::new(encode(9, 1, &[17, 3]));
        let mut cur = Cursor::new(&src, 0);
        assert!(matches!(
            DbParams::read(&mut cur, Endian::Big),
            Err(GbfError::Corrupt(_))
        ));
    }

    #[test]
    fn negative_payload_length_is_corrupt() {
        let mut buf = vec![9u8];
        buf.extend_from_slice(&(-5i32).to_be_bytes());
        buf.push(1);
        let src = MemSource::new(buf);
        let mut cur = Cursor::new(&src, 0);
        assert!(matches!(
            DbParams::read(&mut cur, Endian::Big),
            Err(GbfError::Corrupt(_))
        ));
    }
}
