//! # Binary Cursor
//!
//! `Cursor` couples a [`ByteSource`] with a logical read position and decodes
//! primitive and variable-length values at it. Decoding is stateless with
//! respect to everything but the position: the same bytes always produce the
//! same value, and a failed decode leaves no partial result.
//!
//! ## Primitive decodes
//!
//! Fixed-width kinds decode by width (1/2/4/8 bytes) in a caller-supplied
//! [`Endian`]; the byte order is a container-level property, so no routine
//! here hard-codes one.
//!
//! ## Variable-length decodes
//!
//! Strings and byte strings are length-prefixed with a signed 32-bit length:
//!
//! ```text
//! +--------------+----------------------+
//! | len: i32     | payload (len bytes)  |
//! +--------------+----------------------+
//! ```
//!
//! A negative string length is a corruption; for byte strings the single
//! value `-1` encodes an absent payload (producers write it for empty byte
//! columns). The payload region is validated against the source extent
//! before any allocation, so a corrupt length can neither over-allocate nor
//! read out of bounds. Strings must be valid UTF-8.

use crate::error::{GbfError, Result};
use crate::source::{ByteSource, Endian};

/// An advancing typed reader over a [`ByteSource`].
pub struct Cursor<'a> {
    src: &'a dyn ByteSource,
    pos: u64,
}

macro_rules! read_primitive {
    ($name:ident, $ty:ty, $width:expr) => {
        pub fn $name(&mut self, endian: Endian) -> Result<$ty> {
            let mut buf = [0u8; $width];
            self.read_exact(&mut buf)?;
            Ok(match endian {
                Endian::Big => <$ty>::from_be_bytes(buf),
                Endian::Little => <$ty>::from_le_bytes(buf),
            })
        }
    };
}

impl<'a> Cursor<'a> {
    pub fn new(src: &'a dyn ByteSource, pos: u64) -> Cursor<'a> {
        Cursor { src, pos }
    }

    pub fn pos(&self) -> u64 {
        self.pos
    }

    pub fn set_pos(&mut self, pos: u64) {
        self.pos = pos;
    }

    /// Fills `buf` from the current position and advances past it.
    pub fn read_exact(&mut self, buf: &mut [u8]) -> Result<()> {
        self.src.read_at(self.pos, buf)?;
        self.pos += buf.len() as u64;
        Ok(())
    }

    pub fn read_u8(&mut self) -> Result<u8> {
        let mut buf = [0u8; 1];
        self.read_exact(&mut buf)?;
        Ok(buf[0])
    }

    pub fn read_i8(&mut self) -> Result<i8> {
        Ok(self.read_u8()? as i8)
    }

    read_primitive!(read_u16, u16, 2);
    read_primitive!(read_i16, i16, 2);
    read_primitive!(read_u32, u32, 4);
    read_primitive!(read_i32, i32, 4);
    read_primitive!(read_u64, u64, 8);
    read_primitive!(read_i64, i64, 8);

    /// Decodes a length-prefixed UTF-8 string.
    pub fn read_string(&mut self, endian: Endian) -> Result<String> {
        let len = self.read_i32(endian)?;
        if len < 0 {
            return Err(GbfError::corrupt(format!("invalid string length {len}")));
        }

        let bytes = self.read_len_prefixed_payload(len as u64)?;
        String::from_utf8(bytes)
            .map_err(|_| GbfError::corrupt("string payload is not valid utf-8"))
    }

    /// Decodes a length-prefixed byte string. A stored length of `-1`
    /// encodes an absent payload and yields `None`.
    pub fn read_blob(&mut self, endian: Endian) -> Result<Option<Vec<u8>>> {
        let len = self.read_i32(endian)?;
        if len == -1 {
            return Ok(None);
        }
        if len < 0 {
            return Err(GbfError::corrupt(format!("invalid byte-string length {len}")));
        }

        Ok(Some(self.read_len_prefixed_payload(len as u64)?))
    }

    // Bounds are validated against the extent before allocating, so a corrupt
    // length cannot drive allocation size.
    fn read_len_prefixed_payload(&mut self, len: u64) -> Result<Vec<u8>> {
        let end = self.pos.checked_add(len).ok_or(GbfError::EndOfStream)?;
        if end > self.src.extent() {
            return Err(GbfError::EndOfStream);
        }

        let mut bytes = vec![0u8; len as usize];
        self.read_exact(&mut bytes)?;
        Ok(bytes)
    }
}
