//! In-memory byte source.

use super::ByteSource;
use crate::error::Result;

/// A source over an owned byte buffer. Construction never fails; every read
/// is bounds-checked against the buffer length.
#[derive(Debug)]
pub struct MemSource {
    data: Vec<u8>,
    readable: bool,
}

impl MemSource {
    pub fn new(data: Vec<u8>) -> MemSource {
        MemSource {
            data,
            readable: true,
        }
    }

    /// A source with an explicit read permission, for callers that hand a
    /// buffer to untrusted decode paths and want access enforced per read.
    pub fn with_access(data: Vec<u8>, readable: bool) -> MemSource {
        MemSource { data, readable }
    }
}

impl ByteSource for MemSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.check_read(offset, buf.len())?;
        let at = offset as usize;
        buf.copy_from_slice(&self.data[at..at + buf.len()]);
        Ok(())
    }

    fn extent(&self) -> u64 {
        self.data.len() as u64
    }

    fn is_readable(&self) -> bool {
        self.readable
    }
}
