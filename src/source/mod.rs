//! # Byte Sources
//!
//! This module provides [`ByteSource`], the abstraction every other layer of
//! the engine reads through. A source is a fixed sequence of bytes with a
//! known extent; reads are positional, bounds-checked against that extent
//! before any byte is touched, and permission-checked per access.
//!
//! ## Implementations
//!
//! | Type | Backing | Construction |
//! |------|---------|--------------|
//! | [`MemSource`] | Owned `Vec<u8>` | Infallible |
//! | [`FileSource`] | Read-only mmap | Fails with `NotFound` / `ReadAccessDenied` / `Corrupt` |
//! | [`ChainedSource`] | Linked container blocks | Fails on bad chain structure |
//!
//! ## Contract
//!
//! - A read of `len` bytes at `offset` succeeds iff `offset + len <= extent`
//!   and the source is readable; otherwise it fails with `EndOfStream` or
//!   `ReadAccessDenied` and performs no read.
//! - `NotLoaded` is reserved for lazily-backed sources whose requested region
//!   has not been paged in yet; none of the built-in sources produce it, but
//!   the trait contract allows it so callers must treat it as retryable.
//! - All reads are pure: a source never mutates shared state on the read
//!   path, so one source may back any number of concurrent table views
//!   without locking.

mod chained;
mod file;
mod mem;

pub use chained::ChainedSource;
pub use file::FileSource;
pub use mem::MemSource;

use crate::error::{GbfError, Result};

/// Byte order of multi-byte primitives in a container.
///
/// Discovered once per container and threaded through every primitive
/// decode; no decode routine assumes a fixed order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endian {
    Big,
    Little,
}

/// A fixed sequence of bytes supporting bounds-checked positional reads.
pub trait ByteSource: Send + Sync {
    /// Copies exactly `buf.len()` bytes starting at `offset` into `buf`.
    ///
    /// Fails with `EndOfStream` if the region extends past [`extent`], with
    /// `ReadAccessDenied` if the source forbids reads, and with `NotLoaded`
    /// if the region is lazily backed and not resident. On failure nothing
    /// is read and `buf` contents are unspecified.
    ///
    /// [`extent`]: ByteSource::extent
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()>;

    /// One past the last readable byte. An empty source has extent 0.
    fn extent(&self) -> u64;

    /// Whether reads are permitted. Checked on every access.
    fn is_readable(&self) -> bool {
        true
    }

    /// Whether writes are permitted. Always false for the sources in this
    /// crate; part of the contract shared with producers of the format.
    fn is_writable(&self) -> bool {
        false
    }

    /// Common bounds/permission gate for implementations.
    fn check_read(&self, offset: u64, len: usize) -> Result<()> {
        if !self.is_readable() {
            return Err(GbfError::ReadAccessDenied);
        }
        let end = offset
            .checked_add(len as u64)
            .ok_or(GbfError::EndOfStream)?;
        if end > self.extent() {
            return Err(GbfError::EndOfStream);
        }
        Ok(())
    }
}
