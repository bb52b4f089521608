//! # Error Taxonomy
//!
//! Every fallible operation in this crate resolves to exactly one
//! [`GbfError`] variant. The taxonomy is deliberately small because callers
//! are expected to branch on it:
//!
//! | Variant | Meaning | Caller reaction |
//! |---------|---------|-----------------|
//! | `EndOfStream` | A read or decode ran past the source extent | Fatal for this source |
//! | `ReadAccessDenied` | The source forbids reads | Fatal |
//! | `WriteAccessDenied` | The source forbids writes | Fatal |
//! | `NotLoaded` | A lazily-backed region is not resident yet | Retry after loading |
//! | `NotFound` | A file path did not resolve on open | Fatal |
//! | `Corrupt` | A structural/decode inconsistency (bad tag, bad length, bad node kind) | Fatal |
//!
//! `NotLoaded` is the only transient condition: it distinguishes "will never
//! be readable" from "not yet readable" for sources that page data in on
//! demand, so a caller may re-issue the call after an explicit load step.
//!
//! Absence is never an error. "No such key" and "no such table" are expressed
//! as `Option::None` by the lookup APIs; an error always means the container
//! itself could not be decoded.

use thiserror::Error;

/// Result type alias used throughout the crate.
pub type Result<T> = std::result::Result<T, GbfError>;

/// Failure modes of the byte-source and decode layers.
#[derive(Error, Debug)]
pub enum GbfError {
    /// A read would extend past the known extent of the source. The read is
    /// rejected before any byte is touched.
    #[error("read past end of source")]
    EndOfStream,

    /// The source does not permit reads.
    #[error("source does not permit reads")]
    ReadAccessDenied,

    /// The source does not permit writes. This engine never writes, but the
    /// variant is part of the source-level contract shared with producers.
    #[error("source does not permit writes")]
    WriteAccessDenied,

    /// The requested region is backed by lazy storage and has not been
    /// brought into memory yet. Transient: a retry after a load step may
    /// succeed.
    #[error("region is not loaded yet")]
    NotLoaded,

    /// The file path did not resolve when opening a file-backed source.
    #[error("file not found")]
    NotFound,

    /// Any structural or decode inconsistency: an unknown field-kind tag, a
    /// negative length, a node id out of range, an unexpected node kind.
    #[error("{0}")]
    Corrupt(String),
}

impl GbfError {
    /// Shorthand for a [`GbfError::Corrupt`] with a formatted message.
    pub fn corrupt(msg: impl Into<String>) -> GbfError {
        GbfError::Corrupt(msg.into())
    }

    /// Whether a caller may retry the failed operation after loading more of
    /// the source. True only for [`GbfError::NotLoaded`].
    pub fn is_transient(&self) -> bool {
        matches!(self, GbfError::NotLoaded)
    }
}

impl From<std::io::Error> for GbfError {
    fn from(err: std::io::Error) -> GbfError {
        use std::io::ErrorKind;
        match err.kind() {
            ErrorKind::NotFound => GbfError::NotFound,
            ErrorKind::PermissionDenied => GbfError::ReadAccessDenied,
            ErrorKind::UnexpectedEof => GbfError::EndOfStream,
            _ => GbfError::Corrupt(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn not_loaded_is_the_only_transient_variant() {
        assert!(GbfError::NotLoaded.is_transient());
        assert!(!GbfError::EndOfStream.is_transient());
        assert!(!GbfError::ReadAccessDenied.is_transient());
        assert!(!GbfError::WriteAccessDenied.is_transient());
        assert!(!GbfError::NotFound.is_transient());
        assert!(!GbfError::corrupt("bad tag").is_transient());
    }

    #[test]
    fn io_errors_map_into_the_taxonomy() {
        use std::io::{Error, ErrorKind};

        let err: GbfError = Error::from(ErrorKind::NotFound).into();
        assert!(matches!(err, GbfError::NotFound));

        let err: GbfError = Error::from(ErrorKind::PermissionDenied).into();
        assert!(matches!(err, GbfError::ReadAccessDenied));

        let err: GbfError = Error::from(ErrorKind::UnexpectedEof).into();
        assert!(matches!(err, GbfError::EndOfStream));
    }
}
