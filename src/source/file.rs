//! # File-Backed Byte Source
//!
//! `FileSource` maps a container file read-only into the process address
//! space. This buys the same properties the rest of the engine assumes of a
//! source: the extent is fixed at open time, reads are pure, and the OS page
//! cache stands in for any engine-level caching, so repeated node reads
//! during tree descent stay cheap without the engine holding state between
//! lookups.
//!
//! Open failures are mapped into the crate taxonomy: a missing path is
//! `NotFound`, a permission failure is `ReadAccessDenied`, anything else is
//! `Corrupt` carrying the OS message.

use std::fs::File;
use std::path::Path;

use memmap2::Mmap;

use super::ByteSource;
use crate::error::Result;

/// Read-only memory-mapped source over a container file.
#[derive(Debug)]
pub struct FileSource {
    mmap: Mmap,
}

impl FileSource {
    pub fn open<P: AsRef<Path>>(path: P) -> Result<FileSource> {
        let file = File::open(path.as_ref())?;

        // SAFETY: Mmap::map is unsafe because the file could be truncated or
        // rewritten by another process while mapped. Container files are
        // produced once and then consumed read-only; the mapping is private
        // to this FileSource and every access goes through read_at, which
        // bounds-checks against the extent captured at map time.
        let mmap = unsafe { Mmap::map(&file)? };

        Ok(FileSource { mmap })
    }
}

impl ByteSource for FileSource {
    fn read_at(&self, offset: u64, buf: &mut [u8]) -> Result<()> {
        self.check_read(offset, buf.len())?;
        let at = offset as usize;
        buf.copy_from_slice(&self.mmap[at..at + buf.len()]);
        Ok(())
    }

    fn extent(&self) -> u64 {
        self.mmap.len() as u64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::GbfError;
    use std::io::Write;
    use tempfile::tempdir;

    #[test]
    fn open_and_read_back_file_contents() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("box.gbf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[0xCA, 0xFE, 0xBA, 0xBE])
            .unwrap();

        let src = FileSource::open(&path).unwrap();
        assert_eq!(src.extent(), 4);

        let mut buf = [0u8; 2];
        src.read_at(2, &mut buf).unwrap();
        assert_eq!(buf, [0xBA, 0xBE]);
    }

    #[test]
    fn open_missing_file_is_not_found() {
        let dir = tempdir().unwrap();
        let err = FileSource::open(dir.path().join("missing.gbf")).unwrap_err();
        assert!(matches!(err, GbfError::NotFound));
    }

    #[test]
    fn read_past_file_extent_fails() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("small.gbf");
        std::fs::File::create(&path)
            .unwrap()
            .write_all(&[1, 2, 3])
            .unwrap();

        let src = FileSource::open(&path).unwrap();
        let mut buf = [0u8; 3];
        assert!(matches!(
            src.read_at(1, &mut buf),
            Err(GbfError::EndOfStream)
        ));
    }
}
