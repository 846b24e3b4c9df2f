//! In-memory zip archive handle.
//!
//! Archives are fetched whole from object storage, so the handle owns the
//! byte buffer and indexes the central directory once on construction.

use std::fmt;
use std::io::{Cursor, Read};

use zip::result::{ZipError, ZipResult};
use zip::{CompressionMethod, ZipArchive};

/// Metadata for one entry of an archive, in central-directory order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ArchiveEntry {
    pub name: String,
    pub size: u64,
    pub compressed_size: u64,
    pub compressed: bool,
    pub is_dir: bool,
}

pub struct ArchiveHandle {
    archive: ZipArchive<Cursor<Vec<u8>>>,
    entries: Vec<ArchiveEntry>,
}

impl ArchiveHandle {
    /// Parse `bytes` as a zip container. Errors come straight from the zip
    /// reader and cover the container structure only: bad signatures and
    /// truncated data. Entries are listed without decoding them, so encrypted
    /// entries or unsupported compression methods only fail on extraction.
    pub fn from_bytes(bytes: Vec<u8>) -> ZipResult<Self> {
        let mut archive = ZipArchive::new(Cursor::new(bytes))?;

        let mut entries = Vec::with_capacity(archive.len());
        for index in 0..archive.len() {
            let file = archive.by_index_raw(index)?;
            entries.push(ArchiveEntry {
                name: file.name().to_string(),
                size: file.size(),
                compressed_size: file.compressed_size(),
                compressed: file.compression() != CompressionMethod::Stored,
                is_dir: file.is_dir(),
            });
        }

        Ok(Self { archive, entries })
    }

    pub fn entries(&self) -> &[ArchiveEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entry(&self, name: &str) -> Option<&ArchiveEntry> {
        self.entries.iter().find(|entry| entry.name == name)
    }

    /// Decompress the entry at `index` into memory.
    pub fn extract(&mut self, index: usize) -> ZipResult<Vec<u8>> {
        let mut file = self.archive.by_index(index)?;
        read_entry(&mut file)
    }

    pub fn extract_by_name(&mut self, name: &str) -> ZipResult<Vec<u8>> {
        let mut file = self.archive.by_name(name)?;
        read_entry(&mut file)
    }
}

impl fmt::Debug for ArchiveHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ArchiveHandle")
            .field("entries", &self.entries)
            .finish_non_exhaustive()
    }
}

fn read_entry(file: &mut impl Read) -> ZipResult<Vec<u8>> {
    let mut body = Vec::new();
    file.read_to_end(&mut body).map_err(ZipError::Io)?;
    Ok(body)
}
