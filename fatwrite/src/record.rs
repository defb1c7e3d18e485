//! Input records produced by the source filesystem reader

use alloc::vec::Vec;
use bitflags::bitflags;

bitflags! {
    /// File attribute flags as reported by the source filesystem.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct FileFlags: u32 {
        const READ_ONLY = 0x0000_0001;
        const HIDDEN = 0x0000_0002;
        const SYSTEM = 0x0000_0004;
        const ARCHIVE = 0x0000_0020;
        /// Entry indexes other names: a directory
        const DIRECTORY = 0x1000_0000;

        // The source may set any bits
        const _ = !0;
    }
}

/// One file or directory as seen by the source reader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceRecord {
    /// Identifier of this record; directories use it as parent id for children
    pub id: u64,
    /// Identifier of the containing directory
    pub parent_id: u64,
    /// UTF-16 name buffer
    pub name: Vec<u16>,
    /// Number of valid characters in `name`
    pub name_length: usize,
    pub flags: FileFlags,
    /// Size in bytes as declared by the source
    pub size: i64,
    /// Creation time in 100 ns ticks since 1601-01-01 UTC
    pub creation_time: u64,
    /// Last modification time, same unit
    pub modification_time: u64,
    /// Last access time, same unit
    pub access_time: u64,
}

impl SourceRecord {
    /// Record with `name` encoded to UTF-16 and zero timestamps.
    pub fn new(id: u64, parent_id: u64, name: &str, flags: FileFlags, size: i64) -> Self {
        let name: Vec<u16> = name.encode_utf16().collect();
        Self {
            id,
            parent_id,
            name_length: name.len(),
            name,
            flags,
            size,
            creation_time: 0,
            modification_time: 0,
            access_time: 0,
        }
    }

    pub fn file(id: u64, parent_id: u64, name: &str, size: i64) -> Self {
        Self::new(id, parent_id, name, FileFlags::ARCHIVE, size)
    }

    pub fn directory(id: u64, parent_id: u64, name: &str) -> Self {
        Self::new(id, parent_id, name, FileFlags::DIRECTORY, 0)
    }

    /// Set all three timestamps to `ticks`.
    pub fn with_times(mut self, ticks: u64) -> Self {
        self.creation_time = ticks;
        self.modification_time = ticks;
        self.access_time = ticks;
        self
    }

    pub fn is_directory(&self) -> bool {
        self.flags.contains(FileFlags::DIRECTORY)
    }

    /// The valid part of the name buffer, if the declared length fits.
    pub fn name_units(&self) -> Option<&[u16]> {
        self.name.get(..self.name_length)
    }
}
