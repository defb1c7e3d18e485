//! Short directory entries
//!
//! Builds the 32-byte FAT directory entry for one source record:
//!
//! ```text
//! 0x00 name[8]      0x0E ctime    0x16 mtime
//! 0x08 ext[3]       0x10 cdate    0x18 mdate
//! 0x0B attributes   0x12 adate    0x1A cluster low
//! 0x0C NT reserved  0x14 cluster  0x1C size
//! 0x0D ctime tenths      high
//! ```

pub mod attr;
pub mod name;
pub mod time;

use crate::error::{FatWriteError, Result};
use crate::record::SourceRecord;
use alloc::string::String;
pub use attr::Attributes;
pub use name::ShortName;
use time::DateTime;

/// Encoded size of a directory entry
pub const ENTRY_SIZE: usize = 32;

/// One short directory entry. Immutable once built; `with_first_cluster`
/// returns an updated copy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirectoryEntry {
    pub name: [u8; name::NAME_LEN],
    pub ext: [u8; name::EXT_LEN],
    pub attributes: Attributes,
    pub creation_time: u16,
    pub creation_date: u16,
    pub access_date: u16,
    pub modification_time: u16,
    pub modification_date: u16,
    pub first_cluster: u32,
    pub size: u32,
}

impl DirectoryEntry {
    /// Build the entry for `record`. The first cluster is left at 0.
    pub fn build(record: &SourceRecord) -> Result<Self> {
        if record.size < 0 {
            return Err(FatWriteError::MalformedRecord);
        }
        let units = record.name_units().ok_or(FatWriteError::MalformedRecord)?;

        let directory = record.is_directory();
        let short = if directory {
            name::directory_name(units)?
        } else {
            name::file_name(units)?
        };

        let created = DateTime::from_ticks(record.creation_time);
        let modified = DateTime::from_ticks(record.modification_time);
        let accessed = DateTime::from_ticks(record.access_time);

        Ok(Self {
            name: short.name,
            ext: short.ext,
            attributes: Attributes::from(record.flags),
            creation_time: created.fat_time(),
            creation_date: created.fat_date(),
            access_date: accessed.fat_date(),
            modification_time: modified.fat_time(),
            modification_date: modified.fat_date(),
            first_cluster: 0,
            // Directories always record size 0
            size: if directory { 0 } else { record.size as u32 },
        })
    }

    pub fn with_first_cluster(self, cluster: u32) -> Self {
        Self {
            first_cluster: cluster,
            ..self
        }
    }

    /// `.` entry of a directory whose first cluster is `cluster`.
    pub fn dot(&self, cluster: u32) -> Self {
        Self {
            name: *b".       ",
            ext: *b"   ",
            attributes: Attributes::DIRECTORY,
            first_cluster: cluster,
            size: 0,
            ..*self
        }
    }

    /// `..` entry pointing at `parent_cluster` (0 when the parent is the root).
    pub fn dot_dot(&self, parent_cluster: u32) -> Self {
        Self {
            name: *b"..      ",
            ..self.dot(parent_cluster)
        }
    }

    pub fn is_directory(&self) -> bool {
        self.attributes.contains(Attributes::DIRECTORY)
    }

    pub fn cluster_high(&self) -> u16 {
        (self.first_cluster >> 16) as u16
    }

    pub fn cluster_low(&self) -> u16 {
        (self.first_cluster & 0xFFFF) as u16
    }

    pub fn short_name(&self) -> ShortName {
        ShortName {
            name: self.name,
            ext: self.ext,
        }
    }

    /// Printable `NAME.EXT` form.
    pub fn display_name(&self) -> String {
        let short = self.short_name();
        let mut out: String = short.base().iter().map(|&b| b as char).collect();
        if !short.extension().is_empty() {
            out.push('.');
            out.extend(short.extension().iter().map(|&b| b as char));
        }
        out
    }

    pub fn to_bytes(&self) -> [u8; ENTRY_SIZE] {
        let mut raw = [0u8; ENTRY_SIZE];
        raw[0..8].copy_from_slice(&self.name);
        raw[8..11].copy_from_slice(&self.ext);
        raw[11] = self.attributes.bits();
        raw[14..16].copy_from_slice(&self.creation_time.to_le_bytes());
        raw[16..18].copy_from_slice(&self.creation_date.to_le_bytes());
        raw[18..20].copy_from_slice(&self.access_date.to_le_bytes());
        raw[20..22].copy_from_slice(&self.cluster_high().to_le_bytes());
        raw[22..24].copy_from_slice(&self.modification_time.to_le_bytes());
        raw[24..26].copy_from_slice(&self.modification_date.to_le_bytes());
        raw[26..28].copy_from_slice(&self.cluster_low().to_le_bytes());
        raw[28..32].copy_from_slice(&self.size.to_le_bytes());
        raw
    }

    pub fn from_bytes(raw: &[u8; ENTRY_SIZE]) -> Self {
        let le16 = |at: usize| u16::from_le_bytes([raw[at], raw[at + 1]]);
        let mut name = [0u8; name::NAME_LEN];
        let mut ext = [0u8; name::EXT_LEN];
        name.copy_from_slice(&raw[0..8]);
        ext.copy_from_slice(&raw[8..11]);

        Self {
            name,
            ext,
            attributes: Attributes::from_bits_retain(raw[11]),
            creation_time: le16(14),
            creation_date: le16(16),
            access_date: le16(18),
            modification_time: le16(22),
            modification_date: le16(24),
            first_cluster: ((le16(20) as u32) << 16) | le16(26) as u32,
            size: u32::from_le_bytes([raw[28], raw[29], raw[30], raw[31]]),
        }
    }
}
