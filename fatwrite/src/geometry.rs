//! Volume geometry
//!
//! Parses the BIOS Parameter Block of an already formatted FAT32 volume and
//! derives the byte offsets the writer works with:
//!
//! ```text
//! | reserved | FAT #0 | FAT #1 .. | data (cluster 2, 3, ...) |
//! ^0         ^fat_offset          ^data_offset
//! ```

use crate::disk::ImageIo;
use crate::error::{FatWriteError, Result};
use gpt_disk_io::BlockIo;

/// Boot sector length read at load time
pub const BOOT_SECTOR_SIZE: usize = 512;

/// Size of one FAT32 table entry in bytes
pub const FAT_ENTRY_SIZE: u64 = 4;

/// Size of one short directory entry in bytes
pub const DIR_ENTRY_SIZE: u32 = 32;

/// Parsed and validated FAT32 layout
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Geometry {
    /// Bytes per sector (512, 1024, 2048 or 4096)
    pub bytes_per_sector: u32,

    /// Sectors per cluster (power of two)
    pub sectors_per_cluster: u32,

    /// Sectors before the first FAT
    pub reserved_sectors: u32,

    /// Number of FAT copies
    pub fat_copies: u32,

    /// Sectors per FAT copy
    pub fat_size: u32,

    /// First cluster of the root directory
    pub root_cluster: u32,

    /// Total sectors on the volume
    pub total_sectors: u32,

    /// Byte offset of the primary FAT
    pub fat_offset: u64,

    /// Byte offset of the first mirror FAT
    pub fat_mirror_offset: u64,

    /// Byte offset of cluster 2
    pub data_offset: u64,

    /// Bytes per cluster
    pub bytes_per_cluster: u32,

    /// Number of data clusters (valid cluster numbers are 2..cluster_count+2)
    pub cluster_count: u32,
}

impl Geometry {
    /// Read and validate the boot sector at the start of the volume.
    pub fn load<B: BlockIo>(disk: &mut ImageIo<B>) -> Result<Self> {
        let mut boot_sector = [0u8; BOOT_SECTOR_SIZE];
        disk.read_at(0, &mut boot_sector)?;
        Self::from_boot_sector(&boot_sector)
    }

    /// Parse geometry from a raw boot sector.
    pub fn from_boot_sector(boot_sector: &[u8; BOOT_SECTOR_SIZE]) -> Result<Self> {
        if boot_sector[510] != 0x55 || boot_sector[511] != 0xAA {
            return Err(FatWriteError::InvalidGeometry);
        }

        let le16 = |at: usize| u16::from_le_bytes([boot_sector[at], boot_sector[at + 1]]) as u32;
        let le32 = |at: usize| {
            u32::from_le_bytes([
                boot_sector[at],
                boot_sector[at + 1],
                boot_sector[at + 2],
                boot_sector[at + 3],
            ])
        };

        let bytes_per_sector = le16(0x0B);
        let sectors_per_cluster = boot_sector[0x0D] as u32;
        let reserved_sectors = le16(0x0E);
        let fat_copies = boot_sector[0x10] as u32;
        let total_sectors_16 = le16(0x13);
        let fat_size_16 = le16(0x16);
        let total_sectors_32 = le32(0x20);
        let fat_size = le32(0x24);
        let root_cluster = le32(0x2C);

        if !matches!(bytes_per_sector, 512 | 1024 | 2048 | 4096) {
            return Err(FatWriteError::InvalidGeometry);
        }
        if sectors_per_cluster == 0 || !sectors_per_cluster.is_power_of_two() || sectors_per_cluster > 128 {
            return Err(FatWriteError::InvalidGeometry);
        }
        if reserved_sectors == 0 || fat_copies == 0 {
            return Err(FatWriteError::InvalidGeometry);
        }
        // FAT12/FAT16 carry their table size in the 16-bit field
        if fat_size_16 != 0 || fat_size == 0 {
            return Err(FatWriteError::InvalidGeometry);
        }

        let total_sectors = if total_sectors_16 != 0 { total_sectors_16 } else { total_sectors_32 };
        let data_start_sector = reserved_sectors as u64 + fat_copies as u64 * fat_size as u64;
        if total_sectors as u64 <= data_start_sector {
            return Err(FatWriteError::InvalidGeometry);
        }

        let cluster_count = ((total_sectors as u64 - data_start_sector) / sectors_per_cluster as u64) as u32;
        let fat_entries = fat_size as u64 * bytes_per_sector as u64 / FAT_ENTRY_SIZE;
        if cluster_count == 0 || fat_entries < cluster_count as u64 + 2 {
            return Err(FatWriteError::InvalidGeometry);
        }
        if root_cluster < 2 || root_cluster >= cluster_count + 2 {
            return Err(FatWriteError::InvalidGeometry);
        }

        let fat_offset = reserved_sectors as u64 * bytes_per_sector as u64;
        let fat_size_bytes = fat_size as u64 * bytes_per_sector as u64;

        Ok(Self {
            bytes_per_sector,
            sectors_per_cluster,
            reserved_sectors,
            fat_copies,
            fat_size,
            root_cluster,
            total_sectors,
            fat_offset,
            fat_mirror_offset: fat_offset + fat_size_bytes,
            data_offset: fat_offset + fat_size_bytes * fat_copies as u64,
            bytes_per_cluster: sectors_per_cluster * bytes_per_sector,
            cluster_count,
        })
    }

    /// Size of one FAT copy in bytes
    pub fn fat_size_bytes(&self) -> u64 {
        self.fat_size as u64 * self.bytes_per_sector as u64
    }

    /// Byte offset of `cluster`'s entry in FAT copy `copy`
    pub fn fat_entry_offset(&self, copy: u32, cluster: u32) -> u64 {
        self.fat_offset + copy as u64 * self.fat_size_bytes() + cluster as u64 * FAT_ENTRY_SIZE
    }

    /// Highest valid data cluster number
    pub fn max_cluster(&self) -> u32 {
        self.cluster_count + 1
    }

    /// Whether `cluster` addresses the data region
    pub fn is_data_cluster(&self, cluster: u32) -> bool {
        (2..=self.max_cluster()).contains(&cluster)
    }

    /// Byte offset of the first byte of `cluster`
    pub fn cluster_offset(&self, cluster: u32) -> Result<u64> {
        if !self.is_data_cluster(cluster) {
            return Err(FatWriteError::InvalidCluster);
        }
        Ok(self.data_offset + self.bytes_per_cluster as u64 * (cluster as u64 - 2))
    }

    /// Directory entries that fit in one cluster
    pub fn entries_per_cluster(&self) -> u32 {
        self.bytes_per_cluster / DIR_ENTRY_SIZE
    }
}
