//! Common test utilities and mock block devices

#![allow(dead_code)]

pub mod builder;
pub use builder::FatImageBuilder;

use gpt_disk_io::BlockIo;
use gpt_disk_types::{BlockSize, Lba};
use std::io::{self, Cursor, Read};

pub const SECTOR_SIZE: usize = 512;

/// In-memory block device for testing
#[derive(Debug, Clone)]
pub struct MemoryBlockDevice {
    pub data: Vec<u8>,
    pub block_size: usize,
}

impl MemoryBlockDevice {
    pub fn new(data: Vec<u8>) -> Self {
        Self {
            data,
            block_size: SECTOR_SIZE,
        }
    }

    /// A 40 MB volume formatted as FAT32 by `fatfs`.
    ///
    /// FAT32 needs at least 65 525 clusters; `fatfs` picks one sector per
    /// cluster at this size.
    pub fn fatfs_volume() -> Self {
        const SIZE: usize = 40 * 1024 * 1024;
        let mut cursor = Cursor::new(vec![0u8; SIZE]);
        fatfs::format_volume(
            &mut cursor,
            fatfs::FormatVolumeOptions::new().fat_type(fatfs::FatType::Fat32),
        )
        .expect("format_volume failed");
        Self::new(cursor.into_inner())
    }

    /// Same volume behind `sectors` blocks of leading padding
    pub fn fatfs_volume_at(sectors: usize) -> Self {
        let volume = Self::fatfs_volume();
        let mut data = vec![0u8; sectors * SECTOR_SIZE];
        data.extend_from_slice(&volume.data);
        Self::new(data)
    }
}

impl BlockIo for MemoryBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        BlockSize::new(self.block_size as u32).expect("valid block size")
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        Ok((self.data.len() / self.block_size) as u64)
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + dst.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::UnexpectedEof,
                "read beyond end of device",
            ));
        }
        dst.copy_from_slice(&self.data[offset..offset + dst.len()]);
        Ok(())
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        let offset = start_lba.0 as usize * self.block_size;
        if offset + src.len() > self.data.len() {
            return Err(io::Error::new(
                io::ErrorKind::WriteZero,
                "write beyond end of device",
            ));
        }
        self.data[offset..offset + src.len()].copy_from_slice(src);
        Ok(())
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Device that starts failing after a number of successful operations
#[derive(Debug, Clone)]
pub struct FailingBlockDevice {
    pub inner: MemoryBlockDevice,
    pub reads_left: usize,
    pub writes_left: usize,
}

impl FailingBlockDevice {
    pub fn new(inner: MemoryBlockDevice, reads_left: usize, writes_left: usize) -> Self {
        Self {
            inner,
            reads_left,
            writes_left,
        }
    }
}

impl BlockIo for FailingBlockDevice {
    type Error = io::Error;

    fn block_size(&self) -> BlockSize {
        self.inner.block_size()
    }

    fn num_blocks(&mut self) -> Result<u64, Self::Error> {
        self.inner.num_blocks()
    }

    fn read_blocks(&mut self, start_lba: Lba, dst: &mut [u8]) -> Result<(), Self::Error> {
        if self.reads_left == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "injected read failure"));
        }
        self.reads_left -= 1;
        self.inner.read_blocks(start_lba, dst)
    }

    fn write_blocks(&mut self, start_lba: Lba, src: &[u8]) -> Result<(), Self::Error> {
        if self.writes_left == 0 {
            return Err(io::Error::new(io::ErrorKind::Other, "injected write failure"));
        }
        self.writes_left -= 1;
        self.inner.write_blocks(start_lba, src)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

/// Directory listing without `.` and `..`, sorted
pub fn visible_names(names: impl Iterator<Item = String>) -> Vec<String> {
    let mut names: Vec<String> = names.filter(|name| name != "." && name != "..").collect();
    names.sort();
    names
}

pub fn read_all(mut reader: impl Read) -> Vec<u8> {
    let mut buf = Vec::new();
    reader.read_to_end(&mut buf).expect("read failed");
    buf
}

/// Deterministic test content that differs from cluster to cluster
pub fn pattern(len: usize) -> Vec<u8> {
    (0..len).map(|i| ((i * 7 + i / 512) % 256) as u8).collect()
}
