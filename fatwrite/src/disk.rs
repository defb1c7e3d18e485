// Byte-addressed access to a FAT32 image on a block device
//
// FAT entries and directory entries are smaller than a block, so partial
// block writes go through a read-modify-write of the containing block.
// Offsets are relative to the start of the FAT32 partition.

use crate::error::{FatWriteError, Result};
use alloc::vec;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;
use gpt_disk_types::Lba;

pub struct ImageIo<B: BlockIo> {
    block_io: B,
    partition_start: u64,
    block_size: usize,
    scratch: Vec<u8>,
}

impl<B: BlockIo> ImageIo<B> {
    /// Wrap `block_io`; the volume starts at LBA `partition_start`.
    pub fn new(block_io: B, partition_start: u64) -> Self {
        let block_size = block_io.block_size().to_u32() as usize;
        Self {
            block_io,
            partition_start,
            block_size,
            scratch: vec![0u8; block_size],
        }
    }

    pub fn block_size(&self) -> usize {
        self.block_size
    }

    pub fn partition_start(&self) -> u64 {
        self.partition_start
    }

    fn lba(&self, block: u64) -> Lba {
        Lba(self.partition_start + block)
    }

    /// Read `dst.len()` bytes starting at byte `offset`.
    pub fn read_at(&mut self, offset: u64, dst: &mut [u8]) -> Result<()> {
        let bs = self.block_size;
        let mut pos = offset;
        let mut done = 0usize;

        while done < dst.len() {
            let block = pos / bs as u64;
            let within = (pos % bs as u64) as usize;
            let remaining = dst.len() - done;
            let lba = self.lba(block);

            if within == 0 && remaining >= bs {
                let whole = remaining - remaining % bs;
                self.block_io
                    .read_blocks(lba, &mut dst[done..done + whole])
                    .map_err(|_| FatWriteError::DiskIo)?;
                done += whole;
                pos += whole as u64;
            } else {
                let take = (bs - within).min(remaining);
                self.block_io
                    .read_blocks(lba, &mut self.scratch)
                    .map_err(|_| FatWriteError::DiskIo)?;
                dst[done..done + take].copy_from_slice(&self.scratch[within..within + take]);
                done += take;
                pos += take as u64;
            }
        }

        Ok(())
    }

    /// Write `src` starting at byte `offset`.
    pub fn write_at(&mut self, offset: u64, src: &[u8]) -> Result<()> {
        let bs = self.block_size;
        let mut pos = offset;
        let mut done = 0usize;

        while done < src.len() {
            let block = pos / bs as u64;
            let within = (pos % bs as u64) as usize;
            let remaining = src.len() - done;
            let lba = self.lba(block);

            if within == 0 && remaining >= bs {
                let whole = remaining - remaining % bs;
                self.block_io
                    .write_blocks(lba, &src[done..done + whole])
                    .map_err(|_| FatWriteError::DiskIo)?;
                done += whole;
                pos += whole as u64;
            } else {
                let take = (bs - within).min(remaining);
                self.block_io
                    .read_blocks(lba, &mut self.scratch)
                    .map_err(|_| FatWriteError::DiskIo)?;
                self.scratch[within..within + take].copy_from_slice(&src[done..done + take]);
                self.block_io
                    .write_blocks(lba, &self.scratch)
                    .map_err(|_| FatWriteError::DiskIo)?;
                done += take;
                pos += take as u64;
            }
        }

        Ok(())
    }

    pub fn read_u32(&mut self, offset: u64) -> Result<u32> {
        let mut raw = [0u8; 4];
        self.read_at(offset, &mut raw)?;
        Ok(u32::from_le_bytes(raw))
    }

    pub fn write_u32(&mut self, offset: u64, value: u32) -> Result<()> {
        self.write_at(offset, &value.to_le_bytes())
    }

    pub fn flush(&mut self) -> Result<()> {
        self.block_io.flush().map_err(|_| FatWriteError::DiskIo)
    }

    pub fn get_mut(&mut self) -> &mut B {
        &mut self.block_io
    }

    pub fn into_inner(self) -> B {
        self.block_io
    }
}
