//! File content writer
//!
//! Streams one file's content into its cluster chain, one cluster per chunk.
//!
//! # Usage
//!
//! ```ignore
//! let mut data = DataWriter::new(&entry, record.size)?;
//! for chunk in content.chunks(bytes_per_cluster) {
//!     data.write_chunk(&mut disk, &fat, chunk)?;
//! }
//! data.finish(&mut disk, &fat)?;
//! ```

use crate::disk::ImageIo;
use crate::entry::DirectoryEntry;
use crate::error::{FatWriteError, Result};
use crate::fat::{ClusterAllocator, FAT_EOC};
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

/// Data writer state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataState {
    /// No chunk written yet
    Ready,
    /// Some chunks written, more expected
    Writing,
    /// Chain terminated
    Finished,
}

#[derive(Debug)]
pub struct DataWriter {
    state: DataState,
    /// Cluster the next chunk goes to
    current: u32,
    first: u32,
    /// Declared bytes not yet written
    remaining: u64,
    clusters: u32,
    bytes_written: u64,
    block: Vec<u8>,
}

impl DataWriter {
    /// Writer for the file described by `entry`, whose first cluster must
    /// already be allocated.
    pub fn new(entry: &DirectoryEntry, size: i64) -> Result<Self> {
        if entry.first_cluster < 2 {
            return Err(FatWriteError::InvalidCluster);
        }
        if size < 0 {
            return Err(FatWriteError::MalformedRecord);
        }
        Ok(Self {
            state: DataState::Ready,
            current: entry.first_cluster,
            first: entry.first_cluster,
            remaining: size as u64,
            clusters: 0,
            bytes_written: 0,
            block: Vec::new(),
        })
    }

    pub fn state(&self) -> DataState {
        self.state
    }

    pub fn is_finished(&self) -> bool {
        self.state == DataState::Finished
    }

    pub fn first_cluster(&self) -> u32 {
        self.first
    }

    /// Clusters filled with content so far
    pub fn clusters_written(&self) -> u32 {
        self.clusters
    }

    pub fn bytes_written(&self) -> u64 {
        self.bytes_written
    }

    /// Write up to one cluster of content to the current cluster.
    ///
    /// Every chunk but the last must fill a whole cluster, and the chunks
    /// together must add up to the declared size. The rest of the cluster is
    /// zeroed. If declared content remains, the next cluster is allocated and
    /// linked; otherwise the chain is closed.
    pub fn write_chunk<B: BlockIo>(
        &mut self,
        disk: &mut ImageIo<B>,
        fat: &ClusterAllocator,
        chunk: &[u8],
    ) -> Result<()> {
        let bpc = fat.geometry().bytes_per_cluster as usize;
        if self.state == DataState::Finished || chunk.len() > bpc {
            return Err(FatWriteError::InvalidChunk);
        }
        let len = chunk.len() as u64;
        if len > self.remaining {
            log::warn!(
                "file at cluster {}: {} byte chunk exceeds the {} declared bytes left",
                self.first,
                len,
                self.remaining
            );
            return Err(FatWriteError::InvalidChunk);
        }
        if chunk.len() < bpc && len < self.remaining {
            log::warn!(
                "file at cluster {}: short chunk of {} bytes with {} declared bytes left",
                self.first,
                len,
                self.remaining
            );
            return Err(FatWriteError::InvalidChunk);
        }

        self.block.clear();
        self.block.extend_from_slice(chunk);
        self.block.resize(bpc, 0);
        disk.write_at(fat.geometry().cluster_offset(self.current)?, &self.block)?;

        self.clusters += 1;
        self.bytes_written += len;
        self.remaining -= len;

        if self.remaining == 0 {
            fat.write_chain_entry(disk, self.current, FAT_EOC)?;
            self.state = DataState::Finished;
        } else {
            let next = fat.allocate(disk)?;
            if let Err(err) = fat.link(disk, self.current, next) {
                fat.release(disk, next);
                return Err(err);
            }
            self.current = next;
            self.state = DataState::Writing;
        }
        Ok(())
    }

    /// Close the chain.
    ///
    /// A zero-length file keeps its single allocated cluster. Declared content
    /// that was never written is an error.
    pub fn finish<B: BlockIo>(&mut self, disk: &mut ImageIo<B>, fat: &ClusterAllocator) -> Result<()> {
        match self.state {
            DataState::Finished => Ok(()),
            _ if self.remaining == 0 => {
                fat.write_chain_entry(disk, self.current, FAT_EOC)?;
                self.state = DataState::Finished;
                Ok(())
            }
            _ => {
                log::warn!(
                    "file at cluster {} ended with {} declared bytes unwritten",
                    self.first,
                    self.remaining
                );
                Err(FatWriteError::InvalidChunk)
            }
        }
    }
}
