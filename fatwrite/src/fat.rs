// FAT32 cluster allocation and chain maintenance
//
// Every table write goes to the primary FAT and to each mirror at the same
// relative offset. Free clusters are found first-fit by scanning from a fixed
// start index on every call; nothing is cached between allocations.

use crate::disk::ImageIo;
use crate::error::{FatWriteError, Result};
use crate::geometry::Geometry;
use alloc::vec;
use alloc::vec::Vec;
use gpt_disk_io::BlockIo;

pub const FAT_FREE: u32 = 0x0000_0000;
pub const FAT_BAD: u32 = 0x0FFF_FFF7;
/// Values at or above this mark the end of a chain
pub const FAT_EOC_MIN: u32 = 0x0FFF_FFF8;
pub const FAT_EOC: u32 = 0x0FFF_FFFF;

// FAT32 uses only 28 bits; the top four are reserved and kept as found
const FAT_MASK: u32 = 0x0FFF_FFFF;
const FAT_RESERVED_BITS: u32 = 0xF000_0000;

const ZERO_CHUNK: [u8; 512] = [0u8; 512];

pub fn is_end_of_chain(value: u32) -> bool {
    value & FAT_MASK >= FAT_EOC_MIN
}

#[derive(Debug, Clone)]
pub struct ClusterAllocator {
    geometry: Geometry,
    scan_start: u32,
}

impl ClusterAllocator {
    pub fn new(geometry: Geometry, scan_start: u32) -> Self {
        Self {
            geometry,
            scan_start: scan_start.max(2),
        }
    }

    pub fn geometry(&self) -> &Geometry {
        &self.geometry
    }

    pub fn scan_start(&self) -> u32 {
        self.scan_start
    }

    /// Read `cluster`'s entry from the primary FAT.
    pub fn read_chain_entry<B: BlockIo>(&self, disk: &mut ImageIo<B>, cluster: u32) -> Result<u32> {
        if cluster > self.geometry.max_cluster() {
            return Err(FatWriteError::InvalidCluster);
        }
        let raw = disk.read_u32(self.geometry.fat_entry_offset(0, cluster))?;
        Ok(raw & FAT_MASK)
    }

    /// Store `value` for `cluster` in every FAT copy.
    pub fn write_chain_entry<B: BlockIo>(
        &self,
        disk: &mut ImageIo<B>,
        cluster: u32,
        value: u32,
    ) -> Result<()> {
        if !self.geometry.is_data_cluster(cluster) {
            return Err(FatWriteError::InvalidCluster);
        }
        let valid_value = value == FAT_FREE
            || (FAT_BAD..=FAT_MASK).contains(&value)
            || self.geometry.is_data_cluster(value);
        if !valid_value {
            return Err(FatWriteError::InvalidCluster);
        }

        #[cfg(feature = "fat32_debug")]
        log::trace!("FAT[{}] <- {:#010x}", cluster, value);

        for copy in 0..self.geometry.fat_copies {
            let at = self.geometry.fat_entry_offset(copy, cluster);
            let reserved = disk.read_u32(at)? & FAT_RESERVED_BITS;
            disk.write_u32(at, reserved | value)?;
        }
        Ok(())
    }

    /// Mark `cluster` free again after a failed allocate-and-write sequence.
    ///
    /// A release that fails itself is logged; the original error wins.
    pub fn release<B: BlockIo>(&self, disk: &mut ImageIo<B>, cluster: u32) {
        if let Err(err) = self.write_chain_entry(disk, cluster, FAT_FREE) {
            log::warn!("cluster {} could not be released ({}), it stays allocated", cluster, err);
        }
    }

    /// First free cluster at or after the scan start.
    pub fn find_free_cluster<B: BlockIo>(&self, disk: &mut ImageIo<B>) -> Result<u32> {
        let bps = self.geometry.bytes_per_sector;
        let per_sector = bps / 4;
        let last = self.geometry.max_cluster();
        let mut sector = vec![0u8; bps as usize];
        let mut cluster = self.scan_start;

        while cluster <= last {
            let sector_index = cluster / per_sector;
            disk.read_at(
                self.geometry.fat_offset + sector_index as u64 * bps as u64,
                &mut sector,
            )?;

            let first_in_sector = sector_index * per_sector;
            let end = (first_in_sector + per_sector - 1).min(last);
            for candidate in cluster..=end {
                let at = ((candidate - first_in_sector) * 4) as usize;
                let entry = u32::from_le_bytes([sector[at], sector[at + 1], sector[at + 2], sector[at + 3]]);
                if entry & FAT_MASK == FAT_FREE {
                    return Ok(candidate);
                }
            }
            cluster = end + 1;
        }

        log::warn!("FAT scan from cluster {} found no free cluster", self.scan_start);
        Err(FatWriteError::OutOfSpace)
    }

    /// Take a free cluster and mark it end-of-chain.
    pub fn allocate<B: BlockIo>(&self, disk: &mut ImageIo<B>) -> Result<u32> {
        let cluster = self.find_free_cluster(disk)?;
        self.write_chain_entry(disk, cluster, FAT_EOC)?;
        log::debug!("allocated cluster {}", cluster);
        Ok(cluster)
    }

    /// Allocate a cluster and overwrite its data with zeros.
    ///
    /// If zeroing fails the cluster is released before the error is returned.
    pub fn allocate_and_zero<B: BlockIo>(&self, disk: &mut ImageIo<B>) -> Result<u32> {
        let cluster = self.allocate(disk)?;
        if let Err(err) = self.zero_cluster(disk, cluster) {
            self.release(disk, cluster);
            return Err(err);
        }
        Ok(cluster)
    }

    pub fn zero_cluster<B: BlockIo>(&self, disk: &mut ImageIo<B>, cluster: u32) -> Result<()> {
        let base = self.geometry.cluster_offset(cluster)?;
        let bpc = self.geometry.bytes_per_cluster as usize;
        let mut written = 0usize;
        while written < bpc {
            let len = (bpc - written).min(ZERO_CHUNK.len());
            disk.write_at(base + written as u64, &ZERO_CHUNK[..len])?;
            written += len;
        }
        Ok(())
    }

    /// Point `prev`'s entry at `next`.
    pub fn link<B: BlockIo>(&self, disk: &mut ImageIo<B>, prev: u32, next: u32) -> Result<()> {
        if !self.geometry.is_data_cluster(next) {
            return Err(FatWriteError::InvalidCluster);
        }
        self.write_chain_entry(disk, prev, next)
    }

    /// The cluster that would be handed out after `cluster`, consuming neither.
    ///
    /// `cluster` is held as end-of-chain for the duration of the scan and then
    /// gets its previous entry back.
    pub fn probe_next_available_after<B: BlockIo>(
        &self,
        disk: &mut ImageIo<B>,
        cluster: u32,
    ) -> Result<u32> {
        let previous = self.read_chain_entry(disk, cluster)?;
        self.write_chain_entry(disk, cluster, FAT_EOC)?;
        let probed = self.find_free_cluster(disk);
        self.write_chain_entry(disk, cluster, previous)?;
        probed
    }

    /// Clusters of the chain starting at `first`, in order.
    pub fn chain<B: BlockIo>(&self, disk: &mut ImageIo<B>, first: u32) -> Result<Vec<u32>> {
        let mut clusters = Vec::new();
        let mut current = first;
        loop {
            if !self.geometry.is_data_cluster(current) || clusters.len() as u32 >= self.geometry.cluster_count {
                return Err(FatWriteError::CorruptChain);
            }
            clusters.push(current);
            let next = self.read_chain_entry(disk, current)?;
            if is_end_of_chain(next) {
                return Ok(clusters);
            }
            current = next;
        }
    }
}
