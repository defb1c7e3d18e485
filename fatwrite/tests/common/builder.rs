use crate::common::{MemoryBlockDevice, SECTOR_SIZE};

/// Hand-built FAT32 volume, small enough to exhaust in a test.
///
/// Real formatters refuse FAT32 below 65 525 clusters; the writer does not.
pub struct FatImageBuilder {
    sectors_per_cluster: u8,
    reserved_sectors: u16,
    fat_copies: u8,
    clusters: u32,
    root_cluster: u32,
    bytes_per_sector: u16,
    signature: bool,
}

impl FatImageBuilder {
    pub fn new() -> Self {
        Self {
            sectors_per_cluster: 1,
            reserved_sectors: 32,
            fat_copies: 2,
            clusters: 64,
            root_cluster: 2,
            bytes_per_sector: SECTOR_SIZE as u16,
            signature: true,
        }
    }

    pub fn clusters(mut self, clusters: u32) -> Self {
        self.clusters = clusters;
        self
    }

    pub fn sectors_per_cluster(mut self, spc: u8) -> Self {
        self.sectors_per_cluster = spc;
        self
    }

    pub fn fat_copies(mut self, copies: u8) -> Self {
        self.fat_copies = copies;
        self
    }

    /// Raw value for the bytes-per-sector field (the device stays at 512)
    pub fn bytes_per_sector(mut self, bps: u16) -> Self {
        self.bytes_per_sector = bps;
        self
    }

    pub fn without_signature(mut self) -> Self {
        self.signature = false;
        self
    }

    /// FAT size in sectors for the configured cluster count
    pub fn fat_sectors(&self) -> u32 {
        ((self.clusters + 2) * 4 + SECTOR_SIZE as u32 - 1) / SECTOR_SIZE as u32
    }

    pub fn fat_offset(&self, copy: u32) -> usize {
        (self.reserved_sectors as usize + (copy * self.fat_sectors()) as usize) * SECTOR_SIZE
    }

    pub fn cluster_offset(&self, cluster: u32) -> usize {
        let data = self.fat_offset(self.fat_copies as u32);
        data + (cluster as usize - 2) * self.sectors_per_cluster as usize * SECTOR_SIZE
    }

    pub fn build(&self) -> MemoryBlockDevice {
        let spc = self.sectors_per_cluster as u32;
        let data_start = self.reserved_sectors as u32 + self.fat_copies as u32 * self.fat_sectors();
        let total = data_start + self.clusters * spc;
        let mut data = vec![0u8; total as usize * SECTOR_SIZE];

        // Boot sector
        data[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
        data[3..11].copy_from_slice(b"FATWRITE");
        data[0x0B..0x0D].copy_from_slice(&self.bytes_per_sector.to_le_bytes());
        data[0x0D] = self.sectors_per_cluster;
        data[0x0E..0x10].copy_from_slice(&self.reserved_sectors.to_le_bytes());
        data[0x10] = self.fat_copies;
        data[0x15] = 0xF8;
        data[0x20..0x24].copy_from_slice(&total.to_le_bytes());
        data[0x24..0x28].copy_from_slice(&self.fat_sectors().to_le_bytes());
        data[0x2C..0x30].copy_from_slice(&self.root_cluster.to_le_bytes());
        data[0x52..0x5A].copy_from_slice(b"FAT32   ");
        if self.signature {
            data[510] = 0x55;
            data[511] = 0xAA;
        }

        // Media entry, reserved entry and root end-of-chain in every copy
        for copy in 0..self.fat_copies as u32 {
            let fat = self.fat_offset(copy);
            data[fat..fat + 4].copy_from_slice(&0x0FFF_FFF8u32.to_le_bytes());
            data[fat + 4..fat + 8].copy_from_slice(&0x0FFF_FFFFu32.to_le_bytes());
            let root = fat + self.root_cluster as usize * 4;
            data[root..root + 4].copy_from_slice(&0x0FFF_FFFFu32.to_le_bytes());
        }

        MemoryBlockDevice::new(data)
    }

    /// FAT entry `cluster` of FAT copy `copy` in a built image
    pub fn fat_entry(&self, data: &[u8], copy: u32, cluster: u32) -> u32 {
        let at = self.fat_offset(copy) + cluster as usize * 4;
        u32::from_le_bytes([data[at], data[at + 1], data[at + 2], data[at + 3]])
    }

    /// Raw 32-byte directory slot `index` of `cluster`
    pub fn dir_slot<'a>(&self, data: &'a [u8], cluster: u32, index: usize) -> &'a [u8] {
        let at = self.cluster_offset(cluster) + index * 32;
        &data[at..at + 32]
    }
}
