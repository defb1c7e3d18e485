// Small hand-formatted FAT32 images for unit tests

use alloc::vec;
use alloc::vec::Vec;

#[derive(Debug, Clone, Copy)]
pub struct ImageLayout {
    pub bytes_per_sector: u16,
    pub sectors_per_cluster: u8,
    pub reserved_sectors: u16,
    pub fat_copies: u8,
    pub fat_size: u32,
    pub total_sectors: u32,
    pub root_cluster: u32,
}

impl Default for ImageLayout {
    // 100 one-sector clusters, two single-sector FATs
    fn default() -> Self {
        Self {
            bytes_per_sector: 512,
            sectors_per_cluster: 1,
            reserved_sectors: 32,
            fat_copies: 2,
            fat_size: 1,
            total_sectors: 32 + 2 + 100,
            root_cluster: 2,
        }
    }
}

pub fn boot_sector(layout: &ImageLayout) -> [u8; 512] {
    let mut sector = [0u8; 512];
    sector[0..3].copy_from_slice(&[0xEB, 0x58, 0x90]);
    sector[3..11].copy_from_slice(b"MORPHEUS");
    sector[0x0B..0x0D].copy_from_slice(&layout.bytes_per_sector.to_le_bytes());
    sector[0x0D] = layout.sectors_per_cluster;
    sector[0x0E..0x10].copy_from_slice(&layout.reserved_sectors.to_le_bytes());
    sector[0x10] = layout.fat_copies;
    sector[0x15] = 0xF8;
    sector[0x20..0x24].copy_from_slice(&layout.total_sectors.to_le_bytes());
    sector[0x24..0x28].copy_from_slice(&layout.fat_size.to_le_bytes());
    sector[0x2C..0x30].copy_from_slice(&layout.root_cluster.to_le_bytes());
    sector[0x52..0x5A].copy_from_slice(b"FAT32   ");
    sector[510] = 0x55;
    sector[511] = 0xAA;
    sector
}

/// Formatted image: boot sector, reserved FAT entries and an empty root.
pub fn format(layout: &ImageLayout) -> Vec<u8> {
    let bps = layout.bytes_per_sector as usize;
    let mut image = vec![0u8; layout.total_sectors as usize * bps];
    image[..512].copy_from_slice(&boot_sector(layout));

    for copy in 0..layout.fat_copies as usize {
        let fat = (layout.reserved_sectors as usize + copy * layout.fat_size as usize) * bps;
        image[fat..fat + 4].copy_from_slice(&0x0FFF_FFF8u32.to_le_bytes());
        image[fat + 4..fat + 8].copy_from_slice(&0x0FFF_FFFFu32.to_le_bytes());
        let root = fat + layout.root_cluster as usize * 4;
        image[root..root + 4].copy_from_slice(&0x0FFF_FFFFu32.to_le_bytes());
    }

    image
}

pub fn fat_entry(image: &[u8], layout: &ImageLayout, copy: usize, cluster: u32) -> u32 {
    let bps = layout.bytes_per_sector as usize;
    let at = (layout.reserved_sectors as usize + copy * layout.fat_size as usize) * bps + cluster as usize * 4;
    u32::from_le_bytes([image[at], image[at + 1], image[at + 2], image[at + 3]])
}
