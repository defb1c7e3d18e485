// Directory entry placement
//
// Each parent directory has a cursor: the cluster currently being filled and
// the byte offset of the next free slot in it. Entries are appended strictly
// in order; when a cluster is full a fresh zeroed cluster is chained onto the
// directory and the cursor moves to its start.

use crate::disk::ImageIo;
use crate::entry::{DirectoryEntry, ENTRY_SIZE};
use crate::error::Result;
use crate::fat::ClusterAllocator;
use crate::geometry::DIR_ENTRY_SIZE;
use alloc::collections::BTreeMap;
use alloc::vec;
use gpt_disk_io::BlockIo;

/// Write position inside one directory
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DirCursor {
    pub cluster: u32,
    /// Byte offset of the next free slot within `cluster`
    pub offset: u32,
}

#[derive(Debug, Default)]
pub struct DirectoryWriter {
    cursors: BTreeMap<u64, DirCursor>,
    first_clusters: BTreeMap<u64, u32>,
    root: Option<u64>,
    /// Clusters taken by `append_entry` itself (overflow and detached)
    added: u32,
}

impl DirectoryWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn cursor(&self, id: u64) -> Option<DirCursor> {
        self.cursors.get(&id).copied()
    }

    pub fn first_cluster(&self, id: u64) -> Option<u32> {
        self.first_clusters.get(&id).copied()
    }

    /// Number of directories with a cursor
    pub fn len(&self) -> usize {
        self.cursors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cursors.is_empty()
    }

    /// Clusters allocated for directory growth and untracked parents
    pub fn clusters_added(&self) -> u32 {
        self.added
    }

    /// Track the existing directory `id` starting at `first_cluster`.
    ///
    /// The chain is followed to the first slot whose name byte is 0, so
    /// entries already present (a volume label, files from an earlier run)
    /// are kept. `id` becomes the root for `..` purposes.
    pub fn resume<B: BlockIo>(
        &mut self,
        disk: &mut ImageIo<B>,
        fat: &ClusterAllocator,
        id: u64,
        first_cluster: u32,
    ) -> Result<DirCursor> {
        let geometry = fat.geometry();
        let bpc = geometry.bytes_per_cluster;
        let chain = fat.chain(disk, first_cluster)?;
        let mut data = vec![0u8; bpc as usize];

        let mut cursor = None;
        for &cluster in &chain {
            disk.read_at(geometry.cluster_offset(cluster)?, &mut data)?;
            let free_slot = data.chunks_exact(ENTRY_SIZE).position(|slot| slot[0] == 0x00);
            if let Some(slot) = free_slot {
                cursor = Some(DirCursor {
                    cluster,
                    offset: slot as u32 * DIR_ENTRY_SIZE,
                });
                break;
            }
        }

        // Every slot used: the next append chains a new cluster
        let cursor = cursor.unwrap_or(DirCursor {
            cluster: *chain.last().unwrap_or(&first_cluster),
            offset: bpc,
        });

        log::debug!(
            "directory {} resumed at cluster {} offset {} ({} clusters)",
            id,
            cursor.cluster,
            cursor.offset,
            chain.len()
        );

        self.cursors.insert(id, cursor);
        self.first_clusters.insert(id, first_cluster);
        self.root = Some(id);
        Ok(cursor)
    }

    /// Start a cursor for the newly created directory described by `entry`.
    ///
    /// With `dot_entries` the `.` and `..` entries take the first two slots;
    /// `..` points at `parent_id`'s first cluster, or 0 for the root.
    pub fn register<B: BlockIo>(
        &mut self,
        disk: &mut ImageIo<B>,
        fat: &ClusterAllocator,
        id: u64,
        parent_id: u64,
        entry: &DirectoryEntry,
        dot_entries: bool,
    ) -> Result<DirCursor> {
        let cluster = entry.first_cluster;
        let mut cursor = DirCursor { cluster, offset: 0 };

        if dot_entries {
            let parent_cluster = match self.root {
                Some(root) if root == parent_id => 0,
                _ => self.first_cluster(parent_id).unwrap_or(0),
            };
            let mut slots = [0u8; 2 * ENTRY_SIZE];
            slots[..ENTRY_SIZE].copy_from_slice(&entry.dot(cluster).to_bytes());
            slots[ENTRY_SIZE..].copy_from_slice(&entry.dot_dot(parent_cluster).to_bytes());
            disk.write_at(fat.geometry().cluster_offset(cluster)?, &slots)?;
            cursor.offset = 2 * DIR_ENTRY_SIZE;
        }

        self.cursors.insert(id, cursor);
        self.first_clusters.insert(id, cluster);
        Ok(cursor)
    }

    /// Append `entry` to the directory `parent`.
    pub fn append_entry<B: BlockIo>(
        &mut self,
        disk: &mut ImageIo<B>,
        fat: &ClusterAllocator,
        parent: u64,
        entry: &DirectoryEntry,
    ) -> Result<DirCursor> {
        let geometry = fat.geometry();

        let mut cursor = match self.cursors.get(&parent) {
            Some(cursor) => *cursor,
            None => {
                let cluster = fat.allocate_and_zero(disk)?;
                log::warn!(
                    "parent {} has no directory yet, entries go to detached cluster {}",
                    parent,
                    cluster
                );
                let cursor = DirCursor { cluster, offset: 0 };
                self.cursors.insert(parent, cursor);
                self.first_clusters.insert(parent, cluster);
                self.added += 1;
                cursor
            }
        };

        if cursor.offset + DIR_ENTRY_SIZE > geometry.bytes_per_cluster {
            let next = fat.allocate_and_zero(disk)?;
            if let Err(err) = fat.link(disk, cursor.cluster, next) {
                fat.release(disk, next);
                return Err(err);
            }
            self.added += 1;
            log::debug!("directory {} extended: {} -> {}", parent, cursor.cluster, next);
            cursor = DirCursor {
                cluster: next,
                offset: 0,
            };
            self.cursors.insert(parent, cursor);
        }

        let offset = geometry.cluster_offset(cursor.cluster)? + cursor.offset as u64;
        disk.write_at(offset, &entry.to_bytes())?;

        let written = cursor;
        cursor.offset += DIR_ENTRY_SIZE;
        self.cursors.insert(parent, cursor);
        Ok(written)
    }
}
