//! Writer configuration.

/// First cluster number that can hold data.
pub const FIRST_DATA_CLUSTER: u32 = 2;

/// MFT record number of the NTFS root directory.
pub const NTFS_ROOT_RECORD: u64 = 5;

/// Options for a conversion run.
#[derive(Debug, Clone)]
pub struct WriterConfig {
    /// Cluster index where every free-cluster scan starts.
    pub scan_start: u32,
    /// Parent id the source uses for the volume root.
    pub root_id: u64,
    /// Write `.` and `..` entries into newly created directories.
    pub dot_entries: bool,
}

impl Default for WriterConfig {
    fn default() -> Self {
        Self {
            scan_start: FIRST_DATA_CLUSTER,
            root_id: NTFS_ROOT_RECORD,
            dot_entries: true,
        }
    }
}

impl WriterConfig {
    /// Set the free-cluster scan start. Values below 2 are raised to 2.
    pub fn scan_from(mut self, cluster: u32) -> Self {
        self.scan_start = cluster.max(FIRST_DATA_CLUSTER);
        self
    }

    /// Set the parent id that maps to the root directory.
    pub fn root(mut self, id: u64) -> Self {
        self.root_id = id;
        self
    }

    /// Enable or disable `.`/`..` entries in new directories.
    pub fn with_dot_entries(mut self, enabled: bool) -> Self {
        self.dot_entries = enabled;
        self
    }
}
