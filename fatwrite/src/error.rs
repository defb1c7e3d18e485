//! Error types for FAT32 write operations

use core::fmt;

/// Result type for FAT32 write operations
pub type Result<T> = core::result::Result<T, FatWriteError>;

/// Errors that can occur while writing into a FAT32 image
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FatWriteError {
    /// Block read, write or flush failed on the image
    DiskIo,

    /// FAT scan found no free cluster
    OutOfSpace,

    /// Boot sector describes an unusable or non-FAT32 layout
    InvalidGeometry,

    /// Record name does not fit 8.3, or its size is negative
    MalformedRecord,

    /// Cluster number is reserved (0/1) or past the end of the volume
    InvalidCluster,

    /// Cluster chain loops or links outside the volume
    CorruptChain,

    /// Data chunk larger than a cluster, or written after the file completed
    InvalidChunk,

    /// The record source failed to produce a record or its content
    SourceRead,
}

impl FatWriteError {
    /// Get a human-readable description of the error
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::DiskIo => "Disk image I/O failed",
            Self::OutOfSpace => "No free cluster left on volume",
            Self::InvalidGeometry => "Invalid FAT32 geometry",
            Self::MalformedRecord => "Malformed file record",
            Self::InvalidCluster => "Cluster number out of range",
            Self::CorruptChain => "Corrupt cluster chain",
            Self::InvalidChunk => "Invalid data chunk",
            Self::SourceRead => "Source filesystem read failed",
        }
    }
}

impl fmt::Display for FatWriteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
