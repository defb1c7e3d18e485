//! FAT32 Image Writer
//!
//! A `no_std` + `alloc` writer that materializes files and directories
//! directly into an already formatted FAT32 volume on a block device.
//!
//! # Overview
//!
//! Records describing files and directories come from an external source
//! filesystem reader (typically an NTFS walk). For each record the writer:
//! - Allocates clusters first-fit and keeps every FAT copy identical
//! - Builds the 32-byte short (8.3) directory entry
//! - Appends the entry to its parent directory, chaining clusters as needed
//! - Streams file content cluster by cluster
//!
//! # Architecture
//!
//! 1. **Disk layer** - byte-addressed reads and writes over `BlockIo`
//! 2. **Geometry layer** - boot sector parsing and region offsets
//! 3. **FAT layer** - cluster allocation and chain maintenance
//! 4. **Entry layer** - names, attributes and timestamps of one entry
//! 5. **Directory/data layer** - entry placement and content streaming
//!
//! # Usage
//!
//! ```ignore
//! use fatwrite::{FatWriter, SourceRecord, WriterConfig};
//!
//! let mut writer = FatWriter::open(block_io, partition_lba, WriterConfig::default())?;
//! writer.add_record(&SourceRecord::directory(40, 5, "DOCS"))?;
//! writer.write_file(&SourceRecord::file(41, 40, "NOTES.TXT", 5), b"hello")?;
//! writer.flush()?;
//! ```

#![cfg_attr(not(test), no_std)]

extern crate alloc;

pub mod config;
pub mod data;
pub mod directory;
pub mod disk;
pub mod entry;
pub mod error;
pub mod fat;
pub mod geometry;
pub mod logger;
pub mod record;
pub mod writer;

#[cfg(test)]
mod test_image;

pub use config::WriterConfig;
pub use data::{DataState, DataWriter};
pub use directory::{DirCursor, DirectoryWriter};
pub use disk::ImageIo;
pub use entry::{Attributes, DirectoryEntry};
pub use error::{FatWriteError, Result};
pub use fat::ClusterAllocator;
pub use geometry::Geometry;
pub use record::{FileFlags, SourceRecord};
pub use writer::{ConversionStats, FatWriter, RecordSource, SourceItem};
