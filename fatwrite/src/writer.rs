//! Image writer facade and conversion driver
//!
//! [`FatWriter`] owns the image handle together with the allocator and the
//! directory cursors, so callers only deal in source records:
//!
//! ```ignore
//! let mut writer = FatWriter::open(block_io, partition_lba, WriterConfig::default())?;
//! writer.add_record(&SourceRecord::directory(40, 5, "DOCS"))?;
//! writer.write_file(&SourceRecord::file(41, 40, "NOTES.TXT", 5), b"hello")?;
//! writer.flush()?;
//! ```
//!
//! [`FatWriter::convert`] drives a whole run from a [`RecordSource`].

use crate::config::WriterConfig;
use crate::data::DataWriter;
use crate::directory::DirectoryWriter;
use crate::disk::ImageIo;
use crate::entry::DirectoryEntry;
use crate::error::{FatWriteError, Result};
use crate::fat::ClusterAllocator;
use crate::geometry::Geometry;
use crate::record::SourceRecord;
use alloc::vec;
use core::fmt::Debug;
use gpt_disk_io::BlockIo;

/// One item produced by a source filesystem walk
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SourceItem {
    Directory(SourceRecord),
    File(SourceRecord),
}

impl SourceItem {
    pub fn record(&self) -> &SourceRecord {
        match self {
            Self::Directory(record) | Self::File(record) => record,
        }
    }
}

/// Reader of the source filesystem.
///
/// Items must arrive parent before child.
pub trait RecordSource {
    type Error: Debug;

    /// Next item of the walk, or `None` when done.
    fn next_item(&mut self) -> core::result::Result<Option<SourceItem>, Self::Error>;

    /// Read file content at `offset` into `buf`; returns bytes read, 0 at end.
    fn read_content(
        &mut self,
        record: &SourceRecord,
        offset: u64,
        buf: &mut [u8],
    ) -> core::result::Result<usize, Self::Error>;
}

/// Totals for a conversion run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ConversionStats {
    pub directories: u32,
    pub files: u32,
    pub bytes: u64,
    pub clusters: u32,
}

pub struct FatWriter<B: BlockIo> {
    disk: ImageIo<B>,
    fat: ClusterAllocator,
    directories: DirectoryWriter,
    config: WriterConfig,
}

impl<B: BlockIo> FatWriter<B> {
    /// Open the FAT32 volume starting at `partition_lba` on `block_io`.
    ///
    /// The root directory is tracked under `config.root_id` and resumes after
    /// any entries it already holds.
    pub fn open(block_io: B, partition_lba: u64, config: WriterConfig) -> Result<Self> {
        let mut disk = ImageIo::new(block_io, partition_lba);
        let geometry = Geometry::load(&mut disk)?;
        let fat = ClusterAllocator::new(geometry, config.scan_start);

        let mut directories = DirectoryWriter::new();
        directories.resume(&mut disk, &fat, config.root_id, geometry.root_cluster)?;

        log::info!(
            "FAT32 volume at LBA {}: {} clusters of {} bytes, root cluster {}",
            partition_lba,
            geometry.cluster_count,
            geometry.bytes_per_cluster,
            geometry.root_cluster
        );

        Ok(Self {
            disk,
            fat,
            directories,
            config,
        })
    }

    pub fn geometry(&self) -> &Geometry {
        self.fat.geometry()
    }

    pub fn allocator(&self) -> &ClusterAllocator {
        &self.fat
    }

    pub fn directories(&self) -> &DirectoryWriter {
        &self.directories
    }

    pub fn config(&self) -> &WriterConfig {
        &self.config
    }

    /// Create the entry for `record` in its parent directory.
    ///
    /// Files and directories both get a first cluster. Directories are
    /// registered so later records can use them as parent. If the entry
    /// cannot be placed, its cluster is freed again before the error returns.
    pub fn add_record(&mut self, record: &SourceRecord) -> Result<DirectoryEntry> {
        let entry = DirectoryEntry::build(record)?;
        let cluster = self.fat.allocate_and_zero(&mut self.disk)?;
        let entry = entry.with_first_cluster(cluster);

        if let Err(err) = self
            .directories
            .append_entry(&mut self.disk, &self.fat, record.parent_id, &entry)
        {
            self.fat.release(&mut self.disk, cluster);
            return Err(err);
        }

        if entry.is_directory() {
            self.directories.register(
                &mut self.disk,
                &self.fat,
                record.id,
                record.parent_id,
                &entry,
                self.config.dot_entries,
            )?;
        }

        log::debug!(
            "{} {} -> cluster {} (parent {})",
            if entry.is_directory() { "dir " } else { "file" },
            entry.display_name(),
            cluster,
            record.parent_id
        );
        Ok(entry)
    }

    /// Data writer for a file entry returned by [`add_record`](Self::add_record).
    pub fn open_data(&self, entry: &DirectoryEntry, size: i64) -> Result<DataWriter> {
        DataWriter::new(entry, size)
    }

    pub fn write_chunk(&mut self, data: &mut DataWriter, chunk: &[u8]) -> Result<()> {
        data.write_chunk(&mut self.disk, &self.fat, chunk)
    }

    pub fn finish_data(&mut self, data: &mut DataWriter) -> Result<()> {
        data.finish(&mut self.disk, &self.fat)
    }

    /// Add `record` and write `content` as its data.
    ///
    /// `content` must be exactly `record.size` bytes long.
    pub fn write_file(&mut self, record: &SourceRecord, content: &[u8]) -> Result<DirectoryEntry> {
        let entry = self.add_record(record)?;
        if entry.is_directory() {
            return Ok(entry);
        }

        let bpc = self.geometry().bytes_per_cluster as usize;
        let mut data = self.open_data(&entry, record.size)?;
        for chunk in content.chunks(bpc) {
            self.write_chunk(&mut data, chunk)?;
        }
        self.finish_data(&mut data)?;
        Ok(entry)
    }

    /// Write everything `source` yields, then flush the image.
    pub fn convert<S: RecordSource>(&mut self, source: &mut S) -> Result<ConversionStats> {
        let bpc = self.geometry().bytes_per_cluster as usize;
        let mut buf = vec![0u8; bpc];
        let mut stats = ConversionStats::default();
        let grown_before = self.directories.clusters_added();

        loop {
            let item = match source.next_item() {
                Ok(Some(item)) => item,
                Ok(None) => break,
                Err(err) => {
                    log::error!("source walk failed: {:?}", err);
                    return Err(FatWriteError::SourceRead);
                }
            };

            match item {
                SourceItem::Directory(record) => {
                    self.add_record(&record)?;
                    stats.directories += 1;
                    stats.clusters += 1;
                }
                SourceItem::File(record) => {
                    let entry = self.add_record(&record)?;
                    let mut data = self.open_data(&entry, record.size)?;
                    let mut offset = 0u64;

                    while !data.is_finished() {
                        let filled = fill_buffer(source, &record, offset, &mut buf)?;
                        if filled == 0 {
                            break;
                        }
                        self.write_chunk(&mut data, &buf[..filled])?;
                        offset += filled as u64;
                    }
                    self.finish_data(&mut data)?;

                    stats.files += 1;
                    stats.bytes += data.bytes_written();
                    stats.clusters += data.clusters_written().max(1);
                }
            }

            let done = stats.directories + stats.files;
            if done % 1000 == 0 {
                log::info!("{} records written", done);
            }
        }

        stats.clusters += self.directories.clusters_added() - grown_before;

        self.flush()?;
        log::info!(
            "conversion done: {} directories, {} files, {} bytes in {} clusters",
            stats.directories,
            stats.files,
            stats.bytes,
            stats.clusters
        );
        Ok(stats)
    }

    pub fn flush(&mut self) -> Result<()> {
        self.disk.flush()
    }

    pub fn into_inner(self) -> B {
        self.disk.into_inner()
    }
}

// Read until `buf` is full or the source reports end of content
fn fill_buffer<S: RecordSource>(
    source: &mut S,
    record: &SourceRecord,
    offset: u64,
    buf: &mut [u8],
) -> Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        let n = source
            .read_content(record, offset + filled as u64, &mut buf[filled..])
            .map_err(|err| {
                log::error!("reading content of record {} failed: {:?}", record.id, err);
                FatWriteError::SourceRead
            })?;
        if n == 0 {
            break;
        }
        filled += n;
    }
    Ok(filled)
}
