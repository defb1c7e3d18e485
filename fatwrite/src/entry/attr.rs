//! Directory entry attribute byte

use crate::record::FileFlags;
use bitflags::bitflags;

bitflags! {
    /// FAT attribute bits (offset 11 of a directory entry)
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
    pub struct Attributes: u8 {
        const READ_ONLY = 0x01;
        const HIDDEN = 0x02;
        const SYSTEM = 0x04;
        const VOLUME_ID = 0x08;
        const DIRECTORY = 0x10;
        const ARCHIVE = 0x20;
    }
}

/// Source flag to attribute bit, one entry per carried attribute
pub const ATTRIBUTE_MAP: [(FileFlags, Attributes); 5] = [
    (FileFlags::READ_ONLY, Attributes::READ_ONLY),
    (FileFlags::HIDDEN, Attributes::HIDDEN),
    (FileFlags::SYSTEM, Attributes::SYSTEM),
    (FileFlags::ARCHIVE, Attributes::ARCHIVE),
    (FileFlags::DIRECTORY, Attributes::DIRECTORY),
];

impl From<FileFlags> for Attributes {
    fn from(flags: FileFlags) -> Self {
        ATTRIBUTE_MAP
            .iter()
            .filter(|(flag, _)| flags.contains(*flag))
            .fold(Attributes::empty(), |acc, (_, attr)| acc | *attr)
    }
}
