//! 8.3 short names from UTF-16 source names
//!
//! Only the low byte of each UTF-16 unit is kept. Files must be named
//! `BASE.EXT` with exactly one dot and a three character extension; the base
//! is cut to 8 characters. Directories keep their first 8 characters and get
//! no extension.

use crate::error::{FatWriteError, Result};

pub const NAME_LEN: usize = 8;
pub const EXT_LEN: usize = 3;

const DOT: u16 = b'.' as u16;
const DELETED_MARKER: u8 = 0xE5;
// Stored in place of a leading 0xE5 byte
const DELETED_ESCAPE: u8 = 0x05;

/// Space padded 8.3 name as stored on disk
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ShortName {
    pub name: [u8; NAME_LEN],
    pub ext: [u8; EXT_LEN],
}

impl ShortName {
    /// Base name without padding
    pub fn base(&self) -> &[u8] {
        trim_padding(&self.name)
    }

    /// Extension without padding
    pub fn extension(&self) -> &[u8] {
        trim_padding(&self.ext)
    }
}

fn trim_padding(bytes: &[u8]) -> &[u8] {
    let end = bytes.iter().rposition(|&b| b != b' ').map_or(0, |i| i + 1);
    &bytes[..end]
}

fn low_byte(unit: u16) -> Result<u8> {
    match (unit & 0xFF) as u8 {
        0 => Err(FatWriteError::MalformedRecord),
        byte => Ok(byte),
    }
}

fn fill(dst: &mut [u8], units: &[u16]) -> Result<()> {
    for (slot, &unit) in dst.iter_mut().zip(units) {
        *slot = low_byte(unit)?;
    }
    if dst[0] == DELETED_MARKER {
        dst[0] = DELETED_ESCAPE;
    }
    Ok(())
}

pub fn directory_name(units: &[u16]) -> Result<ShortName> {
    if units.is_empty() {
        return Err(FatWriteError::MalformedRecord);
    }
    let mut short = ShortName {
        name: [b' '; NAME_LEN],
        ext: [b' '; EXT_LEN],
    };
    fill(&mut short.name, units)?;
    Ok(short)
}

pub fn file_name(units: &[u16]) -> Result<ShortName> {
    let dot = match units.iter().position(|&u| u == DOT) {
        Some(dot) => dot,
        None => return Err(FatWriteError::MalformedRecord),
    };
    let single_dot = units[dot + 1..].iter().all(|&u| u != DOT);
    if dot == 0 || !single_dot || units.len() - dot - 1 != EXT_LEN {
        return Err(FatWriteError::MalformedRecord);
    }

    let mut short = ShortName {
        name: [b' '; NAME_LEN],
        ext: [b' '; EXT_LEN],
    };
    fill(&mut short.name, &units[..dot])?;
    fill(&mut short.ext, &units[units.len() - EXT_LEN..])?;
    Ok(short)
}
