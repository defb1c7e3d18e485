//! Timestamp conversion
//!
//! Source timestamps are 64-bit counts of 100 ns ticks since 1601-01-01 UTC.
//! FAT stores a packed date (`day | month << 5 | (year - 1980) << 9`) and a
//! packed time (`second / 2 | minute << 5 | hour << 11`).

/// 100 ns ticks per second
pub const TICKS_PER_SECOND: u64 = 10_000_000;

const SECONDS_PER_DAY: u64 = 86_400;

/// Days between 1601-01-01 and 1970-01-01
const DAYS_1601_TO_1970: i64 = 134_774;

/// First year representable in a FAT date
pub const FAT_EPOCH_YEAR: i64 = 1980;

/// Broken-down UTC time
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTime {
    pub year: i64,
    /// Month (1-12)
    pub month: u8,
    /// Day (1-31)
    pub day: u8,
    /// Hour (0-23)
    pub hour: u8,
    /// Minute (0-59)
    pub minute: u8,
    /// Second (0-59)
    pub second: u8,
}

impl DateTime {
    pub fn from_ticks(ticks: u64) -> Self {
        let seconds = ticks / TICKS_PER_SECOND;
        let days = (seconds / SECONDS_PER_DAY) as i64;
        let in_day = seconds % SECONDS_PER_DAY;
        let (year, month, day) = civil_from_days(days - DAYS_1601_TO_1970);

        Self {
            year,
            month,
            day,
            hour: (in_day / 3600) as u8,
            minute: (in_day / 60 % 60) as u8,
            second: (in_day % 60) as u8,
        }
    }

    /// Year is stored as an offset from 1980, modulo 128.
    pub fn fat_date(&self) -> u16 {
        let year = (self.year - FAT_EPOCH_YEAR).rem_euclid(128) as u16;
        (self.day as u16 & 0x1F) | ((self.month as u16 & 0x0F) << 5) | (year << 9)
    }

    /// Seconds are stored halved; odd seconds round down.
    pub fn fat_time(&self) -> u16 {
        ((self.second as u16 / 2) & 0x1F) | ((self.minute as u16 & 0x3F) << 5) | ((self.hour as u16 & 0x1F) << 11)
    }

    pub fn from_fat(date: u16, time: u16) -> Self {
        Self {
            year: FAT_EPOCH_YEAR + (date >> 9) as i64,
            month: ((date >> 5) & 0x0F) as u8,
            day: (date & 0x1F) as u8,
            hour: (time >> 11) as u8,
            minute: ((time >> 5) & 0x3F) as u8,
            second: ((time & 0x1F) * 2) as u8,
        }
    }
}

// Proleptic Gregorian date for a day count relative to 1970-01-01
fn civil_from_days(days: i64) -> (i64, u8, u8) {
    let z = days + 719_468;
    let era = (if z >= 0 { z } else { z - 146_096 }) / 146_097;
    let doe = z - era * 146_097;
    let yoe = (doe - doe / 1_460 + doe / 36_524 - doe / 146_096) / 365;
    let doy = doe - (365 * yoe + yoe / 4 - yoe / 100);
    let mp = (5 * doy + 2) / 153;
    let day = (doy - (153 * mp + 2) / 5 + 1) as u8;
    let month = (if mp < 10 { mp + 3 } else { mp - 9 }) as u8;
    let year = yoe + era * 400 + i64::from(month <= 2);
    (year, month, day)
}
