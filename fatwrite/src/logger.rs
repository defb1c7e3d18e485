// In-memory logging sink for conversion runs
//
// The writer logs through the `log` facade. Hosts without a console can
// install `RingLogger` and inspect the most recent messages afterwards.

use alloc::collections::VecDeque;
use alloc::format;
use alloc::string::String;
use alloc::vec::Vec;
use log::{LevelFilter, Log, Metadata, Record};

pub const MAX_LOG_ENTRIES: usize = 64;

/// Bounded log buffer. Oldest entries are dropped once full.
pub struct RingLogger {
    entries: spin::Mutex<VecDeque<String>>,
    capacity: usize,
}

static LOGGER: RingLogger = RingLogger::new(MAX_LOG_ENTRIES);

impl RingLogger {
    pub const fn new(capacity: usize) -> Self {
        Self {
            entries: spin::Mutex::new(VecDeque::new()),
            capacity,
        }
    }

    pub fn entries(&self) -> Vec<String> {
        self.entries.lock().iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        self.entries.lock().clear();
    }
}

impl Log for RingLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= log::max_level()
    }

    fn log(&self, record: &Record) {
        if self.capacity == 0 {
            return;
        }
        let line = format!("{:5} [{}] {}", record.level(), record.target(), record.args());
        let mut entries = self.entries.lock();
        if entries.len() == self.capacity {
            entries.pop_front();
        }
        entries.push_back(line);
    }

    fn flush(&self) {}
}

/// Install the global ring logger.
pub fn init(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    log::set_logger(&LOGGER)?;
    log::set_max_level(level);
    Ok(())
}

/// The global ring logger, whether or not it was installed.
pub fn global() -> &'static RingLogger {
    &LOGGER
}
