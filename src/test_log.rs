// src/test_log.rs

//! In-memory logger for asserting on log output in unit tests.
//!
//! Records are kept per thread, so tests running in parallel only see their
//! own output.

use std::sync::{Mutex, OnceLock};
use std::thread::{self, ThreadId};

use log::{Level, LevelFilter, Log, Metadata, Record};

struct CaptureLogger {
    records: Mutex<Vec<(ThreadId, Level, String)>>,
}

impl Log for CaptureLogger {
    fn enabled(&self, _metadata: &Metadata) -> bool {
        true
    }

    fn log(&self, record: &Record) {
        if let Ok(mut records) = self.records.lock() {
            records.push((thread::current().id(), record.level(), record.args().to_string()));
        }
    }

    fn flush(&self) {}
}

static LOGGER: OnceLock<&'static CaptureLogger> = OnceLock::new();

fn logger() -> &'static CaptureLogger {
    LOGGER.get_or_init(|| {
        let logger: &'static CaptureLogger = Box::leak(Box::new(CaptureLogger {
            records: Mutex::new(Vec::new()),
        }));
        if log::set_logger(logger).is_ok() {
            log::set_max_level(LevelFilter::Trace);
        }
        logger
    })
}

/// Start capturing for the current thread, dropping anything it logged before.
pub fn capture() {
    let id = thread::current().id();
    if let Ok(mut records) = logger().records.lock() {
        records.retain(|(thread, _, _)| *thread != id);
    }
}

/// Messages logged by the current thread at `level`.
pub fn messages(level: Level) -> Vec<String> {
    let id = thread::current().id();
    logger()
        .records
        .lock()
        .map(|records| {
            records
                .iter()
                .filter(|(thread, l, _)| *thread == id && *l == level)
                .map(|(_, _, message)| message.clone())
                .collect()
        })
        .unwrap_or_default()
}

/// True if the current thread logged a message containing `needle`.
pub fn contains(level: Level, needle: &str) -> bool {
    messages(level).iter().any(|m| m.contains(needle))
}
