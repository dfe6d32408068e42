// src/logging.rs

//! Logger setup for the command line binary.
//!
//! The library only uses the `log` facade. The binary builds a
//! [`LoggingOptions`] from its arguments and hands it to [`init`].

use std::fs::{File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use env_logger::{Env, Target};

use crate::error::{AppError, Result};

/// How the binary should log.
#[derive(Debug, Clone, Default)]
pub struct LoggingOptions {
    /// Log at debug level instead of info
    pub verbose: bool,
    /// Also append every record to this file
    pub log_file: Option<PathBuf>,
}

impl LoggingOptions {
    /// Default filter, overridden by `RUST_LOG`.
    pub fn default_level(&self) -> &'static str {
        if self.verbose { "debug" } else { "info" }
    }
}

/// Writes every record to stdout and a log file.
struct TeeWriter {
    file: File,
}

impl Write for TeeWriter {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        io::stdout().write_all(buf)?;
        self.file.write_all(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        io::stdout().flush()?;
        self.file.flush()
    }
}

fn open_log_file(path: &Path) -> Result<File> {
    OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .map_err(|e| AppError::config(format!("cannot open log file {}: {e}", path.display())))
}

/// Install the global logger.
pub fn init(options: &LoggingOptions) -> Result<()> {
    let mut builder =
        env_logger::Builder::from_env(Env::default().default_filter_or(options.default_level()));
    builder.format_timestamp_secs();

    match &options.log_file {
        Some(path) => {
            let file = open_log_file(path)?;
            builder.target(Target::Pipe(Box::new(TeeWriter { file })));
        }
        None => {
            builder.target(Target::Stdout);
        }
    }

    builder
        .try_init()
        .map_err(|e| AppError::config(format!("logger already initialized: {e}")))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_default_level() {
        assert_eq!(LoggingOptions::default().default_level(), "info");
        let verbose = LoggingOptions {
            verbose: true,
            log_file: None,
        };
        assert_eq!(verbose.default_level(), "debug");
    }

    #[test]
    fn test_tee_writer_appends_to_file() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("run.log");
        std::fs::write(&path, "earlier\n").unwrap();

        let mut tee = TeeWriter {
            file: open_log_file(&path).unwrap(),
        };
        tee.write_all(b"later\n").unwrap();
        tee.flush().unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "earlier\nlater\n");
    }
}
