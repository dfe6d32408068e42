// src/error.rs

//! Unified error handling for the archiver.

use std::fmt;

use thiserror::Error;

/// Result type alias for archiver operations.
pub type Result<T> = std::result::Result<T, AppError>;

/// Unified application error type.
#[derive(Error, Debug)]
pub enum AppError {
    /// Declarative input is missing a field or has the wrong shape
    #[error("Configuration error: {0}")]
    Config(String),

    /// The public archive service could not save a URL after every attempt
    #[error("Failed to save {url} to the wayback machine after {attempts} attempts: [{}]", errors.join("; "))]
    Archive {
        url: String,
        attempts: u32,
        errors: Vec<String>,
    },

    /// Archive results do not line up with the URLs they were collected for
    #[error("Expected {expected} archive URLs for {collection}, got {found}")]
    ArchiveResultsMismatch {
        collection: String,
        expected: usize,
        found: usize,
    },

    /// The URL itself is not something the public archive can save
    #[error("Invalid URL '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    /// The video downloader failed for a URL
    #[error("Download error for {url}: {message}")]
    Download { url: String, message: String },

    /// An external tool could not be started
    #[error("Failed to run '{program}': {message}")]
    Process { program: String, message: String },

    /// An external tool exited with a code outside its allow-list
    #[error("'{program}' exited with {}, acceptable exit codes are {acceptable:?}", display_code(*code))]
    UnacceptableExitCode {
        program: String,
        code: Option<i32>,
        acceptable: Vec<i32>,
    },

    /// I/O operation failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// HTTP request failed
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// TOML parsing failed
    #[error("TOML parse error: {0}")]
    Toml(#[from] toml::de::Error),
}

fn display_code(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl AppError {
    /// Create a configuration error.
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create an invalid URL error.
    pub fn invalid_url(url: impl Into<String>, reason: impl fmt::Display) -> Self {
        Self::InvalidUrl {
            url: url.into(),
            reason: reason.to_string(),
        }
    }

    /// Create a download error with context.
    pub fn download(url: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Download {
            url: url.into(),
            message: message.to_string(),
        }
    }

    /// Create a process start error.
    pub fn process(program: impl Into<String>, message: impl fmt::Display) -> Self {
        Self::Process {
            program: program.into(),
            message: message.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_error_lists_every_attempt() {
        let err = AppError::Archive {
            url: "https://example.com".into(),
            attempts: 2,
            errors: vec!["timed out".into(), "HTTP 503".into()],
        };
        let message = err.to_string();
        assert!(message.contains("after 2 attempts"));
        assert!(message.contains("timed out; HTTP 503"));
    }

    #[test]
    fn exit_code_error_without_code() {
        let err = AppError::UnacceptableExitCode {
            program: "wpull".into(),
            code: None,
            acceptable: vec![0, 4, 8],
        };
        assert!(err.to_string().contains("terminated by signal"));
    }
}
