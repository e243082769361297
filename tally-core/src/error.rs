use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Fatal problems detected before any row is processed.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("unknown institution '{key}' (expected one of: {expected})")]
    UnknownInstitution { key: String, expected: String },

    #[error("no normalization table configured for institution '{0}'")]
    MissingTable(String),

    #[error("input CSV not readable at {path}: {source}")]
    UnreadableInput {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("service account credentials not found at {0}")]
    MissingCredentials(PathBuf),

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// A single malformed input line. Recoverable: the line is skipped.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("line {line}: {message}")]
pub struct RowParseError {
    /// 1-based line number in the source file, when the reader knows it.
    pub line: u64,
    pub message: String,
}

/// Failure reported by a [`crate::Sink`]. Surfaced to the caller, never retried.
#[derive(Error, Debug)]
pub enum SinkError {
    #[error("authentication failed: {0}")]
    Auth(String),

    #[error("sheet titled '{0}' not found in spreadsheet")]
    SheetNotFound(String),

    #[error("sheet '{0}' has no header row")]
    EmptyHeader(String),

    #[error("request failed: {0}")]
    Http(String),

    #[error("remote store rejected the append ({status}): {body}")]
    Rejected { status: u16, body: String },
}
