//! # loadertxt - Text files as SQLite tables
//!
//! Exposes a line-oriented text file to SQLite as a read-only virtual table
//! with a single `line TEXT` column. The file is read lazily, one line per row,
//! and never held in memory as a whole.
//!
//! loadertxt provides:
//! - A cursor-based scan engine over text files (`source`)
//! - The `loaderTXT` SQLite module and the `length_function` scalar (`extension`)
//! - A session wrapper for attaching files and running queries
//! - TOML configuration and a small CLI

pub mod source;
pub mod extension;
pub mod config;
pub mod output;
pub mod ui;

// Re-exports for convenient access
pub use source::{CursorState, LineSource, RowSource, TableDescriptor};
pub use extension::{register, Session};

/// Result type alias for loadertxt operations
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for loadertxt operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Missing/empty filename, bad table name, or a column outside the schema
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// The source file could not be opened at scan start
    #[error("Cannot open file {path}: {source}")]
    ResourceUnavailable {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// The stream failed after it was successfully opened
    #[error("Read error on {path}: {source}")]
    Stream {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Out of memory: {0}")]
    OutOfMemory(String),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}
