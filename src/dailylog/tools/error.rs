use std::path::PathBuf;

use thiserror::Error;

/// Convenient alias for fallible results returned throughout the crate.
pub type Result<T> = std::result::Result<T, ToolError>;

/// Error type covering the different failure cases that can occur when the
/// journal is stored, searched, exported, or re-imported.
#[derive(Debug, Error)]
pub enum ToolError {
    /// Wrapper for IO failures such as reading or writing files.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Raised when the SQLite store rejects a statement or cannot be opened.
    #[error("storage error: {0}")]
    Storage(#[from] rusqlite::Error),

    /// Raised when JSON serialization of entries fails.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Errors bubbled up from the Excel writer implementation.
    #[error("Excel write error: {0}")]
    ExcelWrite(#[from] rust_xlsxwriter::XlsxError),

    /// Errors bubbled up from the Excel reader implementation.
    #[error("Excel read error: {0}")]
    ExcelRead(#[from] calamine::XlsxError),

    /// Raised when a sheet does not follow the expected conventions.
    #[error("invalid workbook structure: {0}")]
    InvalidWorkbook(String),

    /// Raised when no row in the scanned window looks like a header row.
    /// The store has not been modified when this is returned.
    #[error(
        "no recognizable header row in sheet '{sheet}' (scanned {scanned} rows, a row containing the date column is required)"
    )]
    HeaderNotFound { sheet: String, scanned: usize },

    /// Raised when the configuration file cannot be read or parsed.
    #[error("invalid configuration in {path}: {message}")]
    Config { path: PathBuf, message: String },

    /// Raised when a store write is given a key that is not a canonical
    /// `YYYY-MM-DD` date.
    #[error("invalid date key '{0}', expected YYYY-MM-DD")]
    InvalidDate(String),

    /// Raised when the user provides a path that does not exist.
    #[error("input file not found: {0}")]
    MissingInput(PathBuf),

    /// Raised when the tracing subscriber fails to initialise.
    #[error("failed to initialise logging: {0}")]
    Logging(String),
}
