use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TransformError {
    #[error("File not found: '{0}'")]
    FileNotFound(PathBuf),

    #[error("Failed reading the file '{0}'")]
    FileRead(PathBuf, #[source] std::io::Error),

    #[error("Failed to decompress gzip data in '{0}'")]
    Decompress(PathBuf, #[source] std::io::Error),

    #[error("File '{0}' is not valid UTF-8")]
    InvalidUtf8(PathBuf, #[source] std::str::Utf8Error),

    // Errors during CSV reading (inside blocking task)
    #[error("Parsing error processing CSV data in '{file}'")]
    CsvRead {
        file: String,
        #[source]
        source: PolarsError,
    },

    #[error("CSV column count ({found}) does not match schema length ({expected}) in '{file}'")]
    SchemaMismatch {
        file: String,
        expected: usize,
        found: usize,
    },

    #[error("Expected 12 distinct month rows in '{file}', found {found}")]
    MonthRowCount { file: String, found: usize },

    #[error("Invalid year/month ({year:?}, {month:?}) in '{file}'")]
    InvalidMonth {
        file: String,
        year: Option<i64>,
        month: Option<i64>,
    },

    #[error("File '{0}' contains no columns")]
    EmptyTable(String),

    #[error("Polars operation failed for '{file}': {source}")]
    PolarsError {
        file: String,
        #[source]
        source: PolarsError,
    },

    #[error("Failed merging tables of source '{source_name}': {source}")]
    Merge {
        source_name: String,
        #[source]
        source: PolarsError,
    },

    #[error("Issue occurred while deleting the file '{0}'")]
    FileDeletion(PathBuf, #[source] std::io::Error),

    #[error("Background task failed to complete")]
    TaskJoin(#[from] tokio::task::JoinError),
}
