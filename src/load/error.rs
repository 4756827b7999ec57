use polars::error::PolarsError;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Failed to create the database directory '{0}'")]
    DirCreation(PathBuf, #[source] std::io::Error),

    #[error("Failed to open the database '{path}'")]
    Connect {
        path: PathBuf,
        #[source]
        source: sqlx::Error,
    },

    #[error("Database statement failed for table '{table}'")]
    Query {
        table: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("Value {value} in column '{column}' of table '{table}' does not fit a SQLite integer")]
    ValueOutOfRange {
        table: String,
        column: String,
        value: u64,
    },

    #[error("Failed reading row data of table '{table}'")]
    RowRead {
        table: String,
        #[source]
        source: PolarsError,
    },
}
