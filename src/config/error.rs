use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Source configuration file '{0}' not found")]
    FileNotFound(PathBuf),

    #[error("Failed to read source configuration file '{0}'")]
    Read(PathBuf, #[source] std::io::Error),

    #[error("Failed to decode JSON data in file '{0}'")]
    JsonParse(PathBuf, #[source] serde_json::Error),

    #[error("Source '{source_name}' has an api_endpoint without a '{{station}}' placeholder: {endpoint}")]
    MissingStationPlaceholder {
        source_name: String,
        endpoint: String,
    },

    #[error("Data source at position {0} has an empty source_name")]
    EmptySourceName(usize),

    #[error("Data source '{0}' is configured more than once")]
    DuplicateSource(String),
}
