use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Failed to download data from {0} due to a connection error")]
    NetworkRequest(String, #[source] reqwest::Error),

    #[error("HTTP request failed for {url} with status {status}")]
    HttpStatus {
        url: String,
        status: reqwest::StatusCode,
        #[source]
        source: reqwest::Error,
    },

    #[error("Failed to create download directory '{0}'")]
    DownloadDirCreation(PathBuf, #[source] std::io::Error),

    // Covers both the response body stream and the file write
    #[error("Failed to save downloaded data to '{0}'")]
    DownloadIo(PathBuf, #[source] std::io::Error),
}
