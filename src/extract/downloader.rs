use crate::extract::error::ExtractError;
use crate::utils::display_name;
use futures_util::TryStreamExt;
use log::{info, warn};
use reqwest::Client;
use std::io;
use std::path::Path;
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tokio_util::io::StreamReader;

/// Fetches single resources over HTTP and stores the raw bytes on disk.
#[derive(Debug, Clone, Default)]
pub struct Downloader {
    client: Client,
}

impl Downloader {
    pub fn new() -> Self {
        Self::with_client(Client::new())
    }

    pub fn with_client(client: Client) -> Self {
        Self { client }
    }

    /// Streams the body of `url` into `output_path` unchanged (gzip stays compressed).
    /// Returns the number of bytes written. A partially written file is removed on failure.
    pub async fn download(&self, url: &str, output_path: &Path) -> Result<u64, ExtractError> {
        info!("Downloading data from {}", url);

        let response = self
            .client
            .get(url)
            .send()
            .await
            .map_err(|e| ExtractError::NetworkRequest(url.to_string(), e))?;

        let response = match response.error_for_status() {
            Ok(resp) => resp,
            Err(e) => {
                warn!("HTTP error for {}: {:?}", url, e);
                return Err(if let Some(status) = e.status() {
                    ExtractError::HttpStatus {
                        url: url.to_string(),
                        status,
                        source: e,
                    }
                } else {
                    ExtractError::NetworkRequest(url.to_string(), e)
                });
            }
        };

        let stream = response.bytes_stream().map_err(io::Error::other);
        let mut reader = StreamReader::new(stream);

        let written = match Self::write_stream(&mut reader, output_path).await {
            Ok(written) => written,
            Err(e) => {
                // ignore the cleanup result, the write error is what matters
                let _ = fs::remove_file(output_path).await;
                return Err(ExtractError::DownloadIo(output_path.to_path_buf(), e));
            }
        };

        info!(
            "Data downloaded successfully ({} bytes) and saved as {}",
            written,
            display_name(output_path)
        );
        Ok(written)
    }

    async fn write_stream<R>(reader: &mut R, output_path: &Path) -> io::Result<u64>
    where
        R: tokio::io::AsyncRead + Unpin,
    {
        let mut file = fs::File::create(output_path).await?;
        let written = tokio::io::copy(reader, &mut file).await?;
        file.flush().await?;
        Ok(written)
    }
}
