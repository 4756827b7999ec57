//! First pipeline stage: download every configured resource.

use crate::config::source::{station_url, SourceConfig, SourceInfo, SourceKind};
use crate::extract::downloader::Downloader;
use crate::extract::error::ExtractError;
use crate::types::extracted::{
    ExtractedData, ExtractedFiles, ExtractedSource, StationFile, YearlyFile,
};
use crate::utils::ensure_dir_exists;
use std::path::{Path, PathBuf};

pub struct DataExtractor {
    download_dir: PathBuf,
    downloader: Downloader,
}

impl DataExtractor {
    pub fn new(download_dir: &Path) -> Self {
        Self::with_downloader(download_dir, Downloader::new())
    }

    pub fn with_downloader(download_dir: &Path, downloader: Downloader) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
            downloader,
        }
    }

    pub fn download_dir(&self) -> &Path {
        &self.download_dir
    }

    /// Downloads every file of every source, one after another.
    ///
    /// The first failing request aborts the extraction. Every configured source
    /// shows up in the result, also when it lists no files.
    pub async fn extract(&self, source_info: &SourceInfo) -> Result<ExtractedData, ExtractError> {
        ensure_dir_exists(&self.download_dir)
            .await
            .map_err(|e| ExtractError::DownloadDirCreation(self.download_dir.clone(), e))?;

        let mut extracted = ExtractedData::default();
        for source in &source_info.data_sources {
            let files = self.extract_source(source).await?;
            extracted.push(ExtractedSource {
                source_name: source.source_name.clone(),
                files,
            });
        }
        Ok(extracted)
    }

    async fn extract_source(&self, source: &SourceConfig) -> Result<ExtractedFiles, ExtractError> {
        match &source.kind {
            SourceKind::Yearly { data_urls } => {
                let mut files = Vec::with_capacity(data_urls.len());
                for entry in data_urls {
                    let file_name = source.yearly_file_name(entry.year);
                    self.fetch(&entry.url, &file_name).await?;
                    files.push(YearlyFile {
                        year: entry.year,
                        file_name,
                    });
                }
                Ok(ExtractedFiles::Yearly(files))
            }
            SourceKind::Stations {
                api_endpoint,
                stations,
            } => {
                let mut files = Vec::with_capacity(stations.len());
                for station in stations {
                    let file_name = source.station_file_name(station);
                    let url = station_url(api_endpoint, station);
                    self.fetch(&url, &file_name).await?;
                    files.push(StationFile {
                        station: station.clone(),
                        file_name,
                    });
                }
                Ok(ExtractedFiles::Stations(files))
            }
        }
    }

    /// Downloads `url` into the download directory.
    async fn fetch(&self, url: &str, file_name: &str) -> Result<(), ExtractError> {
        let path = self.download_dir.join(file_name);
        self.downloader.download(url, &path).await?;
        Ok(())
    }
}
