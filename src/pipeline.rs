//! Sequencing of the extract, transform and load stages.

use crate::config::settings::Settings;
use crate::config::source::SourceInfo;
use crate::error::EtlError;
use crate::extract::extractor::DataExtractor;
use crate::load::loader::DataLoader;
use crate::transform::transformer::DataTransformer;
use bon::bon;
use log::info;
use std::path::PathBuf;

/// Counts reported by a finished run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    pub files_extracted: usize,
    /// Names of the tables written, in source order.
    pub tables: Vec<String>,
    pub rows_loaded: usize,
}

/// One complete ETL run: download every configured source, reshape the
/// files into one table per source and replace those tables in SQLite.
///
/// Stages run strictly one after another and the first error ends the run.
/// Downloaded files are deleted during the transform stage, so every run
/// starts from a fresh extraction.
///
/// # Examples
///
/// ```rust,no_run
/// # use bike_weather_etl::{DataExtractor, DataLoader, DataTransformer, EtlError, Pipeline};
/// # use std::path::Path;
/// # async fn run() -> Result<(), EtlError> {
/// let download_dir = Path::new("/tmp/etl");
/// let pipeline = Pipeline::builder()
///     .source_info_path("config/source_info.json")
///     .extractor(DataExtractor::new(download_dir))
///     .transformer(DataTransformer::new(download_dir))
///     .loader(DataLoader::new(Path::new("/tmp/etl/bike_weather.sqlite")))
///     .build();
/// let summary = pipeline.run().await?;
/// println!("{} rows loaded", summary.rows_loaded);
/// # Ok(())
/// # }
/// ```
pub struct Pipeline {
    source_info_path: PathBuf,
    extractor: DataExtractor,
    transformer: DataTransformer,
    loader: DataLoader,
}

#[bon]
impl Pipeline {
    /// Builds a pipeline from separately configured stages.
    #[builder]
    pub fn new(
        #[builder(into)] source_info_path: PathBuf,
        extractor: DataExtractor,
        transformer: DataTransformer,
        loader: DataLoader,
    ) -> Self {
        Self {
            source_info_path,
            extractor,
            transformer,
            loader,
        }
    }

    /// Stages reading and writing the locations in `settings`.
    pub fn from_settings(settings: &Settings) -> Self {
        Self::builder()
            .source_info_path(settings.source_info_path.clone())
            .extractor(DataExtractor::new(&settings.download_dir))
            .transformer(DataTransformer::new(&settings.download_dir))
            .loader(DataLoader::new(&settings.db_path))
            .build()
    }

    /// Runs extract, transform and load.
    ///
    /// # Errors
    ///
    /// Returns [`EtlError::NothingExtracted`] when no file was downloaded at all,
    /// otherwise the error of the stage that failed.
    pub async fn run(&self) -> Result<RunSummary, EtlError> {
        let source_info = SourceInfo::load(&self.source_info_path).await?;

        info!("Extract: data extraction from the source initiated");
        let extracted = self.extractor.extract(&source_info).await?;
        info!("Extract: data extraction from the source ended");
        if extracted.is_empty() {
            return Err(EtlError::NothingExtracted);
        }
        let files_extracted = extracted.file_count();

        info!("Transform: data transformation initiated");
        let transformed = self.transformer.transform(extracted).await?;
        info!("Transform: data transformation ended");

        info!("Load: data loading into the database initiated");
        let rows_loaded = self.loader.load(&transformed).await?;
        info!(
            "Load: data loading into the database ended ({})",
            self.loader.db_path().display()
        );

        Ok(RunSummary {
            files_extracted,
            tables: transformed
                .tables()
                .iter()
                .map(|t| t.table_name.clone())
                .collect(),
            rows_loaded,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::error::ConfigError;
    use crate::extract::downloader::Downloader;
    use tempfile::TempDir;

    fn pipeline_in(dir: &TempDir, source_info_path: PathBuf) -> Pipeline {
        let download_dir = dir.path().join("raw");
        Pipeline::builder()
            .source_info_path(source_info_path)
            .extractor(DataExtractor::new(&download_dir))
            .transformer(DataTransformer::new(&download_dir))
            .loader(DataLoader::new(&dir.path().join("out.sqlite")))
            .build()
    }

    #[tokio::test]
    async fn test_missing_config_fails() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let pipeline = pipeline_in(&dir, dir.path().join("absent.json"));

        let result = pipeline.run().await;
        assert!(matches!(
            result,
            Err(EtlError::Config(ConfigError::FileNotFound(_)))
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_empty_extraction_stops_before_transform() -> Result<(), Box<dyn std::error::Error>>
    {
        let dir = TempDir::new()?;
        let config = dir.path().join("sources.json");
        std::fs::write(
            &config,
            r#"{"data_sources": [{"source_name": "Mobilithek", "data_urls": []}]}"#,
        )?;
        let pipeline = pipeline_in(&dir, config);

        let result = pipeline.run().await;
        assert!(matches!(result, Err(EtlError::NothingExtracted)));
        assert!(!dir.path().join("out.sqlite").exists());
        Ok(())
    }

    #[test]
    fn test_from_settings() {
        let settings = Settings::builder().download_dir("/tmp/raw").build();
        let pipeline = Pipeline::from_settings(&settings);
        assert_eq!(pipeline.source_info_path, settings.source_info_path);
        assert_eq!(pipeline.extractor.download_dir(), settings.download_dir.as_path());
        assert_eq!(pipeline.loader.db_path(), settings.db_path.as_path());
    }

    #[tokio::test]
    async fn test_runs_injected_stages() -> Result<(), Box<dyn std::error::Error>> {
        let dir = TempDir::new()?;
        let raw = dir.path().join("raw");
        let mut csv = String::from("Monat;Deutz\n");
        for month in [
            "Januar", "Februar", "März", "April", "Mai", "Juni", "Juli", "August",
            "September", "Oktober", "November", "Dezember",
        ] {
            csv.push_str(&format!("{};1.5\n", month));
        }
        let body = csv.into_bytes();

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await?;
        let address = listener.local_addr()?;
        tokio::spawn(async move {
            use tokio::io::{AsyncReadExt, AsyncWriteExt};
            while let Ok((mut socket, _)) = listener.accept().await {
                let mut buf = vec![0u8; 4096];
                let _ = socket.read(&mut buf).await;
                let mut response = format!(
                    "HTTP/1.1 200 OK\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                    body.len()
                )
                .into_bytes();
                response.extend_from_slice(&body);
                let _ = socket.write_all(&response).await;
                let _ = socket.shutdown().await;
            }
        });

        let config = dir.path().join("sources.json");
        std::fs::write(
            &config,
            format!(
                r#"{{"data_sources": [{{"source_name": "Mobilithek",
                    "data_urls": [{{"year": "2018", "url": "http://{}/2018.csv"}}]}}]}}"#,
                address
            ),
        )?;
        let client = reqwest::Client::builder().no_proxy().build()?;
        let db_path = dir.path().join("separate").join("etl.sqlite");
        let pipeline = Pipeline::builder()
            .source_info_path(config)
            .extractor(DataExtractor::with_downloader(&raw, Downloader::with_client(client)))
            .transformer(DataTransformer::new(&raw))
            .loader(DataLoader::new(&db_path))
            .build();

        let summary = pipeline.run().await?;

        assert_eq!(summary.files_extracted, 1);
        assert_eq!(summary.tables, vec!["mobilithek_bicycle_traffic"]);
        assert_eq!(summary.rows_loaded, 12);
        assert!(db_path.is_file());
        Ok(())
    }
}
