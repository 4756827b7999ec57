//! Second pipeline stage: turn the downloaded files into one table per source.

use crate::transform::error::TransformError;
use crate::transform::reader::{gunzip, parse_csv, read_file, TextEncoding};
use crate::transform::traffic::{
    merge_traffic_tables, reshape_traffic_file, TrafficLayout, TRAFFIC_CSV,
};
use crate::transform::weather::{merge_weather_tables, reshape_weather_file, WEATHER_CSV};
use crate::types::extracted::{
    ExtractedData, ExtractedFiles, ExtractedSource, TransformedData, TransformedTable,
};
use log::{info, warn};
use polars::frame::DataFrame;
use std::path::{Path, PathBuf};

pub struct DataTransformer {
    download_dir: PathBuf,
}

impl DataTransformer {
    pub fn new(download_dir: &Path) -> Self {
        Self {
            download_dir: download_dir.to_path_buf(),
        }
    }

    /// Reshapes and merges every extracted source.
    ///
    /// Each raw file is deleted once it has been reshaped. Sources without files
    /// produce no table.
    pub async fn transform(
        &self,
        extracted: ExtractedData,
    ) -> Result<TransformedData, TransformError> {
        let mut transformed = TransformedData::default();
        for source in extracted {
            if source.files.is_empty() {
                warn!(
                    "No files were extracted for source '{}', skipping it",
                    source.source_name
                );
                continue;
            }
            transformed.push(self.transform_source(source).await?);
        }
        Ok(transformed)
    }

    async fn transform_source(
        &self,
        source: ExtractedSource,
    ) -> Result<TransformedTable, TransformError> {
        let table_name = source.table_name();
        let frame = match &source.files {
            ExtractedFiles::Yearly(files) => {
                let mut tables = Vec::with_capacity(files.len());
                for file in files {
                    let path = self.download_dir.join(&file.file_name);
                    let layout = TrafficLayout::for_year(file.year);
                    let bytes = layout.encoding.to_utf8(read_file(&path).await?, &path)?;
                    let df = parse_csv(bytes, TRAFFIC_CSV, &path).await?;
                    let df = reshape_traffic_file(df, file.year, &file.file_name)?;
                    self.finish_file(&path, &df).await?;
                    tables.push(df);
                }
                merge_traffic_tables(tables, &source.source_name)?
            }
            ExtractedFiles::Stations(files) => {
                let mut tables = Vec::with_capacity(files.len());
                for file in files {
                    let path = self.download_dir.join(&file.file_name);
                    let raw = gunzip(&read_file(&path).await?, &path).await?;
                    let bytes = TextEncoding::Utf8.to_utf8(raw, &path)?;
                    let df = parse_csv(bytes, WEATHER_CSV, &path).await?;
                    let df = reshape_weather_file(df, &file.station.station_id, &file.file_name)?;
                    self.finish_file(&path, &df).await?;
                    tables.push(df);
                }
                merge_weather_tables(tables, &source.source_name)?
            }
        };

        info!(
            "Merged {} file(s) of '{}' into '{}' ({} rows, {} columns)",
            source.files.len(),
            source.source_name,
            table_name,
            frame.height(),
            frame.width()
        );
        Ok(TransformedTable {
            source_name: source.source_name,
            table_name,
            frame,
        })
    }

    /// Logs the reshaped file and removes the raw download.
    async fn finish_file(&self, path: &Path, df: &DataFrame) -> Result<(), TransformError> {
        info!(
            "'{}' is successfully transformed ({} rows)",
            path.display(),
            df.height()
        );
        tokio::fs::remove_file(path)
            .await
            .map_err(|e| TransformError::FileDeletion(path.to_path_buf(), e))?;
        info!("'{}' is deleted", path.display());
        Ok(())
    }
}
