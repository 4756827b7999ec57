//! The declarative list of data sources the pipeline downloads.
//!
//! The document has the shape
//!
//! ```json
//! {
//!   "data_sources": [
//!     { "source_name": "Mobilithek",
//!       "data_urls": [ { "year": "2009", "url": "https://..." } ] },
//!     { "source_name": "Meteostat",
//!       "api_endpoint": "https://bulk.meteostat.net/v2/monthly/{station}.csv.gz",
//!       "stations": [ { "station_id": "10513", "station_name": "Köln-Bonn Airport" } ] }
//!   ]
//! }
//! ```
//!
//! A source listing yearly URLs carries bicycle-traffic counts, a source with a
//! station endpoint carries monthly weather observations.

use crate::config::error::ConfigError;
use crate::types::dataset::DatasetKind;
use crate::types::month::Year;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::io;
use std::path::Path;

/// Placeholder replaced by the station id in a weather `api_endpoint`.
pub const STATION_PLACEHOLDER: &str = "{station}";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceInfo {
    pub data_sources: Vec<SourceConfig>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceConfig {
    pub source_name: String,
    #[serde(flatten)]
    pub kind: SourceKind,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum SourceKind {
    /// One bicycle-traffic file per year.
    Yearly { data_urls: Vec<YearUrl> },
    /// One weather file per station, fetched from a templated endpoint.
    Stations {
        api_endpoint: String,
        stations: Vec<StationRef>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct YearUrl {
    pub year: Year,
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct StationRef {
    pub station_id: String,
    pub station_name: String,
}

impl SourceInfo {
    /// Reads and validates the source document at `path`.
    pub async fn load(path: &Path) -> Result<Self, ConfigError> {
        let bytes = tokio::fs::read(path).await.map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => ConfigError::FileNotFound(path.to_path_buf()),
            _ => ConfigError::Read(path.to_path_buf(), e),
        })?;
        let info: SourceInfo = serde_json::from_slice(&bytes)
            .map_err(|e| ConfigError::JsonParse(path.to_path_buf(), e))?;
        info.validate()?;
        log::info!("Source configuration loaded from {}", path.display());
        Ok(info)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let mut seen = HashSet::new();
        for (position, source) in self.data_sources.iter().enumerate() {
            if source.source_name.trim().is_empty() {
                return Err(ConfigError::EmptySourceName(position));
            }
            if !seen.insert(source.source_name.as_str()) {
                return Err(ConfigError::DuplicateSource(source.source_name.clone()));
            }
            if let SourceKind::Stations { api_endpoint, .. } = &source.kind {
                if !api_endpoint.contains(STATION_PLACEHOLDER) {
                    return Err(ConfigError::MissingStationPlaceholder {
                        source_name: source.source_name.clone(),
                        endpoint: api_endpoint.clone(),
                    });
                }
            }
        }
        Ok(())
    }
}

impl SourceConfig {
    pub fn dataset(&self) -> DatasetKind {
        match self.kind {
            SourceKind::Yearly { .. } => DatasetKind::BicycleTraffic,
            SourceKind::Stations { .. } => DatasetKind::WeatherData,
        }
    }

    /// Name of the output table this source is loaded into.
    pub fn table_name(&self) -> String {
        self.dataset().table_name(&self.source_name)
    }

    pub fn yearly_file_name(&self, year: Year) -> String {
        format!("{}_{}.csv", self.table_name(), year)
    }

    pub fn station_file_name(&self, station: &StationRef) -> String {
        format!(
            "{}_{}_{}.csv.gz",
            self.table_name(),
            station.station_id,
            station.station_name
        )
    }
}

pub fn station_url(api_endpoint: &str, station: &StationRef) -> String {
    api_endpoint.replace(STATION_PLACEHOLDER, &station.station_id)
}
