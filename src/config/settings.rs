//! File locations used by a pipeline run.

use bon::Builder;
use std::env;
use std::path::PathBuf;

pub const DEFAULT_SOURCE_INFO_PATH: &str = "config/source_info.json";
pub const DEFAULT_DOWNLOAD_DIR: &str = "data";
pub const DEFAULT_DB_PATH: &str = "data/bike_weather.sqlite";

const SOURCE_INFO_ENV: &str = "ETL_SOURCE_INFO";
const DOWNLOAD_DIR_ENV: &str = "ETL_DOWNLOAD_DIR";
const DB_PATH_ENV: &str = "ETL_DB_PATH";

/// Where the source document is read from, where downloads land, and which
/// SQLite file receives the output tables.
///
/// ```
/// use bike_weather_etl::Settings;
///
/// let settings = Settings::builder().download_dir("/tmp/raw").build();
/// assert_eq!(settings.download_dir.to_str(), Some("/tmp/raw"));
/// assert_eq!(settings.db_path.to_str(), Some("data/bike_weather.sqlite"));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Builder)]
pub struct Settings {
    #[builder(into, default = PathBuf::from(DEFAULT_SOURCE_INFO_PATH))]
    pub source_info_path: PathBuf,
    #[builder(into, default = PathBuf::from(DEFAULT_DOWNLOAD_DIR))]
    pub download_dir: PathBuf,
    #[builder(into, default = PathBuf::from(DEFAULT_DB_PATH))]
    pub db_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Settings::builder().build()
    }
}

impl Settings {
    /// Defaults, overridden by `ETL_SOURCE_INFO`, `ETL_DOWNLOAD_DIR` and `ETL_DB_PATH`.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
        Settings::builder()
            .maybe_source_info_path(non_empty(SOURCE_INFO_ENV))
            .maybe_download_dir(non_empty(DOWNLOAD_DIR_ENV))
            .maybe_db_path(non_empty(DB_PATH_ENV))
            .build()
    }
}
