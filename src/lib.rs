mod config;
mod error;
mod extract;
mod load;
mod pipeline;
mod transform;
mod types;
mod utils;

pub use error::EtlError;
pub use pipeline::*;

pub use config::error::ConfigError;
pub use config::settings::Settings;
pub use config::source::{SourceConfig, SourceInfo, SourceKind, StationRef, YearUrl};

pub use extract::downloader::Downloader;
pub use extract::error::ExtractError;
pub use extract::extractor::DataExtractor;

pub use transform::error::TransformError;
pub use transform::traffic::{merge_traffic_tables, reshape_traffic_file, TrafficLayout};
pub use transform::transformer::DataTransformer;
pub use transform::weather::{merge_weather_tables, reshape_weather_file, WEATHER_YEARS};

pub use load::error::LoadError;
pub use load::loader::DataLoader;

pub use types::dataset::DatasetKind;
pub use types::extracted::*;
pub use types::month::{Month, Year};
