//! The two kinds of dataset the pipeline knows how to reshape.

use std::fmt;

/// Which transformation rules apply to a source's files.
///
/// Also decides the naming of downloaded files and output tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DatasetKind {
    /// Monthly bicycle counts, one CSV per year, one column per counting station.
    BicycleTraffic,
    /// Monthly weather observations, one gzip CSV per weather station.
    WeatherData,
}

impl DatasetKind {
    pub(crate) fn name_segment(&self) -> &'static str {
        match self {
            DatasetKind::BicycleTraffic => "bicycle_traffic",
            DatasetKind::WeatherData => "weather_data",
        }
    }

    /// Table name for a source, e.g. `mobilithek_bicycle_traffic`.
    pub fn table_name(&self, source_name: &str) -> String {
        format!("{}_{}", source_name.to_lowercase(), self.name_segment())
    }

    /// Name of the column holding the `"MonthName-Year"` label.
    pub fn date_column(&self) -> &'static str {
        match self {
            DatasetKind::BicycleTraffic => "Date",
            DatasetKind::WeatherData => "date",
        }
    }
}

impl fmt::Display for DatasetKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name_segment())
    }
}

/// Column layout of Meteostat monthly bulk files, which carry no header row.
pub(crate) const MONTHLY_WEATHER_COLUMNS: [&str; 9] = [
    "year", "month", "tavg", "tmin", "tmax", "prcp", "wspd", "pres", "tsun",
];
