//! Plain data handed from one pipeline stage to the next.

use crate::config::source::StationRef;
use crate::types::dataset::DatasetKind;
use crate::types::month::Year;
use polars::frame::DataFrame;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct YearlyFile {
    pub year: Year,
    pub file_name: String,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StationFile {
    pub station: StationRef,
    pub file_name: String,
}

/// Files saved for one source, keyed by year or by station.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ExtractedFiles {
    Yearly(Vec<YearlyFile>),
    Stations(Vec<StationFile>),
}

impl ExtractedFiles {
    pub fn len(&self) -> usize {
        match self {
            ExtractedFiles::Yearly(files) => files.len(),
            ExtractedFiles::Stations(files) => files.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn dataset(&self) -> DatasetKind {
        match self {
            ExtractedFiles::Yearly(_) => DatasetKind::BicycleTraffic,
            ExtractedFiles::Stations(_) => DatasetKind::WeatherData,
        }
    }

    /// File names in download order.
    pub fn file_names(&self) -> Vec<&str> {
        match self {
            ExtractedFiles::Yearly(files) => files.iter().map(|f| f.file_name.as_str()).collect(),
            ExtractedFiles::Stations(files) => {
                files.iter().map(|f| f.file_name.as_str()).collect()
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedSource {
    pub source_name: String,
    pub files: ExtractedFiles,
}

impl ExtractedSource {
    pub fn table_name(&self) -> String {
        self.files.dataset().table_name(&self.source_name)
    }
}

/// Output of the extract stage: saved files grouped by source, in configuration order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtractedData {
    sources: Vec<ExtractedSource>,
}

impl ExtractedData {
    pub fn new(sources: Vec<ExtractedSource>) -> Self {
        Self { sources }
    }

    pub fn push(&mut self, source: ExtractedSource) {
        self.sources.push(source);
    }

    pub fn get(&self, source_name: &str) -> Option<&ExtractedSource> {
        self.sources.iter().find(|s| s.source_name == source_name)
    }

    pub fn sources(&self) -> &[ExtractedSource] {
        &self.sources
    }

    pub fn file_count(&self) -> usize {
        self.sources.iter().map(|s| s.files.len()).sum()
    }

    /// True when no file at all was saved.
    pub fn is_empty(&self) -> bool {
        self.file_count() == 0
    }
}

impl IntoIterator for ExtractedData {
    type Item = ExtractedSource;
    type IntoIter = std::vec::IntoIter<ExtractedSource>;

    fn into_iter(self) -> Self::IntoIter {
        self.sources.into_iter()
    }
}

/// One merged table per source, ready to be written to the store.
#[derive(Debug, Clone)]
pub struct TransformedTable {
    pub source_name: String,
    pub table_name: String,
    pub frame: DataFrame,
}

/// Output of the transform stage.
#[derive(Debug, Clone, Default)]
pub struct TransformedData {
    tables: Vec<TransformedTable>,
}

impl TransformedData {
    pub fn push(&mut self, table: TransformedTable) {
        self.tables.push(table);
    }

    pub fn get(&self, source_name: &str) -> Option<&TransformedTable> {
        self.tables.iter().find(|t| t.source_name == source_name)
    }

    pub fn tables(&self) -> &[TransformedTable] {
        &self.tables
    }
}

impl FromIterator<TransformedTable> for TransformedData {
    fn from_iter<I: IntoIterator<Item = TransformedTable>>(iter: I) -> Self {
        Self {
            tables: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_when_no_files() {
        let data = ExtractedData::new(vec![
            ExtractedSource {
                source_name: "Mobilithek".to_string(),
                files: ExtractedFiles::Yearly(vec![]),
            },
            ExtractedSource {
                source_name: "Meteostat".to_string(),
                files: ExtractedFiles::Stations(vec![]),
            },
        ]);
        assert!(data.is_empty());
        assert_eq!(data.sources().len(), 2);
        assert!(ExtractedData::default().is_empty());
    }

    #[test]
    fn test_table_name_follows_file_kind() {
        let source = ExtractedSource {
            source_name: "Mobilithek".to_string(),
            files: ExtractedFiles::Yearly(vec![YearlyFile {
                year: Year(2012),
                file_name: "mobilithek_bicycle_traffic_2012.csv".to_string(),
            }]),
        };
        assert_eq!(source.table_name(), "mobilithek_bicycle_traffic");
        assert_eq!(
            source.files.file_names(),
            vec!["mobilithek_bicycle_traffic_2012.csv"]
        );
    }
}
