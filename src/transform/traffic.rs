//! Reshaping of the yearly bicycle-traffic files.
//!
//! Each file has one row per month (German month names in the first column)
//! and one column per counting station. The yearly exports changed format
//! over time, see [`TrafficLayout::for_year`].

use crate::transform::error::TransformError;
use crate::transform::reader::{CsvFormat, TextEncoding};
use crate::types::dataset::DatasetKind;
use crate::types::month::{Month, Year};
use polars::prelude::*;

/// Label of the annual-total row present in the older exports.
const ANNUAL_TOTAL_LABEL: &str = "Jahressumme";

pub(crate) const TRAFFIC_CSV: CsvFormat = CsvFormat {
    separator: b';',
    has_header: true,
};

/// File format of one year's export.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TrafficLayout {
    pub(crate) encoding: TextEncoding,
    /// Counts are given in thousands, `12.345` meaning 12 345.
    pub in_thousands: bool,
    /// A trailing annual-total row must be dropped.
    pub has_annual_total: bool,
}

impl TrafficLayout {
    pub fn for_year(year: Year) -> Self {
        match year.get() {
            2016..=2020 => Self {
                encoding: TextEncoding::Utf8,
                in_thousands: true,
                has_annual_total: false,
            },
            2021..=2022 => Self {
                encoding: TextEncoding::Latin1,
                in_thousands: true,
                has_annual_total: false,
            },
            _ => Self {
                encoding: TextEncoding::Latin1,
                in_thousands: false,
                has_annual_total: true,
            },
        }
    }
}

fn value_columns(df: &DataFrame, date_column: &str) -> Vec<String> {
    df.get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != date_column)
        .map(|name| name.to_string())
        .collect()
}

/// Turns one parsed yearly file into a table of `Date` labels and integer counts.
pub fn reshape_traffic_file(
    mut df: DataFrame,
    year: Year,
    file: &str,
) -> Result<DataFrame, TransformError> {
    let layout = TrafficLayout::for_year(year);
    let date_column = DatasetKind::BicycleTraffic.date_column();
    let polars_err = |source| TransformError::PolarsError {
        file: file.to_string(),
        source,
    };

    let first_column = df
        .get_column_names()
        .first()
        .map(|name| name.to_string())
        .ok_or_else(|| TransformError::EmptyTable(file.to_string()))?;
    df.rename(&first_column, date_column.into())
        .map_err(polars_err)?;
    // rename keeps the cached schema, rebuild so the lazy plan sees `Date`
    let df = DataFrame::new(df.take_columns()).map_err(polars_err)?;

    let counts: Vec<Expr> = value_columns(&df, date_column)
        .iter()
        .map(|name| {
            if layout.in_thousands {
                // the cast truncates, `1.001` becomes 1000
                (col(name.as_str()).strict_cast(DataType::Float64).fill_null(lit(0.0))
                    * lit(1000.0))
                .strict_cast(DataType::Int64)
            } else {
                col(name.as_str())
                    .strict_cast(DataType::Int64)
                    .fill_null(lit(0i64))
            }
        })
        .collect();

    let mut lf = df
        .lazy()
        .with_column(col(date_column).cast(DataType::String));
    if layout.has_annual_total {
        lf = lf.filter(col(date_column).neq_missing(lit(ANNUAL_TOTAL_LABEL)));
    }
    let mut df = lf.with_columns(counts).collect().map_err(polars_err)?;

    let labels = month_labels(&df, date_column, year, file)?;
    df.with_column(Series::new(date_column.into(), labels))
        .map_err(polars_err)?;
    Ok(df)
}

/// Maps the distinct values of the month column, in order of appearance, to
/// `January-<year>` .. `December-<year>`.
fn month_labels(
    df: &DataFrame,
    date_column: &str,
    year: Year,
    file: &str,
) -> Result<Vec<String>, TransformError> {
    let raw = df
        .column(date_column)
        .and_then(|c| c.str().cloned())
        .map_err(|source| TransformError::PolarsError {
            file: file.to_string(),
            source,
        })?;

    let mut distinct: Vec<Option<&str>> = Vec::with_capacity(12);
    for value in raw.into_iter() {
        if !distinct.contains(&value) {
            distinct.push(value);
        }
    }
    if distinct.len() != 12 {
        return Err(TransformError::MonthRowCount {
            file: file.to_string(),
            found: distinct.len(),
        });
    }

    let months: Vec<Month> = Month::all_of(year).collect();
    Ok(raw
        .into_iter()
        .map(|value| {
            let position = distinct.iter().position(|d| *d == value).unwrap_or(0);
            months[position].to_string()
        })
        .collect())
}

/// Stacks the yearly tables. Counting stations missing in a year get zero counts.
pub fn merge_traffic_tables(
    tables: Vec<DataFrame>,
    source_name: &str,
) -> Result<DataFrame, TransformError> {
    let date_column = DatasetKind::BicycleTraffic.date_column();
    let merge_err = |source| TransformError::Merge {
        source_name: source_name.to_string(),
        source,
    };

    let frames: Vec<LazyFrame> = tables.into_iter().map(|df| df.lazy()).collect();
    let stacked = concat_lf_diagonal(frames, UnionArgs::default())
        .and_then(|lf| lf.collect())
        .map_err(merge_err)?;

    let counts: Vec<Expr> = value_columns(&stacked, date_column)
        .iter()
        .map(|name| {
            col(name.as_str())
                .fill_null(lit(0i64))
                .strict_cast(DataType::Int64)
        })
        .collect();

    stacked
        .lazy()
        .with_columns(counts)
        .collect()
        .map_err(merge_err)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transform::reader::parse_csv;
    use std::path::Path;

    const GERMAN_MONTHS: [&str; 12] = [
        "Januar",
        "Februar",
        "März",
        "April",
        "Mai",
        "Juni",
        "Juli",
        "August",
        "September",
        "Oktober",
        "November",
        "Dezember",
    ];

    fn csv_text(header: &str, rows: &[String]) -> Vec<u8> {
        let mut text = format!("{}\n", header);
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text.into_bytes()
    }

    async fn parse(bytes: Vec<u8>) -> Result<DataFrame, TransformError> {
        parse_csv(bytes, TRAFFIC_CSV, Path::new("traffic.csv")).await
    }

    #[test]
    fn test_layout_by_year() {
        let legacy = TrafficLayout::for_year(Year(2012));
        assert!(legacy.has_annual_total && !legacy.in_thousands);
        assert_eq!(legacy.encoding, TextEncoding::Latin1);

        let utf8 = TrafficLayout::for_year(Year(2018));
        assert!(utf8.in_thousands && !utf8.has_annual_total);
        assert_eq!(utf8.encoding, TextEncoding::Utf8);

        let latin = TrafficLayout::for_year(Year(2022));
        assert!(latin.in_thousands);
        assert_eq!(latin.encoding, TextEncoding::Latin1);
    }

    #[tokio::test]
    async fn test_legacy_year_drops_total_and_labels_months(
    ) -> Result<(), Box<dyn std::error::Error>> {
        let mut rows: Vec<String> = GERMAN_MONTHS
            .iter()
            .enumerate()
            .map(|(i, m)| {
                let zoo = if i == 3 {
                    String::new()
                } else {
                    (i + 1).to_string()
                };
                format!("{};{};{}", m, (i + 1) * 10, zoo)
            })
            .collect();
        rows.push("Jahressumme;780;74".to_string());
        let df = parse(csv_text("Monat;Deutz;Zoo", &rows)).await?;

        let out = reshape_traffic_file(df, Year(2010), "traffic_2010.csv")?;

        assert_eq!(out.height(), 12);
        assert_eq!(out.get_column_names()[0].as_str(), "Date");
        let dates = out.column("Date")?.str()?;
        assert_eq!(dates.get(0), Some("January-2010"));
        assert_eq!(dates.get(11), Some("December-2010"));

        let deutz = out.column("Deutz")?.i64()?;
        assert_eq!(deutz.get(0), Some(10));
        assert_eq!(deutz.get(11), Some(120));
        // the empty April cell is filled with zero
        assert_eq!(out.column("Zoo")?.i64()?.get(3), Some(0));
        Ok(())
    }

    #[tokio::test]
    async fn test_thousands_are_scaled() -> Result<(), Box<dyn std::error::Error>> {
        let rows: Vec<String> = GERMAN_MONTHS
            .iter()
            .map(|m| format!("{};12.345;", m))
            .collect();
        let df = parse(csv_text("Monat;Deutz;Neu", &rows)).await?;

        let out = reshape_traffic_file(df, Year(2017), "traffic_2017.csv")?;

        let deutz = out.column("Deutz")?.i64()?;
        assert!(deutz.into_iter().all(|v| v == Some(12345)));
        let new_station = out.column("Neu")?.i64()?;
        assert!(new_station.into_iter().all(|v| v == Some(0)));
        assert_eq!(out.column("Date")?.str()?.get(4), Some("May-2017"));
        Ok(())
    }

    #[tokio::test]
    async fn test_scaled_counts_are_truncated() -> Result<(), Box<dyn std::error::Error>> {
        let rows: Vec<String> = GERMAN_MONTHS
            .iter()
            .map(|m| format!("{};1.001;1.2345", m))
            .collect();
        let df = parse(csv_text("Monat;Deutz;Zoo", &rows)).await?;

        let out = reshape_traffic_file(df, Year(2020), "traffic_2020.csv")?;

        assert_eq!(out.column("Deutz")?.i64()?.get(0), Some(1000));
        assert_eq!(out.column("Zoo")?.i64()?.get(0), Some(1234));
        Ok(())
    }

    #[tokio::test]
    async fn test_wrong_month_count_is_rejected() -> Result<(), Box<dyn std::error::Error>> {
        let rows: Vec<String> = GERMAN_MONTHS[..11]
            .iter()
            .map(|m| format!("{};1", m))
            .collect();
        let df = parse(csv_text("Monat;Deutz", &rows)).await?;

        let result = reshape_traffic_file(df, Year(2019), "traffic_2019.csv");
        assert!(matches!(
            result,
            Err(TransformError::MonthRowCount { found: 11, .. })
        ));
        Ok(())
    }

    #[tokio::test]
    async fn test_merge_unions_columns() -> Result<(), Box<dyn std::error::Error>> {
        let first: Vec<String> = GERMAN_MONTHS.iter().map(|m| format!("{};1", m)).collect();
        let second: Vec<String> = GERMAN_MONTHS
            .iter()
            .map(|m| format!("{};2;3", m))
            .collect();
        let y2009 = reshape_traffic_file(
            parse(csv_text("Monat;Deutz", &first)).await?,
            Year(2009),
            "a.csv",
        )?;
        let y2011 = reshape_traffic_file(
            parse(csv_text("Monat;Deutz;Zoo", &second)).await?,
            Year(2011),
            "b.csv",
        )?;

        let merged = merge_traffic_tables(vec![y2009, y2011], "Mobilithek")?;

        assert_eq!(merged.height(), 24);
        let names: Vec<&str> = merged
            .get_column_names()
            .into_iter()
            .map(|n| n.as_str())
            .collect();
        assert_eq!(names, vec!["Date", "Deutz", "Zoo"]);
        let zoo = merged.column("Zoo")?.i64()?;
        assert_eq!(zoo.get(0), Some(0));
        assert_eq!(zoo.get(12), Some(3));
        assert_eq!(merged.column("Date")?.str()?.get(12), Some("January-2011"));
        Ok(())
    }
}
