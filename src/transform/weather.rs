//! Reshaping of the Meteostat monthly station files.

use crate::transform::error::TransformError;
use crate::transform::reader::CsvFormat;
use crate::types::dataset::{DatasetKind, MONTHLY_WEATHER_COLUMNS};
use crate::types::month::Month;
use polars::prelude::*;
use std::ops::RangeInclusive;

/// Years kept from the weather files, matching the traffic series.
pub const WEATHER_YEARS: RangeInclusive<i64> = 2009..=2022;

pub(crate) const WEATHER_CSV: CsvFormat = CsvFormat {
    separator: b',',
    has_header: false,
};

/// Measurement columns, everything but `year` and `month`.
fn measurement_columns() -> &'static [&'static str] {
    &MONTHLY_WEATHER_COLUMNS[2..]
}

/// Turns one parsed station file into a table of `date` labels and
/// measurements suffixed with `_<station_id>`.
pub fn reshape_weather_file(
    mut df: DataFrame,
    station_id: &str,
    file: &str,
) -> Result<DataFrame, TransformError> {
    let date_column = DatasetKind::WeatherData.date_column();
    let polars_err = |source| TransformError::PolarsError {
        file: file.to_string(),
        source,
    };

    if df.width() != MONTHLY_WEATHER_COLUMNS.len() {
        return Err(TransformError::SchemaMismatch {
            file: file.to_string(),
            expected: MONTHLY_WEATHER_COLUMNS.len(),
            found: df.width(),
        });
    }
    df.set_column_names(MONTHLY_WEATHER_COLUMNS.iter().copied())
        .map_err(polars_err)?;

    let mut casts = vec![
        col("year").strict_cast(DataType::Int64),
        col("month").strict_cast(DataType::Int64),
    ];
    casts.extend(
        measurement_columns()
            .iter()
            .map(|name| col(*name).strict_cast(DataType::Float64)),
    );
    let df = df
        .lazy()
        .with_columns(casts)
        .filter(
            col("year")
                .gt_eq(lit(*WEATHER_YEARS.start()))
                .and(col("year").lt_eq(lit(*WEATHER_YEARS.end()))),
        )
        .collect()
        .map_err(polars_err)?;

    let labels = date_labels(&df, file)?;

    let mut columns = vec![Column::new(date_column.into(), labels)];
    for name in measurement_columns() {
        let column = df
            .column(name)
            .map_err(polars_err)?
            .clone()
            .with_name(format!("{}_{}", name, station_id).into());
        columns.push(column);
    }

    let reshaped = DataFrame::new(columns).map_err(polars_err)?;
    fill_measurements(reshaped, date_column).map_err(polars_err)
}

fn date_labels(df: &DataFrame, file: &str) -> Result<Vec<String>, TransformError> {
    let polars_err = |source| TransformError::PolarsError {
        file: file.to_string(),
        source,
    };
    let years = df.column("year").and_then(|c| c.i64()).map_err(polars_err)?;
    let months = df.column("month").and_then(|c| c.i64()).map_err(polars_err)?;

    years
        .into_iter()
        .zip(months.into_iter())
        .map(|(year, month)| {
            year.zip(month)
                .and_then(|(y, m)| Month::new(u32::try_from(m).ok()?, i32::try_from(y).ok()?))
                .map(|m| m.to_string())
                .ok_or_else(|| TransformError::InvalidMonth {
                    file: file.to_string(),
                    year,
                    month,
                })
        })
        .collect()
}

fn fill_measurements(df: DataFrame, date_column: &str) -> PolarsResult<DataFrame> {
    let fills: Vec<Expr> = df
        .get_column_names()
        .into_iter()
        .filter(|name| name.as_str() != date_column)
        .map(|name| col(name.as_str()).fill_null(lit(0.0)))
        .collect();
    df.lazy().with_columns(fills).collect()
}

/// Outer-joins the station tables on `date`. Months missing at one station
/// get zero measurements there. Rows are ordered by the `date` label as a
/// string, so `April-2009` comes before `January-2009`.
pub fn merge_weather_tables(
    tables: Vec<DataFrame>,
    source_name: &str,
) -> Result<DataFrame, TransformError> {
    let date_column = DatasetKind::WeatherData.date_column();
    let merge_err = |source| TransformError::Merge {
        source_name: source_name.to_string(),
        source,
    };

    let mut frames = tables.into_iter().map(|df| df.lazy());
    let Some(first) = frames.next() else {
        return Ok(DataFrame::empty());
    };
    let joined = frames
        .fold(first, |acc, next| {
            acc.join(
                next,
                [col(date_column)],
                [col(date_column)],
                JoinArgs::new(JoinType::Full).with_coalesce(JoinCoalesce::CoalesceColumns),
            )
        })
        .collect()
        .map_err(merge_err)?;

    fill_measurements(joined, date_column)
        .and_then(|df| df.sort([date_column], SortMultipleOptions::default()))
        .map_err(merge_err)
}
