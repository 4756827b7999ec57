//! Last pipeline stage: persist the transformed tables into SQLite.

use crate::load::error::LoadError;
use crate::types::extracted::{TransformedData, TransformedTable};
use crate::utils::ensure_dir_exists;
use log::info;
use polars::prelude::{AnyValue, DataType};
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteConnectOptions, SqlitePool, SqlitePoolOptions};
use std::path::{Path, PathBuf};

type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

pub struct DataLoader {
    db_path: PathBuf,
}

impl DataLoader {
    pub fn new(db_path: &Path) -> Self {
        Self {
            db_path: db_path.to_path_buf(),
        }
    }

    pub fn db_path(&self) -> &Path {
        &self.db_path
    }

    /// Writes every table, replacing any table of the same name.
    /// Returns the total number of rows written.
    pub async fn load(&self, data: &TransformedData) -> Result<usize, LoadError> {
        if let Some(parent) = self.db_path.parent().filter(|p| !p.as_os_str().is_empty()) {
            ensure_dir_exists(parent)
                .await
                .map_err(|e| LoadError::DirCreation(parent.to_path_buf(), e))?;
        }

        let options = SqliteConnectOptions::new()
            .filename(&self.db_path)
            .create_if_missing(true);
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .connect_with(options)
            .await
            .map_err(|source| LoadError::Connect {
                path: self.db_path.clone(),
                source,
            })?;

        let mut written = 0;
        for table in data.tables() {
            written += write_table(&pool, table).await?;
        }
        pool.close().await;
        Ok(written)
    }
}

async fn write_table(pool: &SqlitePool, table: &TransformedTable) -> Result<usize, LoadError> {
    let name = table.table_name.as_str();
    let frame = &table.frame;
    let query_err = |source| LoadError::Query {
        table: name.to_string(),
        source,
    };

    let columns = frame.get_columns();
    let definitions: Vec<String> = columns
        .iter()
        .map(|c| format!("{} {}", quote_ident(c.name()), sql_type(c.dtype())))
        .collect();
    let drop = format!("DROP TABLE IF EXISTS {}", quote_ident(name));
    let create = format!(
        "CREATE TABLE {} ({})",
        quote_ident(name),
        definitions.join(", ")
    );
    let insert = format!(
        "INSERT INTO {} VALUES ({})",
        quote_ident(name),
        vec!["?"; columns.len()].join(", ")
    );

    let mut tx = pool.begin().await.map_err(query_err)?;
    sqlx::query(&drop)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;
    sqlx::query(&create)
        .execute(&mut *tx)
        .await
        .map_err(query_err)?;

    for row in 0..frame.height() {
        let mut query = sqlx::query(&insert);
        for column in columns {
            let value = column.get(row).map_err(|source| LoadError::RowRead {
                table: name.to_string(),
                source,
            })?;
            query = bind_value(query, value, name, column.name())?;
        }
        query.execute(&mut *tx).await.map_err(query_err)?;
    }
    tx.commit().await.map_err(query_err)?;

    info!(
        "Table '{}' is written to the database ({} rows)",
        name,
        frame.height()
    );
    Ok(frame.height())
}

fn quote_ident(ident: &str) -> String {
    format!("\"{}\"", ident.replace('"', "\"\""))
}

fn sql_type(dtype: &DataType) -> &'static str {
    if dtype.is_integer() || matches!(dtype, DataType::Boolean) {
        "INTEGER"
    } else if dtype.is_float() {
        "REAL"
    } else {
        "TEXT"
    }
}

fn bind_value<'q>(
    query: SqliteQuery<'q>,
    value: AnyValue<'_>,
    table: &str,
    column: &str,
) -> Result<SqliteQuery<'q>, LoadError> {
    Ok(match value {
        AnyValue::Null => query.bind(None::<i64>),
        AnyValue::Boolean(v) => query.bind(v),
        AnyValue::Int8(v) => query.bind(i64::from(v)),
        AnyValue::Int16(v) => query.bind(i64::from(v)),
        AnyValue::Int32(v) => query.bind(i64::from(v)),
        AnyValue::Int64(v) => query.bind(v),
        AnyValue::UInt8(v) => query.bind(i64::from(v)),
        AnyValue::UInt16(v) => query.bind(i64::from(v)),
        AnyValue::UInt32(v) => query.bind(i64::from(v)),
        AnyValue::UInt64(v) => {
            let v = i64::try_from(v).map_err(|_| LoadError::ValueOutOfRange {
                table: table.to_string(),
                column: column.to_string(),
                value: v,
            })?;
            query.bind(v)
        }
        AnyValue::Float32(v) => query.bind(f64::from(v)),
        AnyValue::Float64(v) => query.bind(v),
        AnyValue::String(v) => query.bind(v.to_string()),
        AnyValue::StringOwned(v) => query.bind(v.to_string()),
        other => query.bind(other.to_string()),
    })
}
