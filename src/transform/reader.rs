//! Reading downloaded files into polars frames.

use crate::transform::error::TransformError;
use crate::utils::display_name;
use async_compression::tokio::bufread::GzipDecoder;
use log::info;
use polars::prelude::*;
use std::io::{self, Cursor};
use std::path::Path;
use tokio::io::AsyncReadExt;
use tokio::task;

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Character encoding of a downloaded text file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum TextEncoding {
    /// UTF-8, with or without a leading byte order mark.
    Utf8,
    /// ISO-8859-1, as used by older spreadsheet exports.
    Latin1,
}

impl TextEncoding {
    /// Re-encodes `bytes` as UTF-8 without BOM.
    pub(crate) fn to_utf8(self, bytes: Vec<u8>, path: &Path) -> Result<Vec<u8>, TransformError> {
        match self {
            TextEncoding::Utf8 => {
                let bytes = if bytes.starts_with(UTF8_BOM) {
                    bytes[UTF8_BOM.len()..].to_vec()
                } else {
                    bytes
                };
                std::str::from_utf8(&bytes)
                    .map_err(|e| TransformError::InvalidUtf8(path.to_path_buf(), e))?;
                Ok(bytes)
            }
            // every Latin-1 byte is the code point of the same value
            TextEncoding::Latin1 => Ok(bytes
                .iter()
                .map(|&b| char::from(b))
                .collect::<String>()
                .into_bytes()),
        }
    }
}

/// How a CSV file is laid out.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CsvFormat {
    pub separator: u8,
    pub has_header: bool,
}

pub(crate) async fn read_file(path: &Path) -> Result<Vec<u8>, TransformError> {
    tokio::fs::read(path).await.map_err(|e| match e.kind() {
        io::ErrorKind::NotFound => TransformError::FileNotFound(path.to_path_buf()),
        _ => TransformError::FileRead(path.to_path_buf(), e),
    })
}

pub(crate) async fn gunzip(bytes: &[u8], path: &Path) -> Result<Vec<u8>, TransformError> {
    let mut decoder = GzipDecoder::new(bytes);
    let mut decompressed = Vec::new();
    decoder
        .read_to_end(&mut decompressed)
        .await
        .map_err(|e| TransformError::Decompress(path.to_path_buf(), e))?;
    Ok(decompressed)
}

/// Parses UTF-8 CSV bytes into a DataFrame using a blocking task.
///
/// The whole file is used for schema inference, so a column that only shows
/// decimals in its last rows still becomes a float column.
pub(crate) async fn parse_csv(
    bytes: Vec<u8>,
    format: CsvFormat,
    path: &Path,
) -> Result<DataFrame, TransformError> {
    let file = display_name(path);

    let df = task::spawn_blocking({
        let file = file.clone();
        move || {
            CsvReadOptions::default()
                .with_has_header(format.has_header)
                .with_infer_schema_length(None)
                .with_parse_options(CsvParseOptions::default().with_separator(format.separator))
                .into_reader_with_file_handle(Cursor::new(bytes))
                .finish()
                .map_err(|e| TransformError::CsvRead { file, source: e })
        }
    })
    .await??;

    info!("'{}' is successfully loaded ({} rows)", file, df.height());
    Ok(df)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_compression::tokio::write::GzipEncoder;
    use tokio::io::AsyncWriteExt;

    #[test]
    fn test_utf8_bom_is_stripped() -> Result<(), TransformError> {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice("Monat;Zülpicher Str.\n".as_bytes());
        let decoded = TextEncoding::Utf8.to_utf8(bytes, Path::new("x.csv"))?;
        assert_eq!(decoded, "Monat;Zülpicher Str.\n".as_bytes());
        Ok(())
    }

    #[test]
    fn test_latin1_is_reencoded() -> Result<(), TransformError> {
        // "Zülpicher" with ü as the single Latin-1 byte 0xFC
        let bytes = b"Z\xFClpicher".to_vec();
        let decoded = TextEncoding::Latin1.to_utf8(bytes, Path::new("x.csv"))?;
        assert_eq!(String::from_utf8(decoded).unwrap(), "Zülpicher");
        Ok(())
    }

    #[test]
    fn test_invalid_utf8_is_reported() {
        let result = TextEncoding::Utf8.to_utf8(b"Z\xFCl".to_vec(), Path::new("bad.csv"));
        assert!(matches!(result, Err(TransformError::InvalidUtf8(..))));
    }

    #[tokio::test]
    async fn test_gunzip_roundtrip() -> Result<(), Box<dyn std::error::Error>> {
        let mut encoder = GzipEncoder::new(Vec::new());
        encoder.write_all(b"2009,1,2.5\n").await?;
        encoder.shutdown().await?;
        let compressed = encoder.into_inner();

        let plain = gunzip(&compressed, Path::new("x.csv.gz")).await?;
        assert_eq!(plain, b"2009,1,2.5\n");
        assert!(gunzip(b"not gzip", Path::new("x.csv.gz")).await.is_err());
        Ok(())
    }

    #[tokio::test]
    async fn test_parse_semicolon_csv() -> Result<(), Box<dyn std::error::Error>> {
        let bytes = b"Monat;A;B\nJanuar;1;2.5\nFebruar;;3\n".to_vec();
        let format = CsvFormat {
            separator: b';',
            has_header: true,
        };
        let df = parse_csv(bytes, format, Path::new("t.csv")).await?;
        assert_eq!(df.shape(), (2, 3));
        assert_eq!(df.column("A")?.i64()?.get(1), None);
        assert_eq!(df.column("B")?.f64()?.get(0), Some(2.5));
        Ok(())
    }

    #[tokio::test]
    async fn test_missing_file() {
        let result = read_file(Path::new("no/such/file.csv")).await;
        assert!(matches!(result, Err(TransformError::FileNotFound(_))));
    }
}
