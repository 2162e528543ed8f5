//! CSV-file data source
//!
//! The file is read once when the source is opened. The header row maps
//! file columns onto schema fields by name, so the file may carry extra
//! columns or list them in another order. Empty cells load as NULL.

use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tracing::info;

use super::{DataSource, MemoryDataSource, ScanStream, Statistics};
use crate::catalog::{DataType, Field, Schema};
use crate::executor::{Datum, ExecutorError, ExecutorResult, Row};

/// Data source backed by a CSV file with a header row
#[derive(Debug, Clone)]
pub struct CsvDataSource {
    path: PathBuf,
    inner: MemoryDataSource,
}

impl CsvDataSource {
    /// Load a CSV file, typing each cell by the schema
    pub fn open(path: impl AsRef<Path>, schema: Schema) -> ExecutorResult<Self> {
        let path = path.as_ref().to_path_buf();
        let mut reader = ::csv::ReaderBuilder::new()
            .has_headers(true)
            .trim(::csv::Trim::All)
            .from_path(&path)?;

        let headers = reader.headers()?.clone();
        let positions = schema
            .fields()
            .iter()
            .map(|field| {
                headers
                    .iter()
                    .position(|h| h == field.name)
                    .ok_or_else(|| ExecutorError::ColumnNotFound {
                        table: path.display().to_string(),
                        column: field.name.clone(),
                    })
            })
            .collect::<ExecutorResult<Vec<_>>>()?;

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record?;
            let values = positions
                .iter()
                .zip(schema.fields())
                .map(|(&pos, field)| parse_cell(record.get(pos).unwrap_or(""), field))
                .collect::<ExecutorResult<Vec<_>>>()?;
            rows.push(Row::new(values));
        }

        info!(path = %path.display(), rows = rows.len(), "loaded csv data source");
        Ok(CsvDataSource {
            inner: MemoryDataSource::new(schema, rows)?,
            path,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

fn parse_cell(raw: &str, field: &Field) -> ExecutorResult<Datum> {
    if raw.is_empty() {
        return Ok(Datum::Null);
    }
    let invalid = || {
        ExecutorError::DataSource(format!(
            "invalid {} value {:?} for column {}",
            field.data_type, raw, field.name
        ))
    };
    match field.data_type {
        DataType::Null => Ok(Datum::Null),
        DataType::Boolean => match raw.to_ascii_lowercase().as_str() {
            "true" | "t" | "1" => Ok(Datum::Bool(true)),
            "false" | "f" | "0" => Ok(Datum::Bool(false)),
            _ => Err(invalid()),
        },
        DataType::Int => raw.parse().map(Datum::Int).map_err(|_| invalid()),
        DataType::Float => raw.parse().map(Datum::Float).map_err(|_| invalid()),
        DataType::Text => Ok(Datum::Text(raw.to_string())),
        DataType::Blob => match raw.strip_prefix("0x") {
            Some(hex) => decode_hex(hex).map(Datum::Bytes).ok_or_else(invalid),
            None => Ok(Datum::Bytes(raw.as_bytes().to_vec())),
        },
    }
}

fn decode_hex(hex: &str) -> Option<Vec<u8>> {
    if hex.len() % 2 != 0 {
        return None;
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| u8::from_str_radix(hex.get(i..i + 2)?, 16).ok())
        .collect()
}

#[async_trait]
impl DataSource for CsvDataSource {
    fn schema(&self) -> Schema {
        self.inner.schema()
    }

    fn statistics(&self) -> Statistics {
        self.inner.statistics()
    }

    async fn scan(&self, projection: &[String]) -> ExecutorResult<Box<dyn ScanStream>> {
        self.inner.scan(projection).await
    }
}
