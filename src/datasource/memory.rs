//! In-memory data source

use std::collections::HashSet;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use super::{ColumnStatistics, DataSource, ScanStream, Statistics};
use crate::catalog::Schema;
use crate::executor::{ExecutorError, ExecutorResult, Row};

/// Rows held in memory, with statistics computed up front
#[derive(Debug, Clone)]
pub struct MemoryDataSource {
    schema: Schema,
    rows: Arc<Vec<Row>>,
    statistics: Statistics,
}

impl MemoryDataSource {
    /// Create a source from rows matching the schema width
    pub fn new(schema: Schema, rows: Vec<Row>) -> ExecutorResult<Self> {
        if let Some(bad) = rows.iter().find(|r| r.len() != schema.len()) {
            return Err(ExecutorError::DataSource(format!(
                "row has {} values but schema has {} fields",
                bad.len(),
                schema.len()
            )));
        }
        let statistics = compute_statistics(&schema, &rows);
        Ok(MemoryDataSource {
            schema,
            rows: Arc::new(rows),
            statistics,
        })
    }

    pub fn rows(&self) -> &[Row] {
        &self.rows
    }
}

fn compute_statistics(schema: &Schema, rows: &[Row]) -> Statistics {
    let column_stats = (0..schema.len())
        .map(|col| {
            let mut stats = ColumnStatistics::default();
            let mut distinct = HashSet::new();
            for datum in rows.iter().filter_map(|row| row.values().get(col)) {
                if datum.is_null() {
                    stats.null_count += 1;
                    continue;
                }
                if stats.min.as_ref().map_or(true, |min| datum < min) {
                    stats.min = Some(datum.clone());
                }
                if stats.max.as_ref().map_or(true, |max| datum > max) {
                    stats.max = Some(datum.clone());
                }
                distinct.insert(datum);
            }
            stats.distinct_count = distinct.len() as u64;
            stats
        })
        .collect();
    Statistics::new(rows.len() as u64, column_stats)
}

#[async_trait]
impl DataSource for MemoryDataSource {
    fn schema(&self) -> Schema {
        self.schema.clone()
    }

    fn statistics(&self) -> Statistics {
        self.statistics.clone()
    }

    async fn scan(&self, projection: &[String]) -> ExecutorResult<Box<dyn ScanStream>> {
        let indices = projection
            .iter()
            .map(|name| {
                self.schema
                    .index_of(None, name)
                    .map_err(|_| ExecutorError::ColumnNotFound {
                        table: "memory".to_string(),
                        column: name.clone(),
                    })
            })
            .collect::<ExecutorResult<Vec<_>>>()?;
        debug!(columns = ?projection, rows = self.rows.len(), "memory scan");
        Ok(Box::new(MemoryScan {
            rows: self.rows.clone(),
            indices,
            position: 0,
        }))
    }
}

/// Scan cursor over shared rows, projecting lazily
struct MemoryScan {
    rows: Arc<Vec<Row>>,
    indices: Vec<usize>,
    position: usize,
}

#[async_trait]
impl ScanStream for MemoryScan {
    async fn next_row(&mut self) -> ExecutorResult<Option<Row>> {
        let Some(row) = self.rows.get(self.position) else {
            return Ok(None);
        };
        self.position += 1;
        row.project(&self.indices).map(Some)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{DataType, Field};
    use crate::executor::Datum;

    fn source() -> MemoryDataSource {
        let schema = Schema::new(vec![
            Field::new("id", DataType::Int),
            Field::new("name", DataType::Text),
        ]);
        let rows = vec![
            Row::new(vec![Datum::Int(2), Datum::Text("b".into())]),
            Row::new(vec![Datum::Int(1), Datum::Null]),
            Row::new(vec![Datum::Int(2), Datum::Text("a".into())]),
        ];
        MemoryDataSource::new(schema, rows).unwrap()
    }

    #[test]
    fn test_statistics() {
        let stats = source().statistics();
        assert_eq!(stats.row_count, 3);
        assert_eq!(stats.column_stats[0].distinct_count, 2);
        assert_eq!(stats.column_stats[0].min, Some(Datum::Int(1)));
        assert_eq!(stats.column_stats[0].max, Some(Datum::Int(2)));
        assert_eq!(stats.column_stats[1].null_count, 1);
        assert_eq!(stats.column_stats[1].min, Some(Datum::Text("a".into())));
    }

    #[test]
    fn test_rejects_short_rows() {
        let schema = Schema::new(vec![Field::new("id", DataType::Int)]);
        let result = MemoryDataSource::new(schema, vec![Row::empty()]);
        assert!(matches!(result, Err(ExecutorError::DataSource(_))));
    }

    #[tokio::test]
    async fn test_scan_projection() {
        let source = source();
        let mut stream = source.scan(&["name".to_string(), "id".to_string()]).await.unwrap();

        let first = stream.next_row().await.unwrap().unwrap();
        assert_eq!(first, Row::new(vec![Datum::Text("b".into()), Datum::Int(2)]));

        assert!(stream.next_row().await.unwrap().is_some());
        assert!(stream.next_row().await.unwrap().is_some());
        assert!(stream.next_row().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_scan_empty_projection() {
        let source = source();
        let mut stream = source.scan(&[]).await.unwrap();
        let row = stream.next_row().await.unwrap().unwrap();
        assert!(row.is_empty());
    }

    #[tokio::test]
    async fn test_scan_unknown_column() {
        let result = source().scan(&["missing".to_string()]).await;
        assert!(matches!(result, Err(ExecutorError::ColumnNotFound { .. })));
    }
}
