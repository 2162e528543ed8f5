//! TableScan executor
//!
//! Pulls rows from a data source, restricted to the projected columns.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::debug;

use crate::catalog::TableRef;
use crate::datasource::{DataSource, ScanStream};

use super::error::{ExecutorError, ExecutorResult};
use super::row::Row;
use super::Executor;

/// Table scan executor
pub struct TableScan {
    table: TableRef,
    source: Arc<dyn DataSource>,
    projection: Vec<String>,
    /// Open scan stream, present between open and close
    stream: Option<Box<dyn ScanStream>>,
}

impl TableScan {
    pub fn new(table: TableRef, source: Arc<dyn DataSource>, projection: Vec<String>) -> Self {
        TableScan {
            table,
            source,
            projection,
            stream: None,
        }
    }
}

#[async_trait]
impl Executor for TableScan {
    async fn open(&mut self) -> ExecutorResult<()> {
        debug!(table = %self.table, columns = self.projection.len(), "opening table scan");
        self.stream = Some(self.source.scan(&self.projection).await?);
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        match self.stream.as_mut() {
            Some(stream) => stream.next_row().await,
            None => Err(ExecutorError::NotOpen("table scan")),
        }
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.stream = None;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::drain;
    use crate::executor::Datum;
    use crate::planner::test_utils::users_source;

    #[tokio::test]
    async fn test_scan_projected_columns() {
        let mut scan = TableScan::new(
            TableRef::bare("users"),
            users_source(),
            vec!["age".to_string(), "username".to_string()],
        );
        let rows = drain(&mut scan).await.unwrap();
        assert_eq!(rows.len(), 5);
        assert_eq!(
            rows[0].values(),
            &[Datum::Int(20), Datum::Text("Adam".into())]
        );
    }

    #[tokio::test]
    async fn test_next_before_open() {
        let mut scan = TableScan::new(TableRef::bare("users"), users_source(), vec![]);
        assert!(matches!(scan.next().await, Err(ExecutorError::NotOpen(_))));
    }
}
