//! Query results
//!
//! A `QueryResult` is the lazy row stream produced by executing a virtual
//! plan. It owns the opened executor tree and closes it once the stream
//! is exhausted.

use tracing::{debug, trace, warn};

use crate::catalog::Schema;

use super::error::{ExecutorError, ExecutorResult};
use super::row::Row;
use super::Executor;

/// Single-pass stream of result rows
pub struct QueryResult {
    schema: Schema,
    root: Box<dyn Executor>,
    done: bool,
}

impl QueryResult {
    /// Open the executor tree and wrap it as a result stream
    pub(crate) async fn open(schema: Schema, mut root: Box<dyn Executor>) -> ExecutorResult<Self> {
        root.open().await?;
        debug!(columns = schema.len(), "opened query result");
        Ok(QueryResult {
            schema,
            root,
            done: false,
        })
    }

    pub fn schema(&self) -> &Schema {
        &self.schema
    }

    /// Next row, or None once the stream is exhausted
    pub async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.done {
            return Ok(None);
        }
        let next = match self.root.next().await {
            Ok(next) => next,
            Err(e) => {
                self.done = true;
                if let Err(close_err) = self.root.close().await {
                    warn!(error = %close_err, "failed to close executor after error");
                }
                return Err(e);
            }
        };
        match next {
            Some(row) => {
                trace!(width = row.len(), "result row");
                Ok(Some(row))
            }
            None => {
                self.done = true;
                self.root.close().await?;
                debug!("query result exhausted");
                Ok(None)
            }
        }
    }

    /// Drain the remaining rows
    pub async fn collect(&mut self) -> ExecutorResult<Vec<Row>> {
        let mut rows = Vec::new();
        while let Some(row) = self.next().await? {
            rows.push(row);
        }
        Ok(rows)
    }

    /// Drain the remaining rows as CSV with a header of field names
    pub async fn to_csv(&mut self) -> ExecutorResult<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        writer.write_record(self.schema.fields().iter().map(|f| f.name.as_str()))?;
        while let Some(row) = self.next().await? {
            writer.write_record(row.iter().map(|d| d.to_string()))?;
        }
        let bytes = writer
            .into_inner()
            .map_err(|e| ExecutorError::Io(e.into_error()))?;
        String::from_utf8(bytes).map_err(|e| ExecutorError::Encoding(e.to_string()))
    }
}
