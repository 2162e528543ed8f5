//! Mock executor for operator tests

use async_trait::async_trait;

use super::error::ExecutorResult;
use super::row::Row;
use super::{Datum, Executor};

/// Replays a fixed list of rows
pub struct MockExecutor {
    rows: Vec<Row>,
    position: usize,
}

impl MockExecutor {
    pub fn new(rows: Vec<Row>) -> Box<Self> {
        Box::new(MockExecutor { rows, position: 0 })
    }

    /// One single-column row per integer
    pub fn ints(values: &[i64]) -> Box<Self> {
        Self::new(
            values
                .iter()
                .map(|v| Row::new(vec![Datum::Int(*v)]))
                .collect(),
        )
    }
}

#[async_trait]
impl Executor for MockExecutor {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.position = 0;
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.position >= self.rows.len() {
            return Ok(None);
        }
        let row = self.rows[self.position].clone();
        self.position += 1;
        Ok(Some(row))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        Ok(())
    }
}

/// Drain an executor through its full open/next/close cycle
pub async fn drain(executor: &mut dyn Executor) -> ExecutorResult<Vec<Row>> {
    executor.open().await?;
    let mut rows = Vec::new();
    while let Some(row) = executor.next().await? {
        rows.push(row);
    }
    executor.close().await?;
    Ok(rows)
}

/// First column of each row as an integer
pub fn first_ints(rows: &[Row]) -> Vec<Option<i64>> {
    rows.iter()
        .map(|r| r.values().first().and_then(|d| d.as_int()))
        .collect()
}
