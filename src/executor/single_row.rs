//! Single row executor
//!
//! Source for queries without a FROM clause, such as `SELECT 1 + 1`.

use async_trait::async_trait;

use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

/// Yields exactly one row with no columns
#[derive(Default)]
pub struct SingleRow {
    returned: bool,
}

impl SingleRow {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Executor for SingleRow {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.returned = false;
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if std::mem::replace(&mut self.returned, true) {
            return Ok(None);
        }
        Ok(Some(Row::empty()))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        Ok(())
    }
}
