//! Limit executor
//!
//! Skips the first `skip` rows, then yields at most `fetch` rows.

use async_trait::async_trait;

use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

/// Limit executor
pub struct Limit {
    input: Box<dyn Executor>,
    skip: usize,
    /// Maximum rows to return (None = unlimited)
    fetch: Option<usize>,
    skipped: usize,
    returned: usize,
}

impl Limit {
    pub fn new(input: Box<dyn Executor>, skip: usize, fetch: Option<usize>) -> Self {
        Limit {
            input,
            skip,
            fetch,
            skipped: 0,
            returned: 0,
        }
    }
}

#[async_trait]
impl Executor for Limit {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.skipped = 0;
        self.returned = 0;
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.fetch.is_some_and(|fetch| self.returned >= fetch) {
            return Ok(None);
        }

        while let Some(row) = self.input.next().await? {
            if self.skipped < self.skip {
                self.skipped += 1;
                continue;
            }
            self.returned += 1;
            return Ok(Some(row));
        }
        Ok(None)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.input.close().await
    }
}
