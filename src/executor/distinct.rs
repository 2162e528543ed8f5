//! Distinct executor
//!
//! Removes duplicate rows, keeping the first occurrence of each.

use std::collections::HashSet;

use async_trait::async_trait;

use super::error::ExecutorResult;
use super::row::Row;
use super::Executor;

/// Hash-based distinct executor
///
/// Rows are compared with type-strict equality, so NULLs are equal to
/// each other and `1` differs from `1.0`.
pub struct Distinct {
    /// Input executor
    input: Box<dyn Executor>,
    /// Seen rows (for deduplication)
    seen: HashSet<Row>,
}

impl Distinct {
    /// Create a new distinct executor
    pub fn new(input: Box<dyn Executor>) -> Self {
        Distinct {
            input,
            seen: HashSet::new(),
        }
    }
}

#[async_trait]
impl Executor for Distinct {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.seen.clear();
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        loop {
            match self.input.next().await? {
                Some(row) => {
                    if self.seen.insert(row.clone()) {
                        return Ok(Some(row));
                    }
                }
                None => return Ok(None),
            }
        }
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.seen.clear();
        self.input.close().await
    }
}
