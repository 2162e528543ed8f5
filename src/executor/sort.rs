//! Sort executor
//!
//! Implements ORDER BY by collecting all rows, sorting them, then
//! emitting. The sort is stable, so rows with equal keys keep their
//! input order.

use std::cmp::Ordering;

use async_trait::async_trait;

use crate::planner::virtual_plan::SortKey;

use super::datum::Datum;
use super::error::ExecutorResult;
use super::eval::eval;
use super::row::Row;
use super::Executor;

/// Sort executor
pub struct Sort {
    input: Box<dyn Executor>,
    keys: Vec<SortKey>,
    /// Collected and sorted rows
    rows: Vec<Row>,
    position: usize,
}

impl Sort {
    pub fn new(input: Box<dyn Executor>, keys: Vec<SortKey>) -> Self {
        Sort {
            input,
            keys,
            rows: Vec::new(),
            position: 0,
        }
    }
}

/// Compare one key pair under a key's direction and NULL placement
fn compare_key(key: &SortKey, a: &Datum, b: &Datum) -> Ordering {
    match (a.is_null(), b.is_null()) {
        (true, true) => Ordering::Equal,
        (true, false) if key.nulls_first => Ordering::Less,
        (true, false) => Ordering::Greater,
        (false, true) if key.nulls_first => Ordering::Greater,
        (false, true) => Ordering::Less,
        (false, false) => {
            let ord = a.sql_cmp(b).unwrap_or_else(|| a.cmp(b));
            if key.asc {
                ord
            } else {
                ord.reverse()
            }
        }
    }
}

#[async_trait]
impl Executor for Sort {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.input.open().await?;

        // Evaluate sort keys up front; sort_by cannot propagate errors
        let mut keyed_rows: Vec<(Vec<Datum>, Row)> = Vec::new();
        while let Some(row) = self.input.next().await? {
            let values = self
                .keys
                .iter()
                .map(|key| eval(&key.expr, &row))
                .collect::<ExecutorResult<Vec<_>>>()?;
            keyed_rows.push((values, row));
        }

        let keys = &self.keys;
        keyed_rows.sort_by(|(a, _), (b, _)| {
            keys.iter()
                .zip(a.iter().zip(b.iter()))
                .map(|(key, (x, y))| compare_key(key, x, y))
                .find(|ord| *ord != Ordering::Equal)
                .unwrap_or(Ordering::Equal)
        });

        self.rows = keyed_rows.into_iter().map(|(_, row)| row).collect();
        self.position = 0;
        Ok(())
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        if self.position >= self.rows.len() {
            return Ok(None);
        }
        let row = std::mem::take(&mut self.rows[self.position]);
        self.position += 1;
        Ok(Some(row))
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.rows.clear();
        self.input.close().await
    }
}
