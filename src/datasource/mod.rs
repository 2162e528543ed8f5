//! Data sources
//!
//! A data source exposes a schema, statistics, and a pull-based scan over
//! a subset of its columns. Sources are shared by plans through `Arc`.

pub mod csv;
pub mod memory;

pub use self::csv::CsvDataSource;
pub use self::memory::MemoryDataSource;

use std::fmt;

use async_trait::async_trait;

use crate::catalog::Schema;
use crate::executor::{Datum, ExecutorResult, Row};

/// Per-column statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnStatistics {
    pub null_count: u64,
    pub min: Option<Datum>,
    pub max: Option<Datum>,
    pub distinct_count: u64,
}

/// Table-level statistics
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Statistics {
    pub row_count: u64,
    /// One entry per schema field, or empty when unknown
    pub column_stats: Vec<ColumnStatistics>,
}

impl Statistics {
    pub fn new(row_count: u64, column_stats: Vec<ColumnStatistics>) -> Self {
        Statistics {
            row_count,
            column_stats,
        }
    }

    /// Statistics for a source that knows nothing about itself
    pub fn unknown() -> Self {
        Self::default()
    }

    /// Keep the column statistics at the given positions.
    ///
    /// Positions without statistics are dropped; the row count is kept.
    pub fn project(&self, indices: &[usize]) -> Statistics {
        let column_stats = indices
            .iter()
            .filter_map(|&i| self.column_stats.get(i).cloned())
            .collect();
        Statistics {
            row_count: self.row_count,
            column_stats,
        }
    }
}

/// Pull-based stream of rows produced by a scan
#[async_trait]
pub trait ScanStream: Send {
    /// Next row, or None once the scan is exhausted
    async fn next_row(&mut self) -> ExecutorResult<Option<Row>>;
}

/// Abstract provider of rows
#[async_trait]
pub trait DataSource: fmt::Debug + Send + Sync {
    /// Full schema of the source
    fn schema(&self) -> Schema;

    fn statistics(&self) -> Statistics;

    /// Scan the named columns, in the order given.
    ///
    /// An empty projection yields rows with no columns.
    async fn scan(&self, projection: &[String]) -> ExecutorResult<Box<dyn ScanStream>>;
}
