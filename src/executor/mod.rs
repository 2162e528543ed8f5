//! Query executor - Volcano iterator model
//!
//! The executor takes a virtual plan and runs it using the Volcano
//! iterator model: each operator implements open/next/close methods and
//! rows are pulled lazily from the root.

pub mod datum;
pub mod distinct;
pub mod engine;
pub mod error;
pub mod eval;
pub mod filter;
pub mod limit;
pub mod project;
pub mod result;
pub mod row;
pub mod scan;
pub mod single_row;
pub mod sort;

#[cfg(test)]
mod mock;

pub use datum::Datum;
pub use engine::ExecutorEngine;
pub use error::{ExecutorError, ExecutorResult};
pub use result::QueryResult;
pub use row::Row;

use async_trait::async_trait;

/// Volcano-style iterator executor
///
/// Each operator implements:
/// - `open()`: Initialize the operator
/// - `next()`: Return the next row, or None if exhausted
/// - `close()`: Clean up resources
#[async_trait]
pub trait Executor: Send {
    /// Initialize the executor
    async fn open(&mut self) -> ExecutorResult<()>;

    /// Get the next row, or None if exhausted
    async fn next(&mut self) -> ExecutorResult<Option<Row>>;

    /// Close the executor and release resources
    async fn close(&mut self) -> ExecutorResult<()>;
}
