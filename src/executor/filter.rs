//! Filter executor
//!
//! Keeps rows whose predicate evaluates to true. False and NULL drop
//! the row; any non-boolean result is an evaluation error.

use async_trait::async_trait;

use crate::planner::virtual_plan::VirtualExpr;

use super::datum::Datum;
use super::error::{ExecutorError, ExecutorResult};
use super::eval::eval;
use super::row::Row;
use super::Executor;

/// Filter executor
pub struct Filter {
    input: Box<dyn Executor>,
    predicate: VirtualExpr,
}

impl Filter {
    /// Create a new filter executor
    pub fn new(input: Box<dyn Executor>, predicate: VirtualExpr) -> Self {
        Filter { input, predicate }
    }
}

#[async_trait]
impl Executor for Filter {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        while let Some(row) = self.input.next().await? {
            match eval(&self.predicate, &row)? {
                Datum::Bool(true) => return Ok(Some(row)),
                Datum::Bool(false) | Datum::Null => {}
                other => {
                    return Err(ExecutorError::Evaluation(format!(
                        "filter predicate produced {} instead of bool",
                        other.data_type()
                    )))
                }
            }
        }
        Ok(None)
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.input.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::{drain, first_ints, MockExecutor};
    use crate::planner::logical::Literal;
    use crate::planner::virtual_plan::VirtualBinaryOp;

    fn gt(value: i64) -> VirtualExpr {
        VirtualExpr::Binary {
            op: VirtualBinaryOp::Gt,
            left: Box::new(VirtualExpr::Column(0)),
            right: Box::new(VirtualExpr::Literal(Literal::Int(value))),
        }
    }

    #[tokio::test]
    async fn test_filter() {
        let mut filter = Filter::new(MockExecutor::ints(&[1, 2, 3]), gt(1));
        let rows = drain(&mut filter).await.unwrap();
        assert_eq!(first_ints(&rows), vec![Some(2), Some(3)]);
    }

    #[tokio::test]
    async fn test_filter_drops_null_results() {
        let input = MockExecutor::new(vec![
            Row::new(vec![Datum::Null]),
            Row::new(vec![Datum::Int(5)]),
        ]);
        let mut filter = Filter::new(input, gt(1));
        let rows = drain(&mut filter).await.unwrap();
        assert_eq!(first_ints(&rows), vec![Some(5)]);
    }

    #[tokio::test]
    async fn test_filter_rejects_non_boolean() {
        let mut filter = Filter::new(MockExecutor::ints(&[1]), VirtualExpr::Column(0));
        let result = drain(&mut filter).await;
        assert!(matches!(result, Err(ExecutorError::Evaluation(_))));
    }
}
