//! Project executor
//!
//! Evaluates output expressions against each input row.

use async_trait::async_trait;

use crate::planner::virtual_plan::VirtualExpr;

use super::error::ExecutorResult;
use super::eval::eval;
use super::row::Row;
use super::Executor;

/// Project executor
pub struct Project {
    input: Box<dyn Executor>,
    exprs: Vec<VirtualExpr>,
}

impl Project {
    pub fn new(input: Box<dyn Executor>, exprs: Vec<VirtualExpr>) -> Self {
        Project { input, exprs }
    }
}

#[async_trait]
impl Executor for Project {
    async fn open(&mut self) -> ExecutorResult<()> {
        self.input.open().await
    }

    async fn next(&mut self) -> ExecutorResult<Option<Row>> {
        match self.input.next().await? {
            Some(row) => {
                let values = self
                    .exprs
                    .iter()
                    .map(|expr| eval(expr, &row))
                    .collect::<ExecutorResult<Vec<_>>>()?;
                Ok(Some(Row::new(values)))
            }
            None => Ok(None),
        }
    }

    async fn close(&mut self) -> ExecutorResult<()> {
        self.input.close().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::mock::{drain, MockExecutor};
    use crate::executor::Datum;
    use crate::planner::logical::Literal;
    use crate::planner::virtual_plan::VirtualBinaryOp;

    #[tokio::test]
    async fn test_project_reorders_and_computes() {
        let input = MockExecutor::new(vec![Row::new(vec![Datum::Int(1), Datum::Text("a".into())])]);
        let exprs = vec![
            VirtualExpr::Column(1),
            VirtualExpr::Binary {
                op: VirtualBinaryOp::Mul,
                left: Box::new(VirtualExpr::Column(0)),
                right: Box::new(VirtualExpr::Literal(Literal::Int(10))),
            },
        ];
        let mut project = Project::new(input, exprs);
        let rows = drain(&mut project).await.unwrap();
        assert_eq!(rows, vec![Row::new(vec![Datum::Text("a".into()), Datum::Int(10)])]);
    }

    #[tokio::test]
    async fn test_project_no_columns() {
        let mut project = Project::new(MockExecutor::ints(&[1, 2]), vec![]);
        let rows = drain(&mut project).await.unwrap();
        assert_eq!(rows, vec![Row::empty(), Row::empty()]);
    }
}
