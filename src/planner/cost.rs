//! Cost model for logical plans
//!
//! Costs are abstract units summed bottom-up over the plan tree. Scans
//! pay per row of their source, projections per output expression, and
//! filters per unit of predicate complexity. Other nodes are free.

use crate::catalog::Schema;
use crate::planner::config::{PlannerConfig, PROJECTION_COST, SEQ_SCAN_ROW_COST};
use crate::planner::logical::{ArithmeticOp, LogicalExpr, LogicalPlan};

/// Expression cost of a multiplication or division
const MUL_DIV_COST: u64 = 2;

/// Expression cost of an addition or subtraction
const ADD_SUB_COST: u64 = 1;

/// Expression cost of an aggregate
const AGGREGATE_COST: u64 = 8;

/// Cost estimate for a plan
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cost {
    /// Estimated number of rows produced
    pub rows: u64,
    /// Cumulative cost of the subtree
    pub total: u64,
}

/// Cost estimator for logical plans
#[derive(Debug, Clone)]
pub struct CostEstimator {
    seq_scan_row_cost: u64,
    projection_cost: u64,
}

impl Default for CostEstimator {
    fn default() -> Self {
        Self::new()
    }
}

impl CostEstimator {
    pub fn new() -> Self {
        Self {
            seq_scan_row_cost: SEQ_SCAN_ROW_COST,
            projection_cost: PROJECTION_COST,
        }
    }

    pub fn with_config(config: &PlannerConfig) -> Self {
        Self {
            seq_scan_row_cost: config.seq_scan_row_cost,
            projection_cost: config.projection_cost,
        }
    }

    /// Total cost of a plan
    pub fn estimate_cost(&self, plan: &LogicalPlan) -> u64 {
        self.estimate(plan).total
    }

    /// Row and cost estimate of a plan
    pub fn estimate(&self, plan: &LogicalPlan) -> Cost {
        let children: Vec<Cost> = plan.inputs().iter().map(|i| self.estimate(i)).collect();
        let child_total = children
            .iter()
            .fold(0u64, |acc, c| acc.saturating_add(c.total));

        let rows = match plan {
            LogicalPlan::Scan { source, .. } => source.statistics().row_count,
            LogicalPlan::NoRelation => 1,
            _ => children.first().map_or(0, |c| c.rows),
        };

        let local = match plan {
            LogicalPlan::Scan { .. } => rows.saturating_mul(self.seq_scan_row_cost),
            LogicalPlan::Projection { exprs, .. } => {
                self.projection_cost.saturating_mul(exprs.len() as u64)
            }
            LogicalPlan::Filter { input, predicate } => {
                let schema = input.schema().ok();
                Self::expr_cost(predicate, schema.as_ref())
            }
            _ => 0,
        };

        Cost {
            rows,
            total: child_total.saturating_add(local),
        }
    }

    /// Cost of evaluating an expression once.
    ///
    /// Columns cost 1 when they resolve in `schema` and nothing otherwise.
    pub fn expr_cost(expr: &LogicalExpr, schema: Option<&Schema>) -> u64 {
        let children = || {
            expr.children()
                .into_iter()
                .fold(0u64, |acc, c| acc.saturating_add(Self::expr_cost(c, schema)))
        };
        match expr {
            LogicalExpr::Literal(_) => 0,
            LogicalExpr::Column(c) => match schema {
                Some(s) if s.contains(c.relation.as_ref(), &c.name) => 1,
                _ => 0,
            },
            LogicalExpr::ColumnIndex(i) => match schema {
                Some(s) if *i < s.len() => 1,
                _ => 0,
            },
            LogicalExpr::ArithmeticBinary { op, .. } => {
                let op_cost = match op {
                    ArithmeticOp::Add | ArithmeticOp::Sub => ADD_SUB_COST,
                    ArithmeticOp::Mul | ArithmeticOp::Div => MUL_DIV_COST,
                };
                children().saturating_add(op_cost)
            }
            LogicalExpr::Aggregate { .. } | LogicalExpr::AggregateFunction { .. } => {
                children().saturating_add(AGGREGATE_COST)
            }
            LogicalExpr::Alias { .. }
            | LogicalExpr::Unary { .. }
            | LogicalExpr::BoolBinary { .. }
            | LogicalExpr::SortSpec { .. }
            | LogicalExpr::ScalarFunction { .. } => children(),
        }
    }
}

/// Estimate the total cost of a plan with the default cost constants
pub fn estimate_cost(plan: &LogicalPlan) -> u64 {
    CostEstimator::new().estimate_cost(plan)
}
