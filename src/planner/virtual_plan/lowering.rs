//! Lowering from logical to virtual plans
//!
//! Column references are resolved to positions in the input node's
//! schema. Aggregation, joins and set operations have no executable
//! form yet and fail with `NotImplemented`.

use std::sync::Arc;

use tracing::debug;

use super::{SortKey, VirtualExpr, VirtualPlan};
use crate::catalog::Schema;
use crate::planner::error::{PlannerError, PlannerResult};
use crate::planner::logical::{LogicalExpr, LogicalPlan, ScalarFunc};

/// Lowers logical plans and expressions to their virtual form
pub struct VirtualPlanner;

impl VirtualPlanner {
    /// Lower a logical plan
    pub fn to_plan(plan: &LogicalPlan) -> PlannerResult<Arc<VirtualPlan>> {
        let lowered = match plan {
            LogicalPlan::Scan {
                table,
                source,
                projection,
                ..
            } => VirtualPlan::Scan {
                table: table.clone(),
                source: source.clone(),
                projection: projection.clone(),
                schema: plan.schema()?,
            },
            LogicalPlan::Projection { input, exprs } => {
                let input_schema = input.schema()?;
                let exprs = exprs
                    .iter()
                    .map(|e| Self::lower_expr(e, &input_schema))
                    .collect::<PlannerResult<Vec<_>>>()?;
                VirtualPlan::Projection {
                    input: Self::to_plan(input)?,
                    schema: plan.schema()?,
                    exprs,
                }
            }
            LogicalPlan::Filter { input, predicate } => VirtualPlan::Selection {
                expr: Self::to_expr(predicate, input)?,
                input: Self::to_plan(input)?,
            },
            LogicalPlan::Sort { input, by } => {
                let input_schema = input.schema()?;
                let keys = by
                    .iter()
                    .map(|e| Self::lower_sort_key(e, &input_schema))
                    .collect::<PlannerResult<Vec<_>>>()?;
                VirtualPlan::Sort {
                    input: Self::to_plan(input)?,
                    keys,
                }
            }
            LogicalPlan::Limit { input, skip, fetch } => VirtualPlan::Limit {
                input: Self::to_plan(input)?,
                skip: *skip,
                fetch: *fetch,
            },
            LogicalPlan::Distinct { input } => VirtualPlan::Distinct {
                input: Self::to_plan(input)?,
            },
            // Alias only renames fields; positions are unchanged
            LogicalPlan::Subquery { input, .. } => return Self::to_plan(input),
            LogicalPlan::NoRelation => VirtualPlan::EmptyRelation,
            LogicalPlan::Aggregate { .. } | LogicalPlan::Join { .. } | LogicalPlan::SetOp { .. } => {
                return Err(PlannerError::NotImplemented(format!(
                    "lowering {} to a virtual plan",
                    plan.name()
                )))
            }
        };
        debug!(node = lowered.name(), "lowered plan node");
        Ok(Arc::new(lowered))
    }

    /// Lower an expression evaluated over the output of `input`
    pub fn to_expr(expr: &LogicalExpr, input: &LogicalPlan) -> PlannerResult<VirtualExpr> {
        Self::lower_expr(expr, &input.schema()?)
    }

    fn lower_expr(expr: &LogicalExpr, schema: &Schema) -> PlannerResult<VirtualExpr> {
        let lower = |e: &LogicalExpr| Self::lower_expr(e, schema).map(Box::new);
        match expr {
            LogicalExpr::Column(c) => Ok(VirtualExpr::Column(
                schema.index_of(c.relation.as_ref(), &c.name)?,
            )),
            LogicalExpr::ColumnIndex(i) => {
                if *i < schema.len() {
                    Ok(VirtualExpr::Column(*i))
                } else {
                    Err(PlannerError::UnknownColumn(format!("#{}", i)))
                }
            }
            LogicalExpr::Literal(l) => Ok(VirtualExpr::Literal(l.clone())),
            LogicalExpr::Alias { expr, .. } => Self::lower_expr(expr, schema),
            LogicalExpr::Unary { op, expr } => Ok(VirtualExpr::Unary {
                op: *op,
                expr: lower(expr)?,
            }),
            LogicalExpr::BoolBinary { op, left, right } => Ok(VirtualExpr::Binary {
                op: (*op).into(),
                left: lower(left)?,
                right: lower(right)?,
            }),
            LogicalExpr::ArithmeticBinary { op, left, right } => Ok(VirtualExpr::Binary {
                op: (*op).into(),
                left: lower(left)?,
                right: lower(right)?,
            }),
            LogicalExpr::ScalarFunction { name, args } => {
                let func = ScalarFunc::from_name(name).ok_or_else(|| {
                    PlannerError::UnsupportedExpression(format!("unknown function {}", name))
                })?;
                let args = args
                    .iter()
                    .map(|a| Self::lower_expr(a, schema))
                    .collect::<PlannerResult<Vec<_>>>()?;
                Ok(VirtualExpr::Function { func, args })
            }
            LogicalExpr::Aggregate { .. }
            | LogicalExpr::AggregateFunction { .. }
            | LogicalExpr::SortSpec { .. } => {
                Err(PlannerError::UnsupportedExpression(expr.to_string()))
            }
        }
    }

    /// Bare expressions sort ascending with NULLs last
    fn lower_sort_key(expr: &LogicalExpr, schema: &Schema) -> PlannerResult<SortKey> {
        match expr {
            LogicalExpr::SortSpec {
                expr,
                asc,
                nulls_first,
            } => Ok(SortKey {
                expr: Self::lower_expr(expr, schema)?,
                asc: *asc,
                nulls_first: *nulls_first,
            }),
            other => Ok(SortKey {
                expr: Self::lower_expr(other, schema)?,
                asc: true,
                nulls_first: false,
            }),
        }
    }
}
