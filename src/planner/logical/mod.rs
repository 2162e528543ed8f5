//! Logical plan representation
//!
//! Logical plans describe what a query computes, independent of how it
//! is executed. Children are held behind `Arc` so rewrites can share
//! untouched subtrees.

pub mod builder;
pub mod expr;
pub mod function;

pub use builder::{normalize_exprs, LogicalPlanBuilder};
pub use expr::{
    col, conjunction, extract_columns, lit, normalize_expr, qualified_col, qualify_with_schemas,
    split_conjunction, ArithmeticOp, BoolOp, Column, Literal, LogicalExpr, UnaryOp,
};
pub use function::{AggregateKind, ScalarFunc};

use std::fmt;
use std::sync::Arc;

use crate::catalog::{Schema, TableRef};
use crate::datasource::{DataSource, Statistics};
use crate::planner::error::{PlannerError, PlannerResult};
use expr::join_exprs;

/// Join type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum JoinKind {
    Inner,
    Left,
    Right,
    Full,
    Cross,
}

/// Set operation type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SetOpKind {
    Union,
    Intersect,
    Except,
}

/// Logical plan node
#[derive(Debug, Clone)]
pub enum LogicalPlan {
    /// Produces a single row with no columns
    NoRelation,

    /// Read a data source
    Scan {
        table: TableRef,
        source: Arc<dyn DataSource>,
        /// Pushed-down predicate hints; the source may ignore them
        filter: Vec<LogicalExpr>,
        /// Source columns to read. Empty reads no columns.
        projection: Vec<String>,
    },

    Projection {
        input: Arc<LogicalPlan>,
        exprs: Vec<LogicalExpr>,
    },

    Filter {
        input: Arc<LogicalPlan>,
        predicate: LogicalExpr,
    },

    /// Output is the group-by fields followed by the aggregate fields
    Aggregate {
        input: Arc<LogicalPlan>,
        group_by: Vec<LogicalExpr>,
        aggregates: Vec<LogicalExpr>,
    },

    Limit {
        input: Arc<LogicalPlan>,
        skip: usize,
        fetch: Option<usize>,
    },

    /// Keys are `SortSpec` expressions
    Sort {
        input: Arc<LogicalPlan>,
        by: Vec<LogicalExpr>,
    },

    Join {
        left: Arc<LogicalPlan>,
        right: Arc<LogicalPlan>,
        kind: JoinKind,
        on: Option<LogicalExpr>,
    },

    /// Output takes the left input's schema
    SetOp {
        left: Arc<LogicalPlan>,
        right: Arc<LogicalPlan>,
        kind: SetOpKind,
    },

    /// Named derived table; re-tags its input's fields with the alias
    Subquery {
        input: Arc<LogicalPlan>,
        alias: String,
    },

    Distinct {
        input: Arc<LogicalPlan>,
    },
}

impl LogicalPlan {
    /// Node name as shown by EXPLAIN
    pub fn name(&self) -> &'static str {
        match self {
            LogicalPlan::NoRelation => "NoRelation",
            LogicalPlan::Scan { .. } => "Scan",
            LogicalPlan::Projection { .. } => "Projection",
            LogicalPlan::Filter { .. } => "Filter",
            LogicalPlan::Aggregate { .. } => "Aggregate",
            LogicalPlan::Limit { .. } => "Limit",
            LogicalPlan::Sort { .. } => "Sort",
            LogicalPlan::Join { .. } => "Join",
            LogicalPlan::SetOp { .. } => "SetOp",
            LogicalPlan::Subquery { .. } => "Subquery",
            LogicalPlan::Distinct { .. } => "Distinct",
        }
    }

    /// Output schema of this node
    pub fn schema(&self) -> PlannerResult<Schema> {
        match self {
            LogicalPlan::NoRelation => Ok(Schema::empty()),
            LogicalPlan::Scan {
                table,
                source,
                projection,
                ..
            } => Ok(source.schema().project(projection)?.with_relation(table)),
            LogicalPlan::Projection { input, exprs } => {
                let input_schema = input.schema()?;
                let fields = exprs
                    .iter()
                    .map(|e| e.resolve(&input_schema))
                    .collect::<PlannerResult<Vec<_>>>()?;
                Ok(Schema::new(fields))
            }
            LogicalPlan::Filter { input, .. }
            | LogicalPlan::Limit { input, .. }
            | LogicalPlan::Sort { input, .. }
            | LogicalPlan::Distinct { input } => input.schema(),
            LogicalPlan::Aggregate {
                input,
                group_by,
                aggregates,
            } => {
                let input_schema = input.schema()?;
                let fields = group_by
                    .iter()
                    .chain(aggregates)
                    .map(|e| e.resolve(&input_schema))
                    .collect::<PlannerResult<Vec<_>>>()?;
                Ok(Schema::new(fields))
            }
            LogicalPlan::Join { left, right, .. } => Ok(left.schema()?.join(&right.schema()?)),
            LogicalPlan::SetOp { left, .. } => left.schema(),
            LogicalPlan::Subquery { input, alias } => {
                Ok(input.schema()?.with_relation(&TableRef::bare(alias.clone())))
            }
        }
    }

    /// Child plans, left to right
    pub fn inputs(&self) -> Vec<&Arc<LogicalPlan>> {
        match self {
            LogicalPlan::NoRelation | LogicalPlan::Scan { .. } => vec![],
            LogicalPlan::Projection { input, .. }
            | LogicalPlan::Filter { input, .. }
            | LogicalPlan::Aggregate { input, .. }
            | LogicalPlan::Limit { input, .. }
            | LogicalPlan::Sort { input, .. }
            | LogicalPlan::Subquery { input, .. }
            | LogicalPlan::Distinct { input } => vec![input],
            LogicalPlan::Join { left, right, .. } | LogicalPlan::SetOp { left, right, .. } => {
                vec![left, right]
            }
        }
    }

    /// Expressions owned by this node (not its children)
    pub fn exprs(&self) -> Vec<&LogicalExpr> {
        match self {
            LogicalPlan::Scan { filter, .. } => filter.iter().collect(),
            LogicalPlan::Projection { exprs, .. } => exprs.iter().collect(),
            LogicalPlan::Filter { predicate, .. } => vec![predicate],
            LogicalPlan::Aggregate {
                group_by,
                aggregates,
                ..
            } => group_by.iter().chain(aggregates).collect(),
            LogicalPlan::Sort { by, .. } => by.iter().collect(),
            LogicalPlan::Join { on, .. } => on.iter().collect(),
            LogicalPlan::NoRelation
            | LogicalPlan::Limit { .. }
            | LogicalPlan::SetOp { .. }
            | LogicalPlan::Subquery { .. }
            | LogicalPlan::Distinct { .. } => vec![],
        }
    }

    /// Rebuild this node over new children, keeping its own attributes
    pub fn with_new_inputs(&self, inputs: Vec<Arc<LogicalPlan>>) -> PlannerResult<LogicalPlan> {
        let expected = self.inputs().len();
        if inputs.len() != expected {
            return Err(PlannerError::InvalidPlan(format!(
                "{} expects {} input(s), got {}",
                self.name(),
                expected,
                inputs.len()
            )));
        }
        let mut inputs = inputs.into_iter();
        let mut next = || inputs.next().unwrap_or_else(|| Arc::new(LogicalPlan::NoRelation));

        Ok(match self {
            LogicalPlan::NoRelation | LogicalPlan::Scan { .. } => self.clone(),
            LogicalPlan::Projection { exprs, .. } => LogicalPlan::Projection {
                input: next(),
                exprs: exprs.clone(),
            },
            LogicalPlan::Filter { predicate, .. } => LogicalPlan::Filter {
                input: next(),
                predicate: predicate.clone(),
            },
            LogicalPlan::Aggregate {
                group_by,
                aggregates,
                ..
            } => LogicalPlan::Aggregate {
                input: next(),
                group_by: group_by.clone(),
                aggregates: aggregates.clone(),
            },
            LogicalPlan::Limit { skip, fetch, .. } => LogicalPlan::Limit {
                input: next(),
                skip: *skip,
                fetch: *fetch,
            },
            LogicalPlan::Sort { by, .. } => LogicalPlan::Sort {
                input: next(),
                by: by.clone(),
            },
            LogicalPlan::Join { kind, on, .. } => LogicalPlan::Join {
                left: next(),
                right: next(),
                kind: *kind,
                on: on.clone(),
            },
            LogicalPlan::SetOp { kind, .. } => LogicalPlan::SetOp {
                left: next(),
                right: next(),
                kind: *kind,
            },
            LogicalPlan::Subquery { alias, .. } => LogicalPlan::Subquery {
                input: next(),
                alias: alias.clone(),
            },
            LogicalPlan::Distinct { .. } => LogicalPlan::Distinct { input: next() },
        })
    }

    /// Statistics of the rows this node produces.
    ///
    /// Scans report their source's statistics narrowed to the projected
    /// columns. Other nodes pass their first input's statistics through;
    /// `NoRelation` reports a single row.
    pub fn statistics(&self) -> Statistics {
        match self {
            LogicalPlan::NoRelation => Statistics::new(1, vec![]),
            LogicalPlan::Scan {
                source, projection, ..
            } => {
                let schema = source.schema();
                let indices: Vec<_> = projection
                    .iter()
                    .filter_map(|name| schema.index_of(None, name).ok())
                    .collect();
                source.statistics().project(&indices)
            }
            other => other
                .inputs()
                .first()
                .map(|input| input.statistics())
                .unwrap_or_default(),
        }
    }
}

impl fmt::Display for LogicalPlan {
    /// Single-line description of this node, without children
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            LogicalPlan::NoRelation => f.write_str("NoRelation"),
            LogicalPlan::Scan {
                table,
                filter,
                projection,
                ..
            } => {
                write!(f, "Scan: {}", table)?;
                if !filter.is_empty() {
                    write!(f, "; filter=[{}]", join_exprs(filter))?;
                }
                write!(f, "; projection=[{}]", projection.join(", "))
            }
            LogicalPlan::Projection { exprs, .. } => {
                write!(f, "Projection: {}", join_exprs(exprs))
            }
            LogicalPlan::Filter { predicate, .. } => write!(f, "Filter: {}", predicate),
            LogicalPlan::Aggregate {
                group_by,
                aggregates,
                ..
            } => write!(
                f,
                "Aggregate: group_by=[{}]; aggregates=[{}]",
                join_exprs(group_by),
                join_exprs(aggregates)
            ),
            LogicalPlan::Limit { skip, fetch, .. } => match fetch {
                Some(fetch) => write!(f, "Limit: skip={}, fetch={}", skip, fetch),
                None => write!(f, "Limit: skip={}, fetch=all", skip),
            },
            LogicalPlan::Sort { by, .. } => write!(f, "Sort: {}", join_exprs(by)),
            LogicalPlan::Join { kind, on, .. } => match on {
                Some(on) => write!(f, "Join: {:?} on {}", kind, on),
                None => write!(f, "Join: {:?}", kind),
            },
            LogicalPlan::SetOp { kind, .. } => write!(f, "SetOp: {:?}", kind),
            LogicalPlan::Subquery { alias, .. } => write!(f, "Subquery: {}", alias),
            LogicalPlan::Distinct { .. } => f.write_str("Distinct"),
        }
    }
}
