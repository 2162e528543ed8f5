//! Optimization rules
//!
//! Rules rewrite a logical plan into an equivalent one. Rewritten nodes
//! are fresh allocations; the input plan is never modified.

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::planner::error::{PlannerError, PlannerResult};
use crate::planner::logical::{
    conjunction, extract_columns, split_conjunction, Column, LogicalExpr, LogicalPlan,
};

/// Optimization rule trait
pub trait OptimizationRule: Send + Sync {
    /// Rule name for debugging
    fn name(&self) -> &'static str;

    /// Apply the rule to a logical plan
    fn apply(&self, plan: &Arc<LogicalPlan>) -> PlannerResult<Arc<LogicalPlan>>;
}

/// Narrow every scan to the source columns referenced above it
pub struct ProjectionPushdown;

impl OptimizationRule for ProjectionPushdown {
    fn name(&self) -> &'static str {
        "projection_pushdown"
    }

    fn apply(&self, plan: &Arc<LogicalPlan>) -> PlannerResult<Arc<LogicalPlan>> {
        // Qualified root outputs must survive even when the root node
        // itself references nothing (e.g. a bare scan).
        let mut seen: BTreeSet<Column> = plan
            .schema()?
            .fields()
            .iter()
            .filter(|f| f.relation.is_some())
            .map(Column::from_field)
            .collect();
        self.push_down(plan, &mut seen)
    }
}

impl ProjectionPushdown {
    fn push_down(
        &self,
        plan: &LogicalPlan,
        seen: &mut BTreeSet<Column>,
    ) -> PlannerResult<Arc<LogicalPlan>> {
        for expr in plan.exprs() {
            extract_columns(expr, seen);
        }

        match plan {
            LogicalPlan::Scan {
                table,
                source,
                filter,
                projection: old,
            } => {
                let schema = source.schema();
                let projection: BTreeSet<String> = seen
                    .iter()
                    .filter(|c| c.relation.as_ref().map_or(true, |r| r.matches(table)))
                    .filter(|c| schema.fields().iter().any(|f| f.name == c.name))
                    .map(|c| c.name.clone())
                    .collect();
                let projection: Vec<String> = projection.into_iter().collect();
                debug!(table = %table, before = old.len(), after = projection.len(), "narrowed scan");
                Ok(Arc::new(LogicalPlan::Scan {
                    table: table.clone(),
                    source: source.clone(),
                    filter: filter.clone(),
                    projection,
                }))
            }
            LogicalPlan::Subquery { alias, .. } => {
                // References through the alias name inner columns unqualified
                let through: Vec<Column> = seen
                    .iter()
                    .filter(|c| c.relation.as_ref().is_some_and(|r| r.table == *alias))
                    .map(|c| Column::unqualified(c.name.clone()))
                    .collect();
                seen.extend(through);
                self.rebuild(plan, seen)
            }
            other => self.rebuild(other, seen),
        }
    }

    fn rebuild(
        &self,
        plan: &LogicalPlan,
        seen: &mut BTreeSet<Column>,
    ) -> PlannerResult<Arc<LogicalPlan>> {
        let inputs = plan
            .inputs()
            .into_iter()
            .map(|input| self.push_down(input, seen))
            .collect::<PlannerResult<Vec<_>>>()?;
        Ok(Arc::new(plan.with_new_inputs(inputs)?))
    }
}

/// Copy filter conjuncts into the scan directly beneath them.
///
/// The filter stays in place: sources treat pushed predicates as hints.
/// Stacked filters are merged first. A filter over any other node is
/// outside what this rule handles.
pub struct PredicatePushdown;

impl OptimizationRule for PredicatePushdown {
    fn name(&self) -> &'static str {
        "predicate_pushdown"
    }

    fn apply(&self, plan: &Arc<LogicalPlan>) -> PlannerResult<Arc<LogicalPlan>> {
        self.push_down(plan)
    }
}

impl PredicatePushdown {
    fn push_down(&self, plan: &Arc<LogicalPlan>) -> PlannerResult<Arc<LogicalPlan>> {
        match plan.as_ref() {
            LogicalPlan::Filter { input, predicate } => self.push_filter(input, predicate, false),
            other => {
                let inputs = other
                    .inputs()
                    .into_iter()
                    .map(|input| self.push_down(input))
                    .collect::<PlannerResult<Vec<_>>>()?;
                Ok(Arc::new(other.with_new_inputs(inputs)?))
            }
        }
    }

    /// Push `predicate` into the scan below it. The Filter keeps the
    /// predicate as given; merged nested filters attach deduplicated hints.
    fn push_filter(
        &self,
        input: &Arc<LogicalPlan>,
        predicate: &LogicalExpr,
        merged: bool,
    ) -> PlannerResult<Arc<LogicalPlan>> {
        match input.as_ref() {
            LogicalPlan::Scan {
                table,
                source,
                filter,
                projection,
            } => {
                let mut conjuncts = split_conjunction(predicate);
                if merged {
                    conjuncts = dedup(conjuncts);
                }
                let mut pushed = filter.clone();
                pushed.extend(conjuncts.into_iter().filter(|c| !filter.contains(c)));
                debug!(table = %table, conjuncts = pushed.len(), "pushed predicate into scan");

                let scan = Arc::new(LogicalPlan::Scan {
                    table: table.clone(),
                    source: source.clone(),
                    filter: pushed,
                    projection: projection.clone(),
                });
                Ok(Arc::new(LogicalPlan::Filter {
                    input: scan,
                    predicate: predicate.clone(),
                }))
            }
            LogicalPlan::Filter {
                input: inner,
                predicate: inner_predicate,
            } => {
                let mut conjuncts = split_conjunction(predicate);
                conjuncts.extend(split_conjunction(inner_predicate));
                let combined = conjunction(conjuncts)
                    .ok_or_else(|| PlannerError::InvalidPlan("empty filter predicate".into()))?;
                self.push_filter(inner, &combined, true)
            }
            other => Err(PlannerError::NotImplemented(format!(
                "predicate pushdown through {}",
                other.name()
            ))),
        }
    }
}

/// Drop repeated expressions, keeping first occurrences in order
fn dedup(exprs: Vec<LogicalExpr>) -> Vec<LogicalExpr> {
    let mut out: Vec<LogicalExpr> = Vec::with_capacity(exprs.len());
    for e in exprs {
        if !out.contains(&e) {
            out.push(e);
        }
    }
    out
}
