//! Executor engine
//!
//! Builds executor trees from virtual plans.

use crate::planner::virtual_plan::VirtualPlan;

use super::distinct::Distinct;
use super::filter::Filter;
use super::limit::Limit;
use super::project::Project;
use super::scan::TableScan;
use super::single_row::SingleRow;
use super::sort::Sort;
use super::Executor;

/// Executor engine - builds executors from virtual plans
pub struct ExecutorEngine;

impl ExecutorEngine {
    /// Build an unopened executor tree mirroring the plan
    pub fn build(plan: &VirtualPlan) -> Box<dyn Executor> {
        match plan {
            VirtualPlan::Scan {
                table,
                source,
                projection,
                ..
            } => Box::new(TableScan::new(
                table.clone(),
                source.clone(),
                projection.clone(),
            )),

            VirtualPlan::Projection { input, exprs, .. } => {
                Box::new(Project::new(Self::build(input), exprs.clone()))
            }

            VirtualPlan::Selection { input, expr } => {
                Box::new(Filter::new(Self::build(input), expr.clone()))
            }

            VirtualPlan::Sort { input, keys } => {
                Box::new(Sort::new(Self::build(input), keys.clone()))
            }

            VirtualPlan::Limit { input, skip, fetch } => {
                Box::new(Limit::new(Self::build(input), *skip, *fetch))
            }

            VirtualPlan::Distinct { input } => Box::new(Distinct::new(Self::build(input))),

            VirtualPlan::EmptyRelation => Box::new(SingleRow::new()),
        }
    }
}
