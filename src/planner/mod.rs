//! Query planner
//!
//! Turns SQL or hand-built plans into executable virtual plans.
//!
//! ## Pipeline
//!
//! ```text
//! SQL
//!   → QueryPlanner::plan_sql() → LogicalPlan
//!   → Optimizer::optimize() → LogicalPlan (optimized)
//!   → VirtualPlanner::to_plan() → VirtualPlan
//!   → VirtualPlan::execute() → QueryResult
//! ```
//!
//! `CostEstimator` scores logical plans at any point of the pipeline and
//! `Memo` holds equivalent alternatives for cost-based search.
//!
//! ## Example
//!
//! ```ignore
//! use plancraft::planner::{Optimizer, QueryPlanner, VirtualPlanner};
//!
//! let logical = QueryPlanner::new(&catalog).plan_sql("SELECT username FROM users")?;
//! let optimized = Optimizer::new().optimize(&logical)?;
//! let mut result = VirtualPlanner::to_plan(&optimized)?.execute().await?;
//! ```

pub mod config;
pub mod cost;
pub mod error;
pub mod explain;
pub mod logical;
pub mod memo;
pub mod optimizer;
pub mod query;
pub mod virtual_plan;

#[cfg(test)]
pub(crate) mod test_utils;

pub use config::PlannerConfig;
pub use cost::{estimate_cost, Cost, CostEstimator};
pub use error::{PlannerError, PlannerResult};
pub use explain::ExplainOutput;
pub use logical::{LogicalPlan, LogicalPlanBuilder};
pub use memo::{Group, GroupExpression, GroupId, Memo};
pub use optimizer::Optimizer;
pub use query::QueryPlanner;
pub use virtual_plan::{VirtualPlan, VirtualPlanner};
