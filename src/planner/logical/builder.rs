//! Logical plan builder
//!
//! Fluent construction of logical plans:
//!
//! ```ignore
//! let plan = LogicalPlanBuilder::scan(TableRef::bare("users"), source)
//!     .filter(col("age").gt(lit(20i64)))
//!     .project(vec![col("username")])
//!     .build();
//! ```

use std::sync::Arc;

use super::expr::{normalize_expr, LogicalExpr};
use super::{JoinKind, LogicalPlan, SetOpKind};
use crate::catalog::TableRef;
use crate::datasource::DataSource;
use crate::planner::error::PlannerResult;

/// Builder for logical query plans
#[derive(Debug, Clone)]
pub struct LogicalPlanBuilder {
    plan: Arc<LogicalPlan>,
}

impl LogicalPlanBuilder {
    /// Continue building on top of an existing plan
    pub fn from(plan: impl Into<Arc<LogicalPlan>>) -> Self {
        LogicalPlanBuilder { plan: plan.into() }
    }

    /// Start from a scan reading every column of the source
    pub fn scan(table: TableRef, source: Arc<dyn DataSource>) -> Self {
        let projection = source.schema().field_names();
        Self::scan_with(table, source, vec![], projection)
    }

    /// Start from a scan with explicit filter hints and projection
    pub fn scan_with(
        table: TableRef,
        source: Arc<dyn DataSource>,
        filter: Vec<LogicalExpr>,
        projection: Vec<String>,
    ) -> Self {
        Self::from(LogicalPlan::Scan {
            table,
            source,
            filter,
            projection,
        })
    }

    /// Start from the single empty row used by FROM-less queries
    pub fn empty() -> Self {
        Self::from(LogicalPlan::NoRelation)
    }

    pub fn project(self, exprs: Vec<LogicalExpr>) -> Self {
        Self::from(LogicalPlan::Projection {
            input: self.plan,
            exprs,
        })
    }

    pub fn filter(self, predicate: LogicalExpr) -> Self {
        Self::from(LogicalPlan::Filter {
            input: self.plan,
            predicate,
        })
    }

    /// Group and aggregate, qualifying columns against the input
    pub fn aggregate(
        self,
        group_by: Vec<LogicalExpr>,
        aggregates: Vec<LogicalExpr>,
    ) -> PlannerResult<Self> {
        let group_by = normalize_exprs(group_by, &self.plan)?;
        let aggregates = normalize_exprs(aggregates, &self.plan)?;
        Ok(Self::from(LogicalPlan::Aggregate {
            input: self.plan,
            group_by,
            aggregates,
        }))
    }

    pub fn limit(self, skip: usize, fetch: Option<usize>) -> Self {
        Self::from(LogicalPlan::Limit {
            input: self.plan,
            skip,
            fetch,
        })
    }

    /// Sort by `SortSpec` keys, qualifying columns against the input
    pub fn sort(self, by: Vec<LogicalExpr>) -> PlannerResult<Self> {
        let by = normalize_exprs(by, &self.plan)?;
        Ok(Self::from(LogicalPlan::Sort {
            input: self.plan,
            by,
        }))
    }

    pub fn join(
        self,
        right: impl Into<Arc<LogicalPlan>>,
        kind: JoinKind,
        on: Option<LogicalExpr>,
    ) -> Self {
        Self::from(LogicalPlan::Join {
            left: self.plan,
            right: right.into(),
            kind,
            on,
        })
    }

    pub fn set_op(self, right: impl Into<Arc<LogicalPlan>>, kind: SetOpKind) -> Self {
        Self::from(LogicalPlan::SetOp {
            left: self.plan,
            right: right.into(),
            kind,
        })
    }

    pub fn subquery(self, alias: impl Into<String>) -> Self {
        Self::from(LogicalPlan::Subquery {
            input: self.plan,
            alias: alias.into(),
        })
    }

    pub fn distinct(self) -> Self {
        Self::from(LogicalPlan::Distinct { input: self.plan })
    }

    /// Current plan without consuming the builder
    pub fn plan(&self) -> &Arc<LogicalPlan> {
        &self.plan
    }

    pub fn build(self) -> Arc<LogicalPlan> {
        self.plan
    }
}

/// Qualify the unqualified columns of each expression against the
/// output schema of `plan`.
pub fn normalize_exprs(
    exprs: Vec<LogicalExpr>,
    plan: &LogicalPlan,
) -> PlannerResult<Vec<LogicalExpr>> {
    let schema = plan.schema()?;
    exprs
        .into_iter()
        .map(|e| normalize_expr(e, &schema))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::executor::Datum;
    use crate::planner::error::PlannerError;
    use crate::planner::logical::{col, lit, qualified_col, AggregateKind};
    use crate::planner::test_utils::{orders_source, users_source};

    fn users() -> LogicalPlanBuilder {
        LogicalPlanBuilder::scan(TableRef::bare("users"), users_source())
    }

    #[test]
    fn test_scan_reads_all_columns() {
        let plan = users().build();
        let schema = plan.schema().unwrap();
        assert_eq!(
            schema.field_names(),
            vec!["id", "username", "age", "state", "wallet"]
        );
        assert_eq!(schema.fields()[2].qualified_name(), "users.age");
    }

    #[test]
    fn test_projection_schema() {
        let plan = users()
            .filter(col("age").gt(lit(20i64)))
            .project(vec![col("username"), col("age").alias("years")])
            .build();
        let schema = plan.schema().unwrap();
        assert_eq!(schema.fields()[0].qualified_name(), "users.username");
        assert_eq!(schema.fields()[1].qualified_name(), "years");
    }

    #[test]
    fn test_aggregate_schema_order() {
        let plan = users()
            .aggregate(
                vec![col("state")],
                vec![LogicalExpr::aggregate(AggregateKind::Count, col("id"))],
            )
            .unwrap()
            .build();
        let names: Vec<_> = plan
            .schema()
            .unwrap()
            .fields()
            .iter()
            .map(|f| f.qualified_name())
            .collect();
        assert_eq!(names, vec!["users.state", "COUNT(users.id)"]);
    }

    #[test]
    fn test_join_and_set_op_schemas() {
        let orders = LogicalPlanBuilder::scan(TableRef::bare("orders"), orders_source()).build();
        let join = users()
            .join(
                orders.clone(),
                JoinKind::Inner,
                Some(qualified_col("users", "id").eq(qualified_col("orders", "user_id"))),
            )
            .build();
        assert_eq!(join.schema().unwrap().len(), 8);

        let union = users()
            .project(vec![col("id")])
            .set_op(
                LogicalPlanBuilder::from(orders).project(vec![col("id")]).build(),
                SetOpKind::Union,
            )
            .build();
        assert_eq!(
            union.schema().unwrap().fields()[0].qualified_name(),
            "users.id"
        );
    }

    #[test]
    fn test_subquery_retags_fields() {
        let plan = users()
            .project(vec![col("username")])
            .subquery("u")
            .project(vec![qualified_col("u", "username")])
            .build();
        let schema = plan.schema().unwrap();
        assert_eq!(schema.fields()[0].qualified_name(), "u.username");
    }

    #[test]
    fn test_sort_normalizes_keys() {
        let plan = users().sort(vec![col("age").sort(true, false)]).unwrap().build();
        match plan.as_ref() {
            LogicalPlan::Sort { by, .. } => assert_eq!(by[0].to_string(), "users.age ASC NULLS LAST"),
            other => panic!("expected sort, got {}", other),
        }

        let err = users().sort(vec![col("nope").sort(true, false)]).unwrap_err();
        assert!(matches!(err, PlannerError::UnknownColumn(_)));
    }

    #[test]
    fn test_empty_projection_scan() {
        let plan = LogicalPlanBuilder::scan_with(TableRef::bare("users"), users_source(), vec![], vec![]).build();
        assert!(plan.schema().unwrap().is_empty());
    }

    #[test]
    fn test_no_relation() {
        let plan = LogicalPlanBuilder::empty().project(vec![lit(1i64)]).build();
        assert_eq!(plan.schema().unwrap().field_names(), vec!["1"]);
        assert_eq!(plan.statistics().row_count, 1);
    }

    #[test]
    fn test_statistics_pass_through_projection_and_filter() {
        let source = users_source();
        let plan = LogicalPlanBuilder::scan(TableRef::bare("users"), source.clone())
            .filter(col("age").gt(lit(20i64)))
            .project(vec![col("username")])
            .build();
        let stats = plan.statistics();
        assert_eq!(stats.row_count, 5);
        assert_eq!(stats, source.statistics());
    }

    #[test]
    fn test_scan_statistics_follow_projection_order() {
        let source = users_source();
        let full = source.statistics();
        let plan = LogicalPlanBuilder::scan_with(
            TableRef::bare("users"),
            source,
            vec![],
            vec!["age".to_string(), "username".to_string()],
        )
        .build();

        let stats = plan.statistics();
        assert_eq!(stats.row_count, 5);
        assert_eq!(stats.column_stats.len(), 2);
        assert_eq!(stats.column_stats[0], full.column_stats[2]);
        assert_eq!(stats.column_stats[1], full.column_stats[1]);
        assert_eq!(stats.column_stats[0].min, Some(Datum::Int(19)));
        assert_eq!(stats.column_stats[1].max, Some(Datum::Text("Eve".to_string())));
    }
}
