//! EXPLAIN output formatting
//!
//! Renders plans as indented trees, one node per line, each child two
//! spaces deeper than its parent.

use std::fmt::Write;

use crate::planner::logical::LogicalPlan;
use crate::planner::virtual_plan::VirtualPlan;

/// Format plans for EXPLAIN output
pub struct ExplainOutput;

impl ExplainOutput {
    /// Format a logical plan as a string
    pub fn format_logical(plan: &LogicalPlan) -> String {
        let mut output = String::new();
        Self::format_logical_node(plan, 0, &mut output);
        output
    }

    /// Format a virtual plan as a string
    pub fn format_virtual(plan: &VirtualPlan) -> String {
        let mut output = String::new();
        Self::format_virtual_node(plan, 0, &mut output);
        output
    }

    fn format_logical_node(plan: &LogicalPlan, indent: usize, out: &mut String) {
        // Writing to a String cannot fail
        let _ = writeln!(out, "{}{}", "  ".repeat(indent), plan);
        for input in plan.inputs() {
            Self::format_logical_node(input, indent + 1, out);
        }
    }

    fn format_virtual_node(plan: &VirtualPlan, indent: usize, out: &mut String) {
        let _ = writeln!(out, "{}{}", "  ".repeat(indent), plan);
        for input in plan.inputs() {
            Self::format_virtual_node(input, indent + 1, out);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableRef;
    use crate::planner::logical::{col, lit, qualified_col, JoinKind, LogicalPlanBuilder};
    use crate::planner::test_utils::{orders_source, users_source};
    use crate::planner::virtual_plan::VirtualPlanner;

    #[test]
    fn test_format_logical() {
        let orders = LogicalPlanBuilder::scan(TableRef::bare("orders"), orders_source()).build();
        let plan = LogicalPlanBuilder::scan(TableRef::bare("users"), users_source())
            .join(
                orders,
                JoinKind::Inner,
                Some(qualified_col("users", "id").eq(qualified_col("orders", "user_id"))),
            )
            .limit(0, Some(10))
            .build();

        let expected = "\
Limit: skip=0, fetch=10
  Join: Inner on users.id = orders.user_id
    Scan: users; projection=[id, username, age, state, wallet]
    Scan: orders; projection=[id, user_id, total]
";
        assert_eq!(ExplainOutput::format_logical(&plan), expected);
    }

    #[test]
    fn test_format_virtual() {
        let plan = LogicalPlanBuilder::scan(TableRef::bare("users"), users_source())
            .filter(col("age").gt(lit(20i64)))
            .project(vec![col("username")])
            .build();
        let lowered = VirtualPlanner::to_plan(&plan).unwrap();

        let expected = "\
VProjection: #1 AS username
  VSelection: (#2 > 20)
    VScan: users; projection=[id, username, age, state, wallet]
";
        assert_eq!(ExplainOutput::format_virtual(&lowered), expected);
    }
}
