//! Query optimizer
//!
//! Applies optimization rules to logical plans. The default sequence
//! pushes predicates into scans and then narrows each scan's projection.

pub mod rules;

pub use rules::{OptimizationRule, PredicatePushdown, ProjectionPushdown};

use std::sync::Arc;

use tracing::{debug, trace};

use crate::planner::config::PlannerConfig;
use crate::planner::error::PlannerResult;
use crate::planner::explain::ExplainOutput;
use crate::planner::logical::LogicalPlan;

/// Query optimizer that applies a sequence of optimization rules
pub struct Optimizer {
    rules: Vec<Box<dyn OptimizationRule>>,
}

impl Default for Optimizer {
    fn default() -> Self {
        Self::new()
    }
}

impl Optimizer {
    /// Create a new optimizer with default rules
    pub fn new() -> Self {
        Self::from_config(&PlannerConfig::default())
    }

    /// Create an optimizer with the rules enabled in `config`
    pub fn from_config(config: &PlannerConfig) -> Self {
        let mut rules: Vec<Box<dyn OptimizationRule>> = Vec::new();
        if config.predicate_pushdown {
            rules.push(Box::new(PredicatePushdown));
        }
        if config.projection_pushdown {
            rules.push(Box::new(ProjectionPushdown));
        }
        Self { rules }
    }

    /// Create an optimizer with custom rules
    pub fn with_rules(rules: Vec<Box<dyn OptimizationRule>>) -> Self {
        Self { rules }
    }

    /// Optimize a logical plan by applying all rules in order
    pub fn optimize(&self, plan: &Arc<LogicalPlan>) -> PlannerResult<Arc<LogicalPlan>> {
        let mut current = plan.clone();
        for rule in &self.rules {
            debug!(rule = rule.name(), "applying optimization rule");
            current = rule.apply(&current)?;
            trace!(rule = rule.name(), plan = %ExplainOutput::format_logical(&current), "rule applied");
        }
        Ok(current)
    }

    /// Get the names of all optimization rules
    pub fn rule_names(&self) -> Vec<&'static str> {
        self.rules.iter().map(|r| r.name()).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableRef;
    use crate::planner::logical::{col, lit, LogicalPlanBuilder};
    use crate::planner::test_utils::users_source;

    #[test]
    fn test_default_rule_order() {
        assert_eq!(
            Optimizer::new().rule_names(),
            vec!["predicate_pushdown", "projection_pushdown"]
        );
    }

    #[test]
    fn test_rules_follow_config() {
        let config = PlannerConfig::new().with_predicate_pushdown(false);
        assert_eq!(
            Optimizer::from_config(&config).rule_names(),
            vec!["projection_pushdown"]
        );
        assert!(Optimizer::with_rules(vec![]).rule_names().is_empty());
    }

    #[test]
    fn test_optimizer_pushes_filter_and_projection() {
        let plan = LogicalPlanBuilder::scan(TableRef::bare("users"), users_source())
            .filter(col("age").gt(lit(20i64)))
            .project(vec![col("username")])
            .build();
        let optimized = Optimizer::new().optimize(&plan).unwrap();

        assert_eq!(
            ExplainOutput::format_logical(&optimized),
            "Projection: username\n  Filter: age > 20\n    Scan: users; filter=[age > 20]; projection=[age, username]\n"
        );
    }
}
