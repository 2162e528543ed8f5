//! Memo - plan alternatives grouped by equivalence
//!
//! A memo is an arena of groups. Each group holds logically equivalent
//! expressions (logical rewrites or virtual lowerings) producing the same
//! rows; expressions refer to their children by group id rather than by
//! plan, so alternatives for a subtree are shared by every parent.
//!
//! Groups are created bottom-up by [`Memo::init`]. Exploration of rewrite
//! alternatives and least-cost plan selection are not implemented.

use std::fmt;
use std::sync::Arc;

use tracing::{debug, trace};

use crate::planner::error::{PlannerError, PlannerResult};
use crate::planner::logical::LogicalPlan;
use crate::planner::virtual_plan::{VirtualPlan, VirtualPlanner};

/// Index of a group in the memo
pub type GroupId = usize;

/// Logical expression over input groups
#[derive(Debug, Clone)]
pub struct LogicalRel {
    pub plan: Arc<LogicalPlan>,
    pub inputs: Vec<GroupId>,
}

/// Virtual expression over input groups
#[derive(Debug, Clone)]
pub struct VirtualRel {
    pub plan: Arc<VirtualPlan>,
    pub inputs: Vec<GroupId>,
    /// Index of the logical expression this was lowered from
    pub lowered_from: Option<usize>,
}

/// One alternative within a group
#[derive(Debug, Clone)]
pub enum GroupExpression {
    Logical(LogicalRel),
    Virtual(VirtualRel),
}

impl GroupExpression {
    pub fn inputs(&self) -> &[GroupId] {
        match self {
            GroupExpression::Logical(rel) => &rel.inputs,
            GroupExpression::Virtual(rel) => &rel.inputs,
        }
    }

    pub fn is_logical(&self) -> bool {
        matches!(self, GroupExpression::Logical(_))
    }

    fn same_plan(&self, other: &GroupExpression) -> bool {
        match (self, other) {
            (GroupExpression::Logical(a), GroupExpression::Logical(b)) => {
                Arc::ptr_eq(&a.plan, &b.plan)
            }
            (GroupExpression::Virtual(a), GroupExpression::Virtual(b)) => {
                Arc::ptr_eq(&a.plan, &b.plan)
            }
            _ => false,
        }
    }
}

impl fmt::Display for GroupExpression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GroupExpression::Logical(rel) => write!(f, "logical {}", rel.plan)?,
            GroupExpression::Virtual(rel) => write!(f, "virtual {}", rel.plan)?,
        }
        if !self.inputs().is_empty() {
            let inputs: Vec<_> = self.inputs().iter().map(|g| g.to_string()).collect();
            write!(f, " <- [{}]", inputs.join(", "))?;
        }
        Ok(())
    }
}

/// Set of equivalent expressions sharing the same input groups
#[derive(Debug, Clone)]
pub struct Group {
    id: GroupId,
    exprs: Vec<GroupExpression>,
    inputs: Vec<GroupId>,
}

impl Group {
    pub fn id(&self) -> GroupId {
        self.id
    }

    pub fn exprs(&self) -> &[GroupExpression] {
        &self.exprs
    }

    pub fn input_groups(&self) -> &[GroupId] {
        &self.inputs
    }

    /// Add an equivalent expression. Returns false if the same plan is
    /// already present.
    pub fn add_rel_expr(&mut self, expr: GroupExpression) -> PlannerResult<bool> {
        if expr.inputs() != self.inputs.as_slice() {
            return Err(PlannerError::InvalidPlan(format!(
                "expression inputs {:?} do not match group {} inputs {:?}",
                expr.inputs(),
                self.id,
                self.inputs
            )));
        }
        if self.exprs.iter().any(|e| e.same_plan(&expr)) {
            return Ok(false);
        }
        self.exprs.push(expr);
        Ok(true)
    }
}

/// Arena of plan groups
#[derive(Debug, Default)]
pub struct Memo {
    groups: Vec<Group>,
    root: Option<GroupId>,
}

impl Memo {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mirror a logical plan into groups, children first, and make its
    /// group the root. Subtrees shared by pointer map to one group.
    pub fn init(&mut self, plan: &Arc<LogicalPlan>) -> GroupId {
        let mut seen = Vec::new();
        let root = self.insert(plan, &mut seen);
        self.root = Some(root);
        debug!(root, groups = self.groups.len(), "initialized memo");
        root
    }

    fn insert(
        &mut self,
        plan: &Arc<LogicalPlan>,
        seen: &mut Vec<(Arc<LogicalPlan>, GroupId)>,
    ) -> GroupId {
        if let Some((_, id)) = seen.iter().find(|(p, _)| Arc::ptr_eq(p, plan)) {
            return *id;
        }

        let inputs: Vec<GroupId> = plan
            .inputs()
            .into_iter()
            .map(|input| self.insert(input, seen))
            .collect();

        let id = self.groups.len();
        trace!(group = id, node = plan.name(), "new memo group");
        self.groups.push(Group {
            id,
            exprs: vec![GroupExpression::Logical(LogicalRel {
                plan: plan.clone(),
                inputs: inputs.clone(),
            })],
            inputs,
        });
        seen.push((plan.clone(), id));
        id
    }

    pub fn root(&self) -> Option<GroupId> {
        self.root
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(id)
    }

    pub fn groups(&self) -> &[Group] {
        &self.groups
    }

    /// Add an equivalent expression to a group
    pub fn add_rel_expr(&mut self, id: GroupId, expr: GroupExpression) -> PlannerResult<bool> {
        let group_count = self.groups.len();
        if let Some(missing) = expr.inputs().iter().find(|g| **g >= group_count) {
            return Err(PlannerError::InvalidPlan(format!(
                "unknown input group {}",
                missing
            )));
        }
        self.group_mut(id)?.add_rel_expr(expr)
    }

    /// Add the virtual lowering of each logical expression in a group
    /// that has not been lowered yet. Returns how many were added.
    pub fn implement(&mut self, id: GroupId) -> PlannerResult<usize> {
        let group = self.group_mut(id)?;

        let pending: Vec<(usize, LogicalRel)> = group
            .exprs
            .iter()
            .enumerate()
            .filter_map(|(i, e)| match e {
                GroupExpression::Logical(rel) => Some((i, rel.clone())),
                GroupExpression::Virtual(_) => None,
            })
            .filter(|(i, _)| {
                !group.exprs.iter().any(|e| {
                    matches!(e, GroupExpression::Virtual(v) if v.lowered_from == Some(*i))
                })
            })
            .collect();

        let mut added = 0;
        for (index, rel) in pending {
            let lowered = VirtualPlanner::to_plan(&rel.plan)?;
            let expr = GroupExpression::Virtual(VirtualRel {
                plan: lowered,
                inputs: rel.inputs,
                lowered_from: Some(index),
            });
            if group.add_rel_expr(expr)? {
                added += 1;
            }
        }
        debug!(group = id, added, "implemented memo group");
        Ok(added)
    }

    /// Generate rewrite alternatives for every group
    pub fn explore(&mut self) -> PlannerResult<()> {
        Err(PlannerError::NotImplemented("memo exploration".to_string()))
    }

    /// Pick the cheapest virtual plan for the root group
    pub fn best_plan(&self) -> PlannerResult<Arc<VirtualPlan>> {
        Err(PlannerError::NotImplemented("memo plan selection".to_string()))
    }

    fn group_mut(&mut self, id: GroupId) -> PlannerResult<&mut Group> {
        self.groups
            .get_mut(id)
            .ok_or_else(|| PlannerError::InvalidPlan(format!("unknown memo group {}", id)))
    }
}

impl fmt::Display for Memo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for group in &self.groups {
            write!(f, "Group {}", group.id)?;
            if self.root == Some(group.id) {
                f.write_str(" (root)")?;
            }
            writeln!(f)?;
            for expr in &group.exprs {
                writeln!(f, "  {}", expr)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::TableRef;
    use crate::planner::logical::{col, lit, JoinKind, LogicalPlanBuilder};
    use crate::planner::test_utils::users_source;

    fn users_plan() -> Arc<LogicalPlan> {
        LogicalPlanBuilder::scan(TableRef::bare("users"), users_source())
            .filter(col("age").gt(lit(20i64)))
            .project(vec![col("username")])
            .build()
    }

    #[test]
    fn test_init_bottom_up() {
        let mut memo = Memo::new();
        let root = memo.init(&users_plan());

        assert_eq!(root, 2);
        assert_eq!(memo.root(), Some(2));
        assert_eq!(memo.groups().len(), 3);
        assert!(memo.group(0).unwrap().input_groups().is_empty());
        assert_eq!(memo.group(1).unwrap().input_groups(), &[0]);
        assert_eq!(memo.group(2).unwrap().input_groups(), &[1]);
        assert!(memo.group(2).unwrap().exprs()[0].is_logical());
    }

    #[test]
    fn test_shared_subtree_single_group() {
        let scan = LogicalPlanBuilder::scan(TableRef::bare("users"), users_source()).build();
        let plan = LogicalPlanBuilder::from(scan.clone())
            .join(scan, JoinKind::Cross, None)
            .build();

        let mut memo = Memo::new();
        let root = memo.init(&plan);
        assert_eq!(memo.groups().len(), 2);
        assert_eq!(memo.group(root).unwrap().input_groups(), &[0, 0]);
    }

    #[test]
    fn test_add_rel_expr() {
        let mut memo = Memo::new();
        let root = memo.init(&users_plan());
        let existing = memo.group(root).unwrap().exprs()[0].clone();

        // Same plan again is a no-op
        assert!(!memo.add_rel_expr(root, existing).unwrap());

        let rewrite = GroupExpression::Logical(LogicalRel {
            plan: users_plan(),
            inputs: vec![1],
        });
        assert!(memo.add_rel_expr(root, rewrite).unwrap());
        assert_eq!(memo.group(root).unwrap().exprs().len(), 2);

        let mismatched = GroupExpression::Logical(LogicalRel {
            plan: users_plan(),
            inputs: vec![0],
        });
        assert!(matches!(
            memo.add_rel_expr(root, mismatched),
            Err(PlannerError::InvalidPlan(_))
        ));

        let dangling = GroupExpression::Logical(LogicalRel {
            plan: users_plan(),
            inputs: vec![9],
        });
        assert!(memo.add_rel_expr(root, dangling).is_err());
        assert!(memo
            .add_rel_expr(
                7,
                GroupExpression::Logical(LogicalRel {
                    plan: users_plan(),
                    inputs: vec![],
                })
            )
            .is_err());
    }

    #[test]
    fn test_implement_adds_virtual_alternative() {
        let mut memo = Memo::new();
        let root = memo.init(&users_plan());

        assert_eq!(memo.implement(root).unwrap(), 1);
        let exprs = memo.group(root).unwrap().exprs();
        assert_eq!(exprs.len(), 2);
        match &exprs[1] {
            GroupExpression::Virtual(rel) => {
                assert_eq!(rel.plan.name(), "VProjection");
                assert_eq!(rel.inputs, vec![1]);
            }
            other => panic!("expected virtual expression, got {}", other),
        }

        // Already lowered
        assert_eq!(memo.implement(root).unwrap(), 0);
    }

    #[test]
    fn test_implement_unsupported_node() {
        let plan = LogicalPlanBuilder::scan(TableRef::bare("users"), users_source())
            .aggregate(vec![col("state")], vec![])
            .unwrap()
            .build();
        let mut memo = Memo::new();
        let root = memo.init(&plan);
        assert!(matches!(
            memo.implement(root),
            Err(PlannerError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_search_not_implemented() {
        let mut memo = Memo::new();
        memo.init(&users_plan());
        assert!(matches!(
            memo.explore(),
            Err(PlannerError::NotImplemented(_))
        ));
        assert!(matches!(
            memo.best_plan(),
            Err(PlannerError::NotImplemented(_))
        ));
    }

    #[test]
    fn test_display() {
        let plan = LogicalPlanBuilder::scan(TableRef::bare("users"), users_source())
            .limit(0, Some(1))
            .build();
        let mut memo = Memo::new();
        memo.init(&plan);
        assert_eq!(
            memo.to_string(),
            "Group 0\n  logical Scan: users; projection=[id, username, age, state, wallet]\n\
             Group 1 (root)\n  logical Limit: skip=0, fetch=1 <- [0]\n"
        );
    }
}
