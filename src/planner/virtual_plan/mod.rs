//! Virtual (executable) plans
//!
//! A virtual plan is the executable counterpart of a logical plan.
//! Columns are referenced by position, and each node knows the schema of
//! the rows it yields.

pub mod lowering;

pub use lowering::VirtualPlanner;

use std::fmt;
use std::sync::Arc;

use tracing::debug;

use crate::catalog::{Schema, TableRef};
use crate::datasource::DataSource;
use crate::executor::{ExecutorEngine, ExecutorResult, QueryResult};
use crate::planner::logical::{ArithmeticOp, BoolOp, Literal, ScalarFunc, UnaryOp};

/// Binary operators understood by the evaluator
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum VirtualBinaryOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
    Add,
    Sub,
    Mul,
    Div,
}

impl VirtualBinaryOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            VirtualBinaryOp::And => "AND",
            VirtualBinaryOp::Or => "OR",
            VirtualBinaryOp::Eq => "=",
            VirtualBinaryOp::NotEq => "!=",
            VirtualBinaryOp::Lt => "<",
            VirtualBinaryOp::LtEq => "<=",
            VirtualBinaryOp::Gt => ">",
            VirtualBinaryOp::GtEq => ">=",
            VirtualBinaryOp::Add => "+",
            VirtualBinaryOp::Sub => "-",
            VirtualBinaryOp::Mul => "*",
            VirtualBinaryOp::Div => "/",
        }
    }
}

impl From<BoolOp> for VirtualBinaryOp {
    fn from(op: BoolOp) -> Self {
        match op {
            BoolOp::And => VirtualBinaryOp::And,
            BoolOp::Or => VirtualBinaryOp::Or,
            BoolOp::Eq => VirtualBinaryOp::Eq,
            BoolOp::NotEq => VirtualBinaryOp::NotEq,
            BoolOp::Lt => VirtualBinaryOp::Lt,
            BoolOp::LtEq => VirtualBinaryOp::LtEq,
            BoolOp::Gt => VirtualBinaryOp::Gt,
            BoolOp::GtEq => VirtualBinaryOp::GtEq,
        }
    }
}

impl From<ArithmeticOp> for VirtualBinaryOp {
    fn from(op: ArithmeticOp) -> Self {
        match op {
            ArithmeticOp::Add => VirtualBinaryOp::Add,
            ArithmeticOp::Sub => VirtualBinaryOp::Sub,
            ArithmeticOp::Mul => VirtualBinaryOp::Mul,
            ArithmeticOp::Div => VirtualBinaryOp::Div,
        }
    }
}

/// Executable expression over positional columns
#[derive(Debug, Clone, PartialEq)]
pub enum VirtualExpr {
    Column(usize),
    Literal(Literal),
    Unary {
        op: UnaryOp,
        expr: Box<VirtualExpr>,
    },
    Binary {
        op: VirtualBinaryOp,
        left: Box<VirtualExpr>,
        right: Box<VirtualExpr>,
    },
    Function {
        func: ScalarFunc,
        args: Vec<VirtualExpr>,
    },
}

impl fmt::Display for VirtualExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualExpr::Column(i) => write!(f, "#{}", i),
            VirtualExpr::Literal(l) => write!(f, "{}", l),
            VirtualExpr::Unary { op, expr } => match op {
                UnaryOp::Not => write!(f, "NOT ({})", expr),
                UnaryOp::IsNull => write!(f, "({}) IS NULL", expr),
                UnaryOp::IsNotNull => write!(f, "({}) IS NOT NULL", expr),
            },
            VirtualExpr::Binary { op, left, right } => {
                write!(f, "({} {} {})", left, op.symbol(), right)
            }
            VirtualExpr::Function { func, args } => {
                let args: Vec<_> = args.iter().map(|a| a.to_string()).collect();
                write!(f, "{}({})", func, args.join(", "))
            }
        }
    }
}

/// Sort key of a virtual Sort node
#[derive(Debug, Clone, PartialEq)]
pub struct SortKey {
    pub expr: VirtualExpr,
    pub asc: bool,
    pub nulls_first: bool,
}

impl fmt::Display for SortKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} {} NULLS {}",
            self.expr,
            if self.asc { "ASC" } else { "DESC" },
            if self.nulls_first { "FIRST" } else { "LAST" }
        )
    }
}

/// Executable plan node
#[derive(Debug, Clone)]
pub enum VirtualPlan {
    Scan {
        table: TableRef,
        source: Arc<dyn DataSource>,
        projection: Vec<String>,
        schema: Schema,
    },
    Projection {
        input: Arc<VirtualPlan>,
        schema: Schema,
        exprs: Vec<VirtualExpr>,
    },
    /// Keeps rows whose predicate is true
    Selection {
        input: Arc<VirtualPlan>,
        expr: VirtualExpr,
    },
    /// Stable multi-key sort
    Sort {
        input: Arc<VirtualPlan>,
        keys: Vec<SortKey>,
    },
    Limit {
        input: Arc<VirtualPlan>,
        skip: usize,
        fetch: Option<usize>,
    },
    /// Hash-based duplicate elimination
    Distinct {
        input: Arc<VirtualPlan>,
    },
    /// Single row with no columns
    EmptyRelation,
}

impl VirtualPlan {
    pub fn name(&self) -> &'static str {
        match self {
            VirtualPlan::Scan { .. } => "VScan",
            VirtualPlan::Projection { .. } => "VProjection",
            VirtualPlan::Selection { .. } => "VSelection",
            VirtualPlan::Sort { .. } => "VSort",
            VirtualPlan::Limit { .. } => "VLimit",
            VirtualPlan::Distinct { .. } => "VDistinct",
            VirtualPlan::EmptyRelation => "VEmptyRelation",
        }
    }

    /// Schema of the rows this node yields
    pub fn schema(&self) -> Schema {
        match self {
            VirtualPlan::Scan { schema, .. } | VirtualPlan::Projection { schema, .. } => {
                schema.clone()
            }
            VirtualPlan::Selection { input, .. }
            | VirtualPlan::Sort { input, .. }
            | VirtualPlan::Limit { input, .. }
            | VirtualPlan::Distinct { input } => input.schema(),
            VirtualPlan::EmptyRelation => Schema::empty(),
        }
    }

    pub fn inputs(&self) -> Vec<&Arc<VirtualPlan>> {
        match self {
            VirtualPlan::Scan { .. } | VirtualPlan::EmptyRelation => vec![],
            VirtualPlan::Projection { input, .. }
            | VirtualPlan::Selection { input, .. }
            | VirtualPlan::Sort { input, .. }
            | VirtualPlan::Limit { input, .. }
            | VirtualPlan::Distinct { input } => vec![input],
        }
    }

    /// Start executing the plan.
    ///
    /// Every call builds a fresh executor tree, so results from separate
    /// calls are independent streams.
    pub async fn execute(&self) -> ExecutorResult<QueryResult> {
        debug!(root = self.name(), "executing virtual plan");
        let root = ExecutorEngine::build(self);
        QueryResult::open(self.schema(), root).await
    }
}

impl fmt::Display for VirtualPlan {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            VirtualPlan::Scan {
                table, projection, ..
            } => write!(f, "VScan: {}; projection=[{}]", table, projection.join(", ")),
            VirtualPlan::Projection { exprs, schema, .. } => {
                let cols: Vec<_> = exprs
                    .iter()
                    .zip(schema.fields())
                    .map(|(e, field)| format!("{} AS {}", e, field.name))
                    .collect();
                write!(f, "VProjection: {}", cols.join(", "))
            }
            VirtualPlan::Selection { expr, .. } => write!(f, "VSelection: {}", expr),
            VirtualPlan::Sort { keys, .. } => {
                let keys: Vec<_> = keys.iter().map(|k| k.to_string()).collect();
                write!(f, "VSort: {}", keys.join(", "))
            }
            VirtualPlan::Limit { skip, fetch, .. } => match fetch {
                Some(fetch) => write!(f, "VLimit: skip={}, fetch={}", skip, fetch),
                None => write!(f, "VLimit: skip={}, fetch=all", skip),
            },
            VirtualPlan::Distinct { .. } => f.write_str("VDistinct"),
            VirtualPlan::EmptyRelation => f.write_str("VEmptyRelation"),
        }
    }
}
