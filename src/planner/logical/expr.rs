//! Logical expressions
//!
//! Expression trees evaluated against a plan's schema. Every expression
//! resolves to the field it produces: columns keep their relation, while
//! computed expressions produce an unqualified field named after their
//! rendered text (`users.age > 20`, `COUNT(users.id)`).

use std::collections::BTreeSet;
use std::fmt;
use std::ops;

use super::function::{AggregateKind, ScalarFunc};
use crate::catalog::{DataType, Field, Schema, TableRef};
use crate::planner::error::{PlannerError, PlannerResult};

/// Literal value
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Text(String),
    Blob(Vec<u8>),
}

impl Literal {
    pub fn data_type(&self) -> DataType {
        match self {
            Literal::Null => DataType::Null,
            Literal::Bool(_) => DataType::Boolean,
            Literal::Int(_) => DataType::Int,
            Literal::Float(_) => DataType::Float,
            Literal::Text(_) => DataType::Text,
            Literal::Blob(_) => DataType::Blob,
        }
    }
}

impl fmt::Display for Literal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Literal::Null => f.write_str("NULL"),
            Literal::Bool(b) => write!(f, "{}", b),
            Literal::Int(i) => write!(f, "{}", i),
            Literal::Float(v) => write!(f, "{}", v),
            Literal::Text(s) => write!(f, "'{}'", s.replace('\'', "''")),
            Literal::Blob(bytes) => {
                f.write_str("0x")?;
                for b in bytes {
                    write!(f, "{:02x}", b)?;
                }
                Ok(())
            }
        }
    }
}

impl From<bool> for Literal {
    fn from(v: bool) -> Self {
        Literal::Bool(v)
    }
}

impl From<i64> for Literal {
    fn from(v: i64) -> Self {
        Literal::Int(v)
    }
}

impl From<f64> for Literal {
    fn from(v: f64) -> Self {
        Literal::Float(v)
    }
}

impl From<&str> for Literal {
    fn from(v: &str) -> Self {
        Literal::Text(v.to_string())
    }
}

impl From<String> for Literal {
    fn from(v: String) -> Self {
        Literal::Text(v)
    }
}

/// Column reference, optionally qualified by relation
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Column {
    pub relation: Option<TableRef>,
    pub name: String,
}

impl Column {
    pub fn unqualified(name: impl Into<String>) -> Self {
        Column {
            relation: None,
            name: name.into(),
        }
    }

    pub fn qualified(relation: impl Into<TableRef>, name: impl Into<String>) -> Self {
        Column {
            relation: Some(relation.into()),
            name: name.into(),
        }
    }

    /// Reference naming exactly this field
    pub fn from_field(field: &Field) -> Self {
        Column {
            relation: field.relation.clone(),
            name: field.name.clone(),
        }
    }
}

impl fmt::Display for Column {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.relation {
            Some(rel) => write!(f, "{}.{}", rel, self.name),
            None => f.write_str(&self.name),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Not,
    IsNull,
    IsNotNull,
}

/// Logical and comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoolOp {
    And,
    Or,
    Eq,
    NotEq,
    Lt,
    LtEq,
    Gt,
    GtEq,
}

impl BoolOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            BoolOp::And => "AND",
            BoolOp::Or => "OR",
            BoolOp::Eq => "=",
            BoolOp::NotEq => "!=",
            BoolOp::Lt => "<",
            BoolOp::LtEq => "<=",
            BoolOp::Gt => ">",
            BoolOp::GtEq => ">=",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ArithmeticOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl ArithmeticOp {
    pub fn symbol(&self) -> &'static str {
        match self {
            ArithmeticOp::Add => "+",
            ArithmeticOp::Sub => "-",
            ArithmeticOp::Mul => "*",
            ArithmeticOp::Div => "/",
        }
    }
}

/// Logical expression tree
#[derive(Debug, Clone, PartialEq)]
pub enum LogicalExpr {
    Column(Column),
    /// Positional reference into the input schema
    ColumnIndex(usize),
    Literal(Literal),
    Alias {
        expr: Box<LogicalExpr>,
        name: String,
    },
    Unary {
        op: UnaryOp,
        expr: Box<LogicalExpr>,
    },
    BoolBinary {
        op: BoolOp,
        left: Box<LogicalExpr>,
        right: Box<LogicalExpr>,
    },
    ArithmeticBinary {
        op: ArithmeticOp,
        left: Box<LogicalExpr>,
        right: Box<LogicalExpr>,
    },
    /// Plain aggregate over a single argument
    Aggregate {
        kind: AggregateKind,
        expr: Box<LogicalExpr>,
    },
    /// Ordering key, only meaningful under a Sort
    SortSpec {
        expr: Box<LogicalExpr>,
        asc: bool,
        nulls_first: bool,
    },
    ScalarFunction {
        name: String,
        args: Vec<LogicalExpr>,
    },
    /// Aggregate call with modifiers (DISTINCT, FILTER, ORDER BY, `*`)
    AggregateFunction {
        name: String,
        args: Vec<LogicalExpr>,
        distinct: bool,
        filter: Option<Box<LogicalExpr>>,
        order_by: Vec<LogicalExpr>,
    },
}

/// Unqualified column reference
pub fn col(name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::Column(Column::unqualified(name))
}

/// Column reference qualified by relation
pub fn qualified_col(relation: impl Into<TableRef>, name: impl Into<String>) -> LogicalExpr {
    LogicalExpr::Column(Column::qualified(relation, name))
}

pub fn lit(value: impl Into<Literal>) -> LogicalExpr {
    LogicalExpr::Literal(value.into())
}

impl LogicalExpr {
    fn bool_binary(self, op: BoolOp, right: LogicalExpr) -> LogicalExpr {
        LogicalExpr::BoolBinary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    fn arithmetic(self, op: ArithmeticOp, right: LogicalExpr) -> LogicalExpr {
        LogicalExpr::ArithmeticBinary {
            op,
            left: Box::new(self),
            right: Box::new(right),
        }
    }

    pub fn and(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::And, right)
    }

    pub fn or(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::Or, right)
    }

    pub fn eq(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::Eq, right)
    }

    pub fn not_eq(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::NotEq, right)
    }

    pub fn lt(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::Lt, right)
    }

    pub fn lt_eq(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::LtEq, right)
    }

    pub fn gt(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::Gt, right)
    }

    pub fn gt_eq(self, right: LogicalExpr) -> LogicalExpr {
        self.bool_binary(BoolOp::GtEq, right)
    }

    pub fn is_null(self) -> LogicalExpr {
        LogicalExpr::Unary {
            op: UnaryOp::IsNull,
            expr: Box::new(self),
        }
    }

    pub fn is_not_null(self) -> LogicalExpr {
        LogicalExpr::Unary {
            op: UnaryOp::IsNotNull,
            expr: Box::new(self),
        }
    }

    pub fn alias(self, name: impl Into<String>) -> LogicalExpr {
        LogicalExpr::Alias {
            expr: Box::new(self),
            name: name.into(),
        }
    }

    pub fn sort(self, asc: bool, nulls_first: bool) -> LogicalExpr {
        LogicalExpr::SortSpec {
            expr: Box::new(self),
            asc,
            nulls_first,
        }
    }

    pub fn aggregate(kind: AggregateKind, expr: LogicalExpr) -> LogicalExpr {
        LogicalExpr::Aggregate {
            kind,
            expr: Box::new(expr),
        }
    }

    pub fn function(name: impl Into<String>, args: Vec<LogicalExpr>) -> LogicalExpr {
        LogicalExpr::ScalarFunction {
            name: name.into(),
            args,
        }
    }

    /// Check if this expression is, or contains, an aggregate
    pub fn contains_aggregate(&self) -> bool {
        matches!(
            self,
            LogicalExpr::Aggregate { .. } | LogicalExpr::AggregateFunction { .. }
        ) || self.children().into_iter().any(|c| c.contains_aggregate())
    }

    /// Resolve the field this expression produces over `schema`
    pub fn resolve(&self, schema: &Schema) -> PlannerResult<Field> {
        match self {
            LogicalExpr::Column(c) => schema.resolve(c.relation.as_ref(), &c.name).cloned(),
            LogicalExpr::ColumnIndex(i) => schema
                .field(*i)
                .cloned()
                .ok_or_else(|| PlannerError::UnknownColumn(format!("#{}", i))),
            LogicalExpr::Literal(l) => Ok(Field::new(l.to_string(), l.data_type())),
            LogicalExpr::Alias { expr, name } => {
                let field = expr.resolve(schema)?;
                Ok(Field::new(name.clone(), field.data_type))
            }
            LogicalExpr::Unary { expr, .. } => {
                expr.resolve(schema)?;
                Ok(Field::new(self.to_string(), DataType::Boolean))
            }
            LogicalExpr::BoolBinary { left, right, .. } => {
                left.resolve(schema)?;
                right.resolve(schema)?;
                Ok(Field::new(self.to_string(), DataType::Boolean))
            }
            LogicalExpr::ArithmeticBinary { left, right, .. } => {
                let l = left.resolve(schema)?;
                let r = right.resolve(schema)?;
                let data_type = match (l.data_type, r.data_type) {
                    (DataType::Null, other) => other,
                    (lt, _) => lt,
                };
                Ok(Field::new(self.to_string(), data_type))
            }
            LogicalExpr::Aggregate { kind, expr } => {
                let field = expr.resolve(schema)?;
                Ok(Field::new(self.to_string(), kind.result_type(field.data_type)))
            }
            LogicalExpr::SortSpec { expr, .. } => expr.resolve(schema),
            LogicalExpr::ScalarFunction { name, args } => {
                let func = ScalarFunc::from_name(name).ok_or_else(|| {
                    PlannerError::UnsupportedExpression(format!("unknown function {}", name))
                })?;
                let types = args
                    .iter()
                    .map(|a| a.resolve(schema).map(|f| f.data_type))
                    .collect::<PlannerResult<Vec<_>>>()?;
                Ok(Field::new(self.to_string(), func.return_type(&types)?))
            }
            LogicalExpr::AggregateFunction {
                name,
                args,
                filter,
                order_by,
                ..
            } => {
                let kind = AggregateKind::from_name(name).ok_or_else(|| {
                    PlannerError::UnsupportedExpression(format!("unknown aggregate {}", name))
                })?;
                let mut input = DataType::Int;
                for (i, arg) in args.iter().enumerate() {
                    let field = arg.resolve(schema)?;
                    if i == 0 {
                        input = field.data_type;
                    }
                }
                if let Some(filter) = filter {
                    filter.resolve(schema)?;
                }
                for expr in order_by {
                    expr.resolve(schema)?;
                }
                Ok(Field::new(self.to_string(), kind.result_type(input)))
            }
        }
    }

    /// Direct sub-expressions, in evaluation order
    pub fn children(&self) -> Vec<&LogicalExpr> {
        match self {
            LogicalExpr::Column(_) | LogicalExpr::ColumnIndex(_) | LogicalExpr::Literal(_) => {
                vec![]
            }
            LogicalExpr::Alias { expr, .. }
            | LogicalExpr::Unary { expr, .. }
            | LogicalExpr::Aggregate { expr, .. }
            | LogicalExpr::SortSpec { expr, .. } => vec![expr.as_ref()],
            LogicalExpr::BoolBinary { left, right, .. }
            | LogicalExpr::ArithmeticBinary { left, right, .. } => {
                vec![left.as_ref(), right.as_ref()]
            }
            LogicalExpr::ScalarFunction { args, .. } => args.iter().collect(),
            LogicalExpr::AggregateFunction {
                args,
                filter,
                order_by,
                ..
            } => args
                .iter()
                .chain(filter.as_deref())
                .chain(order_by.iter())
                .collect(),
        }
    }

    /// Rebuild this node with each direct child replaced by `f(child)`
    pub fn map_children<F>(self, mut f: F) -> PlannerResult<LogicalExpr>
    where
        F: FnMut(LogicalExpr) -> PlannerResult<LogicalExpr>,
    {
        let boxed = |e: Box<LogicalExpr>, f: &mut F| f(*e).map(Box::new);
        Ok(match self {
            e @ (LogicalExpr::Column(_) | LogicalExpr::ColumnIndex(_) | LogicalExpr::Literal(_)) => {
                e
            }
            LogicalExpr::Alias { expr, name } => LogicalExpr::Alias {
                expr: boxed(expr, &mut f)?,
                name,
            },
            LogicalExpr::Unary { op, expr } => LogicalExpr::Unary {
                op,
                expr: boxed(expr, &mut f)?,
            },
            LogicalExpr::BoolBinary { op, left, right } => LogicalExpr::BoolBinary {
                op,
                left: boxed(left, &mut f)?,
                right: boxed(right, &mut f)?,
            },
            LogicalExpr::ArithmeticBinary { op, left, right } => LogicalExpr::ArithmeticBinary {
                op,
                left: boxed(left, &mut f)?,
                right: boxed(right, &mut f)?,
            },
            LogicalExpr::Aggregate { kind, expr } => LogicalExpr::Aggregate {
                kind,
                expr: boxed(expr, &mut f)?,
            },
            LogicalExpr::SortSpec {
                expr,
                asc,
                nulls_first,
            } => LogicalExpr::SortSpec {
                expr: boxed(expr, &mut f)?,
                asc,
                nulls_first,
            },
            LogicalExpr::ScalarFunction { name, args } => LogicalExpr::ScalarFunction {
                name,
                args: args.into_iter().map(&mut f).collect::<PlannerResult<_>>()?,
            },
            LogicalExpr::AggregateFunction {
                name,
                args,
                distinct,
                filter,
                order_by,
            } => LogicalExpr::AggregateFunction {
                name,
                args: args.into_iter().map(&mut f).collect::<PlannerResult<_>>()?,
                distinct,
                filter: filter.map(|e| boxed(e, &mut f)).transpose()?,
                order_by: order_by.into_iter().map(&mut f).collect::<PlannerResult<_>>()?,
            },
        })
    }

    /// Post-order rewrite: children first, then `f` on the rebuilt node
    pub fn transform_up<F>(self, f: &mut F) -> PlannerResult<LogicalExpr>
    where
        F: FnMut(LogicalExpr) -> PlannerResult<LogicalExpr>,
    {
        let expr = self.map_children(|child| child.transform_up(&mut *f))?;
        f(expr)
    }

    fn precedence(&self) -> u8 {
        match self {
            LogicalExpr::Alias { .. } => 0,
            LogicalExpr::BoolBinary { op: BoolOp::Or, .. } => 1,
            LogicalExpr::BoolBinary { op: BoolOp::And, .. } => 2,
            LogicalExpr::Unary { op: UnaryOp::Not, .. } => 3,
            LogicalExpr::BoolBinary { .. } => 4,
            LogicalExpr::Unary { .. } => 5,
            LogicalExpr::ArithmeticBinary {
                op: ArithmeticOp::Add | ArithmeticOp::Sub,
                ..
            } => 6,
            LogicalExpr::ArithmeticBinary { .. } => 7,
            _ => 10,
        }
    }

    fn fmt_operand(&self, f: &mut fmt::Formatter<'_>, parent: u8, right: bool) -> fmt::Result {
        let own = self.precedence();
        if own < parent || (right && own == parent) {
            write!(f, "({})", self)
        } else {
            write!(f, "{}", self)
        }
    }
}

impl fmt::Display for LogicalExpr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let prec = self.precedence();
        match self {
            LogicalExpr::Column(c) => write!(f, "{}", c),
            LogicalExpr::ColumnIndex(i) => write!(f, "#{}", i),
            LogicalExpr::Literal(l) => write!(f, "{}", l),
            LogicalExpr::Alias { expr, name } => write!(f, "{} AS {}", expr, name),
            LogicalExpr::Unary { op, expr } => match op {
                UnaryOp::Not => {
                    f.write_str("NOT ")?;
                    expr.fmt_operand(f, prec, false)
                }
                UnaryOp::IsNull => {
                    expr.fmt_operand(f, prec, false)?;
                    f.write_str(" IS NULL")
                }
                UnaryOp::IsNotNull => {
                    expr.fmt_operand(f, prec, false)?;
                    f.write_str(" IS NOT NULL")
                }
            },
            LogicalExpr::BoolBinary { op, left, right } => {
                left.fmt_operand(f, prec, false)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f, prec, true)
            }
            LogicalExpr::ArithmeticBinary { op, left, right } => {
                left.fmt_operand(f, prec, false)?;
                write!(f, " {} ", op.symbol())?;
                right.fmt_operand(f, prec, true)
            }
            LogicalExpr::Aggregate { kind, expr } => write!(f, "{}({})", kind, expr),
            LogicalExpr::SortSpec {
                expr,
                asc,
                nulls_first,
            } => write!(
                f,
                "{} {} NULLS {}",
                expr,
                if *asc { "ASC" } else { "DESC" },
                if *nulls_first { "FIRST" } else { "LAST" }
            ),
            LogicalExpr::ScalarFunction { name, args } => {
                write!(f, "{}({})", name, join_exprs(args))
            }
            LogicalExpr::AggregateFunction {
                name,
                args,
                distinct,
                filter,
                order_by,
            } => {
                write!(f, "{}(", name)?;
                if *distinct {
                    f.write_str("DISTINCT ")?;
                }
                if args.is_empty() {
                    f.write_str("*")?;
                } else {
                    f.write_str(&join_exprs(args))?;
                }
                if !order_by.is_empty() {
                    write!(f, " ORDER BY {}", join_exprs(order_by))?;
                }
                f.write_str(")")?;
                if let Some(filter) = filter {
                    write!(f, " FILTER (WHERE {})", filter)?;
                }
                Ok(())
            }
        }
    }
}

/// Render expressions as a comma-separated list
pub fn join_exprs(exprs: &[LogicalExpr]) -> String {
    exprs
        .iter()
        .map(|e| e.to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

impl ops::Add for LogicalExpr {
    type Output = LogicalExpr;

    fn add(self, rhs: LogicalExpr) -> LogicalExpr {
        self.arithmetic(ArithmeticOp::Add, rhs)
    }
}

impl ops::Sub for LogicalExpr {
    type Output = LogicalExpr;

    fn sub(self, rhs: LogicalExpr) -> LogicalExpr {
        self.arithmetic(ArithmeticOp::Sub, rhs)
    }
}

impl ops::Mul for LogicalExpr {
    type Output = LogicalExpr;

    fn mul(self, rhs: LogicalExpr) -> LogicalExpr {
        self.arithmetic(ArithmeticOp::Mul, rhs)
    }
}

impl ops::Div for LogicalExpr {
    type Output = LogicalExpr;

    fn div(self, rhs: LogicalExpr) -> LogicalExpr {
        self.arithmetic(ArithmeticOp::Div, rhs)
    }
}

impl ops::Not for LogicalExpr {
    type Output = LogicalExpr;

    fn not(self) -> LogicalExpr {
        LogicalExpr::Unary {
            op: UnaryOp::Not,
            expr: Box::new(self),
        }
    }
}

/// Flatten a chain of ANDs (looking through aliases) into its conjuncts,
/// left to right.
pub fn split_conjunction(expr: &LogicalExpr) -> Vec<LogicalExpr> {
    fn split_into(expr: &LogicalExpr, out: &mut Vec<LogicalExpr>) {
        match expr {
            LogicalExpr::BoolBinary {
                op: BoolOp::And,
                left,
                right,
            } => {
                split_into(left, out);
                split_into(right, out);
            }
            LogicalExpr::Alias { expr, .. } => split_into(expr, out),
            other => out.push(other.clone()),
        }
    }

    let mut out = Vec::new();
    split_into(expr, &mut out);
    out
}

/// Join predicates with left-associative ANDs; None for an empty input
pub fn conjunction(exprs: impl IntoIterator<Item = LogicalExpr>) -> Option<LogicalExpr> {
    exprs.into_iter().reduce(|acc, e| acc.and(e))
}

/// Collect every column referenced anywhere in `expr`
pub fn extract_columns(expr: &LogicalExpr, columns: &mut BTreeSet<Column>) {
    if let LogicalExpr::Column(c) = expr {
        columns.insert(c.clone());
    }
    for child in expr.children() {
        extract_columns(child, columns);
    }
}

/// Qualify unqualified columns against a list of schemas.
///
/// A column is qualified with the relation of the one schema that
/// resolves it. Columns resolved by no schema fail with `UnknownColumn`;
/// columns resolved by several fail with `AmbiguousColumn`.
pub fn qualify_with_schemas(expr: LogicalExpr, schemas: &[&Schema]) -> PlannerResult<LogicalExpr> {
    expr.transform_up(&mut |e| match e {
        LogicalExpr::Column(Column {
            relation: None,
            name,
        }) => {
            let mut found: Option<&Field> = None;
            for schema in schemas {
                match schema.resolve(None, &name) {
                    Ok(_) if found.is_some() => return Err(PlannerError::AmbiguousColumn(name)),
                    Ok(field) => found = Some(field),
                    Err(PlannerError::UnknownColumn(_)) => {}
                    Err(other) => return Err(other),
                }
            }
            found
                .map(|field| LogicalExpr::Column(Column::from_field(field)))
                .ok_or(PlannerError::UnknownColumn(name))
        }
        other => Ok(other),
    })
}

/// Qualify unqualified columns against a single schema
pub fn normalize_expr(expr: LogicalExpr, schema: &Schema) -> PlannerResult<LogicalExpr> {
    qualify_with_schemas(expr, &[schema])
}

#[cfg(test)]
mod tests {
    use super::*;

    fn users() -> Schema {
        let rel = TableRef::bare("users");
        Schema::new(vec![
            Field::qualified(rel.clone(), "id", DataType::Int),
            Field::qualified(rel.clone(), "username", DataType::Text),
            Field::qualified(rel, "age", DataType::Int),
        ])
    }

    #[test]
    fn test_display() {
        let expr = qualified_col("users", "age").gt(lit(20i64));
        assert_eq!(expr.to_string(), "users.age > 20");

        let expr = col("a").and(col("b").or(col("c")));
        assert_eq!(expr.to_string(), "a AND (b OR c)");

        let expr = (col("a") + col("b")) * lit(2i64);
        assert_eq!(expr.to_string(), "(a + b) * 2");

        let expr = col("a") - (col("b") - col("c"));
        assert_eq!(expr.to_string(), "a - (b - c)");

        assert_eq!(col("name").is_null().to_string(), "name IS NULL");
        assert_eq!(lit("o'k").to_string(), "'o''k'");
        assert_eq!(col("x").alias("y").to_string(), "x AS y");
        assert_eq!(
            col("age").sort(false, true).to_string(),
            "age DESC NULLS FIRST"
        );
        assert_eq!(
            LogicalExpr::aggregate(AggregateKind::Count, col("id")).to_string(),
            "COUNT(id)"
        );
    }

    #[test]
    fn test_resolve_fields() {
        let schema = users();

        let field = col("age").resolve(&schema).unwrap();
        assert_eq!(field.qualified_name(), "users.age");

        let field = col("age").gt(lit(20i64)).resolve(&schema).unwrap();
        assert_eq!(field.name, "age > 20");
        assert_eq!(field.data_type, DataType::Boolean);
        assert!(field.relation.is_none());

        let field = col("age").alias("years").resolve(&schema).unwrap();
        assert_eq!(field.name, "years");
        assert_eq!(field.data_type, DataType::Int);

        let avg = LogicalExpr::aggregate(AggregateKind::Avg, col("age"));
        assert_eq!(avg.resolve(&schema).unwrap().data_type, DataType::Float);

        let upper = LogicalExpr::function("upper", vec![col("username")]);
        assert_eq!(upper.resolve(&schema).unwrap().data_type, DataType::Text);

        assert!(matches!(
            col("missing").resolve(&schema),
            Err(PlannerError::UnknownColumn(_))
        ));
        assert!(matches!(
            LogicalExpr::function("nope", vec![]).resolve(&schema),
            Err(PlannerError::UnsupportedExpression(_))
        ));
        assert!(LogicalExpr::ColumnIndex(7).resolve(&schema).is_err());
    }

    #[test]
    fn test_split_and_conjunction() {
        let a = col("a").gt(lit(1i64));
        let b = col("b").lt(lit(2i64));
        let c = col("c").eq(lit(3i64));

        let expr = a.clone().and(b.clone().and(c.clone())).alias("p");
        let parts = split_conjunction(&expr);
        assert_eq!(parts, vec![a.clone(), b.clone(), c.clone()]);

        let rebuilt = conjunction(parts.clone()).unwrap();
        assert_eq!(rebuilt, a.clone().and(b).and(c));
        assert_eq!(split_conjunction(&rebuilt), parts);

        assert_eq!(split_conjunction(&a), vec![a.clone()]);
        assert_eq!(conjunction(vec![a.clone()]), Some(a));
        assert!(conjunction(Vec::new()).is_none());
    }

    #[test]
    fn test_extract_columns() {
        let expr = col("a").gt(col("b") + qualified_col("t", "a"));
        let mut columns = BTreeSet::new();
        extract_columns(&expr, &mut columns);
        assert_eq!(columns.len(), 3);
        assert!(columns.contains(&Column::qualified("t", "a")));
    }

    #[test]
    fn test_qualify_with_schemas() {
        let users = users();
        let orders = Schema::new(vec![
            Field::qualified(TableRef::bare("orders"), "id", DataType::Int),
            Field::qualified(TableRef::bare("orders"), "total", DataType::Float),
        ]);

        let expr = qualify_with_schemas(col("total").gt(col("age")), &[&users, &orders]).unwrap();
        assert_eq!(expr.to_string(), "orders.total > users.age");

        assert!(matches!(
            qualify_with_schemas(col("id"), &[&users, &orders]),
            Err(PlannerError::AmbiguousColumn(_))
        ));
        assert!(matches!(
            qualify_with_schemas(col("nope"), &[&users, &orders]),
            Err(PlannerError::UnknownColumn(_))
        ));

        // Already-qualified references are left alone
        let expr = qualify_with_schemas(qualified_col("orders", "id"), &[&users, &orders]).unwrap();
        assert_eq!(expr, qualified_col("orders", "id"));
    }

    #[test]
    fn test_contains_aggregate() {
        let agg = LogicalExpr::aggregate(AggregateKind::Sum, col("x")) + lit(1i64);
        assert!(agg.contains_aggregate());
        assert!(!col("x").gt(lit(1i64)).contains_aggregate());
    }
}
