//! SQL query planning
//!
//! Walks a `sqlparser` query AST into a `LogicalPlan`. Column references
//! are qualified against the relations in scope as each clause is
//! planned, so the resulting plan names every column by its relation.
//!
//! Clause order within a SELECT:
//!
//! ```text
//! FROM → WHERE → GROUP BY/aggregates → HAVING → SELECT list
//!      → DISTINCT → ORDER BY → LIMIT/OFFSET
//! ```

use std::sync::Arc;

use sqlparser::ast::{
    BinaryOperator, Distinct, DuplicateTreatment, Expr, Function, FunctionArg, FunctionArgExpr,
    FunctionArgumentClause, FunctionArguments, GroupByExpr, JoinConstraint, JoinOperator,
    ObjectName, OrderByExpr, Query, Select, SelectItem, SetExpr, SetOperator, SetQuantifier,
    Statement, TableFactor, TableWithJoins, UnaryOperator, Value,
};
use tracing::debug;

use crate::catalog::{Catalog, Schema, TableRef};
use crate::planner::error::{PlannerError, PlannerResult};
use crate::planner::logical::{
    col, lit, normalize_expr, qualified_col, qualify_with_schemas, AggregateKind, Column, JoinKind,
    Literal, LogicalExpr, LogicalPlan, LogicalPlanBuilder, ScalarFunc, SetOpKind,
};
use crate::sql::Parser;

/// Plans SQL queries against a catalog
pub struct QueryPlanner<'a> {
    catalog: &'a dyn Catalog,
}

/// Grouping context of an aggregate query: the grouping and aggregate
/// expressions, in the order of the aggregate's output schema.
struct Grouping {
    targets: Vec<LogicalExpr>,
    schema: Schema,
}

impl<'a> QueryPlanner<'a> {
    pub fn new(catalog: &'a dyn Catalog) -> Self {
        QueryPlanner { catalog }
    }

    /// Parse and plan a single SQL query
    pub fn plan_sql(&self, sql: &str) -> PlannerResult<Arc<LogicalPlan>> {
        let statement = Parser::parse_one(sql)?;
        self.to_plan(&statement)
    }

    /// Plan a parsed statement. Only queries are supported.
    pub fn to_plan(&self, statement: &Statement) -> PlannerResult<Arc<LogicalPlan>> {
        match statement {
            Statement::Query(query) => {
                let plan = self.plan_query(query)?;
                debug!(root = plan.name(), "planned query");
                Ok(plan)
            }
            _ => Err(PlannerError::NotImplemented(
                "only SELECT queries can be planned".to_string(),
            )),
        }
    }

    fn plan_query(&self, query: &Query) -> PlannerResult<Arc<LogicalPlan>> {
        if query.with.is_some() {
            return Err(PlannerError::NotImplemented("WITH clause".to_string()));
        }

        let order_by: &[OrderByExpr] = query
            .order_by
            .as_ref()
            .map(|o| o.exprs.as_slice())
            .unwrap_or_default();

        let mut builder = match query.body.as_ref() {
            SetExpr::Select(select) => self.plan_select(select, order_by)?,
            body => {
                let builder = LogicalPlanBuilder::from(self.plan_set_expr(body)?);
                if order_by.is_empty() {
                    builder
                } else {
                    let keys = order_by
                        .iter()
                        .map(|o| self.plan_order_by_expr(o))
                        .collect::<PlannerResult<Vec<_>>>()?;
                    builder.sort(keys)?
                }
            }
        };

        let skip = match &query.offset {
            Some(offset) => parse_count(&offset.value)?,
            None => 0,
        };
        let fetch = query.limit.as_ref().map(parse_count).transpose()?;
        if skip > 0 || fetch.is_some() {
            builder = builder.limit(skip, fetch);
        }

        Ok(builder.build())
    }

    fn plan_set_expr(&self, expr: &SetExpr) -> PlannerResult<Arc<LogicalPlan>> {
        match expr {
            SetExpr::Select(select) => Ok(self.plan_select(select, &[])?.build()),
            SetExpr::Query(query) => self.plan_query(query),
            SetExpr::SetOperation {
                op,
                set_quantifier,
                left,
                right,
            } => {
                let kind = match op {
                    SetOperator::Union => SetOpKind::Union,
                    SetOperator::Intersect => SetOpKind::Intersect,
                    SetOperator::Except => SetOpKind::Except,
                    #[allow(unreachable_patterns)]
                    other => {
                        return Err(PlannerError::NotImplemented(format!(
                            "set operator {}",
                            other
                        )))
                    }
                };
                let left = self.plan_set_expr(left)?;
                let right = self.plan_set_expr(right)?;

                let (left_width, right_width) = (left.schema()?.len(), right.schema()?.len());
                if left_width != right_width {
                    return Err(PlannerError::InvalidPlan(format!(
                        "{:?} inputs have {} and {} columns",
                        kind, left_width, right_width
                    )));
                }

                let builder = LogicalPlanBuilder::from(left).set_op(right, kind);
                let keep_duplicates =
                    matches!(set_quantifier, SetQuantifier::All | SetQuantifier::AllByName);
                Ok(if keep_duplicates {
                    builder.build()
                } else {
                    builder.distinct().build()
                })
            }
            other => Err(PlannerError::NotImplemented(format!(
                "set expression {}",
                other
            ))),
        }
    }

    fn plan_select(
        &self,
        select: &Select,
        order_by: &[OrderByExpr],
    ) -> PlannerResult<LogicalPlanBuilder> {
        let mut builder = self.plan_from(&select.from)?;

        if let Some(selection) = &select.selection {
            let predicate = self.plan_expr(selection)?;
            if predicate.contains_aggregate() {
                return Err(PlannerError::InvalidPlan(
                    "aggregate functions are not allowed in WHERE".to_string(),
                ));
            }
            let schema = builder.plan().schema()?;
            builder = builder.filter(normalize_expr(predicate, &schema)?);
        }

        let input_schema = builder.plan().schema()?;

        let mut select_exprs = Vec::new();
        for item in &select.projection {
            for expr in self.plan_select_item(item, &input_schema)? {
                select_exprs.push(normalize_expr(expr, &input_schema)?);
            }
        }

        let group_by = match &select.group_by {
            GroupByExpr::Expressions(exprs, modifiers) => {
                if !modifiers.is_empty() {
                    return Err(PlannerError::NotImplemented(
                        "GROUP BY modifiers".to_string(),
                    ));
                }
                exprs
                    .iter()
                    .map(|e| normalize_expr(self.plan_expr(e)?, &input_schema))
                    .collect::<PlannerResult<Vec<_>>>()?
            }
            GroupByExpr::All(_) => {
                return Err(PlannerError::NotImplemented("GROUP BY ALL".to_string()))
            }
        };
        let having = select
            .having
            .as_ref()
            .map(|h| normalize_expr(self.plan_expr(h)?, &input_schema))
            .transpose()?;

        let is_aggregate = !group_by.is_empty()
            || having.is_some()
            || select_exprs.iter().any(|e| e.contains_aggregate());

        let mut grouping = None;
        if is_aggregate {
            let mut aggregates = Vec::new();
            for expr in select_exprs.iter().chain(having.iter()) {
                collect_aggregates(expr, &mut aggregates);
            }
            debug!(
                group_by = group_by.len(),
                aggregates = aggregates.len(),
                "planning aggregate"
            );

            builder = builder.aggregate(group_by.clone(), aggregates.clone())?;
            let context = Grouping {
                targets: group_by.into_iter().chain(aggregates).collect(),
                schema: builder.plan().schema()?,
            };

            if let Some(having) = having {
                builder = builder.filter(context.rebase(having)?);
            }
            select_exprs = select_exprs
                .into_iter()
                .map(|e| context.rebase(e))
                .collect::<PlannerResult<Vec<_>>>()?;
            grouping = Some(context);
        }

        let is_distinct = match &select.distinct {
            None => false,
            Some(Distinct::Distinct) => true,
            Some(Distinct::On(_)) => {
                return Err(PlannerError::NotImplemented("DISTINCT ON".to_string()))
            }
        };

        // Keys over the SELECT output sort above the projection. Otherwise
        // they sort its input, which DISTINCT does not allow.
        let projected = builder.clone().project(select_exprs.clone());
        let mut sort_above = None;
        let mut sort_below = None;
        if !order_by.is_empty() {
            let output_schema = projected.plan().schema()?;
            let above = order_by
                .iter()
                .map(|o| {
                    self.plan_output_sort_key(
                        o,
                        &output_schema,
                        &input_schema,
                        &select_exprs,
                        grouping.as_ref(),
                    )
                })
                .collect::<PlannerResult<Vec<_>>>();
            match above {
                Ok(keys) => sort_above = Some(keys),
                Err(err) if is_distinct => return Err(err),
                Err(_) => {
                    let keys = order_by
                        .iter()
                        .map(|o| {
                            self.plan_input_sort_key(
                                o,
                                &input_schema,
                                &select_exprs,
                                grouping.as_ref(),
                            )
                        })
                        .collect::<PlannerResult<Vec<_>>>()?;
                    sort_below = Some(keys);
                }
            }
        }

        let mut builder = match sort_below {
            Some(keys) => builder.sort(keys)?.project(select_exprs),
            None => projected,
        };
        if is_distinct {
            builder = builder.distinct();
        }
        if let Some(keys) = sort_above {
            builder = builder.sort(keys)?;
        }

        Ok(builder)
    }

    /// Resolve an ORDER BY key over the SELECT output.
    ///
    /// Keys naming output columns (including aliases) resolve directly.
    /// Otherwise the key is planned over the SELECT input and matched
    /// against the select list, so `ORDER BY count(id)` finds the
    /// projected aggregate.
    fn plan_output_sort_key(
        &self,
        order: &OrderByExpr,
        output_schema: &Schema,
        input_schema: &Schema,
        select_exprs: &[LogicalExpr],
        grouping: Option<&Grouping>,
    ) -> PlannerResult<LogicalExpr> {
        let (expr, asc, nulls_first) = self.plan_order_by(order)?;
        let direct = normalize_expr(expr.clone(), output_schema).and_then(|e| {
            e.resolve(output_schema)?;
            Ok(e)
        });
        let err = match direct {
            Ok(e) => return Ok(e.sort(asc, nulls_first)),
            Err(err) => err,
        };

        let mut candidate = normalize_expr(expr, input_schema)?;
        if let Some(grouping) = grouping {
            candidate = grouping.rebase(candidate)?;
        }

        let position = select_exprs.iter().position(|e| match e {
            LogicalExpr::Alias { expr, .. } => **expr == candidate,
            other => *other == candidate,
        });
        match position.and_then(|i| output_schema.field(i)) {
            Some(field) => Ok(LogicalExpr::Column(Column::from_field(field)).sort(asc, nulls_first)),
            None => Err(err),
        }
    }

    /// Resolve an ORDER BY key over the SELECT input. Output aliases are
    /// replaced by the expressions they name.
    fn plan_input_sort_key(
        &self,
        order: &OrderByExpr,
        input_schema: &Schema,
        select_exprs: &[LogicalExpr],
        grouping: Option<&Grouping>,
    ) -> PlannerResult<LogicalExpr> {
        let (expr, asc, nulls_first) = self.plan_order_by(order)?;
        let aliased = match &expr {
            LogicalExpr::Column(Column {
                relation: None,
                name,
            }) => select_exprs.iter().find_map(|e| match e {
                LogicalExpr::Alias { expr, name: alias } if alias == name => {
                    Some(expr.as_ref().clone())
                }
                _ => None,
            }),
            _ => None,
        };
        let key = match aliased {
            Some(e) => e,
            None => {
                let e = normalize_expr(expr, input_schema)?;
                match grouping {
                    Some(grouping) => grouping.rebase(e)?,
                    None => e,
                }
            }
        };
        Ok(key.sort(asc, nulls_first))
    }

    /// ORDER BY item as a `SortSpec`
    fn plan_order_by_expr(&self, order: &OrderByExpr) -> PlannerResult<LogicalExpr> {
        let (expr, asc, nulls_first) = self.plan_order_by(order)?;
        Ok(expr.sort(asc, nulls_first))
    }

    /// ORDER BY item as (expression, ascending, nulls first). Unspecified
    /// null placement follows PostgreSQL: NULLs sort as the largest value.
    fn plan_order_by(&self, order: &OrderByExpr) -> PlannerResult<(LogicalExpr, bool, bool)> {
        let asc = order.asc.unwrap_or(true);
        let nulls_first = order.nulls_first.unwrap_or(!asc);
        Ok((self.plan_expr(&order.expr)?, asc, nulls_first))
    }

    /// Comma-separated FROM items become cross joins
    fn plan_from(&self, from: &[TableWithJoins]) -> PlannerResult<LogicalPlanBuilder> {
        let mut items = from.iter().map(|item| self.plan_table_with_joins(item));
        let Some(first) = items.next() else {
            return Ok(LogicalPlanBuilder::empty());
        };
        let mut builder = first?;
        for item in items {
            builder = builder.join(item?.build(), JoinKind::Cross, None);
        }
        Ok(builder)
    }

    fn plan_table_with_joins(&self, item: &TableWithJoins) -> PlannerResult<LogicalPlanBuilder> {
        let mut builder = self.plan_table_factor(&item.relation)?;

        for join in &item.joins {
            let right = self.plan_table_factor(&join.relation)?.build();
            let (kind, constraint) = match &join.join_operator {
                JoinOperator::Inner(c) => (JoinKind::Inner, Some(c)),
                JoinOperator::LeftOuter(c) => (JoinKind::Left, Some(c)),
                JoinOperator::RightOuter(c) => (JoinKind::Right, Some(c)),
                JoinOperator::FullOuter(c) => (JoinKind::Full, Some(c)),
                JoinOperator::CrossJoin => (JoinKind::Cross, None),
                other => {
                    return Err(PlannerError::NotImplemented(format!(
                        "join operator {:?}",
                        other
                    )))
                }
            };

            let on = match constraint {
                None | Some(JoinConstraint::None) => None,
                Some(JoinConstraint::On(expr)) => {
                    let left_schema = builder.plan().schema()?;
                    let right_schema = right.schema()?;
                    Some(qualify_with_schemas(
                        self.plan_expr(expr)?,
                        &[&left_schema, &right_schema],
                    )?)
                }
                Some(other) => {
                    return Err(PlannerError::NotImplemented(format!(
                        "join constraint {:?}",
                        other
                    )))
                }
            };

            builder = builder.join(right, kind, on);
        }

        Ok(builder)
    }

    fn plan_table_factor(&self, factor: &TableFactor) -> PlannerResult<LogicalPlanBuilder> {
        match factor {
            TableFactor::Table {
                name, alias, args, ..
            } => {
                if args.is_some() {
                    return Err(PlannerError::NotImplemented(format!(
                        "table function {}",
                        name
                    )));
                }
                let table = table_ref(name)?;
                let source = self.catalog.get_data_source(&table)?;
                let table = match alias {
                    Some(alias) if !alias.columns.is_empty() => {
                        return Err(PlannerError::NotImplemented(
                            "table alias column lists".to_string(),
                        ))
                    }
                    Some(alias) => TableRef::bare(alias.name.value.clone()),
                    None => table,
                };
                debug!(table = %table, "planning scan");
                Ok(LogicalPlanBuilder::scan(table, source))
            }
            TableFactor::Derived {
                subquery, alias, ..
            } => {
                let alias = alias.as_ref().ok_or_else(|| {
                    PlannerError::InvalidPlan("derived table requires an alias".to_string())
                })?;
                let plan = self.plan_query(subquery)?;
                Ok(LogicalPlanBuilder::from(plan).subquery(alias.name.value.clone()))
            }
            TableFactor::NestedJoin {
                table_with_joins,
                alias,
            } => {
                let builder = self.plan_table_with_joins(table_with_joins)?;
                Ok(match alias {
                    Some(alias) => builder.subquery(alias.name.value.clone()),
                    None => builder,
                })
            }
            other => Err(PlannerError::NotImplemented(format!(
                "table factor {}",
                other
            ))),
        }
    }

    fn plan_select_item(
        &self,
        item: &SelectItem,
        schema: &Schema,
    ) -> PlannerResult<Vec<LogicalExpr>> {
        match item {
            SelectItem::UnnamedExpr(expr) => Ok(vec![self.plan_expr(expr)?]),
            SelectItem::ExprWithAlias { expr, alias } => {
                let expr = self.plan_expr(expr)?;
                let same_name = matches!(&expr, LogicalExpr::Column(c) if c.name == alias.value);
                Ok(vec![if same_name {
                    expr
                } else {
                    expr.alias(alias.value.clone())
                }])
            }
            SelectItem::Wildcard(_) => Ok(schema
                .fields()
                .iter()
                .map(|f| LogicalExpr::Column(Column::from_field(f)))
                .collect()),
            SelectItem::QualifiedWildcard(name, _) => {
                let table = table_ref(name)?;
                let exprs: Vec<_> = schema
                    .fields()
                    .iter()
                    .filter(|f| f.relation.as_ref().is_some_and(|r| table.matches(r)))
                    .map(|f| LogicalExpr::Column(Column::from_field(f)))
                    .collect();
                if exprs.is_empty() {
                    return Err(PlannerError::UnknownTable(table.to_string()));
                }
                Ok(exprs)
            }
        }
    }

    fn plan_expr(&self, expr: &Expr) -> PlannerResult<LogicalExpr> {
        match expr {
            Expr::Identifier(ident) => Ok(col(ident.value.clone())),
            Expr::CompoundIdentifier(idents) => match idents.as_slice() {
                [table, column] => Ok(qualified_col(
                    TableRef::bare(table.value.clone()),
                    column.value.clone(),
                )),
                [namespace, table, column] => Ok(qualified_col(
                    TableRef::qualified(namespace.value.clone(), table.value.clone()),
                    column.value.clone(),
                )),
                _ => Err(PlannerError::UnsupportedExpression(expr.to_string())),
            },
            Expr::Value(value) => Ok(LogicalExpr::Literal(plan_literal(value)?)),
            Expr::Nested(inner) => self.plan_expr(inner),
            Expr::IsNull(inner) => Ok(self.plan_expr(inner)?.is_null()),
            Expr::IsNotNull(inner) => Ok(self.plan_expr(inner)?.is_not_null()),
            Expr::UnaryOp { op, expr: inner } => {
                let inner = self.plan_expr(inner)?;
                match op {
                    UnaryOperator::Not => Ok(!inner),
                    UnaryOperator::Plus => Ok(inner),
                    UnaryOperator::Minus => negate(inner),
                    other => Err(PlannerError::UnknownOperator(other.to_string())),
                }
            }
            Expr::BinaryOp { left, op, right } => {
                let left = self.plan_expr(left)?;
                let right = self.plan_expr(right)?;
                plan_binary(left, op, right)
            }
            Expr::Function(function) => self.plan_function(function),
            other => Err(PlannerError::UnsupportedExpression(other.to_string())),
        }
    }

    fn plan_function(&self, function: &Function) -> PlannerResult<LogicalExpr> {
        let name = function.name.to_string();
        if function.over.is_some() {
            return Err(PlannerError::NotImplemented(format!(
                "window function {}",
                name
            )));
        }

        let (args, distinct, clauses) = match &function.args {
            FunctionArguments::None => (&[][..], false, &[][..]),
            FunctionArguments::List(list) => (
                list.args.as_slice(),
                matches!(list.duplicate_treatment, Some(DuplicateTreatment::Distinct)),
                list.clauses.as_slice(),
            ),
            FunctionArguments::Subquery(_) => {
                return Err(PlannerError::NotImplemented(format!(
                    "subquery argument to {}",
                    name
                )))
            }
        };

        let mut wildcard = false;
        let mut planned = Vec::with_capacity(args.len());
        for arg in args {
            match arg {
                FunctionArg::Unnamed(FunctionArgExpr::Expr(e)) => planned.push(self.plan_expr(e)?),
                FunctionArg::Unnamed(FunctionArgExpr::Wildcard) => wildcard = true,
                other => {
                    return Err(PlannerError::UnsupportedExpression(format!(
                        "function argument {}",
                        other
                    )))
                }
            }
        }

        let Some(kind) = AggregateKind::from_name(&name) else {
            if wildcard || distinct || !clauses.is_empty() || function.filter.is_some() {
                return Err(PlannerError::InvalidPlan(format!(
                    "{} is not an aggregate function",
                    name
                )));
            }
            let func = ScalarFunc::from_name(&name).ok_or_else(|| {
                PlannerError::UnsupportedExpression(format!("unknown function {}", name))
            })?;
            return Ok(LogicalExpr::function(func.name(), planned));
        };

        if wildcard && (kind != AggregateKind::Count || !planned.is_empty()) {
            return Err(PlannerError::InvalidPlan(format!(
                "{}(*) is not supported",
                kind
            )));
        }
        if !wildcard && planned.len() != 1 {
            return Err(PlannerError::InvalidPlan(format!(
                "{} expects exactly one argument",
                kind
            )));
        }
        if planned.iter().any(|e| e.contains_aggregate()) {
            return Err(PlannerError::InvalidPlan(
                "aggregate calls cannot be nested".to_string(),
            ));
        }

        let mut order_by = Vec::new();
        for clause in clauses {
            match clause {
                FunctionArgumentClause::OrderBy(exprs) => {
                    for o in exprs {
                        order_by.push(self.plan_order_by_expr(o)?);
                    }
                }
                other => {
                    return Err(PlannerError::NotImplemented(format!(
                        "aggregate clause {:?}",
                        other
                    )))
                }
            }
        }
        let filter = function
            .filter
            .as_ref()
            .map(|e| self.plan_expr(e))
            .transpose()?;

        if !distinct && filter.is_none() && order_by.is_empty() {
            if let [arg] = planned.as_slice() {
                return Ok(LogicalExpr::aggregate(kind, arg.clone()));
            }
        }
        Ok(LogicalExpr::AggregateFunction {
            name: kind.name().to_string(),
            args: planned,
            distinct,
            filter: filter.map(Box::new),
            order_by,
        })
    }
}

impl Grouping {
    /// Rewrite an expression over the aggregate output: grouping and
    /// aggregate expressions become references to their output columns.
    fn rebase(&self, expr: LogicalExpr) -> PlannerResult<LogicalExpr> {
        if let Some(field) = self
            .targets
            .iter()
            .position(|t| *t == expr)
            .and_then(|i| self.schema.field(i))
        {
            return Ok(LogicalExpr::Column(Column::from_field(field)));
        }
        match expr {
            LogicalExpr::Column(c) => {
                if !self.schema.contains(c.relation.as_ref(), &c.name) {
                    return Err(PlannerError::InvalidPlan(format!(
                        "column {} must appear in GROUP BY or be used in an aggregate",
                        c
                    )));
                }
                Ok(LogicalExpr::Column(c))
            }
            other => other.map_children(|child| self.rebase(child)),
        }
    }
}

/// Collect distinct aggregate calls, outermost first, without descending
/// into aggregate arguments.
fn collect_aggregates(expr: &LogicalExpr, out: &mut Vec<LogicalExpr>) {
    match expr {
        LogicalExpr::Aggregate { .. } | LogicalExpr::AggregateFunction { .. } => {
            if !out.contains(expr) {
                out.push(expr.clone());
            }
        }
        other => {
            for child in other.children() {
                collect_aggregates(child, out);
            }
        }
    }
}

fn table_ref(name: &ObjectName) -> PlannerResult<TableRef> {
    match name.0.as_slice() {
        [table] => Ok(TableRef::bare(table.value.clone())),
        [namespace, table] => Ok(TableRef::qualified(
            namespace.value.clone(),
            table.value.clone(),
        )),
        _ => Err(PlannerError::UnknownTable(name.to_string())),
    }
}

fn plan_literal(value: &Value) -> PlannerResult<Literal> {
    match value {
        Value::Number(n, _) => n
            .parse::<i64>()
            .map(Literal::Int)
            .or_else(|_| n.parse::<f64>().map(Literal::Float))
            .map_err(|_| PlannerError::InvalidPlan(format!("invalid number {}", n))),
        Value::SingleQuotedString(s) | Value::DoubleQuotedString(s) => {
            Ok(Literal::Text(s.clone()))
        }
        Value::Boolean(b) => Ok(Literal::Bool(*b)),
        Value::Null => Ok(Literal::Null),
        other => Err(PlannerError::UnsupportedExpression(other.to_string())),
    }
}

/// Unary minus folds into numeric literals. Anything else becomes
/// `expr * -1` so the result keeps the operand's type.
fn negate(expr: LogicalExpr) -> PlannerResult<LogicalExpr> {
    match expr {
        LogicalExpr::Literal(Literal::Int(i)) => i
            .checked_neg()
            .map(lit)
            .ok_or_else(|| PlannerError::InvalidPlan(format!("cannot negate {}", i))),
        LogicalExpr::Literal(Literal::Float(f)) => Ok(lit(-f)),
        other => Ok(other * lit(-1i64)),
    }
}

fn plan_binary(
    left: LogicalExpr,
    op: &BinaryOperator,
    right: LogicalExpr,
) -> PlannerResult<LogicalExpr> {
    Ok(match op {
        BinaryOperator::Plus => left + right,
        BinaryOperator::Minus => left - right,
        BinaryOperator::Multiply => left * right,
        BinaryOperator::Divide => left / right,
        BinaryOperator::Eq => left.eq(right),
        BinaryOperator::NotEq => left.not_eq(right),
        BinaryOperator::Lt => left.lt(right),
        BinaryOperator::LtEq => left.lt_eq(right),
        BinaryOperator::Gt => left.gt(right),
        BinaryOperator::GtEq => left.gt_eq(right),
        BinaryOperator::And => left.and(right),
        BinaryOperator::Or => left.or(right),
        other => return Err(PlannerError::UnknownOperator(other.to_string())),
    })
}

/// LIMIT and OFFSET take non-negative integer literals
fn parse_count(expr: &Expr) -> PlannerResult<usize> {
    match expr {
        Expr::Value(Value::Number(n, _)) => n
            .parse::<usize>()
            .map_err(|_| PlannerError::InvalidPlan(format!("invalid row count {}", n))),
        other => Err(PlannerError::UnsupportedExpression(format!(
            "row count {}",
            other
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::DataType;
    use crate::executor::Datum;
    use crate::planner::explain::ExplainOutput;
    use crate::planner::test_utils::test_catalog;
    use crate::planner::VirtualPlanner;

    fn explain(sql: &str) -> String {
        let catalog = test_catalog();
        let plan = QueryPlanner::new(&catalog).plan_sql(sql).unwrap();
        ExplainOutput::format_logical(&plan)
    }

    fn plan_err(sql: &str) -> PlannerError {
        let catalog = test_catalog();
        QueryPlanner::new(&catalog).plan_sql(sql).unwrap_err()
    }

    const USERS_SCAN: &str = "projection=[id, username, age, state, wallet]";

    #[test]
    fn test_plan_select_where() {
        assert_eq!(
            explain("SELECT username, age FROM users WHERE age > 20"),
            format!(
                "Projection: users.username, users.age\n  Filter: users.age > 20\n    Scan: users; {}\n",
                USERS_SCAN
            )
        );
    }

    #[test]
    fn test_plan_alias_order_limit() {
        assert_eq!(
            explain("SELECT u.username AS name FROM users u ORDER BY name DESC LIMIT 2 OFFSET 1"),
            format!(
                "Limit: skip=1, fetch=2\n  Sort: name DESC NULLS FIRST\n    Projection: u.username AS name\n      Scan: u; {}\n",
                USERS_SCAN
            )
        );
    }

    #[test]
    fn test_plan_order_by_default_nulls() {
        let plan = explain("SELECT age FROM users ORDER BY age");
        assert!(plan.starts_with("Sort: users.age ASC NULLS LAST\n"));
    }

    #[test]
    fn test_plan_order_by_unprojected_column() {
        assert_eq!(
            explain("SELECT username FROM users ORDER BY age DESC"),
            format!(
                "Projection: users.username\n  Sort: users.age DESC NULLS FIRST\n    Scan: users; {}\n",
                USERS_SCAN
            )
        );
        assert!(matches!(
            plan_err("SELECT DISTINCT username FROM users ORDER BY age"),
            PlannerError::UnknownColumn(_)
        ));
    }

    #[test]
    fn test_plan_aggregate_having() {
        let plan = explain(
            "SELECT state, COUNT(id) AS n FROM users GROUP BY state HAVING COUNT(id) > 1",
        );
        assert_eq!(
            plan,
            format!(
                "Projection: users.state, COUNT(users.id) AS n\n  Filter: COUNT(users.id) > 1\n    Aggregate: group_by=[users.state]; aggregates=[COUNT(users.id)]\n      Scan: users; {}\n",
                USERS_SCAN
            )
        );
    }

    #[test]
    fn test_plan_order_by_aggregate() {
        let plan = explain("SELECT state, SUM(age) FROM users GROUP BY state ORDER BY SUM(age) DESC");
        assert!(plan.starts_with("Sort: SUM(users.age) DESC NULLS FIRST\n"));
    }

    #[test]
    fn test_plan_count_star_and_modifiers() {
        let plan = explain("SELECT COUNT(*), COUNT(DISTINCT state) FROM users");
        assert!(plan.starts_with("Projection: COUNT(*), COUNT(DISTINCT users.state)\n"));
    }

    #[test]
    fn test_plan_join() {
        let plan = explain(
            "SELECT username, total FROM users JOIN orders ON users.id = user_id",
        );
        assert!(plan.contains("Join: Inner on users.id = orders.user_id\n"));
    }

    #[test]
    fn test_plan_union_distinct() {
        let plan = explain("SELECT id FROM users UNION SELECT user_id FROM orders");
        assert!(plan.starts_with("Distinct\n  SetOp: Union\n"));

        let plan = explain("SELECT id FROM users UNION ALL SELECT user_id FROM orders");
        assert!(plan.starts_with("SetOp: Union\n"));
    }

    #[test]
    fn test_plan_derived_table() {
        let plan = explain("SELECT t.age FROM (SELECT age FROM users) t WHERE t.age > 20");
        assert!(plan.starts_with("Projection: t.age\n  Filter: t.age > 20\n    Subquery: t\n"));
    }

    #[test]
    fn test_plan_without_from() {
        assert_eq!(explain("SELECT 1 + 1"), "Projection: 1 + 1\n  NoRelation\n");
        assert_eq!(explain("SELECT -5"), "Projection: -5\n  NoRelation\n");
    }

    #[tokio::test]
    async fn test_plan_negated_float_column() {
        let catalog = test_catalog();
        let plan = QueryPlanner::new(&catalog)
            .plan_sql("SELECT -total FROM orders")
            .unwrap();
        let field = plan.schema().unwrap().fields()[0].clone();
        assert_eq!(field.name, "orders.total * -1");
        assert_eq!(field.data_type, DataType::Float);

        let mut result = VirtualPlanner::to_plan(&plan)
            .unwrap()
            .execute()
            .await
            .unwrap();
        let rows = result.collect().await.unwrap();
        assert_eq!(rows[0].values(), &[Datum::Float(-10.5)]);

        let plan = QueryPlanner::new(&catalog)
            .plan_sql("SELECT -age FROM users")
            .unwrap();
        assert_eq!(plan.schema().unwrap().fields()[0].data_type, DataType::Int);
    }

    #[test]
    fn test_plan_scalar_function() {
        let plan = explain("SELECT upper(username) FROM users");
        assert!(plan.starts_with("Projection: upper(users.username)\n"));
    }

    #[test]
    fn test_plan_errors() {
        assert!(matches!(
            plan_err("SELECT * FROM missing"),
            PlannerError::UnknownTable(_)
        ));
        assert!(matches!(
            plan_err("SELECT nope FROM users"),
            PlannerError::UnknownColumn(_)
        ));
        assert!(matches!(
            plan_err("SELECT id FROM users JOIN orders ON user_id = id"),
            PlannerError::AmbiguousColumn(_)
        ));
        assert!(matches!(
            plan_err("SELECT age % 2 FROM users"),
            PlannerError::UnknownOperator(_)
        ));
        assert!(matches!(
            plan_err("SELECT username FROM users GROUP BY state"),
            PlannerError::InvalidPlan(_)
        ));
        assert!(matches!(
            plan_err("SELECT nosuch(age) FROM users"),
            PlannerError::UnsupportedExpression(_)
        ));
        assert!(matches!(
            plan_err("WITH t AS (SELECT 1) SELECT * FROM t"),
            PlannerError::NotImplemented(_)
        ));
        assert!(matches!(
            plan_err("DELETE FROM users"),
            PlannerError::NotImplemented(_)
        ));
    }
}
