//! Expression evaluation
//!
//! Evaluates a VirtualExpr against a Row to produce a Datum. Logic is
//! three-valued: comparisons and arithmetic with a NULL operand yield
//! NULL, and AND/OR follow SQL truth tables.

use std::cmp::Ordering;

use crate::planner::logical::{ScalarFunc, UnaryOp};
use crate::planner::virtual_plan::{VirtualBinaryOp, VirtualExpr};

use super::datum::Datum;
use super::error::{ExecutorError, ExecutorResult};
use super::row::Row;

/// Evaluate an expression against a row
pub fn eval(expr: &VirtualExpr, row: &Row) -> ExecutorResult<Datum> {
    match expr {
        VirtualExpr::Column(index) => Ok(row.get(*index)?.clone()),

        VirtualExpr::Literal(lit) => Ok(Datum::from_literal(lit)),

        VirtualExpr::Binary { op, left, right } => {
            let lval = eval(left, row)?;
            let rval = eval(right, row)?;
            eval_binary_op(*op, &lval, &rval)
        }

        VirtualExpr::Unary { op, expr } => {
            let val = eval(expr, row)?;
            eval_unary_op(*op, &val)
        }

        VirtualExpr::Function { func, args } => {
            let arg_vals: Vec<Datum> = args
                .iter()
                .map(|a| eval(a, row))
                .collect::<Result<_, _>>()?;
            eval_function(*func, &arg_vals)
        }
    }
}

/// Evaluate a binary operation
fn eval_binary_op(op: VirtualBinaryOp, left: &Datum, right: &Datum) -> ExecutorResult<Datum> {
    match op {
        VirtualBinaryOp::And => eval_and(left, right),
        VirtualBinaryOp::Or => eval_or(left, right),

        _ if left.is_null() || right.is_null() => Ok(Datum::Null),

        VirtualBinaryOp::Add => eval_add(left, right),
        VirtualBinaryOp::Sub => eval_sub(left, right),
        VirtualBinaryOp::Mul => eval_mul(left, right),
        VirtualBinaryOp::Div => eval_div(left, right),

        VirtualBinaryOp::Eq => compare(op, left, right, |o| o == Ordering::Equal),
        VirtualBinaryOp::NotEq => compare(op, left, right, |o| o != Ordering::Equal),
        VirtualBinaryOp::Lt => compare(op, left, right, |o| o == Ordering::Less),
        VirtualBinaryOp::LtEq => compare(op, left, right, |o| o != Ordering::Greater),
        VirtualBinaryOp::Gt => compare(op, left, right, |o| o == Ordering::Greater),
        VirtualBinaryOp::GtEq => compare(op, left, right, |o| o != Ordering::Less),
    }
}

fn compare(
    op: VirtualBinaryOp,
    left: &Datum,
    right: &Datum,
    test: impl Fn(Ordering) -> bool,
) -> ExecutorResult<Datum> {
    left.sql_cmp(right)
        .map(|ord| Datum::Bool(test(ord)))
        .ok_or_else(|| type_error(op, left, right))
}

fn type_error(op: VirtualBinaryOp, left: &Datum, right: &Datum) -> ExecutorError {
    ExecutorError::Evaluation(format!(
        "cannot apply {} to {} and {}",
        op.symbol(),
        left.data_type(),
        right.data_type()
    ))
}

fn eval_add(left: &Datum, right: &Datum) -> ExecutorResult<Datum> {
    match (left, right) {
        (Datum::Int(a), Datum::Int(b)) => a
            .checked_add(*b)
            .map(Datum::Int)
            .ok_or_else(|| overflow("addition")),
        _ => float_op(VirtualBinaryOp::Add, left, right, |a, b| a + b),
    }
}

fn eval_sub(left: &Datum, right: &Datum) -> ExecutorResult<Datum> {
    match (left, right) {
        (Datum::Int(a), Datum::Int(b)) => a
            .checked_sub(*b)
            .map(Datum::Int)
            .ok_or_else(|| overflow("subtraction")),
        _ => float_op(VirtualBinaryOp::Sub, left, right, |a, b| a - b),
    }
}

fn eval_mul(left: &Datum, right: &Datum) -> ExecutorResult<Datum> {
    match (left, right) {
        (Datum::Int(a), Datum::Int(b)) => a
            .checked_mul(*b)
            .map(Datum::Int)
            .ok_or_else(|| overflow("multiplication")),
        _ => float_op(VirtualBinaryOp::Mul, left, right, |a, b| a * b),
    }
}

fn eval_div(left: &Datum, right: &Datum) -> ExecutorResult<Datum> {
    match right {
        Datum::Int(0) => return Err(ExecutorError::Evaluation("division by zero".into())),
        Datum::Float(f) if *f == 0.0 => {
            return Err(ExecutorError::Evaluation("division by zero".into()))
        }
        _ => {}
    }

    match (left, right) {
        (Datum::Int(a), Datum::Int(b)) => a
            .checked_div(*b)
            .map(Datum::Int)
            .ok_or_else(|| overflow("division")),
        _ => float_op(VirtualBinaryOp::Div, left, right, |a, b| a / b),
    }
}

/// Numeric operation with at least one float operand
fn float_op(
    op: VirtualBinaryOp,
    left: &Datum,
    right: &Datum,
    f: impl Fn(f64, f64) -> f64,
) -> ExecutorResult<Datum> {
    match (left, right) {
        (Datum::Int(_) | Datum::Float(_), Datum::Int(_) | Datum::Float(_)) => {
            match (left.as_float(), right.as_float()) {
                (Some(a), Some(b)) => Ok(Datum::Float(f(a, b))),
                _ => Err(type_error(op, left, right)),
            }
        }
        _ => Err(type_error(op, left, right)),
    }
}

fn overflow(what: &str) -> ExecutorError {
    ExecutorError::Evaluation(format!("integer overflow in {}", what))
}

fn bool_operand(op: &str, val: &Datum) -> ExecutorResult<Option<bool>> {
    match val {
        Datum::Bool(b) => Ok(Some(*b)),
        Datum::Null => Ok(None),
        other => Err(ExecutorError::Evaluation(format!(
            "{} requires boolean operands, got {}",
            op,
            other.data_type()
        ))),
    }
}

/// SQL AND with three-valued logic
fn eval_and(left: &Datum, right: &Datum) -> ExecutorResult<Datum> {
    match (bool_operand("AND", left)?, bool_operand("AND", right)?) {
        (Some(false), _) | (_, Some(false)) => Ok(Datum::Bool(false)),
        (Some(true), Some(true)) => Ok(Datum::Bool(true)),
        _ => Ok(Datum::Null),
    }
}

/// SQL OR with three-valued logic
fn eval_or(left: &Datum, right: &Datum) -> ExecutorResult<Datum> {
    match (bool_operand("OR", left)?, bool_operand("OR", right)?) {
        (Some(true), _) | (_, Some(true)) => Ok(Datum::Bool(true)),
        (Some(false), Some(false)) => Ok(Datum::Bool(false)),
        _ => Ok(Datum::Null),
    }
}

/// Evaluate a unary operation
fn eval_unary_op(op: UnaryOp, val: &Datum) -> ExecutorResult<Datum> {
    match op {
        UnaryOp::Not => val.not().ok_or_else(|| {
            ExecutorError::Evaluation(format!("NOT requires boolean, got {}", val.data_type()))
        }),
        UnaryOp::IsNull => Ok(Datum::Bool(val.is_null())),
        UnaryOp::IsNotNull => Ok(Datum::Bool(!val.is_null())),
    }
}

/// Evaluate a scalar function
fn eval_function(func: ScalarFunc, args: &[Datum]) -> ExecutorResult<Datum> {
    let bad_args = || {
        let types: Vec<_> = args.iter().map(|a| a.data_type().to_string()).collect();
        ExecutorError::Evaluation(format!("invalid arguments to {}({})", func, types.join(", ")))
    };

    match func {
        ScalarFunc::Upper | ScalarFunc::Lower => match args {
            [Datum::Null] => Ok(Datum::Null),
            [Datum::Text(s)] if func == ScalarFunc::Upper => Ok(Datum::Text(s.to_uppercase())),
            [Datum::Text(s)] => Ok(Datum::Text(s.to_lowercase())),
            _ => Err(bad_args()),
        },

        ScalarFunc::Length => match args {
            [Datum::Null] => Ok(Datum::Null),
            [Datum::Text(s)] => Ok(Datum::Int(s.chars().count() as i64)),
            [Datum::Bytes(b)] => Ok(Datum::Int(b.len() as i64)),
            _ => Err(bad_args()),
        },

        ScalarFunc::Abs => match args {
            [Datum::Null] => Ok(Datum::Null),
            [Datum::Int(i)] => i.checked_abs().map(Datum::Int).ok_or_else(|| overflow("abs")),
            [Datum::Float(f)] => Ok(Datum::Float(f.abs())),
            _ => Err(bad_args()),
        },

        ScalarFunc::Coalesce => Ok(args
            .iter()
            .find(|a| !a.is_null())
            .cloned()
            .unwrap_or(Datum::Null)),

        // NULL arguments are skipped
        ScalarFunc::Concat => {
            let mut result = String::new();
            for arg in args {
                match arg {
                    Datum::Null => {}
                    Datum::Bytes(_) => return Err(bad_args()),
                    other => result.push_str(&other.to_string()),
                }
            }
            Ok(Datum::Text(result))
        }
    }
}
