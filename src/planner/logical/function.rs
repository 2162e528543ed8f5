//! Function catalog
//!
//! Aggregate kinds and the built-in scalar functions, with their result
//! typing rules.

use std::fmt;

use crate::catalog::DataType;
use crate::planner::error::{PlannerError, PlannerResult};

/// Built-in aggregate kinds
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AggregateKind {
    Count,
    Sum,
    Avg,
    Min,
    Max,
}

impl AggregateKind {
    /// Look up an aggregate by case-insensitive name
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "count" => Some(AggregateKind::Count),
            "sum" => Some(AggregateKind::Sum),
            "avg" => Some(AggregateKind::Avg),
            "min" => Some(AggregateKind::Min),
            "max" => Some(AggregateKind::Max),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            AggregateKind::Count => "COUNT",
            AggregateKind::Sum => "SUM",
            AggregateKind::Avg => "AVG",
            AggregateKind::Min => "MIN",
            AggregateKind::Max => "MAX",
        }
    }

    /// Result type given the argument type
    pub fn result_type(&self, input: DataType) -> DataType {
        match self {
            AggregateKind::Count => DataType::Int,
            AggregateKind::Avg => DataType::Float,
            AggregateKind::Sum | AggregateKind::Min | AggregateKind::Max => input,
        }
    }
}

impl fmt::Display for AggregateKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Built-in scalar functions
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ScalarFunc {
    Upper,
    Lower,
    Length,
    Abs,
    Coalesce,
    Concat,
}

impl ScalarFunc {
    pub fn from_name(name: &str) -> Option<Self> {
        match name.to_ascii_lowercase().as_str() {
            "upper" => Some(ScalarFunc::Upper),
            "lower" => Some(ScalarFunc::Lower),
            "length" => Some(ScalarFunc::Length),
            "abs" => Some(ScalarFunc::Abs),
            "coalesce" => Some(ScalarFunc::Coalesce),
            "concat" => Some(ScalarFunc::Concat),
            _ => None,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ScalarFunc::Upper => "upper",
            ScalarFunc::Lower => "lower",
            ScalarFunc::Length => "length",
            ScalarFunc::Abs => "abs",
            ScalarFunc::Coalesce => "coalesce",
            ScalarFunc::Concat => "concat",
        }
    }

    /// Check arity and compute the result type from argument types
    pub fn return_type(&self, args: &[DataType]) -> PlannerResult<DataType> {
        let arity_error = |expected: &str| {
            PlannerError::InvalidPlan(format!(
                "{} expects {} argument(s), got {}",
                self.name(),
                expected,
                args.len()
            ))
        };
        match self {
            ScalarFunc::Upper | ScalarFunc::Lower => match args {
                [_] => Ok(DataType::Text),
                _ => Err(arity_error("1")),
            },
            ScalarFunc::Length => match args {
                [_] => Ok(DataType::Int),
                _ => Err(arity_error("1")),
            },
            ScalarFunc::Abs => match args {
                [t] => Ok(*t),
                _ => Err(arity_error("1")),
            },
            ScalarFunc::Coalesce => {
                if args.is_empty() {
                    return Err(arity_error("at least 1"));
                }
                Ok(args
                    .iter()
                    .copied()
                    .find(|t| *t != DataType::Null)
                    .unwrap_or(DataType::Null))
            }
            ScalarFunc::Concat => Ok(DataType::Text),
        }
    }
}

impl fmt::Display for ScalarFunc {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}
