//! Planner error types

use thiserror::Error;

/// Planner error
#[derive(Debug, Error)]
pub enum PlannerError {
    /// Column reference matched no field
    #[error("unknown column: {0}")]
    UnknownColumn(String),

    /// Unqualified column reference matched more than one field
    #[error("ambiguous column reference: {0}")]
    AmbiguousColumn(String),

    #[error("unknown table: {0}")]
    UnknownTable(String),

    /// Expression kind the current stage cannot handle
    #[error("unsupported expression: {0}")]
    UnsupportedExpression(String),

    #[error("unknown operator: {0}")]
    UnknownOperator(String),

    /// Plan shape outside the supported scope
    #[error("not implemented: {0}")]
    NotImplemented(String),

    /// Invalid plan structure
    #[error("invalid plan: {0}")]
    InvalidPlan(String),

    #[error("SQL parse error: {0}")]
    Sql(#[from] sqlparser::parser::ParserError),
}

impl PlannerError {
    /// Errors that signal a gap in supported functionality rather than
    /// a mistake in the query.
    pub fn is_unsupported(&self) -> bool {
        matches!(
            self,
            PlannerError::UnsupportedExpression(_)
                | PlannerError::UnknownOperator(_)
                | PlannerError::NotImplemented(_)
        )
    }
}

/// Result type for planner operations
pub type PlannerResult<T> = Result<T, PlannerError>;
