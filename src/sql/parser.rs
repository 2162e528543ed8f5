//! SQL parser wrapper around sqlparser crate

use sqlparser::ast::Statement;
use sqlparser::dialect::GenericDialect;
use sqlparser::parser::Parser as SqlParser;

use crate::planner::error::{PlannerError, PlannerResult};

/// SQL parser
pub struct Parser;

impl Parser {
    /// Parse exactly one SQL statement
    pub fn parse_one(sql: &str) -> PlannerResult<Statement> {
        let dialect = GenericDialect {};
        let mut ast = SqlParser::parse_sql(&dialect, sql)?;

        if ast.len() > 1 {
            return Err(PlannerError::InvalidPlan(
                "multiple statements not supported".to_string(),
            ));
        }
        ast.pop()
            .ok_or_else(|| PlannerError::InvalidPlan("empty SQL statement".to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_select() {
        let stmt = Parser::parse_one("SELECT username, age FROM users WHERE age > 20").unwrap();
        assert!(matches!(stmt, Statement::Query(_)));
    }

    #[test]
    fn test_parse_join() {
        let stmt = Parser::parse_one(
            "SELECT u.username, o.total FROM users u JOIN orders o ON u.id = o.user_id",
        )
        .unwrap();
        assert!(matches!(stmt, Statement::Query(_)));
    }

    #[test]
    fn test_parse_empty() {
        assert!(matches!(
            Parser::parse_one("  "),
            Err(PlannerError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_parse_multiple() {
        assert!(matches!(
            Parser::parse_one("SELECT 1; SELECT 2"),
            Err(PlannerError::InvalidPlan(_))
        ));
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            Parser::parse_one("SELEC username FROM users"),
            Err(PlannerError::Sql(_))
        ));
    }
}
