//! SQL front end
//!
//! Thin wrapper around `sqlparser`. Planning the resulting AST lives in
//! `planner::query`.

pub mod parser;

pub use parser::Parser;
