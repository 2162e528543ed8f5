//! Plancraft - query cost estimation and plan optimization
//!
//! Features:
//! - Algebraic logical plans with schema resolution
//! - Projection and predicate pushdown rewrites
//! - Statistics-driven cost model
//! - Lowering to virtual plans executed as pull-based row streams
//! - Memo groups for comparing equivalent plan alternatives

pub mod catalog;
pub mod datasource;
pub mod executor;
pub mod planner;
pub mod sql;
